use clap::Parser;
use std::path::PathBuf;

use crate::config::CliOverrides;

#[derive(Parser, Debug)]
#[command(name = "vllm-chat")]
#[command(about = "Terminal weather chatbot backed by a local vLLM server and MCP tools", long_about = None)]
pub struct Args {
    #[arg(
        long = "base-url",
        help = "Inference server address (e.g., http://localhost:8000 or http://localhost:8000/v1)"
    )]
    pub base_url: Option<String>,

    #[arg(short = 'm', long = "model", help = "Model identifier served by vLLM")]
    pub model: Option<String>,

    #[arg(long = "config", help = "Read configuration from this file instead of the default search path")]
    pub config: Option<PathBuf>,

    #[arg(long = "no-tools", help = "Do not start any MCP tool servers")]
    pub no_tools: bool,

    #[arg(
        long = "full-transcript",
        help = "Keep tool calls and tool results in the conversation history"
    )]
    pub full_transcript: bool,

    #[arg(short = 'v', long = "verbose", help = "Print diagnostic output to stderr")]
    pub verbose: bool,
}

impl Args {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            config_path: self.config.clone(),
            verbose: self.verbose,
            no_tools: self.no_tools,
            full_transcript: self.full_transcript,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "vllm-probe")]
#[command(about = "Smoke-test a vLLM server's model listing and chat completion endpoints", long_about = None)]
pub struct ProbeArgs {
    #[arg(long = "base-url", help = "Inference server address")]
    pub base_url: Option<String>,

    #[arg(short = 'm', long = "model", help = "Model identifier to send in chat requests")]
    pub model: Option<String>,

    #[arg(long = "config", help = "Read configuration from this file")]
    pub config: Option<PathBuf>,
}

impl ProbeArgs {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            config_path: self.config.clone(),
            no_tools: true,
            ..CliOverrides::default()
        }
    }
}
