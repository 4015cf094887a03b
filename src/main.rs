use clap::Parser;
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::process;
use std::sync::Arc;

use vllm_chat::agent::{NoTools, ToolProvider, VllmAgent};
use vllm_chat::chat::{ChatFrontEnd, TranscriptPolicy};
use vllm_chat::cli::Args;
use vllm_chat::config::Config;
use vllm_chat::mcp::McpClient;
use vllm_chat::probe::Prober;
use vllm_chat::ui::{
    print_banner, print_help, print_server_status, print_tools_panel, status_header, ReplCommand,
    TerminalView,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match Config::load(&args.overrides()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            process::exit(1);
        }
    };

    if config.verbose {
        eprintln!(
            "{}",
            format!("[chat] Using model {} at {}", config.model, config.base_url).dimmed()
        );
    }

    print_banner(&config);

    let prober = Prober::from_config(&config)?;
    let status = prober.list_models().await;
    print_server_status(&config, &status);

    let mcp = Arc::new(McpClient::new(config.verbose));
    let failures = mcp.connect_all(&config.mcp_servers).await;
    print_tools_panel(&config.mcp_servers, &mcp.server_names().await, &failures);

    let tools: Arc<dyn ToolProvider> = if config.mcp_servers.is_empty() {
        Arc::new(NoTools)
    } else {
        mcp.clone()
    };
    let agent = VllmAgent::from_config(&config, tools)?;

    let policy = if config.keep_tool_transcript {
        TranscriptPolicy::FullTranscript
    } else {
        TranscriptPolicy::FinalTextOnly
    };
    let view = TerminalView::stdout(status_header(&config, &status));
    let mut chat = ChatFrontEnd::new(agent, view).with_policy(policy);

    print_help();

    let mut editor = DefaultEditor::new()?;
    loop {
        let line = match editor.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{} {}", "Error:".red(), e);
                break;
            }
        };

        match ReplCommand::parse(&line) {
            ReplCommand::Empty => {}
            ReplCommand::Prompt(prompt) => {
                let _ = editor.add_history_entry(prompt.as_str());
                let outcome = chat.submit(&prompt).await;
                if let Some(err) = &outcome.error {
                    if config.verbose {
                        eprintln!("{}", format!("[chat] Turn failed ({:?}): {}", err.kind(), err).dimmed());
                    }
                }
            }
            ReplCommand::NewChat => chat.new_chat(),
            ReplCommand::History => chat.render(),
            ReplCommand::Status => {
                let status = prober.list_models().await;
                chat.view_mut().set_header(status_header(&config, &status));
                print_server_status(&config, &status);
            }
            ReplCommand::Help => print_help(),
            ReplCommand::Quit => break,
            ReplCommand::Unknown(command) => {
                println!("{}", format!("Unknown command: {} (try /help)", command).yellow());
            }
        }
    }

    mcp.shutdown().await;
    Ok(())
}
