use colored::*;
use std::collections::BTreeMap;

use crate::api::ModelCard;
use crate::config::{Config, McpServerConfig};
use crate::error::{ChatError, Result};
use crate::probe::VLLM_SERVE_HINT;

pub const TITLE: &str = "🤖 Qwen3 + vLLM + MCP Chatbot";

pub fn print_banner(config: &Config) {
    println!("{}", TITLE.bold());
    println!(
        "{}",
        format!(
            "AI chatbot using the {} model on a vLLM server with MCP tools.",
            config.model
        )
        .dimmed()
    );
    println!();
}

/// One-line summary shown above the conversation on every redraw.
pub fn status_header(config: &Config, status: &Result<Vec<ModelCard>>) -> Vec<String> {
    let state = match status {
        Ok(_) => "running".green().to_string(),
        Err(_) => "unreachable".red().to_string(),
    };
    vec![
        TITLE.bold().to_string(),
        format!("{} @ {} ({})", config.model, config.base_url, state)
            .dimmed()
            .to_string(),
    ]
}

pub fn print_server_status(config: &Config, status: &Result<Vec<ModelCard>>) {
    println!("{}", "Server status".bold());
    match status {
        Ok(models) => {
            println!("{}", "✅ Connected to vLLM server".green());
            for model in models {
                let max_len = model
                    .max_model_len
                    .map(|len| len.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                println!("   - model: {} (max length {})", model.id, max_len);
            }
            println!("   - endpoint: {}", config.base_url);
            println!("   - status: running");
        }
        Err(e) => {
            println!("{}", format!("❌ vLLM server connection failed: {}", e.message()).red());
            println!("{}", "Start the vLLM server with:".dimmed());
            println!("   {}", VLLM_SERVE_HINT.cyan());
        }
    }
    println!();
}

pub fn print_tools_panel(
    servers: &BTreeMap<String, McpServerConfig>,
    connected: &[String],
    failures: &[(String, ChatError)],
) {
    println!("{}", "MCP tools".bold());
    if servers.is_empty() {
        println!("{}", "   (tools disabled)".dimmed());
    }
    for (name, server) in servers {
        let launch = std::iter::once(server.command.as_str())
            .chain(server.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        if connected.contains(name) {
            println!("   {} {} ({})", "✅".green(), name, launch.dimmed());
        } else if let Some((_, err)) = failures.iter().find(|(failed, _)| failed == name) {
            println!("   {} {} ({}): {}", "❌".red(), name, launch.dimmed(), err.message());
        }
    }
    println!("{}", "Try for example:".dimmed());
    println!("   \"서울 날씨 알려줘\"");
    println!("   \"부산 오늘 날씨는?\"");
    println!();
}

pub fn print_help() {
    println!("{}", "Commands:".bold());
    println!("{}", "  /new        Start a new chat (clears history)".dimmed());
    println!("{}", "  /history    Redraw the conversation".dimmed());
    println!("{}", "  /status     Check the vLLM server again".dimmed());
    println!("{}", "  /help       Show this help".dimmed());
    println!("{}", "  /quit       Exit".dimmed());
    println!();
}
