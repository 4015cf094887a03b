use crate::models::{Message, Role};

/// Display text for a reply snapshot, with reasoning, tool traffic and answer marked.
///
/// Snapshots only grow, so consecutive renders usually extend each other.
pub fn render_snapshot(messages: &[Message]) -> String {
    let mut segments: Vec<String> = Vec::new();

    for message in messages {
        match message.role {
            Role::Assistant => {
                if let Some(reasoning) = message.reasoning_content.as_deref().filter(|r| !r.is_empty()) {
                    segments.push(format!("[THINK]\n{}", reasoning));
                }
                if !message.content.is_empty() {
                    segments.push(format!("[ANSWER]\n{}", message.content));
                }
                for call in message.tool_calls.iter().flatten() {
                    segments.push(format!(
                        "[TOOL_CALL] {}\n{}",
                        call.function.name, call.function.arguments
                    ));
                }
            }
            Role::Tool => {
                segments.push(format!(
                    "[TOOL_RESPONSE] {}\n{}",
                    message.name.as_deref().unwrap_or("tool"),
                    message.content
                ));
            }
            Role::System | Role::User => {}
        }
    }

    segments.join("\n")
}
