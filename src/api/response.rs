use crate::api::models::ChatCompletion;
use crate::error::{ChatError, Result};
use crate::models::Message;

fn first_message(completion: &ChatCompletion) -> Result<&Message> {
    completion
        .choices
        .first()
        .map(|choice| &choice.message)
        .ok_or_else(|| ChatError::Transport("Empty choices array".to_string()))
}

/// Extract content from a non-streaming response, `None` when empty or null
pub fn extract_content(completion: &ChatCompletion) -> Result<Option<String>> {
    let message = first_message(completion)?;
    Ok(Some(message.content.clone()).filter(|c| !c.is_empty()))
}

/// Extract reasoning content from a non-streaming response
pub fn extract_reasoning(completion: &ChatCompletion) -> Result<Option<String>> {
    let message = first_message(completion)?;
    Ok(message.reasoning_content.clone())
}
