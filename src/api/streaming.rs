use crate::api::models::StreamResponse;
use crate::error::{ChatError, Result};
use crate::models::{Message, Role, ToolCall};

#[derive(Debug, Clone, PartialEq)]
pub enum SseEvent {
    Data(String),
    Done,
    /// `event`, `id`, `retry` or an unknown field.
    Field { name: String, value: String },
}

/// Splits a byte stream into SSE lines.
///
/// Bytes are buffered until a full line is available, so multi-byte UTF-8
/// characters split across network chunks decode correctly.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.pending.extend_from_slice(chunk);

        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };

        let complete: Vec<u8> = self.pending.drain(..=last_newline).collect();
        String::from_utf8_lossy(&complete)
            .split('\n')
            .filter_map(parse_line)
            .collect()
    }

    /// Flush a final line that arrived without a trailing newline.
    pub fn finish(&mut self) -> Vec<SseEvent> {
        let rest = std::mem::take(&mut self.pending);
        parse_line(&String::from_utf8_lossy(&rest)).into_iter().collect()
    }
}

fn parse_line(line: &str) -> Option<SseEvent> {
    let line = line.trim_end_matches('\r');
    if line.is_empty() || line.starts_with(':') {
        return None;
    }

    let colon_pos = line.find(':')?;
    let field = line[..colon_pos].trim();
    let value = line[colon_pos + 1..].trim_start();

    match field {
        "data" if value == "[DONE]" => Some(SseEvent::Done),
        "data" => Some(SseEvent::Data(value.to_string())),
        _ => Some(SseEvent::Field {
            name: field.to_string(),
            value: value.to_string(),
        }),
    }
}

#[derive(Debug, Default, Clone)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

/// Folds `choices[].delta` fragments into one assistant message.
#[derive(Debug, Default)]
pub struct DeltaAccumulator {
    content: String,
    reasoning: String,
    tool_calls: Vec<PartialToolCall>,
    finish_reason: Option<String>,
}

impl DeltaAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one `data:` payload and fold it in. Returns whether anything visible changed.
    ///
    /// Error payloads and malformed JSON are `Transport` errors.
    pub fn apply_data(&mut self, data: &str) -> Result<bool> {
        let parsed: StreamResponse = serde_json::from_str(data)?;
        if let Some(message) = parsed.error_message() {
            return Err(ChatError::Transport(message));
        }
        Ok(self.apply(parsed))
    }

    pub fn apply(&mut self, response: StreamResponse) -> bool {
        let mut changed = false;

        for choice in response.choices.unwrap_or_default() {
            if let Some(reason) = choice.finish_reason {
                self.finish_reason = Some(reason);
            }
            let Some(delta) = choice.delta else {
                continue;
            };

            if let Some(reasoning) = delta.reasoning_content.filter(|r| !r.is_empty()) {
                self.reasoning.push_str(&reasoning);
                changed = true;
            }

            if let Some(content) = delta.content.filter(|c| !c.is_empty()) {
                self.content.push_str(&content);
                changed = true;
            }

            for call in delta.tool_calls.unwrap_or_default() {
                if self.tool_calls.len() <= call.index {
                    self.tool_calls.resize(call.index + 1, PartialToolCall::default());
                }
                let slot = &mut self.tool_calls[call.index];
                if let Some(id) = call.id.filter(|id| !id.is_empty()) {
                    slot.id = id;
                }
                if let Some(function) = call.function {
                    if let Some(name) = function.name {
                        slot.name.push_str(&name);
                    }
                    if let Some(arguments) = function.arguments {
                        slot.arguments.push_str(&arguments);
                    }
                }
                changed = true;
            }
        }

        changed
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.finish_reason.as_deref()
    }

    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.tool_calls
            .iter()
            .enumerate()
            .filter(|(_, call)| !call.name.is_empty())
            .map(|(index, call)| {
                let id = if call.id.is_empty() {
                    format!("call_{}", index)
                } else {
                    call.id.clone()
                };
                let arguments = if call.arguments.trim().is_empty() {
                    "{}".to_string()
                } else {
                    call.arguments.clone()
                };
                ToolCall::function(id, call.name.clone(), arguments)
            })
            .collect()
    }

    /// The assistant message accumulated so far.
    pub fn message(&self) -> Message {
        let tool_calls = self.tool_calls();
        Message {
            role: Role::Assistant,
            content: self.content.clone(),
            reasoning_content: Some(self.reasoning.clone()).filter(|r| !r.is_empty()),
            tool_calls: Some(tool_calls).filter(|calls| !calls.is_empty()),
            tool_call_id: None,
            name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_lines_across_chunks() {
        let mut buffer = SseLineBuffer::new();
        assert!(buffer.push(b"data: {\"a\"").is_empty());
        let events = buffer.push(b":1}\n\ndata: [DONE]\n");
        assert_eq!(
            events,
            vec![SseEvent::Data("{\"a\":1}".to_string()), SseEvent::Done]
        );
    }

    #[test]
    fn keeps_multibyte_characters_intact() {
        let line = "data: 안녕하세요\n".as_bytes();
        let mut buffer = SseLineBuffer::new();
        let mut events = Vec::new();
        for byte in line {
            events.extend(buffer.push(std::slice::from_ref(byte)));
        }
        assert_eq!(events, vec![SseEvent::Data("안녕하세요".to_string())]);
    }

    #[test]
    fn ignores_comments_and_reports_other_fields() {
        let mut buffer = SseLineBuffer::new();
        let events = buffer.push(b": keep-alive\r\nevent: message\r\n");
        assert_eq!(
            events,
            vec![SseEvent::Field {
                name: "event".to_string(),
                value: "message".to_string()
            }]
        );
    }

    #[test]
    fn finish_flushes_unterminated_line() {
        let mut buffer = SseLineBuffer::new();
        assert!(buffer.push(b"data: [DONE]").is_empty());
        assert_eq!(buffer.finish(), vec![SseEvent::Done]);
    }

    #[test]
    fn accumulates_content_reasoning_and_tool_calls() {
        let mut acc = DeltaAccumulator::new();
        assert!(acc
            .apply_data(r#"{"choices":[{"delta":{"role":"assistant","reasoning_content":"hmm"}}]}"#)
            .unwrap());
        assert!(acc
            .apply_data(r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"id":"call_a","function":{"name":"get_nowcast","arguments":"{\"lat\":"}}]}}]}"#)
            .unwrap());
        assert!(acc
            .apply_data(r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"function":{"arguments":"37.5}"}}]},"finish_reason":"tool_calls"}]}"#)
            .unwrap());
        assert!(!acc.apply_data(r#"{"choices":[{"delta":{"content":""}}]}"#).unwrap());

        let message = acc.message();
        assert_eq!(message.reasoning_content.as_deref(), Some("hmm"));
        let calls = message.tool_calls.unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "call_a");
        assert_eq!(calls[0].function.name, "get_nowcast");
        assert_eq!(calls[0].function.arguments, "{\"lat\":37.5}");
        assert_eq!(acc.finish_reason(), Some("tool_calls"));
    }

    #[test]
    fn rejects_malformed_payload() {
        let mut acc = DeltaAccumulator::new();
        assert!(acc.apply_data("not json").is_err());
    }

    #[test]
    fn error_payloads_are_transport_errors() {
        let mut acc = DeltaAccumulator::new();
        let err = acc
            .apply_data(r#"{"object":"error","message":"context too long","type":"BadRequestError","code":400}"#)
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Transport);
        assert_eq!(err.message(), "context too long");

        let err = acc
            .apply_data(r#"{"error":{"message":"rate limited","code":429}}"#)
            .unwrap_err();
        assert_eq!(err.message(), "rate limited");

        let err = acc.apply_data(r#"{"error":"engine dead"}"#).unwrap_err();
        assert_eq!(err.message(), "engine dead");
    }
}
