use futures::StreamExt;

use super::history::History;
use super::typewriter::render_snapshot;
use crate::agent::Agent;
use crate::error::ChatError;
use crate::models::Message;

/// Appended to the reply while it is still streaming.
pub const CURSOR_GLYPH: &str = "▌";

/// Rendering surface for the chat. Implementations hold no conversation state.
pub trait ChatView {
    /// Draw the whole conversation from scratch.
    fn render_history(&mut self, messages: &[Message]);

    /// Replace the reply placeholder's contents with `text`.
    fn draw_reply(&mut self, text: &str);

    /// The reply placeholder will not be drawn again this turn.
    fn end_reply(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranscriptPolicy {
    /// Record only `{assistant, final_text}` after each turn.
    #[default]
    FinalTextOnly,
    /// Record the agent's full reply (tool calls and results included), then `{assistant, final_text}`.
    FullTranscript,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingFirstFragment,
    Streaming,
    Done,
    Failed,
}

#[derive(Debug)]
pub struct TurnOutcome {
    pub state: TurnState,
    /// Text recorded as the assistant's entry.
    pub text: String,
    pub fragments: usize,
    pub error: Option<ChatError>,
}

impl TurnOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

pub struct ChatFrontEnd<A: Agent, V: ChatView> {
    agent: A,
    view: V,
    history: History,
    policy: TranscriptPolicy,
    state: TurnState,
}

impl<A: Agent, V: ChatView> ChatFrontEnd<A, V> {
    pub fn new(agent: A, view: V) -> Self {
        Self {
            agent,
            view,
            history: History::new(),
            policy: TranscriptPolicy::default(),
            state: TurnState::Idle,
        }
    }

    pub fn with_policy(mut self, policy: TranscriptPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Start over: drop every message and redraw the empty conversation.
    pub fn new_chat(&mut self) {
        self.history.clear();
        self.state = TurnState::Idle;
        self.render();
    }

    pub fn render(&mut self) {
        self.view.render_history(self.history.messages());
    }

    /// Run one user turn to completion. Errors end up in the history as the assistant's reply.
    pub async fn submit(&mut self, prompt: &str) -> TurnOutcome {
        self.history.append(Message::user(prompt));
        self.view.render_history(self.history.messages());

        self.state = TurnState::AwaitingFirstFragment;
        let mut text = String::new();
        let mut reply: Vec<Message> = Vec::new();
        let mut fragments = 0;

        let result = {
            let mut stream = self.agent.run(self.history.messages());
            loop {
                match stream.next().await {
                    Some(Ok(snapshot)) => {
                        self.state = TurnState::Streaming;
                        fragments += 1;
                        text = render_snapshot(&snapshot);
                        self.view.draw_reply(&format!("{}{}", text, CURSOR_GLYPH));
                        reply = snapshot;
                    }
                    Some(Err(err)) => break Err(err),
                    None => break Ok(()),
                }
            }
        };

        let error = match result {
            Ok(()) => {
                self.view.draw_reply(&text);
                self.view.end_reply();
                if self.policy == TranscriptPolicy::FullTranscript {
                    self.history.extend(reply);
                }
                self.state = TurnState::Done;
                None
            }
            Err(err) => {
                text = format!("Error: {}", err.message());
                self.view.draw_reply(&text);
                self.view.end_reply();
                self.state = TurnState::Failed;
                Some(err)
            }
        };

        self.history.append(Message::assistant(text.clone()));

        TurnOutcome {
            state: self.state,
            text,
            fragments,
            error,
        }
    }
}
