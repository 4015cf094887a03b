use futures::stream;
use vllm_chat::agent::{Agent, SnapshotStream};
use vllm_chat::chat::{ChatFrontEnd, ChatView, TranscriptPolicy, TurnState, CURSOR_GLYPH};
use vllm_chat::error::{ChatError, ErrorKind};
use vllm_chat::models::{Message, Role, ToolCall};

/// Replays canned snapshots, optionally ending with an error.
struct ScriptedAgent {
    snapshots: Vec<Vec<Message>>,
    failure: Option<String>,
}

impl ScriptedAgent {
    fn replying(snapshots: Vec<Vec<Message>>) -> Self {
        Self {
            snapshots,
            failure: None,
        }
    }

    fn failing_after(snapshots: Vec<Vec<Message>>, message: &str) -> Self {
        Self {
            snapshots,
            failure: Some(message.to_string()),
        }
    }
}

impl Agent for ScriptedAgent {
    fn run<'a>(&'a self, history: &'a [Message]) -> SnapshotStream<'a> {
        assert_eq!(history.last().map(|m| m.role), Some(Role::User));
        let mut items: Vec<Result<Vec<Message>, ChatError>> =
            self.snapshots.iter().cloned().map(Ok).collect();
        if let Some(message) = &self.failure {
            items.push(Err(ChatError::Transport(message.clone())));
        }
        Box::pin(stream::iter(items))
    }
}

#[derive(Default)]
struct RecordingView {
    renders: Vec<usize>,
    draws: Vec<String>,
    ended: usize,
}

impl ChatView for RecordingView {
    fn render_history(&mut self, messages: &[Message]) {
        self.renders.push(messages.len());
    }

    fn draw_reply(&mut self, text: &str) {
        self.draws.push(text.to_string());
    }

    fn end_reply(&mut self) {
        self.ended += 1;
    }
}

fn answer(text: &str) -> Message {
    Message::assistant(text)
}

fn weather_reply() -> Vec<Vec<Message>> {
    let mut call = Message::assistant("");
    call.tool_calls = Some(vec![ToolCall::function(
        "call_0",
        "get_nowcast_observation",
        "{\"lat\":37.5665,\"lon\":126.978}",
    )]);
    let result = Message::tool_result("call_0", "get_nowcast_observation", "기온 21℃");

    vec![
        vec![call.clone()],
        vec![call.clone(), result.clone()],
        vec![call.clone(), result.clone(), answer("현재 서울은")],
        vec![call, result, answer("현재 서울은 21도입니다.")],
    ]
}

#[tokio::test]
async fn streaming_draws_cursor_until_the_final_draw() {
    let agent = ScriptedAgent::replying(vec![
        vec![answer("안녕")],
        vec![answer("안녕하세요")],
        vec![answer("안녕하세요!")],
    ]);
    let mut chat = ChatFrontEnd::new(agent, RecordingView::default());

    let outcome = chat.submit("안녕?").await;

    assert!(outcome.is_success());
    assert_eq!(outcome.state, TurnState::Done);
    assert_eq!(outcome.fragments, 3);
    assert_eq!(outcome.text, "[ANSWER]\n안녕하세요!");

    let draws = &chat.view().draws;
    assert_eq!(draws.len(), 4);
    for draw in &draws[..3] {
        assert!(draw.ends_with(CURSOR_GLYPH));
    }
    assert_eq!(draws[3], "[ANSWER]\n안녕하세요!");
    assert_eq!(chat.view().ended, 1);
    // The user's message is visible before the first fragment arrives.
    assert_eq!(chat.view().renders, vec![1]);
}

#[tokio::test]
async fn successful_turn_records_one_user_and_one_assistant_entry() {
    let mut chat = ChatFrontEnd::new(ScriptedAgent::replying(weather_reply()), RecordingView::default());

    let outcome = chat.submit("서울 날씨 알려줘").await;

    let messages = chat.history().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], Message::user("서울 날씨 알려줘"));
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, outcome.text);
    assert!(outcome.text.starts_with("[TOOL_CALL] get_nowcast_observation"));
    assert!(outcome.text.ends_with("[ANSWER]\n현재 서울은 21도입니다."));
}

#[tokio::test]
async fn failed_turn_records_the_error_as_the_reply() {
    let agent = ScriptedAgent::failing_after(vec![vec![answer("부분")]], "connection reset");
    let mut chat = ChatFrontEnd::new(agent, RecordingView::default());

    let outcome = chat.submit("서울 날씨 알려줘").await;

    assert!(!outcome.is_success());
    assert_eq!(outcome.state, TurnState::Failed);
    assert_eq!(chat.state(), TurnState::Failed);
    assert_eq!(outcome.error.as_ref().map(|e| e.kind()), Some(ErrorKind::Transport));
    assert_eq!(outcome.text, "Error: connection reset");

    let messages = chat.history().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content, outcome.text);
    assert_eq!(chat.view().draws.last(), Some(&outcome.text));
}

#[tokio::test]
async fn error_before_any_fragment_still_completes_the_turn() {
    let agent = ScriptedAgent::failing_after(Vec::new(), "HTTP error! status: 500");
    let mut chat = ChatFrontEnd::new(agent, RecordingView::default());

    let outcome = chat.submit("hello").await;

    assert_eq!(outcome.fragments, 0);
    assert_eq!(chat.history().count_role(Role::User), 1);
    assert_eq!(chat.history().count_role(Role::Assistant), 1);
    assert_eq!(chat.view().draws.len(), 1);
}

#[tokio::test]
async fn full_transcript_keeps_tool_traffic() {
    let mut chat = ChatFrontEnd::new(ScriptedAgent::replying(weather_reply()), RecordingView::default())
        .with_policy(TranscriptPolicy::FullTranscript);

    let outcome = chat.submit("서울 날씨 알려줘").await;

    let roles: Vec<Role> = chat.history().messages().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::User, Role::Assistant, Role::Tool, Role::Assistant, Role::Assistant]
    );
    assert_eq!(chat.history().messages()[4].content, outcome.text);
}

#[tokio::test]
async fn new_chat_clears_history_and_renders_nothing() {
    let mut chat = ChatFrontEnd::new(
        ScriptedAgent::replying(vec![vec![answer("네")]]),
        RecordingView::default(),
    );
    chat.submit("첫 질문").await;
    chat.submit("두 번째 질문").await;
    assert_eq!(chat.history().len(), 4);

    chat.new_chat();

    assert!(chat.history().is_empty());
    assert_eq!(chat.state(), TurnState::Idle);
    assert_eq!(chat.view().renders.last(), Some(&0));
}
