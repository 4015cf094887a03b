mod frontend;
mod history;
mod typewriter;

pub use frontend::{ChatFrontEnd, ChatView, TranscriptPolicy, TurnOutcome, TurnState, CURSOR_GLYPH};
pub use history::History;
pub use typewriter::render_snapshot;
