use colored::*;
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

use crate::chat::{render_snapshot, ChatView, CURSOR_GLYPH};
use crate::models::{Message, Role};

const DEFAULT_COLUMNS: usize = 80;

/// Terminal rows taken by `text` when wrapped at `columns`.
pub fn count_rows(text: &str, columns: usize) -> usize {
    let columns = columns.max(1);
    text.split('\n')
        .map(|line| UnicodeWidthStr::width(line).div_ceil(columns).max(1))
        .sum()
}

fn terminal_columns() -> usize {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| w as usize)
        .filter(|w| *w > 0)
        .unwrap_or(DEFAULT_COLUMNS)
}

/// Chat view on an ANSI terminal.
///
/// The reply placeholder is redrawn in place: when the new text extends what is
/// already on screen only the tail is written, otherwise the cursor moves back to
/// the start of the placeholder and the region is cleared first.
pub struct TerminalView<W: Write> {
    out: W,
    header: Vec<String>,
    drawn: String,
    reply_open: bool,
    /// Fixed width; `None` asks the terminal.
    columns: Option<usize>,
}

impl TerminalView<io::Stdout> {
    pub fn stdout(header: Vec<String>) -> Self {
        Self::new(io::stdout(), header)
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, header: Vec<String>) -> Self {
        Self {
            out,
            header,
            drawn: String::new(),
            reply_open: false,
            columns: None,
        }
    }

    pub fn set_header(&mut self, header: Vec<String>) {
        self.header = header;
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn label(role: Role) -> ColoredString {
        match role {
            Role::User => "You".cyan().bold(),
            Role::Assistant => "Assistant".green().bold(),
            Role::Tool => "Tool".yellow().bold(),
            Role::System => "System".dimmed(),
        }
    }

    fn body(message: &Message) -> String {
        match message.role {
            Role::Tool => render_snapshot(std::slice::from_ref(message)),
            Role::Assistant if message.has_tool_calls() => render_snapshot(std::slice::from_ref(message)),
            _ => message.content.clone(),
        }
    }

    fn write_all(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    fn redraw(&mut self, text: &str) -> io::Result<()> {
        if !self.reply_open {
            writeln!(self.out, "{}", Self::label(Role::Assistant))?;
            self.reply_open = true;
            self.drawn.clear();
        }

        let columns = self.columns.unwrap_or_else(terminal_columns);
        let previous = self.drawn.strip_suffix(CURSOR_GLYPH).unwrap_or(&self.drawn);
        let has_glyph = previous.len() < self.drawn.len();
        // A glyph that wrapped onto its own row cannot be erased with a backspace.
        let glyph_wrapped =
            has_glyph && count_rows(&self.drawn, columns) > count_rows(previous, columns);
        let mut output = String::new();
        match text.strip_prefix(previous) {
            Some(tail) if !glyph_wrapped => {
                if has_glyph {
                    output.push_str("\x08\x1b[K");
                }
                output.push_str(tail);
            }
            _ => {
                let rows = count_rows(&self.drawn, columns);
                output.push('\r');
                if rows > 1 {
                    output.push_str(&format!("\x1b[{}A", rows - 1));
                }
                output.push_str("\x1b[J");
                output.push_str(text);
            }
        }

        self.drawn = text.to_string();
        self.write_all(&output)
    }
}

impl<W: Write> ChatView for TerminalView<W> {
    fn render_history(&mut self, messages: &[Message]) {
        let mut screen = String::from("\x1b[2J\x1b[H");
        for line in &self.header {
            screen.push_str(line);
            screen.push('\n');
        }
        screen.push('\n');
        for message in messages {
            screen.push_str(&format!("{}\n{}\n\n", Self::label(message.role), Self::body(message)));
        }
        self.reply_open = false;
        self.drawn.clear();
        let _ = self.write_all(&screen);
    }

    fn draw_reply(&mut self, text: &str) {
        let _ = self.redraw(text);
    }

    fn end_reply(&mut self) {
        if self.reply_open {
            let _ = self.write_all("\n\n");
        }
        self.reply_open = false;
        self.drawn.clear();
    }
}
