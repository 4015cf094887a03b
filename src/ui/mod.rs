pub mod commands;
pub mod output;
pub mod terminal;

pub use commands::ReplCommand;
pub use output::{print_banner, print_help, print_server_status, print_tools_panel, status_header};
pub use terminal::{count_rows, TerminalView};
