pub mod agent;
pub mod api;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod mcp;
pub mod models;
pub mod probe;
pub mod ui;
