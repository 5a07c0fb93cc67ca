pub mod commands;
pub mod config;
pub mod dates;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod query;
pub mod reminder;
pub mod storage;
pub mod tui;
