//! Console shell: terminal rendering, stdin commands and settings around the core loop.
mod app;
mod cli;
mod console;
mod effects;
mod input;
mod settings;
mod ui;

pub use app::run_app;
