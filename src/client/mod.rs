//! Terminal chat client: conversation state, relay calls, and rendering.

pub mod app;
pub mod clipboard;
pub mod handlers;
pub mod markdown;
pub mod relay;
pub mod session;
pub mod ui;
