//! ideahub: guided idea-submission wizard and polling team chat for the
//! youth entrepreneurship platform.

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod log;
pub mod util;
pub mod wizard;

// Decoupled game loop architecture
pub mod actors;
pub mod app;
pub mod render;
pub mod tea;
pub mod ui;

pub use error::{Error, Result};
