//! Integration test suite for ideahub.
//!
//! These tests drive the public API end to end: the chat session against a
//! scripted transport, and the wizard from empty form to submission payload.
//!
//! # Test Categories
//!
//! - `chat_polling`: poll timer lifecycle, sends, stale snapshot ordering
//! - `wizard_flow`: step validation, tags, navigation, submission
//!
//! # CI Compatibility
//!
//! No test talks to a real backend. Chat tests run on a paused tokio clock,
//! so multi-second poll intervals complete instantly.

mod fixtures;

mod chat_polling;
mod wizard_flow;
