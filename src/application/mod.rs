//! # Application Layer
//!
//! Contains the decision logic of the bot and its orchestration:
//! the rule engine, the ignore list, the action dispatcher and the per-post listener.

pub mod dispatcher;
pub mod engine;
pub mod ignore;
pub mod listener;
pub mod logging;
