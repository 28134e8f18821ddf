//! # Domain Layer
//!
//! Core definitions, types, and traits that define the business domain of the bot.
//! Independent of specific services, serving as the contract for the other layers.

pub mod config;
pub mod paths;
pub mod traits;
pub mod types;
