//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (e.g., PostingApi, Counters).

pub mod counters;
pub mod stream;
pub mod twitter;
