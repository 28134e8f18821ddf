//! # Domain Traits
//!
//! Abstract interfaces for the collaborators of the rule pipeline (posting API, counters).
//! Allows for pluggable implementations in the Infrastructure layer and fakes in tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::types::{Counter, PostId};

/// Failure reported by the posting API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The post was already reposted, or the reply duplicates an earlier one.
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// Any other rejection by the remote service.
    #[error("rejected with status {status}: {detail}")]
    Rejected { status: u16, detail: String },

    /// The request never produced a usable response.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Abstract interface for the service the bot posts to (e.g., Twitter)
#[async_trait]
pub trait PostingApi: Send + Sync {
    /// Reply to a post, returning the id of the new post
    async fn reply(&self, text: &str, in_reply_to: &PostId) -> Result<PostId, ApiError>;

    /// Repost (retweet) a post as the bot
    async fn repost(&self, id: &PostId) -> Result<(), ApiError>;
}

/// Optional statistics store. Implementations swallow their own failures.
#[async_trait]
pub trait Counters: Send + Sync {
    async fn increment(&self, counter: Counter);
}
