//! # Action Dispatcher
//!
//! Carries out a `Decision`: updates the ignore list, bumps counters and talks to the posting API.
//! Every failure is logged and dropped so the stream keeps flowing.

use std::sync::Arc;

use crate::application::ignore::IgnoreStore;
use crate::domain::traits::{ApiError, Counters, PostingApi};
use crate::domain::types::{Action, Decision, Post};
use crate::strings::logs;

/// What became of a decision's action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Nothing to send
    Suppressed,
    Sent,
    /// The API refused or failed; the error was logged
    Dropped,
}

pub struct ActionDispatcher {
    api: Arc<dyn PostingApi>,
    counters: Arc<dyn Counters>,
}

impl ActionDispatcher {
    pub fn new(api: Arc<dyn PostingApi>, counters: Arc<dyn Counters>) -> Self {
        Self { api, counters }
    }

    /// Carries out `decision` for `post`. The ignore list is persisted before any reply goes out.
    pub async fn dispatch(
        &self,
        post: &Post,
        decision: Decision,
        ignored: &mut IgnoreStore,
    ) -> Delivery {
        if let Some(author) = &decision.ignore_author
            && let Err(e) = ignored.add(author)
        {
            tracing::error!("{}", logs::ignore_persist_failed(author, &e.to_string()));
        }

        if let Some(counter) = decision.counter {
            self.counters.increment(counter).await;
        }

        match decision.action {
            Action::Suppress => Delivery::Suppressed,
            Action::Reply { text, in_reply_to } => {
                tracing::info!("{}", logs::replying(in_reply_to.as_str(), &text));
                match self.api.reply(&text, &in_reply_to).await {
                    Ok(_) => Delivery::Sent,
                    Err(e) => {
                        report(&e, logs::reply_dropped(in_reply_to.as_str(), &e.to_string()));
                        Delivery::Dropped
                    }
                }
            }
            Action::Repost(id) => match self.api.repost(&id).await {
                Ok(()) => {
                    tracing::info!("{}", logs::retweeting(&post.author_id, &post.text));
                    Delivery::Sent
                }
                Err(e) => {
                    report(&e, logs::repost_dropped(id.as_str(), &e.to_string()));
                    Delivery::Dropped
                }
            },
        }
    }
}

fn report(error: &ApiError, message: String) {
    match error {
        ApiError::Duplicate(_) => tracing::info!("{}", message),
        ApiError::Rejected { .. } | ApiError::Transport(_) => tracing::warn!("{}", message),
    }
}
