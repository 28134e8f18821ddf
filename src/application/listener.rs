//! # Retweet Listener
//!
//! The per-post handler. The stream loop calls `on_post` once for every incoming post,
//! in arrival order; the listener owns the ignore list and runs engine and dispatcher back to back.

use crate::application::dispatcher::ActionDispatcher;
use crate::application::engine::RuleEngine;
use crate::application::ignore::IgnoreStore;
use crate::domain::types::Post;
use crate::strings::logs;

pub struct RetweetListener {
    engine: RuleEngine,
    ignored: IgnoreStore,
    dispatcher: ActionDispatcher,
}

impl RetweetListener {
    pub fn new(engine: RuleEngine, ignored: IgnoreStore, dispatcher: ActionDispatcher) -> Self {
        tracing::debug!("Setting up RetweetListener...");
        let path = ignored.path().display().to_string();
        if ignored.is_empty() {
            tracing::info!("{}", logs::no_ignored_users(&path));
        } else {
            let users: Vec<&str> = ignored.iter().collect();
            tracing::info!("{}", logs::ignoring_users(&path, ignored.len(), &users));
        }
        Self {
            engine,
            ignored,
            dispatcher,
        }
    }

    #[cfg(test)]
    pub fn ignored(&self) -> &IgnoreStore {
        &self.ignored
    }

    pub async fn on_post(&mut self, post: Post) {
        tracing::debug!(id = %post.id, author = %post.author_id, "Received post: {:?}", post.text);

        let decision = self.engine.evaluate(&post, &self.ignored);
        tracing::debug!(id = %post.id, "Decision: {}", decision.rule);

        let delivery = self
            .dispatcher
            .dispatch(&post, decision, &mut self.ignored)
            .await;
        tracing::debug!(id = %post.id, ?delivery, "Dispatched");
    }
}
