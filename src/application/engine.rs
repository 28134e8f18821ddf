//! # Rule Engine
//!
//! Decides what to do with one incoming post. Rules are checked in a fixed order
//! and the first one that matches wins:
//!
//! 1. own post → suppress
//! 2. manual retweet (`RT` in the text) → suppress
//! 3. forbidden word → suppress, count `trigger`
//! 4. forbidden source app → suppress
//! 5. ignored author → suppress
//! 6. mention + opt-out phrase → ignore author, reply, count `annoyed`
//! 7. mention + affection phrase → reply, count `ily`
//! 8. bare mention → suppress
//! 9. otherwise → repost, count `rt`
//!
//! All keyword checks are case-insensitive substring matches.

use crate::application::ignore::IgnoreStore;
use crate::domain::config::{Phrases, WordLists};
use crate::domain::types::{Action, BotIdentity, Counter, Decision, Post, Rule};
use crate::strings::{logs, messages};

const MANUAL_RETWEET_TOKEN: &str = "rt";

pub struct RuleEngine {
    identity: BotIdentity,
    mention: String,
    words: WordLists,
    phrases: Phrases,
}

impl RuleEngine {
    pub fn new(identity: BotIdentity, words: WordLists, phrases: Phrases) -> Self {
        let mention = identity.mention().to_lowercase();
        Self {
            identity,
            mention,
            words,
            phrases,
        }
    }

    /// Runs the rule chain against `post`. Pure: side effects are described by the decision.
    pub fn evaluate(&self, post: &Post, ignored: &IgnoreStore) -> Decision {
        let text = post.text.to_lowercase();
        let author = post.author_id.as_str();

        if self.identity.is(author) {
            return Decision::suppress(Rule::OwnPost);
        }

        if text.contains(MANUAL_RETWEET_TOKEN) {
            return Decision::suppress(Rule::ManualRetweet);
        }

        if let Some(word) = first_match(&text, &self.words.forbidden_words) {
            tracing::info!("{}", logs::forbidden_word(word));
            return Decision::suppress(Rule::ForbiddenWord(word.to_string()))
                .with_counter(Counter::Trigger);
        }

        if let Some(apps) = &self.words.forbidden_apps
            && apps.iter().any(|app| *app == post.source_app)
        {
            tracing::info!("{}", logs::forbidden_app(&post.source_app));
            return Decision::suppress(Rule::ForbiddenApp(post.source_app.clone()));
        }

        if ignored.contains(author) {
            tracing::info!("{}", logs::ignored_author(author));
            return Decision::suppress(Rule::IgnoredAuthor);
        }

        let mentioned = text.contains(&self.mention);

        if mentioned && first_match(&text, &self.phrases.annoyed).is_some() {
            tracing::info!("{}", logs::wants_to_be_ignored(author));
            return Decision {
                rule: Rule::OptOut,
                action: Action::Reply {
                    text: messages::render_reply(&self.phrases.annoyed_reply, author),
                    in_reply_to: post.id.clone(),
                },
                counter: Some(Counter::Annoyed),
                ignore_author: Some(author.to_string()),
            };
        }

        if mentioned && first_match(&text, &self.phrases.affection).is_some() {
            tracing::info!("{}", logs::loves_the_bot(author));
            return Decision {
                rule: Rule::Affection,
                action: Action::Reply {
                    text: messages::render_reply(&self.phrases.affection_reply, author),
                    in_reply_to: post.id.clone(),
                },
                counter: Some(Counter::Ily),
                ignore_author: None,
            };
        }

        // Nobody gets a retweet just by mentioning the bot.
        if mentioned {
            return Decision::suppress(Rule::BareMention);
        }

        Decision {
            rule: Rule::Default,
            action: Action::Repost(post.id.clone()),
            counter: Some(Counter::Rt),
            ignore_author: None,
        }
    }
}

/// First entry of `words` contained in `text`. `text` must already be lowercase.
fn first_match<'a>(text: &str, words: &'a [String]) -> Option<&'a str> {
    words
        .iter()
        .map(String::as_str)
        .filter(|w| !w.is_empty())
        .find(|w| text.contains(&w.to_lowercase()))
}
