//! # Domain Types
//!
//! Common data structures and enums used across the rule pipeline:
//! incoming posts, the bot's identity, counters and the decisions the engine produces.

use std::fmt;

/// Remote identifier of a post, used for reply and repost targeting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostId(pub String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single incoming post, as delivered by the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    /// Author handle (screen name), without the leading `@`.
    pub author_id: String,
    pub text: String,
    /// Client the post was written with. Empty when the stream does not report it.
    pub source_app: String,
}

/// The account the bot is logged in as.
#[derive(Debug, Clone, PartialEq)]
pub struct BotIdentity {
    pub handle: String,
    pub user_id: String,
}

impl BotIdentity {
    pub fn new(handle: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            user_id: user_id.into(),
        }
    }

    /// The token other users write to address the bot, e.g. `@ichbinvierzehn`.
    pub fn mention(&self) -> String {
        format!("@{}", self.handle)
    }

    pub fn is(&self, handle: &str) -> bool {
        self.handle.eq_ignore_ascii_case(handle)
    }
}

/// Named counters kept in the counters store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    Trigger,
    Annoyed,
    Ily,
    Rt,
}

impl Counter {
    pub fn name(&self) -> &'static str {
        match self {
            Counter::Trigger => "trigger",
            Counter::Annoyed => "annoyed",
            Counter::Ily => "ily",
            Counter::Rt => "rt",
        }
    }

    /// Key under which the counter is stored, e.g. `bot:rt`.
    pub fn key(&self) -> String {
        format!("bot:{}", self.name())
    }
}

/// The external effect chosen for a post.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Suppress,
    Reply { text: String, in_reply_to: PostId },
    Repost(PostId),
}

/// Which rule of the chain produced a decision.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    OwnPost,
    ManualRetweet,
    ForbiddenWord(String),
    ForbiddenApp(String),
    IgnoredAuthor,
    OptOut,
    Affection,
    BareMention,
    Default,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::OwnPost => write!(f, "own post"),
            Rule::ManualRetweet => write!(f, "manual retweet"),
            Rule::ForbiddenWord(word) => write!(f, "forbidden word {word:?}"),
            Rule::ForbiddenApp(app) => write!(f, "forbidden app {app:?}"),
            Rule::IgnoredAuthor => write!(f, "ignored author"),
            Rule::OptOut => write!(f, "opt-out"),
            Rule::Affection => write!(f, "affection"),
            Rule::BareMention => write!(f, "bare mention"),
            Rule::Default => write!(f, "default"),
        }
    }
}

/// Output of one rule engine pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub rule: Rule,
    pub action: Action,
    pub counter: Option<Counter>,
    /// Author to add to the ignore list before the action runs.
    pub ignore_author: Option<String>,
}

impl Decision {
    pub fn suppress(rule: Rule) -> Self {
        Self {
            rule,
            action: Action::Suppress,
            counter: None,
            ignore_author: None,
        }
    }

    pub fn with_counter(mut self, counter: Counter) -> Self {
        self.counter = Some(counter);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_keys() {
        assert_eq!(Counter::Trigger.key(), "bot:trigger");
        assert_eq!(Counter::Annoyed.key(), "bot:annoyed");
        assert_eq!(Counter::Ily.key(), "bot:ily");
        assert_eq!(Counter::Rt.key(), "bot:rt");
    }

    #[test]
    fn test_identity_mention_and_match() {
        let me = BotIdentity::new("IchBinVierzehn", "14");
        assert_eq!(me.mention(), "@IchBinVierzehn");
        assert!(me.is("ichbinvierzehn"));
        assert!(!me.is("someone"));
    }
}
