//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! Defines the structs for service credentials, word lists, reply phrases and system settings.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::paths;
use crate::domain::types::BotIdentity;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub services: ServicesConfig,
    pub words: WordLists,
    #[serde(default)]
    pub replies: Phrases,
    #[serde(default)]
    pub system: SystemConfig,
}

impl AppConfig {
    /// Reads and validates the config file. Every failure here is fatal at startup.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: AppConfig =
            serde_yaml::from_str(content).context("Failed to parse YAML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.services.twitter.bearer_token.trim().is_empty() {
            bail!("services.twitter.bearer_token must not be empty");
        }
        if self.services.twitter.access_token.trim().is_empty() {
            bail!("services.twitter.access_token must not be empty");
        }
        if self.words.retweet_words.iter().all(|w| w.trim().is_empty()) {
            bail!("words.retweet_words needs at least one keyword");
        }
        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.system
            .data_dir
            .as_deref()
            .map(paths::expand_home)
            .unwrap_or_else(paths::default_data_dir)
    }

    pub fn ignore_path(&self) -> PathBuf {
        self.system
            .ignore_file
            .as_deref()
            .map(paths::expand_home)
            .unwrap_or_else(|| paths::ignore_path(&self.data_dir()))
    }
}

/// Configuration for the connected services.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub twitter: TwitterConfig,
    #[serde(default)]
    pub redis: Option<RedisConfig>,
}

/// Specific configuration for the Twitter API.
#[derive(Debug, Deserialize, Clone)]
pub struct TwitterConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// App-only token, used for the filtered stream
    pub bearer_token: String,
    /// User-context token, used for replies and retweets
    pub access_token: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.twitter.com/2".to_string()
}

fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    #[serde(default = "default_redis_host")]
    pub host: String,
    #[serde(default = "default_redis_port")]
    pub port: u16,
    #[serde(default)]
    pub db: i64,
}

impl RedisConfig {
    pub fn url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}

fn default_redis_host() -> String {
    "localhost".to_string()
}

fn default_redis_port() -> u16 {
    6379
}

/// Keyword configuration for the rule chain.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct WordLists {
    pub retweet_words: Vec<String>,
    #[serde(default)]
    pub forbidden_words: Vec<String>,
    /// Source apps whose posts are always ignored. `None` disables the check.
    #[serde(default)]
    pub forbidden_apps: Option<Vec<String>>,
}

impl WordLists {
    /// Keywords the stream should track: the retweet words plus,
    /// when mention reactions are on, the bot's mention token.
    pub fn track_terms(&self, identity: &BotIdentity, mention_reactions: bool) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        let mention = identity.mention();
        let extra = mention_reactions.then_some(&mention);
        for word in self.retweet_words.iter().chain(extra) {
            let word = word.trim();
            if word.is_empty() || terms.iter().any(|t| t.eq_ignore_ascii_case(word)) {
                continue;
            }
            terms.push(word.to_string());
        }
        terms
    }
}

/// Phrases the bot reacts to when mentioned, and the replies it sends.
#[derive(Debug, Deserialize, Clone)]
pub struct Phrases {
    #[serde(default = "default_true")]
    pub mention_reactions: bool,
    #[serde(default = "default_annoyed")]
    pub annoyed: Vec<String>,
    #[serde(default = "default_affection")]
    pub affection: Vec<String>,
    /// `{user}` is replaced with the author's handle
    #[serde(default = "default_annoyed_reply")]
    pub annoyed_reply: String,
    #[serde(default = "default_affection_reply")]
    pub affection_reply: String,
}

impl Default for Phrases {
    fn default() -> Self {
        Self {
            mention_reactions: true,
            annoyed: default_annoyed(),
            affection: default_affection(),
            annoyed_reply: default_annoyed_reply(),
            affection_reply: default_affection_reply(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_annoyed() -> Vec<String> {
    vec!["du nervst".to_string()]
}

fn default_affection() -> Vec<String> {
    vec!["liebe dich".to_string()]
}

fn default_annoyed_reply() -> String {
    crate::strings::messages::ANNOYED_REPLY.to_string()
}

fn default_affection_reply() -> String {
    crate::strings::messages::AFFECTION_REPLY.to_string()
}

/// System-level settings for the bot.
#[derive(Debug, Deserialize, Clone)]
pub struct SystemConfig {
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default)]
    pub ignore_file: Option<String>,
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,
    #[serde(default = "default_true")]
    pub log_file: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            ignore_file: None,
            reconnect_delay_secs: default_reconnect_delay(),
            log_file: true,
        }
    }
}

fn default_reconnect_delay() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
services:
  twitter:
    bearer_token: app
    access_token: user
words:
  retweet_words: [vierzehn]
"#;

    #[test]
    fn test_minimal_config_defaults() {
        let config = AppConfig::parse(MINIMAL).unwrap();
        assert_eq!(config.services.twitter.api_base, "https://api.twitter.com/2");
        assert_eq!(config.services.twitter.timeout_secs, 30);
        assert!(config.services.redis.is_none());
        assert!(config.words.forbidden_words.is_empty());
        assert!(config.words.forbidden_apps.is_none());
        assert!(config.replies.mention_reactions);
        assert_eq!(config.replies.annoyed, vec!["du nervst"]);
        assert_eq!(config.replies.affection, vec!["liebe dich"]);
        assert!(config.replies.annoyed_reply.contains("{user}"));
        assert_eq!(config.system.reconnect_delay_secs, 30);
        assert!(config.ignore_path().ends_with(".vierzehn/ignore.yaml"));
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
services:
  twitter:
    api_base: http://localhost:9000/2
    bearer_token: app
    access_token: user
    timeout_secs: 5
  redis:
    host: cache
    db: 2
words:
  retweet_words: [vierzehn, "ich bin 14"]
  forbidden_words: [spam, werbung]
  forbidden_apps: [SpamBot]
replies:
  mention_reactions: false
  annoyed: ["hau ab"]
  annoyed_reply: "Tschuess @{user}"
system:
  data_dir: /var/lib/vierzehn
  reconnect_delay_secs: 5
  log_file: false
"#;
        let config = AppConfig::parse(yaml).unwrap();
        let redis = config.services.redis.as_ref().unwrap();
        assert_eq!(redis.url(), "redis://cache:6379/2");
        assert_eq!(config.words.forbidden_apps, Some(vec!["SpamBot".to_string()]));
        assert_eq!(config.replies.annoyed, vec!["hau ab"]);
        assert_eq!(config.replies.affection, vec!["liebe dich"]);
        assert_eq!(
            config.ignore_path(),
            PathBuf::from("/var/lib/vierzehn/ignore.yaml")
        );
        assert!(!config.system.log_file);
    }

    #[test]
    fn test_example_config_parses() {
        let config = AppConfig::parse(include_str!("../../data/config.example.yaml")).unwrap();
        assert_eq!(config.words.retweet_words, vec!["vierzehn", "ich bin 14"]);
        assert_eq!(config.replies.annoyed.len(), 2);
    }

    #[test]
    fn test_missing_required_field_fails() {
        let yaml = r#"
services:
  twitter:
    bearer_token: app
words:
  retweet_words: [vierzehn]
"#;
        assert!(AppConfig::parse(yaml).is_err());
    }

    #[test]
    fn test_empty_retweet_words_fails() {
        let yaml = r#"
services:
  twitter:
    bearer_token: app
    access_token: user
words:
  retweet_words: []
"#;
        assert!(AppConfig::parse(yaml).is_err());
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(AppConfig::load(Path::new("/nonexistent/config.yaml")).is_err());
    }

    #[test]
    fn test_track_terms_adds_mention_once() {
        let words = WordLists {
            retweet_words: vec!["vierzehn".into(), "Vierzehn".into(), "@bot".into()],
            ..Default::default()
        };
        let me = BotIdentity::new("bot", "1");
        assert_eq!(words.track_terms(&me, true), vec!["vierzehn", "@bot"]);
        let words = WordLists {
            retweet_words: vec!["vierzehn".into()],
            ..Default::default()
        };
        assert_eq!(words.track_terms(&me, true), vec!["vierzehn", "@bot"]);
        assert_eq!(words.track_terms(&me, false), vec!["vierzehn"]);
    }
}
