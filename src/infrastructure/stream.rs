//! # Filtered Stream
//!
//! Connects to the Twitter API v2 filtered stream with the app-only token.
//! Keeps the server-side rules in sync with the tracked keywords and turns the
//! newline-delimited JSON body into `Post` values. Malformed payloads are skipped.

use async_stream::stream;
use bytes::BytesMut;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

use crate::domain::config::TwitterConfig;
use crate::domain::types::{Post, PostId};
use crate::strings::logs;

const RULE_TAG: &str = "vierzehn";
const STREAM_FIELDS: &str =
    "tweet.fields=author_id,source&expansions=author_id&user.fields=username";

/// The stream sends a blank line every 20 seconds; this long without any data means the
/// connection is gone.
pub const KEEP_ALIVE_TIMEOUT: Duration = Duration::from_secs(90);
/// Longest line accepted from the stream body.
const MAX_LINE_BYTES: usize = 1024 * 1024;

pub type PostStream = Pin<Box<dyn Stream<Item = Result<Post, StreamError>> + Send>>;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("stream endpoint answered {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("no line break within {0} bytes")]
    LineTooLong(usize),
}

/// A line that could not be turned into a `Post`.
#[derive(Debug, Error, PartialEq)]
pub enum MalformedPost {
    #[error("invalid JSON: {0}")]
    Json(String),
    #[error("payload has no data")]
    MissingData,
    #[error("no username for author {0}")]
    UnknownAuthor(String),
}

#[derive(Debug, Deserialize)]
struct StreamEnvelope {
    data: Option<TweetData>,
    #[serde(default)]
    includes: Includes,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
    text: String,
    author_id: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Includes {
    #[serde(default)]
    users: Vec<IncludedUser>,
}

#[derive(Debug, Deserialize)]
struct IncludedUser {
    id: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct RulesResponse {
    #[serde(default)]
    data: Vec<StreamRule>,
}

#[derive(Debug, Deserialize)]
struct StreamRule {
    id: String,
}

#[derive(Debug, Serialize, PartialEq)]
struct NewRule {
    value: String,
    tag: String,
}

#[derive(Debug, Serialize)]
struct AddRules {
    add: Vec<NewRule>,
}

#[derive(Debug, Serialize)]
struct DeleteRules {
    delete: DeleteIds,
}

#[derive(Debug, Serialize)]
struct DeleteIds {
    ids: Vec<String>,
}

pub struct FilteredStream {
    http: Client,
    api_base: String,
    bearer_token: String,
    /// Applies to the rule requests only
    request_timeout: Duration,
}

impl FilteredStream {
    pub fn new(config: &TwitterConfig) -> Result<Self, StreamError> {
        let request_timeout = Duration::from_secs(config.timeout_secs);
        // No overall timeout: the stream connection is meant to stay open.
        let http = Client::builder().connect_timeout(request_timeout).build()?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bearer_token: config.bearer_token.clone(),
            request_timeout,
        })
    }

    /// Replaces all server-side stream rules with one rule per tracked term.
    pub async fn sync_rules(&self, terms: &[String]) -> Result<(), StreamError> {
        let url = format!("{}/tweets/search/stream/rules", self.api_base);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .timeout(self.request_timeout)
            .send()
            .await?;
        let current: RulesResponse = check(response).await?.json().await?;

        if !current.data.is_empty() {
            let delete = DeleteRules {
                delete: DeleteIds {
                    ids: current.data.into_iter().map(|r| r.id).collect(),
                },
            };
            let response = self
                .http
                .post(&url)
                .bearer_auth(&self.bearer_token)
                .timeout(self.request_timeout)
                .json(&delete)
                .send()
                .await?;
            check(response).await?;
        }

        let add = AddRules {
            add: build_rules(terms),
        };
        if !add.add.is_empty() {
            let response = self
                .http
                .post(&url)
                .bearer_auth(&self.bearer_token)
                .timeout(self.request_timeout)
                .json(&add)
                .send()
                .await?;
            check(response).await?;
        }

        tracing::info!("{}", logs::stream_rules_synced(terms));
        Ok(())
    }

    /// Opens the stream. The returned stream ends when the connection closes;
    /// a transport error is yielded once and then the stream ends.
    pub async fn connect(&self) -> Result<PostStream, StreamError> {
        tracing::info!("{}", logs::STREAM_CONNECTING);
        let url = format!("{}/tweets/search/stream?{}", self.api_base, STREAM_FIELDS);
        let response = self.http.get(&url).bearer_auth(&self.bearer_token).send().await?;
        let mut body = check(response).await?.bytes_stream();

        Ok(Box::pin(stream! {
            let mut lines = LineBuffer::new(MAX_LINE_BYTES);
            while let Some(chunk) = body.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(StreamError::Http(e));
                        return;
                    }
                };
                lines.push(&chunk);

                while let Some(line) = lines.next_line() {
                    let line = String::from_utf8_lossy(&line);
                    let line = line.trim();
                    if line.is_empty() {
                        continue; // keep-alive
                    }
                    match parse_post(line) {
                        Ok(post) => yield Ok(post),
                        Err(e) => tracing::warn!("{}", logs::malformed_post(&e.to_string())),
                    }
                }
                if let Err(e) = lines.check_size() {
                    yield Err(e);
                    return;
                }
            }
            if lines.pending() > 0 {
                tracing::debug!("Discarding {} bytes of incomplete payload", lines.pending());
            }
        }))
    }
}

/// Splits a chunked body into newline-terminated lines.
/// Bytes already searched for a line break are not searched again.
struct LineBuffer {
    buffer: BytesMut,
    scanned: usize,
    max_line: usize,
}

impl LineBuffer {
    fn new(max_line: usize) -> Self {
        Self {
            buffer: BytesMut::new(),
            scanned: 0,
            max_line,
        }
    }

    fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Next complete line, without its terminating `\n`.
    fn next_line(&mut self) -> Option<BytesMut> {
        match self.buffer[self.scanned..].iter().position(|b| *b == b'\n') {
            Some(pos) => {
                let mut line = self.buffer.split_to(self.scanned + pos + 1);
                line.truncate(line.len() - 1);
                self.scanned = 0;
                Some(line)
            }
            None => {
                self.scanned = self.buffer.len();
                None
            }
        }
    }

    /// Fails once the unterminated tail is longer than a line may be.
    fn check_size(&self) -> Result<(), StreamError> {
        if self.buffer.len() > self.max_line {
            return Err(StreamError::LineTooLong(self.max_line));
        }
        Ok(())
    }

    fn pending(&self) -> usize {
        self.buffer.len()
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, StreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response.text().await.unwrap_or_default();
    Err(StreamError::Status {
        status: status.as_u16(),
        detail,
    })
}

/// One rule per term; multi-word terms are quoted so they match as a phrase.
fn build_rules(terms: &[String]) -> Vec<NewRule> {
    terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| {
            let value = if t.chars().any(char::is_whitespace) {
                format!("\"{}\"", t.replace('"', ""))
            } else {
                t.to_string()
            };
            NewRule {
                value,
                tag: RULE_TAG.to_string(),
            }
        })
        .collect()
}

/// Decodes one line of the stream body.
pub fn parse_post(line: &str) -> Result<Post, MalformedPost> {
    let envelope: StreamEnvelope =
        serde_json::from_str(line).map_err(|e| MalformedPost::Json(e.to_string()))?;
    let data = envelope.data.ok_or(MalformedPost::MissingData)?;
    let author_id = data.author_id.unwrap_or_default();
    let username = envelope
        .includes
        .users
        .into_iter()
        .find(|u| u.id == author_id)
        .map(|u| u.username)
        .ok_or(MalformedPost::UnknownAuthor(author_id))?;

    Ok(Post {
        id: PostId::new(data.id),
        author_id: username,
        text: data.text,
        source_app: data.source.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_post() {
        let line = r#"{"data":{"id":"1500","text":"ich bin vierzehn","author_id":"77","source":"Twitter for Android"},"includes":{"users":[{"id":"77","username":"alice","name":"Alice"}]},"matching_rules":[{"id":"1","tag":"vierzehn"}]}"#;
        let post = parse_post(line).unwrap();
        assert_eq!(post.id, PostId::new("1500"));
        assert_eq!(post.author_id, "alice");
        assert_eq!(post.text, "ich bin vierzehn");
        assert_eq!(post.source_app, "Twitter for Android");
    }

    #[test]
    fn test_parse_post_without_source() {
        let line = r#"{"data":{"id":"1","text":"hi","author_id":"77"},"includes":{"users":[{"id":"77","username":"alice"}]}}"#;
        assert_eq!(parse_post(line).unwrap().source_app, "");
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(parse_post("not json"), Err(MalformedPost::Json(_))));
        assert_eq!(
            parse_post(r#"{"errors":[{"title":"ConnectionException"}]}"#),
            Err(MalformedPost::MissingData)
        );
        assert_eq!(
            parse_post(r#"{"data":{"id":"1","text":"hi","author_id":"77"}}"#),
            Err(MalformedPost::UnknownAuthor("77".into()))
        );
        assert!(matches!(
            parse_post(r#"{"data":{"id":"1","author_id":"77"}}"#),
            Err(MalformedPost::Json(_))
        ));
    }

    #[test]
    fn test_lines_split_across_chunks() {
        let mut lines = LineBuffer::new(MAX_LINE_BYTES);
        lines.push(b"{\"a\":");
        assert_eq!(lines.next_line(), None);
        lines.push(b"1}\r\n\r\n{\"b\"");
        assert_eq!(lines.next_line().as_deref(), Some(&b"{\"a\":1}\r"[..]));
        assert_eq!(lines.next_line().as_deref(), Some(&b"\r"[..]));
        assert_eq!(lines.next_line(), None);
        assert_eq!(lines.pending(), 4);
        lines.push(b":2}\n");
        assert_eq!(lines.next_line().as_deref(), Some(&b"{\"b\":2}"[..]));
        assert_eq!(lines.pending(), 0);
    }

    #[test]
    fn test_unterminated_line_is_capped() {
        let mut lines = LineBuffer::new(8);
        lines.push(b"12345678");
        assert_eq!(lines.next_line(), None);
        assert!(lines.check_size().is_ok());
        lines.push(b"9");
        assert_eq!(lines.next_line(), None);
        assert!(matches!(lines.check_size(), Err(StreamError::LineTooLong(8))));
    }

    #[test]
    fn test_long_chunk_of_short_lines_is_fine() {
        let mut lines = LineBuffer::new(8);
        lines.push(b"a\nb\nc\nd\ne\nf\n");
        let mut count = 0;
        while lines.next_line().is_some() {
            count += 1;
        }
        assert_eq!(count, 6);
        assert!(lines.check_size().is_ok());
    }

    #[test]
    fn test_build_rules() {
        let terms = vec![
            "vierzehn".to_string(),
            "ich bin 14".to_string(),
            " ".to_string(),
            "@bot".to_string(),
        ];
        let rules = build_rules(&terms);
        let values: Vec<&str> = rules.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(values, vec!["vierzehn", "\"ich bin 14\"", "@bot"]);
        assert!(rules.iter().all(|r| r.tag == RULE_TAG));
    }
}
