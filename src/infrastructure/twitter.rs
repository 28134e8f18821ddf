//! # Twitter Posting Client
//!
//! Implements the `PostingApi` trait against the Twitter API v2 using a user-context token.
//! Also resolves the bot's own identity at startup.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::config::TwitterConfig;
use crate::domain::traits::{ApiError, PostingApi};
use crate::domain::types::{BotIdentity, PostId};

#[derive(Debug, Serialize)]
struct CreateTweetRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<ReplySettings<'a>>,
}

#[derive(Debug, Serialize)]
struct ReplySettings<'a> {
    in_reply_to_tweet_id: &'a str,
}

#[derive(Debug, Serialize)]
struct RetweetRequest<'a> {
    tweet_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct CreatedTweet {
    id: String,
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
    username: String,
}

#[derive(Clone)]
pub struct TwitterClient {
    http: Client,
    api_base: String,
    access_token: String,
    /// Numeric id of the bot account, required by the retweet endpoint
    user_id: String,
}

impl TwitterClient {
    pub fn new(config: &TwitterConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            user_id: String::new(),
        })
    }

    /// Looks up the account behind the access token.
    pub async fn verify_credentials(&self) -> Result<BotIdentity, ApiError> {
        let url = format!("{}/users/me", self.api_base);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let user: Envelope<UserData> = decode(response).await?;
        Ok(BotIdentity::new(user.data.username, user.data.id))
    }

    /// Binds the client to the bot account. Retweets are posted on behalf of `identity`.
    pub fn acting_as(self, identity: &BotIdentity) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            ..self
        }
    }

    fn retweets_url(&self) -> String {
        format!("{}/users/{}/retweets", self.api_base, self.user_id)
    }
}

#[async_trait]
impl PostingApi for TwitterClient {
    async fn reply(&self, text: &str, in_reply_to: &PostId) -> Result<PostId, ApiError> {
        let url = format!("{}/tweets", self.api_base);
        let body = CreateTweetRequest {
            text,
            reply: Some(ReplySettings {
                in_reply_to_tweet_id: in_reply_to.as_str(),
            }),
        };
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let created: Envelope<CreatedTweet> = decode(response).await?;
        Ok(PostId::new(created.data.id))
    }

    async fn repost(&self, id: &PostId) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.retweets_url())
            .bearer_auth(&self.access_token)
            .json(&RetweetRequest {
                tweet_id: id.as_str(),
            })
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(classify(status, detail));
        }
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(classify(status, detail));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Transport(format!("Failed to decode response: {e}")))
}

/// Maps an unsuccessful HTTP response onto an `ApiError`.
pub(crate) fn classify(status: StatusCode, detail: String) -> ApiError {
    let lower = detail.to_lowercase();
    let duplicate = matches!(status, StatusCode::FORBIDDEN | StatusCode::CONFLICT)
        && (lower.contains("duplicate") || lower.contains("already"));
    if duplicate {
        ApiError::Duplicate(detail)
    } else {
        ApiError::Rejected {
            status: status.as_u16(),
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_duplicates() {
        let err = classify(
            StatusCode::FORBIDDEN,
            r#"{"detail":"You are not allowed to create a Tweet with duplicate content."}"#.into(),
        );
        assert!(matches!(err, ApiError::Duplicate(_)));

        let err = classify(StatusCode::FORBIDDEN, "You have already retweeted this Tweet.".into());
        assert!(matches!(err, ApiError::Duplicate(_)));
    }

    #[test]
    fn test_classify_other_rejections() {
        let err = classify(StatusCode::TOO_MANY_REQUESTS, "Too Many Requests".into());
        assert!(matches!(err, ApiError::Rejected { status: 429, .. }));

        let err = classify(StatusCode::FORBIDDEN, "suspended".into());
        assert!(matches!(err, ApiError::Rejected { status: 403, .. }));
    }

    #[test]
    fn test_reply_body_shape() {
        let body = CreateTweetRequest {
            text: "Das ist wunderbar, @bob :)",
            reply: Some(ReplySettings {
                in_reply_to_tweet_id: "123",
            }),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["text"], "Das ist wunderbar, @bob :)");
        assert_eq!(json["reply"]["in_reply_to_tweet_id"], "123");
    }

    #[test]
    fn test_new_trims_api_base() {
        let config = TwitterConfig {
            api_base: "http://localhost:9000/2/".into(),
            bearer_token: "app".into(),
            access_token: "user".into(),
            timeout_secs: 5,
        };
        let client = TwitterClient::new(&config).unwrap();
        assert_eq!(client.api_base, "http://localhost:9000/2");
    }

    #[test]
    fn test_retweets_go_to_bot_account() {
        let config = TwitterConfig {
            api_base: "http://localhost:9000/2".into(),
            bearer_token: "app".into(),
            access_token: "user".into(),
            timeout_secs: 5,
        };
        let identity = BotIdentity::new("ichbinvierzehn", "1337");
        let client = TwitterClient::new(&config).unwrap().acting_as(&identity);
        assert_eq!(
            client.retweets_url(),
            "http://localhost:9000/2/users/1337/retweets"
        );
    }
}
