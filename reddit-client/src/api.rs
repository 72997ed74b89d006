use crate::rate_limiter::{RateLimitConfig, RateLimiter};
use crate::retry::{RetryConfig, RetryExecutor};
use persona_core::{Comment, CoreError, Post, RedditApiError};
use reqwest::header::{HeaderValue, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const REDDIT_API_BASE: &str = "https://oauth.reddit.com";
const REDDIT_WEB_BASE: &str = "https://reddit.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Largest page Reddit serves for user listings.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub dist: Option<u32>,
}

impl<T> RedditListing<T> {
    pub fn into_items(self) -> Vec<T> {
        self.data.children.into_iter().map(|child| child.data).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

/// `/user/{name}/about`. Suspended accounts come back with little more than
/// `name` and `is_suspended`, so everything else defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditUserAbout {
    pub name: String,
    pub created_utc: f64,
    pub link_karma: i64,
    pub comment_karma: i64,
    pub is_suspended: bool,
    pub is_gold: bool,
    pub is_mod: bool,
    pub has_verified_email: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditSubmissionData {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub num_comments: u64,
    #[serde(default)]
    pub upvote_ratio: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditCommentData {
    pub id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub link_title: Option<String>,
    /// Fullname of the parent submission, e.g. `t3_abc123`.
    #[serde(default)]
    pub link_id: Option<String>,
}

impl From<RedditSubmissionData> for Post {
    fn from(data: RedditSubmissionData) -> Self {
        Self {
            url: format!("{}{}", REDDIT_WEB_BASE, data.permalink),
            id: data.id,
            title: data.title,
            selftext: data.selftext,
            subreddit: data.subreddit,
            score: data.score,
            created_utc: data.created_utc,
            num_comments: data.num_comments,
            upvote_ratio: data.upvote_ratio,
        }
    }
}

impl From<RedditCommentData> for Comment {
    fn from(data: RedditCommentData) -> Self {
        let submission_id = data
            .link_id
            .map(|link_id| link_id.strip_prefix("t3_").unwrap_or(&link_id).to_string());
        Self {
            permalink: format!("{}{}", REDDIT_WEB_BASE, data.permalink),
            id: data.id,
            body: data.body,
            subreddit: data.subreddit,
            score: data.score,
            created_utc: data.created_utc,
            submission_title: data.link_title,
            submission_id,
        }
    }
}

/// Maps a non-success status to the matching API error. `None` for 2xx.
pub fn status_error(
    status: StatusCode,
    endpoint: &str,
    retry_after: Option<&HeaderValue>,
) -> Option<CoreError> {
    if status.is_success() {
        return None;
    }

    let error = match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = retry_after
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<f64>().ok())
                .map(|secs| secs.ceil().max(0.0) as u64)
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            RedditApiError::RateLimitExceeded { retry_after }
        }
        StatusCode::UNAUTHORIZED => RedditApiError::InvalidToken,
        StatusCode::FORBIDDEN => RedditApiError::Forbidden {
            resource: endpoint.to_string(),
        },
        StatusCode::NOT_FOUND => RedditApiError::NotFound {
            resource: endpoint.to_string(),
        },
        status if status.is_server_error() => RedditApiError::ServerError {
            status_code: status.as_u16(),
        },
        status => RedditApiError::InvalidResponse {
            details: format!("Unexpected status {} for {}", status, endpoint),
        },
    };
    Some(CoreError::RedditApi(error))
}

#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    rate_limiter: Arc<RateLimiter>,
    retry: RetryExecutor,
}

impl RedditApiClient {
    pub fn new(user_agent: String) -> Result<Self, CoreError> {
        Self::with_config(user_agent, RateLimitConfig::reddit_oauth(), RetryConfig::reddit())
    }

    pub fn with_config(
        user_agent: String,
        rate_config: RateLimitConfig,
        retry_config: RetryConfig,
    ) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(&user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http_client,
            rate_limiter: Arc::new(RateLimiter::new(rate_config)),
            retry: RetryExecutor::new(retry_config),
        })
    }

    /// The underlying HTTP client, shared with the token exchange so both carry the
    /// same User-Agent.
    pub fn http_client(&self) -> &Client {
        &self.http_client
    }

    async fn make_request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        access_token: &str,
        query_params: &[(&str, String)],
    ) -> Result<T, CoreError> {
        let url = format!("{}{}", REDDIT_API_BASE, endpoint);

        let permit = self.rate_limiter.acquire_permit().await?;
        debug!(
            "Acquired rate limit permit for GET {} after {:?}",
            endpoint, permit.queue_wait_time
        );

        let mut request_builder = self
            .http_client
            .request(Method::GET, &url)
            .bearer_auth(access_token)
            .query(&[("raw_json", "1")]);
        if !query_params.is_empty() {
            request_builder = request_builder.query(query_params);
        }

        debug!("Making Reddit API request: GET {}", endpoint);
        let response = request_builder.send().await.map_err(|e| {
            error!("Network error for GET {}: {}", endpoint, e);
            if e.is_timeout() {
                CoreError::RedditApi(RedditApiError::RequestTimeout)
            } else {
                CoreError::Network(e)
            }
        })?;

        let status = response.status();
        if let Some(error) = status_error(status, endpoint, response.headers().get(RETRY_AFTER)) {
            warn!("Request failed with status {} for {}", status, endpoint);
            return Err(error);
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            error!("Failed to parse response from {}: {}", endpoint, e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse response from {}: {}", endpoint, e),
            })
        })
    }

    async fn get_with_retry<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        access_token: &str,
        query_params: &[(&str, String)],
    ) -> Result<T, CoreError> {
        self.retry
            .execute(endpoint, || {
                self.make_request(endpoint, access_token, query_params)
            })
            .await
    }

    pub async fn get_user_about(
        &self,
        access_token: &str,
        username: &str,
    ) -> Result<RedditUserAbout, CoreError> {
        let endpoint = format!("/user/{}/about", username);
        let about: RedditListingChild<RedditUserAbout> =
            self.get_with_retry(&endpoint, access_token, &[]).await?;

        debug!("Retrieved profile for u/{}", about.data.name);
        Ok(about.data)
    }

    pub async fn get_user_submitted(
        &self,
        access_token: &str,
        username: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<RedditListing<RedditSubmissionData>, CoreError> {
        let endpoint = format!("/user/{}/submitted", username);
        let listing: RedditListing<RedditSubmissionData> = self
            .get_with_retry(&endpoint, access_token, &listing_params(limit, after))
            .await?;

        info!(
            "Retrieved {} posts for u/{}",
            listing.data.children.len(),
            username
        );
        Ok(listing)
    }

    pub async fn get_user_comments(
        &self,
        access_token: &str,
        username: &str,
        limit: u32,
        after: Option<&str>,
    ) -> Result<RedditListing<RedditCommentData>, CoreError> {
        let endpoint = format!("/user/{}/comments", username);
        let listing: RedditListing<RedditCommentData> = self
            .get_with_retry(&endpoint, access_token, &listing_params(limit, after))
            .await?;

        info!(
            "Retrieved {} comments for u/{}",
            listing.data.children.len(),
            username
        );
        Ok(listing)
    }
}

fn listing_params(limit: u32, after: Option<&str>) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("sort", "new".to_string()),
        ("limit", limit.clamp(1, MAX_PAGE_SIZE).to_string()),
    ];
    if let Some(after) = after {
        params.push(("after", after.to_string()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBMITTED_PAGE: &str = r#"{
        "kind": "Listing",
        "data": {
            "after": "t3_def456",
            "dist": 2,
            "children": [
                {"kind": "t3", "data": {
                    "id": "abc123",
                    "title": "Rust borrow checker question",
                    "selftext": "How do I share this?",
                    "subreddit": "rust",
                    "score": 42,
                    "created_utc": 1640995200.0,
                    "permalink": "/r/rust/comments/abc123/rust_borrow_checker_question/",
                    "num_comments": 5,
                    "upvote_ratio": 0.93,
                    "over_18": false
                }},
                {"kind": "t3", "data": {
                    "id": "def456",
                    "title": "Link post",
                    "subreddit": "pics",
                    "permalink": "/r/pics/comments/def456/link_post/"
                }}
            ]
        }
    }"#;

    const COMMENTS_PAGE: &str = r#"{
        "kind": "Listing",
        "data": {
            "after": null,
            "children": [
                {"kind": "t1", "data": {
                    "id": "c1",
                    "body": "Try an Arc.",
                    "subreddit": "rust",
                    "score": 7,
                    "created_utc": 1640995300.0,
                    "permalink": "/r/rust/comments/abc123/rust_borrow_checker_question/c1/",
                    "link_title": "Rust borrow checker question",
                    "link_id": "t3_abc123"
                }}
            ]
        }
    }"#;

    #[test]
    fn test_api_client_creation() {
        let client = RedditApiClient::new("test-user-agent/1.0".to_string()).unwrap();
        let request = client
            .http_client()
            .get(format!("{}/user/spez/about", REDDIT_API_BASE))
            .build()
            .unwrap();
        assert_eq!(request.url().host_str(), Some("oauth.reddit.com"));
    }

    #[test]
    fn test_submission_listing_to_posts() {
        let listing: RedditListing<RedditSubmissionData> =
            serde_json::from_str(SUBMITTED_PAGE).unwrap();
        assert_eq!(listing.data.after.as_deref(), Some("t3_def456"));

        let posts: Vec<Post> = listing.into_items().into_iter().map(Post::from).collect();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, "abc123");
        assert_eq!(
            posts[0].url,
            "https://reddit.com/r/rust/comments/abc123/rust_borrow_checker_question/"
        );
        assert_eq!(posts[0].upvote_ratio, Some(0.93));
        assert_eq!(posts[1].selftext, "");
        assert_eq!(posts[1].score, 0);
    }

    #[test]
    fn test_comment_listing_to_comments() {
        let listing: RedditListing<RedditCommentData> =
            serde_json::from_str(COMMENTS_PAGE).unwrap();
        assert!(listing.data.after.is_none());

        let comment = Comment::from(listing.into_items().remove(0));
        assert_eq!(comment.submission_id.as_deref(), Some("abc123"));
        assert_eq!(
            comment.submission_title.as_deref(),
            Some("Rust borrow checker question")
        );
        assert!(comment.permalink.starts_with("https://reddit.com/r/rust/"));
    }

    #[test]
    fn test_suspended_about_parses() {
        let about: RedditListingChild<RedditUserAbout> =
            serde_json::from_str(r#"{"kind": "t2", "data": {"name": "gone", "is_suspended": true}}"#)
                .unwrap();
        assert!(about.data.is_suspended);
        assert_eq!(about.data.link_karma, 0);
    }

    #[test]
    fn test_status_mapping() {
        assert!(status_error(StatusCode::OK, "/user/a/about", None).is_none());

        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "/user/a/about", None),
            Some(CoreError::RedditApi(RedditApiError::NotFound { .. }))
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "/user/a/about", None),
            Some(CoreError::RedditApi(RedditApiError::Forbidden { .. }))
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, "/user/a/about", None),
            Some(CoreError::RedditApi(RedditApiError::ServerError { status_code: 502 }))
        ));

        let header = HeaderValue::from_static("7.2");
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "/x", Some(&header)),
            Some(CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after: 8 }))
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "/x", None),
            Some(CoreError::RedditApi(RedditApiError::RateLimitExceeded { retry_after: 60 }))
        ));
    }

    #[test]
    fn test_listing_params() {
        let params = listing_params(500, Some("t3_abc"));
        assert_eq!(
            params,
            vec![
                ("sort", "new".to_string()),
                ("limit", "100".to_string()),
                ("after", "t3_abc".to_string()),
            ]
        );
    }
}
