use crate::api::{RedditApiClient, RedditListing, MAX_PAGE_SIZE};
use crate::auth::{AuthMode, RedditAuthenticator, RedditToken};
use crate::UserSource;
use async_trait::async_trait;
use persona_core::{
    Comment, CoreError, Post, RedditApiError, RedditCredentials, ScrapeLimits, UserRecord,
};
use std::future::Future;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Collects a user's profile, newest posts and newest comments through the
/// authenticated API.
pub struct RedditScraper {
    api: RedditApiClient,
    authenticator: RedditAuthenticator,
    token: Mutex<Option<RedditToken>>,
    limits: ScrapeLimits,
}

impl RedditScraper {
    pub fn new(credentials: RedditCredentials, limits: ScrapeLimits) -> Result<Self, CoreError> {
        let api = RedditApiClient::new(credentials.user_agent.clone())?;
        let authenticator = RedditAuthenticator::new(credentials, api.http_client().clone())?;

        Ok(Self {
            api,
            authenticator,
            token: Mutex::new(None),
            limits,
        })
    }

    /// Authenticates eagerly so bad credentials surface before any user is processed.
    pub async fn connect(&self) -> Result<AuthMode, CoreError> {
        let (token, mode) = self.authenticator.authenticate().await?;
        *self.token.lock().await = Some(token);
        Ok(mode)
    }

    async fn access_token(&self) -> Result<String, CoreError> {
        let mut token = self.token.lock().await;
        match token.as_ref() {
            Some(current) if !current.is_expired() => Ok(current.access_token.clone()),
            _ => {
                debug!("Access token missing or expired, re-authenticating");
                let (fresh, _) = self.authenticator.authenticate().await?;
                let access_token = fresh.access_token.clone();
                *token = Some(fresh);
                Ok(access_token)
            }
        }
    }

    async fn scrape_posts(&self, access_token: &str, username: &str) -> Vec<Post> {
        info!("Scraping posts for user: {}", username);
        let max_posts = self.limits.max_posts;
        collect_pages(username, "posts", max_posts, |limit, after| async move {
            self.api
                .get_user_submitted(access_token, username, limit, after.as_deref())
                .await
        })
        .await
    }

    async fn scrape_comments(&self, access_token: &str, username: &str) -> Vec<Comment> {
        info!("Scraping comments for user: {}", username);
        let max_comments = self.limits.max_comments;
        collect_pages(username, "comments", max_comments, |limit, after| async move {
            self.api
                .get_user_comments(access_token, username, limit, after.as_deref())
                .await
        })
        .await
    }
}

#[async_trait]
impl UserSource for RedditScraper {
    async fn scrape_user(&self, username: &str) -> Result<Option<UserRecord>, CoreError> {
        let access_token = self.access_token().await?;

        let about = match self.api.get_user_about(&access_token, username).await {
            Ok(about) => about,
            Err(CoreError::RedditApi(RedditApiError::NotFound { .. })) => {
                warn!("User not found: {}", username);
                return Ok(None);
            }
            Err(CoreError::RedditApi(RedditApiError::Forbidden { .. })) => {
                warn!("User profile is private or suspended: {}", username);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        if about.is_suspended {
            warn!("User profile is private or suspended: {}", username);
            return Ok(None);
        }

        info!("Scraping user: {}", username);
        let posts = self.scrape_posts(&access_token, username).await;
        let comments = self.scrape_comments(&access_token, username).await;
        info!(
            "Scraped {} posts and {} comments",
            posts.len(),
            comments.len()
        );

        Ok(Some(UserRecord {
            username: username.to_string(),
            created_utc: about.created_utc,
            link_karma: about.link_karma.max(0) as u64,
            comment_karma: about.comment_karma.max(0) as u64,
            posts,
            comments,
        }))
    }
}

/// Follows `after` cursors until `max_items` are collected or the listing runs dry.
/// A failed page ends collection but keeps what earlier pages returned.
pub(crate) async fn collect_pages<D, T, F, Fut>(
    username: &str,
    what: &str,
    max_items: u32,
    mut fetch_page: F,
) -> Vec<T>
where
    T: From<D>,
    F: FnMut(u32, Option<String>) -> Fut,
    Fut: Future<Output = Result<RedditListing<D>, CoreError>>,
{
    let max_items = max_items as usize;
    let mut items: Vec<T> = Vec::with_capacity(max_items.min(MAX_PAGE_SIZE as usize));
    let mut after: Option<String> = None;

    while items.len() < max_items {
        let remaining = (max_items - items.len()).min(MAX_PAGE_SIZE as usize) as u32;
        let listing = match fetch_page(remaining, after.take()).await {
            Ok(listing) => listing,
            Err(e) => {
                e.log_warn();
                warn!(
                    "Error scraping {} for {}; keeping {} collected so far",
                    what,
                    username,
                    items.len()
                );
                break;
            }
        };

        let next = listing.data.after.clone();
        let page = listing.into_items();
        if page.is_empty() {
            break;
        }
        items.extend(page.into_iter().map(T::from));

        match next {
            Some(cursor) => after = Some(cursor),
            None => break,
        }
    }

    items.truncate(max_items);
    debug!("Collected {} {} for {}", items.len(), what, username);
    items
}
