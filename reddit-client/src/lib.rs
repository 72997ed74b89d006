pub mod api;
pub mod auth;
pub mod rate_limiter;
pub mod retry;
pub mod scraper;

pub use api::RedditApiClient;
pub use auth::{AuthMode, RedditAuthenticator, RedditToken};
pub use scraper::RedditScraper;

use async_trait::async_trait;
use persona_core::utils::resolve_username;
use persona_core::{CoreError, UserRecord};

/// Anything that can produce a [`UserRecord`] for a username.
///
/// `Ok(None)` means the account is missing, private or suspended. That is an
/// expected outcome, not an error.
#[async_trait]
pub trait UserSource: Send + Sync {
    /// Turns one line of user input into the key passed to [`scrape_user`].
    /// By default that is a profile URL or bare username.
    ///
    /// [`scrape_user`]: UserSource::scrape_user
    fn resolve(&self, entry: &str) -> Result<String, CoreError> {
        resolve_username(entry)
    }

    async fn scrape_user(&self, username: &str) -> Result<Option<UserRecord>, CoreError>;
}
