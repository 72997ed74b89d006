use crate::error::ConfigError;
use tracing::debug;

pub const DEFAULT_OUTPUT_DIR: &str = "./personas";
pub const DEFAULT_MAX_POSTS: u32 = 100;
pub const DEFAULT_MAX_COMMENTS: u32 = 200;
pub const DEFAULT_USER_AGENT: &str = "PersonaGenerator/1.0";

/// Reddit app credentials. `username`/`password` are only needed for the
/// password grant; without them the client runs app-only.
#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl RedditCredentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &str| {
            non_empty(key).ok_or_else(|| ConfigError::MissingEnvironmentVariable {
                var_name: key.to_string(),
            })
        };

        let credentials = Self {
            client_id: required("REDDIT_CLIENT_ID")?,
            client_secret: required("REDDIT_CLIENT_SECRET")?,
            user_agent: non_empty("REDDIT_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            username: non_empty("REDDIT_USERNAME"),
            password: non_empty("REDDIT_PASSWORD"),
        };

        debug!(
            "Loaded Reddit credentials (user agent: {}, password grant: {})",
            credentials.user_agent,
            credentials.has_account_login()
        );
        Ok(credentials)
    }

    pub fn has_account_login(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeLimits {
    pub max_posts: u32,
    pub max_comments: u32,
}

impl Default for ScrapeLimits {
    fn default() -> Self {
        Self {
            max_posts: DEFAULT_MAX_POSTS,
            max_comments: DEFAULT_MAX_COMMENTS,
        }
    }
}
