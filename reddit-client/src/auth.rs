use oauth2::basic::{BasicClient, BasicErrorResponse, BasicTokenResponse};
use oauth2::{
    AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, RequestTokenError,
    ResourceOwnerPassword, ResourceOwnerUsername, TokenResponse, TokenUrl,
};
use persona_core::{CoreError, RedditApiError, RedditCredentials};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

const REDDIT_AUTH_URL: &str = "https://www.reddit.com/api/v1/authorize";
const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

// Reddit tokens live for an hour; used when the response omits expires_in.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);
// Refresh a little early so a request never starts with a token about to lapse.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: SystemTime,
    pub scope: Vec<String>,
}

impl RedditToken {
    pub fn is_expired(&self) -> bool {
        SystemTime::now() + EXPIRY_MARGIN >= self.expires_at
    }

    fn from_response(response: &BasicTokenResponse) -> Self {
        Self {
            access_token: response.access_token().secret().clone(),
            refresh_token: response
                .refresh_token()
                .map(|token| token.secret().clone()),
            expires_at: SystemTime::now()
                + response.expires_in().unwrap_or(DEFAULT_TOKEN_LIFETIME),
            scope: response
                .scopes()
                .map(|scopes| scopes.iter().map(|s| s.as_str().to_string()).collect())
                .unwrap_or_default(),
        }
    }
}

/// Which grant produced the current token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// Password grant on behalf of the configured account.
    Account,
    /// Client-credentials grant; read-only access to public data.
    ApplicationOnly,
}

pub struct RedditAuthenticator {
    oauth_client: BasicClient,
    http_client: Client,
    credentials: RedditCredentials,
}

impl RedditAuthenticator {
    pub fn new(credentials: RedditCredentials, http_client: Client) -> Result<Self, CoreError> {
        let auth_url =
            AuthUrl::new(REDDIT_AUTH_URL.to_string()).map_err(|e| CoreError::Internal {
                message: format!("Invalid authorization URL: {}", e),
            })?;
        let token_url =
            TokenUrl::new(REDDIT_TOKEN_URL.to_string()).map_err(|e| CoreError::Internal {
                message: format!("Invalid token URL: {}", e),
            })?;

        let oauth_client = BasicClient::new(
            ClientId::new(credentials.client_id.clone()),
            Some(ClientSecret::new(credentials.client_secret.clone())),
            auth_url,
            Some(token_url),
        );

        Ok(Self {
            oauth_client,
            http_client,
            credentials,
        })
    }

    /// Logs in with the account when one is configured, falling back to app-only
    /// access if the password grant is rejected.
    pub async fn authenticate(&self) -> Result<(RedditToken, AuthMode), CoreError> {
        if let (Some(username), Some(password)) =
            (&self.credentials.username, &self.credentials.password)
        {
            match self.password_grant(username, password).await {
                Ok(token) => {
                    info!("Successfully connected to Reddit API as u/{}", username);
                    return Ok((token, AuthMode::Account));
                }
                Err(e) => {
                    warn!("Failed to authenticate as u/{}: {}", username, e);
                    info!("Trying read-only mode...");
                }
            }
        }

        let token = self.client_credentials_grant().await?;
        info!("Connected to Reddit API in read-only mode");
        Ok((token, AuthMode::ApplicationOnly))
    }

    async fn password_grant(
        &self,
        username: &str,
        password: &str,
    ) -> Result<RedditToken, CoreError> {
        debug!("Requesting password-grant token for u/{}", username);
        let http_client = self.http_client.clone();
        let response = self
            .oauth_client
            .exchange_password(
                &ResourceOwnerUsername::new(username.to_string()),
                &ResourceOwnerPassword::new(password.to_string()),
            )
            .request_async(|request| send_token_request(http_client, request))
            .await
            .map_err(token_error)?;
        Ok(RedditToken::from_response(&response))
    }

    async fn client_credentials_grant(&self) -> Result<RedditToken, CoreError> {
        debug!("Requesting application-only token");
        let http_client = self.http_client.clone();
        let response = self
            .oauth_client
            .exchange_client_credentials()
            .request_async(|request| send_token_request(http_client, request))
            .await
            .map_err(token_error)?;
        Ok(RedditToken::from_response(&response))
    }
}

async fn send_token_request(
    http_client: Client,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let response = http_client
        .request(request.method, request.url.as_str())
        .headers(request.headers)
        .body(request.body)
        .send()
        .await?;

    let status_code = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}

fn token_error(error: RequestTokenError<reqwest::Error, BasicErrorResponse>) -> CoreError {
    match error {
        RequestTokenError::Request(e) if e.is_timeout() => {
            CoreError::RedditApi(RedditApiError::RequestTimeout)
        }
        RequestTokenError::Request(e) => CoreError::Network(e),
        RequestTokenError::ServerResponse(response) => {
            CoreError::RedditApi(RedditApiError::AuthenticationFailed {
                reason: response.error().to_string(),
            })
        }
        RequestTokenError::Parse(e, _) => CoreError::RedditApi(RedditApiError::InvalidResponse {
            details: format!("Failed to parse token response: {}", e),
        }),
        RequestTokenError::Other(reason) => {
            CoreError::RedditApi(RedditApiError::AuthenticationFailed { reason })
        }
    }
}
