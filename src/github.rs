use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const REPOS_PER_PAGE: u32 = 100;
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// A repository as returned by `GET /users/{username}/repos`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub stargazers_count: Option<u64>,
}

/// Profile from `GET /users/{username}`. Fetched alongside the repo list but
/// not part of the aggregation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserProfile {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub public_repos: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DataFetchError {
    #[error("GitHub user {username:?} not found")]
    NotFound { username: String },

    #[error("GitHub API rate limit exceeded")]
    RateLimited,

    #[error("network error talking to GitHub: {0}")]
    Network(String),

    #[error("unexpected GitHub response: {0}")]
    Unknown(String),
}

impl DataFetchError {
    /// Text shown to the person who submitted the username.
    pub fn user_message(&self) -> String {
        match self {
            DataFetchError::NotFound { username } => {
                format!("No GitHub user named \"{username}\". Please check the username and try again.")
            }
            DataFetchError::RateLimited => {
                "GitHub is rate limiting requests right now. Please wait a bit and try again."
                    .to_string()
            }
            DataFetchError::Network(_) => {
                "Could not reach GitHub. Check your connection and try again.".to_string()
            }
            DataFetchError::Unknown(_) => {
                "Failed to fetch GitHub data. Please check the username and try again."
                    .to_string()
            }
        }
    }
}

/// Read access to a user's repositories and profile.
#[async_trait]
pub trait RepoSource: Send + Sync {
    /// Up to 100 repositories owned by `username`, most recently updated first.
    async fn list_repos(&self, username: &str) -> Result<Vec<Repository>, DataFetchError>;

    async fn user_profile(&self, username: &str) -> Result<UserProfile, DataFetchError>;
}

#[derive(Clone)]
pub struct GithubClient {
    base_url: Arc<String>,
    http: Arc<Client>,
}

impl GithubClient {
    /// Create an unauthenticated REST client rooted at `base_url`.
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("github-wrapped/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let http = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            base_url: Arc::new(base_url.trim_end_matches('/').to_string()),
            http: Arc::new(http),
        })
    }

    fn repos_url(&self, username: &str) -> String {
        format!(
            "{}/users/{}/repos?per_page={REPOS_PER_PAGE}&sort=updated",
            self.base_url,
            urlencoding::encode(username)
        )
    }

    fn user_url(&self, username: &str) -> String {
        format!("{}/users/{}", self.base_url, urlencoding::encode(username))
    }

    /// Single GET with status classification. No retries.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        username: &str,
    ) -> Result<T, DataFetchError> {
        tracing::debug!(%url, "GET");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| DataFetchError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let remaining = resp
                .headers()
                .get(RATE_LIMIT_REMAINING)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(classify_status(status, remaining, username));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| DataFetchError::Network(e.to_string()))?;

        serde_json::from_slice(&body)
            .map_err(|e| DataFetchError::Unknown(format!("malformed response from {url}: {e}")))
    }
}

#[async_trait]
impl RepoSource for GithubClient {
    async fn list_repos(&self, username: &str) -> Result<Vec<Repository>, DataFetchError> {
        self.get_json(&self.repos_url(username), username).await
    }

    async fn user_profile(&self, username: &str) -> Result<UserProfile, DataFetchError> {
        self.get_json(&self.user_url(username), username).await
    }
}

/// Map a non-success status to an error variant.
fn classify_status(
    status: StatusCode,
    rate_limit_remaining: Option<u64>,
    username: &str,
) -> DataFetchError {
    match status {
        StatusCode::NOT_FOUND => DataFetchError::NotFound {
            username: username.to_string(),
        },
        StatusCode::TOO_MANY_REQUESTS => DataFetchError::RateLimited,
        StatusCode::FORBIDDEN if rate_limit_remaining == Some(0) => DataFetchError::RateLimited,
        other => DataFetchError::Unknown(format!("GitHub API returned HTTP {}", other.as_u16())),
    }
}
