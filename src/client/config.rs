use std::env;
use std::fmt;

/// Where the client finds the API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
}

impl ClientConfig {
    const DEFAULT_BASE_URL: &'static str = "http://localhost:8000";

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(env::var("API_BASE_URL").unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string()))
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL)
    }
}

/// Credentials for one call, passed explicitly rather than read from global storage
#[derive(Clone, Default)]
pub struct AuthContext {
    token: Option<String>,
}

impl AuthContext {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Adds `Authorization: Bearer <token>` when a token is present
    pub(crate) fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
