//! Client configuration.

use secrecy::{ExposeSecret, SecretString};

use crate::http::{HttpMethod, HttpRequest};

/// Production origin and version prefix of the Lunatask API.
pub const DEFAULT_BASE_URL: &str = "https://api.lunatask.app/v1";

/// Immutable settings shared by every request a client issues.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: String,
    access_token: SecretString,
}

impl ClientConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, access_token)
    }

    /// Point the client at another origin, such as a local mock server.
    pub fn with_base_url(base_url: &str, access_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: SecretString::new(access_token.into()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Value of the `Authorization` header.
    pub(crate) fn authorization(&self) -> String {
        format!("bearer {}", self.access_token.expose_secret())
    }

    /// Bodiless request to `path` carrying the bearer token.
    pub(crate) fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            url: self.url(path),
            query: Vec::new(),
            headers: vec![("Authorization".to_string(), self.authorization())],
            body: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_production_origin() {
        let config = ClientConfig::new("token");
        assert_eq!(config.base_url(), "https://api.lunatask.app/v1");
        assert_eq!(config.url("/ping"), "https://api.lunatask.app/v1/ping");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ClientConfig::with_base_url("http://localhost:3000/", "token");
        assert_eq!(config.url("/tasks"), "http://localhost:3000/tasks");
    }

    #[test]
    fn authorization_uses_bearer_scheme() {
        let config = ClientConfig::new("abc");
        assert_eq!(config.authorization(), "bearer abc");
    }

    #[test]
    fn request_carries_token_and_no_body() {
        let req = ClientConfig::new("abc").request(HttpMethod::Delete, "/tasks/1");
        assert_eq!(req.url, "https://api.lunatask.app/v1/tasks/1");
        assert_eq!(req.header("authorization"), Some("bearer abc"));
        assert!(req.body.is_none());
    }

    #[test]
    fn debug_hides_token() {
        let output = format!("{:?}", ClientConfig::new("very-secret"));
        assert!(!output.contains("very-secret"));
    }
}
