use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

/// Resolves a request to an opaque user identity, or rejects it.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Returns the user id for the request, or `None` when the request
    /// is unauthenticated.
    async fn resolve(&self, headers: &HeaderMap) -> Option<String>;
}

/// Bearer-token auth over a fixed token→user table configured at
/// startup.
#[derive(Debug, Default)]
pub struct StaticTokenAuth {
    tokens: HashMap<String, String>,
}

impl StaticTokenAuth {
    /// Creates an authenticator from a token→user map.
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }

    /// Parses a `token:user,token:user` spec, as read from the
    /// environment. Malformed entries are skipped.
    pub fn from_spec(spec: &str) -> Self {
        let tokens = spec
            .split(',')
            .filter_map(|entry| {
                let (token, user) = entry.trim().split_once(':')?;
                if token.is_empty() || user.is_empty() {
                    return None;
                }
                Some((token.to_string(), user.to_string()))
            })
            .collect();
        Self { tokens }
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuth {
    async fn resolve(&self, headers: &HeaderMap) -> Option<String> {
        let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
        let token = header.strip_prefix("Bearer ")?;
        self.tokens.get(token).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn resolves_known_token() {
        let auth = StaticTokenAuth::from_spec("s3cret:alice,other:bob");
        let user = auth.resolve(&headers_with_bearer("s3cret")).await;
        assert_eq!(user.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn rejects_unknown_token_and_missing_header() {
        let auth = StaticTokenAuth::from_spec("s3cret:alice");
        assert!(auth.resolve(&headers_with_bearer("wrong")).await.is_none());
        assert!(auth.resolve(&HeaderMap::new()).await.is_none());
    }

    #[test]
    fn spec_parsing_skips_malformed_entries() {
        let auth = StaticTokenAuth::from_spec("a:alice, bad , :x, b:bob");
        assert_eq!(auth.tokens.len(), 2);
    }
}
