//! Generic Tower authentication middleware.
//!
//! `AuthLayer` and `AuthService` wrap any inner service with bearer-token
//! validation. Generic over `TokenValidator` — plug in any identity
//! provider. On success the resolved [`Principal`] lands in request
//! extensions, where handlers pick it up.
//!
//! With authentication disabled (development only) the principal comes
//! from the `x-username` header, defaulting to `dev`.

use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use axum::body::Body;
use axum::response::IntoResponse;
use biblio_core::config::AuthConfig;
use http::{Request, StatusCode};
use tower::{Layer, Service};

/// Header consulted for the principal when authentication is disabled.
const USERNAME_HEADER: &str = "x-username";

/// The authenticated requester, as seen by handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Username the discovery core resolves through its identity seam.
    pub username: String,
}

/// Token validation failures.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AuthError {
    /// The presented token is unknown or malformed.
    #[error("invalid token: {0}")]
    InvalidToken(String),
}

/// Seam to the token-validation backend.
#[async_trait]
pub trait TokenValidator: Send + Sync + 'static {
    /// Resolve a bearer token to a principal.
    async fn validate(&self, token: &str) -> Result<Principal, AuthError>;
}

/// Fixed token-to-username table. Backs tests and single-node deployments;
/// production wires a real identity service here.
#[derive(Default)]
pub struct StaticTokenValidator {
    tokens: HashMap<String, String>,
}

impl StaticTokenValidator {
    /// Empty table: every token is rejected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token for a username.
    pub fn with_token(mut self, token: impl Into<String>, username: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), username.into());
        self
    }
}

#[async_trait]
impl TokenValidator for StaticTokenValidator {
    async fn validate(&self, token: &str) -> Result<Principal, AuthError> {
        match self.tokens.get(token) {
            Some(username) => Ok(Principal {
                username: username.clone(),
            }),
            None => Err(AuthError::InvalidToken("unknown bearer token".to_string())),
        }
    }
}

/// Tower `Layer` that wraps services with token authentication.
pub struct AuthLayer<V: TokenValidator> {
    validator: Arc<V>,
    config: AuthConfig,
}

impl<V: TokenValidator> Clone for AuthLayer<V> {
    fn clone(&self) -> Self {
        Self {
            validator: self.validator.clone(),
            config: self.config.clone(),
        }
    }
}

impl<V: TokenValidator> AuthLayer<V> {
    /// Create a new auth layer with the given validator and config.
    pub fn new(validator: Arc<V>, config: AuthConfig) -> Self {
        Self { validator, config }
    }
}

impl<V: TokenValidator, S> Layer<S> for AuthLayer<V> {
    type Service = AuthService<V, S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            validator: self.validator.clone(),
            config: self.config.clone(),
        }
    }
}

/// Tower `Service` that validates tokens before forwarding requests.
pub struct AuthService<V: TokenValidator, S> {
    inner: S,
    validator: Arc<V>,
    config: AuthConfig,
}

impl<V: TokenValidator, S: Clone> Clone for AuthService<V, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            validator: self.validator.clone(),
            config: self.config.clone(),
        }
    }
}

impl<V, S> Service<Request<Body>> for AuthService<V, S>
where
    V: TokenValidator,
    S: Service<Request<Body>, Error = Infallible> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Future: Send,
{
    type Response = axum::response::Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let validator = self.validator.clone();
        let config = self.config.clone();

        Box::pin(async move {
            // Dev mode — principal from header, no token required.
            if !config.enabled {
                let principal = header_principal(&req);
                req.extensions_mut().insert(principal);
                let resp = inner
                    .call(req)
                    .await
                    .unwrap_or_else(|infallible| match infallible {});
                return Ok(resp.into_response());
            }

            let token = match extract_bearer_token(&req) {
                Some(t) => t.to_string(),
                None => return Ok(unauthorized_response("missing or invalid bearer token")),
            };

            match validator.validate(&token).await {
                Ok(principal) => {
                    req.extensions_mut().insert(principal);
                    let resp = inner
                        .call(req)
                        .await
                        .unwrap_or_else(|infallible| match infallible {});
                    Ok(resp.into_response())
                }
                Err(auth_err) => {
                    log::warn!("Authentication failed: {auth_err}");
                    Ok(unauthorized_response(&auth_err.to_string()))
                }
            }
        })
    }
}

/// Extract bearer token from the Authorization header.
fn extract_bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Principal for disabled-auth mode, from the username header.
fn header_principal(req: &Request<Body>) -> Principal {
    let username = req
        .headers()
        .get(USERNAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("dev");
    Principal {
        username: username.to_string(),
    }
}

/// Build a 401 Unauthorized response.
fn unauthorized_response(message: &str) -> axum::response::Response {
    let body = serde_json::json!({
        "error": {
            "category": "authentication",
            "message": message,
        }
    });

    (
        StatusCode::UNAUTHORIZED,
        [(http::header::CONTENT_TYPE, "application/json")],
        serde_json::to_string(&body).unwrap_or_default(),
    )
        .into_response()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tower::ServiceExt;

    fn enabled_config() -> AuthConfig {
        AuthConfig { enabled: true }
    }

    fn disabled_config() -> AuthConfig {
        AuthConfig { enabled: false }
    }

    fn validator() -> Arc<StaticTokenValidator> {
        Arc::new(StaticTokenValidator::new().with_token("valid-token", "alice"))
    }

    /// Mock inner service that captures the Principal.
    #[derive(Clone)]
    struct MockService {
        captured: Arc<Mutex<Option<Principal>>>,
    }

    impl MockService {
        fn new() -> Self {
            Self {
                captured: Arc::new(Mutex::new(None)),
            }
        }
    }

    impl Service<Request<Body>> for MockService {
        type Response = axum::response::Response;
        type Error = Infallible;
        type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: Request<Body>) -> Self::Future {
            let captured = self.captured.clone();
            Box::pin(async move {
                let principal = req.extensions().get::<Principal>().cloned();
                *captured.lock().unwrap() = principal;
                Ok((StatusCode::OK, "ok").into_response())
            })
        }
    }

    #[test]
    fn test_extract_bearer_token_valid() {
        let req = Request::builder()
            .header("Authorization", "Bearer my-token-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_bearer_token(&req), Some("my-token-123"));
    }

    #[test]
    fn test_extract_bearer_token_wrong_scheme() {
        let req = Request::builder()
            .header("Authorization", "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_bearer_token(&req), None);
    }

    #[tokio::test]
    async fn test_disabled_mode_uses_header_principal() {
        let mock = MockService::new();
        let captured = mock.captured.clone();
        let service = AuthLayer::new(validator(), disabled_config()).layer(mock);

        let req = Request::builder()
            .header(USERNAME_HEADER, "bob")
            .body(Body::empty())
            .unwrap();
        let resp = service.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            captured.lock().unwrap().as_ref().unwrap().username,
            "bob"
        );
    }

    #[tokio::test]
    async fn test_disabled_mode_defaults_to_dev() {
        let mock = MockService::new();
        let captured = mock.captured.clone();
        let service = AuthLayer::new(validator(), disabled_config()).layer(mock);

        let req = Request::builder().body(Body::empty()).unwrap();
        service.oneshot(req).await.unwrap();
        assert_eq!(
            captured.lock().unwrap().as_ref().unwrap().username,
            "dev"
        );
    }

    #[tokio::test]
    async fn test_missing_token_returns_401() {
        let service = AuthLayer::new(validator(), enabled_config()).layer(MockService::new());
        let req = Request::builder().body(Body::empty()).unwrap();
        let resp = service.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_token_returns_401() {
        let service = AuthLayer::new(validator(), enabled_config()).layer(MockService::new());
        let req = Request::builder()
            .header("Authorization", "Bearer bad-token")
            .body(Body::empty())
            .unwrap();
        let resp = service.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_injects_principal() {
        let mock = MockService::new();
        let captured = mock.captured.clone();
        let service = AuthLayer::new(validator(), enabled_config()).layer(mock);

        let req = Request::builder()
            .header("Authorization", "Bearer valid-token")
            .body(Body::empty())
            .unwrap();
        let resp = service.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            captured.lock().unwrap().as_ref().unwrap().username,
            "alice"
        );
    }
}
