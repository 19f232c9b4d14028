//! Bearer token authentication for the admin REST API.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::warn;

/// Authentication layer
#[derive(Clone)]
pub struct AuthLayer {
    token: Arc<str>,
}

impl AuthLayer {
    /// Require `Authorization: Bearer <token>`. An empty token rejects every request.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Arc::from(token.into()),
        }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            token: Arc::clone(&self.token),
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    token: Arc<str>,
}

impl<S> Service<Request<Body>> for AuthService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        if !has_valid_token(&req, &self.token) {
            warn!(
                method = %req.method(),
                path = %req.uri().path(),
                "[hub-gateway] Rejected request without a valid bearer token"
            );
            return Box::pin(async { Ok(StatusCode::UNAUTHORIZED.into_response()) });
        }

        let mut inner = self.inner.clone();
        Box::pin(async move { inner.call(req).await })
    }
}

fn has_valid_token<B>(req: &Request<B>, expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| constant_time_compare(token.trim(), expected))
}

/// Constant-time string comparison.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    use subtle::ConstantTimeEq;
    a.len() == b.len() && bool::from(a.as_bytes().ct_eq(b.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(authorization: Option<&str>) -> Request<()> {
        let mut builder = Request::builder().uri("/api/hub");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_bearer_token() {
        assert!(has_valid_token(&request(Some("Bearer s3cret")), "s3cret"));
        assert!(!has_valid_token(&request(Some("Bearer wrong")), "s3cret"));
        assert!(!has_valid_token(&request(Some("s3cret")), "s3cret"));
        assert!(!has_valid_token(&request(None), "s3cret"));
    }

    #[test]
    fn test_empty_token_rejects_everything() {
        assert!(!has_valid_token(&request(Some("Bearer ")), ""));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
