use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};

/// Shared-token authentication for the KiCad API.
///
/// When `token` is `None` the middleware is a transparent no-op.
#[derive(Clone, Default)]
pub struct TokenAuth {
    pub token: Option<String>,
}

impl TokenAuth {
    pub fn none() -> Self {
        Self { token: None }
    }

    /// Empty tokens disable authentication.
    pub fn with_token(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }
}

/// Extract the credential from `Authorization: Token <t>` (what KiCad sends)
/// or `Authorization: Bearer <t>`.
fn presented_token(req: &Request) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, credential) = value.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer") {
        Some(credential.trim())
    } else {
        None
    }
}

/// Axum middleware that rejects requests without the configured token.
pub async fn auth_middleware(
    State(auth): State<Arc<TokenAuth>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(ref token) = auth.token else {
        return next.run(req).await;
    };

    if presented_token(&req) == Some(token.as_str()) {
        return next.run(req).await;
    }

    tracing::warn!(path = %req.uri().path(), "rejected unauthenticated request");
    Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"error":"unauthorized"}"#))
        .expect("infallible: all header values are valid ASCII")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(auth: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/kicad-api/v1/");
        if let Some(a) = auth {
            builder = builder.header(header::AUTHORIZATION, a);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn token_scheme_is_accepted() {
        let req = request_with(Some("Token abc123"));
        assert_eq!(presented_token(&req), Some("abc123"));
    }

    #[test]
    fn bearer_scheme_is_accepted() {
        let req = request_with(Some("bearer abc123"));
        assert_eq!(presented_token(&req), Some("abc123"));
    }

    #[test]
    fn other_schemes_are_ignored() {
        assert_eq!(presented_token(&request_with(Some("Basic abc"))), None);
        assert_eq!(presented_token(&request_with(Some("abc"))), None);
        assert_eq!(presented_token(&request_with(None)), None);
    }

    #[test]
    fn blank_token_disables_auth() {
        assert!(TokenAuth::with_token(Some("  ".into())).token.is_none());
        assert_eq!(
            TokenAuth::with_token(Some("t".into())).token.as_deref(),
            Some("t")
        );
    }
}
