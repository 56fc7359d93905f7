//! Basic Auth middleware for dashboard routes.
//! Passes everything through when no credentials are configured.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Expected credentials, `None` when auth is disabled.
#[derive(Debug, Clone, Default)]
pub struct BasicAuth {
    credentials: Option<(String, String)>,
}

impl BasicAuth {
    pub fn new(credentials: Option<(String, String)>) -> Self {
        Self { credentials }
    }

    pub fn is_enabled(&self) -> bool {
        self.credentials.is_some()
    }

    /// Check an `Authorization` header value.
    pub fn accepts(&self, authorization: Option<&str>) -> bool {
        let Some((user, password)) = &self.credentials else {
            return true;
        };
        let Some((given_user, given_password)) = authorization.and_then(decode) else {
            return false;
        };
        // Both halves are always compared.
        let user_ok = constant_time_eq(given_user.as_bytes(), user.as_bytes());
        let password_ok = constant_time_eq(given_password.as_bytes(), password.as_bytes());
        user_ok & password_ok
    }
}

/// Byte comparison whose running time depends only on the input lengths.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let mut diff = a.len() ^ b.len();
    for i in 0..a.len().max(b.len()) {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        diff |= usize::from(x ^ y);
    }
    diff == 0
}

fn decode(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

pub async fn basic_auth_middleware(
    State(auth): State<Arc<BasicAuth>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if auth.accepts(authorization) {
        return next.run(req).await;
    }

    tracing::warn!(path = %req.uri().path(), "Rejected dashboard request without valid credentials");
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, HeaderValue::from_static("Basic realm=\"mond\""))],
        "Unauthorized",
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_for(user: &str, password: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
    }

    #[test]
    fn test_disabled_accepts_everything() {
        let auth = BasicAuth::default();
        assert!(!auth.is_enabled());
        assert!(auth.accepts(None));
        assert!(auth.accepts(Some("Bearer token")));
    }

    #[test]
    fn test_checks_credentials() {
        let auth = BasicAuth::new(Some(("admin".into(), "s3:cret".into())));
        assert!(auth.accepts(Some(&header_for("admin", "s3:cret"))));
        assert!(!auth.accepts(Some(&header_for("admin", "wrong"))));
        assert!(!auth.accepts(Some(&header_for("root", "s3:cret"))));
        assert!(!auth.accepts(None));
        assert!(!auth.accepts(Some("Basic !!!not-base64")));
        assert!(!auth.accepts(Some("Bearer abc")));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(constant_time_eq(b"", b""));
        assert!(!constant_time_eq(b"secret", b"secreT"));
        assert!(!constant_time_eq(b"secret", b"secret\0"));
        assert!(!constant_time_eq(b"", b"x"));
    }
}
