//! Bearer-secret authorization for admin handlers.

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;

use crate::http::response::Reply;
use crate::http::server::AppState;
use crate::security::compare;

/// Token carried in `Authorization`, with a case-insensitive `Bearer`
/// prefix and the whitespace after it removed. A header without the
/// prefix is taken as the token itself.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;

    let token = match value.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("bearer") => {
            let rest = &value[6..];
            let stripped = rest.trim_start();
            if stripped.len() < rest.len() {
                stripped
            } else {
                value
            }
        }
        _ => value,
    };

    (!token.is_empty()).then_some(token)
}

/// Whether the request presents the configured admin secret.
pub fn is_authorized(headers: &HeaderMap, secret: &str) -> bool {
    let secret = (!secret.is_empty()).then_some(secret);
    compare(bearer_token(headers), secret)
}

/// Let the request through or produce the 401 reply.
///
/// The failure delay is applied by the admin gate once the attempt has
/// been counted.
pub fn require_admin(state: &AppState, headers: &HeaderMap, reply: &Reply) -> Result<(), Response> {
    if is_authorized(headers, &state.config.admin.secret) {
        return Ok(());
    }
    Err(reply.error(StatusCode::UNAUTHORIZED, "Unauthorized"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_auth(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_bearer_prefix_stripped() {
        assert_eq!(bearer_token(&with_auth("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&with_auth("bearer   abc")), Some("abc"));
        assert_eq!(bearer_token(&with_auth("BEARER\tabc")), Some("abc"));
    }

    #[test]
    fn test_token_without_prefix_used_verbatim() {
        assert_eq!(bearer_token(&with_auth("abc")), Some("abc"));
        assert_eq!(bearer_token(&with_auth("Bearerabc")), Some("Bearerabc"));
    }

    #[test]
    fn test_missing_or_empty_token() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&with_auth("")), None);
        assert_eq!(bearer_token(&with_auth("Bearer ")), None);
    }

    #[test]
    fn test_is_authorized() {
        assert!(is_authorized(&with_auth("Bearer s3cret"), "s3cret"));
        assert!(!is_authorized(&with_auth("Bearer s3cre"), "s3cret"));
        assert!(!is_authorized(&HeaderMap::new(), "s3cret"));
    }

    #[test]
    fn test_unconfigured_secret_denies_everyone() {
        assert!(!is_authorized(&with_auth("Bearer "), ""));
        assert!(!is_authorized(&with_auth("Bearer anything"), ""));
    }
}
