//! Response security and CORS headers.
//!
//! # Responsibilities
//! - Build the hardening headers carried by every admin response
//! - Build per-route CORS headers echoing the caller's origin
//!
//! # Design Decisions
//! - One definition shared by the gate and every handler
//! - An origin that is not a valid header value degrades to `*`

use axum::http::{header, HeaderMap, HeaderValue};

/// Headers that forbid sniffing, framing and caching.
pub fn build_security_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers
}

/// Cross-origin policy for one route family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorsPolicy {
    pub allow_methods: &'static str,
    pub allow_headers: &'static str,
}

impl CorsPolicy {
    /// Public form endpoints.
    pub const PUBLIC_POST: CorsPolicy = CorsPolicy {
        allow_methods: "POST, OPTIONS",
        allow_headers: "Content-Type",
    };

    /// Read-only admin endpoints.
    pub const ADMIN_GET: CorsPolicy = CorsPolicy {
        allow_methods: "GET, OPTIONS",
        allow_headers: "Content-Type, Authorization",
    };

    /// Mutating admin endpoints.
    pub const ADMIN_POST: CorsPolicy = CorsPolicy {
        allow_methods: "POST, OPTIONS",
        allow_headers: "Content-Type, Authorization",
    };

    pub fn headers(&self, origin: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let origin = HeaderValue::from_str(origin).unwrap_or(HeaderValue::from_static("*"));
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(self.allow_headers),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(self.allow_methods),
        );
        headers
    }
}

/// The caller's `Origin`, or `*` when absent.
pub fn request_origin(headers: &HeaderMap) -> String {
    headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("*")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_headers() {
        let headers = build_security_headers();
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn test_cors_echoes_origin() {
        let headers = CorsPolicy::ADMIN_GET.headers("https://admin.example.com");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://admin.example.com"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Content-Type, Authorization"
        );
    }

    #[test]
    fn test_cors_invalid_origin_falls_back_to_wildcard() {
        let headers = CorsPolicy::PUBLIC_POST.headers("bad\norigin");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[test]
    fn test_request_origin_defaults_to_wildcard() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_origin(&headers), "*");

        headers.insert(header::ORIGIN, HeaderValue::from_static("https://site.example"));
        assert_eq!(request_origin(&headers), "https://site.example");
    }
}
