//! Response construction shared by every handler.
//!
//! # Responsibilities
//! - Attach CORS headers echoing the caller's origin
//! - Attach hardening headers on admin routes
//! - Render JSON bodies and `{"error": ...}` envelopes
//! - Answer pre-flight and wrong-method requests per route

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::MethodRouter,
    Json,
};
use serde::Serialize;

use crate::security::headers::{build_security_headers, request_origin, CorsPolicy};

/// Builder for the responses of one request.
#[derive(Debug, Clone)]
pub struct Reply {
    origin: String,
    cors: CorsPolicy,
    secure: bool,
}

impl Reply {
    /// Reply for a public route: CORS headers only.
    pub fn public(request_headers: &HeaderMap, cors: CorsPolicy) -> Self {
        Self {
            origin: request_origin(request_headers),
            cors,
            secure: false,
        }
    }

    /// Reply for an admin route: CORS plus hardening headers.
    pub fn admin(request_headers: &HeaderMap, cors: CorsPolicy) -> Self {
        Self {
            secure: true,
            ..Self::public(request_headers, cors)
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = self.cors.headers(&self.origin);
        if self.secure {
            headers.extend(build_security_headers());
        }
        headers
    }

    pub fn json<T: Serialize>(&self, status: StatusCode, body: &T) -> Response {
        (status, self.headers(), Json(body)).into_response()
    }

    pub fn error(&self, status: StatusCode, message: impl Into<String>) -> Response {
        self.json(status, &ErrorBody { error: message.into() })
    }

    pub fn empty(&self, status: StatusCode) -> Response {
        (status, self.headers()).into_response()
    }

    pub fn text(&self, status: StatusCode, body: &'static str) -> Response {
        (status, self.headers(), body).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Add the pre-flight (204) and wrong-method (405 JSON) answers to a route.
///
/// HEAD is answered as a wrong method too; axum would otherwise run the
/// GET handler for it.
pub fn with_cors<S>(route: MethodRouter<S>, cors: CorsPolicy, secure: bool) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    let reply = move |headers: &HeaderMap| {
        if secure {
            Reply::admin(headers, cors)
        } else {
            Reply::public(headers, cors)
        }
    };

    route
        .options(move |headers: HeaderMap| async move {
            reply(&headers).empty(StatusCode::NO_CONTENT)
        })
        .head(move |headers: HeaderMap| async move {
            reply(&headers).error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
        })
        .fallback(move |headers: HeaderMap| async move {
            reply(&headers).error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
        })
}
