//! Error responses.
//!
//! # Responsibilities
//! - Map proxy failures to the status codes returned to the caller
//!
//! # Design Decisions
//! - No selectable backend is 503 with a fixed body
//! - Every other failure is 500 with the error text as body
//! - No retries: the first failure is the response

use axum::body::Bytes;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::load_balancer::PoolError;

pub const NO_SERVICE_BODY: &str = "no service available";

/// Failures while serving one proxied request.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("no service available")]
    NoActiveBackend,

    #[error("{0}")]
    Selection(PoolError),

    #[error("{0}")]
    Build(#[from] axum::http::Error),

    #[error("{0}")]
    Call(#[from] hyper_util::client::legacy::Error),

    #[error("{0}")]
    Read(#[from] axum::Error),
}

impl From<PoolError> for ProxyError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::NoActiveBackend => ProxyError::NoActiveBackend,
            other => ProxyError::Selection(other),
        }
    }
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::NoActiveBackend => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = match &self {
            ProxyError::NoActiveBackend => NO_SERVICE_BODY.to_string(),
            other => other.to_string(),
        };
        (self.status(), body).into_response()
    }
}

/// Content type of a relayed body, judged from its first bytes only.
///
/// Downstream headers are not relayed, so the type is sniffed: HTML and
/// XML documents by their opening tag, UTF-8 text without control bytes
/// as plain text, anything else as opaque bytes.
pub fn sniff_content_type(body: &[u8]) -> &'static str {
    let head = &body[..body.len().min(512)];
    let trimmed = match head.iter().position(|b| !b.is_ascii_whitespace()) {
        Some(start) => &head[start..],
        None => return "text/plain; charset=utf-8",
    };

    let starts_with = |prefix: &[u8]| {
        trimmed.len() >= prefix.len() && trimmed[..prefix.len()].eq_ignore_ascii_case(prefix)
    };
    if starts_with(b"<!doctype html") || starts_with(b"<html") {
        return "text/html; charset=utf-8";
    }
    if starts_with(b"<?xml") {
        return "text/xml; charset=utf-8";
    }

    // A cut inside a multi-byte sequence at the window edge is still text.
    let text = match std::str::from_utf8(head) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    };
    let binary = head
        .iter()
        .any(|&b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r' | 0x0c | 0x1b));
    if text && !binary {
        "text/plain; charset=utf-8"
    } else {
        "application/octet-stream"
    }
}

/// 200 response carrying the downstream body.
pub fn relay_body(body: Bytes) -> Response {
    let content_type = HeaderValue::from_static(sniff_content_type(&body));
    ([(header::CONTENT_TYPE, content_type)], body).into_response()
}
