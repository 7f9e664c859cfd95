//! Request handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) and propagate it
//! - Capture the request metadata worth logging
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Only metadata is captured; the body and remaining headers are not
//!   forwarded to the backend

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, Request, Version};
use tower::Layer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestId, PropagateRequestIdLayer, RequestId, SetRequestId,
    SetRequestIdLayer,
};
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Sets `x-request-id` on the inbound request (keeping a caller supplied
/// one) and copies it onto the response.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = SetRequestId<PropagateRequestId<S>, MakeRequestUuid>;

    fn layer(&self, inner: S) -> Self::Service {
        let propagate = PropagateRequestIdLayer::new(X_REQUEST_ID).layer(inner);
        SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid).layer(propagate)
    }
}

/// Read the request ID set by [`RequestIdLayer`].
pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> &str {
        self.headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}

/// Metadata of an inbound request, kept for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownstreamRequest {
    pub method: Method,
    pub accept: String,
    pub user_agent: String,
    pub content_type: String,
    pub version: Version,
    pub host: String,
}

impl DownstreamRequest {
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let headers = request.headers();
        // HTTP/2 carries the host in the URI authority instead of a header.
        let host = match header_str(headers, header::HOST) {
            h if !h.is_empty() => h,
            _ => request
                .uri()
                .authority()
                .map(|a| a.to_string())
                .unwrap_or_default(),
        };

        Self {
            method: request.method().clone(),
            accept: header_str(headers, header::ACCEPT),
            user_agent: header_str(headers, header::USER_AGENT),
            content_type: header_str(headers, header::CONTENT_TYPE),
            version: request.version(),
            host,
        }
    }
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
