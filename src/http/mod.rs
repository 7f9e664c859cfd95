//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, one task per request)
//!     → request.rs (request ID, capture metadata)
//!     → load balancer picks a backend
//!     → outbound call to the backend's base address
//!     → response.rs (map failures to 503/500)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{DownstreamRequest, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use response::{ProxyError, NO_SERVICE_BODY};
pub use server::{HttpServer, ServerError};
