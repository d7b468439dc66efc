//! HTTP surface of the service.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → request.rs (x-request-id stamp)
//!     → server.rs (router, handler, status mapping)
//!     → recommend::pipeline (the actual work)
//! ```

pub mod request;
pub mod server;

pub use server::{AppState, HttpServer, ServicePipeline};
