//! Book Recommendation Service
//!
//! A resilient "related books" microservice built with Tokio and Axum. It
//! fronts an external, flaky recommendation engine with a circuit breaker,
//! per-call deadline, and a fallback/enrichment pipeline, so callers always
//! get a list, an empty result, or a distinct failure status.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌────────────────────────────────────────────────────┐
//!                      │               RECOMMENDATION SERVICE                │
//!                      │                                                     │
//!   GET /books/{isbn}/ │  ┌─────────┐   ┌───────────────┐   ┌────────────┐  │
//!   related-books ─────┼─▶│  http   │──▶│   recommend   │──▶│ resilience │  │
//!                      │  │ server  │   │   pipeline    │   │  deadline  │  │
//!                      │  └─────────┘   └───────┬───────┘   └─────┬──────┘  │
//!                      │                        │                  │         │
//!                      │                ┌───────▼───────┐   ┌─────▼──────┐  │
//!                      │                │    catalog    │   │  circuit   │  │
//!                      │                │  (enrichment) │   │  breaker   │  │
//!                      │                └───────────────┘   └─────┬──────┘  │
//!                      │                                          │         │
//!                      │                                   ┌──────▼──────┐  │     External
//!                      │                                   │ recommend   │──┼──▶  recommendation
//!                      │                                   │ client      │  │     engine
//!                      │                                   └─────────────┘  │
//!                      │                                                     │
//!                      │  ┌───────────────────────────────────────────────┐ │
//!                      │  │            Cross-Cutting Concerns              │ │
//!                      │  │  ┌────────┐  ┌───────────────┐  ┌──────────┐  │ │
//!                      │  │  │ config │  │ observability │  │lifecycle │  │ │
//!                      │  │  └────────┘  └───────────────┘  └──────────┘  │ │
//!                      │  └───────────────────────────────────────────────┘ │
//!                      └────────────────────────────────────────────────────┘
//! ```
//!
//! Each layer can short-circuit the layers below it: a blank ISBN never
//! reaches the pipeline, an open breaker never reaches the client, and an
//! expired deadline abandons the in-flight call.

// Core subsystems
pub mod config;
pub mod http;
pub mod recommend;
pub mod resilience;

// Collaborators
pub mod catalog;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
