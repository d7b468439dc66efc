//! Configuration validation.
//!
//! Serde handles syntactic checks; this module covers the semantic ones:
//! value ranges, parseable addresses and URLs, and internally consistent
//! breaker settings. All violations are returned, not just the first.

use std::collections::HashSet;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::ServiceConfig;

/// A single semantic violation, pointing at the offending field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

fn err(field: &'static str, message: impl Into<String>) -> ValidationError {
    ValidationError {
        field,
        message: message.into(),
    }
}

/// Validate a loaded configuration, collecting every violation.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(err(
            "listener.bind_address",
            format!("not a socket address: {:?}", config.listener.bind_address),
        ));
    }

    match Url::parse(&config.engine.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(err(
            "engine.base_url",
            format!("unsupported scheme: {:?}", url.scheme()),
        )),
        Err(e) => errors.push(err("engine.base_url", format!("invalid URL: {}", e))),
    }

    if config.engine.connect_secs == 0 {
        errors.push(err("engine.connect_secs", "must be nonzero"));
    }

    let breaker = &config.breaker;
    if breaker.name.is_empty() {
        errors.push(err("breaker.name", "must not be empty"));
    }
    if !(breaker.failure_rate_threshold > 0.0 && breaker.failure_rate_threshold <= 1.0) {
        errors.push(err(
            "breaker.failure_rate_threshold",
            format!(
                "must be within (0.0, 1.0], got {}",
                breaker.failure_rate_threshold
            ),
        ));
    }
    if breaker.window_size == 0 {
        errors.push(err("breaker.window_size", "must be nonzero"));
    }
    if breaker.min_calls == 0 {
        errors.push(err("breaker.min_calls", "must be nonzero"));
    } else if breaker.min_calls > breaker.window_size {
        errors.push(err(
            "breaker.min_calls",
            "must not exceed breaker.window_size",
        ));
    }
    if breaker.cooldown_ms == 0 {
        errors.push(err("breaker.cooldown_ms", "must be nonzero"));
    }
    if breaker.half_open_max_calls == 0 {
        errors.push(err("breaker.half_open_max_calls", "must be nonzero"));
    }

    if config.timeouts.call_ms == 0 {
        errors.push(err("timeouts.call_ms", "must be nonzero"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(err("timeouts.request_secs", "must be nonzero"));
    }

    let mut seen = HashSet::new();
    for book in &config.catalog.books {
        if book.isbn.trim().is_empty() {
            errors.push(err("catalog.books", "entry with empty isbn".to_string()));
        } else if !seen.insert(book.isbn.as_str()) {
            errors.push(err(
                "catalog.books",
                format!("duplicate isbn: {:?}", book.isbn),
            ));
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(err(
            "observability.metrics_address",
            format!(
                "not a socket address: {:?}",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
