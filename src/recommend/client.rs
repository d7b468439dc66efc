//! Outbound HTTP client for the recommendation engine.
//!
//! # Responsibilities
//! - Issue one GET per fetch against the configured engine endpoint
//! - Support both endpoint generations (path-segment and query-param)
//! - Normalize 404 and empty bodies to an empty record list
//!
//! Deadline enforcement lives above this client in the pipeline; only the
//! connect timeout is set here, on the connector.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::Url;

use crate::config::{EndpointStyle, EngineConfig};
use crate::recommend::{RecommendError, RecommendationRecord, RecommendationSource};

/// Upper bound on an engine response body. Recommendation lists are small;
/// anything larger is a misbehaving upstream.
const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// HTTP-backed [`RecommendationSource`].
pub struct HttpRecommendationClient {
    client: Client<HttpConnector, Body>,
    base_url: Url,
    endpoint_style: EndpointStyle,
}

impl HttpRecommendationClient {
    /// Build a client from engine configuration.
    ///
    /// The base URL is parsed here even though validation already checked
    /// it, so this constructor stands on its own.
    pub fn new(config: &EngineConfig) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(&config.base_url)?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            client,
            base_url,
            endpoint_style: config.endpoint_style,
        })
    }

    /// Render the request URL for `isbn` in the configured endpoint shape.
    fn request_url(&self, isbn: &str) -> Result<Url, RecommendError> {
        let mut url = self.base_url.clone();
        match self.endpoint_style {
            EndpointStyle::PathSegment => {
                url.path_segments_mut()
                    .map_err(|_| {
                        RecommendError::Upstream(format!(
                            "base URL cannot take path segments: {}",
                            self.base_url
                        ))
                    })?
                    .pop_if_empty()
                    .extend(["recommended-titles", "isbn", isbn]);
            }
            EndpointStyle::QueryParam => {
                url.path_segments_mut()
                    .map_err(|_| {
                        RecommendError::Upstream(format!(
                            "base URL cannot take path segments: {}",
                            self.base_url
                        ))
                    })?
                    .pop_if_empty()
                    .push("recommendations");
                url.query_pairs_mut().append_pair("isbn", isbn);
            }
        }
        Ok(url)
    }
}

impl RecommendationSource for HttpRecommendationClient {
    async fn fetch(&self, isbn: &str) -> Result<Vec<RecommendationRecord>, RecommendError> {
        let url = self.request_url(isbn)?;
        tracing::debug!(isbn, url = %url, "calling recommendation engine");

        let request = Request::builder()
            .method(Method::GET)
            .uri(url.as_str())
            .header("user-agent", "recommendation-service")
            .body(Body::empty())
            .map_err(|e| RecommendError::Upstream(format!("failed to build request: {}", e)))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| RecommendError::Upstream(format!("engine unreachable: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            // The engine knows nothing for this ISBN; an empty list, not an
            // error.
            tracing::debug!(isbn, "engine returned 404, treating as no recommendations");
            return Ok(Vec::new());
        }
        if !status.is_success() {
            tracing::warn!(isbn, status = %status, "engine returned error status");
            return Err(RecommendError::Upstream(format!(
                "engine returned {}",
                status
            )));
        }

        let bytes = axum::body::to_bytes(Body::new(response.into_body()), MAX_RESPONSE_BYTES)
            .await
            .map_err(|e| RecommendError::Upstream(format!("failed to read engine body: {}", e)))?;

        if bytes.is_empty() {
            return Ok(Vec::new());
        }

        let records: Vec<RecommendationRecord> = serde_json::from_slice(&bytes)
            .map_err(|e| RecommendError::Upstream(format!("malformed engine payload: {}", e)))?;

        tracing::debug!(isbn, count = records.len(), "engine responded");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(style: EndpointStyle) -> HttpRecommendationClient {
        HttpRecommendationClient::new(&EngineConfig {
            base_url: "http://recs.internal:9000".into(),
            endpoint_style: style,
            connect_secs: 1,
        })
        .unwrap()
    }

    #[test]
    fn path_segment_url_shape() {
        let url = client(EndpointStyle::PathSegment).request_url("978-1").unwrap();
        assert_eq!(
            url.as_str(),
            "http://recs.internal:9000/recommended-titles/isbn/978-1"
        );
    }

    #[test]
    fn query_param_url_shape() {
        let url = client(EndpointStyle::QueryParam).request_url("978-1").unwrap();
        assert_eq!(
            url.as_str(),
            "http://recs.internal:9000/recommendations?isbn=978-1"
        );
    }

    #[test]
    fn isbn_is_percent_encoded() {
        let url = client(EndpointStyle::PathSegment)
            .request_url("weird isbn")
            .unwrap();
        assert!(url.as_str().ends_with("/recommended-titles/isbn/weird%20isbn"));
    }

    #[test]
    fn base_path_is_preserved() {
        let client = HttpRecommendationClient::new(&EngineConfig {
            base_url: "http://recs.internal:9000/v2/".into(),
            endpoint_style: EndpointStyle::QueryParam,
            connect_secs: 1,
        })
        .unwrap();
        let url = client.request_url("111").unwrap();
        assert_eq!(
            url.as_str(),
            "http://recs.internal:9000/v2/recommendations?isbn=111"
        );
    }
}
