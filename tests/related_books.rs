//! End-to-end tests for the related-books endpoint.
//!
//! Each test runs the real server against a programmable mock engine and
//! asserts the status mapping the BFFs depend on: 200 list, 204 empty,
//! 504 timeout, 503 open breaker.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use recommendation_service::catalog::InMemoryCatalog;
use recommendation_service::config::{CatalogSeed, EndpointStyle, ServiceConfig};
use recommendation_service::recommend::{HttpRecommendationClient, RecommendationPipeline};
use recommendation_service::resilience::BreakerRegistry;
use recommendation_service::{HttpServer, Shutdown};

mod common;

/// Boot the service wired against `engine_addr`, returning its address.
async fn start_service(engine_addr: SocketAddr, mut config: ServiceConfig) -> SocketAddr {
    config.engine.base_url = format!("http://{}", engine_addr);
    config.engine.endpoint_style = EndpointStyle::QueryParam;

    let registry = BreakerRegistry::new();
    let breaker = registry.get_or_create(&config.breaker);
    let client = HttpRecommendationClient::new(&config.engine).unwrap();
    let catalog = InMemoryCatalog::from_seed(&config.catalog.books);
    let pipeline = Arc::new(RecommendationPipeline::new(
        client,
        catalog,
        breaker,
        Duration::from_millis(config.timeouts.call_ms),
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(&config, pipeline);
    tokio::spawn(async move {
        // Keep the coordinator alive for the lifetime of the server task.
        let _shutdown = shutdown;
        let _ = server.run(listener, server_shutdown).await;
    });

    addr
}

fn config_with_catalog() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.catalog.books.push(CatalogSeed {
        isbn: "111".into(),
        title: "Foo".into(),
        author: "Bar".into(),
    });
    config
}

#[tokio::test]
async fn sparse_engine_record_is_enriched() {
    let engine = common::start_mock_engine(|| async {
        (200, r#"[{"isbn":"111","title":"","authors":"","publisher":"Acme"}]"#.to_string())
    })
    .await;
    let service = start_service(engine, config_with_catalog()).await;

    let res = common::test_client()
        .get(format!("http://{}/books/111/related-books", service))
        .send()
        .await
        .expect("service unreachable");

    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!([{"isbn": "111", "title": "Foo", "authors": "Bar"}])
    );
}

#[tokio::test]
async fn engine_404_maps_to_no_content() {
    let engine = common::start_mock_engine(|| async { (404, String::new()) }).await;
    let service = start_service(engine, ServiceConfig::default()).await;

    let res = common::test_client()
        .get(format!("http://{}/books/404-isbn/related-books", service))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 204);
}

#[tokio::test]
async fn empty_engine_list_maps_to_no_content() {
    let engine = common::start_mock_engine(|| async { (200, "[]".to_string()) }).await;
    let service = start_service(engine, ServiceConfig::default()).await;

    let res = common::test_client()
        .get(format!("http://{}/books/111/related-books", service))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 204);
}

#[tokio::test]
async fn slow_engine_maps_to_gateway_timeout() {
    let engine = common::start_mock_engine(|| async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        (200, "[]".to_string())
    })
    .await;

    let mut config = ServiceConfig::default();
    config.timeouts.call_ms = 100;
    let service = start_service(engine, config).await;

    let res = common::test_client()
        .get(format!("http://{}/books/111/related-books", service))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 504);
}

#[tokio::test]
async fn failing_engine_trips_breaker_to_service_unavailable() {
    let hits = Arc::new(AtomicU32::new(0));
    let engine_hits = hits.clone();
    let engine = common::start_mock_engine(move || {
        let hits = engine_hits.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            (500, String::new())
        }
    })
    .await;

    let mut config = ServiceConfig::default();
    config.breaker.window_size = 4;
    config.breaker.min_calls = 4;
    config.breaker.cooldown_ms = 60_000;
    let service = start_service(engine, config).await;

    let client = common::test_client();
    for _ in 0..4 {
        let res = client
            .get(format!("http://{}/books/111/related-books", service))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 500, "upstream failure surfaces as 500");
    }

    let tripped = hits.load(Ordering::SeqCst);
    assert_eq!(tripped, 4);

    for _ in 0..3 {
        let res = client
            .get(format!("http://{}/books/111/related-books", service))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 503, "open breaker fails fast");
    }
    assert_eq!(
        hits.load(Ordering::SeqCst),
        tripped,
        "open breaker must not hit the engine"
    );
}

#[tokio::test]
async fn breaker_recovers_through_half_open() {
    let failing = Arc::new(std::sync::atomic::AtomicBool::new(true));
    let engine_failing = failing.clone();
    let engine = common::start_mock_engine(move || {
        let failing = engine_failing.clone();
        async move {
            if failing.load(Ordering::SeqCst) {
                (500, String::new())
            } else {
                (200, "[]".to_string())
            }
        }
    })
    .await;

    let mut config = ServiceConfig::default();
    config.breaker.window_size = 2;
    config.breaker.min_calls = 2;
    config.breaker.cooldown_ms = 200;
    let service = start_service(engine, config).await;

    let client = common::test_client();
    for _ in 0..2 {
        client
            .get(format!("http://{}/books/111/related-books", service))
            .send()
            .await
            .unwrap();
    }
    let res = client
        .get(format!("http://{}/books/111/related-books", service))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 503, "breaker opened after threshold");

    // Engine recovers; after the cooldown the trial call closes the breaker.
    failing.store(false, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(250)).await;

    let res = client
        .get(format!("http://{}/books/111/related-books", service))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204, "trial call passed through and succeeded");

    let res = client
        .get(format!("http://{}/books/111/related-books", service))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204, "breaker closed again");
}

#[tokio::test]
async fn health_endpoint_is_live() {
    let engine = common::start_mock_engine(|| async { (200, "[]".to_string()) }).await;
    let service = start_service(engine, ServiceConfig::default()).await;

    let res = common::test_client()
        .get(format!("http://{}/health", service))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
}
