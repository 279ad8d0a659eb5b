//! DaprEventSink against a stub sidecar served by axum on a random port.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use domain_catalog::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug)]
struct Captured {
    pubsub: String,
    topic: String,
    query: HashMap<String, String>,
    body: serde_json::Value,
}

async fn publish(
    State(inbox): State<mpsc::Sender<Captured>>,
    Path((pubsub, topic)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    body: axum::body::Bytes,
) -> StatusCode {
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap_or_default();
    let rejected = body["skuCode"] == "REJECT-ME";

    let _ = inbox
        .send(Captured {
            pubsub,
            topic,
            query,
            body,
        })
        .await;

    if rejected {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn stub_sidecar() -> (DaprConfig, mpsc::Receiver<Captured>) {
    let (tx, rx) = mpsc::channel(8);
    let app = Router::new()
        .route("/v1.0/publish/{pubsub}/{topic}", post(publish))
        .with_state(tx);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = DaprConfig {
        host: "127.0.0.1".to_string(),
        http_port: port,
        pubsub_name: "catalog-pubsub".to_string(),
    };
    (config, rx)
}

#[tokio::test]
async fn test_sink_posts_to_dapr_publish_endpoint() {
    let (config, mut rx) = stub_sidecar().await;
    let sink = DaprEventSink::new(&config);

    let event = ProductCreated::new("SKU-1");
    sink.send(
        "product-registered",
        "SKU-1",
        serde_json::to_vec(&event).unwrap(),
    )
    .await
    .unwrap();

    let captured = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(captured.pubsub, "catalog-pubsub");
    assert_eq!(captured.topic, "product-registered");
    assert_eq!(
        captured.query.get("metadata.partitionKey").map(String::as_str),
        Some("SKU-1")
    );
    assert_eq!(captured.body["skuCode"], "SKU-1");
    assert_eq!(captured.body["eventId"], event.event_id);
}

#[tokio::test]
async fn test_sink_reports_rejection() {
    let (config, _rx) = stub_sidecar().await;
    let sink = DaprEventSink::new(&config);

    let err = sink
        .send(
            "product-registered",
            "REJECT-ME",
            serde_json::to_vec(&ProductCreated::new("REJECT-ME")).unwrap(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::Rejected { status: 500, .. }));
}

#[tokio::test]
async fn test_sink_reports_unreachable_sidecar() {
    let config = DaprConfig {
        host: "127.0.0.1".to_string(),
        http_port: 1,
        pubsub_name: "catalog-pubsub".to_string(),
    };
    let sink = DaprEventSink::new(&config);

    let err = sink.send("t", "k", b"{}".to_vec()).await.unwrap_err();
    assert!(matches!(err, PublishError::Transport(_)));
}

#[tokio::test]
async fn test_created_product_is_announced_through_sidecar() {
    let (config, mut rx) = stub_sidecar().await;
    let sink: Arc<dyn EventSink> = Arc::new(DaprEventSink::new(&config));
    let (publisher, _dispatcher) = EventPublisher::spawn(sink, 16);

    let service = CatalogService::new(InMemoryProductRepository::new(), CatalogConfig::default())
        .with_publisher(publisher);
    service
        .create_product(CreateProductRequest {
            sku: "SKU-EVT".to_string(),
            name: "Juice".to_string(),
            description: None,
            price: rust_decimal::Decimal::ONE,
            stock: None,
            category: None,
        })
        .await
        .unwrap();

    let captured = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(captured.topic, "product-registered");
    assert_eq!(
        captured.query.get("metadata.partitionKey").map(String::as_str),
        Some("SKU-EVT")
    );
    assert_eq!(captured.body["skuCode"], "SKU-EVT");
}
