//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use api::Backend;
use api::config::Config;
use api::routes::orders::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use common::{EventId, OrderId};
use domain::{IdGenerator, OrderService};
use metrics_exporter_prometheus::PrometheusHandle;
use notifier::{EventNotifier, InMemoryNotifier, Topic};
use order_store::{InMemoryOrderStore, OrderStore};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (axum::Router, InMemoryOrderStore, InMemoryNotifier) {
    let (state, store, notifier) = api::create_in_memory_state(&Config::default());
    let app = api::create_app(state, get_metrics_handle());
    (app, store, notifier)
}

fn post_orders(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/orders")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn create_order(app: &axum::Router, customer_id: &str, products: &[&str]) -> String {
    let body = serde_json::json!({ "customer_id": customer_id, "products": products });
    let response = app
        .clone()
        .oneshot(post_orders(body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["order_id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _, _) = setup();

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["backend"], "memory");
}

#[tokio::test]
async fn test_create_and_get_order() {
    let (app, store, notifier) = setup();

    let response = app
        .clone()
        .oneshot(post_orders(r#"{"customer_id":"C1","products":["A","B"]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    let order_id = created["order_id"].as_str().unwrap().to_string();

    let parsed = uuid::Uuid::parse_str(&order_id).unwrap();
    assert_eq!(parsed.get_version_num(), 4);
    assert_eq!(
        created["_links"]["self"]["href"],
        format!("/order/{order_id}")
    );
    assert_eq!(store.len().await, 1);

    // Read it back
    let response = app
        .oneshot(get(&format!("/order/{order_id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["order_id"], order_id);
    assert_eq!(json["customer_id"], "C1");
    assert_eq!(json["products"], serde_json::json!(["A", "B"]));
    assert_eq!(json["_links"]["self"]["href"], format!("/order/{order_id}"));

    let created_at = json["created_at"].as_str().unwrap();

    // Exactly one notification, carrying the same order
    let published = notifier.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].topic.as_str(), "order--created");

    let event = published[0].event().unwrap();
    assert_eq!(event.order_id.as_str(), order_id);
    assert_eq!(event.customer_id.as_str(), "C1");
    assert_eq!(event.products.len(), 2);
    assert_eq!(
        event.created_at,
        chrono::DateTime::parse_from_rfc3339(created_at).unwrap()
    );
}

#[tokio::test]
async fn test_envelope_carries_service_metadata() {
    let (app, _, notifier) = setup();
    create_order(&app, "C1", &["A"]).await;

    let published = notifier.published();
    let envelope: serde_json::Value = serde_json::from_str(&published[0].payload).unwrap();

    assert_eq!(envelope["service"]["name"], "service-orders");
    assert_eq!(envelope["metadata"]["topic"], "order--created");
    assert_eq!(envelope["metadata"]["data_encoding"], "raw");
    assert_eq!(envelope["data"]["customer_id"], "C1");
}

#[tokio::test]
async fn test_get_nonexistent_order() {
    let (app, _, _) = setup();

    let response = app.oneshot(get("/order/foo")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Order not found");
    assert_eq!(json["_links"]["self"]["href"], "/order/foo");
}

#[tokio::test]
async fn test_get_order_with_trailing_slash() {
    let (app, _, _) = setup();
    let order_id = create_order(&app, "C1", &["A"]).await;

    let response = app
        .oneshot(get(&format!("/order/{order_id}/")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["order_id"], order_id);
}

#[tokio::test]
async fn test_duplicate_products_are_kept_in_order() {
    let (app, _, _) = setup();
    let order_id = create_order(&app, "C1", &["B", "A", "B"]).await;

    let response = app
        .oneshot(get(&format!("/order/{order_id}")))
        .await
        .unwrap();

    assert_eq!(
        body_json(response).await["products"],
        serde_json::json!(["B", "A", "B"])
    );
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let (app, store, notifier) = setup();

    let response = app.oneshot(post_orders("{not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
    assert!(store.is_empty().await);
    assert_eq!(notifier.published_count(), 0);
}

#[tokio::test]
async fn test_missing_fields_are_rejected() {
    let (app, store, notifier) = setup();

    for body in [
        r#"{"products":["A"]}"#,
        r#"{"customer_id":"C1"}"#,
        r#"{"customer_id":"C1","products":[]}"#,
        r#"{"customer_id":"","products":["A"]}"#,
        r#"{"customer_id":"C1","products":["A",""]}"#,
    ] {
        let response = app.clone().oneshot(post_orders(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
    }

    assert!(store.is_empty().await);
    assert_eq!(notifier.published_count(), 0);
}

#[tokio::test]
async fn test_store_unavailable_returns_503_without_publishing() {
    let (app, store, notifier) = setup();
    store.set_unavailable(true);

    let response = app
        .oneshot(post_orders(r#"{"customer_id":"C1","products":["A"]}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(body_json(response).await["error"].is_string());
    assert_eq!(notifier.published_count(), 0);
}

#[tokio::test]
async fn test_lookup_while_store_unavailable_returns_503() {
    let (app, store, _) = setup();
    let order_id = create_order(&app, "C1", &["A"]).await;
    store.set_unavailable(true);

    let response = app
        .oneshot(get(&format!("/order/{order_id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_bus_failure_still_creates_order() {
    let (app, store, notifier) = setup();
    notifier.set_fail_on_publish(true);

    let order_id = create_order(&app, "C1", &["A", "B"]).await;

    assert_eq!(store.len().await, 1);
    assert_eq!(notifier.published_count(), 0);

    let response = app
        .oneshot(get(&format!("/order/{order_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_topic_prefix_from_config() {
    let config = Config {
        topic_prefix: "staging-".to_string(),
        ..Config::default()
    };
    let (state, _, notifier) = api::create_in_memory_state(&config);
    let app = api::create_app(state, get_metrics_handle());

    create_order(&app, "C1", &["A"]).await;

    assert_eq!(
        notifier.published()[0].topic.as_str(),
        "staging-order--created"
    );
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _, _) = setup();
    create_order(&app, "C1", &["A"]).await;

    let response = app.oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("orders_created_total"));
}

/// Hands out the same order ID every time.
struct FixedOrderId(&'static str);

impl IdGenerator for FixedOrderId {
    fn order_id(&self) -> OrderId {
        OrderId::new(self.0)
    }

    fn event_id(&self) -> EventId {
        EventId::new()
    }
}

#[tokio::test]
async fn test_order_id_collision_returns_500_without_publishing() {
    let store = InMemoryOrderStore::new();
    let notifier = InMemoryNotifier::default();
    let order_service = OrderService::new(
        Arc::new(store.clone()) as Arc<dyn OrderStore>,
        Arc::new(notifier.clone()) as Arc<dyn EventNotifier>,
        Topic::order_created(""),
    )
    .with_id_generator(FixedOrderId("fixed-id"));
    let state = Arc::new(AppState {
        order_service,
        backend: Backend::InMemory,
    });
    let app = api::create_app(state, get_metrics_handle());

    let body = r#"{"customer_id":"C1","products":["A"]}"#;
    let first = app.clone().oneshot(post_orders(body)).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(body_json(first).await["order_id"], "fixed-id");

    let second = app.clone().oneshot(post_orders(body)).await.unwrap();
    assert_eq!(second.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_json(second).await["error"].is_string());

    assert_eq!(store.len().await, 1);
    assert_eq!(notifier.published_count(), 1);

    // The first order is untouched
    let response = app.oneshot(get("/order/fixed-id")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
