//! Router-level tests exercising the HTTP surface end to end with a
//! scripted generation backend and the seeded mock flight client.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{Value, json};
use tower::ServiceExt;

use atlas_llm::GenerationClient;
use atlas_llm::script::ScriptedClient;
use atlas_runtime::{EngineConfig, SessionStore, TurnEngine};
use atlas_server::{AppState, router};
use atlas_tools::ToolRegistry;
use atlas_tools::flight::{FlightSearchTool, FlightService, MockFlightClient};

fn app() -> (Router, Arc<ScriptedClient>) {
    let client = Arc::new(ScriptedClient::new());
    let flights = Arc::new(FlightService::new(Arc::new(MockFlightClient::with_seed(42))));
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(FlightSearchTool::new(Arc::clone(&flights))));
    let engine = TurnEngine::new(
        Arc::new(SessionStore::new()),
        Arc::new(registry),
        Arc::clone(&client) as Arc<dyn GenerationClient>,
        EngineConfig::default(),
    );
    let state = AppState {
        engine: Arc::new(engine),
        flights,
        metrics: PrometheusBuilder::new().build_recorder().handle(),
    };
    (router(state, "http://localhost:5173"), client)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn search_body() -> Value {
    json!({
        "origin": "LAX",
        "destination": "JFK",
        "departure_date": "2025-06-15"
    })
}

#[tokio::test]
async fn root_banner_and_health() {
    let (app, _) = app();

    let response = app.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"message": "Atlas Trip Planner API"})
    );

    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"status": "healthy"}));
}

#[tokio::test]
async fn blank_chat_message_is_rejected_before_streaming() {
    let (app, client) = app();

    let response = app
        .oneshot(post_json("/api/chat", json!({"message": "   "})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("empty"));
    // The backend was never contacted.
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn chat_streams_sse_frames() {
    let (app, client) = app();
    client.enqueue_content(&["Hello", " world"]);

    let response = app
        .oneshot(post_json("/api/chat", json!({"message": "hi"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
    assert_eq!(response.headers()["x-accel-buffering"], "no");

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let frames: Vec<Value> = text
        .split("\n\n")
        .filter(|f| !f.is_empty())
        .map(|f| {
            let json = f.strip_prefix("data: ").expect("frame prefix");
            serde_json::from_str(json).unwrap()
        })
        .collect();

    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0]["type"], "content");
    assert_eq!(frames[0]["chunk"], "Hello");
    assert_eq!(frames[1]["chunk"], " world");
    assert_eq!(frames[2]["type"], "done");
    assert_eq!(frames[0]["session_id"], frames[2]["session_id"]);
}

#[tokio::test]
async fn flight_search_returns_sorted_results() {
    let (app, _) = app();

    let response = app
        .oneshot(post_json("/api/flights/search", search_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let flights = body_json(response).await;
    let flights = flights.as_array().unwrap();
    assert!(!flights.is_empty());
    let prices: Vec<f64> = flights
        .iter()
        .map(|f| f["price"].as_f64().unwrap())
        .collect();
    for pair in prices.windows(2) {
        assert!(pair[0] <= pair[1]);
    }
    assert_eq!(flights[0]["origin"], "LAX");
    assert_eq!(flights[0]["currency"], "USD");
}

#[tokio::test]
async fn flight_search_respects_query_params() {
    let (app, _) = app();

    let response = app
        .oneshot(post_json("/api/flights/search?limit=1", search_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn flight_search_rejects_bad_params() {
    let (app, _) = app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/flights/search?sort_by=altitude",
            search_body(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .clone()
        .oneshot(post_json("/api/flights/search?max_stops=5", search_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let mut body = search_body();
    body["origin"] = json!("NOPE");
    let response = app
        .oneshot(post_json("/api/flights/search", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn flight_details_and_availability() {
    let (app, _) = app();

    let response = app
        .clone()
        .oneshot(post_json("/api/flights/search", search_body()))
        .await
        .unwrap();
    let flights = body_json(response).await;
    let id = flights[0]["id"].as_str().unwrap().to_owned();

    let response = app
        .clone()
        .oneshot(get(&format!("/api/flights/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], id.as_str());

    let response = app
        .oneshot(get(&format!("/api/flights/{id}/availability")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["available"].is_boolean());
}

#[tokio::test]
async fn unknown_flight_is_404() {
    let (app, _) = app();
    let response = app
        .oneshot(get("/api/flights/no-such-flight"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn metrics_endpoint_renders() {
    let (app, _) = app();
    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
