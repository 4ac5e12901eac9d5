//! Integration tests for the OpenAI-compatible adapter against a mock
//! HTTP server.

#![allow(missing_docs)]

use futures::StreamExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use atlas_core::messages::Message;
use atlas_llm::{GenerationClient, GenerationDelta, OpenAiChatClient, OpenAiConfig};

fn sse_body(frames: &[&str]) -> String {
    let mut body = String::new();
    for frame in frames {
        body.push_str("data: ");
        body.push_str(frame);
        body.push_str("\n\n");
    }
    body
}

async fn mount_stream(server: &MockServer, body: String) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_raw(body, "text/event-stream"),
        )
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> OpenAiChatClient {
    OpenAiChatClient::new(OpenAiConfig::local(server.uri(), "test-model"))
}

#[tokio::test]
async fn streams_content_deltas() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        sse_body(&[
            r#"{"choices":[{"delta":{"content":"Hel"},"finish_reason":null}]}"#,
            r#"{"choices":[{"delta":{"content":"lo"},"finish_reason":null}]}"#,
            r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#,
            "[DONE]",
        ]),
    )
    .await;

    let client = client_for(&server);
    let stream = client.stream(&[Message::user("hi")], &[]).await.unwrap();
    let deltas: Vec<_> = stream.map(Result::unwrap).collect().await;

    assert_eq!(
        deltas,
        vec![
            GenerationDelta::Content("Hel".into()),
            GenerationDelta::Content("lo".into()),
        ]
    );
}

#[tokio::test]
async fn assembles_tool_call_from_fragments() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        sse_body(&[
            r#"{"choices":[{"delta":{"content":"Let me check."},"finish_reason":null}]}"#,
            r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"id":"call_42","function":{"name":"search_flights","arguments":"{\"origin\":"}}]},"finish_reason":null}]}"#,
            r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"function":{"arguments":"\"LAX\",\"destination\":\"JFK\"}"}}]},"finish_reason":null}]}"#,
            r#"{"choices":[{"delta":{},"finish_reason":"tool_calls"}]}"#,
            "[DONE]",
        ]),
    )
    .await;

    let client = client_for(&server);
    let stream = client.stream(&[Message::user("flights?")], &[]).await.unwrap();
    let deltas: Vec<_> = stream.map(Result::unwrap).collect().await;

    assert_eq!(deltas.len(), 2);
    assert_eq!(deltas[0], GenerationDelta::Content("Let me check.".into()));
    match &deltas[1] {
        GenerationDelta::ToolCall(call) => {
            assert_eq!(call.call_id, "call_42");
            assert_eq!(call.tool_name, "search_flights");
            assert_eq!(call.arguments["origin"], "LAX");
            assert_eq!(call.arguments["destination"], "JFK");
        }
        GenerationDelta::Content(_) => panic!("expected tool call"),
    }
}

#[tokio::test]
async fn flushes_tool_call_without_finish_marker() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        sse_body(&[
            r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"id":"call_7","function":{"name":"search_flights","arguments":"{}"}}]},"finish_reason":null}]}"#,
            "[DONE]",
        ]),
    )
    .await;

    let client = client_for(&server);
    let stream = client.stream(&[], &[]).await.unwrap();
    let deltas: Vec<_> = stream.map(Result::unwrap).collect().await;

    assert_eq!(deltas.len(), 1);
    assert!(matches!(&deltas[0], GenerationDelta::ToolCall(c) if c.call_id == "call_7"));
}

#[tokio::test]
async fn parallel_tool_calls_are_rejected_explicitly() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        sse_body(&[
            r#"{"choices":[{"delta":{"tool_calls":[{"index":0,"id":"call_a","function":{"name":"search_flights","arguments":"{}"}}]},"finish_reason":null}]}"#,
            r#"{"choices":[{"delta":{"tool_calls":[{"index":1,"id":"call_b","function":{"name":"search_flights","arguments":"{}"}}]},"finish_reason":null}]}"#,
            r#"{"choices":[{"delta":{},"finish_reason":"tool_calls"}]}"#,
            "[DONE]",
        ]),
    )
    .await;

    let client = client_for(&server);
    let stream = client.stream(&[], &[]).await.unwrap();
    let items: Vec<_> = stream.collect().await;

    let err = items.last().unwrap().as_ref().unwrap_err();
    assert!(!err.is_retryable());
    assert!(err.to_string().contains("parallel tool calls"));
}

#[tokio::test]
async fn server_error_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.stream(&[], &[]).await.err().unwrap();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn bad_request_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            r#"{"error":{"message":"model not found"}}"#,
        ))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.stream(&[], &[]).await.err().unwrap();
    assert!(!err.is_retryable());
    assert!(err.to_string().contains("model not found"));
}

#[tokio::test]
async fn malformed_chunk_surfaces_mid_stream_error() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        sse_body(&[
            r#"{"choices":[{"delta":{"content":"ok"},"finish_reason":null}]}"#,
            "{not json",
            "[DONE]",
        ]),
    )
    .await;

    let client = client_for(&server);
    let stream = client.stream(&[], &[]).await.unwrap();
    let items: Vec<_> = stream.collect().await;

    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert!(items[1].is_err());
}
