//! Server-Sent Events encoding for the chat stream.
//!
//! One event maps to one `data: <json>\n\n` frame, written to the body
//! unbatched so clients render chunks as they arrive. The frontend only
//! uses `data` lines; no `event:` or `id:` fields are emitted.

use axum::body::Body;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio_util::sync::DropGuard;

use atlas_core::events::ChatEvent;

/// Encode one event as an SSE frame.
#[must_use]
pub fn encode_frame(event: &ChatEvent) -> String {
    match serde_json::to_string(event) {
        Ok(json) => format!("data: {json}\n\n"),
        // ChatEvent has no unserializable shapes; this path is dead but
        // must not panic a live connection.
        Err(_) => "data: {\"type\":\"error\",\"error\":\"event serialization failed\"}\n\n".into(),
    }
}

/// Wrap an event stream as a streaming SSE response.
///
/// `guard` is the cancellation drop guard for the running turn; it lives
/// inside the body stream, so a client disconnect (body dropped) cancels
/// the turn at its next suspension point.
pub fn response<S>(events: S, guard: DropGuard) -> Response
where
    S: Stream<Item = ChatEvent> + Send + 'static,
{
    let frames = events.map(move |event| {
        let _turn = &guard;
        Ok::<_, std::convert::Infallible>(Bytes::from(encode_frame(&event)))
    });
    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
            // Disable nginx buffering in front of the stream.
            (header::HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        Body::from_stream(frames),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::events::ToolResultMetadata;

    #[test]
    fn content_frame_shape() {
        let frame = encode_frame(&ChatEvent::content("s1", "Hello"));
        assert_eq!(
            frame,
            "data: {\"type\":\"content\",\"chunk\":\"Hello\",\"session_id\":\"s1\"}\n\n"
        );
    }

    #[test]
    fn done_frame_shape() {
        let frame = encode_frame(&ChatEvent::done("s1"));
        assert_eq!(frame, "data: {\"type\":\"done\",\"session_id\":\"s1\"}\n\n");
    }

    #[test]
    fn error_frame_shape() {
        let frame = encode_frame(&ChatEvent::error("backend unreachable"));
        assert_eq!(
            frame,
            "data: {\"type\":\"error\",\"error\":\"backend unreachable\"}\n\n"
        );
    }

    #[test]
    fn tool_result_frame_carries_metadata() {
        let event = ChatEvent::ToolResult {
            session_id: "s1".into(),
            metadata: ToolResultMetadata::success("3 flights", 17),
        };
        let frame = encode_frame(&event);
        assert!(frame.starts_with("data: {"));
        assert!(frame.ends_with("\n\n"));
        let value: serde_json::Value =
            serde_json::from_str(frame.trim_start_matches("data: ").trim_end()).unwrap();
        assert_eq!(value["type"], "tool_result");
        assert_eq!(value["metadata"]["elapsed_ms"], 17);
        assert_eq!(value["metadata"]["status"], "success");
    }
}
