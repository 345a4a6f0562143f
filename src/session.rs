//! Listener sessions over HTTP
//!
//! One session per connected client. The handler registers a fresh outlet
//! with the registry, then a spawned forward task drains that outlet into
//! the streaming response body. The response never completes on its own;
//! the sole termination path is a failed body write (client disconnected),
//! at which point the session deregisters its own subscriber.
//!
//! Flushing: hyper writes each streamed body frame as its own chunk as soon
//! as it is produced, so chunks reach the network without buffering delay.
//! There is no flusher capability to probe, unlike a raw `ResponseWriter`.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::config::StationConfig;
use crate::registry::{ListenerRegistry, Outlet};

/// Shared state for the stream route
#[derive(Clone)]
struct SessionState {
    registry: Arc<ListenerRegistry>,
    content_type: String,
}

/// Build a router with the stream route mounted
///
/// The returned router is meant to be merged into the surrounding
/// application's router; the core does not do HTTP routing beyond this one
/// GET route.
pub(crate) fn router(registry: Arc<ListenerRegistry>, config: &StationConfig) -> Router {
    let state = SessionState {
        registry,
        content_type: config.content_type.clone(),
    };

    Router::new()
        .route(&config.mount_path, get(stream_handler))
        .with_state(state)
}

/// GET handler for the streaming endpoint
///
/// Registers a subscriber and answers with an endless chunked body fed by
/// the forward task. Headers mark the response as continuous audio over a
/// persistent connection.
async fn stream_handler(State(state): State<SessionState>) -> Response {
    let outlet = state.registry.add().await;

    let (body_tx, body_rx) = mpsc::channel::<Result<Bytes, Infallible>>(1);
    tokio::spawn(forward_chunks(outlet, body_tx, Arc::clone(&state.registry)));

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, state.content_type.as_str())
        .header(header::CONNECTION, "keep-alive")
        .body(Body::from_stream(ReceiverStream::new(body_rx)));

    match response {
        Ok(response) => response,
        Err(e) => {
            // Only reachable with an invalid configured content type.
            tracing::error!(error = %e, "Failed to build stream response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Drain the outlet into the response body until the client goes away
///
/// A failed body send means the connection is gone; the session then
/// deregisters its own subscriber and ends. Failures here never propagate
/// to the scheduler or to other sessions.
async fn forward_chunks(
    mut outlet: Outlet,
    body_tx: mpsc::Sender<Result<Bytes, Infallible>>,
    registry: Arc<ListenerRegistry>,
) {
    let id = outlet.id();
    tracing::debug!(listener = %id, "Listener session streaming");

    while let Some(chunk) = outlet.recv().await {
        if body_tx.send(Ok(chunk)).await.is_err() {
            tracing::info!(listener = %id, "Listener disconnected");
            break;
        }
    }

    registry.remove(id).await;
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    async fn wait_for_listener_count(registry: &ListenerRegistry, expected: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if registry.listener_count().await == expected {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("listener count never converged");
    }

    #[tokio::test]
    async fn test_forward_task_deregisters_on_body_failure() {
        let registry = Arc::new(ListenerRegistry::new());
        let outlet = registry.add().await;

        let (body_tx, body_rx) = mpsc::channel::<Result<Bytes, Infallible>>(1);
        tokio::spawn(forward_chunks(outlet, body_tx, Arc::clone(&registry)));

        // Simulate the client going away.
        drop(body_rx);

        // The next chunk hits the closed body channel and ends the session.
        registry.broadcast(Bytes::from_static(b"chunk")).await;
        wait_for_listener_count(&registry, 0).await;
    }

    #[tokio::test]
    async fn test_forward_task_relays_chunks_in_order() {
        let registry = Arc::new(ListenerRegistry::new());
        let outlet = registry.add().await;

        let (body_tx, mut body_rx) = mpsc::channel::<Result<Bytes, Infallible>>(1);
        tokio::spawn(forward_chunks(outlet, body_tx, Arc::clone(&registry)));

        for byte in 0u8..3 {
            registry.broadcast(Bytes::from(vec![byte; 4])).await;
            let chunk = body_rx.recv().await.unwrap().unwrap();
            assert_eq!(chunk, Bytes::from(vec![byte; 4]));
        }
    }

    #[tokio::test]
    async fn test_http_stream_headers_and_body() {
        let registry = Arc::new(ListenerRegistry::new());
        let config = StationConfig::default().mount_path("/stream");
        let app = router(Arc::clone(&registry), &config);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mut conn = tokio::net::TcpStream::connect(addr).await.unwrap();
        conn.write_all(b"GET /stream HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();

        wait_for_listener_count(&registry, 1).await;
        registry.broadcast(Bytes::from_static(b"distinctive-audio-bytes")).await;

        let mut received = Vec::new();
        let mut buf = [0u8; 4096];
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let n = conn.read(&mut buf).await.unwrap();
                assert!(n > 0, "connection closed before body arrived");
                received.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&received);
                if text.contains("distinctive-audio-bytes") {
                    assert!(text.starts_with("HTTP/1.1 200 OK"));
                    assert!(text.to_ascii_lowercase().contains("content-type: audio/aac"));
                    return;
                }
            }
        })
        .await
        .expect("never received broadcast bytes over HTTP");
    }

    #[tokio::test]
    async fn test_http_disconnect_cleans_up_registry() {
        let registry = Arc::new(ListenerRegistry::new());
        let config = StationConfig::default().mount_path("/stream");
        let app = router(Arc::clone(&registry), &config);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mut conn = tokio::net::TcpStream::connect(addr).await.unwrap();
        conn.write_all(b"GET /stream HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();

        wait_for_listener_count(&registry, 1).await;
        drop(conn);

        // Keep broadcasting until the dead session notices the closed
        // connection and deregisters itself.
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                registry.broadcast(Bytes::from_static(b"chunk")).await;
                if registry.listener_count().await == 0 {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .expect("disconnected listener was never deregistered");
    }
}
