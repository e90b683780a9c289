// tests/ws_reconnect.rs
//
// Exercises the ConnectionManager against a local tokio-tungstenite
// server so the full lifecycle (open, close codes, backoff, teardown)
// runs over a real socket without any network dependency.

mod common;

use futures_util::{SinkExt, StreamExt};
use jobboard_connector_rs::auth::TokenStore;
use jobboard_connector_rs::websocket::{ConnectionConfig, ConnectionManager, ConnectionStatus, WsMessage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout, Duration};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::{CloseFrame, Message};

async fn bind_server() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let base_url = format!("ws://{}", listener.local_addr().expect("no local addr"));
    (listener, base_url)
}

fn manager_for(base_url: &str, base_delay_ms: u64, max_attempts: u32) -> ConnectionManager {
    let mut config = ConnectionConfig::new(base_url).with_job("7");
    config.reconnect_base_delay_ms = base_delay_ms;
    config.max_reconnect_attempts = max_attempts;
    ConnectionManager::new(config, TokenStore::with_token("test-token"))
}

async fn wait_for_status(manager: &ConnectionManager, wanted: ConnectionStatus) {
    timeout(Duration::from_secs(5), async {
        while manager.status() != wanted {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| {
        panic!(
            "Timed out waiting for status {:?}, current {:?}",
            wanted,
            manager.status()
        )
    });
}

#[tokio::test]
async fn test_connect_receive_and_send_round_trip() {
    common::setup();
    let (listener, base_url) = bind_server().await;

    // Server: push one event, then forward client frames back to the test.
    let (inbound_tx, mut inbound_rx) = mpsc::channel::<String>(8);
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept failed");
        let mut ws = accept_async(stream).await.expect("handshake failed");
        ws.send(Message::Text(
            r#"{"type":"analysis_update","data":{"score":91},"timestamp":"2024-05-01T10:00:00"}"#
                .to_string(),
        ))
        .await
        .expect("server send failed");
        while let Some(Ok(Message::Text(text))) = ws.next().await {
            let _ = inbound_tx.send(text).await;
        }
    });

    let manager = manager_for(&base_url, 1000, 5);
    let (msg_tx, mut msg_rx) = mpsc::channel::<WsMessage>(8);
    manager.set_on_message(move |msg| {
        let _ = msg_tx.try_send(msg.clone());
    });
    let connected = Arc::new(AtomicUsize::new(0));
    let connected_clone = connected.clone();
    manager.set_on_connect(move || {
        connected_clone.fetch_add(1, Ordering::SeqCst);
    });

    manager.connect().await;
    assert!(manager.is_connected());
    assert_eq!(connected.load(Ordering::SeqCst), 1);

    // connect() while open is a no-op
    manager.connect().await;
    assert_eq!(connected.load(Ordering::SeqCst), 1);

    let received = timeout(Duration::from_secs(5), msg_rx.recv())
        .await
        .expect("timed out waiting for message")
        .expect("message channel closed");
    assert_eq!(received.kind, "analysis_update");
    assert_eq!(received.data["score"], 91);
    let last = manager.last_message().expect("last_message not retained");
    assert_eq!(last.kind, "analysis_update");

    manager
        .send(&serde_json::json!({"type": "ack", "data": {"seen": true}}))
        .await
        .expect("send failed");
    let echoed = timeout(Duration::from_secs(5), inbound_rx.recv())
        .await
        .expect("timed out waiting for echo")
        .expect("echo channel closed");
    assert!(echoed.contains("\"ack\""));

    manager.disconnect().await;
    assert_eq!(manager.status(), ConnectionStatus::Disconnected);
    assert!(!manager.is_connected());
}

#[tokio::test]
async fn test_normal_close_never_reconnects() {
    common::setup();
    let (listener, base_url) = bind_server().await;

    let accepts = Arc::new(AtomicUsize::new(0));
    let accepts_clone = accepts.clone();
    tokio::spawn(async move {
        loop {
            let (stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            accepts_clone.fetch_add(1, Ordering::SeqCst);
            let mut ws = accept_async(stream).await.expect("handshake failed");
            ws.close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "server done".into(),
            }))
            .await
            .ok();
            while ws.next().await.is_some() {}
        }
    });

    let manager = manager_for(&base_url, 20, 5);
    manager.connect().await;
    wait_for_status(&manager, ConnectionStatus::Disconnected).await;

    // Plenty of time for a (wrong) 40ms backoff reconnect to have fired.
    sleep(Duration::from_millis(500)).await;
    assert_eq!(accepts.load(Ordering::SeqCst), 1);
    assert_eq!(manager.reconnect_attempts(), 0);
    assert_eq!(manager.status(), ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn test_abnormal_drop_reconnects_and_resets_counter() {
    common::setup();
    let (listener, base_url) = bind_server().await;

    let accepts = Arc::new(AtomicUsize::new(0));
    let accepts_clone = accepts.clone();
    tokio::spawn(async move {
        // First connection: drop the socket without a close handshake.
        let (stream, _) = listener.accept().await.expect("accept failed");
        accepts_clone.fetch_add(1, Ordering::SeqCst);
        let ws = accept_async(stream).await.expect("handshake failed");
        drop(ws);
        // Second connection: stay open.
        let (stream, _) = listener.accept().await.expect("accept failed");
        accepts_clone.fetch_add(1, Ordering::SeqCst);
        let mut ws = accept_async(stream).await.expect("handshake failed");
        while ws.next().await.is_some() {}
    });

    let manager = manager_for(&base_url, 20, 5);
    manager.connect().await;

    // The drop may land before or after we observe connected; either way
    // the manager must end up connected again on the second socket.
    timeout(Duration::from_secs(5), async {
        while accepts.load(Ordering::SeqCst) < 2 || !manager.is_connected() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("manager never reconnected");

    // Successful open resets the backoff counter.
    assert_eq!(manager.reconnect_attempts(), 0);

    manager.disconnect().await;
}

#[tokio::test]
async fn test_disconnect_cancels_pending_reconnect() {
    common::setup();
    let (listener, base_url) = bind_server().await;

    let accepts = Arc::new(AtomicUsize::new(0));
    let accepts_clone = accepts.clone();
    tokio::spawn(async move {
        loop {
            let (stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            accepts_clone.fetch_add(1, Ordering::SeqCst);
            let ws = accept_async(stream).await.expect("handshake failed");
            drop(ws);
        }
    });

    // First retry would fire after 500 * 2 = 1000ms.
    let manager = manager_for(&base_url, 500, 5);
    manager.connect().await;
    wait_for_status(&manager, ConnectionStatus::Disconnected).await;
    assert_eq!(manager.reconnect_attempts(), 1);

    // Manual disconnect during the backoff window must win.
    manager.disconnect().await;
    sleep(Duration::from_millis(2500)).await;
    assert_eq!(accepts.load(Ordering::SeqCst), 1);
    assert_eq!(manager.status(), ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn test_retry_exhaustion_on_unreachable_endpoint() {
    common::setup();
    // Bind then drop the listener so the port refuses connections.
    let (listener, base_url) = bind_server().await;
    drop(listener);

    let manager = manager_for(&base_url, 10, 2);
    manager.connect().await;

    // Attempts: initial failure schedules #1 (20ms), #1 fails and
    // schedules #2 (40ms), #2 fails and gives up.
    sleep(Duration::from_millis(500)).await;
    assert_eq!(manager.reconnect_attempts(), 2);
    assert_eq!(manager.status(), ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn test_malformed_frames_are_dropped() {
    common::setup();
    let (listener, base_url) = bind_server().await;

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept failed");
        let mut ws = accept_async(stream).await.expect("handshake failed");
        ws.send(Message::Text("this is not json".to_string()))
            .await
            .expect("server send failed");
        sleep(Duration::from_millis(400)).await;
        ws.send(Message::Text(
            r#"{"type":"interview_completed","data":{"ok":true}}"#.to_string(),
        ))
        .await
        .expect("server send failed");
        while ws.next().await.is_some() {}
    });

    let manager = manager_for(&base_url, 1000, 5);
    let (msg_tx, mut msg_rx) = mpsc::channel::<WsMessage>(8);
    manager.set_on_message(move |msg| {
        let _ = msg_tx.try_send(msg.clone());
    });

    manager.connect().await;
    assert!(manager.is_connected());

    // The garbage frame must change nothing.
    sleep(Duration::from_millis(200)).await;
    assert!(manager.last_message().is_none());
    assert_eq!(manager.status(), ConnectionStatus::Connected);

    // The next valid frame still arrives on the same connection.
    let received = timeout(Duration::from_secs(5), msg_rx.recv())
        .await
        .expect("timed out waiting for valid message")
        .expect("message channel closed");
    assert_eq!(received.kind, "interview_completed");
    assert_eq!(
        manager.last_message().expect("missing last_message").kind,
        "interview_completed"
    );

    manager.disconnect().await;
}

#[tokio::test]
async fn test_swapped_callback_receives_next_frame() {
    common::setup();
    let (listener, base_url) = bind_server().await;

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept failed");
        let mut ws = accept_async(stream).await.expect("handshake failed");
        ws.send(Message::Text(r#"{"type":"first","data":1}"#.to_string()))
            .await
            .expect("server send failed");
        // Second frame only after the client signals it swapped handlers.
        while let Some(Ok(msg)) = ws.next().await {
            if matches!(msg, Message::Text(_)) {
                ws.send(Message::Text(r#"{"type":"second","data":2}"#.to_string()))
                    .await
                    .expect("server send failed");
            }
        }
    });

    let manager = manager_for(&base_url, 1000, 5);
    let (first_tx, mut first_rx) = mpsc::channel::<WsMessage>(8);
    manager.set_on_message(move |msg| {
        let _ = first_tx.try_send(msg.clone());
    });

    manager.connect().await;
    let first = timeout(Duration::from_secs(5), first_rx.recv())
        .await
        .expect("timed out waiting for first message")
        .expect("first channel closed");
    assert_eq!(first.kind, "first");

    // Swap the handler without touching the connection.
    let (second_tx, mut second_rx) = mpsc::channel::<WsMessage>(8);
    manager.set_on_message(move |msg| {
        let _ = second_tx.try_send(msg.clone());
    });
    manager
        .send(&serde_json::json!({"type": "ready", "data": null}))
        .await
        .expect("send failed");

    let second = timeout(Duration::from_secs(5), second_rx.recv())
        .await
        .expect("timed out waiting for second message")
        .expect("second channel closed");
    assert_eq!(second.kind, "second");
    // The old handler saw only the first frame.
    assert!(first_rx.try_recv().is_err());

    manager.disconnect().await;
}

#[tokio::test]
async fn test_connect_without_token_creates_no_connection() {
    common::setup();
    let (listener, base_url) = bind_server().await;

    let accepts = Arc::new(AtomicUsize::new(0));
    let accepts_clone = accepts.clone();
    tokio::spawn(async move {
        loop {
            let (stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            accepts_clone.fetch_add(1, Ordering::SeqCst);
            let _ = accept_async(stream).await;
        }
    });

    let manager = ConnectionManager::new(
        ConnectionConfig::new(&base_url).with_job("7"),
        TokenStore::new(),
    );
    manager.connect().await;
    sleep(Duration::from_millis(200)).await;

    assert_eq!(accepts.load(Ordering::SeqCst), 0);
    assert_eq!(manager.status(), ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn test_session_id_takes_precedence_in_path() {
    common::setup();
    let (listener, base_url) = bind_server().await;

    // Capture the request path from the handshake.
    let (path_tx, mut path_rx) = mpsc::channel::<String>(1);
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept failed");
        let mut ws = tokio_tungstenite::accept_hdr_async(
            stream,
            move |req: &tokio_tungstenite::tungstenite::handshake::server::Request,
                  resp: tokio_tungstenite::tungstenite::handshake::server::Response| {
                let _ = path_tx.try_send(req.uri().to_string());
                Ok(resp)
            },
        )
        .await
        .expect("handshake failed");
        while ws.next().await.is_some() {}
    });

    let mut config = ConnectionConfig::new(&base_url)
        .with_session("sess-42")
        .with_job("99");
    config.reconnect_base_delay_ms = 1000;
    let manager = ConnectionManager::new(config, TokenStore::with_token("tok"));
    manager.connect().await;

    let uri = timeout(Duration::from_secs(5), path_rx.recv())
        .await
        .expect("timed out waiting for handshake")
        .expect("path channel closed");
    assert!(uri.starts_with("/ws/employer/session/sess-42"));
    assert!(uri.contains("token=tok"));

    manager.disconnect().await;
}
