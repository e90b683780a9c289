use crate::auth::TokenStore;
use crate::error::Result;
use futures_util::{FutureExt, SinkExt, StreamExt};
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::{CloseFrame, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

const WS_BASE_PATH: &str = "/ws/employer";
const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;
const DEFAULT_RECONNECT_BASE_DELAY_MS: u64 = 1000;
const RECONNECT_MAX_DELAY_MS: u64 = 30_000;
const NORMAL_CLOSURE: u16 = 1000;
// Close code reported when the stream ends without a close frame.
const ABNORMAL_CLOSURE: u16 = 1006;

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Lifecycle of the managed connection, for UI feedback and reconnect gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
    Error,
}

/// Tagged event received on the employer stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Target and retry policy for one logical connection.
///
/// At most one of `session_id`/`job_id` is used to build the endpoint
/// path; the session id wins when both are set. Changing either means
/// building a new manager (and tearing the old one down).
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub base_url: String,
    pub session_id: Option<String>,
    pub job_id: Option<String>,
    pub max_reconnect_attempts: u32,
    /// First backoff step in milliseconds; the delay for attempt `n` is
    /// `min(base * 2^n, 30000)`.
    pub reconnect_base_delay_ms: u64,
}

impl ConnectionConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            session_id: None,
            job_id: None,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            reconnect_base_delay_ms: DEFAULT_RECONNECT_BASE_DELAY_MS,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_job(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }
}

type MessageHandler = Box<dyn Fn(&WsMessage) + Send + Sync + 'static>;
type LifecycleHandler = Box<dyn Fn() + Send + Sync + 'static>;
type ErrorHandler = Box<dyn Fn(&str) + Send + Sync + 'static>;

/// Single-slot callback holders, dereferenced at dispatch time so callers
/// can swap a handler without tearing down the connection.
#[derive(Default)]
struct EventHandlers {
    on_message: Mutex<Option<MessageHandler>>,
    on_connect: Mutex<Option<LifecycleHandler>>,
    on_disconnect: Mutex<Option<LifecycleHandler>>,
    on_error: Mutex<Option<ErrorHandler>>,
}

impl EventHandlers {
    fn message(&self, message: &WsMessage) {
        if let Some(handler) = lock(&self.on_message).as_ref() {
            handler(message);
        }
    }

    fn connect(&self) {
        if let Some(handler) = lock(&self.on_connect).as_ref() {
            handler();
        }
    }

    fn disconnect(&self) {
        if let Some(handler) = lock(&self.on_disconnect).as_ref() {
            handler();
        }
    }

    fn error(&self, message: &str) {
        if let Some(handler) = lock(&self.on_error).as_ref() {
            handler(message);
        }
    }
}

struct ConnectionState {
    status: Mutex<ConnectionStatus>,
    last_message: Mutex<Option<WsMessage>>,
    attempts: AtomicU32,
    // Bumped on every disconnect(); stale tasks compare their snapshot
    // against this and bail, so teardown fails closed.
    epoch: AtomicU64,
    outbound: Mutex<Option<mpsc::Sender<Message>>>,
    reconnect_timer: Mutex<Option<JoinHandle<()>>>,
    reader_task: Mutex<Option<JoinHandle<()>>>,
}

// Poisoning can only come from a panicking callback; the state itself
// stays coherent, so recover the guard instead of propagating.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Computes the capped exponential backoff delay for a reconnect attempt.
fn reconnect_delay(base_ms: u64, attempt: u32) -> Duration {
    let factor = 2u64.saturating_pow(attempt);
    Duration::from_millis(base_ms.saturating_mul(factor).min(RECONNECT_MAX_DELAY_MS))
}

/// Builds the employer stream endpoint. The session path wins over the
/// job path; the token travels as a query parameter because the browser
/// WebSocket API the backend was built against cannot set headers.
fn endpoint_url(config: &ConnectionConfig, token: &str) -> Result<Url> {
    let mut path = String::from(WS_BASE_PATH);
    if let Some(session_id) = &config.session_id {
        path.push_str(&format!("/session/{}", session_id));
    } else if let Some(job_id) = &config.job_id {
        path.push_str(&format!("/job/{}", job_id));
    }
    let mut url = Url::parse(&format!(
        "{}{}",
        config.base_url.trim_end_matches('/'),
        path
    ))?;
    url.query_pairs_mut().append_pair("token", token);
    Ok(url)
}

/// Manages a single real-time connection to the employer event stream.
///
/// The manager owns at most one live WebSocket at a time, authenticates
/// it from the injected [`TokenStore`], and restores it after abnormal
/// drops with capped exponential backoff. Clones are handles to the same
/// connection.
///
/// # Examples
///
/// ```no_run
/// use jobboard_connector_rs::auth::TokenStore;
/// use jobboard_connector_rs::websocket::{ConnectionConfig, ConnectionManager};
///
/// #[tokio::main]
/// async fn main() {
///     let tokens = TokenStore::with_token("jwt-from-login");
///     let config = ConnectionConfig::new("ws://localhost:8000").with_job("42");
///     let manager = ConnectionManager::new(config, tokens);
///
///     manager.set_on_message(|msg| println!("{}: {}", msg.kind, msg.data));
///     manager.connect().await;
///
///     tokio::signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
///     manager.disconnect().await;
/// }
/// ```
#[derive(Clone)]
pub struct ConnectionManager {
    config: Arc<ConnectionConfig>,
    tokens: TokenStore,
    handlers: Arc<EventHandlers>,
    state: Arc<ConnectionState>,
}

impl ConnectionManager {
    pub fn new(config: ConnectionConfig, tokens: TokenStore) -> Self {
        Self {
            config: Arc::new(config),
            tokens,
            handlers: Arc::new(EventHandlers::default()),
            state: Arc::new(ConnectionState {
                status: Mutex::new(ConnectionStatus::Disconnected),
                last_message: Mutex::new(None),
                attempts: AtomicU32::new(0),
                epoch: AtomicU64::new(0),
                outbound: Mutex::new(None),
                reconnect_timer: Mutex::new(None),
                reader_task: Mutex::new(None),
            }),
        }
    }

    // --- Observation surface ---

    pub fn status(&self) -> ConnectionStatus {
        *lock(&self.state.status)
    }

    pub fn is_connected(&self) -> bool {
        self.status() == ConnectionStatus::Connected
    }

    /// Latest successfully parsed inbound message, if any.
    pub fn last_message(&self) -> Option<WsMessage> {
        lock(&self.state.last_message).clone()
    }

    /// Number of reconnect attempts made since the last successful open.
    pub fn reconnect_attempts(&self) -> u32 {
        self.state.attempts.load(Ordering::SeqCst)
    }

    // --- Callback slots ---

    pub fn set_on_message<F>(&self, handler: F)
    where
        F: Fn(&WsMessage) + Send + Sync + 'static,
    {
        *lock(&self.handlers.on_message) = Some(Box::new(handler));
    }

    pub fn set_on_connect<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *lock(&self.handlers.on_connect) = Some(Box::new(handler));
    }

    pub fn set_on_disconnect<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *lock(&self.handlers.on_disconnect) = Some(Box::new(handler));
    }

    pub fn set_on_error<F>(&self, handler: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        *lock(&self.handlers.on_error) = Some(Box::new(handler));
    }

    // --- Lifecycle ---

    /// Opens the connection if it is not already open.
    ///
    /// Without a token in the store this is a logged no-op: status and
    /// the observation surface stay exactly as they were. A failed
    /// handshake surfaces as status [`ConnectionStatus::Error`] plus the
    /// error callback, then runs the abnormal-close path, so retries use
    /// the same backoff whether the drop happens before or after open.
    pub async fn connect(&self) {
        let Some(token) = self.tokens.get() else {
            warn!("No auth token available for WebSocket connection");
            return;
        };

        if self.is_connected() {
            debug!("WebSocket already connected, ignoring connect()");
            return;
        }

        let url = match endpoint_url(&self.config, &token) {
            Ok(url) => url,
            Err(e) => {
                error!("Failed to build WebSocket URL: {}", e);
                self.set_status(ConnectionStatus::Error);
                self.handlers.error(&e.to_string());
                return;
            }
        };

        self.set_status(ConnectionStatus::Connecting);
        let epoch = self.state.epoch.load(Ordering::SeqCst);

        info!("Connecting to WebSocket: {}", url.path());
        match connect_async(url.as_str()).await {
            Ok((ws_stream, response)) => {
                debug!("WebSocket handshake complete: {:?}", response.status());
                if self.state.epoch.load(Ordering::SeqCst) != epoch {
                    // disconnect() raced the handshake; drop the stream.
                    info!("Connection torn down during handshake, discarding");
                    return;
                }
                self.install(ws_stream, epoch);
            }
            Err(e) => {
                error!("WebSocket connection failed: {}", e);
                if self.state.epoch.load(Ordering::SeqCst) == epoch {
                    self.set_status(ConnectionStatus::Error);
                    self.handlers.error(&e.to_string());
                    // A failed attempt behaves like an abnormal close:
                    // the close path decides whether a retry is due.
                    self.handle_close(ABNORMAL_CLOSURE, epoch).await;
                }
            }
        }
    }

    /// Closes the connection and cancels any pending reconnect.
    ///
    /// The pending timer is aborted before anything else so that a manual
    /// disconnect always wins over a scheduled automatic reconnect. Safe
    /// to call at any time, including when nothing is connected.
    pub async fn disconnect(&self) {
        self.state.epoch.fetch_add(1, Ordering::SeqCst);

        if let Some(timer) = lock(&self.state.reconnect_timer).take() {
            timer.abort();
        }

        let outbound = lock(&self.state.outbound).take();
        let had_connection = outbound.is_some();
        if let Some(tx) = outbound {
            let frame = CloseFrame {
                code: CloseCode::Normal,
                reason: "client disconnect".into(),
            };
            // Best effort; the writer task may already be gone.
            let _ = tx.send(Message::Close(Some(frame))).await;
        }

        if let Some(reader) = lock(&self.state.reader_task).take() {
            reader.abort();
        }

        self.set_status(ConnectionStatus::Disconnected);
        if had_connection {
            self.handlers.disconnect();
        }
    }

    /// Serializes `message` as JSON and transmits it if connected.
    ///
    /// While not connected this is a logged no-op; queueing is the
    /// caller's concern. Only serialization of the caller's own payload
    /// can produce an error.
    pub async fn send<T: Serialize>(&self, message: &T) -> Result<()> {
        if !self.is_connected() {
            warn!("WebSocket is not connected, dropping outbound message");
            return Ok(());
        }
        let text = serde_json::to_string(message)?;
        let tx = lock(&self.state.outbound).clone();
        if let Some(tx) = tx {
            if tx.send(Message::Text(text)).await.is_err() {
                warn!("WebSocket writer is gone, dropping outbound message");
            }
        } else {
            warn!("WebSocket is not connected, dropping outbound message");
        }
        Ok(())
    }

    // --- Internals ---

    fn set_status(&self, status: ConnectionStatus) {
        *lock(&self.state.status) = status;
    }

    /// Wires up the writer and reader tasks for a freshly opened stream
    /// and flips the manager to connected.
    fn install(&self, ws_stream: WsStream, epoch: u64) {
        let (mut write, mut read) = ws_stream.split();
        let (tx, mut rx) = mpsc::channel::<Message>(32);

        *lock(&self.state.outbound) = Some(tx.clone());
        self.state.attempts.store(0, Ordering::SeqCst);
        self.set_status(ConnectionStatus::Connected);
        info!("WebSocket connected");
        self.handlers.connect();

        // Writer: drains the channel into the sink. Ends when every
        // sender is dropped or the sink errors.
        tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                trace!("Sending WS message: {:?}", message);
                if let Err(e) = write.send(message).await {
                    error!("WebSocket send error: {}. Stopping writer task.", e);
                    break;
                }
            }
            debug!("WebSocket writer task finished");
        });

        // Reader: parses inbound frames, answers pings, and hands the
        // final close code to the reconnect logic.
        let manager = self.clone();
        let pong_tx = tx;
        let reader = tokio::spawn(async move {
            let mut close_code: u16 = ABNORMAL_CLOSURE;
            loop {
                match read.next().await {
                    Some(Ok(Message::Text(text))) => {
                        trace!("Received WS text frame: {}", text);
                        match serde_json::from_str::<WsMessage>(&text) {
                            Ok(message) => {
                                *lock(&manager.state.last_message) = Some(message.clone());
                                manager.handlers.message(&message);
                            }
                            Err(e) => {
                                error!("Failed to parse WebSocket message: {}", e);
                            }
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        if pong_tx.send(Message::Pong(payload)).await.is_err() {
                            error!("Failed to send Pong: writer channel closed");
                            break;
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Binary(_))) => {
                        trace!("Ignoring binary WS frame");
                    }
                    Some(Ok(Message::Close(frame))) => {
                        if let Some(frame) = &frame {
                            close_code = u16::from(frame.code);
                            info!(
                                "WebSocket closed: code={} reason={}",
                                close_code, frame.reason
                            );
                        } else {
                            info!("WebSocket closed without a close frame");
                        }
                        break;
                    }
                    Some(Ok(Message::Frame(_))) => {}
                    Some(Err(e)) => {
                        error!("WebSocket read error: {}", e);
                        break;
                    }
                    None => {
                        info!("WebSocket stream ended");
                        break;
                    }
                }
            }
            drop(pong_tx);
            manager.handle_close(close_code, epoch).await;
        });
        *lock(&self.state.reader_task) = Some(reader);
    }

    /// Runs when a connection ends for any reason other than a manual
    /// disconnect. Schedules a reconnect for abnormal closures while
    /// attempts remain.
    // Boxed because it is mutually recursive with `connect` through the
    // reconnect timer task; the explicit `Send` future breaks the cycle.
    fn handle_close(
        &self,
        close_code: u16,
        epoch: u64,
    ) -> futures_util::future::BoxFuture<'_, ()> {
        async move {
            if self.state.epoch.load(Ordering::SeqCst) != epoch {
                // disconnect() already owned this teardown.
                return;
            }

            *lock(&self.state.outbound) = None;
            self.set_status(ConnectionStatus::Disconnected);
            self.handlers.disconnect();

            if close_code == NORMAL_CLOSURE {
                return;
            }

            let attempt = self.state.attempts.load(Ordering::SeqCst);
            if attempt >= self.config.max_reconnect_attempts {
                warn!(
                    "WebSocket reconnect attempts exhausted after {} tries, staying disconnected",
                    attempt
                );
                return;
            }

            let attempt = attempt + 1;
            self.state.attempts.store(attempt, Ordering::SeqCst);
            let delay = reconnect_delay(self.config.reconnect_base_delay_ms, attempt);
            info!(
                "WebSocket closed abnormally (code={}), reconnecting in {:?} (attempt {})",
                close_code, delay, attempt
            );

            let manager = self.clone();
            let timer = tokio::spawn(async move {
                sleep(delay).await;
                if manager.state.epoch.load(Ordering::SeqCst) == epoch {
                    manager.connect().await;
                }
            });
            if let Some(previous) = lock(&self.state.reconnect_timer).replace(timer) {
                previous.abort();
            }
        }
        .boxed()
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("config", &self.config)
            .field("status", &self.status())
            .field("reconnect_attempts", &self.reconnect_attempts())
            .finish()
    }
}
