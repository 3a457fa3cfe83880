// WebSocket transport for one capture session
//
// Owns the single persistent channel: audio frames go out as raw binary
// messages, protocol events come back as JSON text messages. There is no
// retry and no outbound buffering; a frame sent while the channel is not
// open is dropped, which under real-time capture is expected loss.

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::messages::ServerMessage;
use crate::audio::AudioFrame;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Lifecycle of the session channel. Transitions are driven by backend
/// availability, never by the audio pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Idle = 0,
    Connecting = 1,
    Open = 2,
    Closed = 3,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to open channel to {endpoint}: {reason}")]
    OpenFailed { endpoint: String, reason: String },

    #[error("channel is not connected")]
    NotConnected,
}

struct StateCell(AtomicU8);

impl StateCell {
    fn new(state: ConnectionState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    fn load(&self) -> ConnectionState {
        match self.0.load(Ordering::SeqCst) {
            0 => ConnectionState::Idle,
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Open,
            _ => ConnectionState::Closed,
        }
    }

    fn store(&self, state: ConnectionState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }
}

/// Client side of the persistent audio/event channel.
pub struct StreamClient {
    state: Arc<StateCell>,
    sink: Arc<Mutex<Option<WsSink>>>,
    stream: Mutex<Option<WsStream>>,
    bytes_sent: AtomicUsize,
    frames_dropped: AtomicUsize,
}

impl StreamClient {
    /// A client in the `Idle` state, not yet connected to anything.
    pub fn new() -> Self {
        Self {
            state: Arc::new(StateCell::new(ConnectionState::Idle)),
            sink: Arc::new(Mutex::new(None)),
            stream: Mutex::new(None),
            bytes_sent: AtomicUsize::new(0),
            frames_dropped: AtomicUsize::new(0),
        }
    }

    /// Establish the channel. Failure is fatal to session start and is
    /// reported exactly once; the state ends up `Closed`.
    pub async fn open(&self, endpoint: &str) -> Result<(), TransportError> {
        // One channel per session lifetime; no reopen after close.
        if self.state.load() != ConnectionState::Idle {
            return Err(TransportError::OpenFailed {
                endpoint: endpoint.to_string(),
                reason: "channel already used".to_string(),
            });
        }

        info!("Opening channel to {}", endpoint);
        self.state.store(ConnectionState::Connecting);

        let (ws, _response) = match connect_async(endpoint).await {
            Ok(ok) => ok,
            Err(e) => {
                self.state.store(ConnectionState::Closed);
                return Err(TransportError::OpenFailed {
                    endpoint: endpoint.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        let (sink, stream) = ws.split();
        *self.sink.lock().await = Some(sink);
        *self.stream.lock().await = Some(stream);
        self.state.store(ConnectionState::Open);

        info!("Channel open");
        Ok(())
    }

    /// Transmit one frame as a raw binary message.
    ///
    /// Silently drops the frame unless the channel is `Open`; a send
    /// failure closes the channel. Never an error for the caller.
    pub async fn send_frame(&self, frame: &AudioFrame) {
        if self.state.load() != ConnectionState::Open {
            self.frames_dropped.fetch_add(1, Ordering::SeqCst);
            debug!("Channel not open, dropping frame");
            return;
        }

        let payload = frame.to_le_bytes();
        let len = payload.len();

        let mut sink = self.sink.lock().await;
        match sink.as_mut() {
            Some(sink) => {
                if let Err(e) = sink.send(Message::Binary(payload)).await {
                    warn!("Channel send failed, closing: {}", e);
                    self.state.store(ConnectionState::Closed);
                    self.frames_dropped.fetch_add(1, Ordering::SeqCst);
                } else {
                    self.bytes_sent.fetch_add(len, Ordering::SeqCst);
                }
            }
            None => {
                self.frames_dropped.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    /// Start consuming inbound messages.
    ///
    /// Returns a channel of parsed protocol events. Malformed messages
    /// are logged and dropped without terminating the session; the
    /// channel ends (and the state becomes `Closed`) when the remote
    /// side disconnects.
    pub async fn subscribe(&self) -> Result<mpsc::Receiver<ServerMessage>, TransportError> {
        let mut stream = self
            .stream
            .lock()
            .await
            .take()
            .ok_or(TransportError::NotConnected)?;

        let (event_tx, event_rx) = mpsc::channel(64);
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            while let Some(message) = stream.next().await {
                let text = match message {
                    Ok(Message::Text(text)) => text,
                    Ok(Message::Close(_)) => break,
                    Ok(_) => continue, // ping/pong/binary: nothing inbound uses these
                    Err(e) => {
                        warn!("Channel read error: {}", e);
                        break;
                    }
                };

                match serde_json::from_str::<ServerMessage>(&text) {
                    Ok(event) => {
                        if event_tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Malformed inbound message, dropping: {}", e);
                    }
                }
            }

            state.store(ConnectionState::Closed);
            info!("Inbound channel closed");
        });

        Ok(event_rx)
    }

    /// Close the channel. Idempotent.
    pub async fn close(&self) {
        let previous = self.state.load();
        self.state.store(ConnectionState::Closed);

        if let Some(mut sink) = self.sink.lock().await.take() {
            let _ = sink.close().await;
        }

        if previous != ConnectionState::Closed {
            info!("Channel closed");
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state.load()
    }

    /// Total payload bytes actually transmitted.
    pub fn bytes_sent(&self) -> usize {
        self.bytes_sent.load(Ordering::SeqCst)
    }

    /// Frames discarded because the channel was not open.
    pub fn frames_dropped(&self) -> usize {
        self.frames_dropped.load(Ordering::SeqCst)
    }
}

impl Default for StreamClient {
    fn default() -> Self {
        Self::new()
    }
}
