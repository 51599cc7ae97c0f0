use crate::backoff::Backoff;
use crate::config::StreamConfig;
use crate::error::{ConnectError, StreamError};
use crate::nmea::NmeaCodec;
use crate::service::resolve_port;
use common::connection::ConnectionState;
use futures::StreamExt;
use module_core::{Event, EventKind};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, lookup_host};
use tokio::sync::broadcast::Sender;
use tokio::time::timeout;
use tokio_util::codec::FramedRead;
use tracing::{debug, error, info, warn};

/// Command asking gpsd to stream NMEA sentences for all devices.
pub const GPSD_WATCH_NMEA: &str = "?WATCH={\"enable\":true,\"nmea\":true};\r\n";

/// Size of a single read from the socket.
pub const READ_CHUNK_SIZE: usize = 4096;

/// Owner of the single outbound connection to the position source.
///
/// The connection is driven by [`run`](StreamConnection::run): connect,
/// stream samples onto the event bus until an error or hangup, tear down,
/// wait for the backoff delay and start over. Every state transition is
/// published as [`EventKind::ConnectionStateEvent`].
pub struct StreamConnection {
    config: Arc<StreamConfig>,
    state: ConnectionState,
    backoff: Backoff,
    sender: Sender<Event>,
}

impl StreamConnection {
    pub fn new(config: Arc<StreamConfig>, sender: Sender<Event>) -> Self {
        let backoff = Backoff::new(config.backoff);
        StreamConnection {
            config,
            state: ConnectionState::Disconnected,
            backoff,
            sender,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    fn set_state(&mut self, state: ConnectionState) {
        debug!("Stream connection {} -> {}", self.state, state);
        self.state = state;
        let _ = self.sender.send(Event {
            kind: EventKind::ConnectionStateEvent(state),
        });
    }

    /// Opens the connection to the configured source.
    ///
    /// Every address the target resolves to is tried in order until one
    /// accepts. In gpsd mode the watch command is written before the socket
    /// is handed out for reading. Only allowed from
    /// [`ConnectionState::Disconnected`]; on failure the state falls back to it.
    pub async fn connect(&mut self) -> Result<TcpStream, ConnectError> {
        if self.state != ConnectionState::Disconnected {
            return Err(ConnectError::Busy(self.state));
        }
        self.set_state(ConnectionState::Connecting);
        match self.open().await {
            Ok(socket) => {
                info!("Connected to {}", self.config);
                self.set_state(ConnectionState::Connected);
                Ok(socket)
            }
            Err(e) => {
                self.set_state(ConnectionState::Disconnected);
                Err(e)
            }
        }
    }

    async fn open(&self) -> Result<TcpStream, ConnectError> {
        let target = self.config.target();
        let port = resolve_port(&self.config.service).await?;
        let addresses = lookup_host((self.config.host.as_str(), port))
            .await
            .map_err(|source| ConnectError::Resolve {
                target: target.clone(),
                source,
            })?;

        let mut socket = None;
        for address in addresses {
            match timeout(self.config.connect_timeout, TcpStream::connect(address)).await {
                Ok(Ok(stream)) => {
                    socket = Some(stream);
                    break;
                }
                Ok(Err(e)) => debug!("Connecting to {address} failed: {e}"),
                Err(_) => debug!("Connecting to {address} timed out"),
            }
        }
        let mut socket = socket.ok_or(ConnectError::Unreachable {
            target: target.clone(),
        })?;

        if self.config.gpsd_handshake {
            socket
                .write_all(GPSD_WATCH_NMEA.as_bytes())
                .await
                .map_err(|source| ConnectError::Handshake { target, source })?;
        }
        Ok(socket)
    }

    /// Reads samples from `socket` and publishes them until the stream fails.
    ///
    /// Returns the reason the stream ended. The socket is closed before the
    /// state leaves [`ConnectionState::Closing`], so nothing is read from it
    /// after this returns.
    pub async fn stream(&mut self, socket: TcpStream) -> StreamError {
        let mut framed = FramedRead::with_capacity(socket, NmeaCodec::new(), READ_CHUNK_SIZE);
        let reason = loop {
            match framed.next().await {
                Some(Ok(position)) => {
                    let _ = self.sender.send(Event {
                        kind: EventKind::GnssPositionEvent(Arc::new(position)),
                    });
                }
                Some(Err(e)) => break e,
                None => break StreamError::Hangup,
            }
        };
        self.set_state(ConnectionState::Closing);
        drop(framed);
        self.set_state(ConnectionState::Disconnected);
        reason
    }

    /// Keeps the connection alive for the lifetime of the task.
    ///
    /// Never returns; abort the task to stop it.
    pub async fn run(mut self) {
        loop {
            match self.connect().await {
                Ok(socket) => {
                    self.backoff.reset();
                    let reason = self.stream(socket).await;
                    warn!("Connection to {} lost: {}", self.config.target(), reason);
                }
                Err(e) => error!("{e}"),
            }
            let delay = self.backoff.next_delay();
            info!(
                "Reconnecting to {} in {:?} (attempt {})",
                self.config.target(),
                delay,
                self.backoff.failures()
            );
            tokio::time::sleep(delay).await;
        }
    }
}
