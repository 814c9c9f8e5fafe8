//! The stream connection: one TCP socket to the lobby server.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::SinkExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::framing::{frame_reader, frame_writer, read_frame, write_frame, FrameReader, FrameWriter};
use crate::{ConnectError, ConnectionId, ConnectionState, ReceiveError, SendError};

/// Connect timeout used when the caller has no opinion.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Owns at most one live TCP socket and moves whole frames over it.
///
/// ## Lifecycle
///
/// ```text
/// Unconnected ──connect()──→ Connecting ──ok──→ Connected ──disconnect()/I/O error──→ Closed
///      ↑                          │                                                   │
///      └──────── timeout/error ───┘                         connect() again ◄─────────┘
/// ```
///
/// There is no automatic reconnection: after the connection closes, the
/// owner decides whether to call [`connect`](Self::connect) again.
///
/// All methods take `&mut self`. Sharing a connection between tasks is the
/// owner's job (the client crate wraps it in a mutex).
#[derive(Debug)]
pub struct StreamConnection {
    id: ConnectionId,
    state: ConnectionState,
    io: Option<Framed>,
    peer: Option<SocketAddr>,
}

/// Both halves of the socket, each behind the frame codec.
#[derive(Debug)]
struct Framed {
    reader: FrameReader<OwnedReadHalf>,
    writer: FrameWriter<OwnedWriteHalf>,
}

/// Holds the state at `Connecting` while a connect is in flight.
///
/// Dropping it puts the state back to `Unconnected`, whether the attempt
/// failed, timed out, or its future was dropped. A successful connect
/// sets `Connected` after the guard is gone.
struct ConnectingGuard<'a>(&'a mut ConnectionState);

impl<'a> ConnectingGuard<'a> {
    fn enter(state: &'a mut ConnectionState) -> Self {
        *state = ConnectionState::Connecting;
        Self(state)
    }
}

impl Drop for ConnectingGuard<'_> {
    fn drop(&mut self) {
        *self.0 = ConnectionState::Unconnected;
    }
}

impl StreamConnection {
    /// Creates an unconnected connection with a fresh ID.
    pub fn new() -> Self {
        Self {
            id: ConnectionId::next(),
            state: ConnectionState::Unconnected,
            io: None,
            peer: None,
        }
    }

    /// Returns the unique identifier for this connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Where the connection currently is in its lifecycle.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// `true` while a socket is open and usable.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected && self.io.is_some()
    }

    /// Address of the server, once connected.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Opens the TCP connection, giving up after `timeout`.
    ///
    /// Allowed from `Unconnected` and `Closed`. Calling it on a live
    /// connection is an error instead of silently leaking the old socket.
    ///
    /// # Errors
    /// - [`ConnectError::AlreadyConnected`] if a socket is already open.
    /// - [`ConnectError::Timeout`] if the handshake takes longer than
    ///   `timeout`.
    /// - [`ConnectError::Io`] for refused, unreachable, or unresolvable
    ///   targets.
    pub async fn connect(
        &mut self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<(), ConnectError> {
        let target = format!("{host}:{port}");
        if self.is_connected() {
            return Err(ConnectError::AlreadyConnected(target));
        }

        tracing::debug!(id = %self.id, %target, "connecting");
        let attempt = {
            let _connecting = ConnectingGuard::enter(&mut self.state);
            tokio::time::timeout(timeout, TcpStream::connect((host, port))).await
        };
        let stream = match attempt {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                tracing::warn!(id = %self.id, %target, error = %source, "connect failed");
                return Err(ConnectError::Io { target, source });
            }
            Err(_) => {
                tracing::warn!(id = %self.id, %target, ?timeout, "connect timed out");
                return Err(ConnectError::Timeout { target, timeout });
            }
        };

        // Frames are small request/response pairs; don't let Nagle hold
        // them back waiting for more data.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(id = %self.id, error = %e, "could not set TCP_NODELAY");
        }

        self.peer = stream.peer_addr().ok();
        let (read, write) = stream.into_split();
        self.io = Some(Framed {
            reader: frame_reader(read),
            writer: frame_writer(write),
        });
        self.state = ConnectionState::Connected;
        tracing::info!(id = %self.id, %target, "connected");
        Ok(())
    }

    /// Writes one complete frame and flushes it.
    ///
    /// # Errors
    /// - [`SendError::NotConnected`] if there is no socket.
    /// - [`SendError::Io`] on any write error. The connection is closed
    ///   afterwards, since the peer may have seen part of the frame.
    pub async fn send(&mut self, frame: &[u8]) -> Result<(), SendError> {
        let Some(io) = self.io.as_mut() else {
            return Err(SendError::NotConnected);
        };

        match write_frame(&mut io.writer, frame).await {
            Ok(()) => {
                tracing::debug!(id = %self.id, len = frame.len(), "frame sent");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(id = %self.id, error = %e, "send failed, closing");
                self.close_after_error();
                Err(e)
            }
        }
    }

    /// Reads exactly one complete frame.
    ///
    /// Keeps reading until the length declared in the frame's prefix has
    /// arrived, however many TCP segments that takes.
    ///
    /// # Errors
    /// - [`ReceiveError::NotConnected`] if there is no socket.
    /// - [`ReceiveError::Closed`] when the server hung up between frames.
    /// - [`ReceiveError::Truncated`], [`ReceiveError::InvalidLength`], or
    ///   [`ReceiveError::Io`] for broken streams.
    ///
    /// Every error except `NotConnected` closes the connection: once the
    /// stream position is unknown, later frames can't be trusted.
    pub async fn receive(&mut self) -> Result<Vec<u8>, ReceiveError> {
        let Some(io) = self.io.as_mut() else {
            return Err(ReceiveError::NotConnected);
        };

        match read_frame(&mut io.reader).await {
            Ok(frame) => {
                tracing::debug!(id = %self.id, len = frame.len(), "frame received");
                Ok(frame)
            }
            Err(ReceiveError::Closed) => {
                tracing::info!(id = %self.id, "server closed the connection");
                self.close_after_error();
                Err(ReceiveError::Closed)
            }
            Err(e) => {
                tracing::warn!(id = %self.id, error = %e, "receive failed, closing");
                self.close_after_error();
                Err(e)
            }
        }
    }

    /// Closes the socket. Safe to call any number of times.
    pub async fn disconnect(&mut self) {
        let Some(mut io) = self.io.take() else {
            return;
        };
        // Closing the writer flushes it and shuts down the write half, so
        // the server sees a clean close; dropping both halves then
        // releases the socket.
        if let Err(e) = io.writer.close().await {
            tracing::debug!(id = %self.id, error = %e, "shutdown failed");
        }
        drop(io);
        self.state = ConnectionState::Closed;
        tracing::info!(id = %self.id, "disconnected");
    }

    /// Drops the socket immediately, without a graceful shutdown.
    ///
    /// For callers that can't `.await` (drop guards) and need the
    /// connection gone because a frame was left half-read.
    pub fn abort(&mut self) {
        if self.io.take().is_some() {
            tracing::warn!(id = %self.id, "connection aborted");
        }
        self.state = ConnectionState::Closed;
    }

    fn close_after_error(&mut self) {
        self.io = None;
        self.state = ConnectionState::Closed;
    }
}

impl Default for StreamConnection {
    fn default() -> Self {
        Self::new()
    }
}
