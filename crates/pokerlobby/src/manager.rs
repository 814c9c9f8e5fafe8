//! The connection manager: the single owner of the lobby socket.
//!
//! Every use-case in the client goes through one `ConnectionManager`. It
//! holds at most one [`StreamConnection`], creates it on the first
//! `connect`, and hands frames to it.
//!
//! # Why exchanges hold the lock
//!
//! The lobby protocol has no request IDs. The only way to know which
//! request a reply belongs to is that it is the next frame after the
//! request. So [`exchange`](ConnectionManager::exchange) keeps the mutex
//! locked from the moment the request is written until its reply has been
//! read; a second caller waits its turn instead of reading someone else's
//! answer.
//!
//! # Bare send and receive
//!
//! [`send`](ConnectionManager::send) and
//! [`receive`](ConnectionManager::receive) are also available for callers
//! that need them, but a reply is owed once a bare `send` succeeds. Until
//! a `receive` has read it, further `send` and `exchange` calls fail with
//! [`ClientError::ReplyPending`] instead of reading a reply that belongs to
//! someone else.
//!
//! # Cancellation
//!
//! If an exchange is dropped halfway (its task was cancelled, or the
//! response timeout fired), the reply may still arrive later and would be
//! read as the answer to the NEXT request. The manager therefore tears the
//! connection down in that case. The next call gets
//! [`ClientError::NotConnected`] and the caller reconnects.

use std::net::SocketAddr;
use std::time::Duration;

use pokerlobby_transport::StreamConnection;
use tokio::sync::Mutex;

use crate::{ClientConfig, ClientError};

/// The one live connection and where it points.
struct Held {
    conn: StreamConnection,
    host: String,
    port: u16,
    /// Set by a bare `send`, cleared by the `receive` that reads its reply.
    reply_pending: bool,
}

/// The held connection, if it is live.
fn live(slot: &mut Option<Held>) -> Result<&mut Held, ClientError> {
    match slot.as_mut() {
        Some(held) if held.conn.is_connected() => Ok(held),
        _ => Err(ClientError::NotConnected),
    }
}

/// The held connection, if it is live and owes no reply.
fn idle(slot: &mut Option<Held>) -> Result<&mut Held, ClientError> {
    let held = live(slot)?;
    if held.reply_pending {
        return Err(ClientError::ReplyPending);
    }
    Ok(held)
}

/// Owns the lobby connection and serializes access to it.
///
/// Create one at startup, share it with `Arc`, and pass it to whatever
/// needs to talk to the server. There is no global instance.
///
/// Interior mutability comes from a `tokio::sync::Mutex` (not
/// `std::sync::Mutex`): the lock is held across `.await` points while a
/// frame is in flight, which only an async mutex allows.
pub struct ConnectionManager {
    slot: Mutex<Option<Held>>,
    connect_timeout: Duration,
    connect_attempts: u32,
    retry_backoff: Duration,
    response_timeout: Option<Duration>,
}

impl ConnectionManager {
    /// Creates a manager with default timeouts and no connection.
    pub fn new() -> Self {
        Self::from_config(&ClientConfig::default())
    }

    /// Creates a manager using the timeout and retry settings of `config`.
    ///
    /// The host and port in `config` are not used here; they are passed to
    /// [`connect`](Self::connect).
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            slot: Mutex::new(None),
            connect_timeout: config.connect_timeout,
            connect_attempts: config.connect_attempts.max(1),
            retry_backoff: config.retry_backoff,
            response_timeout: config.response_timeout,
        }
    }

    /// Connects to `host:port`, unless a live connection already exists.
    ///
    /// The first successful call wins: while its connection is up, later
    /// calls return `Ok` and keep using it even if they name a different
    /// target (a warning is logged). Once the connection has been closed,
    /// by [`disconnect`](Self::disconnect) or by an I/O error, the next call
    /// connects to the target it is given.
    ///
    /// Connecting is retried up to `connect_attempts` times.
    ///
    /// # Errors
    /// Returns [`ClientError::Connect`] with the last attempt's error.
    pub async fn connect(&self, host: &str, port: u16) -> Result<(), ClientError> {
        let mut slot = self.slot.lock().await;

        if let Some(held) = slot.as_ref().filter(|h| h.conn.is_connected()) {
            if held.host != host || held.port != port {
                tracing::warn!(
                    id = %held.conn.id(),
                    current_host = %held.host,
                    current_port = held.port,
                    requested_host = %host,
                    requested_port = port,
                    "already connected; keeping the existing connection"
                );
            }
            return Ok(());
        }

        let mut conn = StreamConnection::new();
        let mut attempt = 1;
        loop {
            match conn.connect(host, port, self.connect_timeout).await {
                Ok(()) => break,
                Err(e) if attempt < self.connect_attempts => {
                    tracing::warn!(
                        attempt,
                        max = self.connect_attempts,
                        error = %e,
                        "connect attempt failed, retrying"
                    );
                    attempt += 1;
                    tokio::time::sleep(self.retry_backoff).await;
                }
                Err(e) => {
                    tracing::error!(%host, port, error = %e, "could not connect to lobby server");
                    *slot = None;
                    return Err(e.into());
                }
            }
        }

        *slot = Some(Held {
            conn,
            host: host.to_string(),
            port,
            reply_pending: false,
        });
        Ok(())
    }

    /// Sends one frame on the held connection.
    ///
    /// Prefer [`exchange`](Self::exchange) for request/response pairs.
    /// After a bare `send` the connection owes a reply, and only
    /// [`receive`](Self::receive) may run until it has been read.
    ///
    /// # Errors
    /// - [`ClientError::NotConnected`] without a live connection.
    /// - [`ClientError::ReplyPending`] if an earlier `send` is still waiting
    ///   for its `receive`.
    /// - [`ClientError::Send`] on I/O failure.
    pub async fn send(&self, frame: &[u8]) -> Result<(), ClientError> {
        let mut slot = self.slot.lock().await;
        let held = idle(&mut slot)?;
        let mut in_flight = InFlight::new(&mut held.conn);
        in_flight.conn().send(frame).await?;
        in_flight.complete();
        held.reply_pending = true;
        Ok(())
    }

    /// Reads the next complete frame from the held connection.
    ///
    /// # Errors
    /// [`ClientError::NotConnected`] without a live connection, otherwise
    /// [`ClientError::Receive`].
    pub async fn receive(&self) -> Result<Vec<u8>, ClientError> {
        let mut slot = self.slot.lock().await;
        let held = live(&mut slot)?;
        let mut in_flight = InFlight::new(&mut held.conn);
        let frame = in_flight.conn().receive().await?;
        in_flight.complete();
        held.reply_pending = false;
        Ok(frame)
    }

    /// Sends `request` and returns the very next frame, with no other
    /// exchange able to interleave.
    ///
    /// # Errors
    /// - [`ClientError::NotConnected`] without a live connection.
    /// - [`ClientError::ReplyPending`] while a bare `send` awaits its
    ///   `receive`.
    /// - [`ClientError::Send`] / [`ClientError::Receive`] on I/O failure.
    /// - [`ClientError::ResponseTimeout`] if a response timeout is
    ///   configured and expires.
    ///
    /// After an I/O error or timeout the connection is gone.
    pub async fn exchange(&self, request: &[u8]) -> Result<Vec<u8>, ClientError> {
        let mut slot = self.slot.lock().await;
        let held = idle(&mut slot)?;
        let mut in_flight = InFlight::new(&mut held.conn);

        in_flight.conn().send(request).await?;
        let reply = match self.response_timeout {
            Some(limit) => tokio::time::timeout(limit, in_flight.conn().receive())
                .await
                .map_err(|_| ClientError::ResponseTimeout(limit))??,
            None => in_flight.conn().receive().await?,
        };

        in_flight.complete();
        Ok(reply)
    }

    /// Closes and forgets the held connection. A no-op without one.
    pub async fn disconnect(&self) {
        let mut slot = self.slot.lock().await;
        if let Some(mut held) = slot.take() {
            held.conn.disconnect().await;
        }
    }

    /// `true` while a live connection is held.
    pub async fn is_connected(&self) -> bool {
        self.slot
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| h.conn.is_connected())
    }

    /// The server address of the live connection, if any.
    pub async fn peer_addr(&self) -> Option<SocketAddr> {
        self.slot
            .lock()
            .await
            .as_ref()
            .filter(|h| h.conn.is_connected())
            .and_then(|h| h.conn.peer_addr())
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop guard marking a frame as in flight on the connection.
///
/// If the guard is dropped before [`complete`](Self::complete), whatever
/// was happening on the socket didn't finish: an error was returned, or the
/// future was cancelled. Either way the stream position can't be trusted,
/// so the connection is aborted. `Drop` can't `.await`, which is why this
/// uses the synchronous [`StreamConnection::abort`].
struct InFlight<'a> {
    conn: &'a mut StreamConnection,
    armed: bool,
}

impl<'a> InFlight<'a> {
    fn new(conn: &'a mut StreamConnection) -> Self {
        Self { conn, armed: true }
    }

    fn conn(&mut self) -> &mut StreamConnection {
        &mut *self.conn
    }

    fn complete(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!(
                id = %self.conn.id(),
                "exchange did not complete, dropping connection"
            );
            self.conn.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =====================================================================
    // No connection
    // =====================================================================

    #[tokio::test]
    async fn test_send_without_connect_is_not_connected() {
        let manager = ConnectionManager::new();
        let result = manager.send(&[0, 5, 1, 0, 100]).await;
        assert!(matches!(result, Err(ClientError::NotConnected)));
    }

    #[tokio::test]
    async fn test_receive_without_connect_is_not_connected() {
        let manager = ConnectionManager::new();
        assert!(matches!(
            manager.receive().await,
            Err(ClientError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_exchange_without_connect_is_not_connected() {
        let manager = ConnectionManager::new();
        assert!(matches!(
            manager.exchange(&[0, 5, 1, 0, 100]).await,
            Err(ClientError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_disconnect_without_connect_is_noop() {
        let manager = ConnectionManager::new();
        manager.disconnect().await;
        manager.disconnect().await;
        assert!(!manager.is_connected().await);
        assert_eq!(manager.peer_addr().await, None);
    }

    #[test]
    fn test_zero_connect_attempts_means_one() {
        let config = ClientConfig {
            connect_attempts: 0,
            ..ClientConfig::default()
        };
        let manager = ConnectionManager::from_config(&config);
        assert_eq!(manager.connect_attempts, 1);
    }
}
