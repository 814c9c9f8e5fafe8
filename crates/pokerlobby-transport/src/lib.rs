//! Transport layer for the poker lobby client.
//!
//! Provides [`StreamConnection`], which owns a single TCP socket, and the
//! length-prefixed framing ([`FrameCodec`], [`read_frame`], [`write_frame`])
//! it uses to turn a byte stream into whole frames.
//!
//! This crate knows only that every frame starts with a 16-bit big-endian
//! length counting the whole frame. What the rest of the header means is
//! the protocol crate's business.

mod error;
mod framing;
mod tcp;

pub use error::{ConnectError, ReceiveError, SendError};
pub use framing::{
    frame_reader, frame_writer, read_frame, write_frame, FrameCodec, FrameReader, FrameWriter,
    LENGTH_PREFIX_LEN,
};
pub use tcp::{StreamConnection, DEFAULT_CONNECT_TIMEOUT};

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique number attached to each [`StreamConnection`] so its log
/// lines can be told apart across reconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Hands out the next unused ID.
    pub(crate) fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lobby#{}", self.0)
    }
}

/// Lifecycle state of a [`StreamConnection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Never connected, or the last connect attempt failed.
    Unconnected,
    /// A connect attempt is in progress.
    Connecting,
    /// The socket is open.
    Connected,
    /// Closed by `disconnect` or by an I/O error.
    Closed,
}
