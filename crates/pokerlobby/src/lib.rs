//! # pokerlobby
//!
//! Client for a poker lobby server that speaks a length-prefixed binary
//! protocol over one persistent TCP connection.
//!
//! The crate is layered:
//!
//! ```text
//! LobbyClient        login, list_tables, create_table, join_table, ...
//!     ↓
//! ConnectionManager  one socket, one request/response exchange at a time
//!     ↓
//! pokerlobby-transport  StreamConnection: connect / send / receive frames
//! pokerlobby-protocol   Header + MessagePack payloads, encode / decode
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pokerlobby::prelude::*;
//!
//! # async fn run() -> Result<(), ClientError> {
//! pokerlobby::init_tracing();
//!
//! let client = LobbyClient::builder()
//!     .server("127.0.0.1", 8080)
//!     .connect()
//!     .await?;
//!
//! match client.login("alice", "secret").await {
//!     Ok(profile) => println!("welcome, {}", profile.full_name),
//!     Err(ClientError::Rejected { .. }) => println!("wrong password"),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod manager;

pub use client::{LobbyClient, LobbyClientBuilder};
pub use config::ClientConfig;
pub use error::ClientError;
pub use manager::ConnectionManager;

// The lower layers are re-exported whole for callers that want to work
// with raw frames.
pub use pokerlobby_protocol as protocol;
pub use pokerlobby_transport as transport;

/// Installs a `tracing` subscriber that prints to stderr.
///
/// The filter comes from `RUST_LOG` (e.g. `RUST_LOG=pokerlobby=debug`) and
/// defaults to `info`. Calling it more than once is harmless; only the
/// first call installs anything.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Everything a typical caller needs, in one import.
pub mod prelude {
    pub use crate::{ClientConfig, ClientError, ConnectionManager, LobbyClient, LobbyClientBuilder};
    pub use pokerlobby_protocol::{
        CreateTableRequest, LoginResponse, MessageType, Operation, Outcome, PokerTable,
        SignupRequest, UserScore,
    };
}
