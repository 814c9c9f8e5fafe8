//! `LobbyClient`: one method per lobby use-case.
//!
//! Every use-case is the same five steps:
//!   1. Build the typed request and encode it into a frame
//!   2. Exchange it through the [`ConnectionManager`] (send + receive under
//!      one lock)
//!   3. Read the reply header and classify its message type against the
//!      operation: `base + 1` is success, `base + 2` failure, anything else
//!      an error
//!   4. On success, decode the payload type that success carries
//!   5. Check the payload's contents where there is something to check
//!
//! The header's message type is the one source of truth for success.
//! Payloads that also carry a `res` field are not consulted for the
//! outcome; a disagreement is logged at debug level and otherwise ignored.

use std::sync::Arc;
use std::time::Duration;

use pokerlobby_protocol::{
    decode, decode_header, encode, CreateTableRequest, Header, JoinTableRequest, LoginRequest,
    LoginResponse, Operation, Outcome, PokerTable, ScoreboardResponse, SignupRequest,
    TableListResponse, UserScore,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{ClientConfig, ClientError, ConnectionManager};

/// A successful reply, still undecoded.
struct Reply {
    header: Header,
    frame: Vec<u8>,
}

/// High-level client for the lobby server.
///
/// Cheap to clone: clones share the same [`ConnectionManager`], so requests
/// from all of them are serialized on the one socket.
///
/// # Example
///
/// ```rust,no_run
/// use pokerlobby::prelude::*;
///
/// # async fn run() -> Result<(), ClientError> {
/// let client = LobbyClient::builder()
///     .server("192.168.1.17", 8080)
///     .connect()
///     .await?;
///
/// let profile = client.login("alice", "secret").await?;
/// println!("{} has {} chips", profile.username, profile.balance);
///
/// for table in client.list_tables().await? {
///     println!("{}: {}/{}", table.table_name, table.current_players, table.max_players);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LobbyClient {
    manager: Arc<ConnectionManager>,
    config: ClientConfig,
}

impl LobbyClient {
    /// Creates a client with its own, not yet connected, manager.
    pub fn new(config: ClientConfig) -> Self {
        let manager = Arc::new(ConnectionManager::from_config(&config));
        Self { manager, config }
    }

    /// Creates a client on top of an existing, shared manager.
    pub fn with_manager(config: ClientConfig, manager: Arc<ConnectionManager>) -> Self {
        Self { manager, config }
    }

    /// Creates a new builder.
    pub fn builder() -> LobbyClientBuilder {
        LobbyClientBuilder::new()
    }

    /// The manager this client sends through.
    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Connects the manager to the configured server.
    ///
    /// A no-op if the manager is already connected (to any server).
    pub async fn connect(&self) -> Result<(), ClientError> {
        self.manager.connect(&self.config.host, self.config.port).await
    }

    /// Closes the connection.
    pub async fn disconnect(&self) {
        self.manager.disconnect().await;
    }

    // -- Use-cases --

    /// LOGIN: returns the account profile on success.
    ///
    /// # Errors
    /// [`ClientError::Rejected`] for bad credentials (message type 102),
    /// plus any transport or protocol error.
    pub async fn login(&self, user: &str, pass: &str) -> Result<LoginResponse, ClientError> {
        let op = Operation::Login;
        let reply = self.request(op, Some(&LoginRequest::new(user, pass))).await?;
        let profile: LoginResponse = decode_payload(op, &reply)?;

        if profile.result_code != reply.header.message_type.code() {
            tracing::debug!(
                header = %reply.header.message_type,
                payload = profile.result_code,
                "login reply result code disagrees with header; using header"
            );
        }
        tracing::info!(user_id = profile.user_id, username = %profile.username, "logged in");
        Ok(profile)
    }

    /// SIGNUP: registers a new account.
    pub async fn signup(&self, request: &SignupRequest) -> Result<(), ClientError> {
        self.request(Operation::Signup, Some(request)).await?;
        tracing::info!(user = %request.user, "account created");
        Ok(())
    }

    /// TABLE_LIST: the tables currently open in the lobby.
    ///
    /// An empty list is a normal answer.
    ///
    /// # Errors
    /// [`ClientError::InvalidResponse`] when the reply's count doesn't match
    /// the number of tables it carries.
    pub async fn list_tables(&self) -> Result<Vec<PokerTable>, ClientError> {
        let op = Operation::TableList;
        let reply = self.request::<()>(op, None).await?;
        let list: TableListResponse = decode_payload(op, &reply)?;

        if usize::try_from(list.count).ok() != Some(list.tables.len()) {
            return Err(ClientError::InvalidResponse {
                operation: op,
                reason: format!(
                    "count is {} but {} tables were sent",
                    list.count,
                    list.tables.len()
                ),
            });
        }
        tracing::debug!(count = list.tables.len(), "table list received");
        Ok(list.tables)
    }

    /// CREATE_TABLE: opens a new table. The creator is seated at it.
    pub async fn create_table(&self, request: &CreateTableRequest) -> Result<(), ClientError> {
        self.request(Operation::CreateTable, Some(request)).await?;
        tracing::info!(table = %request.table_name, "table created");
        Ok(())
    }

    /// JOIN_TABLE: takes a seat at an existing table.
    pub async fn join_table(&self, table_id: i32) -> Result<(), ClientError> {
        self.request(Operation::JoinTable, Some(&JoinTableRequest { table_id }))
            .await?;
        tracing::info!(table_id, "joined table");
        Ok(())
    }

    /// LEAVE_TABLE: gives up the current seat.
    pub async fn leave_table(&self) -> Result<(), ClientError> {
        self.request::<()>(Operation::LeaveTable, None).await?;
        tracing::info!("left table");
        Ok(())
    }

    /// SCOREBOARD: players ranked by balance.
    pub async fn scoreboard(&self) -> Result<Vec<UserScore>, ClientError> {
        let op = Operation::Scoreboard;
        let reply = self.request::<()>(op, None).await?;
        let board: ScoreboardResponse = decode_payload(op, &reply)?;
        Ok(board.users)
    }

    /// Encodes, exchanges, and classifies one request.
    ///
    /// Returns the reply only if it is the operation's success code.
    async fn request<T: Serialize>(
        &self,
        op: Operation,
        payload: Option<&T>,
    ) -> Result<Reply, ClientError> {
        let frame = encode(self.config.protocol_version, op.request().code(), payload)?;
        tracing::debug!(operation = %op, len = frame.len(), "sending request");

        let reply = self.manager.exchange(&frame).await?;
        let header = decode_header(&reply)?;

        match op.classify(header.message_type) {
            Some(Outcome::Success) => Ok(Reply {
                header,
                frame: reply,
            }),
            Some(Outcome::Failure) => {
                tracing::info!(operation = %op, "request rejected by server");
                Err(ClientError::Rejected {
                    operation: op,
                    message_type: header.message_type,
                })
            }
            None => {
                tracing::warn!(
                    operation = %op,
                    message_type = %header.message_type,
                    "unrecognized reply"
                );
                Err(ClientError::UnexpectedResponse {
                    operation: op,
                    message_type: header.message_type,
                })
            }
        }
    }
}

/// Decodes the payload a success reply must carry.
fn decode_payload<T: DeserializeOwned>(op: Operation, reply: &Reply) -> Result<T, ClientError> {
    decode::<T>(&reply.frame)?
        .payload
        .ok_or(ClientError::MissingPayload(op))
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring a [`LobbyClient`].
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use pokerlobby::LobbyClient;
///
/// let client = LobbyClient::builder()
///     .server("lobby.example.net", 9000)
///     .protocol_version(2)
///     .connect_timeout(Duration::from_secs(3))
///     .build();
///
/// assert_eq!(client.config().port, 9000);
/// ```
pub struct LobbyClientBuilder {
    config: ClientConfig,
    manager: Option<Arc<ConnectionManager>>,
}

impl LobbyClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            manager: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the server to connect to.
    pub fn server(mut self, host: &str, port: u16) -> Self {
        self.config.host = host.to_string();
        self.config.port = port;
        self
    }

    pub fn protocol_version(mut self, version: u8) -> Self {
        self.config.protocol_version = version;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Retries connecting up to `attempts` times in total, sleeping
    /// `backoff` in between.
    pub fn connect_retries(mut self, attempts: u32, backoff: Duration) -> Self {
        self.config.connect_attempts = attempts;
        self.config.retry_backoff = backoff;
        self
    }

    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.config.response_timeout = Some(timeout);
        self
    }

    /// Shares an existing manager instead of creating a new one. Its own
    /// timeout settings apply to the connection.
    pub fn manager(mut self, manager: Arc<ConnectionManager>) -> Self {
        self.manager = Some(manager);
        self
    }

    /// Builds the client without connecting.
    pub fn build(self) -> LobbyClient {
        match self.manager {
            Some(manager) => LobbyClient::with_manager(self.config, manager),
            None => LobbyClient::new(self.config),
        }
    }

    /// Builds the client and connects it.
    pub async fn connect(self) -> Result<LobbyClient, ClientError> {
        let client = self.build();
        client.connect().await?;
        Ok(client)
    }
}

impl Default for LobbyClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
