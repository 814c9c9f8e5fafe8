//! Wire protocol for the poker lobby.
//!
//! This crate defines the "language" the lobby client and server speak:
//!
//! - **Frames** ([`Header`], [`Packet`], [`encode`], [`decode`]): the
//!   5-byte header and how a frame is built and taken apart.
//! - **Message types** ([`MessageType`], [`Operation`], [`Outcome`]): the
//!   numeric catalogue and its `base + 1` / `base + 2` reply rule.
//! - **Payloads** ([`LoginRequest`], [`TableListResponse`], ...): the
//!   typed records packed after the header.
//! - **Codec** ([`Codec`] trait, [`MsgPackCodec`]): how payloads become
//!   bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! Everything here is pure: no sockets, no state. The transport crate
//! moves whole frames; this crate gives them meaning.
//!
//! ```text
//! Transport (frames as bytes) → Protocol (Header + typed payload) → Client
//! ```

mod codec;
mod error;
mod frame;
mod message;
mod types;

pub use codec::{Codec, MsgPackCodec};
pub use error::ProtocolError;
pub use frame::{
    decode, decode_header, decode_with, encode, encode_with, Header, Packet, MAX_FRAME_LEN,
};
pub use message::{MessageType, Operation, Outcome};
pub use types::{
    BaseResponse, CreateTableRequest, JoinTableRequest, LoginRequest, LoginResponse, PokerTable,
    ScoreboardResponse, SignupRequest, TableListResponse, UserScore,
};
