//! Codec trait and implementations for payload bytes.
//!
//! A frame is a fixed header followed by the payload, and the payload is
//! whatever the codec produces. The framing code doesn't care HOW payloads
//! are serialized; it only needs something that implements [`Codec`].
//!
//! The lobby server speaks MessagePack, so [`MsgPackCodec`] is the one
//! used by [`encode`](crate::encode) and [`decode`](crate::decode).

use std::io::Cursor;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to payload bytes and decode them back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → safe to share between threads (Tokio may run a
///   request on any worker thread).
/// - `'static` → the codec owns everything it needs and can live inside
///   long-lived client state.
///
/// `decode` asks for `DeserializeOwned` rather than `Deserialize<'de>`:
/// decoded payloads own their strings, so the receive buffer can be dropped
/// right after decoding.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into payload bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes payload bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// MsgPackCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses MessagePack (via `rmp-serde`).
///
/// Structs are written as maps keyed by field name (`to_vec_named`), not
/// as positional arrays. That is what the lobby server expects: a
/// `LoginRequest` goes out as `{"user": .., "pass": ..}`.
///
/// ## Example
///
/// ```rust
/// use pokerlobby_protocol::{Codec, LoginRequest, MsgPackCodec};
///
/// let codec = MsgPackCodec;
/// let request = LoginRequest::new("alice", "secret");
///
/// let bytes = codec.encode(&request).unwrap();
/// let decoded: LoginRequest = codec.decode(&bytes).unwrap();
/// assert_eq!(request, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackCodec;

impl Codec for MsgPackCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        rmp_serde::to_vec_named(value).map_err(|e| ProtocolError::Encode(Box::new(e)))
    }

    /// Rejects payloads with anything left over after the value: a second
    /// value or trailing junk means the payload is not what it claims.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        let mut cursor = Cursor::new(data);
        let value = {
            let mut de = rmp_serde::Deserializer::new(&mut cursor);
            T::deserialize(&mut de).map_err(|e| ProtocolError::Decode(Box::new(e)))?
        };

        let consumed = cursor.position();
        if consumed != data.len() as u64 {
            return Err(ProtocolError::Decode(
                format!(
                    "{} trailing bytes after a {consumed}-byte payload",
                    data.len() as u64 - consumed
                )
                .into(),
            ));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BaseResponse, LoginRequest};

    #[test]
    fn test_msgpack_writes_structs_as_named_maps() {
        let bytes = MsgPackCodec.encode(&LoginRequest::new("alice", "secret")).unwrap();

        // 0x82 = fixmap with two entries, then fixstr "user" (0xa4 + 4 bytes).
        assert_eq!(bytes[0], 0x82);
        assert_eq!(&bytes[1..6], b"\xa4user");
    }

    #[test]
    fn test_msgpack_decode_rejects_wrong_shape() {
        // A BaseResponse is a one-field map; asking for a LoginRequest
        // (which needs `user` and `pass`) must fail, not default.
        let bytes = MsgPackCodec.encode(&BaseResponse::new(101)).unwrap();
        let result: Result<LoginRequest, _> = MsgPackCodec.decode(&bytes);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_msgpack_decode_rejects_truncated_bytes() {
        let bytes = MsgPackCodec.encode(&LoginRequest::new("alice", "secret")).unwrap();
        let result: Result<LoginRequest, _> = MsgPackCodec.decode(&bytes[..bytes.len() - 3]);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_msgpack_decode_rejects_second_value() {
        let mut bytes = MsgPackCodec.encode(&BaseResponse::new(301)).unwrap();
        bytes.extend(MsgPackCodec.encode(&BaseResponse::new(302)).unwrap());

        let result: Result<BaseResponse, _> = MsgPackCodec.decode(&bytes);
        assert!(matches!(result, Err(ProtocolError::Decode(_))), "got {result:?}");
    }

    #[test]
    fn test_msgpack_decode_rejects_trailing_junk() {
        let mut bytes = MsgPackCodec.encode(&BaseResponse::new(101)).unwrap();
        bytes.push(0xC1);

        let result: Result<BaseResponse, _> = MsgPackCodec.decode(&bytes);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_msgpack_decode_exact_payload() {
        let bytes = MsgPackCodec.encode(&BaseResponse::new(101)).unwrap();
        let decoded: BaseResponse = MsgPackCodec.decode(&bytes).unwrap();
        assert_eq!(decoded, BaseResponse::new(101));
    }
}
