//! Error types for the protocol layer.
//!
//! Each crate in pokerlobby defines its own error enum. A `ProtocolError`
//! always means the problem is in building or reading a frame, never in
//! the socket underneath it.

/// Errors that can occur while encoding or decoding a frame.
///
/// Every failure gets its own variant so callers can branch on it. In
/// particular a decode failure is never reported as an "empty" packet:
/// `Ok(Packet { payload: None, .. })` only ever means the server really
/// sent a header with no payload.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into payload bytes).
    ///
    /// The inner error comes from the codec. MessagePack rarely refuses a
    /// value, but a hand-written `Serialize` impl is free to.
    #[error("encode failed: {0}")]
    Encode(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The header plus payload would not fit in the 16-bit length field.
    ///
    /// `size` is the full frame size that was requested, header included.
    #[error("frame of {size} bytes exceeds the {max} byte limit")]
    FrameTooLarge { size: usize, max: usize },

    /// The buffer cannot even hold a header.
    #[error("frame too short: {len} bytes, a header needs 5")]
    TooShort { len: usize },

    /// The header's `packet_length` disagrees with the bytes we were given.
    ///
    /// Usually means a frame was cut short on the way in, or two frames
    /// were glued together.
    #[error("length mismatch: header declares {declared} bytes, got {actual}")]
    LengthMismatch { declared: u16, actual: usize },

    /// Deserialization failed (turning payload bytes into a Rust type).
    ///
    /// Common causes: the server replied with a different payload shape
    /// than the caller asked for, missing fields, or truncated data.
    #[error("decode failed: {0}")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),
}
