//! Frame layout and the encode/decode functions.
//!
//! Every message on the wire is one frame:
//!
//! ```text
//! ┌──────────────────┬──────────────┬────────────────┬──────────────────┐
//! │ packet_length u16│ version  u8  │ message_type u16│ payload ...     │
//! │ (big-endian)     │              │ (big-endian)    │ packet_length-5 │
//! └──────────────────┴──────────────┴────────────────┴──────────────────┘
//! ```
//!
//! `packet_length` counts the whole frame, header included, so the largest
//! frame is 65535 bytes and the largest payload 65530.

use serde::{de::DeserializeOwned, Serialize};

use crate::{Codec, MessageType, MsgPackCodec, ProtocolError};

/// Largest frame the 16-bit length field can describe.
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

/// The fixed 5-byte frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Total frame length in bytes, header included.
    pub packet_length: u16,
    pub protocol_version: u8,
    pub message_type: MessageType,
}

impl Header {
    /// Size of the header on the wire.
    pub const LEN: usize = 5;

    /// Builds the header for a payload of `payload_len` bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::FrameTooLarge` if the frame would not fit
    /// the length field.
    pub fn new(
        protocol_version: u8,
        message_type: MessageType,
        payload_len: usize,
    ) -> Result<Self, ProtocolError> {
        let size = Self::LEN + payload_len;
        let packet_length = u16::try_from(size).map_err(|_| ProtocolError::FrameTooLarge {
            size,
            max: MAX_FRAME_LEN,
        })?;
        Ok(Self {
            packet_length,
            protocol_version,
            message_type,
        })
    }

    /// Writes the header in wire order.
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let [l0, l1] = self.packet_length.to_be_bytes();
        let [t0, t1] = self.message_type.code().to_be_bytes();
        [l0, l1, self.protocol_version, t0, t1]
    }

    /// Reads a header from the front of `data`.
    ///
    /// Only the first five bytes are looked at; no length check against the
    /// rest of the buffer happens here.
    ///
    /// # Errors
    /// Returns `ProtocolError::TooShort` when `data` has fewer than 5 bytes.
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < Self::LEN {
            return Err(ProtocolError::TooShort { len: data.len() });
        }
        Ok(Self {
            packet_length: u16::from_be_bytes([data[0], data[1]]),
            protocol_version: data[2],
            message_type: MessageType(u16::from_be_bytes([data[3], data[4]])),
        })
    }

    /// Payload size implied by `packet_length`.
    pub fn payload_len(&self) -> usize {
        usize::from(self.packet_length).saturating_sub(Self::LEN)
    }
}

/// A decoded frame: its header and, if the frame had one, its payload.
///
/// `payload: None` means the server sent a bare header. It is a real
/// answer, never a stand-in for a decode failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet<T> {
    pub header: Header,
    pub payload: Option<T>,
}

// ---------------------------------------------------------------------------
// encode
// ---------------------------------------------------------------------------

/// Encodes a frame with the MessagePack codec.
///
/// See [`encode_with`].
pub fn encode<T: Serialize>(
    protocol_version: u8,
    message_type: u16,
    payload: Option<&T>,
) -> Result<Vec<u8>, ProtocolError> {
    encode_with(&MsgPackCodec, protocol_version, message_type, payload)
}

/// Packs `payload` (or nothing) and prepends the header.
///
/// # Errors
/// - `ProtocolError::Encode` if the codec refuses the payload.
/// - `ProtocolError::FrameTooLarge` if header + payload exceed 65535 bytes.
///   The length is never truncated.
pub fn encode_with<C: Codec, T: Serialize>(
    codec: &C,
    protocol_version: u8,
    message_type: u16,
    payload: Option<&T>,
) -> Result<Vec<u8>, ProtocolError> {
    let message_type = MessageType(message_type);
    let packed = match payload {
        Some(value) => codec.encode(value)?,
        None => Vec::new(),
    };
    let header = Header::new(protocol_version, message_type, packed.len())?;

    let mut frame = Vec::with_capacity(usize::from(header.packet_length));
    frame.extend_from_slice(&header.to_bytes());
    frame.extend_from_slice(&packed);

    tracing::trace!(
        len = header.packet_length,
        version = protocol_version,
        %message_type,
        "encoded frame"
    );
    Ok(frame)
}

// ---------------------------------------------------------------------------
// decode
// ---------------------------------------------------------------------------

/// Decodes a frame with the MessagePack codec.
///
/// See [`decode_with`].
pub fn decode<T: DeserializeOwned>(frame: &[u8]) -> Result<Packet<T>, ProtocolError> {
    decode_with(&MsgPackCodec, frame)
}

/// Parses and validates only the header of a complete frame.
///
/// Useful when the payload type depends on the message type: look at the
/// header first, then call [`decode`] with the right `T`.
///
/// # Errors
/// `TooShort` or `LengthMismatch`, exactly as [`decode_with`] would.
pub fn decode_header(frame: &[u8]) -> Result<Header, ProtocolError> {
    let header = Header::parse(frame)?;
    if usize::from(header.packet_length) != frame.len() {
        return Err(ProtocolError::LengthMismatch {
            declared: header.packet_length,
            actual: frame.len(),
        });
    }
    Ok(header)
}

/// Splits a complete frame into header and typed payload.
///
/// # Errors
/// - `ProtocolError::TooShort` when `frame` is under 5 bytes.
/// - `ProtocolError::LengthMismatch` when `packet_length != frame.len()`.
/// - `ProtocolError::Decode` when the payload isn't a valid `T`.
pub fn decode_with<C: Codec, T: DeserializeOwned>(
    codec: &C,
    frame: &[u8],
) -> Result<Packet<T>, ProtocolError> {
    let header = decode_header(frame)?;
    let body = &frame[Header::LEN..];

    let payload = if body.is_empty() {
        None
    } else {
        Some(codec.decode(body)?)
    };

    tracing::trace!(
        len = header.packet_length,
        version = header.protocol_version,
        message_type = %header.message_type,
        "decoded frame"
    );
    Ok(Packet { header, payload })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BaseResponse, LoginRequest, Operation, ScoreboardResponse, UserScore};

    // =====================================================================
    // Header
    // =====================================================================

    #[test]
    fn test_header_bytes_are_big_endian() {
        let header = Header::new(1, MessageType(0x0102), 0x0300).unwrap();
        assert_eq!(header.to_bytes(), [0x03, 0x05, 0x01, 0x01, 0x02]);
    }

    #[test]
    fn test_header_parse_reads_first_five_bytes() {
        let header = Header::parse(&[0x00, 0x09, 0x02, 0x01, 0xF5, 0xAA]).unwrap();
        assert_eq!(header.packet_length, 9);
        assert_eq!(header.protocol_version, 2);
        assert_eq!(header.message_type, MessageType(501));
        assert_eq!(header.payload_len(), 4);
    }

    // =====================================================================
    // encode
    // =====================================================================

    #[test]
    fn test_encode_login_scenario_bytes() {
        let request = LoginRequest::new("alice", "secret");
        let frame = encode(1, Operation::Login.request().code(), Some(&request)).unwrap();

        // fixmap(2) + "user" + "alice" + "pass" + "secret" = 24 payload bytes.
        assert_eq!(&frame[..5], &[0x00, 0x1D, 0x01, 0x00, 0x64]);
        assert_eq!(frame.len(), 29);
        assert_eq!(&frame[5..], &MsgPackCodec.encode(&request).unwrap()[..]);

        let packet: Packet<LoginRequest> = decode(&frame).unwrap();
        assert_eq!(packet.payload, Some(request));
        assert_eq!(packet.header.message_type, MessageType(100));
    }

    #[test]
    fn test_encode_without_payload_is_bare_header() {
        let frame = encode::<()>(1, 500, None).unwrap();
        assert_eq!(frame, vec![0x00, 0x05, 0x01, 0x01, 0xF4]);
    }

    #[test]
    fn test_encode_largest_frame_fits() {
        // A str16 costs 3 bytes of overhead: 3 + 65527 = 65530 payload bytes.
        let payload = "x".repeat(65_527);
        let frame = encode(1, 800, Some(&payload)).unwrap();
        assert_eq!(frame.len(), MAX_FRAME_LEN);
        assert_eq!(&frame[..2], &[0xFF, 0xFF]);
    }

    #[test]
    fn test_encode_oversized_frame_fails_instead_of_truncating() {
        let payload = "x".repeat(65_528);
        let result = encode(1, 800, Some(&payload));
        assert!(
            matches!(
                result,
                Err(ProtocolError::FrameTooLarge { size: 65_536, max: 65_535 })
            ),
            "got {result:?}"
        );
    }

    #[test]
    fn test_encode_reports_serializer_failure() {
        struct Unserializable;

        impl Serialize for Unserializable {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("no wire form"))
            }
        }

        let result = encode(1, 100, Some(&Unserializable));
        assert!(matches!(result, Err(ProtocolError::Encode(_))));
    }

    // =====================================================================
    // decode
    // =====================================================================

    #[test]
    fn test_decode_short_buffers_always_fail() {
        for len in 0..Header::LEN {
            let buf = vec![0u8; len];
            let result: Result<Packet<()>, _> = decode(&buf);
            assert!(
                matches!(result, Err(ProtocolError::TooShort { len: l }) if l == len),
                "len {len} should be TooShort"
            );
        }
    }

    #[test]
    fn test_decode_length_mismatch() {
        let mut frame = encode(1, 101, Some(&LoginRequest::new("a", "b"))).unwrap();
        frame.push(0xC0);
        let result: Result<Packet<LoginRequest>, _> = decode(&frame);
        assert!(matches!(
            result,
            Err(ProtocolError::LengthMismatch { actual, .. }) if actual == frame.len()
        ));

        // Truncated on the other side.
        frame.truncate(frame.len() - 4);
        let result: Result<Packet<LoginRequest>, _> = decode(&frame);
        assert!(matches!(result, Err(ProtocolError::LengthMismatch { .. })));
    }

    #[test]
    fn test_decode_zero_length_header_is_an_error() {
        // The old "packetLength == 0 means nothing arrived" sentinel must
        // surface as an error, not an empty packet.
        let result: Result<Packet<()>, _> = decode(&[0, 0, 0, 0, 0]);
        assert!(matches!(
            result,
            Err(ProtocolError::LengthMismatch { declared: 0, actual: 5 })
        ));
    }

    #[test]
    fn test_decode_empty_payload_is_none() {
        let frame = encode::<()>(3, 701, None).unwrap();
        let packet: Packet<ScoreboardResponse> = decode(&frame).unwrap();
        assert_eq!(packet.payload, None);
        assert_eq!(packet.header.protocol_version, 3);
        assert_eq!(packet.header.packet_length, 5);
    }

    #[test]
    fn test_decode_wrong_payload_type_fails() {
        let frame = encode(1, 100, Some(&LoginRequest::new("alice", "secret"))).unwrap();
        let result: Result<Packet<ScoreboardResponse>, _> = decode(&frame);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_rejects_two_payloads_in_one_frame() {
        let mut body = MsgPackCodec.encode(&BaseResponse::new(301)).unwrap();
        body.extend(MsgPackCodec.encode(&BaseResponse::new(302)).unwrap());

        let header = Header::new(1, MessageType(301), body.len()).unwrap();
        let mut frame = header.to_bytes().to_vec();
        frame.extend_from_slice(&body);

        // The header still parses; only the payload is refused.
        assert_eq!(decode_header(&frame).unwrap(), header);
        let result: Result<Packet<BaseResponse>, _> = decode(&frame);
        assert!(matches!(result, Err(ProtocolError::Decode(_))), "got {result:?}");
    }

    #[test]
    fn test_round_trip_across_versions_and_types() {
        let payload = ScoreboardResponse {
            users: vec![
                UserScore { rank: 1, id: 42, balance: 9_000 },
                UserScore { rank: 2, id: 7, balance: -15 },
            ],
        };

        // Every version, and message types spread over the whole u16 range.
        let message_types = (0..=u16::MAX).step_by(257).chain([u16::MAX]);
        for (version, message_type) in (0..=u8::MAX).cycle().zip(message_types) {
            let frame = encode(version, message_type, Some(&payload)).unwrap();
            let packet: Packet<ScoreboardResponse> = decode(&frame).unwrap();

            assert_eq!(
                packet.header,
                Header {
                    packet_length: frame.len() as u16,
                    protocol_version: version,
                    message_type: MessageType(message_type),
                }
            );
            assert_eq!(packet.payload.as_ref(), Some(&payload));
        }
    }
}
