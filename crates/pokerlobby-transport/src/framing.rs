//! Length-prefixed framing over a byte stream.
//!
//! TCP delivers bytes, not messages: one frame may arrive split across
//! several reads, and several frames may arrive in one. Every frame starts
//! with a 16-bit big-endian length that counts the whole frame (prefix
//! included). [`FrameCodec`] turns that stream into whole frames on top of
//! `tokio_util`'s `LengthDelimitedCodec`, and hands each frame back with
//! its prefix still attached so the protocol crate sees the exact bytes the
//! server sent.
//!
//! Bytes that arrive after a frame stay in the reader's buffer and become
//! the start of the next frame.

use bytes::BytesMut;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Decoder, Encoder, FramedRead, FramedWrite, LengthDelimitedCodec};

use crate::{ReceiveError, SendError};

/// Size of the length prefix at the start of every frame.
pub const LENGTH_PREFIX_LEN: usize = 2;

/// Initial capacity of a reader's buffer.
pub(crate) const READ_BUFFER_CAPACITY: usize = 4096;

/// Reading half of a framed stream.
pub type FrameReader<R> = FramedRead<R, FrameCodec>;

/// Writing half of a framed stream.
pub type FrameWriter<W> = FramedWrite<W, FrameCodec>;

/// Codec for lobby frames.
///
/// Decoding yields one complete frame, prefix included. Encoding writes a
/// frame as given: frames are built whole by the protocol crate, prefix and
/// all, so nothing is added here.
#[derive(Debug)]
pub struct FrameCodec {
    inner: LengthDelimitedCodec,
}

impl FrameCodec {
    pub fn new() -> Self {
        // The length field counts the whole frame and the prefix is not
        // skipped, so the declared value is exactly the number of bytes to
        // hand out.
        let inner = LengthDelimitedCodec::builder()
            .length_field_offset(0)
            .length_field_length(LENGTH_PREFIX_LEN)
            .length_adjustment(0)
            .num_skip(0)
            .max_frame_length(usize::from(u16::MAX))
            .big_endian()
            .new_codec();
        Self { inner }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// The length prefix at the front of `buf`, if it has arrived.
fn declared_len(buf: &BytesMut) -> Option<u16> {
    match buf.get(..LENGTH_PREFIX_LEN) {
        Some(&[hi, lo]) => Some(u16::from_be_bytes([hi, lo])),
        _ => None,
    }
}

impl Decoder for FrameCodec {
    type Item = BytesMut;
    type Error = ReceiveError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>, ReceiveError> {
        // A prefix below 2 would make the inner codec hand out empty frames
        // without ever consuming the prefix.
        if let Some(declared) = declared_len(src) {
            if usize::from(declared) < LENGTH_PREFIX_LEN {
                return Err(ReceiveError::InvalidLength(declared));
            }
        }
        Ok(self.inner.decode(src)?)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>, ReceiveError> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if src.is_empty() {
            return Ok(None);
        }
        let expected = declared_len(src).map_or(LENGTH_PREFIX_LEN, usize::from);
        Err(ReceiveError::Truncated {
            expected,
            received: src.len(),
        })
    }
}

impl<'a> Encoder<&'a [u8]> for FrameCodec {
    type Error = SendError;

    fn encode(&mut self, frame: &'a [u8], dst: &mut BytesMut) -> Result<(), SendError> {
        dst.extend_from_slice(frame);
        Ok(())
    }
}

/// Wraps the reading side of a stream in a [`FrameCodec`].
pub fn frame_reader<R: AsyncRead>(io: R) -> FrameReader<R> {
    FramedRead::with_capacity(io, FrameCodec::new(), READ_BUFFER_CAPACITY)
}

/// Wraps the writing side of a stream in a [`FrameCodec`].
pub fn frame_writer<W: AsyncWrite>(io: W) -> FrameWriter<W> {
    FramedWrite::new(io, FrameCodec::new())
}

/// Reads exactly one frame, prefix included.
///
/// # Errors
/// - [`ReceiveError::Closed`] if the stream ends between frames.
/// - [`ReceiveError::Truncated`] if it ends anywhere inside a frame.
/// - [`ReceiveError::InvalidLength`] if the prefix declares fewer than 2
///   bytes.
/// - [`ReceiveError::Io`] on any read error.
pub async fn read_frame<R>(reader: &mut FrameReader<R>) -> Result<Vec<u8>, ReceiveError>
where
    R: AsyncRead + Unpin,
{
    match reader.next().await {
        Some(Ok(frame)) => {
            tracing::trace!(len = frame.len(), "frame assembled");
            Ok(frame.to_vec())
        }
        Some(Err(e)) => Err(e),
        None => Err(ReceiveError::Closed),
    }
}

/// Writes a whole frame and flushes it.
///
/// The caller never sees a partially-sent frame, only success or an error.
pub async fn write_frame<W>(writer: &mut FrameWriter<W>, frame: &[u8]) -> Result<(), SendError>
where
    W: AsyncWrite + Unpin,
{
    writer.send(frame).await
}
