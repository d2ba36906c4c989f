//! Length-prefixed frame format.
//!
//! Every message on the wire is a fixed-width ASCII header followed by the
//! body it describes:
//!
//! ```text
//! +---------------------------------------------+------------------+
//! | decimal body length, left-justified,         | body             |
//! | right-padded with spaces                     | (UTF-8 JSON)     |
//! | 1024 bytes                                   | N bytes          |
//! +---------------------------------------------+------------------+
//! ```
//!
//! A single socket read may return fewer bytes than requested, so the
//! readers here keep their own count of how many header and body bytes have
//! arrived and only hand back a frame once both are complete.

use crate::error::ProtocolError;
use crate::MAX_PAYLOAD_SIZE;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of the fixed frame header in bytes.
pub const HEADER_SIZE: usize = 1024;

/// A complete frame body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame payload (one serialized envelope).
    pub payload: Bytes,
}

impl Frame {
    /// Creates a new frame with the given payload.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Creates a frame carrying the UTF-8 bytes of `text`.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(Bytes::from(text.into()))
    }

    /// Returns the payload as UTF-8 text.
    pub fn as_text(&self) -> Result<&str, ProtocolError> {
        std::str::from_utf8(&self.payload).map_err(|_| ProtocolError::InvalidUtf8)
    }

    /// Encodes the frame (header and payload) into bytes.
    pub fn encode(&self) -> Result<BytesMut, ProtocolError> {
        let header = encode_header(self.payload.len())?;
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + self.payload.len());
        buf.put_slice(&header);
        buf.put_slice(&self.payload);
        Ok(buf)
    }

    /// Decodes a frame from an accumulating buffer.
    ///
    /// Returns `Ok(Some(frame))` if a complete frame was decoded,
    /// `Ok(None)` if more data is needed, or `Err` on protocol errors.
    pub fn decode(buf: &mut BytesMut) -> Result<Option<Self>, ProtocolError> {
        Self::decode_limited(buf, MAX_PAYLOAD_SIZE)
    }

    /// Like [`Frame::decode`] with an explicit body size limit.
    pub fn decode_limited(buf: &mut BytesMut, max: usize) -> Result<Option<Self>, ProtocolError> {
        if buf.len() < HEADER_SIZE {
            return Ok(None);
        }

        let payload_len = parse_header(&buf[..HEADER_SIZE])?;
        if payload_len > max {
            return Err(ProtocolError::FrameTooLarge {
                size: payload_len,
                max,
            });
        }

        if buf.len() < HEADER_SIZE + payload_len {
            return Ok(None);
        }

        buf.advance(HEADER_SIZE);
        let payload = buf.split_to(payload_len).freeze();
        Ok(Some(Self { payload }))
    }
}

/// Renders `len` as a space-padded, left-justified decimal header.
pub fn encode_header(len: usize) -> Result<[u8; HEADER_SIZE], ProtocolError> {
    let digits = len.to_string();
    if digits.len() > HEADER_SIZE {
        return Err(ProtocolError::HeaderOverflow(len));
    }
    let mut header = [b' '; HEADER_SIZE];
    header[..digits.len()].copy_from_slice(digits.as_bytes());
    Ok(header)
}

/// Parses a header field back into a body length, ignoring padding.
pub fn parse_header(header: &[u8]) -> Result<usize, ProtocolError> {
    let text = std::str::from_utf8(header)
        .map_err(|_| ProtocolError::InvalidHeader(String::from_utf8_lossy(header).into_owned()))?;
    let trimmed = text.trim();
    trimmed
        .parse::<usize>()
        .map_err(|_| ProtocolError::InvalidHeader(preview(trimmed)))
}

fn preview(text: &str) -> String {
    const MAX_PREVIEW: usize = 32;
    match text.char_indices().nth(MAX_PREVIEW) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Reads one frame from `reader` using the default body size limit.
pub async fn read_frame<R>(reader: &mut R) -> Result<Frame, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    read_frame_limited(reader, MAX_PAYLOAD_SIZE).await
}

/// Reads one frame from `reader`, refusing bodies larger than `max` bytes.
pub async fn read_frame_limited<R>(reader: &mut R, max: usize) -> Result<Frame, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_SIZE];
    fill(reader, &mut header).await?;

    let payload_len = parse_header(&header)?;
    if payload_len > max {
        return Err(ProtocolError::FrameTooLarge {
            size: payload_len,
            max,
        });
    }

    let mut payload = vec![0u8; payload_len];
    fill(reader, &mut payload).await?;
    Ok(Frame::new(payload))
}

/// Writes `payload` as one frame and flushes the writer.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let header = encode_header(payload.len())?;
    writer.write_all(&header).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Fills `buf` completely, one read at a time.
async fn fill<R>(reader: &mut R, buf: &mut [u8]) -> Result<(), ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut received = 0;
    while received < buf.len() {
        let n = reader.read(&mut buf[received..]).await?;
        if n == 0 {
            return Err(ProtocolError::ConnectionClosed {
                expected: buf.len(),
                received,
            });
        }
        received += n;
    }
    Ok(())
}
