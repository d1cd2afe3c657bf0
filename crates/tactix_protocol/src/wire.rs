//! Frame header layout and byte-order-safe framed I/O.
//!
//! Reads loop until the exact byte count arrives; a clean EOF before the
//! first header byte is reported as `Ok(None)` so callers can distinguish
//! an orderly disconnect from a truncated frame.

use std::io;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of the fixed frame header.
pub const HEADER_LEN: usize = 8;

/// Hard cap on payload length. A header claiming more is a protocol
/// violation and the connection must be dropped.
pub const MAX_PAYLOAD: usize = 4096;

/// Errors produced by the codec.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("frame payload of {0} bytes exceeds the {MAX_PAYLOAD} byte limit")]
    FrameTooLarge(usize),

    #[error("unknown message type {0}")]
    UnknownMessageType(u8),

    #[error("unknown notification type {0}")]
    UnknownNotifyType(u8),

    #[error("malformed payload: {0}")]
    Malformed(&'static str),
}

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub msg_type: u8,
    pub length: u16,
    pub seq: u32,
}

impl Header {
    /// Serializes the header into its 8-byte wire form.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0] = self.msg_type;
        // buf[1] reserved, always zero
        buf[2..4].copy_from_slice(&self.length.to_be_bytes());
        buf[4..8].copy_from_slice(&self.seq.to_be_bytes());
        buf
    }

    /// Parses a header from its 8-byte wire form.
    pub fn decode(buf: &[u8; HEADER_LEN]) -> Self {
        Self {
            msg_type: buf[0],
            length: u16::from_be_bytes([buf[2], buf[3]]),
            seq: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
        }
    }
}

/// Builds a complete frame (header + payload) ready for a single write.
///
/// # Panics
///
/// Panics if `payload` exceeds [`MAX_PAYLOAD`]; all payloads built by this
/// crate are far below the cap.
pub fn encode_frame(msg_type: u8, seq: u32, payload: &[u8]) -> Vec<u8> {
    assert!(payload.len() <= MAX_PAYLOAD, "payload exceeds frame cap");
    let header = Header {
        msg_type,
        length: payload.len() as u16,
        seq,
    };
    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(&header.encode());
    frame.extend_from_slice(payload);
    frame
}

/// Writes one frame as a single logical write.
pub async fn write_frame<W>(
    writer: &mut W,
    msg_type: u8,
    seq: u32,
    payload: &[u8],
) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&encode_frame(msg_type, seq, payload)).await?;
    Ok(())
}

/// Reads one frame header.
///
/// Returns `Ok(None)` on a clean EOF before any header byte arrives. A
/// connection closed mid-header surfaces as an `UnexpectedEof` I/O error.
/// The payload length is checked against [`MAX_PAYLOAD`] here so callers
/// never allocate for an oversized claim.
pub async fn read_header<R>(reader: &mut R) -> Result<Option<Header>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; HEADER_LEN];
    let mut filled = 0usize;
    while filled < HEADER_LEN {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(ProtocolError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed mid-header",
            )));
        }
        filled += n;
    }
    let header = Header::decode(&buf);
    if usize::from(header.length) > MAX_PAYLOAD {
        return Err(ProtocolError::FrameTooLarge(usize::from(header.length)));
    }
    Ok(Some(header))
}

/// Reads exactly `length` payload bytes for a previously read header.
pub async fn read_payload<R>(reader: &mut R, length: u16) -> Result<Vec<u8>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut payload = vec![0u8; usize::from(length)];
    if !payload.is_empty() {
        reader.read_exact(&mut payload).await?;
    }
    Ok(payload)
}

/// Appends `s` as a fixed-width, NUL-padded field. Oversized input is
/// truncated to `width - 1` bytes so the field always ends with a NUL.
pub fn put_fixed(buf: &mut Vec<u8>, s: &str, width: usize) {
    let bytes = s.as_bytes();
    let take = bytes.len().min(width - 1);
    buf.extend_from_slice(&bytes[..take]);
    buf.resize(buf.len() + (width - take), 0);
}

/// Extracts a fixed-width field: the bytes up to the first NUL (or the whole
/// field), interpreted as ASCII with non-ASCII bytes replaced.
pub fn take_fixed(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trips() {
        let header = Header {
            msg_type: 4,
            length: 16,
            seq: 0xDEAD_BEEF,
        };
        let bytes = header.encode();
        assert_eq!(bytes[1], 0, "reserved byte must stay zero");
        assert_eq!(Header::decode(&bytes), header);
    }

    #[test]
    fn header_fields_are_big_endian() {
        let header = Header {
            msg_type: 1,
            length: 0x0102,
            seq: 0x0A0B_0C0D,
        };
        let bytes = header.encode();
        assert_eq!(&bytes[2..4], &[0x01, 0x02]);
        assert_eq!(&bytes[4..8], &[0x0A, 0x0B, 0x0C, 0x0D]);
    }

    #[test]
    fn fixed_fields_pad_and_truncate() {
        let mut buf = Vec::new();
        put_fixed(&mut buf, "bob", 8);
        assert_eq!(buf, b"bob\0\0\0\0\0");
        assert_eq!(take_fixed(&buf), "bob");

        let mut long = Vec::new();
        put_fixed(&mut long, "abcdefghij", 8);
        assert_eq!(long.len(), 8);
        assert_eq!(take_fixed(&long), "abcdefg");
    }

    #[tokio::test]
    async fn frames_round_trip_over_a_duplex_pipe() {
        let (mut a, mut b) = tokio::io::duplex(256);
        write_frame(&mut a, 6, 42, &[5]).await.unwrap();

        let header = read_header(&mut b).await.unwrap().unwrap();
        assert_eq!(header.msg_type, 6);
        assert_eq!(header.length, 1);
        assert_eq!(header.seq, 42);
        let payload = read_payload(&mut b, header.length).await.unwrap();
        assert_eq!(payload, vec![5]);
    }

    #[tokio::test]
    async fn clean_eof_is_distinguished_from_truncation() {
        let (a, mut b) = tokio::io::duplex(256);
        drop(a);
        assert!(read_header(&mut b).await.unwrap().is_none());

        let (mut a, mut b) = tokio::io::duplex(256);
        use tokio::io::AsyncWriteExt;
        a.write_all(&[1, 0, 0]).await.unwrap();
        drop(a);
        match read_header(&mut b).await {
            Err(ProtocolError::Io(e)) => {
                assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof)
            }
            other => panic!("expected truncation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn oversized_length_claim_is_rejected() {
        let (mut a, mut b) = tokio::io::duplex(256);
        let bad = Header {
            msg_type: 1,
            length: (MAX_PAYLOAD + 1) as u16,
            seq: 0,
        };
        use tokio::io::AsyncWriteExt;
        a.write_all(&bad.encode()).await.unwrap();
        match read_header(&mut b).await {
            Err(ProtocolError::FrameTooLarge(n)) => assert_eq!(n, MAX_PAYLOAD + 1),
            other => panic!("expected FrameTooLarge, got {other:?}"),
        }
    }
}
