//! Envelope framing.
//!
//! Frame layout (16-byte header, little-endian):
//!   [0..4]   Magic bytes: "NCTY"
//!   [4..8]   Format version (u32)
//!   [8..12]  Payload length (u32)
//!   [12..16] xxHash32 checksum of the payload
//!   [16..]   bitcode-encoded `NetEnvelope`
//!
//! On send: encode envelope -> prepend header (with checksum of the payload).
//! On receive: check magic -> check version -> validate checksum -> decode.

use std::fmt;

use xxhash_rust::xxh32::xxh32;

use crate::messages::NetEnvelope;

/// Magic bytes identifying a NodeCity frame.
pub const MAGIC: [u8; 4] = *b"NCTY";

/// Size of the frame header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Current frame format version. Bumped only when the header layout or the
/// envelope schema changes incompatibly (field addition does not).
pub const FORMAT_VERSION: u32 = 1;

/// Seed for xxHash32 checksums.
const XXHASH_SEED: u32 = 0;

/// Errors produced while decoding a frame.
#[derive(Debug)]
pub enum WireError {
    /// Fewer bytes than a header, or payload shorter than declared.
    Truncated,
    /// First four bytes are not `MAGIC`.
    BadMagic,
    /// Frame was written by an incompatible format version.
    Version { expected: u32, found: u32 },
    /// Payload checksum mismatch (corruption in transit).
    BadChecksum,
    /// Payload bytes did not decode to an envelope.
    Decode(String),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::Truncated => write!(f, "truncated frame"),
            WireError::BadMagic => write!(f, "bad magic bytes"),
            WireError::Version { expected, found } => {
                write!(f, "frame version {found}, expected {expected}")
            }
            WireError::BadChecksum => write!(f, "payload checksum mismatch"),
            WireError::Decode(msg) => write!(f, "payload decode failed: {msg}"),
        }
    }
}

impl std::error::Error for WireError {}

/// Encodes an envelope into a checksummed frame.
pub fn encode_frame(envelope: &NetEnvelope) -> Vec<u8> {
    let payload = bitcode::encode(envelope);
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(&xxh32(&payload, XXHASH_SEED).to_le_bytes());
    out.extend_from_slice(&payload);
    out
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Decodes and validates a frame.
pub fn decode_frame(bytes: &[u8]) -> Result<NetEnvelope, WireError> {
    if bytes.len() < HEADER_SIZE {
        return Err(WireError::Truncated);
    }
    if bytes[0..4] != MAGIC {
        return Err(WireError::BadMagic);
    }
    let version = read_u32(bytes, 4);
    if version != FORMAT_VERSION {
        return Err(WireError::Version {
            expected: FORMAT_VERSION,
            found: version,
        });
    }
    let len = read_u32(bytes, 8) as usize;
    let checksum = read_u32(bytes, 12);
    let payload = &bytes[HEADER_SIZE..];
    if payload.len() != len {
        return Err(WireError::Truncated);
    }
    if xxh32(payload, XXHASH_SEED) != checksum {
        return Err(WireError::BadChecksum);
    }
    bitcode::decode(payload).map_err(|e| WireError::Decode(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::NetCommand;

    fn envelope() -> NetEnvelope {
        NetEnvelope {
            requester: 99,
            seq: 3,
            command: NetCommand::MoveNode {
                id: "n1".to_string(),
                position: [1.0, 2.0, 3.0],
            },
        }
    }

    #[test]
    fn frame_roundtrip() {
        let env = envelope();
        let frame = encode_frame(&env);
        assert_eq!(decode_frame(&frame).unwrap(), env);
    }

    #[test]
    fn bad_magic_rejected() {
        let mut frame = encode_frame(&envelope());
        frame[0] = b'X';
        assert!(matches!(decode_frame(&frame), Err(WireError::BadMagic)));
    }

    #[test]
    fn flipped_payload_bit_fails_checksum() {
        let mut frame = encode_frame(&envelope());
        let last = frame.len() - 1;
        frame[last] ^= 0x01;
        assert!(matches!(decode_frame(&frame), Err(WireError::BadChecksum)));
    }

    #[test]
    fn truncated_frame_rejected() {
        let frame = encode_frame(&envelope());
        assert!(matches!(
            decode_frame(&frame[..HEADER_SIZE - 2]),
            Err(WireError::Truncated)
        ));
        assert!(matches!(
            decode_frame(&frame[..frame.len() - 1]),
            Err(WireError::Truncated)
        ));
    }

    #[test]
    fn wrong_version_rejected() {
        let mut frame = encode_frame(&envelope());
        frame[4..8].copy_from_slice(&2u32.to_le_bytes());
        assert!(matches!(
            decode_frame(&frame),
            Err(WireError::Version { found: 2, .. })
        ));
    }
}
