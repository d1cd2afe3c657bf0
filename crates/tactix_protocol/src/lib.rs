//! Wire protocol for the Tactix session server.
//!
//! Every message on the wire is one *frame*: a fixed 8-byte header followed
//! by a payload of at most [`MAX_PAYLOAD`] bytes:
//!
//! ```text
//! [type: u8][reserved: u8][length: u16 BE][seq: u32 BE][payload: length bytes]
//! ```
//!
//! Requests flow client to server; the server answers each request with a
//! single generic `Response` frame (status + error code + request-specific
//! body) echoing the request's sequence id, and pushes unsolicited `Notify`
//! frames for asynchronous events. The protocol supports exactly one
//! outstanding request per connection: responses carry no correlation beyond
//! the echoed sequence id, so a pipelining client cannot match replies to
//! requests.
//!
//! String fields are fixed-width, NUL-padded ASCII. Multi-byte integers are
//! big-endian.

pub mod notify;
pub mod request;
pub mod response;
pub mod types;
pub mod wire;

pub use request::Request;
pub use types::{ErrorCode, GameSummary, MsgType, NotifyKind};
pub use wire::{Header, ProtocolError, HEADER_LEN, MAX_PAYLOAD};

/// Width of a player-name field on the wire (31 chars + NUL).
pub const NAME_FIELD: usize = 32;

/// Width of a game-id field on the wire (15 chars + NUL).
pub const GAME_ID_FIELD: usize = 16;

/// Cells in a serialized board snapshot.
pub const BOARD_FIELD: usize = 9;

/// Checks a display name: non-empty, at most 31 bytes, ASCII alphanumeric
/// or underscore only.
pub fn validate_name(name: &str) -> bool {
    if name.is_empty() || name.len() >= NAME_FIELD {
        return false;
    }
    name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_validation_accepts_alnum_and_underscore() {
        assert!(validate_name("alice"));
        assert!(validate_name("player_2"));
        assert!(validate_name("A"));
        assert!(validate_name(&"x".repeat(31)));
    }

    #[test]
    fn name_validation_rejects_bad_input() {
        assert!(!validate_name(""));
        assert!(!validate_name(&"x".repeat(32)));
        assert!(!validate_name("with space"));
        assert!(!validate_name("emoji🎮"));
        assert!(!validate_name("semi;colon"));
    }
}
