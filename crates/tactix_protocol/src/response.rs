//! Response payload building and parsing.
//!
//! Every response starts with `{status: u8, error_code: u8}`; typed bodies
//! for create/list/join requests follow those two bytes.

use crate::types::{ErrorCode, GameSummary};
use crate::wire::{put_fixed, take_fixed, ProtocolError, MAX_PAYLOAD};
use crate::{GAME_ID_FIELD, NAME_FIELD};

const STATUS_OK: u8 = 0;
const STATUS_ERROR: u8 = 1;

/// Bytes per record in a list-games body.
const GAME_RECORD: usize = GAME_ID_FIELD + NAME_FIELD + 2;

/// Most records one list-games response can carry: the status pair plus the
/// count byte leave `MAX_PAYLOAD - 3` bytes for records, and the count byte
/// itself tops out at 255.
pub const MAX_GAMES_LISTED: usize = (MAX_PAYLOAD - 3) / GAME_RECORD;

/// Bare success response.
pub fn ok() -> Vec<u8> {
    vec![STATUS_OK, ErrorCode::None.as_u8()]
}

/// Error response carrying a stable numeric code.
pub fn error(code: ErrorCode) -> Vec<u8> {
    vec![STATUS_ERROR, code.as_u8()]
}

/// Success response for create-game and new-game: appends the game id.
pub fn created(game_id: &str) -> Vec<u8> {
    let mut buf = ok();
    put_fixed(&mut buf, game_id, GAME_ID_FIELD);
    buf
}

/// Success response for list-games: a count byte then that many records.
///
/// At most [`MAX_GAMES_LISTED`] records are emitted; anything past that
/// would overflow the count byte or the frame cap, so the tail is dropped.
pub fn game_list(games: &[GameSummary]) -> Vec<u8> {
    let shown = &games[..games.len().min(MAX_GAMES_LISTED)];
    let mut buf = ok();
    buf.push(shown.len() as u8);
    for game in shown {
        put_fixed(&mut buf, &game.game_id, GAME_ID_FIELD);
        put_fixed(&mut buf, &game.creator, NAME_FIELD);
        buf.push(game.status);
        buf.push(game.players);
    }
    buf
}

/// Success response for join-game: assigned symbol, opponent, game id.
pub fn joined(symbol: u8, opponent: &str, game_id: &str) -> Vec<u8> {
    let mut buf = ok();
    buf.push(symbol);
    put_fixed(&mut buf, opponent, NAME_FIELD);
    put_fixed(&mut buf, game_id, GAME_ID_FIELD);
    buf
}

/// A parsed response: the generic status pair plus any typed body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u8,
    pub error_code: u8,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn parse(payload: &[u8]) -> Result<Self, ProtocolError> {
        if payload.len() < 2 {
            return Err(ProtocolError::Malformed("response shorter than status pair"));
        }
        Ok(Self {
            status: payload[0],
            error_code: payload[1],
            body: payload[2..].to_vec(),
        })
    }

    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Reads the body of a create/new-game reply.
    pub fn game_id(&self) -> Result<String, ProtocolError> {
        if self.body.len() != GAME_ID_FIELD {
            return Err(ProtocolError::Malformed("created body size"));
        }
        Ok(take_fixed(&self.body))
    }

    /// Reads the body of a list-games reply.
    pub fn games(&self) -> Result<Vec<GameSummary>, ProtocolError> {
        let Some((&count, records)) = self.body.split_first() else {
            return Err(ProtocolError::Malformed("list body missing count"));
        };
        if records.len() != usize::from(count) * GAME_RECORD {
            return Err(ProtocolError::Malformed("list body size"));
        }
        Ok(records
            .chunks_exact(GAME_RECORD)
            .map(|rec| GameSummary {
                game_id: take_fixed(&rec[..GAME_ID_FIELD]),
                creator: take_fixed(&rec[GAME_ID_FIELD..GAME_ID_FIELD + NAME_FIELD]),
                status: rec[GAME_RECORD - 2],
                players: rec[GAME_RECORD - 1],
            })
            .collect())
    }

    /// Reads the body of a join-game reply: (symbol, opponent, game id).
    pub fn join_details(&self) -> Result<(u8, String, String), ProtocolError> {
        if self.body.len() != 1 + NAME_FIELD + GAME_ID_FIELD {
            return Err(ProtocolError::Malformed("join body size"));
        }
        let symbol = self.body[0];
        let opponent = take_fixed(&self.body[1..1 + NAME_FIELD]);
        let game_id = take_fixed(&self.body[1 + NAME_FIELD..]);
        Ok((symbol, opponent, game_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_responses_are_two_bytes() {
        assert_eq!(ok(), vec![0, 0]);
        assert_eq!(error(ErrorCode::NotYourTurn), vec![1, 9]);
    }

    #[test]
    fn created_reply_carries_the_game_id() {
        let reply = Reply::parse(&created("AB12")).unwrap();
        assert!(reply.is_ok());
        assert_eq!(reply.game_id().unwrap(), "AB12");
    }

    #[test]
    fn game_list_round_trips() {
        let games = vec![
            GameSummary {
                game_id: "G1".to_string(),
                creator: "alice".to_string(),
                status: 1,
                players: 1,
            },
            GameSummary {
                game_id: "G2".to_string(),
                creator: "bob_the_builder".to_string(),
                status: 1,
                players: 1,
            },
        ];
        let reply = Reply::parse(&game_list(&games)).unwrap();
        assert_eq!(reply.games().unwrap(), games);
    }

    #[test]
    fn empty_game_list_round_trips() {
        let reply = Reply::parse(&game_list(&[])).unwrap();
        assert!(reply.games().unwrap().is_empty());
    }

    #[test]
    fn oversized_game_lists_are_clamped_to_the_frame_cap() {
        let games: Vec<GameSummary> = (0..300)
            .map(|i| GameSummary {
                game_id: format!("G{i:03}"),
                creator: format!("player_{i}"),
                status: 1,
                players: 1,
            })
            .collect();

        let payload = game_list(&games);
        assert_eq!(usize::from(payload[2]), MAX_GAMES_LISTED);
        assert!(payload.len() <= MAX_PAYLOAD);

        // The clamped body still frames and parses; the dropped tail is the
        // only loss.
        let frame = crate::wire::encode_frame(50, 1, &payload);
        assert_eq!(frame.len(), crate::wire::HEADER_LEN + payload.len());
        let parsed = Reply::parse(&payload).unwrap().games().unwrap();
        assert_eq!(parsed.len(), MAX_GAMES_LISTED);
        assert_eq!(parsed[0].game_id, "G000");
    }

    #[test]
    fn a_full_clamped_list_fits_exactly_one_frame() {
        let games: Vec<GameSummary> = (0..MAX_GAMES_LISTED)
            .map(|i| GameSummary {
                game_id: format!("{i:015X}"),
                creator: "x".repeat(31),
                status: 1,
                players: 1,
            })
            .collect();
        let payload = game_list(&games);
        assert!(payload.len() <= MAX_PAYLOAD);
        assert_eq!(
            Reply::parse(&payload).unwrap().games().unwrap().len(),
            MAX_GAMES_LISTED
        );
    }

    #[test]
    fn join_reply_round_trips() {
        let reply = Reply::parse(&joined(b'O', "alice", "G7")).unwrap();
        assert_eq!(
            reply.join_details().unwrap(),
            (b'O', "alice".to_string(), "G7".to_string())
        );
    }

    #[test]
    fn short_payload_is_malformed() {
        assert!(Reply::parse(&[0]).is_err());
        assert!(Reply::parse(&[]).is_err());
    }
}
