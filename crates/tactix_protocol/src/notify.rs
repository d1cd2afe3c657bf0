//! Notification payload building and parsing.
//!
//! Notifications are unsolicited server frames. Every payload opens with
//! its [`NotifyKind`] byte; the fields that follow depend on the kind.

use crate::types::NotifyKind;
use crate::wire::{put_fixed, take_fixed, ProtocolError};
use crate::{BOARD_FIELD, GAME_ID_FIELD, NAME_FIELD};

pub fn game_created(game_id: &str, creator: &str) -> Vec<u8> {
    let mut buf = vec![NotifyKind::GameCreated as u8];
    put_fixed(&mut buf, game_id, GAME_ID_FIELD);
    put_fixed(&mut buf, creator, NAME_FIELD);
    buf
}

pub fn join_request(joiner: &str) -> Vec<u8> {
    let mut buf = vec![NotifyKind::JoinRequest as u8];
    put_fixed(&mut buf, joiner, NAME_FIELD);
    buf
}

pub fn join_cancelled(joiner: &str) -> Vec<u8> {
    let mut buf = vec![NotifyKind::JoinCancelled as u8];
    put_fixed(&mut buf, joiner, NAME_FIELD);
    buf
}

pub fn join_response(accepted: bool, game_id: &str) -> Vec<u8> {
    let mut buf = vec![NotifyKind::JoinResponse as u8, u8::from(accepted)];
    put_fixed(&mut buf, game_id, GAME_ID_FIELD);
    buf
}

pub fn game_start(your_symbol: u8, first_player: u8, opponent: &str) -> Vec<u8> {
    let mut buf = vec![NotifyKind::GameStart as u8, your_symbol, first_player];
    put_fixed(&mut buf, opponent, NAME_FIELD);
    buf
}

pub fn move_made(position: u8, symbol: u8, board: &[u8; BOARD_FIELD]) -> Vec<u8> {
    let mut buf = vec![NotifyKind::MoveMade as u8, position, symbol];
    buf.extend_from_slice(board);
    buf
}

pub fn game_end(result: u8, board: &[u8; BOARD_FIELD]) -> Vec<u8> {
    let mut buf = vec![NotifyKind::GameEnd as u8, result];
    buf.extend_from_slice(board);
    buf
}

pub fn opponent_left() -> Vec<u8> {
    vec![NotifyKind::OpponentLeft as u8]
}

/// A parsed notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    GameCreated { game_id: String, creator: String },
    JoinRequest { joiner: String },
    JoinCancelled { joiner: String },
    JoinResponse { accepted: bool, game_id: String },
    GameStart { your_symbol: u8, first_player: u8, opponent: String },
    MoveMade { position: u8, symbol: u8, board: [u8; BOARD_FIELD] },
    GameEnd { result: u8, board: [u8; BOARD_FIELD] },
    OpponentLeft,
}

impl Notification {
    pub fn parse(payload: &[u8]) -> Result<Self, ProtocolError> {
        let Some((&kind, rest)) = payload.split_first() else {
            return Err(ProtocolError::Malformed("empty notification"));
        };
        let kind = NotifyKind::try_from(kind)?;
        match kind {
            NotifyKind::GameCreated => {
                if rest.len() != GAME_ID_FIELD + NAME_FIELD {
                    return Err(ProtocolError::Malformed("game-created size"));
                }
                Ok(Notification::GameCreated {
                    game_id: take_fixed(&rest[..GAME_ID_FIELD]),
                    creator: take_fixed(&rest[GAME_ID_FIELD..]),
                })
            }
            NotifyKind::JoinRequest => {
                if rest.len() != NAME_FIELD {
                    return Err(ProtocolError::Malformed("join-request size"));
                }
                Ok(Notification::JoinRequest {
                    joiner: take_fixed(rest),
                })
            }
            NotifyKind::JoinCancelled => {
                if rest.len() != NAME_FIELD {
                    return Err(ProtocolError::Malformed("join-cancelled size"));
                }
                Ok(Notification::JoinCancelled {
                    joiner: take_fixed(rest),
                })
            }
            NotifyKind::JoinResponse => {
                if rest.len() != 1 + GAME_ID_FIELD {
                    return Err(ProtocolError::Malformed("join-response size"));
                }
                Ok(Notification::JoinResponse {
                    accepted: rest[0] != 0,
                    game_id: take_fixed(&rest[1..]),
                })
            }
            NotifyKind::GameStart => {
                if rest.len() != 2 + NAME_FIELD {
                    return Err(ProtocolError::Malformed("game-start size"));
                }
                Ok(Notification::GameStart {
                    your_symbol: rest[0],
                    first_player: rest[1],
                    opponent: take_fixed(&rest[2..]),
                })
            }
            NotifyKind::MoveMade => {
                if rest.len() != 2 + BOARD_FIELD {
                    return Err(ProtocolError::Malformed("move-made size"));
                }
                let mut board = [0u8; BOARD_FIELD];
                board.copy_from_slice(&rest[2..]);
                Ok(Notification::MoveMade {
                    position: rest[0],
                    symbol: rest[1],
                    board,
                })
            }
            NotifyKind::GameEnd => {
                if rest.len() != 1 + BOARD_FIELD {
                    return Err(ProtocolError::Malformed("game-end size"));
                }
                let mut board = [0u8; BOARD_FIELD];
                board.copy_from_slice(&rest[1..]);
                Ok(Notification::GameEnd {
                    result: rest[0],
                    board,
                })
            }
            NotifyKind::OpponentLeft => {
                if !rest.is_empty() {
                    return Err(ProtocolError::Malformed("opponent-left size"));
                }
                Ok(Notification::OpponentLeft)
            }
        }
    }
}
