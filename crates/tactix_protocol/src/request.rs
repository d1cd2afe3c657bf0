//! Client request decoding.

use crate::types::MsgType;
use crate::wire::{take_fixed, ProtocolError};
use crate::{GAME_ID_FIELD, NAME_FIELD};

/// A decoded client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Register { name: String },
    CreateGame,
    ListGames,
    JoinGame { game_id: String },
    AcceptJoin { accept: bool },
    MakeMove { position: u8 },
    LeaveGame,
    NewGame,
    Quit,
}

impl Request {
    /// Decodes a request from its frame type and payload bytes.
    ///
    /// Payload lengths are exact: requests with no payload must arrive
    /// empty, fixed-field requests must carry the full field width.
    pub fn decode(msg_type: MsgType, payload: &[u8]) -> Result<Self, ProtocolError> {
        match msg_type {
            MsgType::Register => {
                if payload.len() != NAME_FIELD {
                    return Err(ProtocolError::Malformed("register payload size"));
                }
                Ok(Request::Register {
                    name: take_fixed(payload),
                })
            }
            MsgType::CreateGame => expect_empty(payload, Request::CreateGame),
            MsgType::ListGames => expect_empty(payload, Request::ListGames),
            MsgType::JoinGame => {
                if payload.len() != GAME_ID_FIELD {
                    return Err(ProtocolError::Malformed("join payload size"));
                }
                Ok(Request::JoinGame {
                    game_id: take_fixed(payload),
                })
            }
            MsgType::AcceptJoin => {
                if payload.len() != 1 {
                    return Err(ProtocolError::Malformed("accept payload size"));
                }
                Ok(Request::AcceptJoin {
                    accept: payload[0] != 0,
                })
            }
            MsgType::MakeMove => {
                if payload.len() != 1 {
                    return Err(ProtocolError::Malformed("move payload size"));
                }
                Ok(Request::MakeMove {
                    position: payload[0],
                })
            }
            MsgType::LeaveGame => expect_empty(payload, Request::LeaveGame),
            MsgType::NewGame => expect_empty(payload, Request::NewGame),
            MsgType::Quit => expect_empty(payload, Request::Quit),
            MsgType::Response | MsgType::Notify => {
                Err(ProtocolError::Malformed("server frame type in request"))
            }
        }
    }

    /// Encodes this request's payload bytes (the client side of the codec).
    pub fn encode_payload(&self) -> Vec<u8> {
        use crate::wire::put_fixed;
        match self {
            Request::Register { name } => {
                let mut buf = Vec::with_capacity(NAME_FIELD);
                put_fixed(&mut buf, name, NAME_FIELD);
                buf
            }
            Request::JoinGame { game_id } => {
                let mut buf = Vec::with_capacity(GAME_ID_FIELD);
                put_fixed(&mut buf, game_id, GAME_ID_FIELD);
                buf
            }
            Request::AcceptJoin { accept } => vec![u8::from(*accept)],
            Request::MakeMove { position } => vec![*position],
            Request::CreateGame
            | Request::ListGames
            | Request::LeaveGame
            | Request::NewGame
            | Request::Quit => Vec::new(),
        }
    }

    /// Frame type this request travels under.
    pub fn msg_type(&self) -> MsgType {
        match self {
            Request::Register { .. } => MsgType::Register,
            Request::CreateGame => MsgType::CreateGame,
            Request::ListGames => MsgType::ListGames,
            Request::JoinGame { .. } => MsgType::JoinGame,
            Request::AcceptJoin { .. } => MsgType::AcceptJoin,
            Request::MakeMove { .. } => MsgType::MakeMove,
            Request::LeaveGame => MsgType::LeaveGame,
            Request::NewGame => MsgType::NewGame,
            Request::Quit => MsgType::Quit,
        }
    }
}

fn expect_empty(payload: &[u8], request: Request) -> Result<Request, ProtocolError> {
    if payload.is_empty() {
        Ok(request)
    } else {
        Err(ProtocolError::Malformed("unexpected payload"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_round_trips_through_fixed_field() {
        let req = Request::Register {
            name: "alice".to_string(),
        };
        let payload = req.encode_payload();
        assert_eq!(payload.len(), NAME_FIELD);
        assert_eq!(Request::decode(MsgType::Register, &payload).unwrap(), req);
    }

    #[test]
    fn join_game_round_trips() {
        let req = Request::JoinGame {
            game_id: "1A2B3C4D5E6F00".to_string(),
        };
        let payload = req.encode_payload();
        assert_eq!(payload.len(), GAME_ID_FIELD);
        assert_eq!(Request::decode(MsgType::JoinGame, &payload).unwrap(), req);
    }

    #[test]
    fn wrong_sized_payloads_are_malformed() {
        assert!(Request::decode(MsgType::Register, b"short").is_err());
        assert!(Request::decode(MsgType::MakeMove, &[]).is_err());
        assert!(Request::decode(MsgType::MakeMove, &[5, 6]).is_err());
        assert!(Request::decode(MsgType::CreateGame, &[1]).is_err());
    }

    #[test]
    fn single_byte_requests_decode() {
        assert_eq!(
            Request::decode(MsgType::AcceptJoin, &[1]).unwrap(),
            Request::AcceptJoin { accept: true }
        );
        assert_eq!(
            Request::decode(MsgType::AcceptJoin, &[0]).unwrap(),
            Request::AcceptJoin { accept: false }
        );
        assert_eq!(
            Request::decode(MsgType::MakeMove, &[9]).unwrap(),
            Request::MakeMove { position: 9 }
        );
    }
}
