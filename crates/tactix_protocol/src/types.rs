//! Message taxonomy: frame types, error codes, notification kinds.

use crate::wire::ProtocolError;

/// Frame type discriminants. Values 1-9 are client requests; 50 and 51 are
/// the two server frame types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MsgType {
    Register = 1,
    CreateGame = 2,
    ListGames = 3,
    JoinGame = 4,
    AcceptJoin = 5,
    MakeMove = 6,
    LeaveGame = 7,
    NewGame = 8,
    Quit = 9,
    Response = 50,
    Notify = 51,
}

impl TryFrom<u8> for MsgType {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, ProtocolError> {
        Ok(match value {
            1 => MsgType::Register,
            2 => MsgType::CreateGame,
            3 => MsgType::ListGames,
            4 => MsgType::JoinGame,
            5 => MsgType::AcceptJoin,
            6 => MsgType::MakeMove,
            7 => MsgType::LeaveGame,
            8 => MsgType::NewGame,
            9 => MsgType::Quit,
            50 => MsgType::Response,
            51 => MsgType::Notify,
            other => return Err(ProtocolError::UnknownMessageType(other)),
        })
    }
}

/// Stable numeric error codes carried in error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    None = 0,
    GameNotFound = 1,
    GameFull = 2,
    RequestPending = 3,
    NoPendingJoin = 4,
    PendingJoinExists = 5,
    NotInLobby = 6,
    AlreadyInGame = 7,
    NotInGame = 8,
    NotYourTurn = 9,
    InvalidMove = 10,
    CellOccupied = 11,
    NotRegistered = 20,
    AlreadyRegistered = 21,
    InvalidName = 22,
    NameTaken = 23,
    ServerFull = 90,
    InvalidPayload = 91,
    Internal = 99,
}

impl ErrorCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Notification discriminants; the first payload byte of every `Notify`
/// frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NotifyKind {
    GameCreated = 100,
    JoinRequest = 101,
    JoinCancelled = 102,
    JoinResponse = 103,
    GameStart = 104,
    MoveMade = 105,
    GameEnd = 106,
    OpponentLeft = 107,
}

impl TryFrom<u8> for NotifyKind {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, ProtocolError> {
        Ok(match value {
            100 => NotifyKind::GameCreated,
            101 => NotifyKind::JoinRequest,
            102 => NotifyKind::JoinCancelled,
            103 => NotifyKind::JoinResponse,
            104 => NotifyKind::GameStart,
            105 => NotifyKind::MoveMade,
            106 => NotifyKind::GameEnd,
            107 => NotifyKind::OpponentLeft,
            other => return Err(ProtocolError::UnknownNotifyType(other)),
        })
    }
}

/// Personalized match result byte in a game-end notification.
pub mod match_result {
    pub const WIN: u8 = 1;
    pub const LOSE: u8 = 2;
    pub const DRAW: u8 = 3;
}

/// One record of a list-games response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub game_id: String,
    pub creator: String,
    pub status: u8,
    pub players: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msg_type_round_trips() {
        for v in [1u8, 2, 3, 4, 5, 6, 7, 8, 9, 50, 51] {
            let t = MsgType::try_from(v).unwrap();
            assert_eq!(t as u8, v);
        }
        assert!(MsgType::try_from(0).is_err());
        assert!(MsgType::try_from(42).is_err());
    }

    #[test]
    fn notify_kind_round_trips() {
        for v in 100u8..=107 {
            let k = NotifyKind::try_from(v).unwrap();
            assert_eq!(k as u8, v);
        }
        assert!(NotifyKind::try_from(99).is_err());
        assert!(NotifyKind::try_from(108).is_err());
    }
}
