//! Client records and the connection state machine.

use crate::connection::ConnectionId;
use tactix_game::Seat;

/// Handle of a client record inside the registry's client arena.
pub type ClientHandle = usize;

/// Handle of a game session inside the registry's game arena.
pub type GameHandle = usize;

/// Where a connection sits in its lifecycle.
///
/// ```text
/// Connected -> Registered -> { InLobby | RequestingJoin | InGame } -> Registered -> ...
/// ```
///
/// Disconnection is terminal from every state and is represented by the
/// record being removed, not by a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Socket accepted, no name registered yet.
    Connected,
    /// Name registered, available for play.
    Registered,
    /// Created a session, waiting for a join request.
    InLobby,
    /// Asked to join a session, waiting for accept/reject.
    RequestingJoin,
    /// Playing an active match.
    InGame,
}

/// One record per connected socket.
///
/// `game` is `Some` if and only if the state is `InLobby`, `RequestingJoin`,
/// or `InGame`; `seat` is `Some` only for `InLobby` and `InGame`.
#[derive(Debug)]
pub struct ClientRecord {
    pub conn: ConnectionId,
    /// Display name; empty until registration succeeds.
    pub name: String,
    pub state: ClientState,
    pub game: Option<GameHandle>,
    pub seat: Option<Seat>,
}

impl ClientRecord {
    pub fn new(conn: ConnectionId) -> Self {
        Self {
            conn,
            name: String::new(),
            state: ClientState::Connected,
            game: None,
            seat: None,
        }
    }

    /// Drops any session linkage and returns the client to `Registered`.
    pub fn reset_to_registered(&mut self) {
        self.state = ClientState::Registered;
        self.game = None;
        self.seat = None;
    }
}
