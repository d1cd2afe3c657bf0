//! Game session records.

use crate::connection::ConnectionId;
use crate::registry::client::ClientHandle;
use tactix_game::{Match, MatchStatus, Seat};
use tactix_protocol::GameSummary;

/// One active two-player session: the embedded match state plus the
/// identities seated around it.
///
/// Slot 0 is always the creator (X); slot 1 is empty until a join is
/// accepted and is always O. At most one join request may be pending at a
/// time.
#[derive(Debug)]
pub struct GameSession {
    pub id: String,
    pub creator_conn: ConnectionId,
    pub creator_name: String,
    /// Second seat, filled when the creator accepts a join.
    pub joiner: Option<(ConnectionId, String)>,
    /// At most one join request awaiting the creator's decision.
    pub pending_join: Option<(ClientHandle, String)>,
    pub game: Match,
}

impl GameSession {
    pub fn new(id: String, creator_conn: ConnectionId, creator_name: String) -> Self {
        Self {
            id,
            creator_conn,
            creator_name,
            joiner: None,
            pending_join: None,
            game: Match::new(),
        }
    }

    pub fn players_count(&self) -> u8 {
        if self.joiner.is_some() {
            2
        } else {
            1
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.game.status() == MatchStatus::Waiting
    }

    /// Connection sitting in `seat`, if occupied.
    pub fn seat_conn(&self, seat: Seat) -> Option<ConnectionId> {
        match seat {
            Seat::Creator => Some(self.creator_conn),
            Seat::Joiner => self.joiner.as_ref().map(|(conn, _)| *conn),
        }
    }

    /// Display name sitting in `seat`, if occupied.
    pub fn seat_name(&self, seat: Seat) -> Option<&str> {
        match seat {
            Seat::Creator => Some(&self.creator_name),
            Seat::Joiner => self.joiner.as_ref().map(|(_, name)| name.as_str()),
        }
    }

    /// Record for the list-games response.
    pub fn summary(&self) -> GameSummary {
        GameSummary {
            game_id: self.id.clone(),
            creator: self.creator_name.clone(),
            status: self.game.status().as_byte(),
            players: self.players_count(),
        }
    }
}
