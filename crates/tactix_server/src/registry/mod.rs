//! In-memory session registry: the clients table and the games table.
//!
//! The registry is an owned object handed by `Arc` to every connection
//! task. All mutation goes through its methods, which take the single
//! internal lock; that lock totally orders every registry transition across
//! all connections. Methods return plain report structs describing what
//! changed and who must be notified, computed while the lock is still held
//! so every notification reflects a consistent snapshot. No method performs
//! network I/O.

mod arena;
pub mod client;
pub mod game;

pub use client::{ClientHandle, ClientRecord, ClientState, GameHandle};
pub use game::GameSession;

use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;
use tracing::debug;

use crate::connection::ConnectionId;
use arena::Arena;
use tactix_game::{MoveError, Outcome, Seat};
use tactix_protocol::types::match_result;
use tactix_protocol::{validate_name, ErrorCode, GameSummary, BOARD_FIELD};

/// Result of a successful create-game (or new-game) request.
#[derive(Debug)]
pub struct CreateReport {
    pub game_id: String,
    pub creator: String,
    /// Connections of every other client currently in `Registered` state;
    /// they receive the game-created broadcast.
    pub lobby_broadcast: Vec<ConnectionId>,
}

/// Result of a successful join-game request.
#[derive(Debug)]
pub struct JoinReport {
    pub game_id: String,
    pub creator_conn: ConnectionId,
    /// The creator's name, reported back to the joiner as the opponent.
    pub opponent: String,
    pub joiner: String,
}

/// Result of a successful accept-join request (either decision).
#[derive(Debug)]
pub struct AcceptReport {
    pub accepted: bool,
    pub game_id: String,
    pub joiner_conn: ConnectionId,
    pub creator_name: String,
    pub joiner_name: String,
}

/// Result of a successful make-move request.
#[derive(Debug)]
pub struct MoveReport {
    pub position: u8,
    pub symbol: u8,
    pub board: [u8; BOARD_FIELD],
    pub opponent_conn: ConnectionId,
    /// Personalized results `(mover, opponent)` when this move ended the
    /// match; the session has already been cleaned up in that case.
    pub finished: Option<(u8, u8)>,
}

/// Who must hear about a client leaving its session (by leave-game, quit,
/// or disconnect).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Departure {
    /// No counterpart to notify.
    None,
    /// An in-game opponent is told the player left.
    OpponentLeft { opponent_conn: ConnectionId },
    /// A creator is told its pending joiner withdrew.
    JoinCancelled {
        creator_conn: ConnectionId,
        joiner: String,
    },
    /// A pending joiner is told the session it was waiting on is gone.
    JoinRejected {
        joiner_conn: ConnectionId,
        game_id: String,
    },
}

#[derive(Debug)]
struct RegistryState {
    clients: Arena<ClientRecord>,
    games: Arena<GameSession>,
}

impl RegistryState {
    fn client_by_conn(&self, conn: ConnectionId) -> Option<ClientHandle> {
        self.clients
            .iter()
            .find(|(_, c)| c.conn == conn)
            .map(|(h, _)| h)
    }

    fn client_by_name(&self, name: &str) -> Option<ClientHandle> {
        self.clients
            .iter()
            .find(|(_, c)| !c.name.is_empty() && c.name == name)
            .map(|(h, _)| h)
    }

    fn game_by_id(&self, id: &str) -> Option<GameHandle> {
        self.games
            .iter()
            .find(|(_, g)| g.id == id)
            .map(|(h, _)| h)
    }

    /// Tears a session down: every client still linked to it (seated players
    /// and a pending joiner alike) reverts to `Registered`, then the slot is
    /// freed. Idempotent: a handle that no longer resolves is a no-op.
    fn cleanup_game(&mut self, handle: GameHandle) {
        if self.games.remove(handle).is_none() {
            return;
        }
        let linked: Vec<ClientHandle> = self
            .clients
            .iter()
            .filter(|(_, c)| c.game == Some(handle))
            .map(|(h, _)| h)
            .collect();
        for client_handle in linked {
            if let Some(client) = self.clients.get_mut(client_handle) {
                client.reset_to_registered();
            }
        }
    }

    /// Unlinks client `handle` from whatever session it participates in and
    /// reports who must be notified. The client itself ends up `Registered`
    /// (if it survives; removal is the caller's business).
    fn depart(&mut self, handle: ClientHandle) -> Departure {
        let Some(client) = self.clients.get(handle) else {
            return Departure::None;
        };
        let state = client.state;
        let name = client.name.clone();
        let seat = client.seat;
        let Some(game) = client.game else {
            return Departure::None;
        };

        match state {
            ClientState::RequestingJoin => {
                let mut creator_conn = None;
                if let Some(session) = self.games.get_mut(game) {
                    if matches!(session.pending_join, Some((h, _)) if h == handle) {
                        session.pending_join = None;
                        creator_conn = Some(session.creator_conn);
                    }
                }
                if let Some(client) = self.clients.get_mut(handle) {
                    client.reset_to_registered();
                }
                match creator_conn {
                    Some(creator_conn) => Departure::JoinCancelled {
                        creator_conn,
                        joiner: name,
                    },
                    None => Departure::None,
                }
            }
            ClientState::InLobby => {
                // The lobby dies with its creator; a pending joiner is told
                // its request was turned down.
                let mut departure = Departure::None;
                if let Some(session) = self.games.get(game) {
                    if let Some((joiner_handle, _)) = session.pending_join {
                        if let Some(joiner) = self.clients.get(joiner_handle) {
                            departure = Departure::JoinRejected {
                                joiner_conn: joiner.conn,
                                game_id: session.id.clone(),
                            };
                        }
                    }
                }
                self.cleanup_game(game);
                departure
            }
            ClientState::InGame => {
                let opponent_conn = seat.and_then(|seat| {
                    self.games
                        .get(game)
                        .and_then(|session| session.seat_conn(seat.other()))
                });
                self.cleanup_game(game);
                match opponent_conn {
                    Some(opponent_conn) => Departure::OpponentLeft { opponent_conn },
                    None => Departure::None,
                }
            }
            _ => Departure::None,
        }
    }
}

/// The session registry. See the module docs for the locking discipline.
#[derive(Debug)]
pub struct Registry {
    state: Mutex<RegistryState>,
}

impl Registry {
    /// Creates a registry with fixed table capacities.
    pub fn new(max_clients: usize, max_games: usize) -> Self {
        Self {
            state: Mutex::new(RegistryState {
                clients: Arena::with_capacity(max_clients),
                games: Arena::with_capacity(max_games),
            }),
        }
    }

    /// Admits a new connection in `Connected` state. Fails with
    /// `ServerFull` when the client table is at capacity; the caller must
    /// then refuse the socket without spawning a handler.
    pub async fn add_client(&self, conn: ConnectionId) -> Result<(), ErrorCode> {
        let mut state = self.state.lock().await;
        state
            .clients
            .insert(ClientRecord::new(conn))
            .map(|_| ())
            .ok_or(ErrorCode::ServerFull)
    }

    /// Registers a display name for a connection.
    pub async fn register(&self, conn: ConnectionId, name: &str) -> Result<(), ErrorCode> {
        let mut state = self.state.lock().await;
        let handle = state.client_by_conn(conn).ok_or(ErrorCode::Internal)?;
        let client = state.clients.get(handle).ok_or(ErrorCode::Internal)?;
        if client.state != ClientState::Connected {
            return Err(ErrorCode::AlreadyRegistered);
        }
        if !validate_name(name) {
            return Err(ErrorCode::InvalidName);
        }
        if state.client_by_name(name).is_some() {
            return Err(ErrorCode::NameTaken);
        }
        if let Some(client) = state.clients.get_mut(handle) {
            client.name = name.to_string();
            client.state = ClientState::Registered;
        }
        Ok(())
    }

    /// Creates a fresh waiting session with the caller in slot 0 as X.
    pub async fn create_game(&self, conn: ConnectionId) -> Result<CreateReport, ErrorCode> {
        let mut state = self.state.lock().await;
        let handle = state.client_by_conn(conn).ok_or(ErrorCode::Internal)?;
        let client = state.clients.get(handle).ok_or(ErrorCode::Internal)?;
        match client.state {
            ClientState::Registered => {}
            ClientState::Connected => return Err(ErrorCode::NotRegistered),
            _ => return Err(ErrorCode::AlreadyInGame),
        }
        let creator = client.name.clone();

        let game_handle = state
            .games
            .insert(GameSession::new(String::new(), conn, creator.clone()))
            .ok_or(ErrorCode::ServerFull)?;
        let game_id = generate_game_id(game_handle);
        if let Some(session) = state.games.get_mut(game_handle) {
            session.id = game_id.clone();
        }

        if let Some(client) = state.clients.get_mut(handle) {
            client.state = ClientState::InLobby;
            client.game = Some(game_handle);
            client.seat = Some(Seat::Creator);
        }

        let lobby_broadcast = state
            .clients
            .iter()
            .filter(|(_, c)| c.state == ClientState::Registered)
            .map(|(_, c)| c.conn)
            .collect();

        debug!("client '{creator}' created game {game_id}");
        Ok(CreateReport {
            game_id,
            creator,
            lobby_broadcast,
        })
    }

    /// Lists every session still waiting for a second player.
    pub async fn list_games(&self, conn: ConnectionId) -> Result<Vec<GameSummary>, ErrorCode> {
        let state = self.state.lock().await;
        let handle = state.client_by_conn(conn).ok_or(ErrorCode::Internal)?;
        let client = state.clients.get(handle).ok_or(ErrorCode::Internal)?;
        match client.state {
            ClientState::Registered | ClientState::RequestingJoin => {}
            ClientState::Connected => return Err(ErrorCode::NotRegistered),
            _ => return Err(ErrorCode::AlreadyInGame),
        }
        Ok(state
            .games
            .iter()
            .filter(|(_, g)| g.is_waiting())
            .map(|(_, g)| g.summary())
            .collect())
    }

    /// Records a join request on a waiting session. Only one request may be
    /// pending per session; a concurrent second joiner is rejected and the
    /// existing request is left untouched.
    pub async fn join_game(
        &self,
        conn: ConnectionId,
        game_id: &str,
    ) -> Result<JoinReport, ErrorCode> {
        let mut state = self.state.lock().await;
        let handle = state.client_by_conn(conn).ok_or(ErrorCode::Internal)?;
        let client = state.clients.get(handle).ok_or(ErrorCode::Internal)?;
        match client.state {
            ClientState::Registered => {}
            ClientState::Connected => return Err(ErrorCode::NotRegistered),
            ClientState::RequestingJoin => return Err(ErrorCode::RequestPending),
            _ => return Err(ErrorCode::AlreadyInGame),
        }
        let joiner_name = client.name.clone();

        let game_handle = state.game_by_id(game_id).ok_or(ErrorCode::GameNotFound)?;
        let session = state.games.get_mut(game_handle).ok_or(ErrorCode::Internal)?;
        if !session.is_waiting() {
            return Err(ErrorCode::GameFull);
        }
        if session.pending_join.is_some() {
            return Err(ErrorCode::PendingJoinExists);
        }
        session.pending_join = Some((handle, joiner_name.clone()));
        let creator_conn = session.creator_conn;
        let opponent = session.creator_name.clone();
        let game_id = session.id.clone();

        if let Some(client) = state.clients.get_mut(handle) {
            client.state = ClientState::RequestingJoin;
            client.game = Some(game_handle);
        }

        debug!("client '{joiner_name}' requested to join game {game_id}");
        Ok(JoinReport {
            game_id,
            creator_conn,
            opponent,
            joiner: joiner_name,
        })
    }

    /// Resolves the pending join on the caller's lobby. Accepting seats the
    /// joiner as slot 1 / O and starts the match; rejecting reopens the
    /// session to new join attempts.
    pub async fn resolve_join(
        &self,
        conn: ConnectionId,
        accept: bool,
    ) -> Result<AcceptReport, ErrorCode> {
        let mut state = self.state.lock().await;
        let handle = state.client_by_conn(conn).ok_or(ErrorCode::Internal)?;
        let client = state.clients.get(handle).ok_or(ErrorCode::Internal)?;
        if client.state != ClientState::InLobby {
            return Err(ErrorCode::NotInLobby);
        }
        let game_handle = client.game.ok_or(ErrorCode::Internal)?;

        let (joiner_handle, joiner_name, game_id, creator_name) = {
            let session = state.games.get_mut(game_handle).ok_or(ErrorCode::Internal)?;
            let (joiner_handle, joiner_name) =
                session.pending_join.take().ok_or(ErrorCode::NoPendingJoin)?;
            (
                joiner_handle,
                joiner_name,
                session.id.clone(),
                session.creator_name.clone(),
            )
        };
        let joiner_conn = state
            .clients
            .get(joiner_handle)
            .map(|c| c.conn)
            .ok_or(ErrorCode::Internal)?;

        if accept {
            if let Some(session) = state.games.get_mut(game_handle) {
                session.joiner = Some((joiner_conn, joiner_name.clone()));
                session.game.seat_joiner();
            }
            if let Some(joiner) = state.clients.get_mut(joiner_handle) {
                joiner.state = ClientState::InGame;
                joiner.game = Some(game_handle);
                joiner.seat = Some(Seat::Joiner);
            }
            if let Some(creator) = state.clients.get_mut(handle) {
                creator.state = ClientState::InGame;
            }
            debug!("game {game_id} started: '{creator_name}' vs '{joiner_name}'");
        } else {
            if let Some(joiner) = state.clients.get_mut(joiner_handle) {
                joiner.reset_to_registered();
            }
            debug!("game {game_id}: join by '{joiner_name}' rejected");
        }

        Ok(AcceptReport {
            accepted: accept,
            game_id,
            joiner_conn,
            creator_name,
            joiner_name,
        })
    }

    /// Applies a move for the caller. When the move finishes the match the
    /// session is cleaned up before the lock is released and both results
    /// are reported.
    pub async fn make_move(
        &self,
        conn: ConnectionId,
        position: u8,
    ) -> Result<MoveReport, ErrorCode> {
        let mut state = self.state.lock().await;
        let handle = state.client_by_conn(conn).ok_or(ErrorCode::Internal)?;
        let client = state.clients.get(handle).ok_or(ErrorCode::Internal)?;
        if client.state != ClientState::InGame {
            return Err(ErrorCode::NotInGame);
        }
        let game_handle = client.game.ok_or(ErrorCode::Internal)?;
        let seat = client.seat.ok_or(ErrorCode::Internal)?;

        let session = state.games.get_mut(game_handle).ok_or(ErrorCode::Internal)?;
        let outcome = session.game.apply_move(seat, position).map_err(|e| match e {
            MoveError::NotYourTurn => ErrorCode::NotYourTurn,
            MoveError::OutOfRange => ErrorCode::InvalidMove,
            MoveError::CellOccupied => ErrorCode::CellOccupied,
            MoveError::NotInProgress => ErrorCode::NotInGame,
        })?;
        let board = session.game.board();
        let opponent_conn = session.seat_conn(seat.other()).ok_or(ErrorCode::Internal)?;

        let finished = outcome.map(|outcome| match outcome {
            Outcome::Winner(winner) if winner == seat => (match_result::WIN, match_result::LOSE),
            Outcome::Winner(_) => (match_result::LOSE, match_result::WIN),
            Outcome::Draw => (match_result::DRAW, match_result::DRAW),
        });
        if finished.is_some() {
            state.cleanup_game(game_handle);
        }

        Ok(MoveReport {
            position,
            symbol: seat.mark().as_byte(),
            board,
            opponent_conn,
            finished,
        })
    }

    /// Handles an explicit leave-game: the caller must be associated with a
    /// session (lobby, pending join, or active match).
    pub async fn leave_game(&self, conn: ConnectionId) -> Result<Departure, ErrorCode> {
        let mut state = self.state.lock().await;
        let handle = state.client_by_conn(conn).ok_or(ErrorCode::Internal)?;
        let client = state.clients.get(handle).ok_or(ErrorCode::Internal)?;
        match client.state {
            ClientState::InLobby | ClientState::RequestingJoin | ClientState::InGame => {}
            _ => return Err(ErrorCode::NotInGame),
        }
        Ok(state.depart(handle))
    }

    /// Removes a client on disconnect or quit, cleaning up any session it
    /// participated in first. Safe to call for connections that were never
    /// admitted.
    pub async fn remove_client(&self, conn: ConnectionId) -> Departure {
        let mut state = self.state.lock().await;
        let Some(handle) = state.client_by_conn(conn) else {
            return Departure::None;
        };
        let departure = state.depart(handle);
        state.clients.remove(handle);
        departure
    }

    /// Number of admitted clients.
    pub async fn client_count(&self) -> usize {
        self.state.lock().await.clients.len()
    }

    /// Number of live sessions.
    pub async fn game_count(&self) -> usize {
        self.state.lock().await.games.len()
    }
}

/// Session ids mix a microsecond timestamp with the arena slot index, hex
/// formatted to fit the 16-byte wire field.
fn generate_game_id(slot: GameHandle) -> String {
    let micros = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0);
    format!("{:012X}{:02X}", micros & 0xFFFF_FFFF_FFFF, (slot as u64) & 0xFF)
}
