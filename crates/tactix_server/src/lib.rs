//! # Tactix Server - Session Orchestration Core
//!
//! The server side of the Tactix multiplayer tic-tac-toe system: clients
//! register a display name, create or join two-player sessions through a
//! lobby/accept handshake, then exchange turn-based moves until the match
//! ends, all over the length-prefixed binary protocol from
//! [`tactix_protocol`].
//!
//! ## Architecture
//!
//! * **Session Registry** - Bounded in-memory tables of clients and game
//!   sessions behind a single lock; every read-modify-write sequence runs
//!   under that lock, which totally orders all mutations across connections.
//! * **Connection Manager** - Maps connection ids to outbound frame
//!   channels; a dedicated writer task per connection owns the socket write
//!   half, so the registry lock is never held across network I/O.
//! * **Connection Handler** - One task per accepted connection: reads framed
//!   requests, dispatches them against the registry, sends the response and
//!   fans out notifications, and tears down registry state on exit.
//!
//! ## Concurrency model
//!
//! One task per connection, blocking on the next frame; no timeouts are
//! enforced on reads or writes (a silent peer parks its handler). Within a
//! connection, requests are processed strictly in arrival order, and the
//! protocol supports one outstanding request at a time. Notifications for a
//! mutation are computed from the registry state as of the lock-protected
//! transition that produced them.

pub use config::ServerConfig;
pub use connection::ConnectionId;
pub use error::ServerError;
pub use server::GameServer;
pub use tactix_protocol::response::MAX_GAMES_LISTED;

pub mod config;
pub mod error;
pub mod registry;
pub mod server;

mod connection;
