//! Server configuration settings.

use std::net::SocketAddr;

/// Configuration parameters for the session server.
///
/// Capacities are fixed at startup: the registry's client and game tables
/// never grow past them. `max_games` must stay within
/// [`tactix_protocol::response::MAX_GAMES_LISTED`] so a list-games response
/// can always carry every waiting session in one frame.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Network address to bind the listener to.
    pub bind_address: SocketAddr,
    /// Listen backlog passed to the socket.
    pub backlog: u32,
    /// Maximum number of simultaneously connected clients.
    pub max_clients: usize,
    /// Maximum number of simultaneously active game sessions.
    pub max_games: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".parse().expect("static default address"),
            backlog: 64,
            max_clients: 64,
            max_games: 32,
        }
    }
}
