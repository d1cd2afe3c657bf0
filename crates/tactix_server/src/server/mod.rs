//! Listener setup, accept loop, and server lifecycle.

mod handlers;

use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::connection::{ConnectionId, ConnectionManager};
use crate::error::ServerError;
use crate::registry::Registry;
use tactix_protocol::wire::encode_frame;
use tactix_protocol::{response, ErrorCode, MsgType};

/// The session server: a bound listener plus the shared registry and
/// connection manager handed to every connection task.
pub struct GameServer {
    config: ServerConfig,
    registry: Arc<Registry>,
    connections: Arc<ConnectionManager>,
    listener: TcpListener,
    next_conn_id: AtomicU64,
    shutdown_sender: broadcast::Sender<()>,
}

impl GameServer {
    /// Binds the listen socket and prepares the server state. The socket is
    /// configured through `socket2` so the backlog and address reuse are
    /// explicit rather than platform defaults.
    pub fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let domain = if config.bind_address.is_ipv4() {
            Domain::IPV4
        } else {
            Domain::IPV6
        };
        let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))
            .map_err(|e| ServerError::Network(format!("socket creation failed: {e}")))?;
        socket.set_reuse_address(true).ok();
        socket
            .bind(&config.bind_address.into())
            .map_err(|e| {
                ServerError::Network(format!("bind to {} failed: {e}", config.bind_address))
            })?;
        socket
            .listen(config.backlog as i32)
            .map_err(|e| ServerError::Network(format!("listen failed: {e}")))?;

        let std_listener: StdTcpListener = socket.into();
        std_listener
            .set_nonblocking(true)
            .map_err(|e| ServerError::Network(format!("nonblocking mode failed: {e}")))?;
        let listener = TcpListener::from_std(std_listener)
            .map_err(|e| ServerError::Network(format!("tokio listener creation failed: {e}")))?;

        let (shutdown_sender, _) = broadcast::channel(1);
        info!("✅ Listener bound on {}", listener.local_addr()?);

        Ok(Self {
            registry: Arc::new(Registry::new(config.max_clients, config.max_games)),
            connections: Arc::new(ConnectionManager::new()),
            listener,
            next_conn_id: AtomicU64::new(1),
            shutdown_sender,
            config,
        })
    }

    /// Address the listener actually bound to (resolves port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Signals the accept loop to stop.
    pub fn shutdown(&self) {
        let _ = self.shutdown_sender.send(());
    }

    /// Accepts connections until shutdown is signalled.
    ///
    /// Each accepted socket is admitted to the registry before a handler is
    /// spawned; when the client table is full the socket gets a single
    /// server-full error frame and is closed without ever reaching a
    /// handler.
    pub async fn run(&self) -> Result<(), ServerError> {
        info!(
            "🚀 Accepting connections (max {} clients, {} games)",
            self.config.max_clients, self.config.max_games
        );
        let mut shutdown_receiver = self.shutdown_sender.subscribe();

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => self.admit(stream, addr).await,
                        Err(e) => error!("failed to accept connection: {e}"),
                    }
                }
                _ = shutdown_receiver.recv() => {
                    info!("shutdown signal received");
                    break;
                }
            }
        }

        info!("server stopped");
        Ok(())
    }

    async fn admit(&self, stream: TcpStream, addr: SocketAddr) {
        let conn: ConnectionId = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
        if self.registry.add_client(conn).await.is_err() {
            warn!("🚫 Refusing connection from {addr}: server full");
            tokio::spawn(refuse(stream));
            return;
        }

        info!("👋 Connection {conn} accepted from {addr}");
        let registry = Arc::clone(&self.registry);
        let connections = Arc::clone(&self.connections);
        tokio::spawn(async move {
            handlers::handle_connection(conn, stream, registry, connections).await;
        });
    }
}

/// Sends the server-full refusal and closes the socket.
async fn refuse(mut stream: TcpStream) {
    let frame = encode_frame(
        MsgType::Response as u8,
        0,
        &response::error(ErrorCode::ServerFull),
    );
    let _ = stream.write_all(&frame).await;
    let _ = stream.shutdown().await;
}
