//! Outbound connection management.
//!
//! Each accepted connection gets an unbounded channel of pre-encoded frames;
//! a writer task owns the socket write half and drains the channel. Handlers
//! and notification fan-out only ever push to channels, so no caller blocks
//! on a slow peer's socket and the registry lock is never held across I/O.

use dashmap::DashMap;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Unique identifier for a client connection, assigned at accept time.
pub type ConnectionId = u64;

/// Tracks the outbound frame channel of every live connection.
#[derive(Debug, Default)]
pub struct ConnectionManager {
    senders: DashMap<ConnectionId, mpsc::UnboundedSender<Vec<u8>>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            senders: DashMap::new(),
        }
    }

    /// Registers a connection's outbound channel.
    pub fn insert(&self, id: ConnectionId, sender: mpsc::UnboundedSender<Vec<u8>>) {
        self.senders.insert(id, sender);
    }

    /// Removes a connection. Dropping the sender lets the writer task finish
    /// flushing queued frames and exit.
    pub fn remove(&self, id: ConnectionId) {
        self.senders.remove(&id);
    }

    /// Queues one frame for a connection. Returns `false` when the
    /// connection is gone; callers treat that as a benign race with
    /// disconnection.
    pub fn send(&self, id: ConnectionId, frame: Vec<u8>) -> bool {
        match self.senders.get(&id) {
            Some(sender) => {
                if sender.send(frame).is_err() {
                    debug!("connection {id} writer already stopped");
                    false
                } else {
                    true
                }
            }
            None => {
                debug!("dropping frame for unknown connection {id}");
                false
            }
        }
    }

    /// Queues the same frame for several connections.
    pub fn send_many(&self, ids: &[ConnectionId], frame: &[u8]) {
        for &id in ids {
            self.send(id, frame.to_vec());
        }
    }

    /// Number of live connections.
    pub fn active_count(&self) -> usize {
        self.senders.len()
    }
}

/// Spawns the writer task for one connection.
///
/// The task ends when the channel closes (connection removed) or the peer
/// stops accepting writes.
pub fn spawn_writer(
    id: ConnectionId,
    mut write_half: OwnedWriteHalf,
    mut frames: mpsc::UnboundedReceiver<Vec<u8>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = frames.recv().await {
            if let Err(e) = write_half.write_all(&frame).await {
                warn!("write to connection {id} failed: {e}");
                break;
            }
        }
        let _ = write_half.shutdown().await;
        debug!("writer for connection {id} stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_to_unknown_connection_is_reported() {
        let manager = ConnectionManager::new();
        assert!(!manager.send(7, vec![1, 2, 3]));
        assert_eq!(manager.active_count(), 0);
    }

    #[tokio::test]
    async fn frames_reach_the_registered_channel() {
        let manager = ConnectionManager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.insert(1, tx);
        assert!(manager.send(1, vec![42]));
        assert_eq!(rx.recv().await, Some(vec![42]));

        manager.remove(1);
        assert!(!manager.send(1, vec![43]));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn send_many_skips_missing_connections() {
        let manager = ConnectionManager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.insert(2, tx);
        manager.send_many(&[1, 2, 3], &[9]);
        assert_eq!(rx.recv().await, Some(vec![9]));
        assert!(rx.try_recv().is_err());
    }
}
