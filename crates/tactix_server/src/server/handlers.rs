//! Per-connection request handling.
//!
//! One handler task per connection. The task owns the socket read half and
//! blocks on the next frame; responses and notifications go out through the
//! connection manager's channels, never directly through the socket. Requests
//! are processed strictly in arrival order.

use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::connection::{self, ConnectionId, ConnectionManager};
use crate::registry::{Departure, Registry};
use tactix_game::Mark;
use tactix_protocol::wire::{self, ProtocolError};
use tactix_protocol::{notify, response, ErrorCode, MsgType, Request};

/// Notifications are unsolicited and carry no request sequence id.
const NOTIFY_SEQ: u32 = 0;

/// Runs one connection from admission to teardown.
///
/// Exits on clean EOF, any read error, an oversized frame claim, or a quit
/// request. Teardown always runs: the registry record is removed, any
/// counterpart is notified of the departure, and the writer is drained.
pub(crate) async fn handle_connection(
    conn: ConnectionId,
    stream: TcpStream,
    registry: Arc<Registry>,
    connections: Arc<ConnectionManager>,
) {
    let (mut read_half, write_half) = stream.into_split();
    let (sender, receiver) = mpsc::unbounded_channel();
    connections.insert(conn, sender);
    let writer = connection::spawn_writer(conn, write_half, receiver);

    loop {
        let header = match wire::read_header(&mut read_half).await {
            Ok(Some(header)) => header,
            Ok(None) => {
                debug!("connection {conn} closed by peer");
                break;
            }
            Err(ProtocolError::FrameTooLarge(claimed)) => {
                warn!("connection {conn} claimed a {claimed} byte payload, dropping");
                break;
            }
            Err(e) => {
                warn!("connection {conn} header read failed: {e}");
                break;
            }
        };
        let payload = match wire::read_payload(&mut read_half, header.length).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("connection {conn} payload read failed: {e}");
                break;
            }
        };

        // An unknown type or a bad payload shape gets an error response but
        // keeps the connection open; framing itself was still intact.
        let request = match MsgType::try_from(header.msg_type)
            .and_then(|msg_type| Request::decode(msg_type, &payload))
        {
            Ok(request) => request,
            Err(e) => {
                debug!("connection {conn} sent an unintelligible request: {e}");
                respond(
                    &connections,
                    conn,
                    header.seq,
                    response::error(ErrorCode::InvalidPayload),
                );
                continue;
            }
        };

        let quitting = matches!(request, Request::Quit);
        dispatch(conn, header.seq, request, &registry, &connections).await;
        if quitting {
            debug!("connection {conn} quit");
            break;
        }
    }

    let departure = registry.remove_client(conn).await;
    announce_departure(&connections, departure);
    // Dropping the sender lets the writer flush queued frames and exit.
    connections.remove(conn);
    let _ = writer.await;
    info!("👋 Connection {conn} closed");
}

async fn dispatch(
    conn: ConnectionId,
    seq: u32,
    request: Request,
    registry: &Registry,
    connections: &ConnectionManager,
) {
    match request {
        Request::Register { name } => match registry.register(conn, &name).await {
            Ok(()) => {
                info!("📝 Connection {conn} registered as '{name}'");
                respond(connections, conn, seq, response::ok());
            }
            Err(code) => respond(connections, conn, seq, response::error(code)),
        },

        // New-game is an alias for create-game: both open a fresh lobby.
        Request::CreateGame | Request::NewGame => match registry.create_game(conn).await {
            Ok(report) => {
                respond(connections, conn, seq, response::created(&report.game_id));
                let frame = notify_frame(notify::game_created(&report.game_id, &report.creator));
                connections.send_many(&report.lobby_broadcast, &frame);
            }
            Err(code) => respond(connections, conn, seq, response::error(code)),
        },

        Request::ListGames => match registry.list_games(conn).await {
            Ok(games) => respond(connections, conn, seq, response::game_list(&games)),
            Err(code) => respond(connections, conn, seq, response::error(code)),
        },

        Request::JoinGame { game_id } => match registry.join_game(conn, &game_id).await {
            Ok(report) => {
                respond(
                    connections,
                    conn,
                    seq,
                    response::joined(Mark::O.as_byte(), &report.opponent, &report.game_id),
                );
                notify_one(
                    connections,
                    report.creator_conn,
                    notify::join_request(&report.joiner),
                );
            }
            Err(code) => respond(connections, conn, seq, response::error(code)),
        },

        Request::AcceptJoin { accept } => match registry.resolve_join(conn, accept).await {
            Ok(report) => {
                respond(connections, conn, seq, response::ok());
                // The joiner learns the verdict before any match traffic.
                notify_one(
                    connections,
                    report.joiner_conn,
                    notify::join_response(report.accepted, &report.game_id),
                );
                if report.accepted {
                    let first = Mark::X.as_byte();
                    notify_one(
                        connections,
                        conn,
                        notify::game_start(Mark::X.as_byte(), first, &report.joiner_name),
                    );
                    notify_one(
                        connections,
                        report.joiner_conn,
                        notify::game_start(Mark::O.as_byte(), first, &report.creator_name),
                    );
                    info!(
                        "🎮 Game {} started: '{}' vs '{}'",
                        report.game_id, report.creator_name, report.joiner_name
                    );
                }
            }
            Err(code) => respond(connections, conn, seq, response::error(code)),
        },

        Request::MakeMove { position } => match registry.make_move(conn, position).await {
            Ok(report) => {
                respond(connections, conn, seq, response::ok());
                notify_one(
                    connections,
                    report.opponent_conn,
                    notify::move_made(report.position, report.symbol, &report.board),
                );
                if let Some((mover_result, opponent_result)) = report.finished {
                    notify_one(connections, conn, notify::game_end(mover_result, &report.board));
                    notify_one(
                        connections,
                        report.opponent_conn,
                        notify::game_end(opponent_result, &report.board),
                    );
                    info!("🏁 Match finished after a move by connection {conn}");
                }
            }
            Err(code) => respond(connections, conn, seq, response::error(code)),
        },

        Request::LeaveGame => match registry.leave_game(conn).await {
            Ok(departure) => {
                respond(connections, conn, seq, response::ok());
                announce_departure(connections, departure);
            }
            Err(code) => respond(connections, conn, seq, response::error(code)),
        },

        // Teardown after the loop handles registry and notification work.
        Request::Quit => respond(connections, conn, seq, response::ok()),
    }
}

/// Notifies whoever a departing client left behind.
fn announce_departure(connections: &ConnectionManager, departure: Departure) {
    match departure {
        Departure::None => {}
        Departure::OpponentLeft { opponent_conn } => {
            notify_one(connections, opponent_conn, notify::opponent_left());
        }
        Departure::JoinCancelled {
            creator_conn,
            joiner,
        } => {
            notify_one(connections, creator_conn, notify::join_cancelled(&joiner));
        }
        Departure::JoinRejected {
            joiner_conn,
            game_id,
        } => {
            notify_one(connections, joiner_conn, notify::join_response(false, &game_id));
        }
    }
}

fn respond(connections: &ConnectionManager, conn: ConnectionId, seq: u32, payload: Vec<u8>) {
    let frame = wire::encode_frame(MsgType::Response as u8, seq, &payload);
    connections.send(conn, frame);
}

fn notify_one(connections: &ConnectionManager, conn: ConnectionId, payload: Vec<u8>) {
    connections.send(conn, notify_frame(payload));
}

fn notify_frame(payload: Vec<u8>) -> Vec<u8> {
    wire::encode_frame(MsgType::Notify as u8, NOTIFY_SEQ, &payload)
}
