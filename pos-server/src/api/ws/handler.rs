//! WebSocket session
//!
//! 协议:
//! - Server → Client: [`RealtimeEvent`] `{event, data, timestamp}`
//! - Client → Server: [`ClientCommand`] `{event, data}`
//!
//! 每个会话在 [`RoomBus`](crate::message::RoomBus) 上注册一个连接，
//! 推送事件和命令应答都经过同一个连接队列，保证单连接内有序。

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use shared::message::{
    ClientCommand, ErrorNotice, EventName, JoinedRoom, Notice, OrderAcknowledgement,
    OrdersSnapshot, RealtimeEvent, Room,
};
use shared::util::now_millis;
use tokio::time::Duration;

use crate::auth::{CurrentUser, authenticate};
use crate::core::ServerState;
use crate::message::emit;
use crate::utils::AppError;

/// Server ping interval
const PING_INTERVAL_SECS: u64 = 30;

#[derive(Deserialize)]
pub struct WsAuthQuery {
    token: String,
}

/// GET /api/ws?token=<JWT>
pub async fn handle_ws(
    State(state): State<ServerState>,
    Query(query): Query<WsAuthQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let user = authenticate(&state, &query.token)?;
    Ok(ws.on_upgrade(move |socket| ws_session(socket, state, user)))
}

async fn ws_session(socket: WebSocket, state: ServerState, user: CurrentUser) {
    let (mut sink, mut stream) = socket.split();
    let (conn_id, mut rx) = state.bus.connect(&user.id, user.role);
    let shutdown = state.bus.shutdown_token().clone();

    tracing::info!(conn_id = %conn_id, user_id = %user.id, role = %user.role, "Realtime session opened");

    let mut ping_interval = tokio::time::interval(Duration::from_secs(PING_INTERVAL_SECS));
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }

            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }

            event = rx.recv() => {
                let Some(event) = event else { break };
                if send_event(&mut sink, &event).await.is_err() {
                    break;
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientCommand>(&text) {
                            Ok(command) => handle_command(&state, &conn_id, &user, command),
                            Err(e) => {
                                tracing::debug!(conn_id = %conn_id, error = %e, "Unrecognized client message");
                                reply(&state, &conn_id, EventName::Error, &ErrorNotice {
                                    message: "Unrecognized message".to_string(),
                                });
                            }
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    state.bus.disconnect(&conn_id);
    tracing::info!(conn_id = %conn_id, user_id = %user.id, "Realtime session closed");
}

async fn send_event(
    sink: &mut SplitSink<WebSocket, Message>,
    event: &RealtimeEvent,
) -> Result<(), ()> {
    let json = serde_json::to_string(event).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}

/// 应答只发给当前连接
fn reply<T: Serialize>(state: &ServerState, conn_id: &str, name: EventName, data: &T) {
    state.bus.send_to(conn_id, RealtimeEvent::new(name, data));
}

fn handle_command(state: &ServerState, conn_id: &str, user: &CurrentUser, command: ClientCommand) {
    match command {
        ClientCommand::JoinRoom(payload) => {
            let role_ok = state.bus.join(conn_id, Room::Role(payload.role));
            let user_ok = state.bus.join(conn_id, Room::user(&payload.user_id));
            if !(role_ok && user_ok) {
                tracing::warn!(
                    conn_id = %conn_id,
                    user_id = %user.id,
                    requested_role = %payload.role,
                    requested_user = %payload.user_id,
                    "Join refused for foreign room"
                );
                reply(state, conn_id, EventName::Error, &ErrorNotice {
                    message: "You can only join your own rooms".to_string(),
                });
            }
            reply(state, conn_id, EventName::JoinedRoom, &JoinedRoom {
                rooms: state.bus.rooms_of(conn_id),
                user_id: user.id.clone(),
            });
        }

        ClientCommand::LeaveRoom(payload) => match Room::parse(&payload.room) {
            Some(room) => {
                state.bus.leave(conn_id, &room);
            }
            None => reply(state, conn_id, EventName::Error, &ErrorNotice {
                message: format!("Unknown room '{}'", payload.room),
            }),
        },

        ClientCommand::RequestSync => send_orders(state, conn_id, user, EventName::SyncData),

        ClientCommand::RequestCurrentOrders => {
            send_orders(state, conn_id, user, EventName::CurrentOrdersResponse)
        }

        ClientCommand::Ping => reply(state, conn_id, EventName::Pong, &()),

        ClientCommand::OrderAcknowledged(payload) => {
            emit::to_all(&state.bus, EventName::OrderAcknowledgement, &OrderAcknowledgement {
                order_id: payload.order_id,
                order_number: payload.order_number,
                station: payload.station,
                acknowledged_at: now_millis(),
            });
        }

        ClientCommand::BroadcastMessage(payload) => {
            if !user.is_owner() {
                reply(state, conn_id, EventName::Error, &ErrorNotice {
                    message: "Only the owner can broadcast messages".to_string(),
                });
                return;
            }
            emit::to_all(&state.bus, EventName::SystemMessage, &Notice {
                message: payload.message,
                from: Some(user.full_name.clone()),
            });
        }
    }
}

fn send_orders(state: &ServerState, conn_id: &str, user: &CurrentUser, name: EventName) {
    match state.orders.sync_orders(user) {
        Ok(orders) => reply(state, conn_id, name, &OrdersSnapshot { orders }),
        Err(e) => {
            tracing::error!(conn_id = %conn_id, error = %e, "Failed to load orders for sync");
            reply(state, conn_id, EventName::Error, &ErrorNotice {
                message: "Failed to load orders".to_string(),
            });
        }
    }
}
