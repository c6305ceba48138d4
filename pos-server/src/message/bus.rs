//! 房间广播总线
//!
//! # 架构
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        RoomBus                            │
//! │  connections: DashMap<conn_id, Connection>                │
//! │     Connection { mpsc::Sender, rooms: {kitchen, user-x} } │
//! │  tap: broadcast::Sender<Delivery>  (观察 / 测试)           │
//! └─────────────────────────┬────────────────────────────────┘
//!                           │ publish(room, event)
//!            ┌──────────────┼──────────────┐
//!            ▼              ▼              ▼
//!      WS session A   WS session B   WS session C
//! ```
//!
//! 投递语义: at-most-once，队列满时丢弃并记录警告，从不阻塞调用方。
//! 单次 publish 内按连接 FIFO，跨房间不保证顺序。

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use shared::message::{RealtimeEvent, Room};
use shared::models::Role;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

/// Tap channel capacity
const TAP_CAPACITY: usize = 1024;

/// 推送端口 - 订单引擎和处理函数只依赖这个 trait
pub trait BroadcastPort: Send + Sync + std::fmt::Debug {
    /// Deliver to every connection that joined `room`
    fn publish(&self, room: &Room, event: RealtimeEvent);

    /// Deliver to every connection
    fn publish_all(&self, event: RealtimeEvent);
}

/// 投递目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    All,
    Room(Room),
}

/// One published event as seen on the tap
#[derive(Debug, Clone)]
pub struct Delivery {
    pub audience: Audience,
    pub event: RealtimeEvent,
}

/// 单个 WebSocket 连接
#[derive(Debug)]
struct Connection {
    user_id: String,
    role: Role,
    tx: mpsc::Sender<RealtimeEvent>,
    rooms: Mutex<HashSet<Room>>,
}

impl Connection {
    fn deliver(&self, conn_id: &str, event: &RealtimeEvent) {
        match self.tx.try_send(event.clone()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(
                    conn_id = %conn_id,
                    user_id = %self.user_id,
                    event = %event.event,
                    "Connection queue full, dropping event"
                );
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(conn_id = %conn_id, "Connection closed, event skipped");
            }
        }
    }
}

/// Room-based publish/subscribe over per-connection queues
#[derive(Debug, Clone)]
pub struct RoomBus {
    connections: Arc<DashMap<String, Arc<Connection>>>,
    tap: broadcast::Sender<Delivery>,
    capacity: usize,
    shutdown_token: CancellationToken,
}

impl RoomBus {
    /// `capacity` is the per-connection outbound queue length
    pub fn new(capacity: usize) -> Self {
        let (tap, _) = broadcast::channel(TAP_CAPACITY);
        Self {
            connections: Arc::new(DashMap::new()),
            tap,
            capacity: capacity.max(1),
            shutdown_token: CancellationToken::new(),
        }
    }

    /// 注册新连接，返回连接 ID 和接收端
    pub fn connect(&self, user_id: &str, role: Role) -> (String, mpsc::Receiver<RealtimeEvent>) {
        let (tx, rx) = mpsc::channel(self.capacity);
        let conn_id = uuid::Uuid::new_v4().to_string();
        self.connections.insert(
            conn_id.clone(),
            Arc::new(Connection {
                user_id: user_id.to_string(),
                role,
                tx,
                rooms: Mutex::new(HashSet::new()),
            }),
        );
        tracing::debug!(conn_id = %conn_id, user_id = %user_id, role = %role, "Realtime client connected");
        (conn_id, rx)
    }

    pub fn disconnect(&self, conn_id: &str) {
        if let Some((_, conn)) = self.connections.remove(conn_id) {
            tracing::debug!(conn_id = %conn_id, user_id = %conn.user_id, "Realtime client disconnected");
        }
    }

    /// 加入房间
    ///
    /// 连接只能加入自己角色的房间和自己的个人房间，其他房间返回 `false`。
    pub fn join(&self, conn_id: &str, room: Room) -> bool {
        let Some(conn) = self.connections.get(conn_id).map(|c| Arc::clone(c.value())) else {
            return false;
        };
        let allowed = match &room {
            Room::Role(role) => *role == conn.role,
            Room::User(id) => *id == conn.user_id,
        };
        if allowed {
            conn.rooms.lock().insert(room);
        }
        allowed
    }

    pub fn leave(&self, conn_id: &str, room: &Room) -> bool {
        self.connections
            .get(conn_id)
            .map(|conn| conn.rooms.lock().remove(room))
            .unwrap_or(false)
    }

    /// Rooms joined by a connection (wire names, sorted)
    pub fn rooms_of(&self, conn_id: &str) -> Vec<String> {
        let mut rooms: Vec<String> = self
            .connections
            .get(conn_id)
            .map(|conn| conn.rooms.lock().iter().map(|r| r.to_string()).collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }

    /// 单播给指定连接 (命令应答)
    pub fn send_to(&self, conn_id: &str, event: RealtimeEvent) {
        if let Some(conn) = self.connections.get(conn_id) {
            conn.deliver(conn_id, &event);
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// 订阅所有发布的事件 (不影响投递)
    pub fn subscribe(&self) -> broadcast::Receiver<Delivery> {
        self.tap.subscribe()
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// 关闭所有会话
    pub fn shutdown(&self) {
        tracing::info!(connections = self.connections.len(), "Shutting down room bus");
        self.shutdown_token.cancel();
    }

    fn record(&self, audience: Audience, event: RealtimeEvent) {
        // 没有订阅者时 send 返回 Err，属正常情况
        let _ = self.tap.send(Delivery { audience, event });
    }
}

impl BroadcastPort for RoomBus {
    fn publish(&self, room: &Room, event: RealtimeEvent) {
        let mut delivered = 0usize;
        for entry in self.connections.iter() {
            if entry.value().rooms.lock().contains(room) {
                entry.value().deliver(entry.key(), &event);
                delivered += 1;
            }
        }
        tracing::debug!(room = %room, event = %event.event, delivered, "Event published");
        self.record(Audience::Room(room.clone()), event);
    }

    fn publish_all(&self, event: RealtimeEvent) {
        for entry in self.connections.iter() {
            entry.value().deliver(entry.key(), &event);
        }
        tracing::debug!(event = %event.event, "Event published to all");
        self.record(Audience::All, event);
    }
}

/// 记录所有发布事件的端口 (单元测试)
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingBus {
    deliveries: Mutex<Vec<Delivery>>,
}

#[cfg(test)]
impl RecordingBus {
    pub fn take(&self) -> Vec<Delivery> {
        std::mem::take(&mut *self.deliveries.lock())
    }

    /// Events sent to one room, in publish order
    pub fn events_for(&self, room: &Room) -> Vec<RealtimeEvent> {
        self.deliveries
            .lock()
            .iter()
            .filter(|d| d.audience == Audience::Room(room.clone()))
            .map(|d| d.event.clone())
            .collect()
    }
}

#[cfg(test)]
impl BroadcastPort for RecordingBus {
    fn publish(&self, room: &Room, event: RealtimeEvent) {
        self.deliveries.lock().push(Delivery {
            audience: Audience::Room(room.clone()),
            event,
        });
    }

    fn publish_all(&self, event: RealtimeEvent) {
        self.deliveries.lock().push(Delivery {
            audience: Audience::All,
            event,
        });
    }
}
