use std::collections::{HashMap, HashSet};

use tokio::sync::{RwLock, mpsc};
use tracing::trace;

use crate::{protocol::ServerEvent, session::ConnId};

/// Who an outbound event goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience<'a> {
    /// Only this connection.
    Connection(ConnId),
    /// Every connection subscribed to the room.
    Room(&'a str),
    /// Every connection subscribed to the room except one.
    RoomExcept(&'a str, ConnId),
}

#[derive(Default)]
struct Groups {
    senders: HashMap<ConnId, mpsc::UnboundedSender<ServerEvent>>,
    rooms: HashMap<String, HashSet<ConnId>>,
}

/// Fans events out to connections and room groups.
///
/// Delivery is fire-and-forget: a connection whose receiver is gone is
/// skipped, nothing is retried.
#[derive(Default)]
pub struct Dispatcher {
    groups: RwLock<Groups>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self) -> (ConnId, mpsc::UnboundedReceiver<ServerEvent>) {
        let conn = ConnId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        self.groups.write().await.senders.insert(conn, tx);
        (conn, rx)
    }

    /// Drops the connection's sender and removes it from every room group.
    pub async fn unregister(&self, conn: ConnId) -> bool {
        let mut groups = self.groups.write().await;
        for members in groups.rooms.values_mut() {
            members.remove(&conn);
        }
        groups.senders.remove(&conn).is_some()
    }

    pub async fn subscribe(&self, conn: ConnId, room: &str) {
        let mut groups = self.groups.write().await;
        if !groups.senders.contains_key(&conn) {
            return;
        }
        groups.rooms.entry(room.to_owned()).or_default().insert(conn);
    }

    pub async fn unsubscribe(&self, conn: ConnId, room: &str) {
        if let Some(members) = self.groups.write().await.rooms.get_mut(room) {
            members.remove(&conn);
        }
    }

    pub async fn is_subscribed(&self, conn: ConnId, room: &str) -> bool {
        self.groups
            .read()
            .await
            .rooms
            .get(room)
            .is_some_and(|members| members.contains(&conn))
    }

    pub async fn connection_count(&self) -> usize {
        self.groups.read().await.senders.len()
    }

    /// Returns how many connections the event was handed to.
    pub async fn send(&self, audience: Audience<'_>, event: ServerEvent) -> usize {
        let groups = self.groups.read().await;
        let deliver = |conn: ConnId| {
            groups
                .senders
                .get(&conn)
                .is_some_and(|tx| tx.send(event.clone()).is_ok())
        };

        let delivered = match audience {
            Audience::Connection(conn) => usize::from(deliver(conn)),
            Audience::Room(room) => groups
                .rooms
                .get(room)
                .map(|members| members.iter().filter(|conn| deliver(**conn)).count())
                .unwrap_or(0),
            Audience::RoomExcept(room, except) => groups
                .rooms
                .get(room)
                .map(|members| {
                    members
                        .iter()
                        .filter(|conn| **conn != except && deliver(**conn))
                        .count()
                })
                .unwrap_or(0),
        };

        trace!(event = event.name(), ?audience, delivered, "dispatched");
        delivered
    }
}
