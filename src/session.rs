use std::{collections::HashMap, fmt};

use tokio::sync::RwLock;
use uuid::Uuid;

/// Server-assigned handle for one live transport connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId(Uuid);

impl ConnId {
    pub fn new() -> Self {
        ConnId(Uuid::new_v4())
    }
}

impl Default for ConnId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "conn#{}", self.0.simple())
    }
}

/// The (username, room) a connection last joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub username: String,
    pub room: String,
}

impl Binding {
    pub fn is(&self, username: &str, room: &str) -> bool {
        self.username == username && self.room == room
    }
}

/// Tracks which identity each connection claims.
///
/// A connection has at most one binding. Binding again overwrites the old
/// pair without touching the old room's presence; only the last binding is
/// cleaned up on leave or disconnect.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    bindings: RwLock<HashMap<ConnId, Binding>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the binding this one replaced, if any.
    pub async fn bind(&self, conn: ConnId, username: &str, room: &str) -> Option<Binding> {
        let binding = Binding {
            username: username.to_owned(),
            room: room.to_owned(),
        };
        self.bindings.write().await.insert(conn, binding)
    }

    pub async fn unbind(&self, conn: ConnId) -> Option<Binding> {
        self.bindings.write().await.remove(&conn)
    }

    pub async fn get(&self, conn: ConnId) -> Option<Binding> {
        self.bindings.read().await.get(&conn).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bind_overwrites() {
        let sessions = SessionRegistry::new();
        let conn = ConnId::new();

        assert_eq!(sessions.bind(conn, "alice", "General").await, None);
        let previous = sessions.bind(conn, "alice", "Tech").await.unwrap();
        assert!(previous.is("alice", "General"));

        let current = sessions.get(conn).await.unwrap();
        assert!(current.is("alice", "Tech"));
    }

    #[tokio::test]
    async fn unbind_happens_once() {
        let sessions = SessionRegistry::new();
        let conn = ConnId::new();
        sessions.bind(conn, "bob", "Random").await;

        let removed = sessions.unbind(conn).await.unwrap();
        assert!(removed.is("bob", "Random"));
        assert_eq!(sessions.unbind(conn).await, None);
        assert_eq!(sessions.get(conn).await, None);
    }

    #[tokio::test]
    async fn connections_are_independent() {
        let sessions = SessionRegistry::new();
        let (a, b) = (ConnId::new(), ConnId::new());
        sessions.bind(a, "alice", "General").await;
        sessions.bind(b, "alice", "Random").await;

        sessions.unbind(a).await;
        assert!(sessions.get(b).await.unwrap().is("alice", "Random"));
    }
}
