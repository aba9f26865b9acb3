use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use crate::error::{RelayError, RelayResult};

use super::room::Room;

/// The fixed set of rooms known at startup.
///
/// Rooms are never added or removed after construction, so the map itself
/// needs no lock. Each room has its own mutex; whoever holds it owns that
/// room's history and presence until the guard drops.
#[derive(Debug)]
pub struct RoomStore {
    names: Vec<String>,
    rooms: HashMap<String, Arc<Mutex<Room>>>,
}

impl RoomStore {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut store = RoomStore {
            names: Vec::new(),
            rooms: HashMap::new(),
        };
        for name in names {
            let name = name.into();
            if store.rooms.contains_key(&name) {
                continue;
            }
            store.rooms.insert(name.clone(), Arc::new(Mutex::new(Room::new(name.clone()))));
            store.names.push(name);
        }
        store
    }

    /// Room names in provisioning order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn room(&self, name: &str) -> RelayResult<Arc<Mutex<Room>>> {
        self.rooms
            .get(name)
            .cloned()
            .ok_or_else(|| RelayError::UnknownRoom(name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_order_and_drops_duplicates() {
        let store = RoomStore::new(["General", "Random", "General", "Tech"]);
        assert_eq!(store.names(), ["General", "Random", "Tech"]);
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn unknown_room_is_an_error() {
        let store = RoomStore::new(["General"]);
        assert_eq!(
            store.room("Lounge").err(),
            Some(RelayError::UnknownRoom("Lounge".to_owned()))
        );
        assert!(store.room("general").is_err());

        let room = store.room("General").unwrap();
        assert_eq!(room.lock().await.name(), "General");
    }

    #[tokio::test]
    async fn same_room_is_shared() {
        let store = RoomStore::new(["General"]);
        store.room("General").unwrap().lock().await.append_message("alice", "hi");

        let room = store.room("General").unwrap();
        assert_eq!(room.lock().await.history().len(), 1);
    }
}
