use std::collections::HashSet;

/// Usernames currently considered "in" a room.
///
/// A plain set: adding twice is the same as adding once, and the order of
/// [`Presence::list`] is unspecified.
#[derive(Debug, Default)]
pub struct Presence {
    users: HashSet<String>,
}

impl Presence {
    /// Returns whether the username was newly added.
    pub fn add(&mut self, username: &str) -> bool {
        self.users.insert(username.to_owned())
    }

    /// Returns whether the username was present.
    pub fn remove(&mut self, username: &str) -> bool {
        self.users.remove(username)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains(username)
    }

    pub fn list(&self) -> Vec<String> {
        self.users.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent() {
        let mut presence = Presence::default();
        assert!(presence.add("alice"));
        assert!(!presence.add("alice"));
        assert!(!presence.add("alice"));

        assert_eq!(presence.list(), vec!["alice".to_owned()]);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut presence = Presence::default();
        presence.add("alice");

        assert!(!presence.remove("bob"));
        assert_eq!(presence.list(), vec!["alice".to_owned()]);

        assert!(presence.remove("alice"));
        assert!(!presence.remove("alice"));
        assert!(!presence.contains("alice"));
        assert!(presence.list().is_empty());
    }
}
