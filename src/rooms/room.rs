use std::collections::HashMap;

use uuid::Uuid;

use crate::error::{RelayError, RelayResult};

use super::{
    msg::{Message, Reaction, Reactions},
    presence::Presence,
};

/// One provisioned room: its message history and who is in it.
///
/// History only grows. Messages are indexed by id so reactions don't scan.
#[derive(Debug)]
pub struct Room {
    name: String,
    history: Vec<Message>,
    index: HashMap<Uuid, usize>,
    presence: Presence,
}

impl Room {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Room {
            name: name.into(),
            history: Vec::new(),
            index: HashMap::new(),
            presence: Presence::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn append_message(&mut self, username: &str, text: &str) -> Message {
        let msg = Message::new(username, text);
        self.index.insert(msg.id, self.history.len());
        self.history.push(msg.clone());
        msg
    }

    /// Bumps one reaction counter on a message and returns all its counts.
    pub fn increment_reaction(&mut self, id: Uuid, emoji: &str) -> RelayResult<Reactions> {
        let Some(msg) = self.index.get(&id).and_then(|&i| self.history.get_mut(i)) else {
            return Err(RelayError::UnknownMessage {
                room: self.name.clone(),
                id: id.to_string(),
            });
        };
        let reaction: Reaction = emoji.parse()?;

        Ok(msg.react(reaction).clone())
    }

    pub fn add_presence(&mut self, username: &str) {
        self.presence.add(username);
    }

    pub fn remove_presence(&mut self, username: &str) {
        self.presence.remove(username);
    }

    pub fn list_presence(&self) -> Vec<String> {
        self.presence.list()
    }

    pub fn is_present(&self, username: &str) -> bool {
        self.presence.contains(username)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn append_keeps_call_order_and_distinct_ids() {
        let mut room = Room::new("General");
        let ids: Vec<Uuid> = (0..50)
            .map(|i| room.append_message("alice", &format!("msg {i}")).id)
            .collect();

        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());

        let texts: Vec<&str> = room.history().iter().map(|m| m.text.as_str()).collect();
        let expected: Vec<String> = (0..50).map(|i| format!("msg {i}")).collect();
        assert_eq!(texts, expected);
        assert_eq!(room.history().iter().map(|m| m.id).collect::<Vec<_>>(), ids);
    }

    #[test]
    fn reaction_increments_by_one() {
        let mut room = Room::new("General");
        let id = room.append_message("alice", "hi").id;

        let reactions = room.increment_reaction(id, "👍").unwrap();
        assert_eq!(reactions[&Reaction::ThumbsUp], 1);

        let reactions = room.increment_reaction(id, "👍").unwrap();
        assert_eq!(reactions[&Reaction::ThumbsUp], 2);
        assert_eq!(reactions[&Reaction::Heart], 0);

        // the stored message sees the same counts
        assert_eq!(room.history()[0].reactions, reactions);
    }

    #[test]
    fn unknown_message_or_emoji_changes_nothing() {
        let mut room = Room::new("General");
        let id = room.append_message("alice", "hi").id;
        let before = room.history()[0].reactions.clone();

        let stray = Uuid::new_v4();
        assert_eq!(
            room.increment_reaction(stray, "👍"),
            Err(RelayError::UnknownMessage {
                room: "General".to_owned(),
                id: stray.to_string(),
            })
        );
        assert_eq!(
            room.increment_reaction(id, "🙃"),
            Err(RelayError::UnrecognizedReaction("🙃".to_owned()))
        );
        assert_eq!(room.history()[0].reactions, before);
    }

    #[test]
    fn presence_round_trip() {
        let mut room = Room::new("Tech");
        room.add_presence("bob");
        room.add_presence("bob");
        assert_eq!(room.list_presence(), vec!["bob".to_owned()]);

        room.remove_presence("carol");
        assert!(room.is_present("bob"));

        room.remove_presence("bob");
        assert!(room.list_presence().is_empty());
    }
}
