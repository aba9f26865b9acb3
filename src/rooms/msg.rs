use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::RelayError;

/// The closed set of reactions a message can collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Reaction {
    #[serde(rename = "👍")]
    ThumbsUp,
    #[serde(rename = "❤️")]
    Heart,
    #[serde(rename = "😂")]
    Laugh,
    #[serde(rename = "😮")]
    Wow,
    #[serde(rename = "😢")]
    Sad,
    #[serde(rename = "😡")]
    Angry,
}

impl Reaction {
    pub const ALL: [Reaction; 6] = [
        Reaction::ThumbsUp,
        Reaction::Heart,
        Reaction::Laugh,
        Reaction::Wow,
        Reaction::Sad,
        Reaction::Angry,
    ];

    pub fn symbol(self) -> &'static str {
        use Reaction::*;
        match self {
            ThumbsUp => "👍",
            Heart => "❤️",
            Laugh => "😂",
            Wow => "😮",
            Sad => "😢",
            Angry => "😡",
        }
    }
}

impl FromStr for Reaction {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Reaction::ALL
            .into_iter()
            .find(|reaction| reaction.symbol() == s)
            .ok_or_else(|| RelayError::UnrecognizedReaction(s.to_owned()))
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Per-message counters, one per [`Reaction`], serialized keyed by symbol.
pub type Reactions = BTreeMap<Reaction, u64>;

fn zeroed() -> Reactions {
    Reaction::ALL.into_iter().map(|reaction| (reaction, 0)).collect()
}

/// A chat message as stored in a room's history and sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub user: String,
    pub text: String,
    /// Seconds since the Unix epoch, assigned on receipt.
    pub timestamp: i64,
    pub reactions: Reactions,
}

impl Message {
    pub(crate) fn new(user: impl Into<String>, text: impl Into<String>) -> Self {
        Message {
            id: Uuid::new_v4(),
            user: user.into(),
            text: text.into(),
            timestamp: OffsetDateTime::now_utc().unix_timestamp(),
            reactions: zeroed(),
        }
    }

    pub(crate) fn react(&mut self, reaction: Reaction) -> &Reactions {
        let count = self.reactions.entry(reaction).or_insert(0);
        *count = count.saturating_add(1);
        &self.reactions
    }
}
