use thiserror::Error;

pub type RelayResult<T> = Result<T, RelayError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelayError {
    #[error("unknown room: {0}")]
    UnknownRoom(String),

    #[error("unknown message {id} in {room}")]
    UnknownMessage { room: String, id: String },

    #[error("unrecognized reaction: {0}")]
    UnrecognizedReaction(String),

    #[error("no room joined by this connection")]
    MissingBinding,

    #[error("malformed event: {0}")]
    Malformed(String),
}

impl RelayError {
    /// Errors the relay swallows without telling the client anything.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            RelayError::UnknownMessage { .. } | RelayError::UnrecognizedReaction(_)
        )
    }
}
