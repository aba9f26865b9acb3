use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::Config,
    dispatch::{Audience, Dispatcher},
    error::{RelayError, RelayResult},
    protocol::{ClientEvent, ServerEvent},
    rooms::{Message, Reactions, Room, RoomStore},
    session::{Binding, ConnId, SessionRegistry},
};

/// The room-state and event-broadcast engine.
///
/// Every handler resolves the room first, then holds that room's lock for
/// the whole mutation and every emission it causes, so events touching one
/// room are applied and delivered in a single order. Usernames and rooms in
/// `leave_room`, `send_message` and `add_reaction` are taken from the event
/// payload; the tracked binding is only consulted for logging.
pub struct Relay {
    rooms: RoomStore,
    sessions: SessionRegistry,
    dispatcher: Dispatcher,
}

impl Relay {
    pub fn new(config: &Config) -> Self {
        Self::with_rooms(config.rooms.iter().cloned())
    }

    pub fn with_rooms<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Relay {
            rooms: RoomStore::new(names),
            sessions: SessionRegistry::new(),
            dispatcher: Dispatcher::new(),
        }
    }

    pub fn rooms(&self) -> &RoomStore {
        &self.rooms
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub async fn connect(&self) -> (ConnId, mpsc::UnboundedReceiver<ServerEvent>) {
        let (conn, rx) = self.dispatcher.register().await;
        debug!(%conn, "registered");
        (conn, rx)
    }

    /// Parses and applies one raw frame, never failing the connection.
    ///
    /// Silent errors (unknown message, unrecognized emoji) are dropped.
    /// Anything else is logged and answered with an `error` event to the
    /// sender alone.
    pub async fn handle_frame(&self, conn: ConnId, frame: &str) {
        let event = match ClientEvent::parse(frame) {
            Ok(event) => event,
            Err(e) => {
                warn!(%conn, "rejected frame: {e}");
                self.reject(conn, &e).await;
                return;
            }
        };

        let name = event.name();
        match self.handle(conn, event).await {
            Ok(()) => {}
            Err(e) if e.is_silent() => debug!(%conn, event = name, "ignored: {e}"),
            Err(e) => {
                warn!(%conn, event = name, "rejected: {e}");
                self.reject(conn, &e).await;
            }
        }
    }

    async fn reject(&self, conn: ConnId, error: &RelayError) {
        self.dispatcher
            .send(
                Audience::Connection(conn),
                ServerEvent::Error {
                    message: error.to_string(),
                },
            )
            .await;
    }

    pub async fn handle(&self, conn: ConnId, event: ClientEvent) -> RelayResult<()> {
        match event {
            ClientEvent::JoinRoom { username, room } => self.join_room(conn, &username, &room).await,
            ClientEvent::LeaveRoom { username, room } => {
                self.leave_room(conn, &username, &room).await
            }
            ClientEvent::SendMessage {
                room,
                username,
                text,
            } => self
                .send_message(conn, &room, &username, &text)
                .await
                .map(|_| ()),
            ClientEvent::AddReaction {
                message_id,
                emoji,
                room,
            } => self
                .add_reaction(&room, &message_id, &emoji)
                .await
                .map(|_| ()),
        }
    }

    pub async fn join_room(&self, conn: ConnId, username: &str, room_name: &str) -> RelayResult<()> {
        let room = self.rooms.room(room_name)?;
        let mut room = room.lock().await;

        if let Some(previous) = self.sessions.bind(conn, username, room_name).await
            && !previous.is(username, room_name)
        {
            debug!(
                %conn,
                previous_user = %previous.username,
                previous_room = %previous.room,
                "binding replaced, old presence kept"
            );
        }
        self.dispatcher.subscribe(conn, room_name).await;
        room.add_presence(username);

        let me = Audience::Connection(conn);
        self.dispatcher
            .send(
                me,
                ServerEvent::RoomHistory {
                    messages: room.history().to_vec(),
                },
            )
            .await;
        self.dispatcher
            .send(
                me,
                ServerEvent::UserListUpdate {
                    users: room.list_presence(),
                },
            )
            .await;
        self.dispatcher
            .send(
                Audience::RoomExcept(room_name, conn),
                ServerEvent::UserJoined {
                    user: username.to_owned(),
                },
            )
            .await;
        self.broadcast_presence(&room).await;

        info!(%conn, "{username} joined {room_name}");
        Ok(())
    }

    pub async fn leave_room(&self, conn: ConnId, username: &str, room_name: &str) -> RelayResult<()> {
        let room = self.rooms.room(room_name)?;
        let mut room = room.lock().await;

        self.dispatcher.unsubscribe(conn, room_name).await;
        room.remove_presence(username);

        match self.sessions.unbind(conn).await {
            None => debug!(%conn, "leave from {room_name}: {}", RelayError::MissingBinding),
            Some(binding) if !binding.is(username, room_name) => debug!(
                %conn,
                bound_user = %binding.username,
                bound_room = %binding.room,
                "leave names a different identity than the binding"
            ),
            Some(_) => {}
        }

        self.dispatcher
            .send(
                Audience::RoomExcept(room_name, conn),
                ServerEvent::UserLeft {
                    user: username.to_owned(),
                },
            )
            .await;
        self.broadcast_presence(&room).await;

        info!(%conn, "{username} left {room_name}");
        Ok(())
    }

    pub async fn send_message(
        &self,
        conn: ConnId,
        room_name: &str,
        username: &str,
        text: &str,
    ) -> RelayResult<Message> {
        let room = self.rooms.room(room_name)?;
        let mut room = room.lock().await;

        if self.sessions.get(conn).await.is_none() {
            debug!(%conn, "message to {room_name}: {}", RelayError::MissingBinding);
        }

        let message = room.append_message(username, text);
        self.dispatcher
            .send(
                Audience::Room(room_name),
                ServerEvent::NewMessage {
                    message: message.clone(),
                },
            )
            .await;

        debug!(%conn, id = %message.id, "message from {username} in {room_name}");
        Ok(message)
    }

    pub async fn add_reaction(
        &self,
        room_name: &str,
        message_id: &str,
        emoji: &str,
    ) -> RelayResult<Reactions> {
        let room = self.rooms.room(room_name)?;
        let id = Uuid::parse_str(message_id).map_err(|_| RelayError::UnknownMessage {
            room: room_name.to_owned(),
            id: message_id.to_owned(),
        })?;

        let mut room = room.lock().await;
        let reactions = room.increment_reaction(id, emoji)?;
        self.dispatcher
            .send(
                Audience::Room(room_name),
                ServerEvent::UpdateReactions {
                    message_id: id,
                    reactions: reactions.clone(),
                },
            )
            .await;

        debug!(%id, "reaction {emoji} in {room_name}");
        Ok(reactions)
    }

    /// Implicit leave for a connection that went away.
    ///
    /// Safe to call more than once; only the first call finds a binding.
    pub async fn disconnect(&self, conn: ConnId) -> Option<Binding> {
        self.dispatcher.unregister(conn).await;
        let binding = self.sessions.unbind(conn).await?;

        match self.rooms.room(&binding.room) {
            Ok(room) => {
                let mut room = room.lock().await;
                room.remove_presence(&binding.username);
                self.dispatcher
                    .send(
                        Audience::Room(&binding.room),
                        ServerEvent::UserLeft {
                            user: binding.username.clone(),
                        },
                    )
                    .await;
                self.broadcast_presence(&room).await;
                info!(%conn, "{} disconnected from {}", binding.username, binding.room);
            }
            Err(e) => warn!(%conn, "stale binding: {e}"),
        }

        Some(binding)
    }

    async fn broadcast_presence(&self, room: &Room) {
        self.dispatcher
            .send(
                Audience::Room(room.name()),
                ServerEvent::UserListUpdate {
                    users: room.list_presence(),
                },
            )
            .await;
    }
}
