use super::Protocol;
use super::ServerMessage;
use crate::PlayerUuid;
use crate::SessionId;
use crate::game::Action;
use crate::game::Audience;
use crate::game::GameError;
use crate::game::Room;
use crate::game::Scoped;
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::oneshot;

/// Unit of work delivered to a room actor.
/// Everything that can touch room state arrives through this channel,
/// which is what serializes mutation per room.
#[derive(Debug)]
pub enum Envelope {
    /// A connection wants in: join or reconnect by durable uuid.
    /// The verdict goes back on `ack` so the bridge only binds the
    /// connection to a room it actually entered.
    Join {
        session: SessionId,
        tx: UnboundedSender<String>,
        name: String,
        uuid: PlayerUuid,
        ack: oneshot::Sender<Result<(), GameError>>,
    },
    /// A bound connection issued a game action.
    Act { session: SessionId, action: Action },
    /// The transport dropped; not an error, just a departure.
    Drop { session: SessionId },
}

/// Runs one room in its own task.
///
/// Owns the [`Room`] plus the outbound sender of every attached session,
/// delivering events by audience and errors to the caller only. Exits
/// when the last participant drops; the registry reaps the entry via the
/// `done` signal.
pub struct RoomActor {
    room: Room,
    inbox: UnboundedReceiver<Envelope>,
    sessions: HashMap<SessionId, UnboundedSender<String>>,
}

impl RoomActor {
    /// Spawns the actor task. Returns the envelope sender and the signal
    /// fired when the room dies.
    pub fn spawn(room: Room) -> (UnboundedSender<Envelope>, oneshot::Receiver<()>) {
        let (tx, rx) = unbounded_channel();
        let (done_tx, done_rx) = oneshot::channel();
        let actor = Self {
            room,
            inbox: rx,
            sessions: HashMap::new(),
        };
        tokio::spawn(actor.run(done_tx));
        (tx, done_rx)
    }
    async fn run(mut self, done: oneshot::Sender<()>) {
        while let Some(envelope) = self.inbox.recv().await {
            match envelope {
                Envelope::Join {
                    session,
                    tx,
                    name,
                    uuid,
                    ack,
                } => {
                    self.sessions.insert(session, tx);
                    match self.room.join(session, &name, uuid) {
                        Ok(events) => {
                            self.deliver(session, events);
                            let _ = ack.send(Ok(()));
                        }
                        Err(e) => {
                            self.sessions.remove(&session);
                            let _ = ack.send(Err(e));
                        }
                    }
                }
                Envelope::Act { session, action } => match self.room.dispatch(session, action) {
                    Ok(events) => self.deliver(session, events),
                    Err(e) => self.error(session, &e),
                },
                Envelope::Drop { session } => {
                    self.sessions.remove(&session);
                    let events = self.room.leave(session);
                    self.deliver(session, events);
                    if self.room.is_empty() {
                        log::info!("[room {}] empty, shutting down", self.room.id());
                        break;
                    }
                }
            }
        }
        let _ = done.send(());
    }
    fn deliver(&self, caller: SessionId, events: Vec<Scoped>) {
        for scoped in events {
            let json = Protocol::encode(&scoped.event).to_json();
            match scoped.audience {
                Audience::Caller => self.unicast(caller, json),
                Audience::Room => self.broadcast(json),
            }
        }
    }
    fn error(&self, caller: SessionId, error: &impl std::fmt::Display) {
        log::debug!("[room {}] rejected session {}: {}", self.room.id(), caller, error);
        self.unicast(caller, ServerMessage::error(error).to_json());
    }
    fn unicast(&self, session: SessionId, json: String) {
        match self.sessions.get(&session).map(|tx| tx.send(json)) {
            Some(Ok(())) => {}
            Some(Err(e)) => log::warn!("failed unicast to session {}: {:?}", session, e),
            None => log::warn!("unicast to session {}: no such session", session),
        }
    }
    fn broadcast(&self, json: String) {
        self.sessions
            .iter()
            .map(|(id, tx)| (id, tx.send(json.clone())))
            .filter_map(|(id, res)| res.err().map(|e| (id, e)))
            .for_each(|(id, e)| log::warn!("failed broadcast to session {}: {:?}", id, e));
    }
}
