use super::Envelope;
use super::RoomActor;
use crate::RoomId;
use crate::SessionId;
use crate::game::Entropy;
use crate::game::GameError;
use crate::game::Room;
use crate::game::RoomConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedSender;

/// Handle to communicate with a running room actor.
#[derive(Clone, Debug)]
pub struct RoomHandle {
    pub tx: UnboundedSender<Envelope>,
}

/// Maps room ids to live room actors and mints session identities.
///
/// An explicit value owned by the server (injected as `web::Data`), not an
/// ambient singleton. Rooms remove themselves: when an actor exits its
/// `done` signal fires and the reaper task drops the handle, so an empty
/// room disappears immediately.
pub struct Registry {
    rooms: RwLock<HashMap<RoomId, RoomHandle>>,
    sessions: AtomicU64,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            sessions: AtomicU64::new(1),
        }
    }
}

impl Registry {
    /// Mints a fresh ephemeral identity for a new connection.
    pub fn session(&self) -> SessionId {
        self.sessions.fetch_add(1, Ordering::Relaxed)
    }
    /// Opens a room with the given id and settings.
    /// Spawns its actor and the reaper that removes it once it dies.
    pub async fn create(
        self: Arc<Self>,
        id: RoomId,
        config: RoomConfig,
    ) -> Result<UnboundedSender<Envelope>, GameError> {
        config.validate()?;
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&id) {
            return Err(GameError::RoomExists);
        }
        let room = Room::new(id.clone(), config, Box::new(Entropy::default()));
        let (tx, done) = RoomActor::spawn(room);
        rooms.insert(id.clone(), RoomHandle { tx: tx.clone() });
        log::info!("opened room {}", id);
        let registry = Arc::clone(&self);
        tokio::spawn(async move {
            let _ = done.await;
            registry.rooms.write().await.remove(&id);
            log::info!("closed room {}", id);
        });
        Ok(tx)
    }
    /// Looks up the envelope channel for a live room.
    pub async fn lookup(&self, id: &RoomId) -> Result<UnboundedSender<Envelope>, GameError> {
        self.rooms
            .read()
            .await
            .get(id)
            .map(|handle| handle.tx.clone())
            .ok_or(GameError::RoomNotFound)
    }
    /// Number of live rooms.
    pub async fn count(&self) -> usize {
        self.rooms.read().await.len()
    }
}
