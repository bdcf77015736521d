use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;

use relaychat_core::error::{RelayError, Result};

/// Connection identity, allocated in accept order.
pub type SessionId = u64;

/// One session's outbound queue sender.
#[derive(Clone, Debug)]
pub struct Connection {
    pub tx: mpsc::Sender<Message>,
}

/// Per-connection chat state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub display_name: Option<String>,
    pub room: String,
}

/// Snapshot of one live session together with its outbound queue.
#[derive(Clone, Debug)]
pub struct Member {
    pub session: Session,
    pub conn: Connection,
}

#[derive(Clone)]
struct SessionEntry {
    session: Session,
    conn: Connection,
}

/// Session registry: `session_id -> (Session, Connection)`.
///
/// Record updates happen under the map's shard lock, so readers never see a
/// half-updated session. Iteration snapshots matching records first and runs
/// callbacks with no lock held.
pub struct SessionRegistry {
    sessions: DashMap<SessionId, SessionEntry>,
    default_room: String,
    seq: AtomicU64,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new("commons")
    }
}

impl SessionRegistry {
    pub fn new(default_room: impl Into<String>) -> Self {
        Self {
            sessions: DashMap::new(),
            default_room: default_room.into(),
            seq: AtomicU64::new(1),
        }
    }

    pub fn default_room(&self) -> &str {
        &self.default_room
    }

    /// Register a freshly accepted connection in the default room.
    pub fn on_connect(&self, conn: Connection) -> SessionId {
        let id = self.seq.fetch_add(1, Ordering::Relaxed);
        let session = Session {
            id,
            display_name: None,
            room: self.default_room.clone(),
        };
        self.sessions.insert(id, SessionEntry { session, conn });
        id
    }

    /// Forget a connection. Idempotent.
    pub fn on_disconnect(&self, id: SessionId) -> Option<Session> {
        self.sessions.remove(&id).map(|(_, entry)| entry.session)
    }

    pub fn get(&self, id: SessionId) -> Option<Session> {
        self.sessions.get(&id).map(|r| r.value().session.clone())
    }

    pub fn connection(&self, id: SessionId) -> Option<Connection> {
        self.sessions.get(&id).map(|r| r.value().conn.clone())
    }

    pub fn set_display_name(&self, id: SessionId, name: impl Into<String>) -> Result<()> {
        let mut entry = self
            .sessions
            .get_mut(&id)
            .ok_or_else(|| RelayError::NotFound(format!("session {id}")))?;
        entry.session.display_name = Some(name.into());
        Ok(())
    }

    pub fn join_room(&self, id: SessionId, room: impl Into<String>) -> Result<()> {
        let mut entry = self
            .sessions
            .get_mut(&id)
            .ok_or_else(|| RelayError::NotFound(format!("session {id}")))?;
        entry.session.room = room.into();
        Ok(())
    }

    /// Snapshot of every session in `room`, in registry (accept) order.
    pub fn members_of(&self, room: &str) -> Vec<Member> {
        self.snapshot(|s| s.room == room)
    }

    /// Apply `f` to every session currently in `room`.
    pub fn for_each_in_room<F>(&self, room: &str, mut f: F)
    where
        F: FnMut(&Member),
    {
        for m in self.members_of(room) {
            f(&m);
        }
    }

    /// First session with this display name, in registry order.
    pub fn find_by_display_name(&self, name: &str) -> Option<Member> {
        self.find_all_by_display_name(name).into_iter().next()
    }

    /// Every session with this display name. Duplicate names are allowed.
    pub fn find_all_by_display_name(&self, name: &str) -> Vec<Member> {
        self.snapshot(|s| s.display_name.as_deref() == Some(name))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn snapshot<P>(&self, mut keep: P) -> Vec<Member>
    where
        P: FnMut(&Session) -> bool,
    {
        let mut out: Vec<Member> = self
            .sessions
            .iter()
            .filter(|r| keep(&r.value().session))
            .map(|r| Member {
                session: r.value().session.clone(),
                conn: r.value().conn.clone(),
            })
            .collect();
        out.sort_by_key(|m| m.session.id);
        out
    }
}
