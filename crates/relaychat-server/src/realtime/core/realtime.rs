use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::{timeout, Duration};

use relaychat_core::error::{RelayError, Result};
use relaychat_core::protocol::Envelope;

use crate::realtime::core::{Connection, Member, Session, SessionId, SessionRegistry};
use crate::realtime::types::{Outgoing, PreparedMsg, QoS};

/// How a single delivery attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Queued,
    /// Queue full (lossy) or timed out (reliable).
    Dropped,
    /// Receiver is gone.
    Unreachable,
}

/// RealtimeCore: egress engine (send to session / publish to room).
pub struct RealtimeCore {
    pub sessions: Arc<SessionRegistry>,
    drops: AtomicU64,
    send_failures: AtomicU64,
}

impl RealtimeCore {
    pub fn new(sessions: Arc<SessionRegistry>) -> Self {
        Self {
            sessions,
            drops: AtomicU64::new(0),
            send_failures: AtomicU64::new(0),
        }
    }

    /// Messages dropped because a queue was full or a send timed out.
    pub fn egress_drop_count(&self) -> u64 {
        self.drops.load(Ordering::Relaxed)
    }

    /// Messages addressed to sessions whose transport was already gone.
    pub fn egress_send_fail_count(&self) -> u64 {
        self.send_failures.load(Ordering::Relaxed)
    }

    /// Unicast to one session by id.
    pub async fn send_to_session(&self, id: SessionId, out: Outgoing) -> Result<()> {
        let conn = self
            .sessions
            .connection(id)
            .ok_or_else(|| RelayError::PeerUnreachable(format!("session {id}")))?;
        let prepared = PreparedMsg::prepare(&out)?;
        match self.deliver(id, &conn, &prepared, out.qos).await {
            Delivery::Unreachable => Err(RelayError::PeerUnreachable(format!("session {id}"))),
            _ => Ok(()),
        }
    }

    /// Broadcast to every session in `room`, sender included.
    pub async fn publish_room(&self, room: &str, out: Outgoing) -> Result<usize> {
        let members = self.sessions.members_of(room);
        self.send_to_members(members, out).await
    }

    /// Fan out to a snapshot of members. Per-recipient failures are logged
    /// and skipped. Returns how many messages were queued.
    pub async fn send_to_members(&self, members: Vec<Member>, out: Outgoing) -> Result<usize> {
        let prepared = PreparedMsg::prepare(&out)?;

        let mut futs = FuturesUnordered::new();
        for m in &members {
            futs.push(self.deliver(m.session.id, &m.conn, &prepared, out.qos));
        }

        let mut queued = 0;
        while let Some(d) = futs.next().await {
            if d == Delivery::Queued {
                queued += 1;
            }
        }
        Ok(queued)
    }

    async fn deliver(
        &self,
        id: SessionId,
        conn: &Connection,
        prepared: &PreparedMsg,
        qos: QoS,
    ) -> Delivery {
        let msg = prepared.to_ws_message();
        let outcome = match qos {
            QoS::Lossy => match conn.tx.try_send(msg) {
                Ok(()) => Delivery::Queued,
                Err(TrySendError::Full(_)) => Delivery::Dropped,
                Err(TrySendError::Closed(_)) => Delivery::Unreachable,
            },
            QoS::Reliable { timeout_ms } => {
                match timeout(Duration::from_millis(timeout_ms), conn.tx.send(msg)).await {
                    Ok(Ok(())) => Delivery::Queued,
                    Ok(Err(_)) => Delivery::Unreachable,
                    Err(_) => Delivery::Dropped,
                }
            }
        };

        match outcome {
            Delivery::Queued => {}
            Delivery::Dropped => {
                self.drops.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(session = id, "outbound queue saturated; message dropped");
            }
            Delivery::Unreachable => {
                self.send_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(session = id, "peer unreachable; skipping");
            }
        }
        outcome
    }
}

/// Per-message context passed to services (borrow tools instead of owning).
#[derive(Clone)]
pub struct RealtimeCtx {
    session: SessionId,
    qos: QoS,
    core: Arc<RealtimeCore>,
}

impl RealtimeCtx {
    pub fn new(session: SessionId, qos: QoS, core: Arc<RealtimeCore>) -> Self {
        Self { session, qos, core }
    }

    pub fn session_id(&self) -> SessionId {
        self.session
    }

    pub fn qos(&self) -> QoS {
        self.qos
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.core.sessions
    }

    /// Current snapshot of the originating session.
    pub fn session(&self) -> Result<Session> {
        self.registry()
            .get(self.session)
            .ok_or_else(|| RelayError::NotFound(format!("session {}", self.session)))
    }

    /// Plain text back to the originating session only.
    pub async fn reply_text(&self, text: impl Into<String>) -> Result<()> {
        self.core
            .send_to_session(self.session, Outgoing::text(self.qos, text))
            .await
    }

    /// Envelope back to the originating session only.
    pub async fn reply(&self, env: Envelope) -> Result<()> {
        self.core
            .send_to_session(self.session, Outgoing::envelope(self.qos, env))
            .await
    }

    pub async fn publish_room(&self, room: &str, out: Outgoing) -> Result<usize> {
        self.core.publish_room(room, out).await
    }

    pub async fn send_to_members(&self, members: Vec<Member>, out: Outgoing) -> Result<usize> {
        self.core.send_to_members(members, out).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::ws::Message;
    use tokio::sync::mpsc;

    fn core_with(n: usize, queue: usize) -> (Arc<RealtimeCore>, Vec<mpsc::Receiver<Message>>) {
        let core = Arc::new(RealtimeCore::new(Arc::new(SessionRegistry::default())));
        let rxs = (0..n)
            .map(|_| {
                let (tx, rx) = mpsc::channel(queue);
                core.sessions.on_connect(Connection { tx });
                rx
            })
            .collect();
        (core, rxs)
    }

    #[tokio::test]
    async fn lossy_publish_drops_when_queue_is_full() {
        let (core, mut rxs) = core_with(2, 1);

        let first = core
            .publish_room("commons", Outgoing::text(QoS::Lossy, "one"))
            .await
            .unwrap();
        let second = core
            .publish_room("commons", Outgoing::text(QoS::Lossy, "two"))
            .await
            .unwrap();

        assert_eq!((first, second), (2, 0));
        assert_eq!(core.egress_drop_count(), 2);
        assert!(matches!(rxs[0].try_recv(), Ok(Message::Text(s)) if s == "one"));
    }

    #[tokio::test]
    async fn closed_receivers_are_skipped_and_counted() {
        let (core, mut rxs) = core_with(3, 4);
        drop(rxs.remove(1));

        let queued = core
            .publish_room(
                "commons",
                Outgoing::text(QoS::Reliable { timeout_ms: 100 }, "hi"),
            )
            .await
            .unwrap();

        assert_eq!(queued, 2);
        assert_eq!(core.egress_send_fail_count(), 1);
        for rx in &mut rxs {
            assert!(matches!(rx.try_recv(), Ok(Message::Text(s)) if s == "hi"));
        }
    }

    #[tokio::test]
    async fn reliable_send_times_out_into_a_drop() {
        let (core, _rxs) = core_with(1, 1);
        let out = || Outgoing::text(QoS::Reliable { timeout_ms: 20 }, "x");

        core.send_to_session(1, out()).await.unwrap();
        core.send_to_session(1, out()).await.unwrap();
        assert_eq!(core.egress_drop_count(), 1);
    }

    #[tokio::test]
    async fn unknown_session_is_unreachable() {
        let (core, _rxs) = core_with(0, 1);
        let err = core
            .send_to_session(42, Outgoing::text(QoS::Lossy, "x"))
            .await
            .unwrap_err();
        assert_eq!(err.client_code().as_str(), "PEER_UNREACHABLE");
    }
}
