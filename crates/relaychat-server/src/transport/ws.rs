//! WebSocket handler.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS and register the session
//! - Lifecycle: writer task, ping, idle timeout
//! - Decode once, then hand every inbound unit to the dispatcher
//! - Deregister on every exit path

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use tracing::Instrument;

use relaychat_core::error::RelayError;

use crate::app_state::AppState;
use crate::realtime::{Connection, QoS, RealtimeCtx, SessionId};
use crate::transport::codec::{decode, Frame};

/// Headroom on top of the upload limit for frame headers and filenames.
pub const FRAME_HEADROOM_BYTES: usize = 64 * 1024;

/// Frames up to this multiple of the upload limit are read in full so the
/// file service can answer with a size notice. Larger ones abort the read.
pub const FRAME_LIMIT_FACTOR: usize = 2;

// --------------------
// Entry
// --------------------
pub async fn ws_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let max_frame = app.max_frame_bytes();
    ws.max_message_size(max_frame)
        .max_frame_size(max_frame)
        .on_upgrade(move |socket| run(app, socket))
}

async fn run(app: AppState, socket: WebSocket) {
    let (out_tx, out_rx) = mpsc::channel::<Message>(app.cfg().server.outbound_queue);
    let id = app.realtime().sessions.on_connect(Connection { tx: out_tx });

    let span = tracing::info_span!("session", session = id);
    async move {
        tracing::info!(sessions = app.realtime().sessions.len(), "client connected");
        run_session(&app, id, socket, out_rx).await;
        let core = app.realtime();
        tracing::info!(
            sessions = core.sessions.len(),
            egress_drops = core.egress_drop_count(),
            egress_send_failures = core.egress_send_fail_count(),
            "client disconnected"
        );
    }
    .instrument(span)
    .await
}

// --------------------
// Core session loop
// --------------------
async fn run_session(
    app: &AppState,
    id: SessionId,
    socket: WebSocket,
    mut out_rx: mpsc::Receiver<Message>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    // outbound writer: the read loop may await dispatch while replies queue up
    let writer = tokio::spawn(
        async move {
            while let Some(m) = out_rx.recv().await {
                if ws_tx.send(m).await.is_err() {
                    break;
                }
            }
            let _ = ws_tx.close().await;
        }
        .in_current_span(),
    );

    let srv = &app.cfg().server;
    let ping_every = Duration::from_millis(srv.ping_interval_ms);
    let idle_timeout = Duration::from_millis(srv.idle_timeout_ms);
    let qos = QoS::from_timeout_ms(srv.send_timeout_ms);

    let mut ping_tick = tokio::time::interval(ping_every);
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let idle = tokio::time::sleep(idle_timeout);
    tokio::pin!(idle);

    let ctx = RealtimeCtx::new(id, qos, app.realtime());
    let dispatcher = app.dispatcher();

    loop {
        tokio::select! {
            incoming = ws_rx.next() => {
                let msg = match incoming {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => {
                        if is_oversize(&e) {
                            tracing::info!(error = %e, "inbound frame over transport limit");
                            reject_oversize(app, id);
                        } else {
                            tracing::debug!(error = %e, "websocket read error");
                        }
                        break;
                    }
                    None => break,
                };
                idle.as_mut().reset(Instant::now() + idle_timeout);

                match decode(msg) {
                    Ok(Frame::Inbound { inbound, bytes_len }) => {
                        tracing::trace!(bytes_len, "inbound");
                        dispatcher.dispatch(ctx.clone(), inbound).await;
                    }
                    Ok(Frame::Ping(payload)) => {
                        if let Some(conn) = app.realtime().sessions.connection(id) {
                            let _ = conn.tx.try_send(Message::Pong(payload));
                        }
                    }
                    Ok(Frame::Pong(_)) => {}
                    Ok(Frame::Close) => break,
                    Err(e) => {
                        tracing::debug!(error = %e, "undecodable frame");
                        let _ = ctx.reply_text(e.notice()).await;
                    }
                }
            }

            _ = ping_tick.tick() => {
                if let Some(conn) = app.realtime().sessions.connection(id) {
                    let _ = conn.tx.try_send(Message::Ping(Vec::new()));
                }
            }

            _ = &mut idle => {
                tracing::info!(timeout_ms = srv.idle_timeout_ms, "idle timeout");
                break;
            }
        }
    }

    // removing the entry drops the last sender; the writer drains and exits
    app.realtime().sessions.on_disconnect(id);
    let _ = writer.await;
}

/// Queue the size notice and a `1009` close; the writer flushes both while
/// the session tears down.
fn reject_oversize(app: &AppState, id: SessionId) {
    let Some(conn) = app.realtime().sessions.connection(id) else {
        return;
    };
    let notice = RelayError::PayloadTooLarge {
        limit: app.cfg().files.max_upload_bytes,
    }
    .notice();
    let _ = conn.tx.try_send(Message::Text(notice));
    let _ = conn.tx.try_send(Message::Close(Some(CloseFrame {
        code: close_code::SIZE,
        reason: "message too big".into(),
    })));
}

/// True when the read failed because a message or frame exceeded the
/// configured size. The websocket error type is opaque behind `axum::Error`,
/// so the capacity error is recognized by its rendered message.
fn is_oversize(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut cur = Some(err);
    while let Some(e) = cur {
        let text = e.to_string();
        if text.contains("Space limit exceeded") || text.contains("too long") {
            return true;
        }
        cur = e.source();
    }
    false
}
