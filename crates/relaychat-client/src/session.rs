//! WebSocket client session.
//!
//! The client outlives its connection: `#logoff` closes the socket, `#login`
//! opens a new one, and the target may only change while disconnected.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream,
};

use relaychat_core::error::{RelayError, Result};
use relaychat_core::protocol::frame::encode_frame;
use relaychat_core::protocol::text::encode_text;
use relaychat_core::protocol::{Command, Envelope};

use crate::inbound::{render, ServerFrame};
use crate::input::{parse_line, ClientInput};
use crate::target::Target;

/// Default upload ceiling, matching the server's default.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

const NOT_CONNECTED: &str = "Not connected. Use #login to connect.";

/// Session settings taken from the command line.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub url: String,
    pub name: Option<String>,
    pub downloads: PathBuf,
    pub max_upload_bytes: u64,
}

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// One live connection: the write half plus the task printing server frames.
struct Link {
    write: WsSink,
    reader: JoinHandle<()>,
}

impl Link {
    async fn open(target: &Target, opts: &ClientOptions) -> Result<Self> {
        let url = target.url();
        let (ws, _) = connect_async(url.as_str())
            .await
            .map_err(|e| RelayError::Internal(format!("connect to {url} failed: {e}")))?;
        tracing::info!(%url, "connected");
        println!(
            "Connected to server at {} on port {}",
            target.host(),
            target.port()
        );

        let (write, mut read) = ws.split();
        let downloads = opts.downloads.clone();
        let reader = tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                let frame = match msg {
                    Ok(Message::Text(s)) => ServerFrame::Text(s),
                    Ok(Message::Binary(b)) => ServerFrame::Binary(Bytes::from(b)),
                    Ok(Message::Close(_)) => {
                        tracing::info!("server closed the connection");
                        break;
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::warn!(error = %e, "websocket read error");
                        break;
                    }
                };
                for line in render(frame, &downloads).await {
                    println!("{line}");
                }
            }
            println!("Connection closed");
        });

        let mut link = Self { write, reader };
        if let Some(name) = opts.name.as_deref() {
            let env = Envelope::new(Command::SetName).with_text(name);
            link.send(Message::Text(encode_text(&env)?)).await?;
        }
        Ok(link)
    }

    async fn send(&mut self, msg: Message) -> Result<()> {
        self.write.send(msg).await.map_err(|e| {
            RelayError::PeerUnreachable(format!("could not send message to server: {e}"))
        })
    }

    async fn close(mut self) {
        let _ = self.write.send(Message::Close(None)).await;
        let _ = self.write.close().await;
        self.reader.abort();
    }
}

enum Event {
    Line(Option<String>),
    Dropped,
}

/// Connect, then relay stdin to the server and server frames to stdout
/// until the user quits or stdin ends.
pub async fn run_client(opts: ClientOptions) -> Result<()> {
    let mut target = Target::parse(&opts.url)?;
    let mut link = Some(Link::open(&target, &opts).await?);
    println!("Type #quit to leave.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let event = match link.as_mut() {
            Some(l) => tokio::select! {
                _ = &mut l.reader => Event::Dropped,
                line = lines.next_line() => Event::Line(stdin_line(line)?),
            },
            None => Event::Line(stdin_line(lines.next_line().await)?),
        };
        let line = match event {
            Event::Dropped => {
                link = None;
                continue;
            }
            Event::Line(None) => break,
            Event::Line(Some(line)) => line,
        };

        let msg = match parse_line(&line) {
            ClientInput::Ignore => continue,
            ClientInput::Hint(h) => {
                println!("{h}");
                continue;
            }
            ClientInput::Quit => {
                println!("Shutting Down Client");
                break;
            }
            ClientInput::Logoff => {
                match link.take() {
                    Some(l) => {
                        println!("Disconnecting from server");
                        l.close().await;
                    }
                    None => println!("Not connected."),
                }
                continue;
            }
            ClientInput::Login => {
                if link.is_some() {
                    println!("already connected");
                } else {
                    match Link::open(&target, &opts).await {
                        Ok(l) => link = Some(l),
                        Err(e) => println!("failed to connect to server. ({e})"),
                    }
                }
                continue;
            }
            ClientInput::SetHost(host) => {
                if link.is_some() {
                    println!("Cannot change host while connected");
                } else {
                    target.set_host(host);
                    println!("Host set to {}", target.host());
                }
                continue;
            }
            ClientInput::SetPort(port) => {
                if link.is_some() {
                    println!("Cannot change port while connected");
                } else {
                    target.set_port(port);
                    println!("Port set to {port}");
                }
                continue;
            }
            ClientInput::Chat(text) => Message::Text(text),
            ClientInput::Send(env) => Message::Text(encode_text(&env)?),
            ClientInput::Upload(path) => match upload_frame(&path, opts.max_upload_bytes).await {
                Ok(frame) => Message::Binary(frame.to_vec()),
                Err(e) => {
                    println!("{}", e.notice());
                    continue;
                }
            },
        };

        let Some(l) = link.as_mut() else {
            println!("{NOT_CONNECTED}");
            continue;
        };
        let sent = l.send(msg).await;
        if let Err(e) = sent {
            println!("{}", e.notice());
            if let Some(l) = link.take() {
                l.close().await;
            }
        }
    }

    if let Some(l) = link {
        l.close().await;
    }
    Ok(())
}

fn stdin_line(line: std::io::Result<Option<String>>) -> Result<Option<String>> {
    line.map_err(|e| RelayError::Internal(format!("stdin: {e}")))
}

/// Read a local file and wrap it as an `uploadFile` frame named by its base
/// filename. Files above `max_bytes` are refused before anything is read.
pub async fn upload_frame(path: &Path, max_bytes: u64) -> Result<Bytes> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| RelayError::BadRequest(format!("not a file path: {}", path.display())))?;

    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|e| RelayError::NotFound(format!("{} ({e})", path.display())))?;
    if meta.len() > max_bytes {
        return Err(RelayError::PayloadTooLarge { limit: max_bytes });
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| RelayError::NotFound(format!("{} ({e})", path.display())))?;

    encode_frame(
        &Envelope::new(Command::UploadFile)
            .with_arg(name)
            .with_bytes(bytes),
    )
}
