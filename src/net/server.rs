//! Game server
//!
//! TCP listener for game clients, one JSON message per line. Each
//! connection gets a roster entry, a greeting, and a forwarding task that
//! relays the session's broadcast stream; inbound lines are dispatched to
//! the session coordinator.

use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::net::messages::{ClientMessage, ServerMessage};
use crate::session::Session;

pub struct GameServer {
    listener: TcpListener,
    session: Arc<Session>,
}

impl GameServer {
    pub async fn bind(addr: &str, session: Arc<Session>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("🎧 Listening on {}", listener.local_addr()?);
        Ok(Self { listener, session })
    }

    /// Actual bound address; useful when binding port 0
    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn run(self) -> Result<()> {
        loop {
            let (stream, addr) = self.listener.accept().await?;
            let session = self.session.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_client(stream, session).await {
                    warn!("Client {} error: {}", addr, e);
                }
            });
        }
    }
}

type SharedWriter = Arc<Mutex<OwnedWriteHalf>>;

async fn handle_client(stream: TcpStream, session: Arc<Session>) -> Result<()> {
    let (reader, writer) = stream.into_split();
    let writer: SharedWriter = Arc::new(Mutex::new(writer));

    let player_id = session.connect().await;
    let events = session.subscribe();

    // Greeting goes to this connection only; everything after is fan-out
    send(&writer, &ServerMessage::Connected).await?;

    let forwarder = tokio::spawn(forward_events(events, writer.clone(), player_id));

    let result = read_loop(reader, &writer, &session, player_id).await;

    session.disconnect(player_id).await;
    forwarder.abort();
    result
}

async fn read_loop(
    reader: tokio::net::tcp::OwnedReadHalf,
    writer: &SharedWriter,
    session: &Session,
    player_id: u64,
) -> Result<()> {
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<ClientMessage>(line) {
            Ok(message) => dispatch(session, player_id, message).await,
            Err(e) => {
                debug!("Malformed message from player {}: {}", player_id, e);
                // Non-fatal: answer the sender and keep the connection open
                let _ = send(
                    writer,
                    &ServerMessage::Error {
                        message: format!("invalid message: {}", e),
                    },
                )
                .await;
            }
        }
    }

    Ok(())
}

async fn dispatch(session: &Session, player_id: u64, message: ClientMessage) {
    match message {
        ClientMessage::Answer { answer, pseudo } => {
            session.submit_answer(player_id, &answer, &pseudo).await;
        }
        ClientMessage::NextTrack { should_skip } => {
            session.request_next_track(should_skip.unwrap_or(true)).await;
        }
        ClientMessage::Hint => session.send_hint().await,
    }
}

async fn forward_events(
    mut events: tokio::sync::broadcast::Receiver<ServerMessage>,
    writer: SharedWriter,
    player_id: u64,
) {
    loop {
        match events.recv().await {
            Ok(message) => {
                if send(&writer, &message).await.is_err() {
                    break;
                }
            }
            Err(RecvError::Lagged(missed)) => {
                warn!("Player {} lagging, dropped {} events", player_id, missed);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

async fn send(writer: &SharedWriter, message: &ServerMessage) -> Result<()> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    writer.lock().await.write_all(line.as_bytes()).await?;
    Ok(())
}
