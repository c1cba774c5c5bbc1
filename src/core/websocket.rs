/// WebSocket transport - one socket per connection, routed to a room by URL path
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::{CloseFrame, Message};
use tracing::{debug, info, warn};

use crate::core::connection::ConnectionId;
use crate::core::game::Frame;
use crate::core::registry::RoomDirectory;

/// Pause after a failed `accept` before trying again
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// WebSocket game server: accepts sockets and hands each one to its room
pub struct WebSocketServer {
    listener: TcpListener,
    directory: RoomDirectory,
}

impl WebSocketServer {
    pub async fn bind(addr: SocketAddr, directory: RoomDirectory) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            directory,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever
    pub async fn run(self) -> Result<()> {
        info!("listening on ws://{}", self.listener.local_addr()?);

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    // e.g. out of file descriptors; back off and keep serving
                    warn!("failed to accept connection: {e}");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };
            let directory = self.directory.clone();

            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, peer, directory).await {
                    warn!(%peer, "connection ended with error: {e}");
                }
            });
        }
    }
}

/// Handle one socket: upgrade, join the room named by the path, pump frames both ways
async fn handle_connection(stream: TcpStream, peer: SocketAddr, directory: RoomDirectory) -> Result<()> {
    let mut path = String::new();
    let ws_stream = accept_hdr_async(stream, |req: &Request, resp: Response| {
        path = req.uri().path().to_string();
        Ok::<_, ErrorResponse>(resp)
    })
    .await?;

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let room = match directory.get(&path) {
        Ok(room) => room.clone(),
        Err(e) => {
            debug!(%peer, "{e}");
            let close = CloseFrame {
                code: CloseCode::Policy,
                reason: e.to_string().into(),
            };
            let _ = ws_sender.send(Message::Close(Some(close))).await;
            return Ok(());
        }
    };

    let conn = ConnectionId::new();
    let (frame_tx, mut frame_rx) = mpsc::unbounded_channel::<String>();
    room.connect(conn, frame_tx)?;
    debug!(%peer, %conn, room = room.namespace(), "socket attached");

    loop {
        tokio::select! {
            // Outbound: frames queued by the room
            Some(text) = frame_rx.recv() => {
                if ws_sender.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            // Inbound: frames from the client
            msg = ws_receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => match serde_json::from_str::<Frame>(&text) {
                        Ok(frame) => room.input(conn, frame)?,
                        Err(e) => debug!(%conn, "malformed frame ignored: {e}"),
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!(%conn, "websocket error: {e}");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    // Cleanup when connection closes
    room.disconnect(conn)?;
    Ok(())
}
