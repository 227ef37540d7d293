use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::error::{ChatError, Result};
use crate::manager::RoomManager;
use crate::protocol::{Action, Request, Response, decode_request, encode_line};

type Outbound = mpsc::UnboundedSender<Response>;

/// Accept connections until the listener fails, one task per client.
pub async fn serve(listener: TcpListener, manager: RoomManager, config: ServerConfig) -> Result<()> {
    info!(addr = %listener.local_addr()?, "listening");
    loop {
        let (stream, peer) = listener.accept().await?;
        let manager = manager.clone();
        let motd = config.motd.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, peer, manager, motd).await {
                warn!(%peer, error = %e, "client error");
            }
        });
    }
}

/// Per-connection state: the room stream currently forwarded to the
/// client, if any.
struct Session {
    peer: SocketAddr,
    out: Outbound,
    forward: Option<JoinHandle<()>>,
}

impl Session {
    fn reply(&self, response: Response) {
        let _ = self.out.send(response);
    }

    /// Stop forwarding the current room. Awaiting the task guarantees its
    /// stream has been dropped, and so the user has left, before returning.
    async fn stop_forwarding(&mut self) {
        if let Some(task) = self.forward.take() {
            task.abort();
            let _ = task.await;
        }
    }

    async fn handle(&mut self, manager: &RoomManager, request: Request) -> bool {
        let Request { username, action } = request;
        match action {
            Action::CreateRoom { room } => match manager.create_room(&room) {
                Ok(()) => self.reply(Response::ok(format!("Room {room} created!, now join it"))),
                Err(e) => self.reply(Response::error(&e)),
            },
            Action::ListRooms => self.reply(Response::Rooms {
                rooms: manager.list_rooms(),
            }),
            Action::JoinRoom { room } => match manager.join(&username, &room) {
                Ok(mut stream) => {
                    self.reply(Response::Joined { room });
                    // Same user: the join already closed the old stream. A
                    // different username on this connection leaves its room here.
                    self.stop_forwarding().await;
                    let out = self.out.clone();
                    self.forward = Some(tokio::spawn(async move {
                        while let Some(msg) = stream.recv().await {
                            if out.send(Response::Chat(msg)).is_err() {
                                break;
                            }
                        }
                        debug!(
                            username = stream.username(),
                            room = stream.room(),
                            session = %stream.session(),
                            "room stream ended"
                        );
                    }));
                }
                Err(e) => self.reply(Response::error(&e)),
            },
            Action::SendMsg { room, msg } => {
                let result = room
                    .or_else(|| manager.current_room(&username))
                    .ok_or_else(|| ChatError::NotInRoom(username.clone()))
                    .and_then(|room| manager.send(&username, &room, &msg).map(|()| room));
                match result {
                    Ok(room) => {
                        debug!(peer = %self.peer, %username, %room, "message accepted");
                        self.reply(Response::ok(format!("Message sent to {room}")));
                    }
                    Err(e) => self.reply(Response::error(&e)),
                }
            }
            Action::Quit => {
                self.reply(Response::ok("Goodbye!"));
                return false;
            }
        }
        true
    }
}

/// Drive one client: decode requests line by line, stream room traffic
/// back through a single writer task. When the client goes away, however
/// that happens, its room stream is dropped and the user leaves the room.
pub async fn handle_client(
    stream: TcpStream,
    peer: SocketAddr,
    manager: RoomManager,
    motd: Option<String>,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    info!(%peer, "client connected");

    let (out, mut out_rx) = mpsc::unbounded_channel::<Response>();
    let writer_task = tokio::spawn(async move {
        while let Some(response) = out_rx.recv().await {
            let line = match encode_line(&response) {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "dropping unencodable response");
                    continue;
                }
            };
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
        }
        let _ = writer.shutdown().await;
    });

    let mut session = Session {
        peer,
        out,
        forward: None,
    };
    if let Some(motd) = motd {
        session.reply(Response::ok(motd));
    }

    let mut line = String::new();
    let result = loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break Ok(()),
            Ok(_) => {}
            Err(e) => break Err(ChatError::from(e)),
        }
        if line.trim().is_empty() {
            continue;
        }

        match decode_request(&line) {
            Ok(request) => {
                if !session.handle(&manager, request).await {
                    break Ok(());
                }
            }
            Err(e) => {
                debug!(%peer, error = %e, "bad request");
                session.reply(Response::error(&e));
            }
        }
    };

    session.stop_forwarding().await;
    drop(session);
    let _ = writer_task.await;
    info!(%peer, "client disconnected");

    result
}
