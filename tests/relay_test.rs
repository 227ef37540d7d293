//! End-to-end tests: a real listener on an ephemeral port, clients speaking
//! JSON lines over TCP.

use std::time::Duration;

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

use room_relay::RoomManager;
use room_relay::config::ServerConfig;
use room_relay::server;

struct Client {
    username: String,
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: &str, username: &str) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect");
        let (reader, writer) = stream.into_split();
        Self {
            username: username.to_string(),
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    async fn send(&mut self, mut request: Value) {
        request["username"] = json!(self.username);
        let line = format!("{request}\n");
        self.writer.write_all(line.as_bytes()).await.expect("write");
    }

    async fn recv(&mut self) -> Value {
        let line = timeout(Duration::from_secs(2), self.lines.next_line())
            .await
            .expect("receive timeout")
            .expect("read")
            .expect("server closed connection");
        serde_json::from_str(&line).expect("server sent json")
    }

    /// Read two frames whose relative order is not fixed.
    async fn recv_both(&mut self, a: &Value, b: &Value) {
        let first = self.recv().await;
        let second = self.recv().await;
        assert!(
            (first == *a && second == *b) || (first == *b && second == *a),
            "expected {a} and {b}, got {first} and {second}"
        );
    }

    async fn assert_quiet(&mut self) {
        assert!(
            timeout(Duration::from_millis(100), self.lines.next_line())
                .await
                .is_err(),
            "expected no frame"
        );
    }
}

fn chat(room: &str, username: &str, msg: &str) -> Value {
    json!({"kind": "chat", "roomName": room, "username": username, "msg": msg})
}

fn sent(room: &str) -> Value {
    json!({"kind": "ok", "message": format!("Message sent to {room}")})
}

fn notice(msg: &str) -> Value {
    chat("", "Server", msg)
}

async fn start(config: ServerConfig) -> (String, RoomManager) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr").to_string();
    let manager = RoomManager::new();
    tokio::spawn(server::serve(listener, manager.clone(), config));
    (addr, manager)
}

async fn wait_for_room(manager: &RoomManager, username: &str, expected: Option<&str>) {
    for _ in 0..100 {
        if manager.current_room(username).as_deref() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{username} never reached {expected:?}");
}

#[tokio::test]
async fn create_join_send_walkthrough() {
    let (addr, _manager) = start(ServerConfig::builder().build()).await;
    let mut alice = Client::connect(&addr, "alice").await;
    let mut bob = Client::connect(&addr, "bob").await;

    alice.send(json!({"arg": "CREATEROOM", "room": "general"})).await;
    assert_eq!(alice.recv().await["kind"], "ok");
    alice.send(json!({"arg": "CREATEROOM", "room": "general"})).await;
    assert_eq!(
        alice.recv().await,
        json!({"kind": "error", "error": "room already exists: general"})
    );

    alice.send(json!({"arg": "JOINROOM", "room": "general"})).await;
    assert_eq!(alice.recv().await, json!({"kind": "joined", "room": "general"}));
    assert_eq!(alice.recv().await, notice("alice joined"));

    // bob never joined; posting is still allowed when the room is named.
    bob.send(json!({"arg": "SENDMSG", "room": "general", "msg": "hi"}))
        .await;
    assert_eq!(bob.recv().await, sent("general"));
    assert_eq!(alice.recv().await, chat("general", "bob", "hi"));

    alice.send(json!({"arg": "JOINROOM", "room": "random"})).await;
    assert_eq!(
        alice.recv().await,
        json!({"kind": "error", "error": "room not found: random"})
    );

    alice.send(json!({"arg": "SENDMSG", "msg": "still here"})).await;
    alice
        .recv_both(&sent("general"), &chat("general", "alice", "still here"))
        .await;

    alice.send(json!({"arg": "LISTROOMS"})).await;
    assert_eq!(alice.recv().await, json!({"kind": "rooms", "rooms": ["general"]}));
}

#[tokio::test]
async fn sends_are_acknowledged_for_members_and_outsiders() {
    let (addr, manager) = start(ServerConfig::builder().build()).await;
    manager.create_room("general").unwrap();

    let mut alice = Client::connect(&addr, "alice").await;
    alice.send(json!({"arg": "JOINROOM", "room": "general"})).await;
    alice.recv().await;
    assert_eq!(alice.recv().await, notice("alice joined"));

    let mut bob = Client::connect(&addr, "bob").await;
    bob.send(json!({"arg": "SENDMSG", "room": "general", "msg": "from outside"}))
        .await;
    assert_eq!(bob.recv().await, sent("general"));
    bob.assert_quiet().await;
    assert_eq!(alice.recv().await, chat("general", "bob", "from outside"));

    alice.send(json!({"arg": "SENDMSG", "msg": "from inside"})).await;
    alice
        .recv_both(&sent("general"), &chat("general", "alice", "from inside"))
        .await;
    alice.assert_quiet().await;
}

#[tokio::test]
async fn late_joiner_gets_history_first() {
    let (addr, manager) = start(ServerConfig::builder().build()).await;
    manager.create_room("general").unwrap();
    manager.send("bob", "general", "one").unwrap();
    manager.send("bob", "general", "two").unwrap();

    let mut carol = Client::connect(&addr, "carol").await;
    carol.send(json!({"arg": "JOINROOM", "room": "general"})).await;
    assert_eq!(carol.recv().await["kind"], "joined");
    assert_eq!(carol.recv().await, chat("general", "bob", "one"));
    assert_eq!(carol.recv().await, chat("general", "bob", "two"));
    assert_eq!(carol.recv().await, notice("carol joined"));
    carol.assert_quiet().await;
}

#[tokio::test]
async fn send_before_join_is_rejected_without_closing() {
    let (addr, _manager) = start(ServerConfig::builder().build()).await;
    let mut alice = Client::connect(&addr, "alice").await;

    alice.send(json!({"arg": "SENDMSG", "msg": "hello?"})).await;
    assert_eq!(alice.recv().await["kind"], "error");

    alice.writer.write_all(b"not json\n").await.unwrap();
    assert_eq!(alice.recv().await["kind"], "error");

    alice.send(json!({"arg": "LISTROOMS"})).await;
    assert_eq!(alice.recv().await, json!({"kind": "rooms", "rooms": []}));
}

#[tokio::test]
async fn switching_rooms_over_the_wire() {
    let (addr, manager) = start(ServerConfig::builder().build()).await;
    manager.create_room("a").unwrap();
    manager.create_room("b").unwrap();

    let mut bob = Client::connect(&addr, "bob").await;
    bob.send(json!({"arg": "JOINROOM", "room": "a"})).await;
    bob.recv().await;
    assert_eq!(bob.recv().await, notice("bob joined"));

    let mut alice = Client::connect(&addr, "alice").await;
    alice.send(json!({"arg": "JOINROOM", "room": "a"})).await;
    alice.recv().await;
    assert_eq!(alice.recv().await, notice("alice joined"));
    assert_eq!(bob.recv().await, notice("alice joined"));

    alice.send(json!({"arg": "JOINROOM", "room": "b"})).await;
    assert_eq!(alice.recv().await, json!({"kind": "joined", "room": "b"}));
    assert_eq!(alice.recv().await, notice("alice joined"));
    assert_eq!(bob.recv().await, notice("alice has left."));

    manager.send("bob", "a", "a only").unwrap();
    assert_eq!(bob.recv().await, chat("a", "bob", "a only"));
    alice.assert_quiet().await;

    assert_eq!(manager.members("a").unwrap(), vec!["bob"]);
    assert_eq!(manager.members("b").unwrap(), vec!["alice"]);
}

#[tokio::test]
async fn disconnect_leaves_the_room() {
    let (addr, manager) = start(ServerConfig::builder().build()).await;
    manager.create_room("general").unwrap();

    let mut bob = Client::connect(&addr, "bob").await;
    bob.send(json!({"arg": "JOINROOM", "room": "general"})).await;
    bob.recv().await;
    bob.recv().await;

    let mut alice = Client::connect(&addr, "alice").await;
    alice.send(json!({"arg": "JOINROOM", "room": "general"})).await;
    alice.recv().await;
    alice.recv().await;
    assert_eq!(bob.recv().await, notice("alice joined"));

    drop(alice);
    assert_eq!(bob.recv().await, notice("alice has left."));
    wait_for_room(&manager, "alice", None).await;
    assert_eq!(manager.members("general").unwrap(), vec!["bob"]);
}

#[tokio::test]
async fn quit_says_goodbye_and_leaves() {
    let (addr, manager) = start(ServerConfig::builder().motd("welcome").build()).await;
    manager.create_room("general").unwrap();

    let mut alice = Client::connect(&addr, "alice").await;
    assert_eq!(alice.recv().await, json!({"kind": "ok", "message": "welcome"}));

    alice.send(json!({"arg": "JOINROOM", "room": "general"})).await;
    alice.recv().await;
    alice.recv().await;
    wait_for_room(&manager, "alice", Some("general")).await;

    alice.send(json!({"arg": "QUIT"})).await;
    assert_eq!(alice.recv().await, json!({"kind": "ok", "message": "Goodbye!"}));
    wait_for_room(&manager, "alice", None).await;
}
