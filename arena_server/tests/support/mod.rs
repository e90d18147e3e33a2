// Shared primitives for one-time server bootstrapping and raw line clients.
#![allow(dead_code)]

use arena_server::GameSettings;
use serde_json::Value;
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

// Fast ticks and short cooldowns keep the end-to-end tests quick.
// The single wall sits at the east edge, away from any straight line between spawns.
const TEST_SETTINGS: &str = r#"
universe_size = 1000
game_mode = 0
ms_per_frame = 10
frames_per_shot = 5
respawn_rate = 300

[[walls]]
p1 = { x = 480.0, y = -20.0 }
p2 = { x = 480.0, y = 20.0 }
"#;

pub const TEST_ARENA_SIZE: i64 = 1000;
pub const TEST_WALL_COUNT: usize = 1;

const READ_TIMEOUT: Duration = Duration::from_secs(5);

// Address published by the server thread once it is bound.
static SERVER_ADDR: OnceLock<String> = OnceLock::new();
// One-time guard that ensures the server bootstrap path runs only once.
static SERVER_READY: OnceLock<()> = OnceLock::new();

// Ensure the test server is running and return its address.
pub fn ensure_server() -> &'static str {
    SERVER_READY.get_or_init(|| {
        let published = Arc::new(OnceLock::<String>::new());
        let published_thread = Arc::clone(&published);
        // Spawn an OS thread so the server outlives individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let settings = GameSettings::from_toml_str(TEST_SETTINGS).expect("test settings");
                // Bind to an ephemeral port to avoid collisions with local services.
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_thread.set(addr.to_string());
                arena_server::run(listener, settings).await.expect("server failed");
            });
        });
        wait_for_server(published);
    });

    SERVER_ADDR
        .get()
        .expect("server addr should be initialized")
        .as_str()
}

fn wait_for_server(published: Arc<OnceLock<String>>) {
    let addr = loop {
        if let Some(addr) = published.get() {
            break addr.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };
    let _ = SERVER_ADDR.set(addr);
}

/// A raw protocol client.
pub struct Client {
    pub id: u64,
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

/// What the server sends before the client names itself.
pub struct Greeting {
    pub id: u64,
    pub size: i64,
    pub walls: Vec<Value>,
}

impl Client {
    /// Connects and consumes the greeting, leaving the client in the name-pending state.
    pub async fn connect() -> (Self, Greeting) {
        let stream = TcpStream::connect(ensure_server()).await.expect("connect");
        let (read, writer) = stream.into_split();
        let mut reader = BufReader::new(read);

        let id = read_raw_line(&mut reader).await.trim().parse().expect("id line");
        let size = read_raw_line(&mut reader)
            .await
            .trim()
            .parse()
            .expect("size line");
        let mut walls = Vec::new();
        for _ in 0..TEST_WALL_COUNT {
            walls.push(parse(&read_raw_line(&mut reader).await));
        }

        (Client { id, reader, writer }, Greeting { id, size, walls })
    }

    /// Connects, sends `name`, and returns the client with its join record.
    pub async fn join(name: &str) -> (Self, Value) {
        let (mut client, _) = Self::connect().await;
        client.send(&format!("{name}\n")).await;
        let id = client.id;
        let record = client.next_matching(|v| is_tank(v, id)).await;
        (client, record)
    }

    pub async fn send(&mut self, text: &str) {
        self.writer.write_all(text.as_bytes()).await.expect("write");
    }

    pub async fn next_record(&mut self) -> Value {
        parse(&read_raw_line(&mut self.reader).await)
    }

    pub async fn next_matching(&mut self, mut pred: impl FnMut(&Value) -> bool) -> Value {
        loop {
            let record = self.next_record().await;
            if pred(&record) {
                return record;
            }
        }
    }
}

pub fn is_tank(record: &Value, id: u64) -> bool {
    record.get("tank").and_then(Value::as_u64) == Some(id)
}

fn parse(line: &str) -> Value {
    serde_json::from_str(line.trim_end()).expect("record should be JSON")
}

async fn read_raw_line(reader: &mut BufReader<OwnedReadHalf>) -> String {
    let mut line = String::new();
    let n = tokio::time::timeout(READ_TIMEOUT, reader.read_line(&mut line))
        .await
        .expect("timed out waiting for a line")
        .expect("read line");
    assert!(n > 0, "server closed the connection");
    line
}
