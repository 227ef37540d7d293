use clap::Parser;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use room_relay::ChatError;
use room_relay::command::{Command, USAGE};
use room_relay::protocol::{Request, Response, decode_response, encode_line};

/// Line-oriented client for room-relay
#[derive(Parser, Debug)]
#[command(name = "relay-client", version)]
struct Args {
    /// Relay address
    #[arg(long, env = "RELAY_SERVER", default_value = "127.0.0.1:8000")]
    server: String,

    /// Name to chat as; prompted for when omitted
    #[arg(long)]
    username: Option<String>,
}

fn render(response: Response) -> String {
    match response {
        Response::Ok { message } => message,
        Response::Rooms { rooms } if rooms.is_empty() => "No rooms".to_string(),
        Response::Rooms { rooms } => format!("Rooms: {}", rooms.join(", ")),
        Response::Joined { room } => format!("Joined {room}. Listening to messages..."),
        Response::Chat(msg) => msg.to_string(),
        Response::Error { error } => format!("error: {error}"),
    }
}

#[tokio::main]
async fn main() -> Result<(), ChatError> {
    let args = Args::parse();
    let mut input = BufReader::new(io::stdin()).lines();

    let username = match args.username {
        Some(name) => name,
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(b"enter username: ").await?;
            stdout.flush().await?;
            input.next_line().await?.unwrap_or_default()
        }
    };
    let username = username.trim().to_string();
    if username.is_empty() {
        return Err(ChatError::Parse("empty username".into()));
    }

    let stream = TcpStream::connect(&args.server).await?;
    let (reader, mut writer) = stream.into_split();

    let listener = tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match decode_response(&line) {
                Ok(response) => println!("{}", render(response)),
                Err(e) => eprintln!("unreadable frame from server: {e}"),
            }
        }
        println!("Server disconnected");
    });

    println!("{USAGE}");

    while let Some(line) = input.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(ChatError::Parse(usage)) => {
                println!("{usage}");
                continue;
            }
            Err(e) => return Err(e),
        };
        let quit = command == Command::Quit;

        let request = Request {
            username: username.clone(),
            action: command.into_action(),
        };
        writer.write_all(encode_line(&request)?.as_bytes()).await?;
        writer.flush().await?;

        if quit {
            break;
        }
    }

    writer.shutdown().await?;
    let _ = listener.await;
    Ok(())
}
