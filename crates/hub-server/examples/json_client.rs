use std::env;

use hub_protocol::{decode_frame, Frame};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Where to connect: env override or default.
    let addr = env::var("HUB_CLIENT_ADDR").unwrap_or_else(|_| "127.0.0.1:3001".to_string());

    println!("Connecting to {}...", addr);
    let stream = TcpStream::connect(&addr).await?;
    println!("Connected.");
    println!("Type events as `<name> <json payload>`, e.g.:");
    println!(r#"  authenticate {{"email":"ann@example.com"}}"#);
    println!(r#"  join_project {{"projectId":"p1","user":{{"id":"u1","name":"Ann"}}}}"#);
    println!(r#"  task_moved {{"projectId":"p1","taskId":"t1"}}"#);
    println!(r#"  notify_invite {{"email":"bob@example.com","project":{{"id":"p1"}}}}"#);
    println!("Type 'quit' or 'exit' to leave.\n");

    let (read_half, mut write_half) = stream.into_split();

    // Print everything the hub pushes, as it arrives.
    let printer = tokio::spawn(async move {
        let mut lines = BufReader::new(read_half).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match decode_frame(&line) {
                Ok(frame) => println!("<< {} {}", frame.event, frame.data),
                Err(e) => eprintln!("<< undecodable frame ({}): {}", e, line),
            }
        }
        println!("\nServer closed the connection.");
    });

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = stdin.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            println!("Exiting client.");
            break;
        }

        let (name, payload) = trimmed.split_once(' ').unwrap_or((trimmed, "null"));
        let data: Value = match serde_json::from_str(payload) {
            Ok(v) => v,
            Err(e) => {
                eprintln!("Payload is not valid JSON: {}", e);
                continue;
            }
        };

        // Sent as-is: the server decides what is well-formed.
        let mut text = serde_json::to_string(&Frame::new(name, data))?;
        text.push('\n');
        write_half.write_all(text.as_bytes()).await?;
    }

    printer.abort();
    Ok(())
}
