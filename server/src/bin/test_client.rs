//! Loopback probe client: connects, reports the admission verdict,
//! drives a circling position stream plus one collection attempt, and
//! prints a summary of each received update.

use futures_util::{SinkExt, StreamExt};
use shared::{ClientMessage, Position, ServerMessage};
use std::time::Duration;
use tokio::time::sleep;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://127.0.0.1:8080".to_string());

    println!("Connecting to {}", url);
    let (ws, _) = connect_async(url.as_str()).await?;
    let (mut sink, mut stream) = ws.split();

    // First frame is the admission verdict
    match stream.next().await {
        Some(Ok(Message::Text(text))) => match serde_json::from_str::<ServerMessage>(&text)? {
            ServerMessage::ConnectionApprove => println!("Admitted"),
            ServerMessage::ConnectionReject { reason } => {
                println!("Rejected: {}", reason);
                return Ok(());
            }
            other => println!("Unexpected first message: {:?}", other),
        },
        other => {
            println!("Connection ended before admission: {:?}", other);
            return Ok(());
        }
    }

    for i in 0..20u32 {
        let t = i as f32 / 5.0;
        let update = ClientMessage::PositionUpdate {
            position: Position {
                x: 400.0 + 120.0 * t.cos(),
                y: 300.0 + 120.0 * t.sin(),
            },
            heading: t,
        };
        sink.send(Message::Text(serde_json::to_string(&update)?))
            .await?;

        if i == 5 {
            let collect = ClientMessage::CollectItem {
                item_id: "item-0".to_string(),
            };
            println!("Attempting to collect item-0");
            sink.send(Message::Text(serde_json::to_string(&collect)?))
                .await?;
        }

        if let Some(Ok(Message::Text(text))) = stream.next().await {
            if let Ok(ServerMessage::ServerUpdate { players, items }) =
                serde_json::from_str(&text)
            {
                let cleaned = items.values().filter(|item| item.cleaned).count();
                println!(
                    "tick {}: {} other players, {}/{} items cleaned",
                    i,
                    players.len(),
                    cleaned,
                    items.len()
                );
            }
        }

        sleep(Duration::from_millis(250)).await;
    }

    sink.close().await?;
    println!("Probe finished");
    Ok(())
}
