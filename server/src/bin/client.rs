//! Minimal scripted client for manual testing against a running server.
//! Usage: `client [ws_url] [seat] [buy_in] [name]`

use futures::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[tokio::main]
async fn main() {
    let url = std::env::args().nth(1).unwrap_or_else(|| "ws://127.0.0.1:8080/ws".to_string());
    let seat: usize = std::env::args().nth(2).and_then(|s| s.parse().ok()).unwrap_or(0);
    let buy_in: u64 = std::env::args().nth(3).and_then(|s| s.parse().ok()).unwrap_or(1000);
    let name = std::env::args().nth(4).unwrap_or_else(|| "player".to_string());

    let (mut ws, _) = connect_async(url.as_str()).await.expect("connect");

    let send_cmd = |v: serde_json::Value| v.to_string();

    ws.send(Message::Text(send_cmd(serde_json::json!({"cmd":"set_username","name":name}))))
        .await
        .unwrap();
    ws.send(Message::Text(send_cmd(serde_json::json!({"cmd":"become_owner"}))))
        .await
        .unwrap();
    ws.send(Message::Text(send_cmd(
        serde_json::json!({"cmd":"sit","seat":seat,"buy_in":buy_in}),
    )))
    .await
    .unwrap();

    let mut reads = 0;
    while reads < 20 {
        if let Some(msg) = ws.next().await {
            println!("<- {}", msg.unwrap());
        }
        reads += 1;
    }
}
