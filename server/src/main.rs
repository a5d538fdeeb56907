use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use poker_ws::actor::{self, ActorHandle};
use poker_ws::protocol::{Command, Event};

/// Per-process counter for client identification (spec §1: transport is
/// sketched only where the core touches it — a stable per-connection id is
/// all the engine needs as a `client_ref`).
static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

async fn ws_handler(ws: WebSocketUpgrade, State(table): State<ActorHandle>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, table))
}

async fn handle_socket(socket: WebSocket, table: ActorHandle) {
    let client_ref = format!("client-{}", NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed));
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (client_tx, mut client_rx) = mpsc::unbounded_channel::<String>();

    let writer = tokio::spawn(async move {
        while let Some(text) = client_rx.recv().await {
            if ws_tx.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    table.connect(client_ref.clone(), client_tx.clone());

    while let Some(Ok(msg)) = ws_rx.next().await {
        let Message::Text(text) = msg else { continue };
        match serde_json::from_str::<Command>(&text) {
            Ok(command) => {
                info!(client_ref = %client_ref, command = ?command, "command received");
                let ack = table.send_command(client_ref.clone(), command).await;
                let reply = serde_json::to_string(&Event::Ack(ack)).unwrap_or_default();
                let _ = client_tx.send(reply);
            }
            Err(e) => {
                warn!(client_ref = %client_ref, error = %e, "malformed command");
                let reply = serde_json::to_string(&Event::Ack(poker_ws::protocol::Ack::err("unknown-action")))
                    .unwrap_or_default();
                let _ = client_tx.send(reply);
            }
        }
    }

    table.disconnect(client_ref);
    let _ = writer.await;
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string())))
        .init();

    let table: ActorHandle = actor::spawn();
    let app = Router::new().route("/ws", get(ws_handler)).with_state(table);

    let addr: SocketAddr = std::env::var("HOLDEM_BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()
        .expect("HOLDEM_BIND_ADDR must be a valid socket address");

    info!(%addr, "starting holdem server");
    let listener = tokio::net::TcpListener::bind(addr).await.expect("bind failed");
    axum::serve(listener, app).await.expect("server error");
}
