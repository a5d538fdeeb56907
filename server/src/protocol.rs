//! Wire messages for the single shared table (spec §6). JSON-over-WebSocket,
//! internally-tagged enums, matching the teacher's `ClientAction`/`ServerEvent`
//! style in the original `poker-ws/src/main.rs`.

use holdem_engine::TableView;
use serde::{Deserialize, Serialize};

/// The closed set of action kinds from spec §4.6/§6. Unknown tags are
/// rejected at JSON-decode time rather than reaching the engine.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Bet { amount: u64 },
    Raise { amount: u64 },
    Allin,
}

/// Commands a client may send. Tagged on `cmd` rather than `type` so the
/// nested [`ActionKind`] (tagged on its own `type` field) never collides
/// with the outer discriminant.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    SetUsername { name: String },
    BecomeOwner,
    Sit { seat: usize, buy_in: u64 },
    Stand,
    Kick { seat: usize },
    StartHand,
    Action { action: ActionKind },
}

/// Ack returned to the command's sender only, never broadcast.
#[derive(Debug, Clone, Serialize)]
pub struct Ack {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true, error: None }
    }

    pub fn err(kind: &'static str) -> Self {
        Self { ok: false, error: Some(kind) }
    }
}

/// Events broadcast to every connected client. `State` carries a projection
/// computed per-recipient (spec §4.7) — every subscriber gets their own
/// `Event::State`, never a shared shared payload.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Welcome { seat_count: usize },
    State(TableView),
    Ack(Ack),
}
