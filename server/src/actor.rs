//! The single-writer table actor (spec §5): one task owns the one
//! `holdem_engine::Table` on this server and drains a command channel
//! sequentially, exactly as the teacher's `TableActor` owns its `Table`.
//! No handler ever touches the table from outside this task — the outside
//! world only ever sees it through [`ActorHandle`].

use std::collections::HashMap;
use std::time::Duration;

use holdem_engine::hand::ActionOutcome;
use holdem_engine::{Action, EngineError, Table};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

use crate::protocol::{Ack, ActionKind, Command, Event};

/// Idle delay after showdown before a new hand may start (spec §4.5, §5).
const POST_SHOWDOWN_DELAY: Duration = Duration::from_millis(2_500);

/// Pre-serialized JSON text pushed to one connection's writer task.
pub type ClientTx = mpsc::UnboundedSender<String>;

enum ActorMsg {
    Connect { client_ref: String, tx: ClientTx },
    Disconnect { client_ref: String },
    Command { client_ref: String, command: Command, ack: oneshot::Sender<Ack> },
    IdleTimerFired,
}

/// A cheap, cloneable front for sending messages into the actor's channel.
/// Every connection gets one; the actor itself is never shared.
#[derive(Clone)]
pub struct ActorHandle {
    tx: mpsc::UnboundedSender<ActorMsg>,
}

impl ActorHandle {
    pub fn connect(&self, client_ref: String, tx: ClientTx) {
        let _ = self.tx.send(ActorMsg::Connect { client_ref, tx });
    }

    pub fn disconnect(&self, client_ref: String) {
        let _ = self.tx.send(ActorMsg::Disconnect { client_ref });
    }

    pub async fn send_command(&self, client_ref: String, command: Command) -> Ack {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(ActorMsg::Command { client_ref, command, ack: ack_tx }).is_err() {
            return Ack::err("internal-error");
        }
        ack_rx.await.unwrap_or_else(|_| Ack::err("internal-error"))
    }
}

struct TableActor {
    table: Table,
    usernames: HashMap<String, String>,
    subscribers: HashMap<String, ClientTx>,
    idle_timer_pending: bool,
    self_tx: mpsc::UnboundedSender<ActorMsg>,
}

/// Spawns the actor task and returns a handle new connections can clone.
pub fn spawn() -> ActorHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let actor = TableActor {
        table: Table::new(),
        usernames: HashMap::new(),
        subscribers: HashMap::new(),
        idle_timer_pending: false,
        self_tx: tx.clone(),
    };
    tokio::spawn(run(actor, rx));
    ActorHandle { tx }
}

async fn run(mut actor: TableActor, mut rx: mpsc::UnboundedReceiver<ActorMsg>) {
    while let Some(msg) = rx.recv().await {
        match msg {
            ActorMsg::Connect { client_ref, tx } => {
                info!(client_ref = %client_ref, "connection accepted");
                let _ = tx.send(
                    serde_json::to_string(&Event::Welcome { seat_count: holdem_engine::config::N_SEATS })
                        .unwrap_or_default(),
                );
                actor.subscribers.insert(client_ref.clone(), tx);
                actor.push_state_to(&client_ref);
            }
            ActorMsg::Disconnect { client_ref } => {
                info!(client_ref = %client_ref, "connection closed");
                actor.subscribers.remove(&client_ref);
                actor.usernames.remove(&client_ref);
                // A disconnect is itself a serialized command: fold mid-hand,
                // free the seat, leave committed contributions in the pot.
                if let Ok(outcome) = actor.table.stand(&client_ref) {
                    if let Some(outcome) = outcome {
                        actor.handle_outcome(outcome);
                    }
                    actor.broadcast();
                }
            }
            ActorMsg::Command { client_ref, command, ack } => {
                let result = actor.handle_command(&client_ref, command);
                let _ = ack.send(result);
            }
            ActorMsg::IdleTimerFired => {
                if actor.idle_timer_pending {
                    actor.idle_timer_pending = false;
                    actor.table.return_to_idle();
                    info!("table returned to idle after post-showdown delay");
                    actor.broadcast();
                }
            }
        }
    }
}

impl TableActor {
    fn handle_command(&mut self, client_ref: &str, command: Command) -> Ack {
        let outcome = match command {
            Command::SetUsername { name } => {
                let trimmed: String = name.trim().chars().take(32).collect();
                if trimmed.is_empty() {
                    return Ack::err("no-username");
                }
                self.usernames.insert(client_ref.to_string(), trimmed);
                return Ack::ok();
            }
            Command::BecomeOwner => {
                self.table.claim_owner(client_ref);
                self.broadcast();
                return Ack::ok();
            }
            Command::Sit { seat, buy_in } => {
                let Some(name) = self.usernames.get(client_ref).cloned() else {
                    return Ack::err("no-username");
                };
                match self.table.sit(seat, client_ref, name, buy_in) {
                    Ok(()) => None,
                    Err(e) => return self.ack_for(e),
                }
            }
            Command::Stand => match self.table.stand(client_ref) {
                Ok(outcome) => outcome,
                Err(e) => return self.ack_for(e),
            },
            Command::Kick { seat } => match self.table.kick(client_ref, seat) {
                Ok(outcome) => outcome,
                Err(e) => return self.ack_for(e),
            },
            Command::StartHand => {
                if self.idle_timer_pending {
                    return Ack::err("not-in-betting-phase");
                }
                match self.table.start_hand(client_ref) {
                    Ok(()) => None,
                    Err(e) => return self.ack_for(e),
                }
            }
            Command::Action { action } => match self.table.apply_action(client_ref, to_engine_action(action)) {
                Ok(outcome) => Some(outcome),
                Err(e) => return self.ack_for(e),
            },
        };

        if let Some(outcome) = outcome {
            self.handle_outcome(outcome);
        }
        self.broadcast();
        Ack::ok()
    }

    /// Maps a recoverable engine error to its wire tag, or performs the
    /// fatal-abort recovery path (spec §7) for the internal-invariant class.
    fn ack_for(&mut self, err: EngineError) -> Ack {
        if err.is_fatal() {
            error!(error = %err, "internal invariant violated, aborting hand to idle");
            self.table.abort_to_idle();
            self.idle_timer_pending = false;
            self.broadcast();
            return Ack::err("internal-error");
        }
        Ack::err(err.wire_kind().expect("non-fatal errors carry a wire kind"))
    }

    fn handle_outcome(&mut self, outcome: ActionOutcome) {
        if let ActionOutcome::HandEnded(result) = outcome {
            info!(
                went_to_showdown = result.went_to_showdown,
                pots = result.pots.len(),
                "hand ended"
            );
            self.idle_timer_pending = true;
            let tx = self.self_tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(POST_SHOWDOWN_DELAY).await;
                let _ = tx.send(ActorMsg::IdleTimerFired);
            });
        }
    }

    fn push_state_to(&self, client_ref: &str) {
        let Some(tx) = self.subscribers.get(client_ref) else { return };
        let view = holdem_engine::project(&self.table, client_ref);
        if let Ok(text) = serde_json::to_string(&Event::State(view)) {
            if tx.send(text).is_err() {
                warn!(client_ref = %client_ref, "dropped state push to a closed connection");
            }
        }
    }

    fn broadcast(&mut self) {
        let dead: Vec<String> = self
            .subscribers
            .iter()
            .filter_map(|(client_ref, tx)| {
                let view = holdem_engine::project(&self.table, client_ref);
                let text = serde_json::to_string(&Event::State(view)).ok()?;
                (tx.send(text).is_err()).then(|| client_ref.clone())
            })
            .collect();
        for client_ref in dead {
            self.subscribers.remove(&client_ref);
        }
    }
}

fn to_engine_action(action: ActionKind) -> Action {
    match action {
        ActionKind::Fold => Action::Fold,
        ActionKind::Check => Action::Check,
        ActionKind::Call => Action::Call,
        ActionKind::Bet { amount } => Action::Bet(amount),
        ActionKind::Raise { amount } => Action::Raise(amount),
        ActionKind::Allin => Action::AllIn,
    }
}
