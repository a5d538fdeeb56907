//! Seat slots, occupancy, and ownership (C4).

use serde::Serialize;

use crate::config::{MAX_BUYIN, MIN_BUYIN, N_SEATS};
use crate::error::EngineError;

#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub client_ref: String,
    pub display_name: String,
    pub stack: u64,
}

/// The six seat slots and the current owner. Only the engine mutates
/// `stack`; UI-side requests go through `sit`/`stand`/`kick` and the hand
/// state machine's chip-commit methods, never a direct setter.
#[derive(Debug, Clone, Default)]
pub struct Seats {
    slots: [Option<Player>; N_SEATS],
    owner: Option<String>,
}

impl Seats {
    pub fn new() -> Self {
        Self { slots: Default::default(), owner: None }
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// The most recent caller becomes owner; the previous owner loses the role.
    pub fn claim_owner(&mut self, client_ref: &str) {
        self.owner = Some(client_ref.to_string());
    }

    pub fn is_owner(&self, client_ref: &str) -> bool {
        self.owner.as_deref() == Some(client_ref)
    }

    pub fn get(&self, seat: usize) -> Option<&Player> {
        self.slots.get(seat)?.as_ref()
    }

    pub fn get_mut(&mut self, seat: usize) -> Option<&mut Player> {
        self.slots.get_mut(seat)?.as_mut()
    }

    pub fn seat_of(&self, client_ref: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.as_ref().is_some_and(|p| p.client_ref == client_ref))
    }

    pub fn is_occupied(&self, seat: usize) -> bool {
        self.slots.get(seat).is_some_and(|s| s.is_some())
    }

    pub fn sit(
        &mut self,
        seat: usize,
        client_ref: &str,
        display_name: String,
        buy_in: u64,
    ) -> Result<(), EngineError> {
        if seat >= N_SEATS {
            return Err(EngineError::InvalidSeat);
        }
        if self.slots[seat].is_some() {
            return Err(EngineError::SeatOccupied);
        }
        let clamped = buy_in.clamp(MIN_BUYIN, MAX_BUYIN);
        self.slots[seat] =
            Some(Player { client_ref: client_ref.to_string(), display_name, stack: clamped });
        Ok(())
    }

    /// Frees the slot for `client_ref`. Returns the freed seat index.
    pub fn stand(&mut self, client_ref: &str) -> Result<usize, EngineError> {
        let seat = self.seat_of(client_ref).ok_or(EngineError::NotSeated)?;
        self.slots[seat] = None;
        if self.owner.as_deref() == Some(client_ref) {
            self.owner = None;
        }
        Ok(seat)
    }

    /// Owner-only equivalent of `stand`, targeting a seat by index.
    pub fn kick(&mut self, caller: &str, seat: usize) -> Result<(), EngineError> {
        if !self.is_owner(caller) {
            return Err(EngineError::NotOwner);
        }
        if seat >= N_SEATS || self.slots[seat].is_none() {
            return Err(EngineError::InvalidSeat);
        }
        if let Some(p) = &self.slots[seat] {
            if self.owner.as_deref() == Some(p.client_ref.as_str()) {
                self.owner = None;
            }
        }
        self.slots[seat] = None;
        Ok(())
    }

    pub fn occupied_with_positive_stack(&self) -> Vec<usize> {
        (0..N_SEATS).filter(|&i| self.slots[i].as_ref().is_some_and(|p| p.stack > 0)).collect()
    }

    pub fn stacks_snapshot(&self) -> [u64; N_SEATS] {
        let mut out = [0u64; N_SEATS];
        for i in 0..N_SEATS {
            out[i] = self.slots[i].as_ref().map(|p| p.stack).unwrap_or(0);
        }
        out
    }

    pub fn restore_stacks(&mut self, snapshot: [u64; N_SEATS]) {
        for i in 0..N_SEATS {
            if let Some(p) = &mut self.slots[i] {
                p.stack = snapshot[i];
            }
        }
    }

    pub(crate) fn credit(&mut self, seat: usize, amount: u64) {
        if let Some(p) = &mut self.slots[seat] {
            p.stack += amount;
        }
    }

    pub(crate) fn debit(&mut self, seat: usize, amount: u64) {
        if let Some(p) = &mut self.slots[seat] {
            p.stack = p.stack.saturating_sub(amount);
        }
    }

    pub fn stack_of(&self, seat: usize) -> u64 {
        self.slots.get(seat).and_then(|s| s.as_ref()).map(|p| p.stack).unwrap_or(0)
    }
}
