//! Hand state machine (C5) and action processor (C6).

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::card::{Card, Deck};
use crate::config::{BIG_BLIND, N_SEATS, SMALL_BLIND};
use crate::error::EngineError;
use crate::eval::{evaluate, Score};
use crate::pot::build_pots;
use crate::seat::Seats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Phase {
    fn is_betting(self) -> bool {
        matches!(self, Phase::Preflop | Phase::Flop | Phase::Turn | Phase::River)
    }
}

/// An action submitted for the seat currently on the clock. `Bet` and
/// `Raise` are distinct wire tags (spec §4.6/§6) but share identical
/// validation and effect here, since the spec's action table gives them
/// the same precondition/effect row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Fold,
    Check,
    Call,
    Bet(u64),
    Raise(u64),
    AllIn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PotResult {
    pub amount: u64,
    pub winners: Vec<usize>,
    pub share_each: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandResult {
    pub pots: Vec<PotResult>,
    /// False for an uncontested win (everyone else folded) — no cards evaluated.
    pub went_to_showdown: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Continue,
    HandEnded(HandResult),
}

/// The ephemeral per-hand state described in spec §3.
#[derive(Debug, Clone)]
pub struct Hand {
    pub deck: Deck,
    pub community: Vec<Card>,
    pub phase: Phase,
    pub hole_cards: HashMap<usize, (Card, Card)>,
    pub folded: [bool; N_SEATS],
    pub active_seats: Vec<usize>,
    pub contributions: [u64; N_SEATS],
    pub current_bets: [u64; N_SEATS],
    pub pot_total: u64,
    pub turn_seat: Option<usize>,
    pub min_raise: u64,
    pub last_aggressor: Option<usize>,
    pub dealer_button: usize,
    all_in: [bool; N_SEATS],
    /// Reset at the start of every betting round. A seat whose `current_bets`
    /// no longer matches the round's max is already forced to act again by
    /// the bet-level check below, independent of this flag — it exists only
    /// to gate the "nobody has voluntarily acted yet at this bet level" case:
    /// the start of a street, and the big blind's preflop option.
    acted: [bool; N_SEATS],
    /// Whether `seat` still has the right to raise this betting round.
    /// Reset to all-`true` at the start of every street and by any full
    /// raise. A short all-in (one that raises the bet by less than
    /// `min_raise`) clears this for every seat that had already acted at
    /// the prior bet level — they may still call or fold, but the short
    /// all-in does not reopen their right to raise again.
    may_reraise: [bool; N_SEATS],
}

impl Hand {
    pub fn idle(dealer_button: usize) -> Self {
        Self {
            deck: Deck::fresh(),
            community: Vec::new(),
            phase: Phase::Idle,
            hole_cards: HashMap::new(),
            folded: [false; N_SEATS],
            active_seats: Vec::new(),
            contributions: [0; N_SEATS],
            current_bets: [0; N_SEATS],
            pot_total: 0,
            turn_seat: None,
            min_raise: BIG_BLIND,
            last_aggressor: None,
            dealer_button,
            all_in: [false; N_SEATS],
            acted: [false; N_SEATS],
            may_reraise: [true; N_SEATS],
        }
    }

    pub fn is_all_in(&self, seat: usize) -> bool {
        self.all_in[seat]
    }

    fn max_bet(&self) -> u64 {
        self.active_nonfolded().into_iter().map(|i| self.current_bets[i]).max().unwrap_or(0)
    }

    fn active_nonfolded(&self) -> Vec<usize> {
        self.active_seats.iter().copied().filter(|&i| !self.folded[i]).collect()
    }

    fn round_complete(&self) -> bool {
        let reference = self.max_bet();
        for i in self.active_nonfolded() {
            if self.all_in[i] {
                continue;
            }
            if !self.acted[i] || self.current_bets[i] != reference {
                return false;
            }
        }
        true
    }

    fn next_actionable_after(&self, from: usize) -> Option<usize> {
        for step in 1..=N_SEATS {
            let idx = (from + step) % N_SEATS;
            if self.active_seats.contains(&idx) && !self.folded[idx] && !self.all_in[idx] {
                return Some(idx);
            }
        }
        None
    }
}

/// A seat table plus its ephemeral hand-state, bundled behind one ownership
/// boundary: the only place chip-conserving mutation happens.
#[derive(Debug, Clone)]
pub struct Table {
    pub seats: Seats,
    pub hand: Hand,
    stack_snapshot: Option<[u64; N_SEATS]>,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    pub fn new() -> Self {
        Self { seats: Seats::new(), hand: Hand::idle(0), stack_snapshot: None }
    }

    pub fn claim_owner(&mut self, client_ref: &str) {
        self.seats.claim_owner(client_ref);
    }

    pub fn sit(
        &mut self,
        seat: usize,
        client_ref: &str,
        display_name: String,
        buy_in: u64,
    ) -> Result<(), EngineError> {
        self.seats.sit(seat, client_ref, display_name, buy_in)
    }

    /// Leaves the caller's seat. A disconnect is handled identically: both
    /// free the slot and, if mid-hand, fold the seat for the rest of the
    /// hand while leaving its committed contributions in the pot.
    pub fn stand(&mut self, client_ref: &str) -> Result<Option<ActionOutcome>, EngineError> {
        let seat = self.seats.stand(client_ref)?;
        self.fold_seat_if_midhand(seat)
    }

    pub fn kick(&mut self, caller: &str, seat: usize) -> Result<Option<ActionOutcome>, EngineError> {
        self.seats.kick(caller, seat)?;
        self.fold_seat_if_midhand(seat)
    }

    fn fold_seat_if_midhand(&mut self, seat: usize) -> Result<Option<ActionOutcome>, EngineError> {
        if !self.hand.phase.is_betting()
            || !self.hand.active_seats.contains(&seat)
            || self.hand.folded[seat]
        {
            return Ok(None);
        }
        self.hand.folded[seat] = true;
        self.hand.acted[seat] = true;
        let was_turn = self.hand.turn_seat == Some(seat);
        if self.hand.active_nonfolded().len() <= 1 {
            return Ok(Some(ActionOutcome::HandEnded(self.finish_uncontested())));
        }
        if was_turn {
            return self.progress(seat).map(Some);
        }
        Ok(Some(ActionOutcome::Continue))
    }

    pub fn start_hand(&mut self, caller: &str) -> Result<(), EngineError> {
        self.start_hand_with_deck(caller, Deck::shuffled())
    }

    /// Same as `start_hand` but takes an explicit deck order, so tests and
    /// the property suite can substitute a pre-arranged deck for `shuffle`.
    pub fn start_hand_with_deck(&mut self, caller: &str, deck: Deck) -> Result<(), EngineError> {
        if !self.seats.is_owner(caller) {
            return Err(EngineError::NotOwner);
        }
        let eligible = self.seats.occupied_with_positive_stack();
        if eligible.len() < 2 {
            return Err(EngineError::NotEnoughPlayers);
        }

        self.stack_snapshot = Some(self.seats.stacks_snapshot());

        let dealer_button = next_seat(&eligible, self.hand.dealer_button);
        let sb = next_seat(&eligible, dealer_button);
        let bb = next_seat(&eligible, sb);

        let mut hand = Hand::idle(dealer_button);
        hand.deck = deck;
        hand.active_seats = eligible.clone();
        hand.phase = Phase::Preflop;

        let deal_order = clockwise_from(&eligible, sb);
        let mut firsts = HashMap::new();
        for &seat in &deal_order {
            firsts.insert(seat, hand.deck.deal_one().ok_or_else(empty_deck)?);
        }
        let mut seconds = HashMap::new();
        for &seat in &deal_order {
            seconds.insert(seat, hand.deck.deal_one().ok_or_else(empty_deck)?);
        }
        for &seat in &deal_order {
            hand.hole_cards.insert(seat, (firsts[&seat], seconds[&seat]));
        }

        let sb_amt = SMALL_BLIND.min(self.seats.stack_of(sb));
        self.seats.debit(sb, sb_amt);
        hand.current_bets[sb] = sb_amt;
        hand.contributions[sb] = sb_amt;
        hand.pot_total += sb_amt;
        if self.seats.stack_of(sb) == 0 {
            hand.all_in[sb] = true;
        }

        let bb_amt = BIG_BLIND.min(self.seats.stack_of(bb));
        self.seats.debit(bb, bb_amt);
        hand.current_bets[bb] = bb_amt;
        hand.contributions[bb] = bb_amt;
        hand.pot_total += bb_amt;
        if self.seats.stack_of(bb) == 0 {
            hand.all_in[bb] = true;
        }

        hand.min_raise = BIG_BLIND;
        hand.last_aggressor = None;
        hand.turn_seat = hand.next_actionable_after(bb).or(Some(bb));

        self.hand = hand;
        Ok(())
    }

    pub fn apply_action(&mut self, client_ref: &str, action: Action) -> Result<ActionOutcome, EngineError> {
        let seat = self.seats.seat_of(client_ref).ok_or(EngineError::NotSeated)?;
        if !self.hand.phase.is_betting() {
            return Err(EngineError::NotInBettingPhase);
        }
        if self.hand.turn_seat != Some(seat) {
            return Err(EngineError::NotYourTurn);
        }
        if self.hand.folded[seat] {
            return Err(EngineError::AlreadyFolded);
        }

        let max_bet = self.hand.max_bet();
        let stack = self.seats.stack_of(seat);
        let current = self.hand.current_bets[seat];

        match action {
            Action::Fold => {
                self.hand.folded[seat] = true;
            }
            Action::Check => {
                if current != max_bet {
                    return Err(EngineError::CannotCheck);
                }
            }
            Action::Call => {
                let to_call = max_bet.saturating_sub(current);
                if to_call == 0 {
                    return Err(EngineError::InvalidAmount);
                }
                self.commit(seat, to_call.min(stack));
            }
            Action::Bet(amount) | Action::Raise(amount) => {
                if !self.hand.may_reraise[seat] || amount < self.hand.min_raise {
                    return Err(EngineError::RaiseBelowMinimum);
                }
                let to_call = max_bet.saturating_sub(current);
                let needed = to_call + amount;
                if needed > stack {
                    return Err(EngineError::InsufficientChips);
                }
                self.commit(seat, needed);
                self.hand.min_raise = self.hand.min_raise.max(amount);
                self.hand.last_aggressor = Some(seat);
                // A full raise reopens the betting for every seat, including
                // any barred by an earlier short all-in.
                self.hand.may_reraise = [true; N_SEATS];
            }
            Action::AllIn => {
                if stack == 0 {
                    return Err(EngineError::InsufficientChips);
                }
                let to_call = max_bet.saturating_sub(current);
                let increment = stack.saturating_sub(to_call);
                self.commit(seat, stack);
                if increment >= self.hand.min_raise {
                    // A full raise (or more): reopens betting for everyone.
                    self.hand.min_raise = increment;
                    self.hand.last_aggressor = Some(seat);
                    self.hand.may_reraise = [true; N_SEATS];
                } else if increment > 0 {
                    // A short all-in raises the bet without reopening the
                    // betting: any seat that already acted at the prior bet
                    // level may still call or fold, but loses the right to
                    // raise again off the back of this short all-in.
                    for i in self.hand.active_nonfolded() {
                        if i != seat && self.hand.acted[i] {
                            self.hand.may_reraise[i] = false;
                        }
                    }
                }
            }
        }

        self.hand.acted[seat] = true;

        if self.hand.active_nonfolded().len() <= 1 {
            return Ok(ActionOutcome::HandEnded(self.finish_uncontested()));
        }
        self.progress(seat)
    }

    /// Shared tail for both a voluntary action and a mid-hand stand/kick:
    /// advance the turn, or cascade through streets (and straight to
    /// showdown) while the round is trivially complete, e.g. because every
    /// remaining player is all-in.
    fn progress(&mut self, mut anchor: usize) -> Result<ActionOutcome, EngineError> {
        loop {
            if !self.hand.round_complete() {
                self.hand.turn_seat = self.hand.next_actionable_after(anchor);
                return Ok(ActionOutcome::Continue);
            }
            if self.hand.phase == Phase::River {
                return Ok(ActionOutcome::HandEnded(self.run_showdown()));
            }
            self.advance_street()?;
            anchor = self.hand.dealer_button;
        }
    }

    fn commit(&mut self, seat: usize, amount: u64) {
        self.seats.debit(seat, amount);
        self.hand.current_bets[seat] += amount;
        self.hand.contributions[seat] += amount;
        self.hand.pot_total += amount;
        if self.seats.stack_of(seat) == 0 {
            self.hand.all_in[seat] = true;
        }
    }

    fn advance_street(&mut self) -> Result<(), EngineError> {
        self.hand.current_bets = [0; N_SEATS];
        self.hand.acted = [false; N_SEATS];
        self.hand.min_raise = BIG_BLIND;
        self.hand.last_aggressor = None;
        self.hand.may_reraise = [true; N_SEATS];

        match self.hand.phase {
            Phase::Preflop => {
                self.hand.deck.deal_one().ok_or_else(empty_deck)?; // burn
                let flop = self.hand.deck.deal_n(3);
                if flop.len() < 3 {
                    return Err(empty_deck());
                }
                self.hand.community.extend(flop);
                self.hand.phase = Phase::Flop;
            }
            Phase::Flop => {
                self.hand.deck.deal_one().ok_or_else(empty_deck)?; // burn
                self.hand.community.push(self.hand.deck.deal_one().ok_or_else(empty_deck)?);
                self.hand.phase = Phase::Turn;
            }
            Phase::Turn => {
                self.hand.deck.deal_one().ok_or_else(empty_deck)?; // burn
                self.hand.community.push(self.hand.deck.deal_one().ok_or_else(empty_deck)?);
                self.hand.phase = Phase::River;
            }
            Phase::River | Phase::Showdown | Phase::Idle => {
                return Err(EngineError::Fatal("advance_street called outside a betting street".into()));
            }
        }

        if self.hand.phase != Phase::Showdown {
            let after_button = self.hand.dealer_button;
            self.hand.turn_seat = self.hand.next_actionable_after(after_button);
        }
        Ok(())
    }

    fn finish_uncontested(&mut self) -> HandResult {
        let remaining = self.hand.active_nonfolded();
        debug_assert_eq!(remaining.len(), 1);
        let winner = remaining[0];
        let amount = self.hand.pot_total;
        self.seats.credit(winner, amount);
        self.hand.phase = Phase::Showdown;
        self.hand.turn_seat = None;
        HandResult {
            pots: vec![PotResult { amount, winners: vec![winner], share_each: amount }],
            went_to_showdown: false,
        }
    }

    fn run_showdown(&mut self) -> HandResult {
        self.hand.phase = Phase::Showdown;
        self.hand.turn_seat = None;

        let eligible_mask: Vec<bool> =
            (0..N_SEATS).map(|i| self.hand.active_seats.contains(&i) && !self.hand.folded[i]).collect();
        let contributions: Vec<u64> = self.hand.contributions.to_vec();
        let pots = build_pots(&contributions, &eligible_mask);

        let scores: HashMap<usize, Score> = self
            .hand
            .active_nonfolded()
            .into_iter()
            .map(|seat| {
                let (c1, c2) = self.hand.hole_cards[&seat];
                let mut cards = vec![c1, c2];
                cards.extend(self.hand.community.iter().copied());
                (seat, evaluate(&cards))
            })
            .collect();

        let mut results = Vec::new();
        for pot in pots {
            if pot.amount == 0 {
                continue;
            }
            let mut best: Option<&Score> = None;
            let mut winners: Vec<usize> = Vec::new();
            for &seat in &pot.eligible {
                let Some(score) = scores.get(&seat) else { continue };
                match best {
                    None => {
                        best = Some(score);
                        winners = vec![seat];
                    }
                    Some(b) => match score.cmp(b) {
                        Ordering::Greater => {
                            best = Some(score);
                            winners = vec![seat];
                        }
                        Ordering::Equal => winners.push(seat),
                        Ordering::Less => {}
                    },
                }
            }
            if winners.is_empty() {
                continue;
            }
            winners.sort_unstable();
            let share = pot.amount / winners.len() as u64;
            let mut remainder = pot.amount - share * winners.len() as u64;
            for &w in &winners {
                let mut amt = share;
                if remainder > 0 {
                    amt += 1;
                    remainder -= 1;
                }
                self.seats.credit(w, amt);
            }
            results.push(PotResult { amount: pot.amount, winners, share_each: share });
        }

        HandResult { pots: results, went_to_showdown: true }
    }

    /// Called by the transport layer after the post-showdown UI delay (or
    /// immediately after an uncontested win) to return the table to idle.
    pub fn return_to_idle(&mut self) {
        self.hand = Hand::idle(self.hand.dealer_button);
        self.stack_snapshot = None;
    }

    /// Called by the transport layer when an engine call surfaces
    /// `EngineError::Fatal`: restores stacks from the pre-hand snapshot and
    /// forces the table back to idle rather than leaving it mid-hand.
    pub fn abort_to_idle(&mut self) {
        if let Some(snapshot) = self.stack_snapshot.take() {
            self.seats.restore_stacks(snapshot);
        }
        self.hand = Hand::idle(self.hand.dealer_button);
    }
}

fn empty_deck() -> EngineError {
    EngineError::Fatal("deck exhausted during deal".into())
}

/// Next seat index, strictly after `from`, circularly among `eligible`.
fn next_seat(eligible: &[usize], from: usize) -> usize {
    let mut sorted = eligible.to_vec();
    sorted.sort_unstable();
    sorted.iter().copied().find(|&s| s > from).unwrap_or(sorted[0])
}

/// `eligible` reordered to start at `start` and wrap circularly.
fn clockwise_from(eligible: &[usize], start: usize) -> Vec<usize> {
    let mut sorted = eligible.to_vec();
    sorted.sort_unstable();
    let pos = sorted.iter().position(|&s| s == start).unwrap_or(0);
    let mut out = sorted[pos..].to_vec();
    out.extend_from_slice(&sorted[..pos]);
    out
}
