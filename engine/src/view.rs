//! Per-viewer projection (C7): the same table state rendered once per
//! connected client, with hole cards hidden except for the viewer's own
//! seat and, post-showdown, any seat that did not fold.

use serde::Serialize;

use crate::card::Card;
use crate::config::{BIG_BLIND, N_SEATS, SMALL_BLIND};
use crate::hand::{Phase, Table};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state")]
pub enum HoleView {
    /// No hand in progress, or the seat wasn't dealt into this one.
    None,
    /// Dealt in, but not this viewer's cards and not yet revealed.
    Hidden,
    Revealed { cards: [Card; 2] },
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatView {
    pub seat: usize,
    pub display_name: Option<String>,
    pub stack: u64,
    pub current_bet: u64,
    pub contribution: u64,
    pub folded: bool,
    pub all_in: bool,
    pub is_turn: bool,
    pub hole: HoleView,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    pub seats: Vec<SeatView>,
    pub community: Vec<Card>,
    pub phase: Phase,
    pub pot_total: u64,
    pub turn_seat: Option<usize>,
    pub min_raise: u64,
    pub dealer_button: usize,
    pub small_blind: u64,
    pub big_blind: u64,
    pub owner_seat: Option<usize>,
    pub owner_present: bool,
    pub your_seat: Option<usize>,
}

pub fn project(table: &Table, viewer: &str) -> TableView {
    let your_seat = table.seats.seat_of(viewer);
    let owner_seat = table.seats.owner().and_then(|o| table.seats.seat_of(o));

    let seats = (0..N_SEATS)
        .filter_map(|seat| {
            let player = table.seats.get(seat)?;
            let dealt_in = table.hand.active_seats.contains(&seat);
            let folded = dealt_in && table.hand.folded[seat];
            let hole = if !dealt_in {
                HoleView::None
            } else if Some(seat) == your_seat {
                table
                    .hand
                    .hole_cards
                    .get(&seat)
                    .map(|&(a, b)| HoleView::Revealed { cards: [a, b] })
                    .unwrap_or(HoleView::None)
            } else if table.hand.phase == Phase::Showdown && !folded {
                table
                    .hand
                    .hole_cards
                    .get(&seat)
                    .map(|&(a, b)| HoleView::Revealed { cards: [a, b] })
                    .unwrap_or(HoleView::Hidden)
            } else {
                HoleView::Hidden
            };

            Some(SeatView {
                seat,
                display_name: Some(player.display_name.clone()),
                stack: player.stack,
                current_bet: if dealt_in { table.hand.current_bets[seat] } else { 0 },
                contribution: if dealt_in { table.hand.contributions[seat] } else { 0 },
                folded,
                all_in: dealt_in && table.hand.is_all_in(seat),
                is_turn: table.hand.turn_seat == Some(seat),
                hole,
            })
        })
        .collect();

    TableView {
        seats,
        community: table.hand.community.clone(),
        phase: table.hand.phase,
        pot_total: table.hand.pot_total,
        turn_seat: table.hand.turn_seat,
        min_raise: table.hand.min_raise,
        dealer_button: table.hand.dealer_button,
        small_blind: SMALL_BLIND,
        big_blind: BIG_BLIND,
        owner_seat,
        owner_present: owner_seat.is_some(),
        your_seat,
    }
}
