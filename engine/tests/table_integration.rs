use std::collections::HashMap;

use holdem_engine::hand::{Action, ActionOutcome, Hand, Phase};
use holdem_engine::{card, Card, Deck, EngineError, Table};
use rstest::rstest;

fn seat_up(table: &mut Table, seat: usize, client_ref: &str, stack: u64) {
    table.sit(seat, client_ref, format!("player-{seat}"), stack).unwrap();
}

/// `in_deal_order` lists cards in the order they will actually be dealt
/// (hole cards first pass, then second pass, then each street's burn+deal).
/// `Deck::deal_one` pops from the end, so the backing vector is built in
/// reverse.
fn deck_dealing(in_deal_order: Vec<Card>) -> Deck {
    let mut cards = in_deal_order;
    cards.reverse();
    Deck::from_cards(cards)
}

#[test]
fn start_hand_posts_blinds_and_deals_hole_cards() {
    let mut t = Table::new();
    seat_up(&mut t, 0, "u0", 1000);
    seat_up(&mut t, 1, "u1", 1000);
    t.claim_owner("u0");

    let deck = deck_dealing(vec![
        card("As"), card("Kd"), card("Ah"), card("Kc"), // hole cards
        card("8d"), card("2d"), card("7s"), card("9c"), // burn + flop
        card("8h"), card("3h"), // burn + turn
        card("8c"), card("4d"), // burn + river
    ]);
    t.start_hand_with_deck("u0", deck).unwrap();

    assert_eq!(t.hand.phase, Phase::Preflop);
    assert_eq!(t.hand.pot_total, 30);
    assert_eq!(t.hand.active_seats.len(), 2);
    assert!(t.hand.turn_seat.is_some());
    for &seat in &t.hand.active_seats {
        assert!(t.hand.hole_cards.contains_key(&seat));
    }
}

#[test]
fn owner_only_can_start_a_hand() {
    let mut t = Table::new();
    seat_up(&mut t, 0, "u0", 1000);
    seat_up(&mut t, 1, "u1", 1000);
    t.claim_owner("u0");

    let err = t.start_hand_with_deck("u1", Deck::shuffled()).unwrap_err();
    assert_eq!(err, EngineError::NotOwner);
}

#[test]
fn two_players_checked_down_to_showdown_pays_the_better_hand() {
    let mut t = Table::new();
    seat_up(&mut t, 0, "u0", 1000);
    seat_up(&mut t, 1, "u1", 1000);
    t.claim_owner("u0");

    let deck = deck_dealing(vec![
        card("As"), card("Kd"), card("Ah"), card("Kc"),
        card("8d"), card("2d"), card("7s"), card("9c"),
        card("8h"), card("3h"),
        card("8c"), card("4d"),
    ]);
    t.start_hand_with_deck("u0", deck).unwrap();

    let refs: HashMap<usize, String> =
        (0..2).map(|s| (s, t.seats.get(s).unwrap().client_ref.clone())).collect();

    // Preflop: small blind calls, big blind checks.
    let sb_seat = t.hand.turn_seat.unwrap();
    t.apply_action(&refs[&sb_seat], Action::Call).unwrap();
    let bb_seat = t.hand.turn_seat.unwrap();
    let outcome = t.apply_action(&refs[&bb_seat], Action::Check).unwrap();
    assert_eq!(outcome, ActionOutcome::Continue);
    assert_eq!(t.hand.phase, Phase::Flop);

    // Flop, turn, river: both check each street.
    for _ in 0..3 {
        let first = t.hand.turn_seat.unwrap();
        let mid = t.apply_action(&refs[&first], Action::Check).unwrap();
        if let ActionOutcome::HandEnded(_) = mid {
            panic!("hand ended before the second check on this street");
        }
        let second = t.hand.turn_seat.unwrap();
        let outcome = t.apply_action(&refs[&second], Action::Check).unwrap();
        if t.hand.phase == Phase::River || matches!(outcome, ActionOutcome::HandEnded(_)) {
            if let ActionOutcome::HandEnded(result) = outcome {
                assert!(result.went_to_showdown);
                assert_eq!(result.pots.len(), 1);
                assert_eq!(result.pots[0].winners, vec![0]); // pocket aces beat pocket kings
                assert_eq!(result.pots[0].amount, 40);
            }
        }
    }

    assert_eq!(t.seats.get(0).unwrap().stack, 1020);
    assert_eq!(t.seats.get(1).unwrap().stack, 980);
}

#[test]
fn folding_preflop_awards_the_pot_uncontested() {
    let mut t = Table::new();
    seat_up(&mut t, 0, "u0", 1000);
    seat_up(&mut t, 1, "u1", 1000);
    t.claim_owner("u0");
    t.start_hand_with_deck("u0", Deck::shuffled()).unwrap();

    let folder = t.hand.turn_seat.unwrap();
    let folder_ref = t.seats.get(folder).unwrap().client_ref.clone();
    let outcome = t.apply_action(&folder_ref, Action::Fold).unwrap();

    match outcome {
        ActionOutcome::HandEnded(result) => {
            assert!(!result.went_to_showdown);
            assert_eq!(result.pots.len(), 1);
            assert_eq!(result.pots[0].amount, 30);
            assert_ne!(result.pots[0].winners[0], folder);
        }
        ActionOutcome::Continue => panic!("folding down to one player must end the hand"),
    }
    assert_eq!(t.seats.get(0).unwrap().stack + t.seats.get(1).unwrap().stack, 2000);
}

#[test]
fn standing_mid_hand_folds_the_seat_and_keeps_its_contribution_in_the_pot() {
    let mut t = Table::new();
    seat_up(&mut t, 0, "u0", 1000);
    seat_up(&mut t, 1, "u1", 1000);
    seat_up(&mut t, 2, "u2", 1000);
    t.claim_owner("u0");
    t.start_hand_with_deck("u0", Deck::shuffled()).unwrap();

    // u1 disconnects mid-hand without having acted yet.
    t.stand("u1").unwrap();
    assert!(!t.seats.is_occupied(1));
    assert!(t.hand.folded[1]);
    // Their blind/ante contribution (if any) is still reflected in the pot total.
    assert!(t.hand.pot_total > 0);
}

#[test]
fn short_all_in_raises_the_bet_without_reopening_the_minimum_raise() {
    let mut t = Table::new();
    seat_up(&mut t, 0, "a", 1000);
    seat_up(&mut t, 1, "b", 1000);
    seat_up(&mut t, 2, "c", 130);
    t.claim_owner("a");

    // Skip straight to a three-way flop with nothing bet yet.
    let mut hand = Hand::idle(0);
    hand.phase = Phase::Flop;
    hand.active_seats = vec![0, 1, 2];
    hand.min_raise = 20;
    hand.turn_seat = Some(0);
    t.hand = hand;

    // a opens for 100.
    t.apply_action("a", Action::Bet(100)).unwrap();
    assert_eq!(t.hand.min_raise, 100);
    assert_eq!(t.hand.last_aggressor, Some(0));

    // b calls before c acts, so b has already matched the bet by the time
    // the short all-in lands.
    assert_eq!(t.hand.turn_seat, Some(1));
    t.apply_action("b", Action::Call).unwrap();

    // c (130 behind) shoves: calls the 100 and adds only 30 more, below
    // the 100 minimum raise, so the raise does not reopen.
    assert_eq!(t.hand.turn_seat, Some(2));
    t.apply_action("c", Action::AllIn).unwrap();
    assert_eq!(t.hand.min_raise, 100, "a short all-in must not lower the minimum raise");
    assert_eq!(t.hand.last_aggressor, Some(0), "a short all-in must not become the new aggressor");
    assert!(t.hand.is_all_in(2));

    // Action returns to a first (next in rotation after c). a already acted
    // at the 100 level, so c's short all-in does not reopen a's right to
    // raise either, even though 100 would otherwise be a legal raise size.
    assert_eq!(t.hand.turn_seat, Some(0));
    let err = t.apply_action("a", Action::Raise(100)).unwrap_err();
    assert_eq!(err, EngineError::RaiseBelowMinimum);
    t.apply_action("a", Action::Call).unwrap();

    // b, facing the new 130 bet, may call or fold, but may not treat c's
    // 30-chip shortfall as a new, smaller minimum, nor use it to reopen the
    // raise it already gave up when it called the original 100 bet.
    assert_eq!(t.hand.turn_seat, Some(1));
    let err = t.apply_action("b", Action::Raise(100)).unwrap_err();
    assert_eq!(err, EngineError::RaiseBelowMinimum);

    t.apply_action("b", Action::Call).unwrap();
    assert_eq!(t.hand.phase, Phase::Turn, "all bets matched, the round should advance to the turn");
}

#[test]
fn cannot_check_facing_a_bet() {
    let mut t = Table::new();
    seat_up(&mut t, 0, "a", 1000);
    seat_up(&mut t, 1, "b", 1000);
    t.claim_owner("a");

    let mut hand = Hand::idle(0);
    hand.phase = Phase::Flop;
    hand.active_seats = vec![0, 1];
    hand.min_raise = 20;
    hand.turn_seat = Some(0);
    t.hand = hand;

    t.apply_action("a", Action::Bet(50)).unwrap();
    let err = t.apply_action("b", Action::Check).unwrap_err();
    assert_eq!(err, EngineError::CannotCheck);
}

#[test]
fn acting_out_of_turn_is_rejected() {
    let mut t = Table::new();
    seat_up(&mut t, 0, "a", 1000);
    seat_up(&mut t, 1, "b", 1000);
    t.claim_owner("a");
    t.start_hand_with_deck("a", Deck::shuffled()).unwrap();

    let not_on_clock = if t.hand.turn_seat == Some(0) { 1 } else { 0 };
    let client_ref = t.seats.get(not_on_clock).unwrap().client_ref.clone();
    let err = t.apply_action(&client_ref, Action::Check).unwrap_err();
    assert_eq!(err, EngineError::NotYourTurn);
}
