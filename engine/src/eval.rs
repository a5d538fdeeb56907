//! 7-card hand evaluator (C2).
//!
//! A [`Score`] is a comparable `(category, tiebreak)` tuple. Category value
//! higher = stronger, matching the spec's 8 (straight flush) .. 0 (high card)
//! scale. `tiebreak` is padded to 5 slots so [`Score`]'s derived `Ord` can
//! compare lexicographically regardless of category.

use std::cmp::Ordering;
use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::card::{Card, Rank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum HandCategory {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HandCategory::HighCard => "High Card",
            HandCategory::OnePair => "One Pair",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::ThreeOfAKind => "Three of a Kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full House",
            HandCategory::FourOfAKind => "Four of a Kind",
            HandCategory::StraightFlush => "Straight Flush",
        };
        write!(f, "{s}")
    }
}

/// Comparable hand score. Fields are declared in comparison order so the
/// derived `Ord` is exactly lexicographic: category first, then tiebreak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Score {
    pub category: HandCategory,
    pub tiebreak: [u8; 5],
}

impl Score {
    pub fn describe(&self) -> String {
        let r = |v: u8| Rank::from_value(v).map(|r| r.to_string()).unwrap_or_default();
        match self.category {
            HandCategory::StraightFlush => format!("Straight Flush, {} high", r(self.tiebreak[0])),
            HandCategory::FourOfAKind => format!("Four of a Kind, {}s", r(self.tiebreak[0])),
            HandCategory::FullHouse => {
                format!("Full House, {}s over {}s", r(self.tiebreak[0]), r(self.tiebreak[1]))
            }
            HandCategory::Flush => format!("Flush, {} high", r(self.tiebreak[0])),
            HandCategory::Straight => format!("Straight, {} high", r(self.tiebreak[0])),
            HandCategory::ThreeOfAKind => format!("Three of a Kind, {}s", r(self.tiebreak[0])),
            HandCategory::TwoPair => {
                format!("Two Pair, {}s and {}s", r(self.tiebreak[0]), r(self.tiebreak[1]))
            }
            HandCategory::OnePair => format!("One Pair, {}s", r(self.tiebreak[0])),
            HandCategory::HighCard => format!("High Card, {}", r(self.tiebreak[0])),
        }
    }
}

/// `-1`/`0`/`1` comparison matching the spec's `compareScores` interface;
/// prefer `Score`'s `Ord` directly in Rust code.
pub fn compare_scores(a: &Score, b: &Score) -> Ordering {
    a.cmp(b)
}

/// Evaluate the best 5-card hand out of 5..=7 cards.
pub fn evaluate(cards: &[Card]) -> Score {
    debug_assert!((5..=7).contains(&cards.len()));
    cards
        .iter()
        .copied()
        .combinations(5)
        .map(|five| evaluate_five(&five))
        .max()
        .expect("at least one 5-card combination")
}

fn evaluate_five(cards: &[Card]) -> Score {
    debug_assert_eq!(cards.len(), 5);

    let mut counts = [0u8; 15]; // indices 2..=14
    for c in cards {
        counts[c.rank().value() as usize] += 1;
    }
    let mut ranks_desc: Vec<u8> = cards.iter().map(|c| c.rank().value()).collect();
    ranks_desc.sort_unstable_by(|a, b| b.cmp(a));

    let flush_suit = {
        let suit0 = cards[0].suit();
        cards.iter().all(|c| c.suit() == suit0).then_some(suit0)
    };
    let straight_top = straight_top(&ranks_desc);

    if flush_suit.is_some() {
        if let Some(top) = straight_top {
            return Score { category: HandCategory::StraightFlush, tiebreak: pad1(top) };
        }
    }

    if let Some(quad) = find_count(&counts, 4) {
        let kicker = ranks_desc.iter().copied().find(|&r| r != quad).unwrap_or(0);
        return Score { category: HandCategory::FourOfAKind, tiebreak: pad2(quad, kicker) };
    }

    if let Some(trip) = find_count(&counts, 3) {
        // a second trips counts as >= 2 and can act as the pair here
        if let Some(pair) = find_count_excluding(&counts, 2, trip) {
            return Score { category: HandCategory::FullHouse, tiebreak: pad2(trip, pair) };
        }
    }

    if let Some(suit) = flush_suit {
        let mut flush_ranks: Vec<u8> = cards
            .iter()
            .filter(|c| c.suit() == suit)
            .map(|c| c.rank().value())
            .collect();
        flush_ranks.sort_unstable_by(|a, b| b.cmp(a));
        return Score { category: HandCategory::Flush, tiebreak: pad5(&flush_ranks) };
    }

    if let Some(top) = straight_top {
        return Score { category: HandCategory::Straight, tiebreak: pad1(top) };
    }

    if let Some(trip) = find_count(&counts, 3) {
        let kickers = top_n_excluding(&ranks_desc, &[trip], 2);
        return Score {
            category: HandCategory::ThreeOfAKind,
            tiebreak: [trip, kickers[0], kickers[1], 0, 0],
        };
    }

    let pairs = all_counts(&counts, 2);
    if pairs.len() >= 2 {
        let high_pair = pairs[0];
        let low_pair = pairs[1];
        let kicker = top_n_excluding(&ranks_desc, &[high_pair, low_pair], 1)[0];
        return Score {
            category: HandCategory::TwoPair,
            tiebreak: [high_pair, low_pair, kicker, 0, 0],
        };
    }

    if let Some(pair) = find_count(&counts, 2) {
        let kickers = top_n_excluding(&ranks_desc, &[pair], 3);
        return Score {
            category: HandCategory::OnePair,
            tiebreak: [pair, kickers[0], kickers[1], kickers[2], 0],
        };
    }

    Score { category: HandCategory::HighCard, tiebreak: pad5(&ranks_desc) }
}

/// Highest rank value `v` (2..=14) such that a 5-run ending at `v` is present,
/// with the wheel A-2-3-4-5 scoring as a 5-high straight (top = 5).
fn straight_top(ranks_desc: &[u8]) -> Option<u8> {
    let mut present = [false; 15]; // index 1..=14, index 1 doubles as the wheel's low ace
    for &r in ranks_desc {
        present[r as usize] = true;
        if r == 14 {
            present[1] = true;
        }
    }
    for top in (5..=14).rev() {
        if (top - 4..=top).all(|v| present[v as usize]) {
            return Some(top);
        }
    }
    None
}

fn find_count(counts: &[u8; 15], n: u8) -> Option<u8> {
    (2..=14).rev().find(|&v| counts[v as usize] == n)
}

fn find_count_excluding(counts: &[u8; 15], n: u8, exclude: u8) -> Option<u8> {
    (2..=14).rev().find(|&v| v != exclude && counts[v as usize] >= n)
}

fn all_counts(counts: &[u8; 15], n: u8) -> Vec<u8> {
    (2..=14).rev().filter(|&v| counts[v as usize] == n).collect()
}

fn top_n_excluding(ranks_desc: &[u8], exclude: &[u8], n: usize) -> Vec<u8> {
    let mut out: Vec<u8> = ranks_desc.iter().copied().filter(|r| !exclude.contains(r)).collect();
    out.truncate(n);
    out
}

fn pad1(v: u8) -> [u8; 5] {
    [v, 0, 0, 0, 0]
}

fn pad2(a: u8, b: u8) -> [u8; 5] {
    [a, b, 0, 0, 0]
}

fn pad5(v: &[u8]) -> [u8; 5] {
    [v[0], v[1], v[2], v[3], v[4]]
}
