//! Side-pot construction from per-seat contributions and fold eligibility (C3).

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pot {
    pub amount: u64,
    pub eligible: Vec<usize>,
}

/// Build ordered side pots from cumulative per-seat contributions and a
/// per-seat "still eligible to win" mask (true iff the seat did not fold).
///
/// Layered construction: repeatedly peel off the smallest remaining
/// contribution as a pot shared by every seat still contributing at that
/// layer. A layer with no eligible seats (every contributor at that layer
/// folded) carries its amount forward onto the next non-empty layer; if no
/// further layer exists, the carry is forfeited.
pub fn build_pots(contributions: &[u64], eligible: &[bool]) -> Vec<Pot> {
    assert_eq!(contributions.len(), eligible.len());

    let mut remaining = contributions.to_vec();
    let mut layers: Vec<Pot> = Vec::new();

    loop {
        let contributing: Vec<usize> =
            (0..remaining.len()).filter(|&i| remaining[i] > 0).collect();
        if contributing.is_empty() {
            break;
        }
        let layer = contributing.iter().map(|&i| remaining[i]).min().unwrap();
        let amount = layer * contributing.len() as u64;
        let pot_eligible: Vec<usize> =
            contributing.iter().copied().filter(|&i| eligible[i]).collect();
        for &i in &contributing {
            remaining[i] -= layer;
        }
        layers.push(Pot { amount, eligible: pot_eligible });
    }

    let mut pots: Vec<Pot> = Vec::new();
    let mut carry = 0u64;
    for layer in layers {
        if layer.eligible.is_empty() {
            carry += layer.amount;
        } else {
            pots.push(Pot { amount: layer.amount + carry, eligible: layer.eligible });
            carry = 0;
        }
    }
    pots
}
