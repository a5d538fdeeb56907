//! Card encoding and deck construction (C1).

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Suit::Spades => 's',
            Suit::Hearts => 'h',
            Suit::Diamonds => 'd',
            Suit::Clubs => 'c',
        };
        write!(f, "{c}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Two = 2,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// 2..=14, with Ace high.
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn from_value(value: u8) -> Option<Rank> {
        Rank::ALL.iter().copied().find(|r| r.value() == value)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        };
        write!(f, "{c}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card(pub Rank, pub Suit);

impl Card {
    pub fn rank(self) -> Rank {
        self.0
    }

    pub fn suit(self) -> Suit {
        self.1
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0, self.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardParseError;

impl fmt::Display for CardParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid card string, expected e.g. \"As\" or \"Td\"")
    }
}

impl std::error::Error for CardParseError {}

impl FromStr for Card {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(CardParseError);
        }
        let rank = match bytes[0] as char {
            '2' => Rank::Two,
            '3' => Rank::Three,
            '4' => Rank::Four,
            '5' => Rank::Five,
            '6' => Rank::Six,
            '7' => Rank::Seven,
            '8' => Rank::Eight,
            '9' => Rank::Nine,
            'T' | 't' => Rank::Ten,
            'J' | 'j' => Rank::Jack,
            'Q' | 'q' => Rank::Queen,
            'K' | 'k' => Rank::King,
            'A' | 'a' => Rank::Ace,
            _ => return Err(CardParseError),
        };
        let suit = match bytes[1] as char {
            's' | 'S' => Suit::Spades,
            'h' | 'H' => Suit::Hearts,
            'd' | 'D' => Suit::Diamonds,
            'c' | 'C' => Suit::Clubs,
            _ => return Err(CardParseError),
        };
        Ok(Card(rank, suit))
    }
}

/// Convenience for tests and scenario setup; panics on malformed input.
pub fn card(s: &str) -> Card {
    s.parse().expect("valid card string")
}

/// Ordered sequence of 52 unique cards. Cards are drawn from the end (`deal_one`),
/// matching the spec's "pop from one end" framing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck(Vec<Card>);

impl Deck {
    /// Fresh, unshuffled 52-card deck.
    pub fn fresh() -> Self {
        let mut cards = Vec::with_capacity(52);
        let suits = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];
        for &suit in &suits {
            for &rank in &Rank::ALL {
                cards.push(Card(rank, suit));
            }
        }
        Self(cards)
    }

    /// Fresh deck, Fisher-Yates shuffled with the process RNG.
    pub fn shuffled() -> Self {
        let mut deck = Self::fresh();
        deck.shuffle(&mut rand::rng());
        deck
    }

    /// In-place Fisher-Yates shuffle with an injectable RNG, so tests and the
    /// property suite can substitute a seeded source instead of the process RNG.
    pub fn shuffle(&mut self, rng: &mut impl Rng) {
        self.0.shuffle(rng);
    }

    pub fn deal_one(&mut self) -> Option<Card> {
        self.0.pop()
    }

    pub fn deal_n(&mut self, n: usize) -> Vec<Card> {
        (0..n).filter_map(|_| self.deal_one()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build a deck from an explicit card order (deal order is still pop-from-end),
    /// used by scenario tests that need a pre-arranged deck.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self(cards)
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::fresh()
    }
}
