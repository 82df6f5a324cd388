//! Cards and the shuffled 52-card source for a single hand.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A playing card suit. No `Wild`/joker placeholder — a deck is always a
/// concrete arrangement of the standard 52 cards.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Clubs => "♣",
            Self::Diamonds => "♦",
            Self::Hearts => "♥",
            Self::Spades => "♠",
        };
        write!(f, "{repr}")
    }
}

/// Card rank, ace-high (`Ace == 14`). The wheel straight (A-2-3-4-5) is
/// handled as a special case in the evaluator rather than by giving ace a
/// second value here.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Rank {
    const ALL: [Rank; 13] = [
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

    /// Numeric value used for tie-breaking, 2..=14.
    #[must_use]
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Two => "2",
            Self::Three => "3",
            Self::Four => "4",
            Self::Five => "5",
            Self::Six => "6",
            Self::Seven => "7",
            Self::Eight => "8",
            Self::Nine => "9",
            Self::Ten => "10",
            Self::Jack => "J",
            Self::Queen => "Q",
            Self::King => "K",
            Self::Ace => "A",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    #[must_use]
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

/// Error returned when a deck operation can't proceed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum DeckError {
    #[error("deck is empty")]
    Empty,
}

/// A shuffled 52-card sequence for one hand, dealt from the top.
///
/// Shuffling is Fisher-Yates over an injected `rand::Rng` so tests can seed
/// it deterministically (`Deck::new` never reaches for a thread-local RNG
/// itself).
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Build a full 52-card deck and shuffle it with the given source.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                cards.push(Card::new(rank, suit));
            }
        }
        // Fisher-Yates, back to front.
        for i in (1..cards.len()).rev() {
            let j = rng.random_range(0..=i);
            cards.swap(i, j);
        }
        Self { cards }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    /// Remove and return the top card.
    pub fn deal(&mut self) -> Result<Card, DeckError> {
        self.cards.pop().ok_or(DeckError::Empty)
    }

    /// Discard the top card face-down.
    pub fn burn(&mut self) -> Result<(), DeckError> {
        self.cards.pop().ok_or(DeckError::Empty)?;
        Ok(())
    }
}
