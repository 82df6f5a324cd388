//! The 5-of-7 best-hand selector.
//!
//! Pure and deterministic: no I/O, no time, no randomness. `evaluate` always
//! returns the same `HandScore` for the same `(hole, board)` pair, and the
//! total order on `HandScore` matches standard Texas Hold'em hand rankings
//! including kickers.

use crate::cards::Card;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hand category. Declaration order is the ranking order (derived `Ord`),
/// so `RoyalFlush` — the label for an ace-high straight flush — sits above
/// plain `StraightFlush` the same way it naturally wins every comparison.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum HandCategory {
    /// Fewer than 5 cards are available (k + 2 < 5); no hand can be scored yet.
    Incomplete,
    HighCard,
    Pair,
    TwoPair,
    Trips,
    Straight,
    Flush,
    FullHouse,
    Quads,
    StraightFlush,
    RoyalFlush,
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Incomplete => "incomplete",
            Self::HighCard => "high card",
            Self::Pair => "pair",
            Self::TwoPair => "two pair",
            Self::Trips => "three of a kind",
            Self::Straight => "straight",
            Self::Flush => "flush",
            Self::FullHouse => "full house",
            Self::Quads => "four of a kind",
            Self::StraightFlush => "straight flush",
            Self::RoyalFlush => "royal flush",
        };
        write!(f, "{repr}")
    }
}

/// A total-ordering score for a hand: category first, then descending
/// tie-break values (kickers, pair ranks, etc) compared lexicographically.
/// Two scores compare equal iff the hands tie under standard rules.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct HandScore {
    pub category: HandCategory,
    pub tiebreakers: Vec<u8>,
}

impl HandScore {
    const INCOMPLETE: HandScore = HandScore {
        category: HandCategory::Incomplete,
        tiebreakers: Vec::new(),
    };

    /// Pack the score into a bounded integer for logging/wire transport.
    /// Magnitude is implementation-defined; only the relative order within
    /// this implementation is meaningful.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        let mut packed = self.category as u64;
        for &t in &self.tiebreakers {
            packed = (packed << 4) | u64::from(t.min(15));
        }
        packed
    }
}

/// The result of evaluating a hand: category plus the comparable score.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Evaluation {
    pub category: HandCategory,
    pub score: HandScore,
}

/// Evaluate two hole cards against 0, 3, 4, or 5 board cards.
///
/// Returns `{category: Incomplete, score: 0}` (by convention, `HandScore`'s
/// `Incomplete` variant) when fewer than 5 cards total are available.
/// Otherwise selects the best 5-card combination from the 2+k available
/// cards.
#[must_use]
pub fn evaluate(hole: [Card; 2], board: &[Card]) -> Evaluation {
    let k = board.len();
    if k + 2 < 5 {
        return Evaluation {
            category: HandCategory::Incomplete,
            score: HandScore::INCOMPLETE,
        };
    }
    let mut pool: Vec<Card> = Vec::with_capacity(2 + k);
    pool.extend_from_slice(&hole);
    pool.extend_from_slice(board);

    let best = combinations_of_5(&pool)
        .map(|hand| score_five(&hand))
        .max()
        .expect("at least one 5-card combination exists when pool.len() >= 5");

    Evaluation {
        category: best.category,
        score: best,
    }
}

/// Yield every 5-card subset of `cards` (cards.len() is 5, 6, or 7 in
/// practice: 2 hole + 3/4/5 board).
fn combinations_of_5(cards: &[Card]) -> impl Iterator<Item = [Card; 5]> + '_ {
    let n = cards.len();
    (0..n).flat_map(move |a| {
        ((a + 1)..n).flat_map(move |b| {
            ((b + 1)..n).flat_map(move |c| {
                ((c + 1)..n).flat_map(move |d| {
                    ((d + 1)..n).map(move |e| {
                        [cards[a], cards[b], cards[c], cards[d], cards[e]]
                    })
                })
            })
        })
    })
}

/// Score exactly 5 cards.
fn score_five(hand: &[Card; 5]) -> HandScore {
    let mut values: Vec<u8> = hand.iter().map(|c| c.rank.value()).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = hand.iter().all(|c| c.suit == hand[0].suit);
    let straight_high = straight_high_card(&values);

    let mut counts: Vec<(u8, u8)> = rank_counts(&values);
    // Sort by count desc, then rank desc, so counts[0] is always the most
    // significant group (quads/trips/top pair).
    counts.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

    if let Some(high) = straight_high {
        if is_flush {
            return if high == 14 {
                HandScore {
                    category: HandCategory::RoyalFlush,
                    tiebreakers: vec![high],
                }
            } else {
                HandScore {
                    category: HandCategory::StraightFlush,
                    tiebreakers: vec![high],
                }
            };
        }
    }

    let shape: Vec<u8> = counts.iter().map(|(count, _)| *count).collect();
    match shape.as_slice() {
        [4, 1] => HandScore {
            category: HandCategory::Quads,
            tiebreakers: vec![counts[0].1, counts[1].1],
        },
        [3, 2] => HandScore {
            category: HandCategory::FullHouse,
            tiebreakers: vec![counts[0].1, counts[1].1],
        },
        _ if is_flush => HandScore {
            category: HandCategory::Flush,
            tiebreakers: values,
        },
        _ if straight_high.is_some() => HandScore {
            category: HandCategory::Straight,
            tiebreakers: vec![straight_high.unwrap()],
        },
        [3, 1, 1] => HandScore {
            category: HandCategory::Trips,
            tiebreakers: vec![counts[0].1, counts[1].1, counts[2].1],
        },
        [2, 2, 1] => HandScore {
            category: HandCategory::TwoPair,
            tiebreakers: vec![counts[0].1, counts[1].1, counts[2].1],
        },
        [2, 1, 1, 1] => HandScore {
            category: HandCategory::Pair,
            tiebreakers: vec![counts[0].1, counts[1].1, counts[2].1, counts[3].1],
        },
        _ => HandScore {
            category: HandCategory::HighCard,
            tiebreakers: values,
        },
    }
}

/// Group sorted-descending rank values by how many times each occurs,
/// returning `(count, rank_value)` pairs.
fn rank_counts(sorted_desc: &[u8]) -> Vec<(u8, u8)> {
    let mut counts: Vec<(u8, u8)> = Vec::new();
    for &v in sorted_desc {
        if let Some(entry) = counts.iter_mut().find(|(_, rank)| *rank == v) {
            entry.0 += 1;
        } else {
            counts.push((1, v));
        }
    }
    counts
}

/// Return the straight's high card if `sorted_desc` (5 distinct-or-not rank
/// values, descending) forms a straight. The wheel (A-2-3-4-5) scores as a
/// 5-high straight, not ace-high.
fn straight_high_card(sorted_desc: &[u8]) -> Option<u8> {
    let mut distinct = sorted_desc.to_vec();
    distinct.dedup();
    if distinct.len() != 5 {
        return None;
    }
    if distinct[0] - distinct[4] == 4 {
        return Some(distinct[0]);
    }
    // Wheel: A,5,4,3,2 represented as values [14,5,4,3,2].
    if distinct == [14, 5, 4, 3, 2] {
        return Some(5);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank, Suit};

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(rank, suit)
    }

    #[test]
    fn incomplete_with_no_board() {
        let hole = [card(Rank::Ace, Suit::Spades), card(Rank::King, Suit::Spades)];
        let eval = evaluate(hole, &[]);
        assert_eq!(eval.category, HandCategory::Incomplete);
    }

    #[test]
    fn royal_flush_beats_two_pair() {
        let hole_royal = [card(Rank::Ace, Suit::Hearts), card(Rank::King, Suit::Hearts)];
        let board = [
            card(Rank::Queen, Suit::Hearts),
            card(Rank::Jack, Suit::Hearts),
            card(Rank::Ten, Suit::Hearts),
            card(Rank::Two, Suit::Clubs),
            card(Rank::Three, Suit::Clubs),
        ];
        let hole_two_pair = [card(Rank::Ace, Suit::Diamonds), card(Rank::King, Suit::Diamonds)];

        let royal = evaluate(hole_royal, &board);
        let two_pair = evaluate(hole_two_pair, &board);

        assert_eq!(royal.category, HandCategory::RoyalFlush);
        assert_eq!(two_pair.category, HandCategory::TwoPair);
        assert!(royal.score > two_pair.score);
    }

    #[test]
    fn wheel_straight_loses_to_six_high() {
        let wheel_hole = [card(Rank::Ace, Suit::Clubs), card(Rank::Two, Suit::Diamonds)];
        let wheel_board = [
            card(Rank::Three, Suit::Hearts),
            card(Rank::Four, Suit::Spades),
            card(Rank::Five, Suit::Clubs),
            card(Rank::Nine, Suit::Diamonds),
            card(Rank::King, Suit::Hearts),
        ];
        let six_high_hole = [card(Rank::Six, Suit::Clubs), card(Rank::Two, Suit::Hearts)];
        let six_high_board = [
            card(Rank::Three, Suit::Hearts),
            card(Rank::Four, Suit::Spades),
            card(Rank::Five, Suit::Clubs),
            card(Rank::Nine, Suit::Diamonds),
            card(Rank::King, Suit::Clubs),
        ];

        let wheel = evaluate(wheel_hole, &wheel_board);
        let six_high = evaluate(six_high_hole, &six_high_board);

        assert_eq!(wheel.category, HandCategory::Straight);
        assert_eq!(six_high.category, HandCategory::Straight);
        assert!(wheel.score < six_high.score);
    }

    #[test]
    fn evaluator_is_deterministic() {
        let hole = [card(Rank::Jack, Suit::Clubs), card(Rank::Jack, Suit::Diamonds)];
        let board = [
            card(Rank::Two, Suit::Hearts),
            card(Rank::Seven, Suit::Spades),
            card(Rank::Nine, Suit::Clubs),
            card(Rank::Jack, Suit::Hearts),
            card(Rank::King, Suit::Diamonds),
        ];
        let a = evaluate(hole, &board);
        let b = evaluate(hole, &board);
        assert_eq!(a.score, b.score);
    }

    #[test]
    fn full_house_beats_flush() {
        let hole = [card(Rank::Two, Suit::Clubs), card(Rank::Two, Suit::Diamonds)];
        let board = [
            card(Rank::Two, Suit::Hearts),
            card(Rank::Nine, Suit::Hearts),
            card(Rank::Nine, Suit::Clubs),
            card(Rank::King, Suit::Hearts),
            card(Rank::Queen, Suit::Hearts),
        ];
        let full_house = evaluate(hole, &board);
        assert_eq!(full_house.category, HandCategory::FullHouse);

        let flush_hole = [card(Rank::Three, Suit::Hearts), card(Rank::Four, Suit::Hearts)];
        let flush = evaluate(flush_hole, &board);
        assert_eq!(flush.category, HandCategory::Flush);
        assert!(full_house.score > flush.score);
    }

    #[test]
    fn kicker_breaks_high_card_tie() {
        let board = [
            card(Rank::Two, Suit::Clubs),
            card(Rank::Seven, Suit::Diamonds),
            card(Rank::Nine, Suit::Hearts),
            card(Rank::Jack, Suit::Spades),
            card(Rank::King, Suit::Clubs),
        ];
        let ace_high = evaluate([card(Rank::Ace, Suit::Hearts), card(Rank::Three, Suit::Diamonds)], &board);
        let queen_high = evaluate([card(Rank::Queen, Suit::Hearts), card(Rank::Four, Suit::Diamonds)], &board);
        assert_eq!(ace_high.category, HandCategory::HighCard);
        assert!(ace_high.score > queen_high.score);
    }
}
