//! Property-based tests for hand evaluation using proptest.
//!
//! These verify invariants of `room_poker::evaluator::evaluate` across a wide
//! range of randomly generated hole/board combinations, rather than checking
//! specific category outcomes.

use proptest::prelude::*;
use room_poker::cards::{Card, Rank, Suit};
use room_poker::evaluator::{evaluate, HandCategory};
use std::collections::BTreeSet;

fn rank_strategy() -> impl Strategy<Value = Rank> {
    prop_oneof![
        Just(Rank::Two),
        Just(Rank::Three),
        Just(Rank::Four),
        Just(Rank::Five),
        Just(Rank::Six),
        Just(Rank::Seven),
        Just(Rank::Eight),
        Just(Rank::Nine),
        Just(Rank::Ten),
        Just(Rank::Jack),
        Just(Rank::Queen),
        Just(Rank::King),
        Just(Rank::Ace),
    ]
}

fn suit_strategy() -> impl Strategy<Value = Suit> {
    prop_oneof![
        Just(Suit::Clubs),
        Just(Suit::Diamonds),
        Just(Suit::Hearts),
        Just(Suit::Spades),
    ]
}

fn card_strategy() -> impl Strategy<Value = Card> {
    (rank_strategy(), suit_strategy()).prop_map(|(rank, suit)| Card::new(rank, suit))
}

/// A vec of `count` distinct cards drawn without replacement.
fn unique_cards_strategy(count: usize) -> impl Strategy<Value = Vec<Card>> {
    prop::collection::vec(card_strategy(), count..=count).prop_filter("cards must be unique", |cards| {
        let set: BTreeSet<Card> = cards.iter().copied().collect();
        set.len() == cards.len()
    })
}

proptest! {
    #[test]
    fn evaluate_is_deterministic(cards in unique_cards_strategy(7)) {
        let hole = [cards[0], cards[1]];
        let board = &cards[2..7];
        let a = evaluate(hole, board);
        let b = evaluate(hole, board);
        prop_assert_eq!(a.score, b.score);
        prop_assert_eq!(a.category, b.category);
    }

    #[test]
    fn evaluate_never_returns_incomplete_with_five_or_more_cards(cards in unique_cards_strategy(7)) {
        let hole = [cards[0], cards[1]];
        let board = &cards[2..7];
        let eval = evaluate(hole, board);
        prop_assert_ne!(eval.category, HandCategory::Incomplete);
    }

    #[test]
    fn evaluate_with_fewer_than_five_total_cards_is_incomplete(cards in unique_cards_strategy(4)) {
        let hole = [cards[0], cards[1]];
        let board = &cards[2..4];
        let eval = evaluate(hole, board);
        prop_assert_eq!(eval.category, HandCategory::Incomplete);
    }

    #[test]
    fn swapping_hole_and_board_cards_cannot_change_the_pool_score(cards in unique_cards_strategy(7)) {
        // Evaluating the same 7-card pool split a different way between
        // "hole" and "board" must produce the same best-5 score, since
        // evaluate only ever looks at the union of the two.
        let eval_a = evaluate([cards[0], cards[1]], &cards[2..7]);
        let eval_b = evaluate([cards[6], cards[5]], &cards[0..5]);
        prop_assert_eq!(eval_a.score, eval_b.score);
    }

    #[test]
    fn identical_seven_card_pools_tie(cards in unique_cards_strategy(7)) {
        let hole = [cards[0], cards[1]];
        let board = &cards[2..7];
        let a = evaluate(hole, board);
        let b = evaluate(hole, board);
        prop_assert!(a.score == b.score);
    }
}

#[test]
fn four_of_a_kind_beats_a_flush() {
    let quads_board = [
        Card::new(Rank::Eight, Suit::Spades),
        Card::new(Rank::Eight, Suit::Hearts),
        Card::new(Rank::Eight, Suit::Diamonds),
        Card::new(Rank::Two, Suit::Clubs),
        Card::new(Rank::Nine, Suit::Hearts),
    ];
    let flush_board = [
        Card::new(Rank::Nine, Suit::Hearts),
        Card::new(Rank::Eight, Suit::Hearts),
        Card::new(Rank::Two, Suit::Hearts),
        Card::new(Rank::Three, Suit::Clubs),
        Card::new(Rank::Four, Suit::Spades),
    ];
    let quads = evaluate([Card::new(Rank::Eight, Suit::Clubs), Card::new(Rank::King, Suit::Spades)], &quads_board);
    let flush = evaluate([Card::new(Rank::Three, Suit::Hearts), Card::new(Rank::Five, Suit::Hearts)], &flush_board);
    assert_eq!(quads.category, HandCategory::Quads);
    assert_eq!(flush.category, HandCategory::Flush);
    assert!(quads.score > flush.score);
}
