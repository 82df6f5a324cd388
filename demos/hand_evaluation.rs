//! Hand Evaluation Example
//!
//! Demonstrates how to use `room_poker::evaluator::evaluate` to score and
//! compare Texas Hold'em hands.

use room_poker::cards::{Card, Rank, Suit};
use room_poker::evaluator::evaluate;

fn main() {
    println!("=== Poker Hand Evaluation Example ===\n");

    // Example 1: Evaluate a single hand (2 hole cards + 5 board cards).
    println!("Example 1: Evaluating a 7-card hand");
    let hole = [Card::new(Rank::Ace, Suit::Hearts), Card::new(Rank::King, Suit::Hearts)];
    let board = [
        Card::new(Rank::Queen, Suit::Hearts),
        Card::new(Rank::Jack, Suit::Hearts),
        Card::new(Rank::Ten, Suit::Hearts),
        Card::new(Rank::Nine, Suit::Spades),
        Card::new(Rank::Two, Suit::Clubs),
    ];
    let result = evaluate(hole, &board);
    println!("Hole: {hole:?}");
    println!("Board: {board:?}");
    println!("Category: {}\n", result.category);

    // Example 2: Compare two hands on the same board.
    println!("Example 2: Comparing two hands");
    let board = [
        Card::new(Rank::Ten, Suit::Clubs),
        Card::new(Rank::Nine, Suit::Diamonds),
        Card::new(Rank::Two, Suit::Spades),
        Card::new(Rank::Five, Suit::Hearts),
        Card::new(Rank::Seven, Suit::Clubs),
    ];
    let hole_a = [Card::new(Rank::Ace, Suit::Spades), Card::new(Rank::Ace, Suit::Hearts)];
    let hole_b = [Card::new(Rank::King, Suit::Spades), Card::new(Rank::King, Suit::Hearts)];

    let eval_a = evaluate(hole_a, &board);
    let eval_b = evaluate(hole_b, &board);
    println!("Hand A (pair of aces): {}", eval_a.category);
    println!("Hand B (pair of kings): {}", eval_b.category);
    match eval_a.score.cmp(&eval_b.score) {
        std::cmp::Ordering::Greater => println!("Winner: Hand A\n"),
        std::cmp::Ordering::Less => println!("Winner: Hand B\n"),
        std::cmp::Ordering::Equal => println!("Tie!\n"),
    }

    // Example 3: Multi-way comparison with a tie.
    println!("Example 3: Three-way comparison with a tie");
    let board = [
        Card::new(Rank::Five, Suit::Clubs),
        Card::new(Rank::Three, Suit::Spades),
        Card::new(Rank::Two, Suit::Hearts),
        Card::new(Rank::Eight, Suit::Diamonds),
        Card::new(Rank::Six, Suit::Clubs),
    ];
    let hands = [
        [Card::new(Rank::Ten, Suit::Hearts), Card::new(Rank::Ten, Suit::Diamonds)],
        [Card::new(Rank::Ten, Suit::Spades), Card::new(Rank::Ten, Suit::Clubs)],
        [Card::new(Rank::Nine, Suit::Hearts), Card::new(Rank::Nine, Suit::Diamonds)],
    ];
    let evaluations: Vec<_> = hands.iter().map(|&hole| evaluate(hole, &board)).collect();
    for (i, eval) in evaluations.iter().enumerate() {
        println!("Hand {}: {}", i + 1, eval.category);
    }
    let best = evaluations.iter().max_by(|a, b| a.score.cmp(&b.score)).unwrap();
    let winners: Vec<usize> = evaluations
        .iter()
        .enumerate()
        .filter(|(_, e)| e.score == best.score)
        .map(|(i, _)| i + 1)
        .collect();
    println!("Winner(s): Hands {winners:?}");

    // Example 4: One example of each hand category.
    println!("\nExample 4: Examples of each hand category");
    let examples: Vec<(&str, [Card; 2], [Card; 5])> = vec![
        (
            "Royal Flush",
            [Card::new(Rank::Ace, Suit::Spades), Card::new(Rank::King, Suit::Spades)],
            [
                Card::new(Rank::Queen, Suit::Spades),
                Card::new(Rank::Jack, Suit::Spades),
                Card::new(Rank::Ten, Suit::Spades),
                Card::new(Rank::Two, Suit::Hearts),
                Card::new(Rank::Three, Suit::Clubs),
            ],
        ),
        (
            "Straight Flush",
            [Card::new(Rank::Nine, Suit::Hearts), Card::new(Rank::Eight, Suit::Hearts)],
            [
                Card::new(Rank::Seven, Suit::Hearts),
                Card::new(Rank::Six, Suit::Hearts),
                Card::new(Rank::Five, Suit::Hearts),
                Card::new(Rank::Two, Suit::Clubs),
                Card::new(Rank::Three, Suit::Spades),
            ],
        ),
        (
            "Four of a Kind",
            [Card::new(Rank::Eight, Suit::Spades), Card::new(Rank::Eight, Suit::Hearts)],
            [
                Card::new(Rank::Eight, Suit::Diamonds),
                Card::new(Rank::Eight, Suit::Clubs),
                Card::new(Rank::Two, Suit::Spades),
                Card::new(Rank::Nine, Suit::Hearts),
                Card::new(Rank::King, Suit::Clubs),
            ],
        ),
        (
            "Full House",
            [Card::new(Rank::Ten, Suit::Spades), Card::new(Rank::Ten, Suit::Hearts)],
            [
                Card::new(Rank::Ten, Suit::Diamonds),
                Card::new(Rank::Six, Suit::Clubs),
                Card::new(Rank::Six, Suit::Spades),
                Card::new(Rank::Two, Suit::Hearts),
                Card::new(Rank::Nine, Suit::Diamonds),
            ],
        ),
        (
            "Flush",
            [Card::new(Rank::King, Suit::Clubs), Card::new(Rank::Jack, Suit::Clubs)],
            [
                Card::new(Rank::Eight, Suit::Clubs),
                Card::new(Rank::Five, Suit::Clubs),
                Card::new(Rank::Three, Suit::Clubs),
                Card::new(Rank::Two, Suit::Hearts),
                Card::new(Rank::Nine, Suit::Diamonds),
            ],
        ),
        (
            "Straight",
            [Card::new(Rank::Ten, Suit::Spades), Card::new(Rank::Nine, Suit::Hearts)],
            [
                Card::new(Rank::Eight, Suit::Diamonds),
                Card::new(Rank::Seven, Suit::Clubs),
                Card::new(Rank::Six, Suit::Spades),
                Card::new(Rank::Two, Suit::Hearts),
                Card::new(Rank::King, Suit::Diamonds),
            ],
        ),
        (
            "Three of a Kind",
            [Card::new(Rank::Seven, Suit::Spades), Card::new(Rank::Seven, Suit::Hearts)],
            [
                Card::new(Rank::Seven, Suit::Diamonds),
                Card::new(Rank::Queen, Suit::Clubs),
                Card::new(Rank::Three, Suit::Spades),
                Card::new(Rank::Two, Suit::Hearts),
                Card::new(Rank::Nine, Suit::Diamonds),
            ],
        ),
        (
            "Two Pair",
            [Card::new(Rank::Queen, Suit::Spades), Card::new(Rank::Queen, Suit::Hearts)],
            [
                Card::new(Rank::Five, Suit::Diamonds),
                Card::new(Rank::Five, Suit::Clubs),
                Card::new(Rank::Two, Suit::Spades),
                Card::new(Rank::Nine, Suit::Hearts),
                Card::new(Rank::King, Suit::Diamonds),
            ],
        ),
        (
            "One Pair",
            [Card::new(Rank::Nine, Suit::Spades), Card::new(Rank::Nine, Suit::Hearts)],
            [
                Card::new(Rank::King, Suit::Diamonds),
                Card::new(Rank::Seven, Suit::Clubs),
                Card::new(Rank::Four, Suit::Spades),
                Card::new(Rank::Two, Suit::Hearts),
                Card::new(Rank::Nine, Suit::Diamonds),
            ],
        ),
        (
            "High Card",
            [Card::new(Rank::Ace, Suit::Spades), Card::new(Rank::Queen, Suit::Hearts)],
            [
                Card::new(Rank::Ten, Suit::Diamonds),
                Card::new(Rank::Seven, Suit::Clubs),
                Card::new(Rank::Three, Suit::Spades),
                Card::new(Rank::Two, Suit::Hearts),
                Card::new(Rank::Nine, Suit::Diamonds),
            ],
        ),
    ];

    for (name, hole, board) in examples {
        let evaluation = evaluate(hole, &board);
        println!("{name}: {}", evaluation.category);
    }

    println!("\n=== End of Hand Evaluation Example ===");
}
