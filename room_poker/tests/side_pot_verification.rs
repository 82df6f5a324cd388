//! Side pot distribution tests: a short-stacked all-in seat must never be
//! able to win chips beyond what it was eligible to contest, and a folded
//! seat's contribution must still count toward pot amounts even though it
//! can never be a winner.

use rand::SeedableRng;
use rand::rngs::StdRng;
use room_poker::action::{ActionKind, HandEvent};
use room_poker::cards::{Card, Deck, Rank, Suit};
use room_poker::room::{Hand, Phase, Room, Seat};
use room_poker::state_machine::apply;
use std::collections::BTreeSet;

fn board() -> Vec<Card> {
    vec![
        Card::new(Rank::Two, Suit::Clubs),
        Card::new(Rank::Seven, Suit::Diamonds),
        Card::new(Rank::Nine, Suit::Hearts),
        Card::new(Rank::Jack, Suit::Spades),
        Card::new(Rank::King, Suit::Clubs),
    ]
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(1234)
}

#[test]
fn short_all_in_stack_never_wins_more_than_the_pot_it_was_eligible_for() {
    let mut room = Room::new(1, "table".into(), "alice".into(), 6, 20, None);
    room.seats.push(Seat::new("alice".into(), "alice".into(), 15));
    room.seats.push(Seat::new("bob".into(), "bob".into(), 650));
    room.seats.push(Seat::new("carol".into(), "carol".into(), 650));
    for (seat, hole) in room.seats.iter_mut().zip([
        [Card::new(Rank::Ace, Suit::Hearts), Card::new(Rank::Ace, Suit::Spades)],
        [Card::new(Rank::King, Suit::Hearts), Card::new(Rank::King, Suit::Spades)],
        [Card::new(Rank::Queen, Suit::Hearts), Card::new(Rank::Queen, Suit::Spades)],
    ]) {
        seat.hole_cards = hole.to_vec();
    }

    let mut rng = rng();
    let (mut room, _) = apply(room, HandEvent::StartHand, &mut rng).unwrap();
    // alice's 15 chips are short of the 20 min bet, so whichever blind she's
    // dealt immediately puts her all-in for less than a full big blind.

    let mut bet_on_flop = false;
    let mut bet_on_turn = false;
    loop {
        let Some(hand) = room.hand.clone() else { break };
        let Some(seat) = hand.current_turn else { break };
        let to_call = hand.current_bet.saturating_sub(room.seats[seat].round_committed);
        let kind = if to_call > 0 {
            ActionKind::Call
        } else if hand.phase == Phase::Flop && !bet_on_flop {
            bet_on_flop = true;
            ActionKind::Bet { amount: 50 }
        } else if hand.phase == Phase::Turn && !bet_on_turn {
            bet_on_turn = true;
            ActionKind::Bet { amount: 50 }
        } else {
            ActionKind::Check
        };
        let (next, _) = apply(room, HandEvent::Action { seat, kind }, &mut rng).unwrap();
        room = next;
    }

    assert!(!room.hand_in_progress(), "hand should have reached showdown");
    assert_eq!(room.hand.as_ref().unwrap().phase, Phase::Showdown);
    let total: u32 = room.seats.iter().map(|s| s.chips).sum();
    assert_eq!(total, 15 + 650 + 650, "no chips may appear or vanish across the hand");

    // alice staked only 15 chips' worth of eligibility (the main pot, level
    // 15 x 3 contenders = 45); she can never collect any of the side pot
    // bob and carol built on top of that with their flop/turn bets.
    assert!(
        room.seats[0].chips <= 45,
        "a short all-in stack must not win chips from a pot it wasn't eligible for, got {}",
        room.seats[0].chips
    );
}

#[test]
fn a_folded_seats_contribution_still_funds_the_pot_but_cannot_win_it() {
    let mut room = Room::new(1, "table".into(), "xavier".into(), 6, 20, None);
    let mut xavier = Seat::new("xavier".into(), "xavier".into(), 150);
    xavier.folded = true;
    xavier.hand_committed = 50;
    let mut yolanda = Seat::new("yolanda".into(), "yolanda".into(), 0);
    yolanda.all_in = true;
    yolanda.hand_committed = 100;
    let mut zack = Seat::new("zack".into(), "zack".into(), 50);
    zack.hand_committed = 100;

    // At showdown, xavier's hole cards are irrelevant (folded); give
    // yolanda and zack hands the evaluator can actually score.
    yolanda.hole_cards = vec![Card::new(Rank::Ace, Suit::Clubs), Card::new(Rank::Ace, Suit::Diamonds)];
    zack.hole_cards = vec![Card::new(Rank::Two, Suit::Hearts), Card::new(Rank::Three, Suit::Spades)];

    room.seats = vec![xavier, yolanda, zack];
    room.hand = Some(Hand {
        phase: Phase::River,
        community: board(),
        deck: Deck::new(&mut rng()),
        pot: 250,
        current_bet: 0,
        last_aggressor: None,
        acted: BTreeSet::new(),
        dealer_seat: 0,
        min_bet: 20,
        last_raise_increment: 20,
        current_turn: Some(2), // zack is the only seat left owing action
    });

    let (room, outcomes) = apply(room, HandEvent::Action { seat: 2, kind: ActionKind::Check }, &mut rng()).unwrap();

    assert!(outcomes.contains(&room_poker::action::HandOutcome::HandEnded));
    assert_eq!(room.seats[0].chips, 150, "a folded seat never receives any part of the pot it funded");
    let total: u32 = room.seats.iter().map(|s| s.chips).sum();
    assert_eq!(total, 150 + 0 + 50 + 250, "folded contribution must still be conserved in the distributed pot");
}
