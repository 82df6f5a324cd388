//! The pure hand state machine (§4.C): given a `Room` and a `HandEvent`,
//! produce the next `Room` plus the outcomes that happened along the way.
//!
//! Nothing in here touches a clock, a socket, or storage — all of that is
//! the coordinator's job. `apply` either returns a new, valid `Room` or
//! leaves the caller's room untouched and returns a `ClientError`.

use crate::action::{ActionKind, HandEvent, HandOutcome};
use crate::cards::{Card, Deck};
use crate::errors::ClientError;
use crate::evaluator::evaluate;
use crate::room::{Chips, Hand, Phase, Room, RoomStatus, Seat, SeatIndex, SidePot};
use rand::Rng;

/// Apply one event to a room, returning the updated room and the outcomes
/// it produced. On a client error the room is returned unchanged by the
/// caller (this function never mutates its input in place; `room` is
/// consumed and a fresh value is returned only on success).
pub fn apply(
    room: Room,
    event: HandEvent,
    rng: &mut impl Rng,
) -> Result<(Room, Vec<HandOutcome>), ClientError> {
    match event {
        HandEvent::StartHand => start_hand(room, rng),
        HandEvent::Action { seat, kind } => apply_action(room, seat, kind),
        HandEvent::Timeout { seat } => apply_action(room, seat, ActionKind::Fold),
        HandEvent::Disconnect { seat } => {
            let mut room = room;
            set_connected(&mut room, seat, false)?;
            Ok((room, Vec::new()))
        }
        HandEvent::Reconnect { seat } => {
            let mut room = room;
            set_connected(&mut room, seat, true)?;
            Ok((room, Vec::new()))
        }
        HandEvent::ForceEnd => force_end(room),
    }
}

fn set_connected(room: &mut Room, seat: SeatIndex, connected: bool) -> Result<(), ClientError> {
    let seat = room
        .seats
        .get_mut(seat)
        .ok_or(ClientError::IllegalPhase)?;
    seat.connected = connected;
    Ok(())
}

/// Seats eligible to be dealt into a new hand, in seating order starting
/// just after `from` (exclusive), wrapping once around the table.
fn eligible_order(room: &Room, from: SeatIndex) -> Vec<SeatIndex> {
    let n = room.seats.len();
    if n == 0 {
        return Vec::new();
    }
    (1..=n)
        .map(|offset| (from + offset) % n)
        .filter(|&i| room.seats[i].chips > 0 && !room.seats[i].sitting_out)
        .collect()
}

fn start_hand(mut room: Room, rng: &mut impl Rng) -> Result<(Room, Vec<HandOutcome>), ClientError> {
    // A hand resting at `Showdown` (kept around only so its last snapshot
    // could be published) counts as no hand in progress for this check.
    let mid_hand = room
        .hand
        .as_ref()
        .is_some_and(|h| h.phase != Phase::Showdown);
    if mid_hand {
        return Err(ClientError::IllegalPhase);
    }
    let eligible = eligible_order(&room, room.dealer_cursor);
    if eligible.len() < 2 {
        return Err(ClientError::NotEnoughPlayers);
    }

    for seat in &mut room.seats {
        seat.reset_for_new_hand();
    }

    let dealer_seat = eligible[0];
    let heads_up = eligible.len() == 2;
    // Heads-up: the dealer posts the small blind and acts first preflop.
    // Otherwise: small blind is the next chipped seat clockwise from the
    // dealer, big blind is the one after that.
    let (small_blind_seat, big_blind_seat) = if heads_up {
        (dealer_seat, eligible[1])
    } else {
        (eligible[1], eligible[2 % eligible.len()])
    };

    room.seats[dealer_seat].is_dealer = true;
    room.seats[small_blind_seat].is_small_blind = true;
    room.seats[big_blind_seat].is_big_blind = true;
    room.dealer_cursor = dealer_seat;

    let mut deck = Deck::new(rng);
    for &seat in &eligible {
        let first = deck.deal().map_err(|_| ClientError::NotEnoughPlayers)?;
        let second = deck.deal().map_err(|_| ClientError::NotEnoughPlayers)?;
        room.seats[seat].hole_cards = vec![first, second];
        room.seats[seat].in_hand = true;
    }

    let big_blind_amount = room.min_bet;
    let small_blind_amount = room.min_bet / 2;
    let sb_posted = room.seats[small_blind_seat].commit(small_blind_amount);
    let bb_posted = room.seats[big_blind_seat].commit(big_blind_amount);
    let pot = sb_posted + bb_posted;

    // Normally the next chipped seat clockwise from the big blind (or the
    // dealer itself, heads-up). A blind so short it goes all-in posting
    // can leave that candidate already unable to act; skip forward to the
    // first seat that still owes action.
    let first_candidate_pos = if heads_up { 0 } else { 3 % eligible.len() };
    let first_to_act = (0..eligible.len())
        .map(|offset| eligible[(first_candidate_pos + offset) % eligible.len()])
        .find(|&s| room.seats[s].owes_action());

    let hand = Hand {
        phase: Phase::Preflop,
        community: Vec::new(),
        deck,
        pot,
        current_bet: bb_posted,
        last_aggressor: Some(big_blind_seat),
        acted: std::collections::BTreeSet::new(),
        dealer_seat,
        min_bet: big_blind_amount,
        last_raise_increment: big_blind_amount,
        current_turn: first_to_act,
    };
    room.hand = Some(hand);
    room.status = RoomStatus::Playing;
    room.updated_at = chrono::Utc::now();

    let mut outcomes = vec![HandOutcome::HandStarted];
    if first_to_act.is_none() {
        advance_to_showdown_runout(&mut room, &mut outcomes)?;
    }
    Ok((room, outcomes))
}

/// Deal out all remaining community cards (burning between streets, as in
/// any other all-in runout) and resolve the showdown immediately, used when
/// a hand begins with every chipped seat already all-in from the blinds.
fn advance_to_showdown_runout(
    room: &mut Room,
    outcomes: &mut Vec<HandOutcome>,
) -> Result<(), ClientError> {
    loop {
        let phase = room.hand.as_ref().expect("hand in progress").phase;
        let hand = room.hand.as_mut().expect("hand in progress");
        match phase {
            Phase::Preflop => {
                hand.deck.burn().map_err(|_| ClientError::IllegalPhase)?;
                for _ in 0..3 {
                    let card = hand.deck.deal().map_err(|_| ClientError::IllegalPhase)?;
                    hand.community.push(card);
                }
                hand.phase = Phase::Flop;
            }
            Phase::Flop | Phase::Turn => {
                hand.deck.burn().map_err(|_| ClientError::IllegalPhase)?;
                let card = hand.deck.deal().map_err(|_| ClientError::IllegalPhase)?;
                hand.community.push(card);
                hand.phase = if phase == Phase::Flop {
                    Phase::Turn
                } else {
                    Phase::River
                };
            }
            Phase::River => {
                hand.phase = Phase::Showdown;
            }
            Phase::Idle | Phase::Showdown => break,
        }
        if room.hand.as_ref().unwrap().phase == Phase::Showdown {
            break;
        }
    }
    resolve_showdown(room, outcomes)
}

fn apply_action(
    mut room: Room,
    seat: SeatIndex,
    kind: ActionKind,
) -> Result<(Room, Vec<HandOutcome>), ClientError> {
    {
        let hand = room.hand.as_ref().ok_or(ClientError::IllegalPhase)?;
        if hand.current_turn != Some(seat) {
            return Err(ClientError::NotYourTurn);
        }
    }
    if !room.seats[seat].owes_action() {
        return Err(ClientError::SeatCannotAct);
    }

    let min_bet = room.hand.as_ref().unwrap().min_bet;
    let current_bet = room.hand.as_ref().unwrap().current_bet;
    let to_call = current_bet.saturating_sub(room.seats[seat].round_committed);

    match kind {
        ActionKind::Fold => {
            room.seats[seat].folded = true;
        }
        ActionKind::Check => {
            if to_call > 0 {
                return Err(ClientError::CannotCheckFacingBet);
            }
        }
        ActionKind::Call => {
            let paid = room.seats[seat].commit(to_call);
            room.hand.as_mut().unwrap().pot += paid;
        }
        ActionKind::Bet { amount } => {
            if current_bet != 0 {
                return Err(ClientError::IllegalPhase);
            }
            if amount < min_bet || amount > room.seats[seat].chips {
                return Err(ClientError::BetBelowMinimum);
            }
            let paid = room.seats[seat].commit(amount);
            let hand = room.hand.as_mut().unwrap();
            hand.pot += paid;
            hand.current_bet = room.seats[seat].round_committed;
            hand.last_aggressor = Some(seat);
            hand.last_raise_increment = amount;
            hand.acted.clear();
        }
        ActionKind::Raise { amount } => {
            if current_bet == 0 {
                return Err(ClientError::IllegalPhase);
            }
            let last_increment = room.hand.as_ref().unwrap().last_raise_increment;
            let chips = room.seats[seat].chips;
            let going_all_in = to_call + amount >= chips;
            if amount < last_increment && !going_all_in {
                return Err(ClientError::InsufficientChipsForRaise);
            }
            // A raise that would need more than the seat has is capped at
            // the seat's stack rather than rejected — it becomes an all-in
            // for less than a full raise (§4.C).
            let owed = (to_call + amount).min(chips);
            let paid = room.seats[seat].commit(owed);
            let new_committed = room.seats[seat].round_committed;
            let hand = room.hand.as_mut().unwrap();
            hand.pot += paid;
            let increment = new_committed.saturating_sub(current_bet);
            if new_committed > current_bet && (!going_all_in || increment >= last_increment) {
                hand.current_bet = new_committed;
                hand.last_aggressor = Some(seat);
                hand.last_raise_increment = increment;
                hand.acted.clear();
            }
        }
        ActionKind::AllIn => {
            let shove = room.seats[seat].chips;
            let paid = room.seats[seat].commit(shove);
            let new_total = room.seats[seat].round_committed;
            let hand = room.hand.as_mut().unwrap();
            hand.pot += paid;
            if new_total > hand.current_bet {
                let increment = new_total - hand.current_bet;
                hand.current_bet = new_total;
                if increment >= hand.last_raise_increment {
                    hand.last_aggressor = Some(seat);
                    hand.last_raise_increment = increment;
                    hand.acted.clear();
                }
            }
        }
    }

    room.seats[seat].has_acted_this_round = true;
    room.hand.as_mut().unwrap().acted.insert(seat);
    room.updated_at = chrono::Utc::now();

    let mut outcomes = vec![HandOutcome::ActionApplied { seat, kind }];

    let remaining: Vec<SeatIndex> = room.non_folded_seats();
    if remaining.len() == 1 {
        let winner = remaining[0];
        return end_hand_uncontested(room, winner, outcomes);
    }

    if round_is_complete(&room) {
        advance_phase(&mut room, &mut outcomes)?;
    } else {
        room.hand.as_mut().unwrap().current_turn = next_to_act(&room);
    }

    Ok((room, outcomes))
}

fn round_is_complete(room: &Room) -> bool {
    let hand = room.hand.as_ref().expect("hand in progress");
    let active: Vec<SeatIndex> = room
        .seats
        .iter()
        .enumerate()
        .filter(|(_, s)| s.in_hand && !s.folded)
        .map(|(i, _)| i)
        .collect();
    let still_owe_action = active.iter().any(|&i| room.seats[i].owes_action());
    if !still_owe_action {
        return true;
    }
    active
        .iter()
        .filter(|&&i| room.seats[i].owes_action())
        .all(|&i| hand.acted.contains(&i) && room.seats[i].round_committed == hand.current_bet)
}

fn next_to_act(room: &Room) -> Option<SeatIndex> {
    let hand = room.hand.as_ref()?;
    let n = room.seats.len();
    let start = hand.current_turn.unwrap_or(hand.dealer_seat);
    (1..=n)
        .map(|offset| (start + offset) % n)
        .find(|&i| room.seats[i].owes_action())
}

fn advance_phase(room: &mut Room, outcomes: &mut Vec<HandOutcome>) -> Result<(), ClientError> {
    for seat in &mut room.seats {
        seat.reset_for_new_round();
    }
    let hand = room.hand.as_mut().expect("hand in progress");
    hand.current_bet = 0;
    hand.last_raise_increment = hand.min_bet;
    hand.last_aggressor = None;
    hand.acted.clear();

    let contenders = room
        .seats
        .iter()
        .filter(|s| s.in_hand && !s.folded && !s.all_in)
        .count();
    let all_in_runout = contenders < 2 && room.non_folded_seats().len() > 1;

    match hand.phase {
        Phase::Preflop => {
            hand.deck.burn().map_err(|_| ClientError::IllegalPhase)?;
            for _ in 0..3 {
                let card = hand.deck.deal().map_err(|_| ClientError::IllegalPhase)?;
                hand.community.push(card);
            }
            hand.phase = Phase::Flop;
        }
        Phase::Flop => {
            hand.deck.burn().map_err(|_| ClientError::IllegalPhase)?;
            let card = hand.deck.deal().map_err(|_| ClientError::IllegalPhase)?;
            hand.community.push(card);
            hand.phase = Phase::Turn;
        }
        Phase::Turn => {
            hand.deck.burn().map_err(|_| ClientError::IllegalPhase)?;
            let card = hand.deck.deal().map_err(|_| ClientError::IllegalPhase)?;
            hand.community.push(card);
            hand.phase = Phase::River;
        }
        Phase::River => {
            hand.phase = Phase::Showdown;
        }
        Phase::Idle | Phase::Showdown => return Err(ClientError::IllegalPhase),
    }

    if hand.phase == Phase::Showdown || all_in_runout {
        while room.hand.as_ref().unwrap().phase != Phase::Showdown {
            let hand = room.hand.as_mut().unwrap();
            match hand.phase {
                Phase::Flop => {
                    hand.deck.burn().map_err(|_| ClientError::IllegalPhase)?;
                    let card = hand.deck.deal().map_err(|_| ClientError::IllegalPhase)?;
                    hand.community.push(card);
                    hand.phase = Phase::Turn;
                }
                Phase::Turn => {
                    hand.deck.burn().map_err(|_| ClientError::IllegalPhase)?;
                    let card = hand.deck.deal().map_err(|_| ClientError::IllegalPhase)?;
                    hand.community.push(card);
                    hand.phase = Phase::River;
                }
                Phase::River => {
                    hand.phase = Phase::Showdown;
                }
                _ => break,
            }
        }
        return resolve_showdown(room, outcomes);
    }

    let dealer = hand.dealer_seat;
    room.hand.as_mut().unwrap().current_turn = next_to_act_from(room, dealer);
    outcomes.push(HandOutcome::PhaseAdvanced);
    Ok(())
}

fn next_to_act_from(room: &Room, dealer: SeatIndex) -> Option<SeatIndex> {
    let n = room.seats.len();
    (1..=n)
        .map(|offset| (dealer + offset) % n)
        .find(|&i| room.seats[i].owes_action())
}

fn resolve_showdown(room: &mut Room, outcomes: &mut Vec<HandOutcome>) -> Result<(), ClientError> {
    outcomes.push(HandOutcome::Showdown);
    let hand = room.hand.as_ref().expect("hand in progress");
    let community: Vec<Card> = hand.community.clone();
    let pot = hand.pot;

    let contenders: Vec<SeatIndex> = room.non_folded_seats();
    let pots = build_side_pots(room, &contenders);

    for side_pot in &pots {
        let mut best: Option<(SeatIndex, crate::evaluator::Evaluation)> = None;
        for &seat in &side_pot.eligible_seats {
            let hole = [room.seats[seat].hole_cards[0], room.seats[seat].hole_cards[1]];
            let eval = evaluate(hole, &community);
            best = match best {
                None => Some((seat, eval)),
                Some((best_seat, ref best_eval)) if eval.score > best_eval.score => {
                    Some((seat, eval))
                }
                Some(existing) => Some(existing),
            };
        }
        let winners: Vec<SeatIndex> = {
            let top_score = best.as_ref().map(|(_, e)| e.score.clone());
            side_pot
                .eligible_seats
                .iter()
                .copied()
                .filter(|&s| {
                    let hole = [room.seats[s].hole_cards[0], room.seats[s].hole_cards[1]];
                    Some(evaluate(hole, &community).score) == top_score
                })
                .collect()
        };
        distribute(room, side_pot.amount, &winners);
    }

    debug_assert_eq!(pots.iter().map(|p| p.amount).sum::<Chips>(), pot);

    // The hand is kept around (phase Showdown, pot drained to 0) rather than
    // cleared outright, so the snapshot published for `HandEnded` still
    // carries the revealed community cards and showdown hole cards (§4.E);
    // `start_hand` treats a resting `Showdown` hand the same as no hand at
    // all and overwrites it.
    if let Some(hand) = room.hand.as_mut() {
        hand.pot = 0;
        hand.current_turn = None;
        hand.last_aggressor = None;
    }
    let can_continue = reset_between_hands(room);
    outcomes.push(HandOutcome::HandEnded);
    if can_continue {
        outcomes.push(HandOutcome::WaitingForPlayers);
    }
    Ok(())
}

/// Split the pot into side pots from each contender's total hand
/// commitment, in ascending order of commitment level.
fn build_side_pots(room: &Room, contenders: &[SeatIndex]) -> Vec<SidePot> {
    let mut levels: Vec<Chips> = room
        .seats
        .iter()
        .filter(|s| s.hand_committed > 0)
        .map(|s| s.hand_committed)
        .collect();
    levels.sort_unstable();
    levels.dedup();

    let mut pots = Vec::new();
    let mut previous = 0;
    for level in levels {
        let eligible: Vec<SeatIndex> = contenders
            .iter()
            .copied()
            .filter(|&s| room.seats[s].hand_committed >= level)
            .collect();
        let contributors = room
            .seats
            .iter()
            .filter(|s| s.hand_committed >= level)
            .count() as Chips;
        let amount = (level - previous) * contributors;
        if amount > 0 && !eligible.is_empty() {
            pots.push(SidePot {
                amount,
                eligible_seats: eligible,
            });
        }
        previous = level;
    }
    pots
}

/// Pay `amount` to `winners`, splitting as evenly as possible. Any odd
/// chip left over goes to the first winner in seating order clockwise
/// from the dealer.
fn distribute(room: &mut Room, amount: Chips, winners: &[SeatIndex]) {
    if winners.is_empty() || amount == 0 {
        return;
    }
    let share = amount / winners.len() as Chips;
    let mut remainder = amount % winners.len() as Chips;
    let dealer = room.hand.as_ref().map(|h| h.dealer_seat).unwrap_or(0);
    let n = room.seats.len();
    let mut ordered = winners.to_vec();
    ordered.sort_by_key(|&s| (s + n - dealer) % n);
    for &seat in &ordered {
        let mut pay = share;
        if remainder > 0 {
            pay += 1;
            remainder -= 1;
        }
        room.seats[seat].chips += pay;
    }
}

fn end_hand_uncontested(
    mut room: Room,
    winner: SeatIndex,
    mut outcomes: Vec<HandOutcome>,
) -> Result<(Room, Vec<HandOutcome>), ClientError> {
    let pot = room.hand.as_ref().map(|h| h.pot).unwrap_or(0);
    room.seats[winner].chips += pot;
    room.hand = None;
    let can_continue = reset_between_hands(&mut room);
    outcomes.push(HandOutcome::HandEnded);
    if can_continue {
        outcomes.push(HandOutcome::WaitingForPlayers);
    }
    Ok((room, outcomes))
}

fn force_end(mut room: Room) -> Result<(Room, Vec<HandOutcome>), ClientError> {
    let mut outcomes = Vec::new();
    if room.hand.is_some() {
        let contenders = room.non_folded_seats();
        if contenders.len() <= 1 {
            let winner = contenders.first().copied();
            if let Some(winner) = winner {
                let (r, o) = end_hand_uncontested(room, winner, Vec::new())?;
                room = r;
                outcomes.extend(o);
            } else {
                room.hand = None;
            }
        } else {
            resolve_showdown(&mut room, &mut outcomes)?;
        }
    }
    // A forced end always closes the room, even if the hand's own resolution
    // thought enough chipped seats remained for another one.
    outcomes.retain(|o| !matches!(o, HandOutcome::WaitingForPlayers));
    room.status = RoomStatus::Finished;
    Ok((room, outcomes))
}

/// Sit out any seat whose stack fell below one big blind, then set the room
/// status for the interval until the next hand: `Finished` if fewer than two
/// seats still have chips and aren't sitting out, `Waiting` otherwise (§4.C).
/// Returns whether enough seats remain for another hand.
fn reset_between_hands(room: &mut Room) -> bool {
    let min_bet = room.min_bet;
    for seat in &mut room.seats {
        if seat.chips < min_bet {
            seat.sitting_out = true;
        }
    }
    let can_continue = room.chipped_seats().len() >= 2;
    room.status = if can_continue {
        RoomStatus::Waiting
    } else {
        RoomStatus::Finished
    };
    room.updated_at = chrono::Utc::now();
    can_continue
}
