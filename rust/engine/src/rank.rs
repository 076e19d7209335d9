use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::errors::GameError;
use crate::holder::{Board, Hand};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Category {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
    RoyalFlush = 9,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::HighCard => "High Card",
            Category::OnePair => "One Pair",
            Category::TwoPair => "Two Pair",
            Category::ThreeOfAKind => "Three of a Kind",
            Category::Straight => "Straight",
            Category::Flush => "Flush",
            Category::FullHouse => "Full House",
            Category::FourOfAKind => "Four of a Kind",
            Category::StraightFlush => "Straight Flush",
            Category::RoyalFlush => "Royal Flush",
        };
        f.write_str(name)
    }
}

/// The best five-card hand a player can make, with the cards that make it.
///
/// Ordering looks at the category and then the kickers, high to low; the
/// selected cards never take part, so equal strengths split a pot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandStrength {
    pub category: Category,
    // kickers: ordered high -> low for tiebreaks, zero padded
    pub kickers: [u8; 5],
    pub cards: [Card; 5],
}

impl PartialEq for HandStrength {
    fn eq(&self, other: &Self) -> bool {
        compare_hands(self, other) == Ordering::Equal
    }
}

impl Eq for HandStrength {}

impl PartialOrd for HandStrength {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HandStrength {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_hands(self, other)
    }
}

impl fmt::Display for HandStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.category)
    }
}

pub fn compare_hands(a: &HandStrength, b: &HandStrength) -> Ordering {
    match a.category.cmp(&b.category) {
        Ordering::Equal => a.kickers.cmp(&b.kickers),
        ord => ord,
    }
}

/// Ranks a player's hole cards against whatever part of the board is revealed.
pub fn best_hand(hand: &Hand, board: &Board) -> Result<HandStrength, GameError> {
    let mut cards = Vec::with_capacity(hand.len() + board.len());
    cards.extend_from_slice(hand.cards());
    cards.extend_from_slice(board.cards());
    evaluate_cards(&cards)
}

/// Tries every 5-card subset of `cards` (21 of them for 7 cards) and keeps the strongest.
pub fn evaluate_cards(cards: &[Card]) -> Result<HandStrength, GameError> {
    let n = cards.len();
    if n < 5 {
        return Err(GameError::NotEnoughCards { available: n });
    }

    let mut best: Option<HandStrength> = None;
    for a in 0..n {
        for b in a + 1..n {
            for c in b + 1..n {
                for d in c + 1..n {
                    for e in d + 1..n {
                        let five = [cards[a], cards[b], cards[c], cards[d], cards[e]];
                        let strength = evaluate_five(&five);
                        if best.as_ref().is_none_or(|current| strength > *current) {
                            best = Some(strength);
                        }
                    }
                }
            }
        }
    }
    best.ok_or(GameError::NotEnoughCards { available: n })
}

/// Ranks exactly five cards.
pub fn evaluate_five(cards: &[Card; 5]) -> HandStrength {
    let mut values: [u8; 5] = std::array::from_fn(|i| cards[i].rank.value());
    values.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = cards.iter().all(|c| c.suit == cards[0].suit);
    let straight = straight_high(&values);
    let groups = group_by_count(&values);

    // Five distinct ranks are needed for a straight and come free with a flush,
    // so neither can meet a paired hand.
    let (category, kickers) = match (straight, is_flush) {
        (Some(14), true) => (Category::RoyalFlush, [14, 0, 0, 0, 0]),
        (Some(high), true) => (Category::StraightFlush, [high, 0, 0, 0, 0]),
        (None, true) => (Category::Flush, values),
        (Some(high), false) => (Category::Straight, [high, 0, 0, 0, 0]),
        (None, false) => match groups.as_slice() {
            [(4, quad), (1, kicker)] => (Category::FourOfAKind, [*quad, *kicker, 0, 0, 0]),
            [(3, trip), (2, pair)] => (Category::FullHouse, [*trip, *pair, 0, 0, 0]),
            [(3, trip), (1, k1), (1, k2)] => (Category::ThreeOfAKind, [*trip, *k1, *k2, 0, 0]),
            [(2, high), (2, low), (1, k)] => (Category::TwoPair, [*high, *low, *k, 0, 0]),
            [(2, pair), (1, k1), (1, k2), (1, k3)] => {
                (Category::OnePair, [*pair, *k1, *k2, *k3, 0])
            }
            _ => (Category::HighCard, values),
        },
    };

    HandStrength {
        category,
        kickers,
        cards: *cards,
    }
}

// `values` sorted high -> low. A-2-3-4-5 is matched explicitly because the
// ace counts as 1 there; the straight's high card is then the five.
fn straight_high(values: &[u8; 5]) -> Option<u8> {
    let distinct = values.windows(2).all(|w| w[0] != w[1]);
    if !distinct {
        return None;
    }
    if values[0] - values[4] == 4 {
        return Some(values[0]);
    }
    if *values == [14, 5, 4, 3, 2] {
        return Some(5);
    }
    None
}

// (count, rank) pairs, biggest group first, higher rank first within a size.
fn group_by_count(values: &[u8; 5]) -> Vec<(u8, u8)> {
    let mut groups: Vec<(u8, u8)> = Vec::with_capacity(5);
    for &v in values {
        match groups.iter_mut().find(|(_, r)| *r == v) {
            Some((count, _)) => *count += 1,
            None => groups.push((1, v)),
        }
    }
    groups.sort_unstable_by(|a, b| b.cmp(a));
    groups
}
