//! Five-dice poker ranking and comparison.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::templates::{kind_suffix, render, HandTemplates};

/// Hand categories, weakest first so the derived `Ord` is the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HandRank {
    HighCard,
    Pair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    FullHouse,
    FourOfAKind,
    FiveOfAKind,
}

impl HandRank {
    /// Numeric rank, 0 (high card) through 7 (five of a kind).
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Fixed English name used in round announcements.
    pub fn name(self) -> &'static str {
        match self {
            Self::FiveOfAKind => "Five of a Kind",
            Self::FourOfAKind => "Four of a Kind",
            Self::FullHouse => "Full House",
            Self::Straight => "Straight",
            Self::ThreeOfAKind => "Three of a Kind",
            Self::TwoPair => "Two Pair",
            Self::Pair => "Pair",
            Self::HighCard => "High Card",
        }
    }
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An evaluated poker hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PokerHand {
    pub rank: HandRank,
    /// Rendered from the [`HandTemplates`] in effect at evaluation time.
    pub description: String,
    /// Compared element-wise when ranks are equal.
    pub tiebreak: Vec<u8>,
    /// Face values in roll order.
    pub dice: Vec<u8>,
}

impl PokerHand {
    /// `[a,b,c,d,e]` in roll order.
    pub fn dice_string(&self) -> String {
        let parts: Vec<String> = self.dice.iter().map(u8::to_string).collect();
        format!("[{}]", parts.join(","))
    }
}

/// Who won a player-versus-dealer round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    PlayerWins,
    DealerWins,
    Tie,
}

/// Ranks five face values.
pub fn evaluate_poker(values: &[u8], templates: &HandTemplates) -> PokerHand {
    let dice = values.to_vec();
    let mut sorted = dice.clone();
    sorted.sort_unstable();

    let hand = |rank, description: String, tiebreak| PokerHand {
        rank,
        description,
        tiebreak,
        dice: dice.clone(),
    };

    match sorted.as_slice() {
        [1, 2, 3, 4, 5] => return hand(HandRank::Straight, templates.low_straight.clone(), vec![5]),
        [2, 3, 4, 5, 6] => return hand(HandRank::Straight, templates.high_straight.clone(), vec![6]),
        _ => {}
    }

    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    for &value in &sorted {
        *counts.entry(value).or_default() += 1;
    }

    // Repeated faces, most copies first, then highest face.
    let mut groups: Vec<(usize, u8)> = counts
        .iter()
        .filter(|&(_, &n)| n > 1)
        .map(|(&value, &n)| (n, value))
        .collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));

    let mut kickers: Vec<u8> = counts
        .iter()
        .filter(|&(_, &n)| n == 1)
        .map(|(&value, _)| value)
        .collect();
    kickers.sort_unstable_by(|a, b| b.cmp(a));

    let pattern: Vec<usize> = groups.iter().map(|&(n, _)| n).collect();
    match (pattern.as_slice(), groups.as_slice()) {
        ([5], [(_, v)]) => hand(
            HandRank::FiveOfAKind,
            render(&templates.five_of_a_kind, &kind_suffix(*v)),
            vec![*v],
        ),
        ([4], [(_, v)]) => hand(
            HandRank::FourOfAKind,
            render(&templates.four_of_a_kind, &kind_suffix(*v)),
            vec![*v],
        ),
        ([3, 2], [(_, three), (_, pair)]) => hand(
            HandRank::FullHouse,
            render(
                &templates.full_house,
                &format!("{}{}", kind_suffix(*three), kind_suffix(*pair)),
            ),
            vec![*three, *pair],
        ),
        ([3], [(_, v)]) => hand(
            HandRank::ThreeOfAKind,
            render(&templates.three_of_a_kind, &kind_suffix(*v)),
            std::iter::once(*v).chain(kickers).collect(),
        ),
        ([2, 2], [(_, high), (_, low)]) => hand(
            HandRank::TwoPair,
            render(
                &templates.two_pair,
                &format!("{}{}", kind_suffix(*high), kind_suffix(*low)),
            ),
            vec![*high, *low, kickers.first().copied().unwrap_or(0)],
        ),
        ([2], [(_, v)]) => hand(
            HandRank::Pair,
            render(&templates.one_pair, &kind_suffix(*v)),
            std::iter::once(*v).chain(kickers).collect(),
        ),
        _ => {
            let mut tiebreak = dice.clone();
            tiebreak.sort_unstable_by(|a, b| b.cmp(a));
            hand(HandRank::HighCard, templates.nothing.clone(), tiebreak)
        }
    }
}

/// Rank first, then tie-break keys element-wise; the first difference decides.
pub fn compare_hands(player: &PokerHand, dealer: &PokerHand) -> Outcome {
    let ordering = player.rank.cmp(&dealer.rank).then_with(|| {
        player
            .tiebreak
            .iter()
            .zip(&dealer.tiebreak)
            .map(|(p, d)| p.cmp(d))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    match ordering {
        Ordering::Greater => Outcome::PlayerWins,
        Ordering::Less => Outcome::DealerWins,
        Ordering::Equal => Outcome::Tie,
    }
}

/// The closing line of a dealer round.
pub fn round_message(player: &PokerHand, dealer: &PokerHand) -> String {
    match compare_hands(player, dealer) {
        Outcome::PlayerWins => format!("{} beats {}, Player wins.", player.rank, dealer.rank),
        Outcome::DealerWins => format!("{} beats {}, Dealer wins.", dealer.rank, player.rank),
        Outcome::Tie => "Tie game.".to_string(),
    }
}
