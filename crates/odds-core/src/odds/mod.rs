//! Probability weighting and conditional aggregation of the enumerated
//! hand set into per-starting-card outcome distributions and expected
//! values.

pub mod serialization;

use std::collections::BTreeMap;

use crate::model::hand::DealerHand;
use crate::model::outcome::Outcome;
use crate::model::starting::StartingCard;

/// Per-rank draw probabilities, passed explicitly to [`aggregate`]. The
/// table is taken as given: it is never renormalized, and a rank absent
/// from it contributes a zero weight factor.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawTable {
    probabilities: BTreeMap<u8, f64>,
}

impl DrawTable {
    /// The fixed domain table: ranks 1-9 and 11 at 1/13 each, rank 10 at
    /// 4/13 (it aggregates four face values). Both ace encodings carry
    /// their own 1/13, so the table deliberately sums to 14/13; the
    /// per-group normalization in [`aggregate`] absorbs the surplus.
    pub fn standard() -> Self {
        let mut probabilities = BTreeMap::new();
        for rank in 1..=9u8 {
            probabilities.insert(rank, 1.0 / 13.0);
        }
        probabilities.insert(10, 4.0 / 13.0);
        probabilities.insert(11, 1.0 / 13.0);
        Self { probabilities }
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (u8, f64)>) -> Self {
        Self {
            probabilities: entries.into_iter().collect(),
        }
    }

    /// Draw probability for one rank; zero when the rank is unknown.
    pub fn probability(&self, rank: u8) -> f64 {
        self.probabilities.get(&rank).copied().unwrap_or(0.0)
    }

    /// All (rank, probability) entries in ascending rank order.
    pub fn entries(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.probabilities.iter().map(|(&rank, &p)| (rank, p))
    }

    /// Product of per-rank probabilities over every card, repeats included.
    pub fn hand_weight(&self, hand: &DealerHand) -> f64 {
        hand.iter()
            .map(|&card| self.probability(card))
            .product()
    }
}

/// Conditional outcome probabilities for one starting-card group. Every
/// total in `[stand_at, 21]` plus BUST is present as a key; for a group
/// with zero total weight all probabilities are 0.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeDistribution {
    probabilities: BTreeMap<Outcome, f64>,
}

impl OutcomeDistribution {
    pub fn probability(&self, outcome: Outcome) -> f64 {
        self.probabilities.get(&outcome).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Outcome, f64)> + '_ {
        self.probabilities.iter().map(|(&outcome, &p)| (outcome, p))
    }

    /// Probability-weighted mean of standing totals; BUST contributes
    /// nothing to the sum.
    pub fn expected_total(&self) -> f64 {
        self.iter()
            .filter_map(|(outcome, p)| outcome.total().map(|total| f64::from(total) * p))
            .sum()
    }
}

/// The aggregator's two outputs: per-starting-card conditional outcome
/// distributions and per-starting-card expected values.
#[derive(Debug, Clone, PartialEq)]
pub struct OddsTables {
    stand_at: u8,
    distributions: BTreeMap<StartingCard, OutcomeDistribution>,
    expected_values: BTreeMap<StartingCard, f64>,
}

impl OddsTables {
    pub fn stand_at(&self) -> u8 {
        self.stand_at
    }

    pub fn distribution(&self, start: StartingCard) -> Option<&OutcomeDistribution> {
        self.distributions.get(&start)
    }

    pub fn distributions(&self) -> impl Iterator<Item = (StartingCard, &OutcomeDistribution)> {
        self.distributions.iter().map(|(&start, dist)| (start, dist))
    }

    pub fn expected_value(&self, start: StartingCard) -> f64 {
        self.expected_values.get(&start).copied().unwrap_or(0.0)
    }

    pub fn expected_values(&self) -> impl Iterator<Item = (StartingCard, f64)> {
        self.expected_values.iter().map(|(&start, &ev)| (start, ev))
    }

    /// Every outcome key carried by the distributions, in display order.
    pub fn outcome_keys(&self) -> Vec<Outcome> {
        outcome_keys(self.stand_at)
    }
}

/// All outcome buckets for a threshold: each total in `[stand_at, 21]`
/// then BUST.
pub fn outcome_keys(stand_at: u8) -> Vec<Outcome> {
    (u32::from(stand_at)..=21)
        .map(Outcome::Total)
        .chain(std::iter::once(Outcome::Bust))
        .collect()
}

/// Group the hand set by starting card, bucket by outcome, normalize each
/// group to conditional probabilities, and reduce to expected values.
pub fn aggregate(hands: &[DealerHand], draw: &DrawTable, stand_at: u8) -> OddsTables {
    let mut distributions = BTreeMap::new();
    let mut expected_values = BTreeMap::new();

    for &start in &StartingCard::ORDERED {
        let buckets = bucket_weights(hands, draw, stand_at, start);
        let group_total: f64 = buckets.values().sum();
        let probabilities = buckets
            .into_iter()
            .map(|(outcome, weight)| {
                let p = if group_total > 0.0 {
                    weight / group_total
                } else {
                    0.0
                };
                (outcome, p)
            })
            .collect();
        let distribution = OutcomeDistribution { probabilities };
        expected_values.insert(start, distribution.expected_total());
        distributions.insert(start, distribution);
    }

    OddsTables {
        stand_at,
        distributions,
        expected_values,
    }
}

/// Pre-normalization weight per outcome bucket for one starting-card group.
fn bucket_weights(
    hands: &[DealerHand],
    draw: &DrawTable,
    stand_at: u8,
    start: StartingCard,
) -> BTreeMap<Outcome, f64> {
    let mut buckets: BTreeMap<Outcome, f64> =
        outcome_keys(stand_at).into_iter().map(|o| (o, 0.0)).collect();
    for hand in hands {
        if hand.starting_card() != Some(start) {
            continue;
        }
        if let Some(outcome) = hand.outcome(stand_at) {
            *buckets.entry(outcome).or_insert(0.0) += draw.hand_weight(hand);
        }
    }
    buckets
}
