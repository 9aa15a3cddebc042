//! Exhaustive enumeration of minimal terminal dealer hands.
//!
//! The search walks a mixed-radix counter over card positions: fill forward
//! with ace-high 11 while the running total is below the stand threshold,
//! then back off with an odometer decrement (pop trailing 1s, decrement the
//! new last card). Every minimal terminal sequence is visited exactly once;
//! a lone card reaching 0 ends the sweep.

use std::collections::HashSet;

use crate::model::hand::{ACE_HIGH, ACE_LOW, DealerHand};
use thiserror::Error;

/// Smallest stand threshold with a meaningful enumeration.
pub const MIN_STAND_AT: u8 = 4;
/// Largest stand threshold: a hand can never stand above 21.
pub const MAX_STAND_AT: u8 = 21;

/// Largest standing total.
const MAX_STANDING_TOTAL: u32 = 21;
/// Candidate window ceiling: totals above this never record, not even as
/// busts (they back off immediately).
const MAX_CANDIDATE_TOTAL: u32 = 26;

/// Odometer steps far beyond the worst case for any valid threshold. The
/// counter visits well under 20M states at `stand_at = 21`.
const STEP_GUARD: u64 = 100_000_000;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EnumerateError {
    #[error("stand threshold {0} outside supported range {MIN_STAND_AT}..={MAX_STAND_AT}")]
    InvalidThreshold(u8),
    #[error("enumeration exceeded {0} odometer steps; termination invariant broken")]
    GuardExceeded(u64),
}

/// Iterator over every recorded minimal terminal sequence for one stand
/// threshold. Owns its counter state and yields owned hands, so no mutable
/// buffer is shared with callers. Duplicate suppression and ordering are
/// applied by [`enumerate_hands`].
#[derive(Debug)]
pub struct HandSequences {
    stand_at: u8,
    current: Vec<u8>,
    steps: u64,
    finished: bool,
}

impl HandSequences {
    pub fn new(stand_at: u8) -> Result<Self, EnumerateError> {
        if !(MIN_STAND_AT..=MAX_STAND_AT).contains(&stand_at) {
            return Err(EnumerateError::InvalidThreshold(stand_at));
        }
        Ok(Self {
            stand_at,
            current: vec![ACE_HIGH],
            steps: 0,
            finished: false,
        })
    }

    /// Odometer decrement: pop trailing 1s (the carry), then decrement the
    /// new last card. A lone 1 becomes 0, the termination signal.
    fn step_down(&mut self) {
        while self.current.len() >= 2 && self.current.last() == Some(&ACE_LOW) {
            self.current.pop();
        }
        match self.current.as_mut_slice() {
            [only] if *only == ACE_LOW => *only = 0,
            [.., last] if *last >= 2 => *last -= 1,
            _ => {}
        }
    }
}

impl Iterator for HandSequences {
    type Item = Result<DealerHand, EnumerateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let Some((&last, prefix)) = self.current.split_last() else {
                self.finished = true;
                return None;
            };
            if prefix.is_empty() && last == 0 {
                self.finished = true;
                return None;
            }

            self.steps += 1;
            if self.steps > STEP_GUARD {
                self.finished = true;
                return Some(Err(EnumerateError::GuardExceeded(STEP_GUARD)));
            }

            let prefix_total: u32 = prefix.iter().map(|&card| u32::from(card)).sum();
            let total = prefix_total + u32::from(last);

            if total < u32::from(self.stand_at) {
                self.current.push(ACE_HIGH);
                continue;
            }

            if total <= MAX_CANDIDATE_TOTAL {
                // Record iff the threshold is crossed exactly at the last
                // card, and the sequence is not a bust ending in an ace-high
                // (that path re-enters the set through rank reduction).
                let minimal = prefix_total < u32::from(self.stand_at);
                let bust_on_ace_high = total > MAX_STANDING_TOTAL && last == ACE_HIGH;
                let hand = (minimal && !bust_on_ace_high)
                    .then(|| DealerHand::new(self.current.clone()));
                self.step_down();
                if let Some(hand) = hand {
                    return Some(Ok(hand));
                }
                continue;
            }

            // Total of 27+ overshoots the candidate window entirely.
            self.step_down();
        }
    }
}

/// Enumerate the complete, duplicate-free set of minimal terminal hands for
/// a stand threshold, sorted descending lexicographically for determinism.
pub fn enumerate_hands(stand_at: u8) -> Result<Vec<DealerHand>, EnumerateError> {
    let mut seen = HashSet::new();
    let mut hands = Vec::new();
    for sequence in HandSequences::new(stand_at)? {
        let hand = sequence?;
        if seen.insert(hand.clone()) {
            hands.push(hand);
        }
    }
    hands.sort_by(|a, b| b.cards().cmp(a.cards()));
    Ok(hands)
}

#[cfg(test)]
mod tests {
    use super::{EnumerateError, enumerate_hands};
    use crate::model::hand::DealerHand;
    use crate::model::outcome::Outcome;
    use std::collections::HashSet;

    #[test]
    fn rejects_degenerate_thresholds() {
        assert_eq!(enumerate_hands(0), Err(EnumerateError::InvalidThreshold(0)));
        assert_eq!(enumerate_hands(3), Err(EnumerateError::InvalidThreshold(3)));
        assert_eq!(
            enumerate_hands(22),
            Err(EnumerateError::InvalidThreshold(22))
        );
    }

    #[test]
    fn covers_every_standing_total_and_busts_at_17() {
        let hands = enumerate_hands(17).expect("enumerates");
        for total in 17..=21 {
            assert!(
                hands
                    .iter()
                    .any(|hand| hand.outcome(17) == Some(Outcome::Total(total))),
                "no hand standing at {total}"
            );
        }
        assert!(hands.iter().any(|hand| hand.outcome(17) == Some(Outcome::Bust)));
    }

    #[test]
    fn every_hand_is_minimal() {
        let hands = enumerate_hands(17).expect("enumerates");
        assert!(hands.iter().all(|hand| hand.is_minimal(17)));
    }

    #[test]
    fn no_duplicates_and_deterministic() {
        let first = enumerate_hands(17).expect("enumerates");
        let second = enumerate_hands(17).expect("enumerates");
        assert_eq!(first, second);

        let unique: HashSet<_> = first.iter().cloned().collect();
        assert_eq!(unique.len(), first.len());
    }

    #[test]
    fn sorted_descending_lexicographically() {
        let hands = enumerate_hands(17).expect("enumerates");
        assert!(
            hands
                .windows(2)
                .all(|pair| pair[0].cards() > pair[1].cards())
        );
        assert_eq!(hands.first().map(DealerHand::cards), Some(&[11, 10][..]));
    }

    #[test]
    fn double_ace_soft_twenty_two_is_excluded() {
        let hands = enumerate_hands(17).expect("enumerates");
        assert!(!hands.contains(&DealerHand::new(vec![11, 11])));
        // More generally: no recorded bust ends in an ace-high.
        assert!(
            hands
                .iter()
                .filter(|hand| hand.outcome(17) == Some(Outcome::Bust))
                .all(|hand| hand.cards().last() != Some(&11))
        );
    }

    #[test]
    fn known_sequences_present_at_17() {
        let hands = enumerate_hands(17).expect("enumerates");
        assert!(hands.contains(&DealerHand::new(vec![7, 10])));
        assert!(hands.contains(&DealerHand::new(vec![11, 5, 1])));
        assert!(hands.contains(&DealerHand::new(vec![10, 6, 10])));
    }

    #[test]
    fn threshold_twenty_one_still_terminates_with_hands() {
        let hands = enumerate_hands(21).expect("enumerates");
        assert!(hands.contains(&DealerHand::new(vec![11, 10])));
        assert!(hands.iter().all(|hand| hand.is_minimal(21)));
    }

    #[test]
    fn minimum_threshold_enumerates() {
        let hands = enumerate_hands(4).expect("enumerates");
        assert!(hands.contains(&DealerHand::new(vec![11])));
        assert!(hands.iter().all(|hand| hand.is_minimal(4)));
    }
}
