//! Seeded Monte Carlo cross-check of the exact conditional distributions.
//!
//! Replays the dealer stand rule by sampling ranks from the draw table and
//! discards the sequences the enumerator excludes: busts ending in an
//! ace-high, and overshoots past the candidate window. The draw table
//! deliberately carries more than unit mass (both ace encodings), so
//! sampling normalizes it and each accepted trial is importance-weighted
//! by mass^len to restore the exact hand weights. Weighted conditional
//! frequencies are then compared cell-by-cell against the exact tables
//! with binomial z-scores.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use statrs::distribution::{ContinuousCDF, Normal};
use std::collections::BTreeMap;

use odds_core::model::hand::ACE_HIGH;
use odds_core::model::outcome::Outcome;
use odds_core::model::starting::StartingCard;
use odds_core::odds::{DrawTable, OddsTables};

/// Worst-cell |z| accepted before the check is reported inconsistent.
const MAX_ACCEPTED_Z: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub rounds: usize,
    pub seed: u64,
    pub accepted: usize,
    pub rejected: usize,
    pub cells: usize,
    pub max_z: f64,
    pub worst_p_value: f64,
}

impl SimulationReport {
    /// True when every cell's empirical frequency sits within the accepted
    /// band around the exact probability.
    pub fn consistent(&self) -> bool {
        self.max_z <= MAX_ACCEPTED_Z
    }
}

/// Run `rounds` seeded dealer hands against the exact tables.
pub fn run_simulation(
    draw: &DrawTable,
    exact: &OddsTables,
    rounds: usize,
    seed: u64,
) -> SimulationReport {
    let stand_at = exact.stand_at();
    let sampler = RankSampler::new(draw);
    if sampler.is_empty() {
        return SimulationReport {
            rounds,
            seed,
            accepted: 0,
            rejected: rounds,
            cells: 0,
            max_z: 0.0,
            worst_p_value: 1.0,
        };
    }
    let mut rng = StdRng::seed_from_u64(seed);

    let mut weighted_counts: BTreeMap<(StartingCard, Outcome), f64> = BTreeMap::new();
    let mut group_weight: BTreeMap<StartingCard, f64> = BTreeMap::new();
    let mut group_trials: BTreeMap<StartingCard, u64> = BTreeMap::new();
    let mut rejected = 0usize;

    for _ in 0..rounds {
        let first_card = sampler.sample(&mut rng);
        let Some(start) = StartingCard::from_first_card(first_card) else {
            rejected += 1;
            continue;
        };

        let mut total = u32::from(first_card);
        let mut last = first_card;
        let mut drawn = 1u32;
        while total < u32::from(stand_at) {
            last = sampler.sample(&mut rng);
            total += u32::from(last);
            drawn += 1;
        }

        // Mirror the enumerator's exclusions: a bust reached on an ace-high
        // re-enters the set through rank reduction, and totals past the
        // candidate window are never recorded.
        if total > 21 && (last == ACE_HIGH || total > 26) {
            rejected += 1;
            continue;
        }

        if let Some(outcome) = Outcome::classify(total, stand_at) {
            let weight = sampler.total_mass.powi(drawn as i32);
            *weighted_counts.entry((start, outcome)).or_insert(0.0) += weight;
            *group_weight.entry(start).or_insert(0.0) += weight;
            *group_trials.entry(start).or_insert(0) += 1;
        }
    }

    let accepted = rounds - rejected;
    let mut cells = 0usize;
    let mut max_z = 0.0f64;

    for &start in &StartingCard::ORDERED {
        let trials = group_trials.get(&start).copied().unwrap_or(0);
        let mass = group_weight.get(&start).copied().unwrap_or(0.0);
        if trials == 0 || mass <= 0.0 {
            continue;
        }
        let Some(distribution) = exact.distribution(start) else {
            continue;
        };
        for (outcome, p) in distribution.iter() {
            cells += 1;
            let observed = weighted_counts
                .get(&(start, outcome))
                .copied()
                .unwrap_or(0.0);
            let frequency = observed / mass;
            let z = cell_z(frequency, p, trials);
            max_z = max_z.max(z);
        }
    }

    let normal = Normal::new(0.0, 1.0).unwrap();
    let worst_p_value = (2.0 * (1.0 - normal.cdf(max_z))).clamp(0.0, 1.0);

    SimulationReport {
        rounds,
        seed,
        accepted,
        rejected,
        cells,
        max_z,
        worst_p_value,
    }
}

/// Binomial z-score of an empirical frequency against an exact probability.
/// The importance weights vary little across hand lengths, so the binomial
/// standard error over raw trials is an adequate scale.
fn cell_z(frequency: f64, p: f64, trials: u64) -> f64 {
    if p <= 0.0 || p >= 1.0 {
        // Degenerate cells: the empirical frequency must match exactly.
        return if (frequency - p).abs() < 1e-12 {
            0.0
        } else {
            f64::INFINITY
        };
    }
    let std_error = (p * (1.0 - p) / trials as f64).sqrt();
    (frequency - p).abs() / std_error
}

/// Cumulative sampler over the draw table's ranks, normalized for sampling.
struct RankSampler {
    cumulative: Vec<(u8, f64)>,
    total_mass: f64,
}

impl RankSampler {
    fn new(draw: &DrawTable) -> Self {
        let mut cumulative = Vec::new();
        let mut running = 0.0;
        for (rank, p) in draw.entries() {
            if p <= 0.0 {
                continue;
            }
            running += p;
            cumulative.push((rank, running));
        }
        Self {
            cumulative,
            total_mass: running,
        }
    }

    fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    fn sample(&self, rng: &mut StdRng) -> u8 {
        let roll: f64 = rng.gen_range(0.0..self.total_mass);
        for &(rank, bound) in &self.cumulative {
            if roll < bound {
                return rank;
            }
        }
        self.cumulative.last().map(|&(rank, _)| rank).unwrap_or(0)
    }
}
