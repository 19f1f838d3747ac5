//! Monte Carlo estimation of the natural duration of a voyage.
//!
//! Each simulated run advances in fixed 20-second ticks, draining
//! antimatter through ordinary activity and randomized hazards until the
//! pool empties or the safety cap is reached. Repeating the run thousands
//! of times yields a duration distribution whose percentiles are surfaced
//! as the estimate. The maximum sample is what the log store compares an
//! observed voyage against when flagging it as extended.

use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sha2::Sha256;

use crate::constants::{
    AM_PER_ACTIVITY, DEFAULT_SIMULATIONS, HAZARD_AM_FAIL, HAZARD_AM_PASS, HAZARD_ODDS_TABLE_LEN,
    HAZARD_TICK, REWARD_TICK, SECONDS_PER_TICK, SKILL_INC_PER_HAZARD, TICK_SAFETY_CAP,
    TICKS_BETWEEN_DILEMMAS,
};
use crate::skills::{SkillId, SkillSet, combined_odds};

/// Percentile summary over a sorted sample of simulated durations.
///
/// All durations are in seconds and are multiples of the tick length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Estimate {
    /// Every simulated duration, sorted ascending.
    pub samples: Vec<u32>,
    /// 50th percentile.
    pub median: u32,
    /// 10th percentile; the duration nine in ten runs exceed.
    pub safe: u32,
    /// 1st percentile.
    pub safer: u32,
    /// 99th percentile.
    pub moonshot: u32,
    /// Shortest simulated run.
    pub min: u32,
    /// Longest simulated run.
    pub max: u32,
}

/// Configurable Monte Carlo duration estimator.
///
/// The default estimator draws its randomness from entropy; [`Estimator::seeded`]
/// produces reproducible distributions for tests and analysis.
#[derive(Debug, Clone)]
pub struct Estimator {
    simulations: usize,
    seed: Option<u64>,
}

impl Default for Estimator {
    fn default() -> Self {
        Self::new(DEFAULT_SIMULATIONS)
    }
}

impl Estimator {
    /// Entropy-seeded estimator running `simulations` runs per estimate.
    #[must_use]
    pub const fn new(simulations: usize) -> Self {
        Self {
            simulations,
            seed: None,
        }
    }

    /// Deterministic estimator; the same seed always yields the same
    /// distribution.
    #[must_use]
    pub const fn seeded(simulations: usize, seed: u64) -> Self {
        Self {
            simulations,
            seed: Some(seed),
        }
    }

    /// Number of simulation runs per estimate.
    #[must_use]
    pub const fn simulations(&self) -> usize {
        self.simulations
    }

    /// Estimate the natural duration distribution for a voyage starting
    /// with `start_am` antimatter and the given aggregate skills.
    #[must_use]
    pub fn estimate(
        &self,
        start_am: i32,
        primary: SkillId,
        secondary: SkillId,
        aggregates: &SkillSet,
    ) -> Estimate {
        let mut rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(derive_stream_seed(seed, b"voyage-sim")),
            None => SmallRng::from_entropy(),
        };
        self.estimate_with_rng(start_am, primary, secondary, aggregates, &mut rng)
    }

    /// Estimate against a caller-provided RNG stream.
    pub fn estimate_with_rng(
        &self,
        start_am: i32,
        primary: SkillId,
        secondary: SkillId,
        aggregates: &SkillSet,
        rng: &mut impl Rng,
    ) -> Estimate {
        let skills = aggregates.ordered(primary, secondary);
        let hazard_odds: Vec<f64> = (0..HAZARD_ODDS_TABLE_LEN)
            .map(|hazard| {
                let difficulty = (hazard as f64 + 1.0) * SKILL_INC_PER_HAZARD;
                combined_odds(difficulty, &skills)
            })
            .collect();

        let runs = self.simulations.max(1);
        let mut samples: Vec<u32> = (0..runs)
            .map(|_| simulate_run(start_am, &hazard_odds, rng))
            .collect();
        samples.sort_unstable();
        summarize(samples)
    }
}

/// One simulated voyage; returns the duration in seconds.
fn simulate_run(start_am: i32, hazard_odds: &[f64], rng: &mut impl Rng) -> u32 {
    let mut am = start_am;
    let mut tick: u32 = 0;
    let mut hazard_count: usize = 0;

    while am > 0 {
        tick += 1;
        if tick > TICK_SAFETY_CAP {
            break;
        }

        let hazard = tick % HAZARD_TICK == 0
            && tick % REWARD_TICK != 0
            && tick % TICKS_BETWEEN_DILEMMAS != 0;
        if hazard {
            let odds = hazard_odds.get(hazard_count).copied().unwrap_or(0.0);
            if rng.r#gen::<f64>() < odds {
                am += HAZARD_AM_PASS;
            } else {
                am -= HAZARD_AM_FAIL;
            }
            hazard_count += 1;
        } else if tick % TICKS_BETWEEN_DILEMMAS != 0 {
            // Ordinary activity drain; dilemma ticks consume nothing.
            am -= AM_PER_ACTIVITY;
        }
    }

    tick * SECONDS_PER_TICK
}

fn summarize(samples: Vec<u32>) -> Estimate {
    let n = samples.len();
    let median = samples[n / 2];
    let safe = samples[n / 10];
    let safer = samples[n / 100];
    let moonshot = samples[n - 1 - n / 100];
    let min = samples[0];
    let max = samples[n - 1];
    Estimate {
        samples,
        median,
        safe,
        safer,
        moonshot,
        min,
        max,
    }
}

/// Derive a per-domain RNG seed from a user-visible seed.
fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()).expect("64-bit seed is valid key");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let seed_bytes: [u8; 8] = digest[..8].try_into().expect("digest slice length");
    u64::from_le_bytes(seed_bytes)
}
