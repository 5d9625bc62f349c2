//! Target sampling.

use rand::seq::IndexedRandom;
use rand::Rng;

use anchorprobe_core::{CountSpec, CoreError, Target};

use crate::error::Result;

/// How many targets to probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleSize {
    /// Every available target.
    All,
    /// An explicit count or percentage.
    Count(CountSpec),
    /// Configured default percentage of the pool.
    DefaultPercent(u8),
}

impl SampleSize {
    pub fn from_flags(all: bool, count: Option<CountSpec>, default_percent: u8) -> Self {
        match (all, count) {
            (true, _) => Self::All,
            (false, Some(spec)) => Self::Count(spec),
            (false, None) => Self::DefaultPercent(default_percent),
        }
    }

    /// Resolve to an absolute count for a pool of `pool` targets.
    pub fn resolve(&self, pool: usize) -> Result<usize> {
        let n = match self {
            Self::All => pool,
            Self::Count(spec) => spec.resolve_within(pool)?,
            Self::DefaultPercent(pct) => {
                CountSpec::Fraction(f64::from(*pct).min(100.0) / 100.0).resolve(pool)
            }
        };
        Ok(n)
    }
}

/// Uniform random sample of `k` distinct targets, in no particular order.
pub fn sample_targets(pool: &[Target], k: usize) -> Result<Vec<Target>> {
    sample_targets_with(pool, k, &mut rand::rng())
}

pub fn sample_targets_with<R: Rng + ?Sized>(
    pool: &[Target],
    k: usize,
    rng: &mut R,
) -> Result<Vec<Target>> {
    if k > pool.len() {
        return Err(CoreError::NotEnoughTargets {
            requested: k,
            available: pool.len(),
        }
        .into());
    }
    Ok(pool.choose_multiple(rng, k).cloned().collect())
}
