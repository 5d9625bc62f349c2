//! One check run: discover → derive targets → sample → probe.

use anchorprobe_core::types::derive_targets;
use anchorprobe_core::{AddressFilter, ProbeResults};
use anchorprobe_discover::{DirectorySource, DiscoveryCache};

use crate::engine::ProbeEngine;
use crate::error::Result;
use crate::prober::Prober;
use crate::sample::{sample_targets, SampleSize};

/// What to probe in a single run.
#[derive(Debug, Clone, Copy)]
pub struct CheckPlan {
    pub filter: AddressFilter,
    pub size: SampleSize,
}

/// Execute a single check run against the cached anchor list.
pub async fn run_check<S, P>(
    cache: &mut DiscoveryCache<S>,
    engine: &ProbeEngine<P>,
    plan: &CheckPlan,
) -> Result<ProbeResults>
where
    S: DirectorySource,
    P: Prober,
{
    let endpoints = cache.get_endpoints().await?;
    let pool = derive_targets(endpoints, plan.filter);
    let count = plan.size.resolve(pool.len())?;
    let targets = sample_targets(&pool, count)?;

    tracing::info!(
        endpoints = endpoints.len(),
        available = pool.len(),
        sampled = targets.len(),
        max_parallel = engine.max_parallel(),
        "Starting probe run"
    );

    let results = engine.run(targets).await;

    for target in results.unreachable() {
        tracing::debug!(target = %target, "Target unreachable");
    }

    Ok(results)
}
