//! End-to-end check runs with an in-process directory and prober.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use anchorprobe_check::report::{self, OutputFormat};
use anchorprobe_check::{run_check, CheckError, CheckPlan, ProbeEngine, Prober, SampleSize};
use anchorprobe_core::{AddressFilter, CountSpec, CoreError, Endpoint, Summary, Target};
use anchorprobe_discover::error::Result as DiscoverResult;
use anchorprobe_discover::{DirectorySource, DiscoverError, DiscoveryCache};

struct StaticDirectory {
    endpoints: Vec<Endpoint>,
}

#[async_trait]
impl DirectorySource for StaticDirectory {
    async fn fetch_all(&self) -> DiscoverResult<Vec<Endpoint>> {
        Ok(self.endpoints.clone())
    }
}

struct UnreachableDirectory;

#[async_trait]
impl DirectorySource for UnreachableDirectory {
    async fn fetch_all(&self) -> DiscoverResult<Vec<Endpoint>> {
        Err(DiscoverError::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "directory unreachable",
        )))
    }
}

/// Every IPv4 target is reachable, every IPv6 target is not.
#[derive(Default)]
struct V4OnlyNetwork {
    calls: AtomicUsize,
}

#[async_trait]
impl Prober for V4OnlyNetwork {
    async fn probe(&self, target: &Target) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        !target.as_str().starts_with('[')
    }
}

fn anchors(n: u64) -> Vec<Endpoint> {
    (0..n)
        .map(|i| {
            Endpoint::new(
                i,
                Some(format!("198.51.{}.{}", i / 256, i % 256).as_str()),
                Some(format!("2001:db8::{i:x}").as_str()),
            )
        })
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn count_ten_from_pool_of_hundred() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = DiscoveryCache::new(
        StaticDirectory { endpoints: anchors(100) },
        dir.path().join("anchors.json"),
        3600,
    );
    let network = Arc::new(V4OnlyNetwork::default());
    let engine = ProbeEngine::new(network.clone(), 20);
    let plan = CheckPlan {
        filter: AddressFilter::V4Only,
        size: SampleSize::Count(CountSpec::Absolute(10)),
    };

    let results = run_check(&mut cache, &engine, &plan).await.unwrap();

    assert_eq!(results.len(), 10);
    assert_eq!(network.calls.load(Ordering::SeqCst), 10);
    assert_eq!(
        report::render(&results.summary(), OutputFormat::CountTotal),
        "10 10"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn mixed_families_report_partial_reachability() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = DiscoveryCache::new(
        StaticDirectory { endpoints: anchors(5) },
        dir.path().join("anchors.json"),
        3600,
    );
    let engine = ProbeEngine::new(V4OnlyNetwork::default(), 3);
    let plan = CheckPlan {
        filter: AddressFilter::Any,
        size: SampleSize::All,
    };

    let results = run_check(&mut cache, &engine, &plan).await.unwrap();
    let summary = results.summary();

    assert_eq!(summary, Summary { ok: 5, total: 10 });
    assert_eq!(report::render(&summary, OutputFormat::Percent), "50.00");
    assert!(results
        .unreachable()
        .iter()
        .all(|t| t.as_str().starts_with('[')));
}

#[tokio::test]
async fn count_larger_than_pool_is_rejected_before_probing() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = DiscoveryCache::new(
        StaticDirectory { endpoints: anchors(3) },
        dir.path().join("anchors.json"),
        3600,
    );
    let network = Arc::new(V4OnlyNetwork::default());
    let engine = ProbeEngine::new(network.clone(), 4);
    let plan = CheckPlan {
        filter: AddressFilter::V6Only,
        size: SampleSize::Count(CountSpec::Absolute(4)),
    };

    let result = run_check(&mut cache, &engine, &plan).await;

    assert!(matches!(
        result,
        Err(CheckError::Core(CoreError::NotEnoughTargets {
            requested: 4,
            available: 3
        }))
    ));
    assert_eq!(network.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cold_cache_without_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = DiscoveryCache::new(UnreachableDirectory, dir.path().join("anchors.json"), 3600);
    let engine = ProbeEngine::new(V4OnlyNetwork::default(), 4);
    let plan = CheckPlan {
        filter: AddressFilter::Any,
        size: SampleSize::All,
    };

    let result = run_check(&mut cache, &engine, &plan).await;
    assert!(matches!(result, Err(CheckError::Discover(_))));
}

#[test]
fn half_threshold_with_four_of_ten_fails() {
    let summary = Summary { ok: 4, total: 10 };
    let threshold: CountSpec = "50%".parse().unwrap();
    assert!(!report::passes(&summary, &threshold));
}
