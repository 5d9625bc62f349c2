//! anchorprobe-check: Reachability checks against discovered anchors.
//!
//! Samples targets from the cached anchor list, probes them over HTTP
//! under a fixed concurrency cap, and summarizes the outcome as a
//! report and a pass/fail threshold.

pub mod engine;
pub mod error;
pub mod prober;
pub mod report;
pub mod run;
pub mod sample;

pub use engine::ProbeEngine;
pub use error::CheckError;
pub use prober::{HttpProber, Prober};
pub use report::OutputFormat;
pub use run::{run_check, CheckPlan};
pub use sample::SampleSize;
