//! Core domain types for anchor discovery and reachability probing.
//!
//! These types flow from the directory client through the local cache
//! to the probe engine and the final report.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

// ── Endpoint ──────────────────────────────────────────────────────

/// A discoverable anchor node as reported by the directory.
///
/// Either address may be missing. An endpoint without any address
/// yields no probe targets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Endpoint {
    pub id: u64,
    #[serde(default)]
    pub address_v4: Option<String>,
    #[serde(default)]
    pub address_v6: Option<String>,
}

impl Endpoint {
    pub fn new(id: u64, address_v4: Option<&str>, address_v6: Option<&str>) -> Self {
        Self {
            id,
            address_v4: address_v4.map(String::from),
            address_v6: address_v6.map(String::from),
        }
    }

    /// The dialable IPv4 target, if this endpoint has a v4 address.
    pub fn v4_target(&self) -> Option<Target> {
        non_empty(&self.address_v4).map(Target::new)
    }

    /// The dialable IPv6 target (bracketed), if this endpoint has a v6 address.
    pub fn v6_target(&self) -> Option<Target> {
        non_empty(&self.address_v6).map(|addr| Target::new(format!("[{addr}]")))
    }

    /// Whether at least one address is usable as a probe target.
    pub fn is_probeable(&self) -> bool {
        self.v4_target().is_some() || self.v6_target().is_some()
    }

    /// Targets for this endpoint allowed by `filter`, IPv4 first.
    pub fn targets(&self, filter: AddressFilter) -> Vec<Target> {
        let mut out = Vec::with_capacity(2);
        if filter.allows_v4() {
            out.extend(self.v4_target());
        }
        if filter.allows_v6() {
            out.extend(self.v6_target());
        }
        out
    }
}

fn non_empty(addr: &Option<String>) -> Option<&str> {
    addr.as_deref().filter(|a| !a.is_empty())
}

/// Flatten endpoints into the ordered list of probe targets.
pub fn derive_targets(endpoints: &[Endpoint], filter: AddressFilter) -> Vec<Target> {
    endpoints.iter().flat_map(|e| e.targets(filter)).collect()
}

/// Which address families to derive targets from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressFilter {
    #[default]
    Any,
    V4Only,
    V6Only,
}

impl AddressFilter {
    pub fn allows_v4(self) -> bool {
        !matches!(self, Self::V6Only)
    }

    pub fn allows_v6(self) -> bool {
        !matches!(self, Self::V4Only)
    }
}

// ── Target ────────────────────────────────────────────────────────

/// An address literal ready for dialing: `192.0.2.1` or `[2001:db8::1]`.
///
/// Host-and-port forms (`127.0.0.1:8080`) are accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Target(String);

impl Target {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL requested by a reachability probe.
    pub fn probe_url(&self) -> String {
        format!("http://{}/", self.0)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Cache Snapshot ────────────────────────────────────────────────

/// The persisted discovery result: capture time plus endpoints.
///
/// Serialized as `{"time": <unix seconds>, "anchors": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheSnapshot {
    /// Unix seconds at the moment discovery began.
    #[serde(rename = "time")]
    pub captured_at: f64,
    #[serde(rename = "anchors")]
    pub endpoints: Vec<Endpoint>,
}

impl CacheSnapshot {
    pub fn new(captured_at: f64, endpoints: Vec<Endpoint>) -> Self {
        Self {
            captured_at,
            endpoints,
        }
    }

    pub fn empty() -> Self {
        Self::new(0.0, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn age_secs(&self, now: f64) -> f64 {
        now - self.captured_at
    }

    /// A snapshot is stale once its age reaches `ttl_secs`.
    pub fn is_stale(&self, now: f64, ttl_secs: u64) -> bool {
        self.age_secs(now) >= ttl_secs as f64
    }

    /// Rewrite a capture time from the future to `now - ttl_secs`.
    ///
    /// Returns true if the timestamp was corrected.
    pub fn expire_if_future(&mut self, now: f64, ttl_secs: u64) -> bool {
        if self.captured_at > now {
            self.captured_at = now - ttl_secs as f64;
            true
        } else {
            false
        }
    }
}

/// Current wall-clock time as fractional unix seconds.
pub fn unix_now() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

// ── Probe Results ─────────────────────────────────────────────────

/// Final reachability outcome per target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResults(HashMap<Target, bool>);

impl ProbeResults {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, target: &Target) -> Option<bool> {
        self.0.get(target).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Target, bool)> {
        self.0.iter().map(|(t, ok)| (t, *ok))
    }

    /// Targets that failed their probe, sorted for stable output.
    pub fn unreachable(&self) -> Vec<&Target> {
        let mut out: Vec<&Target> = self
            .0
            .iter()
            .filter(|(_, ok)| !**ok)
            .map(|(t, _)| t)
            .collect();
        out.sort();
        out
    }

    pub fn summary(&self) -> Summary {
        Summary {
            ok: self.0.values().filter(|ok| **ok).count(),
            total: self.0.len(),
        }
    }
}

impl From<HashMap<Target, bool>> for ProbeResults {
    fn from(map: HashMap<Target, bool>) -> Self {
        Self(map)
    }
}

/// Reachable and total target counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub ok: usize,
    pub total: usize,
}

impl Summary {
    /// Percentage of reachable targets, or `None` when nothing was probed.
    pub fn percent(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(100.0 * self.ok as f64 / self.total as f64)
        }
    }
}

// ── Count Spec ────────────────────────────────────────────────────

/// A count given either as an absolute number or a fraction of a pool.
///
/// Parsed from `"10"` or `"50%"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CountSpec {
    Absolute(usize),
    /// Always within `0.0..=1.0`.
    Fraction(f64),
}

impl CountSpec {
    /// Resolve against a pool of `pool` items. Fractions round down.
    pub fn resolve(&self, pool: usize) -> usize {
        match *self {
            Self::Absolute(n) => n,
            // Nudge before flooring so 29% of 100 resolves to 29, not 28.
            Self::Fraction(f) => (f * pool as f64 + 1e-9).floor() as usize,
        }
    }

    /// Resolve a sample size, rejecting absolute counts larger than the pool.
    pub fn resolve_within(&self, pool: usize) -> Result<usize> {
        let n = self.resolve(pool);
        if n > pool {
            return Err(CoreError::NotEnoughTargets {
                requested: n,
                available: pool,
            });
        }
        Ok(n)
    }
}

impl FromStr for CountSpec {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self> {
        let invalid = || CoreError::InvalidCount {
            value: value.to_string(),
        };
        let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

        if all_digits(value) {
            return value.parse().map(Self::Absolute).map_err(|_| invalid());
        }

        match value.strip_suffix('%') {
            Some(pct) if all_digits(pct) => {
                let pct: u64 = pct.parse().map_err(|_| invalid())?;
                if pct > 100 {
                    return Err(CoreError::PercentOutOfRange {
                        value: value.to_string(),
                    });
                }
                Ok(Self::Fraction(pct as f64 / 100.0))
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for CountSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute(n) => write!(f, "{n}"),
            Self::Fraction(frac) => write!(f, "{}%", (frac * 100.0).round()),
        }
    }
}
