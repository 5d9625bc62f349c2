//! Single-target reachability checks.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use anchorprobe_core::config::ProbeConfig;
use anchorprobe_core::Target;

use crate::error::Result;

/// A one-shot reachability check. Never fails: every error means unreachable.
#[async_trait]
pub trait Prober: Send + Sync + 'static {
    async fn probe(&self, target: &Target) -> bool;
}

#[async_trait]
impl<P: Prober> Prober for Arc<P> {
    async fn probe(&self, target: &Target) -> bool {
        (**self).probe(target).await
    }
}

/// Plain `GET http://<target>/` with a fixed timeout and no retries.
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: &Target) -> bool {
        match self.client.get(target.probe_url()).send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                tracing::debug!(target = %target, status = %resp.status(), "Probe got error status");
                false
            }
            Err(e) => {
                tracing::debug!(
                    target = %target,
                    timeout = e.is_timeout(),
                    error = %e,
                    "Probe failed"
                );
                false
            }
        }
    }
}
