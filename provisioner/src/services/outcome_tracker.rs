//! Remote call outcome tracking implementation

use std::collections::HashMap;
use std::time::Duration;
use async_trait::async_trait;
use tokio::sync::RwLock;

use shared::run_debug;
use crate::error::ProvisionerResult;
use crate::traits::OutcomeTracker;
use crate::types::{CallStats, RemoteCall};

/// Real outcome tracker with in-memory statistics
#[derive(Clone, Default)]
pub struct RealOutcomeTracker {
    stats: std::sync::Arc<RwLock<HashMap<RemoteCall, CallStats>>>,
}

impl RealOutcomeTracker {
    /// Create new outcome tracker
    pub fn new() -> Self {
        Self::default()
    }

    async fn record<F>(&self, call: RemoteCall, response_time: Duration, bump: F)
    where
        F: FnOnce(&mut CallStats),
    {
        let mut stats = self.stats.write().await;
        let call_stats = stats.entry(call).or_default();

        call_stats.total_calls += 1;
        call_stats.total_response_time_ms += response_time.as_millis() as u64;
        call_stats.last_used = Some(chrono::Utc::now().timestamp());
        bump(call_stats);
    }
}

#[async_trait]
impl OutcomeTracker for RealOutcomeTracker {
    async fn record_success(&self, call: RemoteCall, response_time: Duration) -> ProvisionerResult<()> {
        self.record(call, response_time, |s| s.successful_calls += 1).await;
        run_debug!("Recorded success for {}: {}ms", call, response_time.as_millis());
        Ok(())
    }

    async fn record_tolerated(&self, call: RemoteCall, response_time: Duration) -> ProvisionerResult<()> {
        self.record(call, response_time, |s| s.tolerated_calls += 1).await;
        run_debug!("Recorded tolerated response for {}: {}ms", call, response_time.as_millis());
        Ok(())
    }

    async fn record_failure(&self, call: RemoteCall, response_time: Duration) -> ProvisionerResult<()> {
        self.record(call, response_time, |s| s.failed_calls += 1).await;
        run_debug!("Recorded failure for {}: {}ms", call, response_time.as_millis());
        Ok(())
    }

    async fn get_stats(&self) -> ProvisionerResult<HashMap<RemoteCall, CallStats>> {
        let stats = self.stats.read().await;
        Ok(stats.clone())
    }
}
