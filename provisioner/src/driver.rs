//! Batch driver: delivers usernames to the processor with bounded concurrency

use std::collections::HashSet;
use std::sync::Arc;
use futures_util::stream::{self, StreamExt};

use shared::{run_debug, run_info, Username};
use crate::core::UserProvisioningProcessor;
use crate::error::{ProvisionerError, ProvisionerResult};
use crate::traits::{OutcomeTracker, RemoteRepository, UserStore};
use crate::types::{ProvisionResult, RunSummary};

/// Driver with dependency injection
///
/// Each username is delivered at most once per run, so concurrent
/// invocations of the processor never share a username.
pub struct ProvisioningDriver<S, R, T>
where
    S: UserStore,
    R: RemoteRepository,
    T: OutcomeTracker,
{
    processor: Arc<UserProvisioningProcessor<S, R, T>>,
    concurrency: usize,
}

impl<S, R, T> ProvisioningDriver<S, R, T>
where
    S: UserStore,
    R: RemoteRepository,
    T: OutcomeTracker,
{
    pub fn new(processor: Arc<UserProvisioningProcessor<S, R, T>>, concurrency: usize) -> ProvisionerResult<Self> {
        if concurrency == 0 {
            return Err(ProvisionerError::invalid_configuration("concurrency must be at least 1"));
        }
        Ok(Self { processor, concurrency })
    }

    pub fn processor(&self) -> &UserProvisioningProcessor<S, R, T> {
        &self.processor
    }

    /// Provision every distinct username and return the per-user results
    pub async fn run_all(&self, usernames: Vec<Username>) -> Vec<ProvisionResult> {
        let batch = Self::dedup(usernames);
        run_info!("Provisioning {} users with concurrency {}", batch.len(), self.concurrency);

        stream::iter(batch)
            .map(|username| {
                let processor = self.processor.clone();
                async move { processor.provision(&username).await }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }

    /// Provision every distinct username and summarize the outcomes
    pub async fn run(&self, usernames: Vec<Username>) -> RunSummary {
        let mut summary = RunSummary::default();
        for result in self.run_all(usernames).await {
            summary.record(&result.outcome);
        }
        run_info!(
            "Run finished: {} created, {} tolerated, {} failed, {} without local record, {} unreadable",
            summary.created,
            summary.tolerated,
            summary.failed,
            summary.not_found,
            summary.unavailable
        );
        summary
    }

    fn dedup(usernames: Vec<Username>) -> Vec<Username> {
        let mut seen = HashSet::with_capacity(usernames.len());
        let total = usernames.len();
        let batch: Vec<Username> = usernames
            .into_iter()
            .filter(|username| seen.insert(username.clone()))
            .collect();
        if batch.len() < total {
            run_debug!("Dropped {} duplicate usernames", total - batch.len());
        }
        batch
    }
}
