//! Provisioner configuration

use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::core::GroupAssignmentPolicy;
use crate::error::{ProvisionerError, ProvisionerResult};
use crate::types::AdminIdentity;

/// Settings shared by every provisioning attempt of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionerConfig {
    /// Repository server base URL, e.g. `http://localhost:8080`
    pub base_url: String,
    pub admin: AdminIdentity,
    /// Treat "user already exists" as success
    #[serde(default)]
    pub ignore_existing_users: bool,
    /// Group-chance specification; must be set, may be empty
    pub user_groups: Option<String>,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_concurrency() -> usize {
    8
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl ProvisionerConfig {
    pub fn new(base_url: impl Into<String>, admin: AdminIdentity) -> Self {
        Self {
            base_url: base_url.into(),
            admin,
            ignore_existing_users: false,
            user_groups: Some(String::new()),
            concurrency: default_concurrency(),
            timeout_ms: default_timeout_ms(),
        }
    }

    pub fn with_user_groups(mut self, user_groups: Option<String>) -> Self {
        self.user_groups = user_groups;
        self
    }

    pub fn with_ignore_existing_users(mut self, ignore_existing_users: bool) -> Self {
        self.ignore_existing_users = ignore_existing_users;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Reject settings that would only fail later, per user
    pub fn validate(&self) -> ProvisionerResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ProvisionerError::invalid_configuration("base URL must be set"));
        }
        if self.admin.username.is_empty() || self.admin.password.is_empty() {
            return Err(ProvisionerError::invalid_configuration(
                "admin username and password must be set",
            ));
        }
        if self.concurrency == 0 {
            return Err(ProvisionerError::invalid_configuration("concurrency must be at least 1"));
        }
        if self.timeout_ms == 0 {
            return Err(ProvisionerError::invalid_configuration("timeout must be positive"));
        }
        self.group_policy().map(|_| ())
    }

    /// Build the group policy from the configured specification
    pub fn group_policy(&self) -> ProvisionerResult<GroupAssignmentPolicy> {
        GroupAssignmentPolicy::parse(self.user_groups.as_deref())
    }
}
