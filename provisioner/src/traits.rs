//! Provisioner trait definitions for dependency injection

use std::collections::HashMap;
use std::time::Duration;
use async_trait::async_trait;

use shared::{CreationState, UserProfile, Username};
use crate::error::ProvisionerResult;
use crate::types::{AdminIdentity, CallStats, GroupMembershipRequest, PersonRequest, RemoteCall, RemoteResponse};

/// Local user-record store
#[mockall::automock]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Look up a profile by its unique username
    async fn find_by_username(&self, username: &Username) -> ProvisionerResult<Option<UserProfile>>;

    /// Record the creation state of a user; later lookups must see it
    async fn set_creation_state(&self, username: &Username, state: CreationState) -> ProvisionerResult<()>;
}

/// Authenticated caller against the remote repository
///
/// `Err` means the request never produced a response; any HTTP status,
/// including 4xx/5xx, comes back as `Ok`.
#[mockall::automock]
#[async_trait]
pub trait RemoteRepository: Send + Sync {
    /// Create a person as the given identity
    async fn create_person(&self, admin: &AdminIdentity, person: &PersonRequest) -> ProvisionerResult<RemoteResponse>;

    /// Add a member to an existing group as the given identity
    async fn create_group_membership(
        &self,
        admin: &AdminIdentity,
        group_id: &str,
        membership: &GroupMembershipRequest,
    ) -> ProvisionerResult<RemoteResponse>;
}

/// Remote call outcome tracking
#[mockall::automock]
#[async_trait]
pub trait OutcomeTracker: Send + Sync {
    /// Record a call that returned a success status
    async fn record_success(&self, call: RemoteCall, response_time: Duration) -> ProvisionerResult<()>;

    /// Record a call whose failure status was accepted (e.g. already exists)
    async fn record_tolerated(&self, call: RemoteCall, response_time: Duration) -> ProvisionerResult<()>;

    /// Record a failed call
    async fn record_failure(&self, call: RemoteCall, response_time: Duration) -> ProvisionerResult<()>;

    /// Get per-endpoint statistics
    async fn get_stats(&self) -> ProvisionerResult<HashMap<RemoteCall, CallStats>>;
}
