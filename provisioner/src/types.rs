//! Provisioner-specific data types

use std::fmt;
use serde::{Serialize, Deserialize};
use shared::{CreationState, EventResult, UserProfile, Username};

/// Member type sent with every group membership request
pub const MEMBER_TYPE_PERSON: &str = "PERSON";

/// Prefix the repository puts on group authority identifiers
pub const GROUP_AUTHORITY_PREFIX: &str = "GROUP_";

/// Administrative identity all remote calls are made as
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    pub username: String,
    pub password: String,
}

impl AdminIdentity {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for AdminIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminIdentity")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Body of a "create person" request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRequest {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl PersonRequest {
    /// Build the request for a resolved profile, keyed by `username`
    pub fn from_profile(username: &Username, profile: &UserProfile) -> Self {
        Self {
            id: username.to_string(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            email: profile.email.clone(),
            password: profile.password.clone(),
        }
    }
}

/// Body of a "create group membership" request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembershipRequest {
    pub id: String,
    pub member_type: String,
}

impl GroupMembershipRequest {
    pub fn person(username: &Username) -> Self {
        Self {
            id: username.to_string(),
            member_type: MEMBER_TYPE_PERSON.to_string(),
        }
    }
}

/// Remote group identifier for a configured group name
pub fn group_authority(group: &str) -> String {
    format!("{GROUP_AUTHORITY_PREFIX}{group}")
}

/// Status line and body of a remote response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

impl RemoteResponse {
    pub fn new(status: u16, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
            body: String::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_conflict(&self) -> bool {
        self.status == 409
    }
}

/// Classified outcome of one provisioning attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// Remote account created by this attempt
    Created,
    /// Remote account already existed and tolerant mode accepted it
    ExistingTolerated,
    /// Remote account already existed and tolerant mode is off
    RemoteConflict,
    /// Any other non-success status
    RemoteFailed { status: u16, reason: String },
    /// The request never produced a response
    TransportFailed { message: String },
    /// No local profile for the username
    LocalRecordNotFound,
    /// The local store could not be read
    LocalRecordUnavailable { message: String },
}

impl ProvisionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProvisionOutcome::Created | ProvisionOutcome::ExistingTolerated)
    }

    /// State persisted for this outcome, `None` when nothing is written
    pub fn creation_state(&self) -> Option<CreationState> {
        match self {
            ProvisionOutcome::Created | ProvisionOutcome::ExistingTolerated => Some(CreationState::Created),
            ProvisionOutcome::LocalRecordNotFound | ProvisionOutcome::LocalRecordUnavailable { .. } => None,
            _ => Some(CreationState::Failed),
        }
    }
}

/// Result of `provision()`: the event result plus the classified outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionResult {
    pub username: Username,
    pub outcome: ProvisionOutcome,
    pub event: EventResult,
    pub enrollment: EnrollmentReport,
}

impl ProvisionResult {
    pub fn is_success(&self) -> bool {
        self.event.success
    }
}

/// Which remote endpoint a call went to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemoteCall {
    CreatePerson,
    AddGroupMember,
}

impl fmt::Display for RemoteCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteCall::CreatePerson => write!(f, "create_person"),
            RemoteCall::AddGroupMember => write!(f, "add_group_member"),
        }
    }
}

/// Per-endpoint call statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallStats {
    pub total_calls: u64,
    pub successful_calls: u64,
    pub tolerated_calls: u64,
    pub failed_calls: u64,
    pub total_response_time_ms: u64,
    pub last_used: Option<i64>, // timestamp
}

impl CallStats {
    pub fn average_response_time_ms(&self) -> u64 {
        if self.total_calls == 0 {
            0
        } else {
            self.total_response_time_ms / self.total_calls
        }
    }
}

/// Outcome of one enrollment fanout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentReport {
    pub enrolled: Vec<String>,
    pub failed: Vec<String>,
}

impl EnrollmentReport {
    pub fn attempted(&self) -> usize {
        self.enrolled.len() + self.failed.len()
    }
}

/// Aggregate of a driver run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub created: u64,
    pub tolerated: u64,
    pub failed: u64,
    pub not_found: u64,
    /// Users whose local record could not be read; nothing was written for them
    #[serde(default)]
    pub unavailable: u64,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &ProvisionOutcome) {
        match outcome {
            ProvisionOutcome::Created => self.created += 1,
            ProvisionOutcome::ExistingTolerated => self.tolerated += 1,
            ProvisionOutcome::LocalRecordNotFound => self.not_found += 1,
            ProvisionOutcome::LocalRecordUnavailable { .. } => self.unavailable += 1,
            _ => self.failed += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.created + self.tolerated + self.failed + self.not_found + self.unavailable
    }
}
