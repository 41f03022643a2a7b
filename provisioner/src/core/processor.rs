//! User provisioning event processor
//!
//! One call to [`UserProvisioningProcessor::provision`] handles one username:
//! resolve the local profile, create the person remotely as the admin
//! identity, classify the response, persist the terminal creation state and,
//! for freshly created users, enroll them into a random selection of groups.
//!
//! Per-username problems never escape as errors; they come back as a failed
//! [`ProvisionResult`]. Nothing is retried here.

use std::sync::Arc;
use std::time::{Duration, Instant};

use shared::{run_debug, run_error, run_info, run_warn, CreationState, EventResult, Username};
use crate::core::enrollment::GroupEnrollmentFanout;
use crate::core::group_policy::GroupAssignmentPolicy;
use crate::error::ProvisionerResult;
use crate::traits::{OutcomeTracker, RemoteRepository, UserStore};
use crate::types::{AdminIdentity, EnrollmentReport, PersonRequest, ProvisionOutcome, ProvisionResult, RemoteCall};

/// Processor with dependency injection
pub struct UserProvisioningProcessor<S, R, T>
where
    S: UserStore,
    R: RemoteRepository,
    T: OutcomeTracker,
{
    user_store: Arc<S>,
    repository: Arc<R>,
    tracker: Arc<T>,
    admin: Arc<AdminIdentity>,
    group_policy: Arc<GroupAssignmentPolicy>,
    enrollment: GroupEnrollmentFanout<R, T>,
    ignore_existing_users: bool,
}

impl<S, R, T> UserProvisioningProcessor<S, R, T>
where
    S: UserStore,
    R: RemoteRepository,
    T: OutcomeTracker,
{
    /// Create a processor; the admin identity and group policy are fixed for its lifetime
    pub fn new(
        user_store: Arc<S>,
        repository: Arc<R>,
        tracker: Arc<T>,
        admin: AdminIdentity,
        group_policy: Arc<GroupAssignmentPolicy>,
    ) -> Self {
        let admin = Arc::new(admin);
        let enrollment = GroupEnrollmentFanout::new(repository.clone(), tracker.clone(), admin.clone());

        Self {
            user_store,
            repository,
            tracker,
            admin,
            group_policy,
            enrollment,
            ignore_existing_users: false,
        }
    }

    /// Treat "user already exists" responses as success
    pub fn with_ignore_existing_users(mut self, ignore_existing_users: bool) -> Self {
        self.ignore_existing_users = ignore_existing_users;
        self
    }

    pub fn ignore_existing_users(&self) -> bool {
        self.ignore_existing_users
    }

    pub fn group_policy(&self) -> &GroupAssignmentPolicy {
        &self.group_policy
    }

    /// Execute one provisioning attempt for one username
    pub async fn provision(&self, username: &Username) -> ProvisionResult {
        let profile = match self.user_store.find_by_username(username).await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                run_warn!("User data not found in local database: {}", username);
                return Self::unresolved(username, ProvisionOutcome::LocalRecordNotFound);
            }
            Err(e) => {
                run_error!("User lookup failed for {}: {}", username, e);
                let outcome = ProvisionOutcome::LocalRecordUnavailable { message: e.to_string() };
                return Self::unresolved(username, outcome);
            }
        };

        let person = PersonRequest::from_profile(username, &profile);
        let outcome = self.create_person(&person).await;

        if let Some(state) = outcome.creation_state() {
            self.persist_state(username, state).await;
        }

        // Existing users keep whatever memberships they already have
        let enrollment = if outcome == ProvisionOutcome::Created {
            self.enroll_in_random_groups(username).await
        } else {
            EnrollmentReport::default()
        };

        let event = Self::describe(username, &outcome);
        if event.success {
            run_info!("{}", event.message);
        } else {
            run_warn!("{}", event.message);
        }

        ProvisionResult {
            username: username.clone(),
            outcome,
            event,
            enrollment,
        }
    }

    fn unresolved(username: &Username, outcome: ProvisionOutcome) -> ProvisionResult {
        ProvisionResult {
            username: username.clone(),
            event: Self::describe(username, &outcome),
            outcome,
            enrollment: EnrollmentReport::default(),
        }
    }

    /// Issue the creation call and classify the response
    async fn create_person(&self, person: &PersonRequest) -> ProvisionOutcome {
        let started = Instant::now();
        let result = self.repository.create_person(&self.admin, person).await;
        let elapsed = started.elapsed();

        match result {
            Ok(response) if response.is_success() => {
                self.track(RemoteCall::CreatePerson, elapsed, TrackAs::Success).await;
                ProvisionOutcome::Created
            }
            Ok(response) if response.is_conflict() && self.ignore_existing_users => {
                self.track(RemoteCall::CreatePerson, elapsed, TrackAs::Tolerated).await;
                ProvisionOutcome::ExistingTolerated
            }
            Ok(response) if response.is_conflict() => {
                self.track(RemoteCall::CreatePerson, elapsed, TrackAs::Failure).await;
                ProvisionOutcome::RemoteConflict
            }
            Ok(response) => {
                self.track(RemoteCall::CreatePerson, elapsed, TrackAs::Failure).await;
                ProvisionOutcome::RemoteFailed {
                    status: response.status,
                    reason: response.reason,
                }
            }
            Err(e) => {
                run_error!("Creating user {} failed before a response arrived: {}", person.id, e);
                self.track(RemoteCall::CreatePerson, elapsed, TrackAs::Failure).await;
                ProvisionOutcome::TransportFailed { message: e.to_string() }
            }
        }
    }

    async fn persist_state(&self, username: &Username, state: CreationState) {
        if let Err(e) = self.user_store.set_creation_state(username, state).await {
            run_error!("Failed to record creation state {} for {}: {}", state, username, e);
        }
    }

    async fn enroll_in_random_groups(&self, username: &Username) -> EnrollmentReport {
        let groups = self.group_policy.draw();
        if groups.is_empty() {
            return EnrollmentReport::default();
        }
        run_debug!("Enrolling {} into groups {:?}", username, groups);
        self.enrollment.enroll(username, &groups).await
    }

    async fn track(&self, call: RemoteCall, elapsed: Duration, kind: TrackAs) {
        let result: ProvisionerResult<()> = match kind {
            TrackAs::Success => self.tracker.record_success(call, elapsed).await,
            TrackAs::Tolerated => self.tracker.record_tolerated(call, elapsed).await,
            TrackAs::Failure => self.tracker.record_failure(call, elapsed).await,
        };
        if let Err(e) = result {
            run_debug!("Outcome tracking failed: {}", e);
        }
    }

    fn describe(username: &Username, outcome: &ProvisionOutcome) -> EventResult {
        match outcome {
            ProvisionOutcome::Created => EventResult::success(format!("User created in repository: {username}")),
            ProvisionOutcome::ExistingTolerated => EventResult::success(format!(
                "Ignoring existing user, already present in repository: {username}"
            )),
            ProvisionOutcome::RemoteConflict => EventResult::failure(format!(
                "Creating user {username} failed, REST-call resulted in status:409 (user already exists)"
            )),
            ProvisionOutcome::RemoteFailed { status, reason } => EventResult::failure(format!(
                "Creating user {username} failed, REST-call resulted in status:{status} with error {reason}"
            )),
            ProvisionOutcome::TransportFailed { message } => {
                EventResult::failure(format!("Creating user {username} failed: {message}"))
            }
            ProvisionOutcome::LocalRecordNotFound => {
                EventResult::failure(format!("User data not found in local database: {username}"))
            }
            ProvisionOutcome::LocalRecordUnavailable { message } => {
                EventResult::failure(format!("User data could not be read for {username}: {message}"))
            }
        }
    }
}

enum TrackAs {
    Success,
    Tolerated,
    Failure,
}
