//! Best-effort group enrollment for newly created users

use std::sync::Arc;
use std::time::Instant;

use shared::{run_debug, run_info, run_warn, Username};
use crate::traits::{OutcomeTracker, RemoteRepository};
use crate::types::{group_authority, AdminIdentity, EnrollmentReport, GroupMembershipRequest, RemoteCall};

/// Adds a user to each selected group, isolating per-group failures
///
/// Groups must already exist on the repository; a missing group shows up
/// as a failed membership call and is only logged.
pub struct GroupEnrollmentFanout<R, T>
where
    R: RemoteRepository,
    T: OutcomeTracker,
{
    repository: Arc<R>,
    tracker: Arc<T>,
    admin: Arc<AdminIdentity>,
}

impl<R, T> GroupEnrollmentFanout<R, T>
where
    R: RemoteRepository,
    T: OutcomeTracker,
{
    pub fn new(repository: Arc<R>, tracker: Arc<T>, admin: Arc<AdminIdentity>) -> Self {
        Self { repository, tracker, admin }
    }

    /// Attempt every membership in turn; never fails
    pub async fn enroll(&self, username: &Username, groups: &[String]) -> EnrollmentReport {
        let mut report = EnrollmentReport::default();
        let membership = GroupMembershipRequest::person(username);

        for group in groups {
            if self.add_member(username, group, &membership).await {
                report.enrolled.push(group.clone());
            } else {
                report.failed.push(group.clone());
            }
        }

        if !report.failed.is_empty() {
            run_debug!(
                "Enrollment for {} finished with {} of {} groups failed",
                username,
                report.failed.len(),
                report.attempted()
            );
        }
        report
    }

    async fn add_member(&self, username: &Username, group: &str, membership: &GroupMembershipRequest) -> bool {
        let group_id = group_authority(group);
        let started = Instant::now();
        let result = self
            .repository
            .create_group_membership(&self.admin, &group_id, membership)
            .await;
        let elapsed = started.elapsed();

        match result {
            Ok(response) if response.is_success() => {
                run_info!("User: {} added to group: {}", username, group);
                self.track(self.tracker.record_success(RemoteCall::AddGroupMember, elapsed).await);
                true
            }
            Ok(response) => {
                run_warn!(
                    "FAILED to add user: {} to group: {} (status {} {}). Make sure this group exists on the repository",
                    username,
                    group,
                    response.status,
                    response.reason
                );
                self.track(self.tracker.record_failure(RemoteCall::AddGroupMember, elapsed).await);
                false
            }
            Err(e) => {
                run_warn!("Error adding user: {} to group: {}: {}", username, group, e);
                self.track(self.tracker.record_failure(RemoteCall::AddGroupMember, elapsed).await);
                false
            }
        }
    }

    fn track(&self, result: crate::error::ProvisionerResult<()>) {
        if let Err(e) = result {
            run_debug!("Outcome tracking failed: {}", e);
        }
    }
}
