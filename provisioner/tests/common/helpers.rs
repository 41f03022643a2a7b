//! Test helpers and builder patterns for provisioner tests
//!
//! Builders start from mocks that reject every call, so a test only passes
//! if it declares each remote call and state write it expects.

use std::sync::Arc;
use shared::UserProfile;
use provisioner::*;
use super::fixtures::TestFixtures;

/// Type alias for a processor with mocked store and repository
pub type TestProcessor = UserProvisioningProcessor<MockUserStore, MockRemoteRepository, RealOutcomeTracker>;

/// Builder pattern for creating test processors
pub struct ProcessorBuilder {
    user_store: MockUserStore,
    repository: MockRemoteRepository,
    tracker: Arc<RealOutcomeTracker>,
    user_groups: String,
    ignore_existing_users: bool,
}

impl ProcessorBuilder {
    pub fn new() -> Self {
        Self {
            user_store: MockUserStore::new(),
            repository: MockRemoteRepository::new(),
            tracker: Arc::new(RealOutcomeTracker::new()),
            user_groups: String::new(),
            ignore_existing_users: false,
        }
    }

    /// Make the store resolve `profile` for its username
    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        let expected = profile.username.clone();
        self.user_store
            .expect_find_by_username()
            .withf(move |username| *username == expected)
            .returning(move |_| Ok(Some(profile.clone())));
        self
    }

    pub fn with_store<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockUserStore),
    {
        setup(&mut self.user_store);
        self
    }

    pub fn with_repository<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockRemoteRepository),
    {
        setup(&mut self.repository);
        self
    }

    pub fn with_groups(mut self, spec: &str) -> Self {
        self.user_groups = spec.to_string();
        self
    }

    pub fn with_ignore_existing_users(mut self, ignore: bool) -> Self {
        self.ignore_existing_users = ignore;
        self
    }

    pub fn tracker(&self) -> Arc<RealOutcomeTracker> {
        self.tracker.clone()
    }

    pub fn build(self) -> TestProcessor {
        let policy = GroupAssignmentPolicy::parse(Some(self.user_groups.as_str())).unwrap();
        UserProvisioningProcessor::new(
            Arc::new(self.user_store),
            Arc::new(self.repository),
            self.tracker,
            TestFixtures::admin(),
            Arc::new(policy),
        )
        .with_ignore_existing_users(self.ignore_existing_users)
    }
}

impl Default for ProcessorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper functions for common mock setups
pub struct TestHelpers;

impl TestHelpers {
    /// Expect exactly one creation call answered with `response`
    pub fn expect_create(repository: &mut MockRemoteRepository, response: RemoteResponse) {
        repository
            .expect_create_person()
            .withf(|admin, _| admin.username == TestFixtures::ADMIN_USERNAME)
            .times(1)
            .returning(move |_, _| Ok(response.clone()));
    }

    /// Expect exactly one state write of `state`
    pub fn expect_state(store: &mut MockUserStore, state: shared::CreationState) {
        store
            .expect_set_creation_state()
            .withf(move |_, written| *written == state)
            .times(1)
            .returning(|_, _| Ok(()));
    }
}
