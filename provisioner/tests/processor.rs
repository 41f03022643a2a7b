//! Tests for the user provisioning processor
//!
//! Remote calls and state writes go through mocks that reject anything
//! not declared, so each test also checks what did NOT happen.

mod common;
use common::{ProcessorBuilder, TestFixtures, TestHelpers};

use shared::CreationState;
use provisioner::{OutcomeTracker, ProvisionOutcome, ProvisionerError, RemoteCall, RemoteResponse};

#[tokio::test]
async fn test_unknown_user_short_circuits() {
    // Arrange: no remote or state expectations, any call would panic
    let processor = ProcessorBuilder::new()
        .with_store(|store| {
            store.expect_find_by_username().times(1).returning(|_| Ok(None));
            store.expect_set_creation_state().never();
        })
        .with_repository(|repository| {
            repository.expect_create_person().never();
            repository.expect_create_group_membership().never();
        })
        .build();

    // Act
    let result = processor.provision(&TestFixtures::username(TestFixtures::UNKNOWN_USER)).await;

    // Assert
    assert!(!result.is_success());
    assert_eq!(result.outcome, ProvisionOutcome::LocalRecordNotFound);
    assert!(result.event.message.contains(TestFixtures::UNKNOWN_USER));
}

#[tokio::test]
async fn test_store_lookup_error_writes_nothing() {
    let processor = ProcessorBuilder::new()
        .with_store(|store| {
            store.expect_find_by_username().returning(|_| {
                Err(ProvisionerError::UserStore { message: "offline".to_string() })
            });
            store.expect_set_creation_state().never();
        })
        .with_repository(|repository| {
            repository.expect_create_person().never();
        })
        .build();

    let result = processor.provision(&TestFixtures::username(TestFixtures::USER_1)).await;

    assert!(!result.is_success());
    assert!(matches!(result.outcome, ProvisionOutcome::LocalRecordUnavailable { .. }));
}

#[tokio::test]
async fn test_created_user_is_marked_created() {
    let builder = ProcessorBuilder::new()
        .with_profile(TestFixtures::profile(TestFixtures::USER_1))
        .with_store(|store| TestHelpers::expect_state(store, CreationState::Created))
        .with_repository(|repository| TestHelpers::expect_create(repository, TestFixtures::created()));
    let tracker = builder.tracker();
    let processor = builder.build();

    let result = processor.provision(&TestFixtures::username(TestFixtures::USER_1)).await;

    assert!(result.is_success());
    assert_eq!(result.outcome, ProvisionOutcome::Created);
    assert!(result.event.message.contains(TestFixtures::USER_1));
    assert_eq!(result.enrollment.attempted(), 0);

    let stats = tracker.get_stats().await.unwrap();
    assert_eq!(stats[&RemoteCall::CreatePerson].successful_calls, 1);
}

#[tokio::test]
async fn test_create_request_carries_profile() {
    let processor = ProcessorBuilder::new()
        .with_profile(TestFixtures::profile(TestFixtures::USER_2))
        .with_store(|store| TestHelpers::expect_state(store, CreationState::Created))
        .with_repository(|repository| {
            repository
                .expect_create_person()
                .withf(|_, person| {
                    person.id == TestFixtures::USER_2
                        && person.first_name == "Test"
                        && person.last_name == "User user.0002"
                        && person.email == "user.0002@example.com"
                        && person.password == "password"
                })
                .times(1)
                .returning(|_, _| Ok(TestFixtures::created()));
        })
        .build();

    let result = processor.provision(&TestFixtures::username(TestFixtures::USER_2)).await;
    assert!(result.is_success());
}

#[tokio::test]
async fn test_any_2xx_counts_as_created() {
    let processor = ProcessorBuilder::new()
        .with_profile(TestFixtures::profile(TestFixtures::USER_1))
        .with_store(|store| TestHelpers::expect_state(store, CreationState::Created))
        .with_repository(|repository| TestHelpers::expect_create(repository, RemoteResponse::new(200, "OK")))
        .build();

    let result = processor.provision(&TestFixtures::username(TestFixtures::USER_1)).await;
    assert_eq!(result.outcome, ProvisionOutcome::Created);
}

#[tokio::test]
async fn test_conflict_tolerated_when_ignoring_existing_users() {
    let builder = ProcessorBuilder::new()
        .with_groups("A:1.0")
        .with_ignore_existing_users(true)
        .with_profile(TestFixtures::profile(TestFixtures::USER_1))
        .with_store(|store| TestHelpers::expect_state(store, CreationState::Created))
        .with_repository(|repository| {
            TestHelpers::expect_create(repository, TestFixtures::conflict());
            // Existing users are not enrolled again
            repository.expect_create_group_membership().never();
        });
    let tracker = builder.tracker();
    let processor = builder.build();

    let result = processor.provision(&TestFixtures::username(TestFixtures::USER_1)).await;

    assert!(result.is_success());
    assert_eq!(result.outcome, ProvisionOutcome::ExistingTolerated);
    assert!(result.event.message.contains(TestFixtures::USER_1));

    let stats = tracker.get_stats().await.unwrap();
    assert_eq!(stats[&RemoteCall::CreatePerson].tolerated_calls, 1);
}

#[tokio::test]
async fn test_conflict_fails_when_not_ignoring_existing_users() {
    let processor = ProcessorBuilder::new()
        .with_groups("A:1.0")
        .with_ignore_existing_users(false)
        .with_profile(TestFixtures::profile(TestFixtures::USER_1))
        .with_store(|store| TestHelpers::expect_state(store, CreationState::Failed))
        .with_repository(|repository| {
            TestHelpers::expect_create(repository, TestFixtures::conflict());
            repository.expect_create_group_membership().never();
        })
        .build();

    let result = processor.provision(&TestFixtures::username(TestFixtures::USER_1)).await;

    assert!(!result.is_success());
    assert_eq!(result.outcome, ProvisionOutcome::RemoteConflict);
    assert!(result.event.message.contains("409"));
}

#[tokio::test]
async fn test_server_error_marks_failed_with_status() {
    let processor = ProcessorBuilder::new()
        .with_groups("A:1.0")
        .with_profile(TestFixtures::profile(TestFixtures::USER_1))
        .with_store(|store| TestHelpers::expect_state(store, CreationState::Failed))
        .with_repository(|repository| {
            TestHelpers::expect_create(repository, TestFixtures::server_error());
            repository.expect_create_group_membership().never();
        })
        .build();

    let result = processor.provision(&TestFixtures::username(TestFixtures::USER_1)).await;

    assert!(!result.is_success());
    assert_eq!(
        result.outcome,
        ProvisionOutcome::RemoteFailed { status: 500, reason: "Internal Server Error".to_string() }
    );
    assert!(result.event.message.contains("500"));
    assert!(result.event.message.contains("Internal Server Error"));
    assert!(result.event.message.contains(TestFixtures::USER_1));
}

#[tokio::test]
async fn test_transport_error_becomes_failed_result() {
    let builder = ProcessorBuilder::new()
        .with_profile(TestFixtures::profile(TestFixtures::USER_1))
        .with_store(|store| TestHelpers::expect_state(store, CreationState::Failed))
        .with_repository(|repository| {
            repository
                .expect_create_person()
                .times(1)
                .returning(|_, _| Err(ProvisionerError::Transport { message: "connection refused".to_string() }));
        });
    let tracker = builder.tracker();
    let processor = builder.build();

    let result = processor.provision(&TestFixtures::username(TestFixtures::USER_1)).await;

    assert!(!result.is_success());
    assert!(matches!(result.outcome, ProvisionOutcome::TransportFailed { .. }));
    assert!(result.event.message.contains("connection refused"));

    let stats = tracker.get_stats().await.unwrap();
    assert_eq!(stats[&RemoteCall::CreatePerson].failed_calls, 1);
}

#[tokio::test]
async fn test_state_write_failure_keeps_result() {
    let processor = ProcessorBuilder::new()
        .with_profile(TestFixtures::profile(TestFixtures::USER_1))
        .with_store(|store| {
            store
                .expect_set_creation_state()
                .times(1)
                .returning(|_, _| Err(ProvisionerError::UserStore { message: "read-only".to_string() }));
        })
        .with_repository(|repository| TestHelpers::expect_create(repository, TestFixtures::created()))
        .build();

    let result = processor.provision(&TestFixtures::username(TestFixtures::USER_1)).await;

    assert!(result.is_success());
    assert_eq!(result.outcome, ProvisionOutcome::Created);
}

#[tokio::test]
async fn test_success_enrolls_drawn_groups() {
    let builder = ProcessorBuilder::new()
        .with_groups("SITE_ADMINISTRATORS:1.0, DATA_ANALYSTS, NEVER:0")
        .with_profile(TestFixtures::profile(TestFixtures::USER_1))
        .with_store(|store| TestHelpers::expect_state(store, CreationState::Created))
        .with_repository(|repository| {
            TestHelpers::expect_create(repository, TestFixtures::created());
            repository
                .expect_create_group_membership()
                .withf(|admin, group_id, membership| {
                    admin.username == TestFixtures::ADMIN_USERNAME
                        && (group_id == "GROUP_SITE_ADMINISTRATORS" || group_id == "GROUP_DATA_ANALYSTS")
                        && membership.id == TestFixtures::USER_1
                        && membership.member_type == "PERSON"
                })
                .times(2)
                .returning(|_, _, _| Ok(TestFixtures::created()));
        });
    let tracker = builder.tracker();
    let processor = builder.build();

    let result = processor.provision(&TestFixtures::username(TestFixtures::USER_1)).await;

    assert!(result.is_success());
    let mut enrolled = result.enrollment.enrolled.clone();
    enrolled.sort();
    assert_eq!(enrolled, vec!["DATA_ANALYSTS".to_string(), "SITE_ADMINISTRATORS".to_string()]);
    assert!(result.enrollment.failed.is_empty());

    let stats = tracker.get_stats().await.unwrap();
    assert_eq!(stats[&RemoteCall::AddGroupMember].successful_calls, 2);
}

#[tokio::test]
async fn test_enrollment_failures_are_isolated() {
    let processor = ProcessorBuilder::new()
        .with_groups("MISSING, BROKEN, GOOD")
        .with_profile(TestFixtures::profile(TestFixtures::USER_1))
        // Exactly one state write, and it is Created
        .with_store(|store| TestHelpers::expect_state(store, CreationState::Created))
        .with_repository(|repository| {
            TestHelpers::expect_create(repository, TestFixtures::created());
            repository
                .expect_create_group_membership()
                .times(3)
                .returning(|_, group_id, _| match group_id {
                    "GROUP_MISSING" => Ok(TestFixtures::not_found()),
                    "GROUP_BROKEN" => Err(ProvisionerError::Transport { message: "reset".to_string() }),
                    _ => Ok(TestFixtures::created()),
                });
        })
        .build();

    let result = processor.provision(&TestFixtures::username(TestFixtures::USER_1)).await;

    assert!(result.is_success());
    assert_eq!(result.outcome, ProvisionOutcome::Created);
    assert_eq!(result.enrollment.enrolled, vec!["GOOD".to_string()]);

    let mut failed = result.enrollment.failed.clone();
    failed.sort();
    assert_eq!(failed, vec!["BROKEN".to_string(), "MISSING".to_string()]);
}

#[tokio::test]
async fn test_empty_draw_makes_no_membership_calls() {
    let processor = ProcessorBuilder::new()
        .with_groups("NEVER:0, ALSO_NEVER:-1")
        .with_profile(TestFixtures::profile(TestFixtures::USER_1))
        .with_store(|store| TestHelpers::expect_state(store, CreationState::Created))
        .with_repository(|repository| {
            TestHelpers::expect_create(repository, TestFixtures::created());
            repository.expect_create_group_membership().never();
        })
        .build();

    let result = processor.provision(&TestFixtures::username(TestFixtures::USER_1)).await;

    assert!(result.is_success());
    assert_eq!(result.enrollment.attempted(), 0);
}
