//! Test fixtures and data for provisioner tests

use shared::{UserProfile, Username};
use provisioner::{AdminIdentity, RemoteResponse};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const USER_1: &'static str = "user.0001";
    pub const USER_2: &'static str = "user.0002";
    pub const USER_3: &'static str = "user.0003";
    pub const UNKNOWN_USER: &'static str = "user.unknown";

    pub const ADMIN_USERNAME: &'static str = "admin";
    pub const ADMIN_PASSWORD: &'static str = "admin";

    /// Group spec used by the statistical tests
    pub const MIXED_GROUPS: &'static str = "A : 0.05 , B : 0.8 , C:1.5,D:-0.5";

    pub fn admin() -> AdminIdentity {
        AdminIdentity::new(Self::ADMIN_USERNAME, Self::ADMIN_PASSWORD)
    }

    pub fn username(name: &str) -> Username {
        Username::from(name)
    }

    pub fn profile(name: &str) -> UserProfile {
        UserProfile::new(name, "Test", format!("User {name}"), format!("{name}@example.com"), "password")
    }

    pub fn profiles() -> Vec<UserProfile> {
        vec![
            Self::profile(Self::USER_1),
            Self::profile(Self::USER_2),
            Self::profile(Self::USER_3),
        ]
    }

    pub fn created() -> RemoteResponse {
        RemoteResponse::new(201, "Created")
    }

    pub fn conflict() -> RemoteResponse {
        RemoteResponse::new(409, "Conflict")
    }

    pub fn server_error() -> RemoteResponse {
        RemoteResponse::new(500, "Internal Server Error")
    }

    pub fn not_found() -> RemoteResponse {
        RemoteResponse::new(404, "Not Found")
    }
}
