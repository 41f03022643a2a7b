//! Provisioner library for repository load-test user setup
//!
//! This library creates synthetic users on a content repository, records each
//! user's creation state in the local user store, and enrolls new users into
//! randomly drawn groups.

pub mod config;
pub mod core;
pub mod driver;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;

// Re-export main types
pub use config::ProvisionerConfig;
pub use crate::core::{GroupAssignmentPolicy, GroupEnrollmentFanout, UserProvisioningProcessor};
pub use driver::ProvisioningDriver;
pub use error::{ProvisionerError, ProvisionerResult};
pub use traits::*;
pub use types::*;
pub use services::*;
