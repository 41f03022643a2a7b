//! Provisioner core business logic

pub mod enrollment;
pub mod group_policy;
pub mod processor;

pub use enrollment::GroupEnrollmentFanout;
pub use group_policy::GroupAssignmentPolicy;
pub use processor::UserProvisioningProcessor;
