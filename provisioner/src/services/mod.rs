//! Provisioner services implementations

pub mod rest_repository;
pub mod user_store;
pub mod outcome_tracker;

#[cfg(test)]
pub mod tests;

pub use rest_repository::*;
pub use user_store::*;
pub use outcome_tracker::*;
