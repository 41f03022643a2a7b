//! Shared types for the repository provisioning system
//!
//! Contains the user record model, creation states and per-event results
//! exchanged between the provisioner and the systems that schedule it,
//! plus the tracing bootstrap every binary uses.

pub mod types;
pub mod errors;
pub mod logging;

pub use types::*;
pub use errors::*;
