//! Common test utilities and infrastructure
//!
//! This module provides shared fixtures and builders used across the
//! provisioner test suites.
#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod helpers;

// Re-export commonly used items for convenience
pub use fixtures::TestFixtures;
pub use helpers::{ProcessorBuilder, TestHelpers, TestProcessor};
