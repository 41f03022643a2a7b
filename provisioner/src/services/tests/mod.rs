//! Tests for provisioner services
//!
//! The REST client runs against a local mock server; the store and tracker
//! are exercised directly.
