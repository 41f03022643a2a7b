//! Shared error types for the provisioning system

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Invalid UUID: {input}")]
    InvalidUuid { input: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
