//! Error types for Floodgate.
#![allow(dead_code)]

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("invalid priority: {0} (must be P0, P1, or P2)")]
    InvalidPriority(String),

    #[error("thought content cannot be empty")]
    EmptyContent,

    #[error("{0}")]
    Other(String),
}
