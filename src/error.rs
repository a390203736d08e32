//! Error types for report compilation
//!
//! Only structural preconditions and programming defects surface here.
//! Per-fact data-quality problems are omitted from the output instead
//! (see [`crate::compile::Omission`]).

use thiserror::Error;

/// Fatal errors raised by the report compiler
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Unknown taxonomy concept: {key}")]
    UnknownConcept { key: String },

    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Invalid reporting period: start {start} is after end {end}")]
    InvalidPeriod { start: String, end: String },

    #[error("Invalid decimals: {decimals} (maximum is {max})")]
    InvalidDecimals { decimals: u32, max: u32 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Render error: {0}")]
    Render(#[from] std::fmt::Error),
}

/// Result alias used across the crate
pub type ReportResult<T> = Result<T, ReportError>;
