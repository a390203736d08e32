//! Structural precondition checks
//!
//! A [`ReportRequest`] is turned into a typed [`ReportScope`] before any
//! compilation work begins. Missing period or entity fields are fatal.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, ReportResult};
use crate::input::ReportRequest;

/// Upper bound on fraction digits a caller may request.
pub const MAX_DECIMALS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportingPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> ReportResult<Self> {
        if start > end {
            return Err(ReportError::InvalidPeriod {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Instant contexts are anchored at the period end.
    pub fn instant(&self) -> NaiveDate {
        self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityIdentifier {
    pub scheme: String,
    pub value: String,
}

impl EntityIdentifier {
    pub fn new(scheme: impl Into<String>, value: impl Into<String>) -> ReportResult<Self> {
        let scheme = required("entity_scheme", Some(scheme.into()))?;
        let value = required("entity_identifier", Some(value.into()))?;
        Ok(Self { scheme, value })
    }
}

/// Everything a compilation needs besides the module results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportScope {
    pub period: ReportingPeriod,
    pub entity: EntityIdentifier,
    pub decimals: u32,
}

impl ReportScope {
    pub fn new(period: ReportingPeriod, entity: EntityIdentifier, decimals: u32) -> ReportResult<Self> {
        check_decimals(decimals)?;
        Ok(Self {
            period,
            entity,
            decimals,
        })
    }
}

/// Validate a request bundle. `fallback_decimals` applies when the request
/// carries no override.
pub fn validate_request(request: &ReportRequest, fallback_decimals: u32) -> ReportResult<ReportScope> {
    let start = request.period_start.ok_or(ReportError::MissingField {
        field: "period_start",
    })?;
    let end = request.period_end.ok_or(ReportError::MissingField {
        field: "period_end",
    })?;
    let period = ReportingPeriod::new(start, end)?;

    let entity = EntityIdentifier {
        scheme: required("entity_scheme", request.entity_scheme.clone())?,
        value: required("entity_identifier", request.entity_identifier.clone())?,
    };

    ReportScope::new(period, entity, request.default_decimals.unwrap_or(fallback_decimals))
}

pub(crate) fn check_decimals(decimals: u32) -> ReportResult<()> {
    if decimals > MAX_DECIMALS {
        return Err(ReportError::InvalidDecimals {
            decimals,
            max: MAX_DECIMALS,
        });
    }
    Ok(())
}

fn required(field: &'static str, value: Option<String>) -> ReportResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ReportError::MissingField { field }),
    }
}
