//! Context and unit resolution
//!
//! One context per period type actually used (at most a duration and an
//! instant, both anchored on the reporting period) and one unit per
//! distinct unit identifier. Identifiers are fixed or derived from the
//! unit id so consumers can address them by name.

use std::collections::BTreeSet;
use std::fmt::Write;

use chrono::NaiveDate;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::compile::PreparedFact;
use crate::taxonomy::{PeriodType, UNIT_PURE};
use crate::validate::{EntityIdentifier, ReportingPeriod};

pub const DURATION_CONTEXT_ID: &str = "ctx_current";
pub const INSTANT_CONTEXT_ID: &str = "ctx_current_instant";
pub const UNIT_ID_PREFIX: &str = "u_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContextPeriod {
    Duration { start: NaiveDate, end: NaiveDate },
    Instant { instant: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Context {
    pub id: String,
    pub entity: EntityIdentifier,
    pub period: ContextPeriod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unit {
    pub id: String,
    /// The registry unit identifier this unit was built from.
    pub unit_id: String,
    pub measures: Vec<String>,
}

/// Contexts and units required by a fact set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedReferences {
    pub contexts: Vec<Context>,
    pub units: Vec<Unit>,
}

impl ResolvedReferences {
    pub fn context(&self, id: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.id == id)
    }

    pub fn unit(&self, id: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }
}

pub fn context_id(period_type: PeriodType) -> &'static str {
    match period_type {
        PeriodType::Duration => DURATION_CONTEXT_ID,
        PeriodType::Instant => INSTANT_CONTEXT_ID,
    }
}

/// `u_` + the unit id. Ids with characters outside NCName get them
/// replaced by `_` plus a short digest of the raw id, so distinct unit ids
/// never share a ref.
pub fn unit_ref(unit_id: &str) -> String {
    let sanitized: String = unit_id
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || ch == '.' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if sanitized == unit_id {
        format!("{}{}", UNIT_ID_PREFIX, sanitized)
    } else {
        format!("{}{}_{}", UNIT_ID_PREFIX, sanitized, short_hash(unit_id))
    }
}

/// First 4 bytes of SHA-256, as lowercase hex.
fn short_hash(s: &str) -> String {
    let digest = Sha256::digest(s.as_bytes());
    digest[..4].iter().fold(String::with_capacity(8), |mut acc, b| {
        let _ = write!(acc, "{:02x}", b);
        acc
    })
}

/// `pure` is dimensionless; everything else lives in the unit registry.
pub fn unit_measure(unit_id: &str) -> String {
    if unit_id == UNIT_PURE {
        "xbrli:pure".to_string()
    } else {
        format!("utr:{}", unit_id)
    }
}

/// Walk the facts once and build the contexts and units they reference.
/// Contexts come duration first; units are ordered by unit id.
pub fn resolve_references(
    facts: &[PreparedFact],
    period: &ReportingPeriod,
    entity: &EntityIdentifier,
) -> ResolvedReferences {
    let mut period_types = BTreeSet::new();
    let mut unit_ids = BTreeSet::new();
    for fact in facts {
        period_types.insert(fact.period_type);
        if let Some(unit_id) = &fact.unit_id {
            unit_ids.insert(unit_id.as_str());
        }
    }

    let contexts = period_types
        .into_iter()
        .map(|period_type| Context {
            id: context_id(period_type).to_string(),
            entity: entity.clone(),
            period: match period_type {
                PeriodType::Duration => ContextPeriod::Duration {
                    start: period.start,
                    end: period.end,
                },
                PeriodType::Instant => ContextPeriod::Instant {
                    instant: period.instant(),
                },
            },
        })
        .collect();

    let units = unit_ids
        .into_iter()
        .map(|unit_id| Unit {
            id: unit_ref(unit_id),
            unit_id: unit_id.to_string(),
            measures: vec![unit_measure(unit_id)],
        })
        .collect();

    ResolvedReferences { contexts, units }
}
