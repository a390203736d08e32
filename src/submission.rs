//! Submission payload envelope
//!
//! Wraps a compiled [`ReportPackage`] with profile metadata, a generation
//! timestamp and an audit trail. The document itself is embedded only on
//! request; its SHA-256 digest is always recorded.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::compile::{FactSource, Omission};
use crate::config::CompilerConfig;
use crate::error::ReportResult;
use crate::input::ModuleEntry;
use crate::package::ReportPackage;
use crate::validate::{EntityIdentifier, ReportScope, ReportingPeriod};

/// Organisation metadata supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionProfile {
    pub organisation_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organisation_id: Option<String>,
    /// VSME module reported against, e.g. `basic` or `comprehensive`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporting_module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionOptions {
    /// Embed the serialized document in the payload.
    pub embed_document: bool,
}

/// Per-module contribution to the fact set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleAudit {
    pub topic_id: String,
    pub title: String,
    pub facts_emitted: usize,
    pub tables_emitted: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditTrail {
    pub document_sha256: String,
    pub taxonomy_entry_point: String,
    pub modules: Vec<ModuleAudit>,
    pub omissions: Vec<Omission>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionPayload {
    pub submission_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub profile: SubmissionProfile,
    pub period: ReportingPeriod,
    pub entity: EntityIdentifier,
    pub fact_count: usize,
    pub audit: AuditTrail,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

impl SubmissionPayload {
    pub fn to_json(&self) -> ReportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Build a payload stamped with the current time.
pub fn build_submission_payload(
    package: &ReportPackage,
    results: &[ModuleEntry],
    scope: &ReportScope,
    profile: SubmissionProfile,
    config: &CompilerConfig,
    options: SubmissionOptions,
) -> SubmissionPayload {
    build_submission_payload_at(package, results, scope, profile, config, options, Utc::now())
}

/// Build a payload with an explicit generation timestamp.
pub fn build_submission_payload_at(
    package: &ReportPackage,
    results: &[ModuleEntry],
    scope: &ReportScope,
    profile: SubmissionProfile,
    config: &CompilerConfig,
    options: SubmissionOptions,
    generated_at: DateTime<Utc>,
) -> SubmissionPayload {
    let audit = AuditTrail {
        document_sha256: sha256_hex(&package.document),
        taxonomy_entry_point: config.entry_point.clone(),
        modules: module_audits(package, results),
        omissions: package.omissions().to_vec(),
    };

    SubmissionPayload {
        submission_id: Uuid::new_v4(),
        generated_at,
        profile,
        period: scope.period,
        entity: scope.entity.clone(),
        fact_count: package.fact_count(),
        audit,
        document: options.embed_document.then(|| package.document.clone()),
    }
}

fn module_audits(package: &ReportPackage, results: &[ModuleEntry]) -> Vec<ModuleAudit> {
    results
        .iter()
        .map(|entry| {
            let mut facts_emitted = 0;
            let mut tables_emitted = 0;
            for fact in &package.compiled().facts {
                match &fact.source {
                    FactSource::ModuleFact { topic_id } if *topic_id == entry.topic_id => facts_emitted += 1,
                    FactSource::ModuleTable { topic_id } if *topic_id == entry.topic_id => tables_emitted += 1,
                    _ => {}
                }
            }
            ModuleAudit {
                topic_id: entry.topic_id.clone(),
                title: entry.title.clone(),
                facts_emitted,
                tables_emitted,
                warnings: entry.result.warnings.clone(),
            }
        })
        .collect()
}

/// Lowercase hex SHA-256 of a string.
fn sha256_hex(s: &str) -> String {
    let digest = Sha256::digest(s.as_bytes());
    digest.iter().fold(String::with_capacity(64), |mut acc, b| {
        let _ = write!(acc, "{:02x}", b);
        acc
    })
}
