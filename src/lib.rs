//! VSME XBRL report compiler
//!
//! Compiles the results of the sustainability calculation modules into an
//! XBRL instance document against the VSME taxonomy.
//!
//! ## Pipeline
//! Module results -> Fact compiler (taxonomy registry + emission aggregator)
//! -> Context/unit resolver -> Document serializer
//!
//! Each compilation is a pure function of its inputs; the only shared state
//! is the immutable taxonomy registry.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vsme_xbrl::{compile_report_package, CompilerConfig, ModuleEntry, ModuleResult, ReportRequest};
//!
//! let request = ReportRequest {
//!     results: vec![ModuleEntry::new("A1", "Scope 1", ModuleResult::scalar(1200.0, "t CO2e"))],
//!     period_start: chrono::NaiveDate::from_ymd_opt(2024, 1, 1),
//!     period_end: chrono::NaiveDate::from_ymd_opt(2024, 12, 31),
//!     entity_scheme: Some("http://standards.iso.org/iso/17442".to_string()),
//!     entity_identifier: Some("5299001GCLKH6FLZTA77".to_string()),
//!     default_decimals: None,
//! };
//! let package = compile_report_package(&request, &CompilerConfig::default()).unwrap();
//! println!("{}", package.document);
//! ```

// Core error handling
pub mod error;

// Static taxonomy data
pub mod taxonomy;

// Inputs and preconditions
pub mod input;
pub mod validate;

// Emission rollup
pub mod aggregate;
pub mod classify;

// Fact pipeline
pub mod compile;
pub mod export_xbrl;
pub mod format;
pub mod resolve;

// Assembly
pub mod config;
pub mod package;
pub mod submission;

pub use aggregate::{EmissionTotals, NetRevenueIntensity};
pub use classify::{ScopeBucket, ScopeClassification, ScopeRule};
pub use compile::{FactSource, Omission, OmissionReason, PreparedFact};
pub use config::CompilerConfig;
pub use error::{ReportError, ReportResult};
pub use export_xbrl::Fact;
pub use input::{
    FactValue, IntensityBasis, IntensityDescriptor, ModuleEntry, ModuleFact, ModuleResult,
    ModuleTable, ReportRequest, TableCell, TableRow,
};
pub use package::{
    compile_report_package, compile_report_package_from_parts, render_report_document,
    ReportPackage,
};
pub use resolve::{Context, ContextPeriod, Unit};
pub use submission::{
    build_submission_payload, build_submission_payload_at, SubmissionOptions, SubmissionPayload,
    SubmissionProfile,
};
pub use taxonomy::{get_concept_definition, ConceptDefinition, PeriodType, TaxonomyRegistry};
pub use validate::{validate_request, EntityIdentifier, ReportScope, ReportingPeriod};
