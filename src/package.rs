//! Report package assembly
//!
//! Two entry points over the same pipeline:
//! - [`compile_report_package`] takes a prebuilt [`ReportRequest`] and
//!   validates it first,
//! - [`compile_report_package_from_parts`] takes results plus an already
//!   validated [`ReportScope`].
//!
//! Module results -> fact compiler -> context/unit resolver -> document.

use serde::Serialize;
use tracing::info;

use crate::compile::{CompiledFacts, FactCompiler, Omission};
use crate::config::CompilerConfig;
use crate::error::ReportResult;
use crate::export_xbrl::{build_facts, render_document, Fact};
use crate::input::{ModuleEntry, ReportRequest};
use crate::resolve::{resolve_references, Context, Unit};
use crate::taxonomy::TaxonomyRegistry;
use crate::validate::{check_decimals, validate_request, ReportScope};

/// Everything one compilation produces.
#[derive(Debug, Clone, Serialize)]
pub struct ReportPackage {
    pub contexts: Vec<Context>,
    pub units: Vec<Unit>,
    pub facts: Vec<Fact>,
    pub document: String,
    /// Prepared facts with their sources, the omissions and the emission totals.
    pub(crate) compiled: CompiledFacts,
}

impl ReportPackage {
    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    /// Facts for a qualified concept name, in emission order.
    pub fn find_facts<'a>(&'a self, concept: &'a str) -> impl Iterator<Item = &'a Fact> + 'a {
        self.facts.iter().filter(move |f| f.concept == concept)
    }

    /// The single fact for a concept, if exactly one was emitted.
    pub fn fact_value(&self, concept: &str) -> Option<&str> {
        let mut matches = self.facts.iter().filter(|f| f.concept == concept);
        match (matches.next(), matches.next()) {
            (Some(fact), None) => Some(fact.value.as_str()),
            _ => None,
        }
    }

    /// Prepared facts behind `facts`, including their source.
    pub fn compiled(&self) -> &CompiledFacts {
        &self.compiled
    }

    /// Items left out of the fact set, with the reason.
    pub fn omissions(&self) -> &[Omission] {
        &self.compiled.omissions
    }
}

/// Validate a request bundle, then compile it.
pub fn compile_report_package(request: &ReportRequest, config: &CompilerConfig) -> ReportResult<ReportPackage> {
    let scope = validate_request(request, config.default_decimals)?;
    compile_report_package_from_parts(&request.results, &scope, config)
}

/// Compile module results for an already validated scope.
pub fn compile_report_package_from_parts(
    results: &[ModuleEntry],
    scope: &ReportScope,
    config: &CompilerConfig,
) -> ReportResult<ReportPackage> {
    check_decimals(scope.decimals)?;
    let registry = TaxonomyRegistry::global();

    let compiled = FactCompiler::new(
        registry,
        &config.classification,
        &config.emission_unit_label,
        scope.decimals,
    )
    .compile(results)?;

    let refs = resolve_references(&compiled.facts, &scope.period, &scope.entity);
    let facts = build_facts(&compiled.facts, registry)?;
    let document = render_document(&refs.contexts, &refs.units, &facts, &config.entry_point)?;

    info!(
        "Compiled report for {}: {} facts, {} contexts, {} units, {} omissions",
        scope.entity.value,
        facts.len(),
        refs.contexts.len(),
        refs.units.len(),
        compiled.omissions.len()
    );

    Ok(ReportPackage {
        contexts: refs.contexts,
        units: refs.units,
        facts,
        document,
        compiled,
    })
}

/// Compile and return only the serialized document.
pub fn render_report_document(request: &ReportRequest, config: &CompilerConfig) -> ReportResult<String> {
    compile_report_package(request, config).map(|package| package.document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;
    use crate::input::ModuleResult;
    use chrono::NaiveDate;

    fn request() -> ReportRequest {
        ReportRequest {
            results: vec![ModuleEntry::new("A1", "Scope 1", ModuleResult::scalar(12.5, "t CO2e"))],
            period_start: NaiveDate::from_ymd_opt(2024, 1, 1),
            period_end: NaiveDate::from_ymd_opt(2024, 12, 31),
            entity_scheme: Some("http://standards.iso.org/iso/17442".to_string()),
            entity_identifier: Some("LEI0001".to_string()),
            default_decimals: None,
        }
    }

    /// T-PKG-1: both entry points produce the same package
    #[test]
    fn t_pkg_1_entry_points_agree() {
        let config = CompilerConfig::default();
        let req = request();
        let a = compile_report_package(&req, &config).unwrap();
        let scope = validate_request(&req, config.default_decimals).unwrap();
        let b = compile_report_package_from_parts(&req.results, &scope, &config).unwrap();
        assert_eq!(a.document, b.document);
        assert_eq!(a.facts, b.facts);
        assert_eq!(
            a.fact_value("vsme:GrossScope1GreenhouseGasEmissions"),
            Some("12.5")
        );
    }

    /// T-PKG-2: validation failures happen before compilation
    #[test]
    fn t_pkg_2_validation_first() {
        let mut req = request();
        req.entity_scheme = None;
        let err = compile_report_package(&req, &CompilerConfig::default()).unwrap_err();
        assert!(matches!(err, ReportError::MissingField { field: "entity_scheme" }));
        assert!(render_report_document(&req, &CompilerConfig::default()).is_err());
    }

    /// T-PKG-3: config default decimals apply when the request has none
    #[test]
    fn t_pkg_3_config_decimals() {
        let config = CompilerConfig::default().with_default_decimals(0);
        let package = compile_report_package(&request(), &config).unwrap();
        assert_eq!(
            package.fact_value("vsme:GrossScope1GreenhouseGasEmissions"),
            Some("13")
        );
        assert!(package.document.contains(r#"decimals="0""#));
    }

    /// T-PKG-4: omissions live once, inside the compiled facts
    #[test]
    fn t_pkg_4_omissions_serialized_once() {
        let mut req = request();
        req.results[0]
            .result
            .facts
            .push(crate::input::ModuleFact::new("not_a_concept", 1.0));
        let package = compile_report_package(&req, &CompilerConfig::default()).unwrap();
        assert_eq!(package.omissions().len(), 1);
        assert_eq!(package.omissions(), package.compiled().omissions.as_slice());

        let json = serde_json::to_value(&package).unwrap();
        assert!(json.get("omissions").is_none());
        assert_eq!(json["compiled"]["omissions"][0]["concept_key"], "not_a_concept");
        assert_eq!(json["compiled"]["omissions"][0]["reason"], "unregistered_concept");
    }
}
