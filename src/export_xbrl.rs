//! XBRL instance document rendering
//!
//! Pure and deterministic: identical contexts, units and facts always give
//! byte-identical output. Elements are written in the order contexts,
//! units, facts; facts keep their compilation order.

use std::fmt::Write;

use serde::Serialize;

use crate::compile::PreparedFact;
use crate::error::ReportResult;
use crate::resolve::{context_id, unit_ref, Context, ContextPeriod, Unit};
use crate::taxonomy::{TaxonomyRegistry, LINK_NS, UTR_NS, VSME_NS, VSME_PREFIX, XBRLI_NS, XLINK_NS};

/// A fact as it appears in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fact {
    pub concept: String,
    pub context_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<String>,
    pub value: String,
}

/// Attach qualified names, context refs and unit refs to prepared facts.
pub fn build_facts(prepared: &[PreparedFact], registry: &TaxonomyRegistry) -> ReportResult<Vec<Fact>> {
    prepared
        .iter()
        .map(|p| {
            let def = registry.get(&p.concept_key)?;
            Ok(Fact {
                concept: def.qualified_name.to_string(),
                context_ref: context_id(p.period_type).to_string(),
                unit_ref: p.unit_id.as_deref().map(unit_ref),
                decimals: p.decimals.clone(),
                value: p.value.clone(),
            })
        })
        .collect()
}

/// Render the full instance document.
pub fn render_document(
    contexts: &[Context],
    units: &[Unit],
    facts: &[Fact],
    entry_point: &str,
) -> ReportResult<String> {
    let mut xml = String::new();

    // ── Header ──
    writeln!(xml, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(xml, r#"<xbrli:xbrl xmlns:xbrli="{}""#, XBRLI_NS)?;
    writeln!(xml, r#"            xmlns:link="{}""#, LINK_NS)?;
    writeln!(xml, r#"            xmlns:xlink="{}""#, XLINK_NS)?;
    writeln!(xml, r#"            xmlns:utr="{}""#, UTR_NS)?;
    writeln!(xml, r#"            xmlns:{}="{}">"#, VSME_PREFIX, VSME_NS)?;
    writeln!(
        xml,
        r#"  <link:schemaRef xlink:type="simple" xlink:href="{}"/>"#,
        xml_escape(entry_point)
    )?;

    // ── Contexts ──
    for context in contexts {
        writeln!(xml, r#"  <xbrli:context id="{}">"#, xml_escape(&context.id))?;
        writeln!(xml, r#"    <xbrli:entity>"#)?;
        writeln!(
            xml,
            r#"      <xbrli:identifier scheme="{}">{}</xbrli:identifier>"#,
            xml_escape(&context.entity.scheme),
            xml_escape(&context.entity.value)
        )?;
        writeln!(xml, r#"    </xbrli:entity>"#)?;
        writeln!(xml, r#"    <xbrli:period>"#)?;
        match &context.period {
            ContextPeriod::Duration { start, end } => {
                writeln!(xml, r#"      <xbrli:startDate>{}</xbrli:startDate>"#, start)?;
                writeln!(xml, r#"      <xbrli:endDate>{}</xbrli:endDate>"#, end)?;
            }
            ContextPeriod::Instant { instant } => {
                writeln!(xml, r#"      <xbrli:instant>{}</xbrli:instant>"#, instant)?;
            }
        }
        writeln!(xml, r#"    </xbrli:period>"#)?;
        writeln!(xml, r#"  </xbrli:context>"#)?;
    }

    // ── Units ──
    for unit in units {
        writeln!(xml, r#"  <xbrli:unit id="{}">"#, xml_escape(&unit.id))?;
        for measure in &unit.measures {
            writeln!(xml, r#"    <xbrli:measure>{}</xbrli:measure>"#, xml_escape(measure))?;
        }
        writeln!(xml, r#"  </xbrli:unit>"#)?;
    }

    // ── Facts ──
    for fact in facts {
        let unit_attr = fact
            .unit_ref
            .as_deref()
            .map(|u| format!(r#" unitRef="{}""#, xml_escape(u)))
            .unwrap_or_default();
        let decimals_attr = fact
            .decimals
            .as_deref()
            .map(|d| format!(r#" decimals="{}""#, xml_escape(d)))
            .unwrap_or_default();
        writeln!(
            xml,
            r#"  <{concept} contextRef="{ctx}"{unit}{dec}>{value}</{concept}>"#,
            concept = fact.concept,
            ctx = xml_escape(&fact.context_ref),
            unit = unit_attr,
            dec = decimals_attr,
            value = xml_escape(&fact.value)
        )?;
    }

    writeln!(xml, r#"</xbrli:xbrl>"#)?;
    Ok(xml)
}

/// Escape the five XML special characters.
pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
