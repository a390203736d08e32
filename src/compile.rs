//! Fact compiler
//!
//! Turns module results into [`PreparedFact`]s in emission order:
//!
//! 1. the six mandatory emission totals (always present),
//! 2. module facts, in module-list order,
//! 3. module tables, in module-list order,
//! 4. the derived net-revenue intensity pair, when applicable.
//!
//! Per-item problems never abort compilation. The item is left out and an
//! [`Omission`] records why.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::aggregate::{aggregate_emissions, net_revenue_intensity, EmissionTotals, INTENSITY_DECIMALS};
use crate::classify::ScopeClassification;
use crate::error::ReportResult;
use crate::format::format_decimal;
use crate::input::{FactValue, ModuleEntry, ModuleFact, ModuleTable, TableCell, TableRow};
use crate::taxonomy::{self, PeriodType, TaxonomyRegistry};
use crate::validate::MAX_DECIMALS;

/// Where a prepared fact came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FactSource {
    Aggregator,
    ModuleFact { topic_id: String },
    ModuleTable { topic_id: String },
    DerivedIntensity,
}

/// A normalized fact, ready for context/unit resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreparedFact {
    pub concept_key: String,
    pub value: String,
    pub unit_id: Option<String>,
    pub decimals: Option<String>,
    pub period_type: PeriodType,
    pub source: FactSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OmissionReason {
    /// Concept key not in the taxonomy registry.
    UnregisteredConcept,
    /// Concept is one of the aggregator-owned emission totals.
    AggregatorOwned,
    NonFiniteNumber,
    /// Value missing, `null`, or a shape the taxonomy cannot hold.
    MalformedValue,
    EmptyText,
    EmptyTable,
    /// Derived intensity suppressed because a module supplied it.
    ModuleSuppliedIntensity,
}

/// An item left out of the fact set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Omission {
    pub topic_id: Option<String>,
    pub concept_key: String,
    pub reason: OmissionReason,
}

/// Output of one compilation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompiledFacts {
    pub facts: Vec<PreparedFact>,
    pub omissions: Vec<Omission>,
    pub totals: EmissionTotals,
}

/// Settings for a single compilation pass.
pub struct FactCompiler<'a> {
    registry: &'a TaxonomyRegistry,
    classification: &'a ScopeClassification,
    emission_unit_label: &'a str,
    decimals: u32,
}

impl<'a> FactCompiler<'a> {
    pub fn new(
        registry: &'a TaxonomyRegistry,
        classification: &'a ScopeClassification,
        emission_unit_label: &'a str,
        decimals: u32,
    ) -> Self {
        Self {
            registry,
            classification,
            emission_unit_label,
            decimals,
        }
    }

    pub fn compile(&self, results: &[ModuleEntry]) -> ReportResult<CompiledFacts> {
        let totals = aggregate_emissions(results, self.classification, self.emission_unit_label);
        let mut out = CompiledFacts {
            totals,
            ..CompiledFacts::default()
        };

        self.mandatory_emissions(&totals, &mut out)?;

        for entry in results {
            for fact in &entry.result.facts {
                self.module_fact(&entry.topic_id, fact, &mut out);
            }
        }

        for entry in results {
            for table in &entry.result.tables {
                self.module_table(&entry.topic_id, table, &mut out)?;
            }
        }

        self.derived_intensity(results, &totals, &mut out)?;

        Ok(out)
    }

    fn mandatory_emissions(&self, totals: &EmissionTotals, out: &mut CompiledFacts) -> ReportResult<()> {
        for key in taxonomy::MANDATORY_EMISSION_KEYS {
            let def = self.registry.get(key)?;
            let value = totals.value_for(key).unwrap_or(0.0);
            out.facts.push(PreparedFact {
                concept_key: key.to_string(),
                value: format_decimal(value, self.decimals),
                unit_id: def.unit_id.map(str::to_string),
                decimals: Some(self.decimals.to_string()),
                period_type: def.period_type,
                source: FactSource::Aggregator,
            });
        }
        Ok(())
    }

    fn module_fact(&self, topic_id: &str, fact: &ModuleFact, out: &mut CompiledFacts) {
        let Some(def) = self.registry.lookup(&fact.concept) else {
            omit(out, topic_id, &fact.concept, OmissionReason::UnregisteredConcept);
            return;
        };
        if taxonomy::is_mandatory_emission(&fact.concept) {
            omit(out, topic_id, &fact.concept, OmissionReason::AggregatorOwned);
            return;
        }

        let (value, unit_id, decimals) = match &fact.value {
            FactValue::Absent | FactValue::Other(_) => {
                omit(out, topic_id, &fact.concept, OmissionReason::MalformedValue);
                return;
            }
            FactValue::Number(n) if !n.is_finite() => {
                omit(out, topic_id, &fact.concept, OmissionReason::NonFiniteNumber);
                return;
            }
            FactValue::Number(n) => {
                let decimals = fact.decimals.unwrap_or(self.decimals).min(MAX_DECIMALS);
                let unit = fact
                    .unit
                    .clone()
                    .or_else(|| def.unit_id.map(str::to_string))
                    .unwrap_or_else(|| taxonomy::UNIT_PURE.to_string());
                (format_decimal(*n, decimals), Some(unit), Some(decimals.to_string()))
            }
            FactValue::Boolean(b) => (b.to_string(), None, None),
            FactValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    omit(out, topic_id, &fact.concept, OmissionReason::EmptyText);
                    return;
                }
                (trimmed.to_string(), None, None)
            }
        };

        out.facts.push(PreparedFact {
            concept_key: fact.concept.clone(),
            value,
            unit_id,
            decimals,
            period_type: def.period_type,
            source: FactSource::ModuleFact {
                topic_id: topic_id.to_string(),
            },
        });
    }

    fn module_table(&self, topic_id: &str, table: &ModuleTable, out: &mut CompiledFacts) -> ReportResult<()> {
        let Some(def) = self.registry.lookup(&table.concept) else {
            omit(out, topic_id, &table.concept, OmissionReason::UnregisteredConcept);
            return Ok(());
        };
        if table.rows.iter().any(is_malformed_row) {
            omit(out, topic_id, &table.concept, OmissionReason::MalformedValue);
            return Ok(());
        }

        let rows: Vec<Map<String, Value>> = table.rows.iter().filter_map(normalize_row).collect();
        if rows.is_empty() {
            omit(out, topic_id, &table.concept, OmissionReason::EmptyTable);
            return Ok(());
        }

        out.facts.push(PreparedFact {
            concept_key: table.concept.clone(),
            value: serde_json::to_string(&rows)?,
            unit_id: None,
            decimals: None,
            period_type: def.period_type,
            source: FactSource::ModuleTable {
                topic_id: topic_id.to_string(),
            },
        });
        Ok(())
    }

    fn derived_intensity(
        &self,
        results: &[ModuleEntry],
        totals: &EmissionTotals,
        out: &mut CompiledFacts,
    ) -> ReportResult<()> {
        let Some(intensity) = net_revenue_intensity(results, totals) else {
            return Ok(());
        };

        let keys = [
            taxonomy::INTENSITY_LOCATION_NET_REVENUE,
            taxonomy::INTENSITY_MARKET_NET_REVENUE,
        ];
        if let Some(existing) = out.facts.iter().find(|f| keys.contains(&f.concept_key.as_str())) {
            let concept_key = existing.concept_key.clone();
            debug!("Derived intensity suppressed, module supplied {}", concept_key);
            out.omissions.push(Omission {
                topic_id: None,
                concept_key,
                reason: OmissionReason::ModuleSuppliedIntensity,
            });
            return Ok(());
        }

        let values = [intensity.location_formatted(), intensity.market_formatted()];
        for (key, value) in keys.into_iter().zip(values) {
            let def = self.registry.get(key)?;
            out.facts.push(PreparedFact {
                concept_key: key.to_string(),
                value,
                unit_id: def.unit_id.map(str::to_string),
                decimals: Some(INTENSITY_DECIMALS.to_string()),
                period_type: def.period_type,
                source: FactSource::DerivedIntensity,
            });
        }
        Ok(())
    }
}

/// Drop absent and non-finite cells. Rows with nested values are
/// rejected earlier by [`is_malformed_row`]. Keys come out sorted because both
/// `TableRow` and `serde_json::Map` are ordered maps.
fn normalize_row(row: &TableRow) -> Option<Map<String, Value>> {
    let map: Map<String, Value> = row
        .iter()
        .filter_map(|(key, cell)| cell_to_json(cell).map(|v| (key.clone(), v)))
        .collect();
    (!map.is_empty()).then_some(map)
}

fn is_malformed_row(row: &TableRow) -> bool {
    row.values().any(|cell| matches!(cell, TableCell::Other(_)))
}

fn cell_to_json(cell: &TableCell) -> Option<Value> {
    match cell {
        TableCell::Absent | TableCell::Other(_) => None,
        TableCell::Boolean(b) => Some(Value::Bool(*b)),
        TableCell::Text(s) => Some(Value::String(s.clone())),
        TableCell::Number(n) if !n.is_finite() => None,
        // Integral values render without a fraction, e.g. `3` not `3.0`.
        TableCell::Number(n) if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 => {
            Some(Value::from(*n as i64))
        }
        TableCell::Number(n) => serde_json::Number::from_f64(*n).map(Value::Number),
    }
}

fn omit(out: &mut CompiledFacts, topic_id: &str, concept_key: &str, reason: OmissionReason) {
    debug!("Omitting {} from topic {}: {:?}", concept_key, topic_id, reason);
    out.omissions.push(Omission {
        topic_id: Some(topic_id.to_string()),
        concept_key: concept_key.to_string(),
        reason,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{IntensityDescriptor, ModuleResult};

    const T: &str = "t CO2e";

    fn compile(results: &[ModuleEntry]) -> CompiledFacts {
        let classification = ScopeClassification::default();
        FactCompiler::new(TaxonomyRegistry::global(), &classification, T, 3)
            .compile(results)
            .unwrap()
    }

    fn row(cells: &[(&str, TableCell)]) -> TableRow {
        cells.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    /// T-CMP-1: empty input still yields the six mandatory zero facts
    #[test]
    fn t_cmp_1_mandatory_zero_facts() {
        let out = compile(&[]);
        assert_eq!(out.facts.len(), 6);
        for (fact, key) in out.facts.iter().zip(taxonomy::MANDATORY_EMISSION_KEYS) {
            assert_eq!(fact.concept_key, key);
            assert_eq!(fact.value, "0");
            assert_eq!(fact.decimals.as_deref(), Some("3"));
            assert_eq!(fact.unit_id.as_deref(), Some(taxonomy::UNIT_TCO2E));
            assert_eq!(fact.source, FactSource::Aggregator);
        }
        assert!(out.omissions.is_empty());
    }

    /// T-CMP-2: numeric facts use their own decimals override and the registry unit
    #[test]
    fn t_cmp_2_numeric_fact() {
        let results = vec![ModuleEntry::new(
            "B0",
            "General information",
            ModuleResult::default()
                .with_fact(ModuleFact::new("net_revenue", 1_250_000.456).with_decimals(0))
                .with_fact(ModuleFact::new("total_energy_consumption", 842.12345)),
        )];
        let out = compile(&results);
        let revenue = &out.facts[6];
        assert_eq!(revenue.value, "1250000");
        assert_eq!(revenue.decimals.as_deref(), Some("0"));
        assert_eq!(revenue.unit_id.as_deref(), Some("EUR"));

        let energy = &out.facts[7];
        assert_eq!(energy.value, "842.123");
        assert_eq!(energy.decimals.as_deref(), Some("3"));
        assert_eq!(energy.unit_id.as_deref(), Some("MWh"));
    }

    /// T-CMP-3: booleans carry no unit or decimals; text is trimmed; empty text dropped
    #[test]
    fn t_cmp_3_boolean_and_text() {
        let results = vec![ModuleEntry::new(
            "B0",
            "General information",
            ModuleResult::default()
                .with_fact(ModuleFact::new("consolidated_basis", true).with_unit("pure").with_decimals(2))
                .with_fact(ModuleFact::new("entity_name", "  Acme GmbH \n"))
                .with_fact(ModuleFact::new("legal_form", "   ")),
        )];
        let out = compile(&results);
        assert_eq!(out.facts.len(), 8);

        let flag = &out.facts[6];
        assert_eq!(flag.value, "true");
        assert_eq!(flag.unit_id, None);
        assert_eq!(flag.decimals, None);

        assert_eq!(out.facts[7].value, "Acme GmbH");
        assert_eq!(out.facts[7].unit_id, None);

        assert_eq!(out.omissions.len(), 1);
        assert_eq!(out.omissions[0].concept_key, "legal_form");
        assert_eq!(out.omissions[0].reason, OmissionReason::EmptyText);
    }

    /// T-CMP-4: unregistered, non-finite and aggregator-owned facts are skipped silently
    #[test]
    fn t_cmp_4_skipped_facts() {
        let results = vec![ModuleEntry::new(
            "A1",
            "Scope 1",
            ModuleResult::scalar(50.0, T)
                .with_fact(ModuleFact::new("future_concept", 1.0))
                .with_fact(ModuleFact::new("water_consumption", f64::NAN))
                .with_fact(ModuleFact::new(taxonomy::SCOPE1_EMISSIONS, 999.0)),
        )];
        let out = compile(&results);
        assert_eq!(out.facts.len(), 6);
        assert_eq!(out.facts[0].value, "50");

        let reasons: Vec<_> = out.omissions.iter().map(|o| o.reason).collect();
        assert_eq!(
            reasons,
            vec![
                OmissionReason::UnregisteredConcept,
                OmissionReason::NonFiniteNumber,
                OmissionReason::AggregatorOwned
            ]
        );
        assert_eq!(out.omissions[0].topic_id.as_deref(), Some("A1"));
    }

    /// T-CMP-5: absent cells stripped, keys sorted, empty rows and tables dropped
    #[test]
    fn t_cmp_5_tables() {
        let table = ModuleTable::new(
            "pollutant_emissions_table",
            vec![
                row(&[
                    ("pollutant", "NOx".into()),
                    ("medium", TableCell::Absent),
                    ("amount", 1.5.into()),
                ]),
                row(&[("pollutant", "SO2".into()), ("amount", 3.0.into()), ("medium", "air".into())]),
                row(&[("medium", TableCell::Absent)]),
            ],
        );
        let empty = ModuleTable::new("waste_by_type_table", vec![row(&[("kind", TableCell::Absent)])]);
        let results = vec![ModuleEntry::new(
            "B4",
            "Pollution",
            ModuleResult::default().with_table(table).with_table(empty),
        )];
        let out = compile(&results);

        assert_eq!(out.facts.len(), 7);
        assert_eq!(
            out.facts[6].value,
            r#"[{"amount":1.5,"pollutant":"NOx"},{"amount":3,"medium":"air","pollutant":"SO2"}]"#
        );
        assert_eq!(out.facts[6].unit_id, None);
        assert_eq!(out.omissions[0].reason, OmissionReason::EmptyTable);
    }

    /// T-CMP-6: tables follow all module facts regardless of module order
    #[test]
    fn t_cmp_6_emission_order() {
        let results = vec![
            ModuleEntry::new(
                "B4",
                "Pollution",
                ModuleResult::default()
                    .with_table(ModuleTable::new(
                        "pollutant_emissions_table",
                        vec![row(&[("pollutant", "NOx".into())])],
                    ))
                    .with_fact(ModuleFact::new("pollution_reporting_obligation", false)),
            ),
            ModuleEntry::new(
                "B6",
                "Water",
                ModuleResult::default().with_fact(ModuleFact::new("water_consumption", 12.0)),
            ),
        ];
        let out = compile(&results);
        let keys: Vec<_> = out.facts[6..].iter().map(|f| f.concept_key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["pollution_reporting_obligation", "water_consumption", "pollutant_emissions_table"]
        );
    }

    /// T-CMP-7: derived intensity appended last; module-supplied intensity suppresses it
    #[test]
    fn t_cmp_7_intensity() {
        let mut results = vec![
            ModuleEntry::new("A1", "Scope 1", ModuleResult::scalar(1200.0, T)),
            ModuleEntry::new(
                "B0",
                "General",
                ModuleResult::default().with_intensity(IntensityDescriptor::net_revenue(100_000_000.0)),
            ),
        ];
        let out = compile(&results);
        assert_eq!(out.facts.len(), 8);
        assert_eq!(out.facts[6].concept_key, taxonomy::INTENSITY_LOCATION_NET_REVENUE);
        assert_eq!(out.facts[6].value, "0.000012");
        assert_eq!(out.facts[6].decimals.as_deref(), Some("9"));
        assert_eq!(out.facts[7].source, FactSource::DerivedIntensity);

        results[1].result.facts.push(
            ModuleFact::new(taxonomy::INTENSITY_MARKET_NET_REVENUE, 0.5).with_decimals(2),
        );
        let out = compile(&results);
        assert_eq!(out.facts.len(), 7);
        assert_eq!(out.facts[6].value, "0.5");
        assert_eq!(out.omissions.last().unwrap().reason, OmissionReason::ModuleSuppliedIntensity);
    }

    /// T-CMP-8: malformed fact values and nested table cells drop only their own item
    #[test]
    fn t_cmp_8_malformed_items() {
        let nested = row(&[("kind", TableCell::Other(serde_json::json!([1, 2])))]);
        let results = vec![ModuleEntry::new(
            "B0",
            "General information",
            ModuleResult::default()
                .with_fact(ModuleFact::new("entity_name", FactValue::Absent))
                .with_fact(ModuleFact::new("net_revenue", FactValue::Other(serde_json::json!({"eur": 1}))))
                .with_fact(ModuleFact::new("number_of_employees", 12.0))
                .with_table(ModuleTable::new(
                    "waste_by_type_table",
                    vec![row(&[("kind", TableCell::from("paper"))]), nested],
                ))
                .with_table(ModuleTable::new(
                    "pollutant_emissions_table",
                    vec![row(&[("pollutant", TableCell::from("NOx"))])],
                )),
        )];
        let out = compile(&results);

        let keys: Vec<_> = out.facts.iter().skip(6).map(|f| f.concept_key.as_str()).collect();
        assert_eq!(keys, vec!["number_of_employees", "pollutant_emissions_table"]);

        let omitted: Vec<_> = out
            .omissions
            .iter()
            .map(|o| (o.concept_key.as_str(), o.reason))
            .collect();
        assert_eq!(
            omitted,
            vec![
                ("entity_name", OmissionReason::MalformedValue),
                ("net_revenue", OmissionReason::MalformedValue),
                ("waste_by_type_table", OmissionReason::MalformedValue),
            ]
        );
    }
}
