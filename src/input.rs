//! Wire types produced by the calculation modules
//!
//! The core only reads these. Every value kind is a variant so the
//! normalization path in [`crate::compile`] is chosen by an exhaustive match.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Helper defaults for serde ──

fn is_empty_vec<T>(v: &[T]) -> bool {
    v.is_empty()
}

// ── Module entries ──

/// One calculation module's output, as handed to the compiler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub topic_id: String,
    #[serde(default)]
    pub title: String,
    pub result: ModuleResult,
}

impl ModuleEntry {
    pub fn new(topic_id: impl Into<String>, title: impl Into<String>, result: ModuleResult) -> Self {
        Self {
            topic_id: topic_id.into(),
            title: title.into(),
            result,
        }
    }
}

/// Per-topic result bag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleResult {
    /// Headline scalar, e.g. the emissions figure of a scope module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Unit label of `value`, e.g. `"t CO2e"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "is_empty_vec")]
    pub facts: Vec<ModuleFact>,
    #[serde(default, skip_serializing_if = "is_empty_vec")]
    pub tables: Vec<ModuleTable>,
    #[serde(default, skip_serializing_if = "is_empty_vec")]
    pub intensities: Vec<IntensityDescriptor>,
    #[serde(default, skip_serializing_if = "is_empty_vec")]
    pub warnings: Vec<String>,
}

impl ModuleResult {
    /// Result carrying only a headline scalar.
    pub fn scalar(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value: Some(value),
            unit: Some(unit.into()),
            ..Self::default()
        }
    }

    pub fn with_fact(mut self, fact: ModuleFact) -> Self {
        self.facts.push(fact);
        self
    }

    pub fn with_table(mut self, table: ModuleTable) -> Self {
        self.tables.push(table);
        self
    }

    pub fn with_intensity(mut self, intensity: IntensityDescriptor) -> Self {
        self.intensities.push(intensity);
        self
    }
}

// ── Facts ──

/// A fact a module declares for a taxonomy concept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleFact {
    pub concept: String,
    #[serde(default)]
    pub value: FactValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
}

impl ModuleFact {
    pub fn new(concept: impl Into<String>, value: impl Into<FactValue>) -> Self {
        Self {
            concept: concept.into(),
            value: value.into(),
            unit: None,
            decimals: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = Some(decimals);
        self
    }
}

/// Fact value. `Absent` (JSON `null` or a missing field) and `Other`
/// (arrays, objects) deserialize so one bad fact cannot reject the request;
/// the compiler leaves both out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    #[default]
    Absent,
    Boolean(bool),
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl From<bool> for FactValue {
    fn from(v: bool) -> Self {
        FactValue::Boolean(v)
    }
}

impl From<f64> for FactValue {
    fn from(v: f64) -> Self {
        FactValue::Number(v)
    }
}

impl From<i64> for FactValue {
    fn from(v: i64) -> Self {
        FactValue::Number(v as f64)
    }
}

impl From<&str> for FactValue {
    fn from(v: &str) -> Self {
        FactValue::Text(v.to_string())
    }
}

impl From<String> for FactValue {
    fn from(v: String) -> Self {
        FactValue::Text(v)
    }
}

// ── Tables ──

/// One row of a module table. Keys are column names chosen by the module.
pub type TableRow = BTreeMap<String, TableCell>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleTable {
    pub concept: String,
    pub rows: Vec<TableRow>,
}

impl ModuleTable {
    pub fn new(concept: impl Into<String>, rows: Vec<TableRow>) -> Self {
        Self {
            concept: concept.into(),
            rows,
        }
    }
}

/// Table cell; `Absent` (JSON `null`) marks a value the module did not fill.
/// Nested arrays and objects land in `Other` and make the table malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableCell {
    Absent,
    Boolean(bool),
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl From<bool> for TableCell {
    fn from(v: bool) -> Self {
        TableCell::Boolean(v)
    }
}

impl From<f64> for TableCell {
    fn from(v: f64) -> Self {
        TableCell::Number(v)
    }
}

impl From<&str> for TableCell {
    fn from(v: &str) -> Self {
        TableCell::Text(v.to_string())
    }
}

impl From<String> for TableCell {
    fn from(v: String) -> Self {
        TableCell::Text(v)
    }
}

// ── Intensities ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityBasis {
    NetRevenue,
    #[serde(other)]
    Other,
}

/// Emission intensity a module can express against a denominator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntensityDescriptor {
    pub basis: IntensityBasis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denominator: Option<f64>,
}

impl IntensityDescriptor {
    pub fn net_revenue(denominator: f64) -> Self {
        Self {
            basis: IntensityBasis::NetRevenue,
            value: None,
            denominator: Some(denominator),
        }
    }

    /// Denominator usable for division: finite and strictly positive.
    pub fn usable_denominator(&self) -> Option<f64> {
        self.denominator.filter(|d| d.is_finite() && *d > 0.0)
    }
}

// ── Request bundle ──

/// Prebuilt input bundle. Fields are optional on the wire and checked by
/// [`crate::validate::validate_request`] before compilation starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub results: Vec<ModuleEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_end: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_decimals: Option<u32>,
}
