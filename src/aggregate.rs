//! Emission rollup across scope modules
//!
//! Sums the headline scalars of classified topics into scope totals and
//! derives the two grand totals. Results whose unit label differs from the
//! canonical emissions unit are not emission modules and are ignored.

use serde::Serialize;
use tracing::{debug, warn};

use crate::classify::{ScopeBucket, ScopeClassification};
use crate::format::format_decimal;
use crate::input::{IntensityBasis, ModuleEntry};
use crate::taxonomy;

/// Fraction digits used for derived intensities.
pub const INTENSITY_DECIMALS: u32 = 9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EmissionTotals {
    pub scope1: f64,
    pub scope2_location: f64,
    pub scope2_market: f64,
    pub scope3: f64,
    pub total_location: f64,
    pub total_market: f64,
}

impl EmissionTotals {
    /// Total for one of the mandatory emission concept keys.
    pub fn value_for(&self, concept_key: &str) -> Option<f64> {
        match concept_key {
            taxonomy::SCOPE1_EMISSIONS => Some(self.scope1),
            taxonomy::SCOPE2_LOCATION_EMISSIONS => Some(self.scope2_location),
            taxonomy::SCOPE2_MARKET_EMISSIONS => Some(self.scope2_market),
            taxonomy::SCOPE3_EMISSIONS => Some(self.scope3),
            taxonomy::TOTAL_LOCATION_EMISSIONS => Some(self.total_location),
            taxonomy::TOTAL_MARKET_EMISSIONS => Some(self.total_market),
            _ => None,
        }
    }
}

/// Roll up scope totals from the module results.
pub fn aggregate_emissions(
    results: &[ModuleEntry],
    classification: &ScopeClassification,
    emission_unit_label: &str,
) -> EmissionTotals {
    let mut scope1 = 0.0;
    let mut scope2_location = 0.0;
    let mut market_adjustment = 0.0;
    let mut scope3 = 0.0;

    for entry in results {
        let Some(bucket) = classification.classify(&entry.topic_id) else {
            continue;
        };
        if entry.result.unit.as_deref() != Some(emission_unit_label) {
            debug!(
                "Topic {} not in {}, skipped for {:?}",
                entry.topic_id, emission_unit_label, bucket
            );
            continue;
        }
        let value = entry.result.value.filter(|v| v.is_finite()).unwrap_or(0.0);
        match bucket {
            ScopeBucket::Scope1 => scope1 += value,
            ScopeBucket::Scope2Location => scope2_location += value,
            ScopeBucket::Scope2MarketAdjustment => market_adjustment += value,
            ScopeBucket::Scope3 => scope3 += value,
        }
    }

    let scope2_market = scope2_location + market_adjustment;
    EmissionTotals {
        scope1,
        scope2_location,
        scope2_market,
        scope3,
        total_location: scope1 + scope2_location + scope3,
        total_market: scope1 + scope2_market + scope3,
    }
}

/// Grand totals divided by net revenue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NetRevenueIntensity {
    pub denominator: f64,
    pub location: f64,
    pub market: f64,
}

impl NetRevenueIntensity {
    pub fn location_formatted(&self) -> String {
        format_decimal(self.location, INTENSITY_DECIMALS)
    }

    pub fn market_formatted(&self) -> String {
        format_decimal(self.market, INTENSITY_DECIMALS)
    }
}

/// First net-revenue descriptor with a finite positive denominator, in
/// module order, turned into location/market intensities.
pub fn net_revenue_intensity(
    results: &[ModuleEntry],
    totals: &EmissionTotals,
) -> Option<NetRevenueIntensity> {
    for entry in results {
        for descriptor in &entry.result.intensities {
            if descriptor.basis != IntensityBasis::NetRevenue {
                continue;
            }
            match descriptor.usable_denominator() {
                Some(denominator) => {
                    return Some(NetRevenueIntensity {
                        denominator,
                        location: totals.total_location / denominator,
                        market: totals.total_market / denominator,
                    });
                }
                None => warn!(
                    "Topic {} declares a net revenue intensity without a usable denominator ({:?})",
                    entry.topic_id, descriptor.denominator
                ),
            }
        }
    }
    None
}
