//! VSME taxonomy concept registry
//!
//! Static mapping from internal concept keys to the qualified taxonomy
//! names, unit identifiers and period types the instance document needs.
//! Only the subset of the VSME taxonomy that the calculation modules
//! report on is modelled here.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, ReportResult};

// ── Namespaces ──

pub const XBRLI_NS: &str = "http://www.xbrl.org/2003/instance";
pub const LINK_NS: &str = "http://www.xbrl.org/2003/linkbase";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
pub const UTR_NS: &str = "http://www.xbrl.org/2009/utr";
pub const VSME_NS: &str = "https://xbrl.efrag.org/taxonomy/vsme/2024-12-17/vsme";

/// Prefix bound to [`VSME_NS`]; every qualified name in the registry uses it.
pub const VSME_PREFIX: &str = "vsme";

/// Default schema reference for `link:schemaRef`.
pub const DEFAULT_ENTRY_POINT: &str =
    "https://xbrl.efrag.org/taxonomy/vsme/2024-12-17/vsme-all.xsd";

// ── Unit identifiers ──

pub const UNIT_TCO2E: &str = "tCO2e";
pub const UNIT_TCO2E_PER_EUR: &str = "tCO2ePerEUR";
pub const UNIT_EUR: &str = "EUR";
pub const UNIT_MWH: &str = "MWh";
pub const UNIT_PURE: &str = "pure";
pub const UNIT_M3: &str = "m3";
pub const UNIT_TONNE: &str = "t";
pub const UNIT_HECTARE: &str = "ha";
pub const UNIT_HOUR: &str = "h";

// ── Concept keys with special handling ──

pub const SCOPE1_EMISSIONS: &str = "scope1_emissions";
pub const SCOPE2_LOCATION_EMISSIONS: &str = "scope2_location_emissions";
pub const SCOPE2_MARKET_EMISSIONS: &str = "scope2_market_emissions";
pub const SCOPE3_EMISSIONS: &str = "scope3_emissions";
pub const TOTAL_LOCATION_EMISSIONS: &str = "total_location_emissions";
pub const TOTAL_MARKET_EMISSIONS: &str = "total_market_emissions";

pub const INTENSITY_LOCATION_NET_REVENUE: &str = "ghg_intensity_location_net_revenue";
pub const INTENSITY_MARKET_NET_REVENUE: &str = "ghg_intensity_market_net_revenue";

/// Emission concepts emitted on every compilation, in emission order.
///
/// Unlike every other concept these appear even when no module supplied
/// data for them; absence renders as zero.
pub const MANDATORY_EMISSION_KEYS: [&str; 6] = [
    SCOPE1_EMISSIONS,
    SCOPE2_LOCATION_EMISSIONS,
    SCOPE2_MARKET_EMISSIONS,
    SCOPE3_EMISSIONS,
    TOTAL_LOCATION_EMISSIONS,
    TOTAL_MARKET_EMISSIONS,
];

/// Whether a concept key is one of [`MANDATORY_EMISSION_KEYS`].
pub fn is_mandatory_emission(key: &str) -> bool {
    MANDATORY_EMISSION_KEYS.contains(&key)
}

/// Flow over the reporting period, or snapshot at its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    Duration,
    Instant,
}

/// Registered taxonomy concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConceptDefinition {
    pub qualified_name: &'static str,
    pub unit_id: Option<&'static str>,
    pub period_type: PeriodType,
}

use PeriodType::{Duration, Instant};

/// (key, qualified name, unit, period type)
#[rustfmt::skip]
const CONCEPTS: &[(&str, &str, Option<&str>, PeriodType)] = &[
    // B3 - GHG emissions (mandatory lines)
    (SCOPE1_EMISSIONS, "vsme:GrossScope1GreenhouseGasEmissions", Some(UNIT_TCO2E), Duration),
    (SCOPE2_LOCATION_EMISSIONS, "vsme:GrossLocationBasedScope2GreenhouseGasEmissions", Some(UNIT_TCO2E), Duration),
    (SCOPE2_MARKET_EMISSIONS, "vsme:GrossMarketBasedScope2GreenhouseGasEmissions", Some(UNIT_TCO2E), Duration),
    (SCOPE3_EMISSIONS, "vsme:GrossScope3GreenhouseGasEmissions", Some(UNIT_TCO2E), Duration),
    (TOTAL_LOCATION_EMISSIONS, "vsme:TotalGrossLocationBasedGreenhouseGasEmissions", Some(UNIT_TCO2E), Duration),
    (TOTAL_MARKET_EMISSIONS, "vsme:TotalGrossMarketBasedGreenhouseGasEmissions", Some(UNIT_TCO2E), Duration),
    (INTENSITY_LOCATION_NET_REVENUE, "vsme:GreenhouseGasIntensityLocationBasedPerNetRevenue", Some(UNIT_TCO2E_PER_EUR), Duration),
    (INTENSITY_MARKET_NET_REVENUE, "vsme:GreenhouseGasIntensityMarketBasedPerNetRevenue", Some(UNIT_TCO2E_PER_EUR), Duration),
    ("ghg_reduction_targets", "vsme:GreenhouseGasEmissionReductionTargets", None, Duration),
    ("transition_plan_description", "vsme:TransitionPlanForClimateChangeMitigation", None, Duration),
    ("climate_risks_description", "vsme:DescriptionOfClimateRelatedHazardsAndTransitionEvents", None, Duration),

    // B1 - basis for preparation
    ("entity_name", "vsme:NameOfReportingEntity", None, Duration),
    ("reporting_module_option", "vsme:BasisForPreparation", None, Duration),
    ("consolidated_basis", "vsme:ReportIsPreparedOnConsolidatedBasis", None, Duration),
    ("subsidiaries_included", "vsme:ListOfSubsidiariesIncludedInConsolidatedReport", None, Duration),
    ("legal_form", "vsme:LegalForm", None, Duration),
    ("nace_sector_code", "vsme:NACESectorClassificationCode", None, Duration),
    ("balance_sheet_total", "vsme:BalanceSheetTotal", Some(UNIT_EUR), Instant),
    ("net_revenue", "vsme:NetRevenue", Some(UNIT_EUR), Duration),
    ("number_of_employees", "vsme:NumberOfEmployeesHeadcount", Some(UNIT_PURE), Instant),
    ("country_of_primary_operations", "vsme:CountryOfPrimaryOperations", None, Duration),
    ("site_locations", "vsme:GeolocationOfSites", None, Duration),
    ("sustainability_certifications", "vsme:SustainabilityRelatedCertificationsOrLabels", None, Duration),
    ("omitted_disclosures", "vsme:OmittedDisclosuresClassifiedAsSensitive", None, Duration),

    // B2 - practices, policies and future initiatives
    ("sustainability_practices_description", "vsme:PracticesPoliciesAndFutureInitiativesForTransitionTowardsMoreSustainableEconomy", None, Duration),
    ("sustainability_policies_table", "vsme:PoliciesOnSustainabilityMatters", None, Duration),

    // B3 - energy
    ("total_energy_consumption", "vsme:TotalEnergyConsumption", Some(UNIT_MWH), Duration),
    ("renewable_electricity_consumption", "vsme:ElectricityConsumptionFromRenewableSources", Some(UNIT_MWH), Duration),
    ("non_renewable_electricity_consumption", "vsme:ElectricityConsumptionFromNonRenewableSources", Some(UNIT_MWH), Duration),
    ("renewable_fuel_consumption", "vsme:FuelConsumptionFromRenewableSources", Some(UNIT_MWH), Duration),
    ("non_renewable_fuel_consumption", "vsme:FuelConsumptionFromNonRenewableSources", Some(UNIT_MWH), Duration),
    ("energy_consumption_breakdown", "vsme:BreakdownOfEnergyConsumption", None, Duration),

    // B4 - pollution
    ("pollutant_emissions_table", "vsme:PollutantsEmittedToAirWaterAndSoil", None, Duration),
    ("pollution_reporting_obligation", "vsme:EntityIsRequiredToReportPollutantsByLaw", None, Duration),

    // B5 - biodiversity
    ("sites_in_biodiversity_sensitive_areas", "vsme:SitesInOrNearBiodiversitySensitiveAreas", None, Duration),
    ("total_land_use", "vsme:TotalUseOfLand", Some(UNIT_HECTARE), Instant),
    ("total_sealed_area", "vsme:TotalSealedArea", Some(UNIT_HECTARE), Instant),

    // B6 - water
    ("total_water_withdrawal", "vsme:TotalWaterWithdrawal", Some(UNIT_M3), Duration),
    ("water_withdrawal_high_stress", "vsme:WaterWithdrawalInAreasOfHighWaterStress", Some(UNIT_M3), Duration),
    ("water_consumption", "vsme:WaterConsumption", Some(UNIT_M3), Duration),

    // B7 - resource use, circular economy and waste
    ("circular_economy_principles", "vsme:EntityAppliesCircularEconomyPrinciples", None, Duration),
    ("circular_economy_description", "vsme:DescriptionOfCircularEconomyPrinciples", None, Duration),
    ("total_waste_generated", "vsme:TotalWasteGenerated", Some(UNIT_TONNE), Duration),
    ("hazardous_waste", "vsme:HazardousWasteGenerated", Some(UNIT_TONNE), Duration),
    ("non_hazardous_waste", "vsme:NonHazardousWasteGenerated", Some(UNIT_TONNE), Duration),
    ("waste_diverted_to_recycling", "vsme:WasteDivertedToRecyclingOrReuse", Some(UNIT_TONNE), Duration),
    ("waste_by_type_table", "vsme:WasteByTypeAndTreatment", None, Duration),

    // B8 - workforce general characteristics
    ("employees_permanent", "vsme:NumberOfEmployeesWithPermanentContract", Some(UNIT_PURE), Instant),
    ("employees_temporary", "vsme:NumberOfEmployeesWithTemporaryContract", Some(UNIT_PURE), Instant),
    ("employees_by_gender", "vsme:NumberOfEmployeesByGender", None, Instant),
    ("employees_by_country", "vsme:NumberOfEmployeesByCountry", None, Instant),
    ("employee_turnover_rate", "vsme:RateOfEmployeeTurnover", Some(UNIT_PURE), Duration),

    // B9 - health and safety
    ("recordable_work_accidents", "vsme:NumberOfRecordableWorkRelatedAccidents", Some(UNIT_PURE), Duration),
    ("recordable_work_accident_rate", "vsme:RateOfRecordableWorkRelatedAccidents", Some(UNIT_PURE), Duration),
    ("work_related_fatalities", "vsme:NumberOfFatalitiesFromWorkRelatedInjuriesAndIllHealth", Some(UNIT_PURE), Duration),

    // B10 - remuneration, collective bargaining and training
    ("minimum_wage_compliance", "vsme:EmployeesReceivePayEqualOrAboveMinimumWage", None, Duration),
    ("gender_pay_gap", "vsme:GenderPayGap", Some(UNIT_PURE), Duration),
    ("collective_bargaining_coverage", "vsme:PercentageOfEmployeesCoveredByCollectiveBargaining", Some(UNIT_PURE), Duration),
    ("average_training_hours_male", "vsme:AverageNumberOfAnnualTrainingHoursPerEmployeeMale", Some(UNIT_HOUR), Duration),
    ("average_training_hours_female", "vsme:AverageNumberOfAnnualTrainingHoursPerEmployeeFemale", Some(UNIT_HOUR), Duration),

    // B11 - convictions and fines for corruption and bribery
    ("corruption_convictions", "vsme:NumberOfConvictionsForViolationOfAntiCorruptionLaws", Some(UNIT_PURE), Duration),
    ("corruption_fines", "vsme:AmountOfFinesForViolationOfAntiCorruptionLaws", Some(UNIT_EUR), Duration),

    // C1-C9 - comprehensive module
    ("business_model_description", "vsme:DescriptionOfBusinessModelAndStrategy", None, Duration),
    ("governance_responsibilities", "vsme:GovernanceResponsibilitiesForSustainabilityMatters", None, Duration),
    ("board_female_ratio", "vsme:FemaleToMaleRatioInGovernanceBody", Some(UNIT_PURE), Instant),
    ("human_rights_policy", "vsme:EntityHasHumanRightsPolicy", None, Duration),
    ("human_rights_incidents", "vsme:ConfirmedIncidentsRelatedToHumanRights", None, Duration),
    ("revenue_controversial_weapons", "vsme:RevenueFromControversialWeapons", Some(UNIT_EUR), Duration),
    ("revenue_tobacco", "vsme:RevenueFromCultivationAndProductionOfTobacco", Some(UNIT_EUR), Duration),
    ("revenue_fossil_fuels", "vsme:RevenueFromFossilFuelSector", Some(UNIT_EUR), Duration),
    ("revenue_chemicals", "vsme:RevenueFromManufactureOfChemicals", Some(UNIT_EUR), Duration),
    ("paris_aligned_benchmark_exclusion", "vsme:EntityIsExcludedFromEUReferenceBenchmarksAlignedWithParisAgreement", None, Duration),
];

static REGISTRY: LazyLock<TaxonomyRegistry> = LazyLock::new(TaxonomyRegistry::build);

/// Immutable concept lookup, built once per process.
#[derive(Debug)]
pub struct TaxonomyRegistry {
    concepts: HashMap<&'static str, ConceptDefinition>,
}

impl TaxonomyRegistry {
    fn build() -> Self {
        let concepts = CONCEPTS
            .iter()
            .map(|&(key, qualified_name, unit_id, period_type)| {
                (
                    key,
                    ConceptDefinition {
                        qualified_name,
                        unit_id,
                        period_type,
                    },
                )
            })
            .collect();
        Self { concepts }
    }

    /// The process-wide registry.
    pub fn global() -> &'static TaxonomyRegistry {
        &REGISTRY
    }

    /// Look up a concept, failing on unknown keys.
    pub fn get(&self, key: &str) -> ReportResult<&ConceptDefinition> {
        self.concepts
            .get(key)
            .ok_or_else(|| ReportError::UnknownConcept {
                key: key.to_string(),
            })
    }

    /// Look up a concept that may legitimately be unregistered.
    pub fn lookup(&self, key: &str) -> Option<&ConceptDefinition> {
        self.concepts.get(key)
    }
}

/// Shorthand for `TaxonomyRegistry::global().get(key)`.
pub fn get_concept_definition(key: &str) -> ReportResult<&'static ConceptDefinition> {
    TaxonomyRegistry::global().get(key)
}
