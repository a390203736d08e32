//! Loading compiler configuration from disk and compiling with it.

mod common;

use std::io::Write;

use vsme_xbrl::{compile_report_package, CompilerConfig, ScopeBucket};

#[test]
fn test_load_config_from_file_and_compile() {
    common::init_tracing();
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    writeln!(
        file,
        r#"
default_decimals: 1
emission_unit_label: t CO2e
entry_point: https://example.com/vsme-entry.xsd
classification:
  rules:
    - {{ prefix: A, bucket: scope1 }}
    - {{ prefix: G, bucket: scope3 }}
"#
    )
    .expect("write config");

    let config = CompilerConfig::load_from_file(file.path()).expect("load config");
    assert_eq!(config.default_decimals, 1);
    assert_eq!(config.classification.classify("G7"), Some(ScopeBucket::Scope3));
    assert_eq!(config.classification.classify("B1"), None);

    // B1 no longer counts toward scope 2; G1 has no scalar so scope 3 stays zero
    let request = common::load_request("vsme_sample.json");
    let package = compile_report_package(&request, &config).unwrap();
    assert_eq!(
        package.fact_value("vsme:GrossLocationBasedScope2GreenhouseGasEmissions"),
        Some("0")
    );
    assert_eq!(
        package.fact_value("vsme:TotalGrossLocationBasedGreenhouseGasEmissions"),
        Some("1200")
    );
    assert!(package
        .document
        .contains(r#"xlink:href="https://example.com/vsme-entry.xsd""#));
    assert!(package.document.contains(r#"decimals="1""#));
}

#[test]
fn test_missing_config_file_reports_path() {
    let err = CompilerConfig::load_from_file("/nonexistent/vsme-config.yaml").unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to read compiler config"));
}
