//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them through the host bridge.
//!
//! ```yaml
//! name: equality
//! description: Plain values compare by equality
//! schema: ""
//! templates:
//!   - id: t1
//!     source: "query { a(x: 1) }"
//! cases:
//!   - name: equal value matches
//!     operation: "{ a(x: 1) }"
//!     expect:
//!       matched: [t1]
//! ```

use gqtmatch::prelude::*;
use serde::Deserialize;

use crate::Harness;

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub schema: String,
    #[serde(default)]
    pub templates: Vec<TemplateSource>,
    /// Expected init failure; absent means init must succeed.
    #[serde(default)]
    pub init_error: Option<InitErrorExpectation>,
    #[serde(default)]
    pub cases: Vec<TestCase>,
    #[serde(default)]
    pub inspections: Vec<InspectionCase>,
}

/// Expected `init` failure
#[derive(Debug, Deserialize)]
pub struct InitErrorExpectation {
    /// Wire code, e.g. `TEMPLATE_ERR`.
    pub code: String,
    /// Template ids that must appear in the report, and no others.
    #[serde(default)]
    pub templates: Vec<String>,
}

/// One `matchAll` call
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub operation: String,
    #[serde(default)]
    pub operation_name: String,
    #[serde(default)]
    pub variables: String,
    /// Absent means no outcome at all (bridge not initialized).
    pub expect: Option<MatchExpectation>,
}

#[derive(Debug, PartialEq, Eq, Deserialize)]
pub struct MatchExpectation {
    #[serde(default)]
    pub matched: Vec<String>,
    /// Substring of the outcome's error message.
    #[serde(default)]
    pub error: Option<String>,
}

/// One `parseOperation` call
#[derive(Debug, Deserialize)]
pub struct InspectionCase {
    pub name: String,
    pub source: String,
    /// Expected operation names; absent means a `PARSE_OPR` failure.
    pub operations: Option<Vec<String>>,
}

impl MatchExpectation {
    fn accepts(&self, outcome: &MatchOutcome) -> bool {
        let error_ok = match (&self.error, &outcome.error) {
            (None, None) => true,
            (Some(expected), Some(actual)) => actual.contains(expected.as_str()),
            _ => false,
        };
        error_ok && self.matched == outcome.matched
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
}

impl CaseResult {
    fn new(case_name: &str, passed: bool, expected: String, actual: String) -> Self {
        Self {
            case_name: case_name.to_string(),
            passed,
            expected,
            actual,
        }
    }
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Initialize a fresh harness, then run every case against it.
    ///
    /// The init itself is reported as the first result, named `init`.
    pub fn run(&self) -> Vec<CaseResult> {
        let mut harness = Harness::new();
        let sources: Vec<(&str, &str)> = self
            .templates
            .iter()
            .map(|t| (t.id.as_str(), t.source.as_str()))
            .collect();

        let mut results = vec![self.check_init(harness.init(&self.schema, &sources))];

        for case in &self.cases {
            let actual = harness
                .bridge()
                .match_all(&case.operation, &case.operation_name, &case.variables);
            let passed = match (&case.expect, &actual) {
                (None, None) => true,
                (Some(expected), Some(outcome)) => expected.accepts(outcome),
                _ => false,
            };
            results.push(CaseResult::new(
                &case.name,
                passed,
                format!("{:?}", case.expect),
                format!("{actual:?}"),
            ));
        }

        for case in &self.inspections {
            let actual = harness.bridge().parse_operation(&case.source);
            let names = match &actual {
                Some(ParseOperationResponse::Operations { operations }) => {
                    Some(operations.iter().map(|o| o.name.clone()).collect::<Vec<_>>())
                }
                _ => None,
            };
            let passed = match (&case.operations, &actual) {
                (Some(_), _) => names == case.operations,
                (None, Some(ParseOperationResponse::Failed(report))) => {
                    report.kind() == ErrorKind::ParseOperation
                }
                (None, _) => false,
            };
            results.push(CaseResult::new(
                &case.name,
                passed,
                format!("{:?}", case.operations),
                format!("{actual:?}"),
            ));
        }

        let faults = harness.faults();
        results.push(CaseResult::new(
            "no faults",
            faults.is_empty(),
            "[]".to_string(),
            format!("{faults:?}"),
        ));
        results
    }

    fn check_init(&self, result: Result<(), ErrorReport>) -> CaseResult {
        let expected = format!("{:?}", self.init_error);
        match (&self.init_error, result) {
            (None, Ok(())) => CaseResult::new("init", true, expected, "Ok".to_string()),
            (Some(expectation), Err(report)) => {
                let mut ids: Vec<&str> = report
                    .template_errors()
                    .map(|errors| errors.keys().map(String::as_str).collect())
                    .unwrap_or_default();
                ids.sort_unstable();
                let mut wanted: Vec<&str> =
                    expectation.templates.iter().map(String::as_str).collect();
                wanted.sort_unstable();

                let passed = report.kind().code() == expectation.code && ids == wanted;
                CaseResult::new("init", passed, expected, report.to_string())
            }
            (_, actual) => CaseResult::new("init", false, expected, format!("{actual:?}")),
        }
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self) {
        let results = self.run();
        for result in results {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {}, got {}",
                self.name, result.case_name, result.expected, result.actual
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
name: inline
description: Fixture parsed from an inline document
templates:
  - id: t1
    source: "query { a(x: > 1) }"
cases:
  - name: above
    operation: "{ a(x: 2) }"
    expect:
      matched: [t1]
  - name: below
    operation: "{ a(x: 0) }"
    expect: {}
---
name: rejected
description: Init failure leaves the bridge inactive
templates:
  - id: bad
    source: "query {"
init_error:
  code: TEMPLATE_ERR
  templates: [bad]
cases:
  - name: inactive
    operation: "{ a }"
inspections:
  - name: still inspects
    source: "query Q { a }"
    operations: [Q]
"#;

    #[test]
    fn parses_and_runs_multi_document_yaml() {
        let fixtures = Fixture::from_yaml_multi(FIXTURE).unwrap();
        assert_eq!(fixtures.len(), 2);
        for fixture in &fixtures {
            fixture.run_and_assert();
        }
    }

    #[test]
    fn reports_failing_cases() {
        let mut fixture = Fixture::from_yaml_multi(FIXTURE).unwrap().remove(0);
        fixture.cases[1].expect = Some(MatchExpectation {
            matched: vec!["t1".to_string()],
            error: None,
        });

        let results = fixture.run();
        let failed: Vec<&str> = results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.case_name.as_str())
            .collect();
        assert_eq!(failed, vec!["below"]);
    }
}
