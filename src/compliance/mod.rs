//! Golden-config compliance helpers.
//!
//! Rules can carry `compliance_include` / `compliance_exclude` regex lists so
//! only part of a feature's config is managed, e.g. just the interface
//! descriptions.

use regex_lite::Regex;

use crate::error::{HelperError, Result};
use crate::models::{ComplianceDetails, ComplianceObject};

/// Device roles and rule features whose compliance is not checked
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplianceBypass {
    pub roles: Vec<String>,
    pub features: Vec<String>,
}

impl ComplianceBypass {
    pub fn new(roles: Vec<String>, features: Vec<String>) -> Self {
        Self { roles, features }
    }

    pub fn applies(&self, role: &str, feature: &str) -> bool {
        self.roles.iter().any(|r| r == role) || self.features.iter().any(|f| f == feature)
    }
}

fn compile_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            let pattern = pattern.as_ref();
            Regex::new(pattern).map_err(|e| HelperError::PatternCompileError {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}

/// Keep the lines of `text` matched by any of `patterns`
pub fn include<S: AsRef<str>>(patterns: &[S], text: &str) -> Result<Vec<String>> {
    let matchers = compile_patterns(patterns)?;
    Ok(text
        .lines()
        .filter(|line| matchers.iter().any(|m| m.is_match(line)))
        .map(str::to_string)
        .collect())
}

/// Drop the lines of `text` matched by any of `patterns`
pub fn exclude<S: AsRef<str>>(patterns: &[S], text: &str) -> Result<Vec<String>> {
    let matchers = compile_patterns(patterns)?;
    Ok(text
        .lines()
        .filter(|line| !matchers.iter().any(|m| m.is_match(line)))
        .map(str::to_string)
        .collect())
}

/// Line based comparison of actual and intended config
pub fn cli_compliance(actual: &str, intended: &str) -> ComplianceDetails {
    let actual_lines: Vec<&str> = actual.lines().collect();
    let intended_lines: Vec<&str> = intended.lines().collect();

    let missing: Vec<&str> = intended_lines
        .iter()
        .filter(|line| !actual_lines.contains(line))
        .copied()
        .collect();
    let extra: Vec<&str> = actual_lines
        .iter()
        .filter(|line| !intended_lines.contains(line))
        .copied()
        .collect();

    let compliance = missing.is_empty() && extra.is_empty();
    ComplianceDetails {
        compliance,
        compliance_int: u8::from(compliance),
        ordered: compliance && actual_lines == intended_lines,
        missing: missing.join("\n"),
        extra: extra.join("\n"),
    }
}

fn apply_rule_filters(obj: &ComplianceObject, config: &str) -> Result<String> {
    let mut lines = config.to_string();
    if let Some(patterns) = obj.rule.compliance_include.as_deref() {
        lines = include(patterns, &lines)?.join("\n");
    }
    if let Some(patterns) = obj.rule.compliance_exclude.as_deref() {
        lines = exclude(patterns, &lines)?.join("\n");
    }
    Ok(lines)
}

/// Compliance check honouring the rule's line filters and the bypass lists
pub fn custom_compliance(
    obj: &ComplianceObject,
    bypass: &ComplianceBypass,
) -> Result<ComplianceDetails> {
    if bypass.applies(&obj.device_role, &obj.rule.feature) {
        tracing::debug!(
            "Skipping compliance for role '{}' feature '{}'",
            obj.device_role,
            obj.rule.feature
        );
        return Ok(ComplianceDetails::compliant());
    }

    let actual = apply_rule_filters(obj, &obj.actual)?;
    let intended = apply_rule_filters(obj, &obj.intended)?;
    Ok(cli_compliance(&actual, &intended))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ComplianceRule;

    const CONFIG: &str = "interface Eth1\ndescription uplink";

    fn object(include: Option<&[&str]>, exclude: Option<&[&str]>) -> ComplianceObject {
        let to_vec = |p: &[&str]| p.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        ComplianceObject {
            device_role: "edge".to_string(),
            rule: ComplianceRule {
                feature: "interfaces".to_string(),
                compliance_include: include.map(to_vec),
                compliance_exclude: exclude.map(to_vec),
            },
            actual: "interface Eth1\n description customer-a\n mtu 9000".to_string(),
            intended: "interface Eth1\n description customer-b\n mtu 9000".to_string(),
        }
    }

    #[test]
    fn test_include_and_exclude() {
        assert_eq!(include(&["^interface"], CONFIG).unwrap(), vec!["interface Eth1"]);
        assert_eq!(exclude(&["^description"], CONFIG).unwrap(), vec!["interface Eth1"]);
        assert!(include::<&str>(&[], CONFIG).unwrap().is_empty());
        assert_eq!(exclude::<&str>(&[], CONFIG).unwrap().len(), 2);
    }

    #[test]
    fn test_include_matches_anywhere_in_line() {
        let lines = include(&["mtu"], "interface Eth1\n mtu 9000\n").unwrap();
        assert_eq!(lines, vec![" mtu 9000"]);
    }

    #[test]
    fn test_invalid_pattern() {
        let err = include(&["^ok", "(unclosed"], CONFIG).unwrap_err();
        assert!(matches!(
            err,
            HelperError::PatternCompileError { ref pattern, .. } if pattern == "(unclosed"
        ));
        assert!(exclude(&["[z-a]"], CONFIG).is_err());
    }

    #[test]
    fn test_cli_compliance() {
        let result = cli_compliance("a\nb", "a\nb");
        assert!(result.compliance);
        assert!(result.ordered);
        assert_eq!(result.compliance_int, 1);

        let result = cli_compliance("b\na", "a\nb");
        assert!(result.compliance);
        assert!(!result.ordered);

        let result = cli_compliance("a\nc", "a\nb");
        assert!(!result.compliance);
        assert_eq!(result.compliance_int, 0);
        assert_eq!(result.missing, "b");
        assert_eq!(result.extra, "c");
    }

    #[test]
    fn test_custom_compliance_include_filter() {
        let bypass = ComplianceBypass::default();

        let result = custom_compliance(&object(Some(&["mtu"]), None), &bypass).unwrap();
        assert!(result.compliance);

        let result = custom_compliance(&object(Some(&["description"]), None), &bypass).unwrap();
        assert!(!result.compliance);
        assert_eq!(result.missing, " description customer-b");
        assert_eq!(result.extra, " description customer-a");
    }

    #[test]
    fn test_custom_compliance_exclude_filter() {
        let bypass = ComplianceBypass::default();
        let result = custom_compliance(&object(None, Some(&["description"])), &bypass).unwrap();
        assert!(result.compliance);

        let result = custom_compliance(&object(None, None), &bypass).unwrap();
        assert!(!result.compliance);
    }

    #[test]
    fn test_custom_compliance_bypass() {
        let obj = object(None, None);

        let bypass = ComplianceBypass::new(vec!["edge".to_string()], vec![]);
        assert_eq!(custom_compliance(&obj, &bypass).unwrap(), ComplianceDetails::compliant());

        let bypass = ComplianceBypass::new(vec![], vec!["interfaces".to_string()]);
        assert!(custom_compliance(&obj, &bypass).unwrap().compliance);

        let bypass = ComplianceBypass::new(vec!["core".to_string()], vec!["bgp".to_string()]);
        assert!(!custom_compliance(&obj, &bypass).unwrap().compliance);
    }

    #[test]
    fn test_custom_compliance_bad_rule_pattern() {
        let obj = object(Some(&["("]), None);
        assert!(custom_compliance(&obj, &ComplianceBypass::default()).is_err());
    }
}
