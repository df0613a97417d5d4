use serde::{Deserialize, Serialize};

/// ComplianceRule is a golden-config rule with its optional line filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceRule {
    pub feature: String,
    /// Only lines matching one of these patterns are compared
    #[serde(default)]
    pub compliance_include: Option<Vec<String>>,
    /// Lines matching one of these patterns are ignored
    #[serde(default)]
    pub compliance_exclude: Option<Vec<String>>,
}

/// ComplianceObject is one device/feature pair to check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceObject {
    pub device_role: String,
    pub rule: ComplianceRule,
    pub actual: String,
    pub intended: String,
}

/// ComplianceDetails is the result of a compliance check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceDetails {
    pub compliance: bool,
    pub compliance_int: u8,
    pub ordered: bool,
    pub missing: String,
    pub extra: String,
}

impl ComplianceDetails {
    pub fn compliant() -> Self {
        Self {
            compliance: true,
            compliance_int: 1,
            ordered: true,
            missing: String::new(),
            extra: String::new(),
        }
    }
}
