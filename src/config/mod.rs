use std::env;

use crate::compliance::ComplianceBypass;

/// Config holds the environment-driven helper settings
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Device roles whose compliance checks always pass
    pub compliance_bypass_roles: Vec<String>,
    /// Compliance rule features that always pass
    pub compliance_bypass_features: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self {
            compliance_bypass_roles: split_list(&get_env("NSOT_COMPLIANCE_BYPASS_ROLES", "")),
            compliance_bypass_features: split_list(&get_env(
                "NSOT_COMPLIANCE_BYPASS_FEATURES",
                "",
            )),
        }
    }

    pub fn compliance_bypass(&self) -> ComplianceBypass {
        ComplianceBypass {
            roles: self.compliance_bypass_roles.clone(),
            features: self.compliance_bypass_features.clone(),
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Split a comma separated setting, dropping blanks
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
