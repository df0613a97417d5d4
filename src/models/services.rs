use serde::{Deserialize, Serialize};

/// Canonical service type values
pub mod service_type {
    pub const P2P_MANAGED: &str = "Network - P2P Managed";
}

/// ServiceInventory links a device to a provisioned customer service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInventory {
    pub serviceid: ServiceId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceId {
    pub service_type: String,
}

/// IpRanges is the published SMN address range document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpRanges {
    #[serde(default)]
    pub prefixes: Vec<IpPrefix>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpPrefix {
    pub ip_prefix: String,
}
