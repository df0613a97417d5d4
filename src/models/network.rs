use std::collections::BTreeMap;

use serde::Serialize;

/// Canonical network instance type values
pub mod instance_type {
    pub const DEFAULT: &str = "DEFAULT_INSTANCE";
    pub const L3VRF: &str = "L3VRF";
}

/// NetworkInstance is one VRF as returned by get_network_instances
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkInstance {
    pub name: String,
    #[serde(rename = "type")]
    pub instance_type: String,
    pub state: NetworkInstanceState,
    pub interfaces: NetworkInstanceInterfaces,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkInstanceState {
    pub route_distinguisher: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkInstanceInterfaces {
    pub interface: BTreeMap<String, serde_json::Map<String, serde_json::Value>>,
}

/// InterfaceAddresses is the get_interfaces_ip entry for one interface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterfaceAddresses {
    pub ipv4: BTreeMap<String, PrefixLength>,
    /// Only EOS reports IPv6
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<BTreeMap<String, PrefixLength>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vrf: Option<String>,
    /// Inbound access-group applied to the interface
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interfaceacl: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrefixLength {
    pub prefix_length: u8,
}
