//! Interface classification and vendor interface-name conversions.
//!
//! Virtual interface naming seen across the estate:
//!
//! - Arista: `Ethernet4.420`, `Loopback1`, `Vlan3878`, LAGs `Port-Channel10`
//! - NetIron: `loopback1`, `ve149`, `Tunnel1`, LAGs `lag1`
//! - MRV: `vif461`, LAGs `t1`
//! - ProCurve: `DEFAULT_VLAN`, LAGs `Trk1`

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::error::Result;
use crate::models::{InterfaceType, MrvPort};
use crate::utils::vlanlist_to_config;

static VIRTUAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:loopback|ve|tunnel|vlan|vif|default_vlan|default-vlan|lo|null)")
        .expect("Invalid virtual interface regex")
});

static SUBINTERFACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:ethernet|port-channel)\d+.*\.\d+").expect("Invalid subinterface regex")
});

static LAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:lag\d+|port-channel\d+|t\d+|trk\d+)").expect("Invalid LAG regex")
});

static NETIRON_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d*(\D+)(\d+[\d|/]*)").expect("Invalid NetIron interface regex")
});

/// Work out the NetBox interface type from what a device reports.
///
/// A known `declared_type` slug wins outright. Otherwise the name decides
/// (virtual, then sub-interface, then LAG), then the link speed, and finally
/// everything else is assumed to be 1000BASE-T. Never fails.
pub fn classify(name: &str, speed_mbps: Option<u64>, declared_type: Option<&str>) -> InterfaceType {
    if let Some(declared) = declared_type.filter(|t| !t.is_empty()) {
        match InterfaceType::from_slug(declared) {
            Some(known) => return known,
            None => tracing::debug!(
                "interface {}: ignoring unknown declared type '{}'",
                name,
                declared
            ),
        }
    }

    let lower = name.to_lowercase();
    if VIRTUAL_RE.is_match(&lower) || SUBINTERFACE_RE.is_match(&lower) {
        return InterfaceType::Virtual;
    }
    if LAG_RE.is_match(&lower) {
        return InterfaceType::Lag;
    }

    speed_mbps
        .and_then(InterfaceType::from_speed)
        .unwrap_or(InterfaceType::Base1000T)
}

/// Convert a normalized NetIron interface name to the name used in config.
///
/// ```text
/// GigabitEthernet1      ->  ethernet 1
/// 10GigabitEthernet2/22 ->  ethernet 2/22
/// Ve1732                ->  ve 1732
/// Loopback1             ->  loopback 1
/// Ethernetmgmt1         ->  management 1
/// ```
pub fn netiron_normalized_interface_to_config(interface_name: &str) -> String {
    if let Some(caps) = NETIRON_NAME_RE.captures(interface_name) {
        let kind = &caps[1];
        let number = &caps[2];
        if kind.contains("mgmt") {
            return format!("management {}", number);
        } else if kind.contains("Ethernet") {
            return format!("ethernet {}", number);
        } else if kind.contains("Ve") {
            return format!("ve {}", number);
        } else if kind.contains("Loopback") {
            return format!("loopback {}", number);
        }
    }

    interface_name.to_string()
}

/// Build the MRV port-list for a config line from numbered physical ports,
/// e.g. `1-16` or `1-13,15-16,t1`. LAG members are represented by their LAG.
pub fn mrv_physical_interfaces_to_config(ports: &[MrvPort]) -> Result<String> {
    let mut portlist: Vec<u16> = Vec::new();
    let mut trunklist: Vec<String> = Vec::new();

    for port in ports {
        if port.port_type == "VIRTUAL" {
            continue;
        }
        let Ok(number) = port.name.parse::<u16>() else {
            continue;
        };
        if !port.name.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        match &port.lag {
            Some(lag) => {
                if !trunklist.contains(&lag.name) {
                    trunklist.push(lag.name.clone());
                }
            }
            None => portlist.push(number),
        }
    }

    if portlist.is_empty() {
        return Ok(String::new());
    }

    let mut config = vlanlist_to_config(&portlist, 2)?.join(",");
    if !trunklist.is_empty() {
        trunklist.sort();
        config.push(',');
        config.push_str(&trunklist.join(","));
    }
    Ok(config)
}
