use ipnetwork::IpNetwork;

use crate::error::{HelperError, Result};
use crate::models::{service_type, IpRanges, ServiceInventory};

/// Service types of a device's service inventories, in order
pub fn service_types(inventories: &[ServiceInventory]) -> Vec<String> {
    inventories
        .iter()
        .map(|s| s.serviceid.service_type.clone())
        .collect()
}

/// True when any inventory is a managed P2P service
pub fn has_p2p(inventories: &[ServiceInventory]) -> bool {
    inventories
        .iter()
        .any(|s| s.serviceid.service_type == service_type::P2P_MANAGED)
}

/// Check whether `address` (optionally with a `/len` suffix, which is
/// ignored) falls in one of the published SMN prefixes.
pub fn is_smn_ip(address: &str, ranges: &IpRanges) -> Result<bool> {
    let ip = parse_network(address)?.ip();

    for prefix in &ranges.prefixes {
        // host bits in a published prefix are masked off by `contains`
        if parse_network(&prefix.ip_prefix)?.contains(ip) {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Parse `addr` or `addr/len`; a bare address is a host prefix
fn parse_network(value: &str) -> Result<IpNetwork> {
    value
        .trim()
        .parse()
        .map_err(|_| HelperError::InvalidAddress(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IpPrefix, ServiceId};

    fn inventory(service_type: &str) -> ServiceInventory {
        ServiceInventory {
            serviceid: ServiceId {
                service_type: service_type.to_string(),
            },
        }
    }

    fn ranges(prefixes: &[&str]) -> IpRanges {
        IpRanges {
            prefixes: prefixes
                .iter()
                .map(|p| IpPrefix {
                    ip_prefix: p.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_service_types_and_p2p() {
        let inventories = vec![inventory("Internet"), inventory("Network - P2P Managed")];
        assert_eq!(
            service_types(&inventories),
            vec!["Internet", "Network - P2P Managed"]
        );
        assert!(has_p2p(&inventories));
        assert!(!has_p2p(&inventories[..1]));
        assert!(!has_p2p(&[]));
    }

    #[test]
    fn test_inventory_from_json() {
        let inventories: Vec<ServiceInventory> = serde_json::from_str(
            r#"[{"serviceid": {"service_type": "Network - P2P Managed"}}]"#,
        )
        .unwrap();
        assert!(has_p2p(&inventories));
    }

    #[test]
    fn test_is_smn_ip() {
        let smn = ranges(&["192.0.2.0/24", "2001:db8::/32", "198.51.100.7"]);
        assert!(is_smn_ip("192.0.2.10", &smn).unwrap());
        assert!(is_smn_ip("192.0.2.10/30", &smn).unwrap());
        assert!(is_smn_ip("2001:db8:1::1/64", &smn).unwrap());
        assert!(is_smn_ip("198.51.100.7", &smn).unwrap());
        assert!(!is_smn_ip("198.51.100.8", &smn).unwrap());
        assert!(!is_smn_ip("203.0.113.1", &smn).unwrap());
        assert!(!is_smn_ip("10.0.0.1", &IpRanges::default()).unwrap());
    }

    #[test]
    fn test_is_smn_ip_prefix_with_host_bits() {
        let smn = ranges(&["192.0.2.77/24"]);
        assert!(is_smn_ip("192.0.2.1", &smn).unwrap());
        assert!(!is_smn_ip("192.0.3.1", &smn).unwrap());
    }

    #[test]
    fn test_is_smn_ip_zero_length_prefix() {
        assert!(is_smn_ip("203.0.113.1", &ranges(&["0.0.0.0/0"])).unwrap());
        assert!(!is_smn_ip("2001:db8::1", &ranges(&["0.0.0.0/0"])).unwrap());
    }

    #[test]
    fn test_is_smn_ip_invalid() {
        let smn = ranges(&["192.0.2.0/24"]);
        assert!(matches!(
            is_smn_ip("not-an-ip", &smn),
            Err(HelperError::InvalidAddress(_))
        ));
        assert!(is_smn_ip("192.0.2.1", &ranges(&["192.0.2.0/33"])).is_err());
        assert!(is_smn_ip("192.0.2.1", &ranges(&["bogus/24"])).is_err());
        assert!(is_smn_ip("192.0.2.1/40", &smn).is_err());
    }
}
