//! Per-interface VLAN mode reconciliation.
//!
//! A switch reports VLAN state in several places that each tell part of the
//! story: the interface list, trunk state, VLAN membership, sub-interface
//! encapsulation and patch-panel cross connects. The passes here fold them
//! into one NAPALM style `get_interfaces_vlans` map. They always run in the
//! order base, trunk, membership, sub-interface, patch panel.

use indexmap::IndexMap;

use crate::error::{HelperError, Result};
use crate::models::{InterfaceVlanMode, VlanMode, VlanRecord};

/// Member name the switch uses for its own VLAN interface
const CPU_MEMBER: &str = "Cpu";

/// Marker for MLAG peer ports, which are never reported back
const PEER_MARKER: &str = "Peer";

/// TrunkState is one entry from `show interfaces trunk`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrunkState {
    pub allowed_vlans: Vec<u16>,
    /// `None` when the switch omits the active VLAN list
    pub active_vlans: Option<Vec<u16>>,
    pub native_vlan: Option<u16>,
}

/// ReconcileSources holds everything the passes read
#[derive(Debug, Clone, Default)]
pub struct ReconcileSources {
    pub interfaces: Vec<String>,
    pub trunks: IndexMap<String, TrunkState>,
    /// VLAN table as reported, `Cpu` and peer members included
    pub vlans: Vec<VlanRecord>,
    /// (interface, vlan) cross connects
    pub patch_panel: Vec<(String, u16)>,
}

/// Resolves the dot1q VLAN a sub-interface encapsulates
pub trait EncapsulationLookup {
    fn encapsulation_vlan(&mut self, interface: &str) -> anyhow::Result<Option<u16>>;
}

impl<F> EncapsulationLookup for F
where
    F: FnMut(&str) -> anyhow::Result<Option<u16>>,
{
    fn encapsulation_vlan(&mut self, interface: &str) -> anyhow::Result<Option<u16>> {
        self(interface)
    }
}

fn is_peer(interface: &str) -> bool {
    interface.contains(PEER_MARKER)
}

/// Map `Cpu` to `Vlan<id>` (moved to the end) and drop peer members
pub fn normalize_vlan_members(vlan: &VlanRecord) -> VlanRecord {
    let mut normalized = VlanRecord::new(vlan.vlan_id, vlan.name.clone());
    let mut has_cpu = false;
    for member in &vlan.interfaces {
        if member == CPU_MEMBER {
            has_cpu = true;
        } else if !is_peer(member) {
            normalized.add_interface(member.as_str());
        }
    }
    if has_cpu {
        normalized.add_interface(format!("Vlan{}", vlan.vlan_id));
    }
    normalized
}

/// Start every non-peer interface as an access port with no VLAN
pub fn base_pass(interfaces: &[String]) -> IndexMap<String, InterfaceVlanMode> {
    interfaces
        .iter()
        .filter(|name| !is_peer(name))
        .map(|name| (name.clone(), InterfaceVlanMode::access()))
        .collect()
}

/// Apply trunk state. The native VLAN only counts when it is allowed on the trunk.
pub fn trunk_pass(
    result: &mut IndexMap<String, InterfaceVlanMode>,
    trunks: &IndexMap<String, TrunkState>,
) {
    for (name, trunk) in trunks {
        if is_peer(name) {
            continue;
        }
        let native_vlan = trunk
            .native_vlan
            .filter(|native| trunk.allowed_vlans.contains(native));
        let active = trunk.active_vlans.clone().unwrap_or_default();

        if !result.contains_key(name) {
            tracing::debug!("trunk {} missing from interface list, adding it", name);
        }
        result.insert(name.clone(), InterfaceVlanMode::trunk(active, native_vlan, true));
    }
}

/// Assign access VLANs from VLAN membership. Trunks are left alone.
pub fn membership_pass(
    result: &mut IndexMap<String, InterfaceVlanMode>,
    vlans: &[VlanRecord],
) -> Result<()> {
    for vlan in vlans {
        for member in &normalize_vlan_members(vlan).interfaces {
            let Some(entry) = result.get_mut(member) else {
                return Err(HelperError::malformed(
                    "vlan membership",
                    format!("vlan {} lists unknown interface {}", vlan.vlan_id, member),
                ));
            };
            if entry.mode == VlanMode::Access {
                entry.access_vlan = Some(vlan.vlan_id);
            }
        }
    }
    Ok(())
}

/// Set the access VLAN of dotted sub-interfaces from their encapsulation.
/// Lookup failures are logged and the interface keeps its current state.
pub fn subinterface_pass<L: EncapsulationLookup + ?Sized>(
    result: &mut IndexMap<String, InterfaceVlanMode>,
    lookup: &mut L,
) {
    for (name, entry) in result.iter_mut().filter(|(name, _)| name.contains('.')) {
        match lookup.encapsulation_vlan(name) {
            Ok(Some(vlan)) => entry.access_vlan = Some(vlan),
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to look up encapsulation for {}: {:#}", name, e),
        }
    }
}

/// Patch-panel cross connects tag the VLAN on the interface and force trunk mode
pub fn patch_panel_pass(
    result: &mut IndexMap<String, InterfaceVlanMode>,
    patch_panel: &[(String, u16)],
) -> Result<()> {
    for (interface, vlan) in patch_panel {
        let Some(entry) = result.get_mut(interface) else {
            return Err(HelperError::malformed(
                "patch panel",
                format!("vlan {} patched to unknown interface {}", vlan, interface),
            ));
        };
        entry.trunk_vlans.insert(*vlan);
        entry.mode = VlanMode::Trunk;
    }
    Ok(())
}

/// Run every pass over `sources` and return the per-interface VLAN modes
pub fn reconcile<L: EncapsulationLookup + ?Sized>(
    sources: &ReconcileSources,
    lookup: &mut L,
) -> Result<IndexMap<String, InterfaceVlanMode>> {
    let mut result = base_pass(&sources.interfaces);
    trunk_pass(&mut result, &sources.trunks);
    membership_pass(&mut result, &sources.vlans)?;
    subinterface_pass(&mut result, lookup);
    patch_panel_pass(&mut result, &sources.patch_panel)?;
    Ok(result)
}

/// SubinterfaceVlan is a sub-interface with the VLAN it encapsulates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubinterfaceVlan {
    pub interface: String,
    pub vlan_id: u16,
    pub description: String,
}

/// Build the `get_vlans` table: the switch VLAN table, then VLANs used by
/// sub-interfaces (new ones named after the sub-interface description), then
/// patch-panel VLANs (new ones unnamed).
pub fn merge_vlans(
    base: &[VlanRecord],
    subinterfaces: &[SubinterfaceVlan],
    patch_panel: &[(String, u16)],
) -> IndexMap<u16, VlanRecord> {
    let mut vlans: IndexMap<u16, VlanRecord> = base
        .iter()
        .map(|vlan| (vlan.vlan_id, normalize_vlan_members(vlan)))
        .collect();

    for sub in subinterfaces {
        vlans
            .entry(sub.vlan_id)
            .or_insert_with(|| VlanRecord::new(sub.vlan_id, sub.description.clone()))
            .add_interface(sub.interface.as_str());
    }

    for (interface, vlan_id) in patch_panel {
        vlans
            .entry(*vlan_id)
            .or_insert_with(|| VlanRecord::new(*vlan_id, ""))
            .add_interface(interface.as_str());
    }

    vlans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn vlan(id: u16, name: &str, members: &[&str]) -> VlanRecord {
        let mut record = VlanRecord::new(id, name);
        for member in members {
            record.add_interface(*member);
        }
        record
    }

    fn no_lookup(_: &str) -> anyhow::Result<Option<u16>> {
        Ok(None)
    }

    fn sources() -> ReconcileSources {
        let mut trunks = IndexMap::new();
        trunks.insert(
            "Port-Channel1".to_string(),
            TrunkState {
                allowed_vlans: vec![1, 100, 200],
                active_vlans: Some(vec![100, 200]),
                native_vlan: Some(1),
            },
        );
        trunks.insert(
            "Ethernet3".to_string(),
            TrunkState {
                allowed_vlans: vec![300],
                active_vlans: None,
                native_vlan: Some(1),
            },
        );
        trunks.insert(
            "PeerPort-Channel9".to_string(),
            TrunkState::default(),
        );

        ReconcileSources {
            interfaces: names(&[
                "Ethernet1",
                "Ethernet2",
                "Ethernet4.420",
                "Port-Channel1",
                "PeerEthernet1",
                "Vlan100",
            ]),
            trunks,
            vlans: vec![
                vlan(100, "customer-a", &["Ethernet1", "Port-Channel1", "Cpu", "PeerEthernet1"]),
                vlan(200, "customer-b", &["Ethernet2", "Port-Channel1"]),
            ],
            patch_panel: vec![("Ethernet2".to_string(), 555)],
        }
    }

    #[test]
    fn test_normalize_vlan_members() {
        let normalized = normalize_vlan_members(&vlan(10, "x", &["Cpu", "Ethernet1", "PeerEthernet1"]));
        assert_eq!(
            normalized.interfaces.iter().collect::<Vec<_>>(),
            vec!["Ethernet1", "Vlan10"]
        );
    }

    #[test]
    fn test_base_pass_skips_peer() {
        let result = base_pass(&names(&["Ethernet1", "PeerEthernet1"]));
        assert_eq!(result.len(), 1);
        assert_eq!(result["Ethernet1"], InterfaceVlanMode::access());
    }

    #[test]
    fn test_trunk_pass() {
        let src = sources();
        let mut result = base_pass(&src.interfaces);
        trunk_pass(&mut result, &src.trunks);

        let po = &result["Port-Channel1"];
        assert!(po.is_trunk());
        assert_eq!(po.native_vlan, Some(1));
        assert!(po.tagged_native_vlan);
        assert_eq!(po.trunk_vlans.iter().copied().collect::<Vec<_>>(), vec![100, 200]);

        // native not allowed, no active list, not in base list
        let eth3 = &result["Ethernet3"];
        assert!(eth3.is_trunk());
        assert_eq!(eth3.native_vlan, None);
        assert!(eth3.trunk_vlans.is_empty());

        assert!(!result.contains_key("PeerPort-Channel9"));
    }

    #[test]
    fn test_reconcile() {
        let src = sources();
        let mut lookup = |name: &str| -> anyhow::Result<Option<u16>> {
            assert_eq!(name, "Ethernet4.420");
            Ok(Some(420))
        };
        let result = reconcile(&src, &mut lookup).unwrap();

        assert_eq!(result["Ethernet1"].access_vlan, Some(100));
        assert_eq!(result["Vlan100"].access_vlan, Some(100));
        assert_eq!(result["Ethernet4.420"].access_vlan, Some(420));
        assert_eq!(result["Port-Channel1"].access_vlan, None);

        let eth2 = &result["Ethernet2"];
        assert_eq!(eth2.mode, VlanMode::Trunk);
        assert_eq!(eth2.access_vlan, Some(200));
        assert!(eth2.trunk_vlans.contains(&555));
        assert!(!result.contains_key("PeerEthernet1"));
    }

    #[test]
    fn test_membership_pass_idempotent() {
        let src = sources();
        let mut result = base_pass(&src.interfaces);
        trunk_pass(&mut result, &src.trunks);
        membership_pass(&mut result, &src.vlans).unwrap();
        let once = result.clone();
        membership_pass(&mut result, &src.vlans).unwrap();
        assert_eq!(once, result);
    }

    #[test]
    fn test_reconcile_idempotent() {
        let src = sources();
        let mut result = reconcile(&src, &mut no_lookup).unwrap();
        let once = result.clone();
        trunk_pass(&mut result, &src.trunks);
        membership_pass(&mut result, &src.vlans).unwrap();
        patch_panel_pass(&mut result, &src.patch_panel).unwrap();
        assert_eq!(once, result);
    }

    #[test]
    fn test_membership_never_sets_trunk_access_vlan() {
        let src = sources();
        let result = reconcile(&src, &mut no_lookup).unwrap();
        for entry in result.values().filter(|e| e.is_trunk() && !e.trunk_vlans.contains(&555)) {
            assert_eq!(entry.access_vlan, None);
        }
    }

    #[test]
    fn test_unknown_member_is_malformed() {
        let mut src = sources();
        src.vlans.push(vlan(300, "ghost", &["Ethernet99"]));
        assert!(matches!(
            reconcile(&src, &mut no_lookup),
            Err(HelperError::MalformedSourceData { .. })
        ));
    }

    #[test]
    fn test_unknown_patch_panel_interface_is_malformed() {
        let mut src = sources();
        src.patch_panel.push(("Ethernet99".to_string(), 10));
        assert!(reconcile(&src, &mut no_lookup).is_err());
    }

    #[test]
    fn test_subinterface_lookup_failure_is_skipped() {
        let src = sources();
        let mut failing = |_: &str| -> anyhow::Result<Option<u16>> { anyhow::bail!("eapi timeout") };
        let result = reconcile(&src, &mut failing).unwrap();
        assert_eq!(result["Ethernet4.420"].access_vlan, None);
    }

    #[test]
    fn test_merge_vlans() {
        let base = vec![vlan(100, "customer-a", &["Ethernet1", "Cpu", "PeerEthernet1"])];
        let subs = vec![
            SubinterfaceVlan {
                interface: "Ethernet4.100".to_string(),
                vlan_id: 100,
                description: "ignored".to_string(),
            },
            SubinterfaceVlan {
                interface: "Ethernet4.420".to_string(),
                vlan_id: 420,
                description: "transit".to_string(),
            },
        ];
        let patch = vec![("Ethernet5".to_string(), 420), ("Ethernet6".to_string(), 555)];

        let vlans = merge_vlans(&base, &subs, &patch);
        assert_eq!(vlans.keys().copied().collect::<Vec<_>>(), vec![100, 420, 555]);
        assert_eq!(vlans[&100].name, "customer-a");
        assert_eq!(
            vlans[&100].interfaces.iter().collect::<Vec<_>>(),
            vec!["Ethernet1", "Vlan100", "Ethernet4.100"]
        );
        assert_eq!(vlans[&420].name, "transit");
        assert_eq!(
            vlans[&420].interfaces.iter().collect::<Vec<_>>(),
            vec!["Ethernet4.420", "Ethernet5"]
        );
        assert_eq!(vlans[&555].name, "");
    }
}
