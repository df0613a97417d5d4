//! HP ProCurve getters over an SSH/SNMP session.

use indexmap::IndexMap;
use ipnetwork::ipv4_mask_to_prefix;

use super::procurve_text::{
    parse_interfaces_status, parse_interfaces_types, parse_ip_addresses, parse_trunks,
    parse_vlans, ProcurveVlan,
};
use super::InterfaceInventoryProvider;
use crate::error::{HelperError, Result};
use crate::models::{
    Interface, InterfaceAddresses, InterfaceType, InterfaceVlanMode, PrefixLength, VlanRecord,
};
use crate::utils::strip_trunk_suffix;

/// CLI and SNMP access supplied by the caller
pub trait ProcurveSession {
    fn send_command(&mut self, command: &str) -> anyhow::Result<String>;

    /// Interface name to ifIndex
    fn interface_map(&mut self) -> anyhow::Result<IndexMap<String, String>>;

    /// Walk one MIB object, returning table index to value
    fn walk_mib(&mut self, object: &str) -> anyhow::Result<IndexMap<String, String>>;
}

/// ProcurveTrunk is a trunk group with its member ports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcurveTrunk {
    pub name: String,
    pub interfaces: Vec<String>,
}

/// Speed and NetBox type for a ProCurve port type
fn media_speed_and_type(port_type: &str) -> (u64, InterfaceType) {
    match port_type {
        "SFP+SR" | "SFP+LR" | "SFP+DA1" | "10GbE-SR" => (10000, InterfaceType::Sfpp),
        "10GbE-CX4" => (10000, InterfaceType::Cx4),
        "10GbE-T" => (10000, InterfaceType::Base10T),
        _ => (1000, InterfaceType::Base1000T),
    }
}

fn mib_value<'a>(table: &'a IndexMap<String, String>, index: &str) -> &'a str {
    table.get(index).map(String::as_str).unwrap_or("")
}

/// Prefix length of a contiguous netmask
fn add_member(vlans: &mut IndexMap<u16, VlanRecord>, vlan_id: u16, port: &str) -> Result<()> {
    let vlan = vlans.get_mut(&vlan_id).ok_or_else(|| {
        HelperError::malformed("show vlans", format!("port {} is in unknown vlan {}", port, vlan_id))
    })?;
    vlan.add_interface(port);
    Ok(())
}

fn unknown_interface(source: &str, name: &str) -> HelperError {
    HelperError::malformed(source, format!("interface {} is not in the interface map", name))
}

/// ProcurveDriver implements the interface getters for ProCurve switches.
/// The VLAN list and the VLAN name walk are fetched once per driver.
pub struct ProcurveDriver<S> {
    session: S,
    vlans: Option<Vec<ProcurveVlan>>,
    vlan_map: Option<IndexMap<String, String>>,
}

impl<S: ProcurveSession> ProcurveDriver<S> {
    pub fn new(session: S) -> Self {
        Self {
            session,
            vlans: None,
            vlan_map: None,
        }
    }

    pub fn into_inner(self) -> S {
        self.session
    }

    fn send(&mut self, command: &str) -> Result<String> {
        self.session
            .send_command(command)
            .map_err(|e| HelperError::collaborator(command, e))
    }

    fn interface_map(&mut self) -> Result<IndexMap<String, String>> {
        self.session
            .interface_map()
            .map_err(|e| HelperError::collaborator("interface map", e))
    }

    fn walk(&mut self, object: &str) -> Result<IndexMap<String, String>> {
        self.session
            .walk_mib(object)
            .map_err(|e| HelperError::collaborator(object, e))
    }

    fn vlans(&mut self) -> Result<Vec<ProcurveVlan>> {
        if let Some(vlans) = &self.vlans {
            return Ok(vlans.clone());
        }
        let output = self.send("show vlans")?;
        let vlans = parse_vlans(&output);
        self.vlans = Some(vlans.clone());
        Ok(vlans)
    }

    /// VLAN ids carried by a port or trunk
    fn port_vlans(&mut self, port: &str) -> Result<Vec<u16>> {
        let output = self.send(&format!("show vlans ports {}", port))?;
        Ok(parse_vlans(&output).into_iter().map(|v| v.vlan_id).collect())
    }

    /// Interface name of a VLAN's routed interface. Some firmware names it
    /// after the VLAN, otherwise it is `DEFAULT_VLAN` or `VLAN<id>`.
    fn vlan_interface(&mut self, vlan_id: u16, ifs: &IndexMap<String, String>) -> Result<String> {
        if self.vlan_map.is_none() {
            self.vlan_map = Some(self.walk("dot1qVlanStaticName")?);
        }

        let static_name = self
            .vlan_map
            .as_ref()
            .and_then(|map| map.get(&vlan_id.to_string()));
        if let Some(name) = static_name.filter(|name| ifs.contains_key(*name)) {
            return Ok(name.clone());
        }
        if vlan_id == 1 {
            return Ok("DEFAULT_VLAN".to_string());
        }
        Ok(format!("VLAN{}", vlan_id))
    }

    /// Trunk groups from `show trunks`, keyed by group name
    pub fn trunks(&mut self) -> Result<IndexMap<String, ProcurveTrunk>> {
        let output = self.send("show trunks")?;
        let mut trunks: IndexMap<String, ProcurveTrunk> = IndexMap::new();
        for row in parse_trunks(&output) {
            trunks
                .entry(row.group)
                .or_insert_with(|| ProcurveTrunk {
                    name: row.name,
                    interfaces: Vec::new(),
                })
                .interfaces
                .push(row.port);
        }
        Ok(trunks)
    }

    /// IPv4 address of each routed VLAN interface
    pub fn get_interfaces_ip(&mut self) -> Result<IndexMap<String, InterfaceAddresses>> {
        let ifs = self.interface_map()?;
        let aliases = self.walk("ifAlias")?;

        let mut output = self.send("show ip")?;
        // Long VLAN names are truncated in `show ip`
        if output.contains("...") {
            output = self.send("show vlan custom id name ipconfig ipaddr ipmask")?;
        }

        let mut addresses: IndexMap<String, InterfaceAddresses> = IndexMap::new();
        for row in parse_ip_addresses(&output) {
            let name = if ifs.contains_key(&row.vlan) {
                row.vlan.clone()
            } else {
                // VLAN interfaces named after the VLAN only show up in ifAlias
                aliases
                    .iter()
                    .find(|(_, alias)| **alias == row.vlan)
                    .and_then(|(index, _)| ifs.iter().find(|(_, i)| *i == index))
                    .map(|(name, _)| name.clone())
                    .ok_or_else(|| unknown_interface("show ip", &row.vlan))?
            };
            let length = ipv4_mask_to_prefix(row.mask).map_err(|e| {
                HelperError::malformed("show ip", format!("bad netmask {} on {}: {}", row.mask, name, e))
            })?;

            let mut entry = InterfaceAddresses::default();
            entry
                .ipv4
                .insert(row.address.to_string(), PrefixLength { prefix_length: length });
            addresses.insert(name, entry);
        }

        Ok(addresses)
    }
}

impl<S: ProcurveSession> InterfaceInventoryProvider for ProcurveDriver<S> {
    fn get_interfaces(&mut self) -> Result<IndexMap<String, Interface>> {
        let ifs = self.interface_map()?;
        let vlans = self.vlans()?;

        let aliases = self.walk("ifAlias")?;
        let macs = self.walk("ifPhysAddress")?;
        let mtus = self.walk("ifMtu")?;
        let admin_states = self.walk("ifAdminStatus")?;
        let oper_states = self.walk("ifOperStatus")?;

        let mut interfaces: IndexMap<String, Interface> = IndexMap::new();
        for (name, index) in &ifs {
            let mtu_raw = mib_value(&mtus, index).replace(',', "");
            let mtu = if mtu_raw.is_empty() {
                0
            } else {
                mtu_raw.parse::<u32>().map_err(|_| {
                    HelperError::malformed("ifMtu", format!("bad MTU '{}' on {}", mtu_raw, name))
                })?
            };

            let interface = Interface {
                is_up: mib_value(&oper_states, index) == "1",
                is_enabled: mib_value(&admin_states, index) == "1",
                description: mib_value(&aliases, index).to_string(),
                mac_address: mib_value(&macs, index).to_string(),
                mtu,
                ..Interface::default()
            };
            interfaces.insert(name.clone(), interface);
        }

        // Older models don't support the custom view
        let mut port_types = parse_interfaces_types(&self.send("show interfaces custom all port:10 type")?);
        if port_types.is_empty() {
            port_types = parse_interfaces_types(&self.send("show interfaces config")?);
        }
        for row in port_types {
            let (speed, kind) = media_speed_and_type(&row.port_type);
            let port = strip_trunk_suffix(&row.port);
            let interface = interfaces
                .get_mut(port)
                .ok_or_else(|| unknown_interface("show interfaces", port))?;
            interface.speed = speed;
            interface.interface_type = Some(kind);
        }

        for (trunk, data) in self.trunks()? {
            let interface = interfaces
                .get_mut(&trunk)
                .ok_or_else(|| unknown_interface("show trunks", &trunk))?;
            interface.children = Some(data.interfaces);
        }

        for vlan in vlans {
            let name = self.vlan_interface(vlan.vlan_id, &ifs)?;
            let interface = interfaces
                .get_mut(&name)
                .ok_or_else(|| unknown_interface("show vlans", &name))?;
            interface.interface_type = Some(InterfaceType::Virtual);
        }

        Ok(interfaces)
    }

    fn get_interfaces_vlans(&mut self) -> Result<IndexMap<String, InterfaceVlanMode>> {
        let mut result: IndexMap<String, InterfaceVlanMode> = IndexMap::new();

        let output = self.send("show interfaces status")?;
        for port in parse_interfaces_status(&output) {
            let untagged = port.untagged.parse::<u16>().ok();
            let entry = match port.tagged.as_str() {
                "No" => InterfaceVlanMode {
                    access_vlan: untagged,
                    ..InterfaceVlanMode::access()
                },
                "multi" => InterfaceVlanMode::trunk(self.port_vlans(&port.port)?, untagged, false),
                tagged => InterfaceVlanMode::trunk(tagged.parse::<u16>().ok(), untagged, false),
            };
            result.insert(strip_trunk_suffix(&port.port).to_string(), entry);
        }

        for trunk in self.trunks()?.into_keys() {
            let vlans = self.port_vlans(&trunk)?;
            result.insert(trunk, InterfaceVlanMode::trunk(vlans, None, true));
        }

        let ifs = self.interface_map()?;
        for vlan in self.vlans()? {
            let name = self.vlan_interface(vlan.vlan_id, &ifs)?;
            result.insert(name, InterfaceVlanMode::access_in(vlan.vlan_id));
        }

        Ok(result)
    }

    fn get_vlans(&mut self) -> Result<IndexMap<u16, VlanRecord>> {
        let ifs = self.interface_map()?;

        let mut result: IndexMap<u16, VlanRecord> = IndexMap::new();
        for vlan in self.vlans()? {
            let mut record = VlanRecord::new(vlan.vlan_id, vlan.name);
            record.add_interface(self.vlan_interface(vlan.vlan_id, &ifs)?);
            result.insert(vlan.vlan_id, record);
        }

        let output = self.send("show interfaces status")?;
        for port in parse_interfaces_status(&output) {
            // Trunk members are reported through their trunk below
            if port.port.contains("Trk") {
                continue;
            }
            if let Ok(vlan_id) = port.untagged.parse::<u16>() {
                add_member(&mut result, vlan_id, &port.port)?;
            }
            if let Ok(vlan_id) = port.tagged.parse::<u16>() {
                add_member(&mut result, vlan_id, &port.port)?;
            }
            if port.tagged == "multi" {
                for vlan_id in self.port_vlans(&port.port)? {
                    add_member(&mut result, vlan_id, &port.port)?;
                }
            }
        }

        for trunk in self.trunks()?.into_keys() {
            for vlan_id in self.port_vlans(&trunk)? {
                add_member(&mut result, vlan_id, &trunk)?;
            }
        }

        Ok(result)
    }
}
