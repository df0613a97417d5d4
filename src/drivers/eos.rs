//! Arista EOS getters over eAPI.

use std::collections::BTreeMap;
use std::net::IpAddr;

use indexmap::IndexMap;
use ipnetwork::IpNetwork;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::InterfaceInventoryProvider;
use crate::error::{HelperError, Result};
use crate::models::{
    instance_type, Interface, InterfaceAddresses, InterfaceType, InterfaceVlanMode,
    NetworkInstance, NetworkInstanceInterfaces, NetworkInstanceState, PrefixLength, VlanRecord,
};
use crate::utils::split_interface_name;
use crate::vlans::{merge_vlans, reconcile, ReconcileSources, SubinterfaceVlan, TrunkState};

static ENCAPSULATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"encapsulation dot1q vlan (?:\d+ inner )?(\d+)")
        .expect("Invalid encapsulation regex")
});

static PATCH_PANEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"interface (\S+) dot1q vlan (\d+)").expect("Invalid patch panel regex")
});

static INTERFACE_ACL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^interface (\S+)|^[ \t]+ip access-group (\S+) in\b")
        .expect("Invalid interface ACL regex")
});

const NO_IPV6_INTERFACES: &str = "No IPv6 configured interfaces";

/// eAPI command execution supplied by the caller
pub trait EapiRunner {
    /// Run commands with JSON encoding, returning one document per command
    fn run_json(&mut self, commands: &[&str]) -> anyhow::Result<Vec<Value>>;

    /// Run one command with text encoding
    fn run_text(&mut self, command: &str) -> anyhow::Result<String>;
}

#[derive(Debug, Deserialize)]
struct ShowInterfaces {
    interfaces: IndexMap<String, EosInterface>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EosInterface {
    line_protocol_status: String,
    interface_status: String,
    #[serde(default)]
    description: String,
    last_status_change_timestamp: Option<f64>,
    mtu: u32,
    bandwidth: f64,
    physical_address: Option<String>,
    member_interfaces: Option<IndexMap<String, Value>>,
}

/// `show interfaces` when only names and descriptions are needed
#[derive(Debug, Deserialize)]
struct ShowInterfaceSummaries {
    interfaces: IndexMap<String, InterfaceSummary>,
}

#[derive(Debug, Deserialize)]
struct InterfaceSummary {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ShowInterfacesTrunk {
    #[serde(default)]
    trunks: IndexMap<String, EosTrunk>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EosTrunk {
    allowed_vlans: VlanIds,
    active_vlans: Option<VlanIds>,
    native_vlan: Option<u16>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VlanIds {
    #[serde(default)]
    vlan_ids: Vec<u16>,
}

#[derive(Debug, Deserialize)]
struct ShowVlan {
    vlans: IndexMap<String, EosVlan>,
}

#[derive(Debug, Deserialize)]
struct EosVlan {
    #[serde(default)]
    name: String,
    #[serde(default)]
    interfaces: IndexMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShowInterfacesStatus {
    interface_statuses: IndexMap<String, EosInterfaceStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EosInterfaceStatus {
    #[serde(default)]
    interface_type: String,
}

#[derive(Debug, Default, Deserialize)]
struct ShowMplsInterface {
    #[serde(default)]
    intfs: IndexMap<String, EosMplsInterface>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EosMplsInterface {
    #[serde(default)]
    ldp_configured: bool,
}

#[derive(Debug, Deserialize)]
struct ShowVrf {
    vrfs: IndexMap<String, EosVrf>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EosVrf {
    #[serde(default)]
    route_distinguisher: String,
    #[serde(default)]
    interfaces: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ShowIpInterface {
    #[serde(default)]
    interfaces: IndexMap<String, EosIpInterface>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EosIpInterface {
    #[serde(default)]
    interface_address: EosInterfaceAddress,
    vrf: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EosInterfaceAddress {
    primary_ip: Option<EosIpv4Address>,
    #[serde(default)]
    secondary_ips_ordered_list: Vec<EosIpv4Address>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EosIpv4Address {
    address: String,
    mask_len: u8,
}

#[derive(Debug, Default, Deserialize)]
struct ShowIpv6Interface {
    #[serde(default)]
    interfaces: IndexMap<String, EosIpv6Interface>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EosIpv6Interface {
    link_local: Option<EosIpv6Address>,
    #[serde(default)]
    addresses: Vec<EosIpv6Address>,
}

#[derive(Debug, Deserialize)]
struct EosIpv6Address {
    address: Option<String>,
    /// `fe80::/64`, absent on a bare link-local
    #[serde(default)]
    subnet: String,
}

fn decode<T: DeserializeOwned>(command: &str, output: Option<Value>) -> Result<T> {
    let value = output.ok_or_else(|| HelperError::malformed(command, "no output returned"))?;
    serde_json::from_value(value).map_err(|e| HelperError::malformed(command, e.to_string()))
}

fn vlan_records(show_vlan: ShowVlan) -> Result<Vec<VlanRecord>> {
    show_vlan
        .vlans
        .into_iter()
        .map(|(id, vlan)| -> Result<VlanRecord> {
            let vlan_id: u16 = id
                .parse()
                .map_err(|_| HelperError::malformed("show vlan", format!("bad vlan id '{}'", id)))?;
            let mut record = VlanRecord::new(vlan_id, vlan.name);
            for member in vlan.interfaces.into_keys() {
                record.add_interface(member);
            }
            Ok(record)
        })
        .collect()
}

/// NetBox type for the EOS transceiver names we stock
fn media_type(interface_type: &str) -> Option<InterfaceType> {
    match interface_type {
        "10GBASE-T" => Some(InterfaceType::Base10T),
        "10GBASE-SRL" => Some(InterfaceType::Sfpp),
        "25GBASE-CR" => Some(InterfaceType::Sfp28),
        "40GBASE-SR4" | "40GBASE-LR4" => Some(InterfaceType::Qsfpp),
        "100GBASE-CR4" | "100GBASE-SR4" => Some(InterfaceType::Qsfp28),
        _ => None,
    }
}

/// VLAN id from a sub-interface's running config, `None` when it has no
/// dot1q encapsulation
pub fn parse_encapsulation_vlan(running_config: &str) -> Option<u16> {
    ENCAPSULATION_RE
        .captures(running_config)
        .and_then(|caps| caps[1].parse().ok())
}

/// (interface, vlan) pairs from `show running-config section patch`
pub fn parse_patch_panel(running_config: &str) -> Vec<(String, u16)> {
    PATCH_PANEL_RE
        .captures_iter(running_config)
        .filter_map(|caps| Some((caps[1].to_string(), caps[2].parse::<u16>().ok()?)))
        .collect()
}

/// (interface, access-group) pairs for inbound ACLs in
/// `show running-config | section interface`
pub fn parse_interface_acls(running_config: &str) -> Vec<(String, String)> {
    let mut current: Option<&str> = None;
    let mut acls = Vec::new();
    for caps in INTERFACE_ACL_RE.captures_iter(running_config) {
        if let Some(interface) = caps.get(1) {
            current = Some(interface.as_str());
        } else if let (Some(interface), Some(acl)) = (current, caps.get(2)) {
            acls.push((interface.to_string(), acl.as_str().to_string()));
        }
    }
    acls
}

fn normalize_address(command: &str, address: &str) -> Result<String> {
    address
        .parse::<IpAddr>()
        .map(|ip| ip.to_string())
        .map_err(|_| HelperError::malformed(command, format!("bad address '{}'", address)))
}

fn subnet_length(subnet: &str) -> Result<u8> {
    if subnet.is_empty() {
        return Ok(0);
    }
    subnet
        .parse::<IpNetwork>()
        .map(|network| network.prefix())
        .map_err(|e| {
            HelperError::malformed("show ipv6 interface", format!("bad subnet '{}': {}", subnet, e))
        })
}

fn eos_addresses() -> InterfaceAddresses {
    InterfaceAddresses {
        ipv6: Some(BTreeMap::new()),
        ..Default::default()
    }
}

fn lookup_subinterface_vlan<R: EapiRunner + ?Sized>(
    runner: &mut R,
    interface: &str,
) -> anyhow::Result<Option<u16>> {
    let (kind, number) = split_interface_name(interface);
    let output = runner.run_text(&format!("show running-config interfaces {} {}", kind, number))?;
    Ok(parse_encapsulation_vlan(&output))
}

/// EosDriver implements the interface getters against an eAPI session
pub struct EosDriver<R> {
    runner: R,
}

impl<R: EapiRunner> EosDriver<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn into_inner(self) -> R {
        self.runner
    }

    fn run_json(&mut self, commands: &[&str]) -> Result<std::vec::IntoIter<Value>> {
        let output = self
            .runner
            .run_json(commands)
            .map_err(|e| HelperError::collaborator(&commands.join(", "), e))?;
        if output.len() != commands.len() {
            return Err(HelperError::malformed(
                "eapi",
                format!("expected {} results, got {}", commands.len(), output.len()),
            ));
        }
        Ok(output.into_iter())
    }

    /// VLAN a sub-interface encapsulates
    pub fn subinterface_vlan(&mut self, interface: &str) -> Result<Option<u16>> {
        lookup_subinterface_vlan(&mut self.runner, interface).map_err(|e| {
            HelperError::collaborator(&format!("show running-config interfaces {}", interface), e)
        })
    }

    /// VLANs cross connected by patch panels
    pub fn patch_panel_vlans(&mut self) -> Result<Vec<(String, u16)>> {
        let command = "show running-config section patch";
        let output = self
            .runner
            .run_text(command)
            .map_err(|e| HelperError::collaborator(command, e))?;
        Ok(parse_patch_panel(&output))
    }

    fn show_ipv6_interface(&mut self) -> Result<ShowIpv6Interface> {
        let command = "show ipv6 interface";
        match self.runner.run_json(&[command]) {
            Ok(output) => decode(command, output.into_iter().next()),
            Err(e) if format!("{:#}", e).contains(NO_IPV6_INTERFACES) => {
                tracing::debug!("{}, reporting IPv4 only", NO_IPV6_INTERFACES);
                Ok(ShowIpv6Interface::default())
            }
            Err(e) => Err(HelperError::collaborator(command, e)),
        }
    }

    /// Addresses, VRF and inbound ACL of every routed interface
    pub fn get_interfaces_ip(&mut self) -> Result<IndexMap<String, InterfaceAddresses>> {
        let mut output = self.run_json(&["show ip interface"])?;
        let show_ip: ShowIpInterface = decode("show ip interface", output.next())?;
        let show_ipv6 = self.show_ipv6_interface()?;

        let command = "show running-config | section interface";
        let interface_config = self
            .runner
            .run_text(command)
            .map_err(|e| HelperError::collaborator(command, e))?;

        let mut addresses: IndexMap<String, InterfaceAddresses> = IndexMap::new();
        for (name, details) in show_ip.interfaces {
            let entry = addresses.entry(name).or_insert_with(eos_addresses);
            let configured = details.interface_address;
            // unnumbered interfaces report a 0.0.0.0 primary
            let primary = configured
                .primary_ip
                .into_iter()
                .filter(|ip| ip.address != "0.0.0.0");
            for ip in primary.chain(configured.secondary_ips_ordered_list) {
                if ip.address.is_empty() {
                    continue;
                }
                let address = normalize_address("show ip interface", &ip.address)?;
                entry.ipv4.entry(address).or_insert(PrefixLength {
                    prefix_length: ip.mask_len,
                });
            }
            entry.vrf = details.vrf;
        }

        for (name, details) in show_ipv6.interfaces {
            let entry = addresses.entry(name).or_insert_with(eos_addresses);
            let ipv6 = entry.ipv6.get_or_insert_with(BTreeMap::new);
            for ip in details.link_local.into_iter().chain(details.addresses) {
                let Some(address) = ip.address.filter(|a| !a.is_empty()) else {
                    continue;
                };
                let address = normalize_address("show ipv6 interface", &address)?;
                let prefix_length = subnet_length(&ip.subnet)?;
                ipv6.entry(address).or_insert(PrefixLength { prefix_length });
            }
        }

        for (interface, acl) in parse_interface_acls(&interface_config) {
            if let Some(entry) = addresses.get_mut(&interface) {
                entry.interfaceacl = Some(acl);
            }
        }

        Ok(addresses)
    }

    /// VRFs as NAPALM network instances
    pub fn get_network_instances(&mut self) -> Result<IndexMap<String, NetworkInstance>> {
        let mut output = self.run_json(&["show vrf"])?;
        let show_vrf: ShowVrf = decode("show vrf", output.next())?;

        Ok(show_vrf
            .vrfs
            .into_iter()
            .map(|(name, vrf)| {
                let kind = if name == "default" {
                    instance_type::DEFAULT
                } else {
                    instance_type::L3VRF
                };
                let instance = NetworkInstance {
                    name: name.clone(),
                    instance_type: kind.to_string(),
                    state: NetworkInstanceState {
                        route_distinguisher: vrf.route_distinguisher,
                    },
                    interfaces: NetworkInstanceInterfaces {
                        interface: vrf
                            .interfaces
                            .into_iter()
                            .map(|i| (i, serde_json::Map::new()))
                            .collect(),
                    },
                };
                (name, instance)
            })
            .collect())
    }
}

impl<R: EapiRunner> InterfaceInventoryProvider for EosDriver<R> {
    fn get_interfaces(&mut self) -> Result<IndexMap<String, Interface>> {
        let mut output = self.run_json(&["show interfaces", "show interfaces status"])?;
        let show_interfaces: ShowInterfaces = decode("show interfaces", output.next())?;
        let show_status: ShowInterfacesStatus = decode("show interfaces status", output.next())?;

        let mpls = match self.runner.run_json(&["show mpls interface"]) {
            Ok(result) => decode::<ShowMplsInterface>("show mpls interface", result.into_iter().next())?,
            Err(e) => {
                tracing::debug!("show mpls interface failed, assuming no LDP: {:#}", e);
                ShowMplsInterface::default()
            }
        };

        let mut interfaces: IndexMap<String, Interface> = IndexMap::new();
        for (name, values) in show_interfaces.interfaces {
            let is_up = values.line_protocol_status == "up";
            let mpls_enabled = mpls
                .intfs
                .get(&name)
                .map(|intf| intf.ldp_configured)
                .unwrap_or(false);

            let interface = Interface {
                is_up,
                is_enabled: is_up || values.interface_status != "disabled",
                description: values.description,
                last_flapped: values.last_status_change_timestamp.unwrap_or(-1.0),
                speed: (values.bandwidth * 1e-6) as u64,
                mtu: values.mtu,
                mac_address: values.physical_address.unwrap_or_default(),
                children: values.member_interfaces.map(|members| {
                    members
                        .into_keys()
                        .filter(|member| !member.contains("Peer"))
                        .collect()
                }),
                mpls_enabled: Some(mpls_enabled),
                interface_type: None,
            };
            interfaces.insert(name, interface);
        }

        for (name, status) in show_status.interface_statuses {
            let Some(kind) = media_type(&status.interface_type) else {
                continue;
            };
            match interfaces.get_mut(&name) {
                Some(interface) => interface.interface_type = Some(kind),
                None => tracing::debug!("status reported for unknown interface {}", name),
            }
        }

        Ok(interfaces)
    }

    fn get_interfaces_vlans(&mut self) -> Result<IndexMap<String, InterfaceVlanMode>> {
        let mut output =
            self.run_json(&["show interfaces", "show interfaces trunk", "show vlan"])?;
        let show_interfaces: ShowInterfaceSummaries = decode("show interfaces", output.next())?;
        let show_trunk: ShowInterfacesTrunk = decode("show interfaces trunk", output.next())?;
        let show_vlan: ShowVlan = decode("show vlan", output.next())?;

        let sources = ReconcileSources {
            interfaces: show_interfaces.interfaces.into_keys().collect(),
            trunks: show_trunk
                .trunks
                .into_iter()
                .map(|(name, trunk)| {
                    let state = TrunkState {
                        allowed_vlans: trunk.allowed_vlans.vlan_ids,
                        active_vlans: trunk.active_vlans.map(|active| active.vlan_ids),
                        native_vlan: trunk.native_vlan,
                    };
                    (name, state)
                })
                .collect(),
            vlans: vlan_records(show_vlan)?,
            patch_panel: self.patch_panel_vlans()?,
        };

        let runner = &mut self.runner;
        let mut lookup = |interface: &str| lookup_subinterface_vlan(runner, interface);
        reconcile(&sources, &mut lookup)
    }

    fn get_vlans(&mut self) -> Result<IndexMap<u16, VlanRecord>> {
        let mut output = self.run_json(&["show vlan", "show interfaces"])?;
        let show_vlan: ShowVlan = decode("show vlan", output.next())?;
        let show_interfaces: ShowInterfaceSummaries = decode("show interfaces", output.next())?;

        let base = vlan_records(show_vlan)?;

        let mut subinterfaces = Vec::new();
        for (name, summary) in &show_interfaces.interfaces {
            if !name.contains('.') {
                continue;
            }
            if let Some(vlan_id) = self.subinterface_vlan(name)? {
                subinterfaces.push(SubinterfaceVlan {
                    interface: name.clone(),
                    vlan_id,
                    description: summary.description.clone(),
                });
            }
        }

        let patch_panel = self.patch_panel_vlans()?;
        Ok(merge_vlans(&base, &subinterfaces, &patch_panel))
    }
}
