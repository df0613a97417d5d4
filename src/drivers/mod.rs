//! Vendor drivers for the NAPALM style interface getters.
//!
//! Drivers never talk to a device themselves. Each one wraps a command
//! runner supplied by the caller (an eAPI connection, an SSH/SNMP session)
//! so tests can feed canned output.

use indexmap::IndexMap;

use crate::error::Result;
use crate::models::{Interface, InterfaceVlanMode, VlanRecord};

pub mod eos;
pub mod procurve;
mod procurve_text;

pub use eos::{EapiRunner, EosDriver};
pub use procurve::{ProcurveDriver, ProcurveSession};
pub use procurve_text::{
    parse_interfaces_status, parse_interfaces_types, parse_ip_addresses, parse_trunks,
    parse_vlans, ProcurveIpRow, ProcurvePortStatus, ProcurvePortType, ProcurveTrunkPort,
    ProcurveVlan,
};

/// Interface inventory getters implemented by every driver
pub trait InterfaceInventoryProvider {
    fn get_interfaces(&mut self) -> Result<IndexMap<String, Interface>>;

    fn get_interfaces_vlans(&mut self) -> Result<IndexMap<String, InterfaceVlanMode>>;

    fn get_vlans(&mut self) -> Result<IndexMap<u16, VlanRecord>>;
}
