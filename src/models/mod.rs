mod compliance;
mod interfaces;
mod network;
mod services;
mod vlans;

pub use compliance::{ComplianceDetails, ComplianceObject, ComplianceRule};
pub use interfaces::{Interface, InterfaceRecord, InterfaceType, InterfaceTypeRecord, MrvLag, MrvPort};
pub use network::{
    instance_type, InterfaceAddresses, NetworkInstance, NetworkInstanceInterfaces,
    NetworkInstanceState, PrefixLength,
};
pub use services::{service_type, IpPrefix, IpRanges, ServiceId, ServiceInventory};
pub use vlans::{InterfaceVlanMode, VlanMode, VlanRecord};
