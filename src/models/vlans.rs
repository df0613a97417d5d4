use indexmap::IndexSet;
use serde::{Deserialize, Serialize, Serializer};

/// VlanMode is the switchport mode of an interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VlanMode {
    Access,
    Trunk,
}

/// InterfaceVlanMode is the NAPALM get_interfaces_vlans entry for one interface.
/// Unset VLANs serialize as -1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceVlanMode {
    pub mode: VlanMode,
    #[serde(rename = "access-vlan", serialize_with = "vlan_or_unset")]
    pub access_vlan: Option<u16>,
    #[serde(rename = "trunk-vlans")]
    pub trunk_vlans: IndexSet<u16>,
    #[serde(rename = "native-vlan", serialize_with = "vlan_or_unset")]
    pub native_vlan: Option<u16>,
    #[serde(rename = "tagged-native-vlan")]
    pub tagged_native_vlan: bool,
}

impl InterfaceVlanMode {
    /// Access port with no VLAN assigned
    pub fn access() -> Self {
        Self {
            mode: VlanMode::Access,
            access_vlan: None,
            trunk_vlans: IndexSet::new(),
            native_vlan: None,
            tagged_native_vlan: false,
        }
    }

    pub fn access_in(vlan: u16) -> Self {
        Self {
            access_vlan: Some(vlan),
            ..Self::access()
        }
    }

    pub fn trunk(
        trunk_vlans: impl IntoIterator<Item = u16>,
        native_vlan: Option<u16>,
        tagged_native_vlan: bool,
    ) -> Self {
        Self {
            mode: VlanMode::Trunk,
            access_vlan: None,
            trunk_vlans: trunk_vlans.into_iter().collect(),
            native_vlan,
            tagged_native_vlan,
        }
    }

    pub fn is_trunk(&self) -> bool {
        self.mode == VlanMode::Trunk
    }
}

fn vlan_or_unset<S: Serializer>(vlan: &Option<u16>, serializer: S) -> Result<S::Ok, S::Error> {
    match vlan {
        Some(id) => serializer.serialize_i32(i32::from(*id)),
        None => serializer.serialize_i32(-1),
    }
}

/// VlanRecord is one VLAN with its member interfaces, in the order sources reported them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VlanRecord {
    #[serde(skip)]
    pub vlan_id: u16,
    pub name: String,
    pub interfaces: IndexSet<String>,
}

impl VlanRecord {
    pub fn new(vlan_id: u16, name: impl Into<String>) -> Self {
        Self {
            vlan_id,
            name: name.into(),
            interfaces: IndexSet::new(),
        }
    }

    /// Add a member, returning false if it was already present
    pub fn add_interface(&mut self, interface: impl Into<String>) -> bool {
        self.interfaces.insert(interface.into())
    }
}
