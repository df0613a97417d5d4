use serde::{Deserialize, Serialize, Serializer};

/// InterfaceType is the NetBox interface type assigned to a device interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceType {
    Virtual,
    Lag,
    Base1000T,
    Sfpp,
    Cx4,
    Base10T,
    Sfp28,
    Qsfpp,
    Qsfp28,
}

impl InterfaceType {
    pub const ALL: [InterfaceType; 9] = [
        InterfaceType::Virtual,
        InterfaceType::Lag,
        InterfaceType::Base1000T,
        InterfaceType::Sfpp,
        InterfaceType::Cx4,
        InterfaceType::Base10T,
        InterfaceType::Sfp28,
        InterfaceType::Qsfpp,
        InterfaceType::Qsfp28,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            InterfaceType::Virtual => "virtual",
            InterfaceType::Lag => "lag",
            InterfaceType::Base1000T => "1000base-t",
            InterfaceType::Sfpp => "10gbase-x-sfpp",
            InterfaceType::Cx4 => "10gbase-cx4",
            InterfaceType::Base10T => "10gbase-t",
            InterfaceType::Sfp28 => "25gbase-x-sfp28",
            InterfaceType::Qsfpp => "40gbase-x-qsfpp",
            InterfaceType::Qsfp28 => "100gbase-x-qsfp28",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            InterfaceType::Virtual => "Virtual",
            InterfaceType::Lag => "Link Aggregation Group (LAG)",
            InterfaceType::Base1000T => "1000BASE-T (1GE)",
            InterfaceType::Sfpp => "SFP+ (10GE)",
            InterfaceType::Cx4 => "10GBASE-CX4 (10GE)",
            InterfaceType::Base10T => "10GBASE-T (10GE)",
            InterfaceType::Sfp28 => "SFP28 (25GE)",
            InterfaceType::Qsfpp => "QSFP+ (40GE)",
            InterfaceType::Qsfp28 => "QSFP28 (100GE)",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.slug() == slug)
    }

    /// Standard physical media for a link speed in Mbps
    pub fn from_speed(speed_mbps: u64) -> Option<Self> {
        match speed_mbps {
            1000 => Some(InterfaceType::Base1000T),
            10000 => Some(InterfaceType::Sfpp),
            25000 => Some(InterfaceType::Sfp28),
            40000 => Some(InterfaceType::Qsfpp),
            100000 => Some(InterfaceType::Qsfp28),
            _ => None,
        }
    }

    pub fn record(&self) -> InterfaceTypeRecord {
        InterfaceTypeRecord {
            name: self.display_name().to_string(),
            slug: self.slug().to_string(),
        }
    }
}

impl Serialize for InterfaceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.record().serialize(serializer)
    }
}

/// InterfaceTypeRecord is the `{name, slug}` shape NetBox expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceTypeRecord {
    pub name: String,
    pub slug: String,
}

/// InterfaceRecord is one interface as reported by a CLI/API call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    pub name: String,
    #[serde(default)]
    pub speed_mbps: Option<u64>,
    #[serde(default)]
    pub declared_type: Option<String>,
}

impl InterfaceRecord {
    pub fn classify(&self) -> InterfaceType {
        crate::interfaces::classify(&self.name, self.speed_mbps, self.declared_type.as_deref())
    }
}

/// Interface is the NAPALM get_interfaces entry for one interface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interface {
    pub is_up: bool,
    pub is_enabled: bool,
    pub description: String,
    pub last_flapped: f64,
    pub speed: u64,
    pub mtu: u32,
    pub mac_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mpls_enabled: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub interface_type: Option<InterfaceType>,
}

impl Default for Interface {
    fn default() -> Self {
        Self {
            is_up: false,
            is_enabled: false,
            description: String::new(),
            last_flapped: -1.0,
            speed: 0,
            mtu: 0,
            mac_address: String::new(),
            children: None,
            mpls_enabled: None,
            interface_type: None,
        }
    }
}

/// MrvPort is a port entry as passed to the MRV port-list template filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrvPort {
    pub name: String,
    #[serde(rename = "type")]
    pub port_type: String,
    #[serde(default)]
    pub lag: Option<MrvLag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrvLag {
    pub name: String,
}
