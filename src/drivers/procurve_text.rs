//! Line parsers for HP ProCurve CLI tables.
//!
//! Each parser walks the output line by line and keeps only rows that look
//! like data, so banners, headers and separator lines drop out naturally.

use std::net::Ipv4Addr;

/// ProcurveVlan is one row of `show vlans` / `show vlans ports <port>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcurveVlan {
    pub vlan_id: u16,
    pub name: String,
}

/// ProcurveTrunkPort is one member row of `show trunks`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcurveTrunkPort {
    pub port: String,
    pub name: String,
    pub group: String,
}

/// ProcurvePortStatus is one row of `show interfaces status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcurvePortStatus {
    pub port: String,
    /// VLAN id, `multi` or `No`
    pub tagged: String,
    /// VLAN id or `No`
    pub untagged: String,
}

/// ProcurvePortType is one row of `show interfaces custom ... type` or
/// `show interfaces config`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcurvePortType {
    pub port: String,
    pub port_type: String,
}

/// ProcurveIpRow is an addressed VLAN from `show ip` or
/// `show vlan custom id name ipconfig ipaddr ipmask`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcurveIpRow {
    pub vlan: String,
    pub address: Ipv4Addr,
    pub mask: Ipv4Addr,
}

/// Port names look like `1`, `A1`, `45-Trk1`, `Trk1` or `1/A1`
fn is_port_name(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '/')
}

pub fn parse_vlans(output: &str) -> Vec<ProcurveVlan> {
    output.lines().filter_map(parse_vlan_line).collect()
}

/// Format: `  100     Customer A                       | Port-based No    No`
fn parse_vlan_line(line: &str) -> Option<ProcurveVlan> {
    let (left, _) = line.split_once('|')?;
    let left = left.trim();
    let (id, name) = left.split_once(char::is_whitespace).unwrap_or((left, ""));
    let vlan_id: u16 = id.parse().ok()?;

    Some(ProcurveVlan {
        vlan_id,
        name: name.trim().to_string(),
    })
}

pub fn parse_trunks(output: &str) -> Vec<ProcurveTrunkPort> {
    output.lines().filter_map(parse_trunk_line).collect()
}

/// Format: `  45   | uplink                           SFP+SR    | Trk1  LACP`
fn parse_trunk_line(line: &str) -> Option<ProcurveTrunkPort> {
    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    if fields.len() < 3 || !is_port_name(fields[0]) {
        return None;
    }

    let group = fields[2].split_whitespace().next()?;
    if !group.starts_with("Trk") {
        return None;
    }

    // Name and media type share a column, the type is always the last word
    let name = fields[1]
        .rsplit_once(char::is_whitespace)
        .map(|(name, _)| name.trim())
        .unwrap_or("");

    Some(ProcurveTrunkPort {
        port: fields[0].to_string(),
        name: name.to_string(),
        group: group.to_string(),
    })
}

pub fn parse_interfaces_status(output: &str) -> Vec<ProcurvePortStatus> {
    output.lines().filter_map(parse_status_line).collect()
}

/// Format: `  1        desk       Up      Auto          1000FDx  100/1000T  No     100`
///
/// The name column may be blank or hold spaces, so the VLAN columns are
/// taken from the end of the line.
fn parse_status_line(line: &str) -> Option<ProcurvePortStatus> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 || !is_port_name(fields[0]) {
        return None;
    }
    if !fields.iter().any(|f| *f == "Up" || *f == "Down") {
        return None;
    }

    Some(ProcurvePortStatus {
        port: fields[0].to_string(),
        tagged: fields[fields.len() - 2].to_string(),
        untagged: fields[fields.len() - 1].to_string(),
    })
}

pub fn parse_interfaces_types(output: &str) -> Vec<ProcurvePortType> {
    output.lines().filter_map(parse_port_type_line).collect()
}

/// Format: ` 45-Trk1    SFP+SR` or `  1        100/1000T | Yes     Auto ...`
fn parse_port_type_line(line: &str) -> Option<ProcurvePortType> {
    let columns = line.split('|').next()?;
    let mut fields = columns.split_whitespace();
    let port = fields.next()?;
    let port_type = fields.next()?;
    if !is_port_name(port) {
        return None;
    }

    Some(ProcurvePortType {
        port: port.to_string(),
        port_type: port_type.to_string(),
    })
}

pub fn parse_ip_addresses(output: &str) -> Vec<ProcurveIpRow> {
    output.lines().filter_map(parse_ip_line).collect()
}

/// Handles both layouts:
///
/// ```text
///   DEFAULT_VLAN         | Manual     10.0.0.2        255.255.255.0   No
///  1      DEFAULT_VLAN         Manual    10.0.0.2        255.255.255.0
/// ```
fn parse_ip_line(line: &str) -> Option<ProcurveIpRow> {
    if let Some((vlan, rest)) = line.split_once('|') {
        let fields: Vec<&str> = rest.split_whitespace().collect();
        let address = fields.get(1)?.parse().ok()?;
        let mask = fields.get(2)?.parse().ok()?;
        return Some(ProcurveIpRow {
            vlan: vlan.trim().to_string(),
            address,
            mask,
        });
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 5 {
        return None;
    }
    fields[0].parse::<u16>().ok()?;
    let mask = fields[fields.len() - 1].parse().ok()?;
    let address = fields[fields.len() - 2].parse().ok()?;

    Some(ProcurveIpRow {
        vlan: fields[1..fields.len() - 3].join(" "),
        address,
        mask,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_VLANS: &str = "
 Status and Counters - VLAN Information

  Maximum VLANs to support : 256
  Primary VLAN : DEFAULT_VLAN
  Management VLAN :

  VLAN ID Name                             | Status     Voice Jumbo
  ------- -------------------------------- + ---------- ----- -----
  1       DEFAULT_VLAN                     | Port-based No    No
  100     Customer A                       | Port-based No    No
  200     VLAN200                          | Port-based No    No
";

    const SHOW_TRUNKS: &str = "
 Load Balancing Method:  L3-based (default)

  Port | Name                             Type      | Group Type
  ---- + -------------------------------- --------- + ----- --------
  45   | uplink                           SFP+SR    | Trk1  LACP
  46   |                                  SFP+SR    | Trk1  LACP
";

    const SHOW_INTERFACES_STATUS: &str = "
  Port     Name       Status  Config-mode   Speed    Type       Tagged Untagged
  -------- ---------- ------- ------------- -------- ---------- ------ --------
  1        desk phone Up      Auto          1000FDx  100/1000T  No     100
  2                   Down    Auto          1000FDx  100/1000T  200    1
  45-Trk1  uplink     Up      Auto          10GigFD  SFP+SR     multi  No
";

    #[test]
    fn test_parse_vlans() {
        let vlans = parse_vlans(SHOW_VLANS);
        assert_eq!(
            vlans,
            vec![
                ProcurveVlan { vlan_id: 1, name: "DEFAULT_VLAN".to_string() },
                ProcurveVlan { vlan_id: 100, name: "Customer A".to_string() },
                ProcurveVlan { vlan_id: 200, name: "VLAN200".to_string() },
            ]
        );
        assert!(parse_vlans("").is_empty());
    }

    #[test]
    fn test_parse_trunks() {
        let trunks = parse_trunks(SHOW_TRUNKS);
        assert_eq!(trunks.len(), 2);
        assert_eq!(trunks[0].port, "45");
        assert_eq!(trunks[0].name, "uplink");
        assert_eq!(trunks[0].group, "Trk1");
        assert_eq!(trunks[1].name, "");
    }

    #[test]
    fn test_parse_interfaces_status() {
        let ports = parse_interfaces_status(SHOW_INTERFACES_STATUS);
        assert_eq!(ports.len(), 3);
        assert_eq!(
            ports[0],
            ProcurvePortStatus {
                port: "1".to_string(),
                tagged: "No".to_string(),
                untagged: "100".to_string(),
            }
        );
        assert_eq!(ports[1].tagged, "200");
        assert_eq!(ports[2].port, "45-Trk1");
        assert_eq!(ports[2].tagged, "multi");
    }

    #[test]
    fn test_parse_interfaces_types() {
        let custom = "
 Status and Counters - Custom Port Status

 Port       Type
 ---------- ----------
 A1         100/1000T
 45-Trk1    SFP+SR
";
        let rows = parse_interfaces_types(custom);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].port, "45-Trk1");
        assert_eq!(rows[1].port_type, "SFP+SR");

        let config = "
 Port Settings

  Port     Type      | Enabled Mode         Flow Ctrl MDI
  -------- --------- + ------- ------------ --------- ----
  1        100/1000T | Yes     Auto         Disable   Auto
  25       10GbE-CX4 | Yes     Auto         Disable   Auto
";
        let rows = parse_interfaces_types(config);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].port_type, "10GbE-CX4");
    }

    #[test]
    fn test_parse_ip_addresses() {
        let show_ip = "
 Internet (IP) Service

  IP Routing : Disabled

  Default Gateway : 10.0.0.1
  Default TTL     : 64

  VLAN                 | IP Config  IP Address      Subnet Mask     Proxy ARP
  -------------------- + ---------- --------------- --------------- ---------
  DEFAULT_VLAN         | Manual     10.0.0.2        255.255.255.0   No
  Customer A           | Manual     192.0.2.1       255.255.255.252 No
  VLAN200              | Disabled
";
        let rows = parse_ip_addresses(show_ip);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].vlan, "DEFAULT_VLAN");
        assert_eq!(rows[0].address, Ipv4Addr::new(10, 0, 0, 2));
        assert_eq!(rows[1].vlan, "Customer A");
        assert_eq!(rows[1].mask, Ipv4Addr::new(255, 255, 255, 252));
    }

    #[test]
    fn test_parse_ip_addresses_custom_layout() {
        let custom = "
 VLANID VLANName             IPConfig  IPAddress       IPMask
 ------ -------------------- --------- --------------- ---------------
 1      DEFAULT_VLAN         Manual    10.0.0.2        255.255.255.0
 100    Customer A           Manual    192.0.2.1       255.255.255.252
 200    VLAN200              Disabled
";
        let rows = parse_ip_addresses(custom);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].vlan, "Customer A");
        assert_eq!(rows[1].address, Ipv4Addr::new(192, 0, 2, 1));
    }
}
