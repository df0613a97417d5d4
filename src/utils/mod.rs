use crate::error::{HelperError, Result};

const FIRST_LINE_LEN: usize = 48;
const OTHER_LINE_LEN: usize = 44;

/// Compress a list of VLAN ids into config range strings.
///
/// Runs of at least `min_grouping_size` consecutive ids become `a-b`, shorter
/// runs are listed one by one. The result is split on commas into lines of
/// at most 48 characters for the first line and 44 for the rest.
pub fn vlanlist_to_config(vlans: &[u16], min_grouping_size: usize) -> Result<Vec<String>> {
    if min_grouping_size < 1 {
        return Err(HelperError::InvalidVlanList(
            "minimum grouping size must be at least one".to_string(),
        ));
    }

    let mut sorted = vlans.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let (Some(&first), Some(&last)) = (sorted.first(), sorted.last()) else {
        return Ok(Vec::new());
    };
    if first < 1 || last > 4094 {
        return Err(HelperError::InvalidVlanList(
            "valid VLAN range is 1-4094".to_string(),
        ));
    }

    // Group consecutive ids
    let mut groups: Vec<Vec<u16>> = Vec::new();
    for vlan in sorted {
        match groups.last_mut() {
            Some(group) if group.last().is_some_and(|prev| prev + 1 == vlan) => group.push(vlan),
            _ => groups.push(vec![vlan]),
        }
    }

    let mut tokens: Vec<String> = Vec::new();
    for group in &groups {
        match (group.first(), group.last()) {
            (Some(start), Some(end)) if group.len() >= min_grouping_size && group.len() > 1 => {
                tokens.push(format!("{}-{}", start, end));
            }
            _ => tokens.extend(group.iter().map(|v| v.to_string())),
        }
    }

    Ok(split_config_lines(&tokens))
}

/// Pack comma separated tokens into length-limited lines
fn split_config_lines(tokens: &[String]) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for token in tokens {
        let limit = if lines.is_empty() { FIRST_LINE_LEN } else { OTHER_LINE_LEN };
        if current.is_empty() {
            current.push_str(token);
        } else if current.len() + 1 + token.len() <= limit {
            current.push(',');
            current.push_str(token);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(token);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Split an interface name into its type and number, e.g.
/// `Ethernet4.420` -> (`Ethernet`, `4.420`)
pub fn split_interface_name(interface: &str) -> (&str, &str) {
    let index = interface
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(interface.len());
    interface.split_at(index)
}

/// Strip the `-TrkN` suffix ProCurve appends to LAG member ports
pub fn strip_trunk_suffix(port: &str) -> &str {
    port.split('-').next().unwrap_or(port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vlanlist_to_config() {
        assert_eq!(vlanlist_to_config(&[1, 2, 3, 5, 7, 8], 3).unwrap(), vec!["1-3,5,7,8"]);
        assert_eq!(vlanlist_to_config(&[1, 2, 3, 5, 7, 8], 2).unwrap(), vec!["1-3,5,7-8"]);
        assert_eq!(vlanlist_to_config(&[8, 7, 7, 1], 1).unwrap(), vec!["1,7,8"]);
        assert!(vlanlist_to_config(&[], 2).unwrap().is_empty());
    }

    #[test]
    fn test_vlanlist_to_config_invalid() {
        assert!(matches!(
            vlanlist_to_config(&[0, 1], 2),
            Err(HelperError::InvalidVlanList(_))
        ));
        assert!(vlanlist_to_config(&[4095], 2).is_err());
        assert!(vlanlist_to_config(&[10], 0).is_err());
    }

    #[test]
    fn test_vlanlist_to_config_line_split() {
        let vlans: Vec<u16> = (1..=40).map(|v| v * 2).collect();
        let lines = vlanlist_to_config(&vlans, 2).unwrap();
        assert!(lines.len() > 1);
        assert!(lines[0].len() <= 48);
        assert!(lines[1..].iter().all(|l| l.len() <= 44));
        let joined = lines.join(",");
        assert_eq!(joined.split(',').count(), 40);
    }

    #[test]
    fn test_split_interface_name() {
        assert_eq!(split_interface_name("Ethernet4.420"), ("Ethernet", "4.420"));
        assert_eq!(split_interface_name("Port-Channel10.5"), ("Port-Channel", "10.5"));
        assert_eq!(split_interface_name("Management"), ("Management", ""));
    }

    #[test]
    fn test_strip_trunk_suffix() {
        assert_eq!(strip_trunk_suffix("45-Trk1"), "45");
        assert_eq!(strip_trunk_suffix("A1"), "A1");
    }
}
