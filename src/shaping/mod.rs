//! Bandwidth to shaping-parameter resolution.
//!
//! Each vendor table maps a nominal bandwidth in Mbps to the register values
//! the platform expects. Requests that are not an exact key are rounded down
//! onto the table: clamp to the largest key, then the nearest thousand, then
//! the nearest hundred, then the table floor.

pub mod tables;

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{HelperError, Result};

pub use tables::{
    AdvaShaping, NetironShaping, OptiswitchShaping, ADVA_TABLE, NETIRON_TABLE, OPTISWITCH_TABLE,
};

/// A vendor parameter record that can absorb overrides from other records
/// of the same table.
pub trait ShapingProfile: Clone {
    /// Overwrite the excess-rate fields using the record resolved for the
    /// excess bandwidth. Committed fields stay as they are.
    fn apply_excess(&mut self, excess: &Self);

    /// Overwrite the buffer allocation using the record resolved for the
    /// physical port capacity. Records without a buffer field ignore this.
    fn apply_port_buffer(&mut self, _port: &Self) {}
}

/// Shaping request as carried on a service/provisioning record
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ShapingRequest {
    pub bandwidth: i64,
    #[serde(default)]
    pub custom_shaping: bool,
    #[serde(default)]
    pub shaping_eir_bandwidth: Option<i64>,
    #[serde(default)]
    pub max_port_bandwidth: Option<i64>,
}

impl ShapingRequest {
    pub fn new(bandwidth: i64) -> Self {
        Self {
            bandwidth,
            ..Default::default()
        }
    }

    /// Size the excess rate off a different nominal bandwidth
    pub fn with_excess(mut self, shaping_eir_bandwidth: i64) -> Self {
        self.custom_shaping = true;
        self.shaping_eir_bandwidth = Some(shaping_eir_bandwidth);
        self
    }

    pub fn with_max_port(mut self, max_port_bandwidth: i64) -> Self {
        self.max_port_bandwidth = Some(max_port_bandwidth);
        self
    }
}

/// Immutable bandwidth staircase for one vendor platform
#[derive(Debug, Clone)]
pub struct BandwidthTable<P> {
    entries: BTreeMap<u32, P>,
    floor: u32,
}

impl<P: ShapingProfile> BandwidthTable<P> {
    /// Build a table from literal rows. `floor` is the key every
    /// unmatched request falls back to.
    pub fn new(rows: &[(u32, P)], floor: u32) -> Self {
        Self {
            entries: rows.iter().cloned().collect(),
            floor,
        }
    }

    pub fn get(&self, key: u32) -> Option<&P> {
        self.entries.get(&key)
    }

    /// Map a requested bandwidth onto a key of this table.
    pub fn resolve_key(&self, bandwidth: i64) -> Result<u32> {
        if bandwidth < 0 {
            return Err(HelperError::InvalidBandwidth {
                bandwidth,
                reason: "bandwidth must not be negative".to_string(),
            });
        }
        let (Some(&min_key), Some(&max_key)) =
            (self.entries.keys().next(), self.entries.keys().next_back())
        else {
            return Err(HelperError::InvalidBandwidth {
                bandwidth,
                reason: "shaping table is empty".to_string(),
            });
        };

        if bandwidth > i64::from(max_key) {
            return Ok(max_key);
        }
        // bandwidth is within 0..=max_key from here on
        let requested = u32::try_from(bandwidth).unwrap_or(max_key);
        if self.entries.contains_key(&requested) {
            return Ok(requested);
        }

        let thousands = requested / 1000 * 1000;
        if thousands != 0 && self.entries.contains_key(&thousands) {
            return Ok(thousands);
        }
        let hundreds = requested / 100 * 100;
        if hundreds != 0 && self.entries.contains_key(&hundreds) {
            return Ok(hundreds);
        }

        if self.entries.contains_key(&self.floor) {
            Ok(self.floor)
        } else {
            Ok(min_key)
        }
    }

    fn record(&self, bandwidth: i64) -> Result<(u32, P)> {
        let key = self.resolve_key(bandwidth)?;
        let record = self
            .entries
            .get(&key)
            .cloned()
            .ok_or_else(|| HelperError::InvalidBandwidth {
                bandwidth,
                reason: format!("resolved key {} missing from table", key),
            })?;
        Ok((key, record))
    }

    /// Resolve a full request, applying the excess and port-buffer overrides.
    pub fn resolve(&self, request: &ShapingRequest) -> Result<P> {
        let (key, mut record) = self.record(request.bandwidth)?;
        tracing::debug!(
            "shaping: requested {} Mbps, using table entry {}",
            request.bandwidth,
            key
        );

        if request.custom_shaping {
            // a zero excess bandwidth means "not set" on provisioning records
            if let Some(eir) = request.shaping_eir_bandwidth.filter(|eir| *eir != 0) {
                let (eir_key, excess) = self.record(eir)?;
                tracing::debug!("shaping: excess rate sized off table entry {}", eir_key);
                record.apply_excess(&excess);
            }
        }

        if let Some(port) = request.max_port_bandwidth {
            if port < 0 {
                return Err(HelperError::InvalidBandwidth {
                    bandwidth: port,
                    reason: "max port bandwidth must not be negative".to_string(),
                });
            }
            if i64::from(key) < port {
                let (port_key, port_record) = self.record(port)?;
                tracing::debug!("shaping: buffer sized off port entry {}", port_key);
                record.apply_port_buffer(&port_record);
            }
        }

        Ok(record)
    }
}

/// Resolve `request` against `table`
pub fn resolve<P: ShapingProfile>(table: &BandwidthTable<P>, request: &ShapingRequest) -> Result<P> {
    table.resolve(request)
}

/// Resolve a plain bandwidth with no overrides
pub fn resolve_bandwidth<P: ShapingProfile>(table: &BandwidthTable<P>, bandwidth: i64) -> Result<P> {
    table.resolve(&ShapingRequest::new(bandwidth))
}

/// Shaping values for an ADVA port
pub fn adva_shaping_values(
    bandwidth: i64,
    custom_shaping: bool,
    shaping_eir: Option<i64>,
) -> Result<AdvaShaping> {
    let request = ShapingRequest {
        bandwidth,
        custom_shaping,
        shaping_eir_bandwidth: shaping_eir,
        max_port_bandwidth: None,
    };
    ADVA_TABLE.resolve(&request)
}

pub fn optiswitch_shaping_values(request: &ShapingRequest) -> Result<OptiswitchShaping> {
    OPTISWITCH_TABLE.resolve(request)
}

pub fn netiron_shaping_values(request: &ShapingRequest) -> Result<NetironShaping> {
    NETIRON_TABLE.resolve(request)
}

/// Express megabits as an OptiSwitch rate token.
///
/// 500 -> 500m, 1000 -> 1g, 1500 -> 1500m, 10000 -> 10g
pub fn bandwidth_to_optiswitch_name(bandwidth: u64) -> String {
    if bandwidth != 0 && bandwidth % 1000 == 0 {
        format!("{}g", bandwidth / 1000)
    } else {
        format!("{}m", bandwidth)
    }
}
