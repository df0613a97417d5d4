use once_cell::sync::Lazy;
use serde::Serialize;

use super::{BandwidthTable, ShapingProfile};

/// ADVA ethernet-access shaper. Rates in bit/s, bursts and buffer in KB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdvaShaping {
    pub cir: u64,
    pub eir: u64,
    pub cbs: u64,
    pub ebs: u64,
    pub buffersize: u64,
}

impl ShapingProfile for AdvaShaping {
    fn apply_excess(&mut self, excess: &Self) {
        self.eir = excess.cir;
        self.ebs = excess.cbs;
        self.buffersize = excess.buffersize;
    }

    fn apply_port_buffer(&mut self, port: &Self) {
        self.buffersize = port.buffersize;
    }
}

/// MRV OptiSwitch bandwidth profile, every field is a CLI rate/size token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptiswitchShaping {
    pub cir: &'static str,
    pub cbs: &'static str,
    pub eir: &'static str,
    pub ebs: &'static str,
}

impl ShapingProfile for OptiswitchShaping {
    fn apply_excess(&mut self, excess: &Self) {
        self.eir = excess.cir;
        self.ebs = excess.cbs;
    }
}

/// Brocade NetIron policy-map. Rates in bit/s, sizes in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetironShaping {
    pub cir: u64,
    pub cbs: u64,
    pub eir: u64,
    pub ebs: u64,
    pub queue_depth: u64,
}

impl ShapingProfile for NetironShaping {
    fn apply_excess(&mut self, excess: &Self) {
        self.eir = excess.cir;
        self.ebs = excess.cbs;
        self.queue_depth = excess.queue_depth;
    }

    fn apply_port_buffer(&mut self, port: &Self) {
        self.queue_depth = port.queue_depth;
    }
}

const fn adva(cir: u64, cbs: u64, buffersize: u64) -> AdvaShaping {
    AdvaShaping {
        cir,
        eir: 128_000,
        cbs,
        ebs: 16,
        buffersize,
    }
}

const fn optiswitch(cir: &'static str, cbs: &'static str) -> OptiswitchShaping {
    OptiswitchShaping {
        cir,
        cbs,
        eir: "0",
        ebs: "0",
    }
}

const fn netiron(cir: u64, cbs: u64, queue_depth: u64) -> NetironShaping {
    NetironShaping {
        cir,
        cbs,
        eir: 0,
        ebs: 0,
        queue_depth,
    }
}

static ADVA_ROWS: &[(u32, AdvaShaping)] = &[
    (10000, adva(9999360000, 1536, 1536)),
    (9000, adva(8999360000, 1536, 1536)),
    (8000, adva(7999360000, 1536, 1536)),
    (7000, adva(6999360000, 1536, 1536)),
    (6000, adva(5999360000, 1536, 1536)),
    (5000, adva(4999360000, 1536, 1536)),
    (4000, adva(3999360000, 1280, 1280)),
    (3000, adva(2999360000, 1280, 1280)),
    (2000, adva(1999360000, 1280, 1280)),
    (1000, adva(999360000, 1024, 1024)),
    (900, adva(899328000, 1024, 1024)),
    (800, adva(799360000, 1024, 1024)),
    (700, adva(699328000, 512, 512)),
    (600, adva(599360000, 512, 512)),
    (500, adva(499328000, 512, 512)),
    (400, adva(399360000, 256, 256)),
    (300, adva(299328000, 256, 256)),
    (200, adva(199360000, 128, 128)),
    (100, adva(99328000, 128, 128)),
    (50, adva(49344000, 64, 64)),
    // 64k, used for overcommitted services
    (64, adva(64000, 1024, 1024)),
];

// Rate tokens match bandwidth_to_optiswitch_name. Burst sizes step up with
// the ADVA buffers.
static OPTISWITCH_ROWS: &[(u32, OptiswitchShaping)] = &[
    (10000, optiswitch("10g", "4m")),
    (9000, optiswitch("9g", "4m")),
    (8000, optiswitch("8g", "4m")),
    (7000, optiswitch("7g", "4m")),
    (6000, optiswitch("6g", "4m")),
    (5000, optiswitch("5g", "4m")),
    (4000, optiswitch("4g", "2m")),
    (3000, optiswitch("3g", "2m")),
    (2000, optiswitch("2g", "2m")),
    (1000, optiswitch("1g", "1m")),
    (900, optiswitch("900m", "1m")),
    (800, optiswitch("800m", "1m")),
    (700, optiswitch("700m", "512k")),
    (600, optiswitch("600m", "512k")),
    (500, optiswitch("500m", "512k")),
    (400, optiswitch("400m", "256k")),
    (300, optiswitch("300m", "256k")),
    (200, optiswitch("200m", "128k")),
    (100, optiswitch("100m", "128k")),
    (50, optiswitch("50m", "64k")),
    // best-effort class, no shaper applied
    (0, optiswitch("0", "0")),
];

// cbs is 10ms of traffic at cir. Queue depth steps up with the ADVA buffers.
static NETIRON_ROWS: &[(u32, NetironShaping)] = &[
    (10000, netiron(10000000000, 12500000, 1048576)),
    (9000, netiron(9000000000, 11250000, 1048576)),
    (8000, netiron(8000000000, 10000000, 1048576)),
    (7000, netiron(7000000000, 8750000, 1048576)),
    (6000, netiron(6000000000, 7500000, 1048576)),
    (5000, netiron(5000000000, 6250000, 1048576)),
    (4000, netiron(4000000000, 5000000, 524288)),
    (3000, netiron(3000000000, 3750000, 524288)),
    (2000, netiron(2000000000, 2500000, 524288)),
    (1000, netiron(1000000000, 1250000, 262144)),
    (900, netiron(900000000, 1125000, 262144)),
    (800, netiron(800000000, 1000000, 262144)),
    (700, netiron(700000000, 875000, 131072)),
    (600, netiron(600000000, 750000, 131072)),
    (500, netiron(500000000, 625000, 131072)),
    (400, netiron(400000000, 500000, 65536)),
    (300, netiron(300000000, 375000, 65536)),
    (200, netiron(200000000, 250000, 32768)),
    (100, netiron(100000000, 125000, 32768)),
    (50, netiron(50000000, 62500, 16384)),
];

pub static ADVA_TABLE: Lazy<BandwidthTable<AdvaShaping>> =
    Lazy::new(|| BandwidthTable::new(ADVA_ROWS, 50));

pub static OPTISWITCH_TABLE: Lazy<BandwidthTable<OptiswitchShaping>> =
    Lazy::new(|| BandwidthTable::new(OPTISWITCH_ROWS, 50));

pub static NETIRON_TABLE: Lazy<BandwidthTable<NetironShaping>> =
    Lazy::new(|| BandwidthTable::new(NETIRON_ROWS, 50));

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HelperError;
    use crate::shaping::{
        adva_shaping_values, netiron_shaping_values, optiswitch_shaping_values, ShapingRequest,
    };

    #[test]
    fn test_adva_exact_keys() {
        for (key, row) in ADVA_ROWS {
            let resolved = adva_shaping_values(i64::from(*key), false, None).unwrap();
            assert_eq!(&resolved, row, "key {}", key);
        }
    }

    #[test]
    fn test_adva_rounding() {
        let at = |bw: i64| adva_shaping_values(bw, false, None).unwrap();
        assert_eq!(at(650).cir, 599360000);
        assert_eq!(at(1500).cir, 999360000);
        assert_eq!(at(2750).cir, 1999360000);
        assert_eq!(at(12000).cir, 9999360000);
        assert_eq!(at(75).cir, 49344000);
        assert_eq!(at(64).cir, 64000);
        assert_eq!(at(0).cir, 49344000);
    }

    #[test]
    fn test_adva_custom_shaping() {
        let shaped = adva_shaping_values(50, true, Some(500)).unwrap();
        assert_eq!(shaped.cir, 49344000);
        assert_eq!(shaped.cbs, 64);
        assert_eq!(shaped.eir, 499328000);
        assert_eq!(shaped.ebs, 512);
        assert_eq!(shaped.buffersize, 512);

        // the static table itself is never modified
        assert_eq!(ADVA_TABLE.get(50).unwrap().eir, 128000);
    }

    #[test]
    fn test_adva_overcommitted_service() {
        let shaped = adva_shaping_values(64, true, Some(1000)).unwrap();
        assert_eq!(shaped.cir, 64000);
        assert_eq!(shaped.eir, 999360000);
    }

    #[test]
    fn test_adva_port_buffer() {
        let request = ShapingRequest::new(200).with_max_port(10000);
        let shaped = ADVA_TABLE.resolve(&request).unwrap();
        assert_eq!(shaped.cir, 199360000);
        assert_eq!(shaped.buffersize, 1536);
    }

    #[test]
    fn test_optiswitch_tokens() {
        let shaped = optiswitch_shaping_values(&ShapingRequest::new(1500)).unwrap();
        assert_eq!(shaped.cir, "1g");
        assert_eq!(shaped.eir, "0");

        let best_effort = optiswitch_shaping_values(&ShapingRequest::new(0)).unwrap();
        assert_eq!(best_effort.cir, "0");

        // rounding to zero never lands on the best-effort class
        let small = optiswitch_shaping_values(&ShapingRequest::new(30)).unwrap();
        assert_eq!(small.cir, "50m");

        let custom = optiswitch_shaping_values(&ShapingRequest::new(100).with_excess(2000))
            .unwrap();
        assert_eq!(custom.cir, "100m");
        assert_eq!(custom.eir, "2g");
        assert_eq!(custom.ebs, "2m");
    }

    #[test]
    fn test_optiswitch_ignores_port_buffer() {
        let plain = optiswitch_shaping_values(&ShapingRequest::new(100)).unwrap();
        let on_fast_port =
            optiswitch_shaping_values(&ShapingRequest::new(100).with_max_port(10000)).unwrap();
        assert_eq!(on_fast_port, plain);
        assert_eq!(&on_fast_port, OPTISWITCH_TABLE.get(100).unwrap());
    }

    #[test]
    fn test_negative_excess_bandwidth() {
        let request = ShapingRequest::new(100).with_excess(-5);
        assert!(matches!(
            netiron_shaping_values(&request),
            Err(HelperError::InvalidBandwidth { bandwidth: -5, .. })
        ));
        assert!(matches!(
            adva_shaping_values(100, true, Some(-5)),
            Err(HelperError::InvalidBandwidth { bandwidth: -5, .. })
        ));
    }

    #[test]
    fn test_netiron_values() {
        let shaped = netiron_shaping_values(&ShapingRequest::new(450).with_max_port(10000)).unwrap();
        assert_eq!(shaped.cir, 400000000);
        assert_eq!(shaped.queue_depth, 1048576);
        assert_eq!(shaped.eir, 0);

        let custom = netiron_shaping_values(&ShapingRequest::new(100).with_excess(500)).unwrap();
        assert_eq!(custom.cir, 100000000);
        assert_eq!(custom.cbs, 125000);
        assert_eq!(custom.eir, 500000000);
        assert_eq!(custom.ebs, 625000);
        assert_eq!(custom.queue_depth, 131072);
    }
}
