//! Helpers shared by the network source-of-truth tooling: NetBox importers,
//! Nautobot golden-config jobs, config templates and NAPALM style drivers.

pub mod compliance;
pub mod config;
pub mod credentials;
pub mod drivers;
pub mod error;
pub mod filters;
pub mod interfaces;
pub mod models;
pub mod services;
pub mod shaping;
pub mod utils;
pub mod vlans;

pub use compliance::{cli_compliance, custom_compliance, exclude, include, ComplianceBypass};
pub use config::Config;
pub use drivers::{EosDriver, InterfaceInventoryProvider, ProcurveDriver};
pub use error::{HelperError, Result};
pub use filters::register_filters;
pub use interfaces::classify;
pub use shaping::{resolve, resolve_bandwidth, BandwidthTable, ShapingProfile, ShapingRequest};
pub use vlans::{reconcile, EncapsulationLookup, ReconcileSources};
