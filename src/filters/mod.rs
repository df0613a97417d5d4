//! Tera filters used by the device config templates.
//!
//! ```text
//! {{ password | encrypt_cisco_type7 }}
//! {{ iface.name | interface_type(speed=iface.speed) }}
//! {{ service.bandwidth | adva_shaping_values(custom_shaping=true, shaping_eir=500) }}
//! ```

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tera::{Tera, Value};

use crate::credentials::{encrypt_cisco_type7, encrypt_netiron_snmp};
use crate::error::HelperError;
use crate::interfaces::{
    classify, mrv_physical_interfaces_to_config, netiron_normalized_interface_to_config,
};
use crate::models::{IpRanges, MrvPort, ServiceInventory};
use crate::services::{has_p2p, is_smn_ip, service_types};
use crate::shaping::{bandwidth_to_optiswitch_name, ShapingRequest, ADVA_TABLE};

type FilterArgs = HashMap<String, Value>;

fn input<T: DeserializeOwned>(filter: &str, value: &Value) -> tera::Result<T> {
    serde_json::from_value(value.clone()).map_err(|e| {
        tera::Error::msg(format!("Filter `{}` received an incorrect type for its input: {}", filter, e))
    })
}

/// Optional numeric argument. Templates pass `false` or `none` to leave it unset.
fn optional_number(filter: &str, args: &FilterArgs, name: &str) -> tera::Result<Option<i64>> {
    match args.get(name) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(value) => value.as_i64().map(Some).ok_or_else(|| {
            tera::Error::msg(format!("Filter `{}`: argument `{}` must be an integer", filter, name))
        }),
    }
}

fn output<T: Serialize>(filter: &str, value: T) -> tera::Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| tera::Error::msg(format!("Filter `{}` could not serialize its result: {}", filter, e)))
}

fn failed(filter: &str, err: HelperError) -> tera::Error {
    tera::Error::msg(format!("Filter `{}` failed: {}", filter, err))
}

fn optiswitch_name_filter(
    filter: &'static str,
) -> impl Fn(&Value, &FilterArgs) -> tera::Result<Value> + Send + Sync {
    move |value: &Value, _: &FilterArgs| {
        let bandwidth: u64 = input(filter, value)?;
        output(filter, bandwidth_to_optiswitch_name(bandwidth))
    }
}

/// Register the helper filters on `tera`. `is_smn_ip` is only available when
/// the SMN ranges document has been loaded.
pub fn register_filters(tera: &mut Tera, smn_ranges: Option<IpRanges>) {
    tera.register_filter("encrypt_cisco_type7", |value: &Value, _: &FilterArgs| {
        let password: String = input("encrypt_cisco_type7", value)?;
        output("encrypt_cisco_type7", encrypt_cisco_type7(&password))
    });

    tera.register_filter("encrypt_netiron_snmp", |value: &Value, _: &FilterArgs| {
        let community: String = input("encrypt_netiron_snmp", value)?;
        let encoded =
            encrypt_netiron_snmp(&community).map_err(|e| failed("encrypt_netiron_snmp", e))?;
        output("encrypt_netiron_snmp", encoded)
    });

    tera.register_filter("interface_type", |value: &Value, args: &FilterArgs| {
        let name: String = input("interface_type", value)?;
        let speed = optional_number("interface_type", args, "speed")?
            .and_then(|speed| u64::try_from(speed).ok());
        let declared = args.get("interface_type").and_then(Value::as_str);
        output("interface_type", classify(&name, speed, declared))
    });

    tera.register_filter(
        "mrv_physical_interfaces_to_config",
        |value: &Value, _: &FilterArgs| {
            let ports: Vec<MrvPort> = input("mrv_physical_interfaces_to_config", value)?;
            let config = mrv_physical_interfaces_to_config(&ports)
                .map_err(|e| failed("mrv_physical_interfaces_to_config", e))?;
            output("mrv_physical_interfaces_to_config", config)
        },
    );

    tera.register_filter(
        "netiron_normalized_interface_to_config",
        |value: &Value, _: &FilterArgs| {
            let name: String = input("netiron_normalized_interface_to_config", value)?;
            output(
                "netiron_normalized_interface_to_config",
                netiron_normalized_interface_to_config(&name),
            )
        },
    );

    // Templates in the wild use the misspelt name
    tera.register_filter(
        "bandwith_to_optiswitch_name",
        optiswitch_name_filter("bandwith_to_optiswitch_name"),
    );
    tera.register_filter(
        "bandwidth_to_optiswitch_name",
        optiswitch_name_filter("bandwidth_to_optiswitch_name"),
    );

    tera.register_filter("adva_shaping_values", |value: &Value, args: &FilterArgs| {
        let request = ShapingRequest {
            bandwidth: input("adva_shaping_values", value)?,
            custom_shaping: args
                .get("custom_shaping")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            shaping_eir_bandwidth: optional_number("adva_shaping_values", args, "shaping_eir")?,
            max_port_bandwidth: optional_number("adva_shaping_values", args, "max_port_bandwidth")?,
        };
        let shaping = ADVA_TABLE
            .resolve(&request)
            .map_err(|e| failed("adva_shaping_values", e))?;
        output("adva_shaping_values", shaping)
    });

    tera.register_filter("service_types", |value: &Value, _: &FilterArgs| {
        let inventories: Vec<ServiceInventory> = input("service_types", value)?;
        output("service_types", service_types(&inventories))
    });

    tera.register_filter("has_p2p", |value: &Value, _: &FilterArgs| {
        let inventories: Vec<ServiceInventory> = input("has_p2p", value)?;
        output("has_p2p", has_p2p(&inventories))
    });

    match smn_ranges {
        Some(ranges) => {
            tera.register_filter("is_smn_ip", move |value: &Value, _: &FilterArgs| {
                let address: String = input("is_smn_ip", value)?;
                let found = is_smn_ip(&address, &ranges).map_err(|e| failed("is_smn_ip", e))?;
                output("is_smn_ip", found)
            });
        }
        None => tracing::debug!("No SMN ranges loaded, is_smn_ip filter not registered"),
    }
}
