use std::fs;
use std::path::Path;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use vmcheck_inventory::{FleetSnapshot, load_snapshots};
use vmcheck_kernel::CheckConfig;

/// Errors while loading the TOML config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{path}: {message}")]
    Io { path: String, message: String },

    #[error("{path}: invalid config: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

pub fn init_tracing(verbose: u8, log_json: bool) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .init();
    }
}

/// Parse a check config from TOML text. Missing fields keep their defaults.
pub fn parse_config(path: &str, text: &str) -> Result<CheckConfig, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })
}

fn load_config(path: &str) -> Result<CheckConfig, ConfigError> {
    let text = fs::read_to_string(Path::new(path)).map_err(|e| ConfigError::Io {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    parse_config(path, &text)
}

/// Defaults, then the config file, then flag overrides.
pub fn resolve_config_or_exit(config: Option<&str>, property_key: Option<String>) -> CheckConfig {
    let mut resolved = match config {
        Some(path) => load_config(path).unwrap_or_else(|e| {
            eprintln!("error: {e}");
            std::process::exit(1);
        }),
        None => CheckConfig::default(),
    };
    if let Some(key) = property_key {
        resolved.property_key = key;
    }
    resolved
}

pub fn load_snapshots_or_exit(paths: &[String]) -> Vec<FleetSnapshot> {
    load_snapshots(paths).unwrap_or_else(|e| {
        eprintln!("error: failed to load snapshot: {e}");
        std::process::exit(1);
    })
}

pub fn print_json_or_exit(payload: &serde_json::Value) {
    match serde_json::to_string_pretty(payload) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("error: json serialization: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = parse_config("vmcheck.toml", "property_key = \"disk.EnableUUID\"\n")
            .expect("config should parse");
        assert_eq!(config.property_key, "disk.EnableUUID");
        assert_eq!(config.metric_name, "vsphere_vm_cbt_checks");
        assert_eq!(config.label_name, "cbt");
    }

    #[test]
    fn unknown_config_field_is_rejected() {
        let err = parse_config("vmcheck.toml", "propertykey = \"x\"\n").unwrap_err();
        assert!(err.to_string().starts_with("vmcheck.toml: invalid config"));
    }

    #[test]
    fn flag_overrides_default_property_key() {
        let config = resolve_config_or_exit(None, Some("other".to_string()));
        assert_eq!(config.property_key, "other");
    }
}
