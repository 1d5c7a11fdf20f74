//! Configuration loading and merging.
//!
//! Defaults, then an optional TOML file, then environment variables. The
//! environment names (NVA_PRIMARY, ROUTE_TAG, ...) are the ones existing
//! deployments already set, so they carry over unchanged.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::schema::{AppConfig, DEFAULT_HEARTBEAT_SECS};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A loaded configuration plus warnings to surface once logging is up.
///
/// The loader runs before the tracing subscriber is installed, so non-fatal
/// fallbacks (bad heartbeat, unparseable booleans) are returned to the caller
/// instead of being logged here.
#[derive(Debug)]
pub struct Loaded {
    pub config: AppConfig,
    pub warnings: Vec<String>,
}

/// Load, merge and validate configuration.
pub fn load(path: Option<&Path>) -> Result<Loaded, ConfigError> {
    let vars: HashMap<String, String> = std::env::vars().collect();
    load_with_env(path, &vars)
}

/// Same as [`load`] but with an explicit environment map.
pub fn load_with_env(
    path: Option<&Path>,
    vars: &HashMap<String, String>,
) -> Result<Loaded, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => AppConfig::default(),
    };

    let mut warnings = Vec::new();
    apply_env_overrides(&mut config, vars, &mut warnings);
    normalize(&mut config, &mut warnings);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(Loaded { config, warnings })
}

fn apply_env_overrides(
    config: &mut AppConfig,
    vars: &HashMap<String, String>,
    warnings: &mut Vec<String>,
) {
    if let Some(v) = non_empty(vars, "NVA_PRIMARY") {
        config.appliances.primary = v;
    }
    if let Some(v) = non_empty(vars, "NVA_SECONDARY") {
        config.appliances.secondary = v;
    }
    if let Some(v) = non_empty(vars, "NVA_SUBSCRIPTION") {
        config.appliances.subscription_id = v;
    }
    if let Some(v) = non_empty(vars, "NVA_RESOURCE_GROUPS") {
        config.appliances.resource_groups = split_csv(&v);
    }
    if let Some(v) = non_empty(vars, "OTHER_SUBSCRIPTIONS") {
        config.routes.subscriptions = split_csv(&v);
    }
    if let Some(v) = non_empty(vars, "ROUTE_TAG") {
        config.routes.tag_key = v;
    }
    if let Some(v) = non_empty(vars, "ROUTE_NAMES") {
        config.routes.route_names = split_csv(&v);
    }
    if let Some(v) = non_empty(vars, "MANAGED_IDENTITY_ID") {
        config.cloud.managed_identity_client_id = Some(v);
    }

    if let Some(v) = non_empty(vars, "HEARTBEAT") {
        match v.parse::<u64>() {
            Ok(secs) => config.scheduler.heartbeat_secs = secs,
            Err(_) => {
                warnings.push(format!(
                    "HEARTBEAT configured for invalid value ({}), defaulting to {} seconds",
                    v, DEFAULT_HEARTBEAT_SECS
                ));
                config.scheduler.heartbeat_secs = DEFAULT_HEARTBEAT_SECS;
            }
        }
    }

    // Older deployments set ENABLE instead of ENABLED; accept both.
    let enabled = non_empty(vars, "ENABLED").or_else(|| non_empty(vars, "ENABLE"));
    if let Some(v) = enabled {
        config.scheduler.enabled = parse_bool(&v).unwrap_or_else(|| {
            warnings.push(format!("ENABLED has unrecognized value ({}), treating as false", v));
            false
        });
    }
    if let Some(v) = non_empty(vars, "PREEMPT") {
        config.scheduler.preempt = parse_bool(&v).unwrap_or_else(|| {
            warnings.push(format!("PREEMPT has unrecognized value ({}), treating as false", v));
            false
        });
    }
}

fn normalize(config: &mut AppConfig, warnings: &mut Vec<String>) {
    if config.scheduler.heartbeat_secs == 0 {
        warnings.push(format!(
            "Heartbeat configured for invalid value (0), defaulting to {} seconds",
            DEFAULT_HEARTBEAT_SECS
        ));
        config.scheduler.heartbeat_secs = DEFAULT_HEARTBEAT_SECS;
    }
}

fn non_empty(vars: &HashMap<String, String>, key: &str) -> Option<String> {
    vars.get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
