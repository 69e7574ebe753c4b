use std::env;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::calculator::CalculatorConfig;
use crate::catalog::Catalog;
use crate::placement::{ColorMode, Palette};
use crate::types::validation;

/// Source of raw configuration values, by variable name.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub planner: PlannerConfig,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(&env_string)
    }

    /// Creates a configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        Self {
            api: ApiConfig::from_lookup(lookup),
            planner: PlannerConfig::from_lookup(lookup),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
}

impl ApiConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 8080;
    const HOST_VAR: &'static str = "LOADPLAN_API_HOST";
    const PORT_VAR: &'static str = "LOADPLAN_API_PORT";

    fn from_lookup(lookup: Lookup<'_>) -> Self {
        let host_value = lookup(Self::HOST_VAR).unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let (bind_ip, display_host) = match host_value.parse::<IpAddr>() {
            Ok(ip) => (ip, host_value),
            Err(err) => {
                tracing::warn!(
                    "Could not parse {} ('{}'): {}. Using {}.",
                    Self::HOST_VAR,
                    host_value,
                    err,
                    Self::DEFAULT_HOST
                );
                (
                    IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                    Self::DEFAULT_HOST.to_string(),
                )
            }
        };

        let port = match lookup(Self::PORT_VAR) {
            Some(raw) => match raw.parse::<u16>() {
                Ok(value) if value != 0 => value,
                Ok(_) => {
                    tracing::warn!(
                        "{} must not be 0. Using {}.",
                        Self::PORT_VAR,
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
                Err(err) => {
                    tracing::warn!(
                        "Could not parse {} ('{}'): {}. Using {}.",
                        Self::PORT_VAR,
                        raw,
                        err,
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
            },
            None => Self::DEFAULT_PORT,
        };

        Self {
            bind_ip,
            display_host,
            port,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            display_host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
        }
    }
}

/// Configuration for the load calculation and the container catalog.
#[derive(Clone, Debug, Default)]
pub struct PlannerConfig {
    calculator: CalculatorConfig,
    catalog_path: Option<PathBuf>,
}

impl PlannerConfig {
    const ALLOW_ROTATION_VAR: &'static str = "LOADPLAN_ALLOW_ROTATIONS";
    const COLOR_POLICY_VAR: &'static str = "LOADPLAN_COLOR_POLICY";
    const PALETTE_VAR: &'static str = "LOADPLAN_PALETTE";
    const CATALOG_PATH_VAR: &'static str = "LOADPLAN_CATALOG_PATH";
    const MAX_PLACEMENTS_VAR: &'static str = "LOADPLAN_MAX_PLACEMENTS";

    fn from_lookup(lookup: Lookup<'_>) -> Self {
        let allow_item_rotation = lookup(Self::ALLOW_ROTATION_VAR)
            .and_then(|raw| parse_bool(&raw, Self::ALLOW_ROTATION_VAR))
            .unwrap_or(CalculatorConfig::DEFAULT_ALLOW_ITEM_ROTATION);

        let color_mode = match lookup(Self::COLOR_POLICY_VAR) {
            Some(raw) => ColorMode::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    "{} must be 'palette' or 'item', got '{}'. Using palette.",
                    Self::COLOR_POLICY_VAR,
                    raw
                );
                ColorMode::default()
            }),
            None => ColorMode::default(),
        };

        let palette = lookup(Self::PALETTE_VAR)
            .and_then(|raw| parse_palette(&raw, Self::PALETTE_VAR))
            .unwrap_or_default();

        let max_placements = lookup(Self::MAX_PLACEMENTS_VAR)
            .and_then(|raw| parse_limit(&raw, Self::MAX_PLACEMENTS_VAR))
            .unwrap_or(CalculatorConfig::DEFAULT_MAX_PLACEMENTS);

        let calculator = CalculatorConfig::builder()
            .allow_item_rotation(allow_item_rotation)
            .color_mode(color_mode)
            .palette(palette)
            .max_placements(max_placements)
            .build();

        Self {
            calculator,
            catalog_path: lookup(Self::CATALOG_PATH_VAR).map(PathBuf::from),
        }
    }

    /// Returns the configured calculator settings.
    pub fn calculator_config(&self) -> &CalculatorConfig {
        &self.calculator
    }

    /// Path of a JSON catalog file, if one is configured.
    pub fn catalog_path(&self) -> Option<&Path> {
        self.catalog_path.as_deref()
    }

    /// Loads the container catalog once.
    ///
    /// A configured file that cannot be used is logged and replaced by the
    /// built-in standard catalog.
    pub fn load_catalog(&self) -> Catalog {
        let Some(path) = self.catalog_path() else {
            return Catalog::standard();
        };
        match Catalog::from_json_file(path) {
            Ok(catalog) => {
                tracing::info!(
                    path = %path.display(),
                    containers = catalog.len(),
                    "loaded container catalog"
                );
                catalog
            }
            Err(err) => {
                tracing::error!(
                    path = %path.display(),
                    "{}. Using the built-in catalog.",
                    err
                );
                Catalog::standard()
            }
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            tracing::warn!("Access to {} failed: {}. Using default value.", name, err);
            None
        }
    }
}

fn parse_bool(raw: &str, var_name: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        other => {
            tracing::warn!(
                "Could not interpret {} ('{}') as boolean value. Using default value.",
                var_name,
                other
            );
            None
        }
    }
}

fn parse_limit(raw: &str, var_name: &str) -> Option<u64> {
    match raw.trim().parse::<u64>() {
        Ok(limit) if limit > 0 => Some(limit),
        _ => {
            tracing::warn!(
                "{} must be a positive integer, got '{}'. Using default value.",
                var_name,
                raw
            );
            None
        }
    }
}

fn parse_palette(raw: &str, var_name: &str) -> Option<Palette> {
    let colors: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
        .collect();

    if colors.is_empty() {
        tracing::warn!("{} is empty. Using the standard palette.", var_name);
        return None;
    }
    if let Some(bad) = colors.iter().find(|c| !validation::is_hex_color(c)) {
        tracing::warn!(
            "{} contains '{}', which is not a #RRGGBB color. Using the standard palette.",
            var_name,
            bad
        );
        return None;
    }
    Some(Palette::new(colors))
}
