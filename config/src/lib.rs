//! Pixelshare Configuration
//!
//! Shared configuration crate for all Pixelshare components.
//!
//! Handles loading configuration from:
//! 1. PS_CONFIG env var (explicit path)
//! 2. ./pixelshare.toml (current directory)
//! 3. ~/.pixelshare/config.toml (user home)
//!
//! Environment variables take precedence over TOML config.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

const CONFIG_FILE_NAME: &str = "pixelshare.toml";
const HOME_CONFIG_FILE_NAME: &str = "config.toml";
const CONFIG_DIR_NAME: &str = ".pixelshare";

// ============================================================================
// Default Constants
// ============================================================================

const DEFAULT_THRESHOLD: usize = 2;
const DEFAULT_TOTAL_SHARES: usize = 3;
const DEFAULT_PRIME: u16 = 251;
const DEFAULT_PARALLEL: bool = true;
const DEFAULT_COMPARISON_SHARES: [u8; 2] = [1, 2];

// ============================================================================
// Config Structs
// ============================================================================

/// Root configuration structure (matches TOML layout)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelshareConfig {
    #[serde(default)]
    pub scheme: SchemeConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub comparison: ComparisonConfig,
}

/// Threshold scheme parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeConfig {
    /// K: minimum shares needed to reconstruct
    #[serde(default = "default_threshold")]
    pub threshold: usize,
    /// N: total shares generated
    #[serde(default = "default_total_shares")]
    pub total_shares: usize,
    /// Prime modulus of the sample field
    #[serde(default = "default_prime")]
    pub prime: u16,
}

impl Default for SchemeConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            total_shares: DEFAULT_TOTAL_SHARES,
            prime: DEFAULT_PRIME,
        }
    }
}

fn default_threshold() -> usize {
    DEFAULT_THRESHOLD
}

fn default_total_shares() -> usize {
    DEFAULT_TOTAL_SHARES
}

fn default_prime() -> u16 {
    DEFAULT_PRIME
}

/// Grid processing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Spread split/combine/downscale across worker threads
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            parallel: DEFAULT_PARALLEL,
        }
    }
}

fn default_parallel() -> bool {
    DEFAULT_PARALLEL
}

/// Downscale comparison configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonConfig {
    /// Share indices (x-values) used to reconstruct the downscaled shares
    #[serde(default = "default_comparison_shares")]
    pub shares: Vec<u8>,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            shares: default_comparison_shares(),
        }
    }
}

fn default_comparison_shares() -> Vec<u8> {
    DEFAULT_COMPARISON_SHARES.to_vec()
}

// ============================================================================
// Override Helpers
// ============================================================================

/// Set field from a variable if present and parseable
fn override_parse<T, F>(lookup: &F, key: &str, field: &mut T)
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup(key) {
        match v.parse() {
            Ok(parsed) => *field = parsed,
            Err(_) => log::warn!("Ignoring unparseable {key}={v}"),
        }
    }
}

/// Truthy values are "1" or "true", anything else is false
fn override_bool<F>(lookup: &F, key: &str, field: &mut bool)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup(key) {
        *field = v == "1" || v.eq_ignore_ascii_case("true");
    }
}

/// Comma separated list of share indices, e.g. "1,3"
fn override_list<F>(lookup: &F, key: &str, field: &mut Vec<u8>)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup(key) {
        let parsed: Result<Vec<u8>, _> = v.split(',').map(|s| s.trim().parse()).collect();
        match parsed {
            Ok(list) => *field = list,
            Err(_) => log::warn!("Ignoring unparseable {key}={v}"),
        }
    }
}

// ============================================================================
// Implementation
// ============================================================================

impl PixelshareConfig {
    /// Load configuration from config file with env var overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::find_config_file() {
            Some(path) => {
                log::info!("Loading config from: {}", path.display());
                Self::read_file(&path)?
            }
            None => {
                log::info!("No config file found, using defaults and environment variables");
                Self::default()
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file path
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string, without env overrides
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse config")
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    fn read_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Find the config file path
    fn find_config_file() -> Option<PathBuf> {
        // 1. Check PS_CONFIG env var
        if let Ok(path) = env::var("PS_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
            log::warn!("PS_CONFIG points to missing file: {}", path.display());
        }

        // 2. Check ./pixelshare.toml (current directory)
        let local_path = PathBuf::from(CONFIG_FILE_NAME);
        if local_path.exists() {
            return Some(local_path);
        }

        // 3. Check ~/.pixelshare/config.toml
        dirs::home_dir()
            .map(|h| h.join(CONFIG_DIR_NAME).join(HOME_CONFIG_FILE_NAME))
            .filter(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Scheme
        override_parse(&lookup, "PS_THRESHOLD", &mut self.scheme.threshold);
        override_parse(&lookup, "PS_TOTAL_SHARES", &mut self.scheme.total_shares);
        override_parse(&lookup, "PS_PRIME", &mut self.scheme.prime);

        // Grid
        override_bool(&lookup, "PS_PARALLEL", &mut self.grid.parallel);

        // Comparison
        override_list(&lookup, "PS_COMPARISON_SHARES", &mut self.comparison.shares);
    }
}
