//! Tessera Configuration
//!
//! Shared configuration for the circuit library and the rollup simulator.
//!
//! The first file found wins:
//! 1. the path in `TS_CONFIG`
//! 2. `config.toml` in the working directory
//! 3. `~/.tessera/config.toml`
//!
//! `TS_*` variables are applied on top of whatever the file said.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, OnceLock};
use std::{env, fs};

/// Process-wide config, set once by the binary or lazily by [`TesseraConfig::global`].
pub static GLOBAL_CONFIG: OnceLock<TesseraConfig> = OnceLock::new();

const CONFIG_FILE_NAME: &str = "config.toml";
const CONFIG_DIR_NAME: &str = ".tessera";

// ============================================================================
// Default Constants
// ============================================================================

const DEFAULT_LOG_FAILURES: bool = true;
const DEFAULT_EMIT_JSON: bool = false;
const DEFAULT_OUTPUT_EXTENSION: &str = "hex";

/// One table per section of `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TesseraConfig {
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
}

/// How soft constraint failures are collected
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    #[serde(default)]
    pub mode: FailureModeToml,
    #[serde(default = "default_log_failures")]
    pub log_failures: bool,
}

/// Failure collection mode for TOML config
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailureModeToml {
    /// Keep only the first failure (proof-system semantics)
    #[default]
    First,
    /// Keep every failure, useful when debugging a witness
    All,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            mode: FailureModeToml::First,
            log_failures: DEFAULT_LOG_FAILURES,
        }
    }
}

fn default_log_failures() -> bool {
    DEFAULT_LOG_FAILURES
}

/// `rollup-sim` output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default = "default_emit_json")]
    pub emit_json: bool,
    #[serde(default = "default_output_extension")]
    pub output_extension: String,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            emit_json: DEFAULT_EMIT_JSON,
            output_extension: DEFAULT_OUTPUT_EXTENSION.into(),
        }
    }
}

fn default_emit_json() -> bool {
    DEFAULT_EMIT_JSON
}
fn default_output_extension() -> String {
    DEFAULT_OUTPUT_EXTENSION.into()
}

// ============================================================================
// Environment Overrides
// ============================================================================

fn override_from_env<T>(key: &str, field: &mut T, parse: impl FnOnce(String) -> T) {
    if let Ok(raw) = env::var(key) {
        *field = parse(raw);
    }
}

/// `"1"` and `"true"` (any case) are truthy, anything else is false.
fn truthy(raw: String) -> bool {
    raw == "1" || raw.eq_ignore_ascii_case("true")
}

impl FailureModeToml {
    fn parse_lenient(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "all" => FailureModeToml::All,
            _ => FailureModeToml::First,
        }
    }
}

// ============================================================================
// Implementation
// ============================================================================

impl TesseraConfig {
    /// Searches the usual locations, then applies `TS_*` overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::locate() {
            Some(path) => {
                log::info!("Tessera config: {}", path.display());
                Self::read_file(&path)?
            }
            None => {
                log::info!("Tessera config: built-in defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    fn locate() -> Option<PathBuf> {
        let explicit = env::var("TS_CONFIG").ok().map(PathBuf::from);
        let local = Some(PathBuf::from(CONFIG_FILE_NAME));
        [explicit, local, Self::default_config_path()]
            .into_iter()
            .flatten()
            .find(|candidate| candidate.exists())
    }

    fn apply_env_overrides(&mut self) {
        let diagnostics = &mut self.diagnostics;
        override_from_env("TS_FAILURE_MODE", &mut diagnostics.mode, |raw| {
            FailureModeToml::parse_lenient(&raw)
        });
        override_from_env("TS_LOG_FAILURES", &mut diagnostics.log_failures, truthy);

        let simulator = &mut self.simulator;
        override_from_env("TS_OUTPUT_DIR", &mut simulator.output_dir, Some);
        override_from_env("TS_OUTPUT_EXTENSION", &mut simulator.output_extension, |raw| raw);
        override_from_env("TS_OUTPUT_JSON", &mut simulator.emit_json, truthy);
    }

    /// `~/.tessera/config.toml`, if a home directory is known.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// A `config.toml` with every key spelled out.
    pub fn generate_sample() -> String {
        let sample = Self {
            simulator: SimulatorConfig {
                output_dir: Some("./rollup-out".into()),
                ..SimulatorConfig::default()
            },
            ..Self::default()
        };
        toml::to_string_pretty(&sample).unwrap_or_default()
    }

    /// The process config. Loads on first use; a broken file falls back to defaults.
    pub fn global() -> &'static TesseraConfig {
        GLOBAL_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                log::warn!("Ignoring Tessera config ({e:#}), using defaults");
                Self::default()
            })
        })
    }

    pub fn try_global() -> Option<&'static TesseraConfig> {
        GLOBAL_CONFIG.get()
    }

    /// Fails with the rejected config if one was already installed.
    pub fn set_global(config: TesseraConfig) -> Result<(), TesseraConfig> {
        GLOBAL_CONFIG.set(config)
    }
}

// ============================================================================
// Parsed Config
// ============================================================================

/// Diagnostics settings, read once from the global config.
pub static DIAGNOSTICS: LazyLock<DiagnosticsRuntime> = LazyLock::new(|| {
    let cfg = TesseraConfig::global();
    DiagnosticsRuntime {
        mode: cfg.diagnostics.mode,
        log_failures: cfg.diagnostics.log_failures,
    }
});

pub struct DiagnosticsRuntime {
    pub mode: FailureModeToml,
    pub log_failures: bool,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TesseraConfig::default();
        assert_eq!(config.diagnostics.mode, FailureModeToml::First);
        assert!(config.diagnostics.log_failures);
        assert!(config.simulator.output_dir.is_none());
        assert!(!config.simulator.emit_json);
    }

    #[test]
    fn test_sample_has_both_sections_and_parses_back() {
        let sample = TesseraConfig::generate_sample();
        assert!(sample.contains("[diagnostics]"));
        assert!(sample.contains("[simulator]"));
        let parsed: TesseraConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.simulator.output_dir.as_deref(), Some("./rollup-out"));
        assert_eq!(parsed.simulator.output_extension, DEFAULT_OUTPUT_EXTENSION);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: TesseraConfig = toml::from_str("[diagnostics]\nmode = \"all\"\n").unwrap();
        assert_eq!(parsed.diagnostics.mode, FailureModeToml::All);
        assert!(parsed.diagnostics.log_failures);
        assert!(!parsed.simulator.emit_json);
    }

    #[test]
    fn test_load_from_file() {
        let path = env::temp_dir().join(format!("tessera-config-{}.toml", std::process::id()));
        fs::write(&path, "[simulator]\nemit_json = true\n").unwrap();
        let loaded = TesseraConfig::load_from(&path);
        fs::remove_file(&path).unwrap();
        assert!(loaded.unwrap().simulator.emit_json);
        assert!(TesseraConfig::load_from(Path::new("/nonexistent/tessera.toml")).is_err());
    }

    #[test]
    fn test_global_is_initialized_on_first_use() {
        let first = TesseraConfig::global() as *const TesseraConfig;
        let again = TesseraConfig::try_global().map(|c| c as *const TesseraConfig);
        assert_eq!(again, Some(first));
        assert!(TesseraConfig::set_global(TesseraConfig::default()).is_err());
    }

    #[test]
    fn test_failure_mode_parse_is_lenient() {
        assert_eq!(FailureModeToml::parse_lenient("ALL"), FailureModeToml::All);
        assert_eq!(FailureModeToml::parse_lenient("first"), FailureModeToml::First);
        assert_eq!(FailureModeToml::parse_lenient("bogus"), FailureModeToml::First);
    }
}
