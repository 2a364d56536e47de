//! Engine preferences, passed explicitly into every projection, plus their
//! on-disk persistence.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::EngineError;
use crate::ledger::Mode;

const CONFIG_FILE: &str = "config.json";
const APP_DIR: &str = "budget_calendar";
const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default)]
    pub mode: Mode,
    /// How far ahead the calendar view projects rules that have no end date.
    #[serde(default = "EngineConfig::default_calendar_horizon_months")]
    pub calendar_horizon_months: u32,
    #[serde(default = "EngineConfig::default_fiscal_year_start_month")]
    pub fiscal_year_start_month: u32,
    #[serde(default = "EngineConfig::default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,
    /// Most projections a [`crate::projection::ProjectionCache`] keeps at once.
    #[serde(default = "EngineConfig::default_cache_capacity")]
    pub cache_capacity: usize,
    /// Currency code shown next to every table.
    #[serde(default = "EngineConfig::default_currency")]
    pub currency: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            calendar_horizon_months: Self::default_calendar_horizon_months(),
            fiscal_year_start_month: Self::default_fiscal_year_start_month(),
            cache_ttl_seconds: Self::default_cache_ttl_seconds(),
            cache_capacity: Self::default_cache_capacity(),
            currency: Self::default_currency(),
        }
    }
}

impl EngineConfig {
    pub fn default_calendar_horizon_months() -> u32 {
        6
    }

    pub fn default_fiscal_year_start_month() -> u32 {
        1
    }

    pub fn default_cache_capacity() -> usize {
        32
    }

    pub fn default_cache_ttl_seconds() -> u64 {
        300
    }

    pub fn default_currency() -> String {
        "CAD".into()
    }

    /// Fiscal start month, falling back to January when out of range.
    pub fn fiscal_start_month(&self) -> u32 {
        if (1..=12).contains(&self.fiscal_year_start_month) {
            self.fiscal_year_start_month
        } else {
            1
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }
}

/// Loads and saves [`EngineConfig`] as JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// `<platform config dir>/budget_calendar/config.json`.
    pub fn default_location() -> Self {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join(APP_DIR).join(CONFIG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<EngineConfig, EngineError> {
        if !self.config_path.exists() {
            debug!(path = %self.config_path.display(), "no config file; using defaults");
            return Ok(EngineConfig::default());
        }
        let data = fs::read_to_string(&self.config_path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Writes to a sibling tmp file first, then renames over the target.
    pub fn save(&self, config: &EngineConfig) -> Result<(), EngineError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.config_path);
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, &self.config_path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}
