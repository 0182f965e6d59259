//! Armor config (resource)
//!
//! Hardcoded defaults через `Default`, override из TOML:
//!
//! ```toml
//! detach_grace_secs = 5.0
//! fixed_hz = 64.0
//! rng_seed = 42
//! default_sorting_layer = "Default"
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ArmorError, Result};

/// Время (сек) после detach, пока коллизия с бывшим limb остаётся подавленной
pub const DEFAULT_DETACH_GRACE_SECS: f32 = 5.0;

/// Частота fixed clock. 1/64 точно представимо в f32, поэтому
/// накопление `elapsed` не дрейфует на границе grace period.
pub const DEFAULT_FIXED_HZ: f64 = 64.0;

/// Sorting layer, в который броня возвращается после detach
pub const DEFAULT_SORTING_LAYER: &str = "Default";

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmorConfig {
    /// Grace period после detach (секунды)
    pub detach_grace_secs: f32,
    /// Fixed simulation rate (Hz)
    pub fixed_hz: f64,
    /// Seed для puncture rolls
    pub rng_seed: u64,
    /// Sorting layer снятой брони
    pub default_sorting_layer: String,
}

impl Default for ArmorConfig {
    fn default() -> Self {
        Self {
            detach_grace_secs: DEFAULT_DETACH_GRACE_SECS,
            fixed_hz: DEFAULT_FIXED_HZ,
            rng_seed: 42,
            default_sorting_layer: DEFAULT_SORTING_LAYER.to_string(),
        }
    }
}

impl ArmorConfig {
    /// Parse + validate. Невалидный config = usage error, не fallback на defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ArmorError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.detach_grace_secs.is_finite() || self.detach_grace_secs <= 0.0 {
            return Err(ArmorError::InvalidConfig(format!(
                "detach_grace_secs must be a positive number, got {}",
                self.detach_grace_secs
            )));
        }

        if !self.fixed_hz.is_finite() || self.fixed_hz <= 0.0 {
            return Err(ArmorError::InvalidConfig(format!(
                "fixed_hz must be a positive rate, got {}",
                self.fixed_hz
            )));
        }

        if self.default_sorting_layer.trim().is_empty() {
            return Err(ArmorError::InvalidConfig(
                "default_sorting_layer must not be empty".into(),
            ));
        }

        Ok(())
    }
}
