//! Wheel configuration with serde defaults and range validation.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::constants::{
    CYCLE_LEN, DEFAULT_CURRENCY_SUFFIX, DEFAULT_FREE_SPIN_COUNT, DEFAULT_FULL_TURNS,
    DEFAULT_PITY_PRIMARY, DEFAULT_PITY_SECONDARY, FREE_SPIN_INTERVAL_MS,
    FREE_SPIN_START_DELAY_MS, SPIN_ANIMATION_MS,
};
use crate::sequence::{PitySectors, SequenceError};

#[derive(Debug, Error)]
pub enum WheelConfigError {
    #[error("{field} must be within [{min}, {max}] (got {value})")]
    RangeViolation {
        field: &'static str,
        min: u64,
        max: u64,
        value: u64,
    },
    #[error(transparent)]
    Pity(#[from] SequenceError),
    #[error("failed to parse wheel config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Pity sector choice, as sector numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PityConfig {
    #[serde(default = "PityConfig::default_primary")]
    pub primary: u8,
    #[serde(default = "PityConfig::default_secondary")]
    pub secondary: u8,
}

impl PityConfig {
    #[must_use]
    pub const fn default_primary() -> u8 {
        DEFAULT_PITY_PRIMARY
    }

    #[must_use]
    pub const fn default_secondary() -> u8 {
        DEFAULT_PITY_SECONDARY
    }

    /// Resolve into validated sector indices.
    ///
    /// # Errors
    ///
    /// Returns `SequenceError` if either sector is invalid or they collide.
    pub fn sectors(&self) -> Result<PitySectors, SequenceError> {
        PitySectors::new(self.primary, self.secondary)
    }
}

impl Default for PityConfig {
    fn default() -> Self {
        Self {
            primary: Self::default_primary(),
            secondary: Self::default_secondary(),
        }
    }
}

/// Durations of the three suspension points, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "TimingConfig::default_spin_ms")]
    pub spin_ms: u64,
    #[serde(default = "TimingConfig::default_free_spin_interval_ms")]
    pub free_spin_interval_ms: u64,
    #[serde(default = "TimingConfig::default_free_spin_start_ms")]
    pub free_spin_start_ms: u64,
}

impl TimingConfig {
    const MAX_MS: u64 = 60_000;

    #[must_use]
    pub const fn default_spin_ms() -> u64 {
        SPIN_ANIMATION_MS
    }

    #[must_use]
    pub const fn default_free_spin_interval_ms() -> u64 {
        FREE_SPIN_INTERVAL_MS
    }

    #[must_use]
    pub const fn default_free_spin_start_ms() -> u64 {
        FREE_SPIN_START_DELAY_MS
    }

    #[must_use]
    pub const fn spin(&self) -> Duration {
        Duration::from_millis(self.spin_ms)
    }

    #[must_use]
    pub const fn free_spin_interval(&self) -> Duration {
        Duration::from_millis(self.free_spin_interval_ms)
    }

    #[must_use]
    pub const fn free_spin_start(&self) -> Duration {
        Duration::from_millis(self.free_spin_start_ms)
    }

    /// Scale every delay by `factor`, keeping each at least 1ms.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |ms: u64| {
            let factor = if factor.is_finite() && factor > 0.0 {
                factor
            } else {
                1.0
            };
            #[allow(
                clippy::cast_precision_loss,
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss
            )]
            let scaled = ((ms as f64) * factor).round() as u64;
            scaled.clamp(1, Self::MAX_MS)
        };
        Self {
            spin_ms: scale(self.spin_ms),
            free_spin_interval_ms: scale(self.free_spin_interval_ms),
            free_spin_start_ms: scale(self.free_spin_start_ms),
        }
    }

    fn validate(&self) -> Result<(), WheelConfigError> {
        check_range("timing.spin_ms", self.spin_ms, 1, Self::MAX_MS)?;
        check_range(
            "timing.free_spin_interval_ms",
            self.free_spin_interval_ms,
            1,
            Self::MAX_MS,
        )?;
        check_range(
            "timing.free_spin_start_ms",
            self.free_spin_start_ms,
            1,
            Self::MAX_MS,
        )
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            spin_ms: Self::default_spin_ms(),
            free_spin_interval_ms: Self::default_free_spin_interval_ms(),
            free_spin_start_ms: Self::default_free_spin_start_ms(),
        }
    }
}

/// Top-level wheel configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelConfig {
    #[serde(default)]
    pub pity: PityConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default = "WheelConfig::default_full_turns")]
    pub full_turns: u32,
    #[serde(default = "WheelConfig::default_free_spin_count")]
    pub free_spin_count: usize,
    #[serde(default = "WheelConfig::default_currency")]
    pub currency: String,
}

impl WheelConfig {
    #[must_use]
    pub const fn default_full_turns() -> u32 {
        DEFAULT_FULL_TURNS
    }

    #[must_use]
    pub const fn default_free_spin_count() -> usize {
        DEFAULT_FREE_SPIN_COUNT
    }

    #[must_use]
    pub fn default_currency() -> String {
        DEFAULT_CURRENCY_SUFFIX.to_string()
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `WheelConfigError` when the JSON is malformed or a field
    /// violates its bounds.
    pub fn from_json(json: &str) -> Result<Self, WheelConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `WheelConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), WheelConfigError> {
        self.pity.sectors()?;
        self.timing.validate()?;
        check_range("full_turns", u64::from(self.full_turns), 1, 20)?;
        check_range(
            "free_spin_count",
            self.free_spin_count as u64,
            1,
            CYCLE_LEN as u64,
        )?;
        Ok(())
    }
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            pity: PityConfig::default(),
            timing: TimingConfig::default(),
            full_turns: Self::default_full_turns(),
            free_spin_count: Self::default_free_spin_count(),
            currency: Self::default_currency(),
        }
    }
}

fn check_range(field: &'static str, value: u64, min: u64, max: u64) -> Result<(), WheelConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(WheelConfigError::RangeViolation {
            field,
            min,
            max,
            value,
        })
    }
}
