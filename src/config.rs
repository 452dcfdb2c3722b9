//! Configuration loaded from `roadreach.toml`.
//!
//! Every section falls back to compiled defaults, so an empty or missing file
//! is a valid configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::costing::ConditionalDecision;
use crate::error::{ReachError, Result};
use crate::graph::TravelMode;
use crate::reach::DirectionMask;

/// Environment variable overriding `reach.max_reach`.
pub const MAX_REACH_ENV: &str = "ROADREACH_MAX_REACH";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReachConfig {
    pub reach: ReachSection,
    pub expansion: ExpansionConfig,
    pub costing: CostingConfig,
}

/// Defaults for reach queries and the candidate filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReachSection {
    /// Threshold used when a call does not give one.
    pub max_reach: u32,
    /// Directions computed by default.
    pub direction: DirectionMask,
    /// Minimum reach a candidate edge needs in each requested direction.
    pub min_reach: u32,
}

impl Default for ReachSection {
    fn default() -> Self {
        Self {
            max_reach: 50,
            direction: DirectionMask::Both,
            min_reach: 50,
        }
    }
}

/// Sizing of the expansion's working storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Fewest priority-queue buckets, however small the threshold.
    pub min_buckets: u32,
    /// Most priority-queue buckets, however large the threshold.
    pub max_buckets: u32,
    /// Labels reserved per unit of threshold.
    pub labels_per_reach: u32,
    /// Upper bound on the initial label reservation.
    pub max_label_reservation: u32,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            min_buckets: 16,
            max_buckets: 20_000,
            labels_per_reach: 2,
            max_label_reservation: 131_072,
        }
    }
}

/// Settings for the reference [`ModeCosting`](crate::costing::ModeCosting).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostingConfig {
    pub mode: TravelMode,
    pub allow_uturns: bool,
    /// Decision for conditional restrictions not listed in the overrides.
    pub conditional_default: ConditionalDecision,
    /// Decision per condition expression.
    pub conditional_overrides: HashMap<String, ConditionalDecision>,
}

impl Default for CostingConfig {
    fn default() -> Self {
        Self {
            mode: TravelMode::Auto,
            allow_uturns: false,
            conditional_default: ConditionalDecision::Open,
            conditional_overrides: HashMap::new(),
        }
    }
}

impl ReachConfig {
    /// Load configuration from `path`.
    ///
    /// A missing file yields defaults. An unreadable or invalid file is logged
    /// and also yields defaults. The environment override is applied last.
    pub fn load(path: &Path) -> Self {
        let mut config = if path.exists() {
            match fs::read_to_string(path)
                .map_err(ReachError::from)
                .and_then(|text| Self::parse(&text, &path.display().to_string()))
            {
                Ok(config) => {
                    debug!(path = %path.display(), "config loaded");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                    Self::default()
                }
            }
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        config
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(text: &str) -> Result<Self> {
        Self::parse(text, "<string>")
    }

    fn parse(text: &str, origin: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ReachError::Config {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validate(origin)?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self, origin: &str) -> Result<()> {
        let fail = |message: &str| {
            Err(ReachError::Config {
                path: origin.to_string(),
                message: message.to_string(),
            })
        };
        let exp = &self.expansion;
        if exp.min_buckets == 0 {
            return fail("expansion.min_buckets must be at least 1");
        }
        if exp.max_buckets < exp.min_buckets {
            return fail("expansion.max_buckets must be >= expansion.min_buckets");
        }
        if exp.labels_per_reach == 0 {
            return fail("expansion.labels_per_reach must be at least 1");
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var(MAX_REACH_ENV) {
            self.override_max_reach(&value);
        }
    }

    fn override_max_reach(&mut self, value: &str) {
        match value.trim().parse::<u32>() {
            Ok(max_reach) => self.reach.max_reach = max_reach,
            Err(_) => warn!(value = %value, "ignoring non-numeric {}", MAX_REACH_ENV),
        }
    }
}
