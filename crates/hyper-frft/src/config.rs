// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Analysis parameters and their loading from the layered config stack.

use hyper_config::{determinism, ConfigLayering, LayeredConfig, LayeredConfigError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::analyzer::CanonicalOrder;
use crate::error::{FrftError, FrftResult};
use crate::extraction::ExtractionConfig;
use crate::features::FeatureConfig;
use crate::patterns::PatternThresholds;

/// Config section holding [`AnalysisConfig`].
pub const CONFIG_SECTION: &str = "frft";

/// Cut-offs for the report's recommendation hints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationThresholds {
    pub low_complexity: f64,
    pub high_coherence: f64,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            low_complexity: 0.3,
            high_coherence: 0.8,
        }
    }
}

/// Everything a full analysis run needs. Missing keys fall back to the
/// defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub orders: Vec<CanonicalOrder>,
    pub features: FeatureConfig,
    pub patterns: PatternThresholds,
    pub extraction: ExtractionConfig,
    pub recommendations: RecommendationThresholds,
    /// Fan work out on the rayon pool.
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            orders: CanonicalOrder::ALL.to_vec(),
            features: FeatureConfig::default(),
            patterns: PatternThresholds::default(),
            extraction: ExtractionConfig::default(),
            recommendations: RecommendationThresholds::default(),
            parallel: !determinism::lock_fanout(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Layered(#[from] LayeredConfigError),
    #[error("failed to decode analysis config: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] FrftError),
}

impl AnalysisConfig {
    /// Discovers and merges the config layers, then reads the `frft` section.
    pub fn load(layering: ConfigLayering) -> Result<Self, ConfigError> {
        let layered = LayeredConfig::load(layering)?;
        Self::from_layered(&layered)
    }

    /// Reads the `frft` section of an already merged config.
    pub fn from_layered(layered: &LayeredConfig) -> Result<Self, ConfigError> {
        let config = layered
            .section::<AnalysisConfig>(&[CONFIG_SECTION])?
            .unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// Decodes a bare config value (no `frft` wrapper).
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Whether fan-out should actually run in parallel, honouring the
    /// process-wide determinism switch.
    pub fn effective_parallel(&self) -> bool {
        self.parallel && !determinism::lock_fanout()
    }

    pub fn validate(&self) -> FrftResult<()> {
        let invalid = |msg: String| Err(FrftError::InvalidConfig(msg));
        if self.orders.is_empty() {
            return invalid("at least one transform order is required".into());
        }
        if self.features.band_count == 0 {
            return invalid("features.band_count must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.features.dominant_ratio) {
            return invalid(format!(
                "features.dominant_ratio must lie in [0, 1], got {}",
                self.features.dominant_ratio
            ));
        }
        let p = &self.patterns;
        if !p.emergent_sigma.is_finite() || p.emergent_sigma < 0.0 {
            return invalid(format!(
                "patterns.emergent_sigma must be finite and non-negative, got {}",
                p.emergent_sigma
            ));
        }
        if p.recursion_min_scale < 2 || p.recursion_min_scale > p.recursion_max_scale {
            return invalid(format!(
                "patterns.recursion scales must satisfy 2 <= min <= max, got {}..={}",
                p.recursion_min_scale, p.recursion_max_scale
            ));
        }
        for (name, value) in [
            ("patterns.recursion_threshold", p.recursion_threshold),
            ("patterns.temporal_disagreement", p.temporal_disagreement),
            ("patterns.synchronicity_threshold", p.synchronicity_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return invalid(format!("{name} must lie in [0, 1], got {value}"));
            }
        }
        if self.extraction.length == Some(0) {
            return invalid("extraction.length must be positive".into());
        }
        Ok(())
    }
}
