// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use std::sync::OnceLock;

/// Process-wide switches that trade throughput for reproducible scheduling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeterminismConfig {
    /// Whether deterministic execution is enabled globally.
    pub enabled: bool,
    /// If true fan-out stages run sequentially instead of on the rayon pool.
    pub fix_fanout: bool,
}

impl DeterminismConfig {
    /// Builds a configuration snapshot from environment variables.
    pub fn from_env() -> Self {
        let enabled = std::env::var("HYPER_DETERMINISTIC")
            .ok()
            .map(|v| !matches!(v.as_str(), "0" | "false" | "False" | "off" | "OFF"))
            .unwrap_or(false);

        let fix_fanout = std::env::var("HYPER_DETERMINISTIC_FANOUT")
            .ok()
            .map(|v| matches!(v.as_str(), "1" | "true" | "True" | "on" | "ON"))
            .unwrap_or(enabled);

        Self {
            enabled,
            fix_fanout,
        }
    }
}

static CONFIG: OnceLock<DeterminismConfig> = OnceLock::new();

/// Returns the lazily initialised deterministic configuration.
pub fn config() -> &'static DeterminismConfig {
    CONFIG.get_or_init(DeterminismConfig::from_env)
}

/// Returns whether fan-out stages should be forced to run sequentially.
pub fn lock_fanout() -> bool {
    config().fix_fanout
}
