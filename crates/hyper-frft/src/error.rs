// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use thiserror::Error;

/// Result alias used across the engine.
pub type FrftResult<T> = Result<T, FrftError>;

/// Errors raised by the fractional spectral engine.
///
/// Degenerate (all-zero) signals are not errors: every ratio computed from
/// them resolves to zero instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrftError {
    /// The signal was absent or contained no samples.
    #[error("signal must contain at least one sample")]
    InvalidSignal,
    /// A batch was built without any named signals.
    #[error("signal batch must contain at least one named signal")]
    EmptyBatch,
    /// Two signals that must share a length did not.
    #[error("signal `{name}` has length {actual}, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    /// The transform order was NaN or infinite.
    #[error("transform order must be finite, got {0}")]
    NonFiniteOrder(f64),
    /// An analysis parameter was outside its valid range.
    #[error("invalid analysis configuration: {0}")]
    InvalidConfig(String),
}
