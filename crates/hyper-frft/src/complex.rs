// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Minimal complex sample type shared by every transform in the crate.

use core::f64::consts::PI;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Ordered sequence of complex samples.
pub type Signal = Vec<ComplexSample>;

/// Immutable `{re, im}` pair; every operation returns a new sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplexSample {
    pub re: f64,
    pub im: f64,
}

impl ComplexSample {
    pub const ZERO: Self = Self { re: 0.0, im: 0.0 };
    pub const ONE: Self = Self { re: 1.0, im: 0.0 };

    #[inline]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Purely real sample.
    #[inline]
    pub const fn real(re: f64) -> Self {
        Self { re, im: 0.0 }
    }

    /// `exp(i·theta)`.
    #[inline]
    pub fn cis(theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        Self::new(cos, sin)
    }

    #[inline]
    pub fn from_polar(magnitude: f64, phase: f64) -> Self {
        Self::cis(phase).scale(magnitude)
    }

    #[inline]
    pub fn scale(self, rhs: f64) -> Self {
        Self::new(self.re * rhs, self.im * rhs)
    }

    #[inline]
    #[allow(
        clippy::should_implement_trait,
        reason = "Minimal complex helper keeps explicit method names for clarity"
    )]
    pub fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }

    #[inline]
    #[allow(
        clippy::should_implement_trait,
        reason = "Minimal complex helper keeps explicit method names for clarity"
    )]
    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }

    #[inline]
    #[allow(
        clippy::should_implement_trait,
        reason = "Minimal complex helper keeps explicit method names for clarity"
    )]
    pub fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }

    #[inline]
    pub fn conj(self) -> Self {
        Self::new(self.re, -self.im)
    }

    /// Squared magnitude `re² + im²`.
    #[inline]
    pub fn norm_sqr(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    #[inline]
    pub fn norm(self) -> f64 {
        self.re.hypot(self.im)
    }

    /// Phase angle in `(-π, π]`.
    #[inline]
    pub fn arg(self) -> f64 {
        self.im.atan2(self.re)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }

    /// Multiplies by `-i` (forward quarter turn) or `+i` when `inverse`.
    #[inline]
    pub(crate) fn quarter_turn(self, inverse: bool) -> Self {
        if inverse {
            Self::new(-self.im, self.re)
        } else {
            Self::new(self.im, -self.re)
        }
    }
}

impl From<Complex64> for ComplexSample {
    fn from(value: Complex64) -> Self {
        Self::new(value.re, value.im)
    }
}

impl From<ComplexSample> for Complex64 {
    fn from(value: ComplexSample) -> Self {
        Complex64::new(value.re, value.im)
    }
}

impl From<f64> for ComplexSample {
    fn from(value: f64) -> Self {
        Self::real(value)
    }
}

/// Wraps a real series into a zero-imaginary signal.
pub fn real_signal(values: &[f64]) -> Signal {
    values.iter().copied().map(ComplexSample::real).collect()
}

/// Total energy `Σ |x|²`, summed left to right.
pub fn energy(signal: &[ComplexSample]) -> f64 {
    signal.iter().map(|c| c.norm_sqr()).sum()
}

/// Wraps a phase into `(-π, π]`.
pub fn wrap_phase(theta: f64) -> f64 {
    let wrapped = (theta + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI {
        wrapped + 2.0 * PI
    } else {
        wrapped
    }
}
