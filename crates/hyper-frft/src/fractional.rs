// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Discrete fractional Fourier transform.
//!
//! The order `α` rotates the time–frequency plane by `φ = απ/2`.  Orders are
//! periodic with period 4 and folded into `(-2, 2]`; integer orders, and
//! angles so close to `0` or `π` that the chirp phases lose precision, run
//! exact special cases.  Every other order runs a chirp–convolve–chirp
//! pipeline:
//!
//! ```text
//! y[m] = N^{-1/2} · e^{iπ cot φ m²/N} · Σ_n e^{-2πi s mn/N} · e^{iπ cot φ n²/N} · x[n],   s = sign(sin φ)
//! ```
//!
//! The inner kernel is expanded with `-2mn = (m-n)² - m² - n²`, which turns the
//! sum into a pre-chirp at rate `cot φ - s`, a convolution with the even chirp
//! `e^{iπ s k²/N}`, and a matching post-chirp.  The resulting operator is
//! symmetric and unitary, and the kernel for `-α` is the conjugate of the
//! kernel for `α`, so `frft(frft(x, a), -a) == x`.  Energy is conserved for
//! every order except the odd integers, which keep the unnormalized FFT scale.

use core::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::complex::ComplexSample;
use crate::convolution::fast_convolve;
use crate::error::{FrftError, FrftResult};
use crate::fft::{fft, ifft};

/// Distance from an integer below which an order is treated as that integer.
pub const ORDER_EPSILON: f64 = 1e-10;

/// Guard on `sin φ`; smaller values would blow up `cot φ`.
pub const SIN_EPSILON: f64 = 1e-10;

/// Largest `|cot φ|·N` evaluated through the chirp pipeline. Chirp phases grow
/// to about `π·|cot φ|·N` radians, so beyond this bound their absolute rounding
/// error passes `1e-10` rad.
pub const CHIRP_PHASE_LIMIT: f64 = 1e6;

/// How a given order is evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrderKind {
    /// `α ≡ 0 (mod 4)`: the signal itself.
    Identity,
    /// `α ≡ 1`: the standard (un-normalised) forward transform.
    Fourier,
    /// `α ≡ 2`: samples in reverse order.
    Reversal,
    /// `α ≡ 3 ≡ -1`: the standard inverse transform, undoing order 1.
    InverseFourier,
    /// Any other order, evaluated through the chirp pipeline at angle
    /// `phi ∈ (-π, π)`.
    Rotation { phi: f64 },
}

/// Folds any real order into `(-2, 2]`.
///
/// The fold is odd, `normalize_order(-a) == -normalize_order(a)` bit for bit
/// (except at `±2`, which both map to `2`), so `±α` always reach mirrored
/// angles and their chirps cancel exactly.
pub fn normalize_order(alpha: f64) -> f64 {
    let rem = alpha % 4.0;
    if rem > 2.0 {
        rem - 4.0
    } else if rem <= -2.0 {
        rem + 4.0
    } else {
        rem
    }
}

/// Classifies an order for a signal of `len` samples without touching any
/// signal data.
///
/// Angles whose `|cot φ|·len` exceeds [`CHIRP_PHASE_LIMIT`] are routed to the
/// nearest even special case, as are angles with `|sin φ| < SIN_EPSILON`.
pub fn classify_order(alpha: f64, len: usize) -> FrftResult<OrderKind> {
    if !alpha.is_finite() {
        return Err(FrftError::NonFiniteOrder(alpha));
    }
    let folded = normalize_order(alpha);
    let nearest = folded.round();
    if (folded - nearest).abs() < ORDER_EPSILON {
        return Ok(integer_kind(nearest as i64));
    }

    let phi = folded * PI / 2.0;
    let (sin, cos) = phi.sin_cos();
    if sin.abs() < SIN_EPSILON || (cos / sin).abs() * len as f64 > CHIRP_PHASE_LIMIT {
        return Ok(if cos > 0.0 {
            OrderKind::Identity
        } else {
            OrderKind::Reversal
        });
    }
    Ok(OrderKind::Rotation { phi })
}

/// Energy gain `‖frft(x, α)‖² / ‖x‖²` of the operator chosen for `len`
/// samples: `N` for the unnormalised forward transform, `1/N` for the inverse
/// and `1` for every other order.
pub fn operator_gain(alpha: f64, len: usize) -> FrftResult<f64> {
    Ok(match classify_order(alpha, len)? {
        OrderKind::Fourier => len as f64,
        OrderKind::InverseFourier => 1.0 / len.max(1) as f64,
        _ => 1.0,
    })
}

fn integer_kind(order: i64) -> OrderKind {
    match order.rem_euclid(4) {
        0 => OrderKind::Identity,
        1 => OrderKind::Fourier,
        2 => OrderKind::Reversal,
        _ => OrderKind::InverseFourier,
    }
}

/// Fractional transform of order `alpha`.
///
/// Returns a signal of the input length.  Empty input fails with
/// [`FrftError::InvalidSignal`] before any numeric work; non-finite orders fail
/// with [`FrftError::NonFiniteOrder`].
pub fn frft(signal: &[ComplexSample], alpha: f64) -> FrftResult<Vec<ComplexSample>> {
    if signal.is_empty() {
        return Err(FrftError::InvalidSignal);
    }
    let kind = classify_order(alpha, signal.len())?;
    trace!(target: "hyper::frft::fractional", len = signal.len(), alpha, ?kind, "frft");

    match kind {
        OrderKind::Identity => Ok(signal.to_vec()),
        OrderKind::Fourier => standard_transform(signal, false),
        OrderKind::Reversal => Ok(signal.iter().rev().copied().collect()),
        OrderKind::InverseFourier => standard_transform(signal, true),
        OrderKind::Rotation { phi } => {
            let (sin, cos) = phi.sin_cos();
            let sign = sin.signum();
            chirp_transform(signal, cos / sin, sign, 1.0 / (signal.len() as f64).sqrt())
        }
    }
}

/// Same as [`frft`] for callers holding an optional signal; `None` is an
/// invalid signal.
pub fn frft_opt(signal: Option<&[ComplexSample]>, alpha: f64) -> FrftResult<Vec<ComplexSample>> {
    frft(signal.ok_or(FrftError::InvalidSignal)?, alpha)
}

/// Standard forward/inverse transform that keeps the input length.
///
/// Power-of-two lengths go straight through the radix pipeline; other lengths
/// use the chirp pipeline at `φ = ±π/2`, which evaluates the exact length-`N`
/// transform without padding.
fn standard_transform(signal: &[ComplexSample], inverse: bool) -> FrftResult<Vec<ComplexSample>> {
    let n = signal.len();
    if n.is_power_of_two() {
        return Ok(if inverse { ifft(signal) } else { fft(signal) });
    }
    if inverse {
        chirp_transform(signal, 0.0, -1.0, 1.0 / n as f64)
    } else {
        chirp_transform(signal, 0.0, 1.0, 1.0)
    }
}

/// `y[m] = scale · e^{iπ cot m²/N} Σ_n e^{-2πi s mn/N} e^{iπ cot n²/N} x[n]`.
fn chirp_transform(
    signal: &[ComplexSample],
    cot: f64,
    sign: f64,
    scale: f64,
) -> FrftResult<Vec<ComplexSample>> {
    let n = signal.len();
    let len = n as f64;
    let rate = cot - sign;

    let chirp = |k: usize| ComplexSample::cis(PI * rate * (k as f64) * (k as f64) / len);
    // sign is ±1, so the kernel phase is periodic in k² with period 2N.
    let kernel: Vec<ComplexSample> = (0..n)
        .map(|k| ComplexSample::cis(PI * sign * ((k * k) % (2 * n)) as f64 / len))
        .collect();

    let pre: Vec<ComplexSample> = signal
        .iter()
        .enumerate()
        .map(|(k, x)| x.mul(chirp(k)))
        .collect();
    let convolved = fast_convolve(&pre, &kernel)?;

    Ok(convolved
        .into_iter()
        .enumerate()
        .map(|(k, y)| y.mul(chirp(k)).scale(scale))
        .collect())
}
