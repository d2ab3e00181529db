// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Zero-padded FFT convolution with an even chirp kernel.

use crate::complex::ComplexSample;
use crate::error::{FrftError, FrftResult};
use crate::fft::transform_pow2;

/// Convolves `signal` with an even kernel given by its non-negative lags.
///
/// `kernel[j]` is the weight for lag `j` and also for lag `-j`, so the result
/// is `y[m] = Σ_n signal[n]·kernel[|m - n|]` for `m ∈ [0, N)`.  Both inputs are
/// zero-padded to `next_pow2(2N - 1)`, the kernel's negative lags are wrapped
/// to the tail of its buffer, and the product of the two spectra is brought
/// back and truncated to `N`.
pub(crate) fn fast_convolve(
    signal: &[ComplexSample],
    kernel: &[ComplexSample],
) -> FrftResult<Vec<ComplexSample>> {
    let n = signal.len();
    if n == 0 {
        return Err(FrftError::InvalidSignal);
    }
    if kernel.len() != n {
        return Err(FrftError::LengthMismatch {
            name: "kernel".to_string(),
            expected: n,
            actual: kernel.len(),
        });
    }

    let m = (2 * n - 1).next_power_of_two();
    let mut lhs = vec![ComplexSample::ZERO; m];
    lhs[..n].copy_from_slice(signal);

    let mut rhs = vec![ComplexSample::ZERO; m];
    rhs[..n].copy_from_slice(kernel);
    for j in 1..n {
        rhs[m - j] = kernel[j];
    }

    transform_pow2(&mut lhs, false);
    transform_pow2(&mut rhs, false);
    for (l, r) in lhs.iter_mut().zip(rhs.iter()) {
        *l = l.mul(*r);
    }
    transform_pow2(&mut lhs, true);

    lhs.truncate(n);
    Ok(lhs)
}
