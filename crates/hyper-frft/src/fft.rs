// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Radix-2/radix-4 Cooley–Tukey transforms over [`ComplexSample`] buffers.
//!
//! The driver runs an iterative bit-reversal permutation followed by in-place
//! butterfly stages over a single buffer, so no allocation happens per level.
//! Radix-4 stages are used while they fit and radix-2 stages cover the tail
//! factor.  [`fft`] and [`ifft`] accept arbitrary lengths by zero-padding to
//! the next power of two; [`dft`] is the direct `O(N²)` definition kept as a
//! reference.

use core::f64::consts::PI;
use core::fmt;

use crate::complex::ComplexSample;

/// Radix-2 butterfly. Returns `(top, bottom)`.
#[inline]
pub fn radix2(
    a: ComplexSample,
    b: ComplexSample,
    twiddle: ComplexSample,
) -> (ComplexSample, ComplexSample) {
    let t = b.mul(twiddle);
    (a.add(t), a.sub(t))
}

/// Radix-4 butterfly over four sub-transforms laid out in bit-reversed block
/// order `[r0, r2, r1, r3]`, with `twiddles = [w^j, w^2j, w^3j]`.
///
/// This is exactly two fused radix-2 stages, so it composes with
/// [`radix2`] stages in any order.
#[inline]
pub fn radix4(
    values: [ComplexSample; 4],
    twiddles: [ComplexSample; 3],
    inverse: bool,
) -> [ComplexSample; 4] {
    let a0 = values[0];
    let a1 = values[1].mul(twiddles[1]);
    let a2 = values[2].mul(twiddles[0]);
    let a3 = values[3].mul(twiddles[2]);

    let t0 = a0.add(a1);
    let t1 = a0.sub(a1);
    let t2 = a2.add(a3);
    let t3 = a2.sub(a3).quarter_turn(inverse);

    [t0.add(t2), t1.add(t3), t0.sub(t2), t1.sub(t3)]
}

/// Error raised when the in-place driver receives unsupported parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftError {
    /// Signal length was zero.
    Empty,
    /// Length was not a power of two.
    NonPowerOfTwo,
}

impl fmt::Display for FftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FftError::Empty => f.write_str("FFT signal cannot be empty"),
            FftError::NonPowerOfTwo => {
                f.write_str("FFT length must be a power of two for radix-2/4 pipeline")
            }
        }
    }
}

impl std::error::Error for FftError {}

/// In-place iterative FFT on a power-of-two buffer.  The function accepts
/// forward (`inverse = false`) and inverse (`inverse = true`) transforms; the
/// inverse is scaled by `1/N`.
pub fn fft_inplace(signal: &mut [ComplexSample], inverse: bool) -> Result<(), FftError> {
    let n = signal.len();
    if n == 0 {
        return Err(FftError::Empty);
    }
    if !n.is_power_of_two() {
        return Err(FftError::NonPowerOfTwo);
    }
    transform_pow2(signal, inverse);
    Ok(())
}

/// Forward transform of an arbitrary-length signal.
///
/// Lengths that are not a power of two are zero-padded up to the next power of
/// two, so the output may be longer than the input.  Signals of length zero or
/// one are returned unchanged.
pub fn fft(signal: &[ComplexSample]) -> Vec<ComplexSample> {
    if signal.len() <= 1 {
        return signal.to_vec();
    }
    let mut buf = padded(signal);
    transform_pow2(&mut buf, false);
    buf
}

/// Inverse transform: conjugate, forward transform, conjugate, divide by `N`.
///
/// Shares the zero-padding rule of [`fft`], so `ifft(fft(x))` restores `x`
/// followed by the padding zeros.
pub fn ifft(signal: &[ComplexSample]) -> Vec<ComplexSample> {
    if signal.len() <= 1 {
        return signal.to_vec();
    }
    let mut buf: Vec<ComplexSample> = padded(signal).into_iter().map(|c| c.conj()).collect();
    transform_pow2(&mut buf, false);
    let scale = 1.0 / buf.len() as f64;
    buf.into_iter().map(|c| c.conj().scale(scale)).collect()
}

/// Direct `X[k] = Σ x[n]·exp(-2πikn/N)` without padding.
pub fn dft(signal: &[ComplexSample]) -> Vec<ComplexSample> {
    let n = signal.len();
    (0..n)
        .map(|k| {
            signal
                .iter()
                .enumerate()
                .fold(ComplexSample::ZERO, |acc, (j, x)| {
                    // k·j mod N keeps the angle small for long signals.
                    let turn = ((k * j) % n) as f64 / n as f64;
                    acc.add(x.mul(ComplexSample::cis(-2.0 * PI * turn)))
                })
        })
        .collect()
}

fn padded(signal: &[ComplexSample]) -> Vec<ComplexSample> {
    let mut buf = signal.to_vec();
    buf.resize(signal.len().next_power_of_two(), ComplexSample::ZERO);
    buf
}

/// Transforms a non-empty power-of-two buffer in place.
pub(crate) fn transform_pow2(buf: &mut [ComplexSample], inverse: bool) {
    let n = buf.len();
    debug_assert!(n.is_power_of_two());
    if n <= 1 {
        return;
    }

    bit_reverse_permute(buf);
    let mut m = 1;
    while m < n {
        if m * 4 <= n {
            radix4_stage(buf, m, inverse);
            m *= 4;
        } else {
            radix2_stage(buf, m, inverse);
            m *= 2;
        }
    }

    if inverse {
        let scale = 1.0 / n as f64;
        for v in buf.iter_mut() {
            *v = v.scale(scale);
        }
    }
}

fn radix2_stage(buf: &mut [ComplexSample], half_stride: usize, inverse: bool) {
    let step = half_stride * 2;
    let sign = if inverse { 1.0 } else { -1.0 };
    for k in (0..buf.len()).step_by(step) {
        for j in 0..half_stride {
            let tw = twiddle(j, step, sign);
            let (top, bottom) = radix2(buf[k + j], buf[k + j + half_stride], tw);
            buf[k + j] = top;
            buf[k + j + half_stride] = bottom;
        }
    }
}

fn radix4_stage(buf: &mut [ComplexSample], quarter_stride: usize, inverse: bool) {
    let step = quarter_stride * 4;
    let sign = if inverse { 1.0 } else { -1.0 };
    for k in (0..buf.len()).step_by(step) {
        for j in 0..quarter_stride {
            let base = k + j;
            let vals = [
                buf[base],
                buf[base + quarter_stride],
                buf[base + 2 * quarter_stride],
                buf[base + 3 * quarter_stride],
            ];
            let tw = [
                twiddle(j, step, sign),
                twiddle(2 * j, step, sign),
                twiddle(3 * j, step, sign),
            ];
            let out = radix4(vals, tw, inverse);
            buf[base] = out[0];
            buf[base + quarter_stride] = out[1];
            buf[base + 2 * quarter_stride] = out[2];
            buf[base + 3 * quarter_stride] = out[3];
        }
    }
}

fn twiddle(index: usize, size: usize, sign: f64) -> ComplexSample {
    ComplexSample::cis(2.0 * PI * index as f64 / size as f64 * sign)
}

fn bit_reverse_permute(buf: &mut [ComplexSample]) {
    let n = buf.len();
    let bits = n.trailing_zeros();
    for i in 0..n {
        let rev = i.reverse_bits() >> (usize::BITS - bits);
        if i < rev {
            buf.swap(i, rev);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_signal(n: usize, seed: u64) -> Vec<ComplexSample> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| ComplexSample::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
            .collect()
    }

    fn max_err(a: &[ComplexSample], b: &[ComplexSample]) -> f64 {
        assert_eq!(a.len(), b.len());
        a.iter()
            .zip(b)
            .map(|(x, y)| x.sub(*y).norm())
            .fold(0.0, f64::max)
    }

    #[test]
    fn matches_direct_dft_for_every_stage_mix() {
        // 2, 8, 32 end on a radix-2 stage; 4, 16, 64 are pure radix-4.
        for &n in &[2usize, 4, 8, 16, 32, 64, 128] {
            let x = random_signal(n, n as u64);
            let fast = fft(&x);
            let direct = dft(&x);
            let scale = direct.iter().map(|c| c.norm()).fold(1.0, f64::max);
            assert!(
                max_err(&fast, &direct) <= 1e-9 * n as f64 * scale,
                "n={n}"
            );
        }
    }

    #[test]
    fn agrees_with_rustfft() {
        use rustfft::{num_complex::Complex, FftPlanner};

        let x = random_signal(256, 7);
        let mut reference: Vec<Complex<f64>> =
            x.iter().map(|c| Complex::new(c.re, c.im)).collect();
        FftPlanner::<f64>::new()
            .plan_fft_forward(reference.len())
            .process(&mut reference);
        let reference: Vec<ComplexSample> = reference
            .into_iter()
            .map(|c| ComplexSample::new(c.re, c.im))
            .collect();
        assert!(max_err(&fft(&x), &reference) < 1e-9);
    }

    #[test]
    fn inverse_restores_input() {
        let x = random_signal(64, 11);
        let back = ifft(&fft(&x));
        assert!(max_err(&back, &x) < 1e-12);

        let mut buf = x.clone();
        fft_inplace(&mut buf, false).unwrap();
        fft_inplace(&mut buf, true).unwrap();
        assert!(max_err(&buf, &x) < 1e-12);
    }

    #[test]
    fn pads_non_power_of_two_lengths() {
        let x = random_signal(6, 3);
        let out = fft(&x);
        assert_eq!(out.len(), 8);
        let mut padded_x = x.clone();
        padded_x.resize(8, ComplexSample::ZERO);
        assert!(max_err(&out, &dft(&padded_x)) < 1e-9);

        let back = ifft(&out);
        assert_eq!(back.len(), 8);
        assert!(max_err(&back[..6], &x) < 1e-12);
        assert!(back[6..].iter().all(|c| c.norm() < 1e-12));
    }

    #[test]
    fn trivial_lengths_pass_through() {
        assert!(fft(&[]).is_empty());
        let single = [ComplexSample::new(3.0, -1.0)];
        assert_eq!(fft(&single), single.to_vec());
        assert_eq!(ifft(&single), single.to_vec());
    }

    #[test]
    fn impulse_spreads_flat_and_conserves_energy() {
        let mut data = vec![ComplexSample::ZERO; 8];
        data[0] = ComplexSample::ONE;
        fft_inplace(&mut data, false).unwrap();
        for v in &data {
            assert!((v.re - 1.0).abs() < 1e-12 && v.im.abs() < 1e-12);
        }
        let energy: f64 = data.iter().map(|c| c.norm_sqr()).sum();
        assert!((energy - 8.0).abs() < 1e-9);
    }

    #[test]
    fn in_place_driver_rejects_bad_lengths() {
        assert_eq!(fft_inplace(&mut [], false), Err(FftError::Empty));
        let mut buf = vec![ComplexSample::ZERO; 6];
        assert_eq!(fft_inplace(&mut buf, false), Err(FftError::NonPowerOfTwo));
    }
}
