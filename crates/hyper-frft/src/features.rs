// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Per-transform spectral features.
//!
//! Every ratio in this module returns `0.0` when its denominator vanishes, so
//! silent (all-zero) transforms produce zeros rather than NaN.

use serde::{Deserialize, Serialize};

use crate::complex::ComplexSample;
use crate::fractal::box_counting_dimension;

/// Share of spectral energy a bandwidth range must retain.
pub const BANDWIDTH_COVERAGE: f64 = 0.95;

/// Feature extraction parameters. The defaults are tunable heuristics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Number of equal-width energy bands.
    pub band_count: usize,
    /// A bin is dominant when its magnitude exceeds this fraction of the peak.
    pub dominant_ratio: f64,
    /// How many dominant bins are kept.
    pub max_dominant: usize,
    /// Box-counting levels for the fractal estimator.
    pub fractal_levels: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            band_count: 8,
            dominant_ratio: 0.5,
            max_dominant: 5,
            fractal_levels: 6,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DominantFrequency {
    pub bin: usize,
    pub magnitude: f64,
    pub phase: f64,
}

/// Spectral summary of one transform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub dominant_frequencies: Vec<DominantFrequency>,
    pub energy_bands: Vec<f64>,
    pub spectral_centroid: f64,
    pub bandwidth: usize,
    pub entropy: f64,
    pub phase_coherence: f64,
    pub fractal_dimension: f64,
    pub total_energy: f64,
}

pub fn magnitudes(signal: &[ComplexSample]) -> Vec<f64> {
    signal.iter().map(|c| c.norm()).collect()
}

pub fn phases(signal: &[ComplexSample]) -> Vec<f64> {
    signal.iter().map(|c| c.arg()).collect()
}

/// Bins whose magnitude exceeds `ratio · max`, strongest first (ties by bin),
/// at most `limit` of them.
pub fn dominant_frequencies(
    signal: &[ComplexSample],
    ratio: f64,
    limit: usize,
) -> Vec<DominantFrequency> {
    let peak = signal.iter().map(|c| c.norm()).fold(0.0, f64::max);
    let cutoff = ratio * peak;
    let mut bins: Vec<DominantFrequency> = signal
        .iter()
        .enumerate()
        .filter_map(|(bin, c)| {
            let magnitude = c.norm();
            (magnitude > cutoff).then(|| DominantFrequency {
                bin,
                magnitude,
                phase: c.arg(),
            })
        })
        .collect();
    bins.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude).then(a.bin.cmp(&b.bin)));
    bins.truncate(limit);
    bins
}

/// Splits the bins into `bands` contiguous equal-width ranges and returns each
/// range's share of the total squared magnitude.
///
/// Always returns exactly `bands` non-negative values; they sum to one unless
/// the spectrum is silent, in which case all are zero.
pub fn compute_energy_bands(magnitudes: &[f64], bands: usize) -> Vec<f64> {
    let n = magnitudes.len();
    let total: f64 = magnitudes.iter().map(|m| m * m).sum();
    (0..bands)
        .map(|band| {
            if total <= 0.0 {
                return 0.0;
            }
            let start = band * n / bands;
            let end = (band + 1) * n / bands;
            magnitudes[start..end].iter().map(|m| m * m).sum::<f64>() / total
        })
        .collect()
}

/// `Σ i·m[i]² / Σ m[i]²`, in bin units.
pub fn spectral_centroid(magnitudes: &[f64]) -> f64 {
    let (weighted, total) = magnitudes
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(w, t), (i, m)| {
            let e = m * m;
            (w + i as f64 * e, t + e)
        });
    if total > 0.0 {
        weighted / total
    } else {
        0.0
    }
}

/// Width in bins of the contiguous range left after trimming the weakest
/// `(1 - coverage) / 2` of the energy from each end of the spectrum.
pub fn spectral_bandwidth(magnitudes: &[f64], coverage: f64) -> usize {
    let energies: Vec<f64> = magnitudes.iter().map(|m| m * m).collect();
    let total: f64 = energies.iter().sum();
    if total <= 0.0 {
        return 0;
    }
    let tail = (1.0 - coverage.clamp(0.0, 1.0)) / 2.0 * total;

    let mut lo = 0;
    let mut acc = 0.0;
    while lo < energies.len() {
        acc += energies[lo];
        if acc > tail {
            break;
        }
        lo += 1;
    }

    let mut hi = energies.len() - 1;
    acc = 0.0;
    while hi > 0 {
        acc += energies[hi];
        if acc > tail {
            break;
        }
        hi -= 1;
    }

    if hi >= lo {
        hi - lo + 1
    } else {
        1
    }
}

/// Shannon entropy in bits of the magnitude distribution `p = m / Σm`.
pub fn spectral_entropy(magnitudes: &[f64]) -> f64 {
    let total: f64 = magnitudes.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let entropy: f64 = magnitudes
        .iter()
        .map(|m| m / total)
        .filter(|p| *p > 0.0)
        .map(|p| -p * p.log2())
        .sum();
    entropy.max(0.0)
}

/// Mean resultant length `|mean(e^{iθ})|` of a set of phases.
pub fn phase_coherence(phases: &[f64]) -> f64 {
    if phases.is_empty() {
        return 0.0;
    }
    let (sin, cos) = phases.iter().fold((0.0, 0.0), |(s, c), theta| {
        let (ts, tc) = theta.sin_cos();
        (s + ts, c + tc)
    });
    let n = phases.len() as f64;
    ((sin / n).hypot(cos / n)).min(1.0)
}

/// Computes the full [`FeatureRecord`] for one transform.
pub fn extract_features(signal: &[ComplexSample], config: &FeatureConfig) -> FeatureRecord {
    let mags = magnitudes(signal);
    FeatureRecord {
        dominant_frequencies: dominant_frequencies(
            signal,
            config.dominant_ratio,
            config.max_dominant,
        ),
        energy_bands: compute_energy_bands(&mags, config.band_count),
        spectral_centroid: spectral_centroid(&mags),
        bandwidth: spectral_bandwidth(&mags, BANDWIDTH_COVERAGE),
        entropy: spectral_entropy(&mags),
        phase_coherence: phase_coherence(&phases(signal)),
        fractal_dimension: box_counting_dimension(&mags, config.fractal_levels),
        total_energy: mags.iter().map(|m| m * m).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::real_signal;
    use core::f64::consts::PI;

    #[test]
    fn entropy_prefers_uniform_spread() {
        let flat = spectral_entropy(&[1.0, 1.0, 1.0, 1.0]);
        let peaked = spectral_entropy(&[0.0, 0.0, 4.0, 0.0]);
        assert!(flat > peaked);
        assert!(peaked >= 0.0);
        assert!((flat - 2.0).abs() < 1e-12);
        assert_eq!(spectral_entropy(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn coherence_separates_aligned_and_scattered_phases() {
        let aligned = phase_coherence(&[0.0, 0.0, 0.0, 0.0]);
        let scattered = phase_coherence(&[0.0, PI / 2.0, PI, 3.0 * PI / 2.0]);
        assert!(aligned > scattered);
        assert!((0.0..=1.0).contains(&aligned));
        assert!((0.0..=1.0).contains(&scattered));
        assert!((aligned - 1.0).abs() < 1e-12);
        assert!(scattered < 1e-12);
        assert_eq!(phase_coherence(&[]), 0.0);
    }

    #[test]
    fn energy_bands_have_requested_count() {
        for (mags, k) in [
            (vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], 8usize),
            (vec![1.0, 2.0, 3.0], 8),
            (vec![0.0; 16], 4),
            (vec![], 3),
        ] {
            let bands = compute_energy_bands(&mags, k);
            assert_eq!(bands.len(), k);
            assert!(bands.iter().all(|b| *b >= 0.0 && *b <= 1.0));
            let sum: f64 = bands.iter().sum();
            if mags.iter().any(|m| *m > 0.0) {
                assert!((sum - 1.0).abs() < 1e-12);
            } else {
                assert_eq!(sum, 0.0);
            }
        }
    }

    #[test]
    fn centroid_is_energy_weighted_bin() {
        assert_eq!(spectral_centroid(&[0.0, 0.0, 3.0, 0.0]), 2.0);
        assert!((spectral_centroid(&[1.0, 0.0, 0.0, 1.0]) - 1.5).abs() < 1e-12);
        assert_eq!(spectral_centroid(&[0.0; 4]), 0.0);
    }

    #[test]
    fn bandwidth_trims_weak_tails() {
        assert_eq!(spectral_bandwidth(&[0.0, 0.0, 0.0, 5.0, 0.0], 0.95), 1);
        assert_eq!(spectral_bandwidth(&[1.0; 8], 0.95), 8);
        // Tiny outer bins fall inside the 2.5% tails.
        assert_eq!(spectral_bandwidth(&[0.1, 1.0, 1.0, 1.0, 0.1], 0.95), 3);
        assert_eq!(spectral_bandwidth(&[0.0; 8], 0.95), 0);
    }

    #[test]
    fn dominant_bins_are_sorted_and_capped() {
        let signal = real_signal(&[0.1, 5.0, 3.0, 4.0, 2.6, 2.6, 4.5, 3.5, 1.0]);
        let dominant = dominant_frequencies(&signal, 0.5, 5);
        let bins: Vec<usize> = dominant.iter().map(|d| d.bin).collect();
        assert_eq!(bins, vec![1, 6, 3, 7, 2]);
        assert!(dominant_frequencies(&real_signal(&[0.0; 4]), 0.5, 5).is_empty());
    }

    #[test]
    fn silent_transform_yields_zero_features() {
        let record = extract_features(&vec![ComplexSample::ZERO; 8], &FeatureConfig::default());
        assert!(record.dominant_frequencies.is_empty());
        assert_eq!(record.energy_bands, vec![0.0; 8]);
        assert_eq!(record.spectral_centroid, 0.0);
        assert_eq!(record.bandwidth, 0);
        assert_eq!(record.entropy, 0.0);
        assert_eq!(record.total_energy, 0.0);
        assert!(record.phase_coherence.is_finite());
        assert!(record.fractal_dimension.is_finite());
    }
}
