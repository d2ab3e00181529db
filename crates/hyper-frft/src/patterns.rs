// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Structural pattern detection over multi-order transforms.
//!
//! Every detector is a deterministic rule over the transforms and pair
//! correlations; nothing here learns or persists state between calls.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzer::{CanonicalOrder, OrderMap};
use crate::complex::{wrap_phase, ComplexSample};
use crate::correlation::PairCorrelation;
use crate::features::{magnitudes, phases};

/// Relative spread below which a magnitude profile counts as flat.  Unitary
/// transforms of an impulse land here with rounding-level ripple.
pub const FLAT_TOLERANCE: f64 = 1e-12;

/// Detector thresholds. The defaults are tunable heuristics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternThresholds {
    /// A bin is emergent above `mean + emergent_sigma · std`.
    pub emergent_sigma: f64,
    /// Minimum mean segment correlation for a recursive loop.
    pub recursion_threshold: f64,
    pub recursion_min_scale: usize,
    pub recursion_max_scale: usize,
    /// Minimum fraction of disagreeing phase steps for a temporal anomaly.
    pub temporal_disagreement: f64,
    /// Lags this far before the midpoint count as a causal inversion.
    pub causal_margin: usize,
    /// Minimum phase coherence of a pair correlation.
    pub synchronicity_threshold: f64,
}

impl Default for PatternThresholds {
    fn default() -> Self {
        Self {
            emergent_sigma: 2.0,
            recursion_threshold: 0.7,
            recursion_min_scale: 2,
            recursion_max_scale: 8,
            temporal_disagreement: 0.6,
            causal_margin: 2,
            synchronicity_threshold: 0.8,
        }
    }
}

/// One detected finding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternRecord {
    EmergentFrequency {
        signal: String,
        order: CanonicalOrder,
        bin: usize,
        magnitude: f64,
        strength: f64,
    },
    Synchronicity {
        first: String,
        second: String,
        order: CanonicalOrder,
        coherence: f64,
    },
    RecursiveLoop {
        signal: String,
        order: CanonicalOrder,
        scale: usize,
        correlation: f64,
    },
    TemporalAnomaly {
        signal: String,
        disagreement: f64,
        steps: usize,
    },
    CausalInversion {
        first: String,
        second: String,
        order: CanonicalOrder,
        lag: isize,
        strength: f64,
    },
}

impl PatternRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            PatternRecord::EmergentFrequency { .. } => "emergent_frequency",
            PatternRecord::Synchronicity { .. } => "synchronicity",
            PatternRecord::RecursiveLoop { .. } => "recursive_loop",
            PatternRecord::TemporalAnomaly { .. } => "temporal_anomaly",
            PatternRecord::CausalInversion { .. } => "causal_inversion",
        }
    }

    fn sort_key(&self) -> (u8, &str, &str, Option<CanonicalOrder>, i128) {
        match self {
            PatternRecord::EmergentFrequency {
                signal, order, bin, ..
            } => (0, signal.as_str(), "", Some(*order), *bin as i128),
            PatternRecord::Synchronicity {
                first,
                second,
                order,
                ..
            } => (1, first.as_str(), second.as_str(), Some(*order), 0),
            PatternRecord::RecursiveLoop {
                signal, order, scale, ..
            } => (2, signal.as_str(), "", Some(*order), *scale as i128),
            PatternRecord::TemporalAnomaly { signal, .. } => (3, signal.as_str(), "", None, 0),
            PatternRecord::CausalInversion {
                first,
                second,
                order,
                lag,
                ..
            } => (4, first.as_str(), second.as_str(), Some(*order), *lag as i128),
        }
    }
}

/// Applies every detector and returns the findings in a stable order.
#[derive(Clone, Debug, Default)]
pub struct PatternDetector {
    thresholds: PatternThresholds,
}

impl PatternDetector {
    pub fn new(thresholds: PatternThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &PatternThresholds {
        &self.thresholds
    }

    /// Runs the detectors over `transforms` and the per-order pair
    /// `correlations`.
    ///
    /// Emergent frequencies and recursive loops look at the highest order
    /// present; temporal anomalies compare the temporal and emergent orders
    /// when both exist.
    pub fn detect(
        &self,
        transforms: &OrderMap,
        correlations: &BTreeMap<CanonicalOrder, Vec<PairCorrelation>>,
    ) -> Vec<PatternRecord> {
        let mut records = Vec::new();

        if let Some((&order, signals)) = transforms.iter().next_back() {
            for (name, signal) in signals {
                records.extend(self.emergent_frequencies(name, order, signal));
                records.extend(self.recursive_loop(name, order, signal));
            }
        }

        if let (Some(temporal), Some(emergent)) = (
            transforms.get(&CanonicalOrder::Temporal),
            transforms.get(&CanonicalOrder::Emergent),
        ) {
            for (name, a) in temporal {
                if let Some(b) = emergent.get(name) {
                    records.extend(self.temporal_anomaly(name, a, b));
                }
            }
        }

        for (&order, pairs) in correlations {
            for pair in pairs {
                records.extend(self.synchronicity(order, pair));
                records.extend(self.causal_inversion(order, pair));
            }
        }

        records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        debug!(
            target: "hyper::frft::patterns",
            findings = records.len(),
            "pattern detection complete"
        );
        records
    }

    fn emergent_frequencies(
        &self,
        name: &str,
        order: CanonicalOrder,
        signal: &[ComplexSample],
    ) -> Vec<PatternRecord> {
        let mags = magnitudes(signal);
        let (mean, std) = mean_std(&mags);
        if std <= FLAT_TOLERANCE * mean.abs() {
            return Vec::new();
        }
        let threshold = mean + self.thresholds.emergent_sigma * std;
        mags.iter()
            .enumerate()
            .filter(|(_, magnitude)| **magnitude > threshold && threshold > 0.0)
            .map(|(bin, magnitude)| PatternRecord::EmergentFrequency {
                signal: name.to_string(),
                order,
                bin,
                magnitude: *magnitude,
                strength: (magnitude - mean) / threshold,
            })
            .collect()
    }

    fn recursive_loop(
        &self,
        name: &str,
        order: CanonicalOrder,
        signal: &[ComplexSample],
    ) -> Option<PatternRecord> {
        let mags = magnitudes(signal);
        let mut best: Option<(usize, f64)> = None;
        for scale in self.thresholds.recursion_min_scale.max(2)..=self.thresholds.recursion_max_scale {
            let Some(correlation) = self_similarity(&mags, scale) else {
                continue;
            };
            if best.map_or(true, |(_, current)| correlation > current) {
                best = Some((scale, correlation));
            }
        }
        let (scale, correlation) = best?;
        (correlation > self.thresholds.recursion_threshold).then(|| PatternRecord::RecursiveLoop {
            signal: name.to_string(),
            order,
            scale,
            correlation,
        })
    }

    fn temporal_anomaly(
        &self,
        name: &str,
        temporal: &[ComplexSample],
        emergent: &[ComplexSample],
    ) -> Option<PatternRecord> {
        let (disagreement, steps) = phase_disagreement(&phases(temporal), &phases(emergent))?;
        (disagreement > self.thresholds.temporal_disagreement).then(|| {
            PatternRecord::TemporalAnomaly {
                signal: name.to_string(),
                disagreement,
                steps,
            }
        })
    }

    fn synchronicity(&self, order: CanonicalOrder, pair: &PairCorrelation) -> Option<PatternRecord> {
        pair.peak()?;
        let coherence = pair.phase_coherence();
        (coherence >= self.thresholds.synchronicity_threshold).then(|| PatternRecord::Synchronicity {
            first: pair.first.clone(),
            second: pair.second.clone(),
            order,
            coherence,
        })
    }

    fn causal_inversion(
        &self,
        order: CanonicalOrder,
        pair: &PairCorrelation,
    ) -> Option<PatternRecord> {
        let (peak, magnitude) = pair.peak()?;
        let half = pair.values.len() / 2;
        if peak + self.thresholds.causal_margin >= half {
            return None;
        }
        let strength = if pair.bound > 0.0 {
            (magnitude / pair.bound).min(1.0)
        } else {
            0.0
        };
        Some(PatternRecord::CausalInversion {
            first: pair.first.clone(),
            second: pair.second.clone(),
            order,
            lag: peak as isize - half as isize,
            strength,
        })
    }
}

/// Population mean and standard deviation, `(0, 0)` for an empty slice.
fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Pearson correlation; `0.0` when either side is flat up to
/// [`FLAT_TOLERANCE`] relative to its own magnitude.
fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let (mean_a, _) = mean_std(&a[..n]);
    let (mean_b, _) = mean_std(&b[..n]);
    let mut num = 0.0;
    let mut den_a = 0.0;
    let mut den_b = 0.0;
    let mut power_a = 0.0;
    let mut power_b = 0.0;
    for (x, y) in a[..n].iter().zip(&b[..n]) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        num += dx * dy;
        den_a += dx * dx;
        den_b += dy * dy;
        power_a += x * x;
        power_b += y * y;
    }
    let floor = FLAT_TOLERANCE * FLAT_TOLERANCE;
    if den_a <= floor * power_a || den_b <= floor * power_b {
        return 0.0;
    }
    num / (den_a * den_b).sqrt()
}

/// Mean pairwise Pearson correlation between the `scale` equal segments of
/// `values`, trailing remainder dropped. `None` when segments would be
/// shorter than two samples.
fn self_similarity(values: &[f64], scale: usize) -> Option<f64> {
    if scale < 2 {
        return None;
    }
    let segment = values.len() / scale;
    if segment < 2 {
        return None;
    }
    let segments: Vec<&[f64]> = values.chunks_exact(segment).take(scale).collect();
    let mut total = 0.0;
    let mut pairs = 0usize;
    for i in 0..segments.len() {
        for j in i + 1..segments.len() {
            total += pearson(segments[i], segments[j]);
            pairs += 1;
        }
    }
    Some(total / pairs as f64)
}

fn step_sign(delta: f64) -> i8 {
    if delta > 0.0 {
        1
    } else if delta < 0.0 {
        -1
    } else {
        0
    }
}

/// Fraction of successive phase steps whose direction differs between the
/// two phase tracks, with the number of steps compared.
fn phase_disagreement(a: &[f64], b: &[f64]) -> Option<(f64, usize)> {
    let n = a.len().min(b.len());
    if n < 2 {
        return None;
    }
    let steps = n - 1;
    let disagreeing = (1..n)
        .filter(|&k| {
            step_sign(wrap_phase(a[k] - a[k - 1])) != step_sign(wrap_phase(b[k] - b[k - 1]))
        })
        .count();
    Some((disagreeing as f64 / steps as f64, steps))
}

/// Convenience wrapper for a single transform set without correlations.
pub fn detect_patterns(transforms: &OrderMap, thresholds: &PatternThresholds) -> Vec<PatternRecord> {
    PatternDetector::new(thresholds.clone()).detect(transforms, &BTreeMap::new())
}
