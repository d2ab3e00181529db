// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Lag-indexed complex cross-correlation between signal pairs.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::complex::{energy, ComplexSample, Signal};
use crate::features::phase_coherence;

/// Correlation of one unordered signal pair, `first < second`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairCorrelation {
    pub first: String,
    pub second: String,
    /// `values[ℓ] = Σ_n first[n]·conj(second[n+ℓ])`.
    pub values: Vec<ComplexSample>,
    /// Cauchy–Schwarz bound `‖first‖·‖second‖` over the correlated window; no
    /// lag can exceed it in magnitude.
    pub bound: f64,
}

impl PairCorrelation {
    /// Lag and magnitude of the strongest correlation, if any lag is non-zero.
    /// Ties resolve to the smallest lag.
    pub fn peak(&self) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (lag, value) in self.values.iter().enumerate() {
            let magnitude = value.norm();
            if magnitude > best.map_or(0.0, |(_, m)| m) {
                best = Some((lag, magnitude));
            }
        }
        best
    }

    /// Mean resultant length of the phases at non-zero lags; `0.0` when the
    /// correlation is silent.
    pub fn phase_coherence(&self) -> f64 {
        let phases: Vec<f64> = self
            .values
            .iter()
            .filter(|value| value.norm_sqr() > 0.0)
            .map(|value| value.arg())
            .collect();
        phase_coherence(&phases)
    }
}

/// Cross-correlation for lags `0..min(len(a), len(b))`.
///
/// Terms with `n + ℓ` past the end are omitted, so the summation window
/// shrinks as the lag grows.  Sums run in increasing `n`.
pub fn cross_correlation(a: &[ComplexSample], b: &[ComplexSample]) -> Vec<ComplexSample> {
    let n = a.len().min(b.len());
    (0..n)
        .map(|lag| {
            a[..n - lag]
                .iter()
                .zip(&b[lag..n])
                .fold(ComplexSample::ZERO, |acc, (x, y)| acc.add(x.mul(y.conj())))
        })
        .collect()
}

/// Correlates every unordered pair of distinct names, in name order.
pub fn correlate_pairs(signals: &BTreeMap<String, Signal>, parallel: bool) -> Vec<PairCorrelation> {
    let names: Vec<&String> = signals.keys().collect();
    let pairs: Vec<(&String, &String)> = names
        .iter()
        .enumerate()
        .flat_map(|(i, first)| names[i + 1..].iter().map(move |second| (*first, *second)))
        .collect();

    let correlate = |&(first, second): &(&String, &String)| {
        let a = &signals[first];
        let b = &signals[second];
        let n = a.len().min(b.len());
        PairCorrelation {
            first: first.clone(),
            second: second.clone(),
            values: cross_correlation(a, b),
            bound: (energy(&a[..n]) * energy(&b[..n])).sqrt(),
        }
    };
    if parallel {
        pairs.par_iter().map(correlate).collect()
    } else {
        pairs.iter().map(correlate).collect()
    }
}
