// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! End-to-end analysis: transforms, features, correlations, patterns and a
//! numeric summary, bundled into one serializable report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use crate::analyzer::{analyze_orders, CanonicalOrder, OrderMap};
use crate::config::AnalysisConfig;
use crate::correlation::{correlate_pairs, PairCorrelation};
use crate::error::FrftResult;
use crate::extraction::{extract_signals, SignalBatch, ThreadRecord};
use crate::features::{extract_features, FeatureRecord};
use crate::fractional::operator_gain;
use crate::patterns::{PatternDetector, PatternRecord};

pub const LOW_COMPLEXITY_HINT: &str =
    "spectral complexity is low: few bins dominate, longer or richer input series would expose more structure";
pub const HIGH_COHERENCE_HINT: &str =
    "pair correlations are strongly phase-locked: the signals move in synchrony";
pub const CAUSAL_INVERSION_HINT: &str =
    "correlation peaks precede the midpoint lag: check the ordering of the source series";
pub const RECURSION_HINT: &str =
    "magnitude spectra repeat across scales: look for cyclic behaviour in the source series";

/// Relative gap under which two normalized order energies count as equal.
pub const ENERGY_TIE_TOLERANCE: f64 = 1e-9;

/// Condensed view of one pair correlation at one order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairCorrelationSummary {
    pub order: CanonicalOrder,
    pub first: String,
    pub second: String,
    pub peak_lag: Option<usize>,
    pub peak_magnitude: f64,
    pub bound: f64,
    pub phase_coherence: f64,
}

impl PairCorrelationSummary {
    fn new(order: CanonicalOrder, pair: &PairCorrelation) -> Self {
        let peak = pair.peak();
        Self {
            order,
            first: pair.first.clone(),
            second: pair.second.clone(),
            peak_lag: peak.map(|(lag, _)| lag),
            peak_magnitude: peak.map_or(0.0, |(_, magnitude)| magnitude),
            bound: pair.bound,
            phase_coherence: pair.phase_coherence(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Order carrying the most transform energy once each order is divided
    /// by its operator gain.  Equal energies are separated by how much of it
    /// the dominant bins hold; remaining ties go to the lower order.
    pub dominant_order: Option<CanonicalOrder>,
    /// Raw transform energy per order, summed over signals.
    pub order_energy: BTreeMap<CanonicalOrder, f64>,
    /// Dominant bins found over the bins that could have been reported.
    pub aggregate_complexity: f64,
    /// Mean phase coherence over every pair correlation.
    pub aggregate_coherence: f64,
    pub recommendations: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub signal_length: usize,
    pub transforms: OrderMap,
    pub features: BTreeMap<CanonicalOrder, BTreeMap<String, FeatureRecord>>,
    pub correlations: Vec<PairCorrelationSummary>,
    pub patterns: Vec<PatternRecord>,
    pub summary: ReportSummary,
}

impl AnalysisReport {
    /// Findings of one kind, in report order.
    pub fn patterns_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a PatternRecord> + 'a {
        self.patterns.iter().filter(move |record| record.kind() == kind)
    }
}

/// Runs the whole pipeline over an already extracted batch.
pub fn analyze(batch: &SignalBatch, config: &AnalysisConfig) -> FrftResult<AnalysisReport> {
    config.validate()?;
    let _span = info_span!(
        target: "hyper::frft::report",
        "analyze",
        signals = batch.len(),
        length = batch.signal_len()
    )
    .entered();

    if batch
        .iter()
        .all(|(_, signal)| signal.iter().all(|c| c.norm_sqr() == 0.0))
    {
        warn!(
            target: "hyper::frft::report",
            signals = batch.len(),
            "every signal in the batch is silent; features will be zero"
        );
    }

    let parallel = config.effective_parallel();
    let transforms = analyze_orders(batch, &config.orders, parallel)?;

    let features: BTreeMap<CanonicalOrder, BTreeMap<String, FeatureRecord>> = transforms
        .iter()
        .map(|(&order, signals)| {
            let records = signals
                .iter()
                .map(|(name, signal)| (name.clone(), extract_features(signal, &config.features)))
                .collect();
            (order, records)
        })
        .collect();

    let correlations: BTreeMap<CanonicalOrder, Vec<PairCorrelation>> = transforms
        .iter()
        .map(|(&order, signals)| (order, correlate_pairs(signals, parallel)))
        .collect();

    let patterns =
        PatternDetector::new(config.patterns.clone()).detect(&transforms, &correlations);
    let summaries: Vec<PairCorrelationSummary> = correlations
        .iter()
        .flat_map(|(&order, pairs)| pairs.iter().map(move |pair| PairCorrelationSummary::new(order, pair)))
        .collect();
    let summary = summarize(&features, &summaries, &patterns, batch.signal_len(), config);

    info!(
        target: "hyper::frft::report",
        dominant_order = ?summary.dominant_order,
        complexity = summary.aggregate_complexity,
        coherence = summary.aggregate_coherence,
        patterns = patterns.len(),
        "analysis complete"
    );

    Ok(AnalysisReport {
        signal_length: batch.signal_len(),
        transforms,
        features,
        correlations: summaries,
        patterns,
        summary,
    })
}

/// Extracts signals from thread records and runs [`analyze`].
pub fn analyze_threads(
    records: &[ThreadRecord],
    config: &AnalysisConfig,
) -> FrftResult<AnalysisReport> {
    let batch = extract_signals(records, &config.extraction)?;
    analyze(&batch, config)
}

/// `(energy, dominant-bin energy)` of one order, divided by the order's gain.
fn normalized_energy(
    order: CanonicalOrder,
    records: &BTreeMap<String, FeatureRecord>,
    signal_length: usize,
) -> (f64, f64) {
    let gain = operator_gain(order.alpha(), signal_length).unwrap_or(1.0);
    let total: f64 = records.values().map(|r| r.total_energy).sum();
    let peaks: f64 = records
        .values()
        .flat_map(|r| &r.dominant_frequencies)
        .map(|d| d.magnitude * d.magnitude)
        .sum();
    (total / gain, peaks / gain)
}

fn dominant_order(
    features: &BTreeMap<CanonicalOrder, BTreeMap<String, FeatureRecord>>,
    signal_length: usize,
) -> Option<CanonicalOrder> {
    let energies: Vec<(CanonicalOrder, f64, f64)> = features
        .iter()
        .map(|(&order, records)| {
            let (total, peaks) = normalized_energy(order, records, signal_length);
            (order, total, peaks)
        })
        .collect();
    let max_total = energies.iter().map(|&(_, total, _)| total).fold(0.0, f64::max);
    let floor = max_total * (1.0 - ENERGY_TIE_TOLERANCE);
    let mut best: Option<(CanonicalOrder, f64)> = None;
    for (order, total, peaks) in energies {
        if total < floor {
            continue;
        }
        if best.map_or(true, |(_, current)| peaks > current * (1.0 + ENERGY_TIE_TOLERANCE)) {
            best = Some((order, peaks));
        }
    }
    best.map(|(order, _)| order)
}

fn summarize(
    features: &BTreeMap<CanonicalOrder, BTreeMap<String, FeatureRecord>>,
    correlations: &[PairCorrelationSummary],
    patterns: &[PatternRecord],
    signal_length: usize,
    config: &AnalysisConfig,
) -> ReportSummary {
    let order_energy: BTreeMap<CanonicalOrder, f64> = features
        .iter()
        .map(|(&order, records)| (order, records.values().map(|r| r.total_energy).sum()))
        .collect();

    let records: usize = features.values().map(BTreeMap::len).sum();
    let dominant_bins: usize = features
        .values()
        .flat_map(BTreeMap::values)
        .map(|record| record.dominant_frequencies.len())
        .sum();
    let capacity = records * config.features.max_dominant;
    let aggregate_complexity = if capacity > 0 {
        dominant_bins as f64 / capacity as f64
    } else {
        0.0
    };

    let aggregate_coherence = if correlations.is_empty() {
        0.0
    } else {
        correlations.iter().map(|c| c.phase_coherence).sum::<f64>() / correlations.len() as f64
    };

    let mut recommendations = Vec::new();
    if aggregate_complexity < config.recommendations.low_complexity {
        recommendations.push(LOW_COMPLEXITY_HINT.to_string());
    }
    if aggregate_coherence > config.recommendations.high_coherence {
        recommendations.push(HIGH_COHERENCE_HINT.to_string());
    }
    if patterns.iter().any(|p| matches!(p, PatternRecord::CausalInversion { .. })) {
        recommendations.push(CAUSAL_INVERSION_HINT.to_string());
    }
    if patterns.iter().any(|p| matches!(p, PatternRecord::RecursiveLoop { .. })) {
        recommendations.push(RECURSION_HINT.to_string());
    }

    ReportSummary {
        dominant_order: dominant_order(features, signal_length),
        order_energy,
        aggregate_complexity,
        aggregate_coherence,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::{real_signal, ComplexSample};

    fn config(parallel: bool) -> AnalysisConfig {
        AnalysisConfig {
            parallel,
            ..AnalysisConfig::default()
        }
    }

    fn batch() -> SignalBatch {
        let wave: Vec<f64> = (0..16)
            .map(|i| (2.0 * core::f64::consts::PI * i as f64 / 4.0).sin())
            .collect();
        let ramp: Vec<f64> = (0..16).map(|i| i as f64 / 16.0).collect();
        SignalBatch::from_signals([("ramp", real_signal(&ramp)), ("wave", real_signal(&wave))])
            .unwrap()
    }

    #[test]
    fn report_covers_every_order_and_pair() {
        let report = analyze(&batch(), &config(false)).unwrap();
        assert_eq!(report.signal_length, 16);
        assert_eq!(report.transforms.len(), 4);
        assert_eq!(report.features.len(), 4);
        // One pair per order.
        assert_eq!(report.correlations.len(), 4);
        for records in report.features.values() {
            for record in records.values() {
                assert_eq!(record.energy_bands.len(), 8);
                assert!((0.0..=1.0).contains(&record.phase_coherence));
            }
        }
        assert!((0.0..=1.0).contains(&report.summary.aggregate_complexity));
        assert!((0.0..=1.0 + 1e-12).contains(&report.summary.aggregate_coherence));
    }

    #[test]
    fn parallel_report_is_identical() {
        let batch = batch();
        assert_eq!(
            analyze(&batch, &config(true)).unwrap(),
            analyze(&batch, &config(false)).unwrap()
        );
    }

    #[test]
    fn silent_batch_reports_zeros() {
        let batch = SignalBatch::from_signals([
            ("a", vec![ComplexSample::ZERO; 8]),
            ("b", vec![ComplexSample::ZERO; 8]),
        ])
        .unwrap();
        let report = analyze(&batch, &config(false)).unwrap();
        assert!(report.summary.order_energy.values().all(|e| *e == 0.0));
        assert_eq!(report.summary.dominant_order, Some(CanonicalOrder::Temporal));
        assert_eq!(report.summary.aggregate_complexity, 0.0);
        assert_eq!(report.summary.aggregate_coherence, 0.0);
        assert_eq!(report.summary.recommendations, vec![LOW_COMPLEXITY_HINT.to_string()]);
        assert!(report.patterns.is_empty());
    }

    #[test]
    fn pure_tone_is_dominant_in_the_fourier_domain() {
        let tone: Vec<ComplexSample> = (0..16)
            .map(|n| ComplexSample::cis(2.0 * core::f64::consts::PI * 2.0 * n as f64 / 16.0))
            .collect();
        let batch = SignalBatch::from_signals([("tone", tone)]).unwrap();
        let report = analyze(&batch, &config(false)).unwrap();
        assert_eq!(report.summary.dominant_order, Some(CanonicalOrder::Emergent));
        // Order one is the unnormalized transform: raw energy is N times the input.
        let raw = &report.summary.order_energy;
        assert!((raw[&CanonicalOrder::Emergent] - 256.0).abs() < 1e-9);
        assert!((raw[&CanonicalOrder::Semantic] - 16.0).abs() < 1e-9);
    }

    #[test]
    fn scaled_orders_are_compared_after_normalization() {
        let spread = |scale: f64| FeatureRecord {
            dominant_frequencies: vec![crate::features::DominantFrequency {
                bin: 0,
                magnitude: scale,
                phase: 0.0,
            }],
            energy_bands: vec![],
            spectral_centroid: 0.0,
            bandwidth: 0,
            entropy: 0.0,
            phase_coherence: 0.0,
            fractal_dimension: 1.0,
            total_energy: 4.0 * scale * scale,
        };
        // Same shape, but the order-one record carries the factor N = 4.
        let features = BTreeMap::from([
            (CanonicalOrder::Hyperstitious, BTreeMap::from([("x".to_string(), spread(1.5))])),
            (CanonicalOrder::Emergent, BTreeMap::from([("x".to_string(), spread(2.0))])),
        ]);
        assert_eq!(dominant_order(&features, 4), Some(CanonicalOrder::Hyperstitious));
    }

    #[test]
    fn invalid_config_is_rejected_before_work() {
        let mut config = config(false);
        config.orders.clear();
        assert!(analyze(&batch(), &config).is_err());
    }

    #[test]
    fn summary_rules() {
        let mut features = BTreeMap::new();
        let record = |energy: f64, bins: usize| FeatureRecord {
            dominant_frequencies: (0..bins)
                .map(|bin| crate::features::DominantFrequency {
                    bin,
                    magnitude: 1.0,
                    phase: 0.0,
                })
                .collect(),
            energy_bands: vec![],
            spectral_centroid: 0.0,
            bandwidth: 0,
            entropy: 0.0,
            phase_coherence: 0.0,
            fractal_dimension: 1.0,
            total_energy: energy,
        };
        features.insert(
            CanonicalOrder::Semantic,
            BTreeMap::from([("x".to_string(), record(2.0, 5))]),
        );
        features.insert(
            CanonicalOrder::Emergent,
            BTreeMap::from([("x".to_string(), record(2.0, 5))]),
        );
        let correlations = vec![PairCorrelationSummary {
            order: CanonicalOrder::Semantic,
            first: "x".to_string(),
            second: "y".to_string(),
            peak_lag: Some(0),
            peak_magnitude: 1.0,
            bound: 1.0,
            phase_coherence: 0.9,
        }];
        let patterns = vec![PatternRecord::RecursiveLoop {
            signal: "x".to_string(),
            order: CanonicalOrder::Emergent,
            scale: 2,
            correlation: 0.9,
        }];
        let summary = summarize(&features, &correlations, &patterns, 16, &config(false));
        assert_eq!(summary.dominant_order, Some(CanonicalOrder::Semantic));
        assert_eq!(summary.order_energy[&CanonicalOrder::Emergent], 2.0);
        assert_eq!(summary.aggregate_complexity, 1.0);
        assert_eq!(summary.aggregate_coherence, 0.9);
        assert_eq!(
            summary.recommendations,
            vec![HIGH_COHERENCE_HINT.to_string(), RECURSION_HINT.to_string()]
        );
    }
}
