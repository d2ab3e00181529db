// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Adapter from scored session threads to equal-length real signals.
//!
//! This is the only place where domain scores enter the engine; everything
//! downstream sees a [`SignalBatch`] of named signals sharing one length.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::complex::{ComplexSample, Signal};
use crate::error::{FrftError, FrftResult};

pub const COMPLEXITY: &str = "complexity";
pub const INTERACTIONS: &str = "interactions";
pub const SEMANTIC_WEIGHT: &str = "semantic_weight";
pub const ABSTRACTION_LEVEL: &str = "abstraction_level";
pub const TECHNICAL_DENSITY: &str = "technical_density";

/// Numeric scores attached to one conversation thread.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadRecord {
    pub complexity: f64,
    pub interactions: f64,
    pub semantic_weight: f64,
    pub abstraction_level: f64,
    pub technical_density: f64,
}

impl ThreadRecord {
    /// Field values paired with the signal names they feed.
    pub fn fields(&self) -> [(&'static str, f64); 5] {
        [
            (COMPLEXITY, self.complexity),
            (INTERACTIONS, self.interactions),
            (SEMANTIC_WEIGHT, self.semantic_weight),
            (ABSTRACTION_LEVEL, self.abstraction_level),
            (TECHNICAL_DENSITY, self.technical_density),
        ]
    }
}

/// Controls the common length of extracted signals.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Fixed output length. `None` uses the next power of two of the record
    /// count.
    pub length: Option<usize>,
}

/// Named signals that all share one length.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SignalBatch {
    signals: BTreeMap<String, Signal>,
}

impl SignalBatch {
    /// Builds a batch from arbitrary named signals, checking the shared-length
    /// contract.
    pub fn from_signals<I, S>(signals: I) -> FrftResult<Self>
    where
        I: IntoIterator<Item = (S, Signal)>,
        S: Into<String>,
    {
        let signals: BTreeMap<String, Signal> = signals
            .into_iter()
            .map(|(name, signal)| (name.into(), signal))
            .collect();
        let mut iter = signals.iter();
        let (_, first) = iter.next().ok_or(FrftError::EmptyBatch)?;
        let expected = first.len();
        if expected == 0 {
            return Err(FrftError::InvalidSignal);
        }
        for (name, signal) in iter {
            if signal.len() != expected {
                return Err(FrftError::LengthMismatch {
                    name: name.clone(),
                    expected,
                    actual: signal.len(),
                });
            }
        }
        Ok(Self { signals })
    }

    /// Number of named signals.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Length shared by every signal (0 for an empty batch).
    pub fn signal_len(&self) -> usize {
        self.signals.values().next().map_or(0, Vec::len)
    }

    pub fn get(&self, name: &str) -> Option<&Signal> {
        self.signals.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.signals.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Signal)> {
        self.signals.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, Signal> {
        self.signals
    }
}

/// Produces one zero-imaginary signal per [`ThreadRecord`] field, padded with
/// zero samples or truncated from the end to the common length.
pub fn extract_signals(
    records: &[ThreadRecord],
    config: &ExtractionConfig,
) -> FrftResult<SignalBatch> {
    let length = match config.length {
        Some(0) => return Err(FrftError::InvalidSignal),
        Some(length) => length,
        None if records.is_empty() => return Err(FrftError::EmptyBatch),
        None => records.len().next_power_of_two(),
    };

    let mut signals: BTreeMap<String, Signal> = BTreeMap::new();
    for record in records {
        for (name, value) in record.fields() {
            signals
                .entry(name.to_string())
                .or_default()
                .push(ComplexSample::real(value));
        }
    }
    if signals.is_empty() {
        // Explicit length with no records: every field is silent.
        for (name, _) in ThreadRecord::default().fields() {
            signals.insert(name.to_string(), Vec::new());
        }
    }
    for signal in signals.values_mut() {
        signal.resize(length, ComplexSample::ZERO);
    }

    debug!(
        target: "hyper::frft::extraction",
        records = records.len(),
        length,
        "extracted thread signals"
    );
    SignalBatch::from_signals(signals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(base: f64) -> ThreadRecord {
        ThreadRecord {
            complexity: base,
            interactions: base * 2.0,
            semantic_weight: base + 0.5,
            abstraction_level: 1.0 - base,
            technical_density: base * base,
        }
    }

    #[test]
    fn pads_to_next_power_of_two() {
        let records: Vec<_> = (0..5).map(|i| record(i as f64 * 0.1)).collect();
        let batch = extract_signals(&records, &ExtractionConfig::default()).unwrap();
        assert_eq!(batch.len(), 5);
        assert_eq!(batch.signal_len(), 8);
        let interactions = batch.get(INTERACTIONS).unwrap();
        assert!((interactions[4].re - 0.8).abs() < 1e-12);
        assert!(interactions.iter().all(|c| c.im == 0.0));
        assert!(interactions[5..].iter().all(|c| *c == ComplexSample::ZERO));
    }

    #[test]
    fn truncates_trailing_samples() {
        let records: Vec<_> = (0..6).map(|i| record(i as f64)).collect();
        let config = ExtractionConfig { length: Some(4) };
        let batch = extract_signals(&records, &config).unwrap();
        assert_eq!(batch.signal_len(), 4);
        let complexity = batch.get(COMPLEXITY).unwrap();
        assert_eq!(complexity[3].re, 3.0);
    }

    #[test]
    fn explicit_length_without_records_yields_silent_signals() {
        let batch = extract_signals(&[], &ExtractionConfig { length: Some(4) }).unwrap();
        assert_eq!(batch.len(), 5);
        assert!(batch
            .iter()
            .all(|(_, s)| s.len() == 4 && s.iter().all(|c| *c == ComplexSample::ZERO)));
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert_eq!(
            extract_signals(&[], &ExtractionConfig::default()),
            Err(FrftError::EmptyBatch)
        );
        assert_eq!(
            extract_signals(&[record(1.0)], &ExtractionConfig { length: Some(0) }),
            Err(FrftError::InvalidSignal)
        );
    }

    #[test]
    fn batch_checks_shared_length() {
        let err = SignalBatch::from_signals([
            ("a", vec![ComplexSample::ONE; 4]),
            ("b", vec![ComplexSample::ONE; 3]),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            FrftError::LengthMismatch {
                name: "b".into(),
                expected: 4,
                actual: 3
            }
        );
        assert_eq!(
            SignalBatch::from_signals(Vec::<(String, Signal)>::new()),
            Err(FrftError::EmptyBatch)
        );
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let record: ThreadRecord = serde_json::from_str(r#"{"complexity": 0.4}"#).unwrap();
        assert_eq!(record.complexity, 0.4);
        assert_eq!(record.technical_density, 0.0);
    }
}
