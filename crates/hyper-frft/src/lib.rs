// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Fractional Fourier transform engine with spectral feature extraction and
//! structural pattern detection.
//!
//! Pipeline: [`extraction`] turns scored records into a [`SignalBatch`],
//! [`analyzer`] runs the [`fractional`] transform at each canonical order,
//! [`features`] and [`correlation`] summarise the transforms, [`patterns`]
//! flags structure and [`report`] bundles everything.

mod convolution;

pub mod analyzer;
pub mod complex;
pub mod config;
pub mod correlation;
pub mod error;
pub mod extraction;
pub mod features;
pub mod fft;
pub mod fractal;
pub mod fractional;
pub mod patterns;
pub mod report;

pub use analyzer::{analyze_orders, CanonicalOrder, MultiOrderAnalyzer, OrderMap};
pub use complex::{ComplexSample, Signal};
pub use config::{AnalysisConfig, ConfigError};
pub use correlation::{correlate_pairs, cross_correlation, PairCorrelation};
pub use error::{FrftError, FrftResult};
pub use extraction::{extract_signals, ExtractionConfig, SignalBatch, ThreadRecord};
pub use features::{extract_features, FeatureConfig, FeatureRecord};
pub use fft::{dft, fft, ifft};
pub use fractional::{frft, frft_opt};
pub use patterns::{PatternDetector, PatternRecord, PatternThresholds};
pub use report::{analyze, analyze_threads, AnalysisReport, ReportSummary};
