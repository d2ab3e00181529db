// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Fan-out of the fractional transform over canonical orders.

use std::collections::BTreeMap;
use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::complex::Signal;
use crate::error::{FrftError, FrftResult};
use crate::extraction::SignalBatch;
use crate::fractional::frft;

/// Named transform orders used by the analysis. The labels carry no meaning
/// for the mathematics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalOrder {
    Temporal,
    Semantic,
    Emergent,
    Hyperstitious,
}

impl CanonicalOrder {
    pub const ALL: [CanonicalOrder; 4] = [
        CanonicalOrder::Temporal,
        CanonicalOrder::Semantic,
        CanonicalOrder::Emergent,
        CanonicalOrder::Hyperstitious,
    ];

    /// Transform order `α`.
    pub fn alpha(self) -> f64 {
        match self {
            CanonicalOrder::Temporal => 0.25,
            CanonicalOrder::Semantic => 0.5,
            CanonicalOrder::Emergent => 1.0,
            CanonicalOrder::Hyperstitious => 1.5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CanonicalOrder::Temporal => "temporal",
            CanonicalOrder::Semantic => "semantic",
            CanonicalOrder::Emergent => "emergent",
            CanonicalOrder::Hyperstitious => "hyperstitious",
        }
    }
}

impl fmt::Display for CanonicalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `order → signal name → transform`.
pub type OrderMap = BTreeMap<CanonicalOrder, BTreeMap<String, Signal>>;

/// Runs the fractional transform for every (order, signal) pair.
#[derive(Clone, Debug)]
pub struct MultiOrderAnalyzer {
    orders: Vec<CanonicalOrder>,
    parallel: bool,
}

impl Default for MultiOrderAnalyzer {
    fn default() -> Self {
        Self::new(CanonicalOrder::ALL.to_vec())
    }
}

impl MultiOrderAnalyzer {
    /// Creates an analyzer for the given orders; duplicates are dropped.
    pub fn new(mut orders: Vec<CanonicalOrder>) -> Self {
        orders.sort();
        orders.dedup();
        Self {
            orders,
            parallel: true,
        }
    }

    /// Enables or disables the rayon fan-out.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn orders(&self) -> &[CanonicalOrder] {
        &self.orders
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Transforms every signal at every configured order.
    ///
    /// Each job is independent; results are assembled into the ordered map
    /// after the fan-out completes.
    pub fn run(&self, batch: &SignalBatch) -> FrftResult<OrderMap> {
        if batch.is_empty() {
            return Err(FrftError::EmptyBatch);
        }
        let jobs: Vec<(CanonicalOrder, &String, &Signal)> = self
            .orders
            .iter()
            .flat_map(|&order| batch.iter().map(move |(name, signal)| (order, name, signal)))
            .collect();

        let run_job = |&(order, name, signal): &(CanonicalOrder, &String, &Signal)| {
            frft(signal, order.alpha()).map(|out| (order, name.clone(), out))
        };
        let results: Vec<(CanonicalOrder, String, Signal)> = if self.parallel {
            jobs.par_iter().map(run_job).collect::<FrftResult<_>>()?
        } else {
            jobs.iter().map(run_job).collect::<FrftResult<_>>()?
        };

        let mut map = OrderMap::new();
        for (order, name, signal) in results {
            map.entry(order).or_default().insert(name, signal);
        }
        debug!(
            target: "hyper::frft::analyzer",
            orders = self.orders.len(),
            signals = batch.len(),
            parallel = self.parallel,
            "multi-order transforms complete"
        );
        Ok(map)
    }
}

/// Transforms `batch` at each of `orders`; shorthand for
/// [`MultiOrderAnalyzer::run`].
pub fn analyze_orders(
    batch: &SignalBatch,
    orders: &[CanonicalOrder],
    parallel: bool,
) -> FrftResult<OrderMap> {
    MultiOrderAnalyzer::new(orders.to_vec())
        .with_parallel(parallel)
        .run(batch)
}
