// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

//! Box-counting estimate of the fractal dimension of a sampled curve.
//!
//! The curve `(i / n, v[i])` is min–max scaled into the unit square and
//! covered with grids of `2^k × 2^k` boxes for `k = 1..=levels`, stopping once
//! the grid is finer than the sample count. The dimension is the
//! least-squares slope of `ln(occupied)` against `ln(2^k)`.

use std::collections::HashSet;

/// Returns `0.0` for an empty curve and `1.0` when fewer than two grid scales
/// fit the sample count.
pub fn box_counting_dimension(values: &[f64], levels: usize) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    let range = max - min;
    let scaled: Vec<f64> = values
        .iter()
        .map(|v| if range > 0.0 { (v - min) / range } else { 0.0 })
        .collect();

    let mut xs = Vec::with_capacity(levels);
    let mut ys = Vec::with_capacity(levels);
    for level in 1..=levels.min(usize::BITS as usize - 1) {
        let boxes = 1usize << level;
        if boxes > n {
            break;
        }
        let occupied = occupied_boxes(&scaled, boxes);
        xs.push((boxes as f64).ln());
        ys.push((occupied.max(1) as f64).ln());
    }
    least_squares_slope(&xs, &ys).unwrap_or(1.0)
}

fn occupied_boxes(scaled: &[f64], boxes: usize) -> usize {
    let n = scaled.len();
    let last = boxes - 1;
    let mut seen = HashSet::with_capacity(boxes);
    for (i, v) in scaled.iter().enumerate() {
        let column = (i * boxes / n).min(last);
        let row = ((v * boxes as f64) as usize).min(last);
        seen.insert((column, row));
    }
    seen.len()
}

fn least_squares_slope(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() < 2 {
        return None;
    }
    let mean_x = xs.iter().sum::<f64>() / xs.len() as f64;
    let mean_y = ys.iter().sum::<f64>() / ys.len() as f64;
    let mut num = 0.0f64;
    let mut den = 0.0f64;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        num += dx * (y - mean_y);
        den += dx * dx;
    }
    if den <= f64::EPSILON {
        return None;
    }
    Some(num / den)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_curve_is_one_dimensional() {
        let dim = box_counting_dimension(&[3.0; 64], 6);
        assert!((dim - 1.0).abs() < 1e-12, "dim={dim}");
    }

    #[test]
    fn ramp_is_close_to_one() {
        let ramp: Vec<f64> = (0..64).map(|i| i as f64).collect();
        let dim = box_counting_dimension(&ramp, 6);
        assert!((0.9..=1.2).contains(&dim), "dim={dim}");
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(box_counting_dimension(&[], 6), 0.0);
        assert_eq!(box_counting_dimension(&[1.0], 6), 1.0);
        assert_eq!(box_counting_dimension(&[1.0, 2.0, 3.0, 4.0], 0), 1.0);
    }

    #[test]
    fn affine_rescaling_does_not_change_the_estimate() {
        let curve: Vec<f64> = (0..32).map(|i| ((i * 7) % 11) as f64).collect();
        let shifted: Vec<f64> = curve.iter().map(|v| 4.0 * v - 3.0).collect();
        let a = box_counting_dimension(&curve, 5);
        let b = box_counting_dimension(&shifted, 5);
        assert!((a - b).abs() < 1e-12);
    }
}
