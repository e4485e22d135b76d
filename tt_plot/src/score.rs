//! Reduction of per-measurement goodness-of-fit values to one scalar per
//! path, plus the ordering and normalization helpers the chart uses.
//!
//! HeFTy reports one goodness-of-fit value per measurement per path. The
//! chart needs a single number, so the values are combined either by
//! Fisher's method, treating each value as a p-value, or by a weighted
//! average that leans on the poorly fitting measurements.

use statrs::distribution::{ChiSquared, ContinuousCDF};

/// How per-measurement goodness-of-fit values collapse to one scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineMethod {
    /// Fisher's combined probability: `X^2 = -2 * sum(ln p_i)` referred to a
    /// chi-squared distribution with `2k` degrees of freedom.
    Fisher,
    /// Average weighted by `1 - g_i`, so a bad fit on any one measurement
    /// drags the combined score down.
    WeightedMean,
}

/// Combines the goodness-of-fit values of one path.
///
/// Non-finite entries are ignored. Returns NaN when nothing is left to
/// combine; such paths are excluded from [`draw_order`] and never drawn.
pub fn combine_gofs(method: CombineMethod, gofs: &[f64]) -> f64 {
    match method {
        CombineMethod::Fisher => fisher_combined(gofs),
        CombineMethod::WeightedMean => weighted_mean(gofs),
    }
}

/// Indices of the finite scores, sorted ascending.
///
/// Drawing in this order puts the best-scoring paths on top. The sort is
/// stable, so equal scores keep their file order.
pub fn draw_order(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len())
        .filter(|&i| scores[i].is_finite())
        .collect();
    order.sort_by(|&a, &b| scores[a].partial_cmp(&scores[b]).unwrap());
    order
}

/// Index of the highest finite score, first one on ties.
pub fn best_index(scores: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, s) in scores.iter().enumerate() {
        if !s.is_finite() {
            continue;
        }
        match best {
            Some(b) if scores[b] >= *s => {}
            _ => best = Some(idx),
        }
    }
    best
}

/// Maps a score onto `[0, 1]` for colormap lookup.
///
/// Scores at or below `min` land on 0, at or above `max` on 1. Requires
/// `min < max`; degenerate or non-finite input maps to 0.
pub fn normalize_gof(score: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if !score.is_finite() || !(span > 0.0) {
        return 0.0;
    }
    ((score - min) / span).clamp(0.0, 1.0)
}

fn fisher_combined(gofs: &[f64]) -> f64 {
    let finite: Vec<f64> = gofs.iter().copied().filter(|g| g.is_finite()).collect();
    if finite.is_empty() {
        return f64::NAN;
    }
    // ln(0) would send the statistic to infinity; short-circuit instead
    if finite.iter().any(|&p| p <= 0.0) {
        return 0.0;
    }
    let stat = -2.0 * finite.iter().map(|p| p.ln()).sum::<f64>();
    let dof = 2.0 * finite.len() as f64;
    match ChiSquared::new(dof) {
        Ok(chi) => chi.sf(stat),
        Err(_) => f64::NAN,
    }
}

fn weighted_mean(gofs: &[f64]) -> f64 {
    let finite: Vec<f64> = gofs.iter().copied().filter(|g| g.is_finite()).collect();
    if finite.is_empty() {
        return f64::NAN;
    }
    let mut weights: Vec<f64> = finite.iter().map(|g| 1.0 - g).collect();
    // every measurement at 1.0 zeroes the weights; fall back to a plain mean
    if weights.iter().sum::<f64>() <= f64::EPSILON {
        weights = vec![1.0; finite.len()];
    }
    let total: f64 = weights.iter().sum();
    finite
        .iter()
        .zip(weights.iter())
        .map(|(g, w)| g * w)
        .sum::<f64>()
        / total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn fisher_of_one_value_is_that_value() {
        // with 2 dof the survival function is exp(-x/2) = p
        assert!(close(combine_gofs(CombineMethod::Fisher, &[0.9]), 0.9));
        assert!(close(combine_gofs(CombineMethod::Fisher, &[0.05]), 0.05));
    }

    #[test]
    fn fisher_combines_two_values() {
        // X^2 = -2(ln 0.5 + ln 0.5), 4 dof => exp(-x/2)(1 + x/2)
        let combined = combine_gofs(CombineMethod::Fisher, &[0.5, 0.5]);
        assert!(close(combined, 0.5966));
    }

    #[test]
    fn fisher_zero_is_absorbing() {
        assert_eq!(combine_gofs(CombineMethod::Fisher, &[0.8, 0.0]), 0.0);
    }

    #[test]
    fn fisher_ignores_nan_entries() {
        let combined = combine_gofs(CombineMethod::Fisher, &[0.5, f64::NAN, 0.5]);
        assert!(close(combined, 0.5966));
    }

    #[test]
    fn combine_of_nothing_is_nan() {
        assert!(combine_gofs(CombineMethod::Fisher, &[]).is_nan());
        assert!(combine_gofs(CombineMethod::Fisher, &[f64::NAN]).is_nan());
        assert!(combine_gofs(CombineMethod::WeightedMean, &[]).is_nan());
    }

    #[test]
    fn weighted_mean_leans_on_poor_fits() {
        // weights 0.2 and 0.6, mean = (0.8*0.2 + 0.4*0.6) / 0.8
        let combined = combine_gofs(CombineMethod::WeightedMean, &[0.8, 0.4]);
        assert!(close(combined, 0.5));
    }

    #[test]
    fn weighted_mean_of_perfect_fits_is_one() {
        let combined = combine_gofs(CombineMethod::WeightedMean, &[1.0, 1.0]);
        assert!(close(combined, 1.0));
    }

    #[test]
    fn weighted_mean_of_single_value_is_identity() {
        assert!(close(combine_gofs(CombineMethod::WeightedMean, &[0.3]), 0.3));
    }

    #[test]
    fn draw_order_sorts_ascending_and_skips_nan() {
        let order = draw_order(&[0.3, f64::NAN, 0.1, 0.5]);
        assert_eq!(order, vec![2, 0, 3]);
    }

    #[test]
    fn draw_order_is_stable_on_ties() {
        let order = draw_order(&[0.2, 0.1, 0.2]);
        assert_eq!(order, vec![1, 0, 2]);
    }

    #[test]
    fn best_index_takes_first_on_ties() {
        assert_eq!(best_index(&[0.1, 0.7, 0.7, 0.2]), Some(1));
        assert_eq!(best_index(&[f64::NAN, 0.4]), Some(1));
        assert_eq!(best_index(&[]), None);
        assert_eq!(best_index(&[f64::NAN]), None);
    }

    #[test]
    fn normalize_clamps_to_unit_interval() {
        assert_eq!(normalize_gof(0.05, 0.05, 0.5), 0.0);
        assert_eq!(normalize_gof(0.5, 0.05, 0.5), 1.0);
        assert_eq!(normalize_gof(0.9, 0.05, 0.5), 1.0);
        assert_eq!(normalize_gof(0.01, 0.05, 0.5), 0.0);
        assert!(close(normalize_gof(0.275, 0.05, 0.5), 0.5));
    }

    #[test]
    fn normalize_degenerate_range_maps_to_zero() {
        assert_eq!(normalize_gof(0.3, 0.5, 0.5), 0.0);
        assert_eq!(normalize_gof(f64::NAN, 0.05, 0.5), 0.0);
    }
}
