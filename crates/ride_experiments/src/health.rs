//! Marketplace health score calculation.
//!
//! Combines multiple result metrics into a single weighted score so
//! parameter sweeps can be ranked.

use crate::metrics::MarketplaceResult;

/// Configurable weights for marketplace health score calculation.
///
/// Each weight determines the contribution of a metric to the overall
/// health score. Timing weights are applied to inverted normalizations
/// (lower is better); the expired penalty is negative.
#[derive(Debug, Clone, Copy)]
pub struct HealthWeights {
    /// Weight for conversion rate (higher is better).
    pub conversion_weight: f64,
    /// Weight for platform revenue (higher is better).
    pub revenue_weight: f64,
    /// Weight for driver payouts (higher is better).
    pub driver_payouts_weight: f64,
    /// Weight for time to assignment (inverted - lower is better).
    pub time_to_assign_weight: f64,
    /// Weight for time to pickup (inverted - lower is better).
    pub time_to_pickup_weight: f64,
    /// Penalty weight for expired requests (negative - lower is better).
    pub expired_penalty: f64,
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self {
            conversion_weight: 0.3,
            revenue_weight: 0.25,
            driver_payouts_weight: 0.15,
            time_to_assign_weight: 0.15,
            time_to_pickup_weight: 0.15,
            expired_penalty: -0.2,
        }
    }
}

/// Normalize a metric value to [0, 1] range.
///
/// Uses min-max normalization: `(value - min) / (max - min)`.
/// If min == max, returns 0.5.
fn normalize_metric(value: f64, min: f64, max: f64) -> f64 {
    if max == min {
        0.5
    } else {
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    }
}

fn min_max<F: Fn(&MarketplaceResult) -> f64>(
    results: &[MarketplaceResult],
    metric: F,
) -> (f64, f64) {
    results
        .iter()
        .map(metric)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
            (min.min(v), max.max(v))
        })
}

/// Calculate health scores for all results.
///
/// Normalizes metrics across the result set and applies the weighted
/// sum. Higher scores indicate healthier marketplace outcomes.
pub fn calculate_health_scores(results: &[MarketplaceResult], weights: &HealthWeights) -> Vec<f64> {
    if results.is_empty() {
        return vec![];
    }

    let (conversion_min, conversion_max) = min_max(results, |r| r.conversion_rate);
    let (revenue_min, revenue_max) = min_max(results, |r| r.platform_revenue);
    let (payouts_min, payouts_max) = min_max(results, |r| r.driver_payouts);
    let (assign_min, assign_max) = min_max(results, |r| r.avg_time_to_assign_ms);
    let (pickup_min, pickup_max) = min_max(results, |r| r.avg_time_to_pickup_ms);
    let (expired_min, expired_max) = min_max(results, |r| r.expired_requests as f64);

    results
        .iter()
        .map(|result| {
            let conversion_norm =
                normalize_metric(result.conversion_rate, conversion_min, conversion_max);
            let revenue_norm =
                normalize_metric(result.platform_revenue, revenue_min, revenue_max);
            let payouts_norm = normalize_metric(result.driver_payouts, payouts_min, payouts_max);

            // Timing metrics: lower is better, so invert.
            let assign_norm =
                1.0 - normalize_metric(result.avg_time_to_assign_ms, assign_min, assign_max);
            let pickup_norm =
                1.0 - normalize_metric(result.avg_time_to_pickup_ms, pickup_min, pickup_max);

            // Expired requests: lower is better, so invert.
            let expired_norm =
                1.0 - normalize_metric(result.expired_requests as f64, expired_min, expired_max);

            conversion_norm * weights.conversion_weight
                + revenue_norm * weights.revenue_weight
                + payouts_norm * weights.driver_payouts_weight
                + assign_norm * weights.time_to_assign_weight
                + pickup_norm * weights.time_to_pickup_weight
                + expired_norm * weights.expired_penalty
        })
        .collect()
}
