use crate::health::{calculate_health_scores, HealthWeights};
use crate::metrics::MarketplaceResult;
use crate::parameters::ParameterSet;

/// Index of the result with the highest health score, or `None` for an
/// empty result set.
pub fn find_best_result_index(
    results: &[MarketplaceResult],
    weights: &HealthWeights,
) -> Option<usize> {
    let scores = calculate_health_scores(results, weights);
    scores
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(idx, _)| idx)
}

/// The parameter set that produced the healthiest result.
pub fn find_best_parameters<'a>(
    results: &[MarketplaceResult],
    parameter_sets: &'a [ParameterSet],
    weights: &HealthWeights,
) -> Option<&'a ParameterSet> {
    let idx = find_best_result_index(results, weights)?;
    parameter_sets.get(idx)
}
