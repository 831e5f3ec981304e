use serde::Serialize;

use crate::metrics::MarketplaceResult;
use crate::parameters::{ExperimentKnobs, ParameterSet};

use super::check_lengths;

#[derive(Serialize)]
struct ExperimentRow<'a> {
    experiment_id: &'a str,
    run_id: usize,
    seed: u64,
    knobs: &'a ExperimentKnobs,
    num_riders: usize,
    num_drivers: usize,
    bid_radius: u32,
    result: &'a MarketplaceResult,
}

pub(crate) fn export_to_json_impl(
    results: &[MarketplaceResult],
    parameter_sets: &[ParameterSet],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    check_lengths(results, parameter_sets)?;

    let rows: Vec<ExperimentRow> = results
        .iter()
        .zip(parameter_sets.iter())
        .map(|(result, param_set)| ExperimentRow {
            experiment_id: &param_set.experiment_id,
            run_id: param_set.run_id,
            seed: param_set.seed,
            knobs: &param_set.knobs,
            num_riders: param_set.params.num_riders,
            num_drivers: param_set.params.num_drivers,
            bid_radius: param_set.params.bid_radius,
            result,
        })
        .collect();

    serde_json::to_writer_pretty(file, &rows)?;
    Ok(())
}
