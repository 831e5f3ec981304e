//! Result export: CSV, JSON, and Parquet writers plus best-result
//! ranking helpers.

use std::error::Error;
use std::path::Path;

use crate::metrics::MarketplaceResult;
use crate::parameters::ParameterSet;

mod csv;
mod json;
mod parquet;
mod ranking;
mod writer_utils;

pub use ranking::{find_best_parameters, find_best_result_index};

/// Export results and their parameter sets to a CSV file.
pub fn export_to_csv<P: AsRef<Path>>(
    results: &[MarketplaceResult],
    parameter_sets: &[ParameterSet],
    path: P,
) -> Result<(), Box<dyn Error>> {
    let file = writer_utils::create_output_file(path)?;
    csv::export_to_csv_impl(results, parameter_sets, file)
}

/// Export results and their parameter sets to a JSON file.
pub fn export_to_json<P: AsRef<Path>>(
    results: &[MarketplaceResult],
    parameter_sets: &[ParameterSet],
    path: P,
) -> Result<(), Box<dyn Error>> {
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(results, parameter_sets, file)
}

/// Export results and their parameter sets to a Parquet file.
pub fn export_to_parquet<P: AsRef<Path>>(
    results: &[MarketplaceResult],
    parameter_sets: &[ParameterSet],
    path: P,
) -> Result<(), Box<dyn Error>> {
    parquet::export_to_parquet_impl(results, parameter_sets, path.as_ref())
}

fn check_lengths(
    results: &[MarketplaceResult],
    parameter_sets: &[ParameterSet],
) -> Result<(), Box<dyn Error>> {
    if results.len() != parameter_sets.len() {
        return Err(format!(
            "Results length ({}) doesn't match parameter_sets length ({})",
            results.len(),
            parameter_sets.len()
        )
        .into());
    }
    Ok(())
}
