//! Parallel experimentation over the dispatch engine.
//!
//! This crate runs many marketplace scenarios with varying parameters
//! (commission percentages, bid-scoring weights, bid windows, fleet and
//! demand sizes), extracts comprehensive metrics, and scores each
//! outcome with a weighted marketplace health function.
//!
//! # Quick Start
//!
//! ```no_run
//! use ride_experiments::{
//!     find_best_result_index, run_parallel_experiments, HealthWeights, ParameterSpace,
//! };
//!
//! // Define parameter space (grid search)
//! let space = ParameterSpace::grid()
//!     .commission_percent(vec![5.0, 10.0, 15.0, 20.0])
//!     .num_drivers(vec![60, 120]);
//!
//! // Generate parameter sets and run them in parallel
//! let parameter_sets = space.generate();
//! let results = run_parallel_experiments(parameter_sets, None);
//!
//! // Find the healthiest configuration
//! let weights = HealthWeights::default();
//! let best_idx = find_best_result_index(&results, &weights).unwrap();
//! ```
//!
//! # Architecture
//!
//! - [`parameters`]: parameter variation framework (grid search, random sampling)
//! - [`runner`]: parallel scenario execution using rayon
//! - [`metrics`]: metrics extraction from finished worlds
//! - [`health`]: marketplace health score calculation
//! - [`export`]: result export to CSV/JSON/Parquet

pub mod export;
pub mod health;
pub mod metrics;
pub mod parameters;
pub mod runner;

pub use export::{
    export_to_csv, export_to_json, export_to_parquet, find_best_parameters, find_best_result_index,
};
pub use health::{calculate_health_scores, HealthWeights};
pub use metrics::{extract_metrics, MarketplaceResult};
pub use parameters::{ExperimentKnobs, ParameterSet, ParameterSpace};
pub use runner::{run_parallel_experiments, run_single_experiment};
