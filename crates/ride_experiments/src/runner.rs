//! Parallel scenario execution using rayon.

use bevy_ecs::prelude::World;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use ride_core::runner::{dispatch_schedule, run_until_empty};
use ride_core::scenario::build_scenario;

use crate::metrics::{extract_metrics, MarketplaceResult};
use crate::parameters::ParameterSet;

/// Step cap per run; a converged scenario finishes far below this.
const MAX_STEPS: usize = 2_000_000;

/// Run a single scenario with the given parameter set.
///
/// Creates a new world, builds the scenario, runs the dispatch loop to
/// completion, and extracts metrics from the results.
pub fn run_single_experiment(param_set: &ParameterSet) -> MarketplaceResult {
    let mut world = World::new();
    let mut params = param_set.scenario_params();

    if params.dispatch_end_time_ms.is_none() {
        // Leave room past the request window for trips to finish.
        let end_time_ms = params
            .request_window_ms
            .saturating_add(params.scheduled_horizon_ms)
            .saturating_add(2 * 60 * 60 * 1000);
        params.dispatch_end_time_ms = Some(end_time_ms);
    }

    build_scenario(&mut world, params);

    let mut schedule = dispatch_schedule();
    let _steps = run_until_empty(&mut world, &mut schedule, MAX_STEPS);

    extract_metrics(&mut world)
}

/// Run multiple scenarios in parallel.
///
/// Uses rayon to execute runs concurrently across available CPU cores.
/// Each run is independent with no shared state.
///
/// Returns results in the same order as the input parameter sets.
pub fn run_parallel_experiments(
    parameter_sets: Vec<ParameterSet>,
    num_threads: Option<usize>,
) -> Vec<MarketplaceResult> {
    run_parallel_experiments_with_progress(parameter_sets, num_threads, true)
}

/// Run multiple scenarios in parallel with an optional progress bar.
pub fn run_parallel_experiments_with_progress(
    parameter_sets: Vec<ParameterSet>,
    num_threads: Option<usize>,
    show_progress: bool,
) -> Vec<MarketplaceResult> {
    let total = parameter_sets.len();
    let pb = if show_progress && total > 0 {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .unwrap()
                .progress_chars("#>-"),
        );
        Some(bar)
    } else {
        None
    };

    let pool = if let Some(threads) = num_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .expect("Failed to create thread pool")
    } else {
        rayon::ThreadPoolBuilder::new()
            .build()
            .expect("Failed to create thread pool")
    };

    let pb_clone = pb.clone();
    let results = pool.install(|| {
        parameter_sets
            .par_iter()
            .map(|param_set| {
                let result = run_single_experiment(param_set);
                if let Some(ref progress_bar) = pb_clone {
                    progress_bar.inc(1);
                }
                result
            })
            .collect()
    });

    if let Some(ref progress_bar) = pb {
        progress_bar.finish_with_message("Completed");
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ParameterSpace;
    use ride_core::scenario::ScenarioParams;

    fn small_base() -> ScenarioParams {
        ScenarioParams {
            num_riders: 12,
            num_drivers: 4,
            ..Default::default()
        }
        .with_request_window_hours(1)
    }

    #[test]
    fn test_single_experiment() {
        let space = ParameterSpace::grid()
            .with_base(small_base())
            .commission_percent(vec![10.0]);
        let sets = space.generate();
        let result = run_single_experiment(&sets[0]);

        assert!(result.total_riders > 0);
        assert_eq!(result.total_drivers, 4);
        // No more outcomes than riders in the scenario.
        assert!(result.total_riders <= 12);
        assert!(result.conversion_rate >= 0.0 && result.conversion_rate <= 1.0);
    }

    #[test]
    fn test_parallel_experiments_preserve_order_and_count() {
        let space = ParameterSpace::grid()
            .with_base(small_base())
            .commission_percent(vec![5.0, 20.0])
            .num_drivers(vec![2, 4]);
        let sets = space.generate();
        let results = run_parallel_experiments_with_progress(sets.clone(), Some(2), false);

        assert_eq!(results.len(), 4);
        for (set, result) in sets.iter().zip(&results) {
            assert_eq!(result.total_drivers, set.params.num_drivers);
        }
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let space = ParameterSpace::grid()
            .with_base(small_base())
            .commission_percent(vec![15.0]);
        let sets = space.generate();
        let a = run_single_experiment(&sets[0]);
        let b = run_single_experiment(&sets[0]);
        assert_eq!(a.completed_rides, b.completed_rides);
        assert_eq!(a.platform_revenue, b.platform_revenue);
    }
}
