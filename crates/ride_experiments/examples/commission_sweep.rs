//! Sweep commission percentages and bid-score weights over a small
//! marketplace, rank the outcomes, and export the results.

use ride_core::scenario::ScenarioParams;
use ride_experiments::{
    calculate_health_scores, export_to_csv, export_to_json, find_best_parameters,
    run_parallel_experiments, HealthWeights, ParameterSpace,
};

fn main() {
    let base = ScenarioParams {
        num_riders: 150,
        num_drivers: 50,
        ..Default::default()
    }
    .with_request_window_hours(1);

    let space = ParameterSpace::grid()
        .with_base(base)
        .commission_percent(vec![5.0, 10.0, 15.0, 20.0, 25.0])
        .discount_weight(vec![0.5, 1.0, 2.0]);

    let parameter_sets = space.generate();
    println!("running {} experiments...", parameter_sets.len());
    let results = run_parallel_experiments(parameter_sets.clone(), None);

    let weights = HealthWeights::default();
    let scores = calculate_health_scores(&results, &weights);
    for ((set, result), score) in parameter_sets.iter().zip(&results).zip(&scores) {
        println!(
            "{}: commission={:?} discount_w={:?} -> completed={} revenue={:.0} health={:.3}",
            set.experiment_id,
            set.knobs.commission_percent,
            set.knobs.discount_weight,
            result.completed_rides,
            result.platform_revenue,
            score
        );
    }

    if let Some(best) = find_best_parameters(&results, &parameter_sets, &weights) {
        println!(
            "best configuration: {} (commission={:?}, discount_w={:?})",
            best.experiment_id, best.knobs.commission_percent, best.knobs.discount_weight
        );
    }

    export_to_csv(&results, &parameter_sets, "commission_sweep.csv").expect("csv export");
    export_to_json(&results, &parameter_sets, "commission_sweep.json").expect("json export");
    println!("wrote commission_sweep.csv and commission_sweep.json");
}
