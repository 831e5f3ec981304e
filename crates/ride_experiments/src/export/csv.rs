use crate::metrics::MarketplaceResult;
use crate::parameters::ParameterSet;

use super::check_lengths;

pub(crate) fn export_to_csv_impl(
    results: &[MarketplaceResult],
    parameter_sets: &[ParameterSet],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    check_lengths(results, parameter_sets)?;

    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "experiment_id",
        "run_id",
        "seed",
        "commission_percent",
        "discount_weight",
        "activity_weight",
        "bid_window_secs",
        "num_riders",
        "num_drivers",
        "bid_radius",
        "scheduled_ride_count",
        "total_riders",
        "total_drivers",
        "completed_rides",
        "cancelled_riders",
        "expired_requests",
        "refused_requests",
        "conversion_rate",
        "platform_revenue",
        "driver_payouts",
        "total_fares_collected",
        "loyalty_points_issued",
        "avg_time_to_assign_ms",
        "median_time_to_assign_ms",
        "p90_time_to_assign_ms",
        "avg_time_to_pickup_ms",
        "median_time_to_pickup_ms",
        "p90_time_to_pickup_ms",
    ])?;

    for (result, param_set) in results.iter().zip(parameter_sets.iter()) {
        let knobs = &param_set.knobs;
        wtr.write_record([
            &param_set.experiment_id,
            &param_set.run_id.to_string(),
            &param_set.seed.to_string(),
            &knobs
                .commission_percent
                .map(|p| p.to_string())
                .unwrap_or_default(),
            &knobs
                .discount_weight
                .map(|w| w.to_string())
                .unwrap_or_default(),
            &knobs
                .activity_weight
                .map(|w| w.to_string())
                .unwrap_or_default(),
            &knobs
                .bid_window_secs
                .map(|w| w.to_string())
                .unwrap_or_default(),
            &param_set.params.num_riders.to_string(),
            &param_set.params.num_drivers.to_string(),
            &param_set.params.bid_radius.to_string(),
            &param_set.params.scheduled_ride_count.to_string(),
            &result.total_riders.to_string(),
            &result.total_drivers.to_string(),
            &result.completed_rides.to_string(),
            &result.cancelled_riders.to_string(),
            &result.expired_requests.to_string(),
            &result.refused_requests.to_string(),
            &result.conversion_rate.to_string(),
            &result.platform_revenue.to_string(),
            &result.driver_payouts.to_string(),
            &result.total_fares_collected.to_string(),
            &result.loyalty_points_issued.to_string(),
            &result.avg_time_to_assign_ms.to_string(),
            &result.median_time_to_assign_ms.to_string(),
            &result.p90_time_to_assign_ms.to_string(),
            &result.avg_time_to_pickup_ms.to_string(),
            &result.median_time_to_pickup_ms.to_string(),
            &result.p90_time_to_pickup_ms.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
