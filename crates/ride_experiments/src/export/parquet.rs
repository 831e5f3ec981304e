use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use crate::metrics::MarketplaceResult;
use crate::parameters::ParameterSet;

use super::{check_lengths, writer_utils::create_output_file};

pub(crate) fn export_to_parquet_impl(
    results: &[MarketplaceResult],
    parameter_sets: &[ParameterSet],
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    check_lengths(results, parameter_sets)?;

    let len = results.len();
    let mut experiment_ids = Vec::with_capacity(len);
    let mut seeds = Vec::with_capacity(len);
    let mut commission_percents = Vec::with_capacity(len);
    let mut num_riders = Vec::with_capacity(len);
    let mut num_drivers = Vec::with_capacity(len);
    let mut completed_rides = Vec::with_capacity(len);
    let mut conversion_rates = Vec::with_capacity(len);
    let mut platform_revenues = Vec::with_capacity(len);
    let mut driver_payouts = Vec::with_capacity(len);
    let mut avg_assign = Vec::with_capacity(len);
    let mut avg_pickup = Vec::with_capacity(len);

    for (result, param_set) in results.iter().zip(parameter_sets.iter()) {
        experiment_ids.push(Some(param_set.experiment_id.clone()));
        seeds.push(param_set.seed);
        commission_percents.push(param_set.knobs.commission_percent);
        num_riders.push(param_set.params.num_riders as u64);
        num_drivers.push(param_set.params.num_drivers as u64);
        completed_rides.push(result.completed_rides as u64);
        conversion_rates.push(result.conversion_rate);
        platform_revenues.push(result.platform_revenue);
        driver_payouts.push(result.driver_payouts);
        avg_assign.push(result.avg_time_to_assign_ms);
        avg_pickup.push(result.avg_time_to_pickup_ms);
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("experiment_id", DataType::Utf8, true),
        Field::new("seed", DataType::UInt64, false),
        Field::new("commission_percent", DataType::Float64, true),
        Field::new("num_riders", DataType::UInt64, false),
        Field::new("num_drivers", DataType::UInt64, false),
        Field::new("completed_rides", DataType::UInt64, false),
        Field::new("conversion_rate", DataType::Float64, false),
        Field::new("platform_revenue", DataType::Float64, false),
        Field::new("driver_payouts", DataType::Float64, false),
        Field::new("avg_time_to_assign_ms", DataType::Float64, false),
        Field::new("avg_time_to_pickup_ms", DataType::Float64, false),
    ]));

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(experiment_ids)),
        Arc::new(UInt64Array::from(seeds)),
        Arc::new(Float64Array::from(commission_percents)),
        Arc::new(UInt64Array::from(num_riders)),
        Arc::new(UInt64Array::from(num_drivers)),
        Arc::new(UInt64Array::from(completed_rides)),
        Arc::new(Float64Array::from(conversion_rates)),
        Arc::new(Float64Array::from(platform_revenues)),
        Arc::new(Float64Array::from(driver_payouts)),
        Arc::new(Float64Array::from(avg_assign)),
        Arc::new(Float64Array::from(avg_pickup)),
    ];

    let batch = RecordBatch::try_new(schema.clone(), arrays)?;
    let file = create_output_file(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}
