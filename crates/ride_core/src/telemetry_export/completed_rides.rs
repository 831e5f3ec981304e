use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::Schema;

use crate::telemetry::MarketTelemetry;

use super::utils::{f64_field, u64_field, utf8_field, write_record_batch};

pub fn write_completed_rides_parquet<P: AsRef<Path>>(
    path: P,
    telemetry: &MarketTelemetry,
) -> Result<(), Box<dyn Error>> {
    let rides = &telemetry.completed_rides;
    let mut ride_entities = Vec::with_capacity(rides.len());
    let mut rider_entities = Vec::with_capacity(rides.len());
    let mut driver_entities = Vec::with_capacity(rides.len());
    let mut vehicles = Vec::with_capacity(rides.len());
    let mut cities = Vec::with_capacity(rides.len());
    let mut fares = Vec::with_capacity(rides.len());
    let mut commissions = Vec::with_capacity(rides.len());
    let mut driver_earnings = Vec::with_capacity(rides.len());
    let mut loyalty_points = Vec::with_capacity(rides.len());
    let mut requested_at = Vec::with_capacity(rides.len());
    let mut assigned_at = Vec::with_capacity(rides.len());
    let mut pickup_at = Vec::with_capacity(rides.len());
    let mut completed_at = Vec::with_capacity(rides.len());

    for record in rides {
        ride_entities.push(record.ride_entity.to_bits());
        rider_entities.push(record.rider_entity.to_bits());
        driver_entities.push(record.driver_entity.to_bits());
        vehicles.push(Some(record.vehicle.as_str().to_string()));
        cities.push(record.city.clone());
        fares.push(record.fare);
        commissions.push(record.commission);
        driver_earnings.push(record.driver_earnings);
        loyalty_points.push(record.loyalty_points);
        requested_at.push(record.requested_at);
        assigned_at.push(record.assigned_at);
        pickup_at.push(record.pickup_at);
        completed_at.push(record.completed_at);
    }

    let schema = Schema::new(vec![
        u64_field("ride_entity"),
        u64_field("rider_entity"),
        u64_field("driver_entity"),
        utf8_field("vehicle"),
        utf8_field("city"),
        f64_field("fare"),
        f64_field("commission"),
        f64_field("driver_earnings"),
        u64_field("loyalty_points"),
        u64_field("requested_at"),
        u64_field("assigned_at"),
        u64_field("pickup_at"),
        u64_field("completed_at"),
    ]);

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(UInt64Array::from(ride_entities)),
        Arc::new(UInt64Array::from(rider_entities)),
        Arc::new(UInt64Array::from(driver_entities)),
        Arc::new(StringArray::from(vehicles)),
        Arc::new(StringArray::from(cities)),
        Arc::new(Float64Array::from(fares)),
        Arc::new(Float64Array::from(commissions)),
        Arc::new(Float64Array::from(driver_earnings)),
        Arc::new(UInt64Array::from(loyalty_points)),
        Arc::new(UInt64Array::from(requested_at)),
        Arc::new(UInt64Array::from(assigned_at)),
        Arc::new(UInt64Array::from(pickup_at)),
        Arc::new(UInt64Array::from(completed_at)),
    ];

    write_record_batch(path, schema, arrays)
}
