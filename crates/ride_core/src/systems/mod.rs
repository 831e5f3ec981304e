pub mod bid_round;
pub mod bid_window_closed;
pub mod request_opened;
pub mod ride_completed;
pub mod ride_started;
pub mod rider_cancel;
pub mod scheduled_ride;
pub mod spatial_index;
pub mod telemetry_snapshot;
