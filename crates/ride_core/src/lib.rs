pub mod bidding;
pub mod clock;
pub mod commission;
pub mod ecs;
pub mod geo;
pub mod loyalty;
pub mod pricing;
pub mod runner;
pub mod scenario;
pub mod speed;
pub mod systems;
pub mod telemetry;
pub mod telemetry_export;
pub mod zones;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
