//! Dispatch runner: advances the clock and routes events into the ECS.
//!
//! Clock progression and event routing happen here, outside systems. Each
//! step pops the next event from [DispatchClock], inserts it as
//! [CurrentEvent], then runs the schedule.

use bevy_ecs::prelude::Res;
use bevy_ecs::prelude::{Schedule, World};
use bevy_ecs::schedule::{apply_deferred, IntoSystemConfigs};

use crate::clock::{CurrentEvent, DispatchClock, Event, EventKind};
use crate::scenario::DispatchEndTimeMs;
use crate::systems::{
    bid_round::bid_round_system,
    bid_window_closed::bid_window_closed_system,
    request_opened::request_opened_system,
    ride_completed::ride_completed_system,
    ride_started::ride_started_system,
    rider_cancel::rider_cancel_system,
    scheduled_ride::scheduled_ride_due_system,
    spatial_index::{update_spatial_index_drivers_system, update_spatial_index_riders_system},
    telemetry_snapshot::capture_snapshot_system,
};
use crate::telemetry::{MarketSnapshots, SnapshotConfig};

// Condition functions for each event kind
fn is_scheduled_ride_due(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::ScheduledRideDue)
        .unwrap_or(false)
}

fn is_request_opened(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::RequestOpened)
        .unwrap_or(false)
}

fn is_bid_round(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::BidRound)
        .unwrap_or(false)
}

fn is_bid_window_closed(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::BidWindowClosed)
        .unwrap_or(false)
}

fn is_ride_started(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::RideStarted)
        .unwrap_or(false)
}

fn is_ride_completed(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::RideCompleted)
        .unwrap_or(false)
}

fn is_rider_cancel(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::RiderCancel)
        .unwrap_or(false)
}

/// Condition: telemetry snapshot interval has elapsed.
fn should_capture_snapshot(
    clock: Option<Res<DispatchClock>>,
    config: Option<Res<SnapshotConfig>>,
    snapshots: Option<Res<MarketSnapshots>>,
) -> bool {
    let Some(clock) = clock else {
        return false;
    };
    let Some(config) = config else {
        return false;
    };
    let Some(snapshots) = snapshots else {
        return false;
    };

    let now = clock.now();
    match snapshots.last_snapshot_at {
        None => true,
        Some(last) => now.saturating_sub(last) >= config.interval_ms,
    }
}

/// Runs one dispatch step: pops the next event, inserts it as
/// [CurrentEvent], then runs the schedule. Returns `true` if an event was
/// processed, `false` if the clock was empty or the next event is at or
/// past [DispatchEndTimeMs] (when that resource is present).
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    let stop_at = world.get_resource::<DispatchEndTimeMs>().map(|e| e.0);
    let next_ts = world
        .get_resource::<DispatchClock>()
        .and_then(|c| c.next_event_time());
    if let (Some(end_ms), Some(ts)) = (stop_at, next_ts) {
        if ts >= end_ms {
            return false;
        }
    }

    let event = match world.resource_mut::<DispatchClock>().pop_next() {
        Some(e) => e,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));

    schedule.run(world);
    true
}

/// Runs one dispatch step and invokes `hook` after the schedule completes.
pub fn run_next_event_with_hook<F>(world: &mut World, schedule: &mut Schedule, mut hook: F) -> bool
where
    F: FnMut(&World, &Event),
{
    let stop_at = world.get_resource::<DispatchEndTimeMs>().map(|e| e.0);
    let next_ts = world
        .get_resource::<DispatchClock>()
        .and_then(|c| c.next_event_time());
    if let (Some(end_ms), Some(ts)) = (stop_at, next_ts) {
        if ts >= end_ms {
            return false;
        }
    }

    let event = match world.resource_mut::<DispatchClock>().pop_next() {
        Some(e) => e,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));

    schedule.run(world);
    hook(world, &event);
    true
}

/// Runs dispatch steps until the event queue is empty or `max_steps` is
/// reached. Returns the number of steps executed.
pub fn run_until_empty(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    while steps < max_steps && run_next_event(world, schedule) {
        steps += 1;
    }
    steps
}

/// Runs dispatch steps until empty and invokes `hook` after each step.
pub fn run_until_empty_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    max_steps: usize,
    mut hook: F,
) -> usize
where
    F: FnMut(&World, &Event),
{
    let mut steps = 0;
    while steps < max_steps && run_next_event_with_hook(world, schedule, &mut hook) {
        steps += 1;
    }
    steps
}

/// Builds the default dispatch schedule: all event-reacting systems plus
/// [apply_deferred] so that spawned entities (e.g. [crate::ecs::Ride])
/// are applied before the next step.
///
/// Systems are conditionally executed based on event type to reduce
/// overhead.
pub fn dispatch_schedule() -> Schedule {
    let mut schedule = Schedule::default();

    schedule.add_systems((
        // ScheduledRideDue
        scheduled_ride_due_system.run_if(is_scheduled_ride_due),
        // RequestOpened
        request_opened_system.run_if(is_request_opened),
        // BidRound
        bid_round_system.run_if(is_bid_round),
        // BidWindowClosed
        bid_window_closed_system.run_if(is_bid_window_closed),
        // RideStarted
        ride_started_system.run_if(is_ride_started),
        // RideCompleted
        ride_completed_system.run_if(is_ride_completed),
        // RiderCancel
        rider_cancel_system.run_if(is_rider_cancel),
        // Always run apply_deferred to ensure spawned entities are available
        apply_deferred,
    ));

    // Spatial index updates run after apply_deferred so spawned entities
    // are visible. These run on every event to keep the index in sync.
    schedule.add_systems((
        update_spatial_index_riders_system,
        update_spatial_index_drivers_system,
    ));

    // Telemetry snapshot runs conditionally based on interval to avoid overhead.
    schedule.add_systems(capture_snapshot_system.run_if(should_capture_snapshot));

    schedule
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::EventSubject;

    #[test]
    fn end_time_stops_the_runner() {
        let mut world = World::new();
        let mut clock = DispatchClock::default();
        clock.schedule_at(5_000, EventKind::RequestOpened, None);
        clock.schedule_at(10_000, EventKind::RequestOpened, None);
        world.insert_resource(clock);
        world.insert_resource(DispatchEndTimeMs(10_000));
        world.insert_resource(crate::scenario::PendingRequests::default());
        world.insert_resource(crate::telemetry::MarketTelemetry::default());
        world.insert_resource(crate::zones::ZoneBook::default());
        world.insert_resource(crate::pricing::PricingConfig::default());

        let mut schedule = dispatch_schedule();
        let steps = run_until_empty(&mut world, &mut schedule, 100);
        // Only the first event runs; the second sits at the horizon.
        assert_eq!(steps, 1);
        assert!(!world.resource::<DispatchClock>().is_empty());
    }

    #[test]
    fn hook_sees_each_processed_event() {
        let mut world = World::new();
        let mut clock = DispatchClock::default();
        clock.schedule_at(1_000, EventKind::RiderCancel, Some(EventSubject::Ride(
            bevy_ecs::prelude::Entity::from_raw(9),
        )));
        clock.schedule_at(2_000, EventKind::RiderCancel, Some(EventSubject::Ride(
            bevy_ecs::prelude::Entity::from_raw(9),
        )));
        world.insert_resource(clock);
        world.insert_resource(crate::telemetry::MarketTelemetry::default());

        let mut schedule = dispatch_schedule();
        let mut seen = Vec::new();
        run_until_empty_with_hook(&mut world, &mut schedule, 100, |_, event| {
            seen.push(event.timestamp);
        });
        assert_eq!(seen, vec![1_000, 2_000]);
    }
}
