//! Geospatial operations: H3 indexing, Haversine distances, spatial lookups.
//!
//! Positions are H3 cells at resolution 9 (~240m), fine enough for
//! city-scale pickup matching. Distance and grid-disk results are cached
//! behind global LRU caches because the same cell pairs recur heavily
//! during bidding rounds.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Mutex, OnceLock};

use bevy_ecs::prelude::{Entity, Resource};
use h3o::{CellIndex, LatLng, Resolution};
use lru::LruCache;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance between two coordinates, in kilometers.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let (lat1_rad, lat2_rad) = (lat1.to_radians(), lat2.to_radians());
    let dlat = (lat2 - lat1).to_radians();
    let dlng = (lng2 - lng1).to_radians();
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlng = (dlng * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1_rad.cos() * lat2_rad.cos() * sin_dlng * sin_dlng;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Uncached cell-to-cell distance (internal use).
fn distance_km_between_cells_uncached(a: CellIndex, b: CellIndex) -> f64 {
    let a: LatLng = a.into();
    let b: LatLng = b.into();
    haversine_km(a.lat(), a.lng(), b.lat(), b.lng())
}

/// Global distance cache (50,000 entries).
fn get_distance_cache() -> &'static Mutex<LruCache<(CellIndex, CellIndex), f64>> {
    static CACHE: OnceLock<Mutex<LruCache<(CellIndex, CellIndex), f64>>> = OnceLock::new();
    CACHE.get_or_init(|| {
        Mutex::new(LruCache::new(
            NonZeroUsize::new(50_000).expect("cache size must be non-zero"),
        ))
    })
}

/// Cell-to-cell Haversine distance with LRU caching.
///
/// Uses a symmetric key (smaller cell first) to maximize cache hits.
pub fn distance_km_between_cells(a: CellIndex, b: CellIndex) -> f64 {
    let key = if a < b { (a, b) } else { (b, a) };

    let mut cache = match get_distance_cache().lock() {
        Ok(guard) => guard,
        // Fallback: compute without cache if mutex poisoned
        Err(_) => return distance_km_between_cells_uncached(key.0, key.1),
    };

    *cache.get_or_insert(key, || distance_km_between_cells_uncached(key.0, key.1))
}

#[derive(Debug, Clone, Copy)]
pub struct GeoIndex {
    resolution: Resolution,
}

impl GeoIndex {
    pub fn new(resolution: Resolution) -> Self {
        Self { resolution }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn grid_disk(&self, origin: CellIndex, k: u32) -> Vec<CellIndex> {
        debug_assert_eq!(
            origin.resolution(),
            self.resolution,
            "origin resolution must match GeoIndex resolution"
        );
        origin.grid_disk::<Vec<_>>(k)
    }
}

impl Default for GeoIndex {
    fn default() -> Self {
        Self {
            resolution: Resolution::Nine,
        }
    }
}

/// Grid disk cache for bid-radius candidate queries.
struct GridDiskCache {
    cache: Mutex<LruCache<(CellIndex, u32), Vec<CellIndex>>>,
}

impl GridDiskCache {
    fn new() -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(1_000).expect("cache size must be non-zero"),
            )),
        }
    }

    fn get_or_compute(&self, origin: CellIndex, k: u32, geo: &GeoIndex) -> Vec<CellIndex> {
        let mut cache = match self.cache.lock() {
            Ok(guard) => guard,
            // Fallback: compute without cache if mutex poisoned
            Err(_) => return geo.grid_disk(origin, k),
        };
        cache
            .get_or_insert((origin, k), || geo.grid_disk(origin, k))
            .clone()
    }
}

static GRID_DISK_CACHE: OnceLock<GridDiskCache> = OnceLock::new();

/// Get grid disk with caching.
pub fn grid_disk_cached(origin: CellIndex, k: u32) -> Vec<CellIndex> {
    let geo = GeoIndex::default();
    GRID_DISK_CACHE
        .get_or_init(GridDiskCache::new)
        .get_or_compute(origin, k, &geo)
}

/// True when the cell centroid lies within the bounding box.
pub fn cell_in_bounds(
    cell: CellIndex,
    lat_min: f64,
    lat_max: f64,
    lng_min: f64,
    lng_max: f64,
) -> bool {
    let coord: LatLng = cell.into();
    coord.lat() >= lat_min && coord.lat() <= lat_max && coord.lng() >= lng_min && coord.lng() <= lng_max
}

/// Sample a random resolution-9 cell within the bounding box.
pub fn random_cell_in_bounds<R: rand::Rng>(
    rng: &mut R,
    lat_min: f64,
    lat_max: f64,
    lng_min: f64,
    lng_max: f64,
) -> Result<CellIndex, String> {
    if lat_min < -90.0 || lat_max > 90.0 || lat_min > lat_max {
        return Err(format!(
            "Invalid latitude bounds: [{lat_min}, {lat_max}] (must be in [-90, 90] and min <= max)"
        ));
    }
    if lng_min < -180.0 || lng_max > 180.0 || lng_min > lng_max {
        return Err(format!(
            "Invalid longitude bounds: [{lng_min}, {lng_max}] (must be in [-180, 180] and min <= max)"
        ));
    }
    let lat = rng.gen_range(lat_min..=lat_max);
    let lng = rng.gen_range(lng_min..=lng_max);
    LatLng::new(lat, lng)
        .map(|coord| coord.to_cell(Resolution::Nine))
        .map_err(|error| format!("Invalid coordinates ({lat}, {lng}): {error}"))
}

/// Pick a destination cell between `min_cells` and `max_cells` grid
/// distance from `pickup`, staying inside the bounding box. Falls back to
/// the pickup cell when the disk holds no candidate (degenerate bounds).
#[allow(clippy::too_many_arguments)]
pub fn random_destination<R: rand::Rng>(
    rng: &mut R,
    pickup: CellIndex,
    geo: &GeoIndex,
    min_cells: u32,
    max_cells: u32,
    lat_min: f64,
    lat_max: f64,
    lng_min: f64,
    lng_max: f64,
) -> CellIndex {
    let max_cells = max_cells.max(min_cells);
    let disk = geo.grid_disk(pickup, max_cells);
    let candidates: Vec<CellIndex> = disk
        .into_iter()
        .filter(|c| {
            pickup
                .grid_distance(*c)
                .map(|d| d >= min_cells as i32 && d <= max_cells as i32)
                .unwrap_or(false)
                && cell_in_bounds(*c, lat_min, lat_max, lng_min, lng_max)
        })
        .collect();

    if candidates.is_empty() {
        pickup
    } else {
        candidates[rng.gen_range(0..candidates.len())]
    }
}

/// Spatial index for entity lookups by H3 cell.
///
/// Maintains cell → entity mappings for riders and drivers so bid rounds
/// can query candidates without scanning the whole world. Updated
/// incrementally as entities appear, move, or change state.
#[derive(Debug, Resource, Default)]
pub struct SpatialIndex {
    riders_by_cell: HashMap<CellIndex, Vec<Entity>>,
    drivers_by_cell: HashMap<CellIndex, Vec<Entity>>,
    rider_entity_to_cell: HashMap<Entity, CellIndex>,
    driver_entity_to_cell: HashMap<Entity, CellIndex>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_rider(&mut self, entity: Entity, cell: CellIndex) {
        self.riders_by_cell.entry(cell).or_default().push(entity);
        self.rider_entity_to_cell.insert(entity, cell);
    }

    pub fn insert_driver(&mut self, entity: Entity, cell: CellIndex) {
        self.drivers_by_cell.entry(cell).or_default().push(entity);
        self.driver_entity_to_cell.insert(entity, cell);
    }

    pub fn remove_rider(&mut self, entity: Entity) {
        if let Some(cell) = self.rider_entity_to_cell.remove(&entity) {
            if let Some(entities) = self.riders_by_cell.get_mut(&cell) {
                entities.retain(|&e| e != entity);
                if entities.is_empty() {
                    self.riders_by_cell.remove(&cell);
                }
            }
        }
    }

    pub fn remove_driver(&mut self, entity: Entity) {
        if let Some(cell) = self.driver_entity_to_cell.remove(&entity) {
            if let Some(entities) = self.drivers_by_cell.get_mut(&cell) {
                entities.retain(|&e| e != entity);
                if entities.is_empty() {
                    self.drivers_by_cell.remove(&cell);
                }
            }
        }
    }

    pub fn update_rider_position(&mut self, entity: Entity, old_cell: CellIndex, new_cell: CellIndex) {
        if old_cell == new_cell {
            return;
        }
        if let Some(entities) = self.riders_by_cell.get_mut(&old_cell) {
            entities.retain(|&e| e != entity);
            if entities.is_empty() {
                self.riders_by_cell.remove(&old_cell);
            }
        }
        self.riders_by_cell.entry(new_cell).or_default().push(entity);
        self.rider_entity_to_cell.insert(entity, new_cell);
    }

    pub fn update_driver_position(&mut self, entity: Entity, old_cell: CellIndex, new_cell: CellIndex) {
        if old_cell == new_cell {
            return;
        }
        if let Some(entities) = self.drivers_by_cell.get_mut(&old_cell) {
            entities.retain(|&e| e != entity);
            if entities.is_empty() {
                self.drivers_by_cell.remove(&old_cell);
            }
        }
        self.drivers_by_cell.entry(new_cell).or_default().push(entity);
        self.driver_entity_to_cell.insert(entity, new_cell);
    }

    pub fn get_riders_in_cells(&self, cells: &[CellIndex]) -> Vec<Entity> {
        let mut result = Vec::new();
        for cell in cells {
            if let Some(entities) = self.riders_by_cell.get(cell) {
                result.extend(entities.iter().copied());
            }
        }
        result
    }

    pub fn get_drivers_in_cells(&self, cells: &[CellIndex]) -> Vec<Entity> {
        let mut result = Vec::new();
        for cell in cells {
            if let Some(entities) = self.drivers_by_cell.get(cell) {
                result.extend(entities.iter().copied());
            }
        }
        result
    }

    pub fn get_rider_cell(&self, entity: Entity) -> Option<CellIndex> {
        self.rider_entity_to_cell.get(&entity).copied()
    }

    pub fn get_driver_cell(&self, entity: Entity) -> Option<CellIndex> {
        self.driver_entity_to_cell.get(&entity).copied()
    }

    pub fn clear(&mut self) {
        self.riders_by_cell.clear();
        self.drivers_by_cell.clear();
        self.rider_entity_to_cell.clear();
        self.driver_entity_to_cell.clear();
    }
}
