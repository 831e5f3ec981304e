//! Service zones: named polygon regions controlling where the platform
//! operates and how pickups are priced.
//!
//! Three kinds of zone exist. `City` zones define the operational area
//! and carry the city name used by commission resolution. `Restricted`
//! zones refuse pickups outright. `HighDemand` zones apply a fare
//! multiplier at request time. Containment uses standard ray casting
//! against the polygon's lat/lng vertices.

use bevy_ecs::prelude::Resource;
use h3o::{CellIndex, LatLng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneKind {
    /// Operational area; the name doubles as the commission city key.
    City,
    /// Pickups inside are refused.
    Restricted,
    /// Carries a fare multiplier >= 1.0.
    HighDemand,
}

/// A named polygon region. Vertices are (lat, lng) pairs in order; the
/// polygon closes implicitly from the last vertex back to the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceZone {
    pub name: String,
    pub kind: ZoneKind,
    pub polygon: Vec<(f64, f64)>,
    pub fare_multiplier: f64,
    pub active: bool,
}

impl ServiceZone {
    pub fn city(name: impl Into<String>, polygon: Vec<(f64, f64)>) -> Self {
        Self {
            name: name.into(),
            kind: ZoneKind::City,
            polygon,
            fare_multiplier: 1.0,
            active: true,
        }
    }

    pub fn restricted(name: impl Into<String>, polygon: Vec<(f64, f64)>) -> Self {
        Self {
            name: name.into(),
            kind: ZoneKind::Restricted,
            polygon,
            fare_multiplier: 1.0,
            active: true,
        }
    }

    pub fn high_demand(
        name: impl Into<String>,
        polygon: Vec<(f64, f64)>,
        fare_multiplier: f64,
    ) -> Self {
        Self {
            name: name.into(),
            kind: ZoneKind::HighDemand,
            polygon,
            fare_multiplier: fare_multiplier.max(1.0),
            active: true,
        }
    }

    /// Ray-casting containment test. Polygons with fewer than three
    /// vertices contain nothing.
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        point_in_polygon(lat, lng, &self.polygon)
    }

    pub fn contains_cell(&self, cell: CellIndex) -> bool {
        let coord: LatLng = cell.into();
        self.contains(coord.lat(), coord.lng())
    }
}

/// Standard ray casting: count crossings of a horizontal ray from the
/// point; an odd count means inside.
pub fn point_in_polygon(lat: f64, lng: f64, polygon: &[(f64, f64)]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (lat_i, lng_i) = polygon[i];
        let (lat_j, lng_j) = polygon[j];
        let crosses = (lng_i > lng) != (lng_j > lng)
            && lat < (lat_j - lat_i) * (lng - lng_i) / (lng_j - lng_i) + lat_i;
        if crosses {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// All zones known to the platform. Lookups only consider active zones.
#[derive(Debug, Clone, Default, Resource)]
pub struct ZoneBook {
    zones: Vec<ServiceZone>,
}

impl ZoneBook {
    pub fn new(zones: Vec<ServiceZone>) -> Self {
        Self { zones }
    }

    pub fn push(&mut self, zone: ServiceZone) {
        self.zones.push(zone);
    }

    pub fn zones(&self) -> &[ServiceZone] {
        &self.zones
    }

    fn active_of_kind(&self, kind: ZoneKind) -> impl Iterator<Item = &ServiceZone> {
        self.zones
            .iter()
            .filter(move |z| z.active && z.kind == kind)
    }

    /// Name of the first active City zone containing the cell, if any.
    pub fn city_for(&self, cell: CellIndex) -> Option<&str> {
        self.active_of_kind(ZoneKind::City)
            .find(|z| z.contains_cell(cell))
            .map(|z| z.name.as_str())
    }

    pub fn is_restricted(&self, cell: CellIndex) -> bool {
        self.active_of_kind(ZoneKind::Restricted)
            .any(|z| z.contains_cell(cell))
    }

    /// Highest multiplier among active high-demand zones containing the
    /// point; 1.0 when none apply.
    pub fn demand_multiplier(&self, cell: CellIndex) -> f64 {
        self.active_of_kind(ZoneKind::HighDemand)
            .filter(|z| z.contains_cell(cell))
            .map(|z| z.fare_multiplier)
            .fold(1.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use h3o::Resolution;

    // Square roughly covering central Karachi.
    fn karachi_polygon() -> Vec<(f64, f64)> {
        vec![(24.75, 66.90), (24.75, 67.25), (25.05, 67.25), (25.05, 66.90)]
    }

    fn cell_at(lat: f64, lng: f64) -> CellIndex {
        LatLng::new(lat, lng)
            .expect("valid coordinates")
            .to_cell(Resolution::Nine)
    }

    #[test]
    fn point_inside_square() {
        let poly = karachi_polygon();
        assert!(point_in_polygon(24.86, 67.00, &poly));
        assert!(!point_in_polygon(31.52, 74.35, &poly));
    }

    #[test]
    fn degenerate_polygon_contains_nothing() {
        assert!(!point_in_polygon(24.86, 67.00, &[]));
        assert!(!point_in_polygon(24.86, 67.00, &[(24.0, 67.0), (25.0, 67.0)]));
    }

    #[test]
    fn concave_polygon_containment() {
        // L-shape: the notch at the top-right is outside.
        let poly = vec![
            (0.0, 0.0),
            (0.0, 4.0),
            (2.0, 4.0),
            (2.0, 2.0),
            (4.0, 2.0),
            (4.0, 0.0),
        ];
        assert!(point_in_polygon(1.0, 1.0, &poly));
        assert!(point_in_polygon(1.0, 3.0, &poly));
        assert!(!point_in_polygon(3.0, 3.0, &poly));
    }

    #[test]
    fn city_lookup_returns_zone_name() {
        let book = ZoneBook::new(vec![ServiceZone::city("Karachi", karachi_polygon())]);
        assert_eq!(book.city_for(cell_at(24.86, 67.00)), Some("Karachi"));
        assert_eq!(book.city_for(cell_at(31.52, 74.35)), None);
    }

    #[test]
    fn inactive_zones_never_match() {
        let mut zone = ServiceZone::restricted("Cantonment", karachi_polygon());
        zone.active = false;
        let book = ZoneBook::new(vec![zone]);
        assert!(!book.is_restricted(cell_at(24.86, 67.00)));
    }

    #[test]
    fn demand_multiplier_takes_max_of_overlapping_zones() {
        let book = ZoneBook::new(vec![
            ServiceZone::high_demand("Airport", karachi_polygon(), 1.3),
            ServiceZone::high_demand("Stadium", karachi_polygon(), 1.6),
        ]);
        assert_eq!(book.demand_multiplier(cell_at(24.86, 67.00)), 1.6);
        assert_eq!(book.demand_multiplier(cell_at(31.52, 74.35)), 1.0);
    }

    #[test]
    fn high_demand_multiplier_is_clamped_to_at_least_one() {
        let zone = ServiceZone::high_demand("Oddity", karachi_polygon(), 0.5);
        assert_eq!(zone.fare_multiplier, 1.0);
    }
}
