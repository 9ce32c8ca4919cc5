use crate::catalog::CatalogEntry;
use crate::geo::distance_miles;
use rz_api_types::Coordinates;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Radius {
    Miles(f64),
    Unbounded,
}

/// Cutoff used by the map view.
pub const MAP_VIEW_RADIUS: Radius = Radius::Miles(10.0);

impl Radius {
    fn admits(self, miles: f64) -> bool {
        match self {
            Radius::Miles(limit) => miles <= limit,
            Radius::Unbounded => true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Ranked<'a, E> {
    pub entry: &'a E,
    pub distance_miles: f64,
}

/// Entries within `radius` of `origin`, nearest first. Ties keep catalog order.
/// Entries without coordinates are left out.
pub fn rank_by_distance<'a, E: CatalogEntry>(
    entries: &'a [E],
    origin: Coordinates,
    radius: Radius,
) -> Vec<Ranked<'a, E>> {
    rank_indices(entries, origin, radius)
        .into_iter()
        .map(|(index, distance_miles)| Ranked {
            entry: &entries[index],
            distance_miles,
        })
        .collect()
}

fn rank_indices<E: CatalogEntry>(entries: &[E], origin: Coordinates, radius: Radius) -> Vec<(usize, f64)> {
    let mut ranked: Vec<(usize, f64)> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let miles = distance_miles(origin, entry.coordinates()?);
            radius.admits(miles).then_some((index, miles))
        })
        .collect();

    ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    ranked
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct MemoKey {
    origin: Coordinates,
    revision: u64,
    radius: Radius,
}

/// Remembers the last ranking and reuses it while origin, catalog revision and
/// radius stay the same.
#[derive(Debug, Default)]
pub struct NearbyMemo {
    key: Option<MemoKey>,
    ranked: Vec<(usize, f64)>,
    computations: u64,
}

impl NearbyMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<'a, E: CatalogEntry>(
        &mut self,
        entries: &'a [E],
        revision: u64,
        origin: Coordinates,
        radius: Radius,
    ) -> Vec<Ranked<'a, E>> {
        let key = MemoKey {
            origin,
            revision,
            radius,
        };

        if self.key != Some(key) {
            self.ranked = rank_indices(entries, origin, radius);
            self.key = Some(key);
            self.computations += 1;
        }

        self.ranked
            .iter()
            .filter_map(|(index, distance_miles)| {
                entries.get(*index).map(|entry| Ranked {
                    entry,
                    distance_miles: *distance_miles,
                })
            })
            .collect()
    }

    /// How many times the ranking was actually recomputed.
    pub fn computations(&self) -> u64 {
        self.computations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::EARTH_RADIUS_MILES;
    use rz_api_types::Restaurant;

    fn degrees_north(miles: f64) -> f64 {
        miles * 180.0 / (EARTH_RADIUS_MILES * std::f64::consts::PI)
    }

    fn at(id: &str, lat: f64, lon: f64) -> Restaurant {
        Restaurant {
            id: id.to_owned(),
            name: id.to_owned(),
            address: String::new(),
            description: None,
            domain: None,
            lat: Some(lat),
            lon: Some(lon),
            cashback_rate: None,
            logo_url: None,
            handle: None,
            currency: None,
        }
    }

    #[test]
    fn keeps_entries_inside_radius_sorted_ascending() {
        let origin = Coordinates::new(0.0, 0.0);
        let catalog = vec![
            at("far", degrees_north(15.0), 0.0),
            at("eight", degrees_north(8.0), 0.0),
            at("two", degrees_north(2.0), 0.0),
        ];

        let ranked = rank_by_distance(&catalog, origin, MAP_VIEW_RADIUS);
        let ids: Vec<&str> = ranked.iter().map(|r| r.entry.id.as_str()).collect();
        assert_eq!(ids, ["two", "eight"]);
        assert!((ranked[0].distance_miles - 2.0).abs() < 1e-6);
        assert!((ranked[1].distance_miles - 8.0).abs() < 1e-6);
    }

    #[test]
    fn unbounded_keeps_everything() {
        let origin = Coordinates::new(0.0, 0.0);
        let catalog = vec![
            at("far", degrees_north(1500.0), 0.0),
            at("near", degrees_north(1.0), 0.0),
        ];

        let ranked = rank_by_distance(&catalog, origin, Radius::Unbounded);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].entry.id, "near");
    }

    #[test]
    fn entries_without_coordinates_are_not_ranked() {
        let origin = Coordinates::new(0.0, 0.0);
        let mut online = at("online", 0.0, 0.0);
        online.lat = None;
        online.lon = None;
        let catalog = vec![online, at("near", degrees_north(1.0), 0.0)];

        let ranked = rank_by_distance(&catalog, origin, Radius::Unbounded);
        let ids: Vec<&str> = ranked.iter().map(|r| r.entry.id.as_str()).collect();
        assert_eq!(ids, ["near"]);
    }

    #[test]
    fn memo_recomputes_only_on_input_change() {
        let catalog = vec![at("a", degrees_north(1.0), 0.0), at("b", degrees_north(3.0), 0.0)];
        let origin = Coordinates::new(0.0, 0.0);
        let mut memo = NearbyMemo::new();

        let first = memo.get(&catalog, 1, origin, MAP_VIEW_RADIUS);
        assert_eq!(first.len(), 2);
        let again = memo.get(&catalog, 1, origin, MAP_VIEW_RADIUS);
        assert_eq!(again[1].entry.id, "b");
        assert_eq!(memo.computations(), 1);

        let moved = memo.get(&catalog, 1, Coordinates::new(degrees_north(3.0), 0.0), MAP_VIEW_RADIUS);
        assert_eq!(moved[0].entry.id, "b");
        assert_eq!(memo.computations(), 2);

        memo.get(&catalog, 2, Coordinates::new(degrees_north(3.0), 0.0), MAP_VIEW_RADIUS);
        assert_eq!(memo.computations(), 3);
    }
}
