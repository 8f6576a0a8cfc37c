//! Top-K nearest hydrant selection.
//!
//! A linear scan ranks every record by [`planar_distance`], which is
//! plenty for a city-sized dataset. Only the selected records get the more
//! expensive [`geodesic_meters`] computation.

use std::num::NonZeroUsize;

use hydrant_map_hydrant_models::{Coordinate, RankedHydrant};
use hydrant_map_spatial::{geodesic_meters, planar_distance};

use crate::HydrantCatalog;

/// Returns up to `k` records closest to `query`, nearest first.
///
/// Records at equal planar distance keep their catalog order, so the same
/// catalog and query always produce the same output. An empty catalog
/// yields an empty result and `k` larger than the catalog yields every
/// record.
#[must_use]
pub fn select_nearest<'a>(
    catalog: &'a HydrantCatalog,
    query: &Coordinate,
    k: NonZeroUsize,
) -> Vec<RankedHydrant<'a>> {
    let mut candidates: Vec<_> = catalog
        .all()
        .iter()
        .map(|record| (record, planar_distance(query, &record.coordinate)))
        .collect();

    // Stable sort: ties stay in enumeration order.
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
    candidates.truncate(k.get());

    candidates
        .into_iter()
        .map(|(record, planar_distance)| RankedHydrant {
            record,
            planar_distance,
            geodesic_meters: geodesic_meters(query, &record.coordinate),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydrant_map_hydrant_models::HydrantRecord;

    fn record(id: &str, lat: f64, lng: f64) -> HydrantRecord {
        HydrantRecord {
            id: id.to_string(),
            coordinate: Coordinate::new(lat, lng).unwrap(),
            label: format!("Hydrant {id}"),
            attributes: hydrant_map_hydrant_models::Attributes::new(),
        }
    }

    fn k(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn ids(ranked: &[RankedHydrant<'_>]) -> Vec<String> {
        ranked.iter().map(|r| r.record.id.clone()).collect()
    }

    fn city_catalog() -> HydrantCatalog {
        // Listed farthest-first so ordering has to come from the sort.
        HydrantCatalog::from_records(vec![
            record("c", 52.9667, 36.0652),
            record("b", 52.9655, 36.0656),
            record("a", 52.9648, 36.0620),
        ])
    }

    #[test]
    fn ranks_city_example_nearest_first() {
        let catalog = city_catalog();
        let query = Coordinate::new(52.9650, 36.0630).unwrap();

        let ranked = select_nearest(&catalog, &query, k(3));

        assert_eq!(ids(&ranked), ["a", "b", "c"]);
        let meters: Vec<u64> = ranked.iter().map(|r| r.geodesic_meters).collect();
        assert_eq!(meters, [71, 183, 240]);
    }

    #[test]
    fn returns_at_most_k_sorted_entries() {
        let catalog = city_catalog();
        let query = Coordinate::new(52.9650, 36.0630).unwrap();

        let ranked = select_nearest(&catalog, &query, k(2));

        assert_eq!(ranked.len(), 2);
        for window in ranked.windows(2) {
            assert!(window[0].planar_distance <= window[1].planar_distance);
        }
        for r in &ranked {
            assert!(catalog.all().contains(r.record));
        }
    }

    #[test]
    fn k_larger_than_catalog_returns_everything() {
        let catalog = city_catalog();
        let query = Coordinate::new(52.9650, 36.0630).unwrap();

        let ranked = select_nearest(&catalog, &query, k(50));

        assert_eq!(ranked.len(), catalog.len());
    }

    #[test]
    fn empty_catalog_yields_empty_result() {
        let catalog = HydrantCatalog::default();
        let query = Coordinate::new(52.9650, 36.0630).unwrap();

        assert!(select_nearest(&catalog, &query, k(3)).is_empty());
    }

    #[test]
    fn ties_keep_catalog_order() {
        // Four points at exactly 1 degree from the origin.
        let catalog = HydrantCatalog::from_records(vec![
            record("north", 1.0, 0.0),
            record("east", 0.0, 1.0),
            record("south", -1.0, 0.0),
            record("west", 0.0, -1.0),
        ]);
        let query = Coordinate::new(0.0, 0.0).unwrap();

        let first = select_nearest(&catalog, &query, k(3));
        let second = select_nearest(&catalog, &query, k(3));

        assert_eq!(ids(&first), ["north", "east", "south"]);
        assert_eq!(first, second);
    }
}
