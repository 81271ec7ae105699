//! Spatial index over earth locations for nearest-point queries.
//!
//! Locations are hashed into roughly equal-area bins: fixed-height
//! latitude rings, each split into a longitude bin count proportional
//! to the ring's share of the sphere's area. A nearest query scans the
//! query bin and its adjacent bins linearly, comparing squared
//! earth-centered-fixed distances. The index assumes inserted
//! locations are contiguous or clustered, so that any bin holding
//! locations has neighbors in the set; a kd-tree was measurably slower
//! than the linear scan for this workload in the system this is
//! modeled on.

use std::collections::HashMap;

use log::trace;

use crate::location::EarthLocation;

/// Nudge used to land just inside a neighboring bin's edge.
const EPSILON: f64 = 1.0e-6;

/// A stored location with its precomputed search coordinates.
pub struct Entry<T> {
    pub loc: EarthLocation,
    pub ecf: [f64; 3],
    pub data: T,
}

/// Caches bin adjacency between repeated nearest queries. Obtain from
/// [`EarthLocationSet::context`] and pass to
/// [`EarthLocationSet::nearest_with`].
#[derive(Default)]
pub struct SearchContext {
    adjacency: HashMap<usize, Vec<usize>>,
}

pub struct EarthLocationSet<T> {
    lat_rings: usize,
    lat_degrees_per_bin: f64,
    bins_at_ring: Vec<usize>,
    lon_degrees_per_bin_at_ring: Vec<f64>,
    bin_index_at_ring: Vec<usize>,
    bin_map: HashMap<usize, Vec<Entry<T>>>,
}

impl<T> EarthLocationSet<T> {
    /// Creates an empty set with the given number of bins per degree
    /// of latitude, minimum 1.
    pub fn new(bins_per_degree: u32) -> Self {
        let bins_per_degree = bins_per_degree.max(1) as usize;
        let lat_rings = 180 * bins_per_degree;
        let lat_degrees_per_bin = 1.0 / bins_per_degree as f64;

        let bins_at_equator = 360 * bins_per_degree;
        let mut bins_at_ring = Vec::with_capacity(lat_rings);
        let mut lon_degrees_per_bin_at_ring = Vec::with_capacity(lat_rings);
        for i in 0..lat_rings {
            let base_lat = lat_degrees_per_bin * i as f64 - 90.0;
            let bin_factor = ((base_lat + lat_degrees_per_bin).to_radians().sin()
                - base_lat.to_radians().sin())
                / lat_degrees_per_bin.to_radians().sin();
            let bins = ((bins_at_equator as f64 * bin_factor).round() as i64).max(1)
                as usize;
            bins_at_ring.push(bins);
            lon_degrees_per_bin_at_ring.push(360.0 / bins as f64);
        }

        let mut bin_index_at_ring = Vec::with_capacity(lat_rings);
        let mut bin_index = 0;
        for &bins in &bins_at_ring {
            bin_index_at_ring.push(bin_index);
            bin_index += bins;
        }

        Self {
            lat_rings,
            lat_degrees_per_bin,
            bins_at_ring,
            lon_degrees_per_bin_at_ring,
            bin_index_at_ring,
            bin_map: HashMap::new(),
        }
    }

    /// The count of bins holding at least one location.
    pub fn bin_count(&self) -> usize {
        self.bin_map.len()
    }

    /// Removes all locations.
    pub fn clear(&mut self) {
        self.bin_map.clear();
    }

    /// A fresh adjacency cache for repeated nearest queries.
    pub fn context(&self) -> SearchContext {
        SearchContext::default()
    }

    fn lat_ring(&self, lat: f64) -> Option<usize> {
        let ring = ((lat + 90.0) / self.lat_degrees_per_bin).floor();
        if !ring.is_finite() || ring < 0.0 || ring > self.lat_rings as f64 {
            return None;
        }
        let ring = ring as usize;
        Some(if ring == self.lat_rings {
            self.lat_rings - 1
        } else {
            ring
        })
    }

    fn lon_bin(&self, lat_ring: usize, lon: f64) -> Option<usize> {
        let lon = if lon >= 180.0 { lon - 360.0 } else { lon };
        let bin = ((lon + 180.0) / self.lon_degrees_per_bin_at_ring[lat_ring]).floor();
        if !bin.is_finite() || bin < 0.0 || bin > (self.bins_at_ring[lat_ring] - 1) as f64
        {
            return None;
        }
        Some(bin as usize)
    }

    fn bin_index(&self, lat_ring: usize, lon_bin: usize) -> usize {
        self.bin_index_at_ring[lat_ring] + lon_bin
    }

    fn bin_of(&self, loc: &EarthLocation) -> Option<usize> {
        let ring = self.lat_ring(loc.lat)?;
        let lon_bin = self.lon_bin(ring, loc.lon)?;
        Some(self.bin_index(ring, lon_bin))
    }

    /// Inserts a location with its data. Locations that cannot be
    /// binned (NaN coordinates, out-of-range latitude) are skipped.
    pub fn insert(&mut self, loc: EarthLocation, data: T) {
        let index = match self.bin_of(&loc) {
            Some(index) => index,
            None => {
                trace!("Skipping unbinnable location {}", loc);
                return;
            }
        };
        let ecf = loc.datum().compute_ecf(loc.lat, loc.lon);
        self.bin_map
            .entry(index)
            .or_default()
            .push(Entry { loc, ecf, data });
    }

    /// Bin indices adjacent to (and including) the given bin: the span
    /// of overlapping bins one ring up, the left/self/right bins on
    /// the same ring with antimeridian wrap, and the span one ring
    /// down. Rings at the poles have no ring beyond them.
    fn adjacent_bins(&self, lat_ring: usize, lon_bin: usize) -> Vec<usize> {
        let bins = self.bins_at_ring[lat_ring];
        let lon_bin_left = if lon_bin == 0 { bins - 1 } else { lon_bin - 1 };
        let lon_bin_right = if lon_bin == bins - 1 { 0 } else { lon_bin + 1 };

        let deg_per_bin = self.lon_degrees_per_bin_at_ring[lat_ring];
        // With two bins the left and right neighbors coincide opposite
        // the query bin, so the edge longitudes computed from them would
        // skip the query bin's own span; cover the whole ring instead.
        let (left_edge, right_edge) = if bins == 2 {
            (EPSILON - 180.0, 180.0 - EPSILON)
        } else {
            (
                lon_bin_left as f64 * deg_per_bin + EPSILON - 180.0,
                (lon_bin_right + 1) as f64 * deg_per_bin - EPSILON - 180.0,
            )
        };

        let mut adjacent = Vec::new();

        // Span of bins in a neighboring ring covering [left_edge,
        // right_edge], walking eastward with wrap.
        let mut push_ring_span = |ring: usize, adjacent: &mut Vec<usize>| {
            let ring_bins = self.bins_at_ring[ring];
            let start = match self.lon_bin(ring, left_edge) {
                Some(bin) => bin,
                None => return,
            };
            let end = match self.lon_bin(ring, right_edge) {
                Some(bin) => bin,
                None => return,
            };
            let mut bin = start;
            loop {
                adjacent.push(self.bin_index(ring, bin));
                if bin == end {
                    break;
                }
                bin = (bin + 1) % ring_bins;
            }
        };

        if lat_ring != self.lat_rings - 1 {
            push_ring_span(lat_ring + 1, &mut adjacent);
        }

        if lon_bin_left != lon_bin {
            adjacent.push(self.bin_index(lat_ring, lon_bin_left));
        }
        adjacent.push(self.bin_index(lat_ring, lon_bin));
        if lon_bin_right != lon_bin && lon_bin_right != lon_bin_left {
            adjacent.push(self.bin_index(lat_ring, lon_bin_right));
        }

        if lat_ring != 0 {
            push_ring_span(lat_ring - 1, &mut adjacent);
        }

        adjacent
    }

    /// The nearest stored entry to a location, or None when the set
    /// holds no locations in or adjacent to the location's bin.
    pub fn nearest(&self, loc: &EarthLocation) -> Option<&Entry<T>> {
        self.nearest_impl(loc, None)
    }

    /// Like [`EarthLocationSet::nearest`], reusing cached bin
    /// adjacency from earlier queries with the same context.
    pub fn nearest_with<'a>(
        &'a self,
        loc: &EarthLocation,
        context: &mut SearchContext,
    ) -> Option<&'a Entry<T>> {
        self.nearest_impl(loc, Some(context))
    }

    fn nearest_impl<'a>(
        &'a self,
        loc: &EarthLocation,
        context: Option<&mut SearchContext>,
    ) -> Option<&'a Entry<T>> {
        let lat_ring = self.lat_ring(loc.lat)?;
        let lon_bin = self.lon_bin(lat_ring, loc.lon)?;
        let bin_index = self.bin_index(lat_ring, lon_bin);

        let computed;
        let adjacent: &[usize] = match context {
            Some(context) => context
                .adjacency
                .entry(bin_index)
                .or_insert_with(|| self.adjacent_bins(lat_ring, lon_bin)),
            None => {
                computed = self.adjacent_bins(lat_ring, lon_bin);
                &computed
            }
        };

        let search = loc.datum().compute_ecf(loc.lat, loc.lon);
        let mut min_dist2 = f64::MAX;
        let mut nearest_entry = None;
        for index in adjacent {
            if let Some(entries) = self.bin_map.get(index) {
                for entry in entries {
                    let dist2 = entry
                        .ecf
                        .iter()
                        .zip(search.iter())
                        .map(|(a, b)| (a - b) * (a - b))
                        .sum::<f64>();
                    if dist2 < min_dist2 {
                        min_dist2 = dist2;
                        nearest_entry = Some(entry);
                    }
                }
            }
        }
        nearest_entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::DatumFactory;
    use crate::spheroid::WGS84;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    fn insert_cluster(
        set: &mut EarthLocationSet<usize>,
        rng: &mut StdRng,
        count: usize,
        lat_range: (f64, f64),
        lon_range: (f64, f64),
    ) -> Vec<EarthLocation> {
        let datum = DatumFactory::new().create(WGS84).unwrap();
        let mut locations = Vec::with_capacity(count);
        for i in 0..count {
            let lat = rng.gen_range(lat_range.0..lat_range.1);
            let lon = rng.gen_range(lon_range.0..lon_range.1);
            let loc = EarthLocation::new(lat, lon, Arc::clone(&datum));
            set.insert(loc.clone(), i);
            locations.push(loc);
        }
        locations
    }

    fn assert_all_self_nearest(
        set: &EarthLocationSet<usize>,
        locations: &[EarthLocation],
    ) {
        let mut context = set.context();
        for (i, loc) in locations.iter().enumerate() {
            let entry = set.nearest_with(loc, &mut context).unwrap();
            assert_eq!(entry.data, i, "location {} not self-nearest", i);
        }
    }

    #[test]
    fn test_north_pole_cluster() {
        let mut set = EarthLocationSet::new(2);
        let mut rng = StdRng::seed_from_u64(1);
        let locations = insert_cluster(&mut set, &mut rng, 10000, (80.0, 90.0), (0.0, 360.0));
        assert!(set.bin_count() > 0);
        assert_all_self_nearest(&set, &locations);
    }

    #[test]
    fn test_south_pole_cluster() {
        let mut set = EarthLocationSet::new(2);
        let mut rng = StdRng::seed_from_u64(2);
        let locations =
            insert_cluster(&mut set, &mut rng, 10000, (-90.0, -80.0), (0.0, 360.0));
        assert_all_self_nearest(&set, &locations);
    }

    #[test]
    fn test_equator_prime_meridian_cluster() {
        let mut set = EarthLocationSet::new(2);
        let mut rng = StdRng::seed_from_u64(3);
        let locations =
            insert_cluster(&mut set, &mut rng, 10000, (0.0, 10.0), (0.0, 10.0));
        assert_all_self_nearest(&set, &locations);
    }

    #[test]
    fn test_antimeridian_cluster() {
        let mut set = EarthLocationSet::new(2);
        let mut rng = StdRng::seed_from_u64(4);
        let locations =
            insert_cluster(&mut set, &mut rng, 10000, (0.0, 10.0), (175.0, 185.0));
        assert_all_self_nearest(&set, &locations);
    }

    #[test]
    fn test_empty_set() {
        let set: EarthLocationSet<()> = EarthLocationSet::new(2);
        let datum = DatumFactory::new().create(WGS84).unwrap();
        let loc = EarthLocation::new(0.0, 0.0, datum);
        assert!(set.nearest(&loc).is_none());
        assert_eq!(set.bin_count(), 0);
    }

    #[test]
    fn test_invalid_location_skipped() {
        let mut set = EarthLocationSet::new(2);
        let datum = DatumFactory::new().create(WGS84).unwrap();
        set.insert(EarthLocation::invalid(Arc::clone(&datum)), 0usize);
        assert_eq!(set.bin_count(), 0);
    }

    #[test]
    fn test_clear() {
        let mut set = EarthLocationSet::new(2);
        let datum = DatumFactory::new().create(WGS84).unwrap();
        let loc = EarthLocation::new(45.0, -120.0, Arc::clone(&datum));
        set.insert(loc.clone(), 7usize);
        assert_eq!(set.bin_count(), 1);
        assert_eq!(set.nearest(&loc).unwrap().data, 7);
        set.clear();
        assert_eq!(set.bin_count(), 0);
        assert!(set.nearest(&loc).is_none());
    }

    #[test]
    fn test_two_bin_ring_adjacency_covers_neighbors() {
        // Hand-built ring tables with a 2-bin ring between 4-bin rings.
        // From either bin the adjacency must reach every bin in the
        // rings above and below plus the whole 2-bin ring itself.
        let set: EarthLocationSet<()> = EarthLocationSet {
            lat_rings: 3,
            lat_degrees_per_bin: 60.0,
            bins_at_ring: vec![4, 2, 4],
            lon_degrees_per_bin_at_ring: vec![90.0, 180.0, 90.0],
            bin_index_at_ring: vec![0, 4, 6],
            bin_map: HashMap::new(),
        };
        for bin in 0..2 {
            let adjacent = set.adjacent_bins(1, bin);
            for index in 0..4 {
                assert!(adjacent.contains(&index), "bin {} misses {}", bin, index);
            }
            for index in 6..10 {
                assert!(adjacent.contains(&index), "bin {} misses {}", bin, index);
            }
            assert!(adjacent.contains(&4));
            assert!(adjacent.contains(&5));
        }
    }

    #[test]
    fn test_nearest_across_bins() {
        // Two points in different bins; the nearer one wins from a
        // query point between them.
        let mut set = EarthLocationSet::new(2);
        let datum = DatumFactory::new().create(WGS84).unwrap();
        set.insert(EarthLocation::new(10.1, 20.0, Arc::clone(&datum)), 1usize);
        set.insert(EarthLocation::new(10.6, 20.0, Arc::clone(&datum)), 2usize);
        let query = EarthLocation::new(10.3, 20.0, datum);
        assert_eq!(set.nearest(&query).unwrap().data, 1);
    }
}
