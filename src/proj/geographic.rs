//! Geographic (Plate Carree) projection.
//!
//! The map plane is angular: x is longitude and y is latitude, both in
//! degrees, so no radians conversion happens at the grid layer. The
//! only real work is longitude wrapping. Depending on where the bound
//! grid sits, input longitudes are translated into one of five ranges
//! before becoming column values, so grids that cross the antimeridian
//! stay monotonic in x.

use std::sync::Arc;

use log::{debug, warn};

use crate::affine::Affine;
use crate::datum::Datum;
use crate::error::ProjError;
use crate::location::EarthLocation;
use crate::proj::Projection;

/// How the bound grid spans in longitude. The range names describe
/// which meridians the grid crosses; each selects a wrap interval for
/// input longitudes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LongitudeRange {
    /// Grid within [-180, 180); longitudes used as is.
    SpansPrime,
    /// Grid crosses the antimeridian from the east; wrap to [0, 360).
    SpansAntiPositive,
    /// Grid crosses the antimeridian from the west; wrap to [-360, 0).
    SpansAntiNegative,
    /// Grid crosses both prime and antimeridian; wrap to
    /// [alpha, alpha + 360).
    SpansPrimeAntiPositive,
    /// Grid crosses both prime and antimeridian; wrap to
    /// [alpha - 360, alpha).
    SpansPrimeAntiNegative,
}

#[derive(Clone)]
pub struct GeographicProjection {
    datum: Arc<Datum>,
    lon_range: LongitudeRange,
    /// Western grid edge longitude for the combined span ranges.
    alpha: f64,
}

impl GeographicProjection {
    pub fn new(datum: Arc<Datum>) -> Self {
        Self {
            datum,
            lon_range: LongitudeRange::SpansPrime,
            alpha: 0.0,
        }
    }

    /// True when the segment between two locations crosses the wrap
    /// boundary of the current longitude range, so a line drawn
    /// between them in grid space would jump across the grid.
    pub fn is_boundary_cut(&self, a: &EarthLocation, b: &EarthLocation) -> bool {
        let (east, west) = if a.is_east_of(b) { (a, b) } else { (b, a) };
        match self.lon_range {
            LongitudeRange::SpansPrime => west.lon > east.lon,
            LongitudeRange::SpansAntiPositive | LongitudeRange::SpansAntiNegative => {
                west.lon < 0.0 && east.lon >= 0.0
            }
            LongitudeRange::SpansPrimeAntiPositive
            | LongitudeRange::SpansPrimeAntiNegative => {
                west.lon < self.alpha && east.lon >= self.alpha
            }
        }
    }
}

impl Projection for GeographicProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        let lon = match self.lon_range {
            LongitudeRange::SpansPrime => lon,
            LongitudeRange::SpansAntiPositive => {
                if lon < 0.0 {
                    lon + 360.0
                } else {
                    lon
                }
            }
            LongitudeRange::SpansAntiNegative => {
                if lon >= 0.0 {
                    lon - 360.0
                } else {
                    lon
                }
            }
            LongitudeRange::SpansPrimeAntiPositive => {
                if lon < self.alpha {
                    lon + 360.0
                } else {
                    lon
                }
            }
            LongitudeRange::SpansPrimeAntiNegative => {
                if lon >= self.alpha {
                    lon - 360.0
                } else {
                    lon
                }
            }
        };
        Ok((lon, lat))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        Ok((y, x))
    }

    fn datum(&self) -> &Arc<Datum> {
        &self.datum
    }

    fn describe(&self) -> String {
        format!("Geographic ({:?})", self.lon_range)
    }

    fn clone_projection(&self) -> Box<dyn Projection> {
        Box::new(self.clone())
    }

    fn is_angular(&self) -> bool {
        true
    }

    fn bind_grid(&mut self, data_to_map: &Affine, dims: [usize; 2]) {
        // Longitudes of the outer grid corners in map (x) terms.
        let (x_start, _) = data_to_map.apply(-0.5, -0.5);
        let (x_end, _) =
            data_to_map.apply(dims[0] as f64 - 0.5, dims[1] as f64 - 0.5);
        let min_lon = x_start.min(x_end);
        let mut max_lon = x_start.max(x_end);
        if max_lon - min_lon > 360.0 {
            max_lon = min_lon + 360.0;
        }
        debug!("Grid longitude extent [{}, {}]", min_lon, max_lon);

        if (-180.0..=180.0).contains(&min_lon) && (-180.0..=180.0).contains(&max_lon) {
            self.lon_range = LongitudeRange::SpansPrime;
        } else if (0.0..=180.0).contains(&min_lon) && (180.0..=360.0).contains(&max_lon)
        {
            self.lon_range = LongitudeRange::SpansAntiPositive;
        } else if (-360.0..=-180.0).contains(&min_lon)
            && (-180.0..=0.0).contains(&max_lon)
        {
            self.lon_range = LongitudeRange::SpansAntiNegative;
        } else if min_lon <= 0.0 && max_lon >= 180.0 {
            self.alpha = min_lon;
            self.lon_range = LongitudeRange::SpansPrimeAntiPositive;
        } else if min_lon <= -180.0 && max_lon >= 0.0 {
            self.alpha = max_lon;
            self.lon_range = LongitudeRange::SpansPrimeAntiNegative;
        } else {
            warn!(
                "Unsupported longitude extent [{}, {}], keeping previous range",
                min_lon, max_lon
            );
        }
        debug!("Longitude range is {:?} with alpha = {}", self.lon_range, self.alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::DatumFactory;
    use crate::spheroid::WGS84;
    use approx::assert_relative_eq;

    fn geographic() -> GeographicProjection {
        let datum = DatumFactory::new().create(WGS84).unwrap();
        GeographicProjection::new(datum)
    }

    #[test]
    fn test_identity_behavior() {
        let proj = geographic();
        let (x, y) = proj.forward(41.7, -71.5).unwrap();
        assert_relative_eq!(x, -71.5);
        assert_relative_eq!(y, 41.7);
        let (lat, lon) = proj.inverse(x, y).unwrap();
        assert_relative_eq!(lat, 41.7);
        assert_relative_eq!(lon, -71.5);
    }

    #[test]
    fn test_antimeridian_positive_wrap() {
        let mut proj = geographic();
        // 10 degree wide grid centered on the antimeridian at 1 pixel
        // per degree: columns map to longitudes [175, 185].
        let affine = Affine {
            a: 0.0,
            b: 1.0,
            c: 175.0,
            d: -1.0,
            e: 0.0,
            f: 5.0,
        };
        proj.bind_grid(&affine, [10, 10]);
        assert_eq!(proj.lon_range, LongitudeRange::SpansAntiPositive);
        // West of the antimeridian, unchanged.
        let (x, _) = proj.forward(0.0, 178.0).unwrap();
        assert_relative_eq!(x, 178.0);
        // East of the antimeridian, wrapped up past 180.
        let (x, _) = proj.forward(0.0, -178.0).unwrap();
        assert_relative_eq!(x, 182.0);
    }

    #[test]
    fn test_antimeridian_negative_wrap() {
        let mut proj = geographic();
        let affine = Affine {
            a: 0.0,
            b: 1.0,
            c: -185.0,
            d: -1.0,
            e: 0.0,
            f: 5.0,
        };
        proj.bind_grid(&affine, [10, 10]);
        assert_eq!(proj.lon_range, LongitudeRange::SpansAntiNegative);
        let (x, _) = proj.forward(0.0, 178.0).unwrap();
        assert_relative_eq!(x, -182.0);
        let (x, _) = proj.forward(0.0, -178.0).unwrap();
        assert_relative_eq!(x, -178.0);
    }

    #[test]
    fn test_boundary_cut() {
        let mut proj = geographic();
        let datum = proj.datum().clone();
        // Default range: a segment crossing the antimeridian is cut.
        let a = EarthLocation::new(0.0, 179.0, datum.clone());
        let b = EarthLocation::new(0.0, -179.0, datum.clone());
        assert!(proj.is_boundary_cut(&a, &b));
        let c = EarthLocation::new(0.0, 10.0, datum.clone());
        let d = EarthLocation::new(0.0, 20.0, datum);
        assert!(!proj.is_boundary_cut(&c, &d));

        // After binding to an antimeridian grid the cut moves to the
        // prime meridian.
        let affine = Affine {
            a: 0.0,
            b: 1.0,
            c: 175.0,
            d: -1.0,
            e: 0.0,
            f: 5.0,
        };
        proj.bind_grid(&affine, [10, 10]);
        assert!(!proj.is_boundary_cut(&a, &b));
    }
}
