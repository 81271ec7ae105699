//! Universal Transverse Mercator, a zoned wrapper around the Transverse
//! Mercator projection.
//!
//! Zones are numbered 1..60 eastward from 180W, six degrees wide, with
//! scale factor 0.9996, a 500 km false easting and a 10000 km false
//! northing in the southern hemisphere (negative zone number).

use std::sync::Arc;

use log::debug;

use crate::datum::Datum;
use crate::error::ProjError;
use crate::proj::common::calc_utm_zone;
use crate::proj::transverse_mercator::TransverseMercatorProjection;
use crate::proj::Projection;

const UTM_SCALE_FACTOR: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500000.0;
const UTM_SOUTH_FALSE_NORTHING: f64 = 10000000.0;

#[derive(Clone)]
pub struct UniversalTransverseMercatorProjection {
    tm: TransverseMercatorProjection,
    zone: i32,
}

impl UniversalTransverseMercatorProjection {
    /// Creates a UTM projection for the given signed zone. A negative
    /// zone selects the southern hemisphere.
    pub fn new(datum: Arc<Datum>, zone: i32) -> Result<Self, ProjError> {
        if zone == 0 || zone.abs() > 60 {
            return Err(ProjError::UnknownZone(zone));
        }
        let lon_center = ((6 * zone.abs() - 183) as f64).to_radians();
        let false_northing = if zone < 0 {
            UTM_SOUTH_FALSE_NORTHING
        } else {
            0.0
        };
        debug!("UTM: zone={}, lon_center={}", zone, lon_center);
        Ok(Self {
            tm: TransverseMercatorProjection::new(
                datum,
                UTM_SCALE_FACTOR,
                lon_center,
                0.0,
                UTM_FALSE_EASTING,
                false_northing,
            ),
            zone,
        })
    }

    /// Creates a UTM projection covering the given point, choosing the
    /// zone from the longitude and the hemisphere from the latitude, in
    /// degrees.
    pub fn for_point(datum: Arc<Datum>, lat: f64, lon: f64) -> Result<Self, ProjError> {
        let mut zone = calc_utm_zone(lon);
        if lat < 0.0 {
            zone = -zone;
        }
        Self::new(datum, zone)
    }

    pub fn zone(&self) -> i32 {
        self.zone
    }
}

impl Projection for UniversalTransverseMercatorProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        self.tm.forward(lat, lon)
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        self.tm.inverse(x, y)
    }

    fn datum(&self) -> &Arc<Datum> {
        self.tm.datum()
    }

    fn describe(&self) -> String {
        format!("UTM zone {}", self.zone)
    }

    fn clone_projection(&self) -> Box<dyn Projection> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::DatumFactory;
    use crate::spheroid::WGS84;
    use approx::assert_relative_eq;

    #[test]
    fn test_zone_validation() {
        let datum = DatumFactory::new().create(WGS84).unwrap();
        assert!(matches!(
            UniversalTransverseMercatorProjection::new(Arc::clone(&datum), 0),
            Err(ProjError::UnknownZone(0))
        ));
        assert!(UniversalTransverseMercatorProjection::new(Arc::clone(&datum), 61).is_err());
        assert!(UniversalTransverseMercatorProjection::new(datum, -60).is_ok());
    }

    #[test]
    fn test_zone_18_known_point() {
        // New York City falls in zone 18N; easting near 585 km, northing
        // near 4511 km.
        let datum = DatumFactory::new().create(WGS84).unwrap();
        let proj = UniversalTransverseMercatorProjection::new(datum, 18).unwrap();
        let (x, y) = proj
            .forward(40.7484f64.to_radians(), (-73.9857f64).to_radians())
            .unwrap();
        assert_relative_eq!(x, 585650.0, epsilon = 100.0);
        assert_relative_eq!(y, 4511300.0, epsilon = 300.0);
    }

    #[test]
    fn test_for_point_picks_zone_and_hemisphere() {
        let datum = DatumFactory::new().create(WGS84).unwrap();
        let proj = UniversalTransverseMercatorProjection::for_point(
            Arc::clone(&datum),
            -33.9,
            151.2,
        )
        .unwrap();
        assert_eq!(proj.zone(), -56);
        let proj =
            UniversalTransverseMercatorProjection::for_point(datum, 40.7, -74.0).unwrap();
        assert_eq!(proj.zone(), 18);
    }

    #[test]
    fn test_southern_hemisphere_round_trip() {
        let datum = DatumFactory::new().create(WGS84).unwrap();
        let proj = UniversalTransverseMercatorProjection::new(datum, -56).unwrap();
        let lat = (-33.8688f64).to_radians();
        let lon = 151.2093f64.to_radians();
        let (x, y) = proj.forward(lat, lon).unwrap();
        assert!(y > 0.0 && y < UTM_SOUTH_FALSE_NORTHING);
        let (lat2, lon2) = proj.inverse(x, y).unwrap();
        assert_relative_eq!(lat2, lat, epsilon = 1e-9);
        assert_relative_eq!(lon2, lon, epsilon = 1e-9);
    }
}
