//! Mercator projection, ellipsoidal with a standard parallel.
//!
//!   forward: x = a·m₁·(λ - λ₀), y = -a·m₁·ln(tsfnz(φ))
//!   inverse: λ = λ₀ + x/(a·m₁), φ = phi2z(exp(-y/(a·m₁)))
//!
//! where m₁ = msfnz at the standard parallel. With zero eccentricity the
//! same path reduces to the spherical Mercator.

use std::sync::Arc;

use log::debug;

use crate::datum::Datum;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, msfnz, phi2z, tsfnz, EPSLN, HALF_PI};
use crate::proj::Projection;

#[derive(Clone)]
pub struct MercatorProjection {
    datum: Arc<Datum>,
    r_major: f64,
    e: f64,
    lon_center: f64,
    m1: f64,
    false_easting: f64,
    false_northing: f64,
    lat_origin: f64,
}

impl MercatorProjection {
    /// Creates a Mercator projection. `lon_center` is the central
    /// meridian and `lat_origin` the latitude of true scale, in radians.
    pub fn new(
        datum: Arc<Datum>,
        lon_center: f64,
        lat_origin: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let r_major = datum.axis();
        let e = datum.e2().sqrt();
        let m1 = msfnz(e, lat_origin.sin(), lat_origin.cos());
        debug!(
            "Mercator: a={}, e={}, lon_center={}, lat_origin={}",
            r_major, e, lon_center, lat_origin
        );
        Self {
            datum,
            r_major,
            e,
            lon_center,
            m1,
            false_easting,
            false_northing,
            lat_origin,
        }
    }
}

impl Projection for MercatorProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        if (lat.abs() - HALF_PI).abs() <= EPSLN {
            return Err(ProjError::PointAtInfinity);
        }
        let ts = tsfnz(self.e, lat, lat.sin());
        let x = self.false_easting
            + self.r_major * self.m1 * adjust_lon(lon - self.lon_center);
        let y = self.false_northing - self.r_major * self.m1 * ts.ln();
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let ts = (-y / (self.r_major * self.m1)).exp();
        let lat = phi2z(self.e, ts)?;
        let lon = adjust_lon(self.lon_center + x / (self.r_major * self.m1));
        Ok((lat, lon))
    }

    fn datum(&self) -> &Arc<Datum> {
        &self.datum
    }

    fn describe(&self) -> String {
        format!(
            "Mercator (central meridian {:.4} deg, true scale at {:.4} deg)",
            self.lon_center.to_degrees(),
            self.lat_origin.to_degrees()
        )
    }

    fn clone_projection(&self) -> Box<dyn Projection> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::DatumFactory;
    use crate::spheroid::{SPHERE, WGS84};
    use approx::assert_relative_eq;

    #[test]
    fn test_known_value_wgs84() {
        // Web-style Mercator on the WGS 84 semi-major axis gives
        // x = a * lon at the equator standard parallel.
        let datum = DatumFactory::new().create(WGS84).unwrap();
        let proj = MercatorProjection::new(datum, 0.0, 0.0, 0.0, 0.0);
        let (x, y) = proj
            .forward(45.0f64.to_radians(), 90.0f64.to_radians())
            .unwrap();
        assert_relative_eq!(x, 6378137.0 * HALF_PI, epsilon = 1e-3);
        // Ellipsoidal northing at 45N (EPSG:3395 reference).
        assert_relative_eq!(y, 5591295.9185, epsilon = 1.0);
    }

    #[test]
    fn test_round_trip() {
        let datum = DatumFactory::new().create(WGS84).unwrap();
        let proj = MercatorProjection::new(datum, -96.0f64.to_radians(), 0.0, 0.0, 0.0);
        for &(lat_deg, lon_deg) in &[
            (0.0, -96.0),
            (35.0, -120.0),
            (-45.0, 30.0),
            (80.0, 179.0),
            (-80.0, -179.0),
        ] {
            let lat = (lat_deg as f64).to_radians();
            let lon = (lon_deg as f64).to_radians();
            let (x, y) = proj.forward(lat, lon).unwrap();
            let (lat2, lon2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lat2, lat, epsilon = 1e-9);
            assert_relative_eq!(lon2, lon, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_pole_fails() {
        let datum = DatumFactory::new().create(SPHERE).unwrap();
        let proj = MercatorProjection::new(datum, 0.0, 0.0, 0.0, 0.0);
        assert!(matches!(
            proj.forward(HALF_PI, 0.0),
            Err(ProjError::PointAtInfinity)
        ));
    }

    #[test]
    fn test_standard_parallel_scale() {
        // With true scale at 60N the equatorial x shrinks by cos(60) on a
        // sphere.
        let datum = DatumFactory::new().create(SPHERE).unwrap();
        let proj = MercatorProjection::new(datum, 0.0, 60.0f64.to_radians(), 0.0, 0.0);
        let (x, _) = proj.forward(0.0, 1.0).unwrap();
        assert_relative_eq!(x, 6370997.0 * 0.5, epsilon = 1e-6);
    }
}
