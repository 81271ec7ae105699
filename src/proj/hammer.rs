//! Hammer equal-area projection, spherical.
//!
//!   w = sqrt(2 / (1 + cosφ·cos(Δλ/2)))
//!   x = sqrt(2)·R·w·... expressed below with fac = R·sqrt(2)/sqrt(1 + cosφ·cos(Δλ/2))
//!   x = fac·2·cosφ·sin(Δλ/2), y = fac·sinφ

use std::sync::Arc;

use log::debug;

use crate::datum::Datum;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, asinz};
use crate::proj::Projection;

#[derive(Clone)]
pub struct HammerProjection {
    datum: Arc<Datum>,
    r: f64,
    lon_center: f64,
    false_easting: f64,
    false_northing: f64,
}

impl HammerProjection {
    pub fn new(
        datum: Arc<Datum>,
        lon_center: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let r = datum.axis();
        debug!("Hammer: r={}, lon_center={}", r, lon_center);
        Self {
            datum,
            r,
            lon_center,
            false_easting,
            false_northing,
        }
    }
}

impl Projection for HammerProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        let dlon = adjust_lon(lon - self.lon_center);
        let fac = self.r * 1.414213562 / (1.0 + lat.cos() * (dlon / 2.0).cos()).sqrt();
        let x = self.false_easting + fac * 2.0 * lat.cos() * (dlon / 2.0).sin();
        let y = self.false_northing + fac * lat.sin();
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let fac = (4.0 * self.r * self.r - (x * x) / 4.0 - y * y).sqrt() / 2.0;
        let lon = adjust_lon(
            self.lon_center
                + 2.0 * (x * fac).atan2(2.0 * self.r * self.r - x * x / 4.0 - y * y),
        );
        let lat = asinz(y * fac / (self.r * self.r));
        Ok((lat, lon))
    }

    fn datum(&self) -> &Arc<Datum> {
        &self.datum
    }

    fn describe(&self) -> String {
        format!(
            "Hammer (central meridian {:.4} deg)",
            self.lon_center.to_degrees()
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
    use crate::spheroid::SPHERE;
    use approx::assert_relative_eq;

    #[test]
    fn test_origin() {
        let datum = DatumFactory::new().create(SPHERE).unwrap();
        let proj = HammerProjection::new(datum, 0.0, 0.0, 0.0);
        let (x, y) = proj.forward(0.0, 0.0).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_round_trip() {
        let datum = DatumFactory::new().create(SPHERE).unwrap();
        let proj = HammerProjection::new(datum, 0.0, 0.0, 0.0);
        for &(lat_deg, lon_deg) in &[(0.0, 0.0), (40.0, 60.0), (-55.0, -130.0), (80.0, 20.0)] {
            let lat = (lat_deg as f64).to_radians();
            let lon = (lon_deg as f64).to_radians();
            let (x, y) = proj.forward(lat, lon).unwrap();
            let (lat2, lon2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lat2, lat, epsilon = 1e-8);
            assert_relative_eq!(lon2, lon, epsilon = 1e-8);
        }
    }
}
