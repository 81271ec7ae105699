//! Miller Cylindrical projection, spherical.
//!
//!   forward: x = R·Δλ, y = 1.25·R·ln(tan(π/4 + φ/2.5))
//!   inverse: φ = 2.5·(atan(exp(y/(1.25·R))) - π/4), λ = λ₀ + x/R

use std::f64::consts::FRAC_PI_4;
use std::sync::Arc;

use log::debug;

use crate::datum::Datum;
use crate::error::ProjError;
use crate::proj::common::adjust_lon;
use crate::proj::Projection;

#[derive(Clone)]
pub struct MillerCylindricalProjection {
    datum: Arc<Datum>,
    r: f64,
    lon_center: f64,
    false_easting: f64,
    false_northing: f64,
}

impl MillerCylindricalProjection {
    pub fn new(
        datum: Arc<Datum>,
        lon_center: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let r = datum.axis();
        debug!("Miller Cylindrical: r={}, lon_center={}", r, lon_center);
        Self {
            datum,
            r,
            lon_center,
            false_easting,
            false_northing,
        }
    }
}

impl Projection for MillerCylindricalProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        let dlon = adjust_lon(lon - self.lon_center);
        let x = self.false_easting + self.r * dlon;
        let y = self.false_northing + self.r * (FRAC_PI_4 + lat / 2.5).tan().ln() * 1.25;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let lat = 2.5 * ((y / (self.r * 1.25)).exp().atan() - FRAC_PI_4);
        let lon = adjust_lon(self.lon_center + x / self.r);
        Ok((lat, lon))
    }

    fn datum(&self) -> &Arc<Datum> {
        &self.datum
    }

    fn describe(&self) -> String {
        format!(
            "Miller Cylindrical (central meridian {:.4} deg)",
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
    fn test_round_trip() {
        let datum = DatumFactory::new().create(SPHERE).unwrap();
        let proj = MillerCylindricalProjection::new(datum, 0.0, 0.0, 0.0);
        for &(lat_deg, lon_deg) in &[(0.0, 0.0), (50.0, 100.0), (-75.0, -30.0), (89.9, 0.0)] {
            let lat = (lat_deg as f64).to_radians();
            let lon = (lon_deg as f64).to_radians();
            let (x, y) = proj.forward(lat, lon).unwrap();
            let (lat2, lon2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lat2, lat, epsilon = 1e-9);
            assert_relative_eq!(lon2, lon, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_pole_is_finite() {
        // Unlike Mercator the Miller cylinder reaches the poles.
        let datum = DatumFactory::new().create(SPHERE).unwrap();
        let proj = MillerCylindricalProjection::new(datum, 0.0, 0.0, 0.0);
        let (_, y) = proj.forward(std::f64::consts::FRAC_PI_2, 0.0).unwrap();
        assert!(y.is_finite());
    }
}
