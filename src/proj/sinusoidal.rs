//! Sinusoidal (Sanson-Flamsteed) equal-area projection, spherical.
//!
//!   forward: x = R·Δλ·cosφ, y = R·φ
//!   inverse: φ = y/R, λ = λ₀ + x/(R·cosφ)

use std::sync::Arc;

use log::debug;

use crate::datum::Datum;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, EPSLN, HALF_PI};
use crate::proj::Projection;

#[derive(Clone)]
pub struct SinusoidalProjection {
    datum: Arc<Datum>,
    r: f64,
    lon_center: f64,
    false_easting: f64,
    false_northing: f64,
}

impl SinusoidalProjection {
    pub fn new(
        datum: Arc<Datum>,
        lon_center: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let r = datum.axis();
        debug!("Sinusoidal: r={}, lon_center={}", r, lon_center);
        Self {
            datum,
            r,
            lon_center,
            false_easting,
            false_northing,
        }
    }
}

impl Projection for SinusoidalProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        let dlon = adjust_lon(lon - self.lon_center);
        let x = self.false_easting + self.r * dlon * lat.cos();
        let y = self.false_northing + self.r * lat;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let lat = y / self.r;
        if lat.abs() > HALF_PI {
            return Err(ProjError::OutsideDomain(
                "point beyond the pole".into(),
            ));
        }
        let temp = lat.abs() - HALF_PI;
        let lon = if temp.abs() > EPSLN {
            adjust_lon(self.lon_center + x / (self.r * lat.cos()))
        } else {
            self.lon_center
        };
        Ok((lat, lon))
    }

    fn datum(&self) -> &Arc<Datum> {
        &self.datum
    }

    fn describe(&self) -> String {
        format!(
            "Sinusoidal (central meridian {:.4} deg)",
            self.lon_center.to_degrees()
        )
    }

    fn clone_projection(&self) -> Box<dyn Projection> {
        Box::new(self.clone())
    }
}
