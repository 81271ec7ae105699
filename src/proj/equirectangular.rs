//! Equirectangular projection, spherical with a latitude of true scale.
//!
//!   forward: x = R·Δλ·cosφ₁, y = R·φ
//!   inverse: φ = y/R, λ = λ₀ + x/(R·cosφ₁)

use std::sync::Arc;

use log::debug;

use crate::datum::Datum;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, HALF_PI};
use crate::proj::Projection;

#[derive(Clone)]
pub struct EquirectangularProjection {
    datum: Arc<Datum>,
    r: f64,
    lon_center: f64,
    lat_ts: f64,
    cos_lat_ts: f64,
    false_easting: f64,
    false_northing: f64,
}

impl EquirectangularProjection {
    /// Creates an equirectangular projection with true scale at `lat_ts`
    /// radians.
    pub fn new(
        datum: Arc<Datum>,
        lon_center: f64,
        lat_ts: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let r = datum.axis();
        debug!(
            "Equirectangular: r={}, lon_center={}, lat_ts={}",
            r, lon_center, lat_ts
        );
        Self {
            datum,
            r,
            lon_center,
            lat_ts,
            cos_lat_ts: lat_ts.cos(),
            false_easting,
            false_northing,
        }
    }
}

impl Projection for EquirectangularProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        let dlon = adjust_lon(lon - self.lon_center);
        let x = self.false_easting + self.r * dlon * self.cos_lat_ts;
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
        let lon = adjust_lon(self.lon_center + x / (self.r * self.cos_lat_ts));
        Ok((lat, lon))
    }

    fn datum(&self) -> &Arc<Datum> {
        &self.datum
    }

    fn describe(&self) -> String {
        format!(
            "Equirectangular (central meridian {:.4} deg, true scale at {:.4} deg)",
            self.lon_center.to_degrees(),
            self.lat_ts.to_degrees()
        )
    }

    fn clone_projection(&self) -> Box<dyn Projection> {
        Box::new(self.clone())
    }
}
