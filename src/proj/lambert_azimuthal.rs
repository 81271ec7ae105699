//! Lambert Azimuthal Equal Area projection, spherical.
//!
//!   g = sinφ₀·sinφ + cosφ₀·cosφ·cosΔλ
//!   k = R·sqrt(2/(1 + g))
//!
//! The antipode of the center (g = -1) projects onto the bounding
//! circle of radius 2R and cannot be represented as a point.

use std::sync::Arc;

use log::debug;

use crate::datum::Datum;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, asinz, EPSLN, HALF_PI};
use crate::proj::Projection;

#[derive(Clone)]
pub struct LambertAzimuthalEqualAreaProjection {
    datum: Arc<Datum>,
    r: f64,
    lon_center: f64,
    lat_center: f64,
    sin_lat_o: f64,
    cos_lat_o: f64,
    false_easting: f64,
    false_northing: f64,
}

impl LambertAzimuthalEqualAreaProjection {
    /// Creates a Lambert Azimuthal Equal Area projection centered at
    /// (`lat_center`, `lon_center`) in radians.
    pub fn new(
        datum: Arc<Datum>,
        lon_center: f64,
        lat_center: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let r = datum.axis();
        debug!(
            "Lambert Azimuthal Equal Area: r={}, center=({}, {})",
            r, lat_center, lon_center
        );
        Self {
            datum,
            r,
            lon_center,
            lat_center,
            sin_lat_o: lat_center.sin(),
            cos_lat_o: lat_center.cos(),
            false_easting,
            false_northing,
        }
    }
}

impl Projection for LambertAzimuthalEqualAreaProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let dlon = adjust_lon(lon - self.lon_center);
        let cos_lon = dlon.cos();
        let g = self.sin_lat_o * sin_lat + self.cos_lat_o * cos_lat * cos_lon;
        if g == -1.0 {
            return Err(ProjError::PointAtInfinity);
        }
        let ksp = self.r * (2.0 / (1.0 + g)).sqrt();
        let x = ksp * cos_lat * dlon.sin() + self.false_easting;
        let y = ksp * (self.cos_lat_o * sin_lat - self.sin_lat_o * cos_lat * cos_lon)
            + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let rh = (x * x + y * y).sqrt();
        let temp = rh / (2.0 * self.r);
        if temp > 1.0 {
            return Err(ProjError::OutsideDomain(
                "point beyond the bounding circle".into(),
            ));
        }
        let z = 2.0 * asinz(temp);
        let sin_z = z.sin();
        let cos_z = z.cos();
        if rh.abs() <= EPSLN {
            return Ok((self.lat_center, self.lon_center));
        }
        let lat = asinz(self.sin_lat_o * cos_z + self.cos_lat_o * sin_z * y / rh);
        let temp = self.lat_center.abs() - HALF_PI;
        let lon = if temp.abs() > EPSLN {
            let temp = cos_z - self.sin_lat_o * lat.sin();
            if temp != 0.0 {
                adjust_lon(
                    self.lon_center + (x * sin_z * self.cos_lat_o).atan2(temp * rh),
                )
            } else {
                self.lon_center
            }
        } else if self.lat_center < 0.0 {
            adjust_lon(self.lon_center - (-x).atan2(y))
        } else {
            adjust_lon(self.lon_center + x.atan2(-y))
        };
        Ok((lat, lon))
    }

    fn datum(&self) -> &Arc<Datum> {
        &self.datum
    }

    fn describe(&self) -> String {
        format!(
            "Lambert Azimuthal Equal Area (center {:.4}, {:.4} deg)",
            self.lat_center.to_degrees(),
            self.lon_center.to_degrees()
        )
    }

    fn clone_projection(&self) -> Box<dyn Projection> {
        Box::new(self.clone())
    }
}
