//! Azimuthal Equidistant projection, spherical.
//!
//! Distances from the center are true: with z the angular distance to
//! the point, the radial scale is k = z/sin(z). The antipode projects
//! onto the circle of radius π·R.

use std::sync::Arc;

use log::debug;

use crate::datum::Datum;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, asinz, EPSLN, HALF_PI};
use crate::proj::Projection;

#[derive(Clone)]
pub struct AzimuthalEquidistantProjection {
    datum: Arc<Datum>,
    r_major: f64,
    lon_center: f64,
    lat_origin: f64,
    sin_p12: f64,
    cos_p12: f64,
    false_easting: f64,
    false_northing: f64,
}

impl AzimuthalEquidistantProjection {
    /// Creates an azimuthal equidistant projection centered at
    /// (`lat_origin`, `lon_center`) in radians.
    pub fn new(
        datum: Arc<Datum>,
        lon_center: f64,
        lat_origin: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let r_major = datum.axis();
        debug!(
            "Azimuthal Equidistant: r={}, center=({}, {})",
            r_major, lat_origin, lon_center
        );
        Self {
            datum,
            r_major,
            lon_center,
            lat_origin,
            sin_p12: lat_origin.sin(),
            cos_p12: lat_origin.cos(),
            false_easting,
            false_northing,
        }
    }
}

impl Projection for AzimuthalEquidistantProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        let sinphi = lat.sin();
        let cosphi = lat.cos();
        let dlon = adjust_lon(lon - self.lon_center);
        let coslon = dlon.cos();
        let g = self.sin_p12 * sinphi + self.cos_p12 * cosphi * coslon;
        let ksp = if (g.abs() - 1.0).abs() < EPSLN {
            if g < 0.0 {
                // The antipode spreads over the whole bounding circle.
                return Err(ProjError::PointAtInfinity);
            }
            1.0
        } else {
            let z = g.acos();
            z / z.sin()
        };
        let x = self.false_easting + self.r_major * ksp * cosphi * dlon.sin();
        let y = self.false_northing
            + self.r_major * ksp * (self.cos_p12 * sinphi - self.sin_p12 * cosphi * coslon);
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let rh = (x * x + y * y).sqrt();
        if rh > 2.0 * HALF_PI * self.r_major {
            return Err(ProjError::OutsideDomain(
                "point beyond the bounding circle".into(),
            ));
        }
        let z = rh / self.r_major;
        let sinz = z.sin();
        let cosz = z.cos();
        if rh.abs() <= EPSLN {
            return Ok((self.lat_origin, self.lon_center));
        }
        let lat = asinz(cosz * self.sin_p12 + (y * sinz * self.cos_p12) / rh);
        let con = self.lat_origin.abs() - HALF_PI;
        let lon = if con.abs() <= EPSLN {
            if self.lat_origin >= 0.0 {
                adjust_lon(self.lon_center + x.atan2(-y))
            } else {
                adjust_lon(self.lon_center - (-x).atan2(y))
            }
        } else {
            let con = cosz - self.sin_p12 * lat.sin();
            if con.abs() >= EPSLN || x.abs() >= EPSLN {
                adjust_lon(
                    self.lon_center + (x * sinz * self.cos_p12).atan2(con * rh),
                )
            } else {
                self.lon_center
            }
        };
        Ok((lat, lon))
    }

    fn datum(&self) -> &Arc<Datum> {
        &self.datum
    }

    fn describe(&self) -> String {
        format!(
            "Azimuthal Equidistant (center {:.4}, {:.4} deg)",
            self.lat_origin.to_degrees(),
            self.lon_center.to_degrees()
        )
    }

    fn clone_projection(&self) -> Box<dyn Projection> {
        Box::new(self.clone())
    }
}
