//! Orthographic projection, spherical.
//!
//! Views the sphere from infinity; only the hemisphere facing the
//! projection center is visible. The visible limb is traced at
//! construction for consumers that need the projection boundary.

use std::sync::Arc;

use log::debug;

use crate::datum::Datum;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, asinz, EPSLN, HALF_PI, TWO_PI};
use crate::proj::Projection;

/// Number of points in the traced limb circle.
const BOUNDARY_POINTS: usize = 720;

#[derive(Clone)]
pub struct OrthographicProjection {
    datum: Arc<Datum>,
    r_major: f64,
    lon_center: f64,
    lat_center: f64,
    sin_p14: f64,
    cos_p14: f64,
    false_easting: f64,
    false_northing: f64,
    boundary: Vec<(f64, f64)>,
}

impl OrthographicProjection {
    /// Creates an orthographic projection centered at
    /// (`lat_center`, `lon_center`) in radians.
    pub fn new(
        datum: Arc<Datum>,
        lon_center: f64,
        lat_center: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let r_major = datum.axis();
        debug!(
            "Orthographic: r={}, center=({}, {})",
            r_major, lat_center, lon_center
        );
        let mut proj = Self {
            datum,
            r_major,
            lon_center,
            lat_center,
            sin_p14: lat_center.sin(),
            cos_p14: lat_center.cos(),
            false_easting,
            false_northing,
            boundary: Vec::new(),
        };
        proj.boundary = proj.trace_limb();
        proj
    }

    /// Geodetic (lat, lon) points in radians tracing the visible limb.
    pub fn boundary(&self) -> &[(f64, f64)] {
        &self.boundary
    }

    fn trace_limb(&self) -> Vec<(f64, f64)> {
        let r_max = (self.r_major + 0.0000001) * (1.0 - EPSLN);
        let mut points = Vec::with_capacity(BOUNDARY_POINTS);
        for i in 0..BOUNDARY_POINTS {
            let angle = TWO_PI * i as f64 / BOUNDARY_POINTS as f64;
            let x = self.false_easting + r_max * angle.cos();
            let y = self.false_northing + r_max * angle.sin();
            if let Ok(point) = self.inverse(x, y) {
                points.push(point);
            }
        }
        points
    }
}

impl Projection for OrthographicProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        let sinphi = lat.sin();
        let cosphi = lat.cos();
        let dlon = adjust_lon(lon - self.lon_center);
        let coslon = dlon.cos();
        let g = self.sin_p14 * sinphi + self.cos_p14 * cosphi * coslon;
        if g > 0.0 || g.abs() <= EPSLN {
            let x = self.false_easting + self.r_major * cosphi * dlon.sin();
            let y = self.false_northing
                + self.r_major * (self.cos_p14 * sinphi - self.sin_p14 * cosphi * coslon);
            Ok((x, y))
        } else {
            Err(ProjError::OutsideDomain(
                "point on the far hemisphere".into(),
            ))
        }
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let rh = (x * x + y * y).sqrt();
        if rh > self.r_major + 0.0000001 {
            return Err(ProjError::OutsideDomain(
                "point beyond the limb circle".into(),
            ));
        }
        let z = asinz(rh / self.r_major);
        let sinz = z.sin();
        let cosz = z.cos();
        if rh.abs() <= EPSLN {
            return Ok((self.lat_center, self.lon_center));
        }
        let lat = asinz(cosz * self.sin_p14 + (y * sinz * self.cos_p14) / rh);
        let con = self.lat_center.abs() - HALF_PI;
        let lon = if con.abs() <= EPSLN {
            if self.lat_center >= 0.0 {
                adjust_lon(self.lon_center + x.atan2(-y))
            } else {
                adjust_lon(self.lon_center - (-x).atan2(y))
            }
        } else {
            let con = cosz - self.sin_p14 * lat.sin();
            if con.abs() >= EPSLN || x.abs() >= EPSLN {
                adjust_lon(
                    self.lon_center + (x * sinz * self.cos_p14).atan2(con * rh),
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
            "Orthographic (center {:.4}, {:.4} deg)",
            self.lat_center.to_degrees(),
            self.lon_center.to_degrees()
        )
    }

    fn clone_projection(&self) -> Box<dyn Projection> {
        Box::new(self.clone())
    }
}
