//! General Vertical Near-Side Perspective projection, spherical.
//!
//! Models the view from a satellite at height h above the surface.
//! Only points with cos(c) >= 1/P are visible, where P = 1 + h/R and
//! c is the angular distance from the sub-satellite point. The visible
//! disc boundary is traced at construction.

use std::sync::Arc;

use log::debug;

use crate::datum::Datum;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, asinz, EPSLN, HALF_PI, TWO_PI};
use crate::proj::Projection;

/// Number of points in the traced disc boundary.
const BOUNDARY_POINTS: usize = 720;

#[derive(Clone)]
pub struct NearSidePerspectiveProjection {
    datum: Arc<Datum>,
    r_major: f64,
    /// Distance of the view point from the sphere center, in radii.
    p: f64,
    lon_center: f64,
    lat_center: f64,
    sin_p15: f64,
    cos_p15: f64,
    false_easting: f64,
    false_northing: f64,
    boundary: Vec<(f64, f64)>,
}

impl NearSidePerspectiveProjection {
    /// Creates a near-side perspective projection viewed from `height`
    /// meters above (`lat_center`, `lon_center`), angles in radians.
    pub fn new(
        datum: Arc<Datum>,
        height: f64,
        lon_center: f64,
        lat_center: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Result<Self, ProjError> {
        let r_major = datum.axis();
        if height <= 0.0 {
            return Err(ProjError::InvalidParameter(
                "view height must be positive".into(),
            ));
        }
        let p = 1.0 + height / r_major;
        debug!(
            "Near-Side Perspective: r={}, height={}, center=({}, {})",
            r_major, height, lat_center, lon_center
        );
        let mut proj = Self {
            datum,
            r_major,
            p,
            lon_center,
            lat_center,
            sin_p15: lat_center.sin(),
            cos_p15: lat_center.cos(),
            false_easting,
            false_northing,
            boundary: Vec::new(),
        };
        proj.boundary = proj.trace_disc()?;
        Ok(proj)
    }

    /// Geodetic (lat, lon) points in radians tracing the visible disc.
    pub fn boundary(&self) -> &[(f64, f64)] {
        &self.boundary
    }

    fn trace_disc(&self) -> Result<Vec<(f64, f64)>, ProjError> {
        let r_max =
            self.r_major * ((self.p - 1.0) / (self.p + 1.0)).sqrt() * (1.0 - EPSLN);
        let mut points = Vec::with_capacity(BOUNDARY_POINTS);
        for i in 0..BOUNDARY_POINTS {
            let angle = TWO_PI * i as f64 / BOUNDARY_POINTS as f64;
            let x = self.false_easting + r_max * angle.cos();
            let y = self.false_northing + r_max * angle.sin();
            points.push(self.inverse(x, y)?);
        }
        Ok(points)
    }
}

impl Projection for NearSidePerspectiveProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        let dlon = adjust_lon(lon - self.lon_center);
        let sinphi = lat.sin();
        let cosphi = lat.cos();
        let coslon = dlon.cos();
        let g = self.sin_p15 * sinphi + self.cos_p15 * cosphi * coslon;
        if g < 1.0 / self.p {
            return Err(ProjError::OutsideDomain(
                "point not visible from the view point".into(),
            ));
        }
        let ksp = (self.p - 1.0) / (self.p - g);
        let x = self.false_easting + self.r_major * ksp * cosphi * dlon.sin();
        let y = self.false_northing
            + self.r_major * ksp * (self.cos_p15 * sinphi - self.sin_p15 * cosphi * coslon);
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let rh = (x * x + y * y).sqrt();
        let r = rh / self.r_major;
        let con = (self.p - 1.0) / (self.p + 1.0);
        if r * r > con {
            return Err(ProjError::OutsideDomain(
                "point beyond the visible disc".into(),
            ));
        }
        if rh.abs() <= EPSLN {
            return Ok((self.lat_center, self.lon_center));
        }
        let con = self.p - 1.0;
        let com = self.p + 1.0;
        let sinz = (self.p - (1.0 - r * r * com / con).sqrt())
            / (con / r + r / con);
        let z = asinz(sinz);
        let sinz = z.sin();
        let cosz = z.cos();
        let lat = asinz(cosz * self.sin_p15 + (y * sinz * self.cos_p15) / rh);
        let con = cosz - self.sin_p15 * lat.sin();
        let lon = if con.abs() >= EPSLN || x.abs() >= EPSLN {
            adjust_lon(self.lon_center + (x * sinz * self.cos_p15).atan2(con * rh))
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
            "Near-Side Perspective (center {:.4}, {:.4} deg, height {:.0} m)",
            self.lat_center.to_degrees(),
            self.lon_center.to_degrees(),
            (self.p - 1.0) * self.r_major
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

    const GEO_HEIGHT: f64 = 35786000.0;

    fn geo_proj(lat_deg: f64, lon_deg: f64) -> NearSidePerspectiveProjection {
        let datum = DatumFactory::new().create(SPHERE).unwrap();
        NearSidePerspectiveProjection::new(
            datum,
            GEO_HEIGHT,
            lon_deg.to_radians(),
            lat_deg.to_radians(),
            0.0,
            0.0,
        )
        .unwrap()
    }

    #[test]
    fn test_center_maps_to_origin() {
        let proj = geo_proj(0.0, -75.0);
        let (x, y) = proj.forward(0.0, (-75.0f64).to_radians()).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_round_trip() {
        let proj = geo_proj(0.0, -75.0);
        for &(lat_deg, lon_deg) in
            &[(0.0, -75.0), (30.0, -60.0), (-45.0, -100.0), (60.0, -75.0)]
        {
            let lat = (lat_deg as f64).to_radians();
            let lon = (lon_deg as f64).to_radians();
            let (x, y) = proj.forward(lat, lon).unwrap();
            let (lat2, lon2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lat2, lat, epsilon = 1e-8);
            assert_relative_eq!(lon2, lon, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_far_side_fails() {
        let proj = geo_proj(0.0, -75.0);
        assert!(proj.forward(0.0, 105.0f64.to_radians()).is_err());
        // From geostationary height the horizon sits about 81 degrees
        // from the sub-satellite point.
        assert!(proj.forward(0.0, 10.0f64.to_radians()).is_err());
        assert!(proj.forward(0.0, (-70.0f64).to_radians()).is_ok());
    }

    #[test]
    fn test_boundary_traced() {
        let proj = geo_proj(0.0, 0.0);
        assert_eq!(proj.boundary().len(), BOUNDARY_POINTS);
        // Every boundary point sits at the horizon angular distance,
        // cos(c) = 1/P.
        for &(lat, lon) in proj.boundary().iter().step_by(90) {
            let g = proj.sin_p15 * lat.sin()
                + proj.cos_p15 * lat.cos() * (lon - proj.lon_center).cos();
            assert_relative_eq!(g, 1.0 / proj.p, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_zero_height_rejected() {
        let datum = DatumFactory::new().create(SPHERE).unwrap();
        assert!(
            NearSidePerspectiveProjection::new(datum, 0.0, 0.0, 0.0, 0.0, 0.0)
                .is_err()
        );
    }
}
