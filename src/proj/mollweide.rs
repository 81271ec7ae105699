//! Mollweide equal-area projection, spherical.
//!
//! The auxiliary angle θ solves θ + sinθ = π·sinφ by Newton iteration,
//! then
//!   x = 0.900316316158·R·Δλ·cosθ, y = sqrt(2)·R·sinθ

use std::f64::consts::PI;
use std::sync::Arc;

use log::debug;

use crate::datum::Datum;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, EPSLN, HALF_PI};
use crate::proj::Projection;

/// Newton iteration cap for the auxiliary angle.
const THETA_MAX_ITER: u32 = 50;

#[derive(Clone)]
pub struct MollweideProjection {
    datum: Arc<Datum>,
    r: f64,
    lon_center: f64,
    false_easting: f64,
    false_northing: f64,
}

impl MollweideProjection {
    pub fn new(
        datum: Arc<Datum>,
        lon_center: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let r = datum.axis();
        debug!("Mollweide: r={}, lon_center={}", r, lon_center);
        Self {
            datum,
            r,
            lon_center,
            false_easting,
            false_northing,
        }
    }
}

impl Projection for MollweideProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        let dlon = adjust_lon(lon - self.lon_center);
        let con = PI * lat.sin();
        let mut theta = lat;
        let mut converged = false;
        for _ in 0..THETA_MAX_ITER {
            let delta_theta = -(theta + theta.sin() - con) / (1.0 + theta.cos());
            theta += delta_theta;
            if delta_theta.abs() < EPSLN {
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(ProjError::NonConvergence(
                "auxiliary angle iteration failed".into(),
            ));
        }
        let theta = theta / 2.0;

        // At a pole the auxiliary cosine is not exactly zero; force the
        // meridian offset away instead.
        let dlon = if (HALF_PI - lat.abs()) < EPSLN { 0.0 } else { dlon };
        let x = 0.900316316158 * self.r * dlon * theta.cos() + self.false_easting;
        let y = 1.4142135623731 * self.r * theta.sin() + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;

        let mut arg = y / (1.4142135623731 * self.r);
        if arg.abs() > 0.999999999999 {
            arg = 0.999999999999 * arg.signum();
        }
        let theta = arg.asin();
        let mut lon =
            adjust_lon(self.lon_center + x / (0.900316316158 * self.r * theta.cos()));
        lon = lon.clamp(-PI, PI);
        let mut arg = (2.0 * theta + (2.0 * theta).sin()) / PI;
        if arg.abs() > 1.0 {
            arg = arg.signum();
        }
        let lat = arg.asin();
        Ok((lat, lon))
    }

    fn datum(&self) -> &Arc<Datum> {
        &self.datum
    }

    fn describe(&self) -> String {
        format!(
            "Mollweide (central meridian {:.4} deg)",
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
        let proj = MollweideProjection::new(datum, 0.0, 0.0, 0.0);
        for &(lat_deg, lon_deg) in &[(0.0, 0.0), (40.0, 100.0), (-70.0, -60.0)] {
            let lat = (lat_deg as f64).to_radians();
            let lon = (lon_deg as f64).to_radians();
            let (x, y) = proj.forward(lat, lon).unwrap();
            let (lat2, lon2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lat2, lat, epsilon = 1e-8);
            assert_relative_eq!(lon2, lon, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_pole_collapses_to_point() {
        let datum = DatumFactory::new().create(SPHERE).unwrap();
        let proj = MollweideProjection::new(datum, 0.0, 0.0, 0.0);
        let (x1, y1) = proj.forward(HALF_PI, 0.0).unwrap();
        let (x2, y2) = proj.forward(HALF_PI, 2.0).unwrap();
        assert_relative_eq!(x1, x2, epsilon = 1e-6);
        assert_relative_eq!(y1, y2, epsilon = 1e-6);
        assert_relative_eq!(x1, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_equator_width() {
        // The full equator spans 2 * 0.900316316158 * R * PI.
        let datum = DatumFactory::new().create(SPHERE).unwrap();
        let proj = MollweideProjection::new(datum, 0.0, 0.0, 0.0);
        let (x, y) = proj.forward(0.0, PI).unwrap();
        assert_relative_eq!(x, 0.900316316158 * 6370997.0 * PI, epsilon = 1e-3);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }
}
