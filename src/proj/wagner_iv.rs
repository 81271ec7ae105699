//! Wagner IV pseudocylindrical equal-area projection, spherical.
//!
//! Like Mollweide, an auxiliary angle θ solves θ + sinθ = c·sinφ with
//! c = 2.9604205062, then
//!   x = 0.86310·R·Δλ·cosθ, y = 1.56548·R·sinθ

use std::sync::Arc;

use log::debug;

use crate::datum::Datum;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, asinz, EPSLN};
use crate::proj::Projection;

const THETA_CONST: f64 = 2.9604205062;
const X_CONST: f64 = 0.86310;
const Y_CONST: f64 = 1.56548;

/// Newton iteration cap for the auxiliary angle.
const THETA_MAX_ITER: u32 = 30;

#[derive(Clone)]
pub struct WagnerIVProjection {
    datum: Arc<Datum>,
    r: f64,
    lon_center: f64,
    false_easting: f64,
    false_northing: f64,
}

impl WagnerIVProjection {
    pub fn new(
        datum: Arc<Datum>,
        lon_center: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let r = datum.axis();
        debug!("Wagner IV: r={}, lon_center={}", r, lon_center);
        Self {
            datum,
            r,
            lon_center,
            false_easting,
            false_northing,
        }
    }
}

impl Projection for WagnerIVProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        let dlon = adjust_lon(lon - self.lon_center);
        let con = THETA_CONST * lat.sin();
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
        let x = X_CONST * self.r * dlon * theta.cos() + self.false_easting;
        let y = Y_CONST * self.r * theta.sin() + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let theta = asinz(y / (Y_CONST * self.r));
        let lon = adjust_lon(self.lon_center + x / (X_CONST * self.r * theta.cos()));
        let lat = asinz((2.0 * theta + (2.0 * theta).sin()) / THETA_CONST);
        Ok((lat, lon))
    }

    fn datum(&self) -> &Arc<Datum> {
        &self.datum
    }

    fn describe(&self) -> String {
        format!(
            "Wagner IV (central meridian {:.4} deg)",
            self.lon_center.to_degrees()
        )
    }

    fn clone_projection(&self) -> Box<dyn Projection> {
        Box::new(self.clone())
    }
}
