//! Robinson pseudocylindrical projection, spherical.
//!
//! Uses the original 5-degree lookup tables with Stirling second
//! difference interpolation for the forward direction and an iterative
//! latitude search for the inverse.

use std::f64::consts::PI;
use std::sync::Arc;

use log::debug;

use crate::datum::Datum;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, EPSLN};
use crate::proj::Projection;

const DEG_TO_RAD: f64 = 0.01745329252;

/// Iteration cap for the inverse latitude search.
const INV_MAX_ITER: u32 = 75;

// Parallel length and distance tables at 5 degree steps; index 0 pads
// the Stirling window below the equator.
const PR_TABLE: [f64; 21] = [
    0.0, -0.062, 0.0, 0.062, 0.124, 0.186, 0.248, 0.31, 0.372, 0.434, 0.4958,
    0.5571, 0.6176, 0.6769, 0.7346, 0.7903, 0.8435, 0.8936, 0.9394, 0.9761, 1.0,
];
const XLR_TABLE: [f64; 21] = [
    0.0, 0.9986, 1.0, 0.9986, 0.9954, 0.99, 0.9822, 0.973, 0.96, 0.9427, 0.9216,
    0.8962, 0.8679, 0.835, 0.7986, 0.7597, 0.7186, 0.6732, 0.6213, 0.5722, 0.5322,
];
const XLR_SCALE: f64 = 0.9858;

/// Largest table index usable as the center of a Stirling window.
const MAX_IP1: usize = 17;

fn stirling(table: &[f64; 21], ip1: usize, p2: f64) -> f64 {
    table[ip1 + 2]
        + p2 * (table[ip1 + 3] - table[ip1 + 1]) / 2.0
        + p2 * p2 * (table[ip1 + 3] - 2.0 * table[ip1 + 2] + table[ip1 + 1]) / 2.0
}

#[derive(Clone)]
pub struct RobinsonProjection {
    datum: Arc<Datum>,
    r: f64,
    lon_center: f64,
    false_easting: f64,
    false_northing: f64,
    xlr: [f64; 21],
}

impl RobinsonProjection {
    pub fn new(
        datum: Arc<Datum>,
        lon_center: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let r = datum.axis();
        let mut xlr = XLR_TABLE;
        for v in xlr.iter_mut() {
            *v *= XLR_SCALE;
        }
        debug!("Robinson: r={}, lon_center={}", r, lon_center);
        Self {
            datum,
            r,
            lon_center,
            false_easting,
            false_northing,
            xlr,
        }
    }

    fn northing(&self, y_sign: f64, ip1: usize, p2: f64) -> f64 {
        y_sign * self.r * stirling(&PR_TABLE, ip1, p2) * PI / 2.0
    }
}

impl Projection for RobinsonProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        let dlon = adjust_lon(lon - self.lon_center);
        let mut p2 = (lat / 5.0 / DEG_TO_RAD).abs();
        let ip1 = (p2 - EPSLN) as usize;
        if ip1 > MAX_IP1 {
            return Err(ProjError::OutsideDomain(
                "latitude beyond the pole".into(),
            ));
        }
        p2 -= ip1 as f64;
        let x = self.r * stirling(&self.xlr, ip1, p2) * dlon + self.false_easting;
        let y_sign = if lat >= 0.0 { 1.0 } else { -1.0 };
        let y = self.northing(y_sign, ip1, p2) + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let yy = 2.0 * y / PI / self.r;
        let mut phid = yy * 90.0;
        let mut p2 = (phid / 5.0).abs();
        let mut ip1 = (p2 - EPSLN) as i64;
        if ip1 == 0 {
            ip1 = 1;
        }
        if ip1 > MAX_IP1 as i64 {
            return Err(ProjError::OutsideDomain(
                "northing beyond the pole".into(),
            ));
        }

        // Search downward through the table for a bracketing interval,
        // then refine the latitude until the northing matches.
        let mut iter = 0u32;
        loop {
            let u = PR_TABLE[(ip1 + 3) as usize] - PR_TABLE[(ip1 + 1) as usize];
            let v = PR_TABLE[(ip1 + 3) as usize] - 2.0 * PR_TABLE[(ip1 + 2) as usize]
                + PR_TABLE[(ip1 + 1) as usize];
            let t = 2.0 * (yy.abs() - PR_TABLE[(ip1 + 2) as usize]) / u;
            let c = v / u;
            p2 = t * (1.0 - c * t * (1.0 - 2.0 * c * t));

            if p2 >= 0.0 || ip1 == 1 {
                phid = if y >= 0.0 {
                    (p2 + ip1 as f64) * 5.0
                } else {
                    -(p2 + ip1 as f64) * 5.0
                };
                loop {
                    p2 = (phid / 5.0).abs();
                    ip1 = (p2 - EPSLN) as i64;
                    // An iterate overshooting the pole extrapolates from
                    // the last table window instead of leaving the table.
                    if ip1 > MAX_IP1 as i64 {
                        ip1 = MAX_IP1 as i64;
                    }
                    p2 -= ip1 as f64;
                    let y_sign = if y >= 0.0 { 1.0 } else { -1.0 };
                    let y1 = self.northing(y_sign, ip1 as usize, p2);
                    phid += -180.0 * (y1 - y) / PI / self.r;
                    iter += 1;
                    if iter > INV_MAX_ITER {
                        return Err(ProjError::NonConvergence(
                            "latitude search failed".into(),
                        ));
                    }
                    if (y1 - y).abs() <= 0.00001 {
                        break;
                    }
                }
                break;
            } else {
                ip1 -= 1;
                if ip1 < 0 {
                    return Err(ProjError::OutsideDomain(
                        "point below the latitude table".into(),
                    ));
                }
            }
        }
        let lat = phid * DEG_TO_RAD;

        let x1 = self.r * stirling(&self.xlr, ip1 as usize, p2);
        let lon = adjust_lon(self.lon_center + x / x1);
        Ok((lat, lon))
    }

    fn datum(&self) -> &Arc<Datum> {
        &self.datum
    }

    fn describe(&self) -> String {
        format!(
            "Robinson (central meridian {:.4} deg)",
            self.lon_center.to_degrees()
        )
    }

    fn clone_projection(&self) -> Box<dyn Projection> {
        Box::new(self.clone())
    }
}
