//! Van der Grinten projection, spherical.
//!
//! Projects the world into a circle of radius π·R. The forward form is
//! the classic circular-arc construction; the inverse solves the
//! resulting cubic in closed form.

use std::f64::consts::PI;
use std::sync::Arc;

use log::debug;

use crate::datum::Datum;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, asinz, EPSLN, HALF_PI};
use crate::proj::Projection;

#[derive(Clone)]
pub struct VanderGrintenProjection {
    datum: Arc<Datum>,
    r: f64,
    lon_center: f64,
    false_easting: f64,
    false_northing: f64,
}

impl VanderGrintenProjection {
    pub fn new(
        datum: Arc<Datum>,
        lon_center: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let r = datum.axis();
        debug!("Van der Grinten: r={}, lon_center={}", r, lon_center);
        Self {
            datum,
            r,
            lon_center,
            false_easting,
            false_northing,
        }
    }
}

impl Projection for VanderGrintenProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        let dlon = adjust_lon(lon - self.lon_center);

        if lat.abs() <= EPSLN {
            return Ok((
                self.false_easting + self.r * dlon,
                self.false_northing,
            ));
        }

        let theta = asinz(2.0 * (lat / PI).abs());

        if dlon.abs() <= EPSLN || (lat.abs() - HALF_PI).abs() <= EPSLN {
            // On the central meridian or at a pole the arcs degenerate.
            let x = self.false_easting;
            let y = if lat >= 0.0 {
                self.false_northing + PI * self.r * (0.5 * theta).tan()
            } else {
                self.false_northing - PI * self.r * (0.5 * theta).tan()
            };
            return Ok((x, y));
        }

        let al = 0.5 * (PI / dlon - dlon / PI).abs();
        let asq = al * al;
        let sinth = theta.sin();
        let costh = theta.cos();
        let g = costh / (sinth + costh - 1.0);
        let gsq = g * g;
        let m = g * (2.0 / sinth - 1.0);
        let msq = m * m;

        let mut con = PI
            * self.r
            * (al * (g - msq)
                + (asq * (g - msq) * (g - msq) - (msq + asq) * (gsq - msq)).sqrt())
            / (msq + asq);
        if dlon < 0.0 {
            con = -con;
        }
        let x = self.false_easting + con;

        let con = (con / (PI * self.r)).abs();
        let y = if lat >= 0.0 {
            self.false_northing + PI * self.r * (1.0 - con * con - 2.0 * al * con).sqrt()
        } else {
            self.false_northing - PI * self.r * (1.0 - con * con - 2.0 * al * con).sqrt()
        };
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;

        let con = PI * self.r;
        let xx = x / con;
        let yy = y / con;
        let xys = xx * xx + yy * yy;
        let c1 = -yy.abs() * (1.0 + xys);
        let c2 = c1 - 2.0 * yy * yy + xx * xx;
        let c3 = -2.0 * c1 + 1.0 + 2.0 * yy * yy + xys * xys;
        let d = yy * yy / c3
            + (2.0 * c2 * c2 * c2 / (c3 * c3 * c3) - 9.0 * c1 * c2 / (c3 * c3)) / 27.0;
        let a1 = (c1 - c2 * c2 / (3.0 * c3)) / c3;
        let m1 = 2.0 * (-a1 / 3.0).sqrt();
        let mut con = (3.0 * d / a1) / m1;
        if con.abs() > 1.0 {
            con = con.signum();
        }
        let th1 = con.acos() / 3.0;
        let lat = if y >= 0.0 {
            (-m1 * (th1 + PI / 3.0).cos() - c2 / (3.0 * c3)) * PI
        } else {
            -(-m1 * (th1 + PI / 3.0).cos() - c2 / (3.0 * c3)) * PI
        };
        let lon = if xx.abs() < EPSLN {
            self.lon_center
        } else {
            adjust_lon(
                self.lon_center
                    + PI
                        * (xys - 1.0
                            + (1.0 + 2.0 * (xx * xx - yy * yy) + xys * xys).sqrt())
                        / (2.0 * xx),
            )
        };
        Ok((lat, lon))
    }

    fn datum(&self) -> &Arc<Datum> {
        &self.datum
    }

    fn describe(&self) -> String {
        format!(
            "Van der Grinten (central meridian {:.4} deg)",
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
    fn test_equator_is_linear() {
        let datum = DatumFactory::new().create(SPHERE).unwrap();
        let proj = VanderGrintenProjection::new(datum, 0.0, 0.0, 0.0);
        let (x, y) = proj.forward(0.0, 1.0).unwrap();
        assert_relative_eq!(x, 6370997.0);
        assert_relative_eq!(y, 0.0);
    }

    #[test]
    fn test_round_trip() {
        let datum = DatumFactory::new().create(SPHERE).unwrap();
        let proj = VanderGrintenProjection::new(datum, 0.0, 0.0, 0.0);
        for &(lat_deg, lon_deg) in
            &[(30.0, 60.0), (-45.0, -120.0), (70.0, 150.0), (-10.0, 5.0)]
        {
            let lat = (lat_deg as f64).to_radians();
            let lon = (lon_deg as f64).to_radians();
            let (x, y) = proj.forward(lat, lon).unwrap();
            let (lat2, lon2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lat2, lat, epsilon = 1e-6);
            assert_relative_eq!(lon2, lon, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_pole_on_circle() {
        // The poles land on the bounding circle of radius PI * R.
        let datum = DatumFactory::new().create(SPHERE).unwrap();
        let proj = VanderGrintenProjection::new(datum, 0.0, 0.0, 0.0);
        let (x, y) = proj.forward(HALF_PI, 0.0).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, PI * 6370997.0, epsilon = 1e-3);
    }
}
