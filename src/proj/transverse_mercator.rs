//! Transverse Mercator projection.
//!
//! Ellipsoidal forward/inverse use the classic fourth-order series in
//! the second eccentricity; the inverse recovers the footpoint latitude
//! iteratively from the meridian distance. A near-zero eccentricity
//! switches both directions to the closed spherical forms.

use std::sync::Arc;

use log::debug;

use crate::datum::Datum;
use crate::error::ProjError;
use crate::proj::common::{
    adjust_lon, asinz, e0fn, e1fn, e2fn, e3fn, mlfn, sign, EPSLN, HALF_PI,
};
use crate::proj::Projection;

/// Iteration cap for the footpoint latitude recovery.
const FOOTPOINT_MAX_ITER: u32 = 6;

#[derive(Clone)]
pub struct TransverseMercatorProjection {
    datum: Arc<Datum>,
    r_major: f64,
    es: f64,
    esp: f64,
    scale_factor: f64,
    lon_center: f64,
    lat_origin: f64,
    false_easting: f64,
    false_northing: f64,
    e0: f64,
    e1: f64,
    e2: f64,
    e3: f64,
    ml0: f64,
    spherical: bool,
}

impl TransverseMercatorProjection {
    /// Creates a Transverse Mercator projection. Angles are radians.
    pub fn new(
        datum: Arc<Datum>,
        scale_factor: f64,
        lon_center: f64,
        lat_origin: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let r_major = datum.axis();
        let es = datum.e2();
        let e0 = e0fn(es);
        let e1 = e1fn(es);
        let e2 = e2fn(es);
        let e3 = e3fn(es);
        let ml0 = r_major * mlfn(e0, e1, e2, e3, lat_origin);
        let esp = es / (1.0 - es);
        let spherical = es < 0.00001;
        debug!(
            "Transverse Mercator: a={}, es={}, k0={}, lon_center={}, lat_origin={}",
            r_major, es, scale_factor, lon_center, lat_origin
        );
        Self {
            datum,
            r_major,
            es,
            esp,
            scale_factor,
            lon_center,
            lat_origin,
            false_easting,
            false_northing,
            e0,
            e1,
            e2,
            e3,
            ml0,
            spherical,
        }
    }
}

impl Projection for TransverseMercatorProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        let delta_lon = adjust_lon(lon - self.lon_center);
        let sin_phi = lat.sin();
        let cos_phi = lat.cos();

        if self.spherical {
            let b = cos_phi * delta_lon.sin();
            if (b.abs() - 1.0).abs() < EPSLN {
                return Err(ProjError::PointAtInfinity);
            }
            let x = 0.5 * self.r_major * self.scale_factor * ((1.0 + b) / (1.0 - b)).ln()
                + self.false_easting;
            let mut con = (cos_phi * delta_lon.cos() / (1.0 - b * b).sqrt()).acos();
            if lat < 0.0 {
                con = -con;
            }
            let y = self.r_major * self.scale_factor * (con - self.lat_origin)
                + self.false_northing;
            return Ok((x, y));
        }

        let al = cos_phi * delta_lon;
        let als = al * al;
        let c = self.esp * cos_phi * cos_phi;
        let tq = lat.tan();
        let t = tq * tq;
        let con = 1.0 - self.es * sin_phi * sin_phi;
        let n = self.r_major / con.sqrt();
        let ml = self.r_major * mlfn(self.e0, self.e1, self.e2, self.e3, lat);

        let x = self.scale_factor
            * n
            * al
            * (1.0
                + als / 6.0
                    * (1.0 - t + c
                        + als / 20.0
                            * (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * self.esp)))
            + self.false_easting;
        let y = self.scale_factor
            * (ml - self.ml0
                + n * tq
                    * (als
                        * (0.5
                            + als / 24.0
                                * (5.0 - t + 9.0 * c + 4.0 * c * c
                                    + als / 30.0
                                        * (61.0 - 58.0 * t + t * t + 600.0 * c
                                            - 330.0 * self.esp)))))
            + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;

        if self.spherical {
            let f = (x / (self.r_major * self.scale_factor)).exp();
            let g = 0.5 * (f - 1.0 / f);
            let temp = self.lat_origin + y / (self.r_major * self.scale_factor);
            let h = temp.cos();
            let con = ((1.0 - h * h) / (1.0 + g * g)).sqrt();
            let mut lat = asinz(con);
            if temp < 0.0 {
                lat = -lat;
            }
            let lon = if g == 0.0 && h == 0.0 {
                self.lon_center
            } else {
                adjust_lon(g.atan2(h) + self.lon_center)
            };
            return Ok((lat, lon));
        }

        let con = (self.ml0 + y / self.scale_factor) / self.r_major;
        let mut phi = con;
        let mut converged = false;
        for _ in 0..FOOTPOINT_MAX_ITER {
            let delta_phi = (con + self.e1 * (2.0 * phi).sin()
                - self.e2 * (4.0 * phi).sin()
                + self.e3 * (6.0 * phi).sin())
                / self.e0
                - phi;
            phi += delta_phi;
            if delta_phi.abs() <= EPSLN {
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(ProjError::NonConvergence(
                "footpoint latitude recovery failed".into(),
            ));
        }

        if phi.abs() < HALF_PI {
            let sin_phi = phi.sin();
            let cos_phi = phi.cos();
            let tan_phi = phi.tan();
            let c = self.esp * cos_phi * cos_phi;
            let cs = c * c;
            let t = tan_phi * tan_phi;
            let ts = t * t;
            let con = 1.0 - self.es * sin_phi * sin_phi;
            let n = self.r_major / con.sqrt();
            let r = n * (1.0 - self.es) / con;
            let d = x / (n * self.scale_factor);
            let ds = d * d;

            let lat = phi
                - (n * tan_phi * ds / r)
                    * (0.5
                        - ds / 24.0
                            * (5.0 + 3.0 * t + 10.0 * c - 4.0 * cs - 9.0 * self.esp
                                - ds / 30.0
                                    * (61.0 + 90.0 * t + 298.0 * c + 45.0 * ts
                                        - 252.0 * self.esp
                                        - 3.0 * cs)));
            let lon = adjust_lon(
                self.lon_center
                    + d * (1.0
                        - ds / 6.0
                            * (1.0 + 2.0 * t + c
                                - ds / 20.0
                                    * (5.0 - 2.0 * c + 28.0 * t - 3.0 * cs
                                        + 8.0 * self.esp
                                        + 24.0 * ts)))
                        / cos_phi,
            );
            Ok((lat, lon))
        } else {
            Ok((HALF_PI * sign(y), self.lon_center))
        }
    }

    fn datum(&self) -> &Arc<Datum> {
        &self.datum
    }

    fn describe(&self) -> String {
        format!(
            "Transverse Mercator (central meridian {:.4} deg, origin {:.4} deg, k0 {})",
            self.lon_center.to_degrees(),
            self.lat_origin.to_degrees(),
            self.scale_factor
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
    use crate::spheroid::{SPHERE, WGS84};
    use approx::assert_relative_eq;

    #[test]
    fn test_round_trip_ellipsoidal() {
        let datum = DatumFactory::new().create(WGS84).unwrap();
        let proj = TransverseMercatorProjection::new(
            datum,
            0.9996,
            (-75.0f64).to_radians(),
            0.0,
            500000.0,
            0.0,
        );
        for &(lat_deg, lon_deg) in &[
            (0.0, -75.0),
            (40.7, -74.0),
            (-33.9, -72.0),
            (64.0, -78.0),
        ] {
            let lat = (lat_deg as f64).to_radians();
            let lon = (lon_deg as f64).to_radians();
            let (x, y) = proj.forward(lat, lon).unwrap();
            let (lat2, lon2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lat2, lat, epsilon = 1e-9);
            assert_relative_eq!(lon2, lon, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_central_meridian_maps_to_false_easting() {
        let datum = DatumFactory::new().create(WGS84).unwrap();
        let proj = TransverseMercatorProjection::new(
            datum,
            0.9996,
            (-75.0f64).to_radians(),
            0.0,
            500000.0,
            0.0,
        );
        let (x, y) = proj
            .forward(45.0f64.to_radians(), (-75.0f64).to_radians())
            .unwrap();
        assert_relative_eq!(x, 500000.0, epsilon = 1e-6);
        // Meridian distance to 45N, scaled by k0.
        assert!(y > 4.97e6 && y < 4.99e6, "y = {y}");
    }

    #[test]
    fn test_round_trip_spherical() {
        let datum = DatumFactory::new().create(SPHERE).unwrap();
        let proj =
            TransverseMercatorProjection::new(datum, 1.0, 0.0, 0.0, 0.0, 0.0);
        let lat = 30.0f64.to_radians();
        let lon = 12.0f64.to_radians();
        let (x, y) = proj.forward(lat, lon).unwrap();
        let (lat2, lon2) = proj.inverse(x, y).unwrap();
        assert_relative_eq!(lat2, lat, epsilon = 1e-9);
        assert_relative_eq!(lon2, lon, epsilon = 1e-9);
    }

    #[test]
    fn test_point_at_infinity_spherical() {
        let datum = DatumFactory::new().create(SPHERE).unwrap();
        let proj =
            TransverseMercatorProjection::new(datum, 1.0, 0.0, 0.0, 0.0, 0.0);
        // 90 degrees away along the equator projects to infinity.
        assert!(proj.forward(0.0, HALF_PI).is_err());
    }
}
