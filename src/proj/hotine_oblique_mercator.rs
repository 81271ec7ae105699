//! Hotine Oblique Mercator projection, ellipsoidal.
//!
//! The cylinder is tangent along an oblique great-circle-like central
//! line, given either by an azimuth through the projection center or
//! by two points on the line. Coordinates are computed in the oblique
//! (u, v) frame and rotated by the central line azimuth.

use std::f64::consts::PI;
use std::sync::Arc;

use log::debug;

use crate::datum::Datum;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, asinz, phi2z, sign, tsfnz, EPSLN, HALF_PI};
use crate::proj::Projection;

#[derive(Clone)]
pub struct HotineObliqueMercatorProjection {
    datum: Arc<Datum>,
    e: f64,
    lon_origin: f64,
    lat_origin: f64,
    azimuth: f64,
    bl: f64,
    al: f64,
    el: f64,
    singam: f64,
    cosgam: f64,
    sinaz: f64,
    cosaz: f64,
    false_easting: f64,
    false_northing: f64,
}

struct CommonTerms {
    e: f64,
    bl: f64,
    al: f64,
    el: f64,
    d: f64,
    g: f64,
}

fn common_terms(datum: &Datum, scale_factor: f64, lat_origin: f64) -> CommonTerms {
    let es = datum.e2();
    let e = es.sqrt();
    let sinphi = lat_origin.sin();
    let con = 1.0 - es * sinphi * sinphi;
    let com = (1.0 - es).sqrt();
    let cosphi = lat_origin.cos();
    let bl = (1.0 + es * cosphi.powi(4) / (1.0 - es)).sqrt();
    let al = datum.axis() * bl * scale_factor * com / con;
    let (d, f, el) = if lat_origin.abs() < EPSLN {
        (1.0, 1.0, 1.0)
    } else {
        let ts = tsfnz(e, lat_origin, sinphi);
        let con = con.sqrt();
        let d = bl * com / (cosphi * con);
        let f = if d * d - 1.0 > 0.0 {
            d + sign(lat_origin) * (d * d - 1.0).sqrt()
        } else {
            d
        };
        (d, f, f * ts.powf(bl))
    };
    CommonTerms {
        e,
        bl,
        al,
        el,
        d,
        g: 0.5 * (f - 1.0 / f),
    }
}

impl HotineObliqueMercatorProjection {
    /// Creates the projection from an azimuth of the central line
    /// through the projection center. Angles in radians.
    pub fn with_azimuth(
        datum: Arc<Datum>,
        scale_factor: f64,
        azimuth: f64,
        lon_center: f64,
        lat_origin: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Result<Self, ProjError> {
        let t = common_terms(&datum, scale_factor, lat_origin);
        let gama = asinz(azimuth.sin() / t.d);
        let lon_origin = lon_center - asinz(t.g * gama.tan()) / t.bl;
        debug!(
            "Hotine Oblique Mercator (azimuth form): k0={}, azimuth={}, center=({}, {})",
            scale_factor, azimuth, lat_origin, lon_center
        );
        Ok(Self::assemble(
            datum,
            t,
            lon_origin,
            lat_origin,
            azimuth,
            gama,
            false_easting,
            false_northing,
        ))
    }

    /// Creates the projection from two points on the central line.
    /// Angles in radians.
    #[allow(clippy::too_many_arguments)]
    pub fn with_two_points(
        datum: Arc<Datum>,
        scale_factor: f64,
        lat_origin: f64,
        lon1: f64,
        lat1: f64,
        lon2: f64,
        lat2: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Result<Self, ProjError> {
        if (lat1 - lat2).abs() <= EPSLN {
            return Err(ProjError::InvalidParameter(
                "central line points must differ in latitude".into(),
            ));
        }
        let t = common_terms(&datum, scale_factor, lat_origin);
        let ts1 = tsfnz(t.e, lat1, lat1.sin());
        let ts2 = tsfnz(t.e, lat2, lat2.sin());
        let h = ts1.powf(t.bl);
        let l = ts2.powf(t.bl);
        let f = t.el / h;
        let g = 0.5 * (f - 1.0 / f);
        let j = (t.el * t.el - l * h) / (t.el * t.el + l * h);
        let p = (l - h) / (l + h);
        let dlon = adjust_lon(lon1 - lon2);
        let lon1 = adjust_lon(lon1);
        let lon_origin =
            0.5 * (lon1 + lon1 - dlon) - (j * (0.5 * t.bl * dlon).tan() / p).atan() / t.bl;
        let dlon = adjust_lon(lon1 - lon_origin);
        let gama = ((t.bl * dlon).sin() / g).atan();
        let azimuth = asinz(t.d * gama.sin());
        debug!(
            "Hotine Oblique Mercator (two-point form): k0={}, points=({}, {}), ({}, {})",
            scale_factor, lat1, lon1, lat2, lon2
        );
        Ok(Self::assemble(
            datum,
            t,
            lon_origin,
            lat_origin,
            azimuth,
            gama,
            false_easting,
            false_northing,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        datum: Arc<Datum>,
        t: CommonTerms,
        lon_origin: f64,
        lat_origin: f64,
        azimuth: f64,
        gama: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        Self {
            datum,
            e: t.e,
            lon_origin,
            lat_origin,
            azimuth,
            bl: t.bl,
            al: t.al,
            el: t.el,
            singam: gama.sin(),
            cosgam: gama.cos(),
            sinaz: azimuth.sin(),
            cosaz: azimuth.cos(),
            false_easting,
            false_northing,
        }
    }
}

impl Projection for HotineObliqueMercatorProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        let sin_phi = lat.sin();
        let dlon = adjust_lon(lon - self.lon_origin);
        let vl = (self.bl * dlon).sin();
        let (ul, us) = if (lat.abs() - HALF_PI).abs() <= EPSLN {
            (self.singam * sign(lat), self.al * lat / self.bl)
        } else {
            let ts1 = tsfnz(self.e, lat, sin_phi);
            let q = self.el / ts1.powf(self.bl);
            let s = 0.5 * (q - 1.0 / q);
            let t = 0.5 * (q + 1.0 / q);
            let ul = (s * self.singam - vl * self.cosgam) / t;
            let con = (self.bl * dlon).cos();
            let us = if con.abs() < 0.0000001 {
                self.al * self.bl * dlon
            } else {
                let mut us =
                    self.al * ((s * self.cosgam + vl * self.singam) / con).atan() / self.bl;
                if con < 0.0 {
                    us += PI * self.al / self.bl;
                }
                us
            };
            (ul, us)
        };
        if (ul.abs() - 1.0).abs() <= EPSLN {
            return Err(ProjError::PointAtInfinity);
        }
        let vs = 0.5 * self.al * ((1.0 - ul) / (1.0 + ul)).ln() / self.bl;
        let x = self.false_easting + vs * self.cosaz + us * self.sinaz;
        let y = self.false_northing + us * self.cosaz - vs * self.sinaz;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let vs = x * self.cosaz - y * self.sinaz;
        let us = y * self.cosaz + x * self.sinaz;
        let q = (-self.bl * vs / self.al).exp();
        let s = 0.5 * (q - 1.0 / q);
        let t = 0.5 * (q + 1.0 / q);
        let vl = (self.bl * us / self.al).sin();
        let ul = (vl * self.cosgam + s * self.singam) / t;
        if (ul.abs() - 1.0).abs() <= EPSLN {
            let lat = HALF_PI * sign(ul);
            return Ok((lat, self.lon_origin));
        }
        let con = 1.0 / self.bl;
        let ts1 = (self.el / ((1.0 + ul) / (1.0 - ul)).sqrt()).powf(con);
        let lat = phi2z(self.e, ts1)?;
        let con = (self.bl * us / self.al).cos();
        let theta = self.lon_origin
            - (s * self.cosgam - vl * self.singam).atan2(con) / self.bl;
        Ok((lat, adjust_lon(theta)))
    }

    fn datum(&self) -> &Arc<Datum> {
        &self.datum
    }

    fn describe(&self) -> String {
        format!(
            "Hotine Oblique Mercator (azimuth {:.4} deg, origin {:.4}, {:.4} deg)",
            self.azimuth.to_degrees(),
            self.lat_origin.to_degrees(),
            self.lon_origin.to_degrees()
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
    use crate::spheroid::{CLARKE1866, WGS84};
    use approx::assert_relative_eq;

    #[test]
    fn test_azimuth_form_round_trip() {
        // Alaska zone 1 style parameters.
        let datum = DatumFactory::new().create(CLARKE1866).unwrap();
        let proj = HotineObliqueMercatorProjection::with_azimuth(
            datum,
            0.9999,
            (-36.869897645844f64).to_radians(),
            (-133.666666666667f64).to_radians(),
            57.0f64.to_radians(),
            0.0,
            0.0,
        )
        .unwrap();
        for &(lat_deg, lon_deg) in &[(57.0, -133.67), (60.0, -141.0), (55.0, -131.0)] {
            let lat = (lat_deg as f64).to_radians();
            let lon = (lon_deg as f64).to_radians();
            let (x, y) = proj.forward(lat, lon).unwrap();
            let (lat2, lon2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lat2, lat, epsilon = 1e-8);
            assert_relative_eq!(lon2, lon, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_two_point_form_round_trip() {
        let datum = DatumFactory::new().create(WGS84).unwrap();
        let proj = HotineObliqueMercatorProjection::with_two_points(
            datum,
            1.0,
            40.0f64.to_radians(),
            (-100.0f64).to_radians(),
            30.0f64.to_radians(),
            (-80.0f64).to_radians(),
            50.0f64.to_radians(),
            0.0,
            0.0,
        )
        .unwrap();
        for &(lat_deg, lon_deg) in &[(40.0, -90.0), (35.0, -95.0), (45.0, -85.0)] {
            let lat = (lat_deg as f64).to_radians();
            let lon = (lon_deg as f64).to_radians();
            let (x, y) = proj.forward(lat, lon).unwrap();
            let (lat2, lon2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lat2, lat, epsilon = 1e-8);
            assert_relative_eq!(lon2, lon, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_equal_latitudes_rejected() {
        let datum = DatumFactory::new().create(WGS84).unwrap();
        assert!(HotineObliqueMercatorProjection::with_two_points(
            datum,
            1.0,
            40.0f64.to_radians(),
            (-100.0f64).to_radians(),
            30.0f64.to_radians(),
            (-80.0f64).to_radians(),
            30.0f64.to_radians(),
            0.0,
            0.0,
        )
        .is_err());
    }
}
