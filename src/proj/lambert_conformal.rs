//! Lambert Conformal Conic projection with two standard parallels.
//!
//!   cone constant ns = ln(m₁/m₂) / ln(t₁/t₂)
//!   F = m₁ / (ns · t₁^ns),  ρ = a·F·t^ns
//!   forward: x = ρ·sin(ns·Δλ), y = ρ₀ - ρ·cos(ns·Δλ)

use std::sync::Arc;

use log::debug;

use crate::datum::Datum;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, msfnz, phi2z, tsfnz, EPSLN, HALF_PI};
use crate::proj::Projection;

#[derive(Clone)]
pub struct LambertConformalConicProjection {
    datum: Arc<Datum>,
    r_major: f64,
    e: f64,
    center_lon: f64,
    lat1: f64,
    lat2: f64,
    ns: f64,
    f0: f64,
    rh: f64,
    false_easting: f64,
    false_northing: f64,
}

impl LambertConformalConicProjection {
    /// Creates a Lambert Conformal Conic projection. All angles are in
    /// radians; `lat1` and `lat2` are the standard parallels, `lat_origin`
    /// the latitude of the projection origin.
    pub fn new(
        datum: Arc<Datum>,
        lat1: f64,
        lat2: f64,
        center_lon: f64,
        lat_origin: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Result<Self, ProjError> {
        if (lat1 + lat2).abs() < EPSLN {
            return Err(ProjError::InvalidParameter(
                "equal latitudes for standard parallels on opposite sides of equator"
                    .into(),
            ));
        }
        let r_major = datum.axis();
        let es = datum.e2();
        let e = es.sqrt();

        let sin_po = lat1.sin();
        let cos_po = lat1.cos();
        let ms1 = msfnz(e, sin_po, cos_po);
        let ts1 = tsfnz(e, lat1, sin_po);

        let sin_po = lat2.sin();
        let cos_po = lat2.cos();
        let ms2 = msfnz(e, sin_po, cos_po);
        let ts2 = tsfnz(e, lat2, sin_po);

        let ts0 = tsfnz(e, lat_origin, lat_origin.sin());

        let ns = if (lat1 - lat2).abs() > EPSLN {
            (ms1.ln() - ms2.ln()) / (ts1.ln() - ts2.ln())
        } else {
            lat1.sin()
        };
        let f0 = ms1 / (ns * ts1.powf(ns));
        let rh = r_major * f0 * ts0.powf(ns);
        debug!(
            "Lambert Conformal Conic: a={}, parallels=({}, {}), origin=({}, {})",
            r_major, lat1, lat2, center_lon, lat_origin
        );
        Ok(Self {
            datum,
            r_major,
            e,
            center_lon,
            lat1,
            lat2,
            ns,
            f0,
            rh,
            false_easting,
            false_northing,
        })
    }
}

impl Projection for LambertConformalConicProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        let con = (lat.abs() - HALF_PI).abs();
        let rh1 = if con > EPSLN {
            let ts = tsfnz(self.e, lat, lat.sin());
            self.r_major * self.f0 * ts.powf(self.ns)
        } else {
            // At a pole, only the pole the cone opens toward projects.
            if lat * self.ns <= 0.0 {
                return Err(ProjError::OutsideDomain(
                    "point at the pole away from the cone apex".into(),
                ));
            }
            0.0
        };
        let theta = self.ns * adjust_lon(lon - self.center_lon);
        let x = rh1 * theta.sin() + self.false_easting;
        let y = self.rh - rh1 * theta.cos() + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = self.rh - (y - self.false_northing);
        let (rh1, con) = if self.ns > 0.0 {
            ((x * x + y * y).sqrt(), 1.0)
        } else {
            (-(x * x + y * y).sqrt(), -1.0)
        };
        let theta = if rh1 != 0.0 {
            (con * x).atan2(con * y)
        } else {
            0.0
        };
        let lat = if rh1 != 0.0 || self.ns > 0.0 {
            let ts = (rh1 / (self.r_major * self.f0)).powf(1.0 / self.ns);
            phi2z(self.e, ts)?
        } else {
            -HALF_PI
        };
        let lon = adjust_lon(theta / self.ns + self.center_lon);
        Ok((lat, lon))
    }

    fn datum(&self) -> &Arc<Datum> {
        &self.datum
    }

    fn describe(&self) -> String {
        format!(
            "Lambert Conformal Conic (standard parallels {:.4}, {:.4} deg)",
            self.lat1.to_degrees(),
            self.lat2.to_degrees()
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

    fn conus(datum: Arc<Datum>) -> LambertConformalConicProjection {
        LambertConformalConicProjection::new(
            datum,
            33.0f64.to_radians(),
            45.0f64.to_radians(),
            (-96.0f64).to_radians(),
            39.0f64.to_radians(),
            0.0,
            0.0,
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_parallels() {
        let datum = DatumFactory::new().create(WGS84).unwrap();
        let result = LambertConformalConicProjection::new(
            datum,
            30.0f64.to_radians(),
            (-30.0f64).to_radians(),
            0.0,
            0.0,
            0.0,
            0.0,
        );
        assert!(matches!(result, Err(ProjError::InvalidParameter(_))));
    }

    #[test]
    fn test_origin_maps_to_false_origin() {
        let datum = DatumFactory::new().create(WGS84).unwrap();
        let proj = conus(datum);
        let (x, y) = proj
            .forward(39.0f64.to_radians(), (-96.0f64).to_radians())
            .unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_round_trip() {
        let datum = DatumFactory::new().create(CLARKE1866).unwrap();
        let proj = conus(datum);
        for &(lat_deg, lon_deg) in
            &[(39.0, -96.0), (40.7, -74.0), (34.0, -118.2), (25.8, -80.2)]
        {
            let lat = (lat_deg as f64).to_radians();
            let lon = (lon_deg as f64).to_radians();
            let (x, y) = proj.forward(lat, lon).unwrap();
            let (lat2, lon2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lat2, lat, epsilon = 1e-9);
            assert_relative_eq!(lon2, lon, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_opposite_pole_fails() {
        let datum = DatumFactory::new().create(WGS84).unwrap();
        let proj = conus(datum);
        // The cone opens north; the south pole cannot be projected.
        assert!(proj.forward(-HALF_PI, 0.0).is_err());
        assert!(proj.forward(HALF_PI, 0.0).is_ok());
    }
}
