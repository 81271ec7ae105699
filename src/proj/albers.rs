//! Albers Conical Equal Area projection.
//!
//!   cone constant ns₀ = (m₁² - m₂²)/(q₂ - q₁)
//!   C = m₁² + ns₀·q₁,  ρ = a·sqrt(C - ns₀·q)/ns₀
//!
//! The inverse recovers latitude from authalic q with phi1z.

use std::sync::Arc;

use log::debug;

use crate::datum::Datum;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, asinz, msfnz, phi1z, qsfnz, EPSLN, HALF_PI};
use crate::proj::Projection;

#[derive(Clone)]
pub struct AlbersConicalEqualAreaProjection {
    datum: Arc<Datum>,
    r_major: f64,
    e3: f64,
    es: f64,
    lon_center: f64,
    lat1: f64,
    lat2: f64,
    ns0: f64,
    c: f64,
    rh: f64,
    false_easting: f64,
    false_northing: f64,
}

impl AlbersConicalEqualAreaProjection {
    /// Creates an Albers projection. All angles are radians; `lat1` and
    /// `lat2` are the standard parallels.
    pub fn new(
        datum: Arc<Datum>,
        lat1: f64,
        lat2: f64,
        lon_center: f64,
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
        let e3 = es.sqrt();

        let sin_po = lat1.sin();
        let cos_po = lat1.cos();
        let ms1 = msfnz(e3, sin_po, cos_po);
        let qs1 = qsfnz(e3, sin_po);

        let sin_po = lat2.sin();
        let cos_po = lat2.cos();
        let ms2 = msfnz(e3, sin_po, cos_po);
        let qs2 = qsfnz(e3, sin_po);

        let qs0 = qsfnz(e3, lat_origin.sin());

        let ns0 = if (lat1 - lat2).abs() > EPSLN {
            (ms1 * ms1 - ms2 * ms2) / (qs2 - qs1)
        } else {
            lat1.sin()
        };
        let c = ms1 * ms1 + ns0 * qs1;
        let rh = r_major * (c - ns0 * qs0).sqrt() / ns0;
        debug!(
            "Albers: a={}, parallels=({}, {}), origin=({}, {})",
            r_major, lat1, lat2, lon_center, lat_origin
        );
        Ok(Self {
            datum,
            r_major,
            e3,
            es,
            lon_center,
            lat1,
            lat2,
            ns0,
            c,
            rh,
            false_easting,
            false_northing,
        })
    }
}

impl Projection for AlbersConicalEqualAreaProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        let qs = qsfnz(self.e3, lat.sin());
        let rh1 = self.r_major * (self.c - self.ns0 * qs).sqrt() / self.ns0;
        let theta = self.ns0 * adjust_lon(lon - self.lon_center);
        let x = rh1 * theta.sin() + self.false_easting;
        let y = self.rh - rh1 * theta.cos() + self.false_northing;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = self.rh - (y - self.false_northing);
        let (rh1, con) = if self.ns0 >= 0.0 {
            ((x * x + y * y).sqrt(), 1.0)
        } else {
            (-(x * x + y * y).sqrt(), -1.0)
        };
        let theta = if rh1 != 0.0 {
            (con * x).atan2(con * y)
        } else {
            0.0
        };
        let con = rh1 * self.ns0 / self.r_major;
        let qs = (self.c - con * con) / self.ns0;

        let lat = if self.e3 >= 1.0e-10 {
            let con = 1.0
                - 0.5 * (1.0 - self.es) * ((1.0 - self.e3) / (1.0 + self.e3)).ln()
                    / self.e3;
            if (con.abs() - qs.abs()).abs() > 1.0e-10 {
                phi1z(self.e3, qs)?
            } else if qs >= 0.0 {
                HALF_PI
            } else {
                -HALF_PI
            }
        } else {
            if qs.abs() > 2.0 {
                return Err(ProjError::OutsideDomain(
                    "authalic q out of range".into(),
                ));
            }
            asinz(qs * 0.5)
        };
        let lon = adjust_lon(theta / self.ns0 + self.lon_center);
        Ok((lat, lon))
    }

    fn datum(&self) -> &Arc<Datum> {
        &self.datum
    }

    fn describe(&self) -> String {
        format!(
            "Albers Conical Equal Area (standard parallels {:.4}, {:.4} deg)",
            self.lat1.to_degrees(),
            self.lat2.to_degrees()
        )
    }

    fn clone_projection(&self) -> Box<dyn Projection> {
        Box::new(self.clone())
    }
}
