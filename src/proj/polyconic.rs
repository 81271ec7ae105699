//! Polyconic projection, ellipsoidal.
//!
//! Each parallel is the arc of a nonconcentric cone tangent along it.
//! The central meridian is true to scale; latitude is recovered in the
//! inverse by the phi4z iteration.

use std::sync::Arc;

use log::debug;

use crate::datum::Datum;
use crate::error::ProjError;
use crate::proj::common::{
    adjust_lon, asinz, e0fn, e1fn, e2fn, e3fn, mlfn, msfnz, phi4z,
};
use crate::proj::Projection;

#[derive(Clone)]
pub struct PolyconicProjection {
    datum: Arc<Datum>,
    r_major: f64,
    e: f64,
    es: f64,
    e0: f64,
    e1: f64,
    e2: f64,
    e3: f64,
    lon_center: f64,
    lat_origin: f64,
    ml0: f64,
    false_easting: f64,
    false_northing: f64,
}

impl PolyconicProjection {
    /// Creates a polyconic projection with the given center in radians.
    pub fn new(
        datum: Arc<Datum>,
        lon_center: f64,
        lat_origin: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let r_major = datum.axis();
        let es = datum.e2();
        let e = es.sqrt();
        let e0 = e0fn(es);
        let e1 = e1fn(es);
        let e2 = e2fn(es);
        let e3 = e3fn(es);
        let ml0 = mlfn(e0, e1, e2, e3, lat_origin);
        debug!(
            "Polyconic: a={}, center=({}, {})",
            r_major, lat_origin, lon_center
        );
        Self {
            datum,
            r_major,
            e,
            es,
            e0,
            e1,
            e2,
            e3,
            lon_center,
            lat_origin,
            ml0,
            false_easting,
            false_northing,
        }
    }
}

impl Projection for PolyconicProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        let con = adjust_lon(lon - self.lon_center);
        if lat.abs() <= 0.0000001 {
            let x = self.false_easting + self.r_major * con;
            let y = self.false_northing - self.r_major * self.ml0;
            Ok((x, y))
        } else {
            let sinphi = lat.sin();
            let cosphi = lat.cos();
            let ml = mlfn(self.e0, self.e1, self.e2, self.e3, lat);
            let ms = msfnz(self.e, sinphi, cosphi);
            let con = con * sinphi;
            let x = self.false_easting + self.r_major * ms * con.sin() / sinphi;
            let y = self.false_northing
                + self.r_major * (ml - self.ml0 + ms * (1.0 - con.cos()) / sinphi);
            Ok((x, y))
        }
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = y - self.false_northing;
        let al = self.ml0 + y / self.r_major;
        if al.abs() <= 0.0000001 {
            let lon = x / self.r_major + self.lon_center;
            Ok((0.0, lon))
        } else {
            let b = al * al + (x / self.r_major) * (x / self.r_major);
            let (lat, c) =
                phi4z(self.es, self.e0, self.e1, self.e2, self.e3, al, b)?;
            let lon =
                adjust_lon(asinz(x * c / self.r_major) / lat.sin() + self.lon_center);
            Ok((lat, lon))
        }
    }

    fn datum(&self) -> &Arc<Datum> {
        &self.datum
    }

    fn describe(&self) -> String {
        format!(
            "Polyconic (center {:.4}, {:.4} deg)",
            self.lat_origin.to_degrees(),
            self.lon_center.to_degrees()
        )
    }

    fn clone_projection(&self) -> Box<dyn Projection> {
        Box::new(self.clone())
    }
}
