//! Equidistant Conic projection, with one or two standard parallels.
//!
//!   ns = (m₁ - m₂)/(M₂ - M₁) with M the meridian distance, or sinφ₁
//!   G = M₁ + m₁/ns,  ρ = a·(G - M)
//!
//! The inverse recovers latitude from the meridian distance with phi3z.

use std::sync::Arc;

use log::debug;

use crate::datum::Datum;
use crate::error::ProjError;
use crate::proj::common::{
    adjust_lon, e0fn, e1fn, e2fn, e3fn, mlfn, msfnz, phi3z, EPSLN,
};
use crate::proj::Projection;

#[derive(Clone)]
pub struct EquidistantConicProjection {
    datum: Arc<Datum>,
    r_major: f64,
    e0: f64,
    e1: f64,
    e2: f64,
    e3: f64,
    lon_center: f64,
    lat1: f64,
    lat2: f64,
    ns: f64,
    g: f64,
    rh: f64,
    false_easting: f64,
    false_northing: f64,
}

impl EquidistantConicProjection {
    /// Creates an equidistant conic with one standard parallel.
    pub fn with_one_parallel(
        datum: Arc<Datum>,
        lat1: f64,
        lon_center: f64,
        lat_origin: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Result<Self, ProjError> {
        Self::build(
            datum,
            lat1,
            lat1,
            false,
            lon_center,
            lat_origin,
            false_easting,
            false_northing,
        )
    }

    /// Creates an equidistant conic with two standard parallels.
    pub fn with_two_parallels(
        datum: Arc<Datum>,
        lat1: f64,
        lat2: f64,
        lon_center: f64,
        lat_origin: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Result<Self, ProjError> {
        Self::build(
            datum,
            lat1,
            lat2,
            true,
            lon_center,
            lat_origin,
            false_easting,
            false_northing,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        datum: Arc<Datum>,
        lat1: f64,
        lat2: f64,
        two_parallels: bool,
        lon_center: f64,
        lat_origin: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Result<Self, ProjError> {
        if two_parallels && (lat1 + lat2).abs() < EPSLN {
            return Err(ProjError::InvalidParameter(
                "equal latitudes for standard parallels on opposite sides of equator"
                    .into(),
            ));
        }
        let r_major = datum.axis();
        let es = datum.e2();
        let e = es.sqrt();
        let e0 = e0fn(es);
        let e1 = e1fn(es);
        let e2 = e2fn(es);
        let e3 = e3fn(es);

        let sinphi = lat1.sin();
        let cosphi = lat1.cos();
        let ms1 = msfnz(e, sinphi, cosphi);
        let ml1 = mlfn(e0, e1, e2, e3, lat1);

        let ns = if two_parallels {
            let sinphi = lat2.sin();
            let cosphi = lat2.cos();
            let ms2 = msfnz(e, sinphi, cosphi);
            let ml2 = mlfn(e0, e1, e2, e3, lat2);
            if (lat1 - lat2).abs() >= EPSLN {
                (ms1 - ms2) / (ml2 - ml1)
            } else {
                sinphi
            }
        } else {
            sinphi
        };
        let g = ml1 + ms1 / ns;
        let ml0 = mlfn(e0, e1, e2, e3, lat_origin);
        let rh = r_major * (g - ml0);
        debug!(
            "Equidistant Conic: a={}, parallels=({}, {}), origin=({}, {})",
            r_major, lat1, lat2, lon_center, lat_origin
        );
        Ok(Self {
            datum,
            r_major,
            e0,
            e1,
            e2,
            e3,
            lon_center,
            lat1,
            lat2,
            ns,
            g,
            rh,
            false_easting,
            false_northing,
        })
    }
}

impl Projection for EquidistantConicProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        let ml = mlfn(self.e0, self.e1, self.e2, self.e3, lat);
        let rh1 = self.r_major * (self.g - ml);
        let theta = self.ns * adjust_lon(lon - self.lon_center);
        let x = self.false_easting + rh1 * theta.sin();
        let y = self.false_northing + self.rh - rh1 * theta.cos();
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = x - self.false_easting;
        let y = self.rh - (y - self.false_northing);
        let (rh1, con) = if self.ns >= 0.0 {
            ((x * x + y * y).sqrt(), 1.0)
        } else {
            (-(x * x + y * y).sqrt(), -1.0)
        };
        let theta = if rh1 != 0.0 {
            (con * x).atan2(con * y)
        } else {
            0.0
        };
        let ml = self.g - rh1 / self.r_major;
        let lat = phi3z(ml, self.e0, self.e1, self.e2, self.e3)?;
        let lon = adjust_lon(self.lon_center + theta / self.ns);
        Ok((lat, lon))
    }

    fn datum(&self) -> &Arc<Datum> {
        &self.datum
    }

    fn describe(&self) -> String {
        format!(
            "Equidistant Conic (standard parallels {:.4}, {:.4} deg)",
            self.lat1.to_degrees(),
            self.lat2.to_degrees()
        )
    }

    fn clone_projection(&self) -> Box<dyn Projection> {
        Box::new(self.clone())
    }
}
