//! Polar Stereographic projection, ellipsoidal.
//!
//! The pole of projection follows the sign of the latitude of true
//! scale. When the latitude of true scale is not at the pole itself the
//! radius is scaled by m_c/t_c so distances are true along that
//! parallel.

use std::sync::Arc;

use log::debug;

use crate::datum::Datum;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, e4fn, msfnz, phi2z, tsfnz, EPSLN, HALF_PI};
use crate::proj::Projection;

#[derive(Clone)]
pub struct PolarStereographicProjection {
    datum: Arc<Datum>,
    r_major: f64,
    e: f64,
    e4: f64,
    lon_center: f64,
    lat_ts: f64,
    /// +1 for a north pole aspect, -1 for south.
    fac: f64,
    /// True when the latitude of true scale is off the pole.
    ind: bool,
    mcs: f64,
    tcs: f64,
    false_easting: f64,
    false_northing: f64,
}

impl PolarStereographicProjection {
    /// Creates a polar stereographic projection. `lat_ts` is the
    /// latitude of true scale in radians; its sign selects the pole.
    pub fn new(
        datum: Arc<Datum>,
        lon_center: f64,
        lat_ts: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let r_major = datum.axis();
        let es = datum.e2();
        let e = es.sqrt();
        let e4 = e4fn(e);
        let fac = if lat_ts < 0.0 { -1.0 } else { 1.0 };
        let ind = (lat_ts.abs() - HALF_PI).abs() > EPSLN;
        let (mcs, tcs) = if ind {
            let con1 = fac * lat_ts;
            let sinphi = con1.sin();
            (msfnz(e, sinphi, con1.cos()), tsfnz(e, con1, sinphi))
        } else {
            (0.0, 0.0)
        };
        debug!(
            "Polar Stereographic: a={}, lon_center={}, lat_ts={}, pole={}",
            r_major,
            lon_center,
            lat_ts,
            if fac > 0.0 { "north" } else { "south" }
        );
        Self {
            datum,
            r_major,
            e,
            e4,
            lon_center,
            lat_ts,
            fac,
            ind,
            mcs,
            tcs,
            false_easting,
            false_northing,
        }
    }
}

impl Projection for PolarStereographicProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        let con1 = self.fac * adjust_lon(lon - self.lon_center);
        let con2 = self.fac * lat;
        let sinphi = con2.sin();
        let ts = tsfnz(self.e, con2, sinphi);
        let rh = if self.ind {
            self.r_major * self.mcs * ts / self.tcs
        } else {
            2.0 * self.r_major * ts / self.e4
        };
        let x = self.false_easting + self.fac * rh * con1.sin();
        let y = self.false_northing - self.fac * rh * con1.cos();
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let x = (x - self.false_easting) * self.fac;
        let y = (y - self.false_northing) * self.fac;
        let rh = (x * x + y * y).sqrt();
        let ts = if self.ind {
            rh * self.tcs / (self.r_major * self.mcs)
        } else {
            rh * self.e4 / (2.0 * self.r_major)
        };
        let lat = self.fac * phi2z(self.e, ts)?;
        let lon = if rh == 0.0 {
            self.fac * self.lon_center
        } else {
            adjust_lon(self.fac * x.atan2(-y) + self.lon_center)
        };
        Ok((lat, lon))
    }

    fn datum(&self) -> &Arc<Datum> {
        &self.datum
    }

    fn describe(&self) -> String {
        format!(
            "Polar Stereographic ({} pole, true scale at {:.4} deg)",
            if self.fac > 0.0 { "north" } else { "south" },
            self.lat_ts.to_degrees()
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
    use crate::spheroid::WGS84;
    use approx::assert_relative_eq;

    #[test]
    fn test_north_round_trip() {
        let datum = DatumFactory::new().create(WGS84).unwrap();
        let proj = PolarStereographicProjection::new(
            datum,
            (-45.0f64).to_radians(),
            70.0f64.to_radians(),
            0.0,
            0.0,
        );
        for &(lat_deg, lon_deg) in &[(75.0, -45.0), (80.0, 10.0), (65.0, -170.0)] {
            let lat = (lat_deg as f64).to_radians();
            let lon = (lon_deg as f64).to_radians();
            let (x, y) = proj.forward(lat, lon).unwrap();
            let (lat2, lon2) = proj.inverse(x, y).unwrap();
            assert_relative_eq!(lat2, lat, epsilon = 1e-8);
            assert_relative_eq!(lon2, lon, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_south_round_trip() {
        let datum = DatumFactory::new().create(WGS84).unwrap();
        let proj = PolarStereographicProjection::new(
            datum,
            0.0,
            (-71.0f64).to_radians(),
            0.0,
            0.0,
        );
        let lat = (-80.0f64).to_radians();
        let lon = 45.0f64.to_radians();
        let (x, y) = proj.forward(lat, lon).unwrap();
        let (lat2, lon2) = proj.inverse(x, y).unwrap();
        assert_relative_eq!(lat2, lat, epsilon = 1e-8);
        assert_relative_eq!(lon2, lon, epsilon = 1e-8);
    }

    #[test]
    fn test_pole_maps_to_origin() {
        let datum = DatumFactory::new().create(WGS84).unwrap();
        let proj = PolarStereographicProjection::new(
            datum,
            0.0,
            90.0f64.to_radians(),
            0.0,
            0.0,
        );
        let (x, y) = proj.forward(HALF_PI, 0.0).unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(y, 0.0, epsilon = 1e-6);
        let (lat, _) = proj.inverse(0.0, 0.0).unwrap();
        assert_relative_eq!(lat, HALF_PI, epsilon = 1e-8);
    }

    #[test]
    fn test_central_meridian_axis() {
        // NSIDC Sea Ice Polar Stereographic North: true scale 70N,
        // central meridian 45W. A point on the central meridian lands
        // on the negative y axis.
        let datum = DatumFactory::new().create(WGS84).unwrap();
        let proj = PolarStereographicProjection::new(
            datum,
            (-45.0f64).to_radians(),
            70.0f64.to_radians(),
            0.0,
            0.0,
        );
        // Due "grid south" along the central meridian.
        let (x, y) = proj
            .forward(70.0f64.to_radians(), (-45.0f64).to_radians())
            .unwrap();
        assert_relative_eq!(x, 0.0, epsilon = 1e-6);
        assert!(y < 0.0);
    }
}
