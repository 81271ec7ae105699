//! Space Oblique Mercator projection, ellipsoidal.
//!
//! Maps the ground track of an orbiting satellite to a continuous,
//! nearly conformal strip. The Fourier coefficients of the transformed
//! coordinate series are integrated numerically at construction using
//! Simpson's rule over a quarter orbit (Snyder's analysis).

use std::f64::consts::PI;
use std::sync::Arc;

use log::debug;

use crate::datum::Datum;
use crate::error::ProjError;
use crate::proj::common::{adjust_lon, HALF_PI};
use crate::proj::Projection;

/// Ratio of a Landsat orbit at which the scene numbering restarts.
const LANDSAT_RATIO: f64 = 0.5201613;

/// Convergence tolerance for the transformed longitude iteration.
const CONV: f64 = 1.0e-7;

#[derive(Clone)]
pub struct SpaceObliqueMercatorProjection {
    datum: Arc<Datum>,
    a: f64,
    es: f64,
    lon_center: f64,
    /// Orbital period as a fraction of a day.
    p21: f64,
    sa: f64,
    ca: f64,
    /// Fourier coefficients of the transformed coordinate series.
    b: f64,
    a2: f64,
    a4: f64,
    c1: f64,
    c3: f64,
    q: f64,
    t: f64,
    u: f64,
    w: f64,
    xj: f64,
    start: f64,
    false_easting: f64,
    false_northing: f64,
}

struct SeriesTerms {
    fb: f64,
    fa2: f64,
    fa4: f64,
    fc1: f64,
    fc3: f64,
}

impl SpaceObliqueMercatorProjection {
    /// Creates the projection from explicit orbit parameters: the
    /// inclination in radians, the longitude of the ascending node at
    /// the equator in radians, the orbital period in minutes, and
    /// whether the transformed coordinates start at the descending
    /// node.
    pub fn from_orbit(
        datum: Arc<Datum>,
        inclination: f64,
        ascending_lon: f64,
        period_minutes: f64,
        start_descending: bool,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        Self::build(
            datum,
            inclination,
            ascending_lon,
            period_minutes / 1440.0,
            if start_descending { 1.0 } else { 0.0 },
            false_easting,
            false_northing,
        )
    }

    /// Creates the projection for a Landsat satellite and path number
    /// using the standard orbit constants.
    pub fn for_landsat(
        datum: Arc<Datum>,
        satellite: i32,
        path: i32,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let (alf, p21, lon_center) = if satellite < 4 {
            (
                99.092f64.to_radians(),
                103.2669323 / 1440.0,
                (128.87 - 360.0 / 251.0 * path as f64).to_radians(),
            )
        } else {
            (
                98.2f64.to_radians(),
                98.8841202 / 1440.0,
                (129.30 - 360.0 / 233.0 * path as f64).to_radians(),
            )
        };
        Self::build(
            datum,
            alf,
            lon_center,
            p21,
            0.0,
            false_easting,
            false_northing,
        )
    }

    fn build(
        datum: Arc<Datum>,
        inclination: f64,
        lon_center: f64,
        p21: f64,
        start: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        let a = datum.axis();
        let es = datum.e2();
        let mut ca = inclination.cos();
        if ca.abs() < 1.0e-9 {
            ca = 1.0e-9;
        }
        let sa = inclination.sin();
        let e2c = es * ca * ca;
        let e2s = es * sa * sa;
        let one_es = 1.0 - es;
        let mut w = (1.0 - e2c) / one_es;
        w = w * w - 1.0;
        let q = e2s / one_es;
        let t = e2s * (2.0 - es) / (one_es * one_es);
        let u = e2c / one_es;
        let xj = one_es * one_es * one_es;
        debug!(
            "Space Oblique Mercator: a={}, inclination={}, ascending lon={}, p21={}",
            a, inclination, lon_center, p21
        );

        let mut proj = Self {
            datum,
            a,
            es,
            lon_center,
            p21,
            sa,
            ca,
            b: 0.0,
            a2: 0.0,
            a4: 0.0,
            c1: 0.0,
            c3: 0.0,
            q,
            t,
            u,
            w,
            xj,
            start,
            false_easting,
            false_northing,
        };

        // Simpson integration of the series terms over 0..90 degrees
        // of transformed longitude, at a 9 degree step.
        let first = proj.series(0.0);
        let mut suma2 = first.fa2;
        let mut suma4 = first.fa4;
        let mut sumb = first.fb;
        let mut sumc1 = first.fc1;
        let mut sumc3 = first.fc3;
        for i in (9..=81).step_by(18) {
            let f = proj.series(i as f64);
            suma2 += 4.0 * f.fa2;
            suma4 += 4.0 * f.fa4;
            sumb += 4.0 * f.fb;
            sumc1 += 4.0 * f.fc1;
            sumc3 += 4.0 * f.fc3;
        }
        for i in (18..=72).step_by(18) {
            let f = proj.series(i as f64);
            suma2 += 2.0 * f.fa2;
            suma4 += 2.0 * f.fa4;
            sumb += 2.0 * f.fb;
            sumc1 += 2.0 * f.fc1;
            sumc3 += 2.0 * f.fc3;
        }
        let last = proj.series(90.0);
        suma2 += last.fa2;
        suma4 += last.fa4;
        sumb += last.fb;
        sumc1 += last.fc1;
        sumc3 += last.fc3;
        proj.a2 = suma2 / 30.0;
        proj.a4 = suma4 / 60.0;
        proj.b = sumb / 30.0;
        proj.c1 = sumc1 / 15.0;
        proj.c3 = sumc3 / 45.0;
        proj
    }

    /// Series terms at the given transformed longitude in degrees.
    fn series(&self, dlam_deg: f64) -> SeriesTerms {
        let dlam = dlam_deg * 0.0174532925;
        let sd = dlam.sin();
        let sdsq = sd * sd;
        let s = self.p21
            * self.sa
            * dlam.cos()
            * ((1.0 + self.t * sdsq)
                / ((1.0 + self.w * sdsq) * (1.0 + self.q * sdsq)))
                .sqrt();
        let h = ((1.0 + self.q * sdsq) / (1.0 + self.w * sdsq)).sqrt()
            * ((1.0 + self.w * sdsq)
                / ((1.0 + self.q * sdsq) * (1.0 + self.q * sdsq))
                - self.p21 * self.ca);
        let sq = (self.xj * self.xj + s * s).sqrt();
        let fb = (h * self.xj - s * s) / sq;
        let fc = s * (h + self.xj) / sq;
        SeriesTerms {
            fb,
            fa2: fb * (2.0 * dlam).cos(),
            fa4: fb * (4.0 * dlam).cos(),
            fc1: fc * dlam.cos(),
            fc3: fc * (3.0 * dlam).cos(),
        }
    }

    fn s_at(&self, tlam: f64) -> f64 {
        let sd = tlam.sin();
        let sdsq = sd * sd;
        self.p21
            * self.sa
            * tlam.cos()
            * ((1.0 + self.t * sdsq)
                / ((1.0 + self.w * sdsq) * (1.0 + self.q * sdsq)))
                .sqrt()
    }
}

impl Projection for SpaceObliqueMercatorProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        let radlt = lat.clamp(-1.570796, 1.570796);
        let radln = lon - self.lon_center;

        let mut tlamp = HALF_PI;
        if self.start != 0.0 {
            tlamp = 2.5 * PI;
        }
        if radlt < 0.0 {
            tlamp = 1.5 * PI;
        }

        // Iterate for the transformed longitude, restarting at most
        // twice to resolve the ambiguity near the orbit end points.
        let mut n = 0;
        let mut tlam;
        let mut xlamt;
        loop {
            let mut sav = tlamp;
            let mut l = 0;
            let xlamp = radln + self.p21 * tlamp;
            let ab1 = xlamp.cos();
            let scl = if ab1 >= 0.0 { 1.0 } else { -1.0 };
            let ab2 = tlamp - scl * tlamp.sin() * HALF_PI;
            loop {
                xlamt = radln + self.p21 * sav;
                let c = xlamt.cos();
                if c.abs() < 1.0e-7 {
                    xlamt -= 1.0e-7;
                }
                let xlam =
                    ((1.0 - self.es) * radlt.tan() * self.sa + xlamt.sin() * self.ca) / c;
                tlam = xlam.atan() + ab2;
                if (sav.abs() - tlam.abs()).abs() < CONV {
                    break;
                }
                l += 1;
                if l > 50 {
                    return Err(ProjError::NonConvergence(
                        "transformed longitude iteration failed".into(),
                    ));
                }
                sav = tlam;
            }

            let rlm = PI * LANDSAT_RATIO;
            let rlm2 = rlm + 2.0 * PI;
            n += 1;
            if n >= 3 || (tlam > rlm && tlam < rlm2) {
                break;
            }
            if tlam < rlm {
                tlamp = 2.5 * PI;
            }
            if tlam >= rlm2 {
                tlamp = HALF_PI;
            }
        }

        let dp = radlt.sin();
        let tphi = (((1.0 - self.es) * self.ca * dp
            - self.sa * radlt.cos() * xlamt.sin())
            / (1.0 - self.es * dp * dp).sqrt())
        .asin();

        let tanlg = ((PI / 4.0) + tphi / 2.0).tan().ln();
        let sd = tlam.sin();
        let s = self.s_at(tlam);
        let d = (self.xj * self.xj + s * s).sqrt();
        let along = self.a
            * (self.b * tlam + self.a2 * (2.0 * tlam).sin() + self.a4 * (4.0 * tlam).sin()
                - tanlg * s / d);
        let across = self.a
            * (self.c1 * sd + self.c3 * (3.0 * tlam).sin() + tanlg * self.xj / d);
        let x = along + self.false_northing;
        let y = across + self.false_easting;
        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        let along = x - self.false_northing;
        let across = y - self.false_easting;

        // Solve for the transformed longitude by fixed point iteration.
        let mut tlon = along / (self.a * self.b);
        let conv = 1.0e-9;
        let mut s = 0.0;
        let mut converged = false;
        for _ in 0..50 {
            let sav = tlon;
            s = self.s_at(tlon);
            let blon = along / self.a + (across / self.a) * s / self.xj
                - self.a2 * (2.0 * tlon).sin()
                - self.a4 * (4.0 * tlon).sin()
                - (s / self.xj)
                    * (self.c1 * tlon.sin() + self.c3 * (3.0 * tlon).sin());
            tlon = blon / self.b;
            if (tlon - sav).abs() < conv {
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(ProjError::NonConvergence(
                "transformed longitude iteration failed".into(),
            ));
        }

        // Transformed latitude.
        let st = tlon.sin();
        let defac = ((1.0 + s * s / (self.xj * self.xj)).sqrt()
            * (across / self.a
                - self.c1 * st
                - self.c3 * (3.0 * tlon).sin()))
        .exp();
        let tlat = 2.0 * (defac.atan() - PI / 4.0);

        // Geodetic longitude with quadrant correction.
        let dd = st * st;
        if tlon.cos().abs() < 1.0e-7 {
            tlon -= 1.0e-7;
        }
        let bigk = tlat.sin();
        let bigk2 = bigk * bigk;
        let mut xlamt = (((1.0 - bigk2 / (1.0 - self.es)) * tlon.tan() * self.ca
            - bigk
                * self.sa
                * ((1.0 + self.q * dd) * (1.0 - bigk2) - bigk2 * self.u).sqrt()
                / tlon.cos())
            / (1.0 - bigk2 * (1.0 + self.u)))
            .atan();
        let sl = if xlamt >= 0.0 { 1.0 } else { -1.0 };
        let scl = if tlon.cos() >= 0.0 { 1.0 } else { -1.0 };
        xlamt -= HALF_PI * (1.0 - scl) * sl;
        let dlon = xlamt - self.p21 * tlon;

        // Geodetic latitude.
        let dlat = if self.sa.abs() < 1.0e-7 {
            (bigk / ((1.0 - self.es) * (1.0 - self.es) + self.es * bigk2).sqrt()).asin()
        } else {
            ((tlon.tan() * xlamt.cos() - self.ca * xlamt.sin()) / ((1.0 - self.es) * self.sa))
                .atan()
        };
        Ok((dlat, adjust_lon(dlon + self.lon_center)))
    }

    fn datum(&self) -> &Arc<Datum> {
        &self.datum
    }

    fn describe(&self) -> String {
        format!(
            "Space Oblique Mercator (ascending lon {:.4} deg)",
            self.lon_center.to_degrees()
        )
    }

    fn clone_projection(&self) -> Box<dyn Projection> {
        Box::new(self.clone())
    }
}
