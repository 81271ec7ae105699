//! Shared ellipsoid math for the projection family.
//!
//! The functions here are the classic closed-form and iterative kernels
//! that the individual projections compose: meridian-arc series
//! coefficients, the m/q/t auxiliary functions of the eccentricity, and
//! the iterative latitude recoveries phi1..phi4. Angles are radians
//! unless noted.

use crate::error::ProjError;

/// General convergence epsilon.
pub const EPSLN: f64 = 1.0e-10;

pub const HALF_PI: f64 = std::f64::consts::FRAC_PI_2;
pub const TWO_PI: f64 = std::f64::consts::TAU;

/// Longitude correction iteration cap in `adjust_lon`.
pub const MAX_ADJUST_ITER: u32 = 4;

/// Iteration cap and tolerance for `phi1z`.
pub const PHI1_MAX_ITER: u32 = 25;
pub const PHI1_TOL: f64 = 1.0e-7;

/// Iteration cap for `phi2z` (tolerance is `EPSLN`).
pub const PHI2_MAX_ITER: u32 = 15;

/// Iteration cap and tolerance for `phi3z`.
pub const PHI3_MAX_ITER: u32 = 15;
pub const PHI3_TOL: f64 = 1.0e-10;

/// Iteration cap and tolerance for `phi4z`.
pub const PHI4_MAX_ITER: u32 = 15;
pub const PHI4_TOL: f64 = 1.0e-10;

const MAXLONG: f64 = 2147483647.0;
const DBLLONG: f64 = 4.61168601e18;

/// Returns the sign of x as -1 or 1.
pub fn sign(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Arcsine with the argument clamped to [-1, 1].
pub fn asinz(con: f64) -> f64 {
    con.clamp(-1.0, 1.0).asin()
}

/// Normalizes an angle in radians to the range (-PI, PI].
///
/// The stepwise corrections run at most `MAX_ADJUST_ITER` times; inputs
/// pathological enough to exhaust them fall through to an exact modular
/// reduction so the result still lands in range.
pub fn adjust_lon(mut x: f64) -> f64 {
    for _ in 0..MAX_ADJUST_ITER {
        if x.abs() <= std::f64::consts::PI {
            return x;
        }
        if (x / std::f64::consts::PI).abs() < 2.0 {
            x -= sign(x) * TWO_PI;
        } else if (x / TWO_PI).abs() < MAXLONG {
            x -= (x / TWO_PI).trunc() * TWO_PI;
        } else if (x / (MAXLONG * TWO_PI)).abs() < MAXLONG {
            x -= (x / (MAXLONG * TWO_PI)).trunc() * (TWO_PI * MAXLONG);
        } else if (x / (DBLLONG * TWO_PI)).abs() < MAXLONG {
            x -= (x / (DBLLONG * TWO_PI)).trunc() * (TWO_PI * DBLLONG);
        } else {
            x -= sign(x) * TWO_PI;
        }
    }
    if x.abs() > std::f64::consts::PI {
        x -= (x / TWO_PI).round() * TWO_PI;
    }
    x
}

/// Computes the constant small m: cos(phi) / sqrt(1 - e^2 sin^2(phi)).
pub fn msfnz(eccent: f64, sinphi: f64, cosphi: f64) -> f64 {
    let con = eccent * sinphi;
    cosphi / (1.0 - con * con).sqrt()
}

/// Computes the constant small q used in equal-area projections.
pub fn qsfnz(eccent: f64, sinphi: f64) -> f64 {
    if eccent > 1.0e-7 {
        let con = eccent * sinphi;
        (1.0 - eccent * eccent)
            * (sinphi / (1.0 - con * con)
                - (0.5 / eccent) * ((1.0 - con) / (1.0 + con)).ln())
    } else {
        2.0 * sinphi
    }
}

/// Computes the constant small t for use in conformal projections.
pub fn tsfnz(eccent: f64, phi: f64, sinphi: f64) -> f64 {
    let con = eccent * sinphi;
    let com = 0.5 * eccent;
    let con = ((1.0 - con) / (1.0 + con)).powf(com);
    (0.5 * (HALF_PI - phi)).tan() / con
}

/// Computes phi1, the latitude for the inverse of the Albers projection.
pub fn phi1z(eccent: f64, qs: f64) -> Result<f64, ProjError> {
    let mut phi = asinz(0.5 * qs);
    if eccent < EPSLN {
        return Ok(phi);
    }
    let eccnts = eccent * eccent;
    for _ in 0..PHI1_MAX_ITER {
        let sinpi = phi.sin();
        let cospi = phi.cos();
        let con = eccent * sinpi;
        let com = 1.0 - con * con;
        let dphi = 0.5 * com * com / cospi
            * (qs / (1.0 - eccnts)
                - sinpi / com
                + 0.5 / eccent * ((1.0 - con) / (1.0 + con)).ln());
        phi += dphi;
        if dphi.abs() <= PHI1_TOL {
            return Ok(phi);
        }
    }
    Err(ProjError::NonConvergence(
        "latitude recovery from authalic q failed".into(),
    ))
}

/// Computes the latitude angle phi2 for the inverse of conformal
/// projections, from the constant small t.
pub fn phi2z(eccent: f64, ts: f64) -> Result<f64, ProjError> {
    let eccnth = 0.5 * eccent;
    let mut phi = HALF_PI - 2.0 * ts.atan();
    for _ in 0..PHI2_MAX_ITER {
        let con = eccent * phi.sin();
        let dphi =
            HALF_PI - 2.0 * (ts * ((1.0 - con) / (1.0 + con)).powf(eccnth)).atan() - phi;
        phi += dphi;
        if dphi.abs() <= EPSLN {
            return Ok(phi);
        }
    }
    Err(ProjError::NonConvergence(
        "latitude recovery from conformal t failed".into(),
    ))
}

/// Computes phi3, the latitude for the inverse of the Equidistant Conic
/// projection, from the meridian distance.
pub fn phi3z(ml: f64, e0: f64, e1: f64, e2: f64, e3: f64) -> Result<f64, ProjError> {
    let mut phi = ml;
    for _ in 0..PHI3_MAX_ITER {
        let dphi = (ml + e1 * (2.0 * phi).sin() - e2 * (4.0 * phi).sin()
            + e3 * (6.0 * phi).sin())
            / e0
            - phi;
        phi += dphi;
        if dphi.abs() <= PHI3_TOL {
            return Ok(phi);
        }
    }
    Err(ProjError::NonConvergence(
        "latitude recovery from meridian distance failed".into(),
    ))
}

/// Computes phi4, the latitude for the inverse of the Polyconic
/// projection. Returns the recovered latitude along with the final
/// tan(phi) * sqrt(1 - es sin^2(phi)) term.
pub fn phi4z(
    eccent: f64,
    e0: f64,
    e1: f64,
    e2: f64,
    e3: f64,
    a: f64,
    b: f64,
) -> Result<(f64, f64), ProjError> {
    let mut phi = a;
    for _ in 0..PHI4_MAX_ITER {
        let sinphi = phi.sin();
        let tanphi = phi.tan();
        let c = tanphi * (1.0 - eccent * sinphi * sinphi).sqrt();
        let sin2ph = (2.0 * phi).sin();
        let ml = e0 * phi - e1 * sin2ph + e2 * (4.0 * phi).sin() - e3 * (6.0 * phi).sin();
        let mlp = e0 - 2.0 * e1 * (2.0 * phi).cos() + 4.0 * e2 * (4.0 * phi).cos()
            - 6.0 * e3 * (6.0 * phi).cos();
        let con1 = 2.0 * ml + c * (ml * ml + b) - 2.0 * a * (c * ml + 1.0);
        let con2 = eccent * sin2ph * (ml * ml + b - 2.0 * a * ml) / (2.0 * c);
        let con3 = 2.0 * (a - ml) * (c * mlp - 2.0 / sin2ph) - 2.0 * mlp;
        let dphi = con1 / (con2 + con3);
        phi += dphi;
        if dphi.abs() <= PHI4_TOL {
            let sinphi = phi.sin();
            let c = phi.tan() * (1.0 - eccent * sinphi * sinphi).sqrt();
            return Ok((phi, c));
        }
    }
    Err(ProjError::NonConvergence(
        "polyconic latitude recovery failed".into(),
    ))
}

/// Meridian arc series coefficient e0.
pub fn e0fn(x: f64) -> f64 {
    1.0 - 0.25 * x * (1.0 + x / 16.0 * (3.0 + 1.25 * x))
}

/// Meridian arc series coefficient e1.
pub fn e1fn(x: f64) -> f64 {
    0.375 * x * (1.0 + 0.25 * x * (1.0 + 0.46875 * x))
}

/// Meridian arc series coefficient e2.
pub fn e2fn(x: f64) -> f64 {
    0.05859375 * x * x * (1.0 + 0.75 * x)
}

/// Meridian arc series coefficient e3.
pub fn e3fn(x: f64) -> f64 {
    x * x * x * (35.0 / 3072.0)
}

/// Computes the constant e4 used in the Polar Stereographic projection.
pub fn e4fn(x: f64) -> f64 {
    let con = 1.0 + x;
    let com = 1.0 - x;
    (con.powf(con) * com.powf(com)).sqrt()
}

/// Distance along the meridian from the equator to latitude phi.
pub fn mlfn(e0: f64, e1: f64, e2: f64, e3: f64, phi: f64) -> f64 {
    e0 * phi - e1 * (2.0 * phi).sin() + e2 * (4.0 * phi).sin() - e3 * (6.0 * phi).sin()
}

/// Computes the UTM zone number for a longitude in degrees.
pub fn calc_utm_zone(lon: f64) -> i32 {
    ((lon + 180.0) / 6.0 + 1.0) as i32
}

/// Converts a packed DMS angle (+/-DDDMMMSSS.SSS) to degrees.
///
/// Degrees, minutes and seconds are validated against 360, 60 and 60.
pub fn paksz(ang: f64) -> Result<f64, ProjError> {
    let fac = if ang < 0.0 { -1.0 } else { 1.0 };
    let mut sec = ang.abs();

    let tmp = 1000000.0;
    let i = (sec / tmp) as i64;
    if i > 360 {
        return Err(ProjError::InvalidParameter(format!(
            "illegal DMS field: degrees {} exceed 360",
            i
        )));
    }
    let deg = i as f64;
    sec -= deg * tmp;

    let tmp = 1000.0;
    let i = (sec / tmp) as i64;
    if i > 60 {
        return Err(ProjError::InvalidParameter(format!(
            "illegal DMS field: minutes {} exceed 60",
            i
        )));
    }
    let min = i as f64;
    sec -= min * tmp;

    if sec > 60.0 {
        return Err(ProjError::InvalidParameter(format!(
            "illegal DMS field: seconds {} exceed 60",
            sec
        )));
    }

    Ok(fac * (deg * 3600.0 + min * 60.0 + sec) / 3600.0)
}

/// Converts an angle encoded as +/-DDDMMSS.SSS to the packed DMS form
/// +/-DDDMMMSSS.SSS.
pub fn pakcz(pak: f64) -> f64 {
    let fac = if pak < 0.0 { -1.0 } else { 1.0 };
    let mut con = pak.abs();
    let degs = (con / 10000.0 + 0.001).trunc();
    con -= degs * 10000.0;
    let mins = (con / 100.0 + 0.001).trunc();
    let secs = con - mins * 100.0;
    fac * (degs * 1000000.0 + mins * 1000.0 + secs)
}

/// Packs an angle in degrees into the +/-DDDMMMSSS.SSS form.
pub fn pack_angle(deg: f64) -> f64 {
    let fac = if deg < 0.0 { -1.0 } else { 1.0 };
    let deg = deg.abs();
    let dd = deg.trunc();
    let mm = ((deg - dd) * 60.0).trunc();
    let ss = (deg - dd - mm / 60.0) * 3600.0;
    fac * (dd * 1000000.0 + mm * 1000.0 + ss)
}

/// Unpacks a +/-DDDMMMSSS.SSS angle into degrees without validation.
pub fn unpack_angle(ang: f64) -> f64 {
    let fac = if ang < 0.0 { -1.0 } else { 1.0 };
    let mut sec = ang.abs();
    let deg = (sec / 1000000.0).trunc();
    sec -= deg * 1000000.0;
    let min = (sec / 1000.0).trunc();
    sec -= min * 1000.0;
    fac * (deg + min / 60.0 + sec / 3600.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_adjust_lon() {
        assert_relative_eq!(adjust_lon(0.0), 0.0);
        assert_relative_eq!(adjust_lon(PI), PI);
        assert_relative_eq!(adjust_lon(PI + 0.1), -PI + 0.1, epsilon = 1e-12);
        assert_relative_eq!(adjust_lon(-PI - 0.1), PI - 0.1, epsilon = 1e-12);
        assert_relative_eq!(adjust_lon(5.0 * PI + 0.1), -PI + 0.1, epsilon = 1e-9);
        assert_relative_eq!(adjust_lon(100.0 * TWO_PI + 0.5), 0.5, epsilon = 1e-9);
        // Extreme input still lands in range through the fallback.
        let x = adjust_lon(1.0e12);
        assert!(x.abs() <= PI);
    }

    #[test]
    fn test_asinz_clamps() {
        assert_relative_eq!(asinz(1.0 + 1e-12), HALF_PI);
        assert_relative_eq!(asinz(-1.0 - 1e-12), -HALF_PI);
        assert_relative_eq!(asinz(0.5), 0.5f64.asin());
    }

    #[test]
    fn test_msfnz_sphere() {
        // Zero eccentricity reduces m to cos(phi).
        let phi = 0.7f64;
        assert_relative_eq!(msfnz(0.0, phi.sin(), phi.cos()), phi.cos());
    }

    #[test]
    fn test_qsfnz_near_sphere() {
        let phi = 0.5f64;
        assert_relative_eq!(qsfnz(1.0e-8, phi.sin()), 2.0 * phi.sin());
    }

    #[test]
    fn test_phi1z_round_trip() {
        let eccent = 0.0822719f64; // Clarke 1866
        let phi = 0.6f64;
        let qs = qsfnz(eccent, phi.sin());
        let rec = phi1z(eccent, qs).unwrap();
        assert_relative_eq!(rec, phi, epsilon = 1e-7);
    }

    #[test]
    fn test_phi2z_round_trip() {
        let eccent = 0.0822719f64;
        let phi = 0.6f64;
        let ts = tsfnz(eccent, phi, phi.sin());
        let rec = phi2z(eccent, ts).unwrap();
        assert_relative_eq!(rec, phi, epsilon = 1e-9);
    }

    #[test]
    fn test_phi3z_round_trip() {
        let es = 0.0822719f64 * 0.0822719;
        let (e0, e1, e2, e3) = (e0fn(es), e1fn(es), e2fn(es), e3fn(es));
        let phi = 0.6f64;
        let ml = mlfn(e0, e1, e2, e3, phi);
        let rec = phi3z(ml, e0, e1, e2, e3).unwrap();
        assert_relative_eq!(rec, phi, epsilon = 1e-9);
    }

    #[test]
    fn test_mlfn_equator_is_zero() {
        let es = 0.00676866f64;
        assert_relative_eq!(mlfn(e0fn(es), e1fn(es), e2fn(es), e3fn(es), 0.0), 0.0);
    }

    #[test]
    fn test_calc_utm_zone() {
        assert_eq!(calc_utm_zone(-180.0), 1);
        assert_eq!(calc_utm_zone(-75.0), 18);
        assert_eq!(calc_utm_zone(0.0), 31);
        assert_eq!(calc_utm_zone(179.9), 60);
    }

    #[test]
    fn test_paksz() {
        // 45 degrees 30 minutes exactly.
        let deg = paksz(45030000.0).unwrap();
        assert_relative_eq!(deg, 45.5, epsilon = 1e-12);
        let deg = paksz(-120015030.0).unwrap();
        assert_relative_eq!(deg, -(120.0 + 15.0 / 60.0 + 30.0 / 3600.0), epsilon = 1e-12);
        assert!(paksz(400000000.0).is_err());
    }

    #[test]
    fn test_pakcz() {
        // 41d25m30s encoded as DDDMMSS becomes packed DDDMMMSSS.
        assert_relative_eq!(pakcz(412530.0), 41025030.0, epsilon = 1e-6);
        assert_relative_eq!(pakcz(-412530.0), -41025030.0, epsilon = 1e-6);
    }

    #[test]
    fn test_pack_unpack_angle() {
        let packed = pack_angle(-120.2583333333);
        assert_relative_eq!(unpack_angle(packed), -120.2583333333, epsilon = 1e-9);
        assert_relative_eq!(unpack_angle(pack_angle(45.5)), 45.5, epsilon = 1e-9);
    }
}
