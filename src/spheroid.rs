//! Standard Earth spheroid models and axis constants.

/// Clarke 1866 (default) spheroid code.
pub const CLARKE1866: i32 = 0;
/// Clarke 1880 spheroid code.
pub const CLARKE1880: i32 = 1;
/// Bessel spheroid code.
pub const BESSEL: i32 = 2;
/// International 1967 spheroid code.
pub const INT1967: i32 = 3;
/// International 1909 spheroid code.
pub const INT1909: i32 = 4;
/// WGS 72 spheroid code.
pub const WGS72: i32 = 5;
/// Everest spheroid code.
pub const EVEREST: i32 = 6;
/// WGS 66 spheroid code.
pub const WGS66: i32 = 7;
/// GRS 1980 spheroid code.
pub const GRS1980: i32 = 8;
/// Airy spheroid code.
pub const AIRY: i32 = 9;
/// Modified Everest spheroid code.
pub const MOD_EVEREST: i32 = 10;
/// Modified Airy spheroid code.
pub const MOD_AIRY: i32 = 11;
/// WGS 84 spheroid code.
pub const WGS84: i32 = 12;
/// SouthEast Asia spheroid code.
pub const SE_ASIA: i32 = 13;
/// Australian National spheroid code.
pub const AUS_NAT: i32 = 14;
/// Krassovsky spheroid code.
pub const KRASS: i32 = 15;
/// Hough spheroid code.
pub const HOUGH: i32 = 16;
/// Mercury 1960 spheroid code.
pub const MERCURY1960: i32 = 17;
/// Modified Mercury 1968 spheroid code.
pub const MOD_MER1968: i32 = 18;
/// Sphere of radius 6,370,997 metres spheroid code.
pub const SPHERE: i32 = 19;

/// The total number of spheroid codes.
pub const MAX_SPHEROIDS: i32 = 20;

/// Standard Earth radius in kilometers.
pub const STD_RADIUS: f64 = 6370.997;

/// The list of spheroid code names.
pub const SPHEROID_NAMES: [&str; 20] = [
    "Clarke 1866",
    "Clarke 1880",
    "Bessel",
    "International 1967",
    "International 1909",
    "WGS 72",
    "Everest",
    "WGS 66",
    "GRS 1980",
    "Airy",
    "Modified Everest",
    "Modified Airy",
    "WGS 84",
    "SouthEast Asia",
    "Australian National",
    "Krassovsky",
    "Hough",
    "Mercury 1960",
    "Modified Mercury 1968",
    "Sphere of radius 6370997 m",
];

/// Spheroid semi-major axes in meters.
pub const SPHEROID_SEMI_MAJOR: [f64; 20] = [
    6378206.4,    // 0: Clarke 1866 (default)
    6378249.145,  // 1: Clarke 1880
    6377397.155,  // 2: Bessel
    6378157.5,    // 3: International 1967
    6378388.0,    // 4: International 1909
    6378135.0,    // 5: WGS 72
    6377276.3452, // 6: Everest
    6378145.0,    // 7: WGS 66
    6378137.0,    // 8: GRS 1980
    6377563.396,  // 9: Airy
    6377304.063,  // 10: Modified Everest
    6377340.189,  // 11: Modified Airy
    6378137.0,    // 12: WGS 84
    6378155.0,    // 13: Southeast Asia
    6378160.0,    // 14: Australian National
    6378245.0,    // 15: Krassovsky
    6378270.0,    // 16: Hough
    6378166.0,    // 17: Mercury 1960
    6378150.0,    // 18: Modified Mercury 1968
    6370997.0,    // 19: Sphere of Radius 6370997 meters
];

/// Spheroid inverse flattening values.
pub const SPHEROID_INV_FLAT: [f64; 20] = [
    294.9786982,   // 0: Clarke 1866 (default)
    293.465,       // 1: Clarke 1880
    299.1528128,   // 2: Bessel
    298.249615390, // 3: International 1967
    297.0,         // 4: International 1909
    298.26,        // 5: WGS 72
    300.8017,      // 6: Everest
    298.25,        // 7: WGS 66
    298.257222101, // 8: GRS 1980
    299.3249646,   // 9: Airy
    300.8017,      // 10: Modified Everest
    299.3249646,   // 11: Modified Airy
    298.257223653, // 12: WGS 84
    298.3,         // 13: Southeast Asia
    298.25,        // 14: Australian National
    298.3,         // 15: Krassovsky
    297.0,         // 16: Hough
    298.3,         // 17: Mercury 1960
    298.3,         // 18: Modified Mercury 1968
    f64::INFINITY, // 19: Sphere of Radius 6370997 meters
];

/// Spheroid semi-minor axes in meters.
pub const SPHEROID_SEMI_MINOR: [f64; 20] = [
    6356583.8,      // 0: Clarke 1866 (default)
    6356514.86955,  // 1: Clarke 1880
    6356078.96284,  // 2: Bessel
    6356772.2,      // 3: International 1967
    6356911.94613,  // 4: International 1909
    6356750.519915, // 5: WGS 72
    6356075.4133,   // 6: Everest
    6356759.769356, // 7: WGS 66
    6356752.31414,  // 8: GRS 1980
    6356256.91,     // 9: Airy
    6356103.039,    // 10: Modified Everest
    6356034.448,    // 11: Modified Airy
    6356752.314245, // 12: WGS 84
    6356773.3205,   // 13: Southeast Asia
    6356774.719,    // 14: Australian National
    6356863.0188,   // 15: Krassovsky
    6356794.343479, // 16: Hough
    6356784.283666, // 17: Mercury 1960
    6356768.337303, // 18: Modified Mercury 1968
    6370997.0,      // 19: Sphere of Radius 6370997 meters
];

/// Gets the spheroid code that most closely matches the specified axes,
/// or None if no standard spheroid comes within 0.02 m combined delta.
pub fn spheroid_from_axes(semi_major: f64, semi_minor: f64) -> Option<i32> {
    let mut match_index = None;
    let mut match_delta = f64::MAX;
    for i in 0..SPHEROID_SEMI_MAJOR.len() {
        let delta = (SPHEROID_SEMI_MAJOR[i] - semi_major).abs()
            + (SPHEROID_SEMI_MINOR[i] - semi_minor).abs();
        if delta < match_delta {
            match_delta = delta;
            match_index = Some(i as i32);
        }
    }
    if match_delta < 0.02 {
        match_index
    } else {
        None
    }
}

/// Gets the spheroid code matching the specified name (case-insensitive),
/// or None if no name matches.
pub fn spheroid_from_name(name: &str) -> Option<i32> {
    SPHEROID_NAMES
        .iter()
        .position(|n| n.eq_ignore_ascii_case(name))
        .map(|i| i as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spheroid_from_axes() {
        assert_eq!(
            spheroid_from_axes(6378206.4, 6356583.8),
            Some(CLARKE1866)
        );
        assert_eq!(
            spheroid_from_axes(6378137.0, 6356752.314245),
            Some(WGS84)
        );
        assert_eq!(spheroid_from_axes(6370997.0, 6370997.0), Some(SPHERE));
        assert_eq!(spheroid_from_axes(6000000.0, 6000000.0), None);
    }

    #[test]
    fn test_spheroid_from_name() {
        assert_eq!(spheroid_from_name("WGS 84"), Some(WGS84));
        assert_eq!(spheroid_from_name("clarke 1866"), Some(CLARKE1866));
        assert_eq!(spheroid_from_name("No Such Spheroid"), None);
    }

    #[test]
    fn test_grs80_wgs84_nearly_identical() {
        // The two differ by under a tenth of a millimetre in the semi-minor
        // axis, so an exact-axes lookup must still separate them by delta.
        assert!((SPHEROID_SEMI_MINOR[GRS1980 as usize] - SPHEROID_SEMI_MINOR[WGS84 as usize]).abs() < 1e-3);
    }
}
