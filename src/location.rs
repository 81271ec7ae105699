//! Geographic and data-grid point value types.

use std::fmt;
use std::sync::Arc;

use crate::datum::Datum;
use crate::spheroid::STD_RADIUS;

/// Style for formatting a coordinate in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DegreesFormat {
    /// Integer degrees: `124 W`.
    D,
    /// Two-digit degrees: `124.36 W`.
    Dd,
    /// Four-digit degrees: `124.3600 W`.
    Dddd,
    /// Full precision, signed, no hemisphere letter: `-124.360001453546473`.
    Raw,
    /// Degrees and minutes: `124 21.60 W`.
    Ddmm,
    /// Degrees, minutes and seconds: `124d21'36.00"W`.
    Ddmmss,
}

/// Which coordinate a formatted value represents, for hemisphere letters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coord {
    Lat,
    Lon,
}

/// A point on the Earth surface as geodetic latitude and longitude in
/// degrees, relative to a datum.
///
/// Latitudes have the range [-90, 90] and longitudes [-180, 180); the
/// constructor wraps the longitude when needed. NaN coordinates mark a
/// failed computation (see [`EarthLocation::is_valid`]).
///
/// All operations return new values; the type is immutable.
#[derive(Clone, Debug)]
pub struct EarthLocation {
    pub lat: f64,
    pub lon: f64,
    datum: Arc<Datum>,
}

impl EarthLocation {
    /// Creates a location, wrapping the longitude into [-180, 180).
    pub fn new(lat: f64, lon: f64, datum: Arc<Datum>) -> Self {
        Self {
            lat,
            lon: Self::lon_range(lon),
            datum,
        }
    }

    /// Creates an invalid location, used to flag a failed computation.
    pub fn invalid(datum: Arc<Datum>) -> Self {
        Self {
            lat: f64::NAN,
            lon: f64::NAN,
            datum,
        }
    }

    pub fn datum(&self) -> &Arc<Datum> {
        &self.datum
    }

    /// A copy of this location referenced to the new datum, with the
    /// coordinates shifted to match.
    pub fn shift_datum(&self, new_datum: &Arc<Datum>) -> EarthLocation {
        if Datum::same(&self.datum, new_datum) {
            return self.clone();
        }
        let (lat, lon) = self.datum.shift_to(new_datum, self.lat, self.lon);
        EarthLocation::new(lat, lon, Arc::clone(new_datum))
    }

    /// Great circle distance to another location in kilometers, computed
    /// with the haversine formula on the standard sphere.
    pub fn distance(&self, loc: &EarthLocation) -> f64 {
        Self::distance_between(self.lat, self.lon, loc.lat, loc.lon)
    }

    /// Haversine great circle distance between two points in kilometers.
    pub fn distance_between(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
        let lat1 = lat_a.to_radians();
        let lon1 = lon_a.to_radians();
        let lat2 = lat_b.to_radians();
        let lon2 = lon_b.to_radians();
        let dlon = lon2 - lon1;
        let dlat = lat2 - lat1;
        let a = (dlat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().min(1.0).asin();
        STD_RADIUS * c
    }

    /// Translates by the given increments, travelling over the pole and
    /// down the other side when the latitude leaves [-90, 90].
    pub fn translate(&self, lat_inc: f64, lon_inc: f64) -> EarthLocation {
        let mut lat = self.lat + lat_inc;
        let mut lon = self.lon;
        if lat > 90.0 {
            lat = 180.0 - lat;
            lon += 180.0;
        } else if lat < -90.0 {
            lat = -180.0 - lat;
            lon += 180.0;
        }
        EarthLocation::new(lat, lon + lon_inc, Arc::clone(&self.datum))
    }

    pub fn is_north_of(&self, loc: &EarthLocation) -> bool {
        self.lat > loc.lat
    }

    pub fn is_south_of(&self, loc: &EarthLocation) -> bool {
        self.lat < loc.lat
    }

    /// True if this location is east of the other, taking the shorter way
    /// around; antipodal longitudes are neither east nor west.
    pub fn is_east_of(&self, loc: &EarthLocation) -> bool {
        let abs = (self.lon - loc.lon).abs();
        if abs < 180.0 {
            self.lon > loc.lon
        } else if abs > 180.0 {
            self.lon < loc.lon
        } else {
            false
        }
    }

    pub fn is_west_of(&self, loc: &EarthLocation) -> bool {
        let abs = (self.lon - loc.lon).abs();
        if abs < 180.0 {
            self.lon < loc.lon
        } else if abs > 180.0 {
            self.lon > loc.lon
        } else {
            false
        }
    }

    /// True unless a coordinate is NaN.
    pub fn is_valid(&self) -> bool {
        !self.lat.is_nan() && !self.lon.is_nan()
    }

    /// Clamps a latitude to [-90, 90].
    pub fn lat_range(lat: f64) -> f64 {
        lat.clamp(-90.0, 90.0)
    }

    /// Wraps a longitude into [-180, 180).
    pub fn lon_range(lon: f64) -> f64 {
        if lon < -180.0 {
            lon + 360.0
        } else if lon >= 180.0 {
            lon - 360.0
        } else {
            lon
        }
    }

    /// Formats one coordinate value in degrees.
    pub fn format_degrees(deg: f64, style: DegreesFormat, coord: Coord) -> String {
        if style == DegreesFormat::Raw {
            return format!("{}", deg);
        }
        let hemisphere = match coord {
            Coord::Lat => {
                if deg < 0.0 {
                    "S"
                } else {
                    "N"
                }
            }
            Coord::Lon => {
                if deg < 0.0 {
                    "W"
                } else {
                    "E"
                }
            }
        };
        let deg = deg.abs();
        match style {
            DegreesFormat::D => format!("{} {}", deg as i32, hemisphere),
            DegreesFormat::Dd => format!("{:.2} {}", deg, hemisphere),
            DegreesFormat::Dddd => format!("{:.4} {}", deg, hemisphere),
            DegreesFormat::Ddmm => {
                let dd = deg as i32;
                let mm = (deg - dd as f64) * 60.0;
                format!("{} {:.2} {}", dd, mm, hemisphere)
            }
            DegreesFormat::Ddmmss => {
                let dd = deg as i32;
                let mm = ((deg - dd as f64) * 60.0) as i32;
                let ss = (deg - dd as f64 - mm as f64 / 60.0) * 3600.0;
                format!("{}d{}'{:.2}\"{}", dd, mm, ss, hemisphere)
            }
            DegreesFormat::Raw => unreachable!(),
        }
    }

    /// Formats both coordinates, separated by a comma.
    pub fn format(&self, style: DegreesFormat) -> String {
        format!(
            "{}, {}",
            Self::format_degrees(self.lat, style, Coord::Lat),
            Self::format_degrees(self.lon, style, Coord::Lon)
        )
    }
}

impl fmt::Display for EarthLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(DegreesFormat::Dddd))
    }
}

/// Coordinate and datum equality; datums compare by identity.
impl PartialEq for EarthLocation {
    fn eq(&self, other: &Self) -> bool {
        self.lat == other.lat
            && self.lon == other.lon
            && Datum::same(&self.datum, &other.datum)
    }
}

/// A fractional [row, column] position within a 2D data grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DataLocation {
    pub row: f64,
    pub col: f64,
}

impl DataLocation {
    pub fn new(row: f64, col: f64) -> Self {
        Self { row, col }
    }

    /// An invalid location, used to flag a failed computation.
    pub fn invalid() -> Self {
        Self {
            row: f64::NAN,
            col: f64::NAN,
        }
    }

    /// The nearest whole-coordinate location.
    pub fn round(&self) -> DataLocation {
        DataLocation::new(self.row.round(), self.col.round())
    }

    /// The nearest whole-coordinate location at or below this one.
    pub fn floor(&self) -> DataLocation {
        DataLocation::new(self.row.floor(), self.col.floor())
    }

    pub fn translate(&self, row_inc: f64, col_inc: f64) -> DataLocation {
        DataLocation::new(self.row + row_inc, self.col + col_inc)
    }

    /// True when both coordinates fall within [0, dim-1].
    pub fn is_contained(&self, dims: [usize; 2]) -> bool {
        self.row >= 0.0
            && self.row <= (dims[0] - 1) as f64
            && self.col >= 0.0
            && self.col <= (dims[1] - 1) as f64
    }

    /// True unless a coordinate is NaN.
    pub fn is_valid(&self) -> bool {
        !self.row.is_nan() && !self.col.is_nan()
    }
}

impl fmt::Display for DataLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::DatumFactory;
    use crate::spheroid::{GRS1980, WGS84};
    use approx::assert_relative_eq;

    fn wgs84() -> Arc<Datum> {
        DatumFactory::new().create(WGS84).unwrap()
    }

    #[test]
    fn test_lon_wrapping() {
        let datum = wgs84();
        let loc = EarthLocation::new(10.0, 190.0, Arc::clone(&datum));
        assert_relative_eq!(loc.lon, -170.0);
        let loc = EarthLocation::new(10.0, -190.0, Arc::clone(&datum));
        assert_relative_eq!(loc.lon, 170.0);
        let loc = EarthLocation::new(10.0, 180.0, datum);
        assert_relative_eq!(loc.lon, -180.0);
    }

    #[test]
    fn test_translate_over_pole() {
        let datum = wgs84();
        let loc = EarthLocation::new(85.0, 10.0, datum);
        let over = loc.translate(10.0, 0.0);
        assert_relative_eq!(over.lat, 85.0);
        assert_relative_eq!(over.lon, -170.0);
    }

    #[test]
    fn test_distance() {
        // Quarter circumference between the equator and the pole.
        let d = EarthLocation::distance_between(0.0, 0.0, 90.0, 0.0);
        assert_relative_eq!(d, STD_RADIUS * std::f64::consts::FRAC_PI_2, epsilon = 1e-9);
        assert_relative_eq!(
            EarthLocation::distance_between(45.0, 45.0, 45.0, 45.0),
            0.0
        );
    }

    #[test]
    fn test_directional_predicates() {
        let datum = wgs84();
        let a = EarthLocation::new(10.0, 170.0, Arc::clone(&datum));
        let b = EarthLocation::new(5.0, -170.0, datum);
        assert!(a.is_north_of(&b));
        assert!(b.is_south_of(&a));
        // Across the antimeridian the shorter way decides.
        assert!(b.is_east_of(&a));
        assert!(a.is_west_of(&b));
    }

    #[test]
    fn test_format() {
        let s = EarthLocation::format_degrees(-124.36, DegreesFormat::Dd, Coord::Lon);
        assert_eq!(s, "124.36 W");
        let s = EarthLocation::format_degrees(-124.36, DegreesFormat::Ddmm, Coord::Lon);
        assert_eq!(s, "124 21.60 W");
        let s = EarthLocation::format_degrees(-124.36, DegreesFormat::Ddmmss, Coord::Lon);
        assert_eq!(s, "124d21'36.00\"W");
        let s = EarthLocation::format_degrees(45.5, DegreesFormat::D, Coord::Lat);
        assert_eq!(s, "45 N");
    }

    #[test]
    fn test_equality_uses_datum_identity() {
        let mut factory = DatumFactory::new();
        let wgs = factory.create(WGS84).unwrap();
        let grs = factory.create(GRS1980).unwrap();
        let a = EarthLocation::new(1.0, 2.0, Arc::clone(&wgs));
        let b = EarthLocation::new(1.0, 2.0, wgs);
        let c = EarthLocation::new(1.0, 2.0, grs);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_data_location() {
        let loc = DataLocation::new(1.6, 2.4);
        assert_eq!(loc.round(), DataLocation::new(2.0, 2.0));
        assert_eq!(loc.floor(), DataLocation::new(1.0, 2.0));
        assert!(loc.is_contained([3, 3]));
        assert!(!loc.is_contained([2, 3]));
        assert!(loc.is_valid());
        assert!(!DataLocation::invalid().is_valid());
    }
}
