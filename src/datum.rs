//! Horizontal geodetic datums and datum-to-datum coordinate shifts.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::error::DatumError;
use crate::spheroid;

/// A horizontal geodetic datum: a reference spheroid plus the (dx, dy, dz)
/// center offset from WGS 84.
///
/// Datums are compared by identity, not by value: two datums are the same
/// only when they are the same [`Arc`] allocation (see [`Datum::same`]).
/// [`DatumFactory`] caches one instance per spheroid code, so datums created
/// through the same factory compare correctly. The type deliberately does
/// not implement `PartialEq`.
#[derive(Debug)]
pub struct Datum {
    name: String,
    spheroid_name: String,
    axis: f64,
    flat: f64,
    e2: f64,
    dx: f64,
    dy: f64,
    dz: f64,
    // derived, precomputed for compute_ecf
    rp: f64,
    rp2: f64,
    re2_over_rp2: f64,
}

impl Datum {
    /// Creates a datum from explicit spheroid axes and WGS 84 offsets.
    /// `inv_flat` may be infinite for a perfect sphere.
    pub fn new(
        name: &str,
        spheroid_name: &str,
        semi_major: f64,
        inv_flat: f64,
        dx: f64,
        dy: f64,
        dz: f64,
    ) -> Self {
        let flat = 1.0 / inv_flat;
        let e2 = 2.0 * flat - flat * flat;
        let re = semi_major;
        let rp = re * (1.0 - flat);
        let rp2 = rp * rp;
        let re2_over_rp2 = (re * re) / rp2;
        Self {
            name: name.to_string(),
            spheroid_name: spheroid_name.to_string(),
            axis: semi_major,
            flat,
            e2,
            dx,
            dy,
            dz,
            rp,
            rp2,
            re2_over_rp2,
        }
    }

    /// Creates a datum on a standard spheroid code.
    pub fn from_spheroid(
        name: &str,
        spheroid_code: i32,
        dx: f64,
        dy: f64,
        dz: f64,
    ) -> Result<Self, DatumError> {
        let i = spheroid_code as usize;
        if spheroid_code < 0 || i >= spheroid::SPHEROID_NAMES.len() {
            return Err(DatumError::NotFound(spheroid_code));
        }
        Ok(Self::new(
            name,
            spheroid::SPHEROID_NAMES[i],
            spheroid::SPHEROID_SEMI_MAJOR[i],
            spheroid::SPHEROID_INV_FLAT[i],
            dx,
            dy,
            dz,
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn spheroid_name(&self) -> &str {
        &self.spheroid_name
    }

    /// Semi-major axis in meters.
    pub fn axis(&self) -> f64 {
        self.axis
    }

    /// Flattening f = 1/invf.
    pub fn flattening(&self) -> f64 {
        self.flat
    }

    /// Eccentricity squared, e2 = 2f - f^2.
    pub fn e2(&self) -> f64 {
        self.e2
    }

    pub fn offsets(&self) -> (f64, f64, f64) {
        (self.dx, self.dy, self.dz)
    }

    /// Tests whether two datum handles refer to the same datum instance.
    pub fn same(a: &Arc<Datum>, b: &Arc<Datum>) -> bool {
        Arc::ptr_eq(a, b)
    }

    /// Computes scaled Earth-centered-fixed Cartesian coordinates for a
    /// geodetic latitude/longitude in degrees.
    ///
    /// The result is normalized by the spheroid size and is intended for
    /// relative distance comparisons between nearby points, not for
    /// absolute positioning.
    pub fn compute_ecf(&self, lat: f64, lon: f64) -> [f64; 3] {
        let lat = lat.to_radians();
        let lon = lon.to_radians();
        let cos_lat = lat.cos();
        let sin_lat = lat.sin();
        let beta =
            self.rp * (self.re2_over_rp2 * cos_lat * cos_lat + sin_lat * sin_lat).sqrt();
        let x = (self.axis * cos_lat * lon.cos()) / beta;
        let y = (self.axis * cos_lat * lon.sin()) / beta;
        let z = (self.rp2 * sin_lat) / (self.axis * beta);
        [x, y, z]
    }

    /// Shifts a geodetic (lat, lon) in degrees from this datum to another
    /// using the abridged Molodensky transform. Returns the shifted
    /// (lat, lon) in degrees.
    pub fn shift_to(&self, to: &Datum, lat: f64, lon: f64) -> (f64, f64) {
        let from = self;
        let da = to.axis - from.axis;
        let df = to.flat - from.flat;
        let dx = from.dx - to.dx;
        let dy = from.dy - to.dy;
        let dz = from.dz - to.dz;

        let slat = lat.to_radians().sin();
        let clat = lat.to_radians().cos();
        let slon = lon.to_radians().sin();
        let clon = lon.to_radians().cos();

        let ssqlat = slat * slat;
        let adb = 1.0 / (1.0 - from.flat);
        let rn = from.axis / (1.0 - from.e2 * ssqlat).sqrt();
        let rm = from.axis * (1.0 - from.e2) / (1.0 - from.e2 * ssqlat).powf(1.5);

        let dlat = ((-dx * slat * clon - dy * slat * slon)
            + dz * clat
            + da * (rn * from.e2 * slat * clat / from.axis)
            + df * (rm * adb + rn / adb) * slat * clat)
            / rm;
        let dlon = (-dx * slon + dy * clon) / (rn * clat);

        (lat + dlat.to_degrees(), lon + dlon.to_degrees())
    }
}

/// Default datum parameter table.
///
/// Each entry maps a spheroid name (spaces replaced with underscores) to
/// "datumName,dx,dy,dz" where the offsets are the mean shift to WGS 84 in
/// meters.
const DEFAULT_DATUM_TABLE: &[(&str, &str)] = &[
    ("Clarke_1866", "North American 1927,-8,160,176"),
    ("Bessel", "Tokyo,-148,507,685"),
    ("International_1909", "European 1950,-87,-98,-121"),
    ("WGS_72", "WGS 72,0,0,4.5"),
    ("Everest", "Indian,289,734,257"),
    ("GRS_1980", "North American 1983,0,0,0"),
    ("Airy", "Ordnance Survey GB 1936,375,-111,431"),
    ("WGS_84", "WGS 84,0,0,0"),
    ("Australian_National", "Australian Geodetic 1966,-133,-48,148"),
    ("Krassovsky", "Pulkovo 1942,28,-130,-95"),
    (
        "Sphere_of_radius_6370997_m",
        "Sphere of radius 6370997 m,0,0,0",
    ),
];

/// A cache of datum instances, one per spheroid code.
///
/// Datum parameters come from a key/value table mapping the spheroid name
/// (spaces replaced by underscores) to a "datumName,dx,dy,dz" string. The
/// built-in table covers the common spheroids; callers with their own datum
/// parameters construct the factory with [`DatumFactory::with_table`].
///
/// Because [`Datum`] compares by identity, all datums in a program should
/// come from a single factory.
pub struct DatumFactory {
    table: HashMap<String, String>,
    cache: HashMap<i32, Arc<Datum>>,
}

impl Default for DatumFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl DatumFactory {
    /// Creates a factory backed by the built-in datum parameter table.
    pub fn new() -> Self {
        let table = DEFAULT_DATUM_TABLE
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            table,
            cache: HashMap::new(),
        }
    }

    /// Creates a factory backed by a caller-supplied parameter table.
    pub fn with_table(table: HashMap<String, String>) -> Self {
        Self {
            table,
            cache: HashMap::new(),
        }
    }

    /// Gets the datum for a standard spheroid code, creating and caching it
    /// on first use.
    pub fn create(&mut self, spheroid_code: i32) -> Result<Arc<Datum>, DatumError> {
        if let Some(datum) = self.cache.get(&spheroid_code) {
            return Ok(Arc::clone(datum));
        }
        let i = spheroid_code as usize;
        if spheroid_code < 0 || i >= spheroid::SPHEROID_NAMES.len() {
            return Err(DatumError::NotFound(spheroid_code));
        }
        let key = spheroid::SPHEROID_NAMES[i].replace(' ', "_");
        let value = self
            .table
            .get(&key)
            .ok_or(DatumError::NotFound(spheroid_code))?;

        let fields: Vec<&str> = value.split(',').collect();
        if fields.len() != 4 {
            return Err(DatumError::Malformed {
                key,
                reason: format!("expected 4 comma-separated fields, got {}", fields.len()),
            });
        }
        let name = fields[0].trim();
        let mut offsets = [0.0f64; 3];
        for (j, field) in fields[1..].iter().enumerate() {
            offsets[j] = field.trim().parse::<f64>().map_err(|_| DatumError::Malformed {
                key: key.clone(),
                reason: format!("offset field '{}' is not a number", field),
            })?;
        }

        let datum = Arc::new(Datum::from_spheroid(
            name,
            spheroid_code,
            offsets[0],
            offsets[1],
            offsets[2],
        )?);
        debug!(
            "Created datum '{}' on {} (dx={}, dy={}, dz={})",
            datum.name(),
            datum.spheroid_name(),
            offsets[0],
            offsets[1],
            offsets[2]
        );
        self.cache.insert(spheroid_code, Arc::clone(&datum));
        Ok(datum)
    }
}
