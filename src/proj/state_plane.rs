//! State Plane Coordinate System projections.
//!
//! Each SPCS zone is a preconfigured instance of one of four base
//! projections (Transverse Mercator, Lambert Conformal Conic,
//! Polyconic or Hotine Oblique Mercator). Zone parameters come from
//! the standard NAD27 / NAD83 parameter tables, supplied by the caller
//! as raw bytes in the GCTP record format: 432-byte records holding a
//! 32-byte zone name, a big-endian i32 projection id and nine
//! big-endian f64 parameters, with angles packed as DDDMMSS.SSS.

use std::sync::Arc;

use log::debug;

use crate::datum::{Datum, DatumFactory};
use crate::error::ProjError;
use crate::proj::common::{pakcz, paksz};
use crate::proj::hotine_oblique_mercator::HotineObliqueMercatorProjection;
use crate::proj::lambert_conformal::LambertConformalConicProjection;
use crate::proj::polyconic::PolyconicProjection;
use crate::proj::transverse_mercator::TransverseMercatorProjection;
use crate::proj::Projection;
use crate::spheroid::{CLARKE1866, GRS1980};

/// Size of one zone record in the parameter tables.
const RECORD_SIZE: usize = 432;

/// Zone numbers in NAD27 parameter table order.
const NAD27_ZONES: [i32; 134] = [
    101, 102, 5010, 5300, 201, 202, 203, 301, 302, 401, 402, 403, 404, 405,
    406, 407, 501, 502, 503, 600, 700, 901, 902, 903, 1001, 1002, 5101, 5102,
    5103, 5104, 5105, 1101, 1102, 1103, 1201, 1202, 1301, 1302, 1401, 1402,
    1501, 1502, 1601, 1602, 1701, 1702, 1703, 1801, 1802, 1900, 2001, 2002,
    2101, 2102, 2103, 2111, 2112, 2113, 2201, 2202, 2203, 2301, 2302, 2401,
    2402, 2403, 2501, 2502, 2503, 2601, 2602, 2701, 2702, 2703, 2800, 2900,
    3001, 3002, 3003, 3101, 3102, 3103, 3104, 3200, 3301, 3302, 3401, 3402,
    3501, 3502, 3601, 3602, 3701, 3702, 3800, 3901, 3902, 4001, 4002, 4100,
    4201, 4202, 4203, 4204, 4205, 4301, 4302, 4303, 4400, 4501, 4502, 4601,
    4602, 4701, 4702, 4801, 4802, 4803, 4901, 4902, 4903, 4904, 5001, 5002,
    5003, 5004, 5005, 5006, 5007, 5008, 5009, 5201, 5202, 5400,
];

/// Zone numbers in NAD83 parameter table order. Zeros mark zones that
/// were retired in the NAD83 definition.
const NAD83_ZONES: [i32; 134] = [
    101, 102, 5010, 5300, 201, 202, 203, 301, 302, 401, 402, 403, 404, 405,
    406, 0, 501, 502, 503, 600, 700, 901, 902, 903, 1001, 1002, 5101, 5102,
    5103, 5104, 5105, 1101, 1102, 1103, 1201, 1202, 1301, 1302, 1401, 1402,
    1501, 1502, 1601, 1602, 1701, 1702, 1703, 1801, 1802, 1900, 2001, 2002,
    2101, 2102, 2103, 2111, 2112, 2113, 2201, 2202, 2203, 2301, 2302, 2401,
    2402, 2403, 2500, 0, 0, 2600, 0, 2701, 2702, 2703, 2800, 2900, 3001,
    3002, 3003, 3101, 3102, 3103, 3104, 3200, 3301, 3302, 3401, 3402, 3501,
    3502, 3601, 3602, 3701, 3702, 3800, 3900, 0, 4001, 4002, 4100, 4201,
    4202, 4203, 4204, 4205, 4301, 4302, 4303, 4400, 4501, 4502, 4601, 4602,
    4701, 4702, 4801, 4802, 4803, 4901, 4902, 4903, 4904, 5001, 5002, 5003,
    5004, 5005, 5006, 5007, 5008, 5009, 5200, 0, 5400,
];

/// The reference datum of a state plane zone definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatePlaneDatum {
    Nad27,
    Nad83,
}

#[derive(Clone)]
pub struct StatePlaneProjection {
    zone: i32,
    zone_name: String,
    inner: Box<dyn Projection>,
}

fn read_f64(record: &[u8], offset: usize) -> f64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&record[offset..offset + 8]);
    f64::from_be_bytes(buf)
}

/// Converts a packed DDDMMSS.SSS table angle to radians.
fn unpack_angle(packed: f64) -> Result<f64, ProjError> {
    Ok(paksz(pakcz(packed))?.to_radians())
}

impl StatePlaneProjection {
    /// Creates the projection for a state plane zone. `params` holds
    /// the full parameter table for the requested datum, in the GCTP
    /// record format described in the module docs.
    pub fn new(
        zone: i32,
        sp_datum: StatePlaneDatum,
        params: &[u8],
    ) -> Result<Self, ProjError> {
        let zones: &[i32; 134] = match sp_datum {
            StatePlaneDatum::Nad27 => &NAD27_ZONES,
            StatePlaneDatum::Nad83 => &NAD83_ZONES,
        };
        let ind = if zone > 0 {
            zones.iter().position(|&z| z == zone)
        } else {
            None
        }
        .ok_or(ProjError::UnknownZone(zone))?;

        let start = ind * RECORD_SIZE;
        if params.len() < start + RECORD_SIZE {
            return Err(ProjError::InvalidParameter(format!(
                "parameter table too short for zone {} (need {} bytes, have {})",
                zone,
                start + RECORD_SIZE,
                params.len()
            )));
        }
        let record = &params[start..start + RECORD_SIZE];
        let zone_name: String = record[0..32]
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| b as char)
            .collect();
        let id = i32::from_be_bytes([record[32], record[33], record[34], record[35]]);
        let mut table = [0.0f64; 9];
        for (i, value) in table.iter_mut().enumerate() {
            *value = read_f64(record, 36 + i * 8);
        }
        if id <= 0 {
            return Err(ProjError::UnknownZone(zone));
        }
        debug!(
            "State Plane zone {} ({}): projection id {}",
            zone,
            zone_name.trim(),
            id
        );

        let spheroid = match sp_datum {
            StatePlaneDatum::Nad27 => CLARKE1866,
            StatePlaneDatum::Nad83 => GRS1980,
        };
        let datum = DatumFactory::new().create(spheroid).map_err(|err| {
            ProjError::InvalidParameter(format!("datum lookup failed: {}", err))
        })?;

        let inner: Box<dyn Projection> = match id {
            1 => Box::new(TransverseMercatorProjection::new(
                datum,
                table[3],
                unpack_angle(table[2])?,
                unpack_angle(table[6])?,
                table[7],
                table[8],
            )),
            2 => Box::new(LambertConformalConicProjection::new(
                datum,
                unpack_angle(table[5])?,
                unpack_angle(table[4])?,
                unpack_angle(table[2])?,
                unpack_angle(table[6])?,
                table[7],
                table[8],
            )?),
            3 => Box::new(PolyconicProjection::new(
                datum,
                unpack_angle(table[2])?,
                unpack_angle(table[3])?,
                table[4],
                table[5],
            )),
            4 => Box::new(HotineObliqueMercatorProjection::with_azimuth(
                datum,
                table[3],
                unpack_angle(table[5])?,
                unpack_angle(table[2])?,
                unpack_angle(table[6])?,
                table[7],
                table[8],
            )?),
            other => {
                return Err(ProjError::InvalidParameter(format!(
                    "zone {} has unknown base projection id {}",
                    zone, other
                )))
            }
        };

        Ok(Self {
            zone,
            zone_name,
            inner,
        })
    }

    pub fn zone(&self) -> i32 {
        self.zone
    }

    /// The zone name from the parameter table.
    pub fn zone_name(&self) -> &str {
        self.zone_name.trim()
    }
}

impl Projection for StatePlaneProjection {
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError> {
        self.inner.forward(lat, lon)
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError> {
        self.inner.inverse(x, y)
    }

    fn datum(&self) -> &Arc<Datum> {
        self.inner.datum()
    }

    fn describe(&self) -> String {
        format!(
            "State Plane zone {} via {}",
            self.zone,
            self.inner.describe()
        )
    }

    fn clone_projection(&self) -> Box<dyn Projection> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Builds a parameter table with a single populated zone record.
    fn table_with_zone(
        zones: &[i32; 134],
        zone: i32,
        name: &str,
        id: i32,
        values: [f64; 9],
    ) -> Vec<u8> {
        let ind = zones.iter().position(|&z| z == zone).unwrap();
        let mut bytes = vec![0u8; (ind + 1) * RECORD_SIZE];
        let start = ind * RECORD_SIZE;
        bytes[start..start + name.len()].copy_from_slice(name.as_bytes());
        bytes[start + 32..start + 36].copy_from_slice(&id.to_be_bytes());
        for (i, v) in values.iter().enumerate() {
            let off = start + 36 + i * 8;
            bytes[off..off + 8].copy_from_slice(&v.to_be_bytes());
        }
        bytes
    }

    #[test]
    fn test_rhode_island_zone() {
        // NAD27 zone 3800 (Rhode Island) is a Transverse Mercator with
        // scale 1 - 1/160000, central meridian 71 30 W, origin
        // latitude 41 05 N, false easting 500000 ft (in meters here).
        let values = [
            6378206.4,
            0.00676866,
            -713000.0, // lon 71d30m00s W packed
            0.99999375,
            0.0,
            0.0,
            410500.0, // lat 41d05m00s N packed
            152400.3048,
            0.0,
        ];
        let params =
            table_with_zone(&NAD27_ZONES, 3800, "RHODE ISLAND", 1, values);
        let proj =
            StatePlaneProjection::new(3800, StatePlaneDatum::Nad27, &params)
                .unwrap();
        assert_eq!(proj.zone(), 3800);
        assert_eq!(proj.zone_name(), "RHODE ISLAND");
        assert_eq!(proj.datum().spheroid_name(), "Clarke 1866");

        let lat = 41.7f64.to_radians();
        let lon = (-71.5f64).to_radians();
        let (x, y) = proj.forward(lat, lon).unwrap();
        // On the central meridian: x is the false easting and y is the
        // meridian arc from the origin latitude.
        assert_relative_eq!(x, 152400.3048, epsilon = 1e-6);
        assert!(y > 0.0 && y < 100000.0);
        let (lat2, lon2) = proj.inverse(x, y).unwrap();
        assert_relative_eq!(lat2, lat, epsilon = 1e-8);
        assert_relative_eq!(lon2, lon, epsilon = 1e-8);
    }

    #[test]
    fn test_unknown_zone() {
        assert!(matches!(
            StatePlaneProjection::new(9999, StatePlaneDatum::Nad27, &[]),
            Err(ProjError::UnknownZone(9999))
        ));
    }

    #[test]
    fn test_short_table() {
        assert!(StatePlaneProjection::new(101, StatePlaneDatum::Nad27, &[0u8; 10])
            .is_err());
    }

    #[test]
    fn test_lambert_zone() {
        // A two-parallel Lambert zone in the NAD83 table.
        let values = [
            6378137.0,
            0.0066943800229,
            -1203000.0, // central meridian 120d30m W
            0.0,
            474000.0, // upper parallel 47d40m N (table order is 2 then 1)
            460500.0, // lower parallel 46d05m N
            453000.0, // origin latitude 45d30m N
            500000.0,
            0.0,
        ];
        let params = table_with_zone(&NAD83_ZONES, 4601, "WASHINGTON NORTH", 2, values);
        let proj =
            StatePlaneProjection::new(4601, StatePlaneDatum::Nad83, &params)
                .unwrap();
        let lat = 47.0f64.to_radians();
        let lon = (-122.0f64).to_radians();
        let (x, y) = proj.forward(lat, lon).unwrap();
        let (lat2, lon2) = proj.inverse(x, y).unwrap();
        assert_relative_eq!(lat2, lat, epsilon = 1e-8);
        assert_relative_eq!(lon2, lon, epsilon = 1e-8);
    }
}
