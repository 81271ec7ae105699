//! Grid composition layer tying a projection to a data grid.
//!
//! A [`MapProjection`] owns a boxed projection, the grid dimensions and
//! the affine relating data (row, col) to map (x, y). It handles the
//! degrees/radians conversion at the boundary, shifts incoming
//! locations onto the projection datum, and maps per-point projection
//! failures to invalid locations rather than errors so that bulk grid
//! traversal never has to branch on a `Result`.

use log::trace;
use std::sync::Arc;

use crate::affine::Affine;
use crate::datum::{Datum, DatumFactory};
use crate::error::TransformError;
use crate::location::{DataLocation, EarthLocation};
use crate::proj::orthographic::OrthographicProjection;
use crate::proj::Projection;
use crate::spheroid::SPHERE;

#[derive(Clone)]
pub struct MapProjection {
    projection: Box<dyn Projection>,
    dims: [usize; 2],
    /// Data (row, col) to map (x, y).
    data_to_map: Affine,
    /// Map (x, y) to data (row, col); the checked inverse of the above.
    map_to_data: Affine,
}

impl MapProjection {
    /// Creates a grid-bound projection. Fails when the affine is not
    /// invertible.
    pub fn new(
        mut projection: Box<dyn Projection>,
        dims: [usize; 2],
        data_to_map: Affine,
    ) -> Result<Self, TransformError> {
        let map_to_data = data_to_map.inverse()?;
        projection.bind_grid(&data_to_map, dims);
        Ok(Self {
            projection,
            dims,
            data_to_map,
            map_to_data,
        })
    }

    /// An orthographic view of the standard sphere centered on a
    /// location, with the grid derived from the dimensions and pixel
    /// sizes in meters as [height, width].
    pub fn orthographic(
        center: &EarthLocation,
        dims: [usize; 2],
        pixel_dims: [f64; 2],
    ) -> Result<Self, TransformError> {
        let datum = DatumFactory::new().create(SPHERE)?;
        let projection = OrthographicProjection::new(
            datum,
            center.lon.to_radians(),
            center.lat.to_radians(),
            0.0,
            0.0,
        );
        let rows = dims[0] as f64;
        let cols = dims[1] as f64;
        let affine = Affine {
            a: 0.0,
            b: pixel_dims[1],
            c: -pixel_dims[1] * (cols - 1.0) / 2.0,
            d: -pixel_dims[0],
            e: 0.0,
            f: pixel_dims[0] * (rows - 1.0) / 2.0,
        };
        MapProjection::new(Box::new(projection), dims, affine)
    }

    pub fn dims(&self) -> [usize; 2] {
        self.dims
    }

    pub fn datum(&self) -> &Arc<Datum> {
        self.projection.datum()
    }

    pub fn projection(&self) -> &dyn Projection {
        self.projection.as_ref()
    }

    /// The data (row, col) to map (x, y) affine.
    pub fn affine(&self) -> Affine {
        self.data_to_map
    }

    pub fn describe(&self) -> String {
        self.projection.describe()
    }

    /// Converts a data location to an earth location on the projection
    /// datum. Points the projection cannot invert come back invalid.
    pub fn to_earth(&self, loc: &DataLocation) -> EarthLocation {
        let (x, y) = self.data_to_map.apply(loc.row, loc.col);
        match self.projection.inverse(x, y) {
            Ok((lat, lon)) => {
                let (lat, lon) = if self.projection.is_angular() {
                    (lat, lon)
                } else {
                    (lat.to_degrees(), lon.to_degrees())
                };
                EarthLocation::new(lat, lon, Arc::clone(self.projection.datum()))
            }
            Err(err) => {
                trace!("Inverse transform failed at ({}, {}): {}", x, y, err);
                EarthLocation::invalid(Arc::clone(self.projection.datum()))
            }
        }
    }

    /// Converts an earth location to a data location, shifting it onto
    /// the projection datum first when it is referenced to a different
    /// one. Points outside the projection domain come back invalid.
    pub fn to_grid(&self, loc: &EarthLocation) -> DataLocation {
        let shifted;
        let loc = if Datum::same(loc.datum(), self.datum()) {
            loc
        } else {
            shifted = loc.shift_datum(self.datum());
            &shifted
        };
        let (lat, lon) = if self.projection.is_angular() {
            (loc.lat, loc.lon)
        } else {
            (loc.lat.to_radians(), loc.lon.to_radians())
        };
        match self.projection.forward(lat, lon) {
            Ok((x, y)) => {
                let (row, col) = self.map_to_data.apply(x, y);
                DataLocation::new(row, col)
            }
            Err(err) => {
                trace!(
                    "Forward transform failed at ({}, {}): {}",
                    loc.lat,
                    loc.lon,
                    err
                );
                DataLocation::invalid()
            }
        }
    }

    /// The closest integer data location for an earth location, or an
    /// invalid location when it falls off the grid.
    pub fn closest(&self, loc: &EarthLocation) -> DataLocation {
        let data_loc = self.to_grid(loc).round();
        if data_loc.is_contained(self.dims) {
            data_loc
        } else {
            DataLocation::invalid()
        }
    }

    /// Great-circle distance in kilometers between the earth locations
    /// of two data locations.
    pub fn distance(&self, a: &DataLocation, b: &DataLocation) -> f64 {
        self.to_earth(a).distance(&self.to_earth(b))
    }

    /// Grid resolution at a data location as [row, col] extents in
    /// kilometers, from centered differences half a grid cell away.
    pub fn resolution(&self, loc: &DataLocation) -> [f64; 2] {
        let row_res = self.distance(
            &DataLocation::new(loc.row - 0.5, loc.col),
            &DataLocation::new(loc.row + 0.5, loc.col),
        );
        let col_res = self.distance(
            &DataLocation::new(loc.row, loc.col - 0.5),
            &DataLocation::new(loc.row, loc.col + 0.5),
        );
        [row_res, col_res]
    }

    /// A projection for the subgrid starting at `new_origin` with
    /// dimensions `new_dims`: the new (0, 0) maps to the same earth
    /// location as `new_origin` does here.
    pub fn subset(
        &self,
        new_origin: &DataLocation,
        new_dims: [usize; 2],
    ) -> Result<MapProjection, TransformError> {
        let affine = self.data_to_map.translated(new_origin.row, new_origin.col);
        MapProjection::new(self.projection.clone(), new_dims, affine)
    }

    /// A projection with the same dimensions whose grid is re-derived
    /// from a center location and pixel sizes in meters as
    /// [height, width] (degrees per pixel for angular projections).
    pub fn with_center(
        &self,
        center: &EarthLocation,
        pixel_dims: [f64; 2],
    ) -> Result<MapProjection, TransformError> {
        let (lat, lon) = if self.projection.is_angular() {
            (center.lat, center.lon)
        } else {
            (center.lat.to_radians(), center.lon.to_radians())
        };
        let (xc, yc) = self.projection.forward(lat, lon)?;
        let rows = self.dims[0] as f64;
        let cols = self.dims[1] as f64;
        let affine = Affine {
            a: 0.0,
            b: pixel_dims[1],
            c: xc - pixel_dims[1] * (cols - 1.0) / 2.0,
            d: -pixel_dims[0],
            e: 0.0,
            f: yc + pixel_dims[0] * (rows - 1.0) / 2.0,
        };
        MapProjection::new(self.projection.clone(), self.dims, affine)
    }

    /// The pixel size in meters. Only meaningful for square pixels.
    pub fn pixel_size(&self) -> f64 {
        (self.data_to_map.a * self.data_to_map.a
            + self.data_to_map.d * self.data_to_map.d)
            .sqrt()
    }

    /// The pixel dimensions in meters as [height, width]. Only
    /// meaningful for non-rotating affines.
    pub fn pixel_dims(&self) -> [f64; 2] {
        [-self.data_to_map.d, self.data_to_map.b]
    }
}
