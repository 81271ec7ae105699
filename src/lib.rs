//! Earth location transforms for gridded satellite data.
//!
//! The crate maps between geodetic coordinates and the row/column space
//! of a projected data grid. The pieces compose bottom up:
//!
//! * [`spheroid`] and [`datum`] hold the reference ellipsoids and
//!   horizontal datums, with Molodensky shifts between them.
//! * [`proj`] implements the map projection family with forward
//!   (lat/lon to map x/y) and inverse transforms per projection.
//! * [`affine`] plus [`transform::MapProjection`] tie a projection to a
//!   grid through a data-to-map affine, giving earth-to-grid and
//!   grid-to-earth conversion, resolution estimates, and subsetting.
//! * [`locset`] indexes earth locations into equal-area bins for
//!   nearest-point queries against swath or grid geometry.
//!
//! No logger is installed here; the library logs through the `log`
//! facade and leaves the choice of backend to the application.

pub mod affine;
pub mod datum;
pub mod error;
pub mod location;
pub mod locset;
pub mod proj;
pub mod spheroid;
pub mod transform;

pub use affine::Affine;
pub use datum::{Datum, DatumFactory};
pub use error::{DatumError, ProjError, TransformError};
pub use location::{DataLocation, EarthLocation};
pub use locset::EarthLocationSet;
pub use proj::Projection;
pub use transform::MapProjection;
