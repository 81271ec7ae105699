pub mod albers;
pub mod azimuthal_equidistant;
pub mod common;
pub mod equidistant_conic;
pub mod equirectangular;
pub mod geographic;
pub mod hammer;
pub mod hotine_oblique_mercator;
pub mod lambert_azimuthal;
pub mod lambert_conformal;
pub mod mercator;
pub mod miller;
pub mod mollweide;
pub mod near_side_perspective;
pub mod orthographic;
pub mod polar_stereographic;
pub mod polyconic;
pub mod robinson;
pub mod sinusoidal;
pub mod space_oblique_mercator;
pub mod state_plane;
pub mod stereographic;
pub mod transverse_mercator;
pub mod utm;
pub mod van_der_grinten;
pub mod wagner_iv;

use std::sync::Arc;

use crate::affine::Affine;
use crate::datum::Datum;
use crate::error::ProjError;

/// A map projection supporting forward and inverse point transforms.
///
/// Every implementation is a self-contained value: all parameters are
/// resolved at construction and instances carry no shared mutable state,
/// so a projection can be used from multiple threads behind a reference.
///
/// `forward` takes geodetic (lat, lon) in radians and produces map plane
/// (x, y) in meters; `inverse` goes the other way. The one exception is
/// the geographic projection, which is angular: its map plane is
/// (lon, lat) in degrees and [`Projection::is_angular`] returns true so
/// the grid layer skips the radians conversion.
pub trait Projection: Send + Sync {
    /// Forward transform: geodetic (lat, lon) to map (x, y).
    fn forward(&self, lat: f64, lon: f64) -> Result<(f64, f64), ProjError>;

    /// Inverse transform: map (x, y) to geodetic (lat, lon).
    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64), ProjError>;

    /// The datum of the geodetic coordinates on both sides.
    fn datum(&self) -> &Arc<Datum>;

    /// A short human-readable description of the projection system and
    /// its parameters.
    fn describe(&self) -> String;

    fn clone_projection(&self) -> Box<dyn Projection>;

    /// True when the map plane is angular (degrees) rather than metric.
    fn is_angular(&self) -> bool {
        false
    }

    /// Notifies the projection of the grid geometry it is bound to.
    ///
    /// Called by the grid composition layer on construction, subsetting
    /// and re-centering. Only projections whose behavior depends on the
    /// grid extent (the geographic projection's longitude wrapping)
    /// override this.
    fn bind_grid(&mut self, _data_to_map: &Affine, _dims: [usize; 2]) {}
}

impl Clone for Box<dyn Projection> {
    fn clone(&self) -> Self {
        self.clone_projection()
    }
}
