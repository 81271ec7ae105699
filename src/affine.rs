/// A 2D affine transform relating data-grid and map-plane coordinates.
///
/// Maps data (row, col) to map (x, y):
///   x = a * row + b * col + c
///   y = d * row + e * col + f
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// The identity transform.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0)
    }

    /// Apply the transform: (row, col) -> (x, y).
    pub fn apply(&self, row: f64, col: f64) -> (f64, f64) {
        let x = self.a * row + self.b * col + self.c;
        let y = self.d * row + self.e * col + self.f;
        (x, y)
    }

    /// A copy whose input origin is moved to (row0, col0): the result maps
    /// (row, col) the way self maps (row + row0, col + col0).
    pub fn translated(&self, row0: f64, col0: f64) -> Affine {
        let (c, f) = self.apply(row0, col0);
        Affine { c, f, ..*self }
    }

    /// Compute the inverse affine transform.
    pub fn inverse(&self) -> Result<Affine, crate::error::TransformError> {
        let det = self.a * self.e - self.b * self.d;
        if det.abs() < f64::EPSILON {
            return Err(crate::error::TransformError::Affine(
                "Singular affine transform (determinant is zero)".into(),
            ));
        }
        let inv_det = 1.0 / det;
        Ok(Affine {
            a: self.e * inv_det,
            b: -self.b * inv_det,
            c: (self.b * self.f - self.e * self.c) * inv_det,
            d: -self.d * inv_det,
            e: self.a * inv_det,
            f: (self.d * self.c - self.a * self.f) * inv_det,
        })
    }
}
