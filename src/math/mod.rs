pub mod distance_2d;
pub mod intersect_2d;
pub mod polygon_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global floating-point tolerance for predicates that are not scale-dependent.
pub const TOLERANCE: f64 = 1e-10;

/// Snapping tolerance derived from a decimal precision: `ε = 2·10⁻ᵏ`.
///
/// Nodes closer than `ε` are the same node.
#[must_use]
pub fn tolerance_from_precision(digits: u32) -> f64 {
    let exponent = i32::try_from(digits).unwrap_or(i32::MAX);
    2.0 * 10f64.powi(-exponent)
}

/// Returns `true` if the two points are within `tol` of each other.
#[must_use]
pub fn same_point(a: &Point2, b: &Point2, tol: f64) -> bool {
    (a - b).norm_squared() <= tol * tol
}
