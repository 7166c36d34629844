use super::{Point2, Vector2, TOLERANCE};
use crate::error::{GeometryError, Result};

/// Computes the signed area of a ring (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise. The ring may or
/// may not repeat its first point at the end.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Two-dimensional cross product `a × b`.
#[must_use]
pub fn cross(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Orientation of the turn `a → b → c`: positive for a left (counter-clockwise)
/// turn, negative for a right (clockwise) turn.
#[must_use]
pub fn turn(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    cross(&(b - a), &(c - b))
}

/// Returns `true` if walking `a → b → c` turns clockwise at `b`.
///
/// On a counter-clockwise boundary this marks `b` as a reflex vertex.
#[must_use]
pub fn is_reflex_turn(a: &Point2, b: &Point2, c: &Point2) -> bool {
    let d1 = b - a;
    let d2 = c - b;
    let scale = d1.norm() * d2.norm();
    if scale < TOLERANCE {
        return false;
    }
    cross(&d1, &d2) / scale < -TOLERANCE
}

/// Computes the normalized direction from point `a` to point `b`.
///
/// # Errors
///
/// Returns `GeometryError::ZeroVector` if the segment has zero length.
pub fn segment_direction(a: &Point2, b: &Point2) -> Result<Vector2> {
    let d = b - a;
    let len = d.norm();
    if len < TOLERANCE {
        return Err(GeometryError::ZeroVector.into());
    }
    Ok(d / len)
}

/// Returns the left-pointing normal of a direction vector.
#[must_use]
pub fn left_normal(dir: Vector2) -> Vector2 {
    Vector2::new(-dir.y, dir.x)
}

/// Signed angle in `(-π, π]` turning from direction `from` to direction `to`.
#[must_use]
pub fn turning_angle(from: &Vector2, to: &Vector2) -> f64 {
    cross(from, to).atan2(from.dot(to))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square(ccw: bool) -> Vec<Point2> {
        let mut pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        if !ccw {
            pts.reverse();
        }
        pts
    }

    #[test]
    fn signed_area_orientation() {
        assert!((signed_area_2d(&square(true)) - 1.0).abs() < TOLERANCE);
        assert!((signed_area_2d(&square(false)) + 1.0).abs() < TOLERANCE);
        assert!(signed_area_2d(&[Point2::new(0.0, 0.0)]).abs() < TOLERANCE);
    }

    #[test]
    fn reflex_detection() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        assert!(!is_reflex_turn(&a, &b, &Point2::new(1.0, 1.0)));
        assert!(is_reflex_turn(&a, &b, &Point2::new(1.0, -1.0)));
        // Collinear continuation is not reflex.
        assert!(!is_reflex_turn(&a, &b, &Point2::new(2.0, 0.0)));
    }

    #[test]
    fn direction_and_normal() {
        let dir = segment_direction(&Point2::new(0.0, 0.0), &Point2::new(3.0, 4.0)).unwrap();
        assert!((dir.x - 0.6).abs() < TOLERANCE);
        let n = left_normal(Vector2::new(1.0, 0.0));
        assert!((n.y - 1.0).abs() < TOLERANCE);
        assert!(segment_direction(&Point2::new(1.0, 1.0), &Point2::new(1.0, 1.0)).is_err());
    }

    #[test]
    fn turning_angle_sign() {
        let east = Vector2::new(1.0, 0.0);
        let north = Vector2::new(0.0, 1.0);
        assert!((turning_angle(&east, &north) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((turning_angle(&north, &east) + std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}
