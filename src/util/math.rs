//! Math type re-exports and small geometry helpers.

pub use glam::{Mat4, Vec3};

/// Axis-aligned bounding box of a point set, `(min, max)`.
///
/// Returns zero vectors for an empty set.
pub fn compute_bounds(points: &[Vec3]) -> (Vec3, Vec3) {
    let Some((&first, rest)) = points.split_first() else {
        return (Vec3::ZERO, Vec3::ZERO);
    };
    rest.iter()
        .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)))
}
