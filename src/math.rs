//! Math types for EmberSonic

pub use glam::Vec3;

/// Returns a unit-length copy of `dir`, or `None` when the vector carries no
/// usable direction (zero or non-finite length).
pub fn normalize_direction(dir: Vec3) -> Option<Vec3> {
    let len = dir.length();
    if len > f32::EPSILON && len.is_finite() {
        Some(dir / len)
    } else {
        None
    }
}
