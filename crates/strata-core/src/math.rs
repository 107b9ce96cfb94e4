//! Math re-exports and float helpers.

pub use glam::Vec2;

/// Tolerance used when comparing composite input values.
pub const CMP_EPSILON: f32 = 0.00001;

/// Returns true when `a` and `b` differ by no more than [`CMP_EPSILON`].
///
/// NaN never compares equal, which lets callers seed caches with NaN to force
/// the first comparison to report a change.
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    if a == b {
        return true;
    }
    (a - b).abs() <= CMP_EPSILON
}

/// Component-wise [`approx_eq`] for vectors.
#[inline]
pub fn approx_eq_vec2(a: Vec2, b: Vec2) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}
