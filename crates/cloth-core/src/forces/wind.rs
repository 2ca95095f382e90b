use glam::Vec3;

/// Oscillating wind acceleration at `pos` and elapsed time `time`.
///
/// Deterministic in position and time. `extent` stretches the slow
/// streamwise term over the cloth, usually the grid size.
///
/// ```text
/// w = (sin(x*y*t), cos(z*t), 5*sin(x*t/extent))
/// ```
#[inline]
pub fn wind_force(pos: Vec3, time: f32, extent: f32) -> Vec3 {
    Vec3::new(
        (pos.x * pos.y * time).sin(),
        (pos.z * time).cos(),
        5.0 * (pos.x * time / extent).sin(),
    )
}
