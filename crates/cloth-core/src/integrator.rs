use glam::Vec3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::particle::ParticleSet;

/// Advance every unlocked particle one step with position Verlet.
///
/// ```text
/// new      = p + (p - prev) + force * dt^2
/// velocity = (new - prev) / (2 * dt)
/// prev     = p
/// p        = new
/// ```
///
/// The velocity is a central difference over two steps and so trails the
/// position by one step; damping in the next step uses this lagged value.
/// Locked particles are left exactly as they are. `dt` must be positive.
pub fn integrate(particles: &mut ParticleSet, dt: f32) {
    let ParticleSet {
        position,
        prev_position,
        velocity,
        force,
        locked,
        ..
    } = particles;

    #[cfg(feature = "parallel")]
    {
        position
            .par_iter_mut()
            .zip(prev_position.par_iter_mut())
            .zip(velocity.par_iter_mut())
            .zip(force.par_iter().zip(locked.par_iter()))
            .for_each(|(((p, prev), v), (&f, &l))| {
                if !l {
                    verlet(p, prev, v, f, dt);
                }
            });
    }

    #[cfg(not(feature = "parallel"))]
    {
        position
            .iter_mut()
            .zip(prev_position.iter_mut())
            .zip(velocity.iter_mut())
            .zip(force.iter().zip(locked.iter()))
            .for_each(|(((p, prev), v), (&f, &l))| {
                if !l {
                    verlet(p, prev, v, f, dt);
                }
            });
    }
}

#[inline]
fn verlet(p: &mut Vec3, prev: &mut Vec3, v: &mut Vec3, force: Vec3, dt: f32) {
    let current = *p;
    let next = current + (current - *prev) + force * (dt * dt);
    *v = (next - *prev) / (2.0 * dt);
    *prev = current;
    *p = next;
}
