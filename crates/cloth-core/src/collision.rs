use glam::Vec3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::CollisionSphere;
use crate::particle::ParticleSet;

/// Soft phase: penalty force pushing `position` out of the sphere.
///
/// Proportional to penetration depth along the outward radial direction.
/// `None` outside the sphere, and at the exact centre where the direction
/// is undefined.
#[inline]
pub fn soft_collision_force(position: Vec3, sphere: &CollisionSphere) -> Option<Vec3> {
    let offset = position - sphere.center;
    let distance = offset.length();
    let penetration = sphere.radius - distance;
    if penetration <= 0.0 || distance == 0.0 {
        return None;
    }
    Some(offset / distance * (sphere.stiffness * penetration))
}

/// Hard phase: project every unlocked particle on or inside the sphere onto
/// its surface. Returns the number of particles moved.
///
/// Only `position` is corrected. `prev_position` and `velocity` keep their
/// integrated values, so a contact shows up as a velocity jump in the next
/// step's damping term.
pub fn resolve_penetration(particles: &mut ParticleSet, sphere: &CollisionSphere) -> usize {
    let ParticleSet {
        position,
        prev_position,
        locked,
        ..
    } = particles;

    #[cfg(feature = "parallel")]
    {
        position
            .par_iter_mut()
            .zip(prev_position.par_iter())
            .zip(locked.par_iter())
            .map(|((p, &prev), &l)| (!l && project_onto_surface(p, prev, sphere)) as usize)
            .sum()
    }

    #[cfg(not(feature = "parallel"))]
    {
        position
            .iter_mut()
            .zip(prev_position.iter())
            .zip(locked.iter())
            .map(|((p, &prev), &l)| (!l && project_onto_surface(p, prev, sphere)) as usize)
            .sum()
    }
}

/// Move `p` onto the sphere surface if it lies on or inside it.
fn project_onto_surface(p: &mut Vec3, prev: Vec3, sphere: &CollisionSphere) -> bool {
    let offset = *p - sphere.center;
    if offset.length() > sphere.radius {
        return false;
    }
    let dir = offset
        .try_normalize()
        .or_else(|| (prev - sphere.center).try_normalize())
        .unwrap_or_else(|| {
            tracing::trace!("particle at sphere centre, projecting along +Y");
            Vec3::Y
        });
    *p = sphere.center + dir * sphere.radius;
    true
}
