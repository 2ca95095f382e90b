use glam::Vec3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::topology::{Spring, SpringAdjacency, SpringEnd};

/// Hooke force on endpoint `a` of `spring`; endpoint `b` receives the negation.
///
/// A stretched spring pulls `a` toward `b`, a compressed one pushes it
/// away. Returns zero when the current length equals the rest length
/// exactly, and when the endpoints coincide (no defined direction).
#[inline]
#[allow(clippy::float_cmp)]
pub fn spring_force(spring: &Spring, position: &[Vec3], stiffness: f32) -> Vec3 {
    let pa = position[spring.a as usize];
    let pb = position[spring.b as usize];
    let delta = pb - pa;
    let length = delta.length();
    if length == spring.rest_length {
        return Vec3::ZERO;
    }
    match delta.try_normalize() {
        Some(dir) => dir * (stiffness * (length - spring.rest_length)),
        None => Vec3::ZERO,
    }
}

/// Evaluate every spring into `out` (one entry per spring, the force on `a`).
pub fn compute_spring_forces(
    springs: &[Spring],
    position: &[Vec3],
    stiffness: f32,
    out: &mut [Vec3],
) {
    debug_assert_eq!(springs.len(), out.len());

    #[cfg(feature = "parallel")]
    {
        out.par_iter_mut()
            .zip(springs.par_iter())
            .for_each(|(f, s)| *f = spring_force(s, position, stiffness));
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (f, s) in out.iter_mut().zip(springs) {
            *f = spring_force(s, position, stiffness);
        }
    }
}

/// Sum the per-spring forces acting on `particle`, in spring order.
#[inline]
pub fn gather_spring_forces(
    adjacency: &SpringAdjacency,
    spring_forces: &[Vec3],
    particle: usize,
) -> Vec3 {
    adjacency
        .incident(particle)
        .iter()
        .fold(Vec3::ZERO, |acc, inc| {
            let f = spring_forces[inc.spring as usize];
            match inc.end {
                SpringEnd::A => acc + f,
                SpringEnd::B => acc - f,
            }
        })
}
