pub mod spring;
pub mod wind;

use glam::Vec3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::collision::soft_collision_force;
use crate::config::SimulationParams;
use crate::particle::ParticleSet;
use crate::topology::{Spring, SpringAdjacency};

use self::spring::{compute_spring_forces, gather_spring_forces};
use self::wind::wind_force;

/// Builds the per-particle net force for one step.
///
/// Runs as separate passes over plain arrays; each pass completes before
/// the next one reads its output:
///
/// 1. reset every force to gravity
/// 2. evaluate each spring into a per-spring buffer, then gather those
///    into each unlocked particle in adjacency order
/// 3. damping, wind and soft sphere repulsion for unlocked particles
///
/// Every force cell has a single writer, so the parallel path needs no
/// atomics and sums in the same order as the sequential one.
pub struct ForceAccumulator {
    adjacency: SpringAdjacency,
    spring_forces: Vec<Vec3>,
    wind_extent: f32,
}

impl ForceAccumulator {
    /// # Panics
    /// If a spring endpoint is not below `particle_count`.
    pub fn new(springs: &[Spring], particle_count: usize) -> Self {
        Self {
            adjacency: SpringAdjacency::build(springs, particle_count),
            spring_forces: vec![Vec3::ZERO; springs.len()],
            wind_extent: 1.0,
        }
    }

    /// Length scale of the slow wind term, usually the grid size.
    pub fn with_wind_extent(mut self, extent: f32) -> Self {
        self.wind_extent = extent.max(1.0);
        self
    }

    pub fn adjacency(&self) -> &SpringAdjacency {
        &self.adjacency
    }

    /// Force on endpoint `a` of each spring from the latest pass.
    pub fn spring_forces(&self) -> &[Vec3] {
        &self.spring_forces
    }

    /// Overwrite `particles.force` with this step's net force.
    ///
    /// `springs` must be the list this accumulator was built from.
    pub fn accumulate(
        &mut self,
        particles: &mut ParticleSet,
        springs: &[Spring],
        params: &SimulationParams,
    ) {
        debug_assert_eq!(springs.len(), self.spring_forces.len());
        debug_assert_eq!(particles.count, self.adjacency.particle_count());

        let ParticleSet {
            position,
            velocity,
            force,
            locked,
            ..
        } = particles;
        let (position, velocity, locked) = (&position[..], &velocity[..], &locked[..]);

        // Pass 1: gravity background
        let gravity = params.gravity;
        for_each_particle(force, |_, f| *f = gravity);

        // Pass 2: springs
        compute_spring_forces(springs, position, params.stiffness, &mut self.spring_forces);
        let adjacency = &self.adjacency;
        let spring_forces = &self.spring_forces;
        for_each_particle(force, |i, f| {
            if !locked[i] {
                *f += gather_spring_forces(adjacency, spring_forces, i);
            }
        });

        // Pass 3: per-particle external terms
        let damping = params.damping;
        let wind = params.wind.then_some((params.wind_strength, params.time, self.wind_extent));
        let sphere = params.sphere;
        for_each_particle(force, |i, f| {
            if locked[i] {
                return;
            }
            let vel = velocity[i];
            if vel != Vec3::ZERO {
                *f -= vel * damping;
            }
            if let Some((strength, time, extent)) = wind {
                *f += wind_force(position[i], time, extent) * strength;
            }
            if let Some(sphere) = &sphere {
                if let Some(push) = soft_collision_force(position[i], sphere) {
                    *f += push;
                }
            }
        });
    }
}

/// Run `op(index, force_cell)` over every particle, in parallel when enabled.
fn for_each_particle<F>(force: &mut [Vec3], op: F)
where
    F: Fn(usize, &mut Vec3) + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        force.par_iter_mut().enumerate().for_each(|(i, f)| op(i, f));
    }

    #[cfg(not(feature = "parallel"))]
    {
        force.iter_mut().enumerate().for_each(|(i, f)| op(i, f));
    }
}
