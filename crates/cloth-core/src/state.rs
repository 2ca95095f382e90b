use glam::Vec3;

use crate::config::ClothConfig;
use crate::error::ClothError;
use crate::particle::ParticleSet;
use crate::topology::{
    build_springs, grid_index, lattice_position, particle_count, LockMask, Spring, Topology,
};

/// Relative tolerance when checking restored rest lengths.
const REST_LENGTH_TOLERANCE: f32 = 1e-5;

/// Particle grid plus its spring network.
///
/// Only the solver's step mutates a live state; everything else reads it.
#[derive(Clone, Debug, PartialEq)]
pub struct ClothState {
    grid_size: usize,
    spacing: f32,
    topology: Topology,
    particles: ParticleSet,
    springs: Vec<Spring>,
}

/// Plain-array copy of a [`ClothState`], suitable for persisting.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClothSnapshot {
    pub grid_size: usize,
    pub spacing: f32,
    pub topology: Topology,
    pub position: Vec<[f32; 3]>,
    pub prev_position: Vec<[f32; 3]>,
    pub velocity: Vec<[f32; 3]>,
    pub locked: Vec<bool>,
    pub springs: Vec<Spring>,
}

impl ClothState {
    /// Build the flat reference pose described by `config`.
    pub fn build(config: &ClothConfig) -> Result<Self, ClothError> {
        config.validate()?;
        let n = config.grid_size;
        let mut state = Self {
            grid_size: n,
            spacing: config.spacing,
            topology: config.topology,
            particles: ParticleSet::new(particle_count(n)?),
            springs: Vec::new(),
        };
        state.reset(&config.lock_mask)?;
        Ok(state)
    }

    /// Return every particle to the flat pose at rest and re-pin by `lock_mask`.
    ///
    /// The spring list is refilled in place with identical order and rest
    /// lengths. Calling this twice leaves the same state as calling it once.
    /// On error nothing is modified.
    pub fn reset(&mut self, lock_mask: &LockMask) -> Result<(), ClothError> {
        let pinned = lock_mask.cells(self.grid_size)?;
        let n = self.grid_size;

        for x in 0..n {
            for y in 0..n {
                let i = grid_index(x, y, n);
                self.particles.place(i, lattice_position(x, y, self.spacing));
                self.particles.locked[i] = false;
            }
        }
        for &i in &pinned {
            self.particles.locked[i] = true;
        }
        build_springs(n, self.spacing, self.topology, &mut self.springs);

        tracing::debug!(
            grid_size = n,
            springs = self.springs.len(),
            locked = pinned.len(),
            topology = self.topology.name(),
            "cloth reset"
        );
        Ok(())
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    /// Current length of spring `k`.
    pub fn spring_length(&self, k: usize) -> f32 {
        let s = &self.springs[k];
        let p = &self.particles.position;
        p[s.a as usize].distance(p[s.b as usize])
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut ParticleSet, &[Spring]) {
        (&mut self.particles, &self.springs)
    }

    pub fn snapshot(&self) -> ClothSnapshot {
        let p = &self.particles;
        ClothSnapshot {
            grid_size: self.grid_size,
            spacing: self.spacing,
            topology: self.topology,
            position: p.position.iter().map(|v| v.to_array()).collect(),
            prev_position: p.prev_position.iter().map(|v| v.to_array()).collect(),
            velocity: p.velocity.iter().map(|v| v.to_array()).collect(),
            locked: p.locked.clone(),
            springs: self.springs.clone(),
        }
    }

    /// Rebuild a state from a snapshot, checking it against the grid.
    ///
    /// Springs must reference particles inside the grid, carry the rest
    /// length of their reference layout, and match the canonical spring
    /// order of the snapshot's topology. Locked particles come back at rest.
    pub fn restore(snapshot: ClothSnapshot) -> Result<Self, ClothError> {
        if !(snapshot.spacing.is_finite() && snapshot.spacing > 0.0) {
            return Err(ClothError::InvalidSpacing(snapshot.spacing));
        }
        let n = snapshot.grid_size;
        let count = particle_count(n)?;

        check_len("position", snapshot.position.len(), count)?;
        check_len("prev_position", snapshot.prev_position.len(), count)?;
        check_len("velocity", snapshot.velocity.len(), count)?;
        check_len("locked", snapshot.locked.len(), count)?;

        for (k, s) in snapshot.springs.iter().enumerate() {
            for index in [s.a, s.b] {
                if index as usize >= count {
                    return Err(ClothError::SpringOutOfBounds { spring: k, index, count });
                }
            }
            let expected = reference_position(s.a, n, snapshot.spacing)
                .distance(reference_position(s.b, n, snapshot.spacing));
            if (expected - s.rest_length).abs() > REST_LENGTH_TOLERANCE * expected.max(1.0) {
                return Err(ClothError::RestLengthMismatch {
                    spring: k,
                    expected,
                    actual: s.rest_length,
                });
            }
        }

        let mut canonical = Vec::new();
        build_springs(n, snapshot.spacing, snapshot.topology, &mut canonical);
        if canonical.len() != snapshot.springs.len() {
            return Err(ClothError::TopologyMismatch {
                topology: snapshot.topology.name(),
                reason: format!(
                    "expected {} springs, found {}",
                    canonical.len(),
                    snapshot.springs.len()
                ),
            });
        }
        if let Some((k, (want, got))) = canonical
            .iter()
            .zip(&snapshot.springs)
            .enumerate()
            .find(|(_, (want, got))| (want.a, want.b) != (got.a, got.b))
        {
            return Err(ClothError::TopologyMismatch {
                topology: snapshot.topology.name(),
                reason: format!(
                    "spring {k} joins {}-{}, expected {}-{}",
                    got.a, got.b, want.a, want.b
                ),
            });
        }

        let mut particles = ParticleSet::new(count);
        for i in 0..count {
            let position = finite_vec("position", snapshot.position[i])?;
            particles.position[i] = position;
            particles.locked[i] = snapshot.locked[i];
            if snapshot.locked[i] {
                particles.prev_position[i] = position;
            } else {
                particles.prev_position[i] =
                    finite_vec("prev_position", snapshot.prev_position[i])?;
                particles.velocity[i] = finite_vec("velocity", snapshot.velocity[i])?;
            }
        }

        tracing::debug!(grid_size = n, springs = canonical.len(), "cloth restored from snapshot");
        Ok(Self {
            grid_size: n,
            spacing: snapshot.spacing,
            topology: snapshot.topology,
            particles,
            springs: snapshot.springs,
        })
    }
}

fn reference_position(index: u32, grid_size: usize, spacing: f32) -> Vec3 {
    let i = index as usize;
    lattice_position(i / grid_size, i % grid_size, spacing)
}

fn check_len(field: &'static str, actual: usize, expected: usize) -> Result<(), ClothError> {
    if actual == expected {
        Ok(())
    } else {
        Err(ClothError::SnapshotLength { field, expected, actual })
    }
}

fn finite_vec(name: &'static str, v: [f32; 3]) -> Result<Vec3, ClothError> {
    let v = Vec3::from_array(v);
    match v.to_array().into_iter().find(|c| !c.is_finite()) {
        Some(value) => Err(ClothError::InvalidParameter { name, value }),
        None => Ok(v),
    }
}
