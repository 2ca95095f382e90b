use crate::collision::resolve_penetration;
use crate::config::{ClothConfig, SimulationParams};
use crate::error::ClothError;
use crate::forces::ForceAccumulator;
use crate::geometry::GeometryBuffers;
use crate::integrator::integrate;
use crate::state::{ClothSnapshot, ClothState};
use crate::topology::LockMask;

/// Steps a cloth sheet through time.
///
/// The caller owns the [`SimulationParams`] and may change them between
/// steps; each step reads one copy of them throughout.
pub struct ClothSolver {
    state: ClothState,
    forces: ForceAccumulator,
    steps: u64,
}

impl ClothSolver {
    pub fn new(config: ClothConfig) -> Result<Self, ClothError> {
        let state = ClothState::build(&config)?;
        Ok(Self::from_state(state))
    }

    /// Resume from a previously saved snapshot.
    pub fn restore(snapshot: ClothSnapshot) -> Result<Self, ClothError> {
        ClothState::restore(snapshot).map(Self::from_state)
    }

    fn from_state(state: ClothState) -> Self {
        let forces = ForceAccumulator::new(state.springs(), state.particles().count)
            .with_wind_extent(state.grid_size() as f32);
        Self {
            state,
            forces,
            steps: 0,
        }
    }

    /// Restore the flat reference pose with `lock_mask` pinned.
    pub fn reset(&mut self, lock_mask: &LockMask) -> Result<(), ClothError> {
        self.state.reset(lock_mask)?;
        self.steps = 0;
        Ok(())
    }

    /// Advance the cloth by `params.dt`.
    ///
    /// Forces are accumulated, then unlocked particles are integrated, then
    /// any that ended on or inside the collision sphere are projected onto
    /// its surface. Invalid parameters are rejected before anything moves.
    pub fn step(&mut self, params: &SimulationParams) -> Result<(), ClothError> {
        let params = *params;
        params.validate()?;

        let (particles, springs) = self.state.parts_mut();
        self.forces.accumulate(particles, springs, &params);
        integrate(particles, params.dt);
        if let Some(sphere) = &params.sphere {
            let projected = resolve_penetration(particles, sphere);
            if projected > 0 {
                tracing::trace!(step = self.steps, projected, "particles projected onto sphere");
            }
        }

        self.steps += 1;
        Ok(())
    }

    /// Positions, spring lines and, when asked, triangle and vertex normals.
    pub fn export_geometry(&self, include_normals: bool) -> GeometryBuffers {
        GeometryBuffers::from_state(&self.state, include_normals)
    }

    pub fn snapshot(&self) -> ClothSnapshot {
        self.state.snapshot()
    }

    pub fn state(&self) -> &ClothState {
        &self.state
    }

    pub fn grid_size(&self) -> usize {
        self.state.grid_size()
    }

    pub fn spring_count(&self) -> usize {
        self.state.springs().len()
    }

    /// Steps taken since construction or the last reset.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}
