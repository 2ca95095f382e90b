use glam::Vec3;

use crate::error::ClothError;
use crate::topology::{particle_count, LockMask, Topology};

/// Default spring stiffness `k`.
pub const DEFAULT_STIFFNESS: f32 = 10_000.0;
/// Default collision (penalty) stiffness of a sphere.
pub const DEFAULT_COLLISION_STIFFNESS: f32 = 5_000.0;

/// A static sphere the cloth collides with.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionSphere {
    pub center: Vec3,
    pub radius: f32,
    /// Scale of the soft push-out force per unit of penetration depth.
    pub stiffness: f32,
}

impl CollisionSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius,
            stiffness: DEFAULT_COLLISION_STIFFNESS,
        }
    }

    pub fn with_stiffness(mut self, stiffness: f32) -> Self {
        self.stiffness = stiffness;
        self
    }

    fn validate(&self) -> Result<(), ClothError> {
        if !self.center.is_finite() {
            return Err(ClothError::InvalidParameter {
                name: "sphere.center",
                value: f32::NAN,
            });
        }
        non_negative("sphere.radius", self.radius)?;
        non_negative("sphere.stiffness", self.stiffness)
    }
}

/// Per-step tunables, owned by the caller and passed into every step.
///
/// The solver copies this struct once at the start of a step, so a step
/// always sees one consistent set of values.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationParams {
    pub gravity: Vec3,
    /// Spring stiffness `k`.
    pub stiffness: f32,
    /// Velocity damping coefficient `kD`.
    pub damping: f32,
    /// Fixed time step, must be positive.
    pub dt: f32,
    /// Elapsed simulated time, drives the wind field.
    pub time: f32,
    pub sphere: Option<CollisionSphere>,
    pub wind: bool,
    pub wind_strength: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.8, 0.0),
            stiffness: DEFAULT_STIFFNESS,
            damping: 1.0,
            dt: 1.0 / 200.0,
            time: 0.0,
            sphere: None,
            wind: false,
            wind_strength: 1.0,
        }
    }
}

impl SimulationParams {
    /// Check every value a step depends on.
    pub fn validate(&self) -> Result<(), ClothError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            tracing::warn!(dt = self.dt, "rejecting non-positive time step");
            return Err(ClothError::InvalidTimeStep(self.dt));
        }
        if !self.gravity.is_finite() {
            return Err(ClothError::InvalidParameter {
                name: "gravity",
                value: f32::NAN,
            });
        }
        non_negative("stiffness", self.stiffness)?;
        non_negative("damping", self.damping)?;
        if !self.time.is_finite() {
            return Err(ClothError::InvalidParameter {
                name: "time",
                value: self.time,
            });
        }
        if !self.wind_strength.is_finite() {
            return Err(ClothError::InvalidParameter {
                name: "wind_strength",
                value: self.wind_strength,
            });
        }
        if let Some(sphere) = &self.sphere {
            sphere.validate()?;
        }
        Ok(())
    }

    /// Move the clock forward by one time step.
    pub fn advance(&mut self) {
        self.time += self.dt;
    }
}

/// Shape of the cloth, fixed for the lifetime of a solver.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClothConfig {
    /// Particles per grid edge (the grid is `grid_size × grid_size`).
    pub grid_size: usize,
    /// Distance between axis neighbours in the flat pose.
    pub spacing: f32,
    pub topology: Topology,
    pub lock_mask: LockMask,
}

impl Default for ClothConfig {
    fn default() -> Self {
        Self {
            grid_size: 50,
            spacing: 1.0,
            topology: Topology::StructuralShear,
            lock_mask: LockMask::TopCorners,
        }
    }
}

impl ClothConfig {
    pub fn new(grid_size: usize) -> Self {
        Self {
            grid_size,
            ..Self::default()
        }
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_lock_mask(mut self, lock_mask: LockMask) -> Self {
        self.lock_mask = lock_mask;
        self
    }

    pub fn validate(&self) -> Result<(), ClothError> {
        if !(self.spacing.is_finite() && self.spacing > 0.0) {
            return Err(ClothError::InvalidSpacing(self.spacing));
        }
        particle_count(self.grid_size)?;
        self.lock_mask.cells(self.grid_size).map(|_| ())
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ClothError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        tracing::warn!(name, value, "rejecting parameter");
        Err(ClothError::InvalidParameter { name, value })
    }
}
