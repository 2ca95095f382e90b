//! Mass-spring cloth simulation.
//!
//! An N×N particle grid joined by springs, advanced with position Verlet,
//! with optional wind and collision against a static sphere. A step runs as
//! separate passes (forces, integration, collision), and the renderer reads
//! [`geometry::GeometryBuffers`] built afterwards.
//!
//! ```
//! use cloth_core::{ClothConfig, ClothSolver, SimulationParams};
//!
//! let mut solver = ClothSolver::new(ClothConfig::new(8)).unwrap();
//! let mut params = SimulationParams::default();
//! for _ in 0..10 {
//!     solver.step(&params).unwrap();
//!     params.advance();
//! }
//! let geometry = solver.export_geometry(true);
//! assert_eq!(geometry.positions.len(), 64);
//! ```

pub mod collision;
pub mod config;
pub mod error;
pub mod forces;
pub mod geometry;
pub mod integrator;
pub mod particle;
pub mod solver;
pub mod state;
pub mod topology;

pub use config::{ClothConfig, CollisionSphere, SimulationParams};
pub use error::ClothError;
pub use geometry::GeometryBuffers;
pub use particle::ParticleSet;
pub use solver::ClothSolver;
pub use state::{ClothSnapshot, ClothState};
pub use topology::{LockMask, Spring, Topology};
