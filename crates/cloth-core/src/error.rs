//! Error types for cloth configuration and persisted state.

use thiserror::Error;

/// Errors reported while configuring the cloth or restoring saved state.
///
/// Stepping itself never fails on numerics: degenerate geometry (coincident
/// particles, a particle at the sphere centre) is skipped, not reported.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ClothError {
    /// The time step must be finite and strictly positive.
    #[error("time step must be finite and positive, got {0}")]
    InvalidTimeStep(f32),

    /// A scalar parameter is out of its valid range.
    #[error("parameter `{name}` is out of range: {value}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// The lattice spacing must be finite and strictly positive.
    #[error("lattice spacing must be finite and positive, got {0}")]
    InvalidSpacing(f32),

    /// The grid holds more particles than a `u32` spring endpoint can index.
    #[error("a {0}x{0} grid has too many particles to index")]
    GridTooLarge(usize),

    /// A lock mask names a cell outside the grid.
    #[error("lock cell ({x}, {y}) is outside a {grid_size}x{grid_size} grid")]
    LockOutOfBounds {
        /// Cell column.
        x: usize,
        /// Cell row.
        y: usize,
        /// Grid edge length.
        grid_size: usize,
    },

    /// A snapshot array does not hold one entry per particle.
    #[error("snapshot field `{field}` has {actual} entries, expected {expected}")]
    SnapshotLength {
        /// Name of the array.
        field: &'static str,
        /// Required length (`grid_size²`).
        expected: usize,
        /// Length found.
        actual: usize,
    },

    /// A spring endpoint index lies outside the particle array.
    #[error("spring {spring} references particle {index}, but only {count} exist")]
    SpringOutOfBounds {
        /// Position of the spring in the list.
        spring: usize,
        /// The offending endpoint.
        index: u32,
        /// Number of particles.
        count: usize,
    },

    /// A spring's rest length does not match its endpoints' reference distance.
    #[error("spring {spring} has rest length {actual}, expected {expected}")]
    RestLengthMismatch {
        /// Position of the spring in the list.
        spring: usize,
        /// Reference distance between the endpoints.
        expected: f32,
        /// Stored rest length.
        actual: f32,
    },

    /// The spring list is not the canonical list for the grid and topology.
    #[error("spring list does not match the {topology} topology ({reason})")]
    TopologyMismatch {
        /// Topology named by the snapshot.
        topology: &'static str,
        /// What differed.
        reason: String,
    },
}
