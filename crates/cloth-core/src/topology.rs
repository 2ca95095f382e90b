use glam::Vec3;

use crate::error::ClothError;

/// Which neighbour pairs of the grid are joined by springs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Topology {
    /// Horizontal and vertical edges only.
    Structural,
    /// Structural edges plus both diagonals of every quad.
    StructuralShear,
}

impl Topology {
    pub fn name(self) -> &'static str {
        match self {
            Topology::Structural => "structural",
            Topology::StructuralShear => "structural+shear",
        }
    }
}

/// Spring between particles `a` and `b`.
///
/// `rest_length` is taken from the flat reference layout and never changes
/// afterwards, so stretching the cloth does not move its rest configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spring {
    pub a: u32,
    pub b: u32,
    pub rest_length: f32,
}

impl Spring {
    pub fn new(a: u32, b: u32, rest_length: f32) -> Self {
        Self { a, b, rest_length }
    }
}

/// Particles pinned in place by a reset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LockMask {
    /// Nothing pinned, the whole sheet is free.
    None,
    /// The two corners of the last row, `(0, N-1)` and `(N-1, N-1)`.
    #[default]
    TopCorners,
    AllCorners,
    /// Explicit `(x, y)` cells.
    Cells(Vec<(usize, usize)>),
}

impl LockMask {
    /// Resolve the mask to sorted, deduplicated particle indices.
    pub fn cells(&self, grid_size: usize) -> Result<Vec<usize>, ClothError> {
        let n = grid_size;
        let cells: Vec<(usize, usize)> = match self {
            LockMask::None => Vec::new(),
            _ if n == 0 => Vec::new(),
            LockMask::TopCorners => vec![(0, n - 1), (n - 1, n - 1)],
            LockMask::AllCorners => vec![(0, 0), (0, n - 1), (n - 1, 0), (n - 1, n - 1)],
            LockMask::Cells(cells) => cells.clone(),
        };

        let mut indices = Vec::with_capacity(cells.len());
        for (x, y) in cells {
            if x >= n || y >= n {
                return Err(ClothError::LockOutOfBounds { x, y, grid_size });
            }
            indices.push(grid_index(x, y, n));
        }
        indices.sort_unstable();
        indices.dedup();
        Ok(indices)
    }
}

/// Number of particles in a `grid_size` grid.
///
/// Fails when `grid_size²` does not fit a `u32`, the width of a spring endpoint.
pub fn particle_count(grid_size: usize) -> Result<usize, ClothError> {
    grid_size
        .checked_mul(grid_size)
        .filter(|&count| count <= u32::MAX as usize)
        .ok_or(ClothError::GridTooLarge(grid_size))
}

/// Flat index of cell `(x, y)`.
#[inline]
pub fn grid_index(x: usize, y: usize, grid_size: usize) -> usize {
    x * grid_size + y
}

/// Reference (flat, at rest) position of cell `(x, y)`.
#[inline]
pub fn lattice_position(x: usize, y: usize, spacing: f32) -> Vec3 {
    Vec3::new(x as f32 * spacing, y as f32 * spacing, 0.0)
}

/// Number of springs [`build_springs`] emits.
pub fn spring_count(grid_size: usize, topology: Topology) -> usize {
    let m = grid_size.saturating_sub(1);
    match topology {
        Topology::Structural => 2 * grid_size * m,
        Topology::StructuralShear => m * (4 * m + 1) + m,
    }
}

/// Clear `springs` and refill it with the springs of a `grid_size` grid.
///
/// Order, for each row `x < N-1`: per cell `y < N-1` the `+x` edge, the
/// `+y` edge and (with shear) the two diagonals, then the row's closing
/// `+x` edge at `y = N-1`. The last column's `+y` edges come at the end.
/// Renderers index springs positionally, so this order is fixed.
pub fn build_springs(
    grid_size: usize,
    spacing: f32,
    topology: Topology,
    springs: &mut Vec<Spring>,
) {
    springs.clear();
    springs.reserve(spring_count(grid_size, topology));
    if grid_size < 2 {
        return;
    }

    let n = grid_size;
    let mut push = |(ax, ay): (usize, usize), (bx, by): (usize, usize)| {
        let rest_length =
            lattice_position(ax, ay, spacing).distance(lattice_position(bx, by, spacing));
        springs.push(Spring::new(
            grid_index(ax, ay, n) as u32,
            grid_index(bx, by, n) as u32,
            rest_length,
        ));
    };

    for x in 0..n - 1 {
        for y in 0..n - 1 {
            push((x, y), (x + 1, y));
            push((x, y), (x, y + 1));
            if topology == Topology::StructuralShear {
                push((x, y), (x + 1, y + 1));
                push((x, y + 1), (x + 1, y));
            }
        }
        push((x, n - 1), (x + 1, n - 1));
    }
    for y in 0..n - 1 {
        push((n - 1, y), (n - 1, y + 1));
    }
}

/// Which end of a spring a particle sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpringEnd {
    A,
    B,
}

/// Springs touching a particle, in spring order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Incidence {
    pub spring: u32,
    pub end: SpringEnd,
}

/// Spring-to-particle adjacency, built once per topology.
///
/// Lets the spring pass gather per particle instead of scattering per
/// spring, so every force cell has exactly one writer. Construction is a
/// counting sort: count incidences per particle -> prefix sum -> scatter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpringAdjacency {
    /// `start[i]..start[i + 1]` is particle `i`'s range in `incidences`
    start: Vec<u32>,
    incidences: Vec<Incidence>,
}

impl SpringAdjacency {
    /// # Panics
    /// If a spring endpoint is not below `particle_count`.
    pub fn build(springs: &[Spring], particle_count: usize) -> Self {
        let mut start = vec![0u32; particle_count + 1];
        for s in springs {
            start[s.a as usize + 1] += 1;
            start[s.b as usize + 1] += 1;
        }
        for i in 1..=particle_count {
            start[i] += start[i - 1];
        }

        let mut cursor = start.clone();
        let mut incidences = vec![
            Incidence {
                spring: 0,
                end: SpringEnd::A,
            };
            springs.len() * 2
        ];
        for (k, s) in springs.iter().enumerate() {
            for (particle, end) in [(s.a, SpringEnd::A), (s.b, SpringEnd::B)] {
                let slot = &mut cursor[particle as usize];
                incidences[*slot as usize] = Incidence {
                    spring: k as u32,
                    end,
                };
                *slot += 1;
            }
        }

        Self { start, incidences }
    }

    pub fn particle_count(&self) -> usize {
        self.start.len().saturating_sub(1)
    }

    #[inline]
    pub fn incident(&self, particle: usize) -> &[Incidence] {
        let lo = self.start[particle] as usize;
        let hi = self.start[particle + 1] as usize;
        &self.incidences[lo..hi]
    }
}
