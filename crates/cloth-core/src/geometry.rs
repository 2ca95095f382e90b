use glam::Vec3;

use crate::state::ClothState;

/// Render-facing buffers derived from a [`ClothState`].
///
/// These never feed back into the simulation. Refresh them after each step
/// that a renderer wants to draw.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryBuffers {
    /// One entry per particle, indexed `x * N + y`.
    pub positions: Vec<Vec3>,
    /// Two entries per spring, `(pos[a], pos[b])`, in spring order.
    pub lines: Vec<Vec3>,
    /// Two per grid quad, in the order of [`triangle_indices`]. Empty unless requested.
    pub triangle_normals: Vec<Vec3>,
    /// One per particle. Empty unless requested.
    pub vertex_normals: Vec<Vec3>,
}

impl GeometryBuffers {
    pub fn from_state(state: &ClothState, include_normals: bool) -> Self {
        let mut buffers = Self::default();
        buffers.update(state, include_normals);
        buffers
    }

    /// Rewrite every buffer from `state`, reusing the allocations.
    pub fn update(&mut self, state: &ClothState, include_normals: bool) {
        let position = &state.particles().position;

        self.positions.clear();
        self.positions.extend_from_slice(position);

        self.lines.clear();
        self.lines.reserve(state.springs().len() * 2);
        for s in state.springs() {
            self.lines.push(position[s.a as usize]);
            self.lines.push(position[s.b as usize]);
        }

        self.triangle_normals.clear();
        self.vertex_normals.clear();
        if include_normals {
            triangle_normals(position, state.grid_size(), &mut self.triangle_normals);
            vertex_normals(&self.triangle_normals, state.grid_size(), &mut self.vertex_normals);
        }
    }

    /// Positions as a flat `[x0, y0, z0, x1, ...]` slice.
    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Line endpoints as a flat `f32` slice.
    pub fn lines_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.lines)
    }

    pub fn vertex_normals_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertex_normals)
    }
}

/// Corner indices `(a, b, c, d)` of quad `(x, y)`.
#[inline]
fn quad_corners(x: usize, y: usize, n: usize) -> [usize; 4] {
    let a = x * n + y;
    [a, a + 1, a + n, a + n + 1]
}

/// Triangle list for the grid: quad `(x, y)` becomes `(a, b, c)` and `(b, c, d)`.
///
/// Static for a given grid size; upload once.
pub fn triangle_indices(grid_size: usize) -> Vec<u32> {
    let m = grid_size.saturating_sub(1);
    let mut indices = Vec::with_capacity(m * m * 6);
    for x in 0..m {
        for y in 0..m {
            let [a, b, c, d] = quad_corners(x, y, grid_size);
            indices.extend([a, b, c, b, c, d].map(|i| i as u32));
        }
    }
    indices
}

/// Unit normal of each triangle of [`triangle_indices`].
///
/// Degenerate (zero-area) triangles get a zero normal.
pub fn triangle_normals(position: &[Vec3], grid_size: usize, out: &mut Vec<Vec3>) {
    let m = grid_size.saturating_sub(1);
    out.clear();
    out.reserve(m * m * 2);
    for x in 0..m {
        for y in 0..m {
            let [a, b, c, d] = quad_corners(x, y, grid_size).map(|i| position[i]);
            out.push((b - a).cross(c - a).normalize_or_zero());
            out.push((d - b).cross(c - b).normalize_or_zero());
        }
    }
}

/// Per-vertex normals: sum of incident triangle normals, renormalized.
pub fn vertex_normals(triangle_normals: &[Vec3], grid_size: usize, out: &mut Vec<Vec3>) {
    let m = grid_size.saturating_sub(1);
    out.clear();
    out.resize(grid_size * grid_size, Vec3::ZERO);
    for x in 0..m {
        for y in 0..m {
            let [a, b, c, d] = quad_corners(x, y, grid_size);
            let t = 2 * (x * m + y);
            let (n1, n2) = (triangle_normals[t], triangle_normals[t + 1]);
            out[a] += n1;
            out[b] += n1 + n2;
            out[c] += n1 + n2;
            out[d] += n2;
        }
    }
    for n in out.iter_mut() {
        *n = n.normalize_or_zero();
    }
}
