use cloth_core::geometry::{triangle_indices, GeometryBuffers};
use cloth_core::{
    ClothConfig, ClothError, ClothSolver, CollisionSphere, LockMask, SimulationParams, Topology,
};
use bytemuck::Zeroable;
use glam::Vec3;
use wasm_bindgen::prelude::*;

/// GPU-compatible vertex: 24 bytes, matches the WGSL `ClothVertex`
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct GpuVertex {
    position: [f32; 3], // 12 bytes
    normal: [f32; 3],   // 12 bytes
}

/// Collision sphere used until the host configures its own: below the
/// sheet's centre, half a sheet wide.
fn default_sphere(grid_size: usize) -> CollisionSphere {
    let n = grid_size as f32;
    CollisionSphere::new(Vec3::new((n - 1.0) / 2.0, (n - 1.0) / 2.0, -n * 2.0), n / 2.0)
}

fn lock_mask(mode: u32) -> LockMask {
    match mode {
        0 => LockMask::None,
        2 => LockMask::AllCorners,
        _ => LockMask::TopCorners,
    }
}

fn to_js(err: ClothError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Apply `update` to a copy of `params`; the copy is returned only if it validates.
fn updated(
    params: &SimulationParams,
    update: impl FnOnce(&mut SimulationParams),
) -> Result<SimulationParams, ClothError> {
    let mut candidate = *params;
    update(&mut candidate);
    candidate.validate()?;
    Ok(candidate)
}

#[wasm_bindgen]
pub struct ClothWorld {
    solver: ClothSolver,
    params: SimulationParams,
    geometry: GeometryBuffers,
    gpu_buffer: Vec<GpuVertex>,
    indices: Vec<u32>,
}

#[wasm_bindgen]
impl ClothWorld {
    #[wasm_bindgen(constructor)]
    pub fn new(grid_size: usize, shear: bool) -> Result<ClothWorld, JsValue> {
        let topology = if shear {
            Topology::StructuralShear
        } else {
            Topology::Structural
        };
        let config = ClothConfig::new(grid_size).with_topology(topology);
        let solver = ClothSolver::new(config).map_err(to_js)?;

        web_sys::console::log_1(
            &format!(
                "WASM ClothWorld created: {}x{} particles, {} springs",
                grid_size,
                grid_size,
                solver.spring_count()
            )
            .into(),
        );

        let params = SimulationParams {
            sphere: Some(default_sphere(grid_size)),
            ..SimulationParams::default()
        };
        let mut world = ClothWorld {
            solver,
            params,
            geometry: GeometryBuffers::default(),
            gpu_buffer: vec![GpuVertex::zeroed(); grid_size * grid_size],
            indices: triangle_indices(grid_size),
        };
        world.write_gpu_output();
        Ok(world)
    }

    /// Advance one step; returns the elapsed wall-clock time in ms.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<f32, JsValue> {
        let start = js_sys::Date::now();
        self.solver.step(&self.params).map_err(to_js)?;
        self.params.advance();
        self.write_gpu_output();
        let elapsed = js_sys::Date::now() - start;
        Ok(elapsed as f32)
    }

    /// Back to the flat pose. `lock_mode`: 0 none, 1 top corners, 2 all corners.
    #[wasm_bindgen]
    pub fn reset(&mut self, lock_mode: u32) -> Result<(), JsValue> {
        self.solver.reset(&lock_mask(lock_mode)).map_err(to_js)?;
        self.params.time = 0.0;
        self.write_gpu_output();
        Ok(())
    }

    #[wasm_bindgen]
    pub fn get_gpu_buffer_ptr(&self) -> *const f32 {
        self.gpu_buffer.as_ptr() as *const f32
    }

    #[wasm_bindgen]
    pub fn get_gpu_buffer_byte_length(&self) -> usize {
        self.gpu_buffer.len() * std::mem::size_of::<GpuVertex>()
    }

    /// Spring endpoints, two `vec3<f32>` per spring, for wireframe drawing.
    #[wasm_bindgen]
    pub fn get_line_buffer_ptr(&self) -> *const f32 {
        self.geometry.lines_flat().as_ptr()
    }

    #[wasm_bindgen]
    pub fn get_line_buffer_byte_length(&self) -> usize {
        std::mem::size_of_val(self.geometry.lines_flat())
    }

    #[wasm_bindgen]
    pub fn get_index_buffer_ptr(&self) -> *const u32 {
        self.indices.as_ptr()
    }

    #[wasm_bindgen]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    #[wasm_bindgen]
    pub fn particle_count(&self) -> usize {
        self.solver.state().particles().count
    }

    #[wasm_bindgen]
    pub fn spring_count(&self) -> usize {
        self.solver.spring_count()
    }

    // Setters reject values that would fail the next `step` and keep the old params.

    #[wasm_bindgen]
    pub fn set_gravity(&mut self, x: f32, y: f32, z: f32) -> Result<(), JsValue> {
        self.params = updated(&self.params, |p| p.gravity = Vec3::new(x, y, z)).map_err(to_js)?;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_stiffness(&mut self, stiffness: f32) -> Result<(), JsValue> {
        self.params = updated(&self.params, |p| p.stiffness = stiffness).map_err(to_js)?;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_damping(&mut self, damping: f32) -> Result<(), JsValue> {
        self.params = updated(&self.params, |p| p.damping = damping).map_err(to_js)?;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_time_step(&mut self, dt: f32) -> Result<(), JsValue> {
        self.params = updated(&self.params, |p| p.dt = dt).map_err(to_js)?;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_wind(&mut self, enabled: bool, strength: f32) -> Result<(), JsValue> {
        self.params = updated(&self.params, |p| {
            p.wind = enabled;
            p.wind_strength = strength;
        })
        .map_err(to_js)?;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_sphere(
        &mut self,
        x: f32,
        y: f32,
        z: f32,
        radius: f32,
        stiffness: f32,
    ) -> Result<(), JsValue> {
        let sphere = CollisionSphere::new(Vec3::new(x, y, z), radius).with_stiffness(stiffness);
        self.params = updated(&self.params, |p| p.sphere = Some(sphere)).map_err(to_js)?;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn clear_sphere(&mut self) {
        self.params.sphere = None;
    }

    /// Nudge the sphere centre, e.g. from arrow keys.
    #[wasm_bindgen]
    pub fn move_sphere(&mut self, dx: f32, dy: f32, dz: f32) {
        if let Some(sphere) = &mut self.params.sphere {
            sphere.center += Vec3::new(dx, dy, dz);
        }
    }

    /// Current sphere as `[x, y, z, radius]`, empty when there is none.
    #[wasm_bindgen]
    pub fn sphere(&self) -> Vec<f32> {
        self.params
            .sphere
            .map(|s| vec![s.center.x, s.center.y, s.center.z, s.radius])
            .unwrap_or_default()
    }
}

impl ClothWorld {
    fn write_gpu_output(&mut self) {
        self.geometry.update(self.solver.state(), true);
        for (i, vertex) in self.gpu_buffer.iter_mut().enumerate() {
            *vertex = GpuVertex {
                position: self.geometry.positions[i].to_array(),
                normal: self.geometry.vertex_normals[i].to_array(),
            };
        }
    }
}
