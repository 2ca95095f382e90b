use glam::Vec3;

/// SoA particle storage.
///
/// Grid cloths store particle `(x, y)` at index `x * grid_size + y`.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSet {
    pub count: usize,
    pub position: Vec<Vec3>,
    /// Position at the previous step (Verlet memory)
    pub prev_position: Vec<Vec3>,
    /// Central-difference estimate, one step behind `position`
    pub velocity: Vec<Vec3>,
    /// Net force scratch, rebuilt every step
    pub force: Vec<Vec3>,
    /// Pinned particles are never moved by the integrator or collisions
    pub locked: Vec<bool>,
}

impl ParticleSet {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            position: vec![Vec3::ZERO; count],
            prev_position: vec![Vec3::ZERO; count],
            velocity: vec![Vec3::ZERO; count],
            force: vec![Vec3::ZERO; count],
            locked: vec![false; count],
        }
    }

    /// Place particle `i` at rest at `position`.
    pub fn place(&mut self, i: usize, position: Vec3) {
        self.position[i] = position;
        self.prev_position[i] = position;
        self.velocity[i] = Vec3::ZERO;
        self.force[i] = Vec3::ZERO;
    }

    pub fn locked_count(&self) -> usize {
        self.locked.iter().filter(|&&l| l).count()
    }
}
