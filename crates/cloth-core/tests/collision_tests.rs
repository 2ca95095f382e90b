use approx::assert_relative_eq;
use cloth_core::collision::resolve_penetration;
use cloth_core::config::CollisionSphere;
use cloth_core::particle::ParticleSet;
use glam::Vec3;

fn sphere() -> CollisionSphere {
    CollisionSphere::new(Vec3::new(0.0, -2.0, 0.0), 1.5)
}

#[test]
fn test_penetrating_particle_is_projected_to_surface() {
    let mut particles = ParticleSet::new(1);
    particles.position[0] = Vec3::new(0.0, -1.0, 0.0);
    particles.prev_position[0] = Vec3::new(0.0, -0.8, 0.0);
    particles.velocity[0] = Vec3::new(0.0, -3.0, 0.0);

    let moved = resolve_penetration(&mut particles, &sphere());

    assert_eq!(moved, 1);
    assert_relative_eq!(particles.position[0].y, -0.5, epsilon = 1e-6);
    assert_eq!(particles.position[0].x, 0.0);
    // only position is corrected
    assert_eq!(particles.prev_position[0], Vec3::new(0.0, -0.8, 0.0));
    assert_eq!(particles.velocity[0], Vec3::new(0.0, -3.0, 0.0));
}

#[test]
fn test_projection_keeps_radial_direction() {
    let s = sphere();
    let mut particles = ParticleSet::new(1);
    particles.position[0] = s.center + Vec3::new(0.3, 0.4, 0.0);

    resolve_penetration(&mut particles, &s);

    let offset = particles.position[0] - s.center;
    assert_relative_eq!(offset.length(), 1.5, epsilon = 1e-5);
    assert_relative_eq!(offset.x / offset.y, 0.75, epsilon = 1e-5);
}

#[test]
fn test_outside_and_locked_particles_are_left_alone() {
    let mut particles = ParticleSet::new(2);
    particles.place(0, Vec3::new(0.0, 1.0, 0.0));
    particles.place(1, Vec3::new(0.0, -2.5, 0.0));
    particles.locked[1] = true;

    let moved = resolve_penetration(&mut particles, &sphere());

    assert_eq!(moved, 0);
    assert_eq!(particles.position[0], Vec3::new(0.0, 1.0, 0.0));
    assert_eq!(particles.position[1], Vec3::new(0.0, -2.5, 0.0));
}

#[test]
fn test_particle_at_centre_uses_previous_position() {
    let s = sphere();
    let mut particles = ParticleSet::new(1);
    particles.position[0] = s.center;
    particles.prev_position[0] = s.center + Vec3::new(2.0, 0.0, 0.0);

    resolve_penetration(&mut particles, &s);

    assert_eq!(particles.position[0], s.center + Vec3::new(1.5, 0.0, 0.0));
}
