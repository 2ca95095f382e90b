use cloth_core::topology::lattice_position;
use cloth_core::{
    ClothConfig, ClothError, ClothSolver, CollisionSphere, LockMask, SimulationParams, Topology,
};
use glam::Vec3;

#[test]
fn test_rest_lengths_hold_after_reset() {
    for topology in [Topology::Structural, Topology::StructuralShear] {
        let config = ClothConfig::new(7).with_topology(topology).with_spacing(0.5);
        let mut solver = ClothSolver::new(config).unwrap();

        for _ in 0..20 {
            solver.step(&SimulationParams::default()).unwrap();
        }
        solver.reset(&LockMask::TopCorners).unwrap();

        let state = solver.state();
        for (k, s) in state.springs().iter().enumerate() {
            let len = state.spring_length(k);
            assert!(
                (len - s.rest_length).abs() < 1e-6,
                "spring {k}: length {len} != rest {}",
                s.rest_length
            );
        }
    }
}

#[test]
fn test_reset_is_idempotent_and_matches_fresh_build() {
    let config = ClothConfig::new(6);
    let fresh = ClothSolver::new(config.clone()).unwrap();
    let mut solver = ClothSolver::new(config).unwrap();

    let mut params = SimulationParams {
        wind: true,
        ..Default::default()
    };
    for _ in 0..30 {
        solver.step(&params).unwrap();
        params.advance();
    }

    solver.reset(&LockMask::TopCorners).unwrap();
    assert_eq!(solver.state(), fresh.state());
    solver.reset(&LockMask::TopCorners).unwrap();
    assert_eq!(solver.state(), fresh.state());
    assert_eq!(solver.steps(), 0);
}

#[test]
fn test_reset_with_invalid_mask_leaves_state_alone() {
    let mut solver = ClothSolver::new(ClothConfig::new(4)).unwrap();
    solver.step(&SimulationParams::default()).unwrap();
    let before = solver.snapshot();

    let err = solver.reset(&LockMask::Cells(vec![(4, 0)])).unwrap_err();
    assert_eq!(err, ClothError::LockOutOfBounds { x: 4, y: 0, grid_size: 4 });
    assert_eq!(solver.snapshot(), before);
}

#[test]
fn test_locked_particles_never_move() {
    let config = ClothConfig::new(8).with_lock_mask(LockMask::AllCorners);
    let mut solver = ClothSolver::new(config).unwrap();
    let mut params = SimulationParams {
        stiffness: 2000.0,
        wind: true,
        // the (0,0) corner sits inside this sphere
        sphere: Some(CollisionSphere::new(Vec3::new(0.0, 0.0, 0.5), 1.0)),
        ..Default::default()
    };

    let pinned: Vec<usize> = (0..64).filter(|&i| solver.state().particles().locked[i]).collect();
    assert_eq!(pinned, vec![0, 7, 56, 63]);
    let anchors: Vec<Vec3> = pinned
        .iter()
        .map(|&i| solver.state().particles().position[i])
        .collect();

    for _ in 0..300 {
        solver.step(&params).unwrap();
        params.advance();
        let p = solver.state().particles();
        for (&i, &anchor) in pinned.iter().zip(&anchors) {
            assert_eq!(p.position[i], anchor, "locked particle {i} moved");
            assert_eq!(p.prev_position[i], anchor, "locked particle {i} prev moved");
            assert_eq!(p.velocity[i], Vec3::ZERO, "locked particle {i} has velocity");
        }
    }
}

#[test]
fn test_cloth_sags_and_stays_bounded() {
    let n = 4;
    let config = ClothConfig::new(n).with_lock_mask(LockMask::TopCorners);
    let mut solver = ClothSolver::new(config).unwrap();
    let mut params = SimulationParams {
        gravity: Vec3::new(0.0, -9.8, 0.0),
        stiffness: 1000.0,
        damping: 1.0,
        dt: 1.0 / 500.0,
        ..Default::default()
    };

    for _ in 0..1000 {
        solver.step(&params).unwrap();
        params.advance();
    }

    let state = solver.state();
    let p = state.particles();
    for i in 0..n * n {
        if p.locked[i] {
            continue;
        }
        let initial = lattice_position(i / n, i % n, 1.0);
        assert!(
            p.position[i].y < initial.y,
            "particle {i} did not sag: y={} initial={}",
            p.position[i].y,
            initial.y
        );
    }
    for (k, s) in state.springs().iter().enumerate() {
        let len = state.spring_length(k);
        assert!(len < 10.0 * s.rest_length, "spring {k} diverged: {len}");
        assert!(len.is_finite());
    }
}

#[test]
fn test_no_penetration_after_every_step() {
    let n = 10;
    let sphere = CollisionSphere::new(Vec3::new(4.5, -3.0, 0.0), 2.5);
    // unpinned, so the whole sheet falls onto the sphere and drapes
    let config = ClothConfig::new(n).with_lock_mask(LockMask::None);
    let mut solver = ClothSolver::new(config).unwrap();
    let mut params = SimulationParams {
        stiffness: 1000.0,
        sphere: Some(sphere),
        ..Default::default()
    };

    let mut ever_touched = false;
    for step in 0..800 {
        solver.step(&params).unwrap();
        params.advance();

        let p = solver.state().particles();
        for i in 0..n * n {
            let dist = p.position[i].distance(sphere.center);
            assert!(dist.is_finite(), "particle {i} blew up at step {step}");
            if !p.locked[i] {
                assert!(
                    dist >= sphere.radius - 1e-4,
                    "particle {i} inside sphere at step {step}: {dist}"
                );
                ever_touched |= dist < sphere.radius + 0.05;
            }
        }
    }
    assert!(ever_touched, "cloth never reached the sphere");
}

#[test]
fn test_runs_are_bit_identical() {
    let run = || {
        let mut solver = ClothSolver::new(ClothConfig::new(9)).unwrap();
        let mut params = SimulationParams {
            stiffness: 3000.0,
            wind: true,
            sphere: Some(CollisionSphere::new(Vec3::new(4.0, -4.0, 1.0), 3.0)),
            ..Default::default()
        };
        for _ in 0..300 {
            solver.step(&params).unwrap();
            params.advance();
        }
        solver.state().particles().position.clone()
    };

    assert_eq!(run(), run());
}

#[test]
fn test_invalid_time_step_rejected_without_mutation() {
    let mut solver = ClothSolver::new(ClothConfig::new(4)).unwrap();
    solver.step(&SimulationParams::default()).unwrap();
    let before = solver.snapshot();

    for dt in [0.0, -0.01, f32::NAN] {
        let params = SimulationParams {
            dt,
            ..Default::default()
        };
        assert!(matches!(solver.step(&params), Err(ClothError::InvalidTimeStep(_))));
    }
    assert_eq!(solver.snapshot(), before);
    assert_eq!(solver.steps(), 1);
}

#[test]
fn test_invalid_config_rejected() {
    assert_eq!(
        ClothSolver::new(ClothConfig::new(4).with_spacing(0.0)).err(),
        Some(ClothError::InvalidSpacing(0.0))
    );
    let params = SimulationParams {
        stiffness: -1.0,
        ..Default::default()
    };
    let mut solver = ClothSolver::new(ClothConfig::new(4)).unwrap();
    assert_eq!(
        solver.step(&params),
        Err(ClothError::InvalidParameter { name: "stiffness", value: -1.0 })
    );
}

#[test]
fn test_oversized_grid_rejected_before_allocation() {
    let config = ClothConfig::new(70_000);
    assert_eq!(config.validate(), Err(ClothError::GridTooLarge(70_000)));
    assert_eq!(ClothSolver::new(config).err(), Some(ClothError::GridTooLarge(70_000)));
}

#[test]
fn test_degenerate_grids_step_quietly() {
    for n in [0, 1] {
        let mut solver = ClothSolver::new(ClothConfig::new(n)).unwrap();
        for _ in 0..10 {
            solver.step(&SimulationParams::default()).unwrap();
        }
        assert_eq!(solver.spring_count(), 0);
    }

    // a single unlocked particle simply falls
    let mut solver = ClothSolver::new(ClothConfig::new(1).with_lock_mask(LockMask::None)).unwrap();
    for _ in 0..10 {
        solver.step(&SimulationParams::default()).unwrap();
    }
    assert!(solver.state().particles().position[0].y < 0.0);
}

#[test]
fn test_fully_locked_cloth_is_frozen() {
    let n = 3;
    let every_cell: Vec<(usize, usize)> =
        (0..n).flat_map(|x| (0..n).map(move |y| (x, y))).collect();
    let config = ClothConfig::new(n).with_lock_mask(LockMask::Cells(every_cell));
    let mut solver = ClothSolver::new(config).unwrap();
    let before = solver.state().particles().position.clone();

    for _ in 0..20 {
        solver.step(&SimulationParams::default()).unwrap();
    }
    assert_eq!(solver.state().particles().position, before);
}
