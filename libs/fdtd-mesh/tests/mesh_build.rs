use fdtd_mesh::bounded::{boundaries, build_bounded_types, expand_to_simulation_bounds, fixed_lines};
use fdtd_mesh::geometry::{PhysicalPrimitive, Primitive, PropertyKind};
use fdtd_mesh::{
    Axis, BoundingBox, MeshConfig, MeshEngine, PmlCells, RectilinearGrid, SimulationContext,
    SimulationExtent, Tolerance,
};
use glam::DVec3;

struct Bench {
    wavelength: f64,
    pml: PmlCells,
}

impl SimulationContext for Bench {
    fn min_wavelength(&self) -> f64 {
        self.wavelength
    }

    fn pml_cells(&self) -> PmlCells {
        self.pml
    }
}

fn bench(pml: PmlCells) -> Bench {
    Bench {
        wavelength: 10.0,
        pml,
    }
}

/// Substrate with a ground plane below and a trace on top, both sheets.
fn microstrip() -> Vec<PhysicalPrimitive> {
    vec![
        PhysicalPrimitive::dielectric(DVec3::ZERO, DVec3::new(20.0, 10.0, 1.6)),
        PhysicalPrimitive::conductor(DVec3::ZERO, DVec3::new(20.0, 10.0, 0.0)),
        PhysicalPrimitive::conductor(DVec3::new(0.0, 4.0, 1.6), DVec3::new(20.0, 6.0, 1.6)),
    ]
}

fn assert_increasing(lines: &[f64]) {
    assert!(
        lines.windows(2).all(|w| w[1] > w[0]),
        "lines not strictly increasing: {lines:?}"
    );
}

#[test]
fn lines_increase_and_keep_fixed_positions() {
    let mut engine = MeshEngine::new(MeshConfig::default()).unwrap();
    engine.add_fixed_line(Axis::X, 7.5).unwrap();
    engine
        .build(&bench(PmlCells::none()), &microstrip(), &mut RectilinearGrid::new())
        .unwrap();

    let tol = Tolerance::default();
    for axis in Axis::ALL {
        assert_increasing(engine.lines(axis));
        for &fixed in engine.fixed_lines(axis) {
            let lines = engine.lines(axis);
            assert!(lines.contains(&fixed), "{axis}: fixed line {fixed} missing");
            assert_eq!(lines.iter().filter(|&&l| tol.eq(l, fixed)).count(), 1);
        }
    }
    assert_eq!(engine.fixed_lines(Axis::X), &[7.5]);
    assert_eq!(engine.fixed_lines(Axis::Z), &[0.0, 1.6]);
}

#[test]
fn bounded_types_tile_the_simulation_extent() {
    let tol = Tolerance::default();
    let prims = microstrip();
    for axis in Axis::ALL {
        let fixed = fixed_lines(&prims, axis, &[], &tol);
        let bounds = boundaries(&prims, axis, &fixed, &tol);
        let mut types = build_bounded_types(&prims, axis, &bounds, &fixed, &tol);
        let (lower, upper) =
            expand_to_simulation_bounds(&mut types, axis, &SimulationExtent::default(), 1.0, &tol)
                .unwrap();

        assert_eq!(types[0].lower, lower);
        assert_eq!(types[types.len() - 1].upper, upper);
        for pair in types.windows(2) {
            assert_eq!(pair[0].upper, pair[1].lower, "{axis}: gap in {types:?}");
        }
    }
}

#[test]
fn rebuild_is_idempotent() {
    let mut engine = MeshEngine::new(MeshConfig::default()).unwrap();
    let ctx = bench(PmlCells::uniform(8));
    engine.build(&ctx, &microstrip(), &mut RectilinearGrid::new()).unwrap();
    let first: Vec<Vec<f64>> = Axis::ALL.iter().map(|&a| engine.lines(a).to_vec()).collect();

    let mut grid = RectilinearGrid::new();
    engine.build(&ctx, &microstrip(), &mut grid).unwrap();
    for (axis, lines) in Axis::ALL.iter().zip(&first) {
        assert_eq!(engine.lines(*axis), lines.as_slice());
        assert_eq!(grid.lines(*axis), lines.as_slice());
    }
}

#[test]
fn pml_slabs_are_uniform() {
    let mut engine = MeshEngine::new(MeshConfig::default()).unwrap();
    let report = engine
        .build(&bench(PmlCells::uniform(8)), &microstrip(), &mut RectilinearGrid::new())
        .unwrap();
    assert!(report.pml_nonuniformities.is_empty(), "{report:?}");

    for axis in Axis::ALL {
        let lines = engine.lines(axis);
        let len = lines.len();
        for slab in [&lines[..9], &lines[len - 9..]] {
            let first = slab[1] - slab[0];
            for w in slab.windows(2) {
                assert!(((w[1] - w[0]) - first).abs() <= 1e-3 * first, "{axis}: {slab:?}");
            }
        }
    }

    let inner = engine.simulation_box(false).unwrap();
    let outer = engine.simulation_box(true).unwrap();
    for axis in Axis::ALL {
        let lines = engine.lines(axis);
        assert_eq!(inner.bounds(axis), (lines[8], lines[lines.len() - 9]));
        assert_eq!(outer.bounds(axis), (lines[0], lines[lines.len() - 1]));
    }

    let boxes = engine.pml_boxes().unwrap();
    assert_eq!(boxes[0].bounds(Axis::X), (outer.min.x, inner.min.x));
    assert_eq!(boxes[5].bounds(Axis::Z), (inner.max.z, outer.max.z));
}

#[test]
fn conductor_edge_sits_between_lines() {
    let tol = Tolerance::default();
    let metal_res = MeshConfig::default().resolve(10.0).unwrap().metal_res;

    // Thin plating on a block: the plating cell is 0.2 / 4, one third inside
    let plated = [
        PhysicalPrimitive::dielectric(DVec3::ZERO, DVec3::splat(10.0)),
        PhysicalPrimitive::conductor(DVec3::new(0.0, 0.0, 10.0), DVec3::new(10.0, 10.0, 10.2)),
    ];
    let mut engine = MeshEngine::new(MeshConfig::default()).unwrap();
    engine
        .build(&bench(PmlCells::none()), &plated, &mut RectilinearGrid::new())
        .unwrap();
    let lines = engine.lines(Axis::Z);
    let above = lines[lines.partition_point(|&l| l <= 10.0)];
    assert!(tol.eq(above - 10.0, 0.05 / 3.0), "inside offset {}", above - 10.0);

    // Thin substrate under a thick conductor: the substrate cell is 0.4 / 4,
    // two thirds of it outside
    let substrate = [
        PhysicalPrimitive::dielectric(DVec3::ZERO, DVec3::new(10.0, 10.0, 0.4)),
        PhysicalPrimitive::conductor(DVec3::new(0.0, 0.0, 0.4), DVec3::new(10.0, 10.0, 10.4)),
    ];
    let mut engine = MeshEngine::new(MeshConfig::default()).unwrap();
    engine
        .build(&bench(PmlCells::none()), &substrate, &mut RectilinearGrid::new())
        .unwrap();
    let lines = engine.lines(Axis::Z);
    let below = lines[lines.partition_point(|&l| l < 0.4) - 1];
    let expected = 2.0 / 3.0 * 0.1_f64.min(metal_res);
    assert!(tol.eq(0.4 - below, expected), "outside offset {}", 0.4 - below);
}

#[test]
fn fixed_line_in_air_survives_trimming() {
    let mut engine = MeshEngine::new(MeshConfig::default()).unwrap();
    engine.add_fixed_line(Axis::X, -7.0).unwrap();
    let block = PhysicalPrimitive::dielectric(DVec3::ZERO, DVec3::splat(10.0));
    engine
        .build(&bench(PmlCells::uniform(2)), &[block], &mut RectilinearGrid::new())
        .unwrap();

    let lines = engine.lines(Axis::X);
    assert_increasing(lines);
    assert_eq!(lines.iter().filter(|&&l| l == -7.0).count(), 1, "{lines:?}");
    assert!(lines[0] < -7.0);
    assert_eq!(engine.fixed_lines(Axis::X), &[-7.0]);
}

#[test]
fn uniform_interval_spacing() {
    // A lone dielectric slab four cells thick meshes to five even lines
    let prims = [PhysicalPrimitive::dielectric(DVec3::ZERO, DVec3::new(4.0, 4.0, 4.0))];
    let config = MeshConfig::default()
        .with_extent(SimulationExtent::Expand([[0, 0]; 3]));
    let mut engine = MeshEngine::new(config).unwrap();
    engine
        .build(&bench(PmlCells::none()), &prims, &mut RectilinearGrid::new())
        .unwrap();
    for axis in Axis::ALL {
        assert_eq!(engine.lines(axis), &[0.0, 1.0, 2.0, 3.0, 4.0]);
    }
    assert_eq!(
        engine.simulation_bounds(),
        Some(BoundingBox::new(DVec3::ZERO, DVec3::splat(4.0)))
    );
}

#[test]
fn non_physical_primitives_are_ignored() {
    let block = BoundingBox::new(DVec3::ZERO, DVec3::splat(4.0));
    let probe = BoundingBox::new(DVec3::splat(1.3), DVec3::splat(2.7));
    let prims = [
        Primitive::new(block, PropertyKind::Material),
        Primitive::new(probe, PropertyKind::Probe),
    ];

    let mut with_probe = MeshEngine::new(MeshConfig::default()).unwrap();
    with_probe
        .build_from_primitives(&bench(PmlCells::none()), &prims, &mut RectilinearGrid::new())
        .unwrap();
    let mut plain = MeshEngine::new(MeshConfig::default()).unwrap();
    plain
        .build_from_primitives(&bench(PmlCells::none()), &prims[..1], &mut RectilinearGrid::new())
        .unwrap();

    for axis in Axis::ALL {
        assert_eq!(with_probe.lines(axis), plain.lines(axis));
    }
}
