use beanstalk_core::{
    BranchKind, Command, Direction, Event, LatticeSpec, NodeCoord, WorldPoint,
};
use beanstalk_world::{self as world, query, Rations, World};

const WINDOW: u32 = 3;

fn world(columns: u32, rows: u32) -> World {
    let spec =
        LatticeSpec::new(columns, rows, 1.0, WorldPoint::new(0.0, 0.0)).expect("valid lattice");
    World::with_gate(spec, WINDOW, Rations::new(100, 100, 100))
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn grow(world: &mut World, column: u32, row: u32, direction: Direction) {
    let point = query::lattice(world).branch_aim(NodeCoord::new(column, row), direction);
    let events = run(world, Command::GrowBranch { point });
    assert!(
        matches!(events.as_slice(), [Event::BranchGrown { .. }]),
        "growth at ({column}, {row}) {direction:?} failed: {events:?}",
    );
}

fn tick(world: &mut World, ticks: u32) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..ticks {
        world::apply(world, Command::Tick, &mut events);
    }
    events
}

fn has_branch(world: &World, column: u32, row: u32, direction: Direction) -> bool {
    query::node(world, NodeCoord::new(column, row))
        .is_some_and(|node| node.has_branch(direction))
}

#[test]
fn orphaned_branch_falls_after_the_grace_window() {
    let mut world = world(5, 5);
    grow(&mut world, 0, 0, Direction::Middle);
    grow(&mut world, 0, 1, Direction::Middle);

    let events = run(
        &mut world,
        Command::DestroyBranch {
            node: NodeCoord::new(0, 0),
            direction: Direction::Middle,
        },
    );
    assert!(matches!(events.as_slice(), [Event::BranchRemoved { .. }]));
    assert!(has_branch(&world, 0, 1, Direction::Middle));
    assert!(!query::node_supported(&world, NodeCoord::new(0, 1)));

    let _ = tick(&mut world, WINDOW);
    assert!(has_branch(&world, 0, 1, Direction::Middle));

    let events = tick(&mut world, 1);
    assert!(!has_branch(&world, 0, 1, Direction::Middle));
    assert!(events.contains(&Event::NodeCollapsed {
        node: NodeCoord::new(0, 1)
    }));

    let _ = tick(&mut world, WINDOW + 1);
    assert_eq!(query::pending_collapses(&world), 0);
    assert!(query::plant_view(&world).is_empty());
}

#[test]
fn collapse_ripples_one_node_per_window() {
    let mut world = world(3, 5);
    for row in 0..4 {
        grow(&mut world, 0, row, Direction::Middle);
    }

    let _ = run(
        &mut world,
        Command::DestroyBranch {
            node: NodeCoord::new(0, 0),
            direction: Direction::Middle,
        },
    );

    for fallen in 1..4 {
        let _ = tick(&mut world, WINDOW + 1);
        assert!(!has_branch(&world, 0, fallen, Direction::Middle));
        if fallen < 3 {
            assert!(has_branch(&world, 0, fallen + 1, Direction::Middle));
        }
    }

    let _ = tick(&mut world, WINDOW + 1);
    assert_eq!(query::pending_collapses(&world), 0);
    assert!(query::plant_view(&world).is_empty());
}

#[test]
fn a_second_support_keeps_the_node_standing() {
    let mut world = world(4, 4);
    // (1, 0) is held up by the right branch of (0, 0) and the left branch of (2, 0).
    grow(&mut world, 0, 0, Direction::Right);
    grow(&mut world, 2, 0, Direction::Left);
    grow(&mut world, 1, 0, Direction::Middle);

    let _ = run(
        &mut world,
        Command::DestroyBranch {
            node: NodeCoord::new(0, 0),
            direction: Direction::Right,
        },
    );
    let _ = tick(&mut world, 4 * (WINDOW + 1));

    assert!(has_branch(&world, 1, 0, Direction::Middle));
    assert!(query::node_supported(&world, NodeCoord::new(1, 0)));
    assert_eq!(query::pending_collapses(&world), 0);
}

#[test]
fn fresh_damage_postpones_the_sweep() {
    let mut world = world(5, 5);
    grow(&mut world, 0, 0, Direction::Middle);
    grow(&mut world, 0, 1, Direction::Middle);
    grow(&mut world, 2, 0, Direction::Middle);

    let _ = run(
        &mut world,
        Command::DestroyBranch {
            node: NodeCoord::new(0, 0),
            direction: Direction::Middle,
        },
    );
    let _ = tick(&mut world, WINDOW - 1);
    let _ = run(
        &mut world,
        Command::DestroyBranch {
            node: NodeCoord::new(2, 0),
            direction: Direction::Middle,
        },
    );
    assert_eq!(query::coyote_remaining(&world), WINDOW);

    let _ = tick(&mut world, WINDOW);
    assert!(has_branch(&world, 0, 1, Direction::Middle));
    let _ = tick(&mut world, 1);
    assert!(!has_branch(&world, 0, 1, Direction::Middle));
}

#[test]
fn burned_reinforced_branch_absorbs_exactly_one_hit() {
    let mut world = world(3, 3);
    grow(&mut world, 0, 0, Direction::Middle);
    let point = query::lattice(&world).index_to_world(NodeCoord::new(0, 0));
    let _ = run(
        &mut world,
        Command::UpgradeBranch {
            point,
            direction: Direction::Middle,
            kind: BranchKind::Reinforced,
        },
    );

    let _ = run(
        &mut world,
        Command::BurnNode {
            node: NodeCoord::new(0, 0),
        },
    );
    let survivor = query::node(&world, NodeCoord::new(0, 0))
        .and_then(|node| node.branch(Direction::Middle))
        .expect("reinforced branch survives one burn");
    assert_eq!(survivor.kind(), BranchKind::Normal);

    let _ = run(
        &mut world,
        Command::BurnNode {
            node: NodeCoord::new(0, 0),
        },
    );
    assert!(!has_branch(&world, 0, 0, Direction::Middle));
}

#[test]
fn reinforcement_does_not_save_an_unsupported_node() {
    let mut world = world(3, 4);
    grow(&mut world, 0, 0, Direction::Middle);
    grow(&mut world, 0, 1, Direction::Middle);
    let point = query::lattice(&world).index_to_world(NodeCoord::new(0, 1));
    let _ = run(
        &mut world,
        Command::UpgradeBranch {
            point,
            direction: Direction::Middle,
            kind: BranchKind::Reinforced,
        },
    );

    let _ = run(
        &mut world,
        Command::DestroyBranch {
            node: NodeCoord::new(0, 0),
            direction: Direction::Middle,
        },
    );
    let _ = tick(&mut world, WINDOW + 1);

    assert!(!has_branch(&world, 0, 1, Direction::Middle));
}

#[test]
fn reconfiguring_clears_pending_collapses() {
    let mut world = world(3, 3);
    grow(&mut world, 0, 0, Direction::Middle);
    let _ = run(
        &mut world,
        Command::DestroyBranch {
            node: NodeCoord::new(0, 0),
            direction: Direction::Middle,
        },
    );
    assert_eq!(query::pending_collapses(&world), 1);

    let _ = run(
        &mut world,
        Command::ConfigureLattice {
            lattice: LatticeSpec::default(),
            coyote_ticks: WINDOW,
        },
    );
    assert_eq!(query::pending_collapses(&world), 0);
    assert_eq!(query::coyote_remaining(&world), 0);
}
