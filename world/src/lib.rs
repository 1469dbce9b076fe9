#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative plant state management for Beanstalk.
//!
//! The world owns the node lattice, the structural growth rules, the collapse
//! queue and an injected [`ResourceGate`]. All mutation flows through
//! [`apply`]; read access goes through the [`query`] module.

mod collapse;
mod graph;
mod lattice;
mod node;
mod rations;

use beanstalk_core::{
    BranchId, Command, Event, LatticeSpec, LeafId, NodeCoord, ResourceGate, DEFAULT_COYOTE_TICKS,
    WELCOME_BANNER,
};
use tracing::{info, trace};

use self::collapse::CollapseQueue;
use self::node::Occupant;

pub use self::lattice::{angle_to_direction, Lattice};
pub use self::node::PlantNode;
pub use self::rations::Rations;

/// Represents the authoritative Beanstalk plant state.
#[derive(Debug)]
pub struct World<G = Rations> {
    banner: &'static str,
    lattice: Lattice,
    nodes: Vec<PlantNode>,
    collapse: CollapseQueue,
    gate: G,
    max_leaf: Option<NodeCoord>,
    goal: Option<f32>,
    goal_reached: bool,
    next_branch_id: BranchId,
    next_leaf_id: LeafId,
    tick_index: u64,
}

impl World<Rations> {
    /// Creates a world on the default lattice with the default ration pool.
    #[must_use]
    pub fn new() -> Self {
        Self::with_gate(LatticeSpec::default(), DEFAULT_COYOTE_TICKS, Rations::STARTER)
    }
}

impl Default for World<Rations> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: ResourceGate> World<G> {
    /// Creates a world on the provided lattice, funded by `gate`.
    #[must_use]
    pub fn with_gate(lattice: LatticeSpec, coyote_ticks: u32, gate: G) -> Self {
        let lattice = Lattice::new(lattice);
        Self {
            banner: WELCOME_BANNER,
            nodes: build_nodes(&lattice),
            lattice,
            collapse: CollapseQueue::new(coyote_ticks),
            gate,
            max_leaf: None,
            goal: None,
            goal_reached: false,
            next_branch_id: BranchId::new(0),
            next_leaf_id: LeafId::new(0),
            tick_index: 0,
        }
    }

    fn node(&self, coord: NodeCoord) -> Option<&PlantNode> {
        self.lattice
            .index(coord)
            .and_then(|index| self.nodes.get(index))
    }

    fn node_mut(&mut self, coord: NodeCoord) -> Option<&mut PlantNode> {
        self.lattice
            .index(coord)
            .and_then(|index| self.nodes.get_mut(index))
    }

    fn allocate_branch_id(&mut self) -> BranchId {
        let id = self.next_branch_id;
        self.next_branch_id = BranchId::new(id.get().wrapping_add(1));
        id
    }

    fn allocate_leaf_id(&mut self) -> LeafId {
        let id = self.next_leaf_id;
        self.next_leaf_id = LeafId::new(id.get().wrapping_add(1));
        id
    }

    fn reconfigure(&mut self, spec: LatticeSpec, coyote_ticks: u32, out_events: &mut Vec<Event>) {
        for node in &mut self.nodes {
            let coord = node.coord();
            for occupant in node.reset() {
                out_events.push(match occupant {
                    Occupant::Branch(direction, branch) => Event::BranchRemoved {
                        node: coord,
                        direction,
                        branch,
                    },
                    Occupant::Leaf(leaf) => Event::LeafRemoved { node: coord, leaf },
                });
            }
        }

        self.lattice = Lattice::new(spec);
        self.nodes = build_nodes(&self.lattice);
        self.collapse = CollapseQueue::new(coyote_ticks);
        self.max_leaf = None;
        self.goal_reached = false;

        info!(
            columns = spec.columns(),
            rows = spec.rows(),
            coyote_ticks,
            "plant lattice configured"
        );
        out_events.push(Event::LatticeConfigured {
            columns: spec.columns(),
            rows: spec.rows(),
        });
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
        });

        if let Some(node) = self.collapse.poll() {
            self.propagate_from(node, out_events);
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply<G: ResourceGate>(world: &mut World<G>, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureLattice {
            lattice,
            coyote_ticks,
        } => world.reconfigure(lattice, coyote_ticks, out_events),
        Command::ConfigureGoal { target_height } => {
            world.goal = Some(target_height);
            world.goal_reached = false;
            world.check_goal(out_events);
        }
        Command::Tick => world.tick(out_events),
        Command::GrowBranch { point } => {
            if let Err(reason) = world.grow_branch(point, out_events) {
                trace!(?point, %reason, "branch growth rejected");
                out_events.push(Event::GrowthRejected { point, reason });
            }
        }
        Command::GrowLeaf { point, kind, width } => {
            if let Err(reason) = world.grow_leaf(point, kind, width, out_events) {
                trace!(?point, %reason, "leaf growth rejected");
                out_events.push(Event::GrowthRejected { point, reason });
            }
        }
        Command::UpgradeBranch {
            point,
            direction,
            kind,
        } => {
            if let Err(reason) = world.upgrade_branch(point, direction, kind, out_events) {
                trace!(?point, %reason, "branch upgrade rejected");
                out_events.push(Event::GrowthRejected { point, reason });
            }
        }
        Command::UpgradeLeaf { point, kind } => {
            if let Err(reason) = world.upgrade_leaf(point, kind, out_events) {
                trace!(?point, %reason, "leaf upgrade rejected");
                out_events.push(Event::GrowthRejected { point, reason });
            }
        }
        Command::DestroyBranch { node, direction } => {
            world.destroy_at(node, direction, out_events);
        }
        Command::DestroyLeaf { node } => world.destroy_leaf_at(node, out_events),
        Command::BurnNode { node } => world.burn_node(node, out_events),
        Command::CollectResource { resource, amount } => {
            world.gate.replenish(resource, amount);
            out_events.push(Event::ResourceCollected { resource, amount });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use beanstalk_core::{
        BranchKind, Direction, GrowthRejection, LeafKind, NodeCoord, PlantView, ResourceGate,
        WorldPoint,
    };

    use super::{Lattice, PlantNode, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner<G>(world: &World<G>) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the lattice geometry.
    #[must_use]
    pub fn lattice<G>(world: &World<G>) -> &Lattice {
        &world.lattice
    }

    /// Provides read-only access to a single node.
    #[must_use]
    pub fn node<G: ResourceGate>(world: &World<G>, coord: NodeCoord) -> Option<&PlantNode> {
        world.node(coord)
    }

    /// Reports whether the node under `point` is structurally supported.
    #[must_use]
    pub fn can_grow_at<G: ResourceGate>(world: &World<G>, point: WorldPoint) -> bool {
        world
            .lattice
            .world_to_index(point)
            .is_some_and(|node| world.can_grow_at(node))
    }

    /// Reports whether the node is structurally supported.
    #[must_use]
    pub fn node_supported<G: ResourceGate>(world: &World<G>, node: NodeCoord) -> bool {
        world.can_grow_at(node)
    }

    /// Pre-flight check for [`beanstalk_core::Command::GrowBranch`].
    ///
    /// Evaluates exactly the checks the command runs, in the same order.
    pub fn branch_growable_at<G: ResourceGate>(
        world: &World<G>,
        point: WorldPoint,
    ) -> Result<(NodeCoord, Direction), GrowthRejection> {
        world.branch_growable(point)
    }

    /// Pre-flight check for [`beanstalk_core::Command::GrowLeaf`].
    pub fn leaf_growable_at<G: ResourceGate>(
        world: &World<G>,
        point: WorldPoint,
    ) -> Result<NodeCoord, GrowthRejection> {
        world.leaf_growable(point)
    }

    /// Pre-flight check for [`beanstalk_core::Command::UpgradeBranch`].
    pub fn branch_upgradable_at<G: ResourceGate>(
        world: &World<G>,
        point: WorldPoint,
        direction: Direction,
        kind: BranchKind,
    ) -> Result<NodeCoord, GrowthRejection> {
        world.branch_upgradable(point, direction, kind)
    }

    /// Pre-flight check for [`beanstalk_core::Command::UpgradeLeaf`].
    pub fn leaf_upgradable_at<G: ResourceGate>(
        world: &World<G>,
        point: WorldPoint,
        kind: LeafKind,
    ) -> Result<NodeCoord, GrowthRejection> {
        world.leaf_upgradable(point, kind)
    }

    /// Node holding the tallest surviving leaf.
    #[must_use]
    pub fn max_leaf_node<G>(world: &World<G>) -> Option<NodeCoord> {
        world.max_leaf
    }

    /// Height of the tallest surviving leaf, or the ground line without leaves.
    #[must_use]
    pub fn max_leaf_height<G: ResourceGate>(world: &World<G>) -> f32 {
        world.max_leaf_height()
    }

    /// Reports whether the configured goal height has been reached.
    #[must_use]
    pub fn goal_reached<G>(world: &World<G>) -> bool {
        world.goal_reached
    }

    /// Captures a read-only view of every occupied node.
    #[must_use]
    pub fn plant_view<G>(world: &World<G>) -> PlantView {
        let snapshots = world
            .nodes
            .iter()
            .filter(|node| !node.is_empty())
            .map(PlantNode::snapshot)
            .collect();
        PlantView::from_snapshots(snapshots, world.max_leaf)
    }

    /// Number of collapse checks waiting in the queue.
    #[must_use]
    pub fn pending_collapses<G>(world: &World<G>) -> usize {
        world.collapse.len()
    }

    /// Ticks left before the next collapse check may run.
    #[must_use]
    pub fn coyote_remaining<G>(world: &World<G>) -> u32 {
        world.collapse.coyote_remaining()
    }

    /// Provides read-only access to the injected resource gate.
    #[must_use]
    pub fn resources<G>(world: &World<G>) -> &G {
        &world.gate
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index<G>(world: &World<G>) -> u64 {
        world.tick_index
    }
}

fn build_nodes(lattice: &Lattice) -> Vec<PlantNode> {
    let mut nodes = Vec::with_capacity(lattice.spec().node_count());
    for row in 0..lattice.rows() {
        for column in 0..lattice.columns() {
            let coord = NodeCoord::new(column, row);
            nodes.push(PlantNode::new(coord, lattice.index_to_world(coord)));
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use beanstalk_core::{Direction, ResourceKind, WorldPoint};

    fn configure(world: &mut World, columns: u32, rows: u32) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::ConfigureLattice {
                lattice: LatticeSpec::new(columns, rows, 1.0, WorldPoint::new(0.0, 0.0))
                    .expect("valid lattice"),
                coyote_ticks: 4,
            },
            &mut events,
        );
        events
    }

    #[test]
    fn new_world_uses_default_lattice() {
        let world = World::new();
        let lattice = query::lattice(&world);
        assert_eq!(lattice.spec(), LatticeSpec::default());
        assert_eq!(world.nodes.len(), lattice.spec().node_count());
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
        assert_eq!(query::max_leaf_node(&world), None);
        assert_eq!(query::resources(&world), &Rations::STARTER);
    }

    #[test]
    fn nodes_are_stored_row_major() {
        let mut world = World::new();
        let _ = configure(&mut world, 3, 2);
        for (index, node) in world.nodes.iter().enumerate() {
            assert_eq!(world.lattice.index(node.coord()), Some(index));
        }
        assert_eq!(world.nodes[4].coord(), NodeCoord::new(1, 1));
    }

    #[test]
    fn reconfigure_reports_evicted_growth() {
        let mut world = World::new();
        let _ = configure(&mut world, 3, 3);
        let mut events = Vec::new();
        let aim = world.lattice.branch_aim(NodeCoord::new(0, 0), Direction::Middle);
        apply(&mut world, Command::GrowBranch { point: aim }, &mut events);
        assert!(matches!(events.as_slice(), [Event::BranchGrown { .. }]));

        let events = configure(&mut world, 4, 4);

        assert!(matches!(
            events.as_slice(),
            [
                Event::BranchRemoved { branch, .. },
                Event::LatticeConfigured { columns: 4, rows: 4 }
            ] if branch.is_removed()
        ));
        assert!(query::plant_view(&world).is_empty());
    }

    #[test]
    fn tick_reports_monotonic_index() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::Tick, &mut events);
        apply(&mut world, Command::Tick, &mut events);
        assert_eq!(
            events,
            vec![
                Event::TimeAdvanced { tick: 1 },
                Event::TimeAdvanced { tick: 2 }
            ]
        );
        assert_eq!(query::tick_index(&world), 2);
    }

    #[test]
    fn collected_resources_reach_the_gate() {
        let mut world = World::with_gate(LatticeSpec::default(), 4, Rations::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::CollectResource {
                resource: ResourceKind::Sunlight,
                amount: 2,
            },
            &mut events,
        );
        assert_eq!(query::resources(&world).leaf(), 2);
        assert_eq!(
            events,
            vec![Event::ResourceCollected {
                resource: ResourceKind::Sunlight,
                amount: 2
            }]
        );
    }
}
