//! Scripted gardener standing in for a human player.

use beanstalk_core::{
    BranchKind, Command, Direction, LeafKind, NodeCoord, ResourceGate, ResourceKind,
};
use beanstalk_system_growth::GrowthInput;
use beanstalk_world::{query, World};
use glam::Vec2;

const LEAF_EVERY: u64 = 3;
const REINFORCE_EVERY: u64 = 11;
const BLOOM_EVERY: u64 = 17;
const WATER_EVERY: u64 = 8;
const SUNLIGHT_EVERY: u64 = 24;
const COMPOST_EVERY: u64 = 90;
const PREFERRED_DIRECTIONS: [Direction; 3] = [Direction::Middle, Direction::Left, Direction::Right];

/// Steers the cursor toward the tallest supported node and keeps rations topped up.
#[derive(Debug, Clone, Default)]
pub(crate) struct Gardener {
    frame: u64,
}

impl Gardener {
    /// Decides this frame's growth input.
    pub(crate) fn plan<G: ResourceGate>(&mut self, world: &World<G>) -> GrowthInput {
        self.frame = self.frame.wrapping_add(1);

        let action = if self.frame % REINFORCE_EVERY == 0 {
            reinforce(world)
        } else if self.frame % BLOOM_EVERY == 0 {
            bloom(world)
        } else if self.frame % LEAF_EVERY == 0 {
            plant_leaf(world)
        } else {
            None
        };

        action
            .or_else(|| climb(world))
            .unwrap_or_default()
    }

    /// Resources gathered on this frame.
    pub(crate) fn forage(&self, out: &mut Vec<Command>) {
        for (every, resource) in [
            (WATER_EVERY, ResourceKind::Water),
            (SUNLIGHT_EVERY, ResourceKind::Sunlight),
            (COMPOST_EVERY, ResourceKind::Compost),
        ] {
            if self.frame % every == 0 {
                out.push(Command::CollectResource {
                    resource,
                    amount: 1,
                });
            }
        }
    }
}

fn supported_top_down<G: ResourceGate>(world: &World<G>) -> impl Iterator<Item = NodeCoord> + '_ {
    query::lattice(world)
        .scan_top_down()
        .filter(move |node| query::node_supported(world, *node))
}

fn climb<G: ResourceGate>(world: &World<G>) -> Option<GrowthInput> {
    let lattice = query::lattice(world);
    supported_top_down(world).find_map(|node| {
        PREFERRED_DIRECTIONS.into_iter().find_map(|direction| {
            let point = lattice.branch_aim(node, direction);
            query::branch_growable_at(world, point)
                .ok()
                .map(|_| GrowthInput {
                    cursor: Some(Vec2::new(point.x, point.y)),
                    grow_branch: true,
                    ..GrowthInput::default()
                })
        })
    })
}

fn plant_leaf<G: ResourceGate>(world: &World<G>) -> Option<GrowthInput> {
    let lattice = query::lattice(world);
    supported_top_down(world).find_map(|node| {
        let point = lattice.index_to_world(node);
        query::leaf_growable_at(world, point)
            .ok()
            .map(|_| GrowthInput {
                cursor: Some(Vec2::new(point.x, point.y)),
                grow_leaf: true,
                ..GrowthInput::default()
            })
    })
}

fn reinforce<G: ResourceGate>(world: &World<G>) -> Option<GrowthInput> {
    let lattice = query::lattice(world);
    query::plant_view(world)
        .branches()
        .find_map(|(node, direction, branch)| {
            if branch.kind() != BranchKind::Normal {
                return None;
            }
            let point = lattice.branch_aim(node, direction);
            query::branch_upgradable_at(world, point, direction, BranchKind::Reinforced)
                .ok()
                .map(|_| GrowthInput {
                    cursor: Some(Vec2::new(point.x, point.y)),
                    upgrade_branch: true,
                    ..GrowthInput::default()
                })
        })
}

fn bloom<G: ResourceGate>(world: &World<G>) -> Option<GrowthInput> {
    let lattice = query::lattice(world);
    query::plant_view(world)
        .leaves()
        .find_map(|(node, leaf)| {
            if leaf.kind() != LeafKind::Normal {
                return None;
            }
            let point = lattice.index_to_world(node);
            query::leaf_upgradable_at(world, point, LeafKind::Bouncy)
                .ok()
                .map(|_| GrowthInput {
                    cursor: Some(Vec2::new(point.x, point.y)),
                    upgrade_leaf: true,
                    ..GrowthInput::default()
                })
        })
}
