#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure growth system responsible for turning gardener input into growth commands.

use beanstalk_core::{
    BranchKind, Command, Direction, Event, LeafKind, NodeCoord, ResourceGate, WorldPoint,
};
use beanstalk_world::{query, World};
use glam::Vec2;

/// Declarative preview describing what the cursor would grow.
///
/// Every flag comes from the world's pre-flight queries, which run the same
/// checks as the commands themselves, so a highlighted ghost always grows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthPreview {
    /// World position under the cursor.
    pub point: WorldPoint,
    /// Node and slot a branch grown here would occupy, if the click resolves.
    pub branch: Option<(NodeCoord, Direction)>,
    /// Indicates whether a branch may be grown at the point.
    pub branch_growable: bool,
    /// Indicates whether a leaf may be grown at the point.
    pub leaf_growable: bool,
    /// Indicates whether the resolved branch may be reinforced.
    pub branch_upgradable: bool,
    /// Indicates whether the leaf under the point may become bouncy.
    pub leaf_upgradable: bool,
}

impl GrowthPreview {
    /// Builds a preview for `point` from the world's pre-flight queries.
    #[must_use]
    pub fn capture<G: ResourceGate>(world: &World<G>, point: WorldPoint) -> Self {
        let branch = query::lattice(world).resolve_branch(point);
        let branch_upgradable = branch.is_some_and(|(_, direction)| {
            query::branch_upgradable_at(world, point, direction, BranchKind::Reinforced).is_ok()
        });

        Self {
            point,
            branch,
            branch_growable: query::branch_growable_at(world, point).is_ok(),
            leaf_growable: query::leaf_growable_at(world, point).is_ok(),
            branch_upgradable,
            leaf_upgradable: query::leaf_upgradable_at(world, point, LeafKind::Bouncy).is_ok(),
        }
    }
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthInput {
    /// Cursor position in world space, if the cursor is over the play field.
    pub cursor: Option<Vec2>,
    /// Indicates whether the gardener asked for a branch this frame.
    pub grow_branch: bool,
    /// Indicates whether the gardener asked for a leaf this frame.
    pub grow_leaf: bool,
    /// Indicates whether the gardener asked to reinforce a branch this frame.
    pub upgrade_branch: bool,
    /// Indicates whether the gardener asked to upgrade a leaf this frame.
    pub upgrade_leaf: bool,
    /// Kind of leaf to grow.
    pub leaf_kind: LeafKind,
    /// Platform width of new leaves.
    pub leaf_width: f32,
}

impl GrowthInput {
    /// Cursor position converted to a world point.
    #[must_use]
    pub fn point(&self) -> Option<WorldPoint> {
        self.cursor.map(|cursor| WorldPoint::new(cursor.x, cursor.y))
    }
}

impl Default for GrowthInput {
    fn default() -> Self {
        Self {
            cursor: None,
            grow_branch: false,
            grow_leaf: false,
            upgrade_branch: false,
            upgrade_leaf: false,
            leaf_kind: LeafKind::Normal,
            leaf_width: 1.0,
        }
    }
}

/// Growth system that translates preview + input into growth commands.
///
/// Growth locks once the goal height is reached and unlocks when the lattice
/// is configured again.
#[derive(Debug, Clone, Default)]
pub struct Growth {
    locked: bool,
}

impl Growth {
    /// Creates a new growth system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self { locked: false }
    }

    /// Reports whether the goal has locked further growth.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Consumes world events and adapter-derived input to emit growth commands.
    ///
    /// The preview must have been captured at the input's cursor position;
    /// a preview for any other point is ignored.
    pub fn handle(
        &mut self,
        events: &[Event],
        preview: Option<GrowthPreview>,
        input: GrowthInput,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::GoalReached { .. } => self.locked = true,
                Event::LatticeConfigured { .. } => self.locked = false,
                _ => {}
            }
        }

        if self.locked {
            return;
        }

        let Some(point) = input.point() else {
            return;
        };
        let Some(preview) = preview.filter(|preview| preview.point == point) else {
            return;
        };

        if input.grow_branch && preview.branch_growable {
            out.push(Command::GrowBranch { point });
        }

        if input.grow_leaf && preview.leaf_growable {
            out.push(Command::GrowLeaf {
                point,
                kind: input.leaf_kind,
                width: input.leaf_width,
            });
        }

        if input.upgrade_branch && preview.branch_upgradable {
            if let Some((_, direction)) = preview.branch {
                out.push(Command::UpgradeBranch {
                    point,
                    direction,
                    kind: BranchKind::Reinforced,
                });
            }
        }

        if input.upgrade_leaf && preview.leaf_upgradable {
            out.push(Command::UpgradeLeaf {
                point,
                kind: LeafKind::Bouncy,
            });
        }
    }
}
