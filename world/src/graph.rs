//! Structural growth rules, destruction and collapse propagation.

use beanstalk_core::{
    Branch, BranchKind, Direction, Event, GrowthRejection, Leaf, LeafKind, NodeCoord,
    ResourceGate, WorldPoint,
};
use tracing::{debug, info};

use crate::World;

impl<G: ResourceGate> World<G> {
    /// Reports whether the node may hold growth.
    ///
    /// Ground anchors always qualify. Any other node needs a branch pointing
    /// at it from one of its three support positions. Evaluated fresh on every
    /// call because it depends on mutable neighbour state.
    pub(crate) fn can_grow_at(&self, node: NodeCoord) -> bool {
        if !self.lattice.contains(node) {
            return false;
        }
        if node.is_ground_anchor() {
            return true;
        }

        self.lattice
            .supports(node)
            .any(|(support, direction)| {
                self.node(support)
                    .is_some_and(|plant_node| plant_node.has_branch(direction))
            })
    }

    pub(crate) fn branch_growable(
        &self,
        point: WorldPoint,
    ) -> Result<(NodeCoord, Direction), GrowthRejection> {
        let (node, direction) = self
            .lattice
            .resolve_branch(point)
            .ok_or(GrowthRejection::Geometry)?;
        // Support outranks rations and occupancy, matching leaf growth and the previews.
        if !self.can_grow_at(node) {
            return Err(GrowthRejection::Structural);
        }
        if !self.gate.can_grow_branch() {
            return Err(GrowthRejection::Resource);
        }
        if self
            .node(node)
            .is_some_and(|plant_node| plant_node.has_branch(direction))
        {
            return Err(GrowthRejection::Occupied);
        }

        Ok((node, direction))
    }

    pub(crate) fn grow_branch(
        &mut self,
        point: WorldPoint,
        out_events: &mut Vec<Event>,
    ) -> Result<Branch, GrowthRejection> {
        let (node, direction) = self.branch_growable(point)?;
        let id = self.allocate_branch_id();
        let branch = self
            .node_mut(node)
            .map(|plant_node| plant_node.make_branch(direction, id, BranchKind::Normal))
            .ok_or(GrowthRejection::Geometry)?;
        self.gate.decrement_grow_branch();

        out_events.push(Event::BranchGrown {
            node,
            direction,
            branch,
        });
        Ok(branch)
    }

    pub(crate) fn leaf_growable(&self, point: WorldPoint) -> Result<NodeCoord, GrowthRejection> {
        let node = self
            .lattice
            .world_to_index(point)
            .ok_or(GrowthRejection::Geometry)?;
        if node.is_ground_anchor() || !self.can_grow_at(node) {
            return Err(GrowthRejection::Structural);
        }
        if !self.gate.can_grow_leaf() {
            return Err(GrowthRejection::Resource);
        }
        if self.node(node).is_some_and(|plant_node| plant_node.has_leaf()) {
            return Err(GrowthRejection::Occupied);
        }

        Ok(node)
    }

    pub(crate) fn grow_leaf(
        &mut self,
        point: WorldPoint,
        kind: LeafKind,
        width: f32,
        out_events: &mut Vec<Event>,
    ) -> Result<Leaf, GrowthRejection> {
        let node = self.leaf_growable(point)?;
        let id = self.allocate_leaf_id();
        let leaf = self
            .node_mut(node)
            .map(|plant_node| plant_node.make_leaf(id, kind, width))
            .ok_or(GrowthRejection::Geometry)?;
        self.gate.decrement_grow_leaf();
        out_events.push(Event::LeafGrown { node, leaf });

        let taller = match self.max_leaf {
            Some(current) => self.height_of(node) > self.height_of(current),
            None => true,
        };
        if taller {
            self.max_leaf = Some(node);
            out_events.push(Event::MaxLeafChanged {
                node: Some(node),
                height: self.max_leaf_height(),
            });
            self.check_goal(out_events);
        }

        Ok(leaf)
    }

    pub(crate) fn branch_upgradable(
        &self,
        point: WorldPoint,
        direction: Direction,
        kind: BranchKind,
    ) -> Result<NodeCoord, GrowthRejection> {
        let node = self
            .lattice
            .world_to_index(point)
            .ok_or(GrowthRejection::Geometry)?;
        let current = self
            .node(node)
            .and_then(|plant_node| plant_node.branch(direction))
            .ok_or(GrowthRejection::Vacant)?;
        if current.kind().upgraded() != Some(kind) {
            return Err(GrowthRejection::Occupied);
        }
        if !self.gate.can_upgrade() {
            return Err(GrowthRejection::Resource);
        }

        Ok(node)
    }

    pub(crate) fn upgrade_branch(
        &mut self,
        point: WorldPoint,
        direction: Direction,
        kind: BranchKind,
        out_events: &mut Vec<Event>,
    ) -> Result<Branch, GrowthRejection> {
        let node = self.branch_upgradable(point, direction, kind)?;
        let branch = self.replace_branch(node, direction, kind, out_events)?;
        self.gate.decrement_upgrade();
        Ok(branch)
    }

    pub(crate) fn leaf_upgradable(
        &self,
        point: WorldPoint,
        kind: LeafKind,
    ) -> Result<NodeCoord, GrowthRejection> {
        let node = self
            .lattice
            .world_to_index(point)
            .ok_or(GrowthRejection::Geometry)?;
        let current = self
            .node(node)
            .and_then(|plant_node| plant_node.leaf())
            .ok_or(GrowthRejection::Vacant)?;
        if current.kind().upgraded() != Some(kind) {
            return Err(GrowthRejection::Occupied);
        }
        if !self.gate.can_upgrade() {
            return Err(GrowthRejection::Resource);
        }

        Ok(node)
    }

    pub(crate) fn upgrade_leaf(
        &mut self,
        point: WorldPoint,
        kind: LeafKind,
        out_events: &mut Vec<Event>,
    ) -> Result<Leaf, GrowthRejection> {
        let node = self.leaf_upgradable(point, kind)?;
        let id = self.allocate_leaf_id();
        let plant_node = self.node_mut(node).ok_or(GrowthRejection::Geometry)?;
        let removed = plant_node.unmake_leaf().ok_or(GrowthRejection::Vacant)?;
        let leaf = plant_node.make_leaf(id, kind, removed.width());
        self.gate.decrement_upgrade();

        out_events.push(Event::LeafRemoved {
            node,
            leaf: removed,
        });
        out_events.push(Event::LeafGrown { node, leaf });
        Ok(leaf)
    }

    /// Removes one branch and schedules a support check from its node.
    ///
    /// Every hit restarts the grace window, so a burst of damage is swept
    /// once the burst is over.
    pub(crate) fn destroy_at(
        &mut self,
        node: NodeCoord,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) {
        let Some(branch) = self
            .node_mut(node)
            .and_then(|plant_node| plant_node.unmake_branch(direction))
        else {
            return;
        };

        debug!(?node, ?direction, "branch destroyed");
        out_events.push(Event::BranchRemoved {
            node,
            direction,
            branch,
        });
        self.collapse.enqueue(node);
    }

    pub(crate) fn destroy_leaf_at(&mut self, node: NodeCoord, out_events: &mut Vec<Event>) {
        let Some(leaf) = self.node_mut(node).and_then(|plant_node| plant_node.unmake_leaf()) else {
            return;
        };

        debug!(?node, "leaf destroyed");
        out_events.push(Event::LeafRemoved { node, leaf });
        self.recompute_max_leaf(out_events);
    }

    pub(crate) fn burn_node(&mut self, node: NodeCoord, out_events: &mut Vec<Event>) {
        if self.node(node).is_some_and(|plant_node| !plant_node.is_empty()) {
            self.destroy_all_at(node, out_events);
        }
    }

    /// Runs one propagation step for a node released by the collapse queue.
    pub(crate) fn propagate_from(&mut self, node: NodeCoord, out_events: &mut Vec<Event>) {
        debug!(?node, "checking dependents for lost support");
        let lattice = self.lattice;
        for dependent in lattice.dependents(node) {
            let orphaned = !self.can_grow_at(dependent)
                && self
                    .node(dependent)
                    .is_some_and(|plant_node| !plant_node.is_empty());
            if orphaned {
                self.destroy_all_at(dependent, out_events);
            }
        }
    }

    /// Strips a node and re-queues it so collapse can ripple onward.
    ///
    /// The leaf always goes. Branches go unless they are reinforced and the
    /// node is still supported, in which case they drop to normal instead.
    fn destroy_all_at(&mut self, node: NodeCoord, out_events: &mut Vec<Event>) {
        let supported = self.can_grow_at(node);

        if let Some(leaf) = self.node_mut(node).and_then(|plant_node| plant_node.unmake_leaf()) {
            out_events.push(Event::LeafRemoved { node, leaf });
        }

        for direction in Direction::ALL {
            let Some(branch) = self.node(node).and_then(|plant_node| plant_node.branch(direction))
            else {
                continue;
            };

            match branch.kind().downgraded() {
                Some(kind) if supported => {
                    let _ = self.replace_branch(node, direction, kind, out_events);
                }
                _ => {
                    if let Some(removed) = self
                        .node_mut(node)
                        .and_then(|plant_node| plant_node.unmake_branch(direction))
                    {
                        out_events.push(Event::BranchRemoved {
                            node,
                            direction,
                            branch: removed,
                        });
                    }
                }
            }
        }

        debug!(?node, supported, "node collapsed");
        out_events.push(Event::NodeCollapsed { node });
        self.recompute_max_leaf(out_events);
        self.collapse.enqueue(node);
    }

    fn replace_branch(
        &mut self,
        node: NodeCoord,
        direction: Direction,
        kind: BranchKind,
        out_events: &mut Vec<Event>,
    ) -> Result<Branch, GrowthRejection> {
        let id = self.allocate_branch_id();
        let plant_node = self.node_mut(node).ok_or(GrowthRejection::Geometry)?;
        let removed = plant_node
            .unmake_branch(direction)
            .ok_or(GrowthRejection::Vacant)?;
        let branch = plant_node.make_branch(direction, id, kind);

        out_events.push(Event::BranchRemoved {
            node,
            direction,
            branch: removed,
        });
        out_events.push(Event::BranchGrown {
            node,
            direction,
            branch,
        });
        Ok(branch)
    }

    /// Rescans the lattice for the tallest leaf, reporting any change.
    fn recompute_max_leaf(&mut self, out_events: &mut Vec<Event>) {
        let tallest = self
            .lattice
            .scan_top_down()
            .find(|node| self.node(*node).is_some_and(|plant_node| plant_node.has_leaf()));

        if tallest != self.max_leaf {
            self.max_leaf = tallest;
            out_events.push(Event::MaxLeafChanged {
                node: tallest,
                height: self.max_leaf_height(),
            });
        }
    }

    pub(crate) fn max_leaf_height(&self) -> f32 {
        self.max_leaf
            .map_or(self.lattice.spec().origin().y, |node| self.height_of(node))
    }

    pub(crate) fn check_goal(&mut self, out_events: &mut Vec<Event>) {
        let Some(target) = self.goal else {
            return;
        };
        if self.goal_reached || self.max_leaf.is_none() {
            return;
        }

        let height = self.max_leaf_height();
        if height >= target {
            self.goal_reached = true;
            info!(height, target, "goal height reached");
            out_events.push(Event::GoalReached { height });
        }
    }

    fn height_of(&self, node: NodeCoord) -> f32 {
        self.lattice.index_to_world(node).y
    }
}
