//! Per-node slot storage for branches and leaves.

use beanstalk_core::{
    Branch, BranchId, BranchKind, Direction, Leaf, LeafId, LeafKind, NodeCoord, NodeSnapshot,
    WorldPoint,
};

/// Growth evicted from a node by [`PlantNode::reset`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Occupant {
    Branch(Direction, Branch),
    Leaf(Leaf),
}

/// One lattice cell: three directional branch slots and a leaf slot.
///
/// Slot writes are unconditional. Whether growth is legal is decided by the
/// world before it touches a node.
#[derive(Clone, Debug)]
pub struct PlantNode {
    coord: NodeCoord,
    position: WorldPoint,
    branches: [Option<Branch>; 3],
    leaf: Option<Leaf>,
}

impl PlantNode {
    pub(crate) const fn new(coord: NodeCoord, position: WorldPoint) -> Self {
        Self {
            coord,
            position,
            branches: [None; 3],
            leaf: None,
        }
    }

    /// Lattice coordinate of the node.
    #[must_use]
    pub const fn coord(&self) -> NodeCoord {
        self.coord
    }

    /// World position fixed when the lattice was built.
    #[must_use]
    pub const fn position(&self) -> WorldPoint {
        self.position
    }

    /// Reports whether a live branch occupies the slot.
    #[must_use]
    pub fn has_branch(&self, direction: Direction) -> bool {
        self.branch(direction).is_some()
    }

    /// Branch occupying the slot, if any.
    #[must_use]
    pub fn branch(&self, direction: Direction) -> Option<Branch> {
        self.branches[direction.index()].filter(|branch| !branch.is_removed())
    }

    /// Reports whether a live leaf is attached.
    #[must_use]
    pub fn has_leaf(&self) -> bool {
        self.leaf().is_some()
    }

    /// Leaf attached to the node, if any.
    #[must_use]
    pub fn leaf(&self) -> Option<Leaf> {
        self.leaf.filter(|leaf| !leaf.is_removed())
    }

    /// Reports whether every slot is vacant.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.has_leaf() && Direction::ALL.iter().all(|direction| !self.has_branch(*direction))
    }

    pub(crate) fn make_branch(
        &mut self,
        direction: Direction,
        id: BranchId,
        kind: BranchKind,
    ) -> Branch {
        let branch = Branch::new(id, kind);
        self.branches[direction.index()] = Some(branch);
        branch
    }

    pub(crate) fn unmake_branch(&mut self, direction: Direction) -> Option<Branch> {
        self.branches[direction.index()]
            .take()
            .filter(|branch| !branch.is_removed())
            .map(Branch::into_removed)
    }

    pub(crate) fn make_leaf(&mut self, id: LeafId, kind: LeafKind, width: f32) -> Leaf {
        let leaf = Leaf::new(id, kind, width);
        self.leaf = Some(leaf);
        leaf
    }

    pub(crate) fn unmake_leaf(&mut self) -> Option<Leaf> {
        self.leaf
            .take()
            .filter(|leaf| !leaf.is_removed())
            .map(Leaf::into_removed)
    }

    /// Clears every slot, returning the evicted growth marked removed.
    pub(crate) fn reset(&mut self) -> Vec<Occupant> {
        let mut evicted = Vec::new();
        for direction in Direction::ALL {
            if let Some(branch) = self.unmake_branch(direction) {
                evicted.push(Occupant::Branch(direction, branch));
            }
        }
        if let Some(leaf) = self.unmake_leaf() {
            evicted.push(Occupant::Leaf(leaf));
        }
        evicted
    }

    pub(crate) fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot {
            node: self.coord,
            branches: Direction::ALL.map(|direction| self.branch(direction)),
            leaf: self.leaf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> PlantNode {
        PlantNode::new(NodeCoord::new(2, 3), WorldPoint::new(1.5, 3.0))
    }

    #[test]
    fn new_node_is_empty() {
        let node = node();
        assert!(node.is_empty());
        assert_eq!(node.coord(), NodeCoord::new(2, 3));
        assert_eq!(node.position(), WorldPoint::new(1.5, 3.0));
    }

    #[test]
    fn branch_slots_are_independent() {
        let mut node = node();
        let branch = node.make_branch(Direction::Left, BranchId::new(1), BranchKind::Normal);

        assert!(!branch.is_removed());
        assert!(node.has_branch(Direction::Left));
        assert!(!node.has_branch(Direction::Middle));
        assert!(!node.is_empty());

        let removed = node.unmake_branch(Direction::Left).expect("branch present");
        assert!(removed.is_removed());
        assert_eq!(removed.id(), branch.id());
        assert!(node.is_empty());
    }

    #[test]
    fn unmaking_an_empty_slot_is_a_no_op() {
        let mut node = node();
        assert_eq!(node.unmake_branch(Direction::Right), None);
        assert_eq!(node.unmake_leaf(), None);
        assert!(node.is_empty());
    }

    #[test]
    fn leaf_slot_counts_toward_occupancy() {
        let mut node = node();
        let _ = node.make_leaf(LeafId::new(4), LeafKind::Bouncy, 2.0);
        assert!(node.has_leaf());
        assert!(!node.is_empty());

        let removed = node.unmake_leaf().expect("leaf present");
        assert!(removed.is_removed());
        assert_eq!(removed.kind(), LeafKind::Bouncy);
        assert!(!node.has_leaf());
    }

    #[test]
    fn reset_evicts_everything_marked_removed() {
        let mut node = node();
        let _ = node.make_branch(Direction::Middle, BranchId::new(1), BranchKind::Reinforced);
        let _ = node.make_branch(Direction::Right, BranchId::new(2), BranchKind::Normal);
        let _ = node.make_leaf(LeafId::new(3), LeafKind::Normal, 1.0);

        let evicted = node.reset();

        assert_eq!(evicted.len(), 3);
        assert!(evicted.iter().all(|occupant| match occupant {
            Occupant::Branch(_, branch) => branch.is_removed(),
            Occupant::Leaf(leaf) => leaf.is_removed(),
        }));
        assert!(node.is_empty());
        assert!(node.reset().is_empty());
    }

    #[test]
    fn snapshot_mirrors_slots() {
        let mut node = node();
        let branch = node.make_branch(Direction::Right, BranchId::new(8), BranchKind::Normal);
        let snapshot = node.snapshot();
        assert_eq!(snapshot.node, NodeCoord::new(2, 3));
        assert_eq!(snapshot.branches, [None, None, Some(branch)]);
        assert_eq!(snapshot.leaf, None);
    }
}
