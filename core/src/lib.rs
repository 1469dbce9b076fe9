#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Beanstalk engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative plant world, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots such as [`PlantView`], and respond exclusively with new command
//! batches.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Beanstalk.";

/// Number of ticks the collapse engine waits between propagation steps.
pub const DEFAULT_COYOTE_TICKS: u32 = 15;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Rebuilds the plant lattice from scratch, discarding all growth.
    ConfigureLattice {
        /// Dimensions, spacing and origin of the new lattice.
        lattice: LatticeSpec,
        /// Grace window, in ticks, between successive collapse steps.
        coyote_ticks: u32,
    },
    /// Sets the leaf height that completes the level.
    ConfigureGoal {
        /// World-space height the tallest leaf must reach.
        target_height: f32,
    },
    /// Advances the fixed-step simulation by one tick.
    Tick,
    /// Requests a branch grown toward the provided world position.
    GrowBranch {
        /// Click position; resolves to a node and a direction slot.
        point: WorldPoint,
    },
    /// Requests a leaf grown on the node nearest the provided position.
    GrowLeaf {
        /// Click position resolved to a lattice node.
        point: WorldPoint,
        /// Kind of leaf to grow.
        kind: LeafKind,
        /// Width of the leaf platform in world units.
        width: f32,
    },
    /// Replaces an existing branch with one of an upgraded kind.
    UpgradeBranch {
        /// Position resolved to the node holding the branch.
        point: WorldPoint,
        /// Slot holding the branch to upgrade.
        direction: Direction,
        /// Kind the branch should become.
        kind: BranchKind,
    },
    /// Replaces an existing leaf with one of an upgraded kind.
    UpgradeLeaf {
        /// Position resolved to the node holding the leaf.
        point: WorldPoint,
        /// Kind the leaf should become.
        kind: LeafKind,
    },
    /// Destroys a single branch, scheduling a collapse check from its node.
    DestroyBranch {
        /// Node holding the branch.
        node: NodeCoord,
        /// Slot holding the branch.
        direction: Direction,
    },
    /// Destroys the leaf attached to a node.
    DestroyLeaf {
        /// Node holding the leaf.
        node: NodeCoord,
    },
    /// Burns every branch and leaf at a node.
    BurnNode {
        /// Node engulfed by the hazard.
        node: NodeCoord,
    },
    /// Credits collected resources to the world's resource gate.
    CollectResource {
        /// Resource that was collected.
        resource: ResourceKind,
        /// Number of rations granted.
        amount: u32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the lattice was rebuilt and all growth discarded.
    LatticeConfigured {
        /// Number of node columns in the new lattice.
        columns: u32,
        /// Number of node rows in the new lattice.
        rows: u32,
    },
    /// Indicates that the simulation advanced by one fixed step.
    TimeAdvanced {
        /// Index of the tick that just completed.
        tick: u64,
    },
    /// Confirms that a branch was installed into a node slot.
    BranchGrown {
        /// Node owning the branch.
        node: NodeCoord,
        /// Slot occupied by the branch.
        direction: Direction,
        /// Record describing the new branch.
        branch: Branch,
    },
    /// Confirms that a branch left its slot; the record is marked removed.
    BranchRemoved {
        /// Node that owned the branch.
        node: NodeCoord,
        /// Slot the branch occupied.
        direction: Direction,
        /// Record describing the removed branch.
        branch: Branch,
    },
    /// Confirms that a leaf was attached to a node.
    LeafGrown {
        /// Node owning the leaf.
        node: NodeCoord,
        /// Record describing the new leaf.
        leaf: Leaf,
    },
    /// Confirms that a leaf was detached; the record is marked removed.
    LeafRemoved {
        /// Node that owned the leaf.
        node: NodeCoord,
        /// Record describing the removed leaf.
        leaf: Leaf,
    },
    /// Reports that a growth or upgrade request was rejected.
    GrowthRejected {
        /// Position supplied with the request.
        point: WorldPoint,
        /// First failing check, in evaluation order.
        reason: GrowthRejection,
    },
    /// Reports that a node was stripped by fire or by the collapse engine.
    NodeCollapsed {
        /// Node whose growth was removed or downgraded.
        node: NodeCoord,
    },
    /// Reports that the tallest surviving leaf changed.
    MaxLeafChanged {
        /// Node holding the tallest leaf, if any leaf survives.
        node: Option<NodeCoord>,
        /// World-space height of that leaf, or the ground line.
        height: f32,
    },
    /// Announces that the tallest leaf reached the configured goal height.
    GoalReached {
        /// Height of the leaf that satisfied the goal.
        height: f32,
    },
    /// Confirms that collected resources were credited.
    ResourceCollected {
        /// Resource that was collected.
        resource: ResourceKind,
        /// Number of rations granted.
        amount: u32,
    },
}

/// Location of a single lattice node expressed as column and row coordinates.
///
/// Even columns form the lower sub-lattice whose row 0 touches the ground.
/// Odd columns are shifted upward by half a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeCoord {
    column: u32,
    row: u32,
}

impl NodeCoord {
    /// Creates a new lattice coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the node.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the node.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Reports whether the node sits on the raised, odd-column sub-lattice.
    #[must_use]
    pub const fn is_upper(&self) -> bool {
        self.column % 2 == 1
    }

    /// Reports whether the node is a ground-row node of the lower sub-lattice.
    ///
    /// These nodes are always able to hold branches but never leaves.
    #[must_use]
    pub const fn is_ground_anchor(&self) -> bool {
        !self.is_upper() && self.row == 0
    }
}

/// Continuous world-space position. The y axis grows upward from the ground.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    /// Horizontal coordinate in world units.
    pub x: f32,
    /// Vertical coordinate in world units.
    pub y: f32,
}

impl WorldPoint {
    /// Creates a new world-space point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Branch attachment slots emanating from a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Upper-left diagonal.
    Left,
    /// Straight up.
    Middle,
    /// Upper-right diagonal.
    Right,
}

impl Direction {
    /// Every direction in slot order.
    pub const ALL: [Direction; 3] = [Direction::Left, Direction::Middle, Direction::Right];

    /// Index of the slot that stores a branch growing in this direction.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Middle => 1,
            Self::Right => 2,
        }
    }
}

/// Structural variants of a branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BranchKind {
    /// Plain branch removed by the first destructive hit.
    Normal,
    /// Hardened branch that survives one burn by downgrading to normal.
    Reinforced,
}

impl BranchKind {
    /// Kind obtained by upgrading this branch, if an upgrade exists.
    #[must_use]
    pub const fn upgraded(self) -> Option<Self> {
        match self {
            Self::Normal => Some(Self::Reinforced),
            Self::Reinforced => None,
        }
    }

    /// Kind left behind after absorbing one hit, if the branch survives.
    #[must_use]
    pub const fn downgraded(self) -> Option<Self> {
        match self {
            Self::Normal => None,
            Self::Reinforced => Some(Self::Normal),
        }
    }
}

/// Variants of a leaf platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeafKind {
    /// Standard platform.
    Normal,
    /// Platform that launches the player upward.
    Bouncy,
}

impl LeafKind {
    /// Kind obtained by upgrading this leaf, if an upgrade exists.
    #[must_use]
    pub const fn upgraded(self) -> Option<Self> {
        match self {
            Self::Normal => Some(Self::Bouncy),
            Self::Bouncy => None,
        }
    }
}

/// Unique identifier assigned to a branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BranchId(u32);

impl BranchId {
    /// Creates a new branch identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeafId(u32);

impl LeafId {
    /// Creates a new leaf identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Record describing a branch handed to adapters for physics and rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Branch {
    id: BranchId,
    kind: BranchKind,
    removed: bool,
}

impl Branch {
    /// Creates a live branch record.
    #[must_use]
    pub const fn new(id: BranchId, kind: BranchKind) -> Self {
        Self {
            id,
            kind,
            removed: false,
        }
    }

    /// Identifier allocated by the world.
    #[must_use]
    pub const fn id(&self) -> BranchId {
        self.id
    }

    /// Structural kind of the branch.
    #[must_use]
    pub const fn kind(&self) -> BranchKind {
        self.kind
    }

    /// Reports whether the branch has left the plant.
    #[must_use]
    pub const fn is_removed(&self) -> bool {
        self.removed
    }

    /// Returns a copy of the record flagged as removed.
    #[must_use]
    pub const fn into_removed(self) -> Self {
        Self {
            removed: true,
            ..self
        }
    }
}

/// Record describing a leaf handed to adapters for physics and rendering.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    id: LeafId,
    kind: LeafKind,
    width: f32,
    removed: bool,
}

impl Leaf {
    /// Creates a live leaf record.
    #[must_use]
    pub const fn new(id: LeafId, kind: LeafKind, width: f32) -> Self {
        Self {
            id,
            kind,
            width,
            removed: false,
        }
    }

    /// Identifier allocated by the world.
    #[must_use]
    pub const fn id(&self) -> LeafId {
        self.id
    }

    /// Variant of the leaf.
    #[must_use]
    pub const fn kind(&self) -> LeafKind {
        self.kind
    }

    /// Width of the leaf platform in world units.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Reports whether the leaf has left the plant.
    #[must_use]
    pub const fn is_removed(&self) -> bool {
        self.removed
    }

    /// Returns a copy of the record flagged as removed.
    #[must_use]
    pub const fn into_removed(self) -> Self {
        Self {
            removed: true,
            ..self
        }
    }
}

/// Validated construction parameters for the plant lattice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatticeSpec {
    columns: u32,
    rows: u32,
    spacing: f32,
    origin: WorldPoint,
}

impl LatticeSpec {
    /// Validates and creates a lattice description.
    ///
    /// `spacing` is the distance between a node and each of its three upward
    /// neighbours; `origin` is the world position of node `(0, 0)`.
    pub fn new(
        columns: u32,
        rows: u32,
        spacing: f32,
        origin: WorldPoint,
    ) -> Result<Self, LatticeError> {
        if columns == 0 || rows == 0 {
            return Err(LatticeError::Empty { columns, rows });
        }
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(LatticeError::InvalidSpacing(spacing));
        }
        if !origin.x.is_finite() || !origin.y.is_finite() {
            return Err(LatticeError::InvalidOrigin(origin));
        }

        Ok(Self {
            columns,
            rows,
            spacing,
            origin,
        })
    }

    /// Number of node columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of node rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Distance between a node and each upward neighbour.
    #[must_use]
    pub const fn spacing(&self) -> f32 {
        self.spacing
    }

    /// World position of node `(0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> WorldPoint {
        self.origin
    }

    /// Total number of nodes in the lattice.
    #[must_use]
    pub fn node_count(&self) -> usize {
        let count = u64::from(self.columns) * u64::from(self.rows);
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Reports whether the coordinate lies inside the lattice.
    #[must_use]
    pub const fn contains(&self, node: NodeCoord) -> bool {
        node.column() < self.columns && node.row() < self.rows
    }
}

impl Default for LatticeSpec {
    fn default() -> Self {
        Self {
            columns: 9,
            rows: 24,
            spacing: 1.0,
            origin: WorldPoint::new(0.0, 0.0),
        }
    }
}

/// Reasons a lattice description may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum LatticeError {
    /// The lattice would contain no nodes.
    #[error("lattice must contain at least one node, got {columns}x{rows}")]
    Empty {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// Node spacing is not a finite positive number.
    #[error("node spacing must be finite and positive, got {0}")]
    InvalidSpacing(f32),
    /// The origin contains a non-finite component.
    #[error("lattice origin must be finite, got {0:?}")]
    InvalidOrigin(WorldPoint),
}

/// Reasons a growth or upgrade request may be rejected by the world.
///
/// Checks run in declaration order so that preview queries and the commands
/// they preview always report the same reason.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum GrowthRejection {
    /// The request resolved outside the lattice or to a downward direction.
    #[error("request does not resolve to a growable lattice slot")]
    Geometry,
    /// The target node is not held up by the existing plant.
    #[error("target node is not structurally supported")]
    Structural,
    /// The resource gate cannot fund the request.
    #[error("insufficient resources")]
    Resource,
    /// The slot already holds the requested growth.
    #[error("slot is already occupied")]
    Occupied,
    /// An upgrade targeted a slot with nothing in it.
    #[error("slot holds nothing to upgrade")]
    Vacant,
}

/// Collectible resources that fund growth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Funds branch growth.
    Water,
    /// Funds leaf growth.
    Sunlight,
    /// Funds branch and leaf upgrades.
    Compost,
}

/// Ration checks the plant consults before growing or upgrading.
///
/// The world owns an explicitly constructed implementation; callers inject it
/// when building the world.
pub trait ResourceGate {
    /// Reports whether a branch can be funded.
    fn can_grow_branch(&self) -> bool;
    /// Reports whether a leaf can be funded.
    fn can_grow_leaf(&self) -> bool;
    /// Reports whether an upgrade can be funded.
    fn can_upgrade(&self) -> bool;
    /// Consumes one branch ration.
    fn decrement_grow_branch(&mut self);
    /// Consumes one leaf ration.
    fn decrement_grow_leaf(&mut self);
    /// Consumes one upgrade ration.
    fn decrement_upgrade(&mut self);
    /// Credits collected resources.
    fn replenish(&mut self, resource: ResourceKind, amount: u32);
}

/// Immutable representation of one occupied node used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeSnapshot {
    /// Coordinate of the node.
    pub node: NodeCoord,
    /// Branch slots in [`Direction::ALL`] order.
    pub branches: [Option<Branch>; 3],
    /// Leaf attached to the node, if any.
    pub leaf: Option<Leaf>,
}

impl NodeSnapshot {
    /// Iterator over the occupied branch slots.
    pub fn branches(&self) -> impl Iterator<Item = (Direction, Branch)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(|direction| self.branches[direction.index()].map(|b| (direction, b)))
    }
}

/// Read-only snapshot describing every occupied node of the plant.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlantView {
    snapshots: Vec<NodeSnapshot>,
    max_leaf: Option<NodeCoord>,
}

impl PlantView {
    /// Creates a new plant view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<NodeSnapshot>, max_leaf: Option<NodeCoord>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.node);
        Self {
            snapshots,
            max_leaf,
        }
    }

    /// Iterator over the occupied nodes in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeSnapshot> {
        self.snapshots.iter()
    }

    /// Number of occupied nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the plant has no growth at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Node holding the tallest surviving leaf.
    #[must_use]
    pub const fn max_leaf(&self) -> Option<NodeCoord> {
        self.max_leaf
    }

    /// Every grown branch with its owning node and slot.
    pub fn branches(&self) -> impl Iterator<Item = (NodeCoord, Direction, Branch)> + '_ {
        self.snapshots.iter().flat_map(|snapshot| {
            snapshot
                .branches()
                .map(move |(direction, branch)| (snapshot.node, direction, branch))
        })
    }

    /// Every attached leaf with its owning node.
    pub fn leaves(&self) -> impl Iterator<Item = (NodeCoord, Leaf)> + '_ {
        self.snapshots
            .iter()
            .filter_map(|snapshot| snapshot.leaf.map(|leaf| (snapshot.node, leaf)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn branch_record_round_trips_through_bincode() {
        let branch = Branch::new(BranchId::new(9), BranchKind::Reinforced).into_removed();
        assert_round_trip(&branch);
    }

    #[test]
    fn ground_anchor_is_only_even_ground_row() {
        assert!(NodeCoord::new(0, 0).is_ground_anchor());
        assert!(NodeCoord::new(4, 0).is_ground_anchor());
        assert!(!NodeCoord::new(1, 0).is_ground_anchor());
        assert!(!NodeCoord::new(2, 1).is_ground_anchor());
    }

    #[test]
    fn direction_indices_follow_slot_order() {
        let indices: Vec<usize> = Direction::ALL.iter().map(|d| d.index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn reinforced_branch_downgrades_once() {
        assert_eq!(BranchKind::Normal.upgraded(), Some(BranchKind::Reinforced));
        assert_eq!(BranchKind::Reinforced.downgraded(), Some(BranchKind::Normal));
        assert_eq!(BranchKind::Normal.downgraded(), None);
        assert_eq!(LeafKind::Bouncy.upgraded(), None);
    }

    #[test]
    fn removal_marks_record_without_touching_identity() {
        let leaf = Leaf::new(LeafId::new(3), LeafKind::Normal, 1.5);
        let removed = leaf.into_removed();
        assert!(!leaf.is_removed());
        assert!(removed.is_removed());
        assert_eq!(removed.id(), leaf.id());
        assert_eq!(removed.width(), 1.5);
    }

    #[test]
    fn lattice_spec_rejects_degenerate_input() {
        let origin = WorldPoint::default();
        assert_eq!(
            LatticeSpec::new(0, 4, 1.0, origin),
            Err(LatticeError::Empty {
                columns: 0,
                rows: 4
            })
        );
        assert_eq!(
            LatticeSpec::new(3, 3, 0.0, origin),
            Err(LatticeError::InvalidSpacing(0.0))
        );
        assert!(LatticeSpec::new(3, 3, 1.0, WorldPoint::new(f32::NAN, 0.0)).is_err());

        let spec = LatticeSpec::new(5, 4, 2.0, origin).expect("valid lattice");
        assert_eq!(spec.node_count(), 20);
        assert!(spec.contains(NodeCoord::new(4, 3)));
        assert!(!spec.contains(NodeCoord::new(5, 0)));
    }

    #[test]
    fn plant_view_sorts_and_flattens_branches() {
        let branch = Branch::new(BranchId::new(1), BranchKind::Normal);
        let view = PlantView::from_snapshots(
            vec![
                NodeSnapshot {
                    node: NodeCoord::new(2, 0),
                    branches: [None, Some(branch), None],
                    leaf: None,
                },
                NodeSnapshot {
                    node: NodeCoord::new(0, 0),
                    branches: [Some(branch), None, Some(branch)],
                    leaf: None,
                },
            ],
            None,
        );

        let flattened: Vec<(NodeCoord, Direction)> = view
            .branches()
            .map(|(node, direction, _)| (node, direction))
            .collect();
        assert_eq!(
            flattened,
            vec![
                (NodeCoord::new(0, 0), Direction::Left),
                (NodeCoord::new(0, 0), Direction::Right),
                (NodeCoord::new(2, 0), Direction::Middle),
            ]
        );
    }
}
