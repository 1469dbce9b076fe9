//! Coordinate math for the hex-offset plant lattice.
//!
//! Even columns form the lower sub-lattice, odd columns sit half a row higher.
//! Column spacing is `spacing * sqrt(3) / 2` so that every node is exactly
//! `spacing` away from each of its three upward neighbours, and branches leave
//! a node at 30, 90 and 150 degrees.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_6, PI, TAU};

use beanstalk_core::{Direction, LatticeSpec, NodeCoord, WorldPoint};

const HEX_COLUMN_RATIO: f32 = 0.866_025_4;
const AIM_FRACTION: f32 = 1.0 / 3.0;
/// Relative distance below which a row quotient counts as landing on the row.
const ROW_SNAP_EPSILON: f32 = 1e-4;

/// Stateless geometry helper bound to a validated [`LatticeSpec`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lattice {
    spec: LatticeSpec,
}

impl Lattice {
    /// Wraps a lattice description.
    #[must_use]
    pub const fn new(spec: LatticeSpec) -> Self {
        Self { spec }
    }

    /// Underlying lattice description.
    #[must_use]
    pub const fn spec(&self) -> LatticeSpec {
        self.spec
    }

    /// Number of node columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.spec.columns()
    }

    /// Number of node rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.spec.rows()
    }

    /// Horizontal distance between neighbouring columns.
    #[must_use]
    pub fn column_spacing(&self) -> f32 {
        self.spec.spacing() * HEX_COLUMN_RATIO
    }

    /// Vertical distance between rows of the same column.
    #[must_use]
    pub const fn row_spacing(&self) -> f32 {
        self.spec.spacing()
    }

    /// Reports whether the coordinate lies inside the lattice.
    #[must_use]
    pub const fn contains(&self, node: NodeCoord) -> bool {
        self.spec.contains(node)
    }

    /// Resolves a world position to the node whose growth region contains it.
    ///
    /// The column snaps to the nearest column. The row is truncated toward
    /// zero after removing the odd-column offset, which biases clicks toward
    /// the node below them; clicks just under a raised node therefore still
    /// resolve to row zero. Quotients within rounding error of a whole row
    /// snap to it, so every node's own position maps back to that node.
    #[must_use]
    pub fn world_to_index(&self, point: WorldPoint) -> Option<NodeCoord> {
        let origin = self.spec.origin();
        let column = ((point.x - origin.x) / self.column_spacing()).round();
        if !column.is_finite() || column < 0.0 || column >= self.columns() as f32 {
            return None;
        }
        let column = column as u32;

        let offset = self.vertical_offset(column);
        let raw = (point.y - origin.y - offset) / self.row_spacing();
        let nearest = raw.round();
        let row = if (raw - nearest).abs() <= ROW_SNAP_EPSILON * nearest.abs().max(1.0) {
            nearest
        } else {
            raw.trunc()
        };
        if !row.is_finite() || row < 0.0 || row >= self.rows() as f32 {
            return None;
        }

        Some(NodeCoord::new(column, row as u32))
    }

    /// World position of a node.
    #[must_use]
    pub fn index_to_world(&self, node: NodeCoord) -> WorldPoint {
        let origin = self.spec.origin();
        WorldPoint::new(
            origin.x + node.column() as f32 * self.column_spacing(),
            origin.y + node.row() as f32 * self.row_spacing() + self.vertical_offset(node.column()),
        )
    }

    /// Resolves a click to the node it belongs to and the slot it points at.
    #[must_use]
    pub fn resolve_branch(&self, point: WorldPoint) -> Option<(NodeCoord, Direction)> {
        let node = self.world_to_index(point)?;
        let anchor = self.index_to_world(node);
        let angle = (point.y - anchor.y).atan2(point.x - anchor.x);
        angle_to_direction(angle).map(|direction| (node, direction))
    }

    /// A world position that resolves to `(node, direction)`.
    ///
    /// The point lies a third of the way along the branch, well inside the
    /// source node's growth region.
    #[must_use]
    pub fn branch_aim(&self, node: NodeCoord, direction: Direction) -> WorldPoint {
        let anchor = self.index_to_world(node);
        let reach = self.spec.spacing() * AIM_FRACTION;
        let angle = direction_angle(direction);
        WorldPoint::new(anchor.x + reach * angle.cos(), anchor.y + reach * angle.sin())
    }

    /// Positions whose branches hold `node` up, paired with the slot that must
    /// be filled. Out-of-bounds positions are skipped.
    pub fn supports(&self, node: NodeCoord) -> impl Iterator<Item = (NodeCoord, Direction)> {
        let lattice = *self;
        let column = i64::from(node.column());
        let row = i64::from(node.row());
        let lateral_row = if node.is_upper() { row } else { row - 1 };
        let candidates = [
            (column, row - 1, Direction::Middle),
            (column - 1, lateral_row, Direction::Right),
            (column + 1, lateral_row, Direction::Left),
        ];

        candidates
            .into_iter()
            .filter_map(move |(column, row, direction)| {
                lattice.coord(column, row).map(|support| (support, direction))
            })
    }

    /// Node reached by a branch grown from `node` in `direction`.
    #[must_use]
    pub fn branch_tip(&self, node: NodeCoord, direction: Direction) -> Option<NodeCoord> {
        let column = i64::from(node.column());
        let row = i64::from(node.row());
        let lateral_row = if node.is_upper() { row + 1 } else { row };
        match direction {
            Direction::Left => self.coord(column - 1, lateral_row),
            Direction::Middle => self.coord(column, row + 1),
            Direction::Right => self.coord(column + 1, lateral_row),
        }
    }

    /// Upward and diagonal neighbours whose support may depend on `node`.
    pub fn dependents(&self, node: NodeCoord) -> impl Iterator<Item = NodeCoord> {
        let lattice = *self;
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| lattice.branch_tip(node, direction))
    }

    /// Every node ordered from the highest to the lowest.
    ///
    /// Rows run top-down; within a row odd columns come before even columns,
    /// each in ascending order. The first leaf met in this order is the
    /// tallest, with ties broken toward the left.
    pub fn scan_top_down(&self) -> impl Iterator<Item = NodeCoord> {
        let columns = self.columns();
        (0..self.rows()).rev().flat_map(move |row| {
            let odd = (0..columns).filter(|column| column % 2 == 1);
            let even = (0..columns).filter(|column| column % 2 == 0);
            odd.chain(even).map(move |column| NodeCoord::new(column, row))
        })
    }

    pub(crate) fn index(&self, node: NodeCoord) -> Option<usize> {
        if !self.contains(node) {
            return None;
        }
        let row = usize::try_from(node.row()).ok()?;
        let column = usize::try_from(node.column()).ok()?;
        let width = usize::try_from(self.columns()).ok()?;
        Some(row * width + column)
    }

    fn coord(&self, column: i64, row: i64) -> Option<NodeCoord> {
        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        let node = NodeCoord::new(column, row);
        self.contains(node).then_some(node)
    }

    fn vertical_offset(&self, column: u32) -> f32 {
        if column % 2 == 1 {
            self.row_spacing() * 0.5
        } else {
            0.0
        }
    }
}

/// Buckets an angle into a branch slot.
///
/// The angle is normalised to `[0, 2π)`. Anything pointing at or below the
/// horizontal on the left (`>= π`) yields `None` because branches never grow
/// downward. The upper half splits into three 60 degree sectors: right,
/// middle, left in increasing angle.
#[must_use]
pub fn angle_to_direction(angle: f32) -> Option<Direction> {
    if !angle.is_finite() {
        return None;
    }

    let normalized = angle.rem_euclid(TAU);
    if normalized >= PI {
        None
    } else if normalized < FRAC_PI_3 {
        Some(Direction::Right)
    } else if normalized < 2.0 * FRAC_PI_3 {
        Some(Direction::Middle)
    } else {
        Some(Direction::Left)
    }
}

fn direction_angle(direction: Direction) -> f32 {
    match direction {
        Direction::Right => FRAC_PI_6,
        Direction::Middle => FRAC_PI_2,
        Direction::Left => PI - FRAC_PI_6,
    }
}
