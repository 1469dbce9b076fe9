//! Counter-based resource gate.

use beanstalk_core::{ResourceGate, ResourceKind};

/// Branch, leaf and upgrade rations funded by collected resources.
///
/// Water funds branches, sunlight funds leaves and compost funds upgrades.
/// Counters saturate in both directions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rations {
    branch: u32,
    leaf: u32,
    upgrade: u32,
}

impl Rations {
    /// Pool a fresh garden starts with.
    pub const STARTER: Self = Self::new(40, 12, 4);

    /// Creates a pool holding the provided rations.
    #[must_use]
    pub const fn new(branch: u32, leaf: u32, upgrade: u32) -> Self {
        Self {
            branch,
            leaf,
            upgrade,
        }
    }

    /// Remaining branch rations.
    #[must_use]
    pub const fn branch(&self) -> u32 {
        self.branch
    }

    /// Remaining leaf rations.
    #[must_use]
    pub const fn leaf(&self) -> u32 {
        self.leaf
    }

    /// Remaining upgrade rations.
    #[must_use]
    pub const fn upgrade(&self) -> u32 {
        self.upgrade
    }
}

impl ResourceGate for Rations {
    fn can_grow_branch(&self) -> bool {
        self.branch > 0
    }

    fn can_grow_leaf(&self) -> bool {
        self.leaf > 0
    }

    fn can_upgrade(&self) -> bool {
        self.upgrade > 0
    }

    fn decrement_grow_branch(&mut self) {
        self.branch = self.branch.saturating_sub(1);
    }

    fn decrement_grow_leaf(&mut self) {
        self.leaf = self.leaf.saturating_sub(1);
    }

    fn decrement_upgrade(&mut self) {
        self.upgrade = self.upgrade.saturating_sub(1);
    }

    fn replenish(&mut self, resource: ResourceKind, amount: u32) {
        let counter = match resource {
            ResourceKind::Water => &mut self.branch,
            ResourceKind::Sunlight => &mut self.leaf,
            ResourceKind::Compost => &mut self.upgrade,
        };
        *counter = counter.saturating_add(amount);
    }
}
