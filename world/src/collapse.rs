//! Coyote-time gated queue driving structural collapse.
//!
//! Every destruction pushes the damaged node and restarts the grace window.
//! Once the window runs out the world pops one node per window and checks
//! whether its upward neighbours still have support. Collapse therefore
//! ripples outward one node at a time instead of dropping the whole plant in
//! a single tick, and bursts of damage share a single sweep.

use std::collections::VecDeque;

use beanstalk_core::NodeCoord;

#[derive(Clone, Debug)]
pub(crate) struct CollapseQueue {
    window: u32,
    coyote_remaining: u32,
    pending: VecDeque<NodeCoord>,
}

impl CollapseQueue {
    pub(crate) fn new(window: u32) -> Self {
        Self {
            window,
            coyote_remaining: 0,
            pending: VecDeque::new(),
        }
    }

    /// Queues a node for a support check and restarts the grace window.
    pub(crate) fn enqueue(&mut self, node: NodeCoord) {
        self.pending.push_back(node);
        self.coyote_remaining = self.window;
    }

    /// Advances the state machine by one tick.
    ///
    /// Returns the node to examine when the grace window has run out and work
    /// is pending. Popping restarts the window whether or not the check ends up
    /// destroying anything.
    pub(crate) fn poll(&mut self) -> Option<NodeCoord> {
        if self.coyote_remaining > 0 {
            self.coyote_remaining -= 1;
            return None;
        }

        let node = self.pending.pop_front()?;
        self.coyote_remaining = self.window;
        Some(node)
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) const fn coyote_remaining(&self) -> u32 {
        self.coyote_remaining
    }
}
