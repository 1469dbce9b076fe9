#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic hazard system responsible for emitting plant damage commands.

use beanstalk_core::{Command, Event, NodeCoord, PlantView};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Kinds of damage the plant can suffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hazard {
    /// Burns everything attached to one node.
    Fire,
    /// Knocks the tallest leaf off the plant.
    Drone,
    /// Chews through a single branch.
    Bug,
}

const HAZARDS: [Hazard; 3] = [Hazard::Fire, Hazard::Drone, Hazard::Bug];

/// Configuration parameters required to construct the hazard system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    strike_interval_ticks: u64,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided strike cadence and seed.
    #[must_use]
    pub const fn new(strike_interval_ticks: u64, rng_seed: u64) -> Self {
        Self {
            strike_interval_ticks,
            rng_seed,
        }
    }
}

/// Pure system that deterministically strikes the plant at a fixed cadence.
#[derive(Debug)]
pub struct Hazards {
    strike_interval_ticks: u64,
    elapsed: u64,
    rng: ChaCha8Rng,
}

impl Hazards {
    /// Creates a new hazard system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            strike_interval_ticks: config.strike_interval_ticks,
            elapsed: 0,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and the current plant snapshot to emit damage commands.
    ///
    /// Every elapsed interval yields one strike attempt. Strikes that find no
    /// target are skipped.
    pub fn handle(&mut self, events: &[Event], plant: &PlantView, out: &mut Vec<Command>) {
        if self.strike_interval_ticks == 0 {
            return;
        }

        let advanced = events
            .iter()
            .filter(|event| matches!(event, Event::TimeAdvanced { .. }))
            .count() as u64;
        if advanced == 0 {
            return;
        }

        self.elapsed = self.elapsed.saturating_add(advanced);
        while self.elapsed >= self.strike_interval_ticks {
            self.elapsed -= self.strike_interval_ticks;
            let hazard = HAZARDS[self.rng.gen_range(0..HAZARDS.len())];
            if let Some(command) = self.strike(hazard, plant) {
                debug!(?hazard, ?command, "hazard strikes");
                out.push(command);
            }
        }
    }

    fn strike(&mut self, hazard: Hazard, plant: &PlantView) -> Option<Command> {
        match hazard {
            Hazard::Fire => {
                let occupied: Vec<NodeCoord> = plant.iter().map(|snapshot| snapshot.node).collect();
                self.pick(&occupied)
                    .map(|node| Command::BurnNode { node })
            }
            Hazard::Drone => match plant.max_leaf() {
                Some(node) => Some(Command::DestroyLeaf { node }),
                None => self.strike(Hazard::Bug, plant),
            },
            Hazard::Bug => {
                let branches: Vec<_> = plant
                    .branches()
                    .map(|(node, direction, _)| (node, direction))
                    .collect();
                self.pick(&branches)
                    .map(|(node, direction)| Command::DestroyBranch { node, direction })
            }
        }
    }

    fn pick<T: Copy>(&mut self, candidates: &[T]) -> Option<T> {
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[self.rng.gen_range(0..candidates.len())])
    }
}
