#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Beanstalk session.

mod gardener;
mod level;

use std::path::PathBuf;

use anyhow::Result;
use beanstalk_core::{Command, Event};
use beanstalk_system_growth::{Growth, GrowthPreview};
use beanstalk_system_hazards::{self as hazards, Hazards};
use beanstalk_world::{self as world, query, World};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use self::gardener::Gardener;
use self::level::Level;

/// Headless Beanstalk session driven by a scripted gardener.
#[derive(Parser, Debug)]
#[command(name = "beanstalk")]
#[command(about = "Grow a beanstalk toward the goal height while hazards chew on it")]
struct Args {
    /// Level file in TOML; built-in defaults are used when omitted
    #[arg(long)]
    level: Option<PathBuf>,

    /// Number of simulation frames to run
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Seed for the hazard generator
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Only report warnings and the final summary
    #[arg(long)]
    quiet: bool,
}

/// Entry point for the Beanstalk command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.quiet);

    let level = match &args.level {
        Some(path) => Level::load(path)?,
        None => Level::default(),
    };

    let mut world = World::with_gate(
        level.lattice_spec()?,
        level.collapse.coyote_ticks,
        level.rations(),
    );
    println!("{}", query::welcome_banner(&world));

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureGoal {
            target_height: level.goal.target_height,
        },
        &mut events,
    );

    let mut growth = Growth::new();
    let mut hazards = Hazards::new(hazards::Config::new(
        level.hazards.strike_interval_ticks,
        args.seed,
    ));
    let mut gardener = Gardener::default();
    let mut summary = Summary::default();

    for _ in 0..args.frames {
        let input = gardener.plan(&world);
        let preview = input
            .point()
            .map(|point| GrowthPreview::capture(&world, point));

        let mut commands = Vec::new();
        growth.handle(&events, preview, input, &mut commands);
        hazards.handle(&events, &query::plant_view(&world), &mut commands);
        gardener.forage(&mut commands);
        commands.push(Command::Tick);

        events.clear();
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        summary.record(&events);
    }

    info!(frames = args.frames, "session finished");
    summary.print(&world);
    Ok(())
}

fn init_tracing(quiet: bool) {
    let fallback = if quiet { "beanstalk=warn" } else { "beanstalk=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[derive(Debug, Default)]
struct Summary {
    frames: u64,
    branches_grown: u64,
    branches_lost: u64,
    leaves_grown: u64,
    leaves_lost: u64,
    collapses: u64,
    rejections: u64,
    goal_reached_at: Option<u64>,
}

impl Summary {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TimeAdvanced { tick } => self.frames = *tick,
                Event::BranchGrown { .. } => self.branches_grown += 1,
                Event::BranchRemoved { .. } => self.branches_lost += 1,
                Event::LeafGrown { .. } => self.leaves_grown += 1,
                Event::LeafRemoved { .. } => self.leaves_lost += 1,
                Event::NodeCollapsed { .. } => self.collapses += 1,
                Event::GrowthRejected { .. } => self.rejections += 1,
                Event::GoalReached { .. } => {
                    self.goal_reached_at = self.goal_reached_at.or(Some(self.frames + 1));
                }
                _ => {}
            }
        }
    }

    fn print(&self, world: &World) {
        let plant = query::plant_view(world);
        println!("frames:           {}", self.frames);
        println!(
            "branches:         {} standing ({} grown, {} lost)",
            plant.branches().count(),
            self.branches_grown,
            self.branches_lost
        );
        println!(
            "leaves:           {} standing ({} grown, {} lost)",
            plant.leaves().count(),
            self.leaves_grown,
            self.leaves_lost
        );
        println!("collapses:        {}", self.collapses);
        println!("rejections:       {}", self.rejections);
        println!("max leaf height:  {:.2}", query::max_leaf_height(world));
        match self.goal_reached_at {
            Some(frame) => println!("goal:             reached on frame {frame}"),
            None => println!("goal:             not reached"),
        }
    }
}
