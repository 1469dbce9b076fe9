//! Level files describing the lattice, rations, goal and hazard cadence.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use beanstalk_core::{LatticeSpec, WorldPoint, DEFAULT_COYOTE_TICKS};
use beanstalk_world::Rations;
use serde::Deserialize;

/// Level description loaded from TOML. Missing sections use defaults.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Level {
    pub(crate) lattice: LatticeSection,
    pub(crate) collapse: CollapseSection,
    pub(crate) rations: RationsSection,
    pub(crate) goal: GoalSection,
    pub(crate) hazards: HazardSection,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LatticeSection {
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    pub(crate) spacing: f32,
    pub(crate) origin: [f32; 2],
}

impl Default for LatticeSection {
    fn default() -> Self {
        let spec = LatticeSpec::default();
        Self {
            columns: spec.columns(),
            rows: spec.rows(),
            spacing: spec.spacing(),
            origin: [spec.origin().x, spec.origin().y],
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CollapseSection {
    pub(crate) coyote_ticks: u32,
}

impl Default for CollapseSection {
    fn default() -> Self {
        Self {
            coyote_ticks: DEFAULT_COYOTE_TICKS,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RationsSection {
    pub(crate) branch: u32,
    pub(crate) leaf: u32,
    pub(crate) upgrade: u32,
}

impl Default for RationsSection {
    fn default() -> Self {
        let starter = Rations::STARTER;
        Self {
            branch: starter.branch(),
            leaf: starter.leaf(),
            upgrade: starter.upgrade(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GoalSection {
    pub(crate) target_height: f32,
}

impl Default for GoalSection {
    fn default() -> Self {
        Self {
            target_height: 12.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct HazardSection {
    pub(crate) strike_interval_ticks: u64,
}

impl Default for HazardSection {
    fn default() -> Self {
        Self {
            strike_interval_ticks: 45,
        }
    }
}

impl Level {
    /// Reads and parses the level file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read level file at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid level file {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let level: Self = toml::from_str(contents).context("failed to parse level toml contents")?;
        let _ = level.lattice_spec()?;
        Ok(level)
    }

    pub(crate) fn lattice_spec(&self) -> Result<LatticeSpec> {
        let [x, y] = self.lattice.origin;
        LatticeSpec::new(
            self.lattice.columns,
            self.lattice.rows,
            self.lattice.spacing,
            WorldPoint::new(x, y),
        )
        .context("level describes an invalid lattice")
    }

    pub(crate) fn rations(&self) -> Rations {
        Rations::new(self.rations.branch, self.rations.leaf, self.rations.upgrade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let level = Level::parse("").expect("empty level parses");
        assert_eq!(level, Level::default());
        assert_eq!(
            level.lattice_spec().expect("default lattice"),
            LatticeSpec::default()
        );
        assert_eq!(level.collapse.coyote_ticks, DEFAULT_COYOTE_TICKS);
        assert_eq!(level.rations(), Rations::STARTER);
    }

    #[test]
    fn sections_override_defaults() {
        let level = Level::parse(
            r#"
            [lattice]
            columns = 5
            rows = 8
            spacing = 2.0
            origin = [1.0, -1.0]

            [rations]
            branch = 3

            [hazards]
            strike_interval_ticks = 10
            "#,
        )
        .expect("level parses");

        let spec = level.lattice_spec().expect("valid lattice");
        assert_eq!(spec.columns(), 5);
        assert_eq!(spec.rows(), 8);
        assert_eq!(spec.origin(), WorldPoint::new(1.0, -1.0));
        assert_eq!(level.rations(), Rations::new(3, 12, 4));
        assert_eq!(level.hazards.strike_interval_ticks, 10);
        assert_eq!(level.goal, GoalSection::default());
    }

    #[test]
    fn invalid_lattice_is_rejected() {
        let error = Level::parse("[lattice]\ncolumns = 0\n").expect_err("empty lattice");
        assert!(format!("{error:#}").contains("invalid lattice"));

        assert!(Level::parse("[lattice]\nspacing = -1.0\n").is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Level::parse("[goal]\nheight = 3.0\n").is_err());
    }
}
