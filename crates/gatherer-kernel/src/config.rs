//! Kernel configuration loading and management.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main kernel configuration, loaded from .gatherer/config.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Config version
    pub version: Option<String>,

    /// Creature the agent drives
    pub creature: CreatureConfig,

    /// Seed for arbitration draws
    pub seed: u64,

    /// Stop after this many cycles; unbounded when absent
    pub max_cycles: Option<u64>,

    /// Pause between cycles, in milliseconds
    #[serde(default = "default_cycle_delay_ms")]
    pub cycle_delay_ms: u64,

    /// Fusion distance and fuel thresholds
    pub thresholds: Thresholds,

    /// Command speeds used by the dispatcher
    pub actuation: ActuationConfig,

    /// Event log path (relative to project root)
    #[serde(default = "default_events_path")]
    pub events_path: PathBuf,
}

/// Identity of the simulated creature.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatureConfig {
    /// Id used when sending commands
    pub id: String,
    /// Name used when fetching state
    pub name: String,
    /// Sack (inventory) id
    pub bag_id: String,
}

impl Default for CreatureConfig {
    fn default() -> Self {
        Self {
            id: "Creature_1".to_string(),
            name: "Creature_1".to_string(),
            bag_id: "0".to_string(),
        }
    }
}

/// Empirically tuned fusion constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// A wall within this distance counts as ahead
    pub wall_ahead: f64,
    /// A jewel, food or delivery spot within this distance counts as ahead
    pub item_ahead: f64,
    /// Food is only pursued while fuel is below this level
    pub fuel_hungry: f64,
}

pub const WALL_AHEAD_DISTANCE: f64 = 61.0;
pub const ITEM_AHEAD_DISTANCE: f64 = 30.0;
pub const HUNGRY_FUEL_LEVEL: f64 = 400.0;

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            wall_ahead: WALL_AHEAD_DISTANCE,
            item_ahead: ITEM_AHEAD_DISTANCE,
            fuel_hungry: HUNGRY_FUEL_LEVEL,
        }
    }
}

/// Wheel speeds for the fixed motion commands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuationConfig {
    pub rotate_left: f64,
    pub rotate_right: f64,
    pub rotate_speed: f64,
    pub forward_speed: f64,
    pub navigate_speed: f64,
}

impl Default for ActuationConfig {
    fn default() -> Self {
        Self {
            rotate_left: 2.0,
            rotate_right: -2.0,
            rotate_speed: 2.0,
            forward_speed: 1.0,
            navigate_speed: 1.0,
        }
    }
}

fn default_cycle_delay_ms() -> u64 {
    0
}
fn default_events_path() -> PathBuf {
    PathBuf::from(".gatherer/events.jsonl")
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            version: None,
            creature: CreatureConfig::default(),
            seed: 0,
            max_cycles: None,
            cycle_delay_ms: default_cycle_delay_ms(),
            thresholds: Thresholds::default(),
            actuation: ActuationConfig::default(),
            events_path: default_events_path(),
        }
    }
}

impl KernelConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from project root (looks for .gatherer/config.yaml)
    pub fn load_from_project(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(".gatherer/config.yaml");
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve paths relative to project root
    pub fn resolve_paths(&mut self, project_root: &Path) {
        self.events_path = project_root.join(&self.events_path);
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        for (name, value) in [
            ("wall_ahead", t.wall_ahead),
            ("item_ahead", t.item_ahead),
            ("fuel_hungry", t.fuel_hungry),
        ] {
            if !value.is_finite() || value < 0.0 {
                anyhow::bail!("threshold {name} must be a non-negative number, got {value}");
            }
        }
        if self.creature.name.trim().is_empty() {
            anyhow::bail!("creature.name must not be empty");
        }
        Ok(())
    }

    pub fn cycle_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.cycle_delay_ms)
    }

    /// Default YAML written by `gatherer init`.
    pub fn default_yaml() -> &'static str {
        r#"# Gatherer Kernel Configuration

creature:
  id: Creature_1
  name: Creature_1
  bag_id: "0"

seed: 0
# max_cycles: 500
cycle_delay_ms: 0

thresholds:
  wall_ahead: 61.0
  item_ahead: 30.0
  fuel_hungry: 400.0

actuation:
  rotate_left: 2.0
  rotate_right: -2.0
  rotate_speed: 2.0
  forward_speed: 1.0
  navigate_speed: 1.0
"#
    }
}
