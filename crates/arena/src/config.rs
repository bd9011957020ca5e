//! Arena configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub arena: ArenaConfig,
    #[serde(default = "SideConfig::player")]
    pub player: SideConfig,
    #[serde(default = "SideConfig::enemy")]
    pub enemy: SideConfig,
    #[serde(default)]
    pub egg: EggConfig,
    #[serde(default)]
    pub forager: ForagerConfig,
}

impl Config {
    /// Load configuration from `path`, writing the defaults there when missing.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }

    /// Speed factor applied to every actor on the current level.
    pub fn level_speed_factor(&self) -> f32 {
        let level = self.arena.level.max(1) as f32;
        self.arena.speed_multiplier * (1.0 + self.arena.level_speed_increment * (level - 1.0))
    }

    /// Speed of a chain of `length` segments.
    pub fn chain_speed(&self, side: &SideConfig, length: usize) -> f32 {
        let penalty = side.speed_per_segment * length.saturating_sub(1) as f32;
        let floor = side.base_speed * MIN_SPEED_FRACTION;
        (side.base_speed - penalty).max(floor) * self.level_speed_factor()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            player: SideConfig::player(),
            enemy: SideConfig::enemy(),
            egg: EggConfig::default(),
            forager: ForagerConfig::default(),
        }
    }
}

/// Long chains never drop below this fraction of their base speed.
pub const MIN_SPEED_FRACTION: f32 = 0.4;

/// Simulation loop and level selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArenaConfig {
    /// Milliseconds between ticks of the runner.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    /// Largest clock step applied in one tick, in seconds.
    #[serde(default = "default_max_step")]
    pub max_step: f64,
    /// RNG seed; random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Level number, used for speed scaling.
    #[serde(default = "default_level")]
    pub level: u32,
    /// Level document to load.
    #[serde(default = "default_level_path")]
    pub level_path: String,
    #[serde(default = "default_speed_multiplier")]
    pub speed_multiplier: f32,
    /// Extra speed per level above the first.
    #[serde(default = "default_level_speed_increment")]
    pub level_speed_increment: f32,
    /// Seconds before play begins.
    #[serde(default = "default_start_delay")]
    pub start_delay: f64,
    /// Stop the runner after this many ticks (0 = never).
    #[serde(default)]
    pub max_ticks: u64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            max_step: default_max_step(),
            seed: None,
            level: default_level(),
            level_path: default_level_path(),
            speed_multiplier: default_speed_multiplier(),
            level_speed_increment: default_level_speed_increment(),
            start_delay: default_start_delay(),
            max_ticks: 0,
        }
    }
}

fn default_tick_interval() -> u64 {
    16
}
fn default_max_step() -> f64 {
    crate::scheduler::DEFAULT_MAX_STEP
}
fn default_level() -> u32 {
    1
}
fn default_level_path() -> String {
    "levels/level1.json".to_string()
}
fn default_speed_multiplier() -> f32 {
    1.0
}
fn default_level_speed_increment() -> f32 {
    0.1
}
fn default_start_delay() -> f64 {
    2.0
}

/// Settings shared by the chains of one side.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SideConfig {
    /// Cells per second of a single-segment chain.
    #[serde(default = "default_base_speed")]
    pub base_speed: f32,
    /// Speed lost per extra segment.
    #[serde(default = "default_speed_per_segment")]
    pub speed_per_segment: f32,
    #[serde(default = "default_initial_length")]
    pub initial_length: usize,
    /// Chains spawned at level start (ignored for the player).
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default)]
    pub lays_eggs: bool,
    #[serde(default = "default_head_size")]
    pub head_size: f32,
    #[serde(default = "default_segment_size")]
    pub segment_size: f32,
}

impl SideConfig {
    pub fn player() -> Self {
        Self {
            base_speed: 4.0,
            count: 1,
            lays_eggs: false,
            ..Self::default()
        }
    }

    pub fn enemy() -> Self {
        Self {
            base_speed: default_base_speed(),
            count: default_count(),
            lays_eggs: true,
            ..Self::default()
        }
    }
}

impl Default for SideConfig {
    fn default() -> Self {
        Self {
            base_speed: default_base_speed(),
            speed_per_segment: default_speed_per_segment(),
            initial_length: default_initial_length(),
            count: default_count(),
            lays_eggs: false,
            head_size: default_head_size(),
            segment_size: default_segment_size(),
        }
    }
}

fn default_base_speed() -> f32 {
    3.0
}
fn default_speed_per_segment() -> f32 {
    0.05
}
fn default_initial_length() -> usize {
    3
}
fn default_count() -> usize {
    2
}
fn default_head_size() -> f32 {
    0.8
}
fn default_segment_size() -> f32 {
    0.6
}

/// Egg laying, growth and hatching.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EggConfig {
    #[serde(default = "default_laying_initial_delay")]
    pub laying_initial_delay: f64,
    /// Seconds between an egg finishing and the next one being laid.
    #[serde(default = "default_laying_delay")]
    pub laying_delay: f64,
    /// Seconds before trying again when a chain could not lay.
    #[serde(default = "default_laying_retry_delay")]
    pub laying_retry_delay: f64,
    #[serde(default = "default_growth_duration")]
    pub growth_duration: f64,
    #[serde(default = "default_hatch_duration")]
    pub hatch_duration: f64,
    /// Chains shorter than this do not lay.
    #[serde(default = "default_min_chain_length")]
    pub min_chain_length: usize,
    /// Length of a freshly hatched chain.
    #[serde(default = "default_hatch_length")]
    pub hatch_length: usize,
    #[serde(default = "default_egg_size")]
    pub size: f32,
}

impl Default for EggConfig {
    fn default() -> Self {
        Self {
            laying_initial_delay: default_laying_initial_delay(),
            laying_delay: default_laying_delay(),
            laying_retry_delay: default_laying_retry_delay(),
            growth_duration: default_growth_duration(),
            hatch_duration: default_hatch_duration(),
            min_chain_length: default_min_chain_length(),
            hatch_length: default_hatch_length(),
            size: default_egg_size(),
        }
    }
}

fn default_laying_initial_delay() -> f64 {
    5.0
}
fn default_laying_delay() -> f64 {
    8.0
}
fn default_laying_retry_delay() -> f64 {
    1.0
}
fn default_growth_duration() -> f64 {
    2.0
}
fn default_hatch_duration() -> f64 {
    3.0
}
fn default_min_chain_length() -> usize {
    3
}
fn default_hatch_length() -> usize {
    2
}
fn default_egg_size() -> f32 {
    0.5
}

/// The hopping forager.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForagerConfig {
    #[serde(default = "default_forager_count")]
    pub count: usize,
    #[serde(default = "default_respawn_delay")]
    pub respawn_delay: f64,
    /// Cells per second while hopping.
    #[serde(default = "default_jump_speed")]
    pub jump_speed: f32,
    /// Rest between hops, in seconds.
    #[serde(default = "default_jump_delay")]
    pub jump_delay: f32,
    /// Extra cells of a long jump.
    #[serde(default = "default_jump_distance")]
    pub jump_distance: i32,
    /// Distance in cells at which a snake head counts as a threat.
    #[serde(default = "default_threat_distance")]
    pub threat_distance: f32,
    #[serde(default = "default_forager_size")]
    pub size: f32,
}

impl Default for ForagerConfig {
    fn default() -> Self {
        Self {
            count: default_forager_count(),
            respawn_delay: default_respawn_delay(),
            jump_speed: default_jump_speed(),
            jump_delay: default_jump_delay(),
            jump_distance: default_jump_distance(),
            threat_distance: default_threat_distance(),
            size: default_forager_size(),
        }
    }
}

fn default_forager_count() -> usize {
    1
}
fn default_respawn_delay() -> f64 {
    6.0
}
fn default_jump_speed() -> f32 {
    5.0
}
fn default_jump_delay() -> f32 {
    0.6
}
fn default_jump_distance() -> i32 {
    2
}
fn default_threat_distance() -> f32 {
    3.0
}
fn default_forager_size() -> f32 {
    0.6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [arena]
            seed = 7
            level = 3

            [enemy]
            count = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.arena.seed, Some(7));
        assert_eq!(config.arena.tick_interval_ms, 16);
        assert_eq!(config.enemy.count, 4);
        assert_eq!(config.enemy.initial_length, 3);
        assert!(!config.enemy.lays_eggs);
        assert!(config.player.base_speed > 0.0);
        assert_eq!(config.egg.growth_duration, 2.0);
    }

    #[test]
    fn test_round_trip_defaults() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.forager.jump_distance, 2);
        assert_eq!(parsed.arena.level_path, "levels/level1.json");
    }

    #[test]
    fn test_chain_speed() {
        let mut config = Config::default();
        config.arena.level = 3;
        config.arena.level_speed_increment = 0.5;
        let side = SideConfig {
            base_speed: 2.0,
            speed_per_segment: 0.25,
            ..SideConfig::default()
        };
        // (2.0 - 0.5) * (1 + 0.5 * 2)
        assert!((config.chain_speed(&side, 3) - 3.0).abs() < 1e-6);
        // Floor at 40% of base.
        assert!((config.chain_speed(&side, 50) - 1.6).abs() < 1e-6);
    }
}
