//! Match configuration.
//!
//! Loaded from RON. Every field has a default, so a config file only needs
//! the values it changes:
//!
//! ```ron
//! (
//!     seed: 7,
//!     tree_count: 50,
//!     hold_step_on_contact: false,
//! )
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::{fixed_decimal_serde, Fixed};

/// Tunables for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the match RNG.
    pub seed: u64,
    /// Map width in world units.
    pub world_width: i32,
    /// Map height in world units.
    pub world_height: i32,
    /// Trees placed at generation.
    pub tree_count: u32,
    /// Gold mines placed at generation.
    pub gold_mine_count: u32,
    /// Starting gold per faction.
    pub starting_gold: i32,
    /// Starting wood per faction.
    pub starting_wood: i32,
    /// Starting food per faction.
    pub starting_food: i32,
    /// Population limit before any house.
    pub starting_population_limit: i32,
    /// Share of an overlap each unit is pushed back per contact.
    #[serde(with = "fixed_decimal_serde")]
    pub push_factor: Fixed,
    /// Discard a unit's whole step for the tick when it touches anyone.
    pub hold_step_on_contact: bool,
    /// Let idle player units strike back at their attackers, as the
    /// opponent's units always do.
    pub player_auto_retaliate: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            world_width: 4000,
            world_height: 4000,
            tree_count: 200,
            gold_mine_count: 20,
            starting_gold: 500,
            starting_wood: 300,
            starting_food: 400,
            starting_population_limit: 15,
            push_factor: Fixed::from_bits(0x4CCC_CCCD),
            hold_step_on_contact: true,
            player_auto_retaliate: false,
        }
    }
}

impl SimConfig {
    /// Load and validate a config from a RON file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GameError::ConfigNotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Parse and validate a config from RON text.
    pub fn from_ron_str(content: &str) -> Result<Self> {
        let config: Self = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        // Both town halls and houses must fit: the opponent's house sits at
        // 3W/4 + 100 with a half-width of 20.
        if self.world_width < 480 {
            return Err(invalid("world_width", format!("{} is below 480", self.world_width)));
        }
        if self.world_height < 160 {
            return Err(invalid(
                "world_height",
                format!("{} is below 160", self.world_height),
            ));
        }
        if self.starting_population_limit < 0 {
            return Err(invalid(
                "starting_population_limit",
                "must not be negative".to_string(),
            ));
        }
        if self.push_factor < Fixed::ZERO || self.push_factor > Fixed::ONE {
            return Err(invalid(
                "push_factor",
                format!("{} is outside 0..=1", self.push_factor),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, message: String) -> GameError {
    GameError::InvalidConfig { field, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_push_factor_is_three_tenths() {
        let push = SimConfig::default().push_factor;
        assert!((push - Fixed::from_num(0.3)).abs() < Fixed::from_num(0.000_001));
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config = SimConfig::from_ron_str("(seed: 7, tree_count: 50, push_factor: 0.5)")
            .expect("valid config");
        assert_eq!(config.seed, 7);
        assert_eq!(config.tree_count, 50);
        assert_eq!(config.push_factor, Fixed::from_num(0.5));
        assert_eq!(config.gold_mine_count, 20);
        assert!(config.hold_step_on_contact);
    }

    #[test]
    fn test_rejects_tiny_map() {
        let err = SimConfig::from_ron_str("(world_width: 100)").unwrap_err();
        assert!(matches!(
            err,
            GameError::InvalidConfig {
                field: "world_width",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_push_factor_above_one() {
        let err = SimConfig::from_ron_str("(push_factor: 1.5)").unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig { field: "push_factor", .. }));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = SimConfig::from_ron_str("(seed: \"seven\")").unwrap_err();
        assert!(matches!(err, GameError::ConfigParse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = SimConfig::load(Path::new("/nonexistent/skirmish.ron")).unwrap_err();
        assert!(matches!(err, GameError::ConfigNotFound(_)));
    }
}
