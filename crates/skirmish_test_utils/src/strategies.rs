//! Proptest strategies.
//!
//! These generate random but reproducible inputs for property-based tests
//! of the simulation: points, frame times, kinds, and whole player
//! command scripts.

use proptest::prelude::*;
use skirmish_core::components::ResourceKind;
use skirmish_core::data::{BuildingKind, UnitKind};
use skirmish_core::error::CommandResult;
use skirmish_core::math::{Fixed, Vec2Fixed};
use skirmish_core::player_facade::PlayerFacade;
use skirmish_core::world::World;

/// Generate a point on the default 4000×4000 map.
pub fn arb_world_point() -> impl Strategy<Value = Vec2Fixed> {
    (0i32..4000, 0i32..4000).prop_map(|(x, y)| Vec2Fixed::from_ints(x, y))
}

/// Generate a point within `radius` of `center` on each axis.
pub fn arb_point_near(center: Vec2Fixed, radius: i32) -> impl Strategy<Value = Vec2Fixed> {
    (-radius..=radius, -radius..=radius)
        .prop_map(move |(dx, dy)| center + Vec2Fixed::from_ints(dx, dy))
}

/// Generate a host frame time, from a fast 1 ms frame to a long stall.
pub fn arb_delta_ms() -> impl Strategy<Value = u32> {
    prop_oneof![
        4 => 10u32..40,
        1 => 1u32..10,
        1 => 40u32..250,
    ]
}

/// Generate a world seed.
pub fn arb_seed() -> impl Strategy<Value = u64> {
    any::<u64>()
}

/// Generate a unit kind.
pub fn arb_unit_kind() -> impl Strategy<Value = UnitKind> {
    prop_oneof![
        Just(UnitKind::Worker),
        Just(UnitKind::Warrior),
        Just(UnitKind::Archer),
    ]
}

/// Generate a building kind.
pub fn arb_building_kind() -> impl Strategy<Value = BuildingKind> {
    prop_oneof![
        Just(BuildingKind::TownHall),
        Just(BuildingKind::House),
        Just(BuildingKind::Barrack),
    ]
}

/// Generate a resource node kind.
pub fn arb_resource_kind() -> impl Strategy<Value = ResourceKind> {
    prop_oneof![Just(ResourceKind::Tree), Just(ResourceKind::GoldMine)]
}

/// Generate a node stock, including nearly empty ones.
pub fn arb_node_stock() -> impl Strategy<Value = i32> {
    prop_oneof![1i32..12, 100i32..2000]
}

/// Generate a unit radius in the range the stat tables use.
pub fn arb_unit_size() -> impl Strategy<Value = Fixed> {
    (6i32..=12).prop_map(Fixed::from_num)
}

/// One thing the player can do between frames.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerAction {
    /// Let `delta_ms` pass.
    Wait(u32),
    /// Drag-select between two corners.
    Select(Vec2Fixed, Vec2Fixed),
    /// Click with the selection.
    Order(Vec2Fixed),
    /// Place a building.
    Build(BuildingKind, Vec2Fixed),
    /// Queue a unit.
    Train(UnitKind),
    /// Escape.
    ClearSelection,
}

impl PlayerAction {
    /// Apply the action to a world. `Wait` always succeeds.
    pub fn apply(&self, world: &mut World) -> CommandResult {
        match *self {
            Self::Wait(delta_ms) => {
                world.tick(delta_ms);
                Ok(())
            }
            Self::Select(a, b) => world.select_units_in_rect(a, b).map(drop),
            Self::Order(point) => world.issue_order(point).map(drop),
            Self::Build(kind, point) => {
                world.set_build_mode(kind)?;
                let result = world.confirm_build(point).map(drop);
                world.cancel_build_mode();
                result
            }
            Self::Train(kind) => world.train_unit(kind).map(drop),
            Self::ClearSelection => {
                world.clear_selection();
                Ok(())
            }
        }
    }
}

/// Generate a single player action.
pub fn arb_player_action() -> impl Strategy<Value = PlayerAction> {
    prop_oneof![
        4 => arb_delta_ms().prop_map(PlayerAction::Wait),
        2 => (arb_world_point(), arb_world_point()).prop_map(|(a, b)| PlayerAction::Select(a, b)),
        2 => arb_world_point().prop_map(PlayerAction::Order),
        1 => (arb_building_kind(), arb_world_point()).prop_map(|(k, p)| PlayerAction::Build(k, p)),
        1 => arb_unit_kind().prop_map(PlayerAction::Train),
        1 => Just(PlayerAction::ClearSelection),
    ]
}

/// Generate a script of player actions.
pub fn arb_player_script(max_len: usize) -> impl Strategy<Value = Vec<PlayerAction>> {
    proptest::collection::vec(arb_player_action(), 0..max_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::seeded_match;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn test_scripts_replay_identically(seed in 0u64..1000, script in arb_player_script(40)) {
            let mut first = seeded_match(seed);
            let mut second = seeded_match(seed);
            for action in &script {
                let a = action.apply(&mut first);
                let b = action.apply(&mut second);
                prop_assert_eq!(a, b);
            }
            prop_assert_eq!(first.state_hash(), second.state_hash());
        }

        #[test]
        fn test_points_near_stay_in_box(p in arb_point_near(Vec2Fixed::from_ints(100, 100), 20)) {
            prop_assert!(p.x >= Fixed::from_num(80) && p.x <= Fixed::from_num(120));
            prop_assert!(p.y >= Fixed::from_num(80) && p.y <= Fixed::from_num(120));
        }
    }
}
