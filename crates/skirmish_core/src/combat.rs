//! Attack task execution.
//!
//! Damage is flat: a hit subtracts the attacker's `attack` from the
//! target's health, with no armor or damage types. A unit hits at most once
//! per `1000 / attack_speed` milliseconds of simulation time.

use tracing::debug;

use crate::components::{AttackTarget, Unit};
use crate::factions::FactionId;
use crate::geometry;
use crate::simulation::TickEvents;
use crate::world::World;

/// Run one tick of an attack task for `unit`, owned by `acting`.
///
/// The target is looked up in the opposing faction. Gone means the task is
/// dropped. Within `attack_range + target extent` the unit halts and hits
/// if off cooldown; a lethal hit removes the target and leaves the attacker
/// idle. Out of range, the unit is sent to a free spot on the ring around
/// the target.
pub(crate) fn execute_attack(
    world: &mut World,
    acting: FactionId,
    unit: &mut Unit,
    target: AttackTarget,
    events: &mut TickEvents,
) {
    let enemy = acting.opponent();
    let Some((center, extent)) = world.faction(enemy).locate(target) else {
        unit.clear_task();
        return;
    };

    if geometry::distance(unit.position, center) > unit.attack_range() + extent {
        unit.move_target = world.approach_point(unit, enemy, target);
        return;
    }

    unit.halt();
    let now = world.clock_ms();
    if !unit.cooldown_elapsed(now, unit.attack_cooldown_ms()) {
        return;
    }

    unit.last_attack_ms = Some(now);
    if let Some(casualty) = world.faction_mut(enemy).apply_damage(target, unit.attack) {
        debug!(
            attacker = unit.id,
            target = target.id(),
            faction = ?casualty.faction,
            "Target destroyed"
        );
        events.casualties.push(casualty);
        unit.clear_task();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Task;
    use crate::config::SimConfig;
    use crate::data::{BuildingKind, UnitKind};
    use crate::math::{Fixed, Vec2Fixed};
    use crate::production::{construct_building, spawn_unit};

    fn duel(attacker_kind: UnitKind, gap: i32) -> (World, Unit, AttackTarget) {
        let mut world = World::empty(SimConfig::default());
        let victim = spawn_unit(
            &mut world,
            FactionId::Opponent,
            UnitKind::Warrior,
            Vec2Fixed::from_ints(1000 + gap, 1000),
        );
        let mut unit = Unit::new(500, attacker_kind, Vec2Fixed::from_ints(1000, 1000));
        let target = AttackTarget::Unit(victim);
        unit.task = Some(Task::Attack(target));
        (world, unit, target)
    }

    fn victim_health(world: &World, target: AttackTarget) -> Option<u32> {
        world
            .unit(FactionId::Opponent, target.id())
            .map(|u| u.health.current)
    }

    #[test]
    fn test_in_range_hit_halts_and_damages() {
        // Warrior reach: range 15 + victim size 10.
        let (mut world, mut unit, target) = duel(UnitKind::Warrior, 25);
        unit.move_target = Some(Vec2Fixed::from_ints(2000, 2000));
        let mut events = TickEvents::default();

        execute_attack(&mut world, FactionId::Player, &mut unit, target, &mut events);
        assert_eq!(victim_health(&world, target), Some(85));
        assert_eq!(unit.move_target, Some(unit.position));
        assert_eq!(unit.last_attack_ms, Some(0));
    }

    #[test]
    fn test_out_of_range_moves_to_ring() {
        let (mut world, mut unit, target) = duel(UnitKind::Warrior, 26);
        let mut events = TickEvents::default();

        execute_attack(&mut world, FactionId::Player, &mut unit, target, &mut events);
        assert_eq!(victim_health(&world, target), Some(100));
        // Ring radius: victim size 10 + range 15 + 10, first sample at angle 0.
        assert_eq!(unit.move_target, Some(Vec2Fixed::from_ints(1061, 1000)));
    }

    #[test]
    fn test_archers_reach_one_hundred_regardless_of_range() {
        let (mut world, mut unit, target) = duel(UnitKind::Archer, 110);
        unit.range = Fixed::from_num(1);
        let mut events = TickEvents::default();

        execute_attack(&mut world, FactionId::Player, &mut unit, target, &mut events);
        assert_eq!(victim_health(&world, target), Some(90));
    }

    #[test]
    fn test_cooldown_blocks_second_hit() {
        let (mut world, mut unit, target) = duel(UnitKind::Warrior, 20);
        let mut events = TickEvents::default();

        execute_attack(&mut world, FactionId::Player, &mut unit, target, &mut events);
        world.clock_ms = 1000;
        execute_attack(&mut world, FactionId::Player, &mut unit, target, &mut events);
        assert_eq!(victim_health(&world, target), Some(85));

        world.clock_ms = 1001;
        execute_attack(&mut world, FactionId::Player, &mut unit, target, &mut events);
        assert_eq!(victim_health(&world, target), Some(70));
    }

    #[test]
    fn test_lethal_hit_removes_target_and_idles_attacker() {
        let (mut world, mut unit, target) = duel(UnitKind::Warrior, 20);
        world
            .unit_mut(FactionId::Opponent, target.id())
            .expect("victim")
            .health
            .current = 10;
        let mut events = TickEvents::default();

        execute_attack(&mut world, FactionId::Player, &mut unit, target, &mut events);
        assert!(world.unit(FactionId::Opponent, target.id()).is_none());
        assert_eq!(world.faction(FactionId::Opponent).population, 0);
        assert!(unit.is_idle());
        assert_eq!(events.units_killed().count(), 1);
    }

    #[test]
    fn test_stale_target_clears_task() {
        let (mut world, mut unit, target) = duel(UnitKind::Warrior, 20);
        world.faction_mut(FactionId::Opponent).remove_unit(target.id());
        let mut events = TickEvents::default();

        execute_attack(&mut world, FactionId::Player, &mut unit, target, &mut events);
        assert!(unit.is_idle());
        assert!(events.is_empty());
    }

    #[test]
    fn test_destroying_a_house_lowers_population_limit() {
        let mut world = World::empty(SimConfig::default());
        let house = construct_building(
            &mut world,
            FactionId::Opponent,
            BuildingKind::House,
            Vec2Fixed::from_ints(1030, 1000),
        );
        assert_eq!(world.faction(FactionId::Opponent).population_limit, 20);
        world
            .faction_mut(FactionId::Opponent)
            .buildings
            .get_mut(house)
            .expect("house")
            .health
            .current = 5;

        let target = AttackTarget::Building(house);
        let mut unit = Unit::new(500, UnitKind::Warrior, Vec2Fixed::from_ints(1000, 1000));
        unit.task = Some(Task::Attack(target));
        let mut events = TickEvents::default();

        execute_attack(&mut world, FactionId::Player, &mut unit, target, &mut events);
        assert_eq!(world.faction(FactionId::Opponent).population_limit, 15);
        assert_eq!(events.buildings_destroyed().count(), 1);
    }
}
