//! Scenario tests on hand-built worlds.
//!
//! Fixtures come from `skirmish_test_utils`; the opponent AI is switched
//! off (`tick_with_controllers(_, &[])`) unless a test is about it.

use skirmish_core::prelude::*;
use skirmish_test_utils::fixtures::{
    arena, crowded_target, duel, hall_siege, harvest, pos, seeded_match,
};

const FRAME: u32 = 16;

fn step(world: &mut World) -> TickEvents {
    world.tick_with_controllers(FRAME, &[])
}

#[test]
fn lethal_hit_removes_victim_in_the_same_tick() {
    let (mut world, duel) = duel(UnitKind::Warrior, UnitKind::Worker, 18);
    world
        .unit_mut(FactionId::Opponent, duel.victim)
        .expect("victim")
        .health
        .current = 15;

    let events = step(&mut world);

    assert!(world.unit(FactionId::Opponent, duel.victim).is_none());
    assert_eq!(world.faction(FactionId::Opponent).population, 0);
    assert_eq!(
        events.units_killed().collect::<Vec<_>>(),
        vec![(FactionId::Opponent, duel.victim)]
    );
    let attacker = world.unit(FactionId::Player, duel.attacker).expect("attacker");
    assert!(attacker.is_idle());
}

#[test]
fn second_attacker_on_a_dead_target_goes_idle() {
    let (mut world, duel) = duel(UnitKind::Warrior, UnitKind::Worker, 18);
    world
        .unit_mut(FactionId::Opponent, duel.victim)
        .expect("victim")
        .health
        .current = 10;
    // Mirror image of the first attacker on the victim's other side.
    let second = skirmish_core::production::spawn_unit(
        &mut world,
        FactionId::Player,
        UnitKind::Warrior,
        pos(1036, 1000),
    );
    world.unit_mut(FactionId::Player, second).expect("second").task = Some(Task::Attack(duel.target()));

    let events = step(&mut world);

    assert!(world.unit(FactionId::Opponent, duel.victim).is_none());
    assert_eq!(world.faction(FactionId::Opponent).population, 0);
    assert_eq!(
        events.units_killed().collect::<Vec<_>>(),
        vec![(FactionId::Opponent, duel.victim)]
    );
    for id in [duel.attacker, second] {
        let unit = world.unit(FactionId::Player, id).expect("attacker");
        assert!(unit.task.is_none(), "unit {id} kept its task");
        assert!(unit.is_idle());
    }
}

#[test]
fn oversized_delta_saturates_instead_of_panicking() {
    let mut world = arena();
    let worker = skirmish_core::production::spawn_unit(
        &mut world,
        FactionId::Player,
        UnitKind::Worker,
        pos(1000, 1000),
    );
    world.unit_mut(FactionId::Player, worker).expect("worker").move_target = Some(pos(3000, 2500));

    world.tick_with_controllers(u32::MAX, &[]);

    let unit = world.unit(FactionId::Player, worker).expect("worker");
    assert!(unit.position.distance(pos(3000, 2500)) <= Fixed::ONE, "{:?}", unit.position);
    assert_eq!(world.clock_ms(), u64::from(u32::MAX));
    assert!(!world.is_over());
}

#[test]
fn idle_opponent_strikes_back() {
    let (mut world, duel) = duel(UnitKind::Warrior, UnitKind::Warrior, 300);
    step(&mut world);

    let victim = world.unit(FactionId::Opponent, duel.victim).expect("victim");
    assert_eq!(victim.task, Some(Task::Attack(AttackTarget::Unit(duel.attacker))));
    assert!(victim.move_target.is_some());
}

#[test]
fn idle_player_unit_does_not_strike_back_by_default() {
    let mut world = arena();
    let defender = skirmish_core::production::spawn_unit(
        &mut world,
        FactionId::Player,
        UnitKind::Warrior,
        pos(1500, 1500),
    );
    let raider = skirmish_core::production::spawn_unit(
        &mut world,
        FactionId::Opponent,
        UnitKind::Warrior,
        pos(1800, 1500),
    );
    world.unit_mut(FactionId::Opponent, raider).expect("raider").task =
        Some(Task::Attack(AttackTarget::Unit(defender)));

    for _ in 0..5 {
        step(&mut world);
    }
    assert!(world.unit(FactionId::Player, defender).expect("defender").is_idle());
}

#[test]
fn full_ring_falls_back_next_to_target() {
    let (mut world, crowd) = crowded_target();
    let picked = world
        .select_units_in_rect(pos(450, 450), pos(550, 550))
        .expect("match running");
    assert_eq!(picked, 1);

    let outcome = world.issue_order(pos(2003, 1998)).expect("order accepted");
    assert_eq!(outcome, OrderOutcome::Attack(AttackTarget::Unit(crowd.target)));

    let newcomer = world.unit(FactionId::Player, crowd.newcomer).expect("newcomer");
    let destination = newcomer.move_target.expect("destination");
    let ten = Fixed::from_num(10);
    assert!((destination.x - Fixed::from_num(2000)).abs() <= ten, "{destination:?}");
    assert!((destination.y - Fixed::from_num(2000)).abs() <= ten, "{destination:?}");
    assert_eq!(crowd.blockers.len(), 8);
}

#[test]
fn last_gather_removes_node_and_idles_worker() {
    let (mut world, job) = harvest(ResourceKind::GoldMine, 5);
    let gold_before = world.faction(FactionId::Player).stockpile.gold;

    let events = step(&mut world);

    assert_eq!(events.nodes_depleted, vec![job.node]);
    assert!(world.terrain().get(job.node).is_none());
    assert_eq!(world.faction(FactionId::Player).stockpile.gold, gold_before + 5);
    assert!(world.unit(FactionId::Player, job.worker).expect("worker").is_idle());
}

#[test]
fn short_node_still_pays_a_full_load() {
    let (mut world, job) = harvest(ResourceKind::Tree, 3);
    let wood_before = world.faction(FactionId::Player).stockpile.wood;

    step(&mut world);

    assert!(world.terrain().get(job.node).is_none());
    assert_eq!(world.faction(FactionId::Player).stockpile.wood, wood_before + 5);
}

#[test]
fn gold_mine_with_four_left_overdraws_and_disappears() {
    let (mut world, job) = harvest(ResourceKind::GoldMine, 4);
    let gold_before = world.faction(FactionId::Player).stockpile.gold;

    let events = step(&mut world);

    assert_eq!(events.nodes_depleted, vec![job.node]);
    assert!(world.terrain().get(job.node).is_none());
    assert_eq!(world.faction(FactionId::Player).stockpile.gold, gold_before + 5);
    assert!(world.unit(FactionId::Player, job.worker).expect("worker").is_idle());
}

#[test]
fn gathering_waits_out_the_cooldown() {
    let (mut world, job) = harvest(ResourceKind::GoldMine, 1000);
    let gold_before = world.faction(FactionId::Player).stockpile.gold;

    // Gathers at 16 ms and then first at 1024 ms (> 1000 ms later).
    for _ in 0..63 {
        step(&mut world);
    }
    assert_eq!(world.faction(FactionId::Player).stockpile.gold, gold_before + 5);
    step(&mut world);
    assert_eq!(world.faction(FactionId::Player).stockpile.gold, gold_before + 10);
    assert_eq!(world.terrain().get(job.node).map(|n| n.resources), Some(990));
}

#[test]
fn razing_the_last_hall_locks_the_match() {
    let (mut world, siege) = hall_siege(10);

    let events = step(&mut world);
    assert_eq!(events.game_over.map(|o| o.winner), Some(FactionId::Player));
    assert_eq!(
        events.buildings_destroyed().collect::<Vec<_>>(),
        vec![(FactionId::Opponent, siege.victim)]
    );

    let hash = world.state_hash();
    let clock = world.clock_ms();
    for _ in 0..20 {
        assert!(world.tick(FRAME).is_empty());
    }
    assert_eq!(world.state_hash(), hash);
    assert_eq!(world.clock_ms(), clock);

    assert_eq!(world.train_unit(UnitKind::Worker), Err(CommandError::MatchOver));
    assert_eq!(
        world.select_units_in_rect(pos(0, 0), pos(4000, 4000)),
        Err(CommandError::MatchOver)
    );

    world.reset_match();
    assert!(world.outcome().is_none());
    assert_eq!(world.faction(FactionId::Player).units.len(), 8);
    assert_eq!(world.faction(FactionId::Opponent).buildings.len(), 2);
}

#[test]
fn player_builds_barrack_then_trains_archer() {
    let mut world = arena();
    world.set_build_mode(BuildingKind::Barrack).expect("running");
    world.confirm_build(pos(1000, 1000)).expect("site is free");

    let archer = world.train_unit(UnitKind::Archer).expect("affordable");
    let unit = world.unit(FactionId::Player, archer).expect("archer");
    assert!((unit.position.x - Fixed::from_num(1000)).abs() <= Fixed::from_num(30));

    let stockpile = world.faction(FactionId::Player).stockpile;
    // 500/300 minus barrack 200/150 minus archer 75/50.
    assert_eq!((stockpile.gold, stockpile.wood), (225, 100));
    assert_eq!(world.faction(FactionId::Player).population, 1);
}

#[test]
fn default_match_keeps_its_books_straight() {
    let mut world = seeded_match(2024);
    for _ in 0..1500 {
        world.tick_with_controllers(FRAME, &FactionId::ALL);
        for id in FactionId::ALL {
            let faction = world.faction(id);
            assert_eq!(faction.population as usize, faction.units.len());
            let houses = faction.count_buildings(BuildingKind::House) as i32;
            assert_eq!(
                faction.population_limit,
                world.config().starting_population_limit + 5 * houses
            );
            assert!(faction.stockpile.gold >= 0);
            assert!(faction.stockpile.wood >= 0);
        }
        if world.is_over() {
            break;
        }
    }
}
