//! The per-unit simulation step.
//!
//! [`unit_step_system`] walks one faction's units in id order. Each unit, in
//! turn:
//!
//! 1. retaliates against an attacker if it is idle (opponent units always,
//!    player units only when configured),
//! 2. steps towards its movement target, unless the proposed position
//!    overlaps another unit, in which case both are pushed apart,
//! 3. runs its task: attack ([`crate::combat`]) or gather
//!    ([`crate::economy`]).
//!
//! The unit is taken out of storage by value for its turn and written back
//! afterwards, so it can be mutated alongside the rest of the world.

use crate::combat;
use crate::components::{AttackTarget, EntityId, Task, Unit};
use crate::economy;
use crate::factions::FactionId;
use crate::math::{Fixed, Vec2Fixed};
use crate::simulation::TickEvents;
use crate::world::World;

/// A unit this close to its movement target has arrived.
pub const ARRIVAL_RADIUS: i32 = 5;

/// Frame length that unit speeds are expressed against.
pub const BASE_FRAME_MS: i32 = 16;

/// Advance every unit of `acting` by `delta_ms`.
pub fn unit_step_system(world: &mut World, acting: FactionId, delta_ms: u32, events: &mut TickEvents) {
    let retaliates = acting == FactionId::Opponent || world.config.player_auto_retaliate;
    let roster = world.unit_roster();

    for id in world.faction(acting).units.ids() {
        let Some(mut unit) = world.unit(acting, id).cloned() else {
            continue;
        };

        if retaliates && unit.is_idle() {
            if let Some(aggressor) = find_aggressor(world, acting.opponent(), id) {
                unit.task = Some(Task::Attack(AttackTarget::Unit(aggressor)));
            }
        }

        step_towards_target(world, &mut unit, delta_ms, &roster);

        match unit.task {
            Some(Task::Attack(target)) => {
                combat::execute_attack(world, acting, &mut unit, target, events);
            }
            Some(Task::Gather(node)) => {
                economy::execute_gather(world, acting, &mut unit, node, events);
            }
            None => {}
        }

        if let Some(slot) = world.unit_mut(acting, id) {
            *slot = unit;
        }
    }
}

/// First unit of `enemy` whose attack task targets `victim`.
fn find_aggressor(world: &World, enemy: FactionId, victim: EntityId) -> Option<EntityId> {
    let wanted = Some(Task::Attack(AttackTarget::Unit(victim)));
    world
        .faction(enemy)
        .units
        .values()
        .find(|u| u.task == wanted)
        .map(|u| u.id)
}

/// Locomotion and collision for one unit.
///
/// The step is `speed * delta_ms / 16`, capped at the remaining distance.
/// Within [`ARRIVAL_RADIUS`] the unit stops and its target is cleared.
fn step_towards_target(
    world: &mut World,
    unit: &mut Unit,
    delta_ms: u32,
    roster: &[(FactionId, EntityId)],
) {
    let Some(target) = unit.move_target else {
        return;
    };

    let to_target = target - unit.position;
    let distance = to_target.length();
    let arrived = distance <= Fixed::from_num(ARRIVAL_RADIUS);

    let step = if arrived {
        Vec2Fixed::ZERO
    } else {
        let step_len = unit
            .speed
            .saturating_mul(Fixed::saturating_from_num(delta_ms))
            / Fixed::from_num(BASE_FRAME_MS);
        to_target.normalize().scale(step_len.min(distance))
    };

    let push_factor = world.config.push_factor;
    let collided = resolve_collisions(world, unit, step, push_factor, roster);

    if arrived {
        unit.move_target = None;
    } else if !(collided && world.config.hold_step_on_contact) {
        unit.position += step;
    }
}

/// Push `unit` and every unit overlapping its proposed position apart.
///
/// Each overlap moves both units by `push_factor * overlap` along the line
/// between them, in opposite directions. Units at the same point separate
/// along +x. Returns whether any overlap was found.
pub(crate) fn resolve_collisions(
    world: &mut World,
    unit: &mut Unit,
    step: Vec2Fixed,
    push_factor: Fixed,
    roster: &[(FactionId, EntityId)],
) -> bool {
    let mut collided = false;

    for &(faction, other_id) in roster {
        if other_id == unit.id {
            continue;
        }
        let Some(other) = world.unit_mut(faction, other_id) else {
            continue;
        };

        let proposed = unit.position + step;
        let offset = other.position - proposed;
        let distance = offset.length();
        let contact = unit.size + other.size;
        if distance >= contact {
            continue;
        }

        collided = true;
        let normal = if distance == Fixed::ZERO {
            Vec2Fixed::new(Fixed::ONE, Fixed::ZERO)
        } else {
            offset.normalize()
        };
        let push = normal.scale((contact - distance).saturating_mul(push_factor));
        unit.position -= push;
        other.position += push;
    }

    collided
}
