//! Command interface for the human player.
//!
//! Input and UI layers drive the player faction only through
//! [`PlayerFacade`]; they read state through the query methods on
//! [`World`]. Every command validates fully before touching anything, so
//! an `Err` always means "nothing changed".

use tracing::debug;

use crate::components::{AttackTarget, EntityId, Task};
use crate::data::{BuildingKind, UnitKind};
use crate::error::{CommandError, CommandResult};
use crate::factions::FactionId;
use crate::geometry;
use crate::math::Vec2Fixed;
use crate::production;
use crate::world::World;

/// Spread of move destinations around the clicked point, per axis.
pub const MOVE_ORDER_SPREAD: i32 = 20;

/// What an order at a world point turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderOutcome {
    /// The selection was sent to attack an enemy unit or building.
    Attack(AttackTarget),
    /// Selected workers were sent to gather from a resource node.
    Gather(EntityId),
    /// The selection was sent to walk to the point.
    Move,
}

/// Everything the player can do to the match.
pub trait PlayerFacade {
    /// Replace the selection with every player unit inside the rectangle
    /// spanned by two corners, edges included. Returns how many were picked.
    ///
    /// # Errors
    /// [`CommandError::MatchOver`] once the match has ended.
    fn select_units_in_rect(&mut self, corner_a: Vec2Fixed, corner_b: Vec2Fixed)
        -> CommandResult<usize>;

    /// Drop the selection and leave build mode.
    fn clear_selection(&mut self);

    /// Give the selection an order at a world point.
    ///
    /// Resolves, in order: an enemy building or unit under the point
    /// (attack), a tree or gold mine under the point (workers gather, the
    /// rest ignore it), or open ground (move, dropping any task).
    ///
    /// # Errors
    /// [`CommandError::EmptySelection`] with nothing selected;
    /// [`CommandError::MatchOver`] once the match has ended.
    fn issue_order(&mut self, point: Vec2Fixed) -> CommandResult<OrderOutcome>;

    /// Pick a building kind to place with the next [`Self::confirm_build`].
    ///
    /// # Errors
    /// [`CommandError::MatchOver`] once the match has ended.
    fn set_build_mode(&mut self, kind: BuildingKind) -> CommandResult;

    /// Leave build mode without placing anything.
    fn cancel_build_mode(&mut self);

    /// Place the building picked with [`Self::set_build_mode`] centred on
    /// `point`. Build mode ends on success and stays on failure.
    ///
    /// # Errors
    /// [`CommandError::NoBuildMode`], [`CommandError::InsufficientResources`],
    /// [`CommandError::OutOfBounds`], [`CommandError::PlacementBlocked`] or
    /// [`CommandError::MatchOver`].
    fn confirm_build(&mut self, point: Vec2Fixed) -> CommandResult<EntityId>;

    /// Train a unit at the first town hall (workers) or barrack (others).
    ///
    /// # Errors
    /// [`CommandError::InsufficientResources`],
    /// [`CommandError::PopulationCapReached`],
    /// [`CommandError::NoSpawnBuilding`] or [`CommandError::MatchOver`].
    fn train_unit(&mut self, kind: UnitKind) -> CommandResult<EntityId>;

    /// Throw the match away and start a new one. Always accepted.
    fn reset_match(&mut self);
}

impl World {
    fn ensure_running(&self) -> CommandResult {
        if self.is_over() {
            Err(CommandError::MatchOver)
        } else {
            Ok(())
        }
    }
}

fn log_rejection<T>(command: &'static str, result: CommandResult<T>) -> CommandResult<T> {
    if let Err(err) = &result {
        debug!(command, reason = %err, "Command rejected");
    }
    result
}

impl PlayerFacade for World {
    fn select_units_in_rect(
        &mut self,
        corner_a: Vec2Fixed,
        corner_b: Vec2Fixed,
    ) -> CommandResult<usize> {
        log_rejection("select", self.ensure_running())?;

        let min = Vec2Fixed::new(corner_a.x.min(corner_b.x), corner_a.y.min(corner_b.y));
        let max = Vec2Fixed::new(corner_a.x.max(corner_b.x), corner_a.y.max(corner_b.y));

        self.selection = self
            .player
            .units
            .values()
            .filter(|u| {
                (min.x..=max.x).contains(&u.position.x) && (min.y..=max.y).contains(&u.position.y)
            })
            .map(|u| u.id)
            .collect();
        Ok(self.selection.len())
    }

    fn clear_selection(&mut self) {
        self.selection.clear();
        self.build_mode = None;
    }

    fn issue_order(&mut self, point: Vec2Fixed) -> CommandResult<OrderOutcome> {
        log_rejection("order", self.ensure_running())?;
        self.prune_selection();
        if self.selection.is_empty() {
            return log_rejection("order", Err(CommandError::EmptySelection));
        }
        let selected = self.selection.clone();

        if let Some(target) = self.entity_at(point, FactionId::Opponent) {
            for id in selected {
                let Some(unit) = self.player.units.get(id).cloned() else {
                    continue;
                };
                let Some(destination) = self.approach_point(&unit, FactionId::Opponent, target)
                else {
                    continue;
                };
                if let Some(slot) = self.player.units.get_mut(id) {
                    slot.assign(Task::Attack(target), destination);
                }
            }
            return Ok(OrderOutcome::Attack(target));
        }

        if let Some((node, position)) = self.resource_at(point).map(|n| (n.id, n.position)) {
            for id in selected {
                if let Some(unit) = self.player.units.get_mut(id) {
                    if unit.kind.is_worker() {
                        unit.assign(Task::Gather(node), position);
                    }
                }
            }
            return Ok(OrderOutcome::Gather(node));
        }

        for id in selected {
            let destination = point + geometry::jitter(&mut self.rng, MOVE_ORDER_SPREAD);
            if let Some(unit) = self.player.units.get_mut(id) {
                unit.move_target = Some(destination);
                unit.clear_task();
            }
        }
        Ok(OrderOutcome::Move)
    }

    fn set_build_mode(&mut self, kind: BuildingKind) -> CommandResult {
        log_rejection("set_build_mode", self.ensure_running())?;
        self.build_mode = Some(kind);
        Ok(())
    }

    fn cancel_build_mode(&mut self) {
        self.build_mode = None;
    }

    fn confirm_build(&mut self, point: Vec2Fixed) -> CommandResult<EntityId> {
        log_rejection("build", self.ensure_running())?;
        let kind = log_rejection("build", self.build_mode.ok_or(CommandError::NoBuildMode))?;
        let id = log_rejection("build", production::build(self, FactionId::Player, kind, point))?;
        self.build_mode = None;
        Ok(id)
    }

    fn train_unit(&mut self, kind: UnitKind) -> CommandResult<EntityId> {
        log_rejection("train", self.ensure_running())?;
        log_rejection("train", production::train_unit(self, FactionId::Player, kind))
    }

    fn reset_match(&mut self) {
        self.reset();
    }
}
