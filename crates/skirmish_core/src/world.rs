//! The simulation state container.
//!
//! A [`World`] owns both factions, the terrain, the seeded RNG and the
//! simulation clock. Rendering and input never live inside it: they read
//! through the query methods here and write through
//! [`crate::player_facade::PlayerFacade`].

use std::collections::btree_map::{self, BTreeMap};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::components::{AttackTarget, Building, EntityId, ResourceKind, ResourceNode, Unit};
use crate::config::SimConfig;
use crate::data::BuildingKind;
use crate::economy::Stockpile;
use crate::factions::{Faction, FactionId};
use crate::geometry::{self, Occupant};
use crate::map_generation::{generate_terrain, Terrain, TerrainConfig};
use crate::math::{Fixed, Vec2Fixed};
use crate::production;
use crate::simulation::MatchOutcome;

/// Ordered storage for one kind of entity.
///
/// Keyed by [`EntityId`]. Ids are handed out in increasing order, so
/// iteration order is creation order and stays stable within a tick.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityStorage<T> {
    entities: BTreeMap<EntityId, T>,
}

impl<T> Default for EntityStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EntityStorage<T> {
    /// Create empty entity storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
        }
    }

    /// Insert an entity under its id, returning any entity it replaced.
    pub fn insert(&mut self, id: EntityId, entity: T) -> Option<T> {
        self.entities.insert(id, entity)
    }

    /// Remove an entity by ID.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        self.entities.remove(&id)
    }

    /// Get an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.entities.get(&id)
    }

    /// Get a mutable reference to an entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.entities.get_mut(&id)
    }

    /// Check if an entity exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Get the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if storage is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Snapshot of ids in iteration order.
    ///
    /// Systems walk this snapshot so that removals during a pass are safe.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// Iterate over entities in id order.
    pub fn values(&self) -> btree_map::Values<'_, EntityId, T> {
        self.entities.values()
    }

    /// Iterate mutably over entities in id order.
    pub fn values_mut(&mut self) -> btree_map::ValuesMut<'_, EntityId, T> {
        self.entities.values_mut()
    }

    /// Iterate over `(id, entity)` pairs in id order.
    pub fn iter(&self) -> btree_map::Iter<'_, EntityId, T> {
        self.entities.iter()
    }
}

/// Hands out never-reused entity ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdAllocator {
    next: EntityId,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    /// Reserve the next id.
    pub fn allocate(&mut self) -> EntityId {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Complete match state.
#[derive(Debug, Clone)]
pub struct World {
    pub(crate) config: SimConfig,
    pub(crate) player: Faction,
    pub(crate) opponent: Faction,
    pub(crate) terrain: Terrain,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) ids: IdAllocator,
    pub(crate) clock_ms: u64,
    pub(crate) tick: u64,
    pub(crate) outcome: Option<MatchOutcome>,
    pub(crate) selection: Vec<EntityId>,
    pub(crate) build_mode: Option<BuildingKind>,
}

impl World {
    /// Create a ready-to-play match: generated terrain and both factions'
    /// starting buildings and units.
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        let mut world = Self::empty(config);
        world.populate();
        world
    }

    /// Create a world with empty factions and no terrain.
    ///
    /// Starting stockpiles and population limits come from the config.
    /// Useful for hand-built scenarios.
    #[must_use]
    pub fn empty(config: SimConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            player: starting_faction(FactionId::Player, &config),
            opponent: starting_faction(FactionId::Opponent, &config),
            terrain: Terrain::default(),
            rng,
            ids: IdAllocator::default(),
            clock_ms: 0,
            tick: 0,
            outcome: None,
            selection: Vec::new(),
            build_mode: None,
            config,
        }
    }

    /// Discard all faction and terrain state and start a fresh match.
    ///
    /// The RNG keeps its stream, so the new map differs from the last one.
    pub fn reset(&mut self) {
        self.player = starting_faction(FactionId::Player, &self.config);
        self.opponent = starting_faction(FactionId::Opponent, &self.config);
        self.terrain = Terrain::default();
        self.clock_ms = 0;
        self.tick = 0;
        self.outcome = None;
        self.selection.clear();
        self.build_mode = None;
        self.populate();
        info!(seed = self.config.seed, "Match reset");
    }

    fn populate(&mut self) {
        let terrain_config = TerrainConfig::from(&self.config);
        self.terrain = generate_terrain(&terrain_config, &mut self.rng, &mut self.ids);
        production::spawn_initial_entities(self);
    }

    /// The configuration this world was built from.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Map width.
    #[must_use]
    pub fn world_width(&self) -> Fixed {
        Fixed::from_num(self.config.world_width)
    }

    /// Map height.
    #[must_use]
    pub fn world_height(&self) -> Fixed {
        Fixed::from_num(self.config.world_height)
    }

    /// Read one faction.
    #[must_use]
    pub const fn faction(&self, id: FactionId) -> &Faction {
        match id {
            FactionId::Player => &self.player,
            FactionId::Opponent => &self.opponent,
        }
    }

    /// Mutate one faction.
    pub fn faction_mut(&mut self, id: FactionId) -> &mut Faction {
        match id {
            FactionId::Player => &mut self.player,
            FactionId::Opponent => &mut self.opponent,
        }
    }

    /// Read the terrain.
    #[must_use]
    pub const fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    /// Mutate the terrain.
    pub fn terrain_mut(&mut self) -> &mut Terrain {
        &mut self.terrain
    }

    /// Simulation time in milliseconds; the "now" for all cooldowns.
    #[must_use]
    pub const fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    /// Number of ticks simulated since the match started.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    /// The match result, once decided.
    #[must_use]
    pub const fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }

    /// Whether the match has ended.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Currently selected player units.
    #[must_use]
    pub fn selection(&self) -> &[EntityId] {
        &self.selection
    }

    /// Building kind awaiting placement, if any.
    #[must_use]
    pub const fn build_mode(&self) -> Option<BuildingKind> {
        self.build_mode
    }

    /// Look up a unit of either faction.
    #[must_use]
    pub fn unit(&self, faction: FactionId, id: EntityId) -> Option<&Unit> {
        self.faction(faction).units.get(id)
    }

    /// Mutably look up a unit of either faction.
    pub fn unit_mut(&mut self, faction: FactionId, id: EntityId) -> Option<&mut Unit> {
        self.faction_mut(faction).units.get_mut(id)
    }

    /// Every unit of both factions, player units first.
    pub fn all_units(&self) -> impl Iterator<Item = (FactionId, &Unit)> {
        FactionId::ALL
            .into_iter()
            .flat_map(move |id| self.faction(id).units.values().map(move |u| (id, u)))
    }

    /// `(faction, id)` for every unit, player units first.
    #[must_use]
    pub fn unit_roster(&self) -> Vec<(FactionId, EntityId)> {
        self.all_units().map(|(f, u)| (f, u.id)).collect()
    }

    /// Snapshot of every unit's position and radius.
    #[must_use]
    pub fn occupants(&self) -> Vec<Occupant> {
        self.all_units()
            .map(|(_, u)| Occupant {
                id: u.id,
                position: u.position,
                size: u.size,
            })
            .collect()
    }

    /// Reserve a fresh entity id.
    pub fn allocate_id(&mut self) -> EntityId {
        self.ids.allocate()
    }

    /// Place a resource node on the terrain.
    pub fn add_resource_node(
        &mut self,
        kind: ResourceKind,
        position: Vec2Fixed,
        size: Fixed,
        resources: i32,
    ) -> EntityId {
        let id = self.ids.allocate();
        self.terrain
            .insert(ResourceNode::new(id, kind, position, size, resources));
        id
    }

    /// Mutable access to the match RNG.
    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// Destination from which `mover` can engage `target` without stacking
    /// onto other units.
    ///
    /// Returns `None` if the target no longer exists.
    pub fn approach_point(
        &mut self,
        mover: &Unit,
        target_owner: FactionId,
        target: AttackTarget,
    ) -> Option<Vec2Fixed> {
        let (center, extent) = self.faction(target_owner).locate(target)?;
        let occupants = self.occupants();
        Some(geometry::free_position_around(
            center,
            extent,
            mover.id,
            mover.size,
            mover.range,
            &occupants,
            &mut self.rng,
        ))
    }

    /// Enemy entity under a world point: buildings first, then units.
    ///
    /// Buildings match anywhere inside their footprint; units within their
    /// radius plus a 5-unit click margin.
    #[must_use]
    pub fn entity_at(&self, point: Vec2Fixed, owner: FactionId) -> Option<AttackTarget> {
        let faction = self.faction(owner);
        if let Some(building) = faction.buildings.values().find(|b| {
            geometry::point_in_rect(point, b.position, b.half_width(), b.half_height())
        }) {
            return Some(AttackTarget::Building(building.id));
        }
        faction
            .units
            .values()
            .find(|u| geometry::point_in_circle(point, u.position, u.size + Fixed::from_num(5)))
            .map(|u| AttackTarget::Unit(u.id))
    }

    /// Resource node under a world point: trees first, then gold mines.
    #[must_use]
    pub fn resource_at(&self, point: Vec2Fixed) -> Option<&ResourceNode> {
        self.terrain.resource_at(point)
    }

    /// Whether a building of `kind` could be placed with its centre at `point`.
    ///
    /// The footprint must lie inside the map and must not overlap any
    /// building of either faction or the bounding square of any resource node.
    #[must_use]
    pub fn can_build_at(&self, kind: BuildingKind, point: Vec2Fixed) -> bool {
        self.placement_check(kind, point).is_ok()
    }

    pub(crate) fn placement_check(
        &self,
        kind: BuildingKind,
        point: Vec2Fixed,
    ) -> Result<(), crate::error::CommandError> {
        use crate::error::CommandError;

        let stats = kind.stats();
        let half_w = stats.width / 2;
        let half_h = stats.height / 2;

        if !geometry::rect_within_bounds(
            point,
            half_w,
            half_h,
            self.world_width(),
            self.world_height(),
        ) {
            return Err(CommandError::OutOfBounds(kind));
        }

        let hits_building = self.all_buildings().any(|b| {
            geometry::rects_overlap(
                point,
                half_w,
                half_h,
                b.position,
                b.half_width(),
                b.half_height(),
            )
        });
        let hits_node = self.terrain.nodes().any(|n| {
            geometry::rects_overlap(point, half_w, half_h, n.position, n.size, n.size)
        });

        if hits_building || hits_node {
            return Err(CommandError::PlacementBlocked(kind));
        }
        Ok(())
    }

    /// Every building of both factions, player buildings first.
    pub fn all_buildings(&self) -> impl Iterator<Item = &Building> {
        self.player
            .buildings
            .values()
            .chain(self.opponent.buildings.values())
    }

    /// Hash of the full simulation state, for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tick.hash(&mut hasher);
        self.clock_ms.hash(&mut hasher);
        self.outcome.hash(&mut hasher);
        self.player.hash(&mut hasher);
        self.opponent.hash(&mut hasher);
        self.terrain.hash(&mut hasher);
        hasher.finish()
    }

    pub(crate) fn prune_selection(&mut self) {
        let units = &self.player.units;
        self.selection.retain(|id| units.contains(*id));
    }
}

fn starting_faction(id: FactionId, config: &SimConfig) -> Faction {
    Faction::new(
        id,
        Stockpile::new(
            config.starting_gold,
            config.starting_wood,
            config.starting_food,
        ),
        config.starting_population_limit,
    )
}
