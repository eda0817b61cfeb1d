//! Terrain generation: scatters trees and gold mines over the map.
//!
//! The layout is fixed after generation apart from depletion, which only
//! ever removes nodes. Every draw comes from the world's seeded RNG, so a
//! seed reproduces the same map.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::{EntityId, ResourceKind, ResourceNode};
use crate::config::SimConfig;
use crate::geometry;
use crate::math::{Fixed, Vec2Fixed};
use crate::world::{EntityStorage, IdAllocator};

/// Tree radius range, `[min, max)`.
pub const TREE_SIZE_RANGE: (i32, i32) = (10, 20);
/// Tree yield range, `[min, max)`.
pub const TREE_YIELD_RANGE: (i32, i32) = (100, 200);
/// Gold mine radius.
pub const GOLD_MINE_SIZE: i32 = 30;
/// Gold mine yield range, `[min, max)`.
pub const GOLD_MINE_YIELD_RANGE: (i32, i32) = (1000, 2000);

/// Parameters for [`generate_terrain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Map width in world units.
    pub width: i32,
    /// Map height in world units.
    pub height: i32,
    /// Number of trees to place.
    pub tree_count: u32,
    /// Number of gold mines to place.
    pub gold_mine_count: u32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self::from(&SimConfig::default())
    }
}

impl From<&SimConfig> for TerrainConfig {
    fn from(config: &SimConfig) -> Self {
        Self {
            width: config.world_width,
            height: config.world_height,
            tree_count: config.tree_count,
            gold_mine_count: config.gold_mine_count,
        }
    }
}

/// All resource nodes on the map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Terrain {
    trees: EntityStorage<ResourceNode>,
    gold_mines: EntityStorage<ResourceNode>,
}

impl Terrain {
    /// Trees in placement order.
    #[must_use]
    pub const fn trees(&self) -> &EntityStorage<ResourceNode> {
        &self.trees
    }

    /// Gold mines in placement order.
    #[must_use]
    pub const fn gold_mines(&self) -> &EntityStorage<ResourceNode> {
        &self.gold_mines
    }

    /// Nodes of one kind.
    #[must_use]
    pub const fn nodes_of(&self, kind: ResourceKind) -> &EntityStorage<ResourceNode> {
        match kind {
            ResourceKind::Tree => &self.trees,
            ResourceKind::GoldMine => &self.gold_mines,
        }
    }

    /// Every node, trees first.
    pub fn nodes(&self) -> impl Iterator<Item = &ResourceNode> {
        self.trees.values().chain(self.gold_mines.values())
    }

    /// Total number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.len() + self.gold_mines.len()
    }

    /// Whether every node is gone.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty() && self.gold_mines.is_empty()
    }

    /// Look up a node of either kind.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&ResourceNode> {
        self.trees.get(id).or_else(|| self.gold_mines.get(id))
    }

    /// Mutably look up a node of either kind.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut ResourceNode> {
        match self.trees.get_mut(id) {
            Some(node) => Some(node),
            None => self.gold_mines.get_mut(id),
        }
    }

    /// Add a node to the storage matching its kind.
    pub fn insert(&mut self, node: ResourceNode) {
        match node.kind {
            ResourceKind::Tree => self.trees.insert(node.id, node),
            ResourceKind::GoldMine => self.gold_mines.insert(node.id, node),
        };
    }

    /// Remove a node of either kind.
    pub fn remove(&mut self, id: EntityId) -> Option<ResourceNode> {
        self.trees.remove(id).or_else(|| self.gold_mines.remove(id))
    }

    /// First node whose radius covers `point`: trees first, then mines.
    #[must_use]
    pub fn resource_at(&self, point: Vec2Fixed) -> Option<&ResourceNode> {
        self.nodes()
            .find(|node| geometry::point_in_circle(point, node.position, node.size))
    }

    /// Nearest node of one kind to `from`. Ties go to the earlier node.
    #[must_use]
    pub fn nearest(&self, kind: ResourceKind, from: Vec2Fixed) -> Option<&ResourceNode> {
        let mut best: Option<(&ResourceNode, Fixed)> = None;
        for node in self.nodes_of(kind).values() {
            let dist = from.distance_squared(node.position);
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((node, dist));
            }
        }
        best.map(|(node, _)| node)
    }
}

/// Generate a fresh resource layout.
///
/// Trees are placed first, then gold mines, each at a uniform position over
/// the whole map.
pub fn generate_terrain<R: Rng + ?Sized>(
    config: &TerrainConfig,
    rng: &mut R,
    ids: &mut IdAllocator,
) -> Terrain {
    let mut terrain = Terrain::default();

    for _ in 0..config.tree_count {
        let position = random_position(config, rng);
        let size = geometry::random_fixed(
            rng,
            Fixed::from_num(TREE_SIZE_RANGE.0),
            Fixed::from_num(TREE_SIZE_RANGE.1),
        );
        let resources = rng.gen_range(TREE_YIELD_RANGE.0..TREE_YIELD_RANGE.1);
        terrain.insert(ResourceNode::new(
            ids.allocate(),
            ResourceKind::Tree,
            position,
            size,
            resources,
        ));
    }

    for _ in 0..config.gold_mine_count {
        let position = random_position(config, rng);
        let resources = rng.gen_range(GOLD_MINE_YIELD_RANGE.0..GOLD_MINE_YIELD_RANGE.1);
        terrain.insert(ResourceNode::new(
            ids.allocate(),
            ResourceKind::GoldMine,
            position,
            Fixed::from_num(GOLD_MINE_SIZE),
            resources,
        ));
    }

    terrain
}

fn random_position<R: Rng + ?Sized>(config: &TerrainConfig, rng: &mut R) -> Vec2Fixed {
    Vec2Fixed::new(
        geometry::random_fixed(rng, Fixed::ZERO, Fixed::from_num(config.width)),
        geometry::random_fixed(rng, Fixed::ZERO, Fixed::from_num(config.height)),
    )
}
