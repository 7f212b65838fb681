//! World objects: tiles, water, wildflowers, and choppable trees.
//!
//! Spawn helpers take placements in map space and produce entities in
//! world space. Trees respond to tool-use events and degrade to stumps.

use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;

use super::maps::{MapDef, ObjectPlacement, TilePlacement, WorldSetupError};

// ═══════════════════════════════════════════════════════════════════════
// WORLD ATLAS RESOURCE
// ═══════════════════════════════════════════════════════════════════════

/// Caches loaded texture handles for the world scene.
/// Loaded lazily on scene setup; spawns fall back to colored rectangles
/// while `loaded` is false, so a headless app still builds a full scene.
#[derive(Resource, Default)]
pub struct WorldAtlases {
    pub loaded: bool,
    pub ground_image: Handle<Image>,
    pub tileset_image: Handle<Image>,
    pub tileset_layout: Handle<TextureAtlasLayout>,
    pub water_image: Handle<Image>,
    pub water_layout: Handle<TextureAtlasLayout>,
    pub tree_small_image: Handle<Image>,
    pub tree_large_image: Handle<Image>,
    pub stump_small_image: Handle<Image>,
    pub stump_large_image: Handle<Image>,
    pub fruit_image: Handle<Image>,
    pub wildflower_image: Handle<Image>,
}

/// Loads world assets on first use. Subsequent calls are no-ops.
pub fn ensure_world_atlases_loaded(
    asset_server: &AssetServer,
    layouts: &mut Assets<TextureAtlasLayout>,
    atlases: &mut WorldAtlases,
) {
    if atlases.loaded {
        return;
    }

    atlases.ground_image = asset_server.load("world/ground.png");

    // tileset.png: 64x64 tiles, 4 columns x 2 rows
    atlases.tileset_image = asset_server.load("world/tileset.png");
    atlases.tileset_layout = layouts.add(TextureAtlasLayout::from_grid(
        UVec2::new(64, 64),
        4,
        2,
        None,
        None,
    ));

    // water.png: 4 ripple frames in a row
    atlases.water_image = asset_server.load("world/water.png");
    atlases.water_layout = layouts.add(TextureAtlasLayout::from_grid(
        UVec2::new(64, 64),
        WATER_FRAME_COUNT as u32,
        1,
        None,
        None,
    ));

    atlases.tree_small_image = asset_server.load("objects/tree_small.png");
    atlases.tree_large_image = asset_server.load("objects/tree_large.png");
    atlases.stump_small_image = asset_server.load("objects/stump_small.png");
    atlases.stump_large_image = asset_server.load("objects/stump_large.png");
    atlases.fruit_image = asset_server.load("objects/apple.png");
    atlases.wildflower_image = asset_server.load("objects/flower.png");

    atlases.loaded = true;
}

// ═══════════════════════════════════════════════════════════════════════
// SIZES AND HITBOX DERIVATION
// ═══════════════════════════════════════════════════════════════════════

pub const WATER_FRAME_COUNT: usize = 4;
pub const FRUIT_SIZE: Vec2 = Vec2::new(32.0, 32.0);
pub const WILDFLOWER_SIZE: Vec2 = Vec2::new(64.0, 128.0);

/// Standard hitbox shrink: most of the height comes off so only the base
/// of the sprite blocks movement, letting the player walk "behind" it.
pub fn generic_shrink(size: Vec2) -> Vec2 {
    Vec2::new(size.x * 0.2, size.y * 0.75)
}

/// Wildflowers have a thin stem: fixed horizontal trim, nearly all of the
/// height removed.
pub fn wildflower_shrink(size: Vec2) -> Vec2 {
    Vec2::new(20.0, size.y * 0.9)
}

// ═══════════════════════════════════════════════════════════════════════
// TREES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeVariant {
    Small,
    Large,
}

// Fruit anchor points, in map space from the tree's top-left corner.
const FRUIT_OFFSETS_SMALL: [Vec2; 6] = [
    Vec2::new(36.0, 34.0),
    Vec2::new(60.0, 74.0),
    Vec2::new(24.0, 100.0),
    Vec2::new(60.0, 90.0),
    Vec2::new(40.0, 60.0),
    Vec2::new(60.0, 20.0),
];
const FRUIT_OFFSETS_LARGE: [Vec2; 6] = [
    Vec2::new(60.0, 48.0),
    Vec2::new(100.0, 130.0),
    Vec2::new(90.0, 100.0),
    Vec2::new(32.0, 80.0),
    Vec2::new(90.0, 20.0),
    Vec2::new(84.0, 140.0),
];

impl TreeVariant {
    /// Unrecognised placement names fall back to Large. Map typos should
    /// not abort setup over a cosmetic distinction.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Small" => TreeVariant::Small,
            _ => TreeVariant::Large,
        }
    }

    pub fn sprite_size(self) -> Vec2 {
        match self {
            TreeVariant::Small => Vec2::new(96.0, 192.0),
            TreeVariant::Large => Vec2::new(128.0, 256.0),
        }
    }

    pub fn stump_size(self) -> Vec2 {
        match self {
            TreeVariant::Small => Vec2::new(64.0, 64.0),
            TreeVariant::Large => Vec2::new(64.0, 96.0),
        }
    }

    pub fn fruit_offsets(self) -> &'static [Vec2] {
        match self {
            TreeVariant::Small => &FRUIT_OFFSETS_SMALL,
            TreeVariant::Large => &FRUIT_OFFSETS_LARGE,
        }
    }
}

pub const TREE_MAX_HEALTH: u8 = 5;
/// Chance that any given fruit anchor holds a fruit, rolled once at spawn.
const FRUIT_CHANCE_IN_TEN: u32 = 2;

/// A choppable tree. Fruit entities are owned by the tree: chopping may
/// despawn one, and no fruit is ever added after construction.
#[derive(Component, Debug)]
pub struct Tree {
    pub variant: TreeVariant,
    pub health: u8,
    pub alive: bool,
    pub fruit: Vec<Entity>,
    pub invulnerable: CountdownTimer,
}

/// Result of landing an axe hit on a tree.
#[derive(Debug, PartialEq, Eq)]
pub enum ChopOutcome {
    /// Dead or still invulnerable from the last hit.
    Ignored,
    Hit {
        felled_fruit: Option<Entity>,
        became_stump: bool,
    },
}

impl Tree {
    pub fn new(variant: TreeVariant, fruit: Vec<Entity>) -> Self {
        Self {
            variant,
            health: TREE_MAX_HEALTH,
            alive: true,
            fruit,
            invulnerable: CountdownTimer::new(TREE_INVULN_SECS),
        }
    }

    /// Apply one axe hit. Starts the invulnerability window, knocks loose
    /// a random fruit if any remain, and reports whether this hit felled
    /// the tree. Health never goes below zero.
    pub fn chop(&mut self, rng: &mut impl Rng) -> ChopOutcome {
        if !self.alive || self.invulnerable.active() {
            return ChopOutcome::Ignored;
        }
        self.invulnerable.activate();
        let felled_fruit = self.pluck_random_fruit(rng);
        self.health = self.health.saturating_sub(1);
        let became_stump = self.health == 0;
        if became_stump {
            self.alive = false;
        }
        ChopOutcome::Hit { felled_fruit, became_stump }
    }

    fn pluck_random_fruit(&mut self, rng: &mut impl Rng) -> Option<Entity> {
        if self.fruit.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.fruit.len());
        Some(self.fruit.swap_remove(index))
    }
}

/// Roll which fruit anchors hold fruit. Each anchor is an independent
/// 2-in-10 chance; the roll happens exactly once, at spawn.
pub fn roll_fruit_offsets(variant: TreeVariant, rng: &mut impl Rng) -> Vec<Vec2> {
    variant
        .fruit_offsets()
        .iter()
        .copied()
        .filter(|_| rng.gen_range(0..10) < FRUIT_CHANCE_IN_TEN)
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════
// SPAWN HELPERS
// ═══════════════════════════════════════════════════════════════════════

/// One full-map background sprite on the Ground layer.
pub fn spawn_ground(commands: &mut Commands, atlases: &WorldAtlases, map: &MapDef) {
    let size = map.pixel_size();
    let center = map.map_to_world(size / 2.0);
    let sprite = if atlases.loaded {
        let mut sprite = Sprite::from_image(atlases.ground_image.clone());
        sprite.custom_size = Some(size);
        sprite
    } else {
        Sprite {
            color: Color::srgb(0.35, 0.55, 0.3),
            custom_size: Some(size),
            ..default()
        }
    };
    commands.spawn((
        sprite,
        Transform::from_translation(center.extend(Layer::Ground.z_base())),
        LogicalPosition(center),
        Layer::Ground,
        SpriteKind::Generic,
        Hitbox::shrunk(size, generic_shrink(size)),
    ));
}

/// One grid-aligned tile from the tileset atlas.
pub fn spawn_tile(
    commands: &mut Commands,
    atlases: &WorldAtlases,
    map: &MapDef,
    placement: &TilePlacement,
    layer: Layer,
    kind: SpriteKind,
    solid: bool,
) {
    let size = Vec2::splat(TILE_SIZE);
    let center = map.tile_center(placement.x, placement.y);
    let sprite = if atlases.loaded {
        let mut sprite = Sprite::from_atlas_image(
            atlases.tileset_image.clone(),
            TextureAtlas {
                layout: atlases.tileset_layout.clone(),
                index: placement.tile as usize,
            },
        );
        sprite.custom_size = Some(size);
        sprite
    } else {
        Sprite {
            color: tile_color(kind, layer),
            custom_size: Some(size),
            ..default()
        }
    };

    let mut entity = commands.spawn((
        sprite,
        Transform::from_translation(center.extend(layer.z_base())),
        LogicalPosition(center),
        layer,
        kind,
        Hitbox::shrunk(size, generic_shrink(size)),
    ));
    if solid {
        entity.insert(Obstacle);
    }
}

fn tile_color(kind: SpriteKind, layer: Layer) -> Color {
    match (kind, layer) {
        (SpriteKind::Fence, _) => Color::srgb(0.55, 0.4, 0.2),
        (_, Layer::HouseBottom) => Color::srgb(0.6, 0.5, 0.35),
        _ => Color::srgb(0.5, 0.45, 0.4),
    }
}

/// An animated water tile. Not an obstacle.
pub fn spawn_water_tile(
    commands: &mut Commands,
    atlases: &WorldAtlases,
    map: &MapDef,
    placement: &TilePlacement,
) -> Result<(), WorldSetupError> {
    let size = Vec2::splat(TILE_SIZE);
    let center = map.tile_center(placement.x, placement.y);
    let sprite = if atlases.loaded {
        let mut sprite = Sprite::from_atlas_image(
            atlases.water_image.clone(),
            TextureAtlas {
                layout: atlases.water_layout.clone(),
                index: 0,
            },
        );
        sprite.custom_size = Some(size);
        sprite
    } else {
        Sprite {
            color: Color::srgb(0.25, 0.45, 0.8),
            custom_size: Some(size),
            ..default()
        }
    };

    commands.spawn((
        sprite,
        Transform::from_translation(center.extend(Layer::Water.z_base())),
        LogicalPosition(center),
        Layer::Water,
        SpriteKind::Water,
        Hitbox::shrunk(size, generic_shrink(size)),
        super::animation::Animated::new(WATER_FRAME_COUNT, WATER_ANIM_RATE)?,
    ));
    Ok(())
}

/// An invisible blocker tile. No sprite, so it never renders or Y-sorts.
pub fn spawn_collision_tile(commands: &mut Commands, map: &MapDef, placement: &TilePlacement) {
    let size = Vec2::splat(TILE_SIZE);
    let center = map.tile_center(placement.x, placement.y);
    commands.spawn((
        LogicalPosition(center),
        SpriteKind::CollisionTile,
        Hitbox::shrunk(size, generic_shrink(size)),
        Obstacle,
    ));
}

/// A decorative wildflower. Drawn on the Main layer; only the stem
/// blocks movement.
pub fn spawn_wildflower(
    commands: &mut Commands,
    atlases: &WorldAtlases,
    map: &MapDef,
    placement: &ObjectPlacement,
) {
    let size = WILDFLOWER_SIZE;
    let center = map.map_to_world(Vec2::new(placement.x, placement.y) + size / 2.0);
    let sprite = if atlases.loaded {
        let mut sprite = Sprite::from_image(atlases.wildflower_image.clone());
        sprite.custom_size = Some(size);
        sprite
    } else {
        Sprite {
            color: Color::srgb(0.85, 0.6, 0.8),
            custom_size: Some(size),
            ..default()
        }
    };
    commands.spawn((
        sprite,
        Transform::from_translation(center.extend(Layer::Main.z_base())),
        LogicalPosition(center),
        Layer::Main,
        SpriteKind::WildFlower,
        Hitbox::shrunk(size, wildflower_shrink(size)),
        Obstacle,
    ));
}

/// A tree plus its fruit. Fruit placement is rolled here, once; the tree
/// records the spawned fruit entities so a chop can despawn one.
pub fn spawn_tree(
    commands: &mut Commands,
    atlases: &WorldAtlases,
    map: &MapDef,
    placement: &ObjectPlacement,
    rng: &mut impl Rng,
) {
    let variant = TreeVariant::from_name(&placement.name);
    let size = variant.sprite_size();
    let top_left = Vec2::new(placement.x, placement.y);
    let center = map.map_to_world(top_left + size / 2.0);

    let mut fruit = Vec::new();
    for offset in roll_fruit_offsets(variant, rng) {
        let fruit_center = map.map_to_world(top_left + offset + FRUIT_SIZE / 2.0);
        let sprite = if atlases.loaded {
            let mut sprite = Sprite::from_image(atlases.fruit_image.clone());
            sprite.custom_size = Some(FRUIT_SIZE);
            sprite
        } else {
            Sprite {
                color: Color::srgb(0.8, 0.2, 0.2),
                custom_size: Some(FRUIT_SIZE),
                ..default()
            }
        };
        let id = commands
            .spawn((
                sprite,
                Transform::from_translation(fruit_center.extend(Layer::Fruit.z_base())),
                LogicalPosition(fruit_center),
                Layer::Fruit,
                SpriteKind::Fruit,
                Hitbox::shrunk(FRUIT_SIZE, generic_shrink(FRUIT_SIZE)),
            ))
            .id();
        fruit.push(id);
    }

    let sprite = if atlases.loaded {
        let image = match variant {
            TreeVariant::Small => atlases.tree_small_image.clone(),
            TreeVariant::Large => atlases.tree_large_image.clone(),
        };
        let mut sprite = Sprite::from_image(image);
        sprite.custom_size = Some(size);
        sprite
    } else {
        Sprite {
            color: Color::srgb(0.15, 0.5, 0.15),
            custom_size: Some(size),
            ..default()
        }
    };

    commands.spawn((
        sprite,
        Transform::from_translation(center.extend(Layer::Main.z_base())),
        LogicalPosition(center),
        Layer::Main,
        SpriteKind::Tree,
        Hitbox::shrunk(size, generic_shrink(size)),
        Obstacle,
        Tree::new(variant, fruit),
    ));
}

// ═══════════════════════════════════════════════════════════════════════
// TOOL USE HANDLING
// ═══════════════════════════════════════════════════════════════════════

/// Applies completed axe swings to the tree under the target point. At
/// most one tree takes the hit. A felled tree swaps to its stump sprite
/// and keeps blocking with the stump's smaller hitbox.
pub fn handle_tool_use_on_trees(
    mut commands: Commands,
    atlases: Res<WorldAtlases>,
    mut events: EventReader<ToolUseEvent>,
    mut trees: Query<(&LogicalPosition, &mut Tree, &mut Sprite, &mut Hitbox)>,
) {
    for event in events.read() {
        if event.tool != ToolKind::Axe {
            continue;
        }
        for (position, mut tree, mut sprite, mut hitbox) in trees.iter_mut() {
            let bounds = Rect::from_center_size(position.0, tree.variant.sprite_size());
            if !bounds.contains(event.target) {
                continue;
            }
            match tree.chop(&mut rand::thread_rng()) {
                ChopOutcome::Ignored => {}
                ChopOutcome::Hit { felled_fruit, became_stump } => {
                    if let Some(fruit) = felled_fruit {
                        commands.entity(fruit).despawn();
                    }
                    if became_stump {
                        let stump_size = tree.variant.stump_size();
                        if atlases.loaded {
                            sprite.image = match tree.variant {
                                TreeVariant::Small => atlases.stump_small_image.clone(),
                                TreeVariant::Large => atlases.stump_large_image.clone(),
                            };
                            sprite.texture_atlas = None;
                        } else {
                            sprite.color = Color::srgb(0.45, 0.35, 0.2);
                        }
                        sprite.custom_size = Some(stump_size);
                        *hitbox = Hitbox::shrunk(stump_size, generic_shrink(stump_size));
                        info!("[World] Tree felled");
                    }
                }
            }
            break;
        }
    }
}

/// Winds down every tree's invulnerability window.
pub fn tick_tree_timers(time: Res<Time>, mut trees: Query<&mut Tree>) {
    for mut tree in &mut trees {
        tree.invulnerable.tick(time.delta());
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    #[test]
    fn unknown_tree_name_defaults_to_large() {
        assert_eq!(TreeVariant::from_name("Small"), TreeVariant::Small);
        assert_eq!(TreeVariant::from_name("Large"), TreeVariant::Large);
        assert_eq!(TreeVariant::from_name("Oak?"), TreeVariant::Large);
    }

    #[test]
    fn fruit_roll_is_deterministic_for_a_seed() {
        let a = roll_fruit_offsets(TreeVariant::Large, &mut StdRng::seed_from_u64(7));
        let b = roll_fruit_offsets(TreeVariant::Large, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(a.len() <= TreeVariant::Large.fruit_offsets().len());
    }

    #[test]
    fn fruit_roll_uses_each_anchor_at_most_once() {
        // Across many seeds the roll must never exceed the anchor count
        // and every kept offset must be one of the anchors.
        for seed in 0..50 {
            let rolled = roll_fruit_offsets(TreeVariant::Small, &mut StdRng::seed_from_u64(seed));
            assert!(rolled.len() <= 6);
            for offset in &rolled {
                assert!(TreeVariant::Small.fruit_offsets().contains(offset));
            }
        }
    }

    #[test]
    fn chop_reduces_health_and_fells_at_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut tree = Tree::new(TreeVariant::Small, Vec::new());

        for expected_health in (0..TREE_MAX_HEALTH).rev() {
            tree.invulnerable.deactivate();
            let outcome = tree.chop(&mut rng);
            assert_eq!(tree.health, expected_health);
            match outcome {
                ChopOutcome::Hit { became_stump, .. } => {
                    assert_eq!(became_stump, expected_health == 0);
                }
                ChopOutcome::Ignored => panic!("live tree must take the hit"),
            }
        }
        assert!(!tree.alive);

        // Further chops are ignored and health stays clamped at zero.
        tree.invulnerable.deactivate();
        assert_eq!(tree.chop(&mut rng), ChopOutcome::Ignored);
        assert_eq!(tree.health, 0);
    }

    #[test]
    fn chop_is_gated_by_invulnerability_window() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut tree = Tree::new(TreeVariant::Large, Vec::new());

        assert!(matches!(tree.chop(&mut rng), ChopOutcome::Hit { .. }));
        assert_eq!(tree.chop(&mut rng), ChopOutcome::Ignored);
        assert_eq!(tree.health, TREE_MAX_HEALTH - 1);

        tree.invulnerable.tick(Duration::from_secs_f32(TREE_INVULN_SECS + 0.05));
        assert!(matches!(tree.chop(&mut rng), ChopOutcome::Hit { .. }));
        assert_eq!(tree.health, TREE_MAX_HEALTH - 2);
    }

    #[test]
    fn chop_fells_each_fruit_once() {
        let mut rng = StdRng::seed_from_u64(3);
        let fruit: Vec<Entity> = (0u32..3).map(Entity::from_raw).collect();
        let mut tree = Tree::new(TreeVariant::Large, fruit.clone());

        let mut felled = Vec::new();
        for _ in 0..TREE_MAX_HEALTH {
            tree.invulnerable.deactivate();
            if let ChopOutcome::Hit { felled_fruit, .. } = tree.chop(&mut rng) {
                if let Some(entity) = felled_fruit {
                    felled.push(entity);
                }
            }
        }
        // Three fruit, five chops: every fruit falls exactly once.
        assert_eq!(felled.len(), 3);
        felled.sort();
        felled.dedup();
        assert_eq!(felled.len(), 3);
        assert!(tree.fruit.is_empty());
    }

    #[test]
    fn fruit_anchors_stay_inside_the_tree_sprite() {
        for variant in [TreeVariant::Small, TreeVariant::Large] {
            let size = variant.sprite_size();
            for offset in variant.fruit_offsets() {
                assert!(offset.x >= 0.0 && offset.x + FRUIT_SIZE.x <= size.x);
                assert!(offset.y >= 0.0 && offset.y + FRUIT_SIZE.y <= size.y);
            }
        }
    }
}
