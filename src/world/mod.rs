//! World domain plugin for Willowvale.
//!
//! Responsible for:
//! - Loading the map definition (RON on disk, demo fallback)
//! - Turning named map layers into entities at scene setup
//! - Trees and their reactions to tool use
//! - Looping sprite animation (water)
//! - The LogicalPosition → Transform depth sync

use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;

pub mod animation;
pub mod maps;
pub mod objects;
pub mod ysort;

use maps::{demo_farm, MapDef, WorldSetupError};
use objects::{
    ensure_world_atlases_loaded, handle_tool_use_on_trees, spawn_collision_tile, spawn_ground,
    spawn_tile, spawn_tree, spawn_water_tile, spawn_wildflower, tick_tree_timers, WorldAtlases,
};

pub const MAP_PATH: &str = "assets/maps/farm.ron";

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WorldAtlases>()
            .add_systems(OnEnter(GameState::Loading), load_world_map)
            .add_systems(OnEnter(GameState::Playing), setup_world)
            .add_systems(
                Update,
                (
                    animation::animate_sprites,
                    (tick_tree_timers, handle_tool_use_on_trees).chain(),
                )
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(PostUpdate, ysort::sync_position_and_ysort);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// RESOURCES
// ═══════════════════════════════════════════════════════════════════════

/// The loaded map definition. Inserted during Loading; everything in
/// Playing may assume it exists.
#[derive(Resource, Debug, Clone)]
pub struct WorldMapData {
    pub def: MapDef,
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

/// Reads the map from disk, falling back to the compiled-in demo farm
/// when no file is present. A file that exists but fails to parse is a
/// configuration error and aborts with the parse detail.
fn load_world_map(mut commands: Commands, mut next_state: ResMut<NextState<GameState>>) {
    let def = match std::fs::read_to_string(MAP_PATH) {
        Ok(text) => MapDef::from_ron(&text)
            .unwrap_or_else(|e| panic!("[World] Failed to load {MAP_PATH}: {e}")),
        Err(_) => {
            info!("[World] No map at {MAP_PATH}, using the built-in demo farm");
            demo_farm()
        }
    };
    info!(
        "[World] Map loaded: {}x{} tiles, {} tile layers, {} object layers",
        def.width,
        def.height,
        def.tile_layers.len(),
        def.object_layers.len()
    );
    commands.insert_resource(WorldMapData { def });
    next_state.set(GameState::Playing);
}

/// Builds the whole scene from the map's named layers. Asset handles are
/// optional so the same setup runs headless.
fn setup_world(
    mut commands: Commands,
    map_data: Res<WorldMapData>,
    mut atlases: ResMut<WorldAtlases>,
    asset_server: Option<Res<AssetServer>>,
    layouts: Option<ResMut<Assets<TextureAtlasLayout>>>,
) {
    if let (Some(asset_server), Some(mut layouts)) = (asset_server, layouts) {
        ensure_world_atlases_loaded(&asset_server, &mut layouts, &mut atlases);
    }

    let mut rng = rand::thread_rng();
    build_world(&mut commands, &map_data.def, &atlases, &mut rng)
        .unwrap_or_else(|e| panic!("[World] Scene setup failed: {e}"));
}

/// The layer list is the scene recipe: each named layer maps to one kind
/// of entity on one depth layer. A missing layer is fatal.
pub fn build_world(
    commands: &mut Commands,
    map: &MapDef,
    atlases: &WorldAtlases,
    rng: &mut impl Rng,
) -> Result<(), WorldSetupError> {
    spawn_ground(commands, atlases, map);

    for name in ["HouseFloor", "HouseFurnitureBottom"] {
        for placement in map.tiles_of_layer(name)? {
            spawn_tile(
                commands,
                atlases,
                map,
                placement,
                Layer::HouseBottom,
                SpriteKind::Generic,
                false,
            );
        }
    }

    for name in ["HouseWalls", "HouseFurnitureTop"] {
        for placement in map.tiles_of_layer(name)? {
            spawn_tile(
                commands,
                atlases,
                map,
                placement,
                Layer::Main,
                SpriteKind::Generic,
                false,
            );
        }
    }

    for placement in map.tiles_of_layer("Fence")? {
        spawn_tile(
            commands,
            atlases,
            map,
            placement,
            Layer::Main,
            SpriteKind::Fence,
            true,
        );
    }

    for placement in map.tiles_of_layer("Water")? {
        spawn_water_tile(commands, atlases, map, placement)?;
    }

    let trees = map.objects_of_layer("Trees")?;
    for placement in trees {
        spawn_tree(commands, atlases, map, placement, rng);
    }

    let decoration = map.objects_of_layer("Decoration")?;
    for placement in decoration {
        spawn_wildflower(commands, atlases, map, placement);
    }

    let collision = map.tiles_of_layer("Collision")?;
    for placement in collision {
        spawn_collision_tile(commands, map, placement);
    }

    info!(
        "[World] Scene built: {} trees, {} decorations, {} collision tiles",
        trees.len(),
        decoration.len(),
        collision.len()
    );
    Ok(())
}
