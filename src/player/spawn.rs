use bevy::prelude::*;

use crate::shared::*;
use crate::world::WorldMapData;

use super::animation::{status_row, FRAMES_PER_ROW, SHEET_ROWS};

/// Spawn the player entity at the map's Start point.
/// Runs once on `OnEnter(GameState::Playing)`. Asset handles are optional
/// so the same system works headless, with a placeholder rectangle.
pub fn spawn_player(
    mut commands: Commands,
    map_data: Res<WorldMapData>,
    asset_server: Option<Res<AssetServer>>,
    layouts: Option<ResMut<Assets<TextureAtlasLayout>>>,
    existing: Query<Entity, With<Player>>,
) {
    // Guard: don't double-spawn if re-entering Playing.
    if !existing.is_empty() {
        return;
    }

    let start = map_data
        .def
        .player_start()
        .unwrap_or_else(|e| panic!("[Player] Cannot place player: {e}"));

    let idle_down = status_row(Facing::Down, ActionMode::Idle, ToolKind::Axe);
    let sprite = if let (Some(asset_server), Some(mut layouts)) = (asset_server, layouts) {
        let image = asset_server.load("character/character.png");
        let layout = layouts.add(TextureAtlasLayout::from_grid(
            UVec2::new(192, 192),
            FRAMES_PER_ROW as u32,
            SHEET_ROWS as u32,
            None,
            None,
        ));
        let mut sprite = Sprite::from_atlas_image(
            image,
            TextureAtlas {
                layout,
                index: idle_down * FRAMES_PER_ROW,
            },
        );
        sprite.custom_size = Some(PLAYER_FRAME_SIZE);
        sprite
    } else {
        Sprite {
            color: Color::srgb(0.2, 0.5, 0.8),
            custom_size: Some(PLAYER_FRAME_SIZE),
            ..default()
        }
    };

    info!("[Player] Spawned at {start}");
    commands.spawn((
        Player,
        PlayerMovement::default(),
        PlayerTimers::default(),
        PlayerAnimation::default(),
        LogicalPosition(start),
        Hitbox::shrunk(PLAYER_FRAME_SIZE, PLAYER_HITBOX_SHRINK),
        Layer::Main,
        SpriteKind::Player,
        sprite,
        Transform::from_translation(start.extend(Layer::Main.z_base())),
        Visibility::default(),
    ));
}
