//! Character sheet animation.
//!
//! character.png is a 4-column, 20-row grid: five blocks of four facing
//! rows (down, up, left, right), one block per status — walk, idle, hoe,
//! axe, watering can. Seed use has no rows of its own and shows idle.

use bevy::prelude::*;

use crate::shared::*;

pub const FRAMES_PER_ROW: usize = 4;
pub const SHEET_ROWS: usize = 20;

fn facing_row(facing: Facing) -> usize {
    match facing {
        Facing::Down => 0,
        Facing::Up => 1,
        Facing::Left => 2,
        Facing::Right => 3,
    }
}

/// Row in the sheet for a facing/mode pair. Tool mode picks the block for
/// the selected tool.
pub fn status_row(facing: Facing, mode: ActionMode, tool: ToolKind) -> usize {
    let block = match mode {
        ActionMode::Walk => 0,
        ActionMode::Idle | ActionMode::Seed => 1,
        ActionMode::Tool => match tool {
            ToolKind::Hoe => 2,
            ToolKind::Axe => 3,
            ToolKind::WateringCan => 4,
        },
    };
    block * 4 + facing_row(facing)
}

/// Advance a fractional frame at `rate` frames per second, wrapping by
/// modulo so any delta lands on a valid frame.
pub fn advance_frame(frame: f32, rate: f32, dt: f32, frames: usize) -> f32 {
    (frame + rate * dt) % frames as f32
}

/// Drives the player's atlas index from facing, mode, and the equipped
/// tool. The frame counter keeps running across status changes; action
/// starts reset it explicitly (see `tools::apply_input`).
pub fn animate_player(
    time: Res<Time>,
    equipment: Res<Equipment>,
    mut query: Query<(&PlayerMovement, &mut PlayerAnimation, &mut Sprite), With<Player>>,
) {
    let Ok((movement, mut animation, mut sprite)) = query.get_single_mut() else {
        return;
    };
    animation.frame = advance_frame(
        animation.frame,
        PLAYER_ANIM_RATE,
        time.delta_secs(),
        FRAMES_PER_ROW,
    );
    let row = status_row(movement.facing, movement.mode, equipment.selected_tool());
    if let Some(atlas) = &mut sprite.texture_atlas {
        atlas.index = row * FRAMES_PER_ROW + animation.frame as usize;
    }
}
