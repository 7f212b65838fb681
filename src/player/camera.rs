use bevy::prelude::*;

use crate::shared::*;

/// Offset that puts `actor_center` in the middle of a `viewport`-sized
/// screen. Subtract it from any world point to get screen space.
pub fn camera_offset(actor_center: Vec2, viewport: Vec2) -> Vec2 {
    actor_center - viewport / 2.0
}

pub fn world_to_screen(world: Vec2, offset: Vec2) -> Vec2 {
    world - offset
}

/// Keep the camera centered on the player, on whole pixels, with no
/// smoothing: the view tracks the player exactly, every frame. The
/// camera's own translation is the screen-center form of `camera_offset`.
pub fn camera_follow_player(
    player_query: Query<&LogicalPosition, (With<Player>, Without<Camera2d>)>,
    mut camera_query: Query<&mut Transform, (With<Camera2d>, Without<Player>)>,
) {
    let Ok(logical_pos) = player_query.get_single() else {
        return;
    };
    let Ok(mut cam_tf) = camera_query.get_single_mut() else {
        return;
    };
    cam_tf.translation.x = logical_pos.0.x.round();
    cam_tf.translation.y = logical_pos.0.y.round();
}
