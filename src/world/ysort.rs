use crate::shared::*;
use bevy::prelude::*;

/// Z for an entity on `layer` at vertical position `y`. Layer bands are
/// far apart and the Y term is small, so layer order always wins; within
/// a band, lower on screen means drawn later (in front).
pub fn depth_z(layer: Layer, y: f32) -> f32 {
    layer.z_base() - y * Z_Y_SORT_SCALE
}

/// Syncs LogicalPosition → Transform with pixel rounding and Y-sort Z.
/// Runs in PostUpdate AFTER all movement systems, so the render transform
/// is always one whole-pixel, depth-correct view of the logical state.
pub fn sync_position_and_ysort(
    mut query: Query<(&LogicalPosition, &Layer, &mut Transform)>,
) {
    for (logical_pos, layer, mut transform) in &mut query {
        transform.translation.x = logical_pos.0.x.round();
        transform.translation.y = logical_pos.0.y.round();
        transform.translation.z = depth_z(*layer, logical_pos.0.y);
    }
}
