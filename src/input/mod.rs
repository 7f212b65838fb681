use bevy::prelude::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerInput>();
        app.add_systems(PreUpdate, read_input);
    }
}

/// Frame snapshot of player intent, decoupled from hardware keys.
/// Gameplay systems only ever read this resource.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerInput {
    /// Raw axes, each in {-1, 0, 1}. Not normalised here.
    pub direction: Vec2,
    pub tool_use: bool,
    pub tool_switch: bool,
    pub seed_use: bool,
    pub seed_switch: bool,
}

/// The single point where hardware input becomes game actions.
///
/// Each movement axis is an exclusive if/else chain: up wins over down and
/// left over right when both keys are held in the same frame. The axes are
/// read independently, so diagonals are still possible.
fn read_input(keys: Res<ButtonInput<KeyCode>>, mut input: ResMut<PlayerInput>) {
    let mut direction = Vec2::ZERO;
    if keys.pressed(KeyCode::ArrowUp) {
        direction.y = 1.0;
    } else if keys.pressed(KeyCode::ArrowDown) {
        direction.y = -1.0;
    }
    if keys.pressed(KeyCode::ArrowLeft) {
        direction.x = -1.0;
    } else if keys.pressed(KeyCode::ArrowRight) {
        direction.x = 1.0;
    }

    input.direction = direction;
    input.tool_use = keys.pressed(KeyCode::Space);
    input.tool_switch = keys.pressed(KeyCode::KeyQ);
    input.seed_use = keys.pressed(KeyCode::ControlLeft);
    input.seed_switch = keys.pressed(KeyCode::KeyE);
}
