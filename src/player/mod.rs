pub mod animation;
pub mod camera;
pub mod movement;
pub mod spawn;
pub mod tools;

use bevy::prelude::*;

use crate::shared::*;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        // -- Spawn player when we enter Playing --
        app.add_systems(OnEnter(GameState::Playing), spawn::spawn_player);

        // -- The per-frame pipeline. Order is load-bearing: intent is
        // -- sampled first, the mode derived from it, timers advanced
        // -- (emitting use events), then movement and presentation.
        app.add_systems(
            Update,
            (
                tools::apply_input,
                tools::resolve_mode,
                tools::tick_timers,
                movement::player_movement,
                animation::animate_player,
                camera::camera_follow_player,
            )
                .chain()
                .run_if(in_state(GameState::Playing)),
        );
    }
}
