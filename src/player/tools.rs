//! Intent, action locks, and equipment switching.
//!
//! `apply_input` is the only system that reads `PlayerInput`. While a use
//! lock is active the snapshot is ignored entirely, which is what freezes
//! the player mid-swing. Use completions surface as events from
//! `tick_timers`, aimed one tile ahead of wherever the player faces at
//! completion time.

use bevy::prelude::*;

use crate::input::PlayerInput;
use crate::shared::*;

/// Turns the frame's input snapshot into movement intent, facing, and
/// timer activations.
pub fn apply_input(
    input: Res<PlayerInput>,
    mut equipment: ResMut<Equipment>,
    mut query: Query<(&mut PlayerMovement, &mut PlayerTimers, &mut PlayerAnimation), With<Player>>,
) {
    let Ok((mut movement, mut timers, mut animation)) = query.get_single_mut() else {
        return;
    };

    // Mid-use the player is locked: no steering, no switching.
    if timers.tool_use.active() || timers.seed_use.active() {
        return;
    }

    movement.direction = input.direction;

    // Horizontal wins over vertical on diagonals; with no input at all the
    // previous facing is kept.
    if input.direction.x > 0.0 {
        movement.facing = Facing::Right;
    } else if input.direction.x < 0.0 {
        movement.facing = Facing::Left;
    } else if input.direction.y > 0.0 {
        movement.facing = Facing::Up;
    } else if input.direction.y < 0.0 {
        movement.facing = Facing::Down;
    }

    if input.tool_use {
        timers.tool_use.activate();
        movement.direction = Vec2::ZERO;
        animation.frame = 0.0;
    }
    if input.tool_switch && !timers.tool_switch.active() {
        timers.tool_switch.activate();
        equipment.cycle_tool();
        info!("[Player] Tool switched to {:?}", equipment.selected_tool());
    }

    if input.seed_use {
        timers.seed_use.activate();
        movement.direction = Vec2::ZERO;
        animation.frame = 0.0;
    }
    if input.seed_switch && !timers.seed_switch.active() {
        timers.seed_switch.activate();
        equipment.cycle_seed();
        info!("[Player] Seed switched to {:?}", equipment.selected_seed());
    }
}

/// Derives the action mode for this frame. Use locks take priority over
/// movement; a still player with no lock is idle.
pub fn resolve_mode(mut query: Query<(&mut PlayerMovement, &PlayerTimers), With<Player>>) {
    let Ok((mut movement, timers)) = query.get_single_mut() else {
        return;
    };
    movement.mode = if timers.tool_use.active() {
        ActionMode::Tool
    } else if timers.seed_use.active() {
        ActionMode::Seed
    } else if movement.direction == Vec2::ZERO {
        ActionMode::Idle
    } else {
        ActionMode::Walk
    };
}

/// Advances all four player timers. Use-lock completions become events
/// carrying the selected tool or seed and the world point one tile ahead
/// of the player.
pub fn tick_timers(
    time: Res<Time>,
    equipment: Res<Equipment>,
    mut query: Query<(&LogicalPosition, &PlayerMovement, &mut PlayerTimers), With<Player>>,
    mut tool_events: EventWriter<ToolUseEvent>,
    mut seed_events: EventWriter<SeedUseEvent>,
) {
    let Ok((position, movement, mut timers)) = query.get_single_mut() else {
        return;
    };
    let delta = time.delta();

    if timers.tool_use.tick(delta) {
        let target = position.0 + movement.facing.offset();
        info!("[Player] {:?} used at {target}", equipment.selected_tool());
        tool_events.send(ToolUseEvent {
            tool: equipment.selected_tool(),
            target,
        });
    }
    if timers.seed_use.tick(delta) {
        let target = position.0 + movement.facing.offset();
        info!("[Player] {:?} planted at {target}", equipment.selected_seed());
        seed_events.send(SeedUseEvent {
            seed: equipment.selected_seed(),
            target,
        });
    }
    timers.tool_switch.tick(delta);
    timers.seed_switch.tick(delta);
}
