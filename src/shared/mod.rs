//! Shared components, resources, events, and states for Willowvale.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly.

use bevy::prelude::*;
use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
}

// ═══════════════════════════════════════════════════════════════════════
// DEPTH LAYERS
// ═══════════════════════════════════════════════════════════════════════

/// Discrete rendering depth bucket. A higher layer always draws over a
/// lower one; within a layer, entities sort by vertical position (see
/// `world::ysort`).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Ground,
    HouseBottom,
    Main,
    Water,
    Fruit,
}

impl Layer {
    /// Base Z of this layer's band. Bands are `Z_LAYER_BAND` apart, and
    /// the Y-sort contribution (`y × Z_Y_SORT_SCALE`) stays well inside a
    /// band for any map under ~10 000 px tall, so layer order always
    /// dominates.
    pub fn z_base(self) -> f32 {
        match self {
            Layer::Ground => 0.0,
            Layer::HouseBottom => Z_LAYER_BAND,
            Layer::Main => Z_LAYER_BAND * 2.0,
            Layer::Water => Z_LAYER_BAND * 3.0,
            Layer::Fruit => Z_LAYER_BAND * 4.0,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SPATIAL COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

/// Authoritative continuous world position (entity center), sub-pixel.
/// The render `Transform` is a rounded, depth-assigned view of this,
/// synced once per frame in `PostUpdate`.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct LogicalPosition(pub Vec2);

/// Collision box size, always centered on the entity's logical position.
/// Derived from the visual sprite size at construction and never larger
/// than it, so the box stays inside the sprite rect with the same center.
#[derive(Component, Debug, Clone, Copy)]
pub struct Hitbox {
    pub size: Vec2,
}

impl Hitbox {
    /// Shrink a sprite size by a total per-axis amount (the box keeps the
    /// sprite's center). The shrink is clamped so the box never inverts.
    pub fn shrunk(sprite_size: Vec2, shrink: Vec2) -> Self {
        Self {
            size: (sprite_size - shrink).max(Vec2::ZERO),
        }
    }

    /// World-space box at a given center.
    pub fn rect_at(&self, center: Vec2) -> Rect {
        Rect::from_center_size(center, self.size)
    }
}

/// Marker: this entity blocks movement. Only entities carrying BOTH
/// `Obstacle` and `Hitbox` participate in collision resolution.
#[derive(Component, Debug, Default)]
pub struct Obstacle;

/// Explicit identity tag, assigned at construction.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    Generic,
    Fence,
    Water,
    WildFlower,
    Tree,
    Fruit,
    Player,
    CollisionTile,
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

impl Default for Facing {
    fn default() -> Self {
        Facing::Down
    }
}

impl Facing {
    /// World-space offset one tile ahead of the player, where tool and
    /// seed effects land.
    pub fn offset(self) -> Vec2 {
        match self {
            Facing::Up => Vec2::new(0.0, TILE_SIZE),
            Facing::Down => Vec2::new(0.0, -TILE_SIZE),
            Facing::Left => Vec2::new(-TILE_SIZE, 0.0),
            Facing::Right => Vec2::new(TILE_SIZE, 0.0),
        }
    }
}

/// What the player is currently doing. Combined with `Facing` this selects
/// the animation row (seed use has no dedicated rows and displays idle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActionMode {
    #[default]
    Idle,
    Walk,
    Tool,
    Seed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Axe,
    Hoe,
    WateringCan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeedKind {
    Corn,
    Tomato,
}

#[derive(Component, Debug, Clone, Default)]
pub struct Player;

#[derive(Component, Debug, Clone)]
pub struct PlayerMovement {
    /// Raw directional input, each axis in {-1, 0, 1}. Normalised only
    /// when applied, so diagonal speed equals cardinal speed.
    pub direction: Vec2,
    pub facing: Facing,
    pub mode: ActionMode,
    pub speed: f32,
}

impl Default for PlayerMovement {
    fn default() -> Self {
        Self {
            direction: Vec2::ZERO,
            facing: Facing::Down,
            mode: ActionMode::Idle,
            speed: PLAYER_SPEED,
        }
    }
}

/// The player's named one-shot timers: use-locks and switch-cooldowns.
#[derive(Component, Debug, Clone)]
pub struct PlayerTimers {
    pub tool_use: CountdownTimer,
    pub tool_switch: CountdownTimer,
    pub seed_use: CountdownTimer,
    pub seed_switch: CountdownTimer,
}

impl Default for PlayerTimers {
    fn default() -> Self {
        Self {
            tool_use: CountdownTimer::new(TOOL_USE_SECS),
            tool_switch: CountdownTimer::new(SWITCH_COOLDOWN_SECS),
            seed_use: CountdownTimer::new(TOOL_USE_SECS),
            seed_switch: CountdownTimer::new(SWITCH_COOLDOWN_SECS),
        }
    }
}

/// Fractional animation frame within the current status row.
#[derive(Component, Debug, Clone, Default)]
pub struct PlayerAnimation {
    pub frame: f32,
}

// ═══════════════════════════════════════════════════════════════════════
// EQUIPMENT — selection state, read by the HUD overlay
// ═══════════════════════════════════════════════════════════════════════

/// The ordered list of tools for cycling with Q.
pub const TOOL_ORDER: [ToolKind; 3] = [ToolKind::Axe, ToolKind::Hoe, ToolKind::WateringCan];

/// The ordered list of seeds for cycling with E.
pub const SEED_ORDER: [SeedKind; 2] = [SeedKind::Corn, SeedKind::Tomato];

/// Currently selected tool and seed. Only the player domain mutates it.
#[derive(Resource, Debug, Clone, Default)]
pub struct Equipment {
    pub tool_index: usize,
    pub seed_index: usize,
}

impl Equipment {
    pub fn selected_tool(&self) -> ToolKind {
        TOOL_ORDER[self.tool_index]
    }

    pub fn selected_seed(&self) -> SeedKind {
        SEED_ORDER[self.seed_index]
    }

    pub fn cycle_tool(&mut self) {
        self.tool_index = (self.tool_index + 1) % TOOL_ORDER.len();
    }

    pub fn cycle_seed(&mut self) {
        self.seed_index = (self.seed_index + 1) % SEED_ORDER.len();
    }
}

// ═══════════════════════════════════════════════════════════════════════
// COUNTDOWN TIMER
// ═══════════════════════════════════════════════════════════════════════

/// Single-shot countdown polled once per frame.
///
/// Created inactive; `activate` is an idempotent restart; `deactivate`
/// stops it without completing. `tick` reports the completion edge exactly
/// once per activation and is a no-op while inactive. Completion side
/// effects are expressed as events sent by whichever system observed the
/// edge, rather than a stored callback.
#[derive(Debug, Clone)]
pub struct CountdownTimer {
    timer: Timer,
    active: bool,
}

impl CountdownTimer {
    pub fn new(seconds: f32) -> Self {
        Self {
            timer: Timer::from_seconds(seconds, TimerMode::Once),
            active: false,
        }
    }

    pub fn activate(&mut self) {
        self.timer.reset();
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn active(&self) -> bool {
        self.active
    }

    /// Advance the countdown. Returns `true` only on the tick where the
    /// full duration elapses; the timer deactivates itself on that tick.
    pub fn tick(&mut self, delta: Duration) -> bool {
        if !self.active {
            return false;
        }
        self.timer.tick(delta);
        if self.timer.finished() {
            self.active = false;
            true
        } else {
            false
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

/// Sent when the tool-use lock completes. `target` is the world point one
/// tile ahead of the player at completion time. Consumers apply the
/// tool's world effect (the world domain reacts to axe hits on trees).
#[derive(Event, Debug, Clone)]
pub struct ToolUseEvent {
    pub tool: ToolKind,
    pub target: Vec2,
}

/// Sent when the seed-use lock completes. Soil and planting live outside
/// the core loop; this event is their integration point.
#[derive(Event, Debug, Clone)]
pub struct SeedUseEvent {
    pub seed: SeedKind,
    pub target: Vec2,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const TILE_SIZE: f32 = 64.0;
pub const SCREEN_WIDTH: f32 = 1280.0;
pub const SCREEN_HEIGHT: f32 = 720.0;

pub const PLAYER_SPEED: f32 = 200.0;
/// Player walk/idle/tool animation rate, frames per second.
pub const PLAYER_ANIM_RATE: f32 = 4.0;
/// Water ripple animation rate, frames per second.
pub const WATER_ANIM_RATE: f32 = 5.0;

pub const TOOL_USE_SECS: f32 = 0.35;
pub const SWITCH_COOLDOWN_SECS: f32 = 0.2;
pub const TREE_INVULN_SECS: f32 = 0.2;

/// Character sheet frame size. The frame is much larger than the body to
/// leave room for tool swings.
pub const PLAYER_FRAME_SIZE: Vec2 = Vec2::new(192.0, 192.0);
/// Total shrink applied to the frame to get the player's body hitbox.
pub const PLAYER_HITBOX_SHRINK: Vec2 = Vec2::new(126.0, 70.0);

/// Z distance between adjacent layer bands.
pub const Z_LAYER_BAND: f32 = 100.0;
/// How strongly vertical position biases Z within a band.
pub const Z_Y_SORT_SCALE: f32 = 0.01;

// ═══════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_completion_edge_fires_exactly_once() {
        let mut timer = CountdownTimer::new(0.2);
        timer.activate();

        let mut fires = 0;
        for _ in 0..10 {
            if timer.tick(Duration::from_millis(100)) {
                fires += 1;
            }
        }
        assert_eq!(fires, 1, "completion edge must fire once, not per tick");
        assert!(!timer.active());
    }

    #[test]
    fn countdown_tick_while_inactive_is_noop() {
        let mut timer = CountdownTimer::new(0.1);
        assert!(!timer.tick(Duration::from_secs(1)));
        assert!(!timer.active());
    }

    #[test]
    fn countdown_deactivate_suppresses_completion() {
        let mut timer = CountdownTimer::new(0.1);
        timer.activate();
        timer.deactivate();
        assert!(!timer.tick(Duration::from_secs(1)));
    }

    #[test]
    fn countdown_activate_restarts() {
        let mut timer = CountdownTimer::new(0.2);
        timer.activate();
        assert!(!timer.tick(Duration::from_millis(150)));
        // Restart before completion: the next 150 ms must not complete it.
        timer.activate();
        assert!(!timer.tick(Duration::from_millis(150)));
        assert!(timer.tick(Duration::from_millis(100)));
    }

    #[test]
    fn hitbox_stays_inside_sprite_with_same_center() {
        let sprite = Vec2::new(64.0, 64.0);
        let hitbox = Hitbox::shrunk(sprite, Vec2::new(sprite.x * 0.2, sprite.y * 0.75));
        assert!((hitbox.size.x - 51.2).abs() < 1e-4);
        assert!((hitbox.size.y - 16.0).abs() < 1e-4);

        let center = Vec2::new(100.0, 200.0);
        let sprite_rect = Rect::from_center_size(center, sprite);
        let box_rect = hitbox.rect_at(center);
        assert_eq!(box_rect.center(), sprite_rect.center());
        assert!(sprite_rect.contains(box_rect.min));
        assert!(sprite_rect.contains(box_rect.max));
    }

    #[test]
    fn hitbox_shrink_never_inverts() {
        let hitbox = Hitbox::shrunk(Vec2::new(10.0, 10.0), Vec2::new(20.0, 5.0));
        assert_eq!(hitbox.size, Vec2::new(0.0, 5.0));
    }

    #[test]
    fn equipment_cycles_wrap() {
        let mut equipment = Equipment::default();
        assert_eq!(equipment.selected_tool(), ToolKind::Axe);
        for _ in 0..TOOL_ORDER.len() {
            equipment.cycle_tool();
        }
        assert_eq!(equipment.selected_tool(), ToolKind::Axe);

        equipment.cycle_seed();
        assert_eq!(equipment.selected_seed(), SeedKind::Tomato);
        equipment.cycle_seed();
        assert_eq!(equipment.selected_seed(), SeedKind::Corn);
    }

    #[test]
    fn layer_order_is_total_and_ascending() {
        let layers = [
            Layer::Ground,
            Layer::HouseBottom,
            Layer::Main,
            Layer::Water,
            Layer::Fruit,
        ];
        for pair in layers.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].z_base() < pair[1].z_base());
        }
    }
}
