//! Continuous movement with axis-separated collision resolution.

use bevy::prelude::*;

use crate::shared::*;

/// Moves the player through the obstacle set, one axis at a time.
///
/// Movement is continuous (sub-pixel at `speed` px/s); the collision box
/// lives on rounded pixel coordinates. After each axis the box is clamped
/// against every overlapping obstacle and the continuous position resynced
/// to the clamped box, so sliding along a wall keeps full speed on the
/// free axis and the player can never end a frame inside an obstacle.
pub fn player_movement(
    time: Res<Time>,
    obstacles: Query<(&LogicalPosition, &Hitbox), (With<Obstacle>, Without<Player>)>,
    mut query: Query<(&mut LogicalPosition, &Hitbox, &PlayerMovement), With<Player>>,
) {
    let Ok((mut position, hitbox, movement)) = query.get_single_mut() else {
        return;
    };
    let boxes: Vec<Rect> = obstacles
        .iter()
        .map(|(center, hitbox)| hitbox.rect_at(center.0))
        .collect();
    move_and_collide(
        &mut position.0,
        hitbox.size,
        movement.direction,
        movement.speed,
        time.delta_secs(),
        &boxes,
    );
}

/// One frame of axis-separated movement. The direction vector is
/// normalised here (zero stays zero), so diagonal travel covers the same
/// distance as cardinal travel.
pub fn move_and_collide(
    position: &mut Vec2,
    hitbox: Vec2,
    direction: Vec2,
    speed: f32,
    dt: f32,
    obstacles: &[Rect],
) {
    let dir = direction.normalize_or_zero();

    // Horizontal pass. The box snaps to whole pixels before testing.
    position.x += dir.x * speed * dt;
    let mut center_x = position.x.round();
    let center_y = position.y.round();
    for obstacle in obstacles {
        if !overlaps(Rect::from_center_size(Vec2::new(center_x, center_y), hitbox), *obstacle) {
            continue;
        }
        if dir.x > 0.0 {
            center_x = obstacle.min.x - hitbox.x / 2.0;
        } else if dir.x < 0.0 {
            center_x = obstacle.max.x + hitbox.x / 2.0;
        }
        position.x = center_x;
    }

    // Vertical pass, against the (possibly clamped) horizontal result.
    position.y += dir.y * speed * dt;
    let mut center_y = position.y.round();
    for obstacle in obstacles {
        if !overlaps(Rect::from_center_size(Vec2::new(center_x, center_y), hitbox), *obstacle) {
            continue;
        }
        if dir.y > 0.0 {
            center_y = obstacle.min.y - hitbox.y / 2.0;
        } else if dir.y < 0.0 {
            center_y = obstacle.max.y + hitbox.y / 2.0;
        }
        position.y = center_y;
    }
}

fn overlaps(a: Rect, b: Rect) -> bool {
    !a.intersect(b).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile_obstacle(center: Vec2) -> Rect {
        Rect::from_center_size(center, Vec2::splat(TILE_SIZE))
    }

    #[test]
    fn open_ground_moves_by_speed_times_dt() {
        let mut position = Vec2::new(100.0, 100.0);
        move_and_collide(&mut position, Vec2::new(66.0, 70.0), Vec2::X, 200.0, 0.1, &[]);
        assert_eq!(position, Vec2::new(120.0, 100.0));
    }

    #[test]
    fn zero_direction_does_not_move() {
        let mut position = Vec2::new(100.0, 100.0);
        move_and_collide(&mut position, Vec2::splat(32.0), Vec2::ZERO, 200.0, 0.1, &[]);
        assert_eq!(position, Vec2::new(100.0, 100.0));

        // A zero direction must not produce NaN through normalisation.
        assert!(position.x.is_finite() && position.y.is_finite());
    }

    #[test]
    fn direction_is_normalised_before_scaling() {
        // (3,4) normalises to (0.6, 0.8).
        let mut position = Vec2::ZERO;
        move_and_collide(&mut position, Vec2::splat(32.0), Vec2::new(3.0, 4.0), 5.0, 1.0, &[]);
        assert!((position.x - 3.0).abs() < 1e-4);
        assert!((position.y - 4.0).abs() < 1e-4);
    }

    #[test]
    fn diagonal_speed_matches_cardinal_speed() {
        let mut cardinal = Vec2::ZERO;
        move_and_collide(&mut cardinal, Vec2::splat(32.0), Vec2::X, 200.0, 0.5, &[]);

        let mut diagonal = Vec2::ZERO;
        move_and_collide(&mut diagonal, Vec2::splat(32.0), Vec2::ONE, 200.0, 0.5, &[]);

        let travelled = cardinal.length();
        assert!((diagonal.length() - travelled).abs() < 0.001);
    }

    #[test]
    fn moving_right_clamps_to_the_obstacle_left_edge() {
        let hitbox = Vec2::splat(32.0);
        let obstacle = tile_obstacle(Vec2::new(200.0, 0.0));
        let mut position = Vec2::new(140.0, 0.0);

        // 200 px/s for 0.2 s would land at x = 180, inside the tile.
        move_and_collide(&mut position, hitbox, Vec2::X, 200.0, 0.2, &[obstacle]);
        assert_eq!(position.x, obstacle.min.x - hitbox.x / 2.0);
        assert_eq!(position.y, 0.0);
    }

    #[test]
    fn moving_left_clamps_to_the_obstacle_right_edge() {
        let hitbox = Vec2::splat(32.0);
        let obstacle = tile_obstacle(Vec2::new(0.0, 0.0));
        let mut position = Vec2::new(64.0, 0.0);

        move_and_collide(&mut position, hitbox, Vec2::NEG_X, 400.0, 0.2, &[obstacle]);
        assert_eq!(position.x, obstacle.max.x + hitbox.x / 2.0);
    }

    #[test]
    fn vertical_clamps_mirror_horizontal() {
        let hitbox = Vec2::splat(32.0);
        let obstacle = tile_obstacle(Vec2::new(0.0, 200.0));

        let mut going_up = Vec2::new(0.0, 120.0);
        move_and_collide(&mut going_up, hitbox, Vec2::Y, 400.0, 0.2, &[obstacle]);
        assert_eq!(going_up.y, obstacle.min.y - hitbox.y / 2.0);

        let mut going_down = Vec2::new(0.0, 280.0);
        move_and_collide(&mut going_down, hitbox, Vec2::NEG_Y, 400.0, 0.2, &[obstacle]);
        assert_eq!(going_down.y, obstacle.max.y + hitbox.y / 2.0);
    }

    #[test]
    fn sliding_along_a_wall_keeps_the_free_axis() {
        // Wall directly to the right; input is up-right. The horizontal
        // axis clamps, the vertical axis keeps its full diagonal share.
        let hitbox = Vec2::splat(32.0);
        let obstacle = tile_obstacle(Vec2::new(64.0, 0.0));
        let mut position = Vec2::new(16.0, 0.0);

        move_and_collide(&mut position, hitbox, Vec2::ONE, 200.0, 0.1, &[obstacle]);
        assert_eq!(position.x, obstacle.min.x - hitbox.x / 2.0);
        let expected_dy = Vec2::ONE.normalize().y * 200.0 * 0.1;
        assert!((position.y - expected_dy).abs() < 0.5);
    }

    #[test]
    fn inner_corner_blocks_both_axes() {
        // An L of tiles to the right and above: pushing up-right pins the
        // player into the corner on both axes.
        let hitbox = Vec2::splat(32.0);
        let right = tile_obstacle(Vec2::new(64.0, 0.0));
        let above = tile_obstacle(Vec2::new(0.0, 64.0));
        let mut position = Vec2::new(8.0, 8.0);

        for _ in 0..10 {
            move_and_collide(&mut position, hitbox, Vec2::ONE, 200.0, 0.1, &[right, above]);
        }
        assert_eq!(position.x, right.min.x - hitbox.x / 2.0);
        assert_eq!(position.y, above.min.y - hitbox.y / 2.0);
    }

    #[test]
    fn touching_edges_do_not_collide() {
        // Box exactly flush against the obstacle: a shared edge has no
        // area, so movement parallel to it is unaffected.
        let hitbox = Vec2::splat(32.0);
        let obstacle = tile_obstacle(Vec2::new(48.0, 0.0));
        let mut position = Vec2::new(0.0, 0.0);

        move_and_collide(&mut position, hitbox, Vec2::Y, 100.0, 0.1, &[obstacle]);
        assert_eq!(position, Vec2::new(0.0, 10.0));
    }
}
