//! Map data for the farm scene.
//!
//! A map is a set of named tile layers (grid-aligned) and named object
//! layers (free pixel placements). Layer names are the setup contract:
//! `world::setup` asks for each name it knows and treats a missing one as
//! a fatal configuration error. Maps load from RON on disk, with a
//! compiled-in demo farm as fallback so the game always boots.
//!
//! Map space is top-left-origin with y growing downward, the convention
//! of every tile editor. `map_to_world` converts to world space (y up)
//! exactly once, at spawn time.

use crate::shared::*;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Complete definition of a game map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDef {
    /// Size in tiles.
    pub width: u32,
    pub height: u32,
    pub tile_layers: Vec<TileLayer>,
    pub object_layers: Vec<ObjectLayer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileLayer {
    pub name: String,
    pub tiles: Vec<TilePlacement>,
}

/// One tile: grid position plus an index into the tileset atlas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TilePlacement {
    pub x: u32,
    pub y: u32,
    pub tile: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectLayer {
    pub name: String,
    pub objects: Vec<ObjectPlacement>,
}

/// One free-placed object: pixel top-left corner in map space, plus the
/// name the spawner dispatches on ("Small"/"Large" for trees, "Start"
/// for the player).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectPlacement {
    pub x: f32,
    pub y: f32,
    pub name: String,
}

impl MapDef {
    pub fn from_ron(text: &str) -> Result<Self, WorldSetupError> {
        ron::from_str(text).map_err(|e| WorldSetupError::BadMapData(e.to_string()))
    }

    pub fn tiles_of_layer(&self, name: &str) -> Result<&[TilePlacement], WorldSetupError> {
        self.tile_layers
            .iter()
            .find(|layer| layer.name == name)
            .map(|layer| layer.tiles.as_slice())
            .ok_or_else(|| WorldSetupError::MissingLayer(name.to_string()))
    }

    pub fn objects_of_layer(&self, name: &str) -> Result<&[ObjectPlacement], WorldSetupError> {
        self.object_layers
            .iter()
            .find(|layer| layer.name == name)
            .map(|layer| layer.objects.as_slice())
            .ok_or_else(|| WorldSetupError::MissingLayer(name.to_string()))
    }

    /// The player spawn point, in world space.
    pub fn player_start(&self) -> Result<Vec2, WorldSetupError> {
        let start = self
            .objects_of_layer("Player")?
            .iter()
            .find(|object| object.name == "Start")
            .ok_or_else(|| WorldSetupError::MissingObject {
                layer: "Player".to_string(),
                name: "Start".to_string(),
            })?;
        Ok(self.map_to_world(Vec2::new(start.x, start.y)))
    }

    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(self.width as f32 * TILE_SIZE, self.height as f32 * TILE_SIZE)
    }

    /// Map space (top-left origin, y down) to world space (y up). World x
    /// keeps map x, so world space spans [0, w] × [0, h] in pixels.
    pub fn map_to_world(&self, point: Vec2) -> Vec2 {
        Vec2::new(point.x, self.pixel_size().y - point.y)
    }

    /// World center of a tile at grid position (x, y).
    pub fn tile_center(&self, x: u32, y: u32) -> Vec2 {
        let top_left = Vec2::new(x as f32 * TILE_SIZE, y as f32 * TILE_SIZE);
        self.map_to_world(top_left + Vec2::splat(TILE_SIZE / 2.0))
    }
}

/// Fatal problems with map data or world construction. Setup aborts on
/// these rather than limping along with a half-built scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldSetupError {
    MissingLayer(String),
    MissingObject { layer: String, name: String },
    BadMapData(String),
    EmptyAnimation(&'static str),
}

impl fmt::Display for WorldSetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldSetupError::MissingLayer(name) => {
                write!(f, "map is missing required layer '{name}'")
            }
            WorldSetupError::MissingObject { layer, name } => {
                write!(f, "layer '{layer}' has no object named '{name}'")
            }
            WorldSetupError::BadMapData(detail) => write!(f, "malformed map data: {detail}"),
            WorldSetupError::EmptyAnimation(what) => {
                write!(f, "{what} must have at least one frame")
            }
        }
    }
}

impl std::error::Error for WorldSetupError {}

// ═══════════════════════════════════════════════════════════════════════
// DEMO FARM — compiled-in fallback map
// ═══════════════════════════════════════════════════════════════════════

// Tileset atlas indices for the demo farm.
const TILE_FLOOR: u32 = 0;
const TILE_WALL: u32 = 1;
const TILE_RUG: u32 = 2;
const TILE_SHELF: u32 = 3;
const TILE_FENCE: u32 = 4;
const TILE_WATER: u32 = 0;

/// 30x20 tile farm: house top-left, fenced field center, pond on the
/// right, tree line along the top, collision ring on the border.
pub fn demo_farm() -> MapDef {
    let mut house_floor = Vec::new();
    let mut furniture_bottom = Vec::new();
    let mut house_walls = Vec::new();
    let mut furniture_top = Vec::new();
    let mut fence = Vec::new();
    let mut water = Vec::new();
    let mut collision = Vec::new();

    let fill_rect = |tiles: &mut Vec<TilePlacement>, x0: u32, y0: u32, w: u32, h: u32, tile: u32| {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                tiles.push(TilePlacement { x, y, tile });
            }
        }
    };

    // House interior (top-left), walls on the perimeter
    fill_rect(&mut house_floor, 4, 3, 6, 4, TILE_FLOOR);
    fill_rect(&mut furniture_bottom, 5, 5, 2, 1, TILE_RUG);
    for x in 3..11 {
        house_walls.push(TilePlacement { x, y: 2, tile: TILE_WALL });
    }
    for y in 3..7 {
        house_walls.push(TilePlacement { x: 3, y, tile: TILE_WALL });
        house_walls.push(TilePlacement { x: 10, y, tile: TILE_WALL });
    }
    fill_rect(&mut furniture_top, 8, 3, 2, 1, TILE_SHELF);

    // Fenced field in the center, with a gap at the bottom for entry
    for x in 13..22 {
        fence.push(TilePlacement { x, y: 8, tile: TILE_FENCE });
    }
    for y in 9..13 {
        fence.push(TilePlacement { x: 13, y, tile: TILE_FENCE });
        fence.push(TilePlacement { x: 21, y, tile: TILE_FENCE });
    }
    for x in 13..17 {
        fence.push(TilePlacement { x, y: 13, tile: TILE_FENCE });
    }

    // Pond on the right
    fill_rect(&mut water, 24, 13, 4, 4, TILE_WATER);

    // Impassable map border
    for x in 0..30 {
        collision.push(TilePlacement { x, y: 0, tile: 0 });
        collision.push(TilePlacement { x, y: 19, tile: 0 });
    }
    for y in 1..19 {
        collision.push(TilePlacement { x: 0, y, tile: 0 });
        collision.push(TilePlacement { x: 29, y, tile: 0 });
    }

    // Tree line along the top, one pair near the pond
    let trees = vec![
        object(832.0, 96.0, "Large"),
        object(1088.0, 128.0, "Small"),
        object(1344.0, 96.0, "Large"),
        object(1600.0, 160.0, "Small"),
        object(1472.0, 704.0, "Large"),
    ];

    let decoration = vec![
        object(352.0, 576.0, "WildFlower"),
        object(736.0, 896.0, "WildFlower"),
        object(1216.0, 960.0, "WildFlower"),
    ];

    let player = vec![object(1120.0, 640.0, "Start")];

    MapDef {
        width: 30,
        height: 20,
        tile_layers: vec![
            layer("HouseFloor", house_floor),
            layer("HouseFurnitureBottom", furniture_bottom),
            layer("HouseWalls", house_walls),
            layer("HouseFurnitureTop", furniture_top),
            layer("Fence", fence),
            layer("Water", water),
            layer("Collision", collision),
        ],
        object_layers: vec![
            ObjectLayer { name: "Trees".to_string(), objects: trees },
            ObjectLayer { name: "Decoration".to_string(), objects: decoration },
            ObjectLayer { name: "Player".to_string(), objects: player },
        ],
    }
}

fn layer(name: &str, tiles: Vec<TilePlacement>) -> TileLayer {
    TileLayer { name: name.to_string(), tiles }
}

fn object(x: f32, y: f32, name: &str) -> ObjectPlacement {
    ObjectPlacement { x, y, name: name.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_farm_has_every_required_layer() {
        let map = demo_farm();
        for name in [
            "HouseFloor",
            "HouseFurnitureBottom",
            "HouseWalls",
            "HouseFurnitureTop",
            "Fence",
            "Water",
            "Collision",
        ] {
            assert!(map.tiles_of_layer(name).is_ok(), "missing tile layer {name}");
        }
        for name in ["Trees", "Decoration", "Player"] {
            assert!(map.objects_of_layer(name).is_ok(), "missing object layer {name}");
        }
        assert!(map.player_start().is_ok());
    }

    #[test]
    fn missing_layer_error_names_the_layer() {
        let map = demo_farm();
        let err = map.tiles_of_layer("Lava").unwrap_err();
        assert_eq!(err, WorldSetupError::MissingLayer("Lava".to_string()));
        assert!(err.to_string().contains("Lava"));
    }

    #[test]
    fn missing_start_object_is_an_error() {
        let mut map = demo_farm();
        map.object_layers
            .iter_mut()
            .find(|layer| layer.name == "Player")
            .unwrap()
            .objects
            .clear();
        assert_eq!(
            map.player_start().unwrap_err(),
            WorldSetupError::MissingObject {
                layer: "Player".to_string(),
                name: "Start".to_string(),
            }
        );
    }

    #[test]
    fn map_to_world_flips_the_vertical_axis() {
        let map = demo_farm();
        let height = map.pixel_size().y;
        assert_eq!(map.map_to_world(Vec2::ZERO), Vec2::new(0.0, height));
        assert_eq!(
            map.map_to_world(Vec2::new(100.0, height)),
            Vec2::new(100.0, 0.0)
        );
        // Top-left tile in map space is the topmost tile in world space.
        assert_eq!(
            map.tile_center(0, 0),
            Vec2::new(TILE_SIZE / 2.0, height - TILE_SIZE / 2.0)
        );
    }

    #[test]
    fn ron_round_trips_a_map() {
        let text = r#"(
            width: 2,
            height: 2,
            tile_layers: [
                (name: "Fence", tiles: [(x: 0, y: 1, tile: 4)]),
            ],
            object_layers: [
                (name: "Player", objects: [(x: 64.0, y: 64.0, name: "Start")]),
            ],
        )"#;
        let map = MapDef::from_ron(text).unwrap();
        assert_eq!(map.width, 2);
        assert_eq!(map.tiles_of_layer("Fence").unwrap().len(), 1);
        assert_eq!(map.player_start().unwrap(), Vec2::new(64.0, 64.0));
    }

    #[test]
    fn malformed_ron_is_reported_not_panicked() {
        assert!(matches!(
            MapDef::from_ron("(width: \"oops\")"),
            Err(WorldSetupError::BadMapData(_))
        ));
    }
}
