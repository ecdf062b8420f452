//! Scrolling ground strip
//!
//! A row of grass tiles marching left. Each tile first walks off the left
//! edge, jumps back past the right edge and then loops over a span of
//! `playfield width + tile width` forever. Positions are a pure function of
//! the distance scrolled, so pausing is just not advancing.

use glam::Vec2;

use crate::consts::GRASS_SIZE;
use crate::host::{BodyShape, EntityHandle, EntityKind, SceneHost, Sprite};
use crate::size_vec;

/// Most tiles a strip will lay
pub const MAX_TILES: usize = 256;

/// Number of tiles needed to cover `field_w` while one is wrapping around.
/// Zero for a tile width that can't tile anything.
pub fn tile_count(field_w: f32, tile_w: f32) -> usize {
    if !(tile_w > 0.0 && tile_w.is_finite() && field_w.is_finite()) {
        return 0;
    }
    ((field_w.max(0.0) / tile_w).floor() as usize)
        .saturating_add(2)
        .min(MAX_TILES)
}

/// X of tile `index` after the strip scrolled `scrolled` units
pub fn tile_x(index: usize, scrolled: f32, field_w: f32, tile_w: f32) -> f32 {
    let left = -field_w / 2.0 - tile_w / 2.0;
    let span = field_w + tile_w;
    let first_leg = tile_w * (index as f32 + 1.0);
    if scrolled < first_leg {
        left + first_leg - scrolled
    } else {
        let p = (scrolled - first_leg).rem_euclid(span);
        left + span - p
    }
}

#[derive(Debug, Clone)]
pub struct GroundStrip {
    pub tiles: Vec<EntityHandle>,
    pub tile_size: Vec2,
    pub field_width: f32,
    pub y: f32,
    pub speed: f32,
    /// Distance scrolled so far
    pub scrolled: f32,
}

impl GroundStrip {
    /// Create the tiles in the scene
    pub fn lay(scene: &mut impl SceneHost, speed: f32, drop: f32) -> Self {
        let field = scene.playfield_size();
        let mut tile_size = scene.sprite_size(Sprite::Grass);
        if tile_count(field.x, tile_size.x) == 0 || !tile_size.y.is_finite() {
            log::warn!(
                "Grass sprite size {:?} can't tile the ground; using {:?}",
                tile_size,
                GRASS_SIZE
            );
            tile_size = size_vec(GRASS_SIZE);
        }
        let y = -field.y / 2.0 + tile_size.y / 2.0 - drop;

        let tiles = (0..tile_count(field.x, tile_size.x))
            .map(|i| {
                let x = tile_x(i, 0.0, field.x, tile_size.x);
                scene.create_entity(
                    Sprite::Grass,
                    BodyShape::Rect {
                        size: tile_size,
                        dynamic: false,
                    },
                    EntityKind::Ground,
                    Vec2::new(x, y),
                )
            })
            .collect::<Vec<_>>();
        log::debug!("Laid {} ground tiles", tiles.len());

        Self {
            tiles,
            tile_size,
            field_width: field.x,
            y,
            speed,
            scrolled: 0.0,
        }
    }

    /// Scroll by `dt` seconds and move the tiles
    pub fn advance(&mut self, dt: f32, scene: &mut impl SceneHost) {
        self.scrolled += self.speed * dt;

        // Keep `scrolled` small once every tile is in its steady loop
        let span = self.field_width + self.tile_size.x;
        let settled = self.tile_size.x * self.tiles.len() as f32;
        if self.scrolled > settled + span {
            self.scrolled = settled + (self.scrolled - settled).rem_euclid(span);
        }

        for (i, tile) in self.tiles.iter().enumerate() {
            scene.set_position(*tile, Vec2::new(self.tile_x(i), self.y));
        }
    }

    pub fn tile_x(&self, index: usize) -> f32 {
        tile_x(index, self.scrolled, self.field_width, self.tile_size.x)
    }

    /// Height the strip occupies above the bottom edge, for spawn placement
    pub fn height(&self) -> f32 {
        self.tile_size.y
    }
}
