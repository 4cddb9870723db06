use glam::Vec3;

use crate::config::BoardConfig;
use crate::model::scene::{Group, Material, MeshNode, Shape};
use crate::view::RenderBackend;

/// Edge length of one tile in world units.
pub const TILE_SIZE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileColor {
    Light,
    Dark,
}

impl TileColor {
    /// Light iff `x + y` is even.
    pub fn at(x: u32, y: u32) -> Self {
        if (x + y) % 2 == 0 { TileColor::Light } else { TileColor::Dark }
    }

    pub fn rgba(self, palette: &BoardConfig) -> [f32; 4] {
        match self {
            TileColor::Light => palette.light_color,
            TileColor::Dark => palette.dark_color,
        }
    }
}

/// One cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    board_width: u32,
    board_height: u32,
}

impl Tile {
    pub fn color(&self) -> TileColor {
        TileColor::at(self.x, self.y)
    }

    /// Center of the tile with the whole board centered on the origin, z = 0.
    pub fn position(&self) -> Vec3 {
        Vec3::new(
            centered(self.x, self.board_width),
            centered(self.y, self.board_height),
            0.0,
        )
    }
}

fn centered(index: u32, count: u32) -> f32 {
    TILE_SIZE * index as f32 + TILE_SIZE / 2.0 - TILE_SIZE * count as f32 / 2.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    pub width: u32,
    pub height: u32,
}

impl Board {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn tile(&self, x: u32, y: u32) -> Option<Tile> {
        (x < self.width && y < self.height).then_some(Tile {
            x,
            y,
            board_width: self.width,
            board_height: self.height,
        })
    }

    /// Column-major: every row of column 0, then column 1, ...
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        (0..self.width).flat_map(move |x| (0..self.height).filter_map(move |y| self.tile(x, y)))
    }

    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build one unit plane per tile through `backend` and add them to `group`.
///
/// Each call appends a full set of tiles; call it once per group.
pub fn assemble_board<B: RenderBackend + ?Sized>(
    group: &mut Group,
    backend: &mut B,
    palette: &BoardConfig,
) {
    let board = Board::new(palette.width, palette.height);
    let shape = Shape::Plane { width: TILE_SIZE, height: TILE_SIZE };

    for tile in board.tiles() {
        let material = Material::Basic { color: tile.color().rgba(palette) };
        let primitive = backend.create_primitive(&shape, &material);
        group.add(MeshNode { primitive, position: tile.position() });
    }

    tracing::debug!(width = board.width, height = board.height, tiles = group.len(), "board assembled");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::recording::RecordingBackend;
    use std::collections::HashSet;

    fn palette(width: u32, height: u32) -> BoardConfig {
        BoardConfig { width, height, ..BoardConfig::default() }
    }

    #[test]
    fn test_color_follows_parity() {
        let board = Board::new(8, 8);
        for tile in board.tiles() {
            let expected = if (tile.x + tile.y) % 2 == 0 { TileColor::Light } else { TileColor::Dark };
            assert_eq!(tile.color(), expected, "tile ({}, {})", tile.x, tile.y);
        }
    }

    #[test]
    fn test_positions_are_centered() {
        let board = Board::new(5, 3);
        for tile in board.tiles() {
            let expected = Vec3::new(
                tile.x as f32 + 0.5 - 5.0 / 2.0,
                tile.y as f32 + 0.5 - 3.0 / 2.0,
                0.0,
            );
            assert_eq!(tile.position(), expected);
        }
    }

    #[test]
    fn test_corner_tiles_of_standard_board() {
        let board = Board::new(8, 8);

        let origin = board.tile(0, 0).unwrap();
        assert_eq!(origin.color(), TileColor::Light);
        assert_eq!(origin.position(), Vec3::new(-3.5, -3.5, 0.0));

        let far = board.tile(7, 7).unwrap();
        assert_eq!(far.color(), TileColor::Light);
        assert_eq!(far.position(), Vec3::new(3.5, 3.5, 0.0));

        let above = board.tile(0, 1).unwrap();
        assert_eq!(above.color(), TileColor::Dark);
        assert_eq!(above.position(), Vec3::new(-3.5, -2.5, 0.0));

        assert!(board.tile(8, 0).is_none());
        assert!(board.tile(0, 8).is_none());
    }

    #[test]
    fn test_assemble_creates_every_tile_once() {
        let mut backend = RecordingBackend::default();
        let mut group = Group::new("board");
        assemble_board(&mut group, &mut backend, &palette(8, 8));

        assert_eq!(group.len(), 64);
        assert_eq!(backend.primitives.len(), 64);

        let cells: HashSet<(i32, i32)> = group
            .nodes()
            .iter()
            .map(|n| ((n.position.x - 0.5) as i32 + 4, (n.position.y - 0.5) as i32 + 4))
            .collect();
        assert_eq!(cells.len(), 64);
        for x in 0..8 {
            for y in 0..8 {
                assert!(cells.contains(&(x, y)), "missing tile ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_assemble_uses_unit_planes_and_palette() {
        let mut backend = RecordingBackend::default();
        let mut group = Group::new("board");
        let palette = palette(2, 2);
        assemble_board(&mut group, &mut backend, &palette);

        let board = Board::new(2, 2);
        let placed = group.nodes().iter().zip(&backend.primitives);
        for (tile, (node, (shape, material))) in board.tiles().zip(placed) {
            assert_eq!(*shape, Shape::Plane { width: 1.0, height: 1.0 });
            assert_eq!(node.position, tile.position());
            let expected = if (tile.x + tile.y) % 2 == 0 { palette.light_color } else { palette.dark_color };
            assert_eq!(*material, Material::Basic { color: expected });
        }
    }

    #[test]
    fn test_degenerate_boards_are_empty() {
        for (w, h) in [(0, 8), (8, 0), (0, 0)] {
            let mut backend = RecordingBackend::default();
            let mut group = Group::new("board");
            assemble_board(&mut group, &mut backend, &palette(w, h));
            assert!(group.is_empty());
            assert!(backend.primitives.is_empty());
            assert!(Board::new(w, h).is_empty());
        }
    }
}
