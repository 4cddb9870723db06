// MODEL: Board geometry, camera and scene graph
pub mod board;
pub mod camera;
pub mod scene;

pub use board::{assemble_board, Board, Tile, TileColor, TILE_SIZE};
pub use camera::{PerspectiveCamera, Viewport};
pub use scene::{Group, Material, MeshNode, PrimitiveHandle, Scene, Shape};
