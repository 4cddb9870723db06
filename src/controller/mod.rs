// CONTROLLER: Input, camera controls and the update loop
pub mod input;
pub mod orbit_controls;
pub mod frame_loop;
pub mod scene_host;

pub use input::{InputEvent, MouseButton};
pub use orbit_controls::OrbitControls;
pub use frame_loop::{FrameLoop, LoopHandle};
pub use scene_host::{SceneHost, BOARD_GROUP};
