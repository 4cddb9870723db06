use glam::Vec3;

use crate::config::SceneConfig;
use crate::controller::input::InputEvent;
use crate::controller::orbit_controls::OrbitControls;
use crate::error::SceneError;
use crate::model::{assemble_board, Group, PerspectiveCamera, Scene, Viewport};
use crate::view::RenderBackend;

pub const BOARD_GROUP: &str = "board";

/// Owns the scene, camera, renderer and orbit controls for one surface.
///
/// Construction builds the whole scene. The platform shell then calls
/// [`SceneHost::frame`] once per display refresh and [`SceneHost::resize`]
/// whenever the viewport changes.
pub struct SceneHost<B: RenderBackend> {
    scene: Scene,
    camera: PerspectiveCamera,
    renderer: B,
    controls: OrbitControls,
    viewport: Viewport,
}

impl<B: RenderBackend> SceneHost<B> {
    /// `renderer` must already be bound to the drawable surface.
    pub fn new(mut renderer: B, viewport: Viewport, config: &SceneConfig) -> Self {
        let mut scene = Scene::new();
        let mut camera = PerspectiveCamera::new(&config.camera, viewport.width, viewport.height);
        renderer.set_size(viewport.width, viewport.height);

        let controls = OrbitControls::new(&config.orbit);

        camera.eye = Vec3::new(0.0, 0.0, config.camera.distance);
        camera.look_at(controls.target);

        let mut board = Group::new(BOARD_GROUP);
        assemble_board(&mut board, &mut renderer, &config.board);
        scene.add(board);

        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            tiles = scene.node_count(),
            "scene initialized"
        );

        Self { scene, camera, renderer, controls, viewport }
    }

    /// One render-loop iteration: step the orbit controls, then draw.
    pub fn frame(&mut self) -> Result<(), SceneError> {
        self.controls.update(&mut self.camera);
        self.renderer.render(&self.scene, &self.camera)
    }

    /// Match camera projection and output buffer to a new viewport.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            tracing::debug!(?viewport, "ignoring resize to empty viewport");
            return;
        }
        self.viewport = viewport;
        self.camera.set_aspect(viewport.width, viewport.height);
        self.camera.update_projection_matrix();
        self.renderer.set_size(viewport.width, viewport.height);
    }

    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        self.controls.handle_input(event, &self.camera, self.viewport)
    }

    pub fn scene(&self) -> &Scene { &self.scene }

    pub fn camera(&self) -> &PerspectiveCamera { &self.camera }

    pub fn controls(&self) -> &OrbitControls { &self.controls }

    pub fn renderer(&self) -> &B { &self.renderer }

    pub fn viewport(&self) -> Viewport { self.viewport }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoardConfig;
    use crate::controller::frame_loop::FrameLoop;
    use crate::controller::input::MouseButton;
    use crate::view::recording::{Call, RecordingBackend};
    use std::cell::RefCell;
    use std::ops::ControlFlow;
    use std::rc::Rc;

    fn host() -> SceneHost<RecordingBackend> {
        SceneHost::new(RecordingBackend::default(), Viewport::new(800, 600), &SceneConfig::default())
    }

    #[test]
    fn test_initialization() {
        let host = host();

        // Renderer is sized before any tile is built.
        assert_eq!(host.renderer().calls.first(), Some(&Call::SetSize(800, 600)));
        assert_eq!(host.renderer().calls.iter().filter(|c| **c == Call::CreatePrimitive).count(), 64);
        assert!(!host.renderer().calls.contains(&Call::Render));

        assert_eq!(host.camera().eye, Vec3::new(0.0, 0.0, 7.0));
        assert_eq!(host.camera().target, Vec3::ZERO);
        assert_eq!(host.camera().aspect, 800.0 / 600.0);
        assert_eq!(host.camera().fov_y, 75f32.to_radians());
        assert_eq!(host.camera().z_near, 0.1);
        assert_eq!(host.camera().z_far, 1000.0);

        let controls = host.controls();
        assert!(controls.enable_damping);
        assert_eq!(controls.damping_factor, 0.005);
        assert!(!controls.enable_pan);
        assert!(!controls.enable_zoom);

        let board = host.scene().group(BOARD_GROUP).expect("board group");
        assert_eq!(board.len(), 64);
        assert_eq!(host.scene().groups().len(), 1);
    }

    #[test]
    fn test_frame_renders_whole_board() {
        let mut host = host();
        host.frame().unwrap();
        host.frame().unwrap();

        let frames = &host.renderer().frames;
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.nodes == 64));
        assert!((frames[1].eye - Vec3::new(0.0, 0.0, 7.0)).length() < 1e-5);
    }

    #[test]
    fn test_resize_updates_camera_and_renderer() {
        let mut host = host();
        let before = host.camera().projection();

        host.resize(Viewport::new(1600, 900));
        assert_eq!(host.camera().aspect, 1600.0 / 900.0);
        assert_eq!(host.renderer().size, (1600, 900));
        assert_ne!(host.camera().projection(), before);

        let projection = host.camera().projection();
        host.resize(Viewport::new(1600, 900));
        assert_eq!(host.camera().aspect, 1600.0 / 900.0);
        assert_eq!(host.camera().projection(), projection);
        assert_eq!(host.renderer().size, (1600, 900));
        assert_eq!(host.viewport(), Viewport::new(1600, 900));
    }

    #[test]
    fn test_resize_to_empty_viewport_is_ignored() {
        let mut host = host();
        host.resize(Viewport::new(0, 600));
        assert_eq!(host.viewport(), Viewport::new(800, 600));
        assert_eq!(host.renderer().size, (800, 600));
        assert_eq!(host.camera().aspect, 800.0 / 600.0);
    }

    #[test]
    fn test_empty_board_is_valid_scene() {
        let config = SceneConfig {
            board: BoardConfig { width: 0, ..BoardConfig::default() },
            ..SceneConfig::default()
        };
        let mut host = SceneHost::new(RecordingBackend::default(), Viewport::new(800, 600), &config);
        assert!(host.scene().group(BOARD_GROUP).is_some_and(Group::is_empty));
        host.frame().unwrap();
        assert_eq!(host.renderer().frames[0].nodes, 0);
    }

    #[test]
    fn test_drag_orbits_camera_across_frames() {
        let mut host = host();
        assert!(host.handle_input(&InputEvent::PointerDown { button: MouseButton::Left, x: 400.0, y: 300.0 }));
        assert!(host.handle_input(&InputEvent::PointerMove { x: 460.0, y: 300.0 }));
        assert!(host.handle_input(&InputEvent::PointerUp { button: MouseButton::Left }));

        host.frame().unwrap();
        host.frame().unwrap();
        let frames = &host.renderer().frames;
        // Dragging right swings the camera toward -X.
        assert!(frames[0].eye.x < 0.0);
        assert!(frames[1].eye.x < frames[0].eye.x);
        assert!((frames[1].eye.length() - 7.0).abs() < 1e-4);
    }

    #[test]
    fn test_frame_loop_drives_host_until_stopped() {
        let host = Rc::new(RefCell::new(host()));
        let mut frame_loop = FrameLoop::new({
            let host = host.clone();
            move || {
                host.borrow_mut().frame().expect("recording backend never fails");
                ControlFlow::Continue(())
            }
        });
        let handle = frame_loop.handle();

        assert_eq!(frame_loop.run_frames(3), 3);
        host.borrow_mut().resize(Viewport::new(1600, 900));
        handle.stop();
        assert_eq!(frame_loop.run_frames(3), 0);

        let host = host.borrow();
        assert_eq!(host.renderer().frames.len(), 3);
        assert_eq!(handle.frames(), 3);
    }
}
