use std::cell::RefCell;
use std::error::Error;
use std::ops::ControlFlow;
use std::rc::Rc;
use std::sync::Arc;

use winit::{
    event::*,
    event_loop::EventLoop,
    window::Window,
};

use checkerboard::{
    logging,
    controller::{FrameLoop, InputEvent, MouseButton, SceneHost},
    model::Viewport,
    view::{GpuContext, WgpuRenderer},
    SceneConfig,
};

/// Lines scrolled by one wheel notch, in DOM pixels.
const LINE_HEIGHT_PX: f32 = 100.0;

type Host = Rc<RefCell<SceneHost<WgpuRenderer>>>;

struct App {
    window: Arc<Window>,
    host: Host,
    frame_loop: FrameLoop,
    cursor: (f32, f32),
}

impl App {
    async fn new(window: Arc<Window>) -> Result<Self, checkerboard::SceneError> {
        let size = window.inner_size();
        let viewport = Viewport::new(size.width, size.height);
        let config = SceneConfig::default();

        let gpu = GpuContext::new_native(window.clone(), size.width, size.height).await?;
        let renderer = WgpuRenderer::new(gpu, &config.render);
        let host = Rc::new(RefCell::new(SceneHost::new(renderer, viewport, &config)));

        let frame_loop = FrameLoop::new({
            let host = host.clone();
            move || match host.borrow_mut().frame() {
                Ok(()) => ControlFlow::Continue(()),
                Err(e) => {
                    tracing::error!("render failed: {e}");
                    ControlFlow::Break(())
                }
            }
        });

        Ok(Self { window, host, frame_loop, cursor: (0.0, 0.0) })
    }

    /// Translate a window event into orbit input. Returns whether it was consumed.
    fn input(&mut self, event: &WindowEvent) -> bool {
        let input = match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
                InputEvent::PointerMove { x: self.cursor.0, y: self.cursor.1 }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(button) = map_button(*button) else { return false };
                match state {
                    ElementState::Pressed => InputEvent::PointerDown { button, x: self.cursor.0, y: self.cursor.1 },
                    ElementState::Released => InputEvent::PointerUp { button },
                }
            }
            // winit reports scrolling up as positive, the DOM as negative.
            WindowEvent::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(_, y) => InputEvent::Wheel { delta_y: -y * LINE_HEIGHT_PX },
                MouseScrollDelta::PixelDelta(p) => InputEvent::Wheel { delta_y: -p.y as f32 },
            },
            WindowEvent::Focused(false) => InputEvent::PointerCancel,
            _ => return false,
        };
        self.host.borrow_mut().handle_input(&input)
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.host.borrow_mut().resize(Viewport::new(new_size.width, new_size.height));
    }
}

fn map_button(button: winit::event::MouseButton) -> Option<MouseButton> {
    match button {
        winit::event::MouseButton::Left => Some(MouseButton::Left),
        winit::event::MouseButton::Right => Some(MouseButton::Right),
        winit::event::MouseButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title("Checkerboard")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    let window = Arc::new(event_loop.create_window(window_attributes)?);

    let mut app = pollster::block_on(App::new(window.clone()))?;

    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window.id() => {
                if !app.input(event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(physical_size) => {
                            app.resize(*physical_size);
                        }
                        WindowEvent::RedrawRequested => {
                            if app.frame_loop.tick().is_break() {
                                elwt.exit();
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                app.window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
