pub mod config;
pub mod error;
pub mod logging;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub use config::SceneConfig;
pub use controller::{FrameLoop, InputEvent, LoopHandle, OrbitControls, SceneHost};
pub use error::SceneError;
pub use model::{Board, PerspectiveCamera, Scene, Tile, TileColor, Viewport};
pub use view::{GpuContext, RenderBackend, WgpuRenderer};

#[cfg(target_arch = "wasm32")]
use std::{cell::RefCell, ops::ControlFlow, rc::Rc};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, prelude::wasm_bindgen, JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{Event, EventTarget, HtmlCanvasElement, PointerEvent, Window};


#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    logging::init();
}

/// A running scene bound to one canvas. Stopping (or dropping) it ends the
/// frame loop and detaches every DOM listener.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub struct SceneHandle {
    frame_loop: LoopHandle,
    listeners: Vec<Listener>,
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl SceneHandle {
    pub fn stop(&mut self) {
        self.frame_loop.stop();
        for listener in self.listeners.drain(..) {
            listener.detach();
        }
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.frame_loop.is_running()
    }

    #[wasm_bindgen(getter)]
    pub fn frames(&self) -> f64 {
        self.frame_loop.frames() as f64
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for SceneHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Render the board into `canvas`, sized to the window. The embedding page
/// keeps the returned handle; mounting the same canvas twice is its mistake.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn mount(canvas: HtmlCanvasElement) -> Result<SceneHandle, JsValue> {
    let window = web_sys::window().ok_or(js_error("no global `window`"))?;
    let viewport = window_viewport(&window);
    canvas.set_width(viewport.width);
    canvas.set_height(viewport.height);

    let config = SceneConfig::default();
    let gpu = GpuContext::new(&canvas, viewport.width, viewport.height).await?;
    let renderer = WgpuRenderer::new(gpu, &config.render);
    let host = Rc::new(RefCell::new(SceneHost::new(renderer, viewport, &config)));

    let frame_loop = FrameLoop::new({
        let host = host.clone();
        move || match host.borrow_mut().frame() {
            Ok(()) => ControlFlow::Continue(()),
            Err(e) => {
                tracing::error!("render failed, stopping frame loop: {e}");
                ControlFlow::Break(())
            }
        }
    });
    let loop_handle = frame_loop.handle();
    animate(window.clone(), frame_loop)?;

    let listeners = setup_listeners(&window, &canvas, host)?;
    Ok(SceneHandle { frame_loop: loop_handle, listeners })
}

/// Create a window-sized canvas on `<body>` and mount into it.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = mountFullscreen)]
pub async fn mount_fullscreen() -> Result<SceneHandle, JsValue> {
    let canvas = init_canvas()?;
    mount(canvas).await
}

#[cfg(target_arch = "wasm32")]
fn setup_listeners(
    window: &Window,
    canvas: &HtmlCanvasElement,
    host: Rc<RefCell<SceneHost<WgpuRenderer>>>,
) -> Result<Vec<Listener>, JsValue> {
    use controller::input::wasm;

    let mut listeners = Vec::new();

    // Viewport resize
    {
        let host = host.clone();
        let window_for_resize = window.clone();
        let canvas = canvas.clone();
        listeners.push(Listener::attach(window, "resize", move |_e: Event| {
            let viewport = window_viewport(&window_for_resize);
            canvas.set_width(viewport.width);
            canvas.set_height(viewport.height);
            host.borrow_mut().resize(viewport);
        })?);
    }

    // Pointer down: capture so drags keep tracking outside the canvas
    {
        let host = host.clone();
        let canvas_for_capture = canvas.clone();
        listeners.push(Listener::attach(canvas, "pointerdown", move |e: Event| {
            if let Some(pe) = e.dyn_ref::<PointerEvent>() {
                if host.borrow_mut().handle_input(&wasm::pointer_down_to_input(pe)) {
                    let _ = canvas_for_capture.set_pointer_capture(pe.pointer_id());
                }
            }
        })?);
    }

    {
        let host = host.clone();
        listeners.push(Listener::attach(canvas, "pointermove", move |e: Event| {
            if let Some(pe) = e.dyn_ref::<PointerEvent>() {
                host.borrow_mut().handle_input(&wasm::pointer_move_to_input(pe));
            }
        })?);
    }

    {
        let host = host.clone();
        listeners.push(Listener::attach(canvas, "pointerup", move |e: Event| {
            if let Some(pe) = e.dyn_ref::<PointerEvent>() {
                host.borrow_mut().handle_input(&wasm::pointer_up_to_input(pe));
            }
        })?);
    }

    {
        let host = host.clone();
        listeners.push(Listener::attach(canvas, "pointercancel", move |_e: Event| {
            host.borrow_mut().handle_input(&InputEvent::PointerCancel);
        })?);
    }

    // Mouse wheel
    {
        let host = host.clone();
        listeners.push(Listener::attach(canvas, "wheel", move |e: Event| {
            if let Some(event) = wasm::mouse_wheel_to_input(&e) {
                if host.borrow_mut().handle_input(&event) {
                    e.prevent_default();
                }
            }
        })?);
    }

    // Context menu prevention
    listeners.push(Listener::attach(canvas, "contextmenu", move |e: Event| {
        e.prevent_default();
    })?);

    Ok(listeners)
}

#[cfg(target_arch = "wasm32")]
struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

#[cfg(target_arch = "wasm32")]
impl Listener {
    fn attach(
        target: &EventTarget,
        event: &'static str,
        f: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::wrap(Box::new(f) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self { target: target.clone(), event, callback })
    }

    fn detach(self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// Chain `requestAnimationFrame` while the loop keeps running. Once it stops
/// the callback releases itself.
#[cfg(target_arch = "wasm32")]
fn animate(window: Window, mut frame_loop: FrameLoop) -> Result<(), JsValue> {
    let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut()>>));
    let callback_clone = callback.clone();
    let window_for_loop = window.clone();

    *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if frame_loop.tick().is_continue() {
            let scheduled = callback_clone
                .borrow()
                .as_ref()
                .map(|cb| window_for_loop.request_animation_frame(cb.as_ref().unchecked_ref()));
            match scheduled {
                Some(Ok(_)) => return,
                Some(Err(e)) => tracing::error!("requestAnimationFrame failed: {e:?}"),
                None => {}
            }
        }

        // Breaks the Rc cycle; dropped after this invocation returns.
        if let Some(cb) = callback_clone.borrow_mut().take() {
            wasm_bindgen_futures::spawn_local(async move { drop(cb) });
        }
    }) as Box<dyn FnMut()>));

    let first = callback.borrow();
    if let Some(cb) = first.as_ref() {
        window.request_animation_frame(cb.as_ref().unchecked_ref())?;
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn window_viewport(window: &Window) -> Viewport {
    let width = window.inner_width().ok().and_then(|w| w.as_f64()).unwrap_or(800.0);
    let height = window.inner_height().ok().and_then(|h| h.as_f64()).unwrap_or(600.0);
    Viewport::new(width as u32, height as u32)
}

#[cfg(target_arch = "wasm32")]
fn init_canvas() -> Result<HtmlCanvasElement, JsValue> {
    let window = web_sys::window().ok_or(js_error("no global `window`"))?;
    let document = window.document().ok_or(js_error("no document on window"))?;
    let body = document.body().ok_or(js_error("no body on document"))?;
    let canvas_el = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| js_error("failed to create canvas"))?;
    body.append_child(&canvas_el)?;
    Ok(canvas_el)
}

#[cfg(target_arch = "wasm32")]
fn js_error<E: Into<String>>(msg: E) -> JsValue {
    JsValue::from_str(&msg.into())
}
