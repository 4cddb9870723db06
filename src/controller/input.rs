/// Platform-agnostic pointer input
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { button: MouseButton, x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp { button: MouseButton },
    Wheel { delta_y: f32 },
    /// Pointer left the surface or focus was lost; ends any drag.
    PointerCancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn from_web_button(button: i16) -> Self {
        match button {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => MouseButton::Left,
        }
    }
}

pub mod wasm {
    use super::*;
    use web_sys::{Event, PointerEvent};

    pub fn pointer_down_to_input(e: &PointerEvent) -> InputEvent {
        InputEvent::PointerDown {
            button: MouseButton::from_web_button(e.button()),
            x: e.client_x() as f32,
            y: e.client_y() as f32,
        }
    }

    pub fn pointer_move_to_input(e: &PointerEvent) -> InputEvent {
        InputEvent::PointerMove { x: e.client_x() as f32, y: e.client_y() as f32 }
    }

    pub fn pointer_up_to_input(e: &PointerEvent) -> InputEvent {
        InputEvent::PointerUp { button: MouseButton::from_web_button(e.button()) }
    }

    pub fn mouse_wheel_to_input(e: &Event) -> Option<InputEvent> {
        let js_val = wasm_bindgen::JsValue::from(e.clone());
        if let Ok(delta_y) = js_sys::Reflect::get(&js_val, &wasm_bindgen::JsValue::from_str("deltaY")) {
            if let Some(dy) = delta_y.as_f64() {
                return Some(InputEvent::Wheel { delta_y: dy as f32 });
            }
        }
        None
    }
}
