use crate::app::Shared;
use crate::input::{action_for_key, KeyAction};
use crate::screens;
use wasm_bindgen::JsCast;
use web_sys as web;
use wishverse_core::Screen;

/// Typing into a field must not reach the 3D shortcuts.
fn from_text_field(ev: &web::KeyboardEvent) -> bool {
    ev.target()
        .and_then(|t| t.dyn_into::<web::Element>().ok())
        .map(|el| matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT"))
        .unwrap_or(false)
}

pub fn wire_global_keydown(app: Shared) {
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
        if from_text_field(&ev) {
            return;
        }
        let Some(action) = action_for_key(&ev.key()) else {
            return;
        };
        let mut a = app.borrow_mut();
        if a.wizard.screen() != Screen::Creator {
            return;
        }
        let released = match action {
            KeyAction::Release => a.end_manipulation(),
            KeyAction::RemoveActive => {
                let Some(id) = a.manipulator.active_id().cloned() else {
                    return;
                };
                let released = a.end_manipulation();
                if a.creator.remove_decoration(&id) {
                    log::info!("[creator] removed {id}");
                }
                if let Some(document) = crate::dom::window_document() {
                    screens::render_creator(&document, &a.creator);
                }
                released
            }
            KeyAction::ResetCamera => {
                a.orbit.reset();
                Vec::new()
            }
        };
        ev.prevent_default();
        drop(a);
        drop(released);
    }) as Box<dyn FnMut(_)>);
    if let Some(w) = web::window() {
        _ = w.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
