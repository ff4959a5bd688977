use crate::app::{App, Shared};
use crate::input;
use gloo_events::{EventListener, EventListenerOptions};
use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys as web;
use wishverse_core::scene::{decoration_group_transform, pick_decoration, BakingLook};
use wishverse_core::{Ray, Screen};

/// Canvas-relative CSS position of a client-space point.
fn canvas_css(canvas: &web::HtmlCanvasElement, client_x: f32, client_y: f32) -> (f32, f32, f32, f32) {
    let rect = canvas.get_bounding_client_rect();
    (
        client_x - rect.left() as f32,
        client_y - rect.top() as f32,
        rect.width() as f32,
        rect.height() as f32,
    )
}

/// Pointer ray in the decoration group's local frame.
fn decoration_ray(app: &App, canvas: &web::HtmlCanvasElement, client_x: f32, client_y: f32) -> Option<Ray> {
    let config = app.view_config()?;
    let (x, y, w, h) = canvas_css(canvas, client_x, client_y);
    let ndc = input::css_to_ndc(x, y, w, h)?;
    let camera = app.orbit.camera(input::aspect(canvas.width(), canvas.height()));
    let look = BakingLook::at(config.base_color(), app.wizard.baking_progress());
    let group = decoration_group_transform(config.layer_count(), look.scale);
    Some(camera.ray_from_ndc(ndc).transformed(&group.inverse()))
}

pub fn wire_canvas_pointer(app: &Shared, canvas: &web::HtmlCanvasElement) {
    wire_pointerdown(app, canvas);
    wire_orbit_move(app, canvas);
    wire_orbit_end(app, canvas, "pointerup");
    wire_orbit_end(app, canvas, "pointercancel");
    wire_orbit_wheel(app, canvas);
}

fn wire_pointerdown(app: &Shared, canvas: &web::HtmlCanvasElement) {
    let app = app.clone();
    let canvas_c = canvas.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let mut a = app.borrow_mut();
        if a.wizard.screen() != Screen::Creator {
            return;
        }
        let (cx, cy) = (ev.client_x() as f32, ev.client_y() as f32);
        let (x, y, _, _) = canvas_css(&canvas_c, cx, cy);

        let hit = decoration_ray(&a, &canvas_c, cx, cy)
            .and_then(|ray| pick_decoration(&ray, a.creator.draft().decoration_list()).cloned());
        match hit {
            Some(deco) => {
                let App {
                    manipulator, creator, ..
                } = &mut *a;
                if manipulator.begin(&deco, creator) {
                    a.sync_orbit();
                    a.session_listeners = session_listeners(&app, &canvas_c);
                    ev.prevent_default();
                }
            }
            None if a.orbit.enabled => {
                a.orbit_drag.begin(ev.pointer_id(), Vec2::new(x, y));
                _ = canvas_c.set_pointer_capture(ev.pointer_id());
            }
            None => {}
        }
    }) as Box<dyn FnMut(_)>);
    _ = canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_orbit_move(app: &Shared, canvas: &web::HtmlCanvasElement) {
    let app = app.clone();
    let canvas_c = canvas.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let mut a = app.borrow_mut();
        let (x, y, _, _) = canvas_css(&canvas_c, ev.client_x() as f32, ev.client_y() as f32);
        if let Some(delta) = a.orbit_drag.step(ev.pointer_id(), Vec2::new(x, y)) {
            a.orbit.drag(delta);
        }
    }) as Box<dyn FnMut(_)>);
    _ = canvas.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_orbit_end(app: &Shared, canvas: &web::HtmlCanvasElement, event: &str) {
    let app = app.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |_ev: web::PointerEvent| {
        let mut a = app.borrow_mut();
        a.orbit_drag.end();
    }) as Box<dyn FnMut(_)>);
    _ = canvas.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_orbit_wheel(app: &Shared, canvas: &web::HtmlCanvasElement) {
    let app = app.clone();
    let listener = EventListener::new_with_options(
        canvas,
        "wheel",
        EventListenerOptions::enable_prevent_default(),
        move |ev| {
            let Some(ev) = ev.dyn_ref::<web::WheelEvent>() else {
                return;
            };
            let mut a = app.borrow_mut();
            if a.view_config().is_none() || a.manipulator.is_active() {
                return;
            }
            if a.orbit.zoom(ev.delta_y() as f32) {
                ev.prevent_default();
            }
        },
    );
    listener.forget();
}

/// Window listeners for one manipulation session. Dropping them detaches
/// every handler, so nothing outlives the session.
fn session_listeners(app: &Shared, canvas: &web::HtmlCanvasElement) -> Vec<EventListener> {
    let Some(window) = web::window() else {
        return Vec::new();
    };
    let mut listeners = Vec::with_capacity(5);

    let app_move = app.clone();
    let canvas_move = canvas.clone();
    listeners.push(EventListener::new(&window, "pointermove", move |ev| {
        let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
            return;
        };
        let mut a = app_move.borrow_mut();
        if !a.manipulator.is_dragging() {
            return;
        }
        let Some(ray) = decoration_ray(&a, &canvas_move, ev.client_x() as f32, ev.client_y() as f32) else {
            return;
        };
        let App {
            manipulator, creator, ..
        } = &mut *a;
        manipulator.drag(&ray, creator);
    }));

    for name in ["pointerup", "pointercancel"] {
        let app_end = app.clone();
        listeners.push(EventListener::new(&window, name, move |_ev| {
            let released = app_end.borrow_mut().end_manipulation();
            drop(released);
        }));
    }

    let app_wheel = app.clone();
    listeners.push(EventListener::new_with_options(
        &window,
        "wheel",
        EventListenerOptions::enable_prevent_default(),
        move |ev| {
            let Some(ev) = ev.dyn_ref::<web::WheelEvent>() else {
                return;
            };
            ev.prevent_default();
            let mut a = app_wheel.borrow_mut();
            let App {
                manipulator, creator, ..
            } = &mut *a;
            manipulator.wheel(ev.delta_y() as f32, creator);
        },
    ));

    let app_touch = app.clone();
    listeners.push(EventListener::new_with_options(
        &window,
        "touchmove",
        EventListenerOptions::enable_prevent_default(),
        move |ev| {
            let Some(ev) = ev.dyn_ref::<web::TouchEvent>() else {
                return;
            };
            let list = ev.touches();
            let points: Vec<Vec2> = (0..list.length())
                .filter_map(|i| list.item(i))
                .map(|t| Vec2::new(t.client_x() as f32, t.client_y() as f32))
                .collect();
            if points.len() >= 2 {
                ev.prevent_default();
            }
            let mut a = app_touch.borrow_mut();
            let App {
                manipulator, creator, ..
            } = &mut *a;
            manipulator.touches(&points, creator);
        },
    ));

    log::debug!("[input] session listeners attached");
    listeners
}
