use crate::app::Shared;
use crate::dom;
use crate::screens;
use glam::Vec2;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;
use wishverse_core::creator::{GenerationOutcome, SaveError};
use wishverse_core::generate::GeminiClient;
use wishverse_core::scene::CATALOG;
use wishverse_core::{Screen, LAYERS_MAX, LAYERS_MIN, PALETTE_DREAMY, PALETTE_NATURE, PALETTE_SUNSET};

// Outline pad maps its width onto this many scene units
const OUTLINE_PAD_UNITS: f32 = 4.0;

fn rerender(app: &Shared) {
    if let Some(document) = dom::window_document() {
        screens::render_creator(&document, &app.borrow().creator);
    }
}

pub fn wire_creator(document: &web::Document, app: &Shared, client: Rc<GeminiClient>) {
    wire_generate_step(document, app, client);
    wire_card_step(document, app);
    wire_draft_controls(document, app);
    wire_outline_pad(document, app);
}

fn wire_generate_step(document: &web::Document, app: &Shared, client: Rc<GeminiClient>) {
    let app_prompt = app.clone();
    dom::add_input_listener(document, "prompt-input", move |value| {
        app_prompt.borrow_mut().creator.prompt = value;
        rerender(&app_prompt);
    });

    wire_upload(document, app);

    let app_gen = app.clone();
    dom::add_click_listener(document, "generate-btn", move || {
        let Some((ticket, request)) = app_gen.borrow_mut().creator.begin_generation() else {
            return;
        };
        rerender(&app_gen);
        let app = app_gen.clone();
        let client = client.clone();
        spawn_local(async move {
            let result = client.generate(&request).await;
            let outcome = app.borrow_mut().creator.complete_generation(ticket, result);
            if outcome == GenerationOutcome::Discarded {
                return;
            }
            if let Some(document) = dom::window_document() {
                if outcome == GenerationOutcome::Stored {
                    dom::set_field_value(&document, "prompt-input", "");
                }
                screens::render_creator(&document, &app.borrow().creator);
            }
            if let GenerationOutcome::Failed(notice) = outcome {
                dom::alert(notice);
            }
        });
    });

    let app_next = app.clone();
    dom::add_click_listener(document, "to-card-btn", move || {
        if app_next.borrow_mut().creator.open_card() {
            rerender(&app_next);
        }
    });

    let app_home = app.clone();
    dom::add_click_listener(document, "creator-back-btn", move || {
        let released = {
            let mut a = app_home.borrow_mut();
            let released = a.end_manipulation();
            if a.wizard.back().is_err() {
                return;
            }
            released
        };
        drop(released);
        if let Some(document) = dom::window_document() {
            screens::show(&document, Screen::Home);
        }
    });
}

fn wire_upload(document: &web::Document, app: &Shared) {
    let Some(input) = dom::by_id::<web::HtmlInputElement>(document, "upload-input") else {
        log::warn!("[dom] missing #upload-input");
        return;
    };
    let app = app.clone();
    let input_c = input.clone();
    let closure = Closure::wrap(Box::new(move || {
        let Some(file) = input_c.files().and_then(|f| f.get(0)) else {
            app.borrow_mut().creator.set_upload(None);
            rerender(&app);
            return;
        };
        let reader = match web::FileReader::new() {
            Ok(r) => r,
            Err(e) => {
                log::error!("[upload] FileReader error: {:?}", e);
                return;
            }
        };
        let app_load = app.clone();
        let reader_c = reader.clone();
        let onload = Closure::once_into_js(move || {
            let data = reader_c.result().ok().and_then(|v| v.as_string());
            log::info!("[upload] read {} bytes", data.as_ref().map(|d| d.len()).unwrap_or(0));
            app_load.borrow_mut().creator.set_upload(data);
            rerender(&app_load);
        });
        reader.set_onload(Some(onload.unchecked_ref()));
        if let Err(e) = reader.read_as_data_url(&file) {
            log::error!("[upload] read failed: {:?}", e);
        }
    }) as Box<dyn FnMut()>);
    _ = input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn wire_card_step(document: &web::Document, app: &Shared) {
    let app_back = app.clone();
    dom::add_click_listener(document, "card-back-btn", move || {
        if app_back.borrow_mut().creator.back_to_generate() {
            rerender(&app_back);
        }
    });

    let app_msg = app.clone();
    dom::add_input_listener(document, "message-input", move |value| {
        app_msg.borrow_mut().creator.message = value;
        rerender(&app_msg);
    });

    let app_save = app.clone();
    dom::add_click_listener(document, "save-card-btn", move || {
        let released = {
            let mut a = app_save.borrow_mut();
            let config = match a.creator.save_card() {
                Ok(c) => c,
                Err(SaveError::EmptyMessage) => return,
                Err(e) => {
                    log::warn!("[creator] {e}");
                    return;
                }
            };
            let released = a.end_manipulation();
            if let Err(e) = a.wizard.finish(config) {
                log::warn!("[wizard] {e}");
                return;
            }
            released
        };
        drop(released);
        if let Some(document) = dom::window_document() {
            screens::show(&document, Screen::Baking);
            screens::render_baking(&document, 0.0);
        }
    });
}

fn wire_draft_controls(document: &web::Document, app: &Shared) {
    let app_shape = app.clone();
    dom::add_click_listener(document, "shape-btn", move || {
        let shape = app_shape.borrow_mut().creator.cycle_shape();
        log::info!("[creator] shape {}", shape.label());
        rerender(&app_shape);
    });

    for (id, step) in [("layers-dec", -1i32), ("layers-inc", 1)] {
        let app_layers = app.clone();
        dom::add_click_listener(document, id, move || {
            {
                let mut a = app_layers.borrow_mut();
                let current = a.creator.draft().layer_count() as i32;
                let next = (current + step).clamp(LAYERS_MIN as i32, LAYERS_MAX as i32);
                a.creator.set_layers(next as u32);
            }
            rerender(&app_layers);
        });
    }

    fill_palette(document);
    let app_color = app.clone();
    dom::add_delegated_click(document, "palette", "data-color", move |hex| {
        if app_color.borrow_mut().creator.set_color(&hex) {
            rerender(&app_color);
        }
    });

    dom::fill_buttons(
        document,
        "catalog",
        "data-model",
        CATALOG.iter().map(|(model, _, _)| (*model, model.replace('_', " "))),
    );
    let app_add = app.clone();
    dom::add_delegated_click(document, "catalog", "data-model", move |model| {
        if app_add.borrow_mut().creator.add_decoration(&model).is_some() {
            rerender(&app_add);
        }
    });

    let app_remove = app.clone();
    dom::add_delegated_click(document, "decoration-list", "data-remove", move |id| {
        let released = {
            let mut a = app_remove.borrow_mut();
            let id = wishverse_core::DecorationId::new(id);
            let released = if a.manipulator.active_id() == Some(&id) {
                a.end_manipulation()
            } else {
                Vec::new()
            };
            a.creator.remove_decoration(&id);
            released
        };
        drop(released);
        rerender(&app_remove);
    });
}

fn fill_palette(document: &web::Document) {
    let Some(container) = document.get_element_by_id("palette") else {
        return;
    };
    container.set_inner_html("");
    for hex in PALETTE_DREAMY.iter().chain(&PALETTE_SUNSET).chain(&PALETTE_NATURE) {
        let Ok(button) = document.create_element("button") else {
            continue;
        };
        _ = button.set_attribute("type", "button");
        _ = button.set_attribute("class", "swatch");
        _ = button.set_attribute("data-color", hex);
        _ = button.set_attribute("title", hex);
        _ = button.set_attribute("style", &format!("background:{hex}"));
        _ = container.append_child(&button);
    }
}

/// Freehand outline for the custom tier: press, draw, release.
fn wire_outline_pad(document: &web::Document, app: &Shared) {
    let Some(pad) = dom::by_id::<web::HtmlCanvasElement>(document, "outline-pad") else {
        return;
    };
    let stroke: Rc<std::cell::RefCell<Option<Vec<Vec2>>>> = Rc::new(std::cell::RefCell::new(None));

    let pad_down = pad.clone();
    let stroke_down = stroke.clone();
    let down = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        _ = pad_down.set_pointer_capture(ev.pointer_id());
        *stroke_down.borrow_mut() = Some(vec![pad_point(&pad_down, &ev)]);
        clear_pad(&pad_down);
    }) as Box<dyn FnMut(_)>);
    _ = pad.add_event_listener_with_callback("pointerdown", down.as_ref().unchecked_ref());
    down.forget();

    let pad_move = pad.clone();
    let stroke_move = stroke.clone();
    let mv = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
        let mut s = stroke_move.borrow_mut();
        let Some(points) = s.as_mut() else {
            return;
        };
        let p = pad_point(&pad_move, &ev);
        if let Some(last) = points.last().copied() {
            draw_segment(&pad_move, last, p);
        }
        points.push(p);
    }) as Box<dyn FnMut(_)>);
    _ = pad.add_event_listener_with_callback("pointermove", mv.as_ref().unchecked_ref());
    mv.forget();

    let pad_up = pad.clone();
    let app = app.clone();
    let up = Closure::wrap(Box::new(move |_ev: web::PointerEvent| {
        let Some(points) = stroke.borrow_mut().take() else {
            return;
        };
        let width = pad_up.client_width().max(1) as f32;
        let path: Vec<[f32; 2]> = points
            .iter()
            .map(|p| [p.x / width * OUTLINE_PAD_UNITS, p.y / width * OUTLINE_PAD_UNITS])
            .collect();
        log::info!("[creator] custom outline with {} points", path.len());
        app.borrow_mut().creator.set_custom_path(path);
    }) as Box<dyn FnMut(_)>);
    _ = pad.add_event_listener_with_callback("pointerup", up.as_ref().unchecked_ref());
    up.forget();
}

/// Pad-relative CSS position, y up.
fn pad_point(pad: &web::HtmlCanvasElement, ev: &web::PointerEvent) -> Vec2 {
    let rect = pad.get_bounding_client_rect();
    Vec2::new(
        ev.client_x() as f32 - rect.left() as f32,
        rect.bottom() as f32 - ev.client_y() as f32,
    )
}

fn pad_context(pad: &web::HtmlCanvasElement) -> Option<web::CanvasRenderingContext2d> {
    pad.get_context("2d")
        .ok()
        .flatten()
        .and_then(|c| c.dyn_into::<web::CanvasRenderingContext2d>().ok())
}

fn clear_pad(pad: &web::HtmlCanvasElement) {
    if let Some(ctx) = pad_context(pad) {
        ctx.clear_rect(0.0, 0.0, pad.width() as f64, pad.height() as f64);
    }
}

fn draw_segment(pad: &web::HtmlCanvasElement, a: Vec2, b: Vec2) {
    let Some(ctx) = pad_context(pad) else {
        return;
    };
    // pad points are y-up; canvas is y-down in backing pixels
    let sx = pad.width() as f64 / pad.client_width().max(1) as f64;
    let sy = pad.height() as f64 / pad.client_height().max(1) as f64;
    let h = pad.client_height() as f64;
    ctx.set_stroke_style_str("#db2777");
    ctx.set_line_width(2.0 * sx);
    ctx.begin_path();
    ctx.move_to(a.x as f64 * sx, (h - a.y as f64) * sy);
    ctx.line_to(b.x as f64 * sx, (h - b.y as f64) * sy);
    ctx.stroke();
}
