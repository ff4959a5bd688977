#![cfg(target_arch = "wasm32")]
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;
use wishverse_core::generate::{GeminiClient, GeneratorConfig};
use wishverse_core::Screen;

mod app;
mod audio;
mod camera;
mod card;
mod clock;
mod constants;
mod creator;
mod dom;
mod events;
mod frame;
mod input;
mod render;
mod screens;

fn wire_canvas_resize(canvas: &web::HtmlCanvasElement) {
    dom::sync_canvas_backing_size(canvas);
    let canvas_resize = canvas.clone();
    let resize_closure = Closure::wrap(Box::new(move || {
        dom::sync_canvas_backing_size(&canvas_resize);
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window.add_event_listener_with_callback("resize", resize_closure.as_ref().unchecked_ref());
    }
    resize_closure.forget();
}

fn wire_home(document: &web::Document, app: &app::Shared) {
    let app = app.clone();
    dom::add_click_listener(document, "start-btn", move || {
        {
            let mut a = app.borrow_mut();
            if a.wizard.start().is_err() {
                return;
            }
            a.reset_creator();
            // first gesture: unlock audio for the chime later on
            _ = a.audio.ensure();
        }
        if let Some(document) = dom::window_document() {
            screens::render_creator(&document, &app.borrow().creator);
            screens::show(&document, Screen::Creator);
        }
    });
}

fn generator_config(document: &web::Document) -> GeneratorConfig {
    let config = GeneratorConfig::default().with_overrides(
        dom::app_data(document, "apiKey"),
        dom::app_data(document, "model"),
    );
    if config.api_key.is_empty() {
        log::warn!("[gen] no API key configured; generation will fail");
    }
    log::info!("[gen] model {}", config.model);
    config
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("wishverse-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas_el = document
        .get_element_by_id("cake-canvas")
        .ok_or_else(|| anyhow::anyhow!("missing #cake-canvas"))?;
    let canvas: web::HtmlCanvasElement = canvas_el
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    // Maintain canvas internal pixel size to match CSS size * devicePixelRatio
    wire_canvas_resize(&canvas);

    let app = app::App::shared();
    let client = Rc::new(GeminiClient::new(generator_config(&document)));

    wire_home(&document, &app);
    creator::wire_creator(&document, &app, client);
    card::wire_final(&document, &app);
    events::wire_canvas_pointer(&app, &canvas);
    events::wire_global_keydown(app.clone());

    screens::render_creator(&document, &app.borrow().creator);
    screens::show(&document, Screen::Home);

    // The wizard works without WebGPU; only the 3D view is lost
    let gpu = frame::init_gpu(&canvas).await;
    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        app,
        canvas,
        gpu,
        last_instant: Instant::now(),
    }));
    frame::start_loop(frame_ctx);
    Ok(())
}
