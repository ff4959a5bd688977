use crate::app::Shared;
use crate::dom;
use crate::screens;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;
use wishverse_core::card::*;
use wishverse_core::{CakeConfig, Screen};

const CARD_FONT_FAMILY: &str = "'Comic Sans MS', 'Segoe UI', sans-serif";
const TITLE: &str = "WishVerse";

fn context_2d(canvas: &web::HtmlCanvasElement) -> Result<web::CanvasRenderingContext2d, ShareError> {
    canvas
        .get_context("2d")
        .map_err(|e| ShareError::Export(format!("{:?}", e)))?
        .ok_or_else(|| ShareError::Export("no 2d context".into()))?
        .dyn_into::<web::CanvasRenderingContext2d>()
        .map_err(|e| ShareError::Export(format!("{:?}", e)))
}

fn rounded_rect_path(ctx: &web::CanvasRenderingContext2d, r: &Rect, radius: f64) {
    let radius = radius.min(r.w / 2.0).min(r.h / 2.0);
    ctx.begin_path();
    ctx.move_to(r.x + radius, r.y);
    _ = ctx.arc_to(r.x + r.w, r.y, r.x + r.w, r.y + r.h, radius);
    _ = ctx.arc_to(r.x + r.w, r.y + r.h, r.x, r.y + r.h, radius);
    _ = ctx.arc_to(r.x, r.y + r.h, r.x, r.y, radius);
    _ = ctx.arc_to(r.x, r.y, r.x + r.w, r.y, radius);
    ctx.close_path();
}

/// Paint the card at `scale` (1 for the preview, `EXPORT_SCALE` for saving).
fn draw_card(
    canvas: &web::HtmlCanvasElement,
    scale: f64,
    photo: Option<&web::HtmlImageElement>,
    message: &str,
) -> Result<(), ShareError> {
    canvas.set_width((CARD_WIDTH * scale) as u32);
    canvas.set_height((CARD_HEIGHT * scale) as u32);
    let ctx = context_2d(canvas)?;
    _ = ctx.set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0);
    ctx.set_font(&format!("{MESSAGE_FONT_PX}px {CARD_FONT_FAMILY}"));
    let layout = CardLayout::compute(message, |s| ctx.measure_text(s).map(|m| m.width()).unwrap_or(0.0));

    let bg = ctx.create_linear_gradient(0.0, 0.0, 0.0, CARD_HEIGHT);
    _ = bg.add_color_stop(0.0, "#fdf2f8");
    _ = bg.add_color_stop(1.0, "#ede9fe");
    ctx.set_fill_style_canvas_gradient(&bg);
    ctx.fill_rect(layout.card.x, layout.card.y, layout.card.w, layout.card.h);

    ctx.set_fill_style_str("#db2777");
    ctx.set_font(&format!("bold 28px {CARD_FONT_FAMILY}"));
    ctx.set_text_align("center");
    _ = ctx.fill_text(TITLE, CARD_WIDTH / 2.0, CONTENT_TOP / 2.0 + 10.0);

    ctx.set_fill_style_str("#ffffff");
    rounded_rect_path(&ctx, &layout.photo, PHOTO_RADIUS);
    ctx.fill();
    if let Some(img) = photo.filter(|i| i.complete() && i.natural_width() > 0) {
        let inner = layout.photo_inner;
        let src = cover_crop(img.natural_width() as f64, img.natural_height() as f64, inner.w, inner.h);
        ctx.save();
        rounded_rect_path(&ctx, &inner, (PHOTO_RADIUS - PHOTO_BORDER).max(0.0));
        ctx.clip();
        ctx.draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
            img, src.x, src.y, src.w, src.h, inner.x, inner.y, inner.w, inner.h,
        )
        .map_err(|e| ShareError::Export(format!("{:?}", e)))?;
        ctx.restore();
    }

    if let Some(b) = layout.message_box {
        ctx.set_fill_style_str("rgba(255, 255, 255, 0.85)");
        rounded_rect_path(&ctx, &b, PHOTO_RADIUS);
        ctx.fill();
        ctx.set_fill_style_str("#4b5563");
        ctx.set_font(&format!("{MESSAGE_FONT_PX}px {CARD_FONT_FAMILY}"));
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        for (i, line) in layout.message_lines.iter().enumerate() {
            let y = b.y + MESSAGE_PADDING + (i as f64 + 0.5) * MESSAGE_LINE_HEIGHT;
            _ = ctx.fill_text(line, b.x + b.w / 2.0, y);
        }
    }
    Ok(())
}

fn final_photo(document: &web::Document) -> Option<web::HtmlImageElement> {
    dom::by_id::<web::HtmlImageElement>(document, "final-image")
}

fn redraw_preview(document: &web::Document, message: &str) {
    let Some(canvas) = dom::by_id::<web::HtmlCanvasElement>(document, "card-canvas") else {
        return;
    };
    if let Err(e) = draw_card(&canvas, 1.0, final_photo(document).as_ref(), message) {
        log::warn!("[card] preview failed: {e}");
    }
}

/// Fill the Final screen from a finished configuration.
pub fn render_final(document: &web::Document, config: &CakeConfig) {
    dom::set_field_value(document, "final-message-input", &config.message);
    dom::set_text(document, "final-prompt", &config.prompt);
    dom::set_image(document, "final-original", config.original_image.as_deref());
    if let Some(img) = final_photo(document) {
        let message = config.message.clone();
        let onload = Closure::once_into_js(move || {
            if let Some(document) = dom::window_document() {
                redraw_preview(&document, &message);
            }
        });
        img.set_onload(Some(onload.unchecked_ref()));
        img.set_src(&config.image_url);
    }
    redraw_preview(document, &config.message);
}

fn export_card(document: &web::Document, message: &str) -> Result<(), ShareError> {
    let canvas = document
        .create_element("canvas")
        .map_err(|e| ShareError::Export(format!("{:?}", e)))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| ShareError::Export(format!("{:?}", e)))?;
    draw_card(&canvas, EXPORT_SCALE, final_photo(document).as_ref(), message)?;
    let url = canvas
        .to_data_url_with_type("image/png")
        .map_err(|e| ShareError::Export(format!("{:?}", e)))?;
    let anchor = document
        .create_element("a")
        .map_err(|e| ShareError::Export(format!("{:?}", e)))?
        .dyn_into::<web::HtmlAnchorElement>()
        .map_err(|e| ShareError::Export(format!("{:?}", e)))?;
    let name = export_filename(js_sys::Date::now() as u64);
    anchor.set_href(&url);
    anchor.set_download(&name);
    anchor.click();
    log::info!("[card] exported {name}");
    Ok(())
}

async fn copy_page_link() -> Result<(), ShareError> {
    let window = web::window().ok_or_else(|| ShareError::Clipboard("no window".into()))?;
    let href = window
        .location()
        .href()
        .map_err(|e| ShareError::Clipboard(format!("{:?}", e)))?;
    let promise = window.navigator().clipboard().write_text(&href);
    JsFuture::from(promise)
        .await
        .map_err(|e| ShareError::Clipboard(format!("{:?}", e)))?;
    Ok(())
}

pub fn wire_final(document: &web::Document, app: &Shared) {
    let app_msg = app.clone();
    dom::add_input_listener(document, "final-message-input", move |value| {
        if app_msg.borrow_mut().wizard.set_message(value.clone()).is_ok() {
            if let Some(document) = dom::window_document() {
                redraw_preview(&document, &value);
            }
        }
    });

    let app_save = app.clone();
    dom::add_click_listener(document, "save-image-btn", move || {
        let message = app_save.borrow().wizard.config().message.clone();
        let Some(document) = dom::window_document() else {
            return;
        };
        if let Err(e) = export_card(&document, &message) {
            log::error!("[card] {e}");
            dom::alert(e.notice());
        }
    });

    dom::add_click_listener(document, "copy-link-btn", move || {
        spawn_local(async move {
            match copy_page_link().await {
                Ok(()) => dom::alert(LINK_COPIED_NOTICE),
                Err(e) => {
                    log::error!("[card] {e}");
                    dom::alert(e.notice());
                }
            }
        });
    });

    let app_restart = app.clone();
    dom::add_click_listener(document, "restart-btn", move || {
        {
            let mut a = app_restart.borrow_mut();
            if a.wizard.restart().is_err() {
                return;
            }
            a.reset_creator();
        }
        if let Some(document) = dom::window_document() {
            for id in ["prompt-input", "message-input", "upload-input"] {
                dom::set_field_value(&document, id, "");
            }
            screens::render_creator(&document, &app_restart.borrow().creator);
            screens::show(&document, Screen::Home);
        }
    });
}
