use crate::dom;
use web_sys as web;
use wishverse_core::creator::{CreatorSession, CreatorStep};
use wishverse_core::wizard::Screen;
use wishverse_core::ShapeKind;

/// Show exactly one screen container.
pub fn show(document: &web::Document, screen: Screen) {
    for s in Screen::ALL {
        if let Some(el) = document.get_element_by_id(s.element_id()) {
            let cl = el.class_list();
            if s == screen {
                _ = cl.remove_1("hidden");
                // fallback for environments without CSS class
                _ = el.set_attribute("style", "");
            } else {
                _ = cl.add_1("hidden");
                _ = el.set_attribute("style", "display:none");
            }
        }
    }
    // the 3D canvas is only live while creating and baking
    let live = matches!(screen, Screen::Creator | Screen::Baking);
    dom::set_hidden(document, "cake-canvas", !live);
    if live {
        if let Some(canvas) = dom::by_id::<web::HtmlCanvasElement>(document, "cake-canvas") {
            dom::sync_canvas_backing_size(&canvas);
        }
    }
}

fn step_panel(step: CreatorStep) -> &'static str {
    match step {
        CreatorStep::Generate => "creator-generate",
        CreatorStep::Preview => "creator-preview",
        CreatorStep::Card => "creator-card",
    }
}

/// Sync the creator screen with the session.
pub fn render_creator(document: &web::Document, session: &CreatorSession) {
    for step in [CreatorStep::Generate, CreatorStep::Preview, CreatorStep::Card] {
        dom::set_hidden(document, step_panel(step), step != session.step());
    }
    dom::set_hidden(document, "generating", !session.is_generating());
    dom::set_disabled(document, "generate-btn", !session.can_generate());
    dom::set_image(document, "upload-preview", session.upload());
    dom::set_image(document, "cake-image", session.cake_image());
    dom::set_disabled(document, "save-card-btn", session.message.trim().is_empty());

    let draft = session.draft();
    dom::set_text(document, "shape-label", draft.shape_kind().label());
    dom::set_text(document, "layers-label", &draft.layer_count().to_string());
    dom::set_hidden(document, "outline-panel", draft.shape_kind() != ShapeKind::Custom);
    dom::fill_buttons(
        document,
        "decoration-list",
        "data-remove",
        draft
            .decoration_list()
            .iter()
            .map(|d| (d.id.as_str(), format!("{} \u{2715}", d.model))),
    );
}

pub fn render_baking(document: &web::Document, progress: f32) {
    let pct = (progress.clamp(0.0, 1.0) * 100.0).round();
    dom::set_text(document, "baking-percent", &format!("{pct:.0}%"));
    if let Some(el) = dom::by_id::<web::HtmlElement>(document, "baking-bar") {
        _ = el.style().set_property("width", &format!("{pct:.0}%"));
    }
}
