use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

pub fn by_id<T: JsCast>(document: &web::Document, id: &str) -> Option<T> {
    document.get_element_by_id(id).and_then(|el| el.dyn_into::<T>().ok())
}

#[inline]
pub fn add_click_listener(document: &web::Document, element_id: &str, mut handler: impl FnMut() + 'static) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
        _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    } else {
        log::warn!("[dom] missing #{element_id}");
    }
}

/// Listen for `input` events on a text field; the handler gets the new value.
pub fn add_input_listener(document: &web::Document, element_id: &str, mut handler: impl FnMut(String) + 'static) {
    let Some(el) = document.get_element_by_id(element_id) else {
        log::warn!("[dom] missing #{element_id}");
        return;
    };
    let target = el.clone();
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move || {
        handler(field_value(&target));
    }) as Box<dyn FnMut()>);
    _ = el.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
    closure.forget();
}

pub fn field_value(el: &web::Element) -> String {
    if let Some(t) = el.dyn_ref::<web::HtmlTextAreaElement>() {
        t.value()
    } else if let Some(i) = el.dyn_ref::<web::HtmlInputElement>() {
        i.value()
    } else if let Some(s) = el.dyn_ref::<web::HtmlSelectElement>() {
        s.value()
    } else {
        String::new()
    }
}

pub fn set_field_value(document: &web::Document, id: &str, value: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        if let Some(t) = el.dyn_ref::<web::HtmlTextAreaElement>() {
            t.set_value(value);
        } else if let Some(i) = el.dyn_ref::<web::HtmlInputElement>() {
            i.set_value(value);
        }
    }
}

pub fn set_text(document: &web::Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

pub fn set_hidden(document: &web::Document, id: &str, hidden: bool) {
    if let Some(el) = document.get_element_by_id(id) {
        let cl = el.class_list();
        _ = if hidden { cl.add_1("hidden") } else { cl.remove_1("hidden") };
    }
}

pub fn set_disabled(document: &web::Document, id: &str, disabled: bool) {
    if let Some(b) = by_id::<web::HtmlButtonElement>(document, id) {
        b.set_disabled(disabled);
    }
}

/// Show or clear an `<img>`; an empty source hides it.
pub fn set_image(document: &web::Document, id: &str, src: Option<&str>) {
    if let Some(img) = by_id::<web::HtmlImageElement>(document, id) {
        match src {
            Some(s) if !s.is_empty() => {
                img.set_src(s);
                _ = img.class_list().remove_1("hidden");
            }
            _ => {
                img.set_src("");
                _ = img.class_list().add_1("hidden");
            }
        }
    }
}

/// Blocking notice.
pub fn alert(message: &str) {
    if let Some(w) = web::window() {
        if let Err(e) = w.alert_with_message(message) {
            log::warn!("[dom] alert failed: {:?}", e);
        }
    }
}

/// `data-*` attribute on `#app`, if present and non-empty.
pub fn app_data(document: &web::Document, key: &str) -> Option<String> {
    let el = by_id::<web::HtmlElement>(document, "app")?;
    el.dataset().get(key).filter(|v| !v.trim().is_empty())
}

pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        let w_px = (rect.width() * dpr) as u32;
        let h_px = (rect.height() * dpr) as u32;
        canvas.set_width(w_px.max(1));
        canvas.set_height(h_px.max(1));
    }
}

/// One click listener on a container; the handler gets the `attr` value of
/// the nearest clicked element carrying it. Lets re-rendered children share it.
pub fn add_delegated_click(
    document: &web::Document,
    container_id: &str,
    attr: &'static str,
    mut handler: impl FnMut(String) + 'static,
) {
    let Some(el) = document.get_element_by_id(container_id) else {
        log::warn!("[dom] missing #{container_id}");
        return;
    };
    let selector = format!("[{attr}]");
    let closure = wasm_bindgen::closure::Closure::wrap(Box::new(move |ev: web::Event| {
        let value = ev
            .target()
            .and_then(|t| t.dyn_into::<web::Element>().ok())
            .and_then(|t| t.closest(&selector).ok().flatten())
            .and_then(|t| t.get_attribute(attr));
        if let Some(v) = value {
            handler(v);
        }
    }) as Box<dyn FnMut(_)>);
    _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Replace a container's children with buttons carrying `attr = value`.
pub fn fill_buttons<'a>(
    document: &web::Document,
    container_id: &str,
    attr: &str,
    items: impl IntoIterator<Item = (&'a str, String)>,
) {
    let Some(container) = document.get_element_by_id(container_id) else {
        return;
    };
    container.set_inner_html("");
    for (value, label) in items {
        let Ok(button) = document.create_element("button") else {
            continue;
        };
        _ = button.set_attribute("type", "button");
        _ = button.set_attribute(attr, value);
        button.set_text_content(Some(&label));
        _ = container.append_child(&button);
    }
}
