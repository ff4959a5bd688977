use crate::app::{view_config, App, Shared};
use crate::clock::FrameStep;
use crate::card;
use crate::input;
use crate::render;
use crate::screens;
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;
use wishverse_core::scene::{build_scene, SceneView};
use wishverse_core::{Screen, WizardEvent};

pub struct FrameContext<'a> {
    pub app: Shared,
    pub canvas: web::HtmlCanvasElement,
    pub gpu: Option<render::GpuState<'a>>,
    pub last_instant: Instant,
}

impl<'a> FrameContext<'a> {
    pub fn frame(&mut self) {
        let now = Instant::now();
        let step = FrameStep::from_elapsed_ms((now - self.last_instant).as_millis());
        self.last_instant = now;

        let mut app_ref = self.app.borrow_mut();
        let app = &mut *app_ref;
        for ev in app.wizard.tick(step.wizard_ms) {
            match ev {
                WizardEvent::Progress(p) => {
                    if let Some(document) = crate::dom::window_document() {
                        screens::render_baking(&document, p);
                    }
                }
                WizardEvent::Chime => app.audio.chime(),
                WizardEvent::Finished => {
                    if let Some(document) = crate::dom::window_document() {
                        screens::show(&document, Screen::Final);
                        card::render_final(&document, app.wizard.config());
                    }
                }
            }
        }

        let App {
            wizard,
            creator,
            manipulator,
            orbit,
            animator,
            scene,
            ..
        } = app;
        let Some(config) = view_config(wizard, creator) else {
            // nothing 3D on this screen; drop retained nodes so the next view starts clean
            if !scene.is_empty() {
                let diff = scene.clear();
                if let Some(g) = &mut self.gpu {
                    g.apply(&diff, scene.nodes().map(|n| &n.key), None);
                }
            }
            return;
        };

        let baking = wizard.baking_progress();
        if baking.is_some() {
            orbit.auto_rotate(step.anim_dt_sec);
        }
        animator.advance(step.anim_dt_sec, config.decoration_list());

        let nodes = build_scene(
            config,
            &SceneView {
                baking_progress: baking,
                active: manipulator.active_id(),
                animator: &*animator,
            },
        );
        let diff = scene.update(nodes);

        let Some(g) = &mut self.gpu else {
            return;
        };
        g.apply(&diff, scene.nodes().map(|n| &n.key), config.custom_path.as_deref());
        g.resize_if_needed(self.canvas.width(), self.canvas.height());
        let (w, h) = g.size();
        let camera = orbit.camera(input::aspect(w, h));
        drop(app_ref);
        match g.render(&camera) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("[gpu] surface lost; reconfiguring");
                g.reconfigure();
            }
            Err(e) => log::error!("[gpu] render error: {:?}", e),
        }
    }
}

pub async fn init_gpu(canvas: &web::HtmlCanvasElement) -> Option<render::GpuState<'static>> {
    // leak a canvas clone to satisfy 'static lifetime for surface
    let leaked_canvas = Box::leak(Box::new(canvas.clone()));
    match render::GpuState::new(leaked_canvas).await {
        Ok(g) => Some(g),
        Err(e) => {
            log::error!("WebGPU init error: {:?}", e);
            None
        }
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext<'static>>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    let frame_ctx_tick = frame_ctx.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        frame_ctx_tick.borrow_mut().frame();
        request_frame(&tick_clone);
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}

fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    let (Some(w), Some(cb)) = (web::window(), tick.borrow().as_ref().map(|c| c.as_ref().clone())) else {
        return;
    };
    _ = w.request_animation_frame(cb.unchecked_ref());
}
