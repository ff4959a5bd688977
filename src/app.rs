use crate::audio::Audio;
use crate::camera::OrbitCamera;
use crate::input::OrbitDrag;
use gloo_events::EventListener;
use std::cell::RefCell;
use std::rc::Rc;
use wishverse_core::creator::CreatorSession;
use wishverse_core::scene::{Animator, RetainedScene};
use wishverse_core::{CakeConfig, Manipulator, Screen, Wizard};

pub type Shared = Rc<RefCell<App>>;

/// Everything the event handlers and the frame loop share.
#[derive(Default)]
pub struct App {
    pub wizard: Wizard,
    pub creator: CreatorSession,
    pub manipulator: Manipulator,
    pub orbit: OrbitCamera,
    pub orbit_drag: OrbitDrag,
    pub animator: Animator,
    pub scene: RetainedScene,
    pub audio: Audio,
    /// Window listeners that live exactly as long as a manipulation session.
    pub session_listeners: Vec<EventListener>,
}

impl App {
    pub fn shared() -> Shared {
        Rc::new(RefCell::new(App::default()))
    }

    pub fn view_config(&self) -> Option<&CakeConfig> {
        view_config(&self.wizard, &self.creator)
    }

    pub fn sync_orbit(&mut self) {
        self.orbit.enabled = self.creator.orbit_enabled();
        if !self.orbit.enabled {
            self.orbit_drag.end();
        }
    }

    /// End any manipulation session and release its listeners.
    /// Returns the listeners so the caller can drop them after releasing the borrow.
    pub fn end_manipulation(&mut self) -> Vec<EventListener> {
        let App {
            manipulator, creator, ..
        } = &mut *self;
        if manipulator.end(creator) {
            self.sync_orbit();
        }
        std::mem::take(&mut self.session_listeners)
    }

    /// Fresh creator state for a new run through the wizard.
    pub fn reset_creator(&mut self) {
        self.creator = CreatorSession::new();
        self.manipulator = Manipulator::new();
        self.orbit.reset();
        self.sync_orbit();
    }
}

/// Configuration shown in the 3D view, if the current screen has one.
pub fn view_config<'a>(wizard: &'a Wizard, creator: &'a CreatorSession) -> Option<&'a CakeConfig> {
    match wizard.screen() {
        Screen::Creator => Some(creator.draft()),
        Screen::Baking => Some(wizard.config()),
        Screen::Home | Screen::Final => None,
    }
}
