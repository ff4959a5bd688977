//! Screen flow: Home -> Creator -> Baking -> Final -> Home.
//!
//! The wizard owns the single `CakeConfig`. Baking is driven by `tick` from
//! the frame loop, so the whole timeline is deterministic under test.

use crate::config::CakeConfig;
use crate::constants::{BAKE_DURATION_MS, BAKE_SETTLE_MS, BAKE_STEP_MS};
use smallvec::SmallVec;
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Screen {
    #[default]
    Home,
    Creator,
    Baking,
    Final,
}

impl Screen {
    pub const ALL: [Screen; 4] = [Screen::Home, Screen::Creator, Screen::Baking, Screen::Final];

    /// DOM id of the screen's container.
    pub fn element_id(self) -> &'static str {
        match self {
            Screen::Home => "screen-home",
            Screen::Creator => "screen-creator",
            Screen::Baking => "screen-baking",
            Screen::Final => "screen-final",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("cannot {action} from the {from} screen")]
    InvalidTransition { from: Screen, action: &'static str },
    #[error("the cake has no generated image")]
    MissingImage,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WizardEvent {
    /// Baking progress changed, in [0, 1].
    Progress(f32),
    /// Baking reached 100%; fires once per bake.
    Chime,
    /// Moved to the Final screen.
    Finished,
}

pub type WizardEvents = SmallVec<[WizardEvent; 3]>;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct BakingClock {
    elapsed_ms: u32,
    progress: f32,
    chimed: bool,
}

#[derive(Debug, Default)]
pub struct Wizard {
    screen: Screen,
    config: CakeConfig,
    baking: Option<BakingClock>,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn config(&self) -> &CakeConfig {
        &self.config
    }

    /// `Some(progress)` while on the Baking screen.
    pub fn baking_progress(&self) -> Option<f32> {
        self.baking.map(|b| b.progress)
    }

    fn require(&self, screen: Screen, action: &'static str) -> Result<(), WizardError> {
        if self.screen != screen {
            log::warn!("[wizard] rejected {action} on {}", self.screen);
            return Err(WizardError::InvalidTransition {
                from: self.screen,
                action,
            });
        }
        Ok(())
    }

    fn go(&mut self, to: Screen) {
        log::info!("[wizard] {} -> {}", self.screen, to);
        self.screen = to;
    }

    pub fn start(&mut self) -> Result<(), WizardError> {
        self.require(Screen::Home, "start")?;
        self.config = CakeConfig::default();
        self.go(Screen::Creator);
        Ok(())
    }

    pub fn back(&mut self) -> Result<(), WizardError> {
        self.require(Screen::Creator, "go back")?;
        self.go(Screen::Home);
        Ok(())
    }

    /// Submit the finished configuration and start baking.
    pub fn finish(&mut self, config: CakeConfig) -> Result<(), WizardError> {
        self.require(Screen::Creator, "finish")?;
        if !config.has_image() {
            return Err(WizardError::MissingImage);
        }
        self.config = config;
        self.baking = Some(BakingClock::default());
        self.go(Screen::Baking);
        Ok(())
    }

    /// Advance the baking timeline by `dt_ms`. A no-op outside Baking.
    pub fn tick(&mut self, dt_ms: u32) -> WizardEvents {
        let mut events = WizardEvents::new();
        let Some(clock) = self.baking.as_mut() else {
            return events;
        };
        clock.elapsed_ms = clock.elapsed_ms.saturating_add(dt_ms);

        let progress = bake_progress(clock.elapsed_ms);
        if progress != clock.progress {
            clock.progress = progress;
            events.push(WizardEvent::Progress(progress));
        }
        if progress >= 1.0 && !clock.chimed {
            clock.chimed = true;
            events.push(WizardEvent::Chime);
        }
        if clock.elapsed_ms >= BAKE_DURATION_MS + BAKE_SETTLE_MS {
            self.baking = None;
            self.go(Screen::Final);
            events.push(WizardEvent::Finished);
        }
        events
    }

    pub fn set_message(&mut self, message: impl Into<String>) -> Result<(), WizardError> {
        self.require(Screen::Final, "edit the message")?;
        self.config.message = message.into();
        Ok(())
    }

    /// Back to Home with a fresh configuration.
    pub fn restart(&mut self) -> Result<(), WizardError> {
        self.require(Screen::Final, "restart")?;
        self.config = CakeConfig::default();
        self.baking = None;
        self.go(Screen::Home);
        Ok(())
    }
}

/// Linear progress in whole steps: `min(step / steps, 1)`.
pub fn bake_progress(elapsed_ms: u32) -> f32 {
    let steps = (BAKE_DURATION_MS / BAKE_STEP_MS).max(1);
    let step = elapsed_ms / BAKE_STEP_MS;
    (step as f32 / steps as f32).min(1.0)
}
