//! Decoration manipulation state machine.
//!
//! `Idle -> Active(Dragging | Pinching) -> Idle`. Wheel input scales the
//! active decoration in either sub-state. The machine owns no decoration
//! data: it reports changes through a [`ManipulationSink`] and the owner of
//! the configuration merges them by id.
//!
//! Rays are expected in the decoration group's local frame; see
//! [`Ray::transformed`].

use crate::config::{Decoration, DecorationId, DecorationPatch};
use crate::constants::{clamp_scale, WHEEL_SCALE_PER_DELTA};
use crate::state::Ray;
use glam::{Vec2, Vec3};

/// Receiver for manipulation side effects.
pub trait ManipulationSink {
    /// A decoration's position and/or scale changed.
    fn decoration_changed(&mut self, id: &DecorationId, patch: DecorationPatch);
    /// Ambient camera orbit should be honored (`true`) or suppressed (`false`).
    fn set_orbit_enabled(&mut self, enabled: bool);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchStart {
    pub distance: f32,
    pub scale: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    Dragging,
    Pinching(PinchStart),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub id: DecorationId,
    /// Height of the horizontal drag plane, fixed at session start.
    pub plane_y: f32,
    /// Last scale reported for this decoration.
    pub scale: f32,
    pub gesture: Gesture,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Phase {
    #[default]
    Idle,
    Active(Session),
}

#[derive(Debug, Default)]
pub struct Manipulator {
    phase: Phase,
}

impl Manipulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Active(_))
    }

    pub fn active_id(&self) -> Option<&DecorationId> {
        match &self.phase {
            Phase::Active(s) => Some(&s.id),
            Phase::Idle => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(
            self.phase,
            Phase::Active(Session {
                gesture: Gesture::Dragging,
                ..
            })
        )
    }

    /// Pointer-down on a decoration's hit region. Only one decoration can be
    /// active at a time: while a session is running further grabs are ignored
    /// and `false` is returned.
    pub fn begin(&mut self, deco: &Decoration, sink: &mut dyn ManipulationSink) -> bool {
        if let Phase::Active(s) = &self.phase {
            log::debug!("[drag] ignoring grab of {} while {} is active", deco.id, s.id);
            return false;
        }
        self.phase = Phase::Active(Session {
            id: deco.id.clone(),
            plane_y: deco.position[1],
            scale: clamp_scale(deco.scale),
            gesture: Gesture::Dragging,
        });
        sink.set_orbit_enabled(false);
        log::info!("[drag] begin on {}", deco.id);
        true
    }

    /// Pointer move. Projects the ray onto the session's drag plane and
    /// reports the new position. Misses (parallel ray, hit behind the camera)
    /// skip the update. Returns the reported position, if any.
    pub fn drag(&mut self, ray: &Ray, sink: &mut dyn ManipulationSink) -> Option<Vec3> {
        let Phase::Active(session) = &self.phase else {
            return None;
        };
        if session.gesture != Gesture::Dragging {
            return None;
        }
        let hit = ray.intersect_horizontal_plane(session.plane_y)?;
        let position = Vec3::new(hit.x, session.plane_y, hit.z);
        sink.decoration_changed(&session.id, DecorationPatch::position(position));
        Some(position)
    }

    /// Wheel input while active. Returns the new scale.
    pub fn wheel(&mut self, delta_y: f32, sink: &mut dyn ManipulationSink) -> Option<f32> {
        let Phase::Active(session) = &mut self.phase else {
            return None;
        };
        let scale = wheel_scale(session.scale, delta_y);
        session.scale = scale;
        sink.decoration_changed(&session.id, DecorationPatch::scale(scale));
        Some(scale)
    }

    /// Touch move with the current touch points (client pixels). Two touches
    /// start or continue a pinch; anything else ends the pinch and returns to
    /// dragging. Returns the new scale when one was reported.
    pub fn touches(&mut self, points: &[Vec2], sink: &mut dyn ManipulationSink) -> Option<f32> {
        let Phase::Active(session) = &mut self.phase else {
            return None;
        };
        let [a, b] = points else {
            session.gesture = Gesture::Dragging;
            return None;
        };
        let distance = a.distance(*b);
        match session.gesture {
            Gesture::Dragging => {
                if distance > 0.0 {
                    session.gesture = Gesture::Pinching(PinchStart {
                        distance,
                        scale: session.scale,
                    });
                }
                None
            }
            Gesture::Pinching(start) => {
                let scale = pinch_scale(start.scale, start.distance, distance);
                session.scale = scale;
                sink.decoration_changed(&session.id, DecorationPatch::scale(scale));
                Some(scale)
            }
        }
    }

    /// Pointer-up, pointer-cancel or an explicit abort. Ends the session and
    /// re-enables orbit exactly once. Returns false when already idle.
    pub fn end(&mut self, sink: &mut dyn ManipulationSink) -> bool {
        match std::mem::take(&mut self.phase) {
            Phase::Active(session) => {
                sink.set_orbit_enabled(true);
                log::info!("[drag] end on {}", session.id);
                true
            }
            Phase::Idle => false,
        }
    }
}

#[inline]
pub fn wheel_scale(current: f32, delta_y: f32) -> f32 {
    if !delta_y.is_finite() {
        return clamp_scale(current);
    }
    clamp_scale(current - delta_y * WHEEL_SCALE_PER_DELTA)
}

#[inline]
pub fn pinch_scale(start_scale: f32, start_distance: f32, distance: f32) -> f32 {
    if start_distance <= 0.0 || !start_distance.is_finite() || !distance.is_finite() {
        return clamp_scale(start_scale);
    }
    clamp_scale(start_scale * distance / start_distance)
}
