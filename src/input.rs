use glam::Vec2;

/// Camera orbit drag in progress (only when no decoration is active).
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct OrbitDrag {
    pub active: bool,
    pub pointer_id: i32,
    pub last: Vec2,
}

impl OrbitDrag {
    pub fn begin(&mut self, pointer_id: i32, at: Vec2) {
        *self = OrbitDrag {
            active: true,
            pointer_id,
            last: at,
        };
    }

    /// Movement since the last call, or `None` when not orbiting with this pointer.
    pub fn step(&mut self, pointer_id: i32, at: Vec2) -> Option<Vec2> {
        if !self.active || self.pointer_id != pointer_id {
            return None;
        }
        let delta = at - self.last;
        self.last = at;
        Some(delta)
    }

    pub fn end(&mut self) {
        self.active = false;
    }
}

// ---------------- Pointer helpers ----------------

/// Canvas-relative CSS pixels to normalized device coordinates (x right, y up).
#[inline]
pub fn css_to_ndc(x_css: f32, y_css: f32, width_css: f32, height_css: f32) -> Option<Vec2> {
    if width_css <= 0.0 || height_css <= 0.0 {
        return None;
    }
    Some(Vec2::new(
        (2.0 * x_css / width_css) - 1.0,
        1.0 - (2.0 * y_css / height_css),
    ))
}

#[inline]
pub fn aspect(width_px: u32, height_px: u32) -> f32 {
    width_px.max(1) as f32 / height_px.max(1) as f32
}

// ---------------- Keyboard ----------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// Drop the active decoration and re-enable orbit.
    Release,
    /// Delete the active decoration.
    RemoveActive,
    ResetCamera,
}

#[inline]
pub fn action_for_key(key: &str) -> Option<KeyAction> {
    match key {
        "Escape" => Some(KeyAction::Release),
        "Delete" | "Backspace" => Some(KeyAction::RemoveActive),
        "r" | "R" => Some(KeyAction::ResetCamera),
        _ => None,
    }
}
