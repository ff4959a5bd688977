use crate::constants::MAX_FRAME_DT_MS;

/// Time elapsed since the previous frame, split by consumer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStep {
    /// Wall time for the wizard's bake timeline, never clamped.
    pub wizard_ms: u32,
    /// Seconds for camera and decoration animation, capped at `MAX_FRAME_DT_MS`.
    pub anim_dt_sec: f32,
}

impl FrameStep {
    pub fn from_elapsed_ms(elapsed_ms: u128) -> Self {
        let wizard_ms = elapsed_ms.min(u32::MAX as u128) as u32;
        Self {
            wizard_ms,
            anim_dt_sec: wizard_ms.min(MAX_FRAME_DT_MS) as f32 / 1000.0,
        }
    }
}
