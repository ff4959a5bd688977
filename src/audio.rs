use crate::constants::*;
use web_sys as web;

// Create a GainNode with an initial value; logs on failure
fn create_gain(audio_ctx: &web::AudioContext, value: f32, label: &str) -> Result<web::GainNode, ()> {
    match web::GainNode::new(audio_ctx) {
        Ok(g) => {
            g.gain().set_value(value);
            Ok(g)
        }
        Err(e) => {
            log::error!("[audio] {} GainNode error: {:?}", label, e);
            Err(())
        }
    }
}

/// Lazily created context; browsers only allow audio after a user gesture,
/// so the first click that starts the wizard calls `ensure`.
#[derive(Default)]
pub struct Audio {
    ctx: Option<web::AudioContext>,
}

impl Audio {
    pub fn ensure(&mut self) -> Option<&web::AudioContext> {
        if self.ctx.is_none() {
            match web::AudioContext::new() {
                Ok(ctx) => self.ctx = Some(ctx),
                Err(e) => {
                    log::warn!("[audio] AudioContext unavailable: {:?}", e);
                    return None;
                }
            }
        }
        let ctx = self.ctx.as_ref()?;
        _ = ctx.resume();
        Some(ctx)
    }

    /// Rising sine sweep with a long exponential fade.
    pub fn chime(&mut self) {
        let Some(ctx) = self.ensure() else {
            return;
        };
        if play_chime(ctx).is_err() {
            log::error!("[audio] chime failed");
        }
    }
}

fn play_chime(ctx: &web::AudioContext) -> Result<(), ()> {
    let osc = web::OscillatorNode::new(ctx).map_err(|e| log::error!("[audio] oscillator: {:?}", e))?;
    let gain = create_gain(ctx, CHIME_GAIN, "Chime")?;
    osc.set_type(web::OscillatorType::Sine);

    let now = ctx.current_time();
    let freq = osc.frequency();
    _ = freq.set_value_at_time(CHIME_START_HZ, now);
    _ = freq.exponential_ramp_to_value_at_time(CHIME_END_HZ, now + CHIME_SWEEP_SEC);
    _ = gain.gain().set_value_at_time(CHIME_GAIN, now);
    _ = gain
        .gain()
        .exponential_ramp_to_value_at_time(CHIME_FLOOR_GAIN, now + CHIME_DURATION_SEC);

    _ = osc.connect_with_audio_node(&gain);
    _ = gain.connect_with_audio_node(&ctx.destination());
    _ = osc.start_with_when(now);
    _ = osc.stop_with_when(now + CHIME_DURATION_SEC);
    log::info!("[audio] chime");
    Ok(())
}
