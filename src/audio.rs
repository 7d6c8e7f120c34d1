//! Audio cues
//!
//! The game only names *what happened*; a sink decides how it sounds. Playback is
//! best-effort: the session logs and discards any error a sink returns.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semantic sound events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    /// Button hover
    Tap,
    /// Final countdown beep, also played when results appear
    Caution,
    /// Run started
    Celebration,
    /// Correct click / timeout results revealed
    Notification,
    /// Wrong click
    Disabled,
    /// Silence any countdown sound still ringing
    StopCountdown,
}

impl Cue {
    pub fn name(&self) -> &'static str {
        match self {
            Cue::Tap => "tap",
            Cue::Caution => "caution",
            Cue::Celebration => "celebration",
            Cue::Notification => "notification",
            Cue::Disabled => "disabled",
            Cue::StopCountdown => "stopCountdown",
        }
    }
}

#[derive(Debug, Error)]
pub enum CueError {
    #[error("audio is not available")]
    Unavailable,
    #[error("audio graph error: {0}")]
    Graph(String),
}

/// Anything that can play cues
pub trait CueSink {
    fn play(&mut self, cue: Cue, volume: f32) -> Result<(), CueError>;
}

/// Silent sink (native runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCues;

impl CueSink for NullCues {
    fn play(&mut self, _cue: Cue, _volume: f32) -> Result<(), CueError> {
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudioCues;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{Cue, CueError, CueSink};
    use crate::settings::Settings;

    fn graph_err(e: wasm_bindgen::JsValue) -> CueError {
        CueError::Graph(format!("{:?}", e))
    }

    /// Procedural Web Audio cues - no sample files needed
    pub struct WebAudioCues {
        ctx: Option<AudioContext>,
        master_volume: f32,
        sfx_volume: f32,
        muted: bool,
        /// Countdown beeps still ringing, silenced by `Cue::StopCountdown`
        countdown: Vec<OscillatorNode>,
    }

    impl WebAudioCues {
        pub fn new(settings: &Settings) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: settings.master_volume,
                sfx_volume: settings.sfx_volume,
                muted: settings.muted,
                countdown: Vec::new(),
            }
        }

        pub fn apply_settings(&mut self, settings: &Settings) {
            self.master_volume = settings.master_volume.clamp(0.0, 1.0);
            self.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
            self.muted = settings.muted;
        }

        fn effective_volume(&self, volume: f32) -> f32 {
            if self.muted {
                0.0
            } else {
                self.master_volume * self.sfx_volume * volume.clamp(0.0, 1.0)
            }
        }

        /// Oscillator routed through a gain node to the speakers
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Result<(OscillatorNode, GainNode), CueError> {
            let osc = ctx.create_oscillator().map_err(graph_err)?;
            let gain = ctx.create_gain().map_err(graph_err)?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).map_err(graph_err)?;
            gain.connect_with_audio_node(&ctx.destination())
                .map_err(graph_err)?;

            Ok((osc, gain))
        }

        /// One enveloped note starting `offset` seconds from now
        fn note(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
            peak: f32,
            offset: f64,
            length: f64,
        ) -> Result<OscillatorNode, CueError> {
            let (osc, gain) = Self::create_osc(ctx, freq, osc_type)?;
            let t = ctx.current_time() + offset;

            gain.gain().set_value_at_time(0.0, t).map_err(graph_err)?;
            gain.gain()
                .linear_ramp_to_value_at_time(peak, t + 0.01)
                .map_err(graph_err)?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + length)
                .map_err(graph_err)?;

            osc.start_with_when(t).map_err(graph_err)?;
            osc.stop_with_when(t + length + 0.02).map_err(graph_err)?;
            Ok(osc)
        }

        fn play_tap(ctx: &AudioContext, vol: f32) -> Result<(), CueError> {
            Self::note(ctx, 660.0, OscillatorType::Sine, vol * 0.3, 0.0, 0.05)?;
            Ok(())
        }

        fn play_caution(&mut self, ctx: &AudioContext, vol: f32) -> Result<(), CueError> {
            let high = Self::note(ctx, 880.0, OscillatorType::Square, vol * 0.15, 0.0, 0.08)?;
            let low = Self::note(ctx, 660.0, OscillatorType::Square, vol * 0.15, 0.1, 0.08)?;
            self.countdown.push(high);
            self.countdown.push(low);
            // Beeps are short; only the most recent few can still be ringing
            let excess = self.countdown.len().saturating_sub(8);
            self.countdown.drain(..excess);
            Ok(())
        }

        fn play_celebration(ctx: &AudioContext, vol: f32) -> Result<(), CueError> {
            // C major arpeggio
            for (i, freq) in [523.25, 659.25, 783.99, 1046.5].into_iter().enumerate() {
                Self::note(
                    ctx,
                    freq,
                    OscillatorType::Triangle,
                    vol * 0.3,
                    i as f64 * 0.08,
                    0.2,
                )?;
            }
            Ok(())
        }

        fn play_notification(ctx: &AudioContext, vol: f32) -> Result<(), CueError> {
            Self::note(ctx, 987.77, OscillatorType::Sine, vol * 0.35, 0.0, 0.12)?;
            Self::note(ctx, 1318.5, OscillatorType::Sine, vol * 0.3, 0.07, 0.18)?;
            Ok(())
        }

        fn play_disabled(ctx: &AudioContext, vol: f32) -> Result<(), CueError> {
            let (osc, gain) = Self::create_osc(ctx, 220.0, OscillatorType::Sawtooth)?;
            let t = ctx.current_time();

            gain.gain()
                .set_value_at_time(vol * 0.25, t)
                .map_err(graph_err)?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                .map_err(graph_err)?;
            osc.frequency().set_value_at_time(220.0, t).map_err(graph_err)?;
            osc.frequency()
                .exponential_ramp_to_value_at_time(110.0, t + 0.3)
                .map_err(graph_err)?;

            osc.start().map_err(graph_err)?;
            osc.stop_with_when(t + 0.35).map_err(graph_err)?;
            Ok(())
        }

        fn stop_countdown(&mut self) {
            for osc in self.countdown.drain(..) {
                // Already-finished oscillators throw; nothing to do about it
                let _ = osc.stop();
            }
        }
    }

    impl CueSink for WebAudioCues {
        fn play(&mut self, cue: Cue, volume: f32) -> Result<(), CueError> {
            if cue == Cue::StopCountdown {
                self.stop_countdown();
                return Ok(());
            }

            let vol = self.effective_volume(volume);
            if vol <= 0.0 {
                return Ok(());
            }

            let ctx = self.ctx.clone().ok_or(CueError::Unavailable)?;

            // Browsers keep the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match cue {
                Cue::Tap => Self::play_tap(&ctx, vol),
                Cue::Caution => self.play_caution(&ctx, vol),
                Cue::Celebration => Self::play_celebration(&ctx, vol),
                Cue::Notification => Self::play_notification(&ctx, vol),
                Cue::Disabled => Self::play_disabled(&ctx, vol),
                Cue::StopCountdown => Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_names() {
        assert_eq!(Cue::StopCountdown.name(), "stopCountdown");
        assert_eq!(Cue::Celebration.name(), "celebration");
    }

    #[test]
    fn test_null_sink_never_fails() {
        let mut sink = NullCues;
        assert!(sink.play(Cue::Caution, 0.9).is_ok());
    }
}
