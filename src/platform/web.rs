//! Browser entry point
//!
//! The page owns the DOM. It creates one `WarpSpot`, calls `tick()` on a
//! `setInterval` of `CLOCK_PERIOD_MS`, forwards tile clicks to `click()`, and
//! re-renders from `view_json()` after each call.

use wasm_bindgen::prelude::*;

use crate::audio::{Cue, WebAudioCues};
use crate::best_stats::LocalStorageStore;
use crate::render::SessionView;
use crate::settings::Settings;
use crate::sim::{ClickOutcome, Session};
use crate::tuning::Tuning;

fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    // A second init (e.g. hot reload) keeps the existing logger
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Warp Spot loaded");
}

#[wasm_bindgen]
pub struct WarpSpot {
    session: Session<LocalStorageStore, WebAudioCues>,
    settings: Settings,
}

#[wasm_bindgen]
impl WarpSpot {
    /// Create a game; `tuning_json` may be empty for the default balance
    #[wasm_bindgen(constructor)]
    pub fn new(tuning_json: Option<String>) -> WarpSpot {
        let tuning = match tuning_json.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(json) => Tuning::from_json(json).unwrap_or_else(|e| {
                log::warn!("Bad tuning, using defaults: {}", e);
                Tuning::default()
            }),
            None => Tuning::default(),
        };
        let settings = Settings::load_from(&LocalStorageStore);
        let audio = WebAudioCues::new(&settings);
        let session = Session::with_tuning(
            LocalStorageStore,
            audio,
            super::entropy_seed(),
            tuning,
        );
        WarpSpot { session, settings }
    }

    pub fn start(&mut self) {
        self.session.start(now_ms());
    }

    pub fn tick(&mut self) {
        self.session.tick(now_ms());
    }

    /// Returns "hit", "miss" or "ignored"
    pub fn click(&mut self, index: usize) -> String {
        match self.session.handle_click(index, now_ms()) {
            ClickOutcome::Hit => "hit",
            ClickOutcome::Miss => "miss",
            ClickOutcome::Ignored => "ignored",
        }
        .to_string()
    }

    /// Hover over the start button (mouse pointers only)
    pub fn hover_start(&mut self) {
        self.session.ui_cue(Cue::Tap, 0.55);
    }

    pub fn set_volume(&mut self, master: f32, sfx: f32) {
        self.settings.master_volume = master.clamp(0.0, 1.0);
        self.settings.sfx_volume = sfx.clamp(0.0, 1.0);
        self.apply_settings();
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
        self.apply_settings();
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.settings.reduced_motion = reduced;
        self.settings.save_to(&mut LocalStorageStore);
    }

    fn apply_settings(&mut self) {
        self.session.audio_mut().apply_settings(&self.settings);
        self.settings.save_to(&mut LocalStorageStore);
    }

    pub fn view_json(&self) -> String {
        SessionView::new(&self.session, &self.settings).to_json()
    }
}
