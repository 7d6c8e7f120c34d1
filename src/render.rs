//! Presentation helpers
//!
//! The page draws tiles with CSS: a fill color and a `clip-path: polygon(...)`.
//! `SessionView` is the whole render-ready snapshot, serialized to JSON for the page.

use glam::Vec2;
use serde::Serialize;

use crate::audio::CueSink;
use crate::best_stats::{BestStats, BestStatsStore};
use crate::settings::Settings;
use crate::sim::{Color, Feedback, RunSummary, Session, ShapeTile};

/// `hsl(h, s%, l%)`
pub fn hsl_string(color: Color) -> String {
    format!("hsl({}, {}%, {}%)", color.h, color.s, color.l)
}

/// Low-alpha tint of the shape color for hover/press backgrounds
pub fn hover_bg_string(color: Color, alpha: f32) -> String {
    let h = color.h.min(360);
    let s = color.s.min(100);
    let l = color.l.min(100);
    format!("hsla({}, {}%, {}%, {})", h, s, l, alpha.clamp(0.0, 1.0))
}

/// Default hover alpha
pub const HOVER_ALPHA: f32 = 0.10;

/// CSS `polygon(...)` with one decimal per coordinate
pub fn clip_path(points: &[Vec2]) -> String {
    let coords: Vec<String> = points
        .iter()
        .map(|p| format!("{:.1}% {:.1}%", p.x, p.y))
        .collect();
    format!("polygon({})", coords.join(", "))
}

/// One tile, ready to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileView {
    pub fill: String,
    pub hover: String,
    pub clip_path: String,
    pub is_target: bool,
}

impl From<&ShapeTile> for TileView {
    fn from(tile: &ShapeTile) -> Self {
        Self {
            fill: hsl_string(tile.color),
            hover: hover_bg_string(tile.color, HOVER_ALPHA),
            clip_path: clip_path(&tile.polygon.points),
            is_target: tile.is_target,
        }
    }
}

/// Everything the page shows for the current frame
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub is_playing: bool,
    pub input_locked: bool,
    pub level: u32,
    pub time_left: u32,
    /// Time display turns red in the final countdown
    pub time_critical: bool,
    pub score: u64,
    pub attempts: u32,
    pub hits: u32,
    pub misses: u32,
    pub feedback: Option<Feedback>,
    pub slow_mo: bool,
    pub shake: bool,
    pub score_pop: Option<u64>,
    pub grid_size: usize,
    pub round_id: u64,
    pub tiles: Vec<TileView>,
    pub summary: Option<RunSummary>,
    pub best: BestStats,
}

impl SessionView {
    pub fn new<S: BestStatsStore, A: CueSink>(session: &Session<S, A>, settings: &Settings) -> Self {
        let state = session.state();
        let round = session.round();
        Self {
            is_playing: state.is_playing(),
            input_locked: state.input_locked(),
            level: state.level,
            time_left: state.time_left,
            time_critical: state.time_left <= session.tuning().countdown_window_secs,
            score: state.score,
            attempts: state.attempts,
            hits: state.hits,
            misses: state.misses,
            feedback: state.feedback,
            slow_mo: settings.effective_slow_mo(state.slow_mo),
            shake: settings.effective_shake(state.shake),
            score_pop: state.score_pop,
            grid_size: round.grid_size,
            round_id: round.round_id,
            tiles: if state.is_playing() {
                round.shapes.iter().map(TileView::from).collect()
            } else {
                Vec::new()
            },
            summary: session.summary().cloned(),
            best: session.best(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            log::warn!("View serialization failed: {}", e);
            "{}".to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullCues;
    use crate::best_stats::MemoryStore;

    #[test]
    fn test_color_strings() {
        let color = Color { h: 210, s: 80, l: 60 };
        assert_eq!(hsl_string(color), "hsl(210, 80%, 60%)");
        assert_eq!(hover_bg_string(color, 0.1), "hsla(210, 80%, 60%, 0.1)");

        let wild = Color { h: 999, s: 200, l: 0 };
        assert_eq!(hover_bg_string(wild, 2.0), "hsla(360, 100%, 0%, 1)");
    }

    #[test]
    fn test_clip_path_one_decimal() {
        let points = [Vec2::new(90.0, 50.0), Vec2::new(30.04, 84.64), Vec2::new(30.0, 15.36)];
        assert_eq!(
            clip_path(&points),
            "polygon(90.0% 50.0%, 30.0% 84.6%, 30.0% 15.4%)"
        );
    }

    #[test]
    fn test_view_follows_session() {
        let mut session = Session::new(MemoryStore::new(), NullCues, 3);
        let settings = Settings::default();

        let idle = SessionView::new(&session, &settings);
        assert!(!idle.is_playing);
        assert!(idle.tiles.is_empty());
        assert_eq!(idle.best.best_level, 1);

        session.start(0);
        let view = SessionView::new(&session, &settings);
        assert!(view.is_playing);
        assert_eq!(view.tiles.len(), 4);
        assert_eq!(view.tiles.iter().filter(|t| t.is_target).count(), 1);
        assert!(!view.time_critical);
        assert!(view.to_json().contains("\"level\":1"));
    }
}
