//! Round generation
//!
//! One uniform regular polygon repeated across a square grid, with exactly one
//! tile (the target) carrying a distorted copy. Difficulty comes only from the
//! outline: every tile shares the same color.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::tuning::Tuning;

/// Center of the 100x100 percentage box every polygon is drawn in
pub const SHAPE_CENTER: Vec2 = Vec2::new(50.0, 50.0);

/// HSL color; only the hue varies between rounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub h: u16,
    pub s: u8,
    pub l: u8,
}

/// Ordered vertex list in percentage units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Vec2>,
}

impl Polygon {
    pub fn sides(&self) -> usize {
        self.points.len()
    }
}

/// One grid cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeTile {
    pub color: Color,
    pub polygon: Polygon,
    pub is_target: bool,
}

/// Everything the page needs to draw one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundData {
    pub shapes: Vec<ShapeTile>,
    pub grid_size: usize,
    pub target_index: usize,
    /// Changes every round so the page remounts the grid
    pub round_id: u64,
}

impl Default for RoundData {
    fn default() -> Self {
        Self {
            shapes: Vec::new(),
            grid_size: 2,
            target_index: 0,
            round_id: 0,
        }
    }
}

impl RoundData {
    pub fn tile_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_target(&self, index: usize) -> bool {
        index == self.target_index
    }
}

/// Grid edge length for a level (monotonic step function, capped)
pub fn grid_size(level: u32, tuning: &Tuning) -> usize {
    tuning
        .grid_steps
        .iter()
        .find(|(max_level, _)| level <= *max_level)
        .map(|(_, size)| *size)
        .unwrap_or(tuning.max_grid_size)
        .max(1)
}

/// Random hue with the fixed "nice" saturation and lightness
pub fn base_color<R: Rng>(rng: &mut R, tuning: &Tuning) -> Color {
    Color {
        h: rng.random_range(0..360),
        s: tuning.saturation,
        l: tuning.lightness,
    }
}

/// Random side count, resampled a bounded number of times to avoid repeating
/// the previous round. A repeat is accepted once the retries run out.
pub fn pick_sides<R: Rng>(rng: &mut R, previous: Option<usize>, tuning: &Tuning) -> usize {
    let range = tuning.min_sides..=tuning.max_sides;
    let mut sides = rng.random_range(range.clone());
    let mut guard = 0;
    while Some(sides) == previous && guard < tuning.side_retry_limit {
        sides = rng.random_range(range.clone());
        guard += 1;
    }
    sides
}

/// Regular polygon centered in the box, first vertex at angle 0
pub fn regular_polygon(sides: usize, radius: f32) -> Polygon {
    let step = TAU / sides as f32;
    let points = (0..sides)
        .map(|i| SHAPE_CENTER + Vec2::from_angle(i as f32 * step) * radius)
        .collect();
    Polygon { points }
}

/// Number of vertices displaced on the target (difficulty cliff at 16)
pub fn distort_vertex_count(level: u32, tuning: &Tuning) -> usize {
    if level >= tuning.multi_vertex_level { 2 } else { 1 }
}

/// How far each chosen vertex moves, in percentage units
pub fn distortion_amount(level: u32, tuning: &Tuning) -> f32 {
    let regime = tuning.regime(level);
    let decayed = tuning.max_distortion * regime.decay.powi(level.saturating_sub(1) as i32);
    decayed.max(regime.floor)
}

/// Copy `base` and push `count` distinct vertices by `amount` in random directions.
///
/// Returns the distorted polygon and the indices that moved.
pub fn distort_polygon<R: Rng>(
    rng: &mut R,
    base: &Polygon,
    amount: f32,
    count: usize,
) -> (Polygon, Vec<usize>) {
    let mut distorted = base.clone();
    let sides = base.sides();
    let count = count.clamp(1, sides.max(1));
    if sides == 0 {
        return (distorted, Vec::new());
    }

    let chosen: Vec<usize> = rand::seq::index::sample(rng, sides, count).into_vec();
    for &index in &chosen {
        let direction = rng.random_range(0.0..TAU);
        distorted.points[index] += Vec2::from_angle(direction) * amount;
    }
    (distorted, chosen)
}

/// Build the next round.
///
/// Returns the round and the side count it used, which the caller feeds back as
/// `previous_sides` for the following round.
pub fn generate_round<R: Rng>(
    rng: &mut R,
    level: u32,
    previous_sides: Option<usize>,
    previous_round_id: u64,
    tuning: &Tuning,
) -> (RoundData, usize) {
    let grid_size = grid_size(level, tuning);
    let total_shapes = grid_size * grid_size;

    let color = base_color(rng, tuning);
    let sides = pick_sides(rng, previous_sides, tuning);
    let base = regular_polygon(sides, tuning.radius);

    let amount = distortion_amount(level, tuning);
    let vertex_count = distort_vertex_count(level, tuning);
    let (target, moved) = distort_polygon(rng, &base, amount, vertex_count);

    let target_index = rng.random_range(0..total_shapes);

    let shapes = (0..total_shapes)
        .map(|i| {
            let is_target = i == target_index;
            ShapeTile {
                color,
                polygon: if is_target { target.clone() } else { base.clone() },
                is_target,
            }
        })
        .collect();

    log::debug!(
        "Round {}: level {}, {}x{} grid, {} sides, distortion {:.2} on vertices {:?}, target {}",
        previous_round_id + 1,
        level,
        grid_size,
        grid_size,
        sides,
        amount,
        moved,
        target_index
    );

    let round = RoundData {
        shapes,
        grid_size,
        target_index,
        round_id: previous_round_id + 1,
    };
    (round, sides)
}
