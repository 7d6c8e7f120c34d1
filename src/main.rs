//! Warp Spot entry point
//!
//! On the web the library is loaded as a wasm module (see `platform::web`). The
//! native binary plays one headless demo run with a scripted player on a simulated
//! clock and prints the summary as JSON.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use warp_spot::audio::NullCues;
    use warp_spot::consts::CLOCK_PERIOD_MS;
    use warp_spot::platform::entropy_seed;
    use warp_spot::sim::ClickOutcome;
    use warp_spot::{MemoryStore, Session, Tuning};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let tuning = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => Tuning::from_json(&json).unwrap_or_else(|e| {
                log::warn!("Bad tuning file {}: {}", path, e);
                Tuning::default()
            }),
            Err(e) => {
                log::warn!("Could not read {}: {}", path, e);
                Tuning::default()
            }
        },
        None => Tuning::default(),
    };

    let seed = entropy_seed();
    log::info!("Warp Spot demo, seed {}", seed);

    let mut session = Session::with_tuning(MemoryStore::new(), NullCues, seed, tuning);
    // The bot gets slower and sloppier as the grid grows
    let mut bot = Pcg32::seed_from_u64(seed ^ 0xB07);

    let mut now = 0u64;
    session.start(now);
    let mut next_click = now + 900;

    while session.state().is_playing() {
        now += CLOCK_PERIOD_MS;
        session.tick(now);

        if now >= next_click && !session.state().input_locked() && session.state().is_playing()
        {
            let round = session.round();
            let grid = round.grid_size;
            let miss_chance = 0.02 * grid as f64 + 0.004 * session.state().level as f64;
            let index = if bot.random_bool(miss_chance.min(0.9)) {
                (round.target_index + 1) % round.tile_count()
            } else {
                round.target_index
            };
            let outcome = session.handle_click(index, now);
            if outcome == ClickOutcome::Hit {
                log::info!(
                    "Level {} cleared with {}s left",
                    session.state().level,
                    session.state().time_left
                );
            }
            next_click = now + 600 + bot.random_range(0..250) * grid as u64;
        }
    }

    match session.summary() {
        Some(summary) => match serde_json::to_string_pretty(summary) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Could not print summary: {}", e),
        },
        None => log::error!("Run ended without a summary"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Entry point is `platform::web::init`, run by wasm-bindgen on module load
}
