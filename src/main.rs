//! Twin Guardians - headless native runner
//!
//! Plays a seeded run with the autopilot and logs the outcome. Usage:
//! `twin-guardians [settings.json]`. Set `RUST_LOG=info` (or `debug`) for
//! the play-by-play.

use twin_guardians::Settings;
use twin_guardians::consts::{MAX_SUBSTEPS, SIM_DT};
use twin_guardians::sim::{GameEvent, GameState, Snapshot, TickInput, tick};

/// Simulated display refresh for the frame loop
const FRAME_DT: f32 = 1.0 / 144.0;
/// Give up after this much simulated time
const MAX_RUN_SECONDS: f32 = 30.0 * 60.0;

/// Game instance holding all state
struct Game {
    state: GameState,
    accumulator: f32,
    input: TickInput,
}

impl Game {
    fn new(seed: u64, settings: Settings) -> Self {
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        Self {
            state: GameState::new(seed, settings),
            accumulator: 0.0,
            input,
        }
    }

    /// Run simulation ticks for one frame
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = self.input.clone();
            tick(&mut self.state, &input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.clear_triggers();

            for event in self.state.drain_events() {
                self.handle_event(event);
            }
        }
    }

    fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::PerkDraft { perks } => {
                let names: Vec<_> = perks.iter().map(|p| p.name()).collect();
                log::info!("Perk draft: {}", names.join(", "));
            }
            GameEvent::AdvanceEncounter { carryover } => {
                log::info!(
                    "Advancing to encounter {} at level {}",
                    carryover.encounter + 1,
                    carryover.stats.level
                );
                if let Some(next) = self.state.advance_encounter() {
                    self.state = next;
                    self.accumulator = 0.0;
                }
            }
            GameEvent::Victory { score, elapsed, ticks } => {
                println!("Victory! score {score} in {elapsed:.1}s ({ticks} ticks)");
            }
            GameEvent::Defeat { score, elapsed, ticks } => {
                println!("Defeat. score {score} after {elapsed:.1}s ({ticks} ticks)");
            }
            other => log::debug!("{:?}", other),
        }
    }
}

fn load_settings() -> Settings {
    let Some(path) = std::env::args().nth(1) else {
        return Settings::default();
    };
    match std::fs::read_to_string(&path) {
        Ok(json) => match Settings::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path);
                settings
            }
            Err(e) => {
                log::warn!("Bad settings file {}: {}; using defaults", path, e);
                Settings::default()
            }
        },
        Err(e) => {
            log::warn!("Could not read {}: {}; using defaults", path, e);
            Settings::default()
        }
    }
}

fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    let settings = load_settings();
    let seed = settings.seed.unwrap_or_else(clock_seed);
    log::info!(
        "Twin Guardians (headless) starting: seed {}, {}",
        seed,
        settings.difficulty.as_str()
    );

    let mut game = Game::new(seed, settings);
    let mut frame_time = 0.0;
    while !game.state.phase.is_over() && frame_time < MAX_RUN_SECONDS {
        game.update(FRAME_DT);
        frame_time += FRAME_DT;
    }

    if !game.state.phase.is_over() {
        println!("Run still going after {:.0}s, stopping", MAX_RUN_SECONDS);
    }

    let snapshot = Snapshot::capture(&game.state);
    match snapshot.to_json() {
        Ok(json) => log::debug!("Final snapshot: {}", json),
        Err(e) => log::warn!("Snapshot serialization failed: {}", e),
    }
    println!(
        "Encounter {}, wave {}/{}, level {}, score {}",
        snapshot.hud.encounter + 1,
        snapshot.hud.wave,
        snapshot.hud.total_waves,
        snapshot.hud.level,
        snapshot.hud.score
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is embedded by a host on the web; nothing to run here
}
