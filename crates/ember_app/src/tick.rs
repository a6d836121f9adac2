//! Fixed-timestep tick loop for the demo scene.

use std::time::{Duration, Instant};

use ember_scene::Scene;
use tracing::debug;

/// Configuration for the demo tick loop.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Number of ticks to run.
    pub max_ticks: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 120,
        }
    }
}

/// Run the scene for the configured number of fixed-timestep ticks.
pub fn run(scene: &mut Scene, config: &TickConfig) {
    let dt = 1.0 / config.tick_rate;
    let tick_duration = Duration::from_secs_f64(dt);

    for tick in 0..config.max_ticks {
        let started = Instant::now();
        scene.tick(dt);

        let elapsed = started.elapsed();
        if elapsed < tick_duration {
            std::thread::sleep(tick_duration - elapsed);
        } else {
            debug!(tick, ?elapsed, "tick overran its budget");
        }
    }
}
