//! Headless driver.
//!
//! Runs a scripted gesture sequence against a simulation and logs throughput.
//!
//! ```text
//! handfield [config.json] [frames]
//! ```

use std::env;
use std::error::Error;
use std::f32::consts::TAU;

use env_logger::{Builder, Env};
use handfield::prelude::*;
use log::{error, info};

const DEFAULT_FRAMES: u64 = 1_200;
const PHASE_FRAMES: u64 = 90;

/// Hand reading for `frame` of the demo script.
///
/// The palm circles the cloud while the gesture steps through every mode.
fn scripted_reading(frame: u64) -> HandReading {
    let angle = frame as f32 / 240.0 * TAU;
    let palm = Vec3::new(angle.cos() * 0.8, angle.sin() * 0.5, 0.3);

    match (frame / PHASE_FRAMES) % 9 {
        0 => HandReading::at(palm, Gesture::None),
        1 => HandReading::at(palm, Gesture::Open),
        2 => HandReading::at(palm, Gesture::Fist),
        3 => HandReading::at(palm, Gesture::Open),
        4 => {
            let tips: Vec<Vec3> = (0..5)
                .map(|k| palm + Vec3::new(-0.2 + 0.1 * k as f32, 0.25, 0.0))
                .collect();
            HandReading::at(palm, Gesture::Pinch).with_fingertips(tips)
        }
        5 => {
            let reading = HandReading::at(palm, Gesture::Swipe);
            if frame % PHASE_FRAMES == 0 {
                reading.with_swipe(Vec2::new(0.02, -0.005))
            } else {
                reading
            }
        }
        6 => {
            let hold = (frame % PHASE_FRAMES) as f32 / (PHASE_FRAMES / 2) as f32;
            HandReading::at(palm, Gesture::Peace).with_hold(hold)
        }
        7 => HandReading::at(palm, Gesture::Repel),
        _ => HandReading::absent(),
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);

    let config = match args.next() {
        Some(path) => {
            info!("loading config from {}", path);
            SimulationConfig::load(&path)?
        }
        None => SimulationConfig::default(),
    };
    let frames = match args.next() {
        Some(raw) => raw.parse::<u64>()?,
        None => DEFAULT_FRAMES,
    };

    let mut sim = Simulation::new(config)?;
    let mut clock = FrameClock::new();
    let mut vertices: Vec<ParticleVertex> = Vec::new();

    for frame in 0..frames {
        if let Some(event) = sim.set_hand(scripted_reading(frame)) {
            info!("frame {}: {:?}", frame, event);
        }
        sim.tick();
        sim.store().write_vertices(&mut vertices);
        clock.tick();

        if clock.frame() % 60 == 0 {
            info!(
                "frame {:>5} | {:>7.1} fps | pass {:>3.0}% | drift {:.4} | {} | explosion {:.2}",
                clock.frame(),
                clock.fps(),
                sim.progress() * 100.0,
                sim.store().mean_displacement(),
                sim.formation().name(),
                sim.hand().explosion_force(),
            );
        }
    }

    info!(
        "ran {} frames of {} particles in {:.2}s",
        frames,
        sim.particle_count(),
        clock.elapsed()
    );
    Ok(())
}

fn main() {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}
