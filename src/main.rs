//! Kickabout entry point
//!
//! Runs one match headlessly: the autopilot plays the avatar until every
//! ball is kicked or the time limit runs out.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use glam::Vec3;

use kickabout::consts::SIM_DT;
use kickabout::sim::{FieldBounds, KinematicWorld, Match, MatchEvent, autopilot_input};
use kickabout::MatchTuning;

#[derive(Debug, Parser)]
#[command(name = "kickabout", about = "Headless ball-kicking match runner")]
struct Args {
    /// RNG seed for spawn points and targets
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// JSON tuning file (defaults used for missing fields)
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Override the number of balls
    #[arg(long)]
    balls: Option<u32>,

    /// Give up after this many simulated seconds
    #[arg(long, default_value_t = 300.0)]
    max_seconds: f32,

    /// Print the match summary as JSON on exit
    #[arg(long)]
    summary: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut tuning = match &args.tuning {
        Some(path) => MatchTuning::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => MatchTuning::default(),
    };
    if let Some(balls) = args.balls {
        tuning.ball_count = balls;
    }
    for warning in tuning.sanity_warnings() {
        log::warn!("Tuning: {}", warning);
    }

    // Practice pitch: 40 x 60, floor at y = 0
    let bounds = FieldBounds::from_corners(Vec3::new(-20.0, 0.0, -30.0), Vec3::new(20.0, 4.0, 30.0))?;
    let world = KinematicWorld::new(bounds.min().y);
    let mut game = Match::new(tuning, Some(bounds), world, args.seed);
    log::info!("Match started with seed {}", args.seed);

    let mut next_level = None;
    while game.elapsed_secs() < args.max_seconds {
        let input = autopilot_input(&game);
        game.frame(SIM_DT, &input);

        for event in game.drain_events() {
            match event {
                MatchEvent::BallKicked {
                    id,
                    kicked,
                    total,
                    multiplier,
                } => {
                    log::info!(
                        "[{:6.2}s] ball {} kicked ({}/{}), speed x{:.2}",
                        game.elapsed_secs(),
                        id,
                        kicked,
                        total,
                        multiplier
                    );
                }
                MatchEvent::BallRemoved { id } => log::debug!("ball {} removed", id),
                MatchEvent::MatchComplete { next_level: level, .. } => next_level = Some(level),
            }
        }

        if let Some(level) = &next_level {
            log::info!("Match complete after {:.2}s, loading {}", game.elapsed_secs(), level);
            break;
        }
    }

    if next_level.is_none() {
        let c = game.controller();
        log::warn!(
            "Time limit reached with {}/{} balls kicked",
            c.kicked_count(),
            c.total_balls()
        );
    }

    if args.summary {
        println!("{}", serde_json::to_string_pretty(&game.summary())?);
    }
    Ok(())
}
