//! Match scheduler
//!
//! Owns everything one match needs and drives it the same way every frame:
//! a variable-rate `tick` (input, kick window, timers) followed by as many
//! fixed-rate steps as the accumulator allows (steering, avatar, physics).

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::avatar::Avatar;
use super::bounds::FieldBounds;
use super::controller::{MatchController, MatchEvent};
use super::kick::KickDetector;
use super::physics::PhysicsWorld;
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::error::MatchError;
use crate::tuning::MatchTuning;

/// Input commands for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Forward/back axis (-1..1, +Z)
    pub move_forward: f32,
    /// Strafe axis (-1..1, +X)
    pub move_right: f32,
    pub run: bool,
    /// Kick pressed this frame (edge-triggered)
    pub kick: bool,
    /// Jump pressed this frame (edge-triggered)
    pub jump: bool,
}

/// End-of-run report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    pub seed: u64,
    pub kicked: u32,
    pub total: u32,
    pub multiplier: f32,
    pub elapsed_secs: f32,
    pub complete: bool,
    pub next_level: Option<String>,
}

/// One match: controller, avatar, kick detector, physics world and RNG
pub struct Match<W: PhysicsWorld> {
    seed: u64,
    rng: Pcg32,
    world: W,
    controller: MatchController,
    avatar: Avatar,
    detector: KickDetector,
    /// Latest input, reused by every fixed step of the frame
    input: TickInput,
    accumulator: f32,
    time_ticks: u64,
}

impl<W: PhysicsWorld> Match<W> {
    /// Set up a match and spawn its balls.
    ///
    /// Without field bounds nothing is spawned and the match stays idle; the
    /// avatar still exists so the host can keep running.
    pub fn new(tuning: MatchTuning, bounds: Option<FieldBounds>, mut world: W, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);

        let avatar_pos = bounds
            .map(|b| Vec3::new(b.center().x, b.min().y, b.center().z))
            .unwrap_or(Vec3::ZERO);
        let avatar = Avatar::spawn(&mut world, avatar_pos, &tuning);
        let detector = KickDetector::new(&tuning);

        let ball_count = tuning.ball_count;
        let mut controller = MatchController::new(tuning, bounds);
        match controller.spawn_all(ball_count, &mut world, &mut rng) {
            Ok(_) | Err(MatchError::MissingFieldBounds) => {}
            Err(err) => log::error!("Match not started: {}", err),
        }

        Self {
            seed,
            rng,
            world,
            controller,
            avatar,
            detector,
            input: TickInput::default(),
            accumulator: 0.0,
            time_ticks: 0,
        }
    }

    /// Advance by one rendered frame
    pub fn frame(&mut self, frame_dt: f32, input: &TickInput) {
        let dt = frame_dt.clamp(0.0, MAX_FRAME_DT);
        self.tick(dt, input);

        self.accumulator += dt;
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.fixed_tick(SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
    }

    /// Variable-rate step: input edges, kick window, ball timers
    pub fn tick(&mut self, dt: f32, input: &TickInput) {
        self.input = *input;

        if input.jump && !self.detector.movement_locked() {
            self.avatar.try_jump(&mut self.world);
        }
        if input.kick && self.detector.start_kick() {
            self.avatar.halt(&mut self.world);
        }

        let origin = self.avatar.kick_origin(&self.world);
        self.detector.tick(dt, origin, &mut self.controller, &mut self.world);
        self.controller.tick(dt, &mut self.world, &mut self.rng);
    }

    /// Fixed-rate step: ball steering, then the avatar, then physics
    pub fn fixed_tick(&mut self, dt: f32) {
        self.controller.fixed_tick(dt, &mut self.world, &mut self.rng);
        self.avatar.fixed_tick(&self.input, self.detector.movement_locked(), dt, &mut self.world);
        self.world.step(dt);
        self.time_ticks += 1;
    }

    /// Events raised since the last call
    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        self.controller.drain_events()
    }

    pub fn controller(&self) -> &MatchController {
        &self.controller
    }

    pub fn avatar(&self) -> &Avatar {
        &self.avatar
    }

    pub fn detector(&self) -> &KickDetector {
        &self.detector
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Simulated seconds (fixed steps only)
    pub fn elapsed_secs(&self) -> f32 {
        self.time_ticks as f32 * SIM_DT
    }

    pub fn is_complete(&self) -> bool {
        self.controller.is_complete()
    }

    pub fn summary(&self) -> MatchSummary {
        let complete = self.controller.is_complete();
        MatchSummary {
            seed: self.seed,
            kicked: self.controller.kicked_count(),
            total: self.controller.total_balls(),
            multiplier: self.controller.multiplier(),
            elapsed_secs: self.elapsed_secs(),
            complete,
            next_level: complete.then(|| self.controller.tuning().next_level.clone()),
        }
    }
}
