//! Match controller: ball pool, difficulty and completion
//!
//! The controller is the only owner of the pool. Balls report a successful
//! kick through [`MatchController::kick_ball`]; the controller then counts it,
//! rescales every surviving ball and decides whether the match is over.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ball::{BallId, BallState, RoamingBall};
use super::bounds::FieldBounds;
use super::physics::{BodyHandle, EntityTag, PhysicsWorld};
use crate::error::MatchError;
use crate::tuning::MatchTuning;

/// Match lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Nothing spawned (not started, or started without field bounds)
    Idle,
    Running,
    /// Every ball kicked; completion already signalled
    Complete,
}

/// Events for the host, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    BallKicked {
        id: BallId,
        kicked: u32,
        total: u32,
        multiplier: f32,
    },
    BallRemoved {
        id: BallId,
    },
    /// Level transition signal, emitted exactly once per match
    MatchComplete {
        kicked: u32,
        next_level: String,
    },
}

/// What `on_ball_kicked` did with a report
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KickReport {
    /// Counted; remaining balls now run at `multiplier`
    Counted { kicked: u32, multiplier: f32 },
    /// Counted and it was the last ball
    Completed { kicked: u32 },
    /// Not in the pool, still roaming, or the match is already over
    Ignored,
}

/// Difficulty multiplier for `kicked` of `total` balls.
///
/// Linear in the kicked fraction: 1 at the start, `1 + factor` once the pool
/// is empty. An empty match stays at 1.
pub fn difficulty_multiplier(kicked: u32, total: u32, factor: f32) -> f32 {
    if total == 0 {
        return 1.0;
    }
    1.0 + factor * (kicked as f32 / total as f32)
}

/// Owns every ball of one match
#[derive(Debug, Clone)]
pub struct MatchController {
    tuning: MatchTuning,
    bounds: Option<FieldBounds>,
    /// Ball entities still in the world (active and in flight), sorted by id
    balls: Vec<RoamingBall>,
    /// Ids of balls still in play
    pool: Vec<BallId>,
    kicked_count: u32,
    total_balls: u32,
    multiplier: f32,
    phase: MatchPhase,
    events: Vec<MatchEvent>,
    missing_bounds_reported: bool,
    next_id: BallId,
}

impl MatchController {
    pub fn new(tuning: MatchTuning, bounds: Option<FieldBounds>) -> Self {
        Self {
            tuning,
            bounds,
            balls: Vec::new(),
            pool: Vec::new(),
            kicked_count: 0,
            total_balls: 0,
            multiplier: 1.0,
            phase: MatchPhase::Idle,
            events: Vec::new(),
            missing_bounds_reported: false,
            next_id: 1,
        }
    }

    /// Spawn `n` balls at random points in the inset field
    pub fn spawn_all<R: Rng + ?Sized, W: PhysicsWorld + ?Sized>(
        &mut self,
        n: u32,
        world: &mut W,
        rng: &mut R,
    ) -> Result<usize, MatchError> {
        let Some(bounds) = self.bounds else {
            if !self.missing_bounds_reported {
                log::error!("{}", MatchError::MissingFieldBounds);
                self.missing_bounds_reported = true;
            }
            return Err(MatchError::MissingFieldBounds);
        };
        if self.phase != MatchPhase::Idle {
            return Err(MatchError::AlreadyStarted);
        }
        if n == 0 {
            return Err(MatchError::NoBalls);
        }

        let height = bounds.spawn_height(self.tuning.spawn_height_offset);
        for _ in 0..n {
            let pos = bounds.sample_point(self.tuning.edge_margin, height, rng);
            let body = world.spawn_body(EntityTag::Ball, pos, false);
            let id = self.next_id;
            self.next_id += 1;
            self.balls.push(RoamingBall::new(id, body, pos, &bounds, &self.tuning, rng));
            self.pool.push(id);
        }

        self.total_balls = n;
        self.kicked_count = 0;
        self.phase = MatchPhase::Running;
        self.broadcast_multiplier();
        log::info!("Spawned {} balls", n);
        Ok(n as usize)
    }

    /// Count a kicked ball, rescale the survivors, complete when empty.
    ///
    /// Only a ball that has already left the Active state is counted; a
    /// report for a ball still roaming would empty the pool under it.
    pub fn on_ball_kicked(&mut self, id: BallId) -> KickReport {
        if self.phase == MatchPhase::Complete {
            log::error!("Kick report for ball {} after match completion rejected", id);
            return KickReport::Ignored;
        }
        let Some(index) = self.pool.iter().position(|&b| b == id) else {
            log::warn!("Kick report for ball {} not in pool ignored", id);
            return KickReport::Ignored;
        };
        if self.ball(id).is_none_or(|ball| ball.is_active()) {
            log::warn!("Kick report for ball {} that was never kicked ignored", id);
            return KickReport::Ignored;
        }

        self.kicked_count += 1;
        self.pool.swap_remove(index);
        log::info!("Balls kicked: {}/{}", self.kicked_count, self.total_balls);

        if self.kicked_count >= self.total_balls {
            self.phase = MatchPhase::Complete;
            self.multiplier = difficulty_multiplier(self.kicked_count, self.total_balls, self.tuning.difficulty_factor);
            self.events.push(MatchEvent::BallKicked {
                id,
                kicked: self.kicked_count,
                total: self.total_balls,
                multiplier: self.multiplier,
            });
            self.events.push(MatchEvent::MatchComplete {
                kicked: self.kicked_count,
                next_level: self.tuning.next_level.clone(),
            });
            log::info!("All balls kicked, next level: {}", self.tuning.next_level);
            return KickReport::Completed {
                kicked: self.kicked_count,
            };
        }

        self.broadcast_multiplier();
        self.events.push(MatchEvent::BallKicked {
            id,
            kicked: self.kicked_count,
            total: self.total_balls,
            multiplier: self.multiplier,
        });
        KickReport::Counted {
            kicked: self.kicked_count,
            multiplier: self.multiplier,
        }
    }

    /// Kick a ball and report the transition if it took effect.
    ///
    /// Returns `None` when the ball does not exist or was not active.
    pub fn kick_ball<W: PhysicsWorld + ?Sized>(
        &mut self,
        id: BallId,
        direction: Vec3,
        force: f32,
        world: &mut W,
    ) -> Option<KickReport> {
        let min_lift = self.tuning.kick_min_lift;
        let ball = self.balls.iter_mut().find(|b| b.id == id)?;
        if !ball.kick(direction, force, min_lift, world) {
            return None;
        }
        Some(self.on_ball_kicked(id))
    }

    /// Timers: retargeting, flight time, and reaping removed balls
    pub fn tick<R: Rng + ?Sized, W: PhysicsWorld + ?Sized>(&mut self, dt: f32, world: &mut W, rng: &mut R) {
        let Some(bounds) = self.bounds else {
            return;
        };
        for ball in &mut self.balls {
            ball.tick(dt, &bounds, &self.tuning, rng);
        }

        let events = &mut self.events;
        self.balls.retain(|ball| {
            if ball.state == BallState::Removed {
                world.despawn_body(ball.body);
                events.push(MatchEvent::BallRemoved { id: ball.id });
                false
            } else {
                true
            }
        });
    }

    /// Steering step for every ball
    pub fn fixed_tick<R: Rng + ?Sized, W: PhysicsWorld + ?Sized>(&mut self, dt: f32, world: &mut W, rng: &mut R) {
        let Some(bounds) = self.bounds else {
            return;
        };
        for ball in &mut self.balls {
            ball.fixed_tick(dt, &bounds, &self.tuning, rng, world);
        }
    }

    fn broadcast_multiplier(&mut self) {
        self.multiplier = difficulty_multiplier(self.kicked_count, self.total_balls, self.tuning.difficulty_factor);
        for ball in self.balls.iter_mut().filter(|b| self.pool.contains(&b.id)) {
            ball.set_speed_multiplier(self.multiplier);
        }
    }

    /// Take all events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn ball(&self, id: BallId) -> Option<&RoamingBall> {
        self.balls.iter().find(|b| b.id == id)
    }

    /// Ball owning a physics body, if it is still in the world
    pub fn ball_by_body(&self, body: BodyHandle) -> Option<&RoamingBall> {
        self.balls.iter().find(|b| b.body == body)
    }

    pub fn balls(&self) -> &[RoamingBall] {
        &self.balls
    }

    pub fn pool(&self) -> &[BallId] {
        &self.pool
    }

    pub fn bounds(&self) -> Option<&FieldBounds> {
        self.bounds.as_ref()
    }

    pub fn tuning(&self) -> &MatchTuning {
        &self.tuning
    }

    pub fn kicked_count(&self) -> u32 {
        self.kicked_count
    }

    pub fn total_balls(&self) -> u32 {
        self.total_balls
    }

    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == MatchPhase::Complete
    }
}
