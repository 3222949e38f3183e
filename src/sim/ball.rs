//! Roaming balls
//!
//! A ball wanders the field by seeking random targets, until a kick hands it
//! to the physics world. After a fixed flight time it is removed.

use glam::{Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::bounds::FieldBounds;
use super::physics::{BodyHandle, PhysicsWorld};
use crate::tuning::MatchTuning;
use crate::{flatten, slew_facing, smoothing_factor};

pub type BallId = u32;

/// Ball lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BallState {
    /// Roaming the field under its own steering
    Active,
    /// In flight after a kick; `elapsed` counts toward removal
    Kicked { elapsed: f32 },
    /// Terminal, waiting to be reaped by the controller
    Removed,
}

/// A roaming ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoamingBall {
    pub id: BallId,
    pub body: BodyHandle,
    pub pos: Vec3,
    pub vel: Vec3,
    /// Smoothed planar travel direction
    pub heading: Vec3,
    pub facing: Quat,
    pub target: Vec3,
    pub state: BallState,
    pub speed_multiplier: f32,
    pub retarget_timer: f32,
    /// Height the ball is pinned to while active
    pub spawn_height: f32,
    needs_retarget: bool,
}

impl RoamingBall {
    /// Create an active ball at `pos` and pick its first target
    pub fn new<R: Rng + ?Sized>(
        id: BallId,
        body: BodyHandle,
        pos: Vec3,
        bounds: &FieldBounds,
        tuning: &MatchTuning,
        rng: &mut R,
    ) -> Self {
        let mut ball = Self {
            id,
            body,
            pos,
            vel: Vec3::ZERO,
            heading: Vec3::ZERO,
            facing: Quat::IDENTITY,
            target: pos,
            state: BallState::Active,
            speed_multiplier: 1.0,
            retarget_timer: 0.0,
            spawn_height: pos.y,
            needs_retarget: false,
        };
        ball.pick_new_target(bounds, tuning, rng);
        ball
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == BallState::Active
    }

    /// Choose a fresh seek point inside the inset field and restart the timer
    pub fn pick_new_target<R: Rng + ?Sized>(&mut self, bounds: &FieldBounds, tuning: &MatchTuning, rng: &mut R) {
        self.target = bounds.sample_point(tuning.edge_margin, self.spawn_height, rng);
        self.retarget_timer = 0.0;
        self.needs_retarget = false;
    }

    /// Whether the target is within the arrival radius (XZ distance)
    pub fn arrived(&self, arrival_radius: f32) -> bool {
        flatten(self.target - self.pos).length() <= arrival_radius
    }

    /// Variable-rate update: retarget timer while active, flight timer once kicked
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: f32, bounds: &FieldBounds, tuning: &MatchTuning, rng: &mut R) {
        match self.state {
            BallState::Active => {
                self.retarget_timer += dt;
                if self.retarget_timer >= tuning.retarget_interval {
                    self.pick_new_target(bounds, tuning, rng);
                }
            }
            BallState::Kicked { elapsed } => {
                let elapsed = elapsed + dt;
                self.state = if elapsed >= tuning.removal_delay {
                    BallState::Removed
                } else {
                    BallState::Kicked { elapsed }
                };
            }
            BallState::Removed => {}
        }
    }

    /// Fixed-rate update: steer and contain while active, follow physics once kicked
    pub fn fixed_tick<R: Rng + ?Sized, W: PhysicsWorld + ?Sized>(
        &mut self,
        dt: f32,
        bounds: &FieldBounds,
        tuning: &MatchTuning,
        rng: &mut R,
        world: &mut W,
    ) {
        match self.state {
            BallState::Active => {
                if self.needs_retarget || self.arrived(tuning.arrival_radius) {
                    self.pick_new_target(bounds, tuning, rng);
                }
                self.seek_step(dt, tuning);
                if self.clamp_to_bounds(bounds, tuning.edge_margin) {
                    self.pick_new_target(bounds, tuning, rng);
                }
                world.set_position(self.body, self.pos);
                world.set_linear_velocity(self.body, self.vel);
            }
            BallState::Kicked { .. } => {
                if let Some(pos) = world.position(self.body) {
                    self.pos = pos;
                }
                if let Some(vel) = world.linear_velocity(self.body) {
                    self.vel = vel;
                }
            }
            BallState::Removed => {}
        }
    }

    /// Advance toward the target along a smoothed planar heading
    pub fn seek_step(&mut self, dt: f32, tuning: &MatchTuning) {
        let desired = flatten(self.target - self.pos).normalize_or_zero();
        if desired == Vec3::ZERO {
            self.vel = Vec3::ZERO;
            return;
        }

        let alpha = smoothing_factor(tuning.steering_smoothing, dt);
        // A straight lerp through a full reversal never turns; swing via the side
        let from = if self.heading.dot(desired) < -0.99 {
            desired.cross(Vec3::Y)
        } else {
            self.heading
        };
        let blended = from.lerp(desired, alpha).normalize_or_zero();
        self.heading = if blended == Vec3::ZERO { desired } else { blended };

        // Negative multipliers pass straight through the cap and reverse the ball
        let speed = (tuning.ball_base_speed * self.speed_multiplier).min(tuning.ball_max_speed);
        self.vel = self.heading * speed;
        self.pos += self.vel * dt;
        self.facing = slew_facing(self.facing, self.heading, tuning.ball_turn_rate, dt);
    }

    /// Keep the ball inside the inset field and on its plane.
    ///
    /// Returns true when X or Z had to be moved; the ball is then flagged
    /// for an immediate retarget so it heads back toward the interior.
    pub fn clamp_to_bounds(&mut self, bounds: &FieldBounds, margin: f32) -> bool {
        let clamped = bounds.clamp_xz(self.pos, margin);
        let moved = clamped.x != self.pos.x || clamped.z != self.pos.z;
        self.pos = Vec3::new(clamped.x, self.spawn_height, clamped.z);
        if moved {
            self.needs_retarget = true;
        }
        moved
    }

    /// Overwrite the difficulty multiplier. Not validated.
    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.speed_multiplier = multiplier;
    }

    /// Kick the ball. Only an active ball reacts.
    ///
    /// Returns true exactly once, on the Active to Kicked transition; the
    /// caller reports that to the match controller.
    pub fn kick<W: PhysicsWorld + ?Sized>(&mut self, direction: Vec3, force: f32, min_lift: f32, world: &mut W) -> bool {
        if !self.is_active() {
            return false;
        }
        self.state = BallState::Kicked { elapsed: 0.0 };
        self.vel = Vec3::ZERO;
        self.heading = Vec3::ZERO;

        let mut dir = direction;
        dir.y = dir.y.max(min_lift);
        let dir = dir.normalize_or(Vec3::Y);

        world.set_linear_velocity(self.body, Vec3::ZERO);
        world.set_dynamic(self.body, true);
        world.apply_impulse(self.body, dir, force);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::physics::{EntityTag, KinematicWorld};
    use crate::yaw_rotation;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn setup(seed: u64) -> (FieldBounds, MatchTuning, Pcg32, KinematicWorld, RoamingBall) {
        let bounds = FieldBounds::from_corners(Vec3::new(-20.0, 0.0, -30.0), Vec3::new(20.0, 4.0, 30.0)).unwrap();
        let tuning = MatchTuning::default();
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut world = KinematicWorld::new(0.0);
        let pos = Vec3::new(0.0, bounds.spawn_height(tuning.spawn_height_offset), 0.0);
        let body = world.spawn_body(EntityTag::Ball, pos, false);
        let ball = RoamingBall::new(1, body, pos, &bounds, &tuning, &mut rng);
        (bounds, tuning, rng, world, ball)
    }

    #[test]
    fn test_stays_contained_while_roaming() {
        let (bounds, mut tuning, mut rng, mut world, mut ball) = setup(42);
        tuning.ball_max_speed = 50.0;
        ball.set_speed_multiplier(10.0);

        for _ in 0..5000 {
            ball.tick(SIM_DT, &bounds, &tuning, &mut rng);
            ball.fixed_tick(SIM_DT, &bounds, &tuning, &mut rng, &mut world);
            assert!(bounds.contains_xz(ball.pos, tuning.edge_margin), "escaped: {:?}", ball.pos);
            assert_eq!(ball.pos.y, 0.5);
            assert_eq!(world.position(ball.body), Some(ball.pos));
        }
    }

    #[test]
    fn test_moves_toward_target() {
        let (bounds, tuning, mut rng, mut world, mut ball) = setup(3);
        ball.target = Vec3::new(10.0, 0.5, 0.0);
        ball.fixed_tick(SIM_DT, &bounds, &tuning, &mut rng, &mut world);
        assert!(ball.pos.x > 0.0);
        assert!(ball.vel.length() <= tuning.ball_base_speed + 1e-4);
    }

    #[test]
    fn test_heading_and_facing_lag_behind_target() {
        let (_, tuning, _, _, mut ball) = setup(3);
        ball.heading = Vec3::X;
        ball.target = Vec3::new(0.0, 0.5, 10.0);
        ball.seek_step(SIM_DT, &tuning);
        assert!(ball.heading.z > 0.0);
        assert!(ball.heading.x > ball.heading.z, "turned too far: {:?}", ball.heading);
        assert!(ball.facing.angle_between(Quat::IDENTITY) > 0.0);
        assert!(ball.facing.angle_between(yaw_rotation(ball.heading)) > 0.1);

        // Without smoothing the heading snaps straight to the target
        let (_, mut snappy, _, _, mut ball) = setup(3);
        snappy.steering_smoothing = 0.0;
        ball.heading = Vec3::X;
        ball.target = Vec3::new(0.0, 0.5, 10.0);
        ball.seek_step(SIM_DT, &snappy);
        assert!((ball.heading - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_reversal_turns_gradually() {
        let (_, tuning, _, _, mut ball) = setup(3);
        ball.heading = Vec3::X;
        ball.target = Vec3::new(-10.0, 0.5, 0.0);
        ball.seek_step(SIM_DT, &tuning);
        assert!(ball.heading.x < 0.0);
        assert!(ball.heading.x > -0.5, "reversed in one step: {:?}", ball.heading);

        for _ in 0..50 {
            ball.seek_step(SIM_DT, &tuning);
        }
        assert!(ball.heading.x < -0.9, "never came around: {:?}", ball.heading);
    }

    #[test]
    fn test_speed_capped() {
        let (_, tuning, _, _, mut ball) = setup(3);
        ball.target = Vec3::new(10.0, 0.5, 0.0);
        ball.set_speed_multiplier(100.0);
        ball.seek_step(SIM_DT, &tuning);
        assert!((ball.vel.length() - tuning.ball_max_speed).abs() < 1e-3);
    }

    #[test]
    fn test_negative_multiplier_reverses() {
        let (_, tuning, _, _, mut ball) = setup(3);
        ball.target = Vec3::new(10.0, 0.5, 0.0);
        ball.set_speed_multiplier(-1.0);
        ball.seek_step(SIM_DT, &tuning);
        assert!(ball.pos.x < 0.0);
    }

    #[test]
    fn test_retarget_on_arrival() {
        let (bounds, tuning, mut rng, mut world, mut ball) = setup(9);
        ball.target = ball.pos + Vec3::new(0.1, 0.0, 0.0);
        ball.retarget_timer = 1.0;
        ball.fixed_tick(SIM_DT, &bounds, &tuning, &mut rng, &mut world);
        assert_eq!(ball.retarget_timer, 0.0);
        assert!(bounds.contains_xz(ball.target, tuning.edge_margin));
    }

    #[test]
    fn test_retarget_on_timer() {
        let (bounds, tuning, mut rng, _, mut ball) = setup(9);
        let first = ball.target;
        ball.tick(tuning.retarget_interval - 0.01, &bounds, &tuning, &mut rng);
        assert_eq!(ball.target, first);
        ball.tick(0.02, &bounds, &tuning, &mut rng);
        assert_ne!(ball.target, first);
        assert_eq!(ball.retarget_timer, 0.0);
    }

    #[test]
    fn test_clamp_flags_retarget() {
        let (bounds, tuning, mut rng, mut world, mut ball) = setup(5);
        ball.pos = Vec3::new(30.0, 2.0, 0.0);
        assert!(ball.clamp_to_bounds(&bounds, tuning.edge_margin));
        assert_eq!(ball.pos, Vec3::new(19.5, 0.5, 0.0));
        assert!(ball.needs_retarget);

        ball.fixed_tick(SIM_DT, &bounds, &tuning, &mut rng, &mut world);
        assert!(!ball.needs_retarget);

        // Inside the field nothing moves except Y
        ball.pos = Vec3::new(1.0, 3.0, 1.0);
        assert!(!ball.clamp_to_bounds(&bounds, tuning.edge_margin));
        assert_eq!(ball.pos, Vec3::new(1.0, 0.5, 1.0));
    }

    #[test]
    fn test_kick_is_idempotent() {
        let (_, tuning, _, mut world, mut ball) = setup(1);
        let dir = Vec3::new(1.0, 0.0, 0.0);
        assert!(ball.kick(dir, tuning.kick_force, tuning.kick_min_lift, &mut world));
        let vel_after_first = world.linear_velocity(ball.body).unwrap();
        assert!(vel_after_first.y > 0.0, "kick should arc upward");
        assert!(world.is_dynamic(ball.body));

        assert!(!ball.kick(dir, tuning.kick_force, tuning.kick_min_lift, &mut world));
        assert_eq!(world.linear_velocity(ball.body).unwrap(), vel_after_first);
        assert_eq!(ball.state, BallState::Kicked { elapsed: 0.0 });
    }

    #[test]
    fn test_kicked_then_removed_after_delay() {
        let (bounds, tuning, mut rng, mut world, mut ball) = setup(1);
        ball.kick(Vec3::X, tuning.kick_force, tuning.kick_min_lift, &mut world);

        let steps = (tuning.removal_delay / SIM_DT).round() as usize;
        for _ in 0..steps - 1 {
            ball.tick(SIM_DT, &bounds, &tuning, &mut rng);
            world.step(SIM_DT);
            ball.fixed_tick(SIM_DT, &bounds, &tuning, &mut rng, &mut world);
            assert!(matches!(ball.state, BallState::Kicked { .. }));
        }
        assert!(ball.pos.x > 0.0, "ball should follow the physics flight");

        ball.tick(SIM_DT * 1.5, &bounds, &tuning, &mut rng);
        assert_eq!(ball.state, BallState::Removed);

        // Removed is terminal
        assert!(!ball.kick(Vec3::X, 1.0, 0.3, &mut world));
        ball.tick(SIM_DT, &bounds, &tuning, &mut rng);
        assert_eq!(ball.state, BallState::Removed);
    }
}
