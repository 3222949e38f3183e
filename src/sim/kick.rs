//! Kick detection
//!
//! A kick opens a short detection window. Every tick while it is open the
//! detector looks for a ball around the kick origin; the first active ball
//! found is kicked and the window closes. A separate, usually longer, lock
//! keeps the avatar from moving until the kick animation would be done.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::controller::{KickReport, MatchController};
use super::physics::{EntityTag, PhysicsWorld};
use crate::flatten;
use crate::tuning::MatchTuning;

/// Detection window and movement lock of one avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KickDetector {
    pub window: f32,
    pub lock: f32,
    pub radius: f32,
    pub force: f32,
    pub lift: f32,
    window_open: bool,
    window_elapsed: f32,
    lock_active: bool,
    lock_elapsed: f32,
}

impl KickDetector {
    pub fn new(tuning: &MatchTuning) -> Self {
        Self {
            window: tuning.kick_window,
            lock: tuning.kick_lock,
            radius: tuning.kick_radius,
            force: tuning.kick_force,
            lift: tuning.kick_lift,
            window_open: false,
            window_elapsed: 0.0,
            lock_active: false,
            lock_elapsed: 0.0,
        }
    }

    pub fn window_open(&self) -> bool {
        self.window_open
    }

    pub fn window_elapsed(&self) -> f32 {
        self.window_elapsed
    }

    /// Avatar translation is suppressed while this is true
    pub fn movement_locked(&self) -> bool {
        self.lock_active
    }

    /// A kick is underway while either the window or the lock is running
    pub fn in_progress(&self) -> bool {
        self.window_open || self.lock_active
    }

    /// Begin a kick. Returns false (and does nothing) if one is in progress.
    pub fn start_kick(&mut self) -> bool {
        if self.in_progress() {
            return false;
        }
        self.window_open = true;
        self.window_elapsed = 0.0;
        self.lock_active = true;
        self.lock_elapsed = 0.0;
        log::debug!("Kick started, detection window open");
        true
    }

    /// Advance the window and lock, querying for a ball while the window is open.
    ///
    /// Returns the controller's report when a ball was kicked this tick.
    pub fn tick<W: PhysicsWorld + ?Sized>(
        &mut self,
        dt: f32,
        origin: Vec3,
        controller: &mut MatchController,
        world: &mut W,
    ) -> Option<KickReport> {
        let mut report = None;

        if self.window_open {
            self.window_elapsed += dt;
            report = self.try_hit(origin, controller, world);
            if report.is_some() {
                self.window_open = false;
            } else if self.window_elapsed >= self.window {
                log::debug!("Kick window closed after {:.2}s without a hit", self.window_elapsed);
                self.window_open = false;
            }
        }

        if self.lock_active {
            self.lock_elapsed += dt;
            if self.lock_elapsed >= self.lock {
                self.lock_active = false;
            }
        }

        report
    }

    /// One proximity query; only the first active ball found is processed
    fn try_hit<W: PhysicsWorld + ?Sized>(
        &self,
        origin: Vec3,
        controller: &mut MatchController,
        world: &mut W,
    ) -> Option<KickReport> {
        let (id, ball_pos) = world
            .overlap_sphere(origin, self.radius)
            .into_iter()
            .filter(|hit| hit.tag == EntityTag::Ball)
            .find_map(|hit| {
                controller
                    .ball_by_body(hit.body)
                    .filter(|ball| ball.is_active())
                    .map(|ball| (ball.id, hit.position))
            })?;

        let mut direction = flatten(ball_pos - origin).normalize_or_zero();
        direction.y = self.lift;
        let report = controller.kick_ball(id, direction, self.force, world);
        if report.is_some() {
            log::info!("Ball {} kicked", id);
        }
        report
    }
}
