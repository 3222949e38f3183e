//! Player avatar body
//!
//! Only the parts the kick protocol depends on: planar movement from input
//! axes, jumping, a facing that follows movement, and the kick origin in
//! front of the feet. Movement axes are in world space (+Z forward, +X
//! right); camera-relative remapping is the host's job.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::physics::{BodyHandle, EntityTag, PhysicsWorld};
use super::session::TickInput;
use crate::slew_facing;
use crate::tuning::MatchTuning;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Avatar {
    pub body: BodyHandle,
    pub facing: Quat,
    pub move_speed: f32,
    pub run_multiplier: f32,
    pub turn_rate: f32,
    pub jump_force: f32,
    /// Kick origin distance in front of the body
    pub kick_reach: f32,
}

impl Avatar {
    /// Spawn the avatar body at `position`
    pub fn spawn<W: PhysicsWorld + ?Sized>(world: &mut W, position: Vec3, tuning: &MatchTuning) -> Self {
        let body = world.spawn_body(EntityTag::Avatar, position, true);
        Self {
            body,
            facing: Quat::IDENTITY,
            move_speed: tuning.avatar_move_speed,
            run_multiplier: tuning.avatar_run_multiplier,
            turn_rate: tuning.avatar_turn_rate,
            jump_force: tuning.avatar_jump_force,
            kick_reach: tuning.kick_reach,
        }
    }

    pub fn position<W: PhysicsWorld + ?Sized>(&self, world: &W) -> Vec3 {
        world.position(self.body).unwrap_or(Vec3::ZERO)
    }

    /// Unit vector the avatar faces (XZ plane)
    pub fn forward(&self) -> Vec3 {
        self.facing * Vec3::Z
    }

    /// Center of the kick detection sphere
    pub fn kick_origin<W: PhysicsWorld + ?Sized>(&self, world: &W) -> Vec3 {
        self.position(world) + self.forward() * self.kick_reach
    }

    /// Drop horizontal velocity, keep vertical (gravity still applies)
    pub fn halt<W: PhysicsWorld + ?Sized>(&self, world: &mut W) {
        let vel = world.linear_velocity(self.body).unwrap_or(Vec3::ZERO);
        world.set_linear_velocity(self.body, Vec3::new(0.0, vel.y, 0.0));
    }

    /// Jump if standing on the ground. Returns whether a jump happened.
    pub fn try_jump<W: PhysicsWorld + ?Sized>(&self, world: &mut W) -> bool {
        if !world.is_grounded(self.body) {
            return false;
        }
        let vel = world.linear_velocity(self.body).unwrap_or(Vec3::ZERO);
        world.set_linear_velocity(self.body, Vec3::new(vel.x, 0.0, vel.z));
        world.apply_impulse(self.body, Vec3::Y, self.jump_force);
        true
    }

    /// Apply movement input; `locked` freezes translation for the kick
    pub fn fixed_tick<W: PhysicsWorld + ?Sized>(&mut self, input: &TickInput, locked: bool, dt: f32, world: &mut W) {
        if locked {
            self.halt(world);
            return;
        }

        let vel = world.linear_velocity(self.body).unwrap_or(Vec3::ZERO);
        let dir = Vec3::new(input.move_right, 0.0, input.move_forward);
        if dir.length_squared() > 0.001 {
            let dir = dir.normalize();
            let speed = if input.run {
                self.move_speed * self.run_multiplier
            } else {
                self.move_speed
            };
            world.set_linear_velocity(self.body, Vec3::new(dir.x * speed, vel.y, dir.z * speed));
            self.facing = slew_facing(self.facing, dir, self.turn_rate, dt);
        } else {
            world.set_linear_velocity(self.body, Vec3::new(0.0, vel.y, 0.0));
        }
    }
}
