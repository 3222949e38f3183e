//! Physics collaborator boundary
//!
//! The simulation core never integrates gravity or resolves contacts itself.
//! It drives bodies through [`PhysicsWorld`] and reads back positions and
//! overlap queries. [`KinematicWorld`] is a minimal in-process world used by
//! the headless runner and tests: dynamic bodies fall under gravity onto a
//! flat floor, kinematic bodies go exactly where they are told.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::{GRAVITY, GROUND_EPSILON};

/// Opaque body handle issued by the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// Tag attached to a body, read during proximity queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityTag {
    Ball,
    Avatar,
}

/// One body found by [`PhysicsWorld::overlap_sphere`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    pub body: BodyHandle,
    pub tag: EntityTag,
    pub position: Vec3,
}

/// Operations the core needs from a physics subsystem
pub trait PhysicsWorld {
    /// Create a body; kinematic bodies ignore gravity until made dynamic
    fn spawn_body(&mut self, tag: EntityTag, position: Vec3, dynamic: bool) -> BodyHandle;
    fn despawn_body(&mut self, body: BodyHandle);
    /// Hand a body over to gravity (true) or take it back (false)
    fn set_dynamic(&mut self, body: BodyHandle, dynamic: bool);
    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec3);
    fn set_position(&mut self, body: BodyHandle, position: Vec3);
    /// Instant velocity change of `direction * magnitude / mass`
    fn apply_impulse(&mut self, body: BodyHandle, direction: Vec3, magnitude: f32);
    fn position(&self, body: BodyHandle) -> Option<Vec3>;
    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec3>;
    fn is_grounded(&self, body: BodyHandle) -> bool;
    /// Bodies whose position lies within `radius` of `center`, in a stable order
    fn overlap_sphere(&self, center: Vec3, radius: f32) -> Vec<Overlap>;
    /// Advance the world by one fixed step
    fn step(&mut self, dt: f32);
}

#[derive(Debug, Clone)]
struct Body {
    tag: EntityTag,
    pos: Vec3,
    vel: Vec3,
    dynamic: bool,
    mass: f32,
}

/// Point-mass world with gravity and a flat floor
#[derive(Debug, Clone)]
pub struct KinematicWorld {
    /// Floor height dynamic bodies rest on
    pub floor: f32,
    bodies: BTreeMap<BodyHandle, Body>,
    next_handle: u32,
}

impl KinematicWorld {
    pub fn new(floor: f32) -> Self {
        Self {
            floor,
            bodies: BTreeMap::new(),
            next_handle: 1,
        }
    }

    /// Number of live bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn contains(&self, body: BodyHandle) -> bool {
        self.bodies.contains_key(&body)
    }

    pub fn is_dynamic(&self, body: BodyHandle) -> bool {
        self.bodies.get(&body).is_some_and(|b| b.dynamic)
    }
}

impl PhysicsWorld for KinematicWorld {
    fn spawn_body(&mut self, tag: EntityTag, position: Vec3, dynamic: bool) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(
            handle,
            Body {
                tag,
                pos: position,
                vel: Vec3::ZERO,
                dynamic,
                mass: 1.0,
            },
        );
        handle
    }

    fn despawn_body(&mut self, body: BodyHandle) {
        self.bodies.remove(&body);
    }

    fn set_dynamic(&mut self, body: BodyHandle, dynamic: bool) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.dynamic = dynamic;
        }
    }

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec3) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.vel = velocity;
        }
    }

    fn set_position(&mut self, body: BodyHandle, position: Vec3) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.pos = position;
        }
    }

    fn apply_impulse(&mut self, body: BodyHandle, direction: Vec3, magnitude: f32) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.vel += direction * magnitude / b.mass;
        }
    }

    fn position(&self, body: BodyHandle) -> Option<Vec3> {
        self.bodies.get(&body).map(|b| b.pos)
    }

    fn linear_velocity(&self, body: BodyHandle) -> Option<Vec3> {
        self.bodies.get(&body).map(|b| b.vel)
    }

    fn is_grounded(&self, body: BodyHandle) -> bool {
        self.bodies
            .get(&body)
            .is_some_and(|b| b.pos.y <= self.floor + GROUND_EPSILON)
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32) -> Vec<Overlap> {
        let r2 = radius * radius;
        self.bodies
            .iter()
            .filter(|(_, b)| b.pos.distance_squared(center) <= r2)
            .map(|(&body, b)| Overlap {
                body,
                tag: b.tag,
                position: b.pos,
            })
            .collect()
    }

    fn step(&mut self, dt: f32) {
        let floor = self.floor;
        for body in self.bodies.values_mut().filter(|b| b.dynamic) {
            body.vel.y -= GRAVITY * dt;
            body.pos += body.vel * dt;
            if body.pos.y < floor {
                body.pos.y = floor;
                if body.vel.y < 0.0 {
                    body.vel.y = 0.0;
                }
            }
        }
    }
}
