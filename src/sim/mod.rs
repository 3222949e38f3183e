//! Frame-stepped simulation module
//!
//! All gameplay logic lives here. Rules for this module:
//! - Timers are accumulators advanced by `tick`/`fixed_tick`, never async
//! - Seeded RNG only
//! - Stable iteration order (by ball id / body handle)
//! - Physics is driven through `PhysicsWorld`, never integrated inline

pub mod autopilot;
pub mod avatar;
pub mod ball;
pub mod bounds;
pub mod controller;
pub mod kick;
pub mod physics;
pub mod session;

pub use autopilot::autopilot_input;
pub use avatar::Avatar;
pub use ball::{BallId, BallState, RoamingBall};
pub use bounds::FieldBounds;
pub use controller::{KickReport, MatchController, MatchEvent, MatchPhase, difficulty_multiplier};
pub use kick::KickDetector;
pub use physics::{BodyHandle, EntityTag, KinematicWorld, Overlap, PhysicsWorld};
pub use session::{Match, MatchSummary, TickInput};
