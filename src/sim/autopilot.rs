//! Autopilot (idle/demo mode)
//!
//! Produces avatar input that chases the nearest active ball and kicks once
//! it is inside the detection sphere. Used by the headless runner.

use glam::Vec3;

use super::physics::PhysicsWorld;
use super::session::{Match, TickInput};
use crate::flatten;

/// Seconds of ball motion to lead the chase by
const LEAD_TIME: f32 = 0.25;
/// Kick only when the ball is this deep inside the kick radius
const KICK_REACH_FRACTION: f32 = 0.8;
/// Walk instead of run inside this distance
const RUN_DISTANCE: f32 = 3.0;

/// Input for the next frame of `m`
pub fn autopilot_input<W: PhysicsWorld>(m: &Match<W>) -> TickInput {
    let detector = m.detector();
    if detector.in_progress() || m.is_complete() {
        return TickInput::default();
    }

    let world = m.world();
    let avatar_pos = m.avatar().position(world);
    let origin = m.avatar().kick_origin(world);

    let nearest = m
        .controller()
        .balls()
        .iter()
        .filter(|b| b.is_active())
        .min_by(|a, b| {
            a.pos
                .distance_squared(avatar_pos)
                .partial_cmp(&b.pos.distance_squared(avatar_pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    let Some(ball) = nearest else {
        return TickInput::default();
    };

    if ball.pos.distance(origin) <= detector.radius * KICK_REACH_FRACTION {
        return TickInput {
            kick: true,
            ..Default::default()
        };
    }

    // Head for where the ball will be shortly
    let aim = ball.pos + ball.vel * LEAD_TIME;
    let to_ball = flatten(aim - avatar_pos);
    let dir = to_ball.normalize_or_zero();
    if dir == Vec3::ZERO {
        return TickInput::default();
    }

    TickInput {
        move_forward: dir.z,
        move_right: dir.x,
        run: to_ball.length() > RUN_DISTANCE,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::bounds::FieldBounds;
    use crate::sim::physics::KinematicWorld;
    use crate::tuning::MatchTuning;

    #[test]
    fn test_heads_for_nearest_ball() {
        let bounds = FieldBounds::from_corners(Vec3::new(-20.0, 0.0, -30.0), Vec3::new(20.0, 4.0, 30.0)).unwrap();
        let tuning = MatchTuning {
            ball_count: 1,
            ..Default::default()
        };
        let m = Match::new(tuning, Some(bounds), KinematicWorld::new(0.0), 4);
        let ball = m.controller().balls()[0].clone();
        let input = autopilot_input(&m);

        let avatar_pos = m.avatar().position(m.world());
        if ball.pos.distance(m.avatar().kick_origin(m.world())) > 1.2 {
            let want = flatten(ball.pos - avatar_pos).normalize();
            let got = Vec3::new(input.move_right, 0.0, input.move_forward);
            assert!(got.dot(want) > 0.9);
            assert!(!input.kick);
        } else {
            assert!(input.kick);
        }
    }

    #[test]
    fn test_idle_while_kicking() {
        let bounds = FieldBounds::from_corners(Vec3::new(-20.0, 0.0, -30.0), Vec3::new(20.0, 4.0, 30.0)).unwrap();
        let mut m = Match::new(MatchTuning::default(), Some(bounds), KinematicWorld::new(0.0), 4);
        m.frame(
            SIM_DT,
            &TickInput {
                kick: true,
                ..Default::default()
            },
        );
        assert_eq!(autopilot_input(&m), TickInput::default());
    }
}
