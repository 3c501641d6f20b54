//! Ship flight: turns the three input flags into ship motion, bank and
//! spotlight aim, one fixed tick at a time.

use engine_core::{lerp, Transform};
use glam::Vec3;
use input::FlightInput;
use serde::{Deserialize, Serialize};

/// Which turn wins when both turn inputs are held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPriority {
    #[default]
    LeftFirst,
    RightFirst,
}

/// Resolved turn direction for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Left,
    Right,
}

impl TurnPriority {
    pub fn resolve(self, input: &FlightInput) -> Option<Turn> {
        match (input.turning_left, input.turning_right, self) {
            (true, true, TurnPriority::LeftFirst) => Some(Turn::Left),
            (true, true, TurnPriority::RightFirst) => Some(Turn::Right),
            (true, false, _) => Some(Turn::Left),
            (false, true, _) => Some(Turn::Right),
            (false, false, _) => None,
        }
    }
}

/// Per-tick flight constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightTuning {
    /// Yaw change per tick while turning (radians).
    pub rotation_speed: f32,
    /// Distance per tick while advancing.
    pub move_speed: f32,
    /// Bank angle while turning (radians).
    pub lean_angle: f32,
    /// Fraction of the remaining distance covered per tick by lean and aim.
    pub smoothing: f32,
    pub turn_priority: TurnPriority,
    /// Spotlight aim distance ahead of the ship while advancing.
    pub aim_forward_offset: f32,
    /// Spotlight aim distance to the side while turning.
    pub aim_lateral_offset: f32,
}

impl Default for FlightTuning {
    fn default() -> Self {
        Self {
            rotation_speed: 0.02,
            move_speed: 0.2,
            lean_angle: 0.2,
            smoothing: 0.1,
            turn_priority: TurnPriority::LeftFirst,
            aim_forward_offset: 3.0,
            aim_lateral_offset: 2.5,
        }
    }
}

/// Position and heading of the ship container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipPose {
    pub position: Vec3,
    /// Heading around +Y (radians).
    pub yaw: f32,
    /// Bank around the ship's forward axis (radians).
    pub roll: f32,
}

impl ShipPose {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self { position, yaw, roll: 0.0 }
    }

    /// Container transform: yaw, then bank about the yawed Z axis.
    pub fn transform(&self) -> Transform {
        let mut transform = Transform::from_position(self.position);
        transform.set_yaw_roll(self.yaw, self.roll);
        transform
    }

    /// Facing direction (local -Z). Always horizontal: roll spins about it.
    pub fn forward(&self) -> Vec3 {
        self.transform().forward()
    }
}

/// Bank angle easing toward the turn target.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LeanState {
    pub current: f32,
    pub target: f32,
}

/// Where the spotlight points, in the ship's local space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpotlightAim {
    /// Live point, written to the target node.
    pub current: Vec3,
    /// This tick's goal.
    pub desired: Vec3,
}

/// Flight state that persists between ticks.
#[derive(Debug, Clone, Default)]
pub struct ShipFlight {
    pub tuning: FlightTuning,
    pub lean: LeanState,
    pub aim: SpotlightAim,
}

impl ShipFlight {
    pub fn new(tuning: FlightTuning) -> Self {
        Self { tuning, ..Default::default() }
    }

    /// Advance one tick: move along the current facing, turn, ease the bank
    /// and the spotlight aim.
    pub fn step(&mut self, input: &FlightInput, pose: &mut ShipPose) {
        let t = self.tuning;

        if input.advancing {
            pose.position += pose.forward() * t.move_speed;
        }

        let turn = t.turn_priority.resolve(input);
        self.lean.target = match turn {
            Some(Turn::Left) => {
                pose.yaw += t.rotation_speed;
                t.lean_angle
            }
            Some(Turn::Right) => {
                pose.yaw -= t.rotation_speed;
                -t.lean_angle
            }
            None => 0.0,
        };

        self.lean.current = lerp(self.lean.current, self.lean.target, t.smoothing);
        pose.roll = self.lean.current;

        self.aim.desired = Vec3::ZERO;
        if input.advancing {
            self.aim.desired.z = -t.aim_forward_offset;
        }
        match turn {
            Some(Turn::Left) => self.aim.desired.x = t.aim_lateral_offset,
            Some(Turn::Right) => self.aim.desired.x = -t.aim_lateral_offset,
            None => {}
        }
        self.aim.current = self.aim.current.lerp(self.aim.desired, t.smoothing);
    }
}
