/*!
Movement controller settings and tolerances.

These constants centralize the parameters used by input-driven movement,
horizontal collision, ground clamping and platforms. Keeping them together
makes tuning easier; [`PhysicsConfig`] packages the designer-facing subset
so it can be overridden at construction or loaded from data (JSON/RON) via
serde.

Notes
- Distances are in meters, time in seconds, angles in radians.
- Favor practical world-space tolerances over machine epsilon.
*/

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Avatar half-height: distance from the eye/center down to the feet (meters).
pub const PLAYER_HALF_HEIGHT: f32 = 0.5;

/// Curb height you can step off without entering a fall (meters).
pub const STEP_DOWN: f32 = 0.5;

/// Gravity magnitude in meters per second squared (positive value).
pub const GRAVITY_MPS2: f32 = 9.81;

/// Walking speed in meters per second.
pub const WALK_SPEED_MPS: f32 = 5.0;

/// Yaw rate while shift-turning, radians per second.
pub const TURN_SPEED_RADS: f32 = std::f32::consts::PI;

/// Initial upward impulse applied on jump (meters per second).
pub const JUMP_SPEED_MPS: f32 = 5.0;

/// Height of the global safety floor. The controller never lets the player
/// fall below `GROUND_LEVEL_Y + half_height` even when no walkable geometry
/// is under the feet.
pub const GROUND_LEVEL_Y: f32 = 0.25;

/// Upper bound on a single frame's delta time (seconds). Bounds the worst
/// integration step after a stall (backgrounded tab, GC pause).
pub const MAX_FRAME_DT: f32 = 0.05;

/// Offset of the downward ray origin above the feet (meters).
pub const FOOT_RAY_EPS: f32 = 0.01;

/// Minimum vertical component of a surface normal for a hit to count as
/// walkable. Rejects near-vertical walls posing as floors.
pub const WALKABLE_NORMAL_MIN_Y: f32 = 0.01;

/// Downward ray range used before any ground contact has been confirmed.
pub const FIRST_FRAME_RAY_RANGE: f32 = 50.0;

/// Extra slack added to the adaptive downward ray range (meters).
pub const RAY_RANGE_MARGIN: f32 = 0.2;

/// Downward probe length for the platform boarding check (meters).
/// Long enough to hit a thin lift slab from standing height.
pub const PLATFORM_PROBE_DISTANCE: f32 = 2.0;

/// Vertical slack added to a moving mesh's obstacle box so a rising lift
/// still blocks horizontal movement near its edges (meters).
pub const MOVING_BOX_Y_SLACK: f32 = 2.0;

/// Side length of one spatial-grid tile in world units (meters).
pub const TILE_SIZE: f32 = 2.0;

/// Per-triangle obstacle extraction skips triangles whose bounding box is
/// taller than this (tall walls are better served by one coarse box).
pub const TALL_WALL_HEIGHT: f32 = 3.0;

/// Designer-facing tuning record. All values numeric, overridable at
/// construction; defaults come from the constants above.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Distance from player center to the feet (meters).
    pub half_height: f32,
    /// Full collision-box height (meters). Usually `2 * half_height`.
    pub height: f32,
    /// Step-down tolerance (meters).
    pub step_down: f32,
    /// Gravity magnitude (m/s^2, positive).
    pub gravity: f32,
    /// Horizontal walk speed (m/s).
    pub speed: f32,
    /// Yaw rate for shift-turning (rad/s).
    pub turn_speed: f32,
    /// Jump impulse (m/s).
    pub jump_speed: f32,
    /// Global safety-floor height (meters).
    pub ground_level: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            half_height: PLAYER_HALF_HEIGHT,
            height: PLAYER_HALF_HEIGHT * 2.0,
            step_down: STEP_DOWN,
            gravity: GRAVITY_MPS2,
            speed: WALK_SPEED_MPS,
            turn_speed: TURN_SPEED_RADS,
            jump_speed: JUMP_SPEED_MPS,
            ground_level: GROUND_LEVEL_Y,
        }
    }
}

/// A rejected [`PhysicsConfig`] value.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("`{0}` must be a finite number")]
    NonFinite(&'static str),
    #[error("`{0}` must be strictly positive")]
    NonPositive(&'static str),
    #[error("`{0}` must not be negative")]
    Negative(&'static str),
}

impl PhysicsConfig {
    /// Validate ranges once, up front. The per-frame path never validates:
    /// it assumes the record it was constructed with is sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite: [(&'static str, f32); 8] = [
            ("half_height", self.half_height),
            ("height", self.height),
            ("step_down", self.step_down),
            ("gravity", self.gravity),
            ("speed", self.speed),
            ("turn_speed", self.turn_speed),
            ("jump_speed", self.jump_speed),
            ("ground_level", self.ground_level),
        ];
        for (name, v) in finite {
            if !v.is_finite() {
                return Err(ConfigError::NonFinite(name));
            }
        }
        if self.half_height <= 0.0 {
            return Err(ConfigError::NonPositive("half_height"));
        }
        if self.height <= 0.0 {
            return Err(ConfigError::NonPositive("height"));
        }
        if self.gravity <= 0.0 {
            return Err(ConfigError::NonPositive("gravity"));
        }
        for (name, v) in [
            ("step_down", self.step_down),
            ("speed", self.speed),
            ("jump_speed", self.jump_speed),
        ] {
            if v < 0.0 {
                return Err(ConfigError::Negative(name));
            }
        }
        Ok(())
    }
}
