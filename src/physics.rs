/*!
Velocity ownership and integration primitives.

`PhysicsSystem` is the only owner of the player's velocity. Horizontal
velocity is overwritten from intent every frame (arcade movement, no
inertia); vertical velocity accumulates gravity and is zeroed by the
collision pass on landing.
*/

use nalgebra as na;

use crate::collision::settings::PhysicsConfig;
use crate::collision::types::{Transform, Vec3};

pub struct PhysicsSystem {
    cfg: PhysicsConfig,
    velocity: Vec3,
}

impl PhysicsSystem {
    pub fn new(cfg: PhysicsConfig) -> Self {
        Self {
            cfg,
            velocity: Vec3::zeros(),
        }
    }

    #[inline]
    pub fn velocity(&self) -> &Vec3 {
        &self.velocity
    }

    #[inline]
    pub fn velocity_mut(&mut self) -> &mut Vec3 {
        &mut self.velocity
    }

    /// Overwrite horizontal velocity from a world-space intent direction.
    #[inline]
    pub fn apply_horizontal(&mut self, dir: &Vec3) {
        self.velocity.x = dir.x * self.cfg.speed;
        self.velocity.z = dir.z * self.cfg.speed;
    }

    /// Accumulate gravity. Called exactly once per frame; the collision
    /// pass never applies gravity on its own.
    #[inline]
    pub fn apply_gravity(&mut self, dt: f32) {
        self.velocity.y -= self.cfg.gravity * dt;
    }

    /// Overwrite vertical velocity with the jump impulse.
    #[inline]
    pub fn jump(&mut self) {
        self.velocity.y = self.cfg.jump_speed;
    }

    /// Premultiply a yaw rotation onto a transform (world-up axis).
    #[inline]
    pub fn rotate_y(&self, transform: &mut Transform, angle: f32) {
        let yaw = na::UnitQuaternion::from_axis_angle(&na::Vector3::y_axis(), angle);
        transform.rotation = yaw * transform.rotation;
    }
}
