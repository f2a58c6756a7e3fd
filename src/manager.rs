/*!
Per-frame orchestration.

`CollisionManager::update` is the single entry point of the core: the host
render loop calls it once per animation frame with the active rig, the scene
geometry registry and the frame's delta time. The call order inside is
fixed; input-derived velocity must exist before the slide, platforms must
move before the obstacle refresh, and the refresh must precede every query.
*/

use log::trace;

use crate::collision::settings::{ConfigError, MAX_FRAME_DT, PhysicsConfig};
use crate::collision::system::{CollisionSystem, CollisionTargets};
use crate::collision::types::{PlatformId, Quat, Vec3};
use crate::input::InputManager;
use crate::physics::PhysicsSystem;
use crate::platform::PlatformSet;
use crate::rig::PlayerRig;

/// Transform a local movement intent into camera-relative world space:
/// project the camera forward onto the horizontal plane, cross with world
/// up for the right vector, and combine. Returns zero when the intent is
/// zero or the camera looks straight along the vertical axis.
pub fn camera_relative(rotation: &Quat, dir: &Vec3) -> Vec3 {
    if dir.norm_squared() == 0.0 {
        return Vec3::zeros();
    }
    let mut forward = rotation * Vec3::new(0.0, 0.0, -1.0);
    forward.y = 0.0;
    let len_sq = forward.norm_squared();
    if len_sq < 1.0e-8 {
        return Vec3::zeros();
    }
    forward /= len_sq.sqrt();
    let right = forward.cross(&Vec3::new(0.0, 1.0, 0.0));
    forward * dir.z - right * dir.x
}

pub struct CollisionManager {
    cfg: PhysicsConfig,
    input: InputManager,
    physics: PhysicsSystem,
    collision: CollisionSystem,
    platforms: PlatformSet,
    /// Player-side half of the platform latch.
    current_platform: Option<PlatformId>,
}

impl CollisionManager {
    /// Validates the configuration once, up front. The per-frame path runs
    /// without any further checks.
    pub fn new(cfg: PhysicsConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            input: InputManager::new(),
            physics: PhysicsSystem::new(cfg),
            collision: CollisionSystem::new(cfg),
            platforms: PlatformSet::new(),
            current_platform: None,
        })
    }

    /// Key events from the host land here.
    #[inline]
    pub fn input_mut(&mut self) -> &mut InputManager {
        &mut self.input
    }

    #[inline]
    pub fn platforms_mut(&mut self) -> &mut PlatformSet {
        &mut self.platforms
    }

    #[inline]
    pub fn velocity(&self) -> &Vec3 {
        self.physics.velocity()
    }

    /// Platform the player currently rides, if any.
    #[inline]
    pub fn current_platform(&self) -> Option<PlatformId> {
        self.current_platform
    }

    /// Build the static-box grid after level construction.
    pub fn build_grid(&mut self, targets: &CollisionTargets) {
        self.collision.build_grid(targets);
    }

    /// Advance one frame. All effects are mutations of the rig's transform
    /// and internal velocity/ground state; there is no return value.
    pub fn update(&mut self, rig: &mut dyn PlayerRig, targets: &mut CollisionTargets, dt: f32) {
        // Bound the worst-case integration step after a stall.
        let dt = dt.clamp(0.0, MAX_FRAME_DT);

        self.input.update();
        let player = rig.yaw_transform();

        // Shift-turning suppresses strafing (the input step already strips
        // the sideways component) but forward/back still applies, so the
        // intent is resolved against the post-rotation yaw.
        let turn = self.input.turn_axis();
        if turn != 0.0 {
            self.physics
                .rotate_y(player, turn * self.cfg.turn_speed * dt);
        }
        let world_dir = camera_relative(&player.rotation, &self.input.direction());
        self.physics.apply_horizontal(&world_dir);

        if self.input.consume_jump() {
            self.physics.jump();
        }

        // The single gravity application for this frame.
        self.physics.apply_gravity(dt);

        // Platforms move first so the refresh sees this frame's poses.
        self.platforms
            .step(targets, player, &mut self.current_platform, dt);
        self.collision.refresh_obstacles(targets);

        self.collision
            .slide_horizontal(player, self.physics.velocity(), dt);

        // Integrate Y, then clamp to ground.
        player.translation.y += self.physics.velocity().y * dt;
        let landed = self.collision.ground_clamp(
            player,
            self.physics.velocity_mut(),
            targets,
            &mut self.platforms,
            &mut self.current_platform,
            dt,
        );
        if landed {
            self.input.set_can_jump(true);
        }

        trace!(
            "frame dt={:.3} vel=({:.2},{:.2},{:.2}) pos=({:.2},{:.2},{:.2})",
            dt,
            self.physics.velocity().x,
            self.physics.velocity().y,
            self.physics.velocity().z,
            player.translation.x,
            player.translation.y,
            player.translation.z,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::settings::ConfigError;
    use crate::collision::types::Transform;
    use crate::input::Key;
    use crate::platform::{PlatformSpec, PlatformState};
    use crate::rig::FirstPersonRig;
    use approx::assert_relative_eq;
    use parry3d::shape::SharedShape;

    const DT: f32 = 1.0 / 60.0;

    fn flat_world() -> CollisionTargets {
        let mut targets = CollisionTargets::new();
        // Slab whose top face sits at y = 0.
        targets.add_ground(
            SharedShape::cuboid(100.0, 0.25, 100.0),
            Transform::at(Vec3::new(0.0, -0.25, 0.0)),
        );
        targets
    }

    fn manager_with(cfg: PhysicsConfig) -> CollisionManager {
        CollisionManager::new(cfg).expect("config is valid")
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let cfg = PhysicsConfig {
            half_height: 0.0,
            ..PhysicsConfig::default()
        };
        assert_eq!(
            CollisionManager::new(cfg).err(),
            Some(ConfigError::NonPositive("half_height"))
        );
    }

    #[test]
    fn free_fall_comes_to_rest_on_the_ground_plane() {
        let cfg = PhysicsConfig {
            half_height: 1.5,
            height: 3.0,
            ground_level: 0.0,
            ..PhysicsConfig::default()
        };
        let mut manager = manager_with(cfg);
        let mut targets = flat_world();
        let mut rig = FirstPersonRig::new(Transform::at(Vec3::new(0.0, 10.0, 0.0)));

        for _ in 0..600 {
            manager.update(&mut rig, &mut targets, DT);
        }

        assert_relative_eq!(rig.camera.translation.y, 1.5, epsilon = 1.0e-3);
        assert_eq!(manager.velocity().y, 0.0);
    }

    #[test]
    fn walking_into_a_wall_blocks_one_axis_and_slides_the_other() {
        let cfg = PhysicsConfig::default();
        let mut manager = manager_with(cfg);
        let mut targets = flat_world();
        // Wall ahead on +X spanning a wide Z range.
        targets.add_obstacle(crate::collision::types::aabb_from_center_size(
            Vec3::new(5.0, 1.0, 0.0),
            Vec3::new(1.0, 2.0, 40.0),
        ));
        manager.build_grid(&targets);

        let mut rig = FirstPersonRig::new(Transform::at(Vec3::new(3.0, cfg.half_height, 0.0)));
        // Identity yaw: forward is -Z, so strafing right (D) moves +X.
        manager.input_mut().set_key_state(Key::D, true);
        manager.input_mut().set_key_state(Key::W, true);

        for _ in 0..240 {
            manager.update(&mut rig, &mut targets, DT);
        }

        // X stopped at the wall, Z kept sliding the whole time.
        assert!(rig.camera.translation.x < 4.5);
        assert!(rig.camera.translation.z < -10.0);
    }

    #[test]
    fn jump_rises_then_returns_to_the_ground() {
        // The flat-world slab top is y = 0, so the global floor sits there
        // too; otherwise the safety clamp would hold the player above it.
        let cfg = PhysicsConfig {
            ground_level: 0.0,
            ..PhysicsConfig::default()
        };
        let mut manager = manager_with(cfg);
        let mut targets = flat_world();
        let rest_y = cfg.half_height;
        let mut rig = FirstPersonRig::new(Transform::at(Vec3::new(0.0, rest_y + 5.0, 0.0)));

        // Settle onto the floor first (arms the jump).
        for _ in 0..240 {
            manager.update(&mut rig, &mut targets, DT);
        }
        assert_relative_eq!(rig.camera.translation.y, rest_y, epsilon = 1.0e-3);

        manager.input_mut().set_key_state(Key::Space, true);
        manager.update(&mut rig, &mut targets, DT);
        manager.input_mut().set_key_state(Key::Space, false);
        let mut peak = rig.camera.translation.y;
        assert!(manager.velocity().y > 0.0, "jump impulse applied");

        for _ in 0..600 {
            manager.update(&mut rig, &mut targets, DT);
            peak = peak.max(rig.camera.translation.y);
        }
        assert!(peak > rest_y + 0.5, "the jump actually left the ground");
        assert_relative_eq!(rig.camera.translation.y, rest_y, epsilon = 1.0e-3);
        assert_eq!(manager.velocity().y, 0.0);
    }

    #[test]
    fn shift_turning_rotates_without_moving() {
        let cfg = PhysicsConfig::default();
        let mut manager = manager_with(cfg);
        let mut targets = flat_world();
        let mut rig = FirstPersonRig::new(Transform::at(Vec3::new(0.0, cfg.half_height, 0.0)));

        manager.input_mut().set_key_state(Key::Shift, true);
        manager.input_mut().set_key_state(Key::ArrowLeft, true);

        let forward_before = rig.camera.rotation * Vec3::new(0.0, 0.0, -1.0);
        for _ in 0..60 {
            manager.update(&mut rig, &mut targets, DT);
        }
        let forward_after = rig.camera.rotation * Vec3::new(0.0, 0.0, -1.0);

        assert_relative_eq!(rig.camera.translation.x, 0.0, epsilon = 1.0e-5);
        assert_relative_eq!(rig.camera.translation.z, 0.0, epsilon = 1.0e-5);
        // One second at PI rad/s is half a turn: forward flips.
        assert_relative_eq!(forward_after.dot(&forward_before), -1.0, epsilon = 1.0e-2);
    }

    #[test]
    fn forward_still_applies_while_shift_turning() {
        let cfg = PhysicsConfig::default();
        let mut manager = manager_with(cfg);
        let mut targets = flat_world();
        let mut rig = FirstPersonRig::new(Transform::at(Vec3::new(0.0, cfg.half_height, 0.0)));

        manager.input_mut().set_key_state(Key::Shift, true);
        manager.input_mut().set_key_state(Key::ArrowLeft, true);
        manager.input_mut().set_key_state(Key::W, true);

        for _ in 0..30 {
            manager.update(&mut rig, &mut targets, DT);
        }

        // Half a second of walking while yawing: the path curves, but the
        // forward component is never dropped.
        let planar = Vec3::new(rig.camera.translation.x, 0.0, rig.camera.translation.z);
        assert!(planar.norm() > 1.0, "walked while turning");
        let forward = rig.camera.rotation * Vec3::new(0.0, 0.0, -1.0);
        assert!(forward.dot(&Vec3::new(0.0, 0.0, -1.0)) < 0.5, "yaw advanced");
    }

    #[test]
    fn riding_a_platform_to_the_top() {
        let cfg = PhysicsConfig::default();
        let mut manager = manager_with(cfg);
        let mut targets = flat_world();
        let id = manager.platforms_mut().add(
            &mut targets,
            PlatformSpec {
                size: 4.0,
                thickness: 0.4,
                floor_y: 0.2,
                target_y: 8.0,
                speed: 4.0,
                x: 0.0,
                z: 0.0,
            },
        );

        // Start standing on the slab (top at 0.4).
        let mut rig =
            FirstPersonRig::new(Transform::at(Vec3::new(0.0, 0.4 + cfg.half_height, 0.0)));

        let mut riding_frames = 0;
        for _ in 0..600 {
            manager.update(&mut rig, &mut targets, DT);
            if manager.current_platform() == Some(id) {
                riding_frames += 1;
            }
        }

        assert!(riding_frames > 10, "the ride was tracked across frames");
        assert_eq!(manager.platforms_mut().get(id).state, PlatformState::Up);
        // Resting on the slab parked at its target height.
        let top = targets.world_meshes[manager.platforms_mut().get(id).mesh]
            .transform
            .translation
            .y
            + 0.2;
        assert_relative_eq!(top, 8.2, epsilon = 1.0e-4);
        assert_relative_eq!(rig.camera.translation.y, top + cfg.half_height, epsilon = 0.05);
    }

    #[test]
    fn camera_relative_direction_follows_yaw() {
        // Identity yaw: forward intent maps to -Z.
        let id = Quat::identity();
        let out = camera_relative(&id, &Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(out.z, -1.0, epsilon = 1.0e-6);

        // Quarter turn: forward intent maps to -X.
        let yaw = Quat::from_axis_angle(
            &nalgebra::Vector3::y_axis(),
            std::f32::consts::FRAC_PI_2,
        );
        let out = camera_relative(&yaw, &Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(out.x, -1.0, epsilon = 1.0e-6);
        assert_relative_eq!(out.z, 0.0, epsilon = 1.0e-6);

        // Left strafe intent maps to -X under identity yaw.
        let out = camera_relative(&id, &Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(out.x, -1.0, epsilon = 1.0e-6);

        // Zero intent stays zero.
        assert_eq!(camera_relative(&id, &Vec3::zeros()), Vec3::zeros());
    }

    #[test]
    fn huge_frame_time_is_clamped() {
        let cfg = PhysicsConfig::default();
        let mut manager = manager_with(cfg);
        let mut targets = flat_world();
        let mut rig = FirstPersonRig::new(Transform::at(Vec3::new(0.0, cfg.half_height, 0.0)));

        // Settle, then walk one "stalled" frame of 2 seconds.
        for _ in 0..10 {
            manager.update(&mut rig, &mut targets, DT);
        }
        manager.input_mut().set_key_state(Key::W, true);
        manager.update(&mut rig, &mut targets, 2.0);

        // Displacement is bounded by speed * MAX_FRAME_DT, not speed * 2.
        let moved = rig.camera.translation.z.abs();
        assert!(moved <= cfg.speed * MAX_FRAME_DT + 1.0e-4);
        assert!(moved > 0.0);
    }
}
