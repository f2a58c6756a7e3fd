/*!
Horizontal slide resolution and vertical ground clamping.

`CollisionSystem` owns the per-frame working state: the derived obstacle
list, the optional static-box grid, and the ground bookkeeping
(`last_ground_y`, `current_ground`). All of its queries are synchronous
in-memory geometry tests against the current frame's obstacle snapshot;
`refresh_obstacles` must run first each frame.
*/

use log::debug;
use parry3d::shape::SharedShape;

use super::broad::{self, SpatialGrid};
use super::ground::{self, WalkableMesh};
use super::settings::{FIRST_FRAME_RAY_RANGE, FOOT_RAY_EPS, PhysicsConfig, RAY_RANGE_MARGIN};
use super::types::{
    Aabb, MeshId, PlatformId, Point3, Transform, Vec3, aabb_from_center_size, aabb_intersects,
    aabb_intersects_segment,
};
use crate::platform::PlatformSet;

/// The external geometry registry the collision core consumes.
///
/// Scene-setup code is the producer: append-only at load time for walkable
/// meshes and static boxes, while `moving` names the meshes whose boxes must
/// be recomputed every frame (lifts). The collision system is the sole
/// reader during queries.
#[derive(Default)]
pub struct CollisionTargets {
    /// Meshes the downward ray is cast against.
    pub world_meshes: Vec<WalkableMesh>,
    /// Immutable per-level obstacle volumes.
    pub static_boxes: Vec<Aabb>,
    /// Meshes (by id) whose obstacle box is recomputed each frame.
    pub moving: Vec<MeshId>,
}

impl CollisionTargets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mesh the player can stand on. Returns its id.
    pub fn add_ground(&mut self, shape: SharedShape, transform: Transform) -> MeshId {
        self.world_meshes.push(WalkableMesh::ground(shape, transform));
        self.world_meshes.len() - 1
    }

    /// Register a static obstacle volume.
    pub fn add_obstacle(&mut self, aabb: Aabb) {
        broad::add_obstacle(&mut self.static_boxes, aabb);
    }

    /// Register a static obstacle from a shape and pose (box computed once).
    pub fn add_obstacle_shape(&mut self, shape: &SharedShape, transform: Transform) {
        broad::add_obstacle_shape(&mut self.static_boxes, shape, transform);
    }
}

pub struct CollisionSystem {
    cfg: PhysicsConfig,
    /// Derived, rebuilt every frame: statics followed by moving boxes.
    obstacle_boxes: Vec<Aabb>,
    /// Length of the static prefix of `obstacle_boxes` this frame.
    static_len: usize,
    /// Optional acceleration over the static box set.
    grid: Option<SpatialGrid>,
    /// Y of the last confirmed ground contact; bounds the downward ray.
    last_ground_y: Option<f32>,
    /// Mesh the player's feet last rested on.
    current_ground: Option<MeshId>,
}

impl CollisionSystem {
    pub fn new(cfg: PhysicsConfig) -> Self {
        Self {
            cfg,
            obstacle_boxes: Vec::new(),
            static_len: 0,
            grid: None,
            last_ground_y: None,
            current_ground: None,
        }
    }

    /// Build the static-box grid. Call once after level construction; the
    /// grid is read-only afterwards and must not outlive additions to the
    /// static set.
    pub fn build_grid(&mut self, targets: &CollisionTargets) {
        self.grid = Some(SpatialGrid::build(&targets.static_boxes));
    }

    /// Mesh the player's feet last rested on, if any.
    #[inline]
    pub fn current_ground(&self) -> Option<MeshId> {
        self.current_ground
    }

    /// Rebuild the derived obstacle list. Must run after moving meshes have
    /// advanced this frame and before `slide_horizontal` / `ground_clamp`.
    pub fn refresh_obstacles(&mut self, targets: &CollisionTargets) {
        broad::update_obstacle_boxes(
            &targets.static_boxes,
            &targets.world_meshes,
            &targets.moving,
            &mut self.obstacle_boxes,
        );
        self.static_len = targets.static_boxes.len();
    }

    /// Does the axis-aligned move from `from` to `to` cross any obstacle box?
    fn blocked(&self, from: &Point3, to: &Point3) -> bool {
        match &self.grid {
            Some(grid) => {
                for i in grid.candidates_for_segment(from, to) {
                    if aabb_intersects_segment(&self.obstacle_boxes[i], from, to) {
                        return true;
                    }
                }
                // Moving boxes are never in the grid; scan the tail.
                for aabb in &self.obstacle_boxes[self.static_len..] {
                    if aabb_intersects_segment(aabb, from, to) {
                        return true;
                    }
                }
                false
            }
            None => self
                .obstacle_boxes
                .iter()
                .any(|aabb| aabb_intersects_segment(aabb, from, to)),
        }
    }

    /// Slide along X then Z. Each axis is tested on its own against the
    /// same obstacle snapshot, so blocking one axis never blocks the other;
    /// that is what produces wall sliding. The tentative move is swept as a
    /// segment, so a large-dt step cannot tunnel through a box.
    pub fn slide_horizontal(&self, player: &mut Transform, velocity: &Vec3, dt: f32) {
        let p = player.translation;

        let from = Point3::new(p.x, p.y, p.z);
        let to_x = Point3::new(p.x + velocity.x * dt, p.y, p.z);
        if !self.blocked(&from, &to_x) {
            player.translation.x = to_x.x;
        }

        let p = player.translation;
        let from = Point3::new(p.x, p.y, p.z);
        let to_z = Point3::new(p.x, p.y, p.z + velocity.z * dt);
        if !self.blocked(&from, &to_z) {
            player.translation.z = to_z.z;
        }
    }

    /// Ground detection and snapping. The caller has already integrated the
    /// vertical position for this frame (gravity is applied exactly once,
    /// by the physics step). Returns true on a landing event.
    pub fn ground_clamp(
        &mut self,
        player: &mut Transform,
        velocity: &mut Vec3,
        targets: &CollisionTargets,
        platforms: &mut PlatformSet,
        current_platform: &mut Option<PlatformId>,
        dt: f32,
    ) -> bool {
        let half = self.cfg.half_height;
        let pos = player.translation;
        let foot = Point3::new(pos.x, pos.y - (half - FOOT_RAY_EPS), pos.z);
        let mut landed = false;

        // Detach when the player's box no longer overlaps the platform box.
        if let Some(pid) = *current_platform {
            let platform_box = platforms.world_box(pid, &targets.world_meshes);
            let player_box = aabb_from_center_size(
                pos,
                Vec3::new(self.cfg.half_height, self.cfg.height, self.cfg.half_height),
            );
            if !aabb_intersects(&platform_box, &player_box) {
                platforms.release(pid);
                *current_platform = None;
                debug!("platform {pid}: rider drifted off, latch dropped");
            }
        }

        // Adaptive ray range: long on the very first probe, afterwards just
        // the step-down tolerance plus however far the feet are above the
        // last confirmed ground, plus this frame's fall.
        let range = match self.last_ground_y {
            None => FIRST_FRAME_RAY_RANGE,
            Some(ground_y) => {
                self.cfg.step_down
                    + (ground_y - foot.y).max(0.0)
                    + (velocity.y * dt).abs()
                    + RAY_RANGE_MARGIN
            }
        };

        if velocity.y <= 0.0 {
            if let Some(hit) = ground::nearest_walkable(&targets.world_meshes, foot, range) {
                player.translation.y = hit.point.y + half;
                velocity.y = 0.0;
                landed = true;
                self.current_ground = Some(hit.mesh);
                self.last_ground_y = Some(hit.point.y);

                match targets.world_meshes[hit.mesh].platform {
                    Some(pid) => {
                        let offset = player.translation.y
                            - targets.world_meshes[hit.mesh].transform.translation.y;
                        platforms.latch(pid, offset);
                        if *current_platform != Some(pid) {
                            debug!("platform {pid}: rider latched on landing");
                        }
                        *current_platform = Some(pid);
                    }
                    None => {
                        if let Some(old) = current_platform.take() {
                            platforms.release(old);
                        }
                    }
                }
            }
        }

        // Safety net: never fall below the global floor.
        let min_y = self.cfg.ground_level + half;
        if player.translation.y < min_y {
            player.translation.y = min_y;
            velocity.y = 0.0;
            landed = true;
            self.last_ground_y = Some(self.cfg.ground_level);
            self.current_ground = None;
        }

        if landed {
            debug!(
                "landed at y={:.3} (ground_y={:.3?})",
                player.translation.y, self.last_ground_y
            );
        }
        landed
    }
}
