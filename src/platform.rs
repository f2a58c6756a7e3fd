/*!
Moving platforms (one-shot elevators).

A platform is a walkable, ground-flagged mesh that rises from `floor_y` to
`target_y` once a rider steps onto it. The rider relation is a weak latch,
not ownership: the platform stores an optional rider record (the stored Y
offset), the player side stores an `Option<PlatformId>`, and either side may
be cleared independently.

State machine per platform: `Down -> Moving -> Up`, no reverse transition.
*/

use log::debug;
use parry3d::shape::SharedShape;

use crate::collision::ground::{self, WalkableMesh};
use crate::collision::settings::PLATFORM_PROBE_DISTANCE;
use crate::collision::system::CollisionTargets;
use crate::collision::types::{Aabb, MeshId, PlatformId, Transform, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlatformState {
    Down,
    Moving,
    Up,
}

/// The platform-side half of the latch: the rider's Y offset above the
/// platform origin, captured when boarding.
#[derive(Clone, Copy, Debug)]
pub struct RiderLatch {
    pub offset_y: f32,
}

pub struct Platform {
    /// The lift slab's mesh in `CollisionTargets::world_meshes`.
    pub mesh: MeshId,
    pub floor_y: f32,
    pub target_y: f32,
    /// Vertical speed while moving (m/s).
    pub speed: f32,
    pub state: PlatformState,
    pub rider: Option<RiderLatch>,
}

/// Size and placement of a lift slab at registration time.
#[derive(Clone, Copy, Debug)]
pub struct PlatformSpec {
    /// X-Z footprint side length.
    pub size: f32,
    /// Slab thickness.
    pub thickness: f32,
    /// Starting height of the slab center.
    pub floor_y: f32,
    /// Height the slab stops at.
    pub target_y: f32,
    /// Vertical speed (m/s).
    pub speed: f32,
    pub x: f32,
    pub z: f32,
}

impl Default for PlatformSpec {
    fn default() -> Self {
        Self {
            size: 20.0,
            thickness: 0.4,
            floor_y: 0.2,
            target_y: 90.0,
            speed: 10.0,
            x: 0.0,
            z: 0.0,
        }
    }
}

#[derive(Default)]
pub struct PlatformSet {
    platforms: Vec<Platform>,
}

impl PlatformSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a lift: its slab becomes a walkable, ground-flagged moving
    /// mesh in `targets`, back-linked to the new platform entry.
    pub fn add(&mut self, targets: &mut CollisionTargets, spec: PlatformSpec) -> PlatformId {
        let id = self.platforms.len();

        let shape = SharedShape::cuboid(spec.size * 0.5, spec.thickness * 0.5, spec.size * 0.5);
        let transform = Transform::at(Vec3::new(spec.x, spec.floor_y, spec.z));
        let mut mesh = WalkableMesh::ground(shape, transform);
        mesh.platform = Some(id);

        targets.world_meshes.push(mesh);
        let mesh_id = targets.world_meshes.len() - 1;
        targets.moving.push(mesh_id);

        self.platforms.push(Platform {
            mesh: mesh_id,
            floor_y: spec.floor_y,
            target_y: spec.target_y,
            speed: spec.speed,
            state: PlatformState::Down,
            rider: None,
        });
        id
    }

    #[inline]
    pub fn get(&self, id: PlatformId) -> &Platform {
        &self.platforms[id]
    }

    /// Latch a rider at the given Y offset (idempotent while riding).
    #[inline]
    pub fn latch(&mut self, id: PlatformId, offset_y: f32) {
        self.platforms[id].rider = Some(RiderLatch { offset_y });
    }

    /// Drop the platform-side half of the latch.
    #[inline]
    pub fn release(&mut self, id: PlatformId) {
        self.platforms[id].rider = None;
    }

    /// Current world box of a platform's slab.
    #[inline]
    pub fn world_box(&self, id: PlatformId, meshes: &[WalkableMesh]) -> Aabb {
        meshes[self.platforms[id].mesh].world_aabb()
    }

    /// Return a lift to its starting height and re-arm the boarding probe.
    /// Any latched rider is dropped; the host decides when a level wants a
    /// lift to run again.
    pub fn reset(&mut self, targets: &mut CollisionTargets, id: PlatformId) {
        let platform = &mut self.platforms[id];
        targets.world_meshes[platform.mesh].transform.translation.y = platform.floor_y;
        platform.state = PlatformState::Down;
        platform.rider = None;
        debug!("platform {id}: reset to y={}", platform.floor_y);
    }

    /// Advance every platform by one frame, carrying riders.
    ///
    /// Runs before the obstacle refresh so the collision pass sees this
    /// frame's slab positions.
    pub fn step(
        &mut self,
        targets: &mut CollisionTargets,
        player: &mut Transform,
        current_platform: &mut Option<PlatformId>,
        dt: f32,
    ) {
        for id in 0..self.platforms.len() {
            let mesh_id = self.platforms[id].mesh;

            // Boarding check falls through to movement in the same frame.
            if self.platforms[id].state == PlatformState::Down {
                let boarded = ground::over_mesh(
                    &targets.world_meshes[mesh_id],
                    player.translation,
                    PLATFORM_PROBE_DISTANCE,
                );
                if boarded {
                    let platform_y = targets.world_meshes[mesh_id].transform.translation.y;
                    self.platforms[id].state = PlatformState::Moving;
                    self.platforms[id].rider = Some(RiderLatch {
                        offset_y: player.translation.y - platform_y,
                    });
                    *current_platform = Some(id);
                    debug!(
                        "platform {id}: boarded, rising toward y={}",
                        self.platforms[id].target_y
                    );
                }
            }

            if self.platforms[id].state == PlatformState::Moving {
                let target_y = self.platforms[id].target_y;
                {
                    let y = &mut targets.world_meshes[mesh_id].transform.translation.y;
                    *y = (*y + self.platforms[id].speed * dt).min(target_y);
                }
                let platform_y = targets.world_meshes[mesh_id].transform.translation.y;

                // Carry the rider, if any; drop the latch if it walked or
                // jumped off (the platform keeps moving).
                if let Some(latch) = self.platforms[id].rider {
                    player.translation.y = platform_y + latch.offset_y;
                    *current_platform = Some(id);
                    let still_on = ground::over_mesh(
                        &targets.world_meshes[mesh_id],
                        player.translation,
                        PLATFORM_PROBE_DISTANCE,
                    );
                    if !still_on {
                        self.platforms[id].rider = None;
                        debug!("platform {id}: rider left mid-ride");
                    }
                }

                if platform_y >= target_y {
                    self.platforms[id].state = PlatformState::Up;
                    self.platforms[id].rider = None;
                    if *current_platform == Some(id) {
                        *current_platform = None;
                    }
                    debug!("platform {id}: reached top, rider released");
                }
            }
        }
    }
}
