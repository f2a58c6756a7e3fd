/*!
Walkable meshes and downward ray queries.

The host scene library is responsible for building shapes; this module only
needs a shape it can cast a ray against and a world pose for it. parry3d
provides both, so "ray vs scene" becomes a linear scan of
[`WalkableMesh`] entries with `cast_ray_and_get_normal`.
*/

use parry3d::query::{Ray, RayCast};
use parry3d::shape::SharedShape;

use super::settings::WALKABLE_NORMAL_MIN_Y;
use super::types::{Aabb, GroundHit, MeshId, PlatformId, Point3, Transform, Vec3};

/// A scene mesh the player can stand on (and, for lifts, ride).
pub struct WalkableMesh {
    /// Collision shape in local space.
    pub shape: SharedShape,
    /// World pose. Moving meshes update `transform.translation` per frame.
    pub transform: Transform,
    /// Flagged ground: only flagged meshes can be landed on.
    pub is_ground: bool,
    /// Back-link to the platform entry this mesh belongs to, if any.
    pub platform: Option<PlatformId>,
}

impl WalkableMesh {
    /// A plain ground mesh (floors, terrain, walkways).
    pub fn ground(shape: SharedShape, transform: Transform) -> Self {
        Self {
            shape,
            transform,
            is_ground: true,
            platform: None,
        }
    }

    /// A mesh that exists in the scene but must not be landed on.
    pub fn decoration(shape: SharedShape, transform: Transform) -> Self {
        Self {
            shape,
            transform,
            is_ground: false,
            platform: None,
        }
    }

    /// World-space bounding box at the mesh's current pose.
    #[inline]
    pub fn world_aabb(&self) -> Aabb {
        self.shape.compute_aabb(&self.transform.iso())
    }

    /// Cast a downward ray from `origin` against this mesh only.
    pub fn cast_down(&self, origin: Point3, max: f32) -> Option<GroundHitLocal> {
        let ray = Ray::new(origin, Vec3::new(0.0, -1.0, 0.0));
        let iso = self.transform.iso();
        self.shape
            .cast_ray_and_get_normal(&iso, &ray, max, true)
            .map(|inter| GroundHitLocal {
                point: ray.point_at(inter.time_of_impact),
                normal: inter.normal,
                distance: inter.time_of_impact,
            })
    }
}

/// A downward hit before it has been associated with a mesh id.
#[derive(Clone, Copy, Debug)]
pub struct GroundHitLocal {
    pub point: Point3,
    pub normal: Vec3,
    pub distance: f32,
}

/// Short downward probe against a single mesh. Used for the platform
/// boarding check ("are the player's feet over this slab?").
#[inline]
pub fn over_mesh(mesh: &WalkableMesh, pos: Vec3, max: f32) -> bool {
    mesh.cast_down(Point3::new(pos.x, pos.y, pos.z), max).is_some()
}

/// Nearest walkable hit below `origin` within `max` meters.
///
/// Walkable means: the mesh is flagged ground AND the surface normal points
/// sufficiently upward (`normal.y > WALKABLE_NORMAL_MIN_Y`). Non-walkable
/// hits are skipped entirely so a wall face cannot shadow the floor below it.
pub fn nearest_walkable(meshes: &[WalkableMesh], origin: Point3, max: f32) -> Option<GroundHit> {
    let mut best: Option<GroundHit> = None;
    let mut best_dist = f32::INFINITY;

    for (id, mesh) in meshes.iter().enumerate() {
        if !mesh.is_ground {
            continue;
        }
        if let Some(hit) = mesh.cast_down(origin, max) {
            if hit.normal.y > WALKABLE_NORMAL_MIN_Y && hit.distance < best_dist {
                best_dist = hit.distance;
                best = Some(GroundHit {
                    point: hit.point,
                    normal: hit.normal,
                    mesh: id as MeshId,
                });
            }
        }
    }

    best
}
