/*!
Core collision types and math aliases shared by the collision submodules.

This module intentionally contains no algorithms. It defines the data types
exchanged between:
- broad (obstacle boxes, the derived per-frame list, the spatial grid)
- ground (downward ray queries against walkable meshes)
- the collision system (slide + ground clamp)
- the per-frame orchestrator
*/

use nalgebra as na;
pub use parry3d::bounding_volume::Aabb;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Point3 = na::Point3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// Index of a walkable mesh in `CollisionTargets::world_meshes`.
pub type MeshId = usize;

/// Index of a platform in a `PlatformSet`.
///
/// The player-side latch is `Option<PlatformId>` and the platform-side latch
/// is an optional rider record. Neither side owns the other.
pub type PlatformId = usize;

/// A rigid transform in world space. Rotation is yaw-only in practice
/// (the controller never pitches or rolls the body it moves).
#[derive(Clone, Copy, Debug)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Transform {
    #[inline]
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// An identity-oriented transform at `translation`.
    #[inline]
    pub fn at(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::identity(),
        }
    }

    /// Convert to nalgebra `Isometry3` for use with parry3d queries.
    #[inline]
    pub fn iso(&self) -> Iso {
        Iso::from_parts(
            na::Translation3::new(self.translation.x, self.translation.y, self.translation.z),
            self.rotation,
        )
    }
}

/// A confirmed downward ray intersection against a walkable mesh.
#[derive(Clone, Copy, Debug)]
pub struct GroundHit {
    /// World-space impact point.
    pub point: Point3,
    /// World-space surface normal at the impact.
    pub normal: Vec3,
    /// Which registered mesh was hit.
    pub mesh: MeshId,
}

/// Build an AABB from a center position and full extents.
#[inline]
pub fn aabb_from_center_size(center: Vec3, size: Vec3) -> Aabb {
    let half = size * 0.5;
    Aabb {
        mins: Point3::new(center.x - half.x, center.y - half.y, center.z - half.z),
        maxs: Point3::new(center.x + half.x, center.y + half.y, center.z + half.z),
    }
}

/// Test whether a point lies inside an AABB (inclusive on the faces).
#[inline]
pub fn aabb_contains_point(a: &Aabb, p: &Point3) -> bool {
    p.x >= a.mins.x
        && p.x <= a.maxs.x
        && p.y >= a.mins.y
        && p.y <= a.maxs.y
        && p.z >= a.mins.z
        && p.z <= a.maxs.z
}

/// Test two AABBs for intersection.
#[inline]
pub fn aabb_intersects(a: &Aabb, b: &Aabb) -> bool {
    !(a.maxs.x < b.mins.x
        || a.mins.x > b.maxs.x
        || a.maxs.y < b.mins.y
        || a.mins.y > b.maxs.y
        || a.maxs.z < b.mins.z
        || a.mins.z > b.maxs.z)
}

/// Test whether an axis-aligned segment from `a` to `b` passes through an AABB.
///
/// Per-axis interval overlap. For the stationary axes this degenerates to a
/// point-in-range test, so for small steps it matches a plain containment
/// test of the endpoint while still catching a large step that would cross
/// the box entirely.
#[inline]
pub fn aabb_intersects_segment(aabb: &Aabb, a: &Point3, b: &Point3) -> bool {
    for i in 0..3 {
        let lo = a[i].min(b[i]);
        let hi = a[i].max(b[i]);
        if hi < aabb.mins[i] || lo > aabb.maxs[i] {
            return false;
        }
    }
    true
}
