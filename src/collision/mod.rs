/*!
Collision root module.

This module re-exports submodules that implement the first-person collision
core using parry3d for ray queries and a simple broad-phase grid for static
world acceleration. The code is split for clarity:

- types:    shared data types (Transform, GroundHit, AABB helpers)
- settings: controller constants and the validated `PhysicsConfig`
- broad:    broad-phase helpers (obstacle boxes, spatial hash grid)
- ground:   downward ray casts against walkable meshes
- system:   horizontal slide and vertical ground clamp
*/

pub mod broad;
pub mod ground;
pub mod settings;
pub mod system;
pub mod types;

// Re-export commonly used types and functions.
pub use broad::SpatialGrid;
pub use ground::{GroundHitLocal, WalkableMesh, nearest_walkable, over_mesh};
pub use settings::{ConfigError, PhysicsConfig};
pub use system::{CollisionSystem, CollisionTargets};
pub use types::{
    Aabb, GroundHit, MeshId, PlatformId, Quat, Transform, Vec3, aabb_contains_point,
    aabb_from_center_size, aabb_intersects, aabb_intersects_segment,
};
