/*!
Obstacle-box bookkeeping and the uniform spatial grid.

Static boxes are built once at level-load time; moving meshes contribute one
recomputed box per frame. The derived per-frame list is always `statics`
followed by the moving boxes, so a grid built over the static set can prune
the static prefix while the (short) moving tail is scanned linearly. The
grid is an optional acceleration structure behind the same query path, not a
competing implementation.
*/

use std::collections::HashMap;

use parry3d::shape::SharedShape;

use super::ground::WalkableMesh;
use super::settings::{MOVING_BOX_Y_SLACK, TALL_WALL_HEIGHT, TILE_SIZE};
use super::types::{Aabb, MeshId, Point3, Transform, Vec3};

/// Register a prebuilt static obstacle box.
#[inline]
pub fn add_obstacle(list: &mut Vec<Aabb>, aabb: Aabb) {
    list.push(aabb);
}

/// Register a static obstacle from a shape and its world pose. The box is
/// computed once here and never recomputed (static geometry does not move).
pub fn add_obstacle_shape(list: &mut Vec<Aabb>, shape: &SharedShape, transform: Transform) {
    list.push(shape.compute_aabb(&transform.iso()));
}

/// Register one tiny box per world-space triangle, for fine-grained terrain.
///
/// Triangles whose bounding box is taller than [`TALL_WALL_HEIGHT`] are
/// skipped: tall wall faces are better represented by one coarse box and
/// would otherwise flood the grid with slivers the player can never reach.
pub fn add_triangle_obstacles(list: &mut Vec<Aabb>, triangles: &[[Point3; 3]]) {
    for tri in triangles {
        let mut mins = tri[0];
        let mut maxs = tri[0];
        for p in &tri[1..] {
            for i in 0..3 {
                mins[i] = mins[i].min(p[i]);
                maxs[i] = maxs[i].max(p[i]);
            }
        }
        if maxs.y - mins.y > TALL_WALL_HEIGHT {
            continue;
        }
        list.push(Aabb { mins, maxs });
    }
}

/// Rebuild the derived per-frame obstacle list: all static boxes, then one
/// recomputed box per moving mesh (expanded upward so a rising lift keeps
/// blocking horizontal movement near its edges).
///
/// Must run once per frame after moving meshes have advanced and before any
/// slide or clamp query; moving boxes are invalid outside that frame.
pub fn update_obstacle_boxes(
    static_boxes: &[Aabb],
    meshes: &[WalkableMesh],
    moving: &[MeshId],
    out: &mut Vec<Aabb>,
) {
    out.clear();
    out.extend_from_slice(static_boxes);
    for &id in moving {
        let mut aabb = meshes[id].world_aabb();
        aabb.maxs.y += MOVING_BOX_Y_SLACK;
        out.push(aabb);
    }
}

/// Uniform grid over the XZ footprints of the static obstacle set.
///
/// Built once at load time and read-only afterwards. Each box is inserted
/// into every tile its footprint overlaps, so a candidate may appear more
/// than once; callers run a boolean test, so duplicates are harmless.
pub struct SpatialGrid {
    tile_size: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl SpatialGrid {
    /// Partition `static_boxes` into tiles of the default [`TILE_SIZE`].
    pub fn build(static_boxes: &[Aabb]) -> Self {
        Self::build_with_tile_size(static_boxes, TILE_SIZE)
    }

    pub fn build_with_tile_size(static_boxes: &[Aabb], tile_size: f32) -> Self {
        let mut cells: HashMap<(i32, i32), Vec<usize>> = HashMap::new();
        for (i, aabb) in static_boxes.iter().enumerate() {
            let min_x = (aabb.mins.x / tile_size).floor() as i32;
            let max_x = (aabb.maxs.x / tile_size).floor() as i32;
            let min_z = (aabb.mins.z / tile_size).floor() as i32;
            let max_z = (aabb.maxs.z / tile_size).floor() as i32;
            for gx in min_x..=max_x {
                for gz in min_z..=max_z {
                    cells.entry((gx, gz)).or_default().push(i);
                }
            }
        }
        Self { tile_size, cells }
    }

    /// Static-box indices near a point: the 3x3 tile block around it.
    pub fn candidates(&self, x: f32, z: f32) -> Vec<usize> {
        let gx = (x / self.tile_size).floor() as i32;
        let gz = (z / self.tile_size).floor() as i32;
        let mut out = Vec::new();
        for dx in -1..=1 {
            for dz in -1..=1 {
                if let Some(cell) = self.cells.get(&(gx + dx, gz + dz)) {
                    out.extend_from_slice(cell);
                }
            }
        }
        out
    }

    /// Static-box indices near a segment's XZ footprint (tile range spanned
    /// by both endpoints, padded by one tile on each side).
    pub fn candidates_for_segment(&self, a: &Point3, b: &Point3) -> Vec<usize> {
        let min_x = ((a.x.min(b.x)) / self.tile_size).floor() as i32 - 1;
        let max_x = ((a.x.max(b.x)) / self.tile_size).floor() as i32 + 1;
        let min_z = ((a.z.min(b.z)) / self.tile_size).floor() as i32 - 1;
        let max_z = ((a.z.max(b.z)) / self.tile_size).floor() as i32 + 1;
        let mut out = Vec::new();
        for gx in min_x..=max_x {
            for gz in min_z..=max_z {
                if let Some(cell) = self.cells.get(&(gx, gz)) {
                    out.extend_from_slice(cell);
                }
            }
        }
        out
    }
}
