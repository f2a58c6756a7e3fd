/*!
Control-scheme adapters.

Different control schemes hang the camera off different nodes: a pointer-lock
scheme moves the camera itself, an orbit scheme moves a pivot the camera
looks at. [`PlayerRig`] names the one transform movement and yaw apply to
(the "yaw object"), chosen once at setup instead of re-detected every frame.
*/

use crate::collision::types::{Transform, Vec3};

/// Adapter over whichever node the controller should move.
pub trait PlayerRig {
    /// The transform movement and yaw rotation are applied to.
    fn yaw_transform(&mut self) -> &mut Transform;

    /// World-space eye position (for the host's camera update).
    fn eye_position(&self) -> Vec3;
}

/// Pointer-lock style: the camera is the yaw object.
pub struct FirstPersonRig {
    pub camera: Transform,
}

impl FirstPersonRig {
    pub fn new(camera: Transform) -> Self {
        Self { camera }
    }
}

impl PlayerRig for FirstPersonRig {
    #[inline]
    fn yaw_transform(&mut self) -> &mut Transform {
        &mut self.camera
    }

    #[inline]
    fn eye_position(&self) -> Vec3 {
        self.camera.translation
    }
}

/// Orbit style: movement applies to a pivot node; the camera sits at a
/// local offset that yaws with the pivot.
pub struct OrbitRig {
    pub pivot: Transform,
    pub camera_offset: Vec3,
}

impl OrbitRig {
    pub fn new(pivot: Transform, camera_offset: Vec3) -> Self {
        Self {
            pivot,
            camera_offset,
        }
    }
}

impl PlayerRig for OrbitRig {
    #[inline]
    fn yaw_transform(&mut self) -> &mut Transform {
        &mut self.pivot
    }

    #[inline]
    fn eye_position(&self) -> Vec3 {
        self.pivot.translation + self.pivot.rotation * self.camera_offset
    }
}
