/*!
Renderer-agnostic first-person movement and collision core.

The crate owns input intent, kinematic velocity, horizontal slide against
axis-aligned obstacle boxes, downward ground clamping via parry3d rays, and
vertical lift platforms that carry the player. The host application owns the
scene graph and the render loop; it feeds key events into
[`CollisionManager::input_mut`], registers geometry in a
[`CollisionTargets`], and calls [`CollisionManager::update`] once per frame
with its camera rig behind the [`PlayerRig`] trait.
*/

pub mod collision;
pub mod input;
pub mod manager;
pub mod physics;
pub mod platform;
pub mod rig;

pub use collision::{
    CollisionSystem, CollisionTargets, ConfigError, PhysicsConfig, Transform, Vec3, WalkableMesh,
};
pub use input::{InputManager, Key};
pub use manager::{CollisionManager, camera_relative};
pub use physics::PhysicsSystem;
pub use platform::{Platform, PlatformSet, PlatformSpec, PlatformState};
pub use rig::{FirstPersonRig, OrbitRig, PlayerRig};
