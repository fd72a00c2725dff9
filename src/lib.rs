//! # elastiphy
//!
//! A small 3D physics core written in Rust.
//!
//! ## Features
//!
//! - **Rigid Body Dynamics**: Translation and rotation about the center of mass,
//!   with quaternion orientation and inertia tensors
//! - **Integrators**: Forward Euler, semi-implicit Euler and fourth-order Runge-Kutta
//! - **Collision Detection**: Bounding-box broad phase and GJK narrow phase over convex meshes
//! - **Collision Response**: Elastic impulses along an approximate contact normal
//! - **Soft Bodies**: Point masses joined by springs and damped springs
//! - **Meshes**: Wavefront OBJ ingestion and primitive factories
//!
//! ## Quick Start
//!
//! ```rust
//! use elastiphy::prelude::*;
//!
//! // Create a physics world with gravity
//! let mut world = World::new(WorldConfig::default())?.with_gravity(Vec3::new(0.0, -9.81, 0.0));
//!
//! // A falling cube and a bouncing soft cube
//! let cube = world.register(RigidBody::cube(1.0, 1.0)?.with_position(Vec3::new(0.0, 5.0, 0.0)));
//! world.register(SoftBody::cube(1.0, 0.1, 200.0, 0.5)?.with_offset(Vec3::new(3.0, 5.0, 0.0)));
//!
//! // Simulation loop
//! for _ in 0..60 {
//!     world.simulate()?;
//! }
//! let position = world.rigid_body(cube).map(RigidBody::position);
//! println!("Cube position: {:?}", position);
//! # Ok::<(), elastiphy::PhysicsError>(())
//! ```

pub mod collision;
pub mod dynamics;
mod error;
pub mod forces;
pub mod geometry;
pub mod math;
pub mod soft;
mod world;

pub use error::{PhysicsError, Result};
pub use world::{Collision, Entity, EntityHandle, World, WorldConfig};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::collision::Contact;
    pub use crate::dynamics::{Body, IntegrationMethod, MassPoint, RigidBody};
    pub use crate::error::{PhysicsError, Result};
    pub use crate::forces::{ForceGenerator, Gravity, LinearDrag};
    pub use crate::geometry::{Aabb, Mesh};
    pub use crate::math::{Mat3, Matrix, Quat, Transform, Vec3, Vector};
    pub use crate::soft::{Connection, DampedSpring, SoftBody, Spring};
    pub use crate::world::{Collision, Entity, EntityHandle, World, WorldConfig};
}
