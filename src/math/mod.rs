mod mat3;
mod matrix;
mod quat;
mod transform;
mod vec3;
mod vector;

pub use mat3::Mat3;
pub use matrix::{Matrix, Reduction};
pub use quat::Quat;
pub use transform::Transform;
pub use vec3::Vec3;
pub use vector::Vector;

/// Common math and physical constants
pub mod consts {
    /// A small epsilon value for floating point comparisons
    pub const EPSILON: f32 = 1e-6;

    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Two times Pi
    pub const TAU: f32 = std::f32::consts::TAU;

    /// Standard gravitational acceleration at the Earth's surface, in m/s²
    pub const STANDARD_GRAVITY: f32 = 9.81;
}
