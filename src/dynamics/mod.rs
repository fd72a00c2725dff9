mod body;
mod integrator;
mod rigid_body;

pub use body::{Body, MassPoint};
pub use integrator::{
    forward_euler, runge_kutta_4, semi_implicit_euler, Derivative, IntegrationMethod, State,
};
pub use rigid_body::RigidBody;
