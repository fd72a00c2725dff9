mod soft_body;
mod spring;

pub use soft_body::SoftBody;
pub use spring::{Connection, DampedSpring, Spring};
