pub mod gjk;

pub use gjk::{gjk, intersects, support, GjkResult, Hull, Simplex};
