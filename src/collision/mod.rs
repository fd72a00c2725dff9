pub mod broad_phase;
pub mod contact;
pub mod narrow_phase;

pub use broad_phase::{query_pairs, Proxy};
pub use contact::{resolve_elastic, Contact};
pub use narrow_phase::{gjk, intersects, GjkResult, Hull, Simplex};
