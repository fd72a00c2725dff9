use crate::geometry::Aabb;

/// A body as seen by the broad phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proxy {
    pub aabb: Aabb,
    pub is_static: bool,
}

impl Proxy {
    #[inline]
    pub fn new(aabb: Aabb, is_static: bool) -> Self {
        Self { aabb, is_static }
    }
}

/// Index pairs `(i, j)` with `i < j` whose boxes overlap.
///
/// Every pair is tested; pairs of two static bodies never collide and are
/// skipped.
pub fn query_pairs(proxies: &[Proxy]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, a) in proxies.iter().enumerate() {
        for (j, b) in proxies.iter().enumerate().skip(i + 1) {
            if a.is_static && b.is_static {
                continue;
            }
            if a.aabb.intersects(b.aabb) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}
