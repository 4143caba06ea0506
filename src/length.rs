use ordered_float::OrderedFloat;

/// Sentinel for "no vertex", mirroring the unified vertex/header namespace
/// used by the linked-list pool.
pub const NULL_VERTEX: usize = usize::MAX;

/// The comparison-addition key attached to every vertex: current best
/// distance plus enough path-structure metadata to break ties.
///
/// Field declaration order is load-bearing: `derive(PartialOrd, Ord)`
/// compares fields lexicographically in this order, which is exactly the
/// (length, hops, prev, this) total order the frontier manager relies on to
/// keep distinct vertices' keys from colliding in an ordered map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Length {
    pub length: OrderedFloat<f64>,
    pub num_of_edges: usize,
    pub prev_vertex: usize,
    pub this_vertex: usize,
}

impl Length {
    pub fn zero() -> Self {
        Length {
            length: OrderedFloat(0.0),
            num_of_edges: 0,
            prev_vertex: 0,
            this_vertex: 0,
        }
    }

    pub fn infinity() -> Self {
        Length {
            length: OrderedFloat(f64::INFINITY),
            num_of_edges: usize::MAX,
            prev_vertex: NULL_VERTEX,
            this_vertex: NULL_VERTEX,
        }
    }

    /// The reset value for a vertex `v` that has not yet been reached:
    /// infinite length, but `this_vertex` carries `v`'s own identity so that
    /// keys for distinct unreached vertices remain distinct.
    pub fn unreached(v: usize) -> Self {
        Length {
            length: OrderedFloat(f64::INFINITY),
            num_of_edges: usize::MAX,
            prev_vertex: NULL_VERTEX,
            this_vertex: v,
        }
    }

    pub fn length(&self) -> f64 {
        self.length.0
    }

    pub fn is_infinite(&self) -> bool {
        self.length.0.is_infinite()
    }

    /// Candidate length after traversing an edge `(this_vertex -> to, w)`.
    pub fn relax(&self, to: usize, w: f64) -> Length {
        Length {
            length: OrderedFloat(self.length.0 + w),
            num_of_edges: self.num_of_edges.saturating_add(1),
            prev_vertex: self.this_vertex,
            this_vertex: to,
        }
    }
}

impl Default for Length {
    fn default() -> Self {
        Length::infinity()
    }
}
