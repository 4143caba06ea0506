//! A textbook binary-heap Dijkstra, kept only as a reference implementation
//! for cross-checking BMSSP's output; it has no interface to the BMSSP core
//! beyond reading the same [`Graph`].

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::graph::Graph;

#[derive(PartialEq)]
struct State {
    cost: f64,
    node: usize,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap (a max-heap) acts as a min-heap on cost.
        other.cost.total_cmp(&self.cost)
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest distances from `source` to every vertex; `f64::INFINITY` for
/// unreachable vertices.
pub fn dijkstra_all(graph: &Graph, source: usize) -> Vec<f64> {
    let n = graph.num_vertices();
    let mut dist = vec![f64::INFINITY; n];
    dist[source] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(State { cost: 0.0, node: source });

    while let Some(State { cost, node }) = heap.pop() {
        if cost > dist[node] {
            continue;
        }
        for &(to, weight) in graph.neighbors(node) {
            let next_cost = cost + weight;
            if next_cost < dist[to] {
                dist[to] = next_cost;
                heap.push(State { cost: next_cost, node: to });
            }
        }
    }

    dist
}
