//! Graph I/O, random generation, and the degree-normalization transform.
//! These are explicitly out-of-core collaborators: the BMSSP solver only
//! ever sees a graph through [`Graph::neighbors`].

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};

/// A directed graph with non-negative edge weights, stored as an adjacency
/// list. Vertex 0 is always the solve source.
#[derive(Debug, Clone)]
pub struct Graph {
    adjacency: Vec<Vec<(usize, f64)>>,
    num_edges: usize,
}

impl Graph {
    pub fn with_vertices(n: usize) -> Self {
        Graph {
            adjacency: vec![Vec::new(); n],
            num_edges: 0,
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.adjacency.len()
    }

    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    pub fn add_edge(&mut self, from: usize, to: usize, weight: f64) -> Result<()> {
        if from >= self.num_vertices() || to >= self.num_vertices() {
            return Err(Error::invalid_input(format!(
                "edge ({from}, {to}) references a vertex outside 0..{}",
                self.num_vertices()
            )));
        }
        if weight < 0.0 {
            return Err(Error::invalid_input(format!(
                "negative edge weight {weight} on edge ({from}, {to})"
            )));
        }
        self.adjacency[from].push((to, weight));
        self.num_edges += 1;
        Ok(())
    }

    pub fn neighbors(&self, v: usize) -> &[(usize, f64)] {
        &self.adjacency[v]
    }

    /// Loads a graph in the `n m` header / `from to weight` per-line text
    /// format.
    pub fn load(path: impl AsRef<Path>) -> Result<Graph> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            Error::invalid_input(format!("failed to read graph file {}: {e}", path.display()))
        })?;
        let mut lines = text.lines();

        let header = lines
            .next()
            .ok_or_else(|| Error::invalid_input("missing graph header line"))?;
        let mut header_fields = header.split_whitespace();
        let n: usize = header_fields
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| Error::invalid_input("invalid graph header: missing or malformed n"))?;
        let m: usize = header_fields
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| Error::invalid_input("invalid graph header: missing or malformed m"))?;

        let mut graph = Graph::with_vertices(n);
        for i in 0..m {
            let line = lines
                .next()
                .ok_or_else(|| Error::invalid_input(format!("premature EOF: expected {m} edges, found {i}")))?;
            let mut fields = line.split_whitespace();
            let from: usize = fields
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| Error::invalid_input(format!("malformed edge line {i}: missing from")))?;
            let to: usize = fields
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| Error::invalid_input(format!("malformed edge line {i}: missing to")))?;
            let weight: f64 = fields
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| Error::invalid_input(format!("malformed edge line {i}: missing weight")))?;
            graph.add_edge(from, to, weight)?;
        }
        Ok(graph)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = fs::File::create(path.as_ref())
            .map_err(|e| Error::invalid_input(format!("failed to create graph file: {e}")))?;
        writeln!(file, "{} {}", self.num_vertices(), self.num_edges())
            .map_err(|e| Error::invalid_input(format!("failed to write graph file: {e}")))?;
        for (from, edges) in self.adjacency.iter().enumerate() {
            for &(to, weight) in edges {
                writeln!(file, "{from} {to} {weight}")
                    .map_err(|e| Error::invalid_input(format!("failed to write graph file: {e}")))?;
            }
        }
        Ok(())
    }

    /// Generates a random graph with `n` vertices and exactly `m` edges, no
    /// self-loops, no parallel edges, weights uniform in `[min_len,
    /// max_len]`. `seed == 0` draws from OS entropy; any other seed is
    /// reproducible.
    pub fn generate_random(seed: u64, n: usize, m: usize, min_len: f64, max_len: f64) -> Result<Graph> {
        if n == 0 {
            return Err(Error::invalid_input("random graph generation requires n >= 1"));
        }
        let max_possible_edges = n.saturating_mul(n.saturating_sub(1));
        if m > max_possible_edges {
            return Err(Error::invalid_input(format!(
                "cannot generate {m} simple edges among {n} vertices (max {max_possible_edges})"
            )));
        }

        let mut rng = if seed == 0 {
            StdRng::from_entropy()
        } else {
            StdRng::seed_from_u64(seed)
        };

        let mut graph = Graph::with_vertices(n);
        let mut seen: HashSet<(usize, usize)> = HashSet::with_capacity(m);
        let mut redraws = 0u64;
        while graph.num_edges() < m {
            let from = rng.gen_range(0..n);
            let to = rng.gen_range(0..n);
            if from == to || seen.contains(&(from, to)) {
                redraws += 1;
                if redraws % 10_000 == 0 {
                    warn!("random graph generation has redrawn {redraws} self-loop/duplicate edges");
                }
                continue;
            }
            let weight = rng.gen_range(min_len..=max_len);
            seen.insert((from, to));
            graph.add_edge(from, to, weight)?;
        }
        Ok(graph)
    }

    /// Transforms this graph into one where every vertex has out-degree at
    /// most 2, preserving distances from vertex 0 on the original vertex
    /// indices `0..n`. Produces `n + 2m` vertices and `n + 3m` edges.
    pub fn to_constant_out_degree(&self) -> Graph {
        let n = self.num_vertices();
        let m = self.num_edges();
        let mut out = Graph::with_vertices(n + 2 * m);

        let mut head = vec![0usize; n];
        let mut curr = vec![0usize; n];
        for v in 0..n {
            head[v] = v;
            curr[v] = v;
        }

        let mut next_split = n;
        for (from, edges) in self.adjacency.iter().enumerate() {
            for &(to, weight) in edges {
                let s0 = next_split;
                let s1 = next_split + 1;
                next_split += 2;

                out.add_edge(curr[from], s0, 0.0).expect("split vertex in range");
                curr[from] = s0;

                out.add_edge(curr[to], s1, 0.0).expect("split vertex in range");
                curr[to] = s1;

                out.add_edge(s0, s1, weight).expect("split vertex in range");
            }
        }

        for v in 0..n {
            if curr[v] != head[v] {
                out.add_edge(curr[v], head[v], 0.0).expect("cycle-closing edge in range");
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_the_text_format() {
        let dir = std::env::temp_dir().join(format!("bmssp-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("graph.txt");
        std::fs::write(&path, "3 2\n0 1 4\n1 2 5\n").unwrap();
        let g = Graph::load(&path).unwrap();
        assert_eq!(g.num_vertices(), 3);
        assert_eq!(g.num_edges(), 2);
        assert_eq!(g.neighbors(0), &[(1, 4.0)]);
    }

    #[test]
    fn rejects_out_of_range_vertex() {
        let mut g = Graph::with_vertices(2);
        assert!(g.add_edge(0, 5, 1.0).is_err());
    }

    #[test]
    fn rejects_negative_weight() {
        let mut g = Graph::with_vertices(2);
        assert!(g.add_edge(0, 1, -1.0).is_err());
    }

    #[test]
    fn constant_degree_transform_produces_expected_counts() {
        let mut g = Graph::with_vertices(3);
        g.add_edge(0, 1, 2.0).unwrap();
        g.add_edge(1, 2, 3.0).unwrap();
        g.add_edge(2, 0, 5.0).unwrap();
        let n = g.num_vertices();
        let m = g.num_edges();
        let transformed = g.to_constant_out_degree();
        assert_eq!(transformed.num_vertices(), n + 2 * m);
        assert_eq!(transformed.num_edges(), n + 3 * m);
        for v in 0..transformed.num_vertices() {
            assert!(transformed.neighbors(v).len() <= 2);
        }
    }

    #[test]
    fn random_generation_has_no_self_loops_or_duplicates() {
        let g = Graph::generate_random(42, 20, 40, 1.0, 10.0).unwrap();
        assert_eq!(g.num_vertices(), 20);
        assert_eq!(g.num_edges(), 40);
        let mut seen = HashSet::new();
        for (from, edges) in (0..g.num_vertices()).zip((0..g.num_vertices()).map(|v| g.neighbors(v))) {
            for &(to, _) in edges {
                assert_ne!(from, to);
                assert!(seen.insert((from, to)), "duplicate edge ({from}, {to})");
            }
        }
    }

    #[test]
    fn random_generation_is_reproducible_with_a_fixed_seed() {
        let a = Graph::generate_random(7, 10, 15, 1.0, 5.0).unwrap();
        let b = Graph::generate_random(7, 10, 15, 1.0, 5.0).unwrap();
        for v in 0..10 {
            assert_eq!(a.neighbors(v), b.neighbors(v));
        }
    }
}
