//! The BMSSP recursion itself: [`Solver::solve`] derives parameters and
//! drives `bmssp_recurse`, which alternates between `find_pivot`, the
//! frontier manager, and (at `l == 0`) a mini-Dijkstra base case.

use std::collections::BTreeMap;

use hashbrown::{HashMap, HashSet};
use log::{debug, info};

use crate::block::Block;
use crate::error::{Error, Result};
use crate::frontier_manager::FrontierManager;
use crate::graph::Graph;
use crate::length::Length;
use crate::linked_list::{ManualLinkedListBase, Pool};

pub struct Solver<'g> {
    graph: &'g Graph,
    dhat: Vec<Length>,
    pool: Pool,
}

impl<'g> Solver<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        let n = graph.num_vertices();
        Solver {
            graph,
            dhat: vec![Length::infinity(); n],
            pool: ManualLinkedListBase::new(n),
        }
    }

    /// Runs BMSSP from vertex 0; after return, [`Solver::distances`] holds
    /// the shortest-path lengths.
    pub fn solve(&mut self) -> Result<()> {
        let n = self.graph.num_vertices();
        if n == 0 {
            return Ok(());
        }
        self.reset_dhat();

        let log2_n = (n as f64).log2().max(1.0);
        let l = (log2_n.cbrt().ceil() as usize).max(1);
        let k = l;
        let t = l * l;
        info!(
            "solve: n={n} m={} l={l} k={k} t={t}",
            self.graph.num_edges()
        );

        let initial = Block::new(&self.pool, Length::infinity(), Length::zero(), 0);
        initial.add_item(0);
        self.bmssp_recurse(l, k, t, Length::infinity(), &initial)?;

        info!("solve: done");
        Ok(())
    }

    pub fn distances(&self) -> Vec<f64> {
        self.dhat.iter().map(|len| len.length()).collect()
    }

    /// Number of list headers currently allocated in the shared pool (P8):
    /// bounded by the max number of Blocks alive at once during the
    /// recursion, not by the total number of Blocks ever created.
    pub fn live_header_count(&self) -> usize {
        self.pool.borrow().live_header_count()
    }

    fn reset_dhat(&mut self) {
        let n = self.graph.num_vertices();
        self.dhat = (0..n)
            .map(|v| if v == 0 { Length::zero() } else { Length::unreached(v) })
            .collect();
    }

    fn edges_of(&self, v: usize) -> Vec<(usize, f64)> {
        self.graph.neighbors(v).to_vec()
    }

    /// §4.6 FindPivot. Returns the pivot set `P` and the explored set `W`.
    fn find_pivot(&mut self, k: usize, bound: Length, s: &Block) -> (Vec<usize>, HashSet<usize>) {
        let s_members = s.to_vec();
        let s_set: HashSet<usize> = s_members.iter().copied().collect();
        let mut w_set: HashSet<usize> = s_set.clone();
        let mut layer: HashMap<usize, usize> = s_members.iter().map(|&v| (v, 1)).collect();
        let mut frontier = s_members.clone();
        let limit = k * s_members.len();
        let mut early_exit = false;

        for i in 1..=k {
            if frontier.is_empty() {
                break;
            }
            let mut next_frontier = Vec::new();
            for &u in &frontier {
                if layer.get(&u) != Some(&i) {
                    continue;
                }
                for (v, w) in self.edges_of(u) {
                    let r = self.dhat[u].relax(v, w);
                    if r <= self.dhat[v] && r < bound {
                        self.dhat[v] = r;
                        if !w_set.contains(&v) {
                            w_set.insert(v);
                            layer.insert(v, i + 1);
                            next_frontier.push(v);
                            if w_set.len() - s_set.len() > limit {
                                early_exit = true;
                            }
                        }
                    }
                }
                if early_exit {
                    break;
                }
            }
            if early_exit {
                break;
            }
            frontier = next_frontier;
        }

        if early_exit {
            debug!("find_pivot: early exit, |W|={}", w_set.len());
            return (s_members, w_set);
        }

        // Build the forward-relaxation forest F restricted to W and compute
        // subtree sizes bottom-up with an explicit stack. F is acyclic: any
        // edge surviving the relax-equals-current-best test strictly
        // increases hop count, so the lexicographic Length order can never
        // return to an earlier node in a chain.
        let w_list: Vec<usize> = w_set.iter().copied().collect();
        let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut is_root: HashMap<usize, bool> = w_list.iter().map(|&v| (v, true)).collect();
        for &u in &w_list {
            for &(v, w) in self.graph.neighbors(u) {
                if w_set.contains(&v) {
                    let r = self.dhat[u].relax(v, w);
                    if r <= self.dhat[v] {
                        children.entry(u).or_insert_with(Vec::new).push(v);
                        is_root.insert(v, false);
                    }
                }
            }
        }

        let mut subtree: HashMap<usize, usize> = HashMap::new();
        for &root in &w_list {
            if subtree.contains_key(&root) {
                continue;
            }
            let mut stack = vec![(root, false)];
            while let Some((node, ready)) = stack.pop() {
                if ready {
                    let mut size = 1;
                    if let Some(kids) = children.get(&node) {
                        for &c in kids {
                            size += *subtree.get(&c).unwrap_or(&0);
                        }
                    }
                    subtree.insert(node, size);
                } else if subtree.contains_key(&node) {
                    continue;
                } else {
                    stack.push((node, true));
                    if let Some(kids) = children.get(&node) {
                        for &c in kids {
                            if !subtree.contains_key(&c) {
                                stack.push((c, false));
                            }
                        }
                    }
                }
            }
        }

        let pivots: Vec<usize> = s_members
            .iter()
            .copied()
            .filter(|v| *is_root.get(v).unwrap_or(&true) && *subtree.get(v).unwrap_or(&1) >= k)
            .collect();

        (pivots, w_set)
    }

    /// §4.8 BMSSP_basecase. Precondition: `|S| == 1`.
    fn bmssp_basecase(&mut self, k: usize, bound: Length, s: &Block) -> Result<(Length, Block)> {
        let members = s.to_vec();
        if members.len() != 1 {
            return Err(Error::invariant("bmssp_basecase requires |S| = 1"));
        }
        let x = members[0];

        let mut u = Block::new(&self.pool, bound, self.dhat[x], k);
        u.add_item(x);

        let mut h: BTreeMap<Length, usize> = BTreeMap::new();
        h.insert(self.dhat[x], x);

        while !h.is_empty() && !u.oversized() {
            let (_, node) = h.pop_first().unwrap();
            if !u.contains(node) {
                u.add_item(node);
            }
            for (v, w) in self.edges_of(node) {
                let r = self.dhat[node].relax(v, w);
                let old = self.dhat[v];
                if r <= old && r < bound {
                    h.remove(&old);
                    self.dhat[v] = r;
                    h.insert(r, v);
                }
            }
        }

        if u.size() <= k {
            Ok((bound, u))
        } else {
            let b_prime = u.max(&self.dhat);
            let extracted = u.extract_less_than_or_equal(&self.dhat, &self.pool, b_prime, true);
            Ok((b_prime, extracted))
        }
    }

    /// §4.7 BMSSP_recurse(l, k, t; B, S).
    fn bmssp_recurse(&mut self, l: usize, k: usize, t: usize, bound: Length, s: &Block) -> Result<(Length, Block)> {
        if l == 0 {
            return self.bmssp_basecase(k, bound, s);
        }

        let (pivots, w_set) = self.find_pivot(k, bound, s);
        let m = 1usize << ((l - 1) * t);
        let large_workload = k * (1usize << (l * t));
        debug!(
            "bmssp_recurse: l={l} B={:?} |S|={} M={m} large_workload={large_workload}",
            bound,
            s.size()
        );

        let mut d = FrontierManager::new(&self.pool, m, bound);
        for &p in &pivots {
            d.insert(p, &self.dhat)?;
        }
        let mut b_prime = d.current_lower_bound();
        let mut u = Block::new(&self.pool, bound, b_prime, large_workload);

        loop {
            let (bi, s_i) = d.pull(&self.dhat)?;
            if s_i.is_empty() {
                break;
            }

            let (new_b_prime, u_i) = self.bmssp_recurse(l - 1, k, t, bi, &s_i)?;
            b_prime = new_b_prime;

            if u.size() + u_i.size() > large_workload {
                u.merge(u_i);
                break;
            }

            let u_i_members = u_i.to_vec();
            let mut k_block = Block::new(&self.pool, b_prime, bi, m);
            for u_v in u_i_members {
                for (v, w) in self.edges_of(u_v) {
                    let r = self.dhat[u_v].relax(v, w);
                    if r <= self.dhat[v] && r < bound {
                        self.dhat[v] = r;
                        if r >= bi {
                            d.insert(v, &self.dhat)?;
                        } else {
                            k_block.add_item(v);
                        }
                    }
                }
            }

            u.merge(u_i);
            // Any v in s_i with dhat[v] < Bprime is already folded into u_i by
            // the recursion above; whatever is still owned by s_i has dhat[v]
            // in [Bprime, Bi) and must be carried forward rather than dropped.
            k_block.merge(s_i);
            d.batch_prepend(k_block, &self.dhat)?;
        }

        for w_v in w_set {
            if self.dhat[w_v] < b_prime {
                u.add_item(w_v);
            }
        }

        Ok((b_prime, u))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    fn dist_to(solver: &Solver, v: usize) -> f64 {
        solver.distances()[v]
    }

    #[test]
    fn single_vertex_has_zero_distance() {
        let g = Graph::with_vertices(1);
        let mut solver = Solver::new(&g);
        solver.solve().unwrap();
        assert_eq!(dist_to(&solver, 0), 0.0);
    }

    #[test]
    fn linear_chain_matches_cumulative_sum() {
        let mut g = Graph::with_vertices(5);
        g.add_edge(0, 1, 1.0).unwrap();
        g.add_edge(1, 2, 2.0).unwrap();
        g.add_edge(2, 3, 3.0).unwrap();
        g.add_edge(3, 4, 4.0).unwrap();
        let mut solver = Solver::new(&g);
        solver.solve().unwrap();
        assert_eq!(solver.distances(), vec![0.0, 1.0, 3.0, 6.0, 10.0]);
    }

    #[test]
    fn unreachable_vertex_stays_infinite() {
        let mut g = Graph::with_vertices(3);
        g.add_edge(0, 1, 4.0).unwrap();
        let mut solver = Solver::new(&g);
        solver.solve().unwrap();
        let d = solver.distances();
        assert_eq!(d[0], 0.0);
        assert_eq!(d[1], 4.0);
        assert!(d[2].is_infinite());
    }

    #[test]
    fn diamond_picks_the_shorter_path() {
        let mut g = Graph::with_vertices(4);
        g.add_edge(0, 1, 1.0).unwrap();
        g.add_edge(0, 2, 5.0).unwrap();
        g.add_edge(1, 3, 1.0).unwrap();
        g.add_edge(2, 3, 1.0).unwrap();
        let mut solver = Solver::new(&g);
        solver.solve().unwrap();
        assert_eq!(solver.distances()[3], 2.0);
    }

    #[test]
    fn matches_reference_dijkstra_on_a_denser_graph() {
        let g = Graph::generate_random(123, 60, 200, 1.0, 9.0).unwrap();
        let mut solver = Solver::new(&g);
        solver.solve().unwrap();
        let bmssp = solver.distances();
        let reference = crate::dijkstra::dijkstra_all(&g, 0);
        for v in 0..g.num_vertices() {
            if reference[v].is_infinite() {
                assert!(bmssp[v].is_infinite(), "vertex {v} should be unreachable");
            } else {
                assert!(
                    (bmssp[v] - reference[v]).abs() < 1e-9,
                    "vertex {v}: bmssp={} reference={}",
                    bmssp[v],
                    reference[v]
                );
            }
        }
    }
}
