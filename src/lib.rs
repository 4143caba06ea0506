//! A bounded multi-source shortest path (BMSSP) solver, after Duan, Mao,
//! Mao, Shu, and Yin, "Breaking the Sorting Barrier for Directed
//! Single-Source Shortest Paths" (arXiv:2504.17033v1), with a reference
//! Dijkstra implementation for cross-checking.

pub mod block;
pub mod bmssp;
pub mod dijkstra;
pub mod error;
pub mod frontier_manager;
pub mod graph;
pub mod length;
pub mod linear_select;
pub mod linked_list;

pub use bmssp::Solver;
pub use error::{Error, Result};
pub use graph::Graph;
pub use length::Length;
