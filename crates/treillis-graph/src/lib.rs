#![forbid(unsafe_code)]
//! treillis-graph library.
//!
//! Directed graphs keyed by node content, and acyclic graphs with the
//! Goralcikova–Koubek transitive closure/reduction pair. This is the
//! substrate the lattice engine in `treillis-lattice` builds on.
//!
//! # Conventions
//!
//! - **Errors**: fallible operations return [`GraphError`].
//! - **Logging**: `tracing` spans on the expensive algorithms; no subscriber
//!   is installed here.
//! - **Determinism**: nodes, edges and traversal orders follow node content
//!   order.
//!
//! ```rust
//! use treillis_graph::AcyclicGraph;
//!
//! let mut dag: AcyclicGraph<&str> =
//!     AcyclicGraph::from_edges([("a", "b"), ("b", "c"), ("a", "c")]);
//! assert_eq!(dag.transitive_reduction().unwrap(), 1);
//! assert!(!dag.contains_edge(&"a", &"c"));
//! ```

pub mod dag;
pub mod digraph;
pub mod error;
pub mod traversal;

pub use dag::AcyclicGraph;
pub use digraph::{Content, DirectedGraph, Edge};
pub use error::GraphError;
pub use traversal::DepthFirstOrder;
