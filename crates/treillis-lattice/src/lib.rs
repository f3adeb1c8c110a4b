#![forbid(unsafe_code)]
//! treillis-lattice library.
//!
//! Closure systems over finite ground sets, the lattices of their closed
//! sets, and the implication bases that describe them compactly.
//!
//! # Conventions
//!
//! - **Errors**: fallible operations return [`LatticeError`]; configuration
//!   loading returns `anyhow::Result`.
//! - **Logging**: `tracing` spans on construction and normalization; no
//!   subscriber is installed here.
//! - **Order**: edge `a → b` means `a < b`. Concepts are ordered by intent
//!   inclusion.
//!
//! ```rust
//! use std::collections::BTreeSet;
//! use treillis_lattice::{ClosureSystem, RelationalContext};
//!
//! let ctx = RelationalContext::from_incidences([(1, 'a'), (1, 'b'), (2, 'a')]);
//! let lattice = ctx.concept_lattice(true).unwrap();
//! assert_eq!(lattice.node_count(), 2);
//! assert_eq!(ctx.closure(&BTreeSet::from(['b'])), BTreeSet::from(['a', 'b']));
//! ```

pub mod closure;
pub mod components;
pub mod concept;
pub mod concept_lattice;
pub mod config;
pub mod context;
pub mod error;
pub mod implication;
pub mod lattice;

pub use closure::ClosureSystem;
pub use components::BijectiveComponents;
pub use concept::Concept;
pub use concept_lattice::{ConceptLattice, DependencyGraph, ReducedLabel};
pub use config::{build_lattice, load_config, ConstructionConfig, EngineConfig};
pub use context::{Reduction, RelationalContext};
pub use error::LatticeError;
pub use implication::{ImplicationSystem, Rule};
pub use lattice::arrows::Arrow;
pub use lattice::doubling::{doubling_convex, Half};
pub use lattice::family::ClosedSetFamily;
pub use lattice::Lattice;
