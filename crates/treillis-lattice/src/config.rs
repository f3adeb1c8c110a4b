//! Construction settings, loaded from TOML.
//!
//! ```toml
//! [construction]
//! diagram = true
//! max_concepts = 10000
//! verify_axioms = false
//! reduce = false
//! ```
//!
//! Every key is optional; a missing file gives the defaults.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::closure::ClosureSystem;
use crate::concept_lattice::{build, ConceptLattice};
use crate::error::LatticeError;
use crate::lattice::Lattice;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub construction: ConstructionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionConfig {
    /// Bordat's covers (`true`) or Next-Closure's full order (`false`).
    #[serde(default = "default_true")]
    pub diagram: bool,
    /// Stop with an error once more closed sets than this are found.
    #[serde(default)]
    pub max_concepts: Option<usize>,
    /// Probe the closure axioms before building.
    #[serde(default)]
    pub verify_axioms: bool,
    /// Reduce the Next-Closure order to its covers.
    #[serde(default)]
    pub reduce: bool,
}

impl Default for ConstructionConfig {
    fn default() -> Self {
        Self {
            diagram: default_true(),
            max_concepts: None,
            verify_axioms: false,
            reduce: false,
        }
    }
}

const fn default_true() -> bool {
    true
}

/// Load settings from `path`, or the defaults when it does not exist.
///
/// # Errors
///
/// Fails when the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    if !path.exists() {
        return Ok(EngineConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<EngineConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Build the closed-set lattice of `cs` as `config` asks.
///
/// # Errors
///
/// Returns [`LatticeError::StructuralViolation`] when axioms are checked and
/// fail, [`LatticeError::ConceptBudgetExceeded`] when the budget is passed.
#[instrument(skip(cs), fields(ground = cs.ground_set().len()))]
pub fn build_lattice<C: ClosureSystem>(
    cs: &C,
    config: &ConstructionConfig,
) -> Result<ConceptLattice<C::Element>, LatticeError> {
    if config.verify_axioms {
        cs.check_axioms()?;
    }
    if config.diagram {
        return build::bordat(cs, config.max_concepts);
    }
    let lattice = build::next_closure(cs, config.max_concepts)?;
    if !config.reduce {
        return Ok(lattice);
    }
    let mut dag = lattice.into_lattice().into_inner();
    let removed = dag.transitive_reduction()?;
    debug!(removed, "reduced to covers");
    Ok(ConceptLattice::new(Lattice::from_dag(dag)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implication::tests::system;

    fn write_config(body: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir must be created");
        let path = dir.path().join("treillis.toml");
        std::fs::write(&path, body).expect("config must be written");
        (dir, path)
    }

    #[test]
    fn missing_config_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir must be created");
        let cfg = load_config(&dir.path().join("absent.toml")).expect("load should succeed");
        assert_eq!(cfg, EngineConfig::default());
        assert!(cfg.construction.diagram);
        assert_eq!(cfg.construction.max_concepts, None);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let (_dir, path) = write_config("[construction]\nmax_concepts = 12\n");
        let cfg = load_config(&path).expect("load should succeed");
        assert_eq!(cfg.construction.max_concepts, Some(12));
        assert!(cfg.construction.diagram);
        assert!(!cfg.construction.reduce);
    }

    #[test]
    fn malformed_config_names_the_file() {
        let (_dir, path) = write_config("[construction]\ndiagram = \"yes\"\n");
        let err = load_config(&path).expect_err("diagram must be a bool");
        assert!(err.to_string().contains("Failed to parse"));
        assert!(err.to_string().contains("treillis.toml"));
    }

    #[test]
    fn next_closure_with_reduction_matches_bordat() {
        let sys = system("abc", &[("a", "b")]);
        let covers = build_lattice(&sys, &ConstructionConfig::default()).expect("lattice");
        let reduced = build_lattice(
            &sys,
            &ConstructionConfig {
                diagram: false,
                reduce: true,
                ..ConstructionConfig::default()
            },
        )
        .expect("lattice");
        assert_eq!(reduced.node_count(), covers.node_count());
        assert_eq!(reduced.edge_count(), covers.edge_count());
    }

    #[test]
    fn budget_from_config_is_enforced() {
        let sys = system("abc", &[]);
        let config = ConstructionConfig {
            max_concepts: Some(5),
            verify_axioms: true,
            ..ConstructionConfig::default()
        };
        assert_eq!(
            build_lattice(&sys, &config).expect_err("eight closed sets"),
            LatticeError::ConceptBudgetExceeded { limit: 5 }
        );
    }
}
