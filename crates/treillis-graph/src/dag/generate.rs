//! Test-oriented DAG generators. Both are acyclic by construction.

use rand::Rng;
use tracing::instrument;

use super::AcyclicGraph;
use crate::error::GraphError;

impl AcyclicGraph<u32> {
    /// The divisibility order on `2..=k`: edge `i → j` iff `i < j` and `i`
    /// divides `j`.
    #[must_use]
    pub fn divisors(k: u32) -> Self {
        let mut graph = Self::new();
        for i in 2..=k {
            graph.add_node(i);
        }
        for i in 2..=k {
            for j in (i + 1)..=k {
                if j % i == 0 {
                    let a = graph.ensure_node(i);
                    let b = graph.ensure_node(j);
                    graph.connect(a, b, ());
                }
            }
        }
        graph
    }

    /// A random DAG over `0..size`: each edge `i → j` with `i > j` is kept
    /// independently with probability `threshold`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidParameter`] if `threshold` is not in
    /// `[0, 1]`.
    #[instrument(skip(rng))]
    pub fn random<R: Rng + ?Sized>(
        size: u32,
        threshold: f64,
        rng: &mut R,
    ) -> Result<Self, GraphError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(GraphError::InvalidParameter {
                name: "threshold",
                reason: format!("{threshold} is outside [0, 1]"),
            });
        }
        let mut graph = Self::new();
        let slots: Vec<_> = (0..size).map(|i| graph.ensure_node(i)).collect();
        for (i, &from) in slots.iter().enumerate() {
            for &to in &slots[..i] {
                if rng.gen_bool(threshold) {
                    graph.connect(from, to, ());
                }
            }
        }
        Ok(graph)
    }
}
