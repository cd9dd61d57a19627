//! Per-edge operation fidelity.

use rand::Rng;
use rustc_hash::FxHashMap;

use crate::coupling::CouplingMap;
use crate::error::{CompileError, CompileResult};

/// Normalize an undirected edge key.
#[inline]
fn key(a: u32, b: u32) -> (u32, u32) {
    (a.min(b), a.max(b))
}

/// Expected two-qubit gate fidelity for each coupling edge.
///
/// Weights lie in `(0, 1]` and lookups ignore edge orientation. The graph
/// is immutable once built and can be shared between routing runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccuracyGraph {
    weights: FxHashMap<(u32, u32), f64>,
}

impl AccuracyGraph {
    /// Create an accuracy graph with no weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(a, b, fidelity)` triples.
    ///
    /// Fails with [`CompileError::InvalidConfiguration`] if a fidelity lies
    /// outside `(0, 1]`. A repeated edge keeps its last weight.
    pub fn from_fidelities(
        edges: impl IntoIterator<Item = (u32, u32, f64)>,
    ) -> CompileResult<Self> {
        let mut weights = FxHashMap::default();
        for (a, b, fidelity) in edges {
            if !(fidelity > 0.0 && fidelity <= 1.0) {
                return Err(CompileError::InvalidConfiguration(format!(
                    "fidelity of edge ({a}, {b}) must lie in (0, 1], got {fidelity}"
                )));
            }
            weights.insert(key(a, b), fidelity);
        }
        Ok(Self { weights })
    }

    /// Build from `(a, b, error_rate)` triples, storing `1 - error_rate`.
    pub fn from_error_rates(
        edges: impl IntoIterator<Item = (u32, u32, f64)>,
    ) -> CompileResult<Self> {
        let mut fidelities = Vec::new();
        for (a, b, error) in edges {
            if !(0.0..1.0).contains(&error) {
                return Err(CompileError::InvalidConfiguration(format!(
                    "error rate of edge ({a}, {b}) must lie in [0, 1), got {error}"
                )));
            }
            fidelities.push((a, b, 1.0 - error));
        }
        Self::from_fidelities(fidelities)
    }

    /// Assign the same fidelity to every coupling edge.
    pub fn uniform(coupling: &CouplingMap, fidelity: f64) -> CompileResult<Self> {
        Self::from_fidelities(coupling.edges().iter().map(|&(a, b)| (a, b, fidelity)))
    }

    /// Draw an error rate uniformly from `[lo, hi)` for every coupling edge.
    pub fn sample_uniform_errors<R: Rng + ?Sized>(
        coupling: &CouplingMap,
        rng: &mut R,
        lo: f64,
        hi: f64,
    ) -> CompileResult<Self> {
        if !(0.0 <= lo && lo < hi && hi <= 1.0) {
            return Err(CompileError::InvalidConfiguration(format!(
                "error range [{lo}, {hi}) must be a non-empty subrange of [0, 1]"
            )));
        }
        let errors: Vec<_> = coupling
            .edges()
            .iter()
            .map(|&(a, b)| (a, b, rng.gen_range(lo..hi)))
            .collect();
        Self::from_error_rates(errors)
    }

    /// Fidelity of edge `(a, b)` in either orientation.
    #[inline]
    pub fn weight(&self, a: u32, b: u32) -> Option<f64> {
        self.weights.get(&key(a, b)).copied()
    }

    /// Like [`weight`](Self::weight), failing with
    /// [`CompileError::MissingAccuracyData`] if the edge has no weight.
    pub fn try_weight(&self, a: u32, b: u32) -> CompileResult<f64> {
        self.weight(a, b).ok_or(CompileError::MissingAccuracyData {
            qubit1: a,
            qubit2: b,
        })
    }

    /// Check that every coupling edge carries a weight.
    pub fn covers(&self, coupling: &CouplingMap) -> bool {
        coupling
            .edges()
            .iter()
            .all(|&(a, b)| self.weights.contains_key(&key(a, b)))
    }

    /// Weighted edges as `(min, max, fidelity)` in ascending edge order.
    pub fn edges(&self) -> Vec<(u32, u32, f64)> {
        let mut edges: Vec<_> = self.weights.iter().map(|(&(a, b), &w)| (a, b, w)).collect();
        edges.sort_unstable_by_key(|&(a, b, _)| (a, b));
        edges
    }

    /// Number of weighted edges.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Check if no edge carries a weight.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
