//! Target descriptions and router configuration.
//!
//! A target file is JSON:
//!
//! ```json
//! {
//!   "name": "ring4",
//!   "coupling": [[0, 1], [1, 2], [2, 3], [3, 0]],
//!   "accuracy": [[0, 1, 0.99], [1, 2, 0.97], [2, 3, 0.70], [3, 0, 0.99]],
//!   "weights": "fidelity"
//! }
//! ```
//!
//! `num_qubits` may be given explicitly; otherwise it is one past the
//! largest site named in `coupling`.

use serde::{Deserialize, Serialize};

use crate::accuracy::AccuracyGraph;
use crate::coupling::CouplingMap;
use crate::error::{CompileError, CompileResult};

/// How accuracy weights in a target file are to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightKind {
    /// Weights are success probabilities.
    #[default]
    Fidelity,
    /// Weights are error probabilities; fidelity is `1 - weight`.
    ErrorRate,
}

/// A device description: topology plus per-edge accuracy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSpec {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Site count; inferred from `coupling` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_qubits: Option<u32>,
    /// Raw coupling list. Both orientations may appear.
    pub coupling: Vec<(u32, u32)>,
    /// `(a, b, weight)` per edge.
    pub accuracy: Vec<(u32, u32, f64)>,
    /// Interpretation of `accuracy` weights.
    #[serde(default)]
    pub weights: WeightKind,
}

impl TargetSpec {
    /// Parse a target from JSON text.
    pub fn from_json(json: &str) -> CompileResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> CompileResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Describe an existing coupling map and accuracy graph.
    pub fn from_parts(
        name: impl Into<String>,
        coupling: &CouplingMap,
        accuracy: &AccuracyGraph,
    ) -> Self {
        Self {
            name: name.into(),
            num_qubits: Some(coupling.num_qubits()),
            coupling: coupling.edges().to_vec(),
            accuracy: accuracy.edges(),
            weights: WeightKind::Fidelity,
        }
    }

    /// Build the topology and accuracy graph.
    ///
    /// Every coupling edge must carry an accuracy weight, else
    /// [`CompileError::MissingAccuracyData`] names the first uncovered edge.
    pub fn build(&self) -> CompileResult<(CouplingMap, AccuracyGraph)> {
        let num_qubits = self.num_qubits.unwrap_or_else(|| {
            self.coupling
                .iter()
                .map(|&(a, b)| a.max(b) + 1)
                .max()
                .unwrap_or(0)
        });
        let coupling = CouplingMap::from_edges(num_qubits, self.coupling.iter().copied())?;
        let edges = self.accuracy.iter().copied();
        let accuracy = match self.weights {
            WeightKind::Fidelity => AccuracyGraph::from_fidelities(edges)?,
            WeightKind::ErrorRate => AccuracyGraph::from_error_rates(edges)?,
        };

        if let Some(&(a, b)) = coupling
            .edges()
            .iter()
            .find(|&&(a, b)| accuracy.weight(a, b).is_none())
        {
            return Err(CompileError::MissingAccuracyData {
                qubit1: a,
                qubit2: b,
            });
        }

        Ok((coupling, accuracy))
    }
}

/// How the alternative-edge search compares candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeSearch {
    /// Score each candidate as a relocation from the best edge found so far
    /// and accept it if it beats that edge's score. The result depends on
    /// candidate order.
    #[default]
    Greedy,
    /// Score every candidate as a relocation from the gate's own edge and
    /// take the maximum.
    Exhaustive,
}

/// How the input circuit is split into layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layering {
    /// One operation per layer, in topological order.
    #[default]
    Serial,
    /// As-soon-as-possible layers.
    Asap,
}

/// Configuration for [`NoiseAwareRouting`](crate::passes::NoiseAwareRouting).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseAwareConfig {
    /// Maximum hop count from each operand to each end of a candidate edge.
    pub search_depth: u32,
    /// Candidate comparison strategy.
    pub edge_search: EdgeSearch,
    /// Layer decomposition of the input.
    pub layering: Layering,
    /// Score candidates whose relocation cannot be planned as zero instead
    /// of failing with [`CompileError::NoPathFound`].
    ///
    /// Off by default, where an unplannable candidate aborts routing. When
    /// set, the error is swallowed during the edge search and never reaches
    /// the caller, which is what lets the router run on trees and lines.
    pub skip_unplannable: bool,
}

impl Default for NoiseAwareConfig {
    fn default() -> Self {
        Self {
            search_depth: 2,
            edge_search: EdgeSearch::Greedy,
            layering: Layering::Serial,
            skip_unplannable: false,
        }
    }
}
