//! Expected success probability of a routed circuit.

use serde::{Deserialize, Serialize};
use tracing::info;

use fidelis_ir::CircuitDag;

use crate::accuracy::AccuracyGraph;
use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Fidelity estimate published by [`FidelityAnalysis`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FidelityEstimate {
    /// Product of edge accuracies over all two-qubit gates.
    pub fidelity: f64,
    /// Two-qubit gates counted, swaps included.
    pub two_qubit_gates: usize,
    /// Swap gates counted.
    pub swaps: usize,
}

impl FidelityEstimate {
    /// Estimate the success probability of a circuit over physical sites.
    ///
    /// Each two-qubit gate contributes the accuracy of its edge; a swap
    /// contributes that accuracy cubed. Single-qubit gates, measurements
    /// and barriers are treated as perfect.
    pub fn of(dag: &CircuitDag, accuracy: &AccuracyGraph) -> CompileResult<Self> {
        let mut estimate = Self {
            fidelity: 1.0,
            two_qubit_gates: 0,
            swaps: 0,
        };

        for (_, inst) in dag.topological_ops() {
            if !inst.is_two_qubit_gate() {
                continue;
            }
            let weight = accuracy.try_weight(inst.qubits[0].0, inst.qubits[1].0)?;
            estimate.two_qubit_gates += 1;
            if inst.as_gate().is_some_and(|g| g.is_swap()) {
                estimate.swaps += 1;
                estimate.fidelity *= weight.powi(3);
            } else {
                estimate.fidelity *= weight;
            }
        }

        Ok(estimate)
    }
}

/// Analysis pass that records a [`FidelityEstimate`] for a routed circuit.
pub struct FidelityAnalysis;

impl Pass for FidelityAnalysis {
    fn name(&self) -> &'static str {
        "fidelity_analysis"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let accuracy = properties
            .accuracy
            .as_ref()
            .ok_or(CompileError::MissingAccuracyGraph)?;

        let estimate = FidelityEstimate::of(dag, accuracy)?;
        info!(
            fidelity = estimate.fidelity,
            swaps = estimate.swaps,
            "estimated circuit fidelity over {} two-qubit gates",
            estimate.two_qubit_gates
        );
        properties.insert(estimate);
        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.accuracy.is_some()
    }
}
