//! Verification passes for routed circuits.
//!
//! Routed circuits are expressed over physical sites, so every two-qubit
//! gate must name a coupled pair.

use tracing::debug;

use fidelis_ir::CircuitDag;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Result of connectivity verification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerificationResult {
    /// Whether the verification passed.
    pub passed: bool,
    /// Number of two-qubit gates checked.
    pub gates_checked: usize,
}

/// Analysis pass that checks every two-qubit gate sits on a coupling edge.
///
/// Fails with [`CompileError::ConnectivityViolation`] on the first gate in
/// topological order whose sites are not coupled.
pub struct ConnectivityVerification;

impl Pass for ConnectivityVerification {
    fn name(&self) -> &'static str {
        "connectivity_verification"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let coupling = properties
            .coupling_map
            .as_ref()
            .ok_or(CompileError::MissingCouplingMap)?;

        let mut gates_checked = 0;
        for (_, inst) in dag.topological_ops() {
            if !inst.is_two_qubit_gate() {
                continue;
            }
            let (q1, q2) = (inst.qubits[0].0, inst.qubits[1].0);
            if !coupling.is_connected(q1, q2) {
                return Err(CompileError::ConnectivityViolation {
                    gate: inst.name().to_string(),
                    qubit1: q1,
                    qubit2: q2,
                });
            }
            gates_checked += 1;
        }

        debug!(
            "Connectivity verification passed: {} two-qubit gates checked",
            gates_checked
        );

        properties.insert(VerificationResult {
            passed: true,
            gates_checked,
        });
        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.coupling_map.is_some()
    }
}
