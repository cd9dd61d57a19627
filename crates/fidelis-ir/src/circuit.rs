//! High-level circuit builder API.

use crate::dag::CircuitDag;
use crate::error::IrResult;
use crate::gate::{Gate, StandardGate};
use crate::instruction::Instruction;
use crate::qubit::{ClbitId, QubitId};

/// A quantum circuit.
///
/// This provides a fluent API for building circuits on top of a
/// [`CircuitDag`]. Every builder method validates its operands and returns
/// `&mut Self` so calls can be chained with `?`.
#[derive(Debug, Clone)]
pub struct Circuit {
    name: String,
    num_qubits: u32,
    num_clbits: u32,
    dag: CircuitDag,
}

macro_rules! single_qubit_gates {
    ($($(#[$doc:meta])* $method:ident => $gate:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $method(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
                self.dag
                    .apply(Instruction::single_qubit_gate(StandardGate::$gate, qubit))?;
                Ok(self)
            }
        )*
    };
}

macro_rules! two_qubit_gates {
    ($($(#[$doc:meta])* $method:ident => $gate:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $method(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
                self.dag
                    .apply(Instruction::two_qubit_gate(StandardGate::$gate, q1, q2))?;
                Ok(self)
            }
        )*
    };
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            num_qubits: 0,
            num_clbits: 0,
            dag: CircuitDag::new(),
        }
    }

    /// Create a circuit with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            num_clbits,
            dag: CircuitDag::with_wires(num_qubits, num_clbits),
        }
    }

    /// Add a single qubit to the circuit.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = QubitId(self.num_qubits);
        self.num_qubits += 1;
        self.dag.add_qubit(id);
        id
    }

    /// Add a single classical bit to the circuit.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = ClbitId(self.num_clbits);
        self.num_clbits += 1;
        self.dag.add_clbit(id);
        id
    }

    // =========================================================================
    // Gates
    // =========================================================================

    single_qubit_gates! {
        /// Apply Hadamard gate.
        h => H;
        /// Apply Pauli-X gate.
        x => X;
        /// Apply Pauli-Y gate.
        y => Y;
        /// Apply Pauli-Z gate.
        z => Z;
        /// Apply S gate.
        s => S;
        /// Apply S-dagger gate.
        sdg => Sdg;
        /// Apply T gate.
        t => T;
        /// Apply T-dagger gate.
        tdg => Tdg;
        /// Apply sqrt(X) gate.
        sx => SX;
    }

    two_qubit_gates! {
        /// Apply CNOT (CX) gate.
        cx => CX;
        /// Apply CY gate.
        cy => CY;
        /// Apply CZ gate.
        cz => CZ;
        /// Apply controlled-Hadamard gate.
        ch => CH;
        /// Apply SWAP gate.
        swap => Swap;
    }

    /// Apply Rx rotation gate.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::single_qubit_gate(StandardGate::Rx(theta), qubit))?;
        Ok(self)
    }

    /// Apply Ry rotation gate.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::single_qubit_gate(StandardGate::Ry(theta), qubit))?;
        Ok(self)
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::single_qubit_gate(StandardGate::Rz(theta), qubit))?;
        Ok(self)
    }

    /// Apply phase gate.
    pub fn p(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::single_qubit_gate(StandardGate::P(theta), qubit))?;
        Ok(self)
    }

    /// Apply controlled-phase gate.
    pub fn cp(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::two_qubit_gate(
            StandardGate::CP(theta),
            control,
            target,
        ))?;
        Ok(self)
    }

    /// Apply controlled-Rz gate.
    pub fn crz(&mut self, theta: f64, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::two_qubit_gate(
            StandardGate::CRz(theta),
            control,
            target,
        ))?;
        Ok(self)
    }

    /// Apply RZZ (ZZ rotation) gate.
    pub fn rzz(&mut self, theta: f64, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.dag
            .apply(Instruction::two_qubit_gate(StandardGate::RZZ(theta), q1, q2))?;
        Ok(self)
    }

    /// Apply a Toffoli (CCX) gate, decomposed into H, T, T-dagger and CX.
    ///
    /// The IR has no native three-qubit gate, so the standard six-CNOT
    /// network is emitted directly.
    pub fn ccx(&mut self, c1: QubitId, c2: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.h(target)?
            .cx(c2, target)?
            .tdg(target)?
            .cx(c1, target)?
            .t(target)?
            .cx(c2, target)?
            .tdg(target)?
            .cx(c1, target)?
            .t(c2)?
            .t(target)?
            .h(target)?
            .cx(c1, c2)?
            .t(c1)?
            .tdg(c2)?
            .cx(c1, c2)
    }

    /// Apply an arbitrary gate.
    pub fn gate(
        &mut self,
        gate: impl Into<Gate>,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::gate(gate, qubits))?;
        Ok(self)
    }

    // =========================================================================
    // Other operations
    // =========================================================================

    /// Measure a qubit to a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::measure(qubit, clbit))?;
        Ok(self)
    }

    /// Measure every qubit `i` into classical bit `i`, adding bits as needed.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        while self.num_clbits < self.num_qubits {
            self.add_clbit();
        }
        for i in 0..self.num_qubits {
            self.dag
                .apply(Instruction::measure(QubitId(i), ClbitId(i)))?;
        }
        Ok(self)
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::reset(qubit))?;
        Ok(self)
    }

    /// Apply a barrier to specified qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.dag.apply(Instruction::barrier(qubits))?;
        Ok(self)
    }

    /// Apply a barrier to all qubits.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let qubits: Vec<_> = (0..self.num_qubits).map(QubitId).collect();
        self.barrier(qubits)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits as usize
    }

    /// Get the number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.num_clbits as usize
    }

    /// Get the circuit depth.
    pub fn depth(&self) -> usize {
        self.dag.depth()
    }

    /// Get a reference to the underlying DAG.
    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }

    /// Consume the circuit and return the DAG.
    pub fn into_dag(self) -> CircuitDag {
        self.dag
    }

    /// Wrap a DAG, e.g. the output of a compilation run.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_dag(name: impl Into<String>, dag: CircuitDag) -> Self {
        Self {
            name: name.into(),
            num_qubits: dag.num_qubits() as u32,
            num_clbits: dag.num_clbits() as u32,
            dag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_circuit_with_size() {
        let circuit = Circuit::with_size("test", 3, 2);
        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(circuit.num_clbits(), 2);
        assert_eq!(circuit.name(), "test");
    }

    #[test]
    fn test_fluent_api() {
        let mut circuit = Circuit::with_size("test", 2, 2);
        circuit
            .h(QubitId(0))
            .unwrap()
            .cx(QubitId(0), QubitId(1))
            .unwrap()
            .measure(QubitId(0), ClbitId(0))
            .unwrap()
            .measure(QubitId(1), ClbitId(1))
            .unwrap();

        assert_eq!(circuit.depth(), 3); // H, CX, parallel measures
    }

    #[test]
    fn test_ccx_decomposition_uses_only_small_gates() {
        let mut circuit = Circuit::with_size("toffoli", 3, 0);
        circuit.ccx(QubitId(0), QubitId(1), QubitId(2)).unwrap();

        let ops: Vec<_> = circuit.dag().topological_ops().map(|(_, i)| i).collect();
        assert_eq!(ops.len(), 15);
        assert!(ops.iter().all(|i| i.qubits.len() <= 2));
        assert_eq!(ops.iter().filter(|i| i.name() == "cx").count(), 6);
    }

    #[test]
    fn test_measure_all_adds_clbits() {
        let mut circuit = Circuit::with_size("test", 3, 0);
        circuit.rz(PI / 4.0, QubitId(1)).unwrap();
        circuit.measure_all().unwrap();
        assert_eq!(circuit.num_clbits(), 3);
        assert_eq!(circuit.dag().num_ops(), 4);
    }

    #[test]
    fn test_from_dag_counts_wires() {
        let dag = CircuitDag::with_wires(5, 2);
        let circuit = Circuit::from_dag("routed", dag);
        assert_eq!(circuit.num_qubits(), 5);
        assert_eq!(circuit.num_clbits(), 2);
    }
}
