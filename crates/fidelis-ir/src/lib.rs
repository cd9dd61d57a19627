//! Fidelis Circuit Intermediate Representation
//!
//! This crate provides the circuit data structures the Fidelis router
//! consumes and produces.
//!
//! # Core Components
//!
//! - **Qubits and Classical Bits**: [`QubitId`], [`ClbitId`]
//! - **Gates**: [`StandardGate`] for built-in gates and [`CustomGate`] for
//!   opaque operations known only by arity
//! - **Instructions**: [`Instruction`] combining gates with their operands
//! - **DAG**: [`CircuitDag`] for the internal graph representation, with
//!   [`Layer`] decompositions for layer-by-layer passes
//! - **Circuit**: [`Circuit`] high-level builder API and benchmark library
//!
//! # Example: Layering a circuit
//!
//! ```rust
//! use fidelis_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("layers", 4, 0);
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//! circuit.cx(QubitId(2), QubitId(3)).unwrap();
//! circuit.cx(QubitId(1), QubitId(2)).unwrap();
//!
//! let layers = circuit.dag().layers();
//! assert_eq!(layers.len(), 2);
//! assert_eq!(layers[0].two_qubit_ops().count(), 2);
//! ```

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod library;
pub mod qubit;

pub use circuit::Circuit;
pub use dag::{CircuitDag, CircuitLevel, DagEdge, DagNode, Layer, NodeIndex, WireId};
pub use error::{IrError, IrResult};
pub use gate::{CustomGate, Gate, GateKind, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{ClbitId, QubitId};
