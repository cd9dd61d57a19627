//! Error types for the compilation crate.

use thiserror::Error;

/// Errors that can occur during compilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] fidelis_ir::IrError),

    /// Missing coupling map for routing.
    #[error("Missing coupling map for routing")]
    MissingCouplingMap,

    /// Missing layout for routing.
    #[error("Missing layout for routing")]
    MissingLayout,

    /// Missing accuracy graph for noise-aware routing or fidelity analysis.
    #[error("Missing accuracy graph for noise-aware routing")]
    MissingAccuracyGraph,

    /// Layout or topology does not cover exactly the circuit's qubits.
    #[error("Layout size mismatch: {subject} has {actual} sites but the circuit has {expected} qubits")]
    LayoutSizeMismatch {
        /// What was checked against the circuit ("layout" or "coupling map").
        subject: &'static str,
        /// Number of qubits in the circuit.
        expected: usize,
        /// Number of sites found.
        actual: usize,
    },

    /// No path between two sites once a third site is removed.
    #[error("No path from site {from} to site {to} avoiding site {excluded}")]
    NoPathFound {
        /// Start of the requested path.
        from: u32,
        /// End of the requested path.
        to: u32,
        /// Site removed from the graph.
        excluded: u32,
    },

    /// A coupling edge has no accuracy weight.
    #[error("No accuracy weight for edge ({qubit1}, {qubit2})")]
    MissingAccuracyData {
        /// First endpoint.
        qubit1: u32,
        /// Second endpoint.
        qubit2: u32,
    },

    /// Two sites have no connecting path in the coupling map.
    #[error("Routing failed: sites {qubit1} and {qubit2} are not connected")]
    DisconnectedGraph {
        /// First site.
        qubit1: u32,
        /// Second site.
        qubit2: u32,
    },

    /// The router cannot place an instruction of this shape.
    #[error("Unsupported instruction '{name}' on {num_qubits} qubits")]
    UnsupportedInstruction {
        /// Instruction name.
        name: String,
        /// Number of qubit operands.
        num_qubits: usize,
    },

    /// A two-qubit gate sits on sites that are not coupled.
    #[error("Gate '{gate}' acts on uncoupled sites {qubit1} and {qubit2}")]
    ConnectivityViolation {
        /// Gate name.
        gate: String,
        /// First site.
        qubit1: u32,
        /// Second site.
        qubit2: u32,
    },

    /// A layout is not a bijection over its sites.
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// Invalid pass or target configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Circuit too large for target.
    #[error("Circuit requires {required} qubits but target only has {available}")]
    CircuitTooLarge { required: usize, available: u32 },

    /// Target or configuration file could not be parsed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
