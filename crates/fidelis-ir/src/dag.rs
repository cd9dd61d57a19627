//! DAG-based circuit representation and layering.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex as PetNodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::{ClbitId, QubitId};

/// Node index type for the circuit DAG.
pub type NodeIndex = PetNodeIndex<u32>;

/// A node in the circuit DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DagNode {
    /// Input node for a wire.
    In(WireId),
    /// Output node for a wire.
    Out(WireId),
    /// Operation node containing an instruction.
    Op(Instruction),
}

impl DagNode {
    /// Get the instruction if this is an operation node.
    #[inline]
    pub fn instruction(&self) -> Option<&Instruction> {
        match self {
            DagNode::Op(inst) => Some(inst),
            _ => None,
        }
    }
}

/// Identifier for a wire in the DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireId {
    /// A quantum wire.
    Qubit(QubitId),
    /// A classical wire.
    Clbit(ClbitId),
}

/// An edge in the circuit DAG representing a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DagEdge {
    /// The wire this edge represents.
    pub wire: WireId,
}

/// The abstraction level of a circuit in the compilation pipeline.
///
/// Circuits start at the `Logical` level (abstract qubits) and are
/// lowered to the `Physical` level by routing, after which every qubit
/// wire names a device site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CircuitLevel {
    /// Logical level: qubits are abstract, no physical mapping applied.
    #[default]
    Logical,
    /// Physical level: qubits are physical device sites.
    Physical,
}

/// A group of operations with no ordering dependency between them.
///
/// Operations inside a layer act on pairwise disjoint wires, so they can be
/// processed in any order against the current layout.
#[derive(Debug, Clone, Default)]
pub struct Layer<'a> {
    ops: Vec<&'a Instruction>,
}

impl<'a> Layer<'a> {
    /// All operations in this layer.
    pub fn ops(&self) -> &[&'a Instruction] {
        &self.ops
    }

    /// The two-qubit gate operations in this layer.
    pub fn two_qubit_ops(&self) -> impl Iterator<Item = &'a Instruction> + '_ {
        self.ops.iter().copied().filter(|inst| inst.is_two_qubit_gate())
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the layer holds no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// DAG-based circuit representation.
///
/// The circuit is represented as a directed acyclic graph where:
/// - Nodes are either input nodes, output nodes, or operation nodes
/// - Edges represent wires (quantum or classical)
/// - Each wire has exactly one input and one output node
///
/// ## Performance
///
/// The DAG maintains a `wire_front` index that maps each wire to the
/// last node before the output node, so `apply()` is O(1) per operand.
#[derive(Debug, Clone)]
pub struct CircuitDag {
    graph: DiGraph<DagNode, DagEdge, u32>,
    qubit_inputs: FxHashMap<QubitId, NodeIndex>,
    qubit_outputs: FxHashMap<QubitId, NodeIndex>,
    clbit_inputs: FxHashMap<ClbitId, NodeIndex>,
    clbit_outputs: FxHashMap<ClbitId, NodeIndex>,
    /// Maps each wire to the node just before its output node.
    wire_front: FxHashMap<WireId, NodeIndex>,
    level: CircuitLevel,
}

impl CircuitDag {
    /// Create a new empty circuit DAG.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::default(),
            qubit_inputs: FxHashMap::default(),
            qubit_outputs: FxHashMap::default(),
            clbit_inputs: FxHashMap::default(),
            clbit_outputs: FxHashMap::default(),
            wire_front: FxHashMap::default(),
            level: CircuitLevel::Logical,
        }
    }

    /// Create an empty DAG with qubits `0..num_qubits` and clbits `0..num_clbits`.
    pub fn with_wires(num_qubits: u32, num_clbits: u32) -> Self {
        let mut dag = Self::new();
        for q in 0..num_qubits {
            dag.add_qubit(QubitId(q));
        }
        for c in 0..num_clbits {
            dag.add_clbit(ClbitId(c));
        }
        dag
    }

    /// Add a qubit to the circuit. Adding an existing qubit is a no-op.
    pub fn add_qubit(&mut self, qubit: QubitId) {
        if self.qubit_inputs.contains_key(&qubit) {
            return;
        }
        let wire = WireId::Qubit(qubit);
        let in_node = self.graph.add_node(DagNode::In(wire));
        let out_node = self.graph.add_node(DagNode::Out(wire));
        self.graph.add_edge(in_node, out_node, DagEdge { wire });
        self.qubit_inputs.insert(qubit, in_node);
        self.qubit_outputs.insert(qubit, out_node);
        self.wire_front.insert(wire, in_node);
    }

    /// Add a classical bit to the circuit. Adding an existing bit is a no-op.
    pub fn add_clbit(&mut self, clbit: ClbitId) {
        if self.clbit_inputs.contains_key(&clbit) {
            return;
        }
        let wire = WireId::Clbit(clbit);
        let in_node = self.graph.add_node(DagNode::In(wire));
        let out_node = self.graph.add_node(DagNode::Out(wire));
        self.graph.add_edge(in_node, out_node, DagEdge { wire });
        self.clbit_inputs.insert(clbit, in_node);
        self.clbit_outputs.insert(clbit, out_node);
        self.wire_front.insert(wire, in_node);
    }

    /// Append an instruction to the end of every wire it touches.
    #[allow(clippy::cast_possible_truncation)]
    pub fn apply(&mut self, instruction: Instruction) -> IrResult<NodeIndex> {
        let gate_name = match &instruction.kind {
            InstructionKind::Gate(gate) => Some(gate.name().to_string()),
            _ => None,
        };

        if let InstructionKind::Gate(gate) = &instruction.kind {
            let expected = gate.num_qubits();
            let got = instruction.qubits.len() as u32;
            if expected != got {
                return Err(IrError::QubitCountMismatch {
                    gate_name: gate.name().to_string(),
                    expected,
                    got,
                });
            }
        }

        for &qubit in &instruction.qubits {
            if !self.qubit_inputs.contains_key(&qubit) {
                return Err(IrError::QubitNotFound {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        for &clbit in &instruction.clbits {
            if !self.clbit_inputs.contains_key(&clbit) {
                return Err(IrError::ClbitNotFound {
                    clbit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &qubit in &instruction.qubits {
            if !seen.insert(qubit) {
                return Err(IrError::DuplicateQubit {
                    qubit,
                    gate_name: gate_name.clone(),
                });
            }
        }

        let wires: Vec<(WireId, NodeIndex)> = instruction
            .qubits
            .iter()
            .map(|&q| (WireId::Qubit(q), self.qubit_outputs[&q]))
            .chain(
                instruction
                    .clbits
                    .iter()
                    .map(|&c| (WireId::Clbit(c), self.clbit_outputs[&c])),
            )
            .collect();

        let op_node = self.graph.add_node(DagNode::Op(instruction));

        for (wire, out_node) in wires {
            let prev_node = self.wire_front[&wire];

            let eid = self
                .graph
                .edges_directed(prev_node, Direction::Outgoing)
                .find(|e| e.weight().wire == wire && e.target() == out_node)
                .map(|e| e.id())
                .ok_or_else(|| {
                    IrError::InvalidDag(format!(
                        "Missing edge from predecessor to output for wire {wire:?}"
                    ))
                })?;
            self.graph.remove_edge(eid);
            self.graph.add_edge(prev_node, op_node, DagEdge { wire });
            self.graph.add_edge(op_node, out_node, DagEdge { wire });
            self.wire_front.insert(wire, op_node);
        }

        Ok(op_node)
    }

    /// Kahn's algorithm, always taking the ready node with the lowest index.
    ///
    /// Operation nodes are created in program order and every predecessor of
    /// an operation has a lower index, so operations come out exactly in the
    /// order they were applied.
    fn topological_order(&self) -> Vec<NodeIndex> {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|n| self.graph.edges_directed(n, Direction::Incoming).count())
            .collect();
        let mut ready: BinaryHeap<Reverse<NodeIndex>> = self
            .graph
            .node_indices()
            .filter(|n| in_degree[n.index()] == 0)
            .map(Reverse)
            .collect();

        let mut order = Vec::with_capacity(in_degree.len());
        while let Some(Reverse(node)) = ready.pop() {
            order.push(node);
            for edge in self.graph.edges_directed(node, Direction::Outgoing) {
                let target = edge.target();
                in_degree[target.index()] -= 1;
                if in_degree[target.index()] == 0 {
                    ready.push(Reverse(target));
                }
            }
        }
        order
    }

    /// Iterate over operations in topological order.
    pub fn topological_ops(&self) -> impl Iterator<Item = (NodeIndex, &Instruction)> {
        self.topological_order()
            .into_iter()
            .filter_map(|idx| self.graph[idx].instruction().map(|inst| (idx, inst)))
    }

    /// Split the circuit into one layer per operation, in program order.
    pub fn serial_layers(&self) -> Vec<Layer<'_>> {
        self.topological_ops()
            .map(|(_, inst)| Layer { ops: vec![inst] })
            .collect()
    }

    /// Split the circuit into as-soon-as-possible layers.
    ///
    /// Each operation lands in the layer right after the deepest operation
    /// it depends on, so layer `i` holds exactly the operations at depth
    /// `i + 1`. Within a layer operations keep their topological order.
    pub fn layers(&self) -> Vec<Layer<'_>> {
        let mut depths: FxHashMap<NodeIndex, usize> = FxHashMap::default();
        let mut layers: Vec<Layer<'_>> = Vec::new();

        for node in self.topological_order() {
            let pred_depth = self
                .graph
                .edges_directed(node, Direction::Incoming)
                .map(|e| depths.get(&e.source()).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);

            match &self.graph[node] {
                DagNode::Op(inst) => {
                    let depth = pred_depth + 1;
                    if layers.len() < depth {
                        layers.resize_with(depth, Layer::default);
                    }
                    layers[depth - 1].ops.push(inst);
                    depths.insert(node, depth);
                }
                _ => {
                    depths.insert(node, pred_depth);
                }
            }
        }

        layers
    }

    /// Get the number of qubits.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.qubit_inputs.len()
    }

    /// Get the number of classical bits.
    #[inline]
    pub fn num_clbits(&self) -> usize {
        self.clbit_inputs.len()
    }

    /// Get the number of operations.
    ///
    /// Computed as total nodes minus input and output nodes (2 per wire).
    #[inline]
    pub fn num_ops(&self) -> usize {
        let io_nodes = 2 * (self.qubit_inputs.len() + self.clbit_inputs.len());
        self.graph.node_count().saturating_sub(io_nodes)
    }

    /// Calculate the circuit depth.
    pub fn depth(&self) -> usize {
        self.layers().len()
    }

    /// Qubits of the circuit in ascending order.
    pub fn qubits(&self) -> Vec<QubitId> {
        let mut qubits: Vec<_> = self.qubit_inputs.keys().copied().collect();
        qubits.sort_unstable();
        qubits
    }

    /// Classical bits of the circuit in ascending order.
    pub fn clbits(&self) -> Vec<ClbitId> {
        let mut clbits: Vec<_> = self.clbit_inputs.keys().copied().collect();
        clbits.sort_unstable();
        clbits
    }

    /// Get the abstraction level of this circuit.
    pub fn level(&self) -> CircuitLevel {
        self.level
    }

    /// Set the abstraction level of this circuit.
    pub fn set_level(&mut self, level: CircuitLevel) {
        self.level = level;
    }

    /// Get a reference to the underlying graph.
    pub fn graph(&self) -> &DiGraph<DagNode, DagEdge, u32> {
        &self.graph
    }

    /// Verify the structural integrity of the DAG.
    ///
    /// Checks that the graph is acyclic and that every wire forms an
    /// unbroken path from its input node to its output node.
    pub fn verify_integrity(&self) -> IrResult<()> {
        if petgraph::algo::is_cyclic_directed(&self.graph) {
            return Err(IrError::InvalidDag("Graph contains a cycle".into()));
        }

        let qubit_wires = self.qubit_inputs.iter().map(|(&q, &start)| {
            (WireId::Qubit(q), start, self.qubit_outputs.get(&q).copied())
        });
        let clbit_wires = self.clbit_inputs.iter().map(|(&c, &start)| {
            (WireId::Clbit(c), start, self.clbit_outputs.get(&c).copied())
        });

        for (wire, start, out_node) in qubit_wires.chain(clbit_wires) {
            let out_node = out_node.ok_or_else(|| {
                IrError::InvalidDag(format!("Wire {wire:?} has an In node but no Out node"))
            })?;

            let mut current = start;
            let mut steps = 0;
            while current != out_node {
                current = self
                    .graph
                    .edges_directed(current, Direction::Outgoing)
                    .find(|e| e.weight().wire == wire)
                    .map(|e| e.target())
                    .ok_or_else(|| {
                        IrError::InvalidDag(format!(
                            "Wire {wire:?} is broken: no outgoing edge from node {current:?}"
                        ))
                    })?;

                steps += 1;
                if steps > self.graph.node_count() {
                    return Err(IrError::InvalidDag(format!(
                        "Wire {wire:?} has too many steps (possible infinite loop)"
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for CircuitDag {
    fn default() -> Self {
        Self::new()
    }
}
