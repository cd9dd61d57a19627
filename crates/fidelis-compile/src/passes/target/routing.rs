//! Routing passes for inserting SWAP gates.
//!
//! Routers walk the input layer by layer against a [`Layout`] that starts
//! from the initial assignment and is updated by every inserted swap. The
//! routed circuit is expressed over physical sites: qubit `QubitId(p)` of
//! the output is site `p` of the coupling map.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use fidelis_ir::{
    CircuitDag, CircuitLevel, Gate, Instruction, InstructionKind, Layer, QubitId, StandardGate,
};

use crate::accuracy::AccuracyGraph;
use crate::coupling::CouplingMap;
use crate::error::{CompileError, CompileResult};
use crate::layout::Layout;
use crate::pass::{Pass, PassKind};
use crate::planner::DualPath;
use crate::property::PropertySet;
use crate::target::Layering;

/// Label carried by every swap a router inserts.
pub const ROUTING_SWAP_LABEL: &str = "route";

/// Whether `inst` is a swap inserted by a router, as opposed to a swap
/// that was part of the input program.
pub fn is_routing_swap(inst: &Instruction) -> bool {
    inst.as_gate()
        .is_some_and(|g| g.is_swap() && g.label.as_deref() == Some(ROUTING_SWAP_LABEL))
}

/// Counters collected during one routing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingStats {
    /// Swaps inserted to make non-adjacent operands adjacent.
    pub mandatory_swaps: usize,
    /// Swaps inserted to move adjacent operands onto a better edge.
    pub relocation_swaps: usize,
    /// Number of fidelity-driven relocations applied.
    pub relocations: usize,
    /// Number of layers processed.
    pub layers: usize,
}

impl RoutingStats {
    /// Total swaps inserted.
    pub fn total_swaps(&self) -> usize {
        self.mandatory_swaps + self.relocation_swaps
    }
}

/// Read-only inputs of a routing run.
///
/// The coupling map and accuracy graph may be shared between concurrent
/// runs; each run clones the initial layout into its own state.
#[derive(Debug, Clone, Copy)]
pub struct RoutingContext<'a> {
    /// Device topology.
    pub coupling: &'a CouplingMap,
    /// Per-edge fidelity, required by noise-aware routing.
    pub accuracy: Option<&'a AccuracyGraph>,
    /// Starting assignment; the identity when absent.
    pub initial_layout: Option<&'a Layout>,
}

impl<'a> RoutingContext<'a> {
    /// Context with a topology only.
    pub fn new(coupling: &'a CouplingMap) -> Self {
        Self {
            coupling,
            accuracy: None,
            initial_layout: None,
        }
    }

    /// Attach an accuracy graph.
    #[must_use]
    pub fn with_accuracy(mut self, accuracy: &'a AccuracyGraph) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    /// Attach an initial layout.
    #[must_use]
    pub fn with_layout(mut self, layout: &'a Layout) -> Self {
        self.initial_layout = Some(layout);
        self
    }

    /// The accuracy graph, or [`CompileError::MissingAccuracyGraph`].
    pub fn require_accuracy(&self) -> CompileResult<&'a AccuracyGraph> {
        self.accuracy.ok_or(CompileError::MissingAccuracyGraph)
    }
}

/// Result of a routing run.
#[derive(Debug, Clone)]
pub struct Routed {
    /// The routed circuit over physical sites.
    pub dag: CircuitDag,
    /// Layout after the last inserted swap.
    pub final_layout: Layout,
    /// Counters for the run.
    pub stats: RoutingStats,
}

/// A routing strategy.
pub trait RoutingPass {
    /// Route `dag` onto the topology in `ctx`.
    ///
    /// Either the whole circuit is routed or an error is returned; no
    /// partial output is produced.
    fn route(&self, dag: &CircuitDag, ctx: &RoutingContext<'_>) -> CompileResult<Routed>;
}

/// Run a [`RoutingPass`] against a [`PropertySet`].
///
/// Reads the coupling map, accuracy graph and layout, replaces `dag` with
/// the routed circuit, stores the final layout and publishes
/// [`RoutingStats`].
pub(crate) fn run_as_pass(
    router: &impl RoutingPass,
    dag: &mut CircuitDag,
    properties: &mut PropertySet,
) -> CompileResult<()> {
    let coupling = properties
        .coupling_map
        .as_ref()
        .ok_or(CompileError::MissingCouplingMap)?;
    let ctx = RoutingContext {
        coupling,
        accuracy: properties.accuracy.as_ref(),
        initial_layout: properties.layout.as_ref(),
    };

    let routed = router.route(dag, &ctx)?;
    *dag = routed.dag;
    properties.layout = Some(routed.final_layout);
    properties.insert(routed.stats);
    Ok(())
}

/// Mutable state of one routing run.
pub(crate) struct Router<'a> {
    coupling: &'a CouplingMap,
    layout: Layout,
    out: CircuitDag,
    stats: RoutingStats,
}

impl<'a> Router<'a> {
    /// Validate the inputs and set up an empty physical circuit.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn new(dag: &CircuitDag, ctx: &RoutingContext<'a>) -> CompileResult<Self> {
        let num_qubits = dag.num_qubits();
        let layout = match ctx.initial_layout {
            Some(layout) => layout.clone(),
            None => Layout::trivial(num_qubits as u32),
        };

        if layout.len() != num_qubits {
            return Err(CompileError::LayoutSizeMismatch {
                subject: "layout",
                expected: num_qubits,
                actual: layout.len(),
            });
        }
        if ctx.coupling.num_qubits() as usize != num_qubits {
            return Err(CompileError::LayoutSizeMismatch {
                subject: "coupling map",
                expected: num_qubits,
                actual: ctx.coupling.num_qubits() as usize,
            });
        }
        if let Some(&q) = dag.qubits().iter().find(|q| q.index() >= num_qubits) {
            return Err(CompileError::InvalidLayout(format!(
                "qubit {q} lies outside the {num_qubits}-qubit layout"
            )));
        }

        let mut out = CircuitDag::with_wires(num_qubits as u32, 0);
        for clbit in dag.clbits() {
            out.add_clbit(clbit);
        }
        out.set_level(CircuitLevel::Physical);

        Ok(Self {
            coupling: ctx.coupling,
            layout,
            out,
            stats: RoutingStats::default(),
        })
    }

    /// Split `dag` into the layers a router walks.
    pub(crate) fn layers(dag: &CircuitDag, layering: Layering) -> Vec<Layer<'_>> {
        match layering {
            Layering::Serial => dag.serial_layers(),
            Layering::Asap => dag.layers(),
        }
    }

    /// Current site of a logical qubit.
    fn site(&self, qubit: QubitId) -> CompileResult<u32> {
        self.layout
            .get_physical(qubit)
            .ok_or(CompileError::MissingLayout)
    }

    /// Current sites of a two-qubit gate's operands.
    pub(crate) fn operand_sites(&self, inst: &Instruction) -> CompileResult<(u32, u32)> {
        Ok((self.site(inst.qubits[0])?, self.site(inst.qubits[1])?))
    }

    /// Whether `inst` needs placement, rejecting gates the router cannot place.
    pub(crate) fn needs_routing(inst: &Instruction) -> CompileResult<bool> {
        match &inst.kind {
            InstructionKind::Gate(gate) if inst.qubits.len() > 2 => {
                Err(CompileError::UnsupportedInstruction {
                    name: gate.name().to_string(),
                    num_qubits: inst.qubits.len(),
                })
            }
            InstructionKind::Gate(_) => Ok(inst.qubits.len() == 2),
            _ => Ok(false),
        }
    }

    /// Emit a swap between two sites and apply it to the layout.
    fn swap(&mut self, p1: u32, p2: u32) -> CompileResult<()> {
        let gate = Gate::standard(StandardGate::Swap).with_label(ROUTING_SWAP_LABEL);
        self.out
            .apply(Instruction::gate(gate, [QubitId(p1), QubitId(p2)]))?;
        self.layout.swap(p1, p2);
        Ok(())
    }

    /// Make `site0` and `site1` adjacent by walking the first operand along a
    /// shortest path, stopping one hop short of `site1`.
    pub(crate) fn make_adjacent(&mut self, site0: u32, site1: u32) -> CompileResult<()> {
        let path = self.coupling.try_shortest_path(site0, site1)?;
        let hops = &path[..path.len() - 1];
        for hop in hops.windows(2) {
            self.swap(hop[0], hop[1])?;
        }
        let swaps = hops.len().saturating_sub(1);
        self.stats.mandatory_swaps += swaps;
        debug!(site0, site1, swaps, "restored adjacency");
        Ok(())
    }

    /// Apply every hop of a relocation plan.
    pub(crate) fn relocate(&mut self, plan: &DualPath) -> CompileResult<()> {
        for (p1, p2) in plan.swaps() {
            self.swap(p1, p2)?;
        }
        self.stats.relocation_swaps += plan.num_swaps();
        self.stats.relocations += 1;
        Ok(())
    }

    /// Emit `inst` on the current sites of its operands.
    pub(crate) fn emit(&mut self, inst: &Instruction) -> CompileResult<()> {
        let mut routed = inst.clone();
        for qubit in &mut routed.qubits {
            *qubit = QubitId(self.site(*qubit)?);
        }
        self.out.apply(routed)?;
        Ok(())
    }

    /// Count a processed layer.
    pub(crate) fn end_layer(&mut self) {
        self.stats.layers += 1;
    }

    pub(crate) fn coupling(&self) -> &'a CouplingMap {
        self.coupling
    }

    pub(crate) fn finish(self) -> Routed {
        Routed {
            dag: self.out,
            final_layout: self.layout,
            stats: self.stats,
        }
    }
}

/// Basic routing pass.
///
/// Only restores adjacency: a gate whose operands are not coupled has its
/// first operand walked along a shortest path until it neighbors the
/// second. Gates that are already adjacent are left where they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicRouting;

impl RoutingPass for BasicRouting {
    #[instrument(skip_all, fields(qubits = dag.num_qubits(), ops = dag.num_ops()))]
    fn route(&self, dag: &CircuitDag, ctx: &RoutingContext<'_>) -> CompileResult<Routed> {
        let mut router = Router::new(dag, ctx)?;

        for layer in Router::layers(dag, Layering::Serial) {
            for &inst in layer.ops() {
                if Router::needs_routing(inst)? {
                    let (s0, s1) = router.operand_sites(inst)?;
                    if !router.coupling().is_connected(s0, s1) {
                        router.make_adjacent(s0, s1)?;
                    }
                }
                router.emit(inst)?;
            }
            router.end_layer();
        }

        let routed = router.finish();
        info!(
            swaps = routed.stats.total_swaps(),
            "basic routing inserted {} swaps",
            routed.stats.mandatory_swaps
        );
        Ok(routed)
    }
}

impl Pass for BasicRouting {
    fn name(&self) -> &str {
        "BasicRouting"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        run_as_pass(self, dag, properties)
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.coupling_map.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::TrivialLayout;
    use fidelis_ir::{Circuit, ClbitId};

    fn ops(dag: &CircuitDag) -> Vec<Instruction> {
        dag.topological_ops().map(|(_, i)| i.clone()).collect()
    }

    #[test]
    fn test_basic_routing_connected() {
        let mut circuit = Circuit::with_size("test", 4, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        let dag = circuit.into_dag();

        let ring = CouplingMap::ring(4);
        let routed = BasicRouting
            .route(&dag, &RoutingContext::new(&ring))
            .unwrap();

        assert_eq!(routed.dag.num_ops(), 2);
        assert_eq!(routed.stats.total_swaps(), 0);
        assert_eq!(routed.dag.level(), CircuitLevel::Physical);
    }

    #[test]
    fn test_basic_routing_needs_swap() {
        let mut circuit = Circuit::with_size("test", 4, 0);
        circuit.cx(QubitId(0), QubitId(2)).unwrap();
        let dag = circuit.into_dag();

        let ring = CouplingMap::ring(4);
        let routed = BasicRouting
            .route(&dag, &RoutingContext::new(&ring))
            .unwrap();

        let out = ops(&routed.dag);
        assert_eq!(out.len(), 2);
        assert!(is_routing_swap(&out[0]));
        assert_eq!(out[0].qubits, vec![QubitId(0), QubitId(1)]);
        assert_eq!(out[1].name(), "cx");
        assert_eq!(out[1].qubits, vec![QubitId(1), QubitId(2)]);
        assert_eq!(routed.final_layout.get_physical(QubitId(0)), Some(1));
        assert_eq!(routed.stats.mandatory_swaps, 1);
    }

    #[test]
    fn test_long_path_swaps_stop_one_hop_short() {
        let mut circuit = Circuit::with_size("test", 5, 0);
        circuit.cz(QubitId(0), QubitId(4)).unwrap();
        let dag = circuit.into_dag();

        let line = CouplingMap::linear(5);
        let routed = BasicRouting
            .route(&dag, &RoutingContext::new(&line))
            .unwrap();

        assert_eq!(routed.stats.mandatory_swaps, 3);
        let out = ops(&routed.dag);
        assert_eq!(out.last().unwrap().qubits, vec![QubitId(3), QubitId(4)]);
    }

    #[test]
    fn test_measurements_follow_layout() {
        let mut circuit = Circuit::with_size("test", 3, 1);
        circuit.cx(QubitId(0), QubitId(2)).unwrap();
        circuit.measure(QubitId(0), ClbitId(0)).unwrap();
        let dag = circuit.into_dag();

        let line = CouplingMap::linear(3);
        let routed = BasicRouting
            .route(&dag, &RoutingContext::new(&line))
            .unwrap();

        let measure = ops(&routed.dag).into_iter().find(|i| i.is_measure()).unwrap();
        assert_eq!(measure.qubits, vec![QubitId(1)]);
        assert_eq!(measure.clbits, vec![ClbitId(0)]);
    }

    #[test]
    fn test_input_swaps_are_not_routing_swaps() {
        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit.swap(QubitId(0), QubitId(1)).unwrap();
        let dag = circuit.into_dag();

        let line = CouplingMap::linear(2);
        let routed = BasicRouting
            .route(&dag, &RoutingContext::new(&line))
            .unwrap();
        assert!(!is_routing_swap(&ops(&routed.dag)[0]));
    }

    #[test]
    fn test_size_mismatch() {
        let dag = Circuit::with_size("test", 3, 0).into_dag();
        let ring = CouplingMap::ring(4);

        assert!(matches!(
            BasicRouting.route(&dag, &RoutingContext::new(&ring)),
            Err(CompileError::LayoutSizeMismatch {
                subject: "coupling map",
                ..
            })
        ));

        let small = CouplingMap::linear(3);
        let layout = Layout::trivial(2);
        assert!(matches!(
            BasicRouting.route(&dag, &RoutingContext::new(&small).with_layout(&layout)),
            Err(CompileError::LayoutSizeMismatch {
                subject: "layout",
                ..
            })
        ));
    }

    #[test]
    fn test_disconnected_topology() {
        let mut circuit = Circuit::with_size("test", 4, 0);
        circuit.cx(QubitId(0), QubitId(3)).unwrap();
        let dag = circuit.into_dag();

        let split = CouplingMap::from_edges(4, [(0, 1), (2, 3)]).unwrap();
        assert!(matches!(
            BasicRouting.route(&dag, &RoutingContext::new(&split)),
            Err(CompileError::DisconnectedGraph { .. })
        ));
    }

    #[test]
    fn test_wide_gates_are_rejected() {
        let mut dag = CircuitDag::with_wires(3, 0);
        dag.apply(Instruction::gate(
            fidelis_ir::CustomGate::new("ccz", 3),
            [QubitId(0), QubitId(1), QubitId(2)],
        ))
        .unwrap();

        let line = CouplingMap::linear(3);
        assert!(matches!(
            BasicRouting.route(&dag, &RoutingContext::new(&line)),
            Err(CompileError::UnsupportedInstruction { num_qubits: 3, .. })
        ));
    }

    #[test]
    fn test_routing_as_pass() {
        let mut circuit = Circuit::with_size("test", 3, 0);
        circuit.cx(QubitId(0), QubitId(2)).unwrap();
        let mut dag = circuit.into_dag();

        let line = CouplingMap::linear(5);
        let mut props = PropertySet::new();
        props.coupling_map = Some(line);

        TrivialLayout.run(&mut dag, &mut props).unwrap();
        BasicRouting.run(&mut dag, &mut props).unwrap();

        assert_eq!(dag.num_qubits(), 5);
        let stats = props.get::<RoutingStats>().unwrap();
        assert_eq!(stats.mandatory_swaps, 1);
        assert!(props.layout.as_ref().unwrap().is_bijection());
    }
}
