//! Property-based tests for routing.
//!
//! Routed circuits are replayed against the initial layout: every
//! router-inserted swap is applied in order, and every other operation is
//! mapped back to the logical qubits it acts on.

use fidelis_compile::passes::{
    BasicRouting, NoiseAwareRouting, Routed, RoutingContext, RoutingPass, is_routing_swap,
};
use fidelis_compile::{
    AccuracyGraph, CompileError, CouplingMap, EdgeSearch, EdgeSearchOptions, Layering, Layout,
    NoiseAwareConfig, find_better_edge, score_relocation, shortest_path_excluding,
};
use fidelis_ir::{Circuit, CircuitDag, ClbitId, QubitId};
use proptest::prelude::*;

/// A device whose sites stay connected after removing any single site.
fn arb_topology() -> impl Strategy<Value = CouplingMap> {
    prop_oneof![
        (3_u32..=7).prop_map(CouplingMap::ring),
        (2_u32..=4).prop_map(|cols| CouplingMap::grid(2, cols)),
        Just(CouplingMap::grid(3, 3)),
    ]
}

/// A device with random per-edge fidelities in `[0.5, 1.0]`.
fn arb_target() -> impl Strategy<Value = (CouplingMap, AccuracyGraph)> {
    arb_topology().prop_flat_map(|coupling| {
        let edges = coupling.edges_deduplicated();
        prop::collection::vec(0.5_f64..=1.0, edges.len()).prop_map(move |weights| {
            let accuracy = AccuracyGraph::from_fidelities(
                edges.iter().zip(weights).map(|(&(a, b), w)| (a, b, w)),
            )
            .unwrap();
            (coupling.clone(), accuracy)
        })
    })
}

#[derive(Debug, Clone)]
enum GateOp {
    H(u32),
    X(u32),
    CX(u32, u32),
    CZ(u32, u32),
}

impl GateOp {
    fn apply(self, circuit: &mut Circuit) {
        match self {
            GateOp::H(q) => {
                let _ = circuit.h(QubitId(q));
            }
            GateOp::X(q) => {
                let _ = circuit.x(QubitId(q));
            }
            GateOp::CX(a, b) => {
                let _ = circuit.cx(QubitId(a), QubitId(b));
            }
            GateOp::CZ(a, b) => {
                let _ = circuit.cz(QubitId(a), QubitId(b));
            }
        }
    }
}

fn arb_pair(n: u32) -> impl Strategy<Value = (u32, u32)> {
    (0..n, 1..n).prop_map(move |(a, offset)| (a, (a + offset) % n))
}

fn arb_gate_op(n: u32) -> impl Strategy<Value = GateOp> {
    prop_oneof![
        (0..n).prop_map(GateOp::H),
        (0..n).prop_map(GateOp::X),
        arb_pair(n).prop_map(|(a, b)| GateOp::CX(a, b)),
        arb_pair(n).prop_map(|(a, b)| GateOp::CZ(a, b)),
    ]
}

/// A circuit spanning every site, ending in a measurement of qubit 0.
fn arb_circuit(n: u32) -> impl Strategy<Value = CircuitDag> {
    prop::collection::vec(arb_gate_op(n), 1..=16).prop_map(move |ops| {
        let mut circuit = Circuit::with_size("prop", n, 1);
        for op in ops {
            op.apply(&mut circuit);
        }
        let _ = circuit.measure(QubitId(0), ClbitId(0));
        circuit.into_dag()
    })
}

fn arb_layout(n: u32) -> impl Strategy<Value = Layout> {
    Just((0..n).collect::<Vec<_>>())
        .prop_shuffle()
        .prop_map(|sites| Layout::from_physical(sites).unwrap())
}

struct Case {
    coupling: CouplingMap,
    accuracy: AccuracyGraph,
    dag: CircuitDag,
    layout: Layout,
}

fn arb_case() -> impl Strategy<Value = Case> {
    arb_target().prop_flat_map(|(coupling, accuracy)| {
        let n = coupling.num_qubits();
        (arb_circuit(n), arb_layout(n)).prop_map(move |(dag, layout)| Case {
            coupling: coupling.clone(),
            accuracy: accuracy.clone(),
            dag,
            layout,
        })
    })
}

impl std::fmt::Debug for Case {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Case")
            .field("edges", &self.accuracy.edges())
            .field("ops", &self.dag.num_ops())
            .field("layout", &self.layout.to_physical_vec())
            .finish()
    }
}

/// Program operations touching each logical qubit, in order.
type PerQubit = Vec<Vec<(String, Vec<QubitId>)>>;

fn per_qubit_input(dag: &CircuitDag) -> PerQubit {
    let mut seen = vec![Vec::new(); dag.num_qubits()];
    for (_, inst) in dag.topological_ops() {
        for q in &inst.qubits {
            seen[q.index()].push((inst.name().to_string(), inst.qubits.clone()));
        }
    }
    seen
}

/// Replay a routed circuit, checking legality along the way.
///
/// Returns the program operations per logical qubit.
fn replay(routed: &Routed, coupling: &CouplingMap, initial: &Layout) -> PerQubit {
    let mut layout = initial.clone();
    let mut seen = vec![Vec::new(); layout.len()];

    for (_, inst) in routed.dag.topological_ops() {
        if inst.is_two_qubit_gate() {
            let (a, b) = (inst.qubits[0].0, inst.qubits[1].0);
            assert!(coupling.is_connected(a, b), "{} on uncoupled ({a}, {b})", inst.name());
        }
        if is_routing_swap(inst) {
            layout.swap(inst.qubits[0].0, inst.qubits[1].0);
            assert!(layout.is_bijection());
            continue;
        }
        let logical = inst
            .map_qubits(|site| layout.get_logical(site.0).unwrap())
            .qubits;
        for q in &logical {
            seen[q.index()].push((inst.name().to_string(), logical.clone()));
        }
    }

    assert_eq!(layout, routed.final_layout);
    seen
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Basic routing yields a legal circuit that keeps per-qubit order.
    #[test]
    fn prop_basic_routing_is_legal(case in arb_case()) {
        let ctx = RoutingContext::new(&case.coupling).with_layout(&case.layout);
        let routed = BasicRouting.route(&case.dag, &ctx).unwrap();

        prop_assert_eq!(routed.stats.relocations, 0);
        prop_assert_eq!(
            replay(&routed, &case.coupling, &case.layout),
            per_qubit_input(&case.dag)
        );
    }

    /// Noise-aware routing yields a legal circuit that keeps per-qubit order,
    /// under either search strategy and layering.
    #[test]
    fn prop_noise_aware_routing_is_legal(
        case in arb_case(),
        exhaustive in any::<bool>(),
        asap in any::<bool>(),
        search_depth in 1_u32..=3,
    ) {
        let router = NoiseAwareRouting::with_config(NoiseAwareConfig {
            search_depth,
            edge_search: if exhaustive { EdgeSearch::Exhaustive } else { EdgeSearch::Greedy },
            layering: if asap { Layering::Asap } else { Layering::Serial },
            skip_unplannable: false,
        });
        let ctx = RoutingContext::new(&case.coupling)
            .with_accuracy(&case.accuracy)
            .with_layout(&case.layout);
        let routed = router.route(&case.dag, &ctx).unwrap();

        prop_assert!(routed.final_layout.is_bijection());
        prop_assert_eq!(
            replay(&routed, &case.coupling, &case.layout),
            per_qubit_input(&case.dag)
        );
    }

    /// A better edge always beats the gate's own edge.
    #[test]
    fn prop_better_edge_beats_baseline(
        (coupling, accuracy) in arb_target(),
        pick in any::<prop::sample::Index>(),
        exhaustive in any::<bool>(),
        search_depth in 1_u32..=3,
    ) {
        let edges = coupling.edges_deduplicated();
        let (a, b) = edges[pick.index(edges.len())];
        let options = EdgeSearchOptions {
            search_depth,
            strategy: if exhaustive { EdgeSearch::Exhaustive } else { EdgeSearch::Greedy },
            skip_unplannable: false,
        };

        if let Some(better) = find_better_edge(&coupling, &accuracy, a, b, options).unwrap() {
            prop_assert!(better.score > accuracy.weight(a, b).unwrap());
            prop_assert_ne!(better.edge, (a, b));
            if exhaustive {
                let rescored = score_relocation(&coupling, &accuracy, (a, b), better.edge).unwrap();
                prop_assert_eq!(rescored, better.score);
            }
        }
    }

    /// Paths avoid the excluded site, and fail exactly when it cuts the graph.
    #[test]
    fn prop_path_exclusion(
        coupling in prop_oneof![
            (3_u32..=8).prop_map(CouplingMap::linear),
            (3_u32..=8).prop_map(CouplingMap::ring),
            (2_u32..=4).prop_map(|c| CouplingMap::grid(2, c)),
            (3_u32..=6).prop_map(CouplingMap::star),
        ],
        picks in prop::array::uniform3(any::<prop::sample::Index>()),
    ) {
        let n = coupling.num_qubits() as usize;
        let [a, b, x] = picks.map(|p| p.index(n) as u32);
        prop_assume!(a != x && b != x);

        match shortest_path_excluding(&coupling, a, b, x) {
            Ok(path) => {
                prop_assert_eq!(path.first(), Some(&a));
                prop_assert_eq!(path.last(), Some(&b));
                prop_assert!(!path.contains(&x));
                for hop in path.windows(2) {
                    prop_assert!(coupling.is_connected(hop[0], hop[1]));
                }
            }
            Err(CompileError::NoPathFound { .. }) => {
                prop_assert!(!reachable_without(&coupling, a, b, x));
            }
            Err(e) => prop_assert!(false, "unexpected error: {e}"),
        }
    }
}

fn reachable_without(coupling: &CouplingMap, from: u32, to: u32, excluded: u32) -> bool {
    let mut visited = vec![false; coupling.num_qubits() as usize];
    let mut stack = vec![from];
    visited[from as usize] = true;
    while let Some(site) = stack.pop() {
        if site == to {
            return true;
        }
        for next in coupling.neighbors(site) {
            if next != excluded && !visited[next as usize] {
                visited[next as usize] = true;
                stack.push(next);
            }
        }
    }
    false
}
