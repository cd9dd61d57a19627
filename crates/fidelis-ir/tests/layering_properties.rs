//! Property-based tests for circuit layering.

use fidelis_ir::{Circuit, QubitId};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum GateOp {
    H(u32),
    T(u32),
    CX(u32, u32),
    Swap(u32, u32),
}

impl GateOp {
    fn apply(self, circuit: &mut Circuit) {
        match self {
            GateOp::H(q) => {
                let _ = circuit.h(QubitId(q));
            }
            GateOp::T(q) => {
                let _ = circuit.t(QubitId(q));
            }
            GateOp::CX(a, b) => {
                let _ = circuit.cx(QubitId(a), QubitId(b));
            }
            GateOp::Swap(a, b) => {
                let _ = circuit.swap(QubitId(a), QubitId(b));
            }
        }
    }
}

fn arb_gate_op(n: u32) -> impl Strategy<Value = GateOp> {
    let pair = (0..n, 1..n).prop_map(move |(a, offset)| (a, (a + offset) % n));
    prop_oneof![
        (0..n).prop_map(GateOp::H),
        (0..n).prop_map(GateOp::T),
        pair.clone().prop_map(|(a, b)| GateOp::CX(a, b)),
        pair.prop_map(|(a, b)| GateOp::Swap(a, b)),
    ]
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (2_u32..=6).prop_flat_map(|n| {
        prop::collection::vec(arb_gate_op(n), 0..=24).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("prop", n, 0);
            for op in ops {
                op.apply(&mut circuit);
            }
            circuit
        })
    })
}

proptest! {
    /// ASAP layers partition the operations into wire-disjoint groups.
    #[test]
    fn prop_asap_layers_are_disjoint(circuit in arb_circuit()) {
        let dag = circuit.dag();
        let layers = dag.layers();

        prop_assert_eq!(layers.iter().map(|l| l.len()).sum::<usize>(), dag.num_ops());
        prop_assert!(layers.iter().all(|l| !l.is_empty()));
        for layer in &layers {
            let mut touched = vec![false; dag.num_qubits()];
            for inst in layer.ops() {
                for q in &inst.qubits {
                    prop_assert!(!touched[q.index()], "qubit {} used twice in a layer", q);
                    touched[q.index()] = true;
                }
            }
        }
    }

    /// Serial layers hold one operation each, in topological order.
    #[test]
    fn prop_serial_layers_follow_topological_order(circuit in arb_circuit()) {
        let dag = circuit.dag();
        let serial: Vec<_> = dag
            .serial_layers()
            .iter()
            .map(|l| {
                assert_eq!(l.len(), 1);
                l.ops()[0].clone()
            })
            .collect();
        let topo: Vec<_> = dag.topological_ops().map(|(_, i)| i.clone()).collect();
        prop_assert_eq!(serial, topo);
        prop_assert!(dag.verify_integrity().is_ok());
    }
}
