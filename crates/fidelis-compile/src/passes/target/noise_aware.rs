//! Fidelity-aware routing.

use tracing::{debug, info, instrument};

use fidelis_ir::CircuitDag;

use crate::error::CompileResult;
use crate::estimator::{EdgeSearchOptions, find_better_edge};
use crate::pass::{Pass, PassKind};
use crate::planner::plan_dual_path;
use crate::property::PropertySet;
use crate::target::NoiseAwareConfig;

use super::routing::{Routed, Router, RoutingContext, RoutingPass, run_as_pass};

/// Routing pass that moves gates onto more accurate edges.
///
/// Non-adjacent operands are made adjacent exactly as [`BasicRouting`]
/// does. For operands that are already adjacent, nearby coupling edges are
/// scored with [`find_better_edge`]; when one beats the current edge the
/// operands are relocated with [`plan_dual_path`] before the gate is
/// emitted.
///
/// Requires an [`AccuracyGraph`](crate::AccuracyGraph) in the routing
/// context.
///
/// [`BasicRouting`]: super::BasicRouting
#[derive(Debug, Clone, Default)]
pub struct NoiseAwareRouting {
    config: NoiseAwareConfig,
}

impl NoiseAwareRouting {
    /// Router with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Router with an explicit configuration.
    pub fn with_config(config: NoiseAwareConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &NoiseAwareConfig {
        &self.config
    }

    fn search_options(&self) -> EdgeSearchOptions {
        EdgeSearchOptions {
            search_depth: self.config.search_depth,
            strategy: self.config.edge_search,
            skip_unplannable: self.config.skip_unplannable,
        }
    }
}

impl RoutingPass for NoiseAwareRouting {
    #[instrument(
        skip_all,
        fields(qubits = dag.num_qubits(), ops = dag.num_ops(), depth = self.config.search_depth)
    )]
    fn route(&self, dag: &CircuitDag, ctx: &RoutingContext<'_>) -> CompileResult<Routed> {
        let accuracy = ctx.require_accuracy()?;
        let mut router = Router::new(dag, ctx)?;
        let coupling = router.coupling();
        let options = self.search_options();

        for layer in Router::layers(dag, self.config.layering) {
            for &inst in layer.ops() {
                if Router::needs_routing(inst)? {
                    let (s0, s1) = router.operand_sites(inst)?;
                    if !coupling.is_connected(s0, s1) {
                        router.make_adjacent(s0, s1)?;
                    } else if let Some(better) =
                        find_better_edge(coupling, accuracy, s0, s1, options)?
                    {
                        let plan = plan_dual_path(coupling, (s0, s1), better.edge)?;
                        debug!(
                            from = ?(s0, s1),
                            to = ?better.edge,
                            score = better.score,
                            swaps = plan.num_swaps(),
                            "relocating gate"
                        );
                        router.relocate(&plan)?;

                        let (n0, n1) = router.operand_sites(inst)?;
                        if !coupling.is_connected(n0, n1) {
                            router.make_adjacent(n0, n1)?;
                        }
                    }
                }
                router.emit(inst)?;
            }
            router.end_layer();
        }

        let routed = router.finish();
        info!(
            relocations = routed.stats.relocations,
            mandatory = routed.stats.mandatory_swaps,
            relocation = routed.stats.relocation_swaps,
            "noise-aware routing inserted {} swaps",
            routed.stats.total_swaps()
        );
        Ok(routed)
    }
}

impl Pass for NoiseAwareRouting {
    fn name(&self) -> &str {
        "NoiseAwareRouting"
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
    use crate::accuracy::AccuracyGraph;
    use crate::coupling::CouplingMap;
    use crate::error::CompileError;
    use crate::passes::target::routing::{RoutingStats, is_routing_swap};
    use crate::target::EdgeSearch;
    use fidelis_ir::{Circuit, Instruction, QubitId};

    fn ring4(weights: [f64; 4]) -> (CouplingMap, AccuracyGraph) {
        let coupling = CouplingMap::ring(4);
        let accuracy = AccuracyGraph::from_fidelities([
            (0, 1, weights[0]),
            (1, 2, weights[1]),
            (2, 3, weights[2]),
            (3, 0, weights[3]),
        ])
        .unwrap();
        (coupling, accuracy)
    }

    fn single_cx(q0: u32, q1: u32) -> CircuitDag {
        let mut circuit = Circuit::with_size("cx", 4, 0);
        circuit.cx(QubitId(q0), QubitId(q1)).unwrap();
        circuit.into_dag()
    }

    fn ops(dag: &CircuitDag) -> Vec<Instruction> {
        dag.topological_ops().map(|(_, i)| i.clone()).collect()
    }

    #[test]
    fn test_good_edge_is_left_alone() {
        let (coupling, accuracy) = ring4([0.99, 0.99, 0.70, 0.99]);
        let dag = single_cx(0, 1);
        let ctx = RoutingContext::new(&coupling).with_accuracy(&accuracy);

        let routed = NoiseAwareRouting::new().route(&dag, &ctx).unwrap();
        let out = ops(&routed.dag);
        assert_eq!(out, ops(&dag));
        assert_eq!(routed.stats, RoutingStats {
            layers: 1,
            ..RoutingStats::default()
        });
    }

    #[test]
    fn test_non_adjacent_gets_one_swap() {
        let (coupling, accuracy) = ring4([0.99, 0.99, 0.70, 0.99]);
        let dag = single_cx(0, 2);
        let ctx = RoutingContext::new(&coupling).with_accuracy(&accuracy);

        let routed = NoiseAwareRouting::new().route(&dag, &ctx).unwrap();
        let out = ops(&routed.dag);
        assert_eq!(out.len(), 2);
        assert!(is_routing_swap(&out[0]));
        assert_eq!(out[0].qubits, vec![QubitId(0), QubitId(1)]);
        assert!(coupling.is_connected(out[1].qubits[0].0, out[1].qubits[1].0));
    }

    #[test]
    fn test_poor_edge_is_abandoned() {
        let (coupling, accuracy) = ring4([0.5, 0.99, 0.99, 0.99]);
        let dag = single_cx(0, 1);
        let ctx = RoutingContext::new(&coupling).with_accuracy(&accuracy);

        let routed = NoiseAwareRouting::new().route(&dag, &ctx).unwrap();
        let out = ops(&routed.dag);

        // Qubit 1 walks 1 -> 2 -> 3 around qubit 0 to reach edge (0, 3).
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].qubits, vec![QubitId(1), QubitId(2)]);
        assert_eq!(out[1].qubits, vec![QubitId(2), QubitId(3)]);
        assert_eq!(out[2].name(), "cx");
        assert_eq!(out[2].qubits, vec![QubitId(0), QubitId(3)]);
        assert_eq!(routed.stats.relocations, 1);
        assert_eq!(routed.stats.relocation_swaps, 2);
        assert_eq!(routed.final_layout.get_logical(3), Some(QubitId(1)));
    }

    #[test]
    fn test_exhaustive_search_relocates_too() {
        let (coupling, accuracy) = ring4([0.5, 0.99, 0.99, 0.99]);
        let dag = single_cx(0, 1);
        let ctx = RoutingContext::new(&coupling).with_accuracy(&accuracy);
        let router = NoiseAwareRouting::with_config(NoiseAwareConfig {
            edge_search: EdgeSearch::Exhaustive,
            ..NoiseAwareConfig::default()
        });

        let routed = router.route(&dag, &ctx).unwrap();
        let gate = ops(&routed.dag).pop().unwrap();
        assert_ne!(gate.qubits, vec![QubitId(0), QubitId(1)]);
        assert!(coupling.is_connected(gate.qubits[0].0, gate.qubits[1].0));
        assert_eq!(routed.stats.relocations, 1);
    }

    #[test]
    fn test_requires_accuracy() {
        let coupling = CouplingMap::ring(4);
        let dag = single_cx(0, 1);
        assert!(matches!(
            NoiseAwareRouting::new().route(&dag, &RoutingContext::new(&coupling)),
            Err(CompileError::MissingAccuracyGraph)
        ));
    }

    #[test]
    fn test_unplannable_candidates_on_a_line() {
        let coupling = CouplingMap::linear(4);
        let accuracy =
            AccuracyGraph::from_fidelities([(0, 1, 0.99), (1, 2, 0.5), (2, 3, 0.99)]).unwrap();
        let dag = single_cx(1, 2);
        let ctx = RoutingContext::new(&coupling).with_accuracy(&accuracy);

        assert!(matches!(
            NoiseAwareRouting::new().route(&dag, &ctx),
            Err(CompileError::NoPathFound { .. })
        ));

        let lenient = NoiseAwareRouting::with_config(NoiseAwareConfig {
            skip_unplannable: true,
            ..NoiseAwareConfig::default()
        });
        let routed = lenient.route(&dag, &ctx).unwrap();
        assert_eq!(routed.stats.relocations, 0);
        assert_eq!(ops(&routed.dag), ops(&dag));
    }

    #[test]
    fn test_adjacency_restored_when_second_path_displaces_first() {
        let coupling = CouplingMap::grid(3, 3);
        let accuracy = AccuracyGraph::from_fidelities([
            (0, 1, 0.9),
            (0, 3, 0.5),
            (1, 2, 0.5),
            (1, 4, 0.95),
            (2, 5, 0.5),
            (3, 4, 0.8),
            (3, 6, 0.99),
            (4, 5, 0.8),
            (4, 7, 0.8),
            (5, 8, 0.95),
            (6, 7, 0.99),
            (7, 8, 0.9),
        ])
        .unwrap();
        let mut circuit = Circuit::with_size("cx", 9, 0);
        circuit.cx(QubitId(0), QubitId(3)).unwrap();
        let dag = circuit.into_dag();
        let ctx = RoutingContext::new(&coupling).with_accuracy(&accuracy);
        let router = NoiseAwareRouting::with_config(NoiseAwareConfig {
            search_depth: 3,
            ..NoiseAwareConfig::default()
        });

        // The plan onto (4, 7) walks qubit 0 along 0-1-4, then qubit 3 along
        // 3-4-7 swaps qubit 0 back to site 3, leaving the pair on (3, 7).
        let routed = router.route(&dag, &ctx).unwrap();
        assert_eq!(routed.stats, RoutingStats {
            mandatory_swaps: 1,
            relocation_swaps: 4,
            relocations: 1,
            layers: 1,
        });

        let out = ops(&routed.dag);
        assert_eq!(out.len(), 6);
        assert!(out[..5].iter().all(is_routing_swap));
        assert_eq!(out[4].qubits, vec![QubitId(3), QubitId(4)]);
        assert_eq!(out[5].name(), "cx");
        assert_eq!(out[5].qubits, vec![QubitId(4), QubitId(7)]);
        assert_eq!(routed.final_layout.get_logical(4), Some(QubitId(0)));
        assert_eq!(routed.final_layout.get_logical(7), Some(QubitId(3)));
    }

    #[test]
    fn test_asap_layering_routes_parallel_gates() {
        let coupling = CouplingMap::grid(2, 3);
        let accuracy = AccuracyGraph::uniform(&coupling, 0.98).unwrap();
        let mut circuit = Circuit::with_size("pairs", 6, 0);
        circuit.cx(QubitId(0), QubitId(2)).unwrap();
        circuit.cx(QubitId(3), QubitId(5)).unwrap();
        let dag = circuit.into_dag();

        let router = NoiseAwareRouting::with_config(NoiseAwareConfig {
            layering: crate::target::Layering::Asap,
            ..NoiseAwareConfig::default()
        });
        let routed = router
            .route(&dag, &RoutingContext::new(&coupling).with_accuracy(&accuracy))
            .unwrap();

        assert_eq!(routed.stats.layers, 1);
        assert_eq!(routed.stats.mandatory_swaps, 2);
        for gate in ops(&routed.dag).iter().filter(|i| !is_routing_swap(i)) {
            assert!(coupling.is_connected(gate.qubits[0].0, gate.qubits[1].0));
        }
    }
}
