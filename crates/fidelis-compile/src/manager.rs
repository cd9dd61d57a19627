//! Pass manager for orchestrating compilation.

use tracing::{debug, info, instrument};

use fidelis_ir::CircuitDag;

use crate::accuracy::AccuracyGraph;
use crate::coupling::CouplingMap;
use crate::error::CompileResult;
use crate::layout::Layout;
use crate::pass::Pass;
use crate::passes::{
    BasicRouting, ConnectivityVerification, FidelityAnalysis, NoiseAwareRouting, SetLayout,
    TrivialLayout,
};
use crate::property::PropertySet;
use crate::target::NoiseAwareConfig;

/// Manages and executes a sequence of compilation passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Names of the registered passes, in execution order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run all passes on the given DAG.
    #[instrument(skip(self, dag, properties))]
    pub fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on circuit with {} qubits",
            self.passes.len(),
            dag.num_qubits()
        );

        for pass in &self.passes {
            if pass.should_run(dag, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(dag, properties)?;
                debug!("Pass {} completed, ops: {}", pass.name(), dag.num_ops());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, final depth: {}, ops: {}",
            dag.depth(),
            dag.num_ops()
        );

        Ok(())
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Which router a built pipeline uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingStrategy {
    /// [`BasicRouting`]: restore adjacency only.
    Basic,
    /// [`NoiseAwareRouting`] with the given configuration.
    NoiseAware(NoiseAwareConfig),
}

impl Default for RoutingStrategy {
    fn default() -> Self {
        Self::NoiseAware(NoiseAwareConfig::default())
    }
}

/// Builder for creating pass managers with preset configurations.
///
/// The pipeline is layout, routing, connectivity verification and, when an
/// accuracy graph is known, fidelity analysis.
pub struct PassManagerBuilder {
    routing: RoutingStrategy,
    initial_layout: Option<Layout>,
    /// Target properties.
    properties: PropertySet,
}

impl PassManagerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            routing: RoutingStrategy::default(),
            initial_layout: None,
            properties: PropertySet::new(),
        }
    }

    /// Set the target properties.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    /// Set the target coupling map and accuracy graph.
    #[must_use]
    pub fn with_target(mut self, coupling_map: CouplingMap, accuracy: AccuracyGraph) -> Self {
        self.properties.coupling_map = Some(coupling_map);
        self.properties.accuracy = Some(accuracy);
        self
    }

    /// Start routing from `layout` instead of the identity.
    #[must_use]
    pub fn with_initial_layout(mut self, layout: Layout) -> Self {
        self.initial_layout = Some(layout);
        self
    }

    /// Choose the router.
    #[must_use]
    pub fn with_routing(mut self, routing: RoutingStrategy) -> Self {
        self.routing = routing;
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();

        if self.properties.coupling_map.is_some() {
            match self.initial_layout {
                Some(layout) => pm.add_pass(SetLayout::new(layout)),
                None => pm.add_pass(TrivialLayout),
            }

            match self.routing {
                RoutingStrategy::Basic => pm.add_pass(BasicRouting),
                RoutingStrategy::NoiseAware(config) => {
                    pm.add_pass(NoiseAwareRouting::with_config(config));
                }
            }

            pm.add_pass(ConnectivityVerification);
        }

        if self.properties.accuracy.is_some() {
            pm.add_pass(FidelityAnalysis);
        }

        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::{FidelityEstimate, RoutingStats};
    use fidelis_ir::{Circuit, QubitId};

    #[test]
    fn test_empty_pass_manager() {
        let pm = PassManager::new();
        assert!(pm.is_empty());
        assert_eq!(pm.len(), 0);
    }

    #[test]
    fn test_pass_manager_run() {
        let pm = PassManager::new();
        let mut props = PropertySet::new();

        let mut circuit = Circuit::with_size("test", 2, 0);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();

        let mut dag = circuit.into_dag();
        pm.run(&mut dag, &mut props).unwrap();

        assert_eq!(dag.num_ops(), 2);
    }

    #[test]
    fn test_pass_manager_builder() {
        let coupling = CouplingMap::linear(5);
        let accuracy = AccuracyGraph::uniform(&coupling, 0.97).unwrap();
        let (pm, props) = PassManagerBuilder::new()
            .with_target(coupling, accuracy)
            .build();

        assert_eq!(
            pm.pass_names(),
            vec![
                "TrivialLayout",
                "NoiseAwareRouting",
                "connectivity_verification",
                "fidelity_analysis"
            ]
        );
        assert!(props.coupling_map.is_some());
        assert!(props.accuracy.is_some());
    }

    #[test]
    fn test_builder_with_layout_and_basic_routing() {
        let coupling = CouplingMap::ring(4);
        let accuracy = AccuracyGraph::uniform(&coupling, 0.97).unwrap();
        let (pm, mut props) = PassManagerBuilder::new()
            .with_target(coupling, accuracy)
            .with_initial_layout(Layout::from_physical(vec![1, 0, 2, 3]).unwrap())
            .with_routing(RoutingStrategy::Basic)
            .build();
        assert_eq!(pm.pass_names()[..2], ["SetLayout", "BasicRouting"]);

        let mut circuit = Circuit::with_size("test", 4, 0);
        circuit.cx(QubitId(1), QubitId(2)).unwrap();
        let mut dag = circuit.into_dag();
        pm.run(&mut dag, &mut props).unwrap();

        // Qubit 1 starts on site 0, two hops from qubit 2 on site 2.
        assert_eq!(props.get::<RoutingStats>().unwrap().mandatory_swaps, 1);
        let estimate = props.get::<FidelityEstimate>().unwrap();
        assert_eq!(estimate.swaps, 1);
        assert!((estimate.fidelity - 0.97_f64.powi(4)).abs() < 1e-12);
    }

    #[test]
    fn test_full_pipeline_on_library_circuit() {
        let coupling = CouplingMap::grid(2, 3);
        let accuracy = AccuracyGraph::uniform(&coupling, 0.99).unwrap();
        let (pm, mut props) = PassManagerBuilder::new()
            .with_target(coupling, accuracy)
            .build();

        let mut dag = Circuit::qft(4).unwrap().into_dag();
        pm.run(&mut dag, &mut props).unwrap();

        assert_eq!(dag.num_qubits(), 6);
        assert!(props.layout.as_ref().unwrap().is_bijection());
        assert!(props.get::<FidelityEstimate>().unwrap().fidelity > 0.0);
    }
}
