//! Fidelis Noise-Aware Routing
//!
//! This crate places and routes quantum circuits onto hardware whose
//! two-qubit gates differ in accuracy. It is built on a pass-based
//! architecture: layout, routing, verification and fidelity analysis are
//! independent passes that share state through a [`PropertySet`].
//!
//! # Overview
//!
//! Routing takes a circuit over logical qubits and produces one over the
//! physical sites of a [`CouplingMap`]:
//! 1. **Layout**: assign each logical qubit a site ([`Layout`])
//! 2. **Routing**: insert swaps so every two-qubit gate runs on a coupled
//!    pair, and, for [`NoiseAwareRouting`](passes::NoiseAwareRouting),
//!    move gates onto more accurate edges nearby
//! 3. **Verification**: check every two-qubit gate sits on an edge
//! 4. **Analysis**: estimate the circuit's success probability from the
//!    [`AccuracyGraph`]
//!
//! # Architecture
//!
//! ```text
//! Input Circuit
//!       |
//!       v
//! +-------------+
//! | PassManager | <-- PropertySet (coupling map, accuracy graph, layout)
//! +-------------+
//!       |
//!       |-- TrivialLayout / SetLayout
//!       |-- BasicRouting / NoiseAwareRouting
//!       |      |-- find_better_edge   (estimator)
//!       |      `-- plan_dual_path     (planner)
//!       |-- ConnectivityVerification
//!       `-- FidelityAnalysis
//!       |
//!       v
//! Output Circuit (physical sites)
//! ```
//!
//! # Example: Noise-Aware Compilation
//!
//! ```rust
//! use fidelis_compile::{AccuracyGraph, CouplingMap, PassManagerBuilder};
//! use fidelis_compile::passes::{FidelityEstimate, RoutingStats};
//! use fidelis_ir::Circuit;
//!
//! let coupling = CouplingMap::ring(4);
//! let accuracy = AccuracyGraph::from_fidelities([
//!     (0, 1, 0.5),
//!     (1, 2, 0.99),
//!     (2, 3, 0.99),
//!     (3, 0, 0.99),
//! ])
//! .unwrap();
//!
//! let (pm, mut props) = PassManagerBuilder::new()
//!     .with_target(coupling, accuracy)
//!     .build();
//!
//! let mut dag = Circuit::bell().unwrap().into_dag();
//! pm.run(&mut dag, &mut props).unwrap();
//!
//! // The gate left the 50% edge.
//! assert_eq!(props.get::<RoutingStats>().unwrap().relocations, 1);
//! assert!(props.get::<FidelityEstimate>().unwrap().fidelity > 0.5);
//! ```
//!
//! # Routing Without a Pass Manager
//!
//! Routers also implement [`RoutingPass`](passes::RoutingPass), which takes
//! its inputs explicitly and leaves the input circuit untouched:
//!
//! ```rust
//! use fidelis_compile::passes::{BasicRouting, RoutingContext, RoutingPass};
//! use fidelis_compile::CouplingMap;
//! use fidelis_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("demo", 4, 0);
//! circuit.cx(QubitId(0), QubitId(2)).unwrap();
//! let dag = circuit.into_dag();
//!
//! let ring = CouplingMap::ring(4);
//! let routed = BasicRouting.route(&dag, &RoutingContext::new(&ring)).unwrap();
//! assert_eq!(routed.stats.mandatory_swaps, 1);
//! ```
//!
//! # Custom Passes
//!
//! Implement the [`Pass`] trait to create custom compilation passes:
//!
//! ```rust
//! use fidelis_compile::{Pass, PassKind, CompileResult, PropertySet};
//! use fidelis_ir::CircuitDag;
//!
//! struct MyCustomPass;
//!
//! impl Pass for MyCustomPass {
//!     fn name(&self) -> &str { "my_custom_pass" }
//!     fn kind(&self) -> PassKind { PassKind::Transformation }
//!
//!     fn run(&self, dag: &mut CircuitDag, props: &mut PropertySet) -> CompileResult<()> {
//!         // Your pass logic here
//!         Ok(())
//!     }
//! }
//! ```

pub mod accuracy;
pub mod coupling;
pub mod error;
pub mod estimator;
pub mod layout;
pub mod manager;
pub mod pass;
pub mod planner;
pub mod property;
pub mod target;

// Built-in passes
pub mod passes;

pub use accuracy::AccuracyGraph;
pub use coupling::CouplingMap;
pub use error::{CompileError, CompileResult};
pub use estimator::{
    BetterEdge, EdgeSearchOptions, find_better_edge, path_fidelity, score_plan, score_relocation,
};
pub use layout::Layout;
pub use manager::{PassManager, PassManagerBuilder, RoutingStrategy};
pub use pass::{Pass, PassKind};
pub use planner::{DualPath, plan_dual_path, shortest_path_excluding};
pub use property::PropertySet;
pub use target::{EdgeSearch, Layering, NoiseAwareConfig, TargetSpec, WeightKind};
