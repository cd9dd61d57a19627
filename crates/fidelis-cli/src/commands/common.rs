//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;

use fidelis_compile::passes::{FidelityEstimate, RoutingStats};
use fidelis_compile::{
    AccuracyGraph, CouplingMap, EdgeSearch, Layering, NoiseAwareConfig, PassManagerBuilder,
    RoutingStrategy, TargetSpec,
};
use fidelis_ir::Circuit;

/// Error range sampled for preset targets and comparison trials.
pub const ERROR_RANGE: (f64, f64) = (0.01, 0.09);

/// A device ready for routing.
pub struct Target {
    pub name: String,
    pub coupling: CouplingMap,
    pub accuracy: AccuracyGraph,
}

/// Load a target from a JSON file, or build a preset topology with
/// accuracies sampled from `seed`.
pub fn load_target(target: &str, seed: u64) -> Result<Target> {
    let path = Path::new(target);
    if path.exists() {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read target file: {target}"))?;
        let spec = TargetSpec::from_json(&source)
            .with_context(|| format!("Failed to parse target file: {target}"))?;
        let (coupling, accuracy) = spec
            .build()
            .with_context(|| format!("Invalid target file: {target}"))?;
        let name = if spec.name.is_empty() {
            target.to_string()
        } else {
            spec.name
        };
        return Ok(Target {
            name,
            coupling,
            accuracy,
        });
    }

    let coupling = CouplingMap::from_preset(&target.to_lowercase()).with_context(|| {
        format!(
            "Unknown target: '{target}'. Pass a JSON file or one of: linear:N, ring:N, star:N, full:N, grid:RxC, jakarta"
        )
    })?;
    let accuracy = sample_accuracy(&coupling, seed)?;
    Ok(Target {
        name: target.to_string(),
        coupling,
        accuracy,
    })
}

/// Draw per-edge error rates uniformly from [`ERROR_RANGE`].
pub fn sample_accuracy(coupling: &CouplingMap, seed: u64) -> Result<AccuracyGraph> {
    let mut rng = StdRng::seed_from_u64(seed);
    let (lo, hi) = ERROR_RANGE;
    Ok(AccuracyGraph::sample_uniform_errors(
        coupling, &mut rng, lo, hi,
    )?)
}

/// Build one of the benchmark circuits.
///
/// `secret` feeds `qft` (the prepared bit string) and `bv` (the hidden
/// string); `width` sizes `ghz` and `toffoli`, defaulting to the device.
pub fn build_circuit(
    name: &str,
    secret: &str,
    width: Option<u32>,
    num_sites: u32,
) -> Result<Circuit> {
    let width = width.unwrap_or(num_sites);
    let circuit = match name.to_lowercase().as_str() {
        "qft" => Circuit::qft_roundtrip(secret),
        "bv" | "bernstein_vazirani" => Circuit::bernstein_vazirani(secret),
        "toffoli" => Circuit::toffoli(width),
        "ghz" => Circuit::ghz(width),
        other => anyhow::bail!("Unknown circuit: '{other}'. Available: qft, bv, toffoli, ghz"),
    };
    circuit.with_context(|| format!("Failed to build circuit '{name}'"))
}

/// Router settings shared by `route` and `compare`.
#[derive(Debug, Clone, Copy)]
pub struct RouterOptions {
    pub search_depth: u32,
    pub exhaustive: bool,
    pub asap: bool,
    pub skip_unplannable: bool,
}

impl RouterOptions {
    pub fn noise_aware(&self) -> RoutingStrategy {
        RoutingStrategy::NoiseAware(NoiseAwareConfig {
            search_depth: self.search_depth,
            edge_search: if self.exhaustive {
                EdgeSearch::Exhaustive
            } else {
                EdgeSearch::Greedy
            },
            layering: if self.asap {
                Layering::Asap
            } else {
                Layering::Serial
            },
            skip_unplannable: self.skip_unplannable,
        })
    }
}

/// Outcome of routing one circuit.
pub struct Outcome {
    pub circuit: Circuit,
    pub stats: RoutingStats,
    pub estimate: FidelityEstimate,
    pub final_layout: Vec<u32>,
}

/// Run the full pipeline for `circuit` on `coupling` and `accuracy`.
pub fn route(
    circuit: &Circuit,
    coupling: &CouplingMap,
    accuracy: &AccuracyGraph,
    strategy: RoutingStrategy,
) -> Result<Outcome> {
    let (pm, mut props) = PassManagerBuilder::new()
        .with_target(coupling.clone(), accuracy.clone())
        .with_routing(strategy)
        .build();

    let mut dag = circuit.dag().clone();
    pm.run(&mut dag, &mut props)?;

    let stats = props.remove::<RoutingStats>().unwrap_or_default();
    let estimate = props
        .remove::<FidelityEstimate>()
        .context("Fidelity analysis did not run")?;
    let final_layout = props
        .layout
        .as_ref()
        .map(|l| l.to_physical_vec())
        .unwrap_or_default();

    Ok(Outcome {
        circuit: Circuit::from_dag(circuit.name(), dag),
        stats,
        estimate,
        final_layout,
    })
}
