//! Route command implementation.

use anyhow::Result;
use console::style;
use serde::Serialize;

use fidelis_compile::RoutingStrategy;
use fidelis_compile::passes::{FidelityEstimate, RoutingStats};

use super::common::{self, RouterOptions};

/// Machine-readable summary printed with `--json`.
#[derive(Serialize)]
struct RouteReport<'a> {
    target: &'a str,
    circuit: &'a str,
    router: &'a str,
    ops_before: usize,
    ops_after: usize,
    depth_after: usize,
    stats: RoutingStats,
    estimate: FidelityEstimate,
    final_layout: &'a [u32],
}

/// Execute the route command.
#[allow(clippy::too_many_arguments)]
pub fn execute(
    target: &str,
    circuit: &str,
    secret: &str,
    width: Option<u32>,
    seed: u64,
    options: RouterOptions,
    basic: bool,
    json: bool,
) -> Result<()> {
    let device = common::load_target(target, seed)?;
    let input = common::build_circuit(circuit, secret, width, device.coupling.num_qubits())?;
    let (router, strategy) = if basic {
        ("basic", RoutingStrategy::Basic)
    } else {
        ("noise-aware", options.noise_aware())
    };

    if !json {
        println!(
            "{} Routing {} onto {} ({} sites, {} edges) with {} routing",
            style("→").cyan().bold(),
            style(input.name()).green(),
            style(&device.name).yellow(),
            device.coupling.num_qubits(),
            device.coupling.edges_deduplicated().len(),
            router
        );
        println!(
            "  Loaded: {} qubits, {} ops, depth {}",
            input.num_qubits(),
            input.dag().num_ops(),
            input.depth()
        );
    }

    let outcome = common::route(&input, &device.coupling, &device.accuracy, strategy)?;

    if json {
        let report = RouteReport {
            target: &device.name,
            circuit: input.name(),
            router,
            ops_before: input.dag().num_ops(),
            ops_after: outcome.circuit.dag().num_ops(),
            depth_after: outcome.circuit.depth(),
            stats: outcome.stats,
            estimate: outcome.estimate,
            final_layout: &outcome.final_layout,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let stats = outcome.stats;
    println!("{} Routing complete", style("✓").green().bold());
    println!(
        "  Result: {} ops, depth {}",
        outcome.circuit.dag().num_ops(),
        outcome.circuit.depth()
    );
    println!(
        "  Swaps:  {} ({} mandatory, {} relocation over {} relocations)",
        style(stats.total_swaps()).yellow(),
        stats.mandatory_swaps,
        stats.relocation_swaps,
        stats.relocations
    );
    println!(
        "  Expected fidelity: {}",
        style(format!("{:.4}", outcome.estimate.fidelity)).cyan().bold()
    );
    println!("  Final layout: {:?}", outcome.final_layout);

    Ok(())
}
