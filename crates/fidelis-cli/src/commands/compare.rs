//! Compare command implementation.
//!
//! Routes the same circuit with basic and noise-aware routing on freshly
//! sampled accuracy graphs and reports the expected fidelity of each.

use anyhow::Result;
use console::style;
use tracing::debug;

use fidelis_compile::RoutingStrategy;

use super::common::{self, ERROR_RANGE, RouterOptions};

/// Execute the compare command.
#[allow(clippy::cast_precision_loss)]
pub fn execute(
    target: &str,
    circuit: &str,
    secret: &str,
    width: Option<u32>,
    trials: u32,
    seed: u64,
    options: RouterOptions,
) -> Result<()> {
    if trials == 0 {
        anyhow::bail!("--trials must be at least 1");
    }

    let device = common::load_target(target, seed)?;
    let input = common::build_circuit(circuit, secret, width, device.coupling.num_qubits())?;

    println!(
        "{} Comparing routers for {} on {} over {} trials (errors {:.0}%-{:.0}%)",
        style("→").cyan().bold(),
        style(input.name()).green(),
        style(&device.name).yellow(),
        trials,
        ERROR_RANGE.0 * 100.0,
        ERROR_RANGE.1 * 100.0
    );
    println!(
        "  {:>5}  {:>10}  {:>12}  {:>6}  {:>6}",
        "trial", "basic", "noise-aware", "swaps", "moves"
    );

    let mut wins = 0;
    let mut basic_sum = 0.0;
    let mut aware_sum = 0.0;

    for trial in 0..trials {
        let accuracy =
            common::sample_accuracy(&device.coupling, seed.wrapping_add(u64::from(trial)))?;
        let basic = common::route(&input, &device.coupling, &accuracy, RoutingStrategy::Basic)?;
        let aware = common::route(&input, &device.coupling, &accuracy, options.noise_aware())?;
        debug!(
            trial,
            basic = basic.estimate.fidelity,
            aware = aware.estimate.fidelity,
            "trial routed"
        );

        let improved = aware.estimate.fidelity > basic.estimate.fidelity;
        if improved {
            wins += 1;
        }
        basic_sum += basic.estimate.fidelity;
        aware_sum += aware.estimate.fidelity;

        let aware_cell = format!("{:>12.4}", aware.estimate.fidelity);
        println!(
            "  {:>5}  {:>10.4}  {}  {:>6}  {:>6}",
            trial,
            basic.estimate.fidelity,
            if improved {
                style(aware_cell).green()
            } else {
                style(aware_cell).dim()
            },
            aware.stats.total_swaps(),
            aware.stats.relocations
        );
    }

    let n = f64::from(trials);
    println!("{} Comparison complete", style("✓").green().bold());
    println!(
        "  Mean fidelity: basic {:.4}, noise-aware {:.4}",
        basic_sum / n,
        aware_sum / n
    );
    println!(
        "  Noise-aware routing improved {} of {} trials",
        style(wins).yellow(),
        trials
    );

    Ok(())
}
