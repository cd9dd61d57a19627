//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - noise-aware qubit routing",
        style("Fidelis").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  fidelis-ir       Circuit intermediate representation");
    println!("  fidelis-compile  Layout, routing and fidelity analysis passes");
    println!("  fidelis-cli      Command-line interface");
    println!();
    println!("License: {}", style(env!("CARGO_PKG_LICENSE")).dim());
}
