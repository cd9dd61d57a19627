//! Layout passes for mapping logical qubits to physical qubits.

use tracing::debug;

use fidelis_ir::{CircuitDag, CircuitLevel, QubitId};

use crate::error::{CompileError, CompileResult};
use crate::layout::Layout;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Pad `dag` with idle qubits until it spans `num_sites` wires.
///
/// Routers need a total layout, so every physical site must hold some
/// logical qubit.
#[allow(clippy::cast_possible_truncation)]
fn fill_device(dag: &mut CircuitDag, num_sites: u32) -> CompileResult<()> {
    let num_logical = dag.num_qubits();
    if num_logical > num_sites as usize {
        return Err(CompileError::CircuitTooLarge {
            required: num_logical,
            available: num_sites,
        });
    }
    for q in 0..num_sites {
        dag.add_qubit(QubitId(q));
    }
    if dag.num_qubits() != num_sites as usize {
        return Err(CompileError::InvalidLayout(format!(
            "circuit uses qubit ids outside the {num_sites} device sites"
        )));
    }
    if num_logical < num_sites as usize {
        debug!(
            ancillas = num_sites as usize - num_logical,
            "padded circuit to device size"
        );
    }
    Ok(())
}

/// Trivial layout pass.
///
/// Maps logical qubit i to physical qubit i, after padding the circuit with
/// idle ancillas up to the device size.
pub struct TrivialLayout;

impl Pass for TrivialLayout {
    fn name(&self) -> &'static str {
        "TrivialLayout"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let num_sites = properties
            .coupling_map
            .as_ref()
            .ok_or(CompileError::MissingCouplingMap)?
            .num_qubits();

        fill_device(dag, num_sites)?;
        properties.layout = Some(Layout::trivial(num_sites));
        dag.set_level(CircuitLevel::Physical);

        Ok(())
    }

    fn should_run(&self, _dag: &CircuitDag, properties: &PropertySet) -> bool {
        properties.layout.is_none() && properties.coupling_map.is_some()
    }
}

/// Installs a caller-supplied initial layout.
///
/// The layout must cover every site of the coupling map.
#[derive(Debug, Clone)]
pub struct SetLayout {
    layout: Layout,
}

impl SetLayout {
    /// Pass that installs `layout`.
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }
}

impl Pass for SetLayout {
    fn name(&self) -> &'static str {
        "SetLayout"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()> {
        let num_sites = properties
            .coupling_map
            .as_ref()
            .ok_or(CompileError::MissingCouplingMap)?
            .num_qubits();

        if self.layout.len() != num_sites as usize {
            return Err(CompileError::LayoutSizeMismatch {
                subject: "layout",
                expected: num_sites as usize,
                actual: self.layout.len(),
            });
        }

        fill_device(dag, num_sites)?;
        properties.layout = Some(self.layout.clone());
        dag.set_level(CircuitLevel::Physical);

        Ok(())
    }
}
