//! Pass trait and types for compilation passes.

use fidelis_ir::CircuitDag;

use crate::error::CompileResult;
use crate::property::PropertySet;

/// The kind of compilation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Analysis pass that reads but does not modify the DAG.
    Analysis,
    /// Transformation pass that modifies the DAG.
    Transformation,
}

/// A compilation pass that operates on a circuit DAG.
///
/// Layout, routing, verification and fidelity analysis are all passes and
/// communicate through the [`PropertySet`].
pub trait Pass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Get the kind of this pass.
    fn kind(&self) -> PassKind;

    /// Run the pass on the given DAG.
    ///
    /// For analysis passes, this should not modify the DAG but may
    /// write to the `PropertySet`.
    ///
    /// For transformation passes, this modifies the DAG and may read
    /// from and write to the `PropertySet`.
    fn run(&self, dag: &mut CircuitDag, properties: &mut PropertySet) -> CompileResult<()>;

    /// Check if this pass should run based on current state.
    fn should_run(&self, _dag: &CircuitDag, _properties: &PropertySet) -> bool {
        true
    }
}
