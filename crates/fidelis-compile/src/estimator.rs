//! Fidelity estimates for candidate relocations.

use tracing::trace;

use crate::accuracy::AccuracyGraph;
use crate::coupling::CouplingMap;
use crate::error::{CompileError, CompileResult};
use crate::planner::{DualPath, plan_dual_path};
use crate::target::EdgeSearch;

/// Fidelity of a planned swap chain.
///
/// A swap is three two-qubit gates, so each hop contributes its edge
/// fidelity cubed.
pub fn path_fidelity(accuracy: &AccuracyGraph, path: &[u32]) -> CompileResult<f64> {
    path.windows(2).try_fold(1.0, |acc, hop| {
        Ok(acc * accuracy.try_weight(hop[0], hop[1])?.powi(3))
    })
}

/// Fidelity of a relocation plan followed by one gate on `candidate`.
///
/// Zero when the plan moves nothing.
pub fn score_plan(
    accuracy: &AccuracyGraph,
    plan: &DualPath,
    candidate: (u32, u32),
) -> CompileResult<f64> {
    if plan.is_empty() {
        return Ok(0.0);
    }
    let mut score = accuracy.try_weight(candidate.0, candidate.1)?;
    for path in plan.paths.iter().flatten() {
        score *= path_fidelity(accuracy, path)?;
    }
    Ok(score)
}

/// Score moving the operands on `sources` onto `candidate` and running the
/// gate there.
///
/// Returns `accuracy(candidate)` times the cubed hop fidelities of every
/// planned path, or zero when no operand has to move.
pub fn score_relocation(
    coupling: &CouplingMap,
    accuracy: &AccuracyGraph,
    sources: (u32, u32),
    candidate: (u32, u32),
) -> CompileResult<f64> {
    let plan = plan_dual_path(coupling, sources, candidate)?;
    score_plan(accuracy, &plan, candidate)
}

/// A coupling edge that beats the gate's current edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetterEdge {
    /// The edge, as `(min, max)`.
    pub edge: (u32, u32),
    /// Score that won the comparison.
    pub score: f64,
}

/// Options for [`find_better_edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeSearchOptions {
    /// Maximum distance from each operand to each end of a candidate.
    pub search_depth: u32,
    /// Comparison strategy.
    pub strategy: EdgeSearch,
    /// Treat unplannable candidates as scoring zero.
    ///
    /// This departs from the default policy of surfacing
    /// [`CompileError::NoPathFound`] to the caller; leave it off unless the
    /// topology has cut vertices the search is expected to hit.
    pub skip_unplannable: bool,
}

impl Default for EdgeSearchOptions {
    fn default() -> Self {
        Self {
            search_depth: 2,
            strategy: EdgeSearch::Greedy,
            skip_unplannable: false,
        }
    }
}

/// Look for a coupling edge near `(site_a, site_b)` with a better score than
/// the gate's own edge.
///
/// Candidates are the deduplicated coupling edges whose both ends lie within
/// `search_depth` hops of both sites, visited in ascending order. The
/// baseline is the accuracy of `(site_a, site_b)`, or zero if it has none.
///
/// With [`EdgeSearch::Greedy`] each candidate is scored as a relocation
/// from the best edge so far and replaces it on a strictly higher score.
/// With [`EdgeSearch::Exhaustive`] every candidate is scored from
/// `(site_a, site_b)` and the first maximum wins. Either way the returned
/// score is strictly greater than the baseline.
pub fn find_better_edge(
    coupling: &CouplingMap,
    accuracy: &AccuracyGraph,
    site_a: u32,
    site_b: u32,
    options: EdgeSearchOptions,
) -> CompileResult<Option<BetterEdge>> {
    let within = |site: u32, (u, v): (u32, u32)| {
        let near = |x: u32| {
            coupling
                .distance(site, x)
                .is_some_and(|d| d <= options.search_depth)
        };
        near(u) && near(v)
    };

    let mut best_edge = (site_a, site_b);
    let mut best_score = accuracy.weight(site_a, site_b).unwrap_or(0.0);
    let mut found = false;

    for candidate in coupling.edges_deduplicated() {
        if !within(site_a, candidate) || !within(site_b, candidate) {
            continue;
        }
        let sources = match options.strategy {
            EdgeSearch::Greedy => best_edge,
            EdgeSearch::Exhaustive => (site_a, site_b),
        };
        let score = match score_relocation(coupling, accuracy, sources, candidate) {
            Ok(score) => score,
            Err(CompileError::NoPathFound { .. }) if options.skip_unplannable => 0.0,
            Err(e) => return Err(e),
        };
        trace!(?candidate, ?sources, score, "scored candidate edge");

        if score > best_score {
            best_edge = candidate;
            best_score = score;
            found = true;
        }
    }

    Ok(found.then_some(BetterEdge {
        edge: best_edge,
        score: best_score,
    }))
}
