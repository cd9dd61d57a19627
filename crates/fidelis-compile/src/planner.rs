//! Path planning for qubit relocation.
//!
//! Relocating the two operands of a gate onto another coupling edge moves
//! each operand along its own swap chain. A chain for one operand must never
//! pass through the site still holding the other operand, so both planners
//! here search the coupling graph with that site removed.

use std::collections::VecDeque;

use crate::coupling::CouplingMap;
use crate::error::{CompileError, CompileResult};

/// Shortest path `source..=dest` in the coupling graph with `excluded` removed.
///
/// Neighbors are visited in coupling insertion order, so the result is
/// deterministic. Fails with [`CompileError::NoPathFound`] if removing
/// `excluded` disconnects the two sites, or if either endpoint is `excluded`.
pub fn shortest_path_excluding(
    coupling: &CouplingMap,
    source: u32,
    dest: u32,
    excluded: u32,
) -> CompileResult<Vec<u32>> {
    let no_path = CompileError::NoPathFound {
        from: source,
        to: dest,
        excluded,
    };
    let n = coupling.num_qubits();
    if source == excluded || dest == excluded || source >= n || dest >= n {
        return Err(no_path);
    }
    if source == dest {
        return Ok(vec![source]);
    }

    let mut pred = vec![u32::MAX; n as usize];
    pred[source as usize] = source;
    let mut queue = VecDeque::from([source]);

    while let Some(current) = queue.pop_front() {
        for neighbor in coupling.neighbors(current) {
            if neighbor == excluded || pred[neighbor as usize] != u32::MAX {
                continue;
            }
            pred[neighbor as usize] = current;
            if neighbor == dest {
                let mut path = vec![dest];
                let mut at = dest;
                while at != source {
                    at = pred[at as usize];
                    path.push(at);
                }
                path.reverse();
                return Ok(path);
            }
            queue.push_back(neighbor);
        }
    }

    Err(no_path)
}

/// Swap chains that move a gate's operands onto a target edge.
///
/// `paths[i]` moves the operand currently on `sources[i]`; `None` means
/// that operand stays where it is. Applying a path means swapping every
/// consecutive pair of sites along it, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DualPath {
    /// Planned path for each source operand.
    pub paths: [Option<Vec<u32>>; 2],
}

impl DualPath {
    /// True when neither operand moves.
    pub fn is_empty(&self) -> bool {
        self.paths.iter().all(Option::is_none)
    }

    /// Every swap in application order.
    pub fn swaps(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.paths
            .iter()
            .flatten()
            .flat_map(|path| path.windows(2).map(|w| (w[0], w[1])))
    }

    /// Total number of swaps.
    pub fn num_swaps(&self) -> usize {
        self.paths
            .iter()
            .flatten()
            .map(|path| path.len().saturating_sub(1))
            .sum()
    }
}

/// Plan how the operands on `sources` reach the edge `dest`.
///
/// - An operand already on one of the destination sites does not move.
/// - If exactly one operand must move, it goes to the destination site the
///   other operand does not occupy.
/// - If both must move, the direct pairing (`sources[0] -> dest.0`,
///   `sources[1] -> dest.1`) and the crossed pairing are compared by total
///   path length; the shorter wins and ties go to the direct pairing.
///
/// Each operand's path avoids the other operand's current site.
pub fn plan_dual_path(
    coupling: &CouplingMap,
    sources: (u32, u32),
    dest: (u32, u32),
) -> CompileResult<DualPath> {
    let (s0, s1) = sources;
    let (d0, d1) = dest;
    let s0_placed = s0 == d0 || s0 == d1;
    let s1_placed = s1 == d0 || s1 == d1;

    let paths = match (s0_placed, s1_placed) {
        (true, true) => [None, None],
        (false, true) => {
            let target = if d0 == s1 { d1 } else { d0 };
            [Some(shortest_path_excluding(coupling, s0, target, s1)?), None]
        }
        (true, false) => {
            let target = if d0 == s0 { d1 } else { d0 };
            [None, Some(shortest_path_excluding(coupling, s1, target, s0)?)]
        }
        (false, false) => {
            let p00 = shortest_path_excluding(coupling, s0, d0, s1)?;
            let p01 = shortest_path_excluding(coupling, s0, d1, s1)?;
            let p10 = shortest_path_excluding(coupling, s1, d0, s0)?;
            let p11 = shortest_path_excluding(coupling, s1, d1, s0)?;
            if p00.len() + p11.len() <= p01.len() + p10.len() {
                [Some(p00), Some(p11)]
            } else {
                [Some(p01), Some(p10)]
            }
        }
    };

    Ok(DualPath { paths })
}
