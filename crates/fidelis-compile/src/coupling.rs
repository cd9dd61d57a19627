//! Hardware topology model.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::{CompileError, CompileResult};

/// Serialized form of a [`CouplingMap`]: site count plus raw edge list.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawCouplingMap {
    num_qubits: u32,
    edges: Vec<(u32, u32)>,
}

/// Target device coupling map.
///
/// The coupling map defines which pairs of physical sites can interact
/// with two-qubit gates. Couplings are undirected: a raw list containing
/// both `(a, b)` and `(b, a)` describes a single edge.
///
/// ## Performance
///
/// On construction, distance and predecessor matrices are precomputed using
/// BFS from each site. This gives O(1) `distance()` lookups and
/// O(distance) path reconstruction during routing. BFS visits neighbors in
/// edge insertion order, so paths are deterministic for a fixed edge list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawCouplingMap", into = "RawCouplingMap")]
pub struct CouplingMap {
    /// Deduplicated edges in insertion order.
    edges: Vec<(u32, u32)>,
    /// Number of physical sites.
    num_qubits: u32,
    /// `adjacency[q]` lists the neighbors of `q` in insertion order.
    adjacency: Vec<Vec<u32>>,
    /// `dist_matrix[from][to]` is the hop count, or `u32::MAX` if unreachable.
    dist_matrix: Vec<Vec<u32>>,
    /// `pred_matrix[from][to]` is the site before `to` on the path from `from`.
    pred_matrix: Vec<Vec<u32>>,
}

impl CouplingMap {
    /// Create a coupling map with the given number of sites and no edges.
    pub fn new(num_qubits: u32) -> Self {
        let mut map = Self {
            edges: vec![],
            num_qubits,
            adjacency: vec![Vec::new(); num_qubits as usize],
            dist_matrix: vec![],
            pred_matrix: vec![],
        };
        map.precompute_distances();
        map
    }

    /// Build a coupling map from a raw coupling list.
    ///
    /// Duplicates and reversed pairs are tolerated and collapsed. Fails with
    /// [`CompileError::InvalidConfiguration`] on self-loops or sites outside
    /// `0..num_qubits`.
    pub fn from_edges(
        num_qubits: u32,
        edges: impl IntoIterator<Item = (u32, u32)>,
    ) -> CompileResult<Self> {
        let mut map = Self {
            edges: vec![],
            num_qubits,
            adjacency: vec![Vec::new(); num_qubits as usize],
            dist_matrix: vec![],
            pred_matrix: vec![],
        };
        for (q1, q2) in edges {
            if q1 >= num_qubits || q2 >= num_qubits {
                return Err(CompileError::InvalidConfiguration(format!(
                    "coupling ({q1}, {q2}) references a site outside 0..{num_qubits}"
                )));
            }
            if q1 == q2 {
                return Err(CompileError::InvalidConfiguration(format!(
                    "coupling ({q1}, {q2}) is a self-loop"
                )));
            }
            map.add_edge(q1, q2);
        }
        map.precompute_distances();
        Ok(map)
    }

    /// Add an edge, ignoring duplicates in either direction.
    fn add_edge(&mut self, q1: u32, q2: u32) {
        if self.is_connected(q1, q2) {
            return;
        }
        self.edges.push((q1, q2));
        self.adjacency[q1 as usize].push(q2);
        self.adjacency[q2 as usize].push(q1);
    }

    /// Precompute all-pairs shortest paths using BFS from each site.
    #[allow(clippy::cast_possible_truncation)]
    fn precompute_distances(&mut self) {
        let n = self.num_qubits as usize;
        self.dist_matrix = vec![vec![u32::MAX; n]; n];
        self.pred_matrix = vec![vec![u32::MAX; n]; n];

        for src in 0..n {
            self.dist_matrix[src][src] = 0;
            let mut queue = VecDeque::new();
            queue.push_back(src as u32);

            while let Some(current) = queue.pop_front() {
                let cur = current as usize;
                for &neighbor in &self.adjacency[cur] {
                    let nb = neighbor as usize;
                    if self.dist_matrix[src][nb] == u32::MAX {
                        self.dist_matrix[src][nb] = self.dist_matrix[src][cur] + 1;
                        self.pred_matrix[src][nb] = current;
                        queue.push_back(neighbor);
                    }
                }
            }
        }
    }

    /// Check if two sites are directly connected.
    #[inline]
    pub fn is_connected(&self, q1: u32, q2: u32) -> bool {
        self.adjacency
            .get(q1 as usize)
            .is_some_and(|neighbors| neighbors.contains(&q2))
    }

    /// Get the number of physical sites.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Get the coupling edges in insertion order.
    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    /// Every coupling once as `(min, max)`, in ascending order.
    pub fn edges_deduplicated(&self) -> Vec<(u32, u32)> {
        let mut edges: Vec<_> = self
            .edges
            .iter()
            .map(|&(a, b)| (a.min(b), a.max(b)))
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Get neighbors of a site in insertion order.
    pub fn neighbors(&self, qubit: u32) -> impl Iterator<Item = u32> + '_ {
        self.adjacency
            .get(qubit as usize)
            .map(|v| v.iter().copied())
            .into_iter()
            .flatten()
    }

    /// Shortest hop count between two sites, `None` if unreachable.
    pub fn distance(&self, from: u32, to: u32) -> Option<u32> {
        let d = *self.dist_matrix.get(from as usize)?.get(to as usize)?;
        (d != u32::MAX).then_some(d)
    }

    /// Like [`distance`](Self::distance), failing with
    /// [`CompileError::DisconnectedGraph`] if no path exists.
    pub fn try_distance(&self, from: u32, to: u32) -> CompileResult<u32> {
        self.distance(from, to)
            .ok_or(CompileError::DisconnectedGraph {
                qubit1: from,
                qubit2: to,
            })
    }

    /// Reconstruct a shortest path `from..=to` from the predecessor matrix.
    /// Returns `None` if no path exists.
    pub fn shortest_path(&self, from: u32, to: u32) -> Option<Vec<u32>> {
        self.distance(from, to)?;

        let preds = &self.pred_matrix[from as usize];
        let mut path = vec![to];
        let mut current = to;
        while current != from {
            current = preds[current as usize];
            path.push(current);
        }
        path.reverse();
        Some(path)
    }

    /// Like [`shortest_path`](Self::shortest_path), failing with
    /// [`CompileError::DisconnectedGraph`] if no path exists.
    pub fn try_shortest_path(&self, from: u32, to: u32) -> CompileResult<Vec<u32>> {
        self.shortest_path(from, to)
            .ok_or(CompileError::DisconnectedGraph {
                qubit1: from,
                qubit2: to,
            })
    }

    /// Check that every site can reach every other site.
    pub fn is_connected_graph(&self) -> bool {
        self.dist_matrix
            .iter()
            .all(|row| row.iter().all(|&d| d != u32::MAX))
    }

    /// Create a linear coupling map (0-1-2-3-...).
    pub fn linear(n: u32) -> Self {
        let mut map = Self::new(n);
        for i in 0..n.saturating_sub(1) {
            map.add_edge(i, i + 1);
        }
        map.precompute_distances();
        map
    }

    /// Create a ring coupling map (linear plus the closing edge `n-1`-`0`).
    pub fn ring(n: u32) -> Self {
        let mut map = Self::new(n);
        for i in 0..n.saturating_sub(1) {
            map.add_edge(i, i + 1);
        }
        if n > 2 {
            map.add_edge(n - 1, 0);
        }
        map.precompute_distances();
        map
    }

    /// Create a `rows` x `cols` grid with row-major site numbering.
    pub fn grid(rows: u32, cols: u32) -> Self {
        let mut map = Self::new(rows * cols);
        for r in 0..rows {
            for c in 0..cols.saturating_sub(1) {
                map.add_edge(r * cols + c, r * cols + c + 1);
            }
        }
        for r in 0..rows.saturating_sub(1) {
            for c in 0..cols {
                map.add_edge(r * cols + c, (r + 1) * cols + c);
            }
        }
        map.precompute_distances();
        map
    }

    /// Create a fully connected coupling map.
    pub fn full(n: u32) -> Self {
        let mut map = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                map.add_edge(i, j);
            }
        }
        map.precompute_distances();
        map
    }

    /// Create a star topology (center site connected to all others).
    pub fn star(n: u32) -> Self {
        let mut map = Self::new(n);
        for i in 1..n {
            map.add_edge(0, i);
        }
        map.precompute_distances();
        map
    }

    /// The 7-site H-shaped topology of IBM's Jakarta-class devices.
    pub fn jakarta() -> Self {
        let mut map = Self::new(7);
        for (a, b) in [(0, 1), (1, 2), (1, 3), (3, 5), (4, 5), (5, 6)] {
            map.add_edge(a, b);
        }
        map.precompute_distances();
        map
    }

    /// Resolve a preset by name, e.g. `ring:4`, `grid:2x4`, `jakarta`.
    pub fn from_preset(spec: &str) -> CompileResult<Self> {
        let invalid = || CompileError::InvalidConfiguration(format!("unknown topology '{spec}'"));
        let (kind, arg) = spec.split_once(':').unwrap_or((spec, ""));
        let size = || arg.parse::<u32>().map_err(|_| invalid());

        match kind {
            "linear" => Ok(Self::linear(size()?)),
            "ring" => Ok(Self::ring(size()?)),
            "star" => Ok(Self::star(size()?)),
            "full" => Ok(Self::full(size()?)),
            "grid" => {
                let (rows, cols) = arg.split_once('x').ok_or_else(invalid)?;
                let rows = rows.parse().map_err(|_| invalid())?;
                let cols = cols.parse().map_err(|_| invalid())?;
                Ok(Self::grid(rows, cols))
            }
            "jakarta" if arg.is_empty() => Ok(Self::jakarta()),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<RawCouplingMap> for CouplingMap {
    type Error = CompileError;

    fn try_from(raw: RawCouplingMap) -> CompileResult<Self> {
        Self::from_edges(raw.num_qubits, raw.edges)
    }
}

impl From<CouplingMap> for RawCouplingMap {
    fn from(map: CouplingMap) -> Self {
        Self {
            num_qubits: map.num_qubits,
            edges: map.edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coupling_map_linear() {
        let map = CouplingMap::linear(5);
        assert!(map.is_connected(0, 1));
        assert!(map.is_connected(1, 2));
        assert!(!map.is_connected(0, 2));
        assert_eq!(map.distance(0, 4), Some(4));
        assert_eq!(map.shortest_path(0, 3), Some(vec![0, 1, 2, 3]));
    }

    #[test]
    fn test_coupling_map_star() {
        let map = CouplingMap::star(5);
        assert!(map.is_connected(0, 4));
        assert!(!map.is_connected(1, 2));
        assert_eq!(map.distance(1, 2), Some(2));
    }

    #[test]
    fn test_ring_paths_are_deterministic() {
        let map = CouplingMap::ring(4);
        assert_eq!(map.distance(0, 2), Some(2));
        // Site 0 lists neighbor 1 before neighbor 3.
        assert_eq!(map.shortest_path(0, 2), Some(vec![0, 1, 2]));
        assert_eq!(map.shortest_path(2, 2), Some(vec![2]));
    }

    #[test]
    fn test_from_edges_deduplicates() {
        let map =
            CouplingMap::from_edges(4, [(0, 1), (1, 0), (1, 2), (2, 1), (2, 3), (3, 0), (0, 3)])
                .unwrap();
        assert_eq!(map.edges().len(), 4);
        assert_eq!(
            map.edges_deduplicated(),
            vec![(0, 1), (0, 3), (1, 2), (2, 3)]
        );
    }

    #[test]
    fn test_from_edges_rejects_bad_sites() {
        assert!(CouplingMap::from_edges(2, [(0, 2)]).is_err());
        assert!(CouplingMap::from_edges(2, [(1, 1)]).is_err());
    }

    #[test]
    fn test_disconnected_sites() {
        let map = CouplingMap::from_edges(4, [(0, 1), (2, 3)]).unwrap();
        assert_eq!(map.distance(0, 3), None);
        assert!(!map.is_connected_graph());
        assert!(matches!(
            map.try_shortest_path(0, 3),
            Err(CompileError::DisconnectedGraph {
                qubit1: 0,
                qubit2: 3
            })
        ));
    }

    #[test]
    fn test_grid_and_jakarta() {
        let grid = CouplingMap::grid(2, 4);
        assert_eq!(grid.num_qubits(), 8);
        assert!(grid.is_connected(0, 4));
        assert!(grid.is_connected(3, 7));
        assert_eq!(grid.edges().len(), 10);

        let jakarta = CouplingMap::jakarta();
        assert_eq!(jakarta.distance(0, 6), Some(4));
        assert!(jakarta.is_connected_graph());
    }

    #[test]
    fn test_presets_by_name() {
        assert_eq!(CouplingMap::from_preset("ring:5").unwrap().edges().len(), 5);
        assert_eq!(CouplingMap::from_preset("grid:2x3").unwrap().num_qubits(), 6);
        assert_eq!(CouplingMap::from_preset("jakarta").unwrap().num_qubits(), 7);
        assert!(CouplingMap::from_preset("ring").is_err());
        assert!(CouplingMap::from_preset("hexagon:6").is_err());
    }

    #[test]
    fn test_serde_rebuilds_caches() {
        let map = CouplingMap::ring(4);
        let json = serde_json::to_string(&map).unwrap();
        let back: CouplingMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back.distance(0, 2), Some(2));
        assert_eq!(back.shortest_path(0, 2), map.shortest_path(0, 2));
    }
}
