//! Logical-to-physical qubit assignment.

use serde::{Deserialize, Serialize};

use fidelis_ir::QubitId;

use crate::error::{CompileError, CompileResult};

/// A bijection between logical qubits and physical sites.
///
/// Both directions are stored as dense vectors, so lookups and swaps are
/// O(1). A layout always covers `0..len()` on both sides; it serializes as
/// the logical-to-physical vector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct Layout {
    /// `logical_to_physical[l]` is the site holding logical qubit `l`.
    logical_to_physical: Vec<u32>,
    /// `physical_to_logical[p]` is the logical qubit resident on site `p`.
    physical_to_logical: Vec<u32>,
}

impl Layout {
    /// Create an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a trivial layout (logical qubit i -> physical qubit i).
    pub fn trivial(num_qubits: u32) -> Self {
        let identity: Vec<u32> = (0..num_qubits).collect();
        Self {
            logical_to_physical: identity.clone(),
            physical_to_logical: identity,
        }
    }

    /// Build a layout from `physical[l]`, the site of logical qubit `l`.
    ///
    /// Fails with [`CompileError::InvalidLayout`] unless `physical` is a
    /// permutation of `0..physical.len()`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_physical(physical: Vec<u32>) -> CompileResult<Self> {
        let n = physical.len();
        let mut inverse = vec![u32::MAX; n];
        for (logical, &site) in physical.iter().enumerate() {
            let slot = inverse.get_mut(site as usize).ok_or_else(|| {
                CompileError::InvalidLayout(format!(
                    "site {site} is out of range for a {n}-qubit layout"
                ))
            })?;
            if *slot != u32::MAX {
                return Err(CompileError::InvalidLayout(format!(
                    "site {site} is assigned to both q{} and q{logical}",
                    *slot
                )));
            }
            *slot = logical as u32;
        }
        Ok(Self {
            logical_to_physical: physical,
            physical_to_logical: inverse,
        })
    }

    /// Get the physical site of a logical qubit.
    #[inline]
    pub fn get_physical(&self, logical: QubitId) -> Option<u32> {
        self.logical_to_physical.get(logical.index()).copied()
    }

    /// Get the logical qubit resident on a physical site.
    #[inline]
    pub fn get_logical(&self, physical: u32) -> Option<QubitId> {
        self.physical_to_logical
            .get(physical as usize)
            .map(|&l| QubitId(l))
    }

    /// Exchange the logical qubits resident on two physical sites.
    ///
    /// # Panics
    ///
    /// Panics if either site is outside the layout.
    #[allow(clippy::cast_possible_truncation)]
    pub fn swap(&mut self, p1: u32, p2: u32) {
        let (p1, p2) = (p1 as usize, p2 as usize);
        self.physical_to_logical.swap(p1, p2);
        self.logical_to_physical[self.physical_to_logical[p1] as usize] = p1 as u32;
        self.logical_to_physical[self.physical_to_logical[p2] as usize] = p2 as u32;
    }

    /// Check that both directions agree and cover every site exactly once.
    pub fn is_bijection(&self) -> bool {
        let n = self.logical_to_physical.len();
        if self.physical_to_logical.len() != n {
            return false;
        }
        let mut seen = vec![false; n];
        for (logical, &site) in self.logical_to_physical.iter().enumerate() {
            let site = site as usize;
            if site >= n || seen[site] || self.physical_to_logical[site] as usize != logical {
                return false;
            }
            seen[site] = true;
        }
        true
    }

    /// The site of every logical qubit, indexed by logical qubit.
    pub fn to_physical_vec(&self) -> Vec<u32> {
        self.logical_to_physical.clone()
    }

    /// Number of qubits covered.
    pub fn len(&self) -> usize {
        self.logical_to_physical.len()
    }

    /// Check if the layout is empty.
    pub fn is_empty(&self) -> bool {
        self.logical_to_physical.is_empty()
    }

    /// Iterate over (logical, physical) pairs in logical order.
    #[allow(clippy::cast_possible_truncation)]
    pub fn iter(&self) -> impl Iterator<Item = (QubitId, u32)> + '_ {
        self.logical_to_physical
            .iter()
            .enumerate()
            .map(|(l, &p)| (QubitId(l as u32), p))
    }
}

impl TryFrom<Vec<u32>> for Layout {
    type Error = CompileError;

    fn try_from(physical: Vec<u32>) -> CompileResult<Self> {
        Self::from_physical(physical)
    }
}

impl From<Layout> for Vec<u32> {
    fn from(layout: Layout) -> Self {
        layout.logical_to_physical
    }
}
