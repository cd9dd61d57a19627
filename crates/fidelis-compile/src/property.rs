//! `PropertySet` for pass communication.
//!
//! This module provides the [`PropertySet`] type, which enables compilation
//! passes to share data with each other. It contains standard properties
//! (layout, coupling map, accuracy graph) and supports arbitrary custom
//! properties keyed by type.
//!
//! # Overview
//!
//! - **Layout passes** decide which logical qubit starts on which site
//! - **Routing passes** read the coupling map and accuracy graph, insert
//!   swaps, and leave the final layout behind
//! - **Analysis passes** publish results such as
//!   [`RoutingStats`](crate::passes::RoutingStats) or
//!   [`FidelityEstimate`](crate::passes::FidelityEstimate) as custom
//!   properties
//!
//! # Examples
//!
//! ```
//! use fidelis_compile::{AccuracyGraph, CouplingMap, PropertySet};
//!
//! let coupling = CouplingMap::ring(4);
//! let accuracy = AccuracyGraph::uniform(&coupling, 0.99).unwrap();
//! let props = PropertySet::new().with_target(coupling, accuracy);
//!
//! assert!(props.coupling_map.is_some());
//! assert_eq!(props.accuracy.as_ref().unwrap().weight(3, 0), Some(0.99));
//! ```
//!
//! ## Custom properties for pass communication
//!
//! ```
//! use fidelis_compile::PropertySet;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct SwapBudget(usize);
//!
//! let mut props = PropertySet::new();
//! props.insert(SwapBudget(12));
//! assert_eq!(props.get::<SwapBudget>(), Some(&SwapBudget(12)));
//! ```

use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};

use crate::accuracy::AccuracyGraph;
use crate::coupling::CouplingMap;
use crate::layout::Layout;

/// Properties shared between compilation passes.
///
/// # Standard Properties
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | `layout` | [`Layout`] | Logical-to-physical qubit mapping |
/// | `coupling_map` | [`CouplingMap`] | Device connectivity graph |
/// | `accuracy` | [`AccuracyGraph`] | Per-edge two-qubit gate fidelity |
///
/// # Custom Properties
///
/// Passes can store arbitrary data using the type-safe [`insert`](Self::insert)
/// and [`get`](Self::get) methods. Each type can have at most one value stored.
#[derive(Debug, Default)]
pub struct PropertySet {
    /// Qubit layout mapping (logical → physical).
    ///
    /// Set by layout passes before routing; replaced by the final layout
    /// once routing has run.
    pub layout: Option<Layout>,

    /// Target coupling map defining allowed two-qubit interactions.
    pub coupling_map: Option<CouplingMap>,

    /// Per-edge accuracy of the target.
    ///
    /// Required by noise-aware routing and fidelity analysis.
    pub accuracy: Option<AccuracyGraph>,

    /// Custom properties storage (type-erased).
    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertySet {
    /// Create a new empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target coupling map and accuracy graph.
    #[must_use]
    pub fn with_target(mut self, coupling_map: CouplingMap, accuracy: AccuracyGraph) -> Self {
        self.coupling_map = Some(coupling_map);
        self.accuracy = Some(accuracy);
        self
    }

    /// Set the layout.
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Insert a custom property.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a custom property.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Get a mutable custom property.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.custom
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut())
    }

    /// Remove a custom property.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }
}
