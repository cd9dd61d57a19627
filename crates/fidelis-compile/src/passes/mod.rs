//! Built-in compilation passes.
//!
//! All passes here need target properties from the [`PropertySet`]
//! (coupling map, accuracy graph, layout); see [`target`].
//!
//! [`PropertySet`]: crate::PropertySet

pub mod target;

pub use target::{
    BasicRouting, ConnectivityVerification, FidelityAnalysis, FidelityEstimate,
    NoiseAwareRouting, ROUTING_SWAP_LABEL, Routed, RoutingContext, RoutingPass, RoutingStats,
    SetLayout, TrivialLayout, VerificationResult, is_routing_swap,
};
