//! Target-specific compilation passes.
//!
//! These passes require target hardware properties from the PropertySet
//! (coupling map, accuracy graph, layout) and produce circuits that run on
//! the target's coupling graph.

pub mod fidelity;
pub mod layout;
pub mod noise_aware;
pub mod routing;
pub mod verification;

pub use fidelity::{FidelityAnalysis, FidelityEstimate};
pub use layout::{SetLayout, TrivialLayout};
pub use noise_aware::NoiseAwareRouting;
pub use routing::{
    BasicRouting, ROUTING_SWAP_LABEL, Routed, RoutingContext, RoutingPass, RoutingStats,
    is_routing_swap,
};
pub use verification::{ConnectivityVerification, VerificationResult};
