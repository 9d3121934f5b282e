//! Delivery agents.
//!
//! This module provides the transport agents and the factory that builds
//! them from fleet descriptors.

pub mod factory;
pub mod transport;

pub use factory::AgentSpec;
pub use transport::{Agent, AgentKind, TransitProfile, TransitTime};
