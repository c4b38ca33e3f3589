//! shippr - review and merge pull requests from the terminal
//!
//! The library holds everything that can be exercised without a terminal:
//! the provider gateway, the organization-wide aggregator, the workflow
//! state machine with its driver, and the pure rendering functions.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod provider;
pub mod render;
pub mod types;
pub mod workflow;
