//! Mock templating/delivery provider.
//!
//! A local stand-in for the remote provider: the same HTTP contract, with
//! outcomes rolled from a configurable simulation profile instead of real
//! delivery. Ratios of zero make every send deterministic, which is what
//! the test suites use.

pub mod config;
pub mod error;
pub mod server;
pub mod templates;

pub use config::{ProviderConfig, SimulationProfile};
pub use error::ProviderError;
pub use server::ProviderServer;
