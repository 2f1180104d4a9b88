//! Campaign orchestration engine.
//!
//! This crate drives one campaign run: it walks the roster row by row,
//! dispatches an email attempt per row through the delivery client, applies
//! the SMS failover policy on bounce, commits per-row state transitions,
//! and publishes progress. Runs are operator-cancellable and per-row
//! failures never abort the pass.

pub mod client;
pub mod error;
pub mod failover;
pub mod runner;

pub use client::{DeliveryClient, EmailRequest, HttpDeliveryClient, SmsRequest};
pub use error::{ClientError, RunError};
pub use failover::FailoverPolicy;
pub use herald_common::{ApiResponse, DeliveryOutcome, SendStatus};
pub use runner::{CampaignRunner, RunConfig, RunOutcome, RunProgress, RunReport};
