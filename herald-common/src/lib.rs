pub mod logging;
pub mod outcome;
pub mod status;
pub mod templates;

pub use outcome::{ApiResponse, DeliveryOutcome};
pub use status::SendStatus;
pub use templates::{EmailTemplate, SmsTemplate};

pub use tracing;

/// Shutdown vocabulary broadcast to long-running components.
#[derive(Debug, Clone, Copy)]
pub enum Signal {
    Shutdown,
}
