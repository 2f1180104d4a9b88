use std::io;

use thiserror::Error;

/// Errors from the mock provider server.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Failed to bind the listen socket.
    #[error("Failed to bind provider to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    /// The server loop failed.
    #[error("Provider server error: {0}")]
    Server(String),
}
