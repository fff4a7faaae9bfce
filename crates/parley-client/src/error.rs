//! Client error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// An operation was attempted outside the connected state. The
    /// message is the text reported through the event sink.
    #[error("{0}")]
    StateViolation(&'static str),

    #[error("transport error: {0}")]
    Transport(#[from] parley_transport::TransportError),

    #[error("decode error: {0}")]
    Decode(#[from] parley_core::Error),

    #[error("client error: {0}")]
    Other(String),
}
