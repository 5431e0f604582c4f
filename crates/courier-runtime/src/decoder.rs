//! Turning raw transport bytes into [`Update`]s.
//!
//! The runtime never parses bytes itself; it goes through a [`Decoder`].
//! [`JsonDecoder`] handles the Bot API's JSON, and any
//! `Fn(&[u8]) -> Result<Update, DecodeError>` closure is a decoder too.

use courier_core::Update;
use thiserror::Error;

/// Why a payload could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes were not a valid JSON update.
    #[error("invalid update JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A custom decoder rejected the bytes.
    #[error("{0}")]
    Rejected(String),
}

impl DecodeError {
    /// Creates a rejection with the given reason.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }
}

/// Decodes one transport payload into an update.
pub trait Decoder: Send + Sync + 'static {
    fn decode(&self, bytes: &[u8]) -> Result<Update, DecodeError>;
}

/// Decodes Bot API JSON with `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Update, DecodeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl<F> Decoder for F
where
    F: Fn(&[u8]) -> Result<Update, DecodeError> + Send + Sync + 'static,
{
    fn decode(&self, bytes: &[u8]) -> Result<Update, DecodeError> {
        self(bytes)
    }
}
