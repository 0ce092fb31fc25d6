//! Error types for the `pulse-risk` crate.
//!
//! Almost every degradation in the engine is absorbed locally (bad geometry,
//! bad severity, failed lookups). Only the selection precondition surfaces
//! as [`RiskError`]; [`PolylineError`] is available to callers that want the
//! strict decoder.

/// Errors surfaced by the risk engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RiskError {
    /// Route selection was called with an empty candidate set.
    #[error("route selection requires at least one candidate")]
    NoCandidates,
}

/// Reasons an encoded polyline could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolylineError {
    /// A byte outside the printable polyline alphabet (`?` to `~`).
    #[error("invalid polyline byte {byte:#04x} at offset {offset}")]
    InvalidByte {
        /// The offending byte.
        byte: u8,
        /// Byte offset in the input.
        offset: usize,
    },

    /// The input ended while a value still had its continuation bit set.
    #[error("polyline truncated inside a value")]
    Truncated,

    /// A latitude was decoded without a matching longitude.
    #[error("polyline ended after a latitude without a longitude")]
    UnpairedLatitude,

    /// A single value used more 5-bit groups than fit in 32 bits.
    #[error("polyline value at offset {offset} is too long")]
    Overflow {
        /// Byte offset where the value started.
        offset: usize,
    },
}
