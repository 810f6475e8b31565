use thiserror::Error;

/// Configuration errors, detected at construction.
///
/// Every variant reflects a programming mistake or an exhausted memory
/// budget, not a runtime condition: a filter that fails to construct must
/// never reach the sampling loop.  Processing calls themselves are
/// infallible.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterError {
    #[error("coefficient slice is empty")]
    NoCoefficients,

    #[error("expected 5 coefficients per biquad section, got {0} total")]
    PartialSection(usize),

    #[error("block size must be at least 1")]
    InvalidBlockSize,

    #[error("failed to allocate state buffer of {0} samples")]
    OutOfMemory(usize),
}

pub type Result<T> = core::result::Result<T, FilterError>;
