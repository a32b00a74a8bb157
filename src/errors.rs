use std::collections::TryReserveError;

/// All the ways a pair list build or a site assembly can fail.
///
/// Errors are fatal to the call that produced them: there are no retries and
/// no partial results. The messages identify the failing invariant and, where
/// it makes sense, suggest a remediation.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum Error {
    /// The cell matrix is degenerate (`|det| < 1e-12`)
    ZeroVolume(String),
    /// The bin grid does not fit the requested index type
    BinGridTooLarge(String),
    /// The cutoff is not a strictly positive finite number
    InvalidCutoff(String),
    /// Invalid n-body order, or an n-body iteration over an unsorted list
    InvalidArity(String),
    /// An allocation for the bin or pair arrays failed
    AllocationFailure(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ZeroVolume(e) => write!(f, "degenerate cell: {}", e),
            Error::BinGridTooLarge(e) => write!(f, "bin grid too large: {}", e),
            Error::InvalidCutoff(e) => write!(f, "invalid cutoff: {}", e),
            Error::InvalidArity(e) => write!(f, "invalid n-body arity: {}", e),
            Error::AllocationFailure(e) => write!(f, "allocation failure: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<TryReserveError> for Error {
    fn from(error: TryReserveError) -> Error {
        Error::AllocationFailure(error.to_string())
    }
}
