use std::result;

use thiserror::Error;

/// Errors returned by [`PoolRegistry`][crate::PoolRegistry] operations.
///
/// Every error is raised before the operation mutates any state, so a failed call leaves
/// the registry and all of its pools exactly as they were.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller passed an argument that the operation cannot accept, such as a negative
    /// capacity or a pool size larger than the configured maximum capacity.
    #[error("invalid argument '{argument}': {problem}")]
    InvalidArgument {
        /// Name of the offending argument.
        argument: &'static str,

        /// A human-readable description of the problem.
        problem: String,
    },
}

/// A specialized `Result` type for pool registry operations, returning the crate's
/// [`Error`] type as the error value.
pub type Result<T> = result::Result<T, Error>;
