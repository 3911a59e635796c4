//! Kernel-specific error types.

use murmur_types::error::MurmurError;
use thiserror::Error;

/// Kernel error type wrapping MurmurError with boot-specific context.
#[derive(Error, Debug)]
pub enum KernelError {
    /// A wrapped MurmurError.
    #[error(transparent)]
    Murmur(#[from] MurmurError),

    /// The kernel failed to boot.
    #[error("Boot failed: {0}")]
    BootFailed(String),
}

/// Alias for kernel results.
pub type KernelResult<T> = Result<T, KernelError>;
