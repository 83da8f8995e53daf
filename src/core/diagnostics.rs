//! The library error channel.
//!
//! Only two failure classes are recoverable: malformed construction input
//! (`Shape`) and structural verification failures (`Verification`). Stale
//! analysis queries and rewriter misuse are programmer errors and panic at
//! the offending call site.

use std::error::Error;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IrisError {
    /// Malformed construction input; the object was never created.
    Shape(String),
    /// An IR structural invariant is violated; the IR is left as-is.
    Verification(String),
}

impl IrisError {
    pub fn message(&self) -> &str {
        match self {
            IrisError::Shape(msg) => msg,
            IrisError::Verification(msg) => msg,
        }
    }
}

impl fmt::Display for IrisError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IrisError::Shape(msg) => write!(f, "shape error: {}", msg),
            IrisError::Verification(msg) => write!(f, "verification failed: {}", msg),
        }
    }
}

impl Error for IrisError {}

pub type Result<T> = std::result::Result<T, IrisError>;
