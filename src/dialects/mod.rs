//! Operation dialects shipped with the framework.
//!
//! A dialect is a named family of operation kinds sharing a namespace and a
//! printing prefix. Constructors produce detached [`Operation`] values that
//! are bound to their defining inputs once inserted into a region; the
//! per-op verifiers below are dispatched from the block verifier.

pub mod arith;
pub mod builtin;
pub mod ctrlflow;

use crate::core::{Operation, Region};

/// Verifies a single operation against its dialect contract. Errors carry
/// the human-facing message reported through region verification.
pub fn verify_op(op: &Operation, region: &Region) -> Result<(), String> {
    for (index, input) in op.inputs().iter().enumerate() {
        if input.is_empty() {
            return Err(format!(
                "{}.{}'s input #{} is empty!",
                op.dialect_name(),
                op.mnemonic(),
                index
            ));
        }
    }

    match op.dialect_name() {
        "arith" => arith::verify(op, region),
        "builtin" => builtin::verify(op, region),
        "ctrlflow" => ctrlflow::verify(op, region),
        _ => Ok(()),
    }
}
