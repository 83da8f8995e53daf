//! The transformation framework: local match-and-rewrite patterns, the
//! worklist driver applying them to a fixed point, pass composition, and
//! the bundled optimization passes.

pub mod arith;
pub mod common;

mod pass;
mod pattern;

pub use self::{
    pass::{Pass, PassManager},
    pattern::{Pattern, PatternPass, PatternRewriter},
};
