//! Optimization passes over the `arith` dialect.

mod constfold;
mod peephole;

pub use self::{constfold::ArithConstFoldPass, peephole::ArithPeepHolePass};
