//! Dead-code elimination.
//!
//! A single pattern erases any operation that produces a result nobody
//! uses, as long as it is side-effect-free and not a terminator. The
//! fixed-point driver makes chains of dead operations collapse within one
//! pass run. `builtin.param` is never removed: function signatures are
//! considered fixed.

use crate::core::{OpId, Opcode, Region};
use crate::opt::pass::Pass;
use crate::opt::pattern::{Pattern, PatternPass, PatternRewriter};

struct DCEPattern;

impl Pattern for DCEPattern {
    fn match_and_rewrite(&self, op: OpId, rewriter: &mut PatternRewriter) -> bool {
        {
            let operation = rewriter.region().op(op);
            if !operation.has_result()
                || operation.has_users()
                || operation.is_terminator()
                || operation.has_side_effects()
                || operation.isa(Opcode::Param)
            {
                return false;
            }
        }
        rewriter.erase_op(op);
        true
    }
}

pub struct DCEPass {
    patterns: PatternPass,
}

impl DCEPass {
    pub fn new() -> DCEPass {
        let mut patterns = PatternPass::new("dce");
        patterns.add_pattern(Box::new(DCEPattern));
        DCEPass { patterns }
    }
}

impl Default for DCEPass {
    fn default() -> DCEPass {
        DCEPass::new()
    }
}

impl Pass for DCEPass {
    fn run(&self, region: &mut Region) -> bool {
        self.patterns.run(region)
    }

    fn name(&self) -> &'static str {
        self.patterns.name()
    }
}
