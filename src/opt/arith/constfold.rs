/*!

  Arithmetic constant folding.

  One pattern per arith op: it matches iff every input is defined by an
  `arith.const`, computes the folded constant when the operation's data
  type permits it, and replaces the op in place with a new constant.

  Integer folding wraps per two's-complement semantics of the 64-bit
  canonical storage. Integer division by zero and out-of-range shift
  amounts are skipped (no fold); float division delegates to IEEE, so Inf
  and NaN results are permitted.

*/

use crate::core::{CmpPredicate, ConstAttribute, OpId, Opcode, Operation, Region};
use crate::dialects::arith;
use crate::opt::pass::Pass;
use crate::opt::pattern::{Pattern, PatternPass, PatternRewriter};

const FOLDABLE: [Opcode; 13] = [
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::And,
    Opcode::Or,
    Opcode::Xor,
    Opcode::Not,
    Opcode::Sal,
    Opcode::Sar,
    Opcode::Shl,
    Opcode::Shr,
    Opcode::Cmp,
];

/// Constant attribute defining input `index` of `op`, if any.
pub(crate) fn const_input(region: &Region, op: &Operation, index: usize) -> Option<ConstAttribute> {
    let def = op.input(index).defining_op()?;
    region.op(def).attr().copied()
}

fn cmp_by<T: PartialOrd>(pred: CmpPredicate, a: T, b: T) -> bool {
    match pred {
        CmpPredicate::Eq => a == b,
        CmpPredicate::Neq => a != b,
        CmpPredicate::A => a > b,
        CmpPredicate::B => a < b,
        CmpPredicate::Ae => a >= b,
        CmpPredicate::Be => a <= b,
    }
}

fn fold_cmp(pred: CmpPredicate, x: ConstAttribute, y: ConstAttribute) -> Option<ConstAttribute> {
    use ConstAttribute::*;
    let res = match (x, y) {
        (UIntVal(a), UIntVal(b)) => cmp_by(pred, a, b),
        (SIntVal(a), SIntVal(b)) => cmp_by(pred, a, b),
        (FloatVal(a), FloatVal(b)) => cmp_by(pred, a, b),
        (BoolVal(a), BoolVal(b)) => cmp_by(pred, a, b),
        _ => return None,
    };
    Some(BoolVal(res))
}

fn fold_binary(opcode: Opcode, x: ConstAttribute, y: ConstAttribute) -> Option<ConstAttribute> {
    use ConstAttribute::*;
    match opcode {
        Opcode::Add => match (x, y) {
            (UIntVal(a), UIntVal(b)) => Some(UIntVal(a.wrapping_add(b))),
            (SIntVal(a), SIntVal(b)) => Some(SIntVal(a.wrapping_add(b))),
            (FloatVal(a), FloatVal(b)) => Some(FloatVal(a + b)),
            _ => None,
        },
        Opcode::Sub => match (x, y) {
            (UIntVal(a), UIntVal(b)) => Some(UIntVal(a.wrapping_sub(b))),
            (SIntVal(a), SIntVal(b)) => Some(SIntVal(a.wrapping_sub(b))),
            (FloatVal(a), FloatVal(b)) => Some(FloatVal(a - b)),
            _ => None,
        },
        Opcode::Mul => match (x, y) {
            (UIntVal(a), UIntVal(b)) => Some(UIntVal(a.wrapping_mul(b))),
            (SIntVal(a), SIntVal(b)) => Some(SIntVal(a.wrapping_mul(b))),
            (FloatVal(a), FloatVal(b)) => Some(FloatVal(a * b)),
            _ => None,
        },
        Opcode::Div => match (x, y) {
            // Integer division by zero is not folded.
            (UIntVal(_), UIntVal(0)) => None,
            (UIntVal(a), UIntVal(b)) => Some(UIntVal(a.wrapping_div(b))),
            (SIntVal(_), SIntVal(0)) => None,
            (SIntVal(a), SIntVal(b)) => Some(SIntVal(a.wrapping_div(b))),
            (FloatVal(a), FloatVal(b)) => Some(FloatVal(a / b)),
            _ => None,
        },
        Opcode::And => match (x, y) {
            (UIntVal(a), UIntVal(b)) => Some(UIntVal(a & b)),
            (SIntVal(a), SIntVal(b)) => Some(SIntVal(a & b)),
            _ => None,
        },
        Opcode::Or => match (x, y) {
            (UIntVal(a), UIntVal(b)) => Some(UIntVal(a | b)),
            (SIntVal(a), SIntVal(b)) => Some(SIntVal(a | b)),
            _ => None,
        },
        Opcode::Xor => match (x, y) {
            (UIntVal(a), UIntVal(b)) => Some(UIntVal(a ^ b)),
            (SIntVal(a), SIntVal(b)) => Some(SIntVal(a ^ b)),
            _ => None,
        },
        Opcode::Sal => match (x, y) {
            (SIntVal(a), SIntVal(s)) if (0..64).contains(&s) => Some(SIntVal(a << s)),
            _ => None,
        },
        Opcode::Sar => match (x, y) {
            (SIntVal(a), SIntVal(s)) if (0..64).contains(&s) => Some(SIntVal(a >> s)),
            _ => None,
        },
        Opcode::Shl => match (x, y) {
            (UIntVal(a), UIntVal(s)) if s < 64 => Some(UIntVal(a << s)),
            _ => None,
        },
        Opcode::Shr => match (x, y) {
            (UIntVal(a), UIntVal(s)) if s < 64 => Some(UIntVal(a >> s)),
            _ => None,
        },
        _ => None,
    }
}

struct ConstFoldPattern {
    opcode: Opcode,
}

impl Pattern for ConstFoldPattern {
    fn match_and_rewrite(&self, op: OpId, rewriter: &mut PatternRewriter) -> bool {
        let folded = {
            let region = rewriter.region();
            let operation = region.op(op);
            if !operation.isa(self.opcode) {
                return false;
            }

            let mut attrs = Vec::with_capacity(operation.inputs_num());
            for index in 0..operation.inputs_num() {
                match const_input(region, operation, index) {
                    Some(attr) => attrs.push(attr),
                    None => return false,
                }
            }

            match self.opcode {
                Opcode::Not => match attrs[0] {
                    ConstAttribute::UIntVal(a) => Some(ConstAttribute::UIntVal(!a)),
                    ConstAttribute::SIntVal(a) => Some(ConstAttribute::SIntVal(!a)),
                    _ => None,
                },
                Opcode::Cmp => fold_cmp(operation.predicate().unwrap(), attrs[0], attrs[1]),
                _ => fold_binary(self.opcode, attrs[0], attrs[1]),
            }
        };

        match folded {
            Some(attr) => {
                rewriter.replace_op_with(op, arith::constant(attr));
                true
            }
            None => false,
        }
    }
}

pub struct ArithConstFoldPass {
    patterns: PatternPass,
}

impl ArithConstFoldPass {
    pub fn new() -> ArithConstFoldPass {
        let mut patterns = PatternPass::new("arith-const-fold");
        for opcode in FOLDABLE {
            patterns.add_pattern(Box::new(ConstFoldPattern { opcode }));
        }
        ArithConstFoldPass { patterns }
    }
}

impl Default for ArithConstFoldPass {
    fn default() -> ArithConstFoldPass {
        ArithConstFoldPass::new()
    }
}

impl Pass for ArithConstFoldPass {
    fn name(&self) -> &'static str {
        self.patterns.name()
    }

    fn run(&self, region: &mut Region) -> bool {
        self.patterns.run(region)
    }
}
