/*!

  Algebraic peephole rewrites over the `arith` dialect.

  Identity patterns (`x + 0`, `x * 1`, `x & 1…1`, …) forward the surviving
  value to every user and erase the matched op. Absorbing patterns
  (`x * 0`, `x | 1…1`, `x ^ x`, …) replace the op with the absorbing
  constant. The constant-rotation patterns rewrite `(x + C1) + C2` into
  `x + (C1 + C2)` in place, which a subsequent constant-fold collapses; the
  rotation only fires while the inner form is not canonical, so the pass
  converges.

*/

use crate::core::{ConstAttribute, DataType, OpId, Opcode, Operation, Region};
use crate::dialects::arith;
use super::constfold::const_input;
use crate::opt::pass::Pass;
use crate::opt::pattern::{Pattern, PatternPass, PatternRewriter};

fn zero_attr(data_type: DataType) -> Option<ConstAttribute> {
    match data_type {
        DataType::UInt => Some(ConstAttribute::UIntVal(0)),
        DataType::SInt => Some(ConstAttribute::SIntVal(0)),
        _ => None,
    }
}

fn all_ones_attr(data_type: DataType) -> Option<ConstAttribute> {
    match data_type {
        DataType::UInt => Some(ConstAttribute::UIntVal(u64::MAX)),
        DataType::SInt => Some(ConstAttribute::SIntVal(-1)),
        _ => None,
    }
}

/// Forwards `existing` to every user of `op` and erases `op`.
fn replace_with_existing(rewriter: &mut PatternRewriter, op: OpId, existing: OpId) -> bool {
    rewriter.region_mut().replace_all_uses_with(op, existing);
    rewriter.erase_op(op);
    true
}

/// Replaces `op` with a fresh constant, preserving its id and users.
fn replace_with_constant(
    rewriter: &mut PatternRewriter,
    op: OpId,
    attr: ConstAttribute,
) -> bool {
    rewriter.replace_op_with(op, arith::constant(attr));
    true
}

/// The input of a commutative binary op that is *not* the given constant
/// slot.
fn other_input(region: &Region, op: OpId, index: usize) -> OpId {
    region.op(op).input(1 - index).defining_op().unwrap()
}

/// Finds an input slot holding a constant satisfying `test`; both slots
/// are tried, covering the symmetric forms of each pattern.
fn find_const_input(
    region: &Region,
    op: OpId,
    test: impl Fn(&ConstAttribute) -> bool,
) -> Option<usize> {
    let operation = region.op(op);
    (0..operation.inputs_num())
        .find(|index| const_input(region, operation, *index).is_some_and(|attr| test(&attr)))
}

/// `(x op C1) op C2` and its symmetric forms, integer only, with the inner
/// op having a single user: rotates to `x op (C1 op C2)` in place.
fn rotate_constants(rewriter: &mut PatternRewriter, op: OpId, opcode: Opcode) -> bool {
    let rotation = {
        let region = rewriter.region();
        let operation = region.op(op);
        if !operation.data_type().is_integer() {
            return false;
        }

        let mut rotation = None;
        for outer_idx in 0..2 {
            let c_outer = match const_input(region, operation, outer_idx) {
                Some(_) => operation.input(outer_idx).defining_op().unwrap(),
                None => continue,
            };
            let inner = match operation.input(1 - outer_idx).defining_op() {
                Some(def) => def,
                None => continue,
            };
            let inner_op = region.op(inner);
            if !inner_op.isa(opcode) || inner_op.users_num() != 1 {
                continue;
            }

            // The inner op must pair one constant with one non-constant.
            for inner_idx in 0..2 {
                if const_input(region, inner_op, inner_idx).is_none() {
                    continue;
                }
                let c_inner = inner_op.input(inner_idx).defining_op().unwrap();
                let x = inner_op.input(1 - inner_idx).defining_op().unwrap();
                if region.op(x).attr().is_some() {
                    continue;
                }
                rotation = Some((inner, c_inner, c_outer, x));
                break;
            }
            if rotation.is_some() {
                break;
            }
        }
        match rotation {
            Some(r) => r,
            None => return false,
        }
    };

    let (inner, c_inner, c_outer, x) = rotation;
    let region = rewriter.region_mut();
    region.set_input(op, 0, Some(x));
    region.set_input(op, 1, Some(inner));
    region.set_input(inner, 0, Some(c_inner));
    region.set_input(inner, 1, Some(c_outer));
    true
}

struct AddPeepHolePattern;

impl Pattern for AddPeepHolePattern {
    fn match_and_rewrite(&self, op: OpId, rewriter: &mut PatternRewriter) -> bool {
        if !rewriter.region().op(op).isa(Opcode::Add) {
            return false;
        }
        // x + 0, 0 + x -> x
        if let Some(index) = find_const_input(rewriter.region(), op, ConstAttribute::is_zero) {
            let x = other_input(rewriter.region(), op, index);
            return replace_with_existing(rewriter, op, x);
        }
        rotate_constants(rewriter, op, Opcode::Add)
    }
}

struct SubPeepHolePattern;

impl Pattern for SubPeepHolePattern {
    fn match_and_rewrite(&self, op: OpId, rewriter: &mut PatternRewriter) -> bool {
        let operation = rewriter.region().op(op);
        if !operation.isa(Opcode::Sub) {
            return false;
        }
        // x - 0 -> x
        if const_input(rewriter.region(), operation, 1).is_some_and(|attr| attr.is_zero()) {
            let x = operation.input(0).defining_op().unwrap();
            return replace_with_existing(rewriter, op, x);
        }
        // x - x -> 0 (integer)
        if operation.data_type().is_integer()
            && operation.input(0).defining_op() == operation.input(1).defining_op()
        {
            let zero = zero_attr(operation.data_type()).unwrap();
            return replace_with_constant(rewriter, op, zero);
        }
        false
    }
}

struct MulPeepHolePattern;

impl Pattern for MulPeepHolePattern {
    fn match_and_rewrite(&self, op: OpId, rewriter: &mut PatternRewriter) -> bool {
        if !rewriter.region().op(op).isa(Opcode::Mul) {
            return false;
        }
        // x * 1, 1 * x -> x
        if let Some(index) = find_const_input(rewriter.region(), op, ConstAttribute::is_one) {
            let x = other_input(rewriter.region(), op, index);
            return replace_with_existing(rewriter, op, x);
        }
        // x * 0, 0 * x -> 0 (integer)
        let data_type = rewriter.region().op(op).data_type();
        if data_type.is_integer()
            && find_const_input(rewriter.region(), op, ConstAttribute::is_zero).is_some()
        {
            return replace_with_constant(rewriter, op, zero_attr(data_type).unwrap());
        }
        rotate_constants(rewriter, op, Opcode::Mul)
    }
}

struct DivPeepHolePattern;

impl Pattern for DivPeepHolePattern {
    fn match_and_rewrite(&self, op: OpId, rewriter: &mut PatternRewriter) -> bool {
        let operation = rewriter.region().op(op);
        if !operation.isa(Opcode::Div) {
            return false;
        }
        // x / 1 -> x
        if const_input(rewriter.region(), operation, 1).is_some_and(|attr| attr.is_one()) {
            let x = operation.input(0).defining_op().unwrap();
            return replace_with_existing(rewriter, op, x);
        }
        false
    }
}

struct AndPeepHolePattern;

impl Pattern for AndPeepHolePattern {
    fn match_and_rewrite(&self, op: OpId, rewriter: &mut PatternRewriter) -> bool {
        let operation = rewriter.region().op(op);
        if !operation.isa(Opcode::And) || !operation.data_type().is_integer() {
            return false;
        }
        let data_type = operation.data_type();
        // x & 0, 0 & x -> 0
        if find_const_input(rewriter.region(), op, ConstAttribute::is_zero).is_some() {
            return replace_with_constant(rewriter, op, zero_attr(data_type).unwrap());
        }
        // x & 1…1, 1…1 & x -> x
        if let Some(index) = find_const_input(rewriter.region(), op, ConstAttribute::is_all_ones) {
            let x = other_input(rewriter.region(), op, index);
            return replace_with_existing(rewriter, op, x);
        }
        // x & x -> x
        let operation = rewriter.region().op(op);
        if operation.input(0).defining_op() == operation.input(1).defining_op() {
            let x = operation.input(0).defining_op().unwrap();
            return replace_with_existing(rewriter, op, x);
        }
        false
    }
}

struct OrPeepHolePattern;

impl Pattern for OrPeepHolePattern {
    fn match_and_rewrite(&self, op: OpId, rewriter: &mut PatternRewriter) -> bool {
        let operation = rewriter.region().op(op);
        if !operation.isa(Opcode::Or) || !operation.data_type().is_integer() {
            return false;
        }
        let data_type = operation.data_type();
        // x | 0, 0 | x -> x
        if let Some(index) = find_const_input(rewriter.region(), op, ConstAttribute::is_zero) {
            let x = other_input(rewriter.region(), op, index);
            return replace_with_existing(rewriter, op, x);
        }
        // x | 1…1, 1…1 | x -> 1…1
        if find_const_input(rewriter.region(), op, ConstAttribute::is_all_ones).is_some() {
            return replace_with_constant(rewriter, op, all_ones_attr(data_type).unwrap());
        }
        // x | x -> x
        let operation = rewriter.region().op(op);
        if operation.input(0).defining_op() == operation.input(1).defining_op() {
            let x = operation.input(0).defining_op().unwrap();
            return replace_with_existing(rewriter, op, x);
        }
        false
    }
}

struct XorPeepHolePattern;

impl Pattern for XorPeepHolePattern {
    fn match_and_rewrite(&self, op: OpId, rewriter: &mut PatternRewriter) -> bool {
        let operation = rewriter.region().op(op);
        if !operation.isa(Opcode::Xor) || !operation.data_type().is_integer() {
            return false;
        }
        let data_type = operation.data_type();
        // x ^ 0, 0 ^ x -> x
        if let Some(index) = find_const_input(rewriter.region(), op, ConstAttribute::is_zero) {
            let x = other_input(rewriter.region(), op, index);
            return replace_with_existing(rewriter, op, x);
        }
        // x ^ x -> 0
        if operation.input(0).defining_op() == operation.input(1).defining_op() {
            return replace_with_constant(rewriter, op, zero_attr(data_type).unwrap());
        }
        // x ^ 1…1, 1…1 ^ x -> not(x)
        if let Some(index) = find_const_input(rewriter.region(), op, ConstAttribute::is_all_ones) {
            let x = other_input(rewriter.region(), op, index);
            rewriter.replace_op_with(op, arith::not(data_type, x));
            return true;
        }
        false
    }
}

struct ShiftPeepHolePattern;

impl Pattern for ShiftPeepHolePattern {
    fn match_and_rewrite(&self, op: OpId, rewriter: &mut PatternRewriter) -> bool {
        let operation = rewriter.region().op(op);
        let shift = matches!(
            operation.opcode(),
            Opcode::Sal | Opcode::Sar | Opcode::Shl | Opcode::Shr
        );
        if !shift || !operation.data_type().is_integer() {
            return false;
        }
        let data_type = operation.data_type();
        // shift x, 0 -> x
        if const_input(rewriter.region(), operation, 1).is_some_and(|attr| attr.is_zero()) {
            let x = operation.input(0).defining_op().unwrap();
            return replace_with_existing(rewriter, op, x);
        }
        // shift 0, x -> 0
        if const_input(rewriter.region(), operation, 0).is_some_and(|attr| attr.is_zero()) {
            return replace_with_constant(rewriter, op, zero_attr(data_type).unwrap());
        }
        false
    }
}

struct NotPeepHolePattern;

impl Pattern for NotPeepHolePattern {
    fn match_and_rewrite(&self, op: OpId, rewriter: &mut PatternRewriter) -> bool {
        let inner_x = {
            let region = rewriter.region();
            let operation = region.op(op);
            if !operation.isa(Opcode::Not) {
                return false;
            }
            let inner = match operation.input(0).defining_op() {
                Some(def) => def,
                None => return false,
            };
            let inner_op = region.op(inner);
            if !inner_op.isa(Opcode::Not) {
                return false;
            }
            (inner, inner_op.input(0).defining_op().unwrap())
        };

        // not(not(x)) -> x; the inner not goes away with its last user.
        let (inner, x) = inner_x;
        replace_with_existing(rewriter, op, x);
        if !rewriter.region().op(inner).has_users() {
            rewriter.erase_op(inner);
        }
        true
    }
}

pub struct ArithPeepHolePass {
    patterns: PatternPass,
}

impl ArithPeepHolePass {
    pub fn new() -> ArithPeepHolePass {
        let mut patterns = PatternPass::new("arith-peephole");
        patterns.add_pattern(Box::new(AddPeepHolePattern));
        patterns.add_pattern(Box::new(SubPeepHolePattern));
        patterns.add_pattern(Box::new(MulPeepHolePattern));
        patterns.add_pattern(Box::new(DivPeepHolePattern));
        patterns.add_pattern(Box::new(AndPeepHolePattern));
        patterns.add_pattern(Box::new(OrPeepHolePattern));
        patterns.add_pattern(Box::new(XorPeepHolePattern));
        patterns.add_pattern(Box::new(ShiftPeepHolePattern));
        patterns.add_pattern(Box::new(NotPeepHolePattern));
        ArithPeepHolePass { patterns }
    }
}

impl Default for ArithPeepHolePass {
    fn default() -> ArithPeepHolePass {
        ArithPeepHolePass::new()
    }
}

impl Pass for ArithPeepHolePass {
    fn name(&self) -> &'static str {
        self.patterns.name()
    }

    fn run(&self, region: &mut Region) -> bool {
        self.patterns.run(region)
    }
}
