/*!

  Pattern rewriting.

  A pattern inspects one operation and either rewrites the region through
  the rewriter primitives, returning `true`, or leaves the IR untouched and
  returns `false`. Patterns are expected to make forward progress or no
  change; no rollback is performed.

  The driver visits blocks in region-insertion order, not CFG order.
  Patterns that depend on dominance must query dominator info themselves.

*/

use crate::core::{BlockId, OpId, Operation, Region};
use tracing::trace;

pub trait Pattern {
    /// Returns true iff the IR was changed.
    fn match_and_rewrite(&self, op: OpId, rewriter: &mut PatternRewriter) -> bool;
}

/// Mutation surface handed to patterns. The erase/replace primitives keep
/// use-def symmetry intact; misuse (detached operations, phi/non-phi
/// mismatch) is fatal.
pub struct PatternRewriter<'a> {
    region: &'a mut Region,
}

impl<'a> PatternRewriter<'a> {
    pub fn new(region: &'a mut Region) -> PatternRewriter<'a> {
        PatternRewriter { region }
    }

    pub fn region(&self) -> &Region {
        self.region
    }

    pub fn region_mut(&mut self) -> &mut Region {
        self.region
    }

    /// Detaches the operation from its parent block's list (phi or
    /// regular) and destroys it.
    pub fn erase_op(&mut self, op: OpId) {
        if self.region.op(op).is_phi() {
            self.region.erase_phi_op(op);
        } else {
            self.region.erase_op(op);
        }
    }

    /// Replaces the operation in place, preserving its id and transferring
    /// its user list onto the new operation.
    pub fn replace_op_with(&mut self, op: OpId, new_op: Operation) -> OpId {
        self.region.replace_op_with(op, new_op)
    }
}

/// An ordered collection of patterns applied to a local fixed point per
/// block: after any successful rewrite the op list is restarted from the
/// front, since the rewrite may have restructured it arbitrarily.
pub struct PatternPass {
    name: &'static str,
    patterns: Vec<Box<dyn Pattern>>,
}

impl PatternPass {
    pub fn new(name: &'static str) -> PatternPass {
        PatternPass {
            name,
            patterns: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn add_pattern(&mut self, pattern: Box<dyn Pattern>) {
        self.patterns.push(pattern);
    }

    pub fn run(&self, region: &mut Region) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        let mut ir_changed = false;
        let block_ids: Vec<BlockId> = region.blocks().iter().map(|bb| bb.id()).collect();

        for bb in block_ids {
            for phis in [false, true] {
                loop {
                    let mut bb_changed = false;

                    let ops: Vec<OpId> = {
                        let block = region.block(bb);
                        if phis {
                            block.phi_ops().to_vec()
                        } else {
                            block.reg_ops().to_vec()
                        }
                    };

                    'ops: for op in ops {
                        for pattern in &self.patterns {
                            let mut rewriter = PatternRewriter::new(region);
                            if pattern.match_and_rewrite(op, &mut rewriter) {
                                trace!(pass = self.name, op = %op, "pattern applied");
                                bb_changed = true;
                                ir_changed = true;
                                // The list may have been mutated, restart
                                // from the beginning.
                                break 'ops;
                            }
                        }
                    }

                    if !bb_changed {
                        break;
                    }
                }
            }
        }

        ir_changed
    }
}
