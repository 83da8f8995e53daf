/*!

  Basic blocks.

  A block holds two separate ordered operation lists: the phi sub-list and
  the regular list, whose last element must be a terminator for any block
  that participates in control flow. CFG state is a predecessor list plus
  two nullable successor slots, "true" and "false"; a single outgoing edge
  always occupies the "true" slot.

  Blocks are owned by their region and addressed through [`BlockId`]; all
  structural mutation (operation insertion, edge linking) goes through the
  region so that both sides of every edge stay consistent.

*/

use crate::core::diagnostics::{IrisError, Result};
use crate::core::ir::{BlockId, OpId, Opcode};
use crate::core::region::Region;

#[derive(Debug)]
pub struct BasicBlock {
    id: BlockId,
    preds: Vec<BlockId>,
    succ_true: Option<BlockId>,
    succ_false: Option<BlockId>,
    phi_ops: Vec<OpId>,
    reg_ops: Vec<OpId>,
}

impl BasicBlock {
    pub(crate) fn new(id: BlockId) -> BasicBlock {
        BasicBlock {
            id,
            preds: Vec::new(),
            succ_true: None,
            succ_false: None,
            phi_ops: Vec::new(),
            reg_ops: Vec::new(),
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    //--- Predecessors ---

    pub fn preds(&self) -> &[BlockId] {
        &self.preds
    }

    pub fn preds_num(&self) -> usize {
        self.preds.len()
    }

    pub(crate) fn add_pred(&mut self, pred: BlockId) {
        self.preds.push(pred);
    }

    /// Removes one occurrence of `pred` (parallel edges contribute one
    /// entry each).
    pub(crate) fn remove_pred(&mut self, pred: BlockId) {
        if let Some(pos) = self.preds.iter().position(|p| *p == pred) {
            self.preds.remove(pos);
        }
    }

    pub(crate) fn take_preds(&mut self) -> Vec<BlockId> {
        std::mem::take(&mut self.preds)
    }

    //--- Successors ---

    /// `which == true` selects the "true" slot, `false` the "false" slot.
    pub fn succ(&self, which: bool) -> Option<BlockId> {
        if which {
            self.succ_true
        } else {
            self.succ_false
        }
    }

    pub fn has_succ(&self, which: bool) -> bool {
        self.succ(which).is_some()
    }

    pub(crate) fn set_succ(&mut self, succ: Option<BlockId>, which: bool) {
        if which {
            self.succ_true = succ;
        } else {
            self.succ_false = succ;
        }
    }

    //--- Operation lists ---

    pub fn phi_ops(&self) -> &[OpId] {
        &self.phi_ops
    }

    pub fn reg_ops(&self) -> &[OpId] {
        &self.reg_ops
    }

    pub(crate) fn phi_ops_mut(&mut self) -> &mut Vec<OpId> {
        &mut self.phi_ops
    }

    pub(crate) fn reg_ops_mut(&mut self) -> &mut Vec<OpId> {
        &mut self.reg_ops
    }

    //--- Verification ---

    /// Checks the structural invariants of this block, reporting the first
    /// violation. The caller supplies the start/final roles, which the
    /// block does not know by itself.
    pub fn verify(&self, region: &Region, is_start: bool, is_final: bool) -> Result<()> {
        let bb_name = format!("BB{}", self.id.get_id());
        let fail = |msg: String| Err(IrisError::Verification(msg));

        if is_start && !self.preds.is_empty() {
            return fail(format!("{} is starting bb, but has predecessor!", bb_name));
        }

        if is_final && (self.succ_true.is_some() || self.succ_false.is_some()) {
            return fail(format!("{} is final bb, but has successors!", bb_name));
        }

        for pred in &self.preds {
            if !region.is_basic_block_present(*pred) {
                return fail(format!(
                    "{}'s pred {} is not in the region!",
                    bb_name,
                    pred.get_id()
                ));
            }
        }

        if let Some(succ) = self.succ_true {
            if !region.is_basic_block_present(succ) {
                return fail(format!("{}'s true successor is not in the region!", bb_name));
            }
        }

        if let Some(succ) = self.succ_false {
            if !region.is_basic_block_present(succ) {
                return fail(format!(
                    "{}'s false successor is not in the region!",
                    bb_name
                ));
            }
        }

        if self.succ_false.is_some() && self.succ_true.is_none() {
            return fail(format!(
                "{} has false successor specified, but true successor is missing!",
                bb_name
            ));
        }

        if !is_final && self.succ_true.is_none() {
            return fail(format!("{} is not final, but has no successors!", bb_name));
        }

        if self.reg_ops.is_empty() {
            return fail(format!("{} is empty!", bb_name));
        }

        let last = region.op(*self.reg_ops.last().unwrap());

        if is_final && !last.isa(Opcode::Return) {
            return fail(format!(
                "{} is final, but its last operation is not an 'ctrlflow.return'!",
                bb_name
            ));
        }

        let has_two_succs = self.succ_false.is_some();
        let last_is_cond_jump = last.isa(Opcode::Jumpc);

        if has_two_succs && self.succ_true == self.succ_false {
            return fail(format!("{} has two identical successors!", bb_name));
        }

        if has_two_succs && !last_is_cond_jump {
            return fail(format!(
                "{} has two successors, but conditional jump at the end is missing!",
                bb_name
            ));
        }

        if !has_two_succs && last_is_cond_jump {
            return fail(format!(
                "{} has single successor, but has conditional jump at the end!",
                bb_name
            ));
        }

        for (idx, op_id) in self.reg_ops.iter().enumerate() {
            let op = region.op(*op_id);
            if op.is_phi() {
                return fail(format!(
                    "{} - phi operation is in the regular operations list!",
                    bb_name
                ));
            }
            if idx + 1 < self.reg_ops.len() && op.is_terminator() {
                return fail(format!(
                    "{} - terminator operation is not the last one in the block!",
                    bb_name
                ));
            }
        }

        for op_id in &self.phi_ops {
            let op = region.op(*op_id);
            if !op.is_phi() {
                return fail(format!(
                    "{} - non-phi operation in the phi operations list!",
                    bb_name
                ));
            }
        }

        for op_id in self.phi_ops.iter().chain(self.reg_ops.iter()) {
            if let Err(msg) = crate::dialects::verify_op(region.op(*op_id), region) {
                return fail(msg);
            }
        }

        Ok(())
    }
}
