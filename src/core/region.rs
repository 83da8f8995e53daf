/*!

  Regions.

  A region exclusively owns its basic blocks and every operation inside
  them. Operations live in a slab indexed by [`OpId`]; a slot is tombstoned
  when its operation is destroyed and ids are never reused. Block ids are
  allocated monotonically and can be obtained ahead of block creation, which
  is how forward jump targets are built.

  The region is also the sole mutation surface of the IR: use-def edits,
  operation insertion/erasure/replacement and CFG edge updates all go
  through the primitives below, each of which maintains the use-def and
  predecessor/successor symmetry invariants. Structural mutation expires the
  cached dominator and loop analyses; queries on expired caches are fatal.

*/

use crate::core::block::BasicBlock;
use crate::core::diagnostics::{IrisError, Result};
use crate::core::doms::DomInfo;
use crate::core::ir::{BlockId, Input, OpId, Operation, User};
use crate::core::loops::LoopInfo;
use std::collections::HashSet;
use std::io;
use tracing::debug;

#[derive(Debug)]
pub struct Region {
    name: String,
    ops: Vec<Option<Operation>>,
    blocks: Vec<BasicBlock>,
    start_bb: Option<BlockId>,
    final_bb: Option<BlockId>,
    next_bb_id: u32,
    dom_info: DomInfo,
    loop_info: LoopInfo,
}

impl Region {
    pub fn new(name: &str) -> Result<Region> {
        if name.is_empty() {
            return Err(IrisError::Shape("Region name is empty!".to_string()));
        }
        Ok(Region {
            name: name.to_string(),
            ops: Vec::new(),
            blocks: Vec::new(),
            start_bb: None,
            final_bb: None,
            next_bb_id: 0,
            dom_info: DomInfo::default(),
            loop_info: LoopInfo::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    //--- Basic blocks ---

    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    pub fn obtain_id_for_basic_block(&mut self) -> BlockId {
        let id = BlockId::new(self.next_bb_id);
        self.next_bb_id += 1;
        id
    }

    pub fn add_basic_block(&mut self) -> BlockId {
        let id = self.obtain_id_for_basic_block();
        self.blocks.push(BasicBlock::new(id));
        self.expire_analyses();
        id
    }

    /// Adds a block under a pre-obtained id. The id must not collide with
    /// any block already in the region.
    pub fn add_basic_block_with_id(&mut self, id: BlockId) -> Result<BlockId> {
        if self.is_basic_block_present(id) {
            return Err(IrisError::Shape(format!(
                "Basic block id {} is already taken!",
                id.get_id()
            )));
        }
        if id.get_id() >= self.next_bb_id {
            self.next_bb_id = id.get_id() + 1;
        }
        self.blocks.push(BasicBlock::new(id));
        self.expire_analyses();
        Ok(id)
    }

    pub fn add_start_basic_block(&mut self) -> Result<BlockId> {
        if self.start_bb.is_some() {
            return Err(IrisError::Shape("Start bb is already specified!".to_string()));
        }
        let id = self.add_basic_block();
        self.start_bb = Some(id);
        Ok(id)
    }

    pub fn add_final_basic_block(&mut self) -> Result<BlockId> {
        if self.final_bb.is_some() {
            return Err(IrisError::Shape("Final bb is already specified!".to_string()));
        }
        let id = self.add_basic_block();
        self.final_bb = Some(id);
        Ok(id)
    }

    pub fn set_start_basic_block(&mut self, id: BlockId) -> bool {
        if !self.is_basic_block_present(id) {
            return false;
        }
        self.start_bb = Some(id);
        true
    }

    pub fn set_final_basic_block(&mut self, id: BlockId) -> bool {
        if !self.is_basic_block_present(id) {
            return false;
        }
        self.final_bb = Some(id);
        true
    }

    pub fn start_basic_block(&self) -> Option<BlockId> {
        self.start_bb
    }

    pub fn final_basic_block(&self) -> Option<BlockId> {
        self.final_bb
    }

    pub fn is_basic_block_present(&self, id: BlockId) -> bool {
        self.blocks.iter().any(|bb| bb.id() == id)
    }

    pub fn get_basic_block_by_id(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.iter().find(|bb| bb.id() == id)
    }

    /// Looks a block up by id; the block must be in the region.
    pub fn block(&self, id: BlockId) -> &BasicBlock {
        self.get_basic_block_by_id(id)
            .expect("basic block is not in the region")
    }

    fn block_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        self.blocks
            .iter_mut()
            .find(|bb| bb.id() == id)
            .expect("basic block is not in the region")
    }

    /// Unlinks the block from the CFG, destroys its operations and removes
    /// it from the region. Start/final roles held by the block are cleared.
    pub fn remove_basic_block(&mut self, id: BlockId) -> bool {
        if !self.is_basic_block_present(id) {
            return false;
        }
        self.unlink(id);

        let ops: Vec<OpId> = {
            let bb = self.block(id);
            bb.phi_ops().iter().chain(bb.reg_ops().iter()).copied().collect()
        };
        for op in ops {
            self.disconnect(op);
            self.ops[op.get_id()] = None;
        }

        let pos = self.blocks.iter().position(|bb| bb.id() == id).unwrap();
        self.blocks.remove(pos);

        if self.start_bb == Some(id) {
            self.start_bb = None;
        }
        if self.final_bb == Some(id) {
            self.final_bb = None;
        }
        self.expire_analyses();
        true
    }

    /// Replaces `old` with `new` in the CFG: `new` inherits all of `old`'s
    /// predecessors and successors as well as its start/final roles, then
    /// `old` is destroyed. Both blocks must already be in the region.
    pub fn replace_basic_block_with(&mut self, old: BlockId, new: BlockId) -> bool {
        if !self.is_basic_block_present(old) || !self.is_basic_block_present(new) {
            return false;
        }

        let preds = self.block_mut(old).take_preds();
        for pred in preds {
            for which in [true, false] {
                if self.block(pred).succ(which) == Some(old) {
                    self.block_mut(pred).set_succ(Some(new), which);
                }
            }
            self.block_mut(new).add_pred(pred);
        }

        for which in [true, false] {
            if let Some(succ) = self.block(old).succ(which) {
                self.block_mut(old).set_succ(None, which);
                self.block_mut(succ).remove_pred(old);
                self.link_succ(new, succ, which);
            }
        }

        if self.start_bb == Some(old) {
            self.start_bb = Some(new);
        }
        if self.final_bb == Some(old) {
            self.final_bb = Some(new);
        }

        self.remove_basic_block(old);
        true
    }

    //--- CFG edges ---

    /// Writes the successor slot of `from` and records `from` as a
    /// predecessor of `to`. Re-linking an occupied slot first unlinks the
    /// previous target.
    pub fn link_succ(&mut self, from: BlockId, to: BlockId, which: bool) -> bool {
        if !self.is_basic_block_present(from) || !self.is_basic_block_present(to) {
            return false;
        }
        if let Some(prev) = self.block(from).succ(which) {
            self.block_mut(prev).remove_pred(from);
        }
        self.block_mut(from).set_succ(Some(to), which);
        self.block_mut(to).add_pred(from);
        self.expire_analyses();
        true
    }

    /// Removes every CFG edge touching the block, on both sides.
    pub fn unlink(&mut self, bb: BlockId) {
        for which in [true, false] {
            if let Some(succ) = self.block(bb).succ(which) {
                self.block_mut(succ).remove_pred(bb);
                self.block_mut(bb).set_succ(None, which);
            }
        }
        let preds = self.block_mut(bb).take_preds();
        for pred in preds {
            for which in [true, false] {
                if self.block(pred).succ(which) == Some(bb) {
                    self.block_mut(pred).set_succ(None, which);
                }
            }
        }
        self.expire_analyses();
    }

    //--- Operations ---

    pub fn obtain_id_for_operation(&mut self) -> OpId {
        self.ops.push(None);
        OpId::new(self.ops.len() - 1)
    }

    pub fn is_op_alive(&self, id: OpId) -> bool {
        matches!(self.ops.get(id.get_id()), Some(Some(_)))
    }

    /// Looks an operation up by id; the operation must be alive.
    pub fn op(&self, id: OpId) -> &Operation {
        self.ops
            .get(id.get_id())
            .and_then(|slot| slot.as_ref())
            .expect("operation is not alive")
    }

    fn op_mut(&mut self, id: OpId) -> &mut Operation {
        self.ops
            .get_mut(id.get_id())
            .and_then(|slot| slot.as_mut())
            .expect("operation is not alive")
    }

    /// All live operations of the region, in id order.
    pub fn live_ops(&self) -> impl Iterator<Item = (OpId, &Operation)> {
        self.ops
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|op| (OpId::new(idx), op)))
    }

    /// Binds a freshly inserted operation to its defining inputs, updating
    /// their user lists.
    fn add_as_user_to_inputs(&mut self, id: OpId) {
        for index in 0..self.op(id).inputs_num() {
            if let Some(def) = self.op(id).input(index).defining_op() {
                if !self.op_mut(def).add_user(User::new(id, index)) {
                    panic!("operation is already in the users list");
                }
            }
        }
    }

    fn insert_op(&mut self, bb: BlockId, mut op: Operation, place: Place) -> OpId {
        assert!(
            self.is_basic_block_present(bb),
            "basic block is not in the region"
        );
        let id = self.obtain_id_for_operation();
        op.set_id(id);
        op.set_parent(Some(bb));
        let is_phi = op.is_phi();
        self.ops[id.get_id()] = Some(op);
        self.add_as_user_to_inputs(id);

        let block = self.block_mut(bb);
        match place {
            Place::PhiBack => {
                assert!(is_phi, "non-phi operation in the phi operations list");
                block.phi_ops_mut().push(id);
            }
            Place::Back | Place::Front | Place::Before(_) | Place::After(_) => {
                assert!(!is_phi, "phi operation is in the regular operations list");
                let list = block.reg_ops_mut();
                match place {
                    Place::Back => list.push(id),
                    Place::Front => list.insert(0, id),
                    Place::Before(pos) => {
                        let at = list
                            .iter()
                            .position(|o| *o == pos)
                            .expect("operation is not attached to its parent basic block");
                        list.insert(at, id);
                    }
                    Place::After(pos) => {
                        let at = list
                            .iter()
                            .position(|o| *o == pos)
                            .expect("operation is not attached to its parent basic block");
                        list.insert(at + 1, id);
                    }
                    Place::PhiBack => unreachable!(),
                }
            }
        }
        id
    }

    pub fn insert_op_back(&mut self, bb: BlockId, op: Operation) -> OpId {
        self.insert_op(bb, op, Place::Back)
    }

    pub fn insert_op_front(&mut self, bb: BlockId, op: Operation) -> OpId {
        self.insert_op(bb, op, Place::Front)
    }

    pub fn insert_op_before(&mut self, bb: BlockId, pos: OpId, op: Operation) -> OpId {
        self.insert_op(bb, op, Place::Before(pos))
    }

    pub fn insert_op_after(&mut self, bb: BlockId, pos: OpId, op: Operation) -> OpId {
        self.insert_op(bb, op, Place::After(pos))
    }

    pub fn insert_phi_op_back(&mut self, bb: BlockId, op: Operation) -> OpId {
        self.insert_op(bb, op, Place::PhiBack)
    }

    /// Detaches the operation from its block's regular list, disconnects it
    /// from the use-def graph and destroys it.
    pub fn erase_op(&mut self, id: OpId) {
        self.erase_from_list(id, false)
    }

    /// The phi-list twin of [`Region::erase_op`].
    pub fn erase_phi_op(&mut self, id: OpId) {
        self.erase_from_list(id, true)
    }

    fn erase_from_list(&mut self, id: OpId, phi: bool) {
        let bb = self
            .op(id)
            .parent_basic_block()
            .expect("cannot erase operation without parent basic block");
        let block = self.block_mut(bb);
        let list = if phi {
            block.phi_ops_mut()
        } else {
            block.reg_ops_mut()
        };
        let pos = list
            .iter()
            .position(|o| *o == id)
            .expect("operation is not attached to its parent basic block");
        list.remove(pos);
        self.disconnect(id);
        self.ops[id.get_id()] = None;
    }

    /// Replaces the operation in place: the new operation takes over the
    /// old one's id, list position and user list, so every downstream
    /// reference now sees the new operation. The old operation is
    /// disconnected from its own inputs and destroyed. A phi may only be
    /// replaced by a phi, and vice versa.
    pub fn replace_op_with(&mut self, id: OpId, mut new_op: Operation) -> OpId {
        let bb = self
            .op(id)
            .parent_basic_block()
            .expect("cannot replace operation without parent basic block");
        let old_is_phi = self.op(id).is_phi();
        if old_is_phi != new_op.is_phi() {
            panic!("phi operation can only be replaced with a phi operation");
        }
        {
            let block = self.block(bb);
            let list = if old_is_phi {
                block.phi_ops()
            } else {
                block.reg_ops()
            };
            assert!(
                list.contains(&id),
                "operation is not attached to its parent basic block"
            );
        }

        let old_inputs: Vec<Input> = self.op(id).inputs().to_vec();
        for (index, input) in old_inputs.iter().enumerate() {
            if let Some(def) = input.defining_op() {
                self.op_mut(def).remove_user(User::new(id, index));
            }
        }
        let users = self.op_mut(id).take_users();

        new_op.set_id(id);
        new_op.set_parent(Some(bb));
        new_op.append_users(users);
        self.ops[id.get_id()] = Some(new_op);
        self.add_as_user_to_inputs(id);
        id
    }

    //--- Use-def primitives ---

    /// Writes input slot `index` of `op`, keeping the affected user lists
    /// consistent. `new_def` may be empty to clear the slot.
    pub fn set_input(&mut self, op: OpId, index: usize, new_def: Option<OpId>) {
        if index >= self.op(op).inputs_num() {
            panic!("input index out of range");
        }
        if let Some(old_def) = self.op(op).input(index).defining_op() {
            self.op_mut(old_def).remove_user(User::new(op, index));
        }
        match new_def {
            Some(def) => {
                self.op_mut(op).input_mut(index).set(def);
                if !self.op_mut(def).add_user(User::new(op, index)) {
                    panic!("operation is already in the users list");
                }
            }
            None => self.op_mut(op).input_mut(index).clear(),
        }
    }

    /// Rewrites every user of `op` to reference `other` instead, moving the
    /// user entries across. Afterwards `op` has no users. A self
    /// replacement is a no-op.
    pub fn replace_all_uses_with(&mut self, op: OpId, other: OpId) {
        if op == other {
            return;
        }
        let users = self.op_mut(op).take_users();
        for user in &users {
            self.op_mut(user.user_op())
                .input_mut(user.input_index())
                .set(other);
        }
        self.op_mut(other).append_users(users);
    }

    /// Empties every user's referring slot and the user list of `op`.
    pub fn clear_all_uses(&mut self, op: OpId) {
        let users = self.op_mut(op).take_users();
        for user in users {
            self.op_mut(user.user_op())
                .input_mut(user.input_index())
                .clear();
        }
    }

    /// Fully detaches `op` from the use-def graph: clears all of its uses,
    /// then empties its own input slots, removing the back edges from the
    /// defining operations' user lists.
    pub fn disconnect(&mut self, op: OpId) {
        self.clear_all_uses(op);
        for index in 0..self.op(op).inputs_num() {
            if let Some(def) = self.op(op).input(index).defining_op() {
                self.op_mut(def).remove_user(User::new(op, index));
                self.op_mut(op).input_mut(index).clear();
            }
        }
    }

    //--- Traversal ---

    fn run_dfs_from(&self, bb: BlockId, visited: &mut HashSet<BlockId>, order: &mut Vec<BlockId>) {
        if !visited.insert(bb) {
            return;
        }
        if let Some(succ) = self.block(bb).succ(true) {
            self.run_dfs_from(succ, visited, order);
        }
        if let Some(succ) = self.block(bb).succ(false) {
            self.run_dfs_from(succ, visited, order);
        }
        order.push(bb);
    }

    /// Post-order listing from the start block, true successor first.
    pub fn dfs(&self) -> Result<Vec<BlockId>> {
        let start = self.start_bb.ok_or_else(|| {
            IrisError::Shape("Cannot run DFS with no start basic block specified!".to_string())
        })?;
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        self.run_dfs_from(start, &mut visited, &mut order);
        Ok(order)
    }

    /// Reverse post-order from the start block.
    pub fn rpo(&self) -> Result<Vec<BlockId>> {
        let mut order = self.dfs()?;
        order.reverse();
        Ok(order)
    }

    //--- Analyses ---

    fn expire_analyses(&mut self) {
        self.dom_info.expire();
        self.loop_info.expire();
    }

    /// Recomputes dominator info if it has expired; a no-op otherwise.
    pub fn collect_dom_info(&mut self) -> Result<()> {
        if !self.dom_info.is_expired() {
            return Ok(());
        }
        debug!(region = %self.name, "collecting dominator info");
        self.dom_info = DomInfo::analyze(self)?;
        Ok(())
    }

    pub fn is_dom_info_expired(&self) -> bool {
        self.dom_info.is_expired()
    }

    pub fn dom_info(&self) -> &DomInfo {
        if self.dom_info.is_expired() {
            panic!("dom info is expired");
        }
        &self.dom_info
    }

    pub fn get_idom(&self, bb: BlockId) -> Option<BlockId> {
        self.dom_info().idom(bb)
    }

    pub fn get_dominated_blocks(&self, bb: BlockId) -> Vec<BlockId> {
        self.dom_info().dominated_blocks(bb)
    }

    pub fn get_dominators_chain(&self, bb: BlockId) -> Vec<BlockId> {
        self.dom_info().dominators_chain(bb)
    }

    /// Recomputes loop info if it has expired. Dominator info must be
    /// fresh.
    pub fn collect_loop_info(&mut self) -> Result<()> {
        if !self.loop_info.is_expired() {
            return Ok(());
        }
        debug!(region = %self.name, "collecting loop info");
        self.loop_info = LoopInfo::analyze(self)?;
        Ok(())
    }

    pub fn is_loop_info_expired(&self) -> bool {
        self.loop_info.is_expired()
    }

    pub fn loop_info(&self) -> &LoopInfo {
        if self.loop_info.is_expired() {
            panic!("loop info is expired");
        }
        &self.loop_info
    }

    //--- Verification ---

    /// Runs the per-block structural verifier over every block, passing the
    /// start/final roles along.
    pub fn verify(&self) -> Result<()> {
        for bb in &self.blocks {
            let is_start = self.start_bb == Some(bb.id());
            let is_final = self.final_bb == Some(bb.id());
            bb.verify(self, is_start, is_final)?;
        }
        Ok(())
    }

    /// Audits use-def symmetry across the whole region: every non-empty
    /// input slot is mirrored by exactly one user entry, and every user
    /// entry is mirrored by its slot.
    pub fn verify_use_def(&self) -> Result<()> {
        for (id, op) in self.live_ops() {
            for (index, input) in op.inputs().iter().enumerate() {
                if let Some(def) = input.defining_op() {
                    if !self.is_op_alive(def) {
                        return Err(IrisError::Verification(format!(
                            "{}'s input #{} references a destroyed operation!",
                            id, index
                        )));
                    }
                    let matching = self
                        .op(def)
                        .users()
                        .iter()
                        .filter(|u| u.user_op() == id && u.input_index() == index)
                        .count();
                    if matching != 1 {
                        return Err(IrisError::Verification(format!(
                            "{}'s input #{} is covered by {} user entries on {}!",
                            id, index, matching, def
                        )));
                    }
                }
            }
            for user in op.users() {
                if !self.is_op_alive(user.user_op()) {
                    return Err(IrisError::Verification(format!(
                        "{} has a user entry for a destroyed operation!",
                        id
                    )));
                }
                let slot = self.op(user.user_op()).input(user.input_index());
                if slot.defining_op() != Some(id) {
                    return Err(IrisError::Verification(format!(
                        "{}'s user entry ({}, {}) is not mirrored by the input slot!",
                        id,
                        user.user_op(),
                        user.input_index()
                    )));
                }
            }
        }
        Ok(())
    }

    //--- Printing ---

    pub fn dump<W: io::Write>(&self, w: &mut W) -> io::Result<()> {
        write!(w, "{}", self)
    }
}

enum Place {
    Back,
    Front,
    Before(OpId),
    After(OpId),
    PhiBack,
}
