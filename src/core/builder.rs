/*!

   The builder is the stateful construction front-end of the IR: it tracks
   the region under construction and the current basic block, routes phi
   operations into the phi sub-list, and hands out block ids ahead of block
   creation so forward jump targets can be referenced before their blocks
   exist.

*/

use crate::core::diagnostics::{IrisError, Result};
use crate::core::ir::{BlockId, OpId, Operation};
use crate::core::region::Region;

#[derive(Debug, Default)]
pub struct IRBuilder {
    region: Option<Region>,
    cur_bb: Option<BlockId>,
}

impl IRBuilder {
    pub fn new() -> IRBuilder {
        IRBuilder {
            region: None,
            cur_bb: None,
        }
    }

    /// Starts construction of a fresh region, dropping any previous one.
    pub fn start_new_region(&mut self, name: &str) -> Result<()> {
        self.region = Some(Region::new(name)?);
        self.cur_bb = None;
        Ok(())
    }

    pub fn cur_region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    pub fn cur_region_mut(&mut self) -> Option<&mut Region> {
        self.region.as_mut()
    }

    fn region_mut(&mut self) -> Result<&mut Region> {
        self.region
            .as_mut()
            .ok_or_else(|| IrisError::Shape("No region has been started!".to_string()))
    }

    /// Reserves a block id without creating the block; pass it back through
    /// [`IRBuilder::start_new_basic_block_with_id`].
    pub fn obtain_id_for_basic_block(&mut self) -> Result<BlockId> {
        Ok(self.region_mut()?.obtain_id_for_basic_block())
    }

    pub fn start_new_basic_block(&mut self) -> Result<BlockId> {
        let id = self.region_mut()?.add_basic_block();
        self.cur_bb = Some(id);
        Ok(id)
    }

    pub fn start_new_basic_block_with_id(&mut self, id: BlockId) -> Result<BlockId> {
        let id = self.region_mut()?.add_basic_block_with_id(id)?;
        self.cur_bb = Some(id);
        Ok(id)
    }

    /// Appends the operation to the current block, routing phis into the
    /// phi sub-list.
    pub fn create_and_add_op(&mut self, op: Operation) -> Result<OpId> {
        let bb = self
            .cur_bb
            .ok_or_else(|| IrisError::Shape("No basic block has been started!".to_string()))?;
        let region = self.region_mut()?;
        let id = if op.is_phi() {
            region.insert_phi_op_back(bb, op)
        } else {
            region.insert_op_back(bb, op)
        };
        Ok(id)
    }

    /// Closes the current block and returns its id.
    pub fn finalize_cur_basic_block(&mut self) -> Result<BlockId> {
        self.cur_bb
            .take()
            .ok_or_else(|| IrisError::Shape("No basic block has been started!".to_string()))
    }

    /// Hands the finished region over, leaving the builder empty.
    pub fn obtain_region(&mut self) -> Option<Region> {
        self.cur_bb = None;
        self.region.take()
    }
}
