/*!

  Dominator analysis.

  Standard iterative dataflow over reverse post-order: the start block
  dominates itself, every other block intersects the dominator sets of its
  processed predecessors by walking idom chains ordered by RPO index, until
  a fixed point. Unreachable blocks get no idom and answer queries with
  "no idom".

  The info is cached on the region with an expiry flag; any structural
  mutation of the region expires it, and queries on expired info are fatal.

*/

use crate::core::diagnostics::Result;
use crate::core::ir::BlockId;
use crate::core::region::Region;
use std::collections::HashMap;

#[derive(Debug)]
pub struct DomInfo {
    idom: HashMap<BlockId, BlockId>,
    dominated: HashMap<BlockId, Vec<BlockId>>,
    expired: bool,
}

impl Default for DomInfo {
    fn default() -> DomInfo {
        DomInfo {
            idom: HashMap::new(),
            dominated: HashMap::new(),
            // Dominators info must be prepared before querying.
            expired: true,
        }
    }
}

impl DomInfo {
    pub(crate) fn analyze(region: &Region) -> Result<DomInfo> {
        let rpo = region.rpo()?;
        let start = region.start_basic_block().unwrap();

        let mut index: HashMap<BlockId, usize> = HashMap::new();
        for (idx, bb) in rpo.iter().enumerate() {
            index.insert(*bb, idx);
        }

        let mut idom: HashMap<BlockId, BlockId> = HashMap::new();
        idom.insert(start, start);

        let mut changed = true;
        while changed {
            changed = false;

            for bb in &rpo {
                if *bb == start {
                    continue;
                }

                // First processed predecessor becomes the candidate.
                let mut candidate = None;
                for pred in region.block(*bb).preds() {
                    if idom.contains_key(pred) {
                        candidate = Some(*pred);
                        break;
                    }
                }
                let mut candidate = match candidate {
                    Some(c) => c,
                    None => continue,
                };

                for pred in region.block(*bb).preds() {
                    if *pred == candidate || !idom.contains_key(pred) {
                        continue;
                    }
                    candidate = Self::intersect(*pred, candidate, &idom, &index);
                }

                if idom.get(bb) != Some(&candidate) {
                    idom.insert(*bb, candidate);
                    changed = true;
                }
            }
        }

        let mut dominated: HashMap<BlockId, Vec<BlockId>> = HashMap::new();
        for (bb, dom) in &idom {
            if bb == dom {
                continue;
            }
            dominated.entry(*dom).or_default().push(*bb);
        }

        Ok(DomInfo {
            idom,
            dominated,
            expired: false,
        })
    }

    /// Walks both blocks up their idom chains, ordered by RPO index, until
    /// they meet at the least common dominator.
    fn intersect(
        mut b1: BlockId,
        mut b2: BlockId,
        idom: &HashMap<BlockId, BlockId>,
        index: &HashMap<BlockId, usize>,
    ) -> BlockId {
        while b1 != b2 {
            while index[&b1] > index[&b2] {
                b1 = idom[&b1];
            }
            while index[&b2] > index[&b1] {
                b2 = idom[&b2];
            }
        }
        b1
    }

    pub(crate) fn expire(&mut self) {
        self.expired = true;
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Immediate dominator; the start block is its own idom. `None` for
    /// blocks unreachable from start.
    pub fn idom(&self, bb: BlockId) -> Option<BlockId> {
        self.idom.get(&bb).copied()
    }

    /// Blocks whose immediate dominator is `bb`.
    pub fn dominated_blocks(&self, bb: BlockId) -> Vec<BlockId> {
        self.dominated.get(&bb).cloned().unwrap_or_default()
    }

    /// Ordered walk from `bb` through immediate dominators, up to and
    /// including the start block.
    pub fn dominators_chain(&self, bb: BlockId) -> Vec<BlockId> {
        let mut chain = Vec::new();
        let mut cur = bb;
        loop {
            chain.push(cur);
            match self.idom(cur) {
                Some(dom) if dom != cur => cur = dom,
                _ => break,
            }
        }
        chain
    }
}
