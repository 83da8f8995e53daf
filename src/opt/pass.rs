//! Pass composition. A pass transforms a region and reports whether it
//! changed the IR; a pass manager runs an ordered list of passes, OR-ing
//! the change flags. Invalidation of cached analyses is not wired here:
//! the region's mutation primitives already expire them.

use crate::core::Region;
use tracing::debug;

pub trait Pass {
    fn name(&self) -> &'static str;

    /// Returns true iff the IR was changed.
    fn run(&self, region: &mut Region) -> bool;
}

#[derive(Default)]
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    pub fn new() -> PassManager {
        PassManager { passes: Vec::new() }
    }

    pub fn add_pass(&mut self, pass: Box<dyn Pass>) {
        self.passes.push(pass);
    }

    pub fn run(&self, region: &mut Region) -> bool {
        let mut changed = false;
        for pass in &self.passes {
            let pass_changed = pass.run(region);
            debug!(pass = pass.name(), changed = pass_changed, "pass finished");
            changed |= pass_changed;
        }
        changed
    }
}
