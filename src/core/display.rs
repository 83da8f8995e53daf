//! Human-readable, non-round-trippable printing of regions, operations and
//! the loop tree.

use crate::core::ir::{OpId, Payload};
use crate::core::loops::{LoopId, LoopInfo};
use crate::core::region::Region;
use std::fmt;
use yansi::Paint;
use {indenter::indented, std::fmt::Write};

fn op_label(region: &Region, id: OpId) -> String {
    if region.op(id).is_phi() {
        format!("v{}p", id.get_id())
    } else {
        format!("v{}", id.get_id())
    }
}

/// Prints one operation in the form
/// `v<id>.<dtype> <dialect>.<mnemonic> <specifics> (<inputs>) -> (<users>)`.
pub struct OpDisplay<'a> {
    region: &'a Region,
    id: OpId,
}

impl fmt::Display for OpDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let op = self.region.op(self.id);

        if op.has_result() {
            write!(f, "{}.{} ", op_label(self.region, self.id), op.data_type())?;
        }

        write!(f, "{}.{}", op.dialect_name(), op.mnemonic())?;

        match op.payload() {
            Payload::Attr(attr) => write!(f, " {}", attr)?,
            Payload::Pred(pred) => write!(f, " {}", pred)?,
            Payload::Target(bb) => write!(f, " {}", bb)?,
            Payload::Callee(name) => write!(f, " {}", name)?,
            Payload::None => {}
        }

        if op.has_inputs() {
            write!(f, " (")?;
            let l = op.inputs_num();
            for (ind, input) in op.inputs().iter().enumerate() {
                match input.defining_op() {
                    None => write!(f, "none")?,
                    Some(def) => write!(
                        f,
                        "{} : {}",
                        op_label(self.region, def),
                        self.region.op(def).data_type()
                    )?,
                };
                if ind != l - 1 {
                    write!(f, ", ")?;
                }
            }
            write!(f, ")")?;
        }

        if op.has_users() {
            write!(f, " -> (")?;
            let l = op.users_num();
            for (ind, user) in op.users().iter().enumerate() {
                write!(f, "{}", op_label(self.region, user.user_op()))?;
                if ind != l - 1 {
                    write!(f, ",")?;
                }
            }
            write!(f, ")")?;
        }

        Ok(())
    }
}

impl Region {
    pub fn display_op(&self, id: OpId) -> OpDisplay {
        OpDisplay { region: self, id }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}:", self.name())?;
        for bb in self.blocks() {
            write!(f, "  ^{} ", bb.id())?;

            if bb.preds().is_empty() {
                write!(f, "<start> ")?;
            } else {
                write!(f, "<from")?;
                for pred in bb.preds() {
                    write!(f, " {}", pred)?;
                }
                write!(f, "> ")?;
            }

            match (bb.succ(true), bb.succ(false)) {
                (None, None) => write!(f, "<final> ")?,
                (Some(t), Some(fa)) => write!(f, "<to T:{} / F:{}> ", t, fa)?,
                (Some(t), None) => write!(f, "<to {}> ", t)?,
                (None, Some(fa)) => write!(f, "<to F:{}> ", fa)?,
            }

            writeln!(f, ":")?;

            for op in bb.phi_ops().iter().chain(bb.reg_ops().iter()) {
                writeln!(indented(f).with_str("      "), "{}", self.display_op(*op))?;
            }
        }
        Ok(())
    }
}

fn fmt_loop(info: &LoopInfo, id: LoopId, indent: usize, f: &mut fmt::Formatter) -> fmt::Result {
    let l = info.get(id);
    let pad = " ".repeat(indent);

    if l.is_root() {
        writeln!(f, "{}{}", pad, Paint::white("[Root Loop]").bold())?;
    } else {
        writeln!(
            f,
            "{}{} {}",
            pad,
            Paint::white("Loop Header:").bold(),
            l.header().unwrap()
        )?;
    }

    writeln!(
        f,
        "{}  Depth: {} | Reducible: {}",
        pad,
        l.depth(),
        l.is_reducible()
    )?;

    if !l.latches().is_empty() {
        let mut latches: Vec<_> = l.latches().iter().copied().collect();
        latches.sort();
        write!(f, "{}  Latches:", pad)?;
        for latch in latches {
            write!(f, " {}", latch)?;
        }
        writeln!(f)?;
    }

    if l.is_reducible() {
        let mut blocks: Vec<_> = l.blocks().iter().copied().collect();
        blocks.sort();
        write!(f, "{}  Blocks ({}):", pad, blocks.len())?;
        for bb in blocks {
            write!(f, " {}", bb)?;
        }
        writeln!(f)?;

        if !l.exits().is_empty() {
            writeln!(f, "{}  Exits:", pad)?;
            for (src, dst) in l.exits() {
                writeln!(f, "{}    {} -> {}", pad, src, dst)?;
            }
        }

        if !l.nested_loops().is_empty() {
            writeln!(f, "{}  Nested Loops:", pad)?;
            for nested in l.nested_loops() {
                fmt_loop(info, *nested, indent + 2, f)?;
            }
        }
    }

    Ok(())
}

impl fmt::Display for LoopInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", Paint::green("========== Loop Tree ==========").bold())?;
        fmt_loop(self, self.root_id(), 0, f)?;
        writeln!(f, "{}", Paint::green("===============================").bold())
    }
}
