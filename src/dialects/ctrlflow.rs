//! The `ctrlflow` dialect: terminators, calls and phi operations.
//!
//! `return`, `jump` and `jumpc` end a block's straight-line flow and must
//! be the last regular operation. `call` is side-effecting but does not
//! terminate its block. Phi operations live in the block's dedicated phi
//! sub-list.

use crate::core::{
    BlockId, DataType, Input, IrisError, OpId, Opcode, Operation, Payload, Region, Result,
};

/// Function return, with an optional returned value.
pub fn ret(input: Option<OpId>) -> Operation {
    let inputs = match input {
        Some(op) => vec![Input::to(op)],
        None => Vec::new(),
    };
    Operation::new(Opcode::Return, DataType::None, inputs, Payload::None)
}

/// Unconditional jump to a block of the parent region.
pub fn jump(target: BlockId) -> Operation {
    Operation::new(
        Opcode::Jump,
        DataType::None,
        Vec::new(),
        Payload::Target(target),
    )
}

/// Conditional jump: takes the edge to `target` when `cond` is true.
pub fn jumpc(target: BlockId, cond: OpId) -> Operation {
    Operation::new(
        Opcode::Jumpc,
        DataType::None,
        vec![Input::to(cond)],
        Payload::Target(target),
    )
}

/// Call of a named function with the given result type and arguments.
pub fn call(callee: &str, data_type: DataType, args: Vec<OpId>) -> Result<Operation> {
    if callee.is_empty() {
        return Err(IrisError::Shape("Call's function name is empty!".to_string()));
    }
    let inputs = args.into_iter().map(Input::to).collect();
    Ok(Operation::new(
        Opcode::Call,
        data_type,
        inputs,
        Payload::Callee(callee.to_string()),
    ))
}

/// Phi combining one value per inflowing edge; at least one input.
pub fn phi(data_type: DataType, inputs: Vec<OpId>) -> Result<Operation> {
    if inputs.is_empty() {
        return Err(IrisError::Shape("Phi has no inputs!".to_string()));
    }
    let inputs = inputs.into_iter().map(Input::to).collect();
    Ok(Operation::new(Opcode::Phi, data_type, inputs, Payload::None))
}

pub(crate) fn verify(op: &Operation, region: &Region) -> std::result::Result<(), String> {
    match op.opcode() {
        Opcode::Jump | Opcode::Jumpc => {
            let target = op.target_basic_block().unwrap();
            if !region.is_basic_block_present(target) {
                return Err(format!(
                    "Operation {}: target basic block is not in the region!",
                    op.mnemonic()
                ));
            }
            if op.isa(Opcode::Jumpc) {
                let cond = op.input(0).defining_op().unwrap();
                if !region.op(cond).data_type().is_bool() {
                    return Err(format!(
                        "Operation {}: condition data type is not bool.",
                        op.mnemonic()
                    ));
                }
            }
            Ok(())
        }
        Opcode::Phi => {
            for index in 0..op.inputs_num() {
                let def = op.input(index).defining_op().unwrap();
                if region.op(def).data_type() != op.data_type() {
                    return Err(format!(
                        "Operation {}: inputs have different data types.",
                        op.mnemonic()
                    ));
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
