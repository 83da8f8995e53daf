//! The `builtin` dialect: function parameters and value copies.

use crate::core::{DataType, Input, OpId, Opcode, Operation, Payload, Region};

/// A function parameter of the given type. Parameters have no inputs and
/// are never eliminated: function signatures are considered fixed.
pub fn param(data_type: DataType) -> Operation {
    Operation::new(Opcode::Param, data_type, Vec::new(), Payload::None)
}

/// A copy of a value; the result type mirrors the operand type.
pub fn copy(data_type: DataType, x: OpId) -> Operation {
    Operation::new(Opcode::Copy, data_type, vec![Input::to(x)], Payload::None)
}

pub(crate) fn verify(op: &Operation, region: &Region) -> Result<(), String> {
    if op.isa(Opcode::Copy) {
        let def = op.input(0).defining_op().unwrap();
        if region.op(def).data_type() != op.data_type() {
            return Err(format!(
                "Operation {}: input has incompatible data type.",
                op.mnemonic()
            ));
        }
    }
    Ok(())
}
