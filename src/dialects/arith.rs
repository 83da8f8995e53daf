//! The `arith` dialect: constants, integer/float arithmetic, bitwise
//! logic, shifts, comparisons and casts. None of these operations
//! terminate a block or carry side effects.

use crate::core::{
    CmpPredicate, ConstAttribute, DataType, Input, OpId, Opcode, Operation, Payload, Region,
};

fn binary(opcode: Opcode, data_type: DataType, x: OpId, y: OpId) -> Operation {
    Operation::new(
        opcode,
        data_type,
        vec![Input::to(x), Input::to(y)],
        Payload::None,
    )
}

/// A typed constant; the result type comes from the attribute.
pub fn constant(attr: ConstAttribute) -> Operation {
    Operation::new(Opcode::Const, attr.data_type(), Vec::new(), Payload::Attr(attr))
}

pub fn add(data_type: DataType, x: OpId, y: OpId) -> Operation {
    binary(Opcode::Add, data_type, x, y)
}

pub fn sub(data_type: DataType, x: OpId, y: OpId) -> Operation {
    binary(Opcode::Sub, data_type, x, y)
}

pub fn mul(data_type: DataType, x: OpId, y: OpId) -> Operation {
    binary(Opcode::Mul, data_type, x, y)
}

pub fn div(data_type: DataType, x: OpId, y: OpId) -> Operation {
    binary(Opcode::Div, data_type, x, y)
}

pub fn and(data_type: DataType, x: OpId, y: OpId) -> Operation {
    binary(Opcode::And, data_type, x, y)
}

pub fn or(data_type: DataType, x: OpId, y: OpId) -> Operation {
    binary(Opcode::Or, data_type, x, y)
}

pub fn xor(data_type: DataType, x: OpId, y: OpId) -> Operation {
    binary(Opcode::Xor, data_type, x, y)
}

/// Bitwise complement of a single integer operand.
pub fn not(data_type: DataType, x: OpId) -> Operation {
    Operation::new(Opcode::Not, data_type, vec![Input::to(x)], Payload::None)
}

/// Arithmetic shift left (signed operands).
pub fn sal(data_type: DataType, x: OpId, y: OpId) -> Operation {
    binary(Opcode::Sal, data_type, x, y)
}

/// Arithmetic shift right (signed operands).
pub fn sar(data_type: DataType, x: OpId, y: OpId) -> Operation {
    binary(Opcode::Sar, data_type, x, y)
}

/// Logical shift left (unsigned operands).
pub fn shl(data_type: DataType, x: OpId, y: OpId) -> Operation {
    binary(Opcode::Shl, data_type, x, y)
}

/// Logical shift right (unsigned operands).
pub fn shr(data_type: DataType, x: OpId, y: OpId) -> Operation {
    binary(Opcode::Shr, data_type, x, y)
}

/// Predicated comparison producing a bool.
pub fn compare(pred: CmpPredicate, x: OpId, y: OpId) -> Operation {
    Operation::new(
        Opcode::Cmp,
        DataType::Bool,
        vec![Input::to(x), Input::to(y)],
        Payload::Pred(pred),
    )
}

/// Reinterpreting conversion to the target type; unconstrained.
pub fn cast(data_type: DataType, x: OpId) -> Operation {
    Operation::new(Opcode::Cast, data_type, vec![Input::to(x)], Payload::None)
}

fn input_data_type(op: &Operation, index: usize, region: &Region) -> DataType {
    let def = op.input(index).defining_op().unwrap();
    region.op(def).data_type()
}

fn verify_inputs_same_as_result(op: &Operation, region: &Region) -> Result<(), String> {
    for index in 0..op.inputs_num() {
        if input_data_type(op, index, region) != op.data_type() {
            return Err(format!(
                "Operation {}: input #{} has incompatible data type.",
                op.mnemonic(),
                index
            ));
        }
    }
    Ok(())
}

pub(crate) fn verify(op: &Operation, region: &Region) -> Result<(), String> {
    match op.opcode() {
        Opcode::Const => {
            let attr = op.attr().unwrap();
            if attr.data_type() != op.data_type() {
                return Err(format!(
                    "Operation {}: attribute has incompatible data type.",
                    op.mnemonic()
                ));
            }
            Ok(())
        }
        Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => {
            if op.data_type().is_bool() || op.data_type() == DataType::None {
                return Err(format!(
                    "Operation {}: bool data type is not supported.",
                    op.mnemonic()
                ));
            }
            verify_inputs_same_as_result(op, region)
        }
        Opcode::And | Opcode::Or | Opcode::Xor | Opcode::Not => {
            if !op.data_type().is_integer() {
                return Err(format!(
                    "Operation {}: integer data type is required.",
                    op.mnemonic()
                ));
            }
            verify_inputs_same_as_result(op, region)
        }
        Opcode::Sal | Opcode::Sar => {
            if !op.data_type().is_signed() {
                return Err(format!(
                    "Operation {}: signed integer data type is required.",
                    op.mnemonic()
                ));
            }
            verify_inputs_same_as_result(op, region)
        }
        Opcode::Shl | Opcode::Shr => {
            if !op.data_type().is_unsigned() {
                return Err(format!(
                    "Operation {}: unsigned integer data type is required.",
                    op.mnemonic()
                ));
            }
            verify_inputs_same_as_result(op, region)
        }
        Opcode::Cmp => {
            if input_data_type(op, 0, region) != input_data_type(op, 1, region) {
                return Err(format!(
                    "Operation {}: inputs have different data types.",
                    op.mnemonic()
                ));
            }
            Ok(())
        }
        Opcode::Cast => Ok(()),
        _ => Ok(()),
    }
}
