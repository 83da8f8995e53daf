//! The canonical data-type lattice of the IR.
//!
//! Bit widths narrower than 64 are not separately represented: integer
//! constants live in 64-bit storage, floats are double-precision. `None`
//! denotes "operation has no result".

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    UInt,
    SInt,
    Float,
    Bool,
    None,
}

impl DataType {
    pub fn is_bool(self) -> bool {
        self == DataType::Bool
    }

    pub fn is_floating(self) -> bool {
        self == DataType::Float
    }

    pub fn is_unsigned(self) -> bool {
        self == DataType::UInt
    }

    pub fn is_signed(self) -> bool {
        self == DataType::SInt
    }

    pub fn is_integer(self) -> bool {
        self.is_unsigned() || self.is_signed()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            DataType::None => "none",
            DataType::Bool => "bool",
            DataType::UInt => "ui",
            DataType::SInt => "si",
            DataType::Float => "f",
        };
        write!(f, "{}", s)
    }
}
