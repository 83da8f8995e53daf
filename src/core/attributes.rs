//! Constant attributes: the immutable payloads carried by `arith.const`
//! operations. Each variant fixes both the value and its [`DataType`], and
//! the pair round-trips through serde.

use crate::core::types::DataType;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ConstAttribute {
    UIntVal(u64),
    SIntVal(i64),
    FloatVal(f64),
    BoolVal(bool),
}

impl ConstAttribute {
    pub fn data_type(&self) -> DataType {
        match self {
            ConstAttribute::UIntVal(_) => DataType::UInt,
            ConstAttribute::SIntVal(_) => DataType::SInt,
            ConstAttribute::FloatVal(_) => DataType::Float,
            ConstAttribute::BoolVal(_) => DataType::Bool,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            ConstAttribute::UIntVal(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_sint(&self) -> Option<i64> {
        match self {
            ConstAttribute::SIntVal(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConstAttribute::FloatVal(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstAttribute::BoolVal(v) => Some(*v),
            _ => None,
        }
    }

    /// True if this attribute is the additive identity of its type.
    pub fn is_zero(&self) -> bool {
        match self {
            ConstAttribute::UIntVal(v) => *v == 0,
            ConstAttribute::SIntVal(v) => *v == 0,
            ConstAttribute::FloatVal(v) => *v == 0.0,
            ConstAttribute::BoolVal(_) => false,
        }
    }

    /// True if this attribute is the multiplicative identity of its type.
    pub fn is_one(&self) -> bool {
        match self {
            ConstAttribute::UIntVal(v) => *v == 1,
            ConstAttribute::SIntVal(v) => *v == 1,
            ConstAttribute::FloatVal(v) => *v == 1.0,
            ConstAttribute::BoolVal(_) => false,
        }
    }

    /// True if this attribute is the all-ones bit pattern of an integer type.
    pub fn is_all_ones(&self) -> bool {
        match self {
            ConstAttribute::UIntVal(v) => *v == u64::MAX,
            ConstAttribute::SIntVal(v) => *v == -1,
            _ => false,
        }
    }
}

impl From<u64> for ConstAttribute {
    fn from(v: u64) -> ConstAttribute {
        ConstAttribute::UIntVal(v)
    }
}

impl From<i64> for ConstAttribute {
    fn from(v: i64) -> ConstAttribute {
        ConstAttribute::SIntVal(v)
    }
}

impl From<f64> for ConstAttribute {
    fn from(v: f64) -> ConstAttribute {
        ConstAttribute::FloatVal(v)
    }
}

impl From<bool> for ConstAttribute {
    fn from(v: bool) -> ConstAttribute {
        ConstAttribute::BoolVal(v)
    }
}

impl fmt::Display for ConstAttribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConstAttribute::UIntVal(v) => write!(f, "{}", v),
            ConstAttribute::SIntVal(v) => write!(f, "{}", v),
            ConstAttribute::FloatVal(v) => write!(f, "{}", v),
            ConstAttribute::BoolVal(v) => write!(f, "{}", v),
        }
    }
}
