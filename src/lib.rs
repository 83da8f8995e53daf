#![doc = include_str!("../README.md")]

pub mod dialects;
pub mod opt;

mod core;
pub use self::core::*;

#[macro_use]
extern crate lazy_static;
