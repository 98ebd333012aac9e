//! A canonical LR(1) parse table generator.
//!
//! The pipeline is grammar → FIRST sets → LR(1) item sets → ACTION/GOTO
//! tables, and [`parse`] drives the resulting tables over a token sequence.

pub mod collection;
pub mod first_sets;
pub mod grammar;
pub mod item;
pub mod parse;
pub mod table;
pub mod types;

pub use crate::{
    parse::parse,
    table::{build_tables, Config},
};
