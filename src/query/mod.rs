//! Filter-query parsing and SQL compilation

pub mod compile;
pub mod filter;

pub use compile::{compile_clauses, param, CompileError, SelectBuilder};
pub use filter::{parse, FilterClause, FilterOp, FilterValue, ParseError, ParseMode};
