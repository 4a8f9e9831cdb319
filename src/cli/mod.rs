//! Command-line front end: argument parsing, literal parsing and the
//! fetch-and-print loop.

mod args;
mod literal;
mod run;

pub use args::{parse_sort, parse_where, Cli, SortArg, WhereArg};
pub use literal::{parse_literal, parse_operand};
pub use run::{build_state, run};
