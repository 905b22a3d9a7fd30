//! Row and execution-result types produced by statements.

mod info;
mod row;

pub use info::{ExecutionInfo, PragmaValue, QueryMetadata};
pub use row::{ColumnNames, NamedRow, Row};
