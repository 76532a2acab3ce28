pub mod aliases;
pub mod arrow;
pub mod normalize;
pub mod types;

pub use aliases::{AliasTable, LogicalField};
pub use arrow::build_output_schema;
pub use normalize::{canonical_name, ColumnIndex, SourceColumn};
pub use types::{CleanedRecord, ModeCounts, OutputRow, StagingRecord, OUTPUT_COLUMNS};
