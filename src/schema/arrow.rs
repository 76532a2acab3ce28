// src/schema/arrow.rs

use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema};
use std::sync::Arc;

use super::types::OUTPUT_COLUMNS;

/// Arrow type of an output column.
///
/// - `ride_date`               → Date32
/// - `raw_text_field`          → Utf8
/// - `pre_pandemic_comparison` → Float64
/// - everything else           → Int64
pub fn output_column_type(name: &str) -> DataType {
    match name {
        "ride_date" => DataType::Date32,
        "raw_text_field" => DataType::Utf8,
        "pre_pandemic_comparison" => DataType::Float64,
        _ => DataType::Int64,
    }
}

/// Schema of the cleaned table. No column is nullable once cleaning is done.
pub fn build_output_schema() -> Arc<ArrowSchema> {
    let fields: Vec<ArrowField> = OUTPUT_COLUMNS
        .iter()
        .map(|name| ArrowField::new(*name, output_column_type(name), false))
        .collect();

    Arc::new(ArrowSchema::new(fields))
}
