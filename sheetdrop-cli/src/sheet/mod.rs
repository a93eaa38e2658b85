//! Spreadsheet parsing, quality metrics and the pre-upload schema gate.

pub mod quality;
pub mod reader;
pub mod schema;
pub mod table;
pub mod writer;

pub use quality::{analyze, QualityReport};
pub use reader::{read_bytes, Workbook};
pub use schema::{SchemaRegistry, SchemaResult, ValidationMode};
pub use table::SheetTable;
