//! GCode line parser
//!
//! Clean, fast parsing of GCode source lines with minimal allocations.
//! Focused solely on word extraction and per-line record construction.

pub mod lexer;
pub mod record;

pub use lexer::{axis_value, is_boilerplate_word, words, Axis};
pub use record::{Coordinate, LineKind, LineRecord};

/// Parse a single source line into a record
///
/// This is the main entry point for parsing. The record's classification
/// and static flags are fixed here; motion state is filled in later.
pub fn parse_line(line: &str) -> LineRecord {
    LineRecord::from_text(line)
}
