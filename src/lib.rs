//! GCode program merger
//!
//! Consolidates per-operation CAM program files into combined per-setup,
//! per-tool programs, tracking the absolute tool position through every
//! line and reclassifying geometrically safe moves as rapid traverses.
//!
//! This library provides:
//! - GCode line parsing and position tracking
//! - Fast-move classification and feed-reset insertion
//! - Tool catalog and per-file metadata extraction
//! - Grouping, serialization, and run orchestration

pub mod catalog;
pub mod classify;
pub mod config;
pub mod merge;
pub mod parser;
pub mod profile;
pub mod program;
pub mod track;
pub mod workspace;

// Re-exports for clean public API
pub use catalog::ToolCatalog;
pub use config::Config;
pub use merge::{MergeEngine, MergeOptions, MergedProgram};
pub use parser::{parse_line, LineKind, LineRecord};
pub use profile::PostProfile;
pub use program::ProgramFile;
pub use track::PositionTracker;
