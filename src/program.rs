//! Source program files
//!
//! One CAM-exported operation per file: its parsed line sequence, the
//! metadata read out of comments and the file name, and the analysis pass
//! that fills in coordinates, fast-move classification, and tags.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;

use crate::classify;
use crate::parser::record::{LineKind, LineRecord};
use crate::parser::parse_line;
use crate::profile::PostProfile;
use crate::track::{Bounds, PositionTracker};

/// Tool id used when a file names no tool
pub const UNKNOWN_TOOL: &str = "T?";

/// One source program file and everything learned about it
#[derive(Debug)]
pub struct ProgramFile {
    path: PathBuf,
    /// Parsed lines in file order, including synthetic resets after analysis
    pub lines: Vec<LineRecord>,
    /// Human-readable name, from the first comment line or the file stem
    pub display_name: String,
    /// Tool id like "T3", or "T?" when the file names none
    pub tool_id: String,
    /// Setup this operation belongs to, when declared
    pub setup_name: Option<String>,
    /// Declared Z offset, when present
    pub z_offset: Option<f64>,
    /// Ordering key parsed from the file name, 0 when absent
    pub operation_index: u32,
    /// Drilling cycles keep their programmed feeds everywhere
    pub is_drilling: bool,
    /// Coordinate extents of the whole file, absent for drilling files
    pub bounds: Option<Bounds>,
}

impl ProgramFile {
    /// Read and parse a program file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read program file: {}", path.display()))?;
        Ok(Self::from_source(path, &source))
    }

    /// Parse program text into a file model
    ///
    /// Malformed content never fails: missing metadata falls back to
    /// defaults and unknown codes pass through as ordinary lines.
    pub fn from_source(path: impl Into<PathBuf>, source: &str) -> Self {
        let path = path.into();
        let mut lines: Vec<LineRecord> = source.lines().map(parse_line).collect();

        if let Some(first) = lines
            .iter_mut()
            .find(|l| l.kind() == LineKind::Motion && l.has_motion())
        {
            first.mark_first_motion();
        }

        let display_name = lines
            .iter()
            .find_map(|l| l.comment_text())
            .map(str::to_string)
            .unwrap_or_else(|| stem_of(&path));
        let tool_id = extract_tool_id(&lines);
        let setup_name = extract_setup_name(&lines);
        let z_offset = extract_z_offset(&lines);
        let operation_index = extract_operation_index(&path);
        let is_drilling = lines
            .iter()
            .filter_map(|l| l.comment_text())
            .any(|text| text.starts_with("Drill"));

        Self {
            path,
            lines,
            display_name,
            tool_id,
            setup_name,
            z_offset,
            operation_index,
            is_drilling,
            bounds: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base file name, used in merged-output headers and logs
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Whether moves in this file may be reclassified as rapids
    pub fn allow_fast_moves(&self) -> bool {
        !self.is_drilling
    }

    /// Track positions, classify rapids, insert feed resets, derive tags
    ///
    /// Drilling files skip tracking and classification entirely: their
    /// lines keep default zero coordinates and only receive tags.
    pub fn analyze(&mut self, profile: &PostProfile) {
        if self.allow_fast_moves() {
            let mut tracker = PositionTracker::new(profile.clearance_z);
            for record in &mut self.lines {
                let (start, end) = tracker.advance(record.text());
                record.start = start;
                record.end = end;
            }
            for record in &mut self.lines {
                classify::classify_line(record);
            }
            let tracked = std::mem::take(&mut self.lines);
            self.lines = classify::insert_resets(tracked, &profile.feed_word);
            self.bounds = Some(tracker.bounds());
        }

        for record in &mut self.lines {
            classify::derive_tags(record);
        }
    }
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn tool_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\bT(\d+)\b").expect("invalid regex pattern"))
}

fn setup_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^SETUP\s*:\s*(.+)$").expect("invalid regex pattern"))
}

fn z_offset_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^Z[ _-]?OFFSET\s*:\s*(-?\d+(?:\.\d+)?)$").expect("invalid regex pattern")
    })
}

fn digits_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+").expect("invalid regex pattern"))
}

/// First `T<digits>` word anywhere in the file, normalized to upper case
fn extract_tool_id(lines: &[LineRecord]) -> String {
    lines
        .iter()
        .find_map(|l| tool_id_pattern().captures(l.text()))
        .map(|caps| format!("T{}", &caps[1]))
        .unwrap_or_else(|| UNKNOWN_TOOL.to_string())
}

/// Value of the first `(SETUP: <name>)` comment
fn extract_setup_name(lines: &[LineRecord]) -> Option<String> {
    lines.iter().filter_map(|l| l.comment_text()).find_map(|t| {
        setup_pattern()
            .captures(t)
            .map(|caps| caps[1].trim().to_string())
    })
}

/// Value of the first `(Z_OFFSET: <number>)` comment
fn extract_z_offset(lines: &[LineRecord]) -> Option<f64> {
    lines.iter().filter_map(|l| l.comment_text()).find_map(|t| {
        z_offset_pattern()
            .captures(t)
            .and_then(|caps| caps[1].parse::<f64>().ok())
    })
}

/// First run of digits in the file name, 0 when absent or out of range
fn extract_operation_index(path: &Path) -> u32 {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .and_then(|name| {
            digits_pattern()
                .find(&name)
                .and_then(|m| m.as_str().parse::<u32>().ok())
        })
        .unwrap_or(0)
}
