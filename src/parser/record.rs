//! Parsed line records
//!
//! Minimal data types for a single source line: its fixed classification,
//! static content flags, and the per-run motion state the analysis passes
//! fill in later. No merging or formatting concerns here.

use std::collections::HashSet;

use crate::parser::lexer;

/// An absolute machine position in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Fixed classification of a source line, decided once at parse time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// A line that participates in machining content
    Motion,
    /// A full-line parenthetical comment
    Comment,
    /// Post boilerplate replaced by the merged preamble
    Ignorable,
    /// An empty or whitespace-only line
    Blank,
}

/// A single source line plus everything later passes learn about it
///
/// The text and the static flags never change after parsing. Coordinate
/// state, fast-move classification, and tags are filled in per run.
#[derive(Debug, Clone)]
pub struct LineRecord {
    text: String,
    kind: LineKind,
    has_x: bool,
    has_y: bool,
    has_z: bool,
    has_motion: bool,
    is_first_motion: bool,
    /// Machine position before this line executes
    pub start: Coordinate,
    /// Machine position after this line executes
    pub end: Coordinate,
    /// Whether this line may run at rapid traverse
    pub is_fast_move: bool,
    /// Diagnostic note recorded when the clearance rule fired
    pub fast_move_reason: Option<String>,
    tags: HashSet<String>,
}

impl LineRecord {
    /// Parse a raw source line into a record with its static flags set
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let words = lexer::words(&text);
        let kind = classify_kind(&text, &words);

        let upper = text.to_ascii_uppercase();
        let has_x = upper.contains('X');
        let has_y = upper.contains('Y');
        let has_z = upper.contains('Z');
        let has_motion =
            upper.starts_with("G0") || upper.starts_with("G1") || has_x || has_y || has_z;

        Self {
            text,
            kind,
            has_x,
            has_y,
            has_z,
            has_motion,
            is_first_motion: false,
            start: Coordinate::default(),
            end: Coordinate::default(),
            is_fast_move: false,
            fast_move_reason: None,
            tags: HashSet::new(),
        }
    }

    /// The raw line text as read from the source file
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> LineKind {
        self.kind
    }

    pub fn has_x(&self) -> bool {
        self.has_x
    }

    pub fn has_y(&self) -> bool {
        self.has_y
    }

    pub fn has_z(&self) -> bool {
        self.has_z
    }

    /// Whether the line looks like it produces machine motion
    pub fn has_motion(&self) -> bool {
        self.has_motion
    }

    /// Whether this is the first motion line of its source file
    pub fn is_first_motion(&self) -> bool {
        self.is_first_motion
    }

    pub(crate) fn mark_first_motion(&mut self) {
        self.is_first_motion = true;
    }

    /// Inner text of a comment line, without the parentheses
    pub fn comment_text(&self) -> Option<&str> {
        if self.kind != LineKind::Comment {
            return None;
        }
        let trimmed = self.text.trim();
        let inner = trimmed.strip_prefix('(').unwrap_or(trimmed);
        let inner = inner.strip_suffix(')').unwrap_or(inner);
        Some(inner.trim())
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Whether the line carries every tag in `required`
    ///
    /// An empty requirement matches every line.
    pub fn matches_tags(&self, required: &[String]) -> bool {
        required.iter().all(|tag| self.tags.contains(tag))
    }

    /// Non-empty tags in sorted order, for display
    pub fn sorted_tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self
            .tags
            .iter()
            .map(String::as_str)
            .filter(|t| !t.is_empty())
            .collect();
        tags.sort_unstable();
        tags
    }

    /// Clone this record with different text
    ///
    /// Static flags are re-derived from the new text; coordinate state is
    /// copied so the clone occupies the same position in the motion chain.
    /// Tags and classification start fresh.
    pub fn clone_with_text(&self, text: impl Into<String>) -> Self {
        let mut clone = Self::from_text(text);
        clone.start = self.start;
        clone.end = self.end;
        clone
    }
}

/// Decide the fixed kind of a line
///
/// Blank and comment checks come first; a line whose every word matches the
/// boilerplate prefix set is ignorable; everything else is motion content.
fn classify_kind(text: &str, words: &[&str]) -> LineKind {
    if words.is_empty() {
        return LineKind::Blank;
    }
    if text.trim_start().starts_with('(') {
        return LineKind::Comment;
    }
    if words.iter().all(|w| lexer::is_boilerplate_word(w)) {
        return LineKind::Ignorable;
    }
    LineKind::Motion
}
