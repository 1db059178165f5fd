//! Fast-move classification and tagging
//!
//! Policy layer over parsed lines: decides which motion lines are safe at
//! rapid traverse, inserts modal feed resets at rapid-to-feed transitions,
//! and derives the per-line tag set used for output filtering.

use crate::parser::record::{LineKind, LineRecord};

/// Tag carried by every line classified as a rapid traverse
pub const TAG_FAST: &str = "FAST";
/// Tag carried by lines whose whole travel stays at or above z=0
pub const TAG_UNENGAGED: &str = "UNENGAGED";
/// Tag carried by synthetic feed-reset lines
pub const TAG_RESET: &str = "RESET-FR";

/// Decide whether a motion line is safe at rapid traverse
///
/// First match wins:
/// 1. The line addresses X and/or Y and both endpoints sit at or above
///    z=0. A horizontal move above the work cannot be engaged in material.
/// 2. The line addresses only Z, moves strictly upward, and ends at or
///    above z=0. A retract away from the work is safe.
/// 3. Everything else keeps the programmed feed.
///
/// A reason string is recorded for case 1 only.
pub fn classify_line(record: &mut LineRecord) {
    if record.kind() != LineKind::Motion {
        return;
    }

    let clear = record.start.z >= 0.0 && record.end.z >= 0.0;
    if (record.has_x() || record.has_y()) && clear {
        record.is_fast_move = true;
        record.fast_move_reason = Some(format!(
            "horizontal with tool clear of work (z {:.3} -> {:.3})",
            record.start.z, record.end.z
        ));
    } else if record.has_z()
        && !record.has_x()
        && !record.has_y()
        && record.end.z > record.start.z
        && record.end.z >= 0.0
    {
        record.is_fast_move = true;
    }
}

/// Insert modal feed resets at rapid-to-feed transitions
///
/// Walks the sequence tracking whether the last motion line was a rapid.
/// When a feed line directly follows a rapid, a bare `feed_word` line is
/// inserted before it, pinned to the transition point and tagged RESET-FR,
/// so the controller's modal motion state leaves rapid mode before cutting
/// resumes. Comments, boilerplate, and blanks neither trigger nor clear
/// the tracking. Feed-to-rapid transitions insert nothing.
pub fn insert_resets(records: Vec<LineRecord>, feed_word: &str) -> Vec<LineRecord> {
    let mut result = Vec::with_capacity(records.len());
    let mut last_fast: Option<LineRecord> = None;

    for record in records {
        if record.kind() != LineKind::Motion {
            result.push(record);
            continue;
        }

        if let Some(previous) = last_fast.take() {
            if !record.is_fast_move {
                let mut reset = previous.clone_with_text(feed_word);
                reset.start = previous.end;
                reset.end = previous.end;
                reset.add_tag(TAG_RESET);
                result.push(reset);
            }
        }

        if record.is_fast_move {
            last_fast = Some(record.clone());
        }
        result.push(record);
    }

    result
}

/// Derive the tag set for one motion line
///
/// Adds FAST for rapids, one tag concatenating the addressed axis letters
/// in X,Y,Z order (possibly the empty string), and UNENGAGED when both
/// endpoints sit at or above z=0, rapid or not.
pub fn derive_tags(record: &mut LineRecord) {
    if record.kind() != LineKind::Motion {
        return;
    }

    if record.is_fast_move {
        record.add_tag(TAG_FAST);
    }

    let mut axes = String::new();
    if record.has_x() {
        axes.push('X');
    }
    if record.has_y() {
        axes.push('Y');
    }
    if record.has_z() {
        axes.push('Z');
    }
    record.add_tag(axes);

    if record.start.z >= 0.0 && record.end.z >= 0.0 {
        record.add_tag(TAG_UNENGAGED);
    }
}
