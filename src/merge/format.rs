//! Merged-output text formatting
//!
//! Pure helpers turning analyzed lines into output text: feed and rapid
//! word substitution, column padding, endpoint comments, and the min/max
//! statistics blocks.

use std::sync::OnceLock;

use regex::Regex;

use crate::parser::record::LineRecord;
use crate::track::Bounds;

fn feed_word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)F[0-9]+(?:\.[0-9]*)?").expect("invalid regex pattern"))
}

/// Replace every F word with the override feed rate
///
/// The replacement is formatted the same way this function matches, so
/// running it again over its own output changes nothing.
pub fn substitute_feed(text: &str, feed: f64) -> String {
    let replacement = format!("F{}", feed);
    feed_word_pattern()
        .replace_all(text, replacement.as_str())
        .into_owned()
}

/// Rewrite a rapid-classified line to carry the rapid mnemonic
///
/// A leading feed word is replaced, a line already leading with the rapid
/// word passes through, and a bare coordinate line gets the rapid word
/// prefixed.
pub fn substitute_rapid(text: &str, rapid_word: &str, feed_word: &str) -> String {
    let trimmed = text.trim_start();
    let (first, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, Some(rest)),
        None => (trimmed, None),
    };

    if same_motion_word(first, feed_word) {
        match rest {
            Some(rest) => format!("{} {}", rapid_word, rest),
            None => rapid_word.to_string(),
        }
    } else if same_motion_word(first, rapid_word) {
        text.to_string()
    } else {
        format!("{} {}", rapid_word, trimmed)
    }
}

/// Compare motion words modulo leading zeros, so G01 matches G1
fn same_motion_word(word: &str, mnemonic: &str) -> bool {
    match (g_number(word), g_number(mnemonic)) {
        (Some(a), Some(b)) => a == b,
        _ => word.eq_ignore_ascii_case(mnemonic),
    }
}

fn g_number(word: &str) -> Option<u32> {
    word.strip_prefix(['G', 'g'])?.parse::<u32>().ok()
}

/// Pad a code line so trailing comments start in a fixed column
///
/// Lines already past the column get a single separating space.
pub fn pad_code(text: &str, width: usize) -> String {
    if text.len() >= width {
        format!("{} ", text)
    } else {
        format!("{:<width$}", text)
    }
}

/// Trailing comment carrying a line's travel and its tags
pub fn endpoint_comment(record: &LineRecord) -> String {
    let tags = record.sorted_tags().join(" ");
    format!(
        "({:8.3} {:8.3} {:8.3} -> {:8.3} {:8.3} {:8.3} | {})",
        record.start.x,
        record.start.y,
        record.start.z,
        record.end.x,
        record.end.y,
        record.end.z,
        tags
    )
}

/// Three-line min/max statistics comment block
pub fn bounds_block(label: &str, bounds: &Bounds) -> Vec<String> {
    vec![
        format!(
            "({} X MIN: {:>10.3} MAX: {:>10.3})",
            label, bounds.min.x, bounds.max.x
        ),
        format!(
            "({} Y MIN: {:>10.3} MAX: {:>10.3})",
            label, bounds.min.y, bounds.max.y
        ),
        format!(
            "({} Z MIN: {:>10.3} MAX: {:>10.3})",
            label, bounds.min.z, bounds.max.z
        ),
    ]
}

/// Line returning the spindle to clearance height
pub fn clearance_restore(rapid_word: &str, clearance_z: f64) -> String {
    format!("{} Z{:.3}", rapid_word, clearance_z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::record::Coordinate;

    #[test]
    fn test_feed_substitution() {
        assert_eq!(substitute_feed("G1 X10 F300", 900.0), "G1 X10 F900");
        assert_eq!(substitute_feed("G1 f300.5 X1 F12", 900.0), "G1 F900 X1 F900");
        assert_eq!(substitute_feed("G1 X10", 900.0), "G1 X10");
    }

    #[test]
    fn test_feed_substitution_is_idempotent() {
        let once = substitute_feed("G1 X10 F300", 620.5);
        let twice = substitute_feed(&once, 620.5);
        assert_eq!(once, "G1 X10 F620.5");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rapid_substitution_replaces_feed_word() {
        assert_eq!(substitute_rapid("G1 X10 Y10", "G0", "G1"), "G0 X10 Y10");
        assert_eq!(substitute_rapid("G01 X10", "G0", "G1"), "G0 X10");
        assert_eq!(substitute_rapid("g1 Z5", "G0", "G1"), "G0 Z5");
    }

    #[test]
    fn test_rapid_substitution_keeps_existing_rapid() {
        assert_eq!(substitute_rapid("G0 X10 Y10", "G0", "G1"), "G0 X10 Y10");
        assert_eq!(substitute_rapid("G00 Z5", "G0", "G1"), "G00 Z5");
    }

    #[test]
    fn test_rapid_substitution_prefixes_bare_lines() {
        assert_eq!(substitute_rapid("X10 Y10", "G0", "G1"), "G0 X10 Y10");
        assert_eq!(substitute_rapid("Z5", "G0", "G1"), "G0 Z5");
    }

    #[test]
    fn test_pad_code() {
        assert_eq!(pad_code("G1 X10", 10), "G1 X10    ");
        // Long lines keep one separating space
        assert_eq!(pad_code("G1 X10 Y20 Z30", 10), "G1 X10 Y20 Z30 ");
    }

    #[test]
    fn test_endpoint_comment() {
        let mut record = LineRecord::from_text("G1 X10");
        record.start = Coordinate::new(0.0, 0.0, 5.0);
        record.end = Coordinate::new(10.0, 0.0, 5.0);
        record.add_tag("X");
        record.add_tag("FAST");

        assert_eq!(
            endpoint_comment(&record),
            "(   0.000    0.000    5.000 ->   10.000    0.000    5.000 | FAST X)"
        );
    }

    #[test]
    fn test_bounds_block() {
        let bounds = Bounds {
            min: Coordinate::new(-1.5, 0.0, -3.25),
            max: Coordinate::new(120.0, 45.5, 5.0),
        };
        let block = bounds_block("FILE", &bounds);
        assert_eq!(
            block,
            vec![
                "(FILE X MIN:     -1.500 MAX:    120.000)",
                "(FILE Y MIN:      0.000 MAX:     45.500)",
                "(FILE Z MIN:     -3.250 MAX:      5.000)",
            ]
        );
    }

    #[test]
    fn test_clearance_restore() {
        assert_eq!(clearance_restore("G0", 5.0), "G0 Z5.000");
    }
}
