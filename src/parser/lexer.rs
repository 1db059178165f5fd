//! GCode word lexer
//!
//! Fast, simple word extraction from GCode lines.
//! Focus: split on whitespace and answer the two questions the rest of the
//! crate asks about a word (does it assign an axis, is it post boilerplate).

/// A machine axis addressed by a word like "X10.5"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Upper-case address letter for this axis
    pub fn letter(&self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
        }
    }
}

/// Split a line into its whitespace-delimited words
pub fn words(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Interpret a word as an absolute axis assignment
///
/// A word assigns an axis when its first character is X, Y, or Z
/// (case-insensitive) and the remainder parses as a number. Anything else,
/// including a bare axis letter, is not an assignment and the prior value
/// for that axis stays in effect.
pub fn axis_value(word: &str) -> Option<(Axis, f64)> {
    let mut chars = word.chars();
    let axis = match chars.next()?.to_ascii_uppercase() {
        'X' => Axis::X,
        'Y' => Axis::Y,
        'Z' => Axis::Z,
        _ => return None,
    };

    let value = chars.as_str().parse::<f64>().ok()?;
    Some((axis, value))
}

/// Word prefixes a CAM post repeats at the top of every exported operation:
/// plane/units/distance-mode state, work offsets, tool changes, spindle and
/// miscellaneous codes. The merged program carries this state once.
const BOILERPLATE_PREFIXES: [&str; 8] = ["G90", "G94", "G17", "G21", "G54", "M", "T", "S"];

/// Whether a word matches the boilerplate prefix set (case-insensitive)
pub fn is_boilerplate_word(word: &str) -> bool {
    let upper = word.to_ascii_uppercase();
    BOILERPLATE_PREFIXES
        .iter()
        .any(|prefix| upper.starts_with(prefix))
}
