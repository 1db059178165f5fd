//! Behavioral tests for position tracking, fast-move classification, and
//! reset insertion over whole files.
use gcode_merge::classify::{TAG_FAST, TAG_RESET};
use gcode_merge::merge::{self, format, MergeEngine, MergeOptions};
use gcode_merge::parser::LineKind;
use gcode_merge::{PostProfile, ProgramFile, ToolCatalog};

fn analyzed(name: &str, source: &str) -> ProgramFile {
    let mut file = ProgramFile::from_source(name, source);
    file.analyze(&PostProfile::embedded());
    file
}

#[test]
fn test_coordinates_chain_through_whole_file() {
    let file = analyzed(
        "1.nc",
        "(Adaptive1)\n\
         G90 G94 G17 G21\n\
         T1 M6\n\
         G0 X10 Y10\n\
         G1 Z-2 F300\n\
         (stepover)\n\
         G1 X20 F600\n\
         Y25\n\
         G1 Z5\n",
    );

    for window in file.lines.windows(2) {
        assert_eq!(window[1].start, window[0].end);
    }
}

#[test]
fn test_classification_of_canonical_sequence() {
    let file = analyzed("1.nc", "G0 Z5\nG1 X10 Y10\nG1 Z-2\nG1 Z5\n");

    let motion: Vec<_> = file
        .lines
        .iter()
        .filter(|l| l.kind() == LineKind::Motion && !l.has_tag(TAG_RESET))
        .collect();
    assert_eq!(motion.len(), 4);

    // Horizontal at clearance is fast, the plunge is not, the retract is
    assert!(!motion[0].is_fast_move);
    assert!(motion[1].is_fast_move);
    assert!(motion[1].fast_move_reason.is_some());
    assert!(!motion[2].is_fast_move);
    assert!(motion[3].is_fast_move);
    assert!(motion[3].fast_move_reason.is_none());
}

#[test]
fn test_resets_only_at_fast_to_feed_boundaries() {
    let file = analyzed(
        "1.nc",
        "G0 X10 Y10\n\
         G0 X20 Y20\n\
         G1 Z-2 F300\n\
         G1 X30 F600\n\
         G1 Z5\n\
         G0 X40 Y40\n\
         G1 Z-2 F300\n",
    );

    let texts: Vec<&str> = file.lines.iter().map(|l| l.text()).collect();
    assert_eq!(
        texts,
        vec![
            "G0 X10 Y10",
            "G0 X20 Y20",
            "G1",
            "G1 Z-2 F300",
            "G1 X30 F600",
            "G1 Z5",
            "G0 X40 Y40",
            "G1",
            "G1 Z-2 F300",
        ]
    );

    let resets: Vec<_> = file.lines.iter().filter(|l| l.has_tag(TAG_RESET)).collect();
    assert_eq!(resets.len(), 2);
    // Each reset sits exactly at its transition point
    assert_eq!(resets[0].start, resets[0].end);
    assert_eq!(resets[0].end.x, 20.0);
    assert_eq!(resets[1].end.x, 40.0);
}

#[test]
fn test_reset_survives_comments_between_moves() {
    let file = analyzed(
        "1.nc",
        "G0 X10 Y10\n\
         (lead-in)\n\
         \n\
         G1 Z-1 F200\n",
    );

    let reset_at = file
        .lines
        .iter()
        .position(|l| l.has_tag(TAG_RESET))
        .expect("reset inserted");
    assert_eq!(file.lines[reset_at + 1].text(), "G1 Z-1 F200");
}

#[test]
fn test_drilling_file_keeps_programmed_motion() {
    let file = analyzed(
        "4 - holes.nc",
        "(Drill1)\nT2 M6\nG0 X5 Y5\nG1 Z-4 F120\nG1 Z5\n",
    );

    assert!(file.is_drilling);
    assert!(file.bounds.is_none());
    for line in &file.lines {
        assert!(!line.is_fast_move);
        assert!(!line.has_tag(TAG_FAST));
        assert!(!line.has_tag(TAG_RESET));
        assert_eq!(line.start, Default::default());
    }
}

#[test]
fn test_group_statistics_equal_member_union() {
    let a = analyzed("1.nc", "(SETUP: S)\nT1 M6\nG0 X10 Y5\nG1 Z-2 F300\n");
    let b = analyzed("2.nc", "(SETUP: S)\nT1 M6\nG0 X-4 Y30\nG1 Z-1 F300\n");

    let expected = a
        .bounds
        .expect("bounds for a")
        .union(&b.bounds.expect("bounds for b"));
    let expected_block = format::bounds_block("GROUP", &expected);

    let groups = merge::group_programs(vec![a, b]);
    let profile = PostProfile::embedded();
    let mut engine = MergeEngine::new(&profile, MergeOptions::default());
    let merged = engine.merge_all(groups, &ToolCatalog::new());

    assert_eq!(merged.len(), 1);
    for line in expected_block {
        assert!(merged[0].text.contains(&line), "missing {:?}", line);
    }
}

#[test]
fn test_axis_words_outside_motion_lines_still_tracked() {
    // An axis word on an otherwise unrecognized line must move the state
    let file = analyzed("1.nc", "M209 X2\nG0 X10 Y10\nG1 Z-1 F100\n");

    let rapid = file
        .lines
        .iter()
        .find(|l| l.text() == "G0 X10 Y10")
        .expect("rapid line");
    assert_eq!(rapid.start.x, 2.0);
}
