//! Profile resolution tests: explicit files, the user search path, the
//! embedded fallback, and profile settings reaching the merged output.
use std::fs;
use std::path::{Path, PathBuf};

use gcode_merge::config::Config;
use gcode_merge::{profile, workspace, PostProfile};

fn config_for(dir: &Path) -> Config {
    Config {
        working_dir: dir.to_path_buf(),
        feed_override: None,
        filter_tags: Vec::new(),
        profile_path: None,
        profile_dirs: Vec::new(),
        extension: None,
        log_file: dir.join("run.log"),
        log_level: "info".to_string(),
    }
}

#[test]
fn test_explicit_profile_overrides_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("router.post-profile.toml");
    fs::write(
        &path,
        r#"
[profile]
name = "router"
description = "3-axis router"

[post]
clearance_z = 12.0
extension = "tap"
"#,
    )
    .unwrap();

    let mut config = config_for(dir.path());
    config.profile_path = Some(path);

    let profile = profile::resolve(&config).unwrap();
    assert_eq!(profile.name, "router");
    assert_eq!(profile.clearance_z, 12.0);
    assert_eq!(profile.extension, "tap");
    // Unset fields keep their generic values
    assert_eq!(profile.feed_word, "G1");
    assert_eq!(profile.home_words, "G28");
}

#[test]
fn test_missing_explicit_profile_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(dir.path());
    config.profile_path = Some(dir.path().join("nope.toml"));

    assert!(profile::resolve(&config).is_err());
}

#[test]
fn test_malformed_explicit_profile_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[profile\nname=").unwrap();

    let mut config = config_for(dir.path());
    config.profile_path = Some(path);

    let error = profile::resolve(&config).unwrap_err();
    assert!(format!("{:#}", error).contains("Failed to parse profile file"));
}

#[test]
fn test_embedded_profile_backs_everything() {
    let dir = tempfile::tempdir().unwrap();
    let profile = profile::resolve(&config_for(dir.path())).unwrap();
    assert_eq!(profile, PostProfile::embedded());
    assert_eq!(profile.name, "generic");
}

#[test]
fn test_first_search_dir_with_a_default_wins() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    for (dir, name) in [(&first, "shop"), (&second, "spare")] {
        fs::write(
            dir.path().join("default.post-profile.toml"),
            format!("[profile]\nname = \"{}\"\n", name),
        )
        .unwrap();
    }

    let work = tempfile::tempdir().unwrap();
    let mut config = config_for(work.path());
    config.profile_dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];

    let profile = profile::resolve(&config).unwrap();
    assert_eq!(profile.name, "shop");
}

#[test]
fn test_broken_default_profile_falls_back_to_embedded() {
    let user = tempfile::tempdir().unwrap();
    fs::write(user.path().join("default.post-profile.toml"), "[[[").unwrap();

    let work = tempfile::tempdir().unwrap();
    let mut config = config_for(work.path());
    config.profile_dirs = vec![user.path().to_path_buf()];

    let profile = profile::resolve(&config).unwrap();
    assert_eq!(profile.name, "generic");
}

#[test]
fn test_profile_settings_shape_the_merged_output() {
    let dir = tempfile::tempdir().unwrap();
    let profile_path = dir.path().join("tap.post-profile.toml");
    fs::write(
        &profile_path,
        r#"
[profile]
name = "tap-post"

[post]
clearance_z = 10.0
extension = "tap"
default_feed = 750.0
"#,
    )
    .unwrap();

    fs::write(
        dir.path().join("1 - face.tap"),
        "(Face1)\n(SETUP: Vise)\nT1 M6\nG0 X5 Y5\nG1 Z-1 F100\nG1 Z10\n",
    )
    .unwrap();

    let mut config = config_for(dir.path());
    config.profile_path = Some(profile_path);

    workspace::run(&config).unwrap();

    let out_path: PathBuf = dir
        .path()
        .join("Setup 1 - Vise")
        .join("01 - unknown - T1 - 1 ops.tap");
    let text = fs::read_to_string(&out_path).unwrap();

    assert!(text.contains("G90 G94 G17 G21 F750"));
    // Restore lines and the tracker both honor the custom clearance
    assert!(text.ends_with("G0 Z10.000\nG28\n"));
    assert!(text.contains("->    5.000    5.000   10.000 |"));
}
