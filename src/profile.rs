//! Post profiles
//!
//! Output-dialect settings loaded from TOML: motion mnemonics, the
//! clearance convention, preamble state words, and formatting widths. A
//! generic milling profile ships embedded in the binary; a profile file
//! can replace it per run.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::Config;

/// Root profile file structure (matches TOML)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProfileFile {
    pub profile: ProfileMeta,
    #[serde(default)]
    pub post: PostSettings,
}

/// Profile metadata
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProfileMeta {
    pub name: String,
    pub description: Option<String>,
}

/// Post settings as written in TOML, every field optional
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PostSettings {
    pub clearance_z: Option<f64>,
    pub rapid_word: Option<String>,
    pub feed_word: Option<String>,
    pub preamble_words: Option<String>,
    pub home_words: Option<String>,
    pub default_feed: Option<f64>,
    pub code_column: Option<usize>,
    pub extension: Option<String>,
}

/// Runtime profile with every setting resolved
#[derive(Debug, Clone, PartialEq)]
pub struct PostProfile {
    pub name: String,
    pub description: Option<String>,
    /// Height the tracker starts at and restore lines return to
    pub clearance_z: f64,
    /// Rapid-traverse mnemonic substituted into fast lines
    pub rapid_word: String,
    /// Controlled-motion mnemonic used for feed resets
    pub feed_word: String,
    /// Modal state words carried once at the top of a merged program
    pub preamble_words: String,
    /// Return-to-home line closing a merged program
    pub home_words: String,
    /// Feed rate used when no override is configured
    pub default_feed: f64,
    /// Column where endpoint comments start
    pub code_column: usize,
    /// Program file extension, without the dot
    pub extension: String,
}

impl Default for PostProfile {
    fn default() -> Self {
        Self {
            name: "generic".to_string(),
            description: None,
            clearance_z: 5.0,
            rapid_word: "G0".to_string(),
            feed_word: "G1".to_string(),
            preamble_words: "G90 G94 G17 G21".to_string(),
            home_words: "G28".to_string(),
            default_feed: 1000.0,
            code_column: 40,
            extension: "nc".to_string(),
        }
    }
}

impl From<ProfileFile> for PostProfile {
    fn from(file: ProfileFile) -> Self {
        let base = Self::default();
        let post = file.post;
        Self {
            name: file.profile.name,
            description: file.profile.description,
            clearance_z: post.clearance_z.unwrap_or(base.clearance_z),
            rapid_word: post.rapid_word.unwrap_or(base.rapid_word),
            feed_word: post.feed_word.unwrap_or(base.feed_word),
            preamble_words: post.preamble_words.unwrap_or(base.preamble_words),
            home_words: post.home_words.unwrap_or(base.home_words),
            default_feed: post.default_feed.unwrap_or(base.default_feed),
            code_column: post.code_column.unwrap_or(base.code_column),
            extension: post.extension.unwrap_or(base.extension),
        }
    }
}

impl PostProfile {
    /// Load the embedded generic profile
    pub fn embedded() -> Self {
        let embedded_toml = include_str!("../resources/profiles/generic.post-profile.toml");

        match toml::from_str::<ProfileFile>(embedded_toml) {
            Ok(file) => PostProfile::from(file),
            Err(e) => {
                log::warn!(
                    "Failed to parse embedded generic profile: {}. Using built-in defaults.",
                    e
                );
                PostProfile::default()
            }
        }
    }

    /// Load a profile from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile file: {}", path.display()))?;
        let file: ProfileFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse profile file: {}", path.display()))?;
        Ok(PostProfile::from(file))
    }

    /// Preamble line carrying modal state plus the effective feed rate
    pub fn preamble(&self, feed: f64) -> String {
        format!("{} F{}", self.preamble_words, feed)
    }
}

/// Resolve the effective profile for a run
///
/// An explicitly requested profile file must load and parse. Without one,
/// the first `default.post-profile.toml` found in the user profile
/// directories is used, and the embedded generic profile backs everything.
pub fn resolve(config: &Config) -> Result<PostProfile> {
    if let Some(path) = &config.profile_path {
        return PostProfile::from_file(path);
    }

    for dir in &config.profile_dirs {
        let candidate = dir.join("default.post-profile.toml");
        if candidate.is_file() {
            match PostProfile::from_file(&candidate) {
                Ok(profile) => return Ok(profile),
                Err(e) => {
                    log::warn!("Skipping profile {}: {:#}", candidate.display(), e);
                }
            }
        }
    }

    Ok(PostProfile::embedded())
}
