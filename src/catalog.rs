//! Tool catalog
//!
//! Tool definitions live in dedicated files whose defining line reads like
//! `(T3 D=6.00 CR=0. - ZMIN=-5.4 - flat end mill)`. The catalog maps tool
//! ids to diameters and remembers which file defined them. A file carrying
//! such a line is a definition file and holds no machining content.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

/// A tool's catalog entry
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub diameter: f64,
    /// File the definition was first seen in
    pub source: PathBuf,
}

/// Tool-id to definition registry, first definition wins
#[derive(Debug, Default)]
pub struct ToolCatalog {
    tools: HashMap<String, ToolDefinition>,
}

fn definition_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\(\s*T(\d+)\s+D\s*=\s*(-?\d+(?:\.\d+)?)").expect("invalid regex pattern")
    })
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan one file's text for a tool-definition comment
    ///
    /// Returns true when the file carries a definition and must stay out
    /// of the mergeable set. Duplicate definitions for a tool id keep the
    /// first one seen across the enumeration order.
    pub fn absorb_file(&mut self, path: &Path, source: &str) -> bool {
        let Some(caps) = source
            .lines()
            .find_map(|line| definition_pattern().captures(line.trim_start()))
        else {
            return false;
        };

        let tool_id = format!("T{}", &caps[1]);
        let Ok(diameter) = caps[2].parse::<f64>() else {
            return true;
        };

        match self.tools.entry(tool_id) {
            Entry::Occupied(existing) => {
                log::debug!(
                    "duplicate definition of {} in {}, keeping {}",
                    existing.key(),
                    path.display(),
                    existing.get().source.display()
                );
            }
            Entry::Vacant(slot) => {
                slot.insert(ToolDefinition {
                    diameter,
                    source: path.to_path_buf(),
                });
            }
        }
        true
    }

    pub fn definition(&self, tool_id: &str) -> Option<&ToolDefinition> {
        self.tools.get(tool_id)
    }

    /// Diameter for a tool id, when the catalog knows it
    pub fn diameter_of(&self, tool_id: &str) -> Option<f64> {
        self.tools.get(tool_id).map(|t| t.diameter)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ToolDefinition)> {
        self.tools.iter().map(|(id, def)| (id.as_str(), def))
    }
}
