//! Merge engine
//!
//! Orders operations, numbers setups, groups program files by
//! (setup, tool), and serializes each group into one merged program
//! carrying a source-line index in its header.

pub mod format;

use crate::catalog::ToolCatalog;
use crate::parser::record::{LineKind, LineRecord};
use crate::profile::PostProfile;
use crate::program::ProgramFile;
use crate::track::Bounds;

/// Setup label used when a file declares none
pub const UNKNOWN_SETUP: &str = "unknown";

/// Output-shaping options taken from the command line
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Feed rate substituted into every F word, when set
    pub feed_override: Option<f64>,
    /// Tags a content line must carry to be emitted
    pub filter_tags: Vec<String>,
}

/// Files sharing one (setup, tool) key, in operation order
#[derive(Debug)]
pub struct MergeGroup {
    pub setup_name: String,
    /// Sequential setup number, first-seen order across the run
    pub setup_number: usize,
    pub tool_id: String,
    pub members: Vec<ProgramFile>,
}

/// One serialized merged program, ready to be written
#[derive(Debug)]
pub struct MergedProgram {
    /// Directory the program belongs in, "Setup <N> - <name>"
    pub setup_dir: String,
    pub file_name: String,
    pub text: String,
    /// Where each member's content begins in the output
    pub index: Vec<IndexEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    /// 1-based output line number of the member's first motion line
    pub line: usize,
    /// Member base file name
    pub source: String,
}

/// Stable ascending sort by operation index
///
/// Ties keep their prior (modification-time) order.
pub fn order_by_operation(files: &mut [ProgramFile]) {
    files.sort_by_key(|f| f.operation_index);
}

/// Group ordered files by (setup, tool)
///
/// Setup numbers are handed out in first-seen order over the ordered file
/// list; groups keep that first-seen key order, and every group's members
/// stay operation-sorted.
pub fn group_programs(files: Vec<ProgramFile>) -> Vec<MergeGroup> {
    let mut setups: Vec<String> = Vec::new();
    let mut groups: Vec<MergeGroup> = Vec::new();

    for file in files {
        let setup_name = file
            .setup_name
            .clone()
            .unwrap_or_else(|| UNKNOWN_SETUP.to_string());
        let setup_number = match setups.iter().position(|s| s == &setup_name) {
            Some(i) => i + 1,
            None => {
                setups.push(setup_name.clone());
                setups.len()
            }
        };

        match groups
            .iter_mut()
            .find(|g| g.setup_name == setup_name && g.tool_id == file.tool_id)
        {
            Some(group) => group.members.push(file),
            None => {
                let tool_id = file.tool_id.clone();
                groups.push(MergeGroup {
                    setup_name,
                    setup_number,
                    tool_id,
                    members: vec![file],
                });
            }
        }
    }

    groups
}

/// Serializes merge groups into program text
pub struct MergeEngine<'a> {
    profile: &'a PostProfile,
    options: MergeOptions,
    /// Run-wide operation counter, advanced by each group's member count
    counter: usize,
}

impl<'a> MergeEngine<'a> {
    pub fn new(profile: &'a PostProfile, options: MergeOptions) -> Self {
        Self {
            profile,
            options,
            counter: 1,
        }
    }

    /// Feed rate written into the output: the override, or the profile's
    pub fn effective_feed(&self) -> f64 {
        self.options
            .feed_override
            .unwrap_or(self.profile.default_feed)
    }

    /// Serialize every group, in group order
    pub fn merge_all(
        &mut self,
        groups: Vec<MergeGroup>,
        catalog: &ToolCatalog,
    ) -> Vec<MergedProgram> {
        groups
            .into_iter()
            .map(|group| self.merge_group(group, catalog))
            .collect()
    }

    /// Serialize one group into its merged program
    pub fn merge_group(&mut self, group: MergeGroup, catalog: &ToolCatalog) -> MergedProgram {
        let mut body: Vec<String> = Vec::new();
        let mut content_starts: Vec<usize> = Vec::new();

        body.push(String::new());
        body.push(self.profile.preamble(self.effective_feed()));
        body.push(String::new());

        if let Some(bounds) = group_bounds(&group) {
            body.extend(format::bounds_block("GROUP", &bounds));
        }

        for member in &group.members {
            let block_start = body.len();
            let mut content_start: Option<usize> = None;

            body.push(format::clearance_restore(
                &self.profile.rapid_word,
                self.profile.clearance_z,
            ));

            for line in &member.lines {
                if line.kind() == LineKind::Comment {
                    body.push(line.text().to_string());
                }
            }

            if let Some(bounds) = &member.bounds {
                body.extend(format::bounds_block("FILE", bounds));
            }

            for line in &member.lines {
                if line.kind() != LineKind::Motion {
                    continue;
                }
                // Filtered lines already contributed to tracking and stats
                if !line.matches_tags(&self.options.filter_tags) {
                    continue;
                }
                if content_start.is_none() && line.is_first_motion() {
                    content_start = Some(body.len());
                }
                body.push(self.render_content_line(line));
            }

            for _ in 0..10 {
                body.push(String::new());
            }

            content_starts.push(content_start.unwrap_or(block_start));
        }

        body.push(format::clearance_restore(
            &self.profile.rapid_word,
            self.profile.clearance_z,
        ));
        body.push(self.profile.home_words.clone());

        // Header length is known up front, so body offsets resolve to
        // final 1-based line numbers
        let header_len = group.members.len() + 2;
        let index: Vec<IndexEntry> = group
            .members
            .iter()
            .zip(&content_starts)
            .map(|(member, offset)| IndexEntry {
                line: header_len + offset + 1,
                source: member.file_name(),
            })
            .collect();

        let mut lines = Vec::with_capacity(header_len + body.len());
        lines.push(format!(
            "(MERGED PROGRAM - SETUP {} - TOOL {} - {} OPS)",
            group.setup_name,
            group.tool_id,
            group.members.len()
        ));
        lines.push("(SOURCE LINE INDEX)".to_string());
        for entry in &index {
            lines.push(format!("({:>5} - {})", entry.line, entry.source));
        }
        lines.extend(body);

        let text = lines.join("\n") + "\n";
        let file_name = self.output_file_name(&group, catalog);
        self.counter += group.members.len();

        MergedProgram {
            setup_dir: format!("Setup {} - {}", group.setup_number, group.setup_name),
            file_name,
            text,
            index,
        }
    }

    /// Substitutions, padding, and the trailing endpoint comment
    fn render_content_line(&self, line: &LineRecord) -> String {
        let mut text = line.text().to_string();
        if let Some(feed) = self.options.feed_override {
            text = format::substitute_feed(&text, feed);
        }
        if line.is_fast_move {
            text = format::substitute_rapid(&text, &self.profile.rapid_word, &self.profile.feed_word);
        }
        let padded = format::pad_code(&text, self.profile.code_column);
        format!("{}{}", padded, format::endpoint_comment(line))
    }

    /// `<counter> - D<diameter> - <tool> - <n> ops.<ext>`
    fn output_file_name(&self, group: &MergeGroup, catalog: &ToolCatalog) -> String {
        let diameter = catalog
            .diameter_of(&group.tool_id)
            .map(|d| format!("D{:.2}", d))
            .unwrap_or_else(|| "unknown".to_string());
        format!(
            "{:02} - {} - {} - {} ops.{}",
            self.counter,
            diameter,
            group.tool_id,
            group.members.len(),
            self.profile.extension
        )
    }
}

/// Componentwise union of the members' individual bounds
fn group_bounds(group: &MergeGroup) -> Option<Bounds> {
    let mut merged: Option<Bounds> = None;
    for member in &group.members {
        if let Some(bounds) = &member.bounds {
            merged = Some(match merged {
                Some(m) => m.union(bounds),
                None => *bounds,
            });
        }
    }
    merged
}
