//! Run orchestration
//!
//! Scans the working directory, builds the tool catalog, loads and
//! analyzes program files, and writes the merged outputs plus the run
//! log. All file I/O lives here; failures abort the run.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

use crate::catalog::ToolCatalog;
use crate::config::Config;
use crate::merge::{self, MergeEngine, MergeOptions};
use crate::profile;
use crate::program::ProgramFile;

/// Plain-text run log, truncated at start and closed at end
pub struct RunLog {
    writer: BufWriter<File>,
}

impl RunLog {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create run log: {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Append one line
    pub fn line(&mut self, message: &str) -> Result<()> {
        writeln!(self.writer, "{}", message).context("Failed to write run log")
    }

    /// Flush and close
    pub fn finish(mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush run log")
    }
}

/// Enumerate source files in ascending modification-time order
///
/// Ties fall back to name order so repeated runs are deterministic.
/// Subdirectories, including previously written setup folders, are
/// skipped.
pub fn scan_sources(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read working directory: {}", dir.display()))?;

    let mut sources: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("Failed to read directory entry in {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let wanted = path
            .extension()
            .map(|e| e.to_string_lossy().eq_ignore_ascii_case(extension))
            .unwrap_or(false);
        if !wanted {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .with_context(|| format!("Failed to stat {}", path.display()))?;
        sources.push((modified, path));
    }

    sources.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    Ok(sources.into_iter().map(|(_, path)| path).collect())
}

/// Execute one merge run end to end
pub fn run(config: &Config) -> Result<()> {
    let profile = profile::resolve(config)?;
    let extension = config.extension.as_deref().unwrap_or(&profile.extension);
    log::info!(
        "merging {} sources in {} with profile {}",
        extension,
        config.working_dir.display(),
        profile.name
    );

    let mut log = RunLog::create(&config.log_file)?;
    log.line(&format!("scanning {}", config.working_dir.display()))?;

    let mut sources = scan_sources(&config.working_dir, extension)?;
    sources.retain(|path| path != &config.log_file);
    log.line(&format!("found {} source files", sources.len()))?;

    // The catalog must be complete before any file is kept as content,
    // since it decides which files are definitions
    let mut catalog = ToolCatalog::new();
    let mut machining: Vec<(PathBuf, String)> = Vec::new();
    for path in sources {
        let source = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read program file: {}", path.display()))?;
        if !catalog.absorb_file(&path, &source) {
            machining.push((path, source));
        }
    }

    let mut tools: Vec<_> = catalog.iter().collect();
    tools.sort_by(|a, b| a.0.cmp(b.0));
    for (id, definition) in tools {
        log.line(&format!(
            "tool {} -> D{:.2} ({})",
            id,
            definition.diameter,
            definition.source.display()
        ))?;
    }

    let mut files = Vec::with_capacity(machining.len());
    for (path, source) in machining {
        let mut file = ProgramFile::from_source(path, &source);
        file.analyze(&profile);
        log::debug!("analyzed {} as {}", file.file_name(), file.display_name);

        let setup = file.setup_name.as_deref().unwrap_or(merge::UNKNOWN_SETUP);
        let z_note = file
            .z_offset
            .map(|z| format!(", z-offset {}", z))
            .unwrap_or_default();
        log.line(&format!(
            "loaded {} \"{}\" (tool {}, setup {}, op {}{})",
            file.file_name(),
            file.display_name,
            file.tool_id,
            setup,
            file.operation_index,
            z_note
        ))?;
        files.push(file);
    }

    merge::order_by_operation(&mut files);
    let groups = merge::group_programs(files);

    let options = MergeOptions {
        feed_override: config.feed_override,
        filter_tags: config.filter_tags.clone(),
    };
    let mut engine = MergeEngine::new(&profile, options);
    let merged = engine.merge_all(groups, &catalog);
    let group_count = merged.len();

    for program in &merged {
        let dir = config.working_dir.join(&program.setup_dir);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
        let path = dir.join(&program.file_name);
        fs::write(&path, &program.text)
            .with_context(|| format!("Failed to write merged program: {}", path.display()))?;
        log.line(&format!(
            "wrote {} ({} ops, {} lines)",
            path.display(),
            program.index.len(),
            program.text.lines().count()
        ))?;
    }

    log.line(&format!("done ({} groups)", group_count))?;
    log.finish()?;
    log::info!("wrote {} merged programs", group_count);
    Ok(())
}
