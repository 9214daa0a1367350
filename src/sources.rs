//! Result-file discovery.
//!
//! Turns an ingest source argument into the list of files to read: the
//! `all` keyword expands `ingest.patterns` under `ingest.root`, anything
//! else is a single path.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, StartupError};

/// Keyword meaning "every known result file".
pub const ALL_SOURCES: &str = "all";

/// Files matching any configured pattern directly under `ingest.root`,
/// de-duplicated and sorted.
pub fn discover_result_files(config: &Config) -> Result<Vec<PathBuf>> {
    let patterns = build_globset(&config.ingest.patterns)?;
    Ok(match_files(&config.ingest.root, &patterns))
}

/// True when `source` should be expanded as a glob rather than opened.
/// An existing file wins over glob syntax in its name.
pub fn is_pattern(config: &Config, source: &str) -> bool {
    source != ALL_SOURCES
        && source.contains(['*', '?', '['])
        && literal_file(config, source).is_none()
}

/// `source` as an existing file, tried as given and then under
/// `ingest.root`.
fn literal_file(config: &Config, source: &str) -> Option<PathBuf> {
    let path = Path::new(source);
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    let under_root = config.ingest.root.join(path);
    (path.is_relative() && under_root.is_file()).then_some(under_root)
}

fn match_files(dir: &Path, patterns: &GlobSet) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut files = BTreeSet::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("skipping unreadable entry under {}: {}", dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if patterns.is_match(entry.file_name()) {
            files.insert(entry.into_path());
        }
    }

    files.into_iter().collect()
}

/// Resolves an ingest argument to concrete files.
///
/// `all` expands the configured patterns. A source containing glob
/// characters matches file names in its directory (`ingest.root` when it
/// has none). A pattern with no matches and a single path that does not
/// exist are both `NotFound`. Relative paths are tried as given first,
/// then under `ingest.root`.
pub fn resolve_source(config: &Config, source: &str) -> Result<Vec<PathBuf>> {
    if source == ALL_SOURCES {
        let files = discover_result_files(config)?;
        if files.is_empty() {
            return Err(StartupError::NotFound(format!(
                "no result files found in {} matching {}",
                config.ingest.root.display(),
                config.ingest.patterns.join(", ")
            )));
        }
        return Ok(files);
    }

    if let Some(file) = literal_file(config, source) {
        return Ok(vec![file]);
    }
    if is_pattern(config, source) {
        return resolve_pattern(config, source);
    }

    Err(StartupError::NotFound(format!("file {} not found", source)))
}

fn resolve_pattern(config: &Config, source: &str) -> Result<Vec<PathBuf>> {
    let path = Path::new(source);
    let name_pattern = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        None => config.ingest.root.clone(),
        Some(p) if p.is_dir() || p.is_absolute() => p.to_path_buf(),
        Some(p) => config.ingest.root.join(p),
    };

    let files = match_files(&dir, &build_globset(&[name_pattern])?);
    if files.is_empty() {
        return Err(StartupError::NotFound(format!(
            "no result files found matching {}",
            source
        )));
    }
    Ok(files)
}

/// `srdb sources`: prints the files `ingest all` would read.
pub fn list_sources(config: &Config) -> Result<()> {
    let files = discover_result_files(config)?;

    println!("root:     {}", config.ingest.root.display());
    println!("patterns: {}", config.ingest.patterns.join(", "));
    println!();

    if files.is_empty() {
        println!("No result files found.");
        return Ok(());
    }

    println!("{:<48} {:>10}", "FILE", "BYTES");
    for file in &files {
        let size = std::fs::metadata(file).map(|m| m.len()).unwrap_or(0);
        println!("{:<48} {:>10}", file.display(), size);
    }

    Ok(())
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| StartupError::Validation(format!("invalid pattern '{}': {}", pattern, e)))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| StartupError::Validation(e.to_string()))
}
