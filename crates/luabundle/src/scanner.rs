//! Source scanner that builds the dependency index from a source tree

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;
use walkdir::WalkDir;

use crate::{dependency_index::DependencyIndex, module_path::is_module_file, types::RequireStatement};

/// `local x = require "a.b"`, `require 'a.b'`, `require("a.b")`, `require ( 'a.b' )`
static LOCAL_REQUIRE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"local\s+(\w+)\s*=\s*require\s*\(?\s*["']([\w.]+)["']\s*\)?"#)
        .expect("require pattern is valid")
});

/// Two files in different directories that share the same index key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCollision {
    pub file_name: String,
    /// File whose requires were recorded
    pub kept: PathBuf,
    /// File whose requires were dropped
    pub ignored: PathBuf,
}

/// Result of scanning a source tree
#[derive(Debug, Default)]
pub struct ScanReport {
    pub index: DependencyIndex,
    /// Number of module files visited
    pub files_scanned: usize,
    /// Files that could not be read
    pub skipped: Vec<PathBuf>,
    pub collisions: Vec<NameCollision>,
}

/// Walk `root` and record the local requires of every module file that
/// declares at least one. Always a full rebuild.
pub fn scan(root: &Path) -> ScanReport {
    let mut report = ScanReport::default();
    let mut recorded_paths: FxHashMap<String, PathBuf> = FxHashMap::default();

    let walker = WalkDir::new(root).sort_by_file_name().into_iter();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable directory entry: {e}");
                if let Some(path) = e.path() {
                    report.skipped.push(path.to_path_buf());
                }
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() || !is_module_file(path) {
            continue;
        }
        report.files_scanned += 1;

        let code = match std::fs::read_to_string(path) {
            Ok(code) => code,
            Err(e) => {
                warn!("Skipping {}: {e}", path.display());
                report.skipped.push(path.to_path_buf());
                continue;
            }
        };

        let requires = extract_local_requires(&code);
        if requires.is_empty() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().into_owned();
        debug!(
            "{} declares {} local requires",
            path.display(),
            requires.len()
        );

        if report.index.insert(file_name.clone(), requires) {
            recorded_paths.insert(file_name, path.to_path_buf());
        } else {
            let kept = recorded_paths.get(&file_name).cloned().unwrap_or_default();
            warn!(
                "Index key '{file_name}' already taken by {}; ignoring {}",
                kept.display(),
                path.display()
            );
            report.collisions.push(NameCollision {
                file_name,
                kept,
                ignored: path.to_path_buf(),
            });
        }
    }

    info!(
        "Scanned {} module files, {} declare requires",
        report.files_scanned,
        report.index.len()
    );
    report
}

/// Extract every `local <alias> = require <path>` binding, line by line
pub fn extract_local_requires(code: &str) -> Vec<RequireStatement> {
    code.lines()
        .flat_map(|line| LOCAL_REQUIRE.captures_iter(line))
        .map(|captures| RequireStatement::new(&captures[1], &captures[2]))
        .collect()
}
