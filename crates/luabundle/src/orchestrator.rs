//! Bundling orchestrator
//!
//! Drives one bundling run: load the index and target, plan the functions to
//! inline, generate the bundle, and write it next to the target.

use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use log::{info, warn};

use crate::{
    bundle_plan::BundlePlanBuilder,
    code_generator::{Bundle, CodeGenerator},
    config::{Config, OutputMode},
    dependency_index::DependencyIndex,
    module_path::MODULE_EXTENSION,
    require_graph::RequireGraph,
    sources::SourceCache,
    types::UnresolvedReference,
};

/// Inputs of a single bundling run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequest {
    /// Source tree root that dotted module paths are resolved against
    pub root: PathBuf,
    /// Directory of the target, relative to `root`
    pub sub_dir: PathBuf,
    /// Target file name, e.g. `init.lua`
    pub target: String,
    /// Persisted dependency index
    pub index_path: PathBuf,
}

impl BundleRequest {
    pub fn target_path(&self) -> PathBuf {
        self.root.join(&self.sub_dir).join(&self.target)
    }
}

/// Result of a bundling run
#[derive(Debug, Clone)]
pub struct BundleOutcome {
    /// File the bundle was written to
    pub output_path: PathBuf,
    pub bundle: Bundle,
    /// References left without an inlined definition
    pub unresolved: Vec<UnresolvedReference>,
    /// Require cycles among the modules this run walked through
    pub cycles: Vec<Vec<String>>,
}

impl BundleOutcome {
    /// Whether every planned reference was inlined
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Bundler {
    config: Config,
}

impl Bundler {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Bundle the requested target using the persisted index
    pub fn bundle(&self, request: &BundleRequest) -> Result<BundleOutcome> {
        let index = DependencyIndex::load(&request.index_path)?;
        self.bundle_with_index(request, &index)
    }

    /// Bundle the requested target against an already loaded index
    pub fn bundle_with_index(
        &self,
        request: &BundleRequest,
        index: &DependencyIndex,
    ) -> Result<BundleOutcome> {
        let target_path = request.target_path();
        let original_source = std::fs::read_to_string(&target_path)
            .with_context(|| format!("Failed to read target {}", target_path.display()))?;

        let mut sources = SourceCache::new();

        let mut builder = BundlePlanBuilder::new(&request.root, index, &mut sources);
        builder.add_target(&request.target, &original_source);
        let plan = builder.build();
        info!(
            "Planned {} functions from {} files for {}",
            plan.function_count(),
            plan.file_count(),
            target_path.display()
        );

        let cycles: Vec<Vec<String>> = if plan.closure_modules().is_empty() {
            Vec::new()
        } else {
            RequireGraph::from_index(index)
                .cycles()
                .into_iter()
                .filter(|cycle| {
                    cycle
                        .iter()
                        .any(|module| plan.closure_modules().contains(module))
                })
                .collect()
        };
        for cycle in &cycles {
            warn!("Cyclic requires between modules: {}", cycle.join(" -> "));
        }

        let (bundle, unresolved) =
            CodeGenerator::new(&self.config, &mut sources).generate(&plan, original_source);

        let output_path = self.output_path(&target_path)?;
        write_bundle(
            &output_path,
            &bundle.render(&self.config),
            self.config.output_mode,
        )?;

        if unresolved.is_empty() {
            info!(
                "Wrote {} with {} inlined functions",
                output_path.display(),
                bundle.functions.len()
            );
        } else {
            warn!(
                "Wrote partial bundle {}: {} references unresolved",
                output_path.display(),
                unresolved.len()
            );
        }

        Ok(BundleOutcome {
            output_path,
            bundle,
            unresolved,
            cycles,
        })
    }

    /// `<dir>/<stem><suffix>.<ext>` next to the target
    pub fn output_path(&self, target_path: &Path) -> Result<PathBuf> {
        let stem = target_path
            .file_stem()
            .ok_or_else(|| anyhow!("Target has no file name: {}", target_path.display()))?
            .to_string_lossy();
        let extension = target_path
            .extension()
            .map_or_else(|| MODULE_EXTENSION.into(), |extension| extension.to_string_lossy());

        Ok(target_path.with_file_name(format!(
            "{stem}{}.{extension}",
            self.config.output_suffix
        )))
    }
}

/// Write rendered bundle text. Append mode grows an existing file; overwrite
/// mode replaces it.
pub fn write_bundle(path: &Path, content: &str, mode: OutputMode) -> Result<()> {
    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
        OutputMode::Append => options.append(true),
        OutputMode::Overwrite => options.write(true).truncate(true),
    };

    let mut file = options
        .open(path)
        .with_context(|| format!("Failed to open output {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write output {}", path.display()))
}
