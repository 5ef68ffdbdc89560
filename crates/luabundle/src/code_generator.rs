//! Code generation: turns a BundlePlan into bundle text
//!
//! Each planned function is extracted from its defining file under its
//! lookup name, then every reference to the lookup name inside the block is
//! rewritten to the qualified name used at the call site.

use std::path::PathBuf;

use log::{debug, warn};

use crate::{
    bundle_plan::BundlePlan,
    config::Config,
    extractor::{extract_function, lookup_name},
    references::rename_references,
    sources::SourceCache,
    types::{UnresolvedReason, UnresolvedReference},
};

/// A function definition copied into the bundle prologue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFunction {
    /// File the definition was taken from
    pub file: PathBuf,
    /// Name as used at the call site
    pub qualified_name: String,
    /// Rewritten definition text
    pub text: String,
}

/// Inlined functions followed by the target's original source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub functions: Vec<ExtractedFunction>,
    pub original_source: String,
}

impl Bundle {
    /// Render as: begin marker, one blank-line separated block per function,
    /// end marker, blank line, then the original source byte for byte.
    pub fn render(&self, config: &Config) -> String {
        let mut out = String::with_capacity(
            self.original_source.len()
                + self
                    .functions
                    .iter()
                    .map(|function| function.text.len() + 2)
                    .sum::<usize>()
                + config.begin_marker.len()
                + config.end_marker.len()
                + 8,
        );

        out.push_str(&config.begin_marker);
        out.push('\n');
        for function in &self.functions {
            out.push('\n');
            out.push_str(&function.text);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&config.end_marker);
        out.push_str("\n\n");
        out.push_str(&self.original_source);
        out
    }
}

#[derive(Debug)]
pub struct CodeGenerator<'a> {
    config: &'a Config,
    sources: &'a mut SourceCache,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(config: &'a Config, sources: &'a mut SourceCache) -> Self {
        Self { config, sources }
    }

    /// Extract every planned function. Module references, and names whose
    /// file is missing or whose definition cannot be found, are returned as
    /// unresolved; their call sites stay in the original source untouched.
    pub fn generate(
        &mut self,
        plan: &BundlePlan,
        original_source: String,
    ) -> (Bundle, Vec<UnresolvedReference>) {
        let mut functions = Vec::with_capacity(plan.function_count());
        let mut unresolved: Vec<UnresolvedReference> = plan
            .module_references()
            .map(|(qualified_name, file)| {
                debug!(
                    "{qualified_name} names module {}; its body is not inlined",
                    file.display()
                );
                UnresolvedReference {
                    qualified_name: qualified_name.to_owned(),
                    file: file.to_path_buf(),
                    reason: UnresolvedReason::ModuleNotInlined,
                }
            })
            .collect();

        for (file, qualified_names) in plan.iter() {
            let Some(code) = self.sources.load(file) else {
                unresolved.extend(qualified_names.iter().map(|name| UnresolvedReference {
                    qualified_name: name.clone(),
                    file: file.to_path_buf(),
                    reason: UnresolvedReason::MissingFile,
                }));
                continue;
            };

            for qualified_name in qualified_names {
                let lookup = lookup_name(
                    qualified_name,
                    &self.config.utils_alias_suffix,
                    &self.config.utils_table,
                );

                let Some(block) = extract_function(&code, &lookup) else {
                    warn!(
                        "No definition of {lookup} in {}; {qualified_name} stays unresolved",
                        file.display()
                    );
                    unresolved.push(UnresolvedReference {
                        qualified_name: qualified_name.clone(),
                        file: file.to_path_buf(),
                        reason: UnresolvedReason::NoDefinition,
                    });
                    continue;
                };

                debug!("Inlining {qualified_name} from {}", file.display());
                functions.push(ExtractedFunction {
                    file: file.to_path_buf(),
                    qualified_name: qualified_name.clone(),
                    text: rename_references(block.text, &lookup, qualified_name).into_owned(),
                });
            }
        }

        (
            Bundle {
                functions,
                original_source,
            },
            unresolved,
        )
    }
}
