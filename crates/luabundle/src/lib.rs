//! Lua bundler: resolves `local x = require "a.b"` chains across a source
//! tree and inlines only the functions a target module actually references.

pub mod bundle_plan;
pub mod closure;
pub mod code_generator;
pub mod config;
pub mod dependency_index;
pub mod dirs;
pub mod extractor;
pub mod lexer;
pub mod module_path;
pub mod orchestrator;
pub mod references;
pub mod require_graph;
pub mod scanner;
pub mod sources;
pub mod types;

pub use orchestrator::{BundleOutcome, BundleRequest, Bundler};
