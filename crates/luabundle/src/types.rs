//! Shared type definitions for the luabundle crate
//!
//! Types used by more than one stage of the pipeline live here to keep the
//! stage modules free of circular imports.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A `local <alias> = require "<dotted.path>"` binding found in a module.
///
/// Persisted as a two-element `[alias, dotted_path]` array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct RequireStatement {
    /// Local name the module is bound to
    pub alias: String,
    /// Logical module address, e.g. `zdo.mgmt_bind_request`
    pub path: String,
}

impl RequireStatement {
    pub fn new(alias: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            path: path.into(),
        }
    }
}

impl From<(String, String)> for RequireStatement {
    fn from((alias, path): (String, String)) -> Self {
        Self { alias, path }
    }
}

impl From<RequireStatement> for (String, String) {
    fn from(statement: RequireStatement) -> Self {
        (statement.alias, statement.path)
    }
}

/// Why a qualified reference did not make it into the bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnresolvedReason {
    /// The file that should define the function does not exist or is unreadable
    MissingFile,
    /// The file exists but neither definition form matched
    NoDefinition,
    /// The reference names a module, not a function; only the functions that
    /// module uses from its own requires are inlined
    ModuleNotInlined,
}

impl std::fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFile => write!(f, "missing file"),
            Self::NoDefinition => write!(f, "no definition"),
            Self::ModuleNotInlined => write!(f, "module not inlined"),
        }
    }
}

/// A call site left in the bundle without an inlined definition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnresolvedReference {
    /// Qualified name as used at the call site, e.g. `zcl.read_attr`
    pub qualified_name: String,
    /// File that was expected to define it
    pub file: PathBuf,
    pub reason: UnresolvedReason,
}

impl std::fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}: {})",
            self.qualified_name,
            self.reason,
            self.file.display()
        )
    }
}
