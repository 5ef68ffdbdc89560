//! Qualified reference scanning (`alias.member`)
//!
//! Matching is textual: uses inside comments and string literals count too.

use std::borrow::Cow;

use indexmap::IndexSet;
use log::warn;
use regex::{Captures, Regex};

/// Every `alias.identifier` occurrence in `code`, duplicates included
pub fn find_references(code: &str, alias: &str) -> Vec<String> {
    let pattern = format!(r"\b{}\.[A-Za-z_][A-Za-z0-9_]*", regex::escape(alias));
    let Ok(regex) = Regex::new(&pattern) else {
        warn!("Cannot build reference pattern for alias '{alias}'");
        return Vec::new();
    };

    regex
        .find_iter(code)
        .map(|found| found.as_str().to_owned())
        .collect()
}

/// Distinct references in first-seen order
pub fn unique_references(code: &str, alias: &str) -> IndexSet<String> {
    find_references(code, alias).into_iter().collect()
}

/// Rewrite every reference to `from` in `code` as `to`. Occurrences that are
/// only part of a longer name (`x.from`, `from_raw`, `my_from`) are kept.
pub fn rename_references<'a>(code: &'a str, from: &str, to: &str) -> Cow<'a, str> {
    if from == to {
        return Cow::Borrowed(code);
    }

    // No lookbehind in `regex`: capture the preceding character instead
    let pattern = format!(r"(^|[^\w.:])({})\b", regex::escape(from));
    let Ok(regex) = Regex::new(&pattern) else {
        warn!("Cannot build rename pattern for '{from}'");
        return Cow::Borrowed(code);
    };

    regex.replace_all(code, |captures: &Captures<'_>| format!("{}{to}", &captures[1]))
}

/// Member part of a qualified name: `zcl.clusters` -> `clusters`
pub fn member_name(qualified: &str) -> &str {
    qualified
        .rsplit_once('.')
        .map_or(qualified, |(_, member)| member)
}
