//! Function block extraction
//!
//! Two definition shapes are recognised, tried in this order over the whole
//! module:
//!
//! 1. `<name> = function(...) ... end`
//! 2. `function <name>(...) ... end`
//!
//! The block extent is bounded by keyword nesting depth over the token
//! stream, so nested `if`/`for`/`while`/`repeat`/`function` bodies and
//! `end` inside strings or comments are handled.

use std::borrow::Cow;

use log::trace;

use crate::lexer::{Token, TokenKind, tokenize};

/// Which definition shape matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionForm {
    /// `M.f = function(...) ... end`
    Assignment,
    /// `function M.f(...) ... end`
    Declaration,
}

/// A function definition located in module source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionBlock<'a> {
    /// Exact source text, from the header through the closing `end`
    pub text: &'a str,
    pub form: DefinitionForm,
}

/// Locate the definition of `qualified_name` in `source`
pub fn extract_function<'a>(source: &'a str, qualified_name: &str) -> Option<FunctionBlock<'a>> {
    let segments: Vec<&str> = qualified_name.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return None;
    }

    let tokens = tokenize(source);

    [DefinitionForm::Assignment, DefinitionForm::Declaration]
        .into_iter()
        .find_map(|form| {
            (0..tokens.len()).find_map(|at| {
                let (start, function_at) = match_header(&tokens, at, &segments, form)?;
                let end = block_end(&tokens, function_at)?;
                trace!("Found {form:?} definition of {qualified_name} at {start}..{end}");
                Some(FunctionBlock {
                    text: &source[start..end],
                    form,
                })
            })
        })
}

/// Name used to look a qualified reference up in its defining module.
///
/// References through an alias ending with `alias_suffix` (`zcl_utils.f`)
/// are defined on the shared table (`utils.f`).
pub fn lookup_name<'a>(qualified_name: &'a str, alias_suffix: &str, table: &str) -> Cow<'a, str> {
    match qualified_name.split_once('.') {
        Some((module, member)) if !alias_suffix.is_empty() && module.ends_with(alias_suffix) => {
            Cow::Owned(format!("{table}.{member}"))
        }
        _ => Cow::Borrowed(qualified_name),
    }
}

/// If a header for `segments` in `form` starts at token `at`, return the
/// block's start offset and the index of its `function` keyword.
fn match_header(
    tokens: &[Token<'_>],
    at: usize,
    segments: &[&str],
    form: DefinitionForm,
) -> Option<(usize, usize)> {
    match form {
        DefinitionForm::Assignment => {
            if at > 0 && (tokens[at - 1].is_symbol(".") || tokens[at - 1].is_symbol(":")) {
                return None;
            }
            let after_name = match_name(tokens, at, segments)?;
            let function_at = after_name + 1;
            (tokens.get(after_name)?.is_symbol("=")
                && tokens.get(function_at)?.is_name("function")
                && tokens.get(function_at + 1)?.is_symbol("("))
            .then(|| (tokens[at].start, function_at))
        }
        DefinitionForm::Declaration => {
            if !tokens[at].is_name("function") {
                return None;
            }
            let after_name = match_name(tokens, at + 1, segments)?;
            tokens
                .get(after_name)?
                .is_symbol("(")
                .then(|| (tokens[at].start, at))
        }
    }
}

/// Match `seg ( . seg )*` starting at token `at`; returns the index just past it
fn match_name(tokens: &[Token<'_>], at: usize, segments: &[&str]) -> Option<usize> {
    let mut cursor = at;
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            if !tokens.get(cursor)?.is_symbol(".") {
                return None;
            }
            cursor += 1;
        }
        if !tokens.get(cursor)?.is_name(segment) {
            return None;
        }
        cursor += 1;
    }
    Some(cursor)
}

/// Byte offset just past the `end` closing the `function` at `function_at`
fn block_end(tokens: &[Token<'_>], function_at: usize) -> Option<usize> {
    let mut depth = 0usize;
    for token in &tokens[function_at..] {
        if token.kind != TokenKind::Name {
            continue;
        }
        match token.text {
            "function" | "if" | "do" | "repeat" => depth += 1,
            "end" | "until" => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(token.end());
                }
            }
            _ => {}
        }
    }
    None
}
