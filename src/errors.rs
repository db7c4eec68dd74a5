//! Type errors and their rendering.
//!
//! This module provides:
//! - `CheckError`, one variant per kind of rejected script
//! - Levenshtein distance for "did you mean?" suggestions
//! - ANSI color support for terminal front ends

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::ast::{BinOp, Ident};
use crate::types::{Type, TypeParam};

/// Which operand of a binary operator an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "first"),
            Side::Right => write!(f, "second"),
        }
    }
}

/// Where two types were required to have a common type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommonTypeSite {
    Equality,
    IfBranches,
}

impl fmt::Display for CommonTypeSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommonTypeSite::Equality => write!(f, "operands of EQ"),
            CommonTypeSite::IfBranches => write!(f, "if branches"),
        }
    }
}

/// What an existing name is bound to when a `let` tries to reuse it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Variable,
    Function,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingKind::Variable => write!(f, "variable"),
            BindingKind::Function => write!(f, "function"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    #[error("undefined type `{name}`")]
    UndefinedType {
        name: Ident,
        suggestions: Vec<String>,
    },
    #[error("undefined field `{field}` of type `{type_name}`")]
    UndefinedField {
        type_name: Ident,
        field: Ident,
        suggestions: Vec<String>,
    },
    #[error("cannot access field `{field}` of primitive type {ty}")]
    FieldOfPrimitive { ty: Type, field: Ident },
    #[error("function `{name}` not found")]
    UndefinedFunction {
        name: Ident,
        suggestions: Vec<String>,
    },
    #[error("function `{name}` expects {expected} arguments, but {found} were given")]
    ArityMismatch {
        name: Ident,
        expected: usize,
        found: usize,
    },
    #[error("argument {position} of `{function}`: expected {expected}, found {found}")]
    ArgumentMismatch {
        function: Ident,
        position: usize,
        expected: Type,
        found: Type,
    },
    #[error("conflicting type for parameter {param} of `{function}`: {bound} and {found}")]
    ConflictingTypeParameter {
        function: Ident,
        param: TypeParam,
        bound: Type,
        found: Type,
    },
    #[error("unresolved type parameter {param} in result of `{function}`")]
    UnresolvedTypeParameter { function: Ident, param: TypeParam },
    #[error("unexpected type of {side} operand of {op}: expected {expected}, found {found}")]
    OperandMismatch {
        op: BinOp,
        side: Side,
        expected: Type,
        found: Type,
    },
    #[error("no common type for {site}: {left} and {right}")]
    NoCommonType {
        site: CommonTypeSite,
        left: Type,
        right: Type,
    },
    #[error("`{name}` is already defined as a {kind} in this scope")]
    DuplicateBinding { name: Ident, kind: BindingKind },
    #[error("definition of `{name}` not found")]
    UndefinedReference {
        name: Ident,
        suggestions: Vec<String>,
    },
    #[error("expression nesting exceeds the limit of {limit}")]
    DepthLimitExceeded { limit: usize },
    #[error("internal error while checking: {message}")]
    Internal { message: String },
}

impl CheckError {
    /// Close names offered as "did you mean?" hints
    pub fn suggestions(&self) -> &[String] {
        match self {
            CheckError::UndefinedType { suggestions, .. }
            | CheckError::UndefinedField { suggestions, .. }
            | CheckError::UndefinedFunction { suggestions, .. }
            | CheckError::UndefinedReference { suggestions, .. } => suggestions,
            _ => &[],
        }
    }

    /// Short kind used as the diagnostic header
    pub fn kind(&self) -> &'static str {
        match self {
            CheckError::UndefinedType { .. }
            | CheckError::UndefinedField { .. }
            | CheckError::UndefinedFunction { .. }
            | CheckError::UndefinedReference { .. } => "NAMING ERROR",
            CheckError::DuplicateBinding { .. } => "DUPLICATE BINDING",
            CheckError::DepthLimitExceeded { .. } => "LIMIT EXCEEDED",
            CheckError::Internal { .. } => "INTERNAL ERROR",
            _ => "TYPE ERROR",
        }
    }
}

// ============================================================================
// Terminal styling
// ============================================================================

/// Whether rendered diagnostics carry ANSI escapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colors {
    #[default]
    Plain,
    Ansi,
}

/// What a piece of diagnostic text is, which decides its colour
#[derive(Debug, Clone, Copy)]
enum Tone {
    Header,
    Message,
    Name,
}

impl Tone {
    fn escape(self) -> &'static str {
        match self {
            Tone::Header => "\x1b[36m",
            Tone::Message => "\x1b[31m",
            Tone::Name => "\x1b[1m",
        }
    }
}

impl Colors {
    pub fn new(enabled: bool) -> Self {
        if enabled {
            Colors::Ansi
        } else {
            Colors::Plain
        }
    }

    fn paint(self, tone: Tone, text: impl fmt::Display) -> String {
        match self {
            Colors::Plain => text.to_string(),
            Colors::Ansi => format!("{}{}\x1b[0m", tone.escape(), text),
        }
    }
}

// ============================================================================
// Levenshtein Distance for "Did you mean?" suggestions
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single rolling row
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut diag = row[0];
        row[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            let next = (row[j] + 1).min(row[j - 1] + 1).min(diag + cost);
            diag = row[j];
            row[j] = next;
        }
    }

    row[b.len()]
}

const MAX_SUGGESTIONS: usize = 3;

/// Names within `max_distance` edits of `name`, closest first, then by name.
/// Exact matches are not suggestions.
pub fn find_similar<'a>(
    name: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    max_distance: usize,
) -> Vec<String> {
    let ranked: BTreeSet<(usize, &str)> = candidates
        .into_iter()
        .map(|candidate| (levenshtein_distance(name, candidate), candidate))
        .filter(|(distance, _)| (1..=max_distance).contains(distance))
        .collect();
    ranked
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}

// ============================================================================
// Rendering
// ============================================================================

const HEADER_WIDTH: usize = 60;

/// "-- TYPE ERROR ---...", padded with dashes to a fixed width
pub fn format_header(error_kind: &str, colors: Colors) -> String {
    let title = format!("-- {} ", error_kind);
    let pad = HEADER_WIDTH.saturating_sub(title.len());
    colors.paint(Tone::Header, format_args!("{}{}", title, "-".repeat(pad)))
}

/// The "did you mean" line, empty when there is nothing to offer
pub fn format_suggestions(suggestions: &[String], colors: Colors) -> String {
    let names: Vec<String> = suggestions
        .iter()
        .map(|s| colors.paint(Tone::Name, s))
        .collect();
    match names.len() {
        0 => String::new(),
        1 => format!("\n\nDid you mean {}?", names[0]),
        _ => format!("\n\nDid you mean one of: {}?", names.join(", ")),
    }
}

/// Full diagnostic as printed by a front end: header, message, hints.
pub fn render(error: &CheckError, colors: Colors) -> String {
    format!(
        "{}\n\n{}{}\n",
        format_header(error.kind(), colors),
        colors.paint(Tone::Message, error),
        format_suggestions(error.suggestions(), colors)
    )
}

// ============================================================================
// Tests
// ============================================================================
