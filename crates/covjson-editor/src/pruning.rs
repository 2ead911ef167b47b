//! Diagnostic merging and pruning.
//!
//! A validation pass collects diagnostics from three sources, in priority order:
//!
//! 1. the syntax checker
//! 2. the schema validator
//! 3. the single pending external error
//!
//! [`DiagnosticPruner::merge`] turns them into the final overlay:
//!
//! - syntax errors, if any, are returned alone
//! - "too technical" schema messages (one failed branch of an `anyOf`/`oneOf`) are dropped
//!   when a precise error from inside the same composite is also reported
//! - diagnostics whose line span strictly contains another diagnostic's span are dropped,
//!   unless that would leave nothing
//! - the pending external error is appended at the document start and consumed

use crate::diagnostics::Diagnostic;
use regex::Regex;
use std::sync::LazyLock;

/// Message emitted for a composite keyword when no branch matched.
pub const COMPOSITE_SUMMARY_PATTERN: &str = r"is not valid under any of the given schemas$";
/// Message emitted by `const` when a value differs from the single allowed one.
pub const CONST_MISMATCH_PATTERN: &str = r"^.+ was expected$";
/// Message emitted by `enum` when a value is not among the allowed ones.
pub const ENUM_MISMATCH_PATTERN: &str = r"^.+ is not one of .+$";

/// A schema message considered too low-level to show next to more precise errors.
#[derive(Debug, Clone)]
pub struct TechnicalPattern {
    message: Regex,
    composite_only: bool,
}

impl TechnicalPattern {
    /// Create a pattern matching diagnostic messages.
    ///
    /// If `composite_only` is set, the pattern only applies to diagnostics whose schema keyword
    /// location lies inside an `anyOf`/`oneOf` branch.
    pub fn new(message: &str, composite_only: bool) -> Result<Self, regex::Error> {
        Ok(Self {
            message: Regex::new(message)?,
            composite_only,
        })
    }

    /// Returns `true` if `diagnostic` matches this pattern.
    pub fn matches(&self, diagnostic: &Diagnostic) -> bool {
        if !self.message.is_match(&diagnostic.message) {
            return false;
        }
        !self.composite_only
            || diagnostic
                .schema_path
                .as_deref()
                .and_then(composite_scope)
                .is_some()
    }
}

/// Keyword location of the innermost `anyOf`/`oneOf` enclosing `schema_path`.
fn composite_scope(schema_path: &str) -> Option<&str> {
    let mut scope_end = None;
    let mut offset = 0;
    for segment in schema_path.split('/') {
        offset += segment.len();
        if segment == "anyOf" || segment == "oneOf" {
            scope_end = Some(offset);
        }
        offset += 1;
    }
    scope_end.map(|end| &schema_path[..end])
}

fn is_within(schema_path: &str, scope: &str) -> bool {
    schema_path
        .strip_prefix(scope)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Filters and merges diagnostics for display.
#[derive(Debug, Clone)]
pub struct DiagnosticPruner {
    patterns: Vec<TechnicalPattern>,
}

impl DiagnosticPruner {
    /// Create a pruner with an explicit set of technical patterns.
    pub fn new(patterns: Vec<TechnicalPattern>) -> Self {
        Self { patterns }
    }

    /// The technical patterns in use.
    pub fn patterns(&self) -> &[TechnicalPattern] {
        &self.patterns
    }

    /// Returns `true` if `diagnostic` matches any technical pattern.
    pub fn is_technical(&self, diagnostic: &Diagnostic) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(diagnostic))
    }

    /// Drop technical schema diagnostics that a more precise diagnostic already explains.
    ///
    /// A technical diagnostic is explained when a non-technical one was reported from inside
    /// the same `anyOf`/`oneOf`. Unexplained ones are kept, so a failed composite never
    /// disappears from the overlay.
    pub fn drop_technical(&self, diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
        let explained: Vec<bool> = diagnostics
            .iter()
            .map(|d| self.is_technical(d) && self.is_explained(d, &diagnostics))
            .collect();
        diagnostics
            .into_iter()
            .zip(explained)
            .filter_map(|(diagnostic, explained)| (!explained).then_some(diagnostic))
            .collect()
    }

    fn is_explained(&self, technical: &Diagnostic, diagnostics: &[Diagnostic]) -> bool {
        let Some(scope) = technical.schema_path.as_deref().and_then(composite_scope) else {
            return false;
        };
        diagnostics.iter().any(|other| {
            !self.is_technical(other)
                && other
                    .schema_path
                    .as_deref()
                    .is_some_and(|path| is_within(path, scope))
        })
    }

    /// Merge the three diagnostic sources into the final ordered overlay.
    ///
    /// `pending` is only consumed when the text was syntactically valid.
    pub fn merge(
        &self,
        syntax: Vec<Diagnostic>,
        schema: Vec<Diagnostic>,
        pending: &mut Option<String>,
    ) -> Vec<Diagnostic> {
        if !syntax.is_empty() {
            return syntax;
        }

        let mut merged = prune_containing(self.drop_technical(schema));

        if let Some(message) = pending.take() {
            merged.push(Diagnostic::external(message));
        }
        merged
    }
}

impl Default for DiagnosticPruner {
    fn default() -> Self {
        let patterns = [
            (COMPOSITE_SUMMARY_PATTERN, false),
            (CONST_MISMATCH_PATTERN, true),
            (ENUM_MISMATCH_PATTERN, true),
        ]
        .into_iter()
        .map(|(pattern, composite_only)| {
            TechnicalPattern::new(pattern, composite_only).expect("valid technical pattern")
        })
        .collect();
        Self::new(patterns)
    }
}

/// Remove every diagnostic whose line span strictly contains another diagnostic's span.
///
/// Order is preserved. Falls back to the input if nothing would survive.
pub fn prune_containing(diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    let keep: Vec<bool> = diagnostics
        .iter()
        .enumerate()
        .map(|(i, outer)| {
            !diagnostics
                .iter()
                .enumerate()
                .any(|(j, inner)| i != j && outer.range.strictly_contains_lines(&inner.range))
        })
        .collect();

    if !keep.iter().any(|k| *k) {
        return diagnostics;
    }

    diagnostics
        .into_iter()
        .zip(keep)
        .filter_map(|(diagnostic, keep)| keep.then_some(diagnostic))
        .collect()
}

static DEFAULT_PRUNER: LazyLock<DiagnosticPruner> = LazyLock::new(DiagnosticPruner::default);

/// Merge diagnostics using the default technical patterns.
pub fn merge_diagnostics(
    syntax: Vec<Diagnostic>,
    schema: Vec<Diagnostic>,
    pending: &mut Option<String>,
) -> Vec<Diagnostic> {
    DEFAULT_PRUNER.merge(syntax, schema, pending)
}
