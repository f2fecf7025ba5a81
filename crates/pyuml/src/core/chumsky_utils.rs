//! Shared chumsky parser utilities
//!
//! Small combinators used by the class selector and relation grammars.

use chumsky::prelude::*;

/// Parser extra carrying rich errors, so failures can name what was expected
pub type Extra<'src> = extra::Err<Rich<'src, char>>;

/// Parse inline whitespace only (spaces and tabs, no newlines).
pub fn inline_whitespace<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    one_of(" \t").repeated().ignored()
}

/// Parse required inline whitespace (at least one space or tab).
pub fn inline_whitespace_required<'src>(
) -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    one_of(" \t").repeated().at_least(1).ignored()
}

/// Parse a dotted Python name such as `pkg.module.Class`.
///
/// Returns the matched slice unchanged.
pub fn qualified_name<'src>() -> impl Parser<'src, &'src str, &'src str, Extra<'src>> + Clone {
    text::ident()
        .then(just('.').then(text::ident()).repeated())
        .to_slice()
}

/// Render parser errors as one line
pub fn describe_errors(errors: &[Rich<'_, char>]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
