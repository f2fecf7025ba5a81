//! Relation lines
//!
//! A manifest relation is written the way it is drawn: `Circle --|> Shape`.
//! Endpoints are class names (dotted names are accepted and kept verbatim),
//! the notation is any run of non-space characters between them.

use chumsky::prelude::*;

use crate::core::chumsky_utils::{
    describe_errors, inline_whitespace, inline_whitespace_required, qualified_name, Extra,
};
use crate::core::{Result, UmlError};

/// A parsed relation line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSpec {
    pub source: String,
    pub notation: String,
    pub target: String,
}

impl RelationSpec {
    pub fn parse(input: &str) -> Result<Self> {
        relation()
            .parse(input)
            .into_result()
            .map_err(|errors| UmlError::InvalidRelation {
                input: input.to_string(),
                message: describe_errors(&errors),
            })
    }
}

fn relation<'src>() -> impl Parser<'src, &'src str, RelationSpec, Extra<'src>> + Clone {
    let notation = any()
        .filter(|c: &char| !c.is_whitespace())
        .repeated()
        .at_least(1)
        .to_slice();

    inline_whitespace()
        .ignore_then(qualified_name())
        .then_ignore(inline_whitespace_required())
        .then(notation)
        .then_ignore(inline_whitespace_required())
        .then(qualified_name())
        .then_ignore(inline_whitespace())
        .then_ignore(end())
        .map(|((source, notation), target): ((&str, &str), &str)| RelationSpec {
            source: source.to_string(),
            notation: notation.to_string(),
            target: target.to_string(),
        })
}
