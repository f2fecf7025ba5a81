//! Class selectors
//!
//! A selector names one class to extract, in one of two forms:
//!
//! ```text
//! path/to/module.py::Outer.Inner     explicit file, then a class path inside it
//! package.module.Outer.Inner         dotted module path followed by the class path
//! ```
//!
//! The dotted form is ambiguous until resolved against a module search path,
//! which [`ModuleResolver`](super::ModuleResolver) does by trying the longest
//! module prefix first.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chumsky::prelude::*;

use crate::core::chumsky_utils::{describe_errors, qualified_name, Extra};
use crate::core::{Result, UmlError};

/// Identifies one class declaration to extract
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassSelector {
    /// `path.py::Class.Path`
    InFile { path: PathBuf, class_path: String },
    /// `package.module.Class`
    Dotted { dotted: String },
}

impl ClassSelector {
    /// Parse a selector string
    pub fn parse(input: &str) -> Result<Self> {
        selector()
            .parse(input)
            .into_result()
            .map_err(|errors| UmlError::InvalidSelector {
                input: input.to_string(),
                message: describe_errors(&errors),
            })
    }

    /// Simple name of the selected class (the last dotted segment)
    pub fn class_name(&self) -> &str {
        let path = match self {
            ClassSelector::InFile { class_path, .. } => class_path,
            ClassSelector::Dotted { dotted } => dotted,
        };
        path.rsplit('.').next().unwrap_or(path)
    }
}

impl FromStr for ClassSelector {
    type Err = UmlError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ClassSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassSelector::InFile { path, class_path } => {
                write!(f, "{}::{}", path.display(), class_path)
            }
            ClassSelector::Dotted { dotted } => f.write_str(dotted),
        }
    }
}

fn selector<'src>() -> impl Parser<'src, &'src str, ClassSelector, Extra<'src>> + Clone {
    let path = none_of(" \t\r\n")
        .and_is(just("::").not())
        .repeated()
        .at_least(1)
        .to_slice();

    let in_file = path
        .then_ignore(just("::"))
        .then(qualified_name())
        .map(|(path, class_path): (&str, &str)| ClassSelector::InFile {
            path: PathBuf::from(path),
            class_path: class_path.to_string(),
        });

    let dotted = qualified_name().map(|dotted: &str| ClassSelector::Dotted {
        dotted: dotted.to_string(),
    });

    in_file.or(dotted).padded().then_ignore(end())
}
