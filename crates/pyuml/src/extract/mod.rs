//! Class model extraction from Python source
//!
//! Extraction is a pure function of the source text and the requested class:
//! the text is parsed, the class declaration is looked up by (possibly
//! nested) name, and its members are collected into a [`ClassModel`].
//! Warnings go to the caller's [`DiagnosticSink`].
//!
//! ```rust
//! use pyuml::core::Stereotype;
//! use pyuml::extract::ClassExtractor;
//!
//! let source = "class Point:\n    def __init__(self, x: int):\n        self.x: int = x\n";
//! let model = ClassExtractor::new()
//!     .extract(source, "Point", Stereotype::Class)
//!     .unwrap();
//! assert_eq!(model.attribute("x"), Some("x: int"));
//! ```

mod annotation;
mod collector;
mod model;
mod selector;
mod source;

pub use annotation::{format_annotation, EMPTY};
pub use model::ClassModel;
pub use selector::ClassSelector;
pub use source::{LocatedSource, ModuleResolver, SourceProvider, SourceUnit, StaticSource};

use std::path::Path;

use tracing::{debug, info, span, Level};

use crate::core::{
    Diagnostic, DiagnosticKind, DiagnosticSink, NullSink, Result, SourceTree, Stereotype,
    UmlError,
};
use collector::MemberCollector;

/// Path reported for source text that did not come from a file
const IN_MEMORY: &str = "<memory>";

/// Extracts class models, reporting warnings to a sink
pub struct ClassExtractor<'s> {
    sink: &'s dyn DiagnosticSink,
}

impl ClassExtractor<'static> {
    /// Create an extractor that discards diagnostics
    pub fn new() -> Self {
        Self { sink: &NullSink }
    }
}

impl Default for ClassExtractor<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'s> ClassExtractor<'s> {
    /// Create an extractor reporting to `sink`
    pub fn with_sink(sink: &'s dyn DiagnosticSink) -> Self {
        Self { sink }
    }

    /// Extract a class from source text
    ///
    /// `class_name` may be dotted to reach nested classes (`Outer.Inner`).
    pub fn extract(
        &self,
        source: &str,
        class_name: &str,
        stereotype: Stereotype,
    ) -> Result<ClassModel> {
        self.extract_from_text(Path::new(IN_MEMORY), source, class_name, stereotype)
    }

    /// Extract a class from a located module
    pub fn extract_unit(
        &self,
        unit: &SourceUnit,
        class_name: &str,
        stereotype: Stereotype,
    ) -> Result<ClassModel> {
        self.extract_from_text(&unit.path, &unit.text, class_name, stereotype)
    }

    /// Locate the selected class through `provider`, then extract it
    pub fn extract_selected(
        &self,
        provider: &dyn SourceProvider,
        selector: &ClassSelector,
        stereotype: Stereotype,
    ) -> Result<ClassModel> {
        let located = provider.locate(selector)?;
        self.extract_unit(&located.unit, &located.class_path, stereotype)
    }

    fn extract_from_text(
        &self,
        path: &Path,
        source: &str,
        class_name: &str,
        stereotype: Stereotype,
    ) -> Result<ClassModel> {
        let span = span!(
            Level::INFO,
            "extract_class",
            class = class_name,
            path = %path.display(),
            source_len = source.len()
        );
        let _enter = span.enter();

        let tree = SourceTree::parse(source)?;
        let simple_name = class_name.rsplit('.').next().unwrap_or(class_name);

        for line in tree.error_lines() {
            self.sink.report(
                Diagnostic::new(
                    DiagnosticKind::SyntaxError,
                    simple_name,
                    format!("{}: parser recovered from a syntax error", path.display()),
                )
                .at_line(line),
            );
        }

        let lookup = tree.find_class(class_name);
        let Some(class) = lookup.node else {
            debug!(class = class_name, "class declaration not found");
            return Err(UmlError::not_found(class_name, path));
        };

        if lookup.matches > 1 {
            self.sink.report(
                Diagnostic::new(
                    DiagnosticKind::DuplicateClass,
                    simple_name,
                    format!(
                        "declared {} times in {}; using the last declaration",
                        lookup.matches,
                        path.display()
                    ),
                )
                .at_line(class.start_position().row + 1),
            );
        }

        let members = MemberCollector::new(simple_name, tree.text(), self.sink).collect(class);

        info!(
            class = simple_name,
            attributes = members.attributes.len(),
            methods = members.methods.len(),
            "class extracted"
        );

        Ok(ClassModel::from_parts(
            simple_name,
            stereotype,
            members.attributes,
            members.methods,
        ))
    }
}
