//! pyuml - Class diagrams from Python source
//!
//! Reads Python class declarations, extracts their attributes and method
//! signatures, and assembles them into PlantUML class-diagram text that can
//! be drawn to SVG or PNG by an external PlantUML installation.
//!
//! # Quick Start
//!
//! ```rust
//! use pyuml::extract_class;
//!
//! let source = r#"
//! class Point:
//!     def __init__(self, x: int, y: int):
//!         self.x: int = x
//!         self.y: int = y
//!
//!     def norm(self) -> float:
//!         return (self.x ** 2 + self.y ** 2) ** 0.5
//! "#;
//!
//! let point = extract_class(source, "Point", "class").unwrap();
//! assert_eq!(
//!     point.to_string(),
//!     "class Point {\n\t+x: int\n\t+y: int\n\t+norm() -> float\n}"
//! );
//! ```
//!
//! # Advanced Usage
//!
//! ```rust
//! use pyuml::prelude::*;
//!
//! let source = "class Base:\n    value: int\n\nclass Derived(Base):\n    flag: bool\n";
//!
//! let sink = CollectingSink::new();
//! let extractor = ClassExtractor::with_sink(&sink);
//! let base = extractor.extract(source, "Base", Stereotype::Abstract).unwrap();
//! let derived = extractor.extract(source, "Derived", Stereotype::Class).unwrap();
//!
//! let mut diagram = DiagramModel::new();
//! let base = diagram.add_class(base);
//! let derived = diagram.add_class(derived);
//! diagram.add_inheritance(derived, base).unwrap();
//!
//! let text = DiagramRenderer::new().render(&diagram).unwrap();
//! assert!(text.ends_with("\nDerived --|> Base"));
//! assert!(sink.is_empty());
//! ```

pub mod core;
pub mod diagram;
pub mod extract;
pub mod manifest;

pub use crate::core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        CollectingSink, Database, Diagnostic, DiagnosticKind, DiagnosticSink, ImageFormat,
        NullSink, Renderer, Stereotype, TracingSink, UmlError,
    };
    pub use crate::diagram::{
        draw, ClassId, DiagramModel, DiagramRenderer, Endpoint, ImageRenderer, MemberFilter,
        PlantUmlCommand, RenderOptions, StructureEntry,
    };
    pub use crate::extract::{
        ClassExtractor, ClassModel, ClassSelector, ModuleResolver, SourceProvider, SourceUnit,
        StaticSource,
    };
    pub use crate::manifest::{BuildOutcome, DiagramManifest};
}

use crate::diagram::{DiagramModel, DiagramRenderer};
use crate::extract::{ClassExtractor, ClassModel};

/// Extract one class from Python source text
///
/// `stereotype` is one of `class`, `interface` or `abstract`; warnings are
/// forwarded to `tracing`.
///
/// # Example
/// ```rust
/// let model = pyuml::extract_class("class A:\n    x: int = 1\n", "A", "interface").unwrap();
/// assert_eq!(model.to_string(), "interface A {\n\t+x: int\n}");
/// ```
pub fn extract_class(
    source: &str,
    class_name: &str,
    stereotype: &str,
) -> anyhow::Result<ClassModel> {
    let stereotype: Stereotype = stereotype.parse()?;
    let model = ClassExtractor::with_sink(&TracingSink).extract(source, class_name, stereotype)?;
    Ok(model)
}

/// Render a diagram to PlantUML text with default options
pub fn render(diagram: &DiagramModel) -> anyhow::Result<String> {
    Ok(DiagramRenderer::new().render(diagram)?)
}
