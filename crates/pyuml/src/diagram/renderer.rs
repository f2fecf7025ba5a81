//! Diagram text renderer
//!
//! Produces PlantUML class-diagram text:
//!
//! ```text
//! class Base {
//! 	+value: int
//! 	+describe() -> str
//! }
//! package "shapes"{
//! 	class Circle {
//! 		+radius: float
//! 	}
//! }
//!
//! Circle --|> Base
//! ```
//!
//! Classes left out of the package layout come first in registration
//! order, then the packages, then one line per relation.

use tracing::{debug, span, Level};

use super::{DiagramModel, StructureEntry};
use crate::core::{Database, Renderer, Result, UmlError};
use crate::extract::ClassModel;

/// Which members end up in a class block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemberFilter {
    /// Drop members whose name starts with `_`
    #[default]
    Public,
    /// Keep every member; private ones are marked `-`
    All,
}

/// Rendering options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    pub members: MemberFilter,
}

impl RenderOptions {
    pub fn with_members(mut self, members: MemberFilter) -> Self {
        self.members = members;
        self
    }
}

/// Render one class block
///
/// The block always has a line between its braces, even when empty:
/// `class Empty {\n\n}`.
pub fn render_class_block(class: &ClassModel, options: &RenderOptions) -> String {
    let lines: Vec<String> = class
        .attributes()
        .iter()
        .chain(class.methods().iter())
        .filter_map(|(name, entry)| {
            let private = name.starts_with('_');
            match (private, options.members) {
                (false, _) => Some(format!("\t+{}", entry)),
                (true, MemberFilter::All) => Some(format!("\t-{}", entry)),
                (true, MemberFilter::Public) => None,
            }
        })
        .collect();

    format!(
        "{} {} {{\n{}\n}}",
        class.stereotype(),
        class.name(),
        lines.join("\n")
    )
}

/// Renders a [`DiagramModel`] into diagram text
#[derive(Debug, Clone, Default)]
pub struct DiagramRenderer {
    options: RenderOptions,
}

impl DiagramRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    fn push_class(&self, out: &mut String, class: &ClassModel, depth: usize) {
        let indent = "\t".repeat(depth);
        for line in render_class_block(class, &self.options).lines() {
            if !line.is_empty() {
                out.push_str(&indent);
            }
            out.push_str(line);
            out.push('\n');
        }
    }

    fn push_entries(
        &self,
        out: &mut String,
        database: &DiagramModel,
        entries: &[StructureEntry],
        depth: usize,
    ) -> Result<()> {
        for entry in entries {
            match entry {
                StructureEntry::Class(id) => {
                    let class = database
                        .class(*id)
                        .ok_or(UmlError::UnknownClass { id: id.index() })?;
                    self.push_class(out, class, depth);
                }
                StructureEntry::Package { name, entries } => {
                    let indent = "\t".repeat(depth);
                    out.push_str(&format!("{}package \"{}\"{{\n", indent, name));
                    self.push_entries(out, database, entries, depth + 1)?;
                    out.push_str(&format!("{}}}\n", indent));
                }
            }
        }
        Ok(())
    }
}

impl Renderer<DiagramModel> for DiagramRenderer {
    type Output = String;

    fn render(&self, database: &DiagramModel) -> Result<Self::Output> {
        let span = span!(
            Level::INFO,
            "render_diagram",
            classes = database.node_count(),
            relations = database.edge_count()
        );
        let _enter = span.enter();

        let mut out = String::new();

        let placed = database.placed_classes();
        for (id, class) in database.classes() {
            if !placed.contains(&id) {
                self.push_class(&mut out, class, 0);
            }
        }

        self.push_entries(&mut out, database, database.structure(), 0)?;

        for relation in database.edges() {
            out.push('\n');
            out.push_str(database.endpoint_name(&relation.source)?);
            out.push(' ');
            out.push_str(&relation.notation);
            out.push(' ');
            out.push_str(database.endpoint_name(&relation.target)?);
        }

        debug!(output_len = out.len(), "diagram rendered");
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "plantuml-class"
    }

    fn format(&self) -> &'static str {
        "plantuml"
    }
}
