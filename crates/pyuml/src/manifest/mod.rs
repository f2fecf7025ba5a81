//! Diagram manifests
//!
//! A manifest describes a whole diagram in JSON: which classes to extract,
//! how they relate, and how they are grouped into packages.
//!
//! ```json
//! {
//!   "classes": [
//!     { "selector": "shapes.py::Shape", "stereotype": "abstract" },
//!     { "selector": "shapes.Circle" }
//!   ],
//!   "relations": ["Circle --|> Shape"],
//!   "packages": [
//!     { "name": "shapes", "members": ["Circle"], "packages": [] }
//!   ]
//! }
//! ```
//!
//! Building a manifest extracts every class independently: a class that
//! cannot be located or extracted is recorded as a [`ClassFailure`] and the
//! rest of the diagram is still assembled.

mod relation;

pub use relation::RelationSpec;

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, span, warn, Level};

use crate::core::{Database, DiagnosticSink, Result, Stereotype, UmlError};
use crate::diagram::{DiagramModel, StructureEntry};
use crate::extract::{ClassExtractor, ClassSelector, SourceProvider};

fn default_stereotype() -> String {
    Stereotype::default().as_str().to_string()
}

/// One class to extract
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassEntry {
    pub selector: String,
    #[serde(default = "default_stereotype")]
    pub stereotype: String,
}

/// A package and what it contains
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageEntry {
    pub name: String,
    /// Class names placed directly in this package
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub packages: Vec<PackageEntry>,
}

/// A JSON diagram description
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagramManifest {
    #[serde(default)]
    pub classes: Vec<ClassEntry>,
    /// Relation lines such as `Circle --|> Shape`
    #[serde(default)]
    pub relations: Vec<String>,
    #[serde(default)]
    pub packages: Vec<PackageEntry>,
}

/// A class that could not be added to the diagram
#[derive(Debug)]
pub struct ClassFailure {
    pub selector: String,
    pub error: UmlError,
}

/// Result of building a manifest
#[derive(Debug)]
pub struct BuildOutcome {
    pub diagram: DiagramModel,
    pub failures: Vec<ClassFailure>,
}

impl BuildOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

impl DiagramManifest {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Extract every listed class and assemble the diagram
    ///
    /// Per-class problems (bad selector, bad stereotype, missing source,
    /// missing declaration) end up in [`BuildOutcome::failures`]. Malformed
    /// relation lines and package members naming classes the manifest never
    /// listed fail the whole build.
    pub fn build(
        &self,
        provider: &dyn SourceProvider,
        sink: &dyn DiagnosticSink,
    ) -> Result<BuildOutcome> {
        let span = span!(
            Level::INFO,
            "build_manifest",
            classes = self.classes.len(),
            relations = self.relations.len()
        );
        let _enter = span.enter();

        let extractor = ClassExtractor::with_sink(sink);
        let mut diagram = DiagramModel::new();
        let mut failures = Vec::new();
        let mut failed_names = HashSet::new();

        for entry in &self.classes {
            let result = ClassSelector::parse(&entry.selector).and_then(|selector| {
                let stereotype: Stereotype = entry.stereotype.parse()?;
                extractor.extract_selected(provider, &selector, stereotype)
            });

            match result {
                Ok(model) => {
                    diagram.add_class(model);
                }
                Err(error) => {
                    warn!(selector = %entry.selector, error = %error, "class skipped");
                    if let Ok(selector) = ClassSelector::parse(&entry.selector) {
                        failed_names.insert(selector.class_name().to_string());
                    }
                    failures.push(ClassFailure {
                        selector: entry.selector.clone(),
                        error,
                    });
                }
            }
        }

        for line in &self.relations {
            let relation = RelationSpec::parse(line)?;
            diagram.add_relation(relation.source, relation.target, relation.notation)?;
        }

        if !self.packages.is_empty() {
            let structure = self
                .packages
                .iter()
                .map(|package| package_structure(&diagram, package, &failed_names))
                .collect::<Result<Vec<_>>>()?;
            diagram.set_structure(structure)?;
        }

        info!(
            classes = diagram.node_count(),
            failures = failures.len(),
            "manifest built"
        );

        Ok(BuildOutcome { diagram, failures })
    }
}

fn package_structure(
    diagram: &DiagramModel,
    package: &PackageEntry,
    failed_names: &HashSet<String>,
) -> Result<StructureEntry> {
    let mut entries = Vec::new();

    for member in &package.members {
        match diagram.find_class(member) {
            Some(id) => entries.push(StructureEntry::Class(id)),
            // Already reported as a class failure.
            None if failed_names.contains(member) => {}
            None => {
                return Err(UmlError::manifest_error(format!(
                    "package '{}' lists '{}', which is not among the manifest classes",
                    package.name, member
                )))
            }
        }
    }

    for nested in &package.packages {
        entries.push(package_structure(diagram, nested, failed_names)?);
    }

    Ok(StructureEntry::package(package.name.clone(), entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NullSink;
    use crate::diagram::Endpoint;
    use crate::extract::StaticSource;

    const SHAPES: &str = "class Shape:\n    name: str\n\nclass Circle(Shape):\n    radius: float\n";

    #[test]
    fn test_defaults_apply() {
        let manifest = DiagramManifest::from_json(r#"{"classes": [{"selector": "Shape"}]}"#)
            .unwrap();
        assert_eq!(manifest.classes[0].stereotype, "class");
        assert!(manifest.relations.is_empty());
        assert!(manifest.packages.is_empty());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = DiagramManifest::from_json(r#"{"classes": [], "layout": "tb"}"#).unwrap_err();
        assert!(matches!(err, UmlError::Manifest { .. }));
    }

    #[test]
    fn test_build_collects_failures_and_keeps_going() {
        let manifest = DiagramManifest::from_json(
            r#"{
                "classes": [
                    {"selector": "Shape", "stereotype": "abstract"},
                    {"selector": "Square"},
                    {"selector": "Circle", "stereotype": "struct"},
                    {"selector": "Circle"}
                ],
                "relations": ["Circle --|> Shape", "Square --|> Shape"],
                "packages": [{"name": "geometry", "members": ["Circle", "Square"]}]
            }"#,
        )
        .unwrap();

        let provider = StaticSource::new("shapes.py", SHAPES);
        let outcome = manifest.build(&provider, &NullSink).unwrap();

        assert_eq!(outcome.diagram.node_count(), 2);
        assert_eq!(outcome.failures.len(), 2);
        assert!(outcome.failures[0].error.is_not_found());
        assert!(outcome.failures[1].error.is_invalid_stereotype());
        assert!(!outcome.is_complete());

        let relations: Vec<_> = outcome.diagram.relations().collect();
        assert_eq!(relations.len(), 2);
        assert_eq!(relations[1].source, Endpoint::Named("Square".to_string()));

        let circle = outcome.diagram.find_class("Circle").unwrap();
        assert_eq!(
            outcome.diagram.structure(),
            &[StructureEntry::package("geometry", vec![circle.into()])]
        );
    }

    #[test]
    fn test_malformed_relation_fails_build() {
        let manifest = DiagramManifest {
            relations: vec!["Circle".to_string()],
            ..Default::default()
        };
        let provider = StaticSource::new("shapes.py", SHAPES);
        let err = manifest.build(&provider, &NullSink).unwrap_err();
        assert!(matches!(err, UmlError::InvalidRelation { .. }));
    }

    #[test]
    fn test_unlisted_package_member_fails_build() {
        let manifest = DiagramManifest {
            packages: vec![PackageEntry {
                name: "geometry".to_string(),
                members: vec!["Triangle".to_string()],
                packages: vec![],
            }],
            ..Default::default()
        };
        let provider = StaticSource::new("shapes.py", SHAPES);
        let err = manifest.build(&provider, &NullSink).unwrap_err();
        assert!(format!("{}", err).contains("Triangle"));
    }
}
