//! Diagram database
//!
//! Stores registered class models in an arena addressed by [`ClassId`],
//! relations keyed by their endpoint pair, and an optional package layout.

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use tracing::debug;

use crate::core::{Database, Result, UmlError};
use crate::extract::ClassModel;

/// Handle of a class registered in a [`DiagramModel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(usize);

impl ClassId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One end of a relation
///
/// Relations may point at classes that are not drawn in this diagram, named
/// by their plain identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Class(ClassId),
    Named(String),
}

impl From<ClassId> for Endpoint {
    fn from(id: ClassId) -> Self {
        Endpoint::Class(id)
    }
}

impl From<&str> for Endpoint {
    fn from(name: &str) -> Self {
        Endpoint::Named(name.to_string())
    }
}

impl From<String> for Endpoint {
    fn from(name: String) -> Self {
        Endpoint::Named(name)
    }
}

/// A directed relation between two endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub source: Endpoint,
    pub target: Endpoint,
    /// Relation arrow, e.g. `--|>`, `*--`, `..>`
    pub notation: String,
}

/// Notation used when a relation is added without one (inheritance)
pub const DEFAULT_NOTATION: &str = "--|>";

/// Entry of the package layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureEntry {
    Class(ClassId),
    Package {
        name: String,
        entries: Vec<StructureEntry>,
    },
}

impl StructureEntry {
    pub fn package(name: impl Into<String>, entries: Vec<StructureEntry>) -> Self {
        StructureEntry::Package {
            name: name.into(),
            entries,
        }
    }
}

impl From<ClassId> for StructureEntry {
    fn from(id: ClassId) -> Self {
        StructureEntry::Class(id)
    }
}

/// A class diagram under construction
#[derive(Debug, Clone, Default)]
pub struct DiagramModel {
    classes: Vec<ClassModel>,
    relations: IndexMap<(Endpoint, Endpoint), Relation>,
    structure: Vec<StructureEntry>,
}

impl DiagramModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class, returning its handle
    ///
    /// Registering the same model twice yields two independent entries.
    pub fn add_class(&mut self, class: ClassModel) -> ClassId {
        let id = ClassId(self.classes.len());
        debug!(id = id.0, class = class.name(), "registered class");
        self.classes.push(class);
        id
    }

    /// Add a relation `source notation target`
    ///
    /// A named endpoint matching a registered class refers to that class.
    /// Adding a relation for an endpoint pair that already has one replaces
    /// its notation and keeps its position.
    pub fn add_relation(
        &mut self,
        source: impl Into<Endpoint>,
        target: impl Into<Endpoint>,
        notation: impl Into<String>,
    ) -> Result<()> {
        let source = self.resolve(source.into());
        let target = self.resolve(target.into());
        self.check_endpoint(&source)?;
        self.check_endpoint(&target)?;

        let relation = Relation {
            source: source.clone(),
            target: target.clone(),
            notation: notation.into(),
        };
        debug!(notation = %relation.notation, "added relation");
        self.relations.insert((source, target), relation);
        Ok(())
    }

    /// Add an inheritance relation (`--|>`)
    pub fn add_inheritance(
        &mut self,
        child: impl Into<Endpoint>,
        parent: impl Into<Endpoint>,
    ) -> Result<()> {
        self.add_relation(child, parent, DEFAULT_NOTATION)
    }

    /// Replace the package layout
    ///
    /// Classes not placed anywhere in `entries` stay at the top level.
    pub fn set_structure(&mut self, entries: Vec<StructureEntry>) -> Result<()> {
        fn check(model: &DiagramModel, entries: &[StructureEntry]) -> Result<()> {
            for entry in entries {
                match entry {
                    StructureEntry::Class(id) => model.check_id(*id)?,
                    StructureEntry::Package { entries, .. } => check(model, entries)?,
                }
            }
            Ok(())
        }

        check(self, &entries)?;
        self.structure = entries;
        Ok(())
    }

    pub fn structure(&self) -> &[StructureEntry] {
        &self.structure
    }

    pub fn class(&self, id: ClassId) -> Option<&ClassModel> {
        self.classes.get(id.0)
    }

    /// Handle of the first registered class with this name
    pub fn find_class(&self, name: &str) -> Option<ClassId> {
        self.classes
            .iter()
            .position(|class| class.name() == name)
            .map(ClassId)
    }

    /// Registered classes with their handles, in registration order
    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &ClassModel)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(index, class)| (ClassId(index), class))
    }

    /// Relations in first-insertion order
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.values()
    }

    /// Name an endpoint is drawn with
    pub fn endpoint_name<'a>(&'a self, endpoint: &'a Endpoint) -> Result<&'a str> {
        match endpoint {
            Endpoint::Class(id) => self
                .class(*id)
                .map(ClassModel::name)
                .ok_or(UmlError::UnknownClass { id: id.0 }),
            Endpoint::Named(name) => Ok(name.as_str()),
        }
    }

    /// Classes placed somewhere in the package layout
    pub fn placed_classes(&self) -> HashSet<ClassId> {
        fn visit(entries: &[StructureEntry], placed: &mut HashSet<ClassId>) {
            for entry in entries {
                match entry {
                    StructureEntry::Class(id) => {
                        placed.insert(*id);
                    }
                    StructureEntry::Package { entries, .. } => visit(entries, placed),
                }
            }
        }

        let mut placed = HashSet::new();
        visit(&self.structure, &mut placed);
        placed
    }

    fn check_id(&self, id: ClassId) -> Result<()> {
        if id.0 < self.classes.len() {
            Ok(())
        } else {
            Err(UmlError::UnknownClass { id: id.0 })
        }
    }

    fn resolve(&self, endpoint: Endpoint) -> Endpoint {
        match endpoint {
            Endpoint::Named(name) => match self.find_class(&name) {
                Some(id) => Endpoint::Class(id),
                None => Endpoint::Named(name),
            },
            class => class,
        }
    }

    fn check_endpoint(&self, endpoint: &Endpoint) -> Result<()> {
        match endpoint {
            Endpoint::Class(id) => self.check_id(*id),
            Endpoint::Named(_) => Ok(()),
        }
    }
}

impl Database for DiagramModel {
    type Node = ClassModel;
    type Edge = Relation;

    fn nodes(&self) -> impl Iterator<Item = &Self::Node> {
        self.classes.iter()
    }

    fn edges(&self) -> impl Iterator<Item = &Self::Edge> {
        self.relations.values()
    }

    fn clear(&mut self) {
        self.classes.clear();
        self.relations.clear();
        self.structure.clear();
    }

    fn node_count(&self) -> usize {
        self.classes.len()
    }

    fn edge_count(&self) -> usize {
        self.relations.len()
    }
}
