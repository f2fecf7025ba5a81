//! Extracted class model

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::core::Stereotype;
use crate::diagram::{render_class_block, RenderOptions};

/// Members of one class, ready to be drawn
///
/// Attribute entries read `name: Type`, method entries
/// `name(arg: Type, ...) -> Return`; both may carry decorator tags such as
/// `{static}` in front of the name. Maps keep first-insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassModel {
    name: String,
    stereotype: Stereotype,
    attributes: IndexMap<String, String>,
    methods: IndexMap<String, String>,
}

impl ClassModel {
    /// Create a model without members
    pub fn new(name: impl Into<String>, stereotype: Stereotype) -> Self {
        Self {
            name: name.into(),
            stereotype,
            attributes: IndexMap::new(),
            methods: IndexMap::new(),
        }
    }

    pub(crate) fn from_parts(
        name: impl Into<String>,
        stereotype: Stereotype,
        attributes: IndexMap<String, String>,
        methods: IndexMap<String, String>,
    ) -> Self {
        Self {
            name: name.into(),
            stereotype,
            attributes,
            methods,
        }
    }

    /// Add an attribute entry, replacing any entry with the same name
    pub fn with_attribute(mut self, name: impl Into<String>, entry: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), entry.into());
        self
    }

    /// Add a method entry, replacing any entry with the same name
    pub fn with_method(mut self, name: impl Into<String>, entry: impl Into<String>) -> Self {
        self.methods.insert(name.into(), entry.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stereotype(&self) -> Stereotype {
        self.stereotype
    }

    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    pub fn methods(&self) -> &IndexMap<String, String> {
        &self.methods
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn method(&self, name: &str) -> Option<&str> {
        self.methods.get(name).map(String::as_str)
    }

    /// Whether the class has neither attributes nor methods
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.methods.is_empty()
    }
}

/// Renders the class block with the default member filter
impl fmt::Display for ClassModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_class_block(self, &RenderOptions::default()))
    }
}
