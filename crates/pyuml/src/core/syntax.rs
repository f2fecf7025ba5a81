//! Python syntax trees
//!
//! Wraps a tree-sitter parse of one Python source file together with the
//! text it was parsed from, and offers the lookups the extractor needs:
//! node text, error regions and class declarations by (nested) name.

use tree_sitter::{Node, Parser, Tree};

use super::{Result, UmlError};

/// Text of a node, borrowed from the source it was parsed from
pub fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or_default()
}

/// Named children of a node, without comments
pub fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// First named child that is not a comment
pub fn first_named_child<'t>(node: Node<'t>) -> Option<Node<'t>> {
    named_children(node).into_iter().next()
}

/// Visit `root` and every descendant in source order (depth-first pre-order)
pub fn walk_preorder<'t>(root: Node<'t>, mut visit: impl FnMut(Node<'t>)) {
    let mut cursor = root.walk();
    'outer: loop {
        visit(cursor.node());
        if cursor.goto_first_child() {
            continue;
        }
        // A cursor never leaves the subtree it was created for.
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                break 'outer;
            }
        }
    }
}

/// Result of looking up a class declaration by name
#[derive(Debug, Clone, Copy)]
pub struct ClassLookup<'t> {
    /// The `class_definition` node that wins (the last one in source order)
    pub node: Option<Node<'t>>,
    /// How many declarations matched at the final nesting level
    pub matches: usize,
}

/// A parsed Python source file
pub struct SourceTree {
    text: String,
    tree: Tree,
}

impl SourceTree {
    /// Parse Python source text
    ///
    /// Syntax errors do not fail the parse; tree-sitter recovers and marks
    /// the broken regions, see [`SourceTree::error_lines`].
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| UmlError::parse_error(format!("failed to load Python grammar: {}", e)))?;

        let tree = parser
            .parse(&text, None)
            .ok_or_else(|| UmlError::parse_error("parser produced no syntax tree"))?;

        Ok(Self { text, tree })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Text of a node in this tree
    pub fn node_text(&self, node: Node<'_>) -> &str {
        node_text(node, &self.text)
    }

    pub fn has_errors(&self) -> bool {
        self.root().has_error()
    }

    /// 1-based lines where the parser had to recover from a syntax error
    pub fn error_lines(&self) -> Vec<usize> {
        let mut lines = Vec::new();
        if !self.has_errors() {
            return lines;
        }
        walk_preorder(self.root(), |node| {
            if node.is_error() || node.is_missing() {
                let line = node.start_position().row + 1;
                if lines.last() != Some(&line) {
                    lines.push(line);
                }
            }
        });
        lines
    }

    /// Find a class declaration by name
    ///
    /// `qualified_name` is either a top-level class name or a dotted path
    /// through nested classes (`Outer.Inner`). Decorated classes are
    /// unwrapped. When several declarations share the name, the last one
    /// wins, as it would when the module is executed.
    pub fn find_class(&self, qualified_name: &str) -> ClassLookup<'_> {
        let mut container = Some(self.root());
        let mut lookup = ClassLookup {
            node: None,
            matches: 0,
        };

        for segment in qualified_name.split('.') {
            let Some(scope) = container else {
                return ClassLookup {
                    node: None,
                    matches: 0,
                };
            };

            let candidates: Vec<Node<'_>> = class_definitions(scope)
                .into_iter()
                .filter(|class| {
                    class
                        .child_by_field_name("name")
                        .is_some_and(|name| self.node_text(name) == segment)
                })
                .collect();

            lookup = ClassLookup {
                node: candidates.last().copied(),
                matches: candidates.len(),
            };
            container = lookup.node.and_then(|class| class.child_by_field_name("body"));
        }

        lookup
    }
}

/// Class declarations directly inside a module or block
fn class_definitions(scope: Node<'_>) -> Vec<Node<'_>> {
    named_children(scope)
        .into_iter()
        .filter_map(|statement| match statement.kind() {
            "class_definition" => Some(statement),
            "decorated_definition" => statement
                .child_by_field_name("definition")
                .filter(|definition| definition.kind() == "class_definition"),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_module() {
        let tree = SourceTree::parse("class A:\n    pass\n").unwrap();
        assert_eq!(tree.root().kind(), "module");
        assert!(!tree.has_errors());
        assert!(tree.error_lines().is_empty());
    }

    #[test]
    fn test_find_top_level_class() {
        let tree = SourceTree::parse("x = 1\n\nclass A:\n    pass\n\nclass B(A):\n    pass\n")
            .unwrap();
        let lookup = tree.find_class("B");
        assert_eq!(lookup.matches, 1);
        let node = lookup.node.unwrap();
        assert_eq!(node.kind(), "class_definition");
        assert_eq!(node.start_position().row, 5);
    }

    #[test]
    fn test_find_decorated_class() {
        let tree =
            SourceTree::parse("@dataclass\nclass Point:\n    x: int\n    y: int\n").unwrap();
        let lookup = tree.find_class("Point");
        assert!(lookup.node.is_some());
        assert_eq!(lookup.matches, 1);
    }

    #[test]
    fn test_find_nested_class() {
        let source = "class Outer:\n    class Inner:\n        flag: bool\n";
        let tree = SourceTree::parse(source).unwrap();
        assert!(tree.find_class("Outer.Inner").node.is_some());
        assert!(tree.find_class("Inner").node.is_none());
        assert!(tree.find_class("Outer.Missing").node.is_none());
    }

    #[test]
    fn test_last_definition_wins() {
        let source = "class A:\n    pass\n\nclass A:\n    x = 1\n";
        let tree = SourceTree::parse(source).unwrap();
        let lookup = tree.find_class("A");
        assert_eq!(lookup.matches, 2);
        assert_eq!(lookup.node.unwrap().start_position().row, 3);
    }

    #[test]
    fn test_nested_functions_are_not_classes() {
        let source = "def build():\n    class Local:\n        pass\n";
        let tree = SourceTree::parse(source).unwrap();
        assert!(tree.find_class("Local").node.is_none());
    }

    #[test]
    fn test_error_lines_reported() {
        let tree = SourceTree::parse("class A:\n    def broken(:\n        pass\n").unwrap();
        assert!(tree.has_errors());
        assert!(!tree.error_lines().is_empty());
    }

    #[test]
    fn test_walk_preorder_visits_in_source_order() {
        let tree = SourceTree::parse("a = 1\nb = 2\n").unwrap();
        let mut identifiers = Vec::new();
        walk_preorder(tree.root(), |node| {
            if node.kind() == "identifier" {
                identifiers.push(tree.node_text(node).to_string());
            }
        });
        assert_eq!(identifiers, vec!["a", "b"]);
    }
}
