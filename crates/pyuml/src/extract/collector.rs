//! Member collection for a single class declaration
//!
//! Walks the statements of a class body and the bodies of its methods,
//! producing the attribute and method maps of a [`ClassModel`](super::ClassModel).
//! Statements are visited depth-first in source order.
//!
//! Attribute sources:
//! - class-level assignments (`x = 1`, `x: int = 1`, `a = b = 2`)
//! - assignments to the instance-binding parameter inside any method
//!   (`self.x = ...`, `self.x: int = ...`, `self.a, self.b = ...`)
//! - property-style methods (`@property`, `@cached_property`, `@x.setter`)
//!
//! When a name is seen twice, the entry with fewer `EMPTY` markers wins and
//! ties keep the first. A property replaces any existing entry that has no
//! real type information, and is reported as shadowed otherwise.

use indexmap::IndexMap;
use tracing::trace;
use tree_sitter::Node;

use super::annotation::{format_annotation, is_literal, literal_value, EMPTY};
use crate::core::{
    first_named_child, named_children, node_text, walk_preorder, Diagnostic, DiagnosticKind,
    DiagnosticSink,
};

/// Members gathered from one class body
#[derive(Debug, Default)]
pub struct Members {
    pub attributes: IndexMap<String, String>,
    pub methods: IndexMap<String, String>,
}

/// Where an assignment target is being resolved
#[derive(Clone, Copy)]
enum Scope<'a> {
    /// Directly in the class body: plain names are attributes
    Class,
    /// Inside a method: only `<binding>.<name>` targets are attributes
    Method { binding: Option<&'a str> },
}

/// How a decorator affects the decorated method
#[derive(Debug, Clone, PartialEq, Eq)]
enum Decoration {
    Property,
    Tag(String),
}

/// Collects attributes and methods of one class
pub struct MemberCollector<'a> {
    class_name: &'a str,
    source: &'a str,
    sink: &'a dyn DiagnosticSink,
    members: Members,
}

impl<'a> MemberCollector<'a> {
    pub fn new(class_name: &'a str, source: &'a str, sink: &'a dyn DiagnosticSink) -> Self {
        Self {
            class_name,
            source,
            sink,
            members: Members::default(),
        }
    }

    /// Collect the members of a `class_definition` node
    pub fn collect(mut self, class: Node<'_>) -> Members {
        let Some(body) = class.child_by_field_name("body") else {
            return self.members;
        };

        for statement in named_children(body) {
            match statement.kind() {
                "expression_statement" => {
                    for expression in named_children(statement) {
                        if expression.kind() == "assignment" {
                            self.collect_assignment(expression, Scope::Class);
                        }
                    }
                }
                "function_definition" => self.collect_method(statement, &[]),
                "decorated_definition" => {
                    let decorators: Vec<Node<'_>> = named_children(statement)
                        .into_iter()
                        .filter(|child| child.kind() == "decorator")
                        .collect();
                    if let Some(definition) = statement
                        .child_by_field_name("definition")
                        .filter(|definition| definition.kind() == "function_definition")
                    {
                        self.collect_method(definition, &decorators);
                    }
                }
                _ => {}
            }
        }

        self.members
    }

    fn collect_assignment(&mut self, assignment: Node<'_>, scope: Scope<'_>) {
        let Some(left) = assignment.child_by_field_name("left") else {
            return;
        };

        let mut names = Vec::new();
        self.target_names(left, scope, &mut names);

        match assignment.child_by_field_name("type") {
            // An annotated assignment has exactly one target.
            Some(annotation) => {
                if let Some(name) = names.into_iter().next() {
                    let formatted = format_annotation(Some(annotation), self.source);
                    let entry = format!("{}: {}", name, formatted);
                    self.insert_attribute(name, entry);
                }
            }
            None => {
                for name in names {
                    let entry = format!("{}: {}", name, EMPTY);
                    self.insert_attribute(name, entry);
                }
            }
        }

        // `a = b = 1` nests the second assignment on the right. Method bodies
        // are walked exhaustively, so only the class level recurses here.
        if let Scope::Class = scope {
            if let Some(right) = assignment
                .child_by_field_name("right")
                .filter(|right| right.kind() == "assignment")
            {
                self.collect_assignment(right, scope);
            }
        }
    }

    fn target_names(&self, target: Node<'_>, scope: Scope<'_>, out: &mut Vec<String>) {
        match target.kind() {
            "identifier" => {
                if let Scope::Class = scope {
                    out.push(node_text(target, self.source).to_string());
                }
            }
            "attribute" => {
                let Scope::Method {
                    binding: Some(binding),
                } = scope
                else {
                    return;
                };
                let object = target.child_by_field_name("object");
                let attribute = target.child_by_field_name("attribute");
                if let (Some(object), Some(attribute)) = (object, attribute) {
                    // `self.a.b = x` assigns into another object.
                    if object.kind() == "identifier" && node_text(object, self.source) == binding {
                        out.push(node_text(attribute, self.source).to_string());
                    }
                }
            }
            "subscript" => {
                if let Some(value) = target.child_by_field_name("value") {
                    self.target_names(value, scope, out);
                }
            }
            "pattern_list" | "tuple_pattern" | "list_pattern" | "expression_list" | "tuple"
            | "list" => {
                for element in named_children(target) {
                    self.target_names(element, scope, out);
                }
            }
            "list_splat_pattern" | "list_splat" | "parenthesized_expression" => {
                if let Some(inner) = first_named_child(target) {
                    self.target_names(inner, scope, out);
                }
            }
            _ => {}
        }
    }

    fn collect_method(&mut self, function: Node<'_>, decorators: &[Node<'_>]) {
        let Some(name_node) = function.child_by_field_name("name") else {
            return;
        };
        let name = node_text(name_node, self.source).to_string();

        let mut is_property = false;
        let mut is_static = false;
        let mut tags: Vec<String> = Vec::new();
        for decorator in decorators {
            let Some((segment, decoration)) = self.classify_decorator(*decorator) else {
                continue;
            };
            if segment == "staticmethod" {
                is_static = true;
            }
            match decoration {
                Decoration::Property => is_property = true,
                Decoration::Tag(tag) => {
                    if !tags.contains(&tag) {
                        tags.push(tag);
                    }
                }
            }
        }
        let prefix = tags.concat();

        let mut parameters = function
            .child_by_field_name("parameters")
            .map(|parameters| self.parameters(parameters))
            .unwrap_or_default();

        // The first parameter of anything but a static method is the binding
        // (`self` or `cls`), unless it is a `*args`/`**kwargs` catch-all.
        let binding = if !is_static && parameters.first().is_some_and(|p| !p.variadic) {
            Some(parameters.remove(0).name)
        } else {
            None
        };

        let returns = match function.child_by_field_name("return_type") {
            Some(annotation) if is_literal(annotation) => literal_value(annotation, self.source),
            other => format_annotation(other, self.source),
        };

        trace!(
            class = self.class_name,
            method = %name,
            property = is_property,
            binding = binding.as_deref(),
            "collecting method"
        );

        if is_property {
            let entry = format!("{}{}: {}", prefix, name, returns);
            let line = function.start_position().row + 1;
            self.insert_property(name.clone(), entry, line);
        } else {
            let arguments = parameters
                .iter()
                .map(|parameter| format!("{}: {}", parameter.name, parameter.annotation))
                .collect::<Vec<_>>()
                .join(", ");
            let entry = format!("{}{}({}) -> {}", prefix, name, arguments, returns);
            self.members.methods.insert(name, entry);
        }

        if let Some(body) = function.child_by_field_name("body") {
            let scope = Scope::Method {
                binding: binding.as_deref(),
            };
            let mut assignments = Vec::new();
            walk_preorder(body, |node| {
                if node.kind() == "assignment" {
                    assignments.push(node);
                }
            });
            for assignment in assignments {
                self.collect_assignment(assignment, scope);
            }
        }
    }

    /// Last name segment of a decorator and what it does to the method
    fn classify_decorator(&self, decorator: Node<'_>) -> Option<(String, Decoration)> {
        let mut expression = first_named_child(decorator)?;
        if expression.kind() == "call" {
            expression = expression.child_by_field_name("function")?;
        }

        let segment = match expression.kind() {
            "identifier" => node_text(expression, self.source),
            "attribute" => node_text(expression.child_by_field_name("attribute")?, self.source),
            _ => return None,
        };

        let decoration = match segment {
            "property" | "cached_property" => Decoration::Property,
            "getter" | "setter" | "deleter" if expression.kind() == "attribute" => {
                Decoration::Property
            }
            "staticmethod" | "classmethod" => Decoration::Tag("{static}".to_string()),
            "abstractmethod" => Decoration::Tag("{abstract}".to_string()),
            other => Decoration::Tag(format!("{{{}}}", other)),
        };

        Some((segment.to_string(), decoration))
    }

    fn parameters(&self, parameters: Node<'_>) -> Vec<Parameter> {
        named_children(parameters)
            .into_iter()
            .filter_map(|parameter| self.parameter(parameter))
            .collect()
    }

    fn parameter(&self, parameter: Node<'_>) -> Option<Parameter> {
        let text = |node: Node<'_>| node_text(node, self.source).to_string();
        let annotation = |node: Node<'_>| format_annotation(node.child_by_field_name("type"), self.source);

        match parameter.kind() {
            "identifier" => Some(Parameter::plain(text(parameter), EMPTY.to_string())),
            "typed_parameter" => {
                let target = first_named_child(parameter)?;
                match target.kind() {
                    "list_splat_pattern" | "dictionary_splat_pattern" => Some(Parameter::variadic(
                        text(target),
                        annotation(parameter),
                    )),
                    _ => Some(Parameter::plain(text(target), annotation(parameter))),
                }
            }
            "default_parameter" => Some(Parameter::plain(
                text(parameter.child_by_field_name("name")?),
                EMPTY.to_string(),
            )),
            "typed_default_parameter" => Some(Parameter::plain(
                text(parameter.child_by_field_name("name")?),
                annotation(parameter),
            )),
            "list_splat_pattern" | "dictionary_splat_pattern" => {
                Some(Parameter::variadic(text(parameter), EMPTY.to_string()))
            }
            // `*` and `/` separators declare no parameter.
            _ => None,
        }
    }

    fn insert_attribute(&mut self, name: String, entry: String) {
        if let Some(existing) = self.members.attributes.get(&name) {
            if empty_markers(&entry) >= empty_markers(existing) {
                return;
            }
        }
        trace!(class = self.class_name, attribute = %name, entry = %entry, "attribute");
        self.members.attributes.insert(name, entry);
    }

    fn insert_property(&mut self, name: String, entry: String, line: usize) {
        let replace = match self.members.attributes.get(&name) {
            None => true,
            Some(existing) => lacks_type(existing),
        };

        if replace {
            trace!(class = self.class_name, property = %name, entry = %entry, "property");
            self.members.attributes.insert(name, entry);
        } else {
            let kept = self
                .members
                .attributes
                .get(&name)
                .cloned()
                .unwrap_or_default();
            self.sink.report(
                Diagnostic::new(
                    DiagnosticKind::PropertyShadowed,
                    self.class_name,
                    format!("property `{}` discarded in favour of `{}`", entry, kept),
                )
                .at_line(line),
            );
        }
    }
}

/// One declared parameter of a method
struct Parameter {
    name: String,
    annotation: String,
    /// `*args` or `**kwargs`
    variadic: bool,
}

impl Parameter {
    fn plain(name: String, annotation: String) -> Self {
        Self {
            name,
            annotation,
            variadic: false,
        }
    }

    fn variadic(name: String, annotation: String) -> Self {
        Self {
            name,
            annotation,
            variadic: true,
        }
    }
}

/// Identifier-like tokens of the type part of `name: type`
fn type_tokens(entry: &str) -> impl Iterator<Item = &str> {
    let type_part = entry.split_once(": ").map(|(_, ty)| ty).unwrap_or(entry);
    type_part
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
}

fn empty_markers(entry: &str) -> usize {
    type_tokens(entry).filter(|token| *token == EMPTY).count()
}

/// Whether an entry's type carries `None` or `EMPTY` instead of a real type
fn lacks_type(entry: &str) -> bool {
    type_tokens(entry).any(|token| token == EMPTY || token == "None")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CollectingSink, NullSink, SourceTree};

    fn collect(source: &str, class: &str) -> Members {
        let tree = SourceTree::parse(source).unwrap();
        let node = tree.find_class(class).node.unwrap();
        MemberCollector::new(class, tree.text(), &NullSink).collect(node)
    }

    #[test]
    fn test_marker_counting_is_token_based() {
        assert_eq!(empty_markers("x: EMPTY"), 1);
        assert_eq!(empty_markers("x: Dict[EMPTY, EMPTY]"), 2);
        assert_eq!(empty_markers("x: EMPTYish"), 0);
        assert!(lacks_type("core: None"));
        assert!(!lacks_type("core: NoneType"));
        assert!(!lacks_type("none_flag: bool"));
    }

    #[test]
    fn test_class_level_assignments() {
        let members = collect(
            "class A:\n    x = 1\n    y: int = 2\n    a = b = 3\n    p, q = 1, 2\n",
            "A",
        );
        let keys: Vec<&str> = members.attributes.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["x", "y", "a", "b", "p", "q"]);
        assert_eq!(members.attributes["y"], "y: int");
        assert_eq!(members.attributes["b"], "b: EMPTY");
    }

    #[test]
    fn test_instance_assignments_use_binding_name() {
        let members = collect(
            "class A:\n    def __init__(this, v):\n        this.v = v\n        self.other = 1\n        this.a.b = 2\n",
            "A",
        );
        assert_eq!(members.attributes.len(), 1);
        assert_eq!(members.attributes["v"], "v: EMPTY");
    }

    #[test]
    fn test_nested_blocks_are_walked() {
        let members = collect(
            "class A:\n    def run(self):\n        if True:\n            for i in range(3):\n                self.count: int = i\n",
            "A",
        );
        assert_eq!(members.attributes["count"], "count: int");
    }

    #[test]
    fn test_star_and_subscript_targets() {
        let members = collect(
            "class A:\n    def run(self):\n        self.head, *self.tail = [1, 2]\n        self.table[0] = 1\n",
            "A",
        );
        let keys: Vec<&str> = members.attributes.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["head", "tail", "table"]);
    }

    #[test]
    fn test_static_method_has_no_binding() {
        let members = collect(
            "class A:\n    @staticmethod\n    def make(arg: str) -> None:\n        arg.x = 1\n",
            "A",
        );
        assert_eq!(members.methods["make"], "{static}make(arg: str) -> None");
        assert!(members.attributes.is_empty());
    }

    #[test]
    fn test_classmethod_drops_cls() {
        let members = collect(
            "class A:\n    @classmethod\n    def build(cls, size: int = 3):\n        pass\n",
            "A",
        );
        assert_eq!(members.methods["build"], "{static}build(size: int) -> EMPTY");
    }

    #[test]
    fn test_every_parameter_kind_is_listed() {
        let members = collect(
            "class A:\n    def f(self, a, b: int, c=1, d: str = 'x', *args: int, e, **kwargs):\n        pass\n",
            "A",
        );
        assert_eq!(
            members.methods["f"],
            "f(a: EMPTY, b: int, c: EMPTY, d: str, *args: int, e: EMPTY, **kwargs: EMPTY) -> EMPTY"
        );
    }

    #[test]
    fn test_separators_are_skipped() {
        let members = collect(
            "class A:\n    def f(self, a, /, b, *, c):\n        pass\n",
            "A",
        );
        assert_eq!(members.methods["f"], "f(a: EMPTY, b: EMPTY, c: EMPTY) -> EMPTY");
    }

    #[test]
    fn test_literal_return_annotation() {
        let members = collect("class A:\n    def f(self) -> 'Node':\n        pass\n", "A");
        assert_eq!(members.methods["f"], "f() -> Node");
    }

    #[test]
    fn test_custom_decorator_tags_in_order() {
        let members = collect(
            "class A:\n    @functools.wraps(g)\n    @abstractmethod\n    @cache\n    @cache\n    def f(self):\n        pass\n",
            "A",
        );
        assert_eq!(members.methods["f"], "{wraps}{abstract}{cache}f() -> EMPTY");
    }

    #[test]
    fn test_async_method() {
        let members = collect(
            "class A:\n    async def fetch(self, url: str) -> bytes:\n        self.last = url\n",
            "A",
        );
        assert_eq!(members.methods["fetch"], "fetch(url: str) -> bytes");
        assert!(members.attributes.contains_key("last"));
    }

    #[test]
    fn test_property_setter_does_not_replace_typed_entry() {
        let source = "class A:\n    @property\n    def core(self) -> bool:\n        return True\n\n    @core.setter\n    def core(self, value) -> None:\n        pass\n";
        let members = collect(source, "A");
        assert_eq!(members.attributes["core"], "core: bool");
        assert!(members.methods.is_empty());
    }

    #[test]
    fn test_typed_property_replaces_untyped_attribute() {
        let source = "class A:\n    def __init__(self):\n        self.core = None\n\n    @property\n    def core(self) -> int:\n        return 1\n";
        let members = collect(source, "A");
        assert_eq!(members.attributes["core"], "core: int");
    }

    #[test]
    fn test_shadowed_property_is_reported() {
        let source = "class A:\n    core: str\n\n    @property\n    def core(self) -> int:\n        return 1\n";
        let tree = SourceTree::parse(source).unwrap();
        let node = tree.find_class("A").node.unwrap();
        let sink = CollectingSink::new();
        let members = MemberCollector::new("A", tree.text(), &sink).collect(node);

        assert_eq!(members.attributes["core"], "core: str");
        let diagnostics = sink.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::PropertyShadowed);
        assert_eq!(diagnostics[0].line, Some(5));
    }

    #[test]
    fn test_untyped_property_replaces_placeholder() {
        let source = "class A:\n    flag = None\n\n    @property\n    @abstractmethod\n    def flag(self):\n        ...\n";
        let members = collect(source, "A");
        assert_eq!(members.attributes["flag"], "{abstract}flag: EMPTY");
    }

    #[test]
    fn test_none_property_replaces_untyped_attribute() {
        let source = "class A:\n    def __init__(self):\n        self.done = False\n\n    @property\n    def done(self) -> None:\n        pass\n";
        let members = collect(source, "A");
        assert_eq!(members.attributes["done"], "done: None");
    }

    #[test]
    fn test_setter_against_typed_getter_is_reported() {
        let source = "class A:\n    @property\n    def core(self) -> bool:\n        return True\n\n    @core.setter\n    def core(self, value) -> None:\n        pass\n";
        let tree = SourceTree::parse(source).unwrap();
        let node = tree.find_class("A").node.unwrap();
        let sink = CollectingSink::new();
        let members = MemberCollector::new("A", tree.text(), &sink).collect(node);

        assert_eq!(members.attributes["core"], "core: bool");
        assert_eq!(sink.count(DiagnosticKind::PropertyShadowed), 1);
        assert_eq!(sink.diagnostics()[0].line, Some(7));
    }

    #[test]
    fn test_property_keeps_other_tags() {
        let source = "class A:\n    @property\n    @abstractmethod\n    def flag(self) -> bool:\n        ...\n";
        let members = collect(source, "A");
        assert_eq!(members.attributes["flag"], "{abstract}flag: bool");
    }

    #[test]
    fn test_comments_are_ignored() {
        let source = "class A:\n    # leading\n    x = 1  # trailing\n    def f(self,  # why\n          a):\n        pass\n";
        let members = collect(source, "A");
        assert_eq!(members.attributes["x"], "x: EMPTY");
        assert_eq!(members.methods["f"], "f(a: EMPTY) -> EMPTY");
    }
}
