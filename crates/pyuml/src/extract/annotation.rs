//! Type annotation formatting
//!
//! Turns a type-expression node into the display string used in class
//! blocks: `Optional[MockCore]`, `Dict[str, int]`, `Tuple[int, Union[int, float]]`.
//! PEP 604 unions are rewritten into their `typing` spelling. Anything the
//! formatter has no rule for falls back to its source text.

use tree_sitter::Node;

use crate::core::{first_named_child, named_children, node_text};

/// Marker rendered where a declaration carries no annotation
pub const EMPTY: &str = "EMPTY";

/// Format an optional annotation node
///
/// `None` (no annotation in the source) formats as [`EMPTY`].
pub fn format_annotation(node: Option<Node<'_>>, source: &str) -> String {
    match node {
        Some(node) => format_type(node, source),
        None => EMPTY.to_string(),
    }
}

/// Whether a node is a literal constant (possibly wrapped in a `type` node)
pub fn is_literal(node: Node<'_>) -> bool {
    matches!(
        unwrap_type(node).kind(),
        "none"
            | "true"
            | "false"
            | "integer"
            | "float"
            | "string"
            | "concatenated_string"
            | "ellipsis"
    )
}

/// Value of a literal constant: strings lose their quotes, everything else
/// keeps its spelling (`None`, `True`, `3.5`)
pub fn literal_value(node: Node<'_>, source: &str) -> String {
    let node = unwrap_type(node);
    match node.kind() {
        "string" => string_value(node, source),
        "concatenated_string" => named_children(node)
            .into_iter()
            .map(|part| string_value(part, source))
            .collect(),
        _ => node_text(node, source).to_string(),
    }
}

fn format_type(node: Node<'_>, source: &str) -> String {
    match node.kind() {
        "type" | "parenthesized_expression" => match first_named_child(node) {
            Some(inner) => format_type(inner, source),
            None => collapse_whitespace(node_text(node, source)),
        },
        "identifier" => node_text(node, source).to_string(),
        "attribute" => match (
            node.child_by_field_name("object"),
            node.child_by_field_name("attribute"),
        ) {
            (Some(object), Some(attribute)) => format!(
                "{}.{}",
                format_type(object, source),
                node_text(attribute, source)
            ),
            _ => collapse_whitespace(node_text(node, source)),
        },
        "member_type" => named_children(node)
            .into_iter()
            .map(|part| format_type(part, source))
            .collect::<Vec<_>>()
            .join("."),
        "generic_type" => format_generic(node, source),
        "subscript" => format_subscript(node, source),
        "union_type" => format_union(node, source),
        "binary_operator" if is_union_operator(node) => format_union(node, source),
        "list" => format!("[{}]", format_arguments(&named_children(node), source)),
        "tuple" => format!("({})", format_arguments(&named_children(node), source)),
        _ if is_literal(node) => literal_value(node, source),
        _ => collapse_whitespace(node_text(node, source)),
    }
}

/// `Dict[str, int]` in annotation position
fn format_generic(node: Node<'_>, source: &str) -> String {
    let children = named_children(node);
    let base = children
        .iter()
        .find(|child| child.kind() != "type_parameter")
        .map(|child| format_type(*child, source));
    let parameters = children
        .iter()
        .find(|child| child.kind() == "type_parameter")
        .map(|params| format_arguments(&named_children(*params), source));

    match (base, parameters) {
        (Some(base), Some(parameters)) => format!("{}[{}]", base, parameters),
        _ => collapse_whitespace(node_text(node, source)),
    }
}

/// `Dict[str, int]` parsed as an ordinary subscript expression
fn format_subscript(node: Node<'_>, source: &str) -> String {
    let Some(value) = node.child_by_field_name("value") else {
        return collapse_whitespace(node_text(node, source));
    };
    let mut cursor = node.walk();
    let arguments: Vec<Node<'_>> = node
        .children_by_field_name("subscript", &mut cursor)
        .collect();

    format!(
        "{}[{}]",
        format_type(value, source),
        format_arguments(&arguments, source)
    )
}

/// Subscript arguments, with a bare tuple flattened into the argument list
fn format_arguments(arguments: &[Node<'_>], source: &str) -> String {
    let mut parts = Vec::new();
    for argument in arguments {
        let inner = unwrap_type(*argument);
        if inner.kind() == "tuple" {
            parts.extend(
                named_children(inner)
                    .into_iter()
                    .map(|element| format_type(element, source)),
            );
        } else {
            parts.push(format_type(*argument, source));
        }
    }
    parts.join(", ")
}

/// `X | None` becomes `Optional[X]`; any other union becomes `Union[...]`
fn format_union(node: Node<'_>, source: &str) -> String {
    let mut variants = Vec::new();
    union_variants(node, &mut variants);

    let absent = variants
        .iter()
        .filter(|variant| variant.kind() == "none")
        .count();
    if variants.len() == 2 && absent == 1 {
        if let Some(present) = variants.iter().find(|variant| variant.kind() != "none") {
            return format!("Optional[{}]", format_type(*present, source));
        }
    }

    let formatted: Vec<String> = variants
        .iter()
        .map(|variant| format_type(*variant, source))
        .collect();
    format!("Union[{}]", formatted.join(", "))
}

fn union_variants<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    let node = unwrap_type(node);
    match node.kind() {
        "union_type" => {
            for member in named_children(node) {
                union_variants(member, out);
            }
        }
        "binary_operator" if is_union_operator(node) => {
            for field in ["left", "right"] {
                if let Some(side) = node.child_by_field_name(field) {
                    union_variants(side, out);
                }
            }
        }
        _ => out.push(node),
    }
}

fn is_union_operator(node: Node<'_>) -> bool {
    node.child_by_field_name("operator")
        .is_some_and(|operator| operator.kind() == "|")
}

/// Strip `type` and parenthesis wrappers
fn unwrap_type(node: Node<'_>) -> Node<'_> {
    let mut current = node;
    while matches!(current.kind(), "type" | "parenthesized_expression") {
        match first_named_child(current) {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current
}

fn string_value(node: Node<'_>, source: &str) -> String {
    let contents: Vec<&str> = named_children(node)
        .into_iter()
        .filter(|child| child.kind() == "string_content")
        .map(|child| node_text(child, source))
        .collect();
    if !contents.is_empty() {
        return contents.concat();
    }

    node_text(node, source)
        .trim_start_matches(|c: char| "rRbBuUfF".contains(c))
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SourceTree;

    /// Format the annotation of `x: <annotation>`
    fn annotation_of(annotation: &str) -> String {
        let tree = SourceTree::parse(format!("x: {}\n", annotation)).unwrap();
        let statement = first_named_child(tree.root()).unwrap();
        let assignment = first_named_child(statement).unwrap();
        assert_eq!(assignment.kind(), "assignment");
        format_annotation(assignment.child_by_field_name("type"), tree.text())
    }

    /// Format the default value of `x = <value>`
    fn literal_of(value: &str) -> (bool, String) {
        let tree = SourceTree::parse(format!("x = {}\n", value)).unwrap();
        let statement = first_named_child(tree.root()).unwrap();
        let assignment = first_named_child(statement).unwrap();
        let right = assignment.child_by_field_name("right").unwrap();
        (is_literal(right), literal_value(right, tree.text()))
    }

    #[test]
    fn test_missing_annotation_is_empty_marker() {
        assert_eq!(format_annotation(None, ""), EMPTY);
    }

    #[test]
    fn test_plain_names() {
        assert_eq!(annotation_of("int"), "int");
        assert_eq!(annotation_of("MockCore"), "MockCore");
        assert_eq!(annotation_of("None"), "None");
    }

    #[test]
    fn test_dotted_names() {
        assert_eq!(annotation_of("typing.Any"), "typing.Any");
        assert_eq!(annotation_of("os.PathLike"), "os.PathLike");
    }

    #[test]
    fn test_subscripted_generics() {
        assert_eq!(annotation_of("Dict[str, int]"), "Dict[str, int]");
        assert_eq!(annotation_of("Optional[float]"), "Optional[float]");
        assert_eq!(
            annotation_of("Tuple[int, MockCore, Union[int, float]]"),
            "Tuple[int, MockCore, Union[int, float]]"
        );
        assert_eq!(
            annotation_of("Dict[str, Optional[MockCore]]"),
            "Dict[str, Optional[MockCore]]"
        );
    }

    #[test]
    fn test_explicit_union_keeps_spelling() {
        assert_eq!(
            annotation_of("Union[int, None, float]"),
            "Union[int, None, float]"
        );
        assert_eq!(annotation_of("Union[None, int]"), "Union[None, int]");
    }

    #[test]
    fn test_pep604_optional() {
        assert_eq!(annotation_of("MockCore | None"), "Optional[MockCore]");
        assert_eq!(annotation_of("None | int"), "Optional[int]");
    }

    #[test]
    fn test_pep604_union() {
        assert_eq!(annotation_of("int | str"), "Union[int, str]");
        assert_eq!(annotation_of("int | str | None"), "Union[int, str, None]");
    }

    #[test]
    fn test_callable_with_ellipsis() {
        assert_eq!(annotation_of("Callable[..., int]"), "Callable[..., int]");
        assert_eq!(
            annotation_of("Callable[[int, str], bool]"),
            "Callable[[int, str], bool]"
        );
    }

    #[test]
    fn test_multiline_annotation_collapses() {
        assert_eq!(
            annotation_of("Dict[\n    str,\n    int,\n]"),
            "Dict[str, int]"
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(literal_of("None"), (true, "None".to_string()));
        assert_eq!(literal_of("True"), (true, "True".to_string()));
        assert_eq!(literal_of("3.5"), (true, "3.5".to_string()));
        assert_eq!(literal_of("'text'"), (true, "text".to_string()));
        assert_eq!(literal_of("\"a\" \"b\""), (true, "ab".to_string()));
        assert!(!literal_of("compute()").0);
    }
}
