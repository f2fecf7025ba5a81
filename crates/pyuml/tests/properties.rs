//! Property-based tests for extraction, parsing and diagram assembly

use proptest::prelude::*;

use pyuml::diagram::{DiagramModel, DEFAULT_NOTATION};
use pyuml::extract::{ClassExtractor, ClassModel, ClassSelector};
use pyuml::manifest::RelationSpec;
use pyuml::{Database, Stereotype};

// ===================
// Strategies
// ===================

/// Python identifiers that can never be keywords
fn identifier_strategy() -> impl Strategy<Value = String> {
    "v[a-z0-9_]{0,10}"
}

fn qualified_name_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(identifier_strategy(), 1..4).prop_map(|parts| parts.join("."))
}

fn notation_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["--|>", "..|>", "o--", "*--", "-->", "..>", "<|--"])
}

fn type_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["int", "str", "List[int]", "Dict[str, float]", "Tuple[int, str]"])
}

// ===================
// Property Test Functions
// ===================

/// Class-level annotations are collected in declaration order
fn check_attribute_order(fields: &[(String, &str)]) -> Result<(), TestCaseError> {
    let mut source = String::from("class Generated:\n");
    for (name, ty) in fields {
        source.push_str(&format!("    {}: {}\n", name, ty));
    }

    let model = ClassExtractor::new()
        .extract(&source, "Generated", Stereotype::Class)
        .map_err(|e| TestCaseError::fail(e.to_string()))?;

    let names: Vec<&String> = model.attributes().keys().collect();
    let expected: Vec<&String> = fields.iter().map(|(name, _)| name).collect();
    prop_assert_eq!(names, expected);

    for (name, ty) in fields {
        let entry = format!("{}: {}", name, ty);
        prop_assert_eq!(model.attribute(name), Some(entry.as_str()));
    }
    Ok(())
}

/// Relation lines split into their three parts
fn check_relation_parses(source: &str, notation: &str, target: &str) -> Result<(), TestCaseError> {
    let line = format!("{} {} {}", source, notation, target);
    let relation = RelationSpec::parse(&line).map_err(|e| TestCaseError::fail(e.to_string()))?;

    prop_assert_eq!(relation.source, source);
    prop_assert_eq!(relation.notation, notation);
    prop_assert_eq!(relation.target, target);
    Ok(())
}

/// The class name of a file selector is the last dotted segment
fn check_selector_class_name(file: &str, class_path: &str) -> Result<(), TestCaseError> {
    let input = format!("{}.py::{}", file, class_path);
    let selector = ClassSelector::parse(&input).map_err(|e| TestCaseError::fail(e.to_string()))?;

    let last = class_path.rsplit('.').next().unwrap_or(class_path);
    prop_assert_eq!(selector.class_name(), last);
    prop_assert_eq!(selector.to_string(), input);
    Ok(())
}

/// Re-adding a relation keeps a single entry carrying the last notation
fn check_relation_overwrite(notations: &[&str]) -> Result<(), TestCaseError> {
    let mut diagram = DiagramModel::new();
    let child = diagram.add_class(ClassModel::new("Child", Stereotype::Class));
    let parent = diagram.add_class(ClassModel::new("Parent", Stereotype::Class));

    diagram
        .add_inheritance(child, parent)
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    for notation in notations {
        diagram
            .add_relation(child, parent, *notation)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
    }

    prop_assert_eq!(diagram.edge_count(), 1);
    let expected = notations.last().copied().unwrap_or(DEFAULT_NOTATION);
    let relation = diagram.relations().next();
    prop_assert_eq!(relation.map(|r| r.notation.as_str()), Some(expected));
    Ok(())
}

// ===================
// Proptest Wrappers
// ===================

proptest! {
    #[test]
    fn test_attribute_order(
        names in prop::collection::hash_set(identifier_strategy(), 1..8),
        types in prop::collection::vec(type_strategy(), 8),
    ) {
        let fields: Vec<(String, &str)> = names.into_iter().zip(types).collect();
        check_attribute_order(&fields)?;
    }

    #[test]
    fn test_relation_parses(
        source in qualified_name_strategy(),
        notation in notation_strategy(),
        target in qualified_name_strategy(),
    ) {
        check_relation_parses(&source, notation, &target)?;
    }

    #[test]
    fn test_selector_class_name(
        file in identifier_strategy(),
        class_path in qualified_name_strategy(),
    ) {
        check_selector_class_name(&file, &class_path)?;
    }

    #[test]
    fn test_relation_overwrite(notations in prop::collection::vec(notation_strategy(), 0..6)) {
        check_relation_overwrite(&notations)?;
    }
}
