use argtree_core::*;
use argtree_parser::{ArgumentParser, ParseOutcome};

fn parse(tree: CommandTree, input: &str) -> ParseOutcome {
    ArgumentParser::new(tree)
        .expect("valid tree")
        .parse(input)
        .expect("first parse")
}

fn what_tree() -> CommandTree {
    let mut tree = CommandTree::new(Command::new("Testing"));
    tree.add_argument(
        tree.root(),
        Argument::new("what", TupleOf::new(StringType, Range::between(1, 3))),
    );
    tree
}

#[test]
fn test_values_without_tuple() {
    let outcome = parse(what_tree(), "--what hello world");

    assert!(!outcome.has_errors());
    assert!(outcome.errors.is_empty());
    assert_eq!(
        outcome.get("what"),
        Some(&Value::List(vec![Value::from("hello"), Value::from("world")]))
    );
}

#[test]
fn test_nested_sub_commands() {
    let mut tree = CommandTree::new(Command::new("root"));
    let root = tree.root();
    tree.add_argument(root, Argument::new("target", StringType).positional());
    let sub = tree.add_sub_command(root, Command::new("subCommand"));
    tree.add_argument(sub, Argument::new("c", CounterType));
    let another = tree.add_sub_command(sub, Command::new("another"));
    tree.add_argument(
        another,
        Argument::new("number", IntType::new()).positional(),
    );

    let outcome = parse(tree, "smth subCommand -cccc another 56");

    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    let args = &outcome.arguments;
    assert_eq!(args.get_as::<String>("target").as_deref(), Some("smth"));
    assert_eq!(args.get_as::<i64>("subCommand.c"), Some(4));
    assert_eq!(args.get_as::<i64>("subCommand.another.number"), Some(56));
    assert_eq!(
        args.sub_command().and_then(|s| s.sub_command()).map(|s| s.command()),
        Some("another")
    );
}

#[test]
fn test_tuple_value_count_error() {
    let outcome = parse(what_tree(), "--what [1 2 3 4 5 6 7 8 9 10]");

    assert_eq!(outcome.exit_code, 1);
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(
        outcome.diagnostics[0].message,
        "Incorrect number of values for argument 'what'.\nExpected from 1 to 3 values, but got 10."
    );
    assert!(outcome.errors[0].contains("Expected from 1 to 3 values, but got 10."));
    assert_eq!(outcome.get("what"), None);
}

#[test]
fn test_forward_value() {
    let outcome = parse(what_tree(), "foo -- hello world");

    assert_eq!(outcome.forward_value(), Some("hello world"));
    assert_eq!(outcome.arguments.forward_value(), Some("hello world"));
    // The stray value is only a warning.
    assert_eq!(outcome.exit_code, 0);
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].level, ErrorLevel::Warning);
}

#[test]
fn test_space_required_after_tuple() {
    let outcome = parse(what_tree(), "[foo]--what 1");

    assert_eq!(outcome.exit_code, 1);
    assert_eq!(outcome.diagnostics.len(), 1);
    assert!(
        outcome.diagnostics[0]
            .message
            .to_lowercase()
            .contains("space required between these characters")
    );
    let marker_line = outcome.errors[0].lines().nth(2).unwrap_or_default();
    let view_line = outcome.errors[0].lines().nth(1).unwrap_or_default();
    let caret = marker_line.find('^').expect("marker present");
    assert_eq!(&view_line[caret..caret + 2], "]-");
}

#[test]
fn test_required_argument_sets_exit_bits() {
    let mut tree = CommandTree::new(Command::new("tool").with_error_code(0b100));
    let root = tree.root();
    tree.add_argument(root, Argument::new("input", StringType).required());
    tree.add_argument(root, Argument::new("verbose", BoolType));

    let outcome = parse(tree, "--verbose");

    assert_eq!(outcome.exit_code, 0b100);
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(
        outcome.diagnostics[0].message,
        "Required argument 'input' not used."
    );
    assert_eq!(outcome.get("verbose"), Some(&Value::Bool(true)));
}

#[test]
fn test_required_argument_in_unreached_sub_command_is_ignored() {
    let mut tree = CommandTree::new(Command::new("tool"));
    let root = tree.root();
    let run = tree.add_sub_command(root, Command::new("run"));
    tree.add_argument(run, Argument::new("port", IntType::new()).required());

    let outcome = parse(tree, "");
    assert!(!outcome.has_errors());
    assert!(outcome.arguments.sub_command().is_none());
}

#[test]
fn test_definition_round_trip_through_parser() {
    let json = r#"{
        "name": "deploy",
        "error_code": 2,
        "arguments": [
            { "name": "env", "type": { "kind": "enum", "variants": ["dev", "prod"] }, "positional": true },
            { "name": "replicas", "aliases": ["r"], "type": { "kind": "int", "min": 1, "max": 9 }, "default": 1 },
            { "name": "label", "type": { "kind": "key_value" } }
        ]
    }"#;
    let definition: CommandDefinition = serde_json::from_str(json).unwrap();
    let tree = definition.into_tree().unwrap();

    let outcome = parse(tree, "prod -r 3 --label team=core");
    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
    assert_eq!(outcome.get("env"), Some(&Value::from("prod")));
    assert_eq!(outcome.get("replicas"), Some(&Value::Int(3)));
    let label = outcome.get("label").and_then(Value::as_map).unwrap();
    assert_eq!(label.get("team"), Some(&Value::from("core")));
}

#[test]
fn test_type_error_points_at_value() {
    let mut tree = CommandTree::new(Command::new("tool"));
    tree.add_argument(
        tree.root(),
        Argument::new("count", IntType::new().with_bounds(1, 5)),
    );

    let outcome = parse(tree, "--count 9");
    assert_eq!(outcome.exit_code, 1);
    assert_eq!(outcome.diagnostics[0].index, 1);
    assert!(outcome.errors[0].contains("out of range"));
}
