use argtree_core::*;
use argtree_parser::{ArgumentParser, ParserConfig, TupleChars, UsageError};

fn list_tree(range: Range) -> CommandTree {
    let mut tree = CommandTree::new(Command::new("tool"));
    tree.add_argument(
        tree.root(),
        Argument::new("list", TupleOf::new(StringType, range)),
    );
    tree
}

#[test]
fn test_reset_and_reparse_is_identical() {
    let mut tree = CommandTree::new(Command::new("tool"));
    let root = tree.root();
    tree.add_argument(root, Argument::new("v", CounterType));
    tree.add_argument(root, Argument::new("name", StringType).required());
    let sub = tree.add_sub_command(root, Command::new("run"));
    tree.add_argument(sub, Argument::new("port", IntType::new()));

    let mut parser = ArgumentParser::new(tree).unwrap();
    let input = "-vvv stray run --port x";
    let first = parser.parse(input).unwrap();

    assert!(matches!(parser.parse(input), Err(UsageError::NotReset)));

    parser.reset();
    let second = parser.parse(input).unwrap();
    assert_eq!(first.arguments, second.arguments);
    assert_eq!(first.errors, second.errors);
    assert_eq!(first.diagnostics, second.diagnostics);
    assert_eq!(first.exit_code, second.exit_code);
    assert_eq!(second.get("v"), Some(&Value::Int(3)));
}

#[test]
fn test_value_count_range_is_enforced() {
    let range = Range::between(2, 4);
    for count in 0..=6 {
        let values: Vec<String> = (0..count).map(|i| format!("v{i}")).collect();
        let input = format!("--list [ {} ]", values.join(" "));
        let mut parser = ArgumentParser::new(list_tree(range)).unwrap();
        let outcome = parser.parse(&input).unwrap();

        if range.contains(count) {
            assert!(outcome.diagnostics.is_empty(), "count {count}: {:?}", outcome.errors);
            let list = outcome.get("list").and_then(Value::as_list).unwrap();
            assert_eq!(list.len(), count);
        } else {
            assert_eq!(outcome.diagnostics.len(), 1, "count {count}");
            assert!(
                outcome.diagnostics[0]
                    .message
                    .ends_with(&format!("but got {count}."))
            );
        }
    }
}

#[test]
fn test_tuple_overflow_reports_true_count() {
    let mut parser = ArgumentParser::new(list_tree(Range::between(1, 2))).unwrap();
    let outcome = parser.parse("--list [ a b c d e f g ]").unwrap();
    assert_eq!(outcome.diagnostics.len(), 1);
    assert!(outcome.diagnostics[0].message.ends_with("but got 7."));
}

#[test]
fn test_exclusive_group_reports_once() {
    let mut tree = CommandTree::new(Command::new("tool"));
    let root = tree.root();
    let group = tree.add_group(root, "mode", true);
    tree.add_argument_to_group(group, Argument::new("fast", StringType));
    tree.add_argument_to_group(
        group,
        Argument::new("safe", StringType).with_default("fallback"),
    );

    let mut parser = ArgumentParser::new(tree).unwrap();
    let outcome = parser.parse("--fast a --safe b").unwrap();

    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(
        outcome.diagnostics[0].message,
        "Multiple arguments in exclusive group 'mode' used."
    );
    assert_eq!(outcome.diagnostics[0].index, 3);
    assert_eq!(outcome.get("fast"), Some(&Value::from("a")));
    assert_eq!(outcome.get("safe"), Some(&Value::from("fallback")));
}

#[test]
fn test_exclusive_group_spans_sub_groups() {
    let mut tree = CommandTree::new(Command::new("tool"));
    let root = tree.root();
    let outer = tree.add_group(root, "outer", true);
    let inner = tree.add_sub_group(outer, "inner", false);
    tree.add_argument_to_group(outer, Argument::new("a", BoolType));
    tree.add_argument_to_group(inner, Argument::new("b", BoolType));

    let mut parser = ArgumentParser::new(tree).unwrap();
    let outcome = parser.parse("--b --a").unwrap();
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.get("b"), Some(&Value::Bool(true)));
    assert_eq!(outcome.get("a"), Some(&Value::Bool(false)));
}

#[test]
fn test_display_and_exit_thresholds_are_independent() {
    // Hidden, but still fails the run.
    let tree = CommandTree::new(
        Command::new("tool")
            .with_display_level(ErrorLevel::Error)
            .with_exit_level(ErrorLevel::Warning),
    );
    let mut parser = ArgumentParser::new(tree).unwrap();
    let outcome = parser.parse("stray").unwrap();
    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.exit_code, 1);

    // Shown, but does not fail the run.
    let tree = CommandTree::new(Command::new("tool"));
    let mut parser = ArgumentParser::new(tree).unwrap();
    let outcome = parser.parse("stray").unwrap();
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].starts_with("WARNING"));
    assert_eq!(outcome.exit_code, 0);
}

#[test]
fn test_thresholds_are_inherited() {
    let mut tree = CommandTree::new(Command::new("tool").with_exit_level(ErrorLevel::Warning));
    let sub = tree.add_sub_command(tree.root(), Command::new("run").with_error_code(2));
    tree.add_argument(sub, Argument::new("port", IntType::new()));

    let mut parser = ArgumentParser::new(tree).unwrap();
    let outcome = parser.parse("run stray").unwrap();
    assert_eq!(outcome.exit_code, 2);
    assert_eq!(outcome.diagnostics[0].command, "run");
}

#[test]
fn test_exit_code_combines_failing_levels() {
    let mut tree = CommandTree::new(Command::new("tool").with_error_code(1));
    let root = tree.root();
    tree.add_argument(root, Argument::new("count", IntType::new()));
    let sub = tree.add_sub_command(root, Command::new("run").with_error_code(2));
    tree.add_argument(sub, Argument::new("port", IntType::new()));

    let mut parser = ArgumentParser::new(tree).unwrap();
    let outcome = parser.parse("--count x run --port y").unwrap();
    assert_eq!(outcome.exit_code, 3);
    let indices: Vec<isize> = outcome.diagnostics.iter().map(|d| d.index).collect();
    assert_eq!(indices, vec![1, 4]);
}

#[test]
fn test_errors_are_ordered_across_levels() {
    let mut tree = CommandTree::new(Command::new("tool"));
    let root = tree.root();
    tree.add_argument(root, Argument::new("name", StringType).required());
    let sub = tree.add_sub_command(root, Command::new("run"));
    tree.add_argument(sub, Argument::new("port", IntType::new()));

    let mut parser = ArgumentParser::new(tree).unwrap();
    let outcome = parser.parse("run --port x").unwrap();
    let messages: Vec<&str> = outcome
        .diagnostics
        .iter()
        .map(|d| d.message.as_str())
        .collect();
    assert_eq!(messages[0], "Required argument 'name' not used.");
    assert!(messages[1].starts_with("Invalid integer value"));
}

#[test]
fn test_required_suppressed_by_value_count_error() {
    let mut tree = CommandTree::new(Command::new("tool"));
    tree.add_argument(
        tree.root(),
        Argument::new("pair", TupleOf::new(IntType::new(), Range::exactly(2))).required(),
    );

    let mut parser = ArgumentParser::new(tree).unwrap();
    let outcome = parser.parse("--pair [ 1 ]").unwrap();
    assert_eq!(outcome.diagnostics.len(), 1);
    assert!(outcome.diagnostics[0].message.starts_with("Incorrect number of values"));
}

#[test]
fn test_custom_tuple_chars() {
    let config = ParserConfig::default().with_tuple_chars(TupleChars::Braces);
    let mut parser = ArgumentParser::with_config(list_tree(Range::AT_LEAST_ONE), config).unwrap();
    let outcome = parser.parse("--list {a [b]}").unwrap();
    let list = outcome.get("list").and_then(Value::as_list).unwrap();
    assert_eq!(list, &[Value::from("a"), Value::from("[b]")]);
}

#[test]
fn test_invalid_tree_is_rejected() {
    let mut tree = CommandTree::new(Command::new("tool"));
    tree.add_argument(tree.root(), Argument::new("x", StringType));
    tree.add_argument(tree.root(), Argument::new("x", IntType::new()));
    assert!(matches!(
        ArgumentParser::new(tree),
        Err(UsageError::InvalidTree(_))
    ));
}

#[test]
fn test_join_args_round_trips_through_tokenizer() {
    let mut tree = CommandTree::new(Command::new("tool"));
    tree.add_argument(tree.root(), Argument::new("msg", StringType));
    let input = ArgumentParser::join_args(["--msg", "it's [here]"]);

    let mut parser = ArgumentParser::new(tree).unwrap();
    let outcome = parser.parse(&input).unwrap();
    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.get("msg"), Some(&Value::from("it's [here]")));
}

#[test]
fn test_join_args_keeps_empty_argument() {
    let mut tree = CommandTree::new(Command::new("tool"));
    tree.add_argument(tree.root(), Argument::new("name", StringType));
    let input = ArgumentParser::join_args(["--name", ""]);
    assert_eq!(input, "--name ''");

    let mut parser = ArgumentParser::new(tree).unwrap();
    let outcome = parser.parse(&input).unwrap();
    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.errors);
    assert_eq!(outcome.get("name"), Some(&Value::from("")));
}
