//! End-to-end matching behaviour through the public registry API.

use std::sync::{Arc, Mutex};

use command_router::{
    Classification, CommandNode, CommandRegistry, DispatchError, Entry, FlowRef, FlowSummary,
    Parameter, Restriction, RestrictionRule,
};

fn registry() -> CommandRegistry {
    CommandRegistry::new()
        .with_command(
            CommandNode::word(["deploy"])
                .describe("deployments")
                .subcommand(CommandNode::word(["prod"]))
                .subcommand(CommandNode::word(["rollback"]).param(Parameter::int("build").required())),
        )
        .unwrap()
        .with_command(
            CommandNode::word(["add"])
                .param(Parameter::int("a").required())
                .param(Parameter::int("b").required()),
        )
        .unwrap()
        .with_command(CommandNode::regex([r"^(?i)good (morning|night)$"]).unwrap())
        .unwrap()
        .with_command(CommandNode::regex(["pizza"]).unwrap())
        .unwrap()
}

#[test]
fn case_insensitive_first_word() {
    let registry = registry();
    let upper = registry.match_content("Deploy prod", "f").unwrap();
    let lower = registry.match_content("deploy PROD", "f").unwrap();
    assert!(std::ptr::eq(upper.command, lower.command));
    assert_eq!(upper.classification, Classification::Default);
}

#[test]
fn anchored_and_unanchored_regex() {
    let registry = registry();

    let anchored = registry.match_content("  Good Morning  ", "f").unwrap();
    assert_eq!(anchored.pattern, r"^(?i)good (morning|night)$");
    assert!(registry.match_content("a good morning to you", "f").is_err());

    let unanchored = registry.match_content("anyone for pizza tonight", "f").unwrap();
    assert_eq!(unanchored.pattern, "pizza");
    assert_eq!(unanchored.classification, Classification::Default);
}

#[test]
fn subcommand_mismatch_is_error_on_parent() {
    let registry = registry();
    let outcome = registry.match_content("deploy everywhere please", "f").unwrap();
    assert_eq!(outcome.pattern, "deploy");
    assert_eq!(outcome.classification, Classification::Error);
    assert_eq!(outcome.content, "everywhere please");
}

#[test]
fn parameter_classifications() {
    let registry = registry();
    let classify = |content: &str| registry.match_content(content, "f").unwrap().classification;

    assert_eq!(classify("add 1"), Classification::ParamsMissing);
    assert_eq!(classify("add 1 two"), Classification::ParamsWrongType);
    assert_eq!(classify("add 1 2 3"), Classification::ParamsExtra);
    assert_eq!(classify("add 1 2"), Classification::ParamsOk);
    assert_eq!(classify("deploy rollback"), Classification::ParamsMissing);
    assert_eq!(classify("deploy rollback 118"), Classification::ParamsOk);
}

#[test]
fn include_and_exclude_rules() {
    let include = CommandRegistry::new()
        .with_command(
            CommandNode::word(["x"]).restrict(RestrictionRule::include([FlowRef::id("A")])),
        )
        .unwrap();
    assert_eq!(include.match_content("x", "A").unwrap().classification, Classification::Default);
    assert_eq!(include.match_content("x", "B").unwrap().classification, Classification::Restricted);

    let exclude = CommandRegistry::new()
        .with_command(
            CommandNode::word(["x"]).restrict(RestrictionRule::exclude([FlowRef::id("A")])),
        )
        .unwrap();
    assert_eq!(exclude.match_content("x", "A").unwrap().classification, Classification::Restricted);
    assert_eq!(exclude.match_content("x", "B").unwrap().classification, Classification::Default);
}

#[test]
fn multiple_rules_last_rule_wins() {
    // An include of A followed by an include of B does not allow A: the
    // second rule overwrites the first verdict.
    let registry = CommandRegistry::new()
        .with_command(CommandNode::word(["x"]).restrictions(Restriction::new([
            RestrictionRule::include([FlowRef::id("A")]),
            RestrictionRule::include([FlowRef::id("B")]),
        ])))
        .unwrap();
    assert_eq!(registry.match_content("x", "A").unwrap().classification, Classification::Restricted);
    assert_eq!(registry.match_content("x", "B").unwrap().classification, Classification::Default);
}

#[test]
fn empty_content_never_matches() {
    let registry = registry();
    for content in ["", "   "] {
        assert_eq!(
            registry.match_content(content, "f").unwrap_err(),
            DispatchError::NoCommandMatch {
                content: String::new()
            }
        );
    }
}

#[test]
fn resolution_is_memoized() {
    let registry = CommandRegistry::new()
        .with_command(
            CommandNode::word(["ship"]).restrict(RestrictionRule::include([FlowRef::name("^release")])),
        )
        .unwrap();

    let first = vec![FlowSummary::new("42", "release", "release-flow")];
    let registry = registry.resolve_restrictions(&first);

    let changed = vec![FlowSummary::new("77", "release", "release-flow")];
    let registry = registry.resolve_restrictions(&changed);

    let rule = &registry.commands()[0].restriction().rules()[0];
    assert_eq!(rule.data[0].id, "42");
    assert_eq!(registry.match_content("ship", "42").unwrap().classification, Classification::Default);
    assert_eq!(registry.match_content("ship", "77").unwrap().classification, Classification::Restricted);
}

#[test]
fn shared_registry_matches_concurrently() {
    let registry = Arc::new(registry());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = registry.clone();
            let seen = seen.clone();
            std::thread::spawn(move || {
                let content = format!("add {i} {}", i * 10);
                let entry = Entry::message("f", content);
                let outcome = registry.dispatch(&entry).unwrap();
                let a = outcome.params.get_int("a").unwrap();
                let b = outcome.params.get_int("b").unwrap();
                seen.lock().unwrap().push((a, b));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut seen = seen.lock().unwrap().clone();
    seen.sort();
    let expected: Vec<(i64, i64)> = (0..8).map(|i| (i, i * 10)).collect();
    assert_eq!(seen, expected);
}
