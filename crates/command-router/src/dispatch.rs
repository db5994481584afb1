//! The recursive matching and classification engine.

use crate::entry::Entry;
use crate::error::{DispatchError, DispatchResult};
use crate::handler::{Classification, Invocation};
use crate::node::CommandNode;
use crate::param::ParamBindings;
use tracing::{debug, trace};

/// The result of matching one message against a command tree.
#[derive(Debug, Clone)]
pub struct MatchOutcome<'a> {
    /// The node whose handler slot is selected.
    pub command: &'a CommandNode,
    /// The exact pattern string that matched.
    pub pattern: &'a str,
    pub classification: Classification,
    /// Content handed to the handler: the matched level's content, or the
    /// unconsumed remainder for `Error`.
    pub content: String,
    /// Parameter values bound by this match.
    pub params: ParamBindings,
}

impl<'a> MatchOutcome<'a> {
    fn new(
        command: &'a CommandNode,
        pattern: &'a str,
        classification: Classification,
        content: &str,
    ) -> Self {
        Self {
            command,
            pattern,
            classification,
            content: content.to_string(),
            params: ParamBindings::new(),
        }
    }

    fn with_params(mut self, params: ParamBindings) -> Self {
        self.params = params;
        self
    }

    /// Run the handler bound to this outcome's classification.
    ///
    /// Returns `false` when the slot is empty, which is not an error.
    pub fn invoke(&self, entry: &Entry) -> bool {
        let Some(handler) = self.command.handler(self.classification) else {
            trace!(
                command = %self.command.label(),
                classification = %self.classification,
                "No handler bound"
            );
            return false;
        };

        let invocation = Invocation {
            command: self.command,
            pattern: self.pattern,
            entry,
            content: &self.content,
            classification: self.classification,
            params: &self.params,
        };
        handler(&invocation);
        true
    }

    /// The trailing-content error this outcome represents, if it is one.
    pub fn trailing_error(&self) -> Option<DispatchError> {
        (self.classification == Classification::Error).then(|| DispatchError::TrailingContent {
            pattern: self.pattern.to_string(),
            content: self.content.clone(),
        })
    }
}

/// Match `content` against `commands`, first match wins.
///
/// A node that matches its pattern decides the outcome for this level even
/// when its subcommands, parameters or restrictions then fail; siblings are
/// never tried after that.
pub(crate) fn match_commands<'a>(
    commands: &'a [CommandNode],
    content: &str,
    flow: &str,
) -> DispatchResult<MatchOutcome<'a>> {
    let content = content.trim();
    let words: Vec<&str> = content.split_whitespace().collect();
    let Some(first_word) = words.first().copied() else {
        return Err(DispatchError::NoCommandMatch {
            content: content.to_string(),
        });
    };

    for command in commands {
        let Some(hit) = command.patterns().hit(content, first_word) else {
            continue;
        };
        debug!(pattern = %hit.pattern, flow = %flow, "Command pattern matched");
        return Ok(classify(command, hit.pattern, content, hit.residual, &words, flow));
    }

    Err(DispatchError::NoCommandMatch {
        content: content.to_string(),
    })
}

fn classify<'a>(
    command: &'a CommandNode,
    pattern: &'a str,
    content: &str,
    residual: &str,
    words: &[&str],
    flow: &str,
) -> MatchOutcome<'a> {
    if !command.restriction().can_execute(flow) {
        debug!(pattern = %pattern, flow = %flow, "Command restricted for flow");
        return MatchOutcome::new(command, pattern, Classification::Restricted, content);
    }

    if !command.subcommands().is_empty() {
        return match match_commands(command.subcommands(), residual, flow) {
            Ok(outcome) => outcome,
            Err(_) => MatchOutcome::new(command, pattern, Classification::Error, residual),
        };
    }

    if !command.params().is_empty() {
        let (classification, params) = bind_params(command, &words[1..]);
        return MatchOutcome::new(command, pattern, classification, content).with_params(params);
    }

    if residual.is_empty() {
        MatchOutcome::new(command, pattern, Classification::Default, content)
    } else {
        MatchOutcome::new(command, pattern, Classification::Error, residual)
    }
}

/// Bind `args` positionally into the command's parameters.
fn bind_params(command: &CommandNode, args: &[&str]) -> (Classification, ParamBindings) {
    let mut bindings = ParamBindings::new();

    for (i, param) in command.params().iter().enumerate() {
        match args.get(i) {
            Some(word) => {
                bindings.bind(param, word);
                if !param.validate_type(word) {
                    return (Classification::ParamsWrongType, bindings);
                }
            }
            None if param.is_required() => return (Classification::ParamsMissing, bindings),
            None => {}
        }
    }

    if args.len() > command.params().len() {
        return (Classification::ParamsExtra, bindings);
    }

    (Classification::ParamsOk, bindings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::Parameter;
    use crate::restriction::{FlowRef, RestrictionRule};

    fn tree() -> Vec<CommandNode> {
        vec![
            CommandNode::word(["deploy"])
                .subcommand(CommandNode::word(["prod"]))
                .subcommand(CommandNode::word(["staging"]).param(Parameter::new("branch"))),
            CommandNode::word(["scale"])
                .param(Parameter::new("service").required())
                .param(Parameter::int("replicas").required())
                .param(Parameter::new("reason")),
            CommandNode::word(["ping", "hello"]),
            CommandNode::regex([r"^status\b"]).unwrap(),
        ]
    }

    fn classify_of(commands: &[CommandNode], content: &str) -> Classification {
        match_commands(commands, content, "flow").unwrap().classification
    }

    #[test]
    fn empty_content_is_no_match() {
        let commands = tree();
        for content in ["", "   ", "\t\n"] {
            assert!(matches!(
                match_commands(&commands, content, "flow"),
                Err(DispatchError::NoCommandMatch { .. })
            ));
        }
        assert!(match_commands(&[], "", "flow").is_err());
    }

    #[test]
    fn unknown_word_is_no_match_with_trimmed_content() {
        let err = match_commands(&tree(), "  launch rockets ", "flow").unwrap_err();
        assert_eq!(
            err,
            DispatchError::NoCommandMatch {
                content: "launch rockets".to_string()
            }
        );
    }

    #[test]
    fn word_matching_is_case_insensitive_on_first_word() {
        let commands = tree();
        let a = match_commands(&commands, "Deploy prod", "flow").unwrap();
        let b = match_commands(&commands, "deploy PROD", "flow").unwrap();
        assert!(std::ptr::eq(a.command, b.command));
        assert_eq!(a.pattern, "prod");
        assert_eq!(a.classification, Classification::Default);
    }

    #[test]
    fn alternate_word_patterns_report_which_matched() {
        let commands = tree();
        let outcome = match_commands(&commands, "HELLO", "flow").unwrap();
        assert_eq!(outcome.pattern, "hello");
        assert_eq!(outcome.classification, Classification::Default);
        assert_eq!(outcome.content, "HELLO");
    }

    #[test]
    fn leaf_with_trailing_content_is_error() {
        let t = tree();
        let outcome = match_commands(&t, "ping   everyone now", "flow").unwrap();
        assert_eq!(outcome.classification, Classification::Error);
        assert_eq!(outcome.content, "everyone now");
        assert_eq!(
            outcome.trailing_error(),
            Some(DispatchError::TrailingContent {
                pattern: "ping".to_string(),
                content: "everyone now".to_string(),
            })
        );
    }

    #[test]
    fn unmatched_subcommand_classifies_parent_as_error() {
        let commands = tree();
        let outcome = match_commands(&commands, "deploy moon", "flow").unwrap();
        assert!(std::ptr::eq(outcome.command, &commands[0]));
        assert_eq!(outcome.classification, Classification::Error);
        assert_eq!(outcome.content, "moon");

        let bare = match_commands(&commands, "deploy", "flow").unwrap();
        assert!(std::ptr::eq(bare.command, &commands[0]));
        assert_eq!(bare.classification, Classification::Error);
        assert_eq!(bare.content, "");
    }

    #[test]
    fn subcommand_params_bind_from_its_own_level() {
        let t = tree();
        let outcome = match_commands(&t, "deploy staging feature-x", "flow").unwrap();
        assert_eq!(outcome.pattern, "staging");
        assert_eq!(outcome.classification, Classification::ParamsOk);
        assert_eq!(outcome.params.get("branch"), Some("feature-x"));
        assert_eq!(outcome.content, "staging feature-x");
    }

    #[test]
    fn params_classifications() {
        let commands = tree();
        assert_eq!(classify_of(&commands, "scale web"), Classification::ParamsMissing);
        assert_eq!(classify_of(&commands, "scale web three"), Classification::ParamsWrongType);
        assert_eq!(classify_of(&commands, "scale web 3"), Classification::ParamsOk);
        assert_eq!(classify_of(&commands, "scale web 3 load"), Classification::ParamsOk);
        assert_eq!(classify_of(&commands, "scale web 3 load spike"), Classification::ParamsExtra);
    }

    #[test]
    fn params_bindings_are_returned_per_match() {
        let commands = tree();
        let first = match_commands(&commands, "scale web 3", "flow").unwrap();
        let second = match_commands(&commands, "scale api 5 traffic", "flow").unwrap();

        assert_eq!(first.params.get("service"), Some("web"));
        assert_eq!(first.params.get_int("replicas"), Some(3));
        assert_eq!(first.params.get("reason"), None);
        assert_eq!(second.params.get("service"), Some("api"));
        assert_eq!(second.params.get("reason"), Some("traffic"));
    }

    #[test]
    fn wrong_type_keeps_offending_value() {
        let t = tree();
        let outcome = match_commands(&t, "scale web lots", "flow").unwrap();
        assert_eq!(outcome.classification, Classification::ParamsWrongType);
        assert_eq!(outcome.params.get("replicas"), Some("lots"));
    }

    #[test]
    fn anchored_regex_requires_prefix() {
        let commands = tree();
        assert_eq!(classify_of(&commands, "status"), Classification::Default);
        assert_eq!(classify_of(&commands, "status of everything"), Classification::Default);
        assert!(match_commands(&commands, "what is the status", "flow").is_err());
    }

    #[test]
    fn unanchored_regex_matches_anywhere() {
        let commands = vec![CommandNode::regex(["coffee"]).unwrap()];
        let outcome = match_commands(&commands, "who wants coffee?", "flow").unwrap();
        assert_eq!(outcome.pattern, "coffee");
        assert_eq!(outcome.classification, Classification::Default);
        assert_eq!(outcome.content, "who wants coffee?");
    }

    #[test]
    fn first_declared_match_wins() {
        let commands = vec![
            CommandNode::word(["go"]).describe("first"),
            CommandNode::word(["go"]).describe("second"),
        ];
        let outcome = match_commands(&commands, "go", "flow").unwrap();
        assert_eq!(outcome.command.description(), "first");
    }

    #[test]
    fn failed_sibling_does_not_fall_through() {
        let commands = vec![
            CommandNode::word(["go"]).subcommand(CommandNode::word(["left"])),
            CommandNode::word(["go"]).subcommand(CommandNode::word(["right"])),
        ];
        let outcome = match_commands(&commands, "go right", "flow").unwrap();
        assert!(std::ptr::eq(outcome.command, &commands[0]));
        assert_eq!(outcome.classification, Classification::Error);
    }

    #[test]
    fn restriction_overrides_classification() {
        let commands = vec![
            CommandNode::word(["secret"])
                .param(Parameter::int("n").required())
                .restrict(RestrictionRule::include([FlowRef::id("A")])),
        ];
        let allowed = match_commands(&commands, "secret 1", "A").unwrap();
        assert_eq!(allowed.classification, Classification::ParamsOk);

        let denied = match_commands(&commands, "secret 1", "B").unwrap();
        assert_eq!(denied.classification, Classification::Restricted);
        assert!(denied.params.is_empty());

        let denied_missing = match_commands(&commands, "secret", "B").unwrap();
        assert_eq!(denied_missing.classification, Classification::Restricted);
    }

    #[test]
    fn restricted_parent_gates_subcommands() {
        let commands = vec![CommandNode::word(["admin"])
            .restrict(RestrictionRule::exclude([FlowRef::id("public")]))
            .subcommand(CommandNode::word(["reset"]))];
        let outcome = match_commands(&commands, "admin reset", "public").unwrap();
        assert!(std::ptr::eq(outcome.command, &commands[0]));
        assert_eq!(outcome.classification, Classification::Restricted);

        let outcome = match_commands(&commands, "admin reset", "ops").unwrap();
        assert_eq!(outcome.pattern, "reset");
        assert_eq!(outcome.classification, Classification::Default);
    }

    #[test]
    fn restricted_subcommand_only_blocks_itself() {
        let commands = vec![CommandNode::word(["db"])
            .subcommand(
                CommandNode::word(["drop"]).restrict(RestrictionRule::include([FlowRef::id("ops")])),
            )
            .subcommand(CommandNode::word(["stats"]))];
        assert_eq!(
            match_commands(&commands, "db drop", "dev").unwrap().classification,
            Classification::Restricted
        );
        assert_eq!(
            match_commands(&commands, "db stats", "dev").unwrap().classification,
            Classification::Default
        );
    }

    #[test]
    fn invoke_runs_bound_slot_only() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let commands = vec![CommandNode::word(["count"])
            .param(Parameter::int("n"))
            .on(Classification::ParamsOk, move |inv| {
                assert_eq!(inv.params.get_int("n"), Some(2));
                assert_eq!(inv.entry.flow, "f");
                counter.fetch_add(1, Ordering::SeqCst);
            })];
        let entry = Entry::message("f", "count 2");

        let ok = match_commands(&commands, &entry.content, &entry.flow).unwrap();
        assert!(ok.invoke(&entry));

        let wrong = match_commands(&commands, "count x", "f").unwrap();
        assert!(!wrong.invoke(&entry));

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
