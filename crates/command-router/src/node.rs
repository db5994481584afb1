//! Command tree nodes.

use crate::directory::FlowDirectory;
use crate::error::{CommandError, CommandResult};
use crate::handler::{Classification, CommandHandler, HandlerSet, Invocation};
use crate::param::Parameter;
use crate::restriction::{Restriction, RestrictionRule};
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// How a node's patterns are compared with message content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternType {
    /// Case-insensitive comparison with the first word.
    Word,
    /// Regular expression tested against the whole content.
    Regex,
}

/// A node's patterns, prepared at construction time.
#[derive(Debug, Clone)]
pub enum PatternSet {
    /// Lower-cased words.
    Word(Vec<String>),
    /// Source strings paired with their compiled matcher, index-aligned.
    Regex(Vec<(String, Regex)>),
}

/// A successful pattern comparison.
pub(crate) struct PatternHit<'a, 'c> {
    pub pattern: &'a str,
    pub residual: &'c str,
}

impl PatternSet {
    pub fn pattern_type(&self) -> PatternType {
        match self {
            PatternSet::Word(_) => PatternType::Word,
            PatternSet::Regex(_) => PatternType::Regex,
        }
    }

    /// Source pattern strings in declaration order.
    pub fn sources(&self) -> Vec<&str> {
        match self {
            PatternSet::Word(words) => words.iter().map(String::as_str).collect(),
            PatternSet::Regex(patterns) => patterns.iter().map(|(src, _)| src.as_str()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            PatternSet::Word(words) => words.is_empty(),
            PatternSet::Regex(patterns) => patterns.is_empty(),
        }
    }

    /// Compare `content` (already trimmed) with each pattern in order.
    ///
    /// Word hits leave the content after the first word as residual. Regex
    /// hits leave nothing: capture groups are not extracted.
    pub(crate) fn hit<'a, 'c>(
        &'a self,
        content: &'c str,
        first_word: &str,
    ) -> Option<PatternHit<'a, 'c>> {
        match self {
            PatternSet::Word(words) => {
                let lowered = first_word.to_lowercase();
                words.iter().find(|w| **w == lowered).map(|w| PatternHit {
                    pattern: w.as_str(),
                    residual: content[first_word.len()..].trim(),
                })
            }
            PatternSet::Regex(patterns) => patterns
                .iter()
                .find(|(_, re)| re.is_match(content))
                .map(|(src, _)| PatternHit {
                    pattern: src.as_str(),
                    residual: "",
                }),
        }
    }
}

/// One routable command.
#[derive(Clone)]
pub struct CommandNode {
    patterns: PatternSet,
    description: String,
    params: Vec<Parameter>,
    restrictions: Restriction,
    subcommands: Vec<CommandNode>,
    handlers: HandlerSet,
}

impl CommandNode {
    fn with_patterns(patterns: PatternSet) -> Self {
        Self {
            patterns,
            description: String::new(),
            params: Vec::new(),
            restrictions: Restriction::default(),
            subcommands: Vec::new(),
            handlers: HandlerSet::new(),
        }
    }

    /// A command matched by its first word. Patterns are lower-cased.
    pub fn word<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = patterns
            .into_iter()
            .map(|p| p.as_ref().to_lowercase())
            .collect();
        Self::with_patterns(PatternSet::Word(words))
    }

    /// A command matched by regular expressions over the whole content.
    ///
    /// Every pattern is compiled here; an invalid one fails immediately.
    pub fn regex<I, S>(patterns: I) -> CommandResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = patterns
            .into_iter()
            .map(|p| {
                let src = p.as_ref();
                Regex::new(src)
                    .map(|re| (src.to_string(), re))
                    .map_err(|source| CommandError::PatternCompile {
                        pattern: src.to_string(),
                        source,
                    })
            })
            .collect::<CommandResult<Vec<_>>>()?;
        Ok(Self::with_patterns(PatternSet::Regex(compiled)))
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a positional parameter.
    pub fn param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    /// Append a restriction rule.
    pub fn restrict(mut self, rule: RestrictionRule) -> Self {
        self.restrictions.push(rule);
        self
    }

    /// Replace the whole restriction set.
    pub fn restrictions(mut self, restrictions: Restriction) -> Self {
        self.restrictions = restrictions;
        self
    }

    /// Append a subcommand.
    pub fn subcommand(mut self, sub: CommandNode) -> Self {
        self.subcommands.push(sub);
        self
    }

    /// Bind a handler to a classification slot.
    pub fn on<F>(mut self, classification: Classification, handler: F) -> Self
    where
        F: Fn(&Invocation<'_>) + Send + Sync + 'static,
    {
        self.handlers.bind(classification, Arc::new(handler));
        self
    }

    /// Bind an already shared handler to a classification slot.
    pub fn on_shared(mut self, classification: Classification, handler: CommandHandler) -> Self {
        self.handlers.bind(classification, handler);
        self
    }

    pub fn pattern_type(&self) -> PatternType {
        self.patterns.pattern_type()
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn restriction(&self) -> &Restriction {
        &self.restrictions
    }

    pub fn subcommands(&self) -> &[CommandNode] {
        &self.subcommands
    }

    pub fn handlers(&self) -> &HandlerSet {
        &self.handlers
    }

    pub fn handler(&self, classification: Classification) -> Option<&CommandHandler> {
        self.handlers.get(classification)
    }

    /// First source pattern, used to name the node in logs and help output.
    pub fn label(&self) -> &str {
        self.patterns.sources().first().copied().unwrap_or("")
    }

    /// Check the node and its subtree for empty pattern sets.
    pub(crate) fn validate(&self) -> CommandResult<()> {
        if self.patterns.is_empty() {
            let what = if self.description.is_empty() {
                "unnamed command".to_string()
            } else {
                self.description.clone()
            };
            return Err(CommandError::EmptyPatterns(what));
        }
        if !self.subcommands.is_empty() && !self.params.is_empty() {
            tracing::warn!(
                command = %self.label(),
                "Command declares both subcommands and parameters; parameters are ignored"
            );
        }
        self.subcommands.iter().try_for_each(CommandNode::validate)
    }

    /// Resolve restriction names on this node and every subcommand.
    pub(crate) fn resolve_restrictions(&mut self, directory: &dyn FlowDirectory) -> usize {
        let own = self.restrictions.resolve(directory);
        own + self
            .subcommands
            .iter_mut()
            .map(|sub| sub.resolve_restrictions(directory))
            .sum::<usize>()
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("patterns", &self.patterns.sources())
            .field("pattern_type", &self.pattern_type())
            .field("params", &self.params)
            .field("restrictions", &self.restrictions)
            .field("subcommands", &self.subcommands)
            .field("handlers", &self.handlers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_patterns_are_lowercased() {
        let node = CommandNode::word(["Deploy", "SHIP"]);
        assert_eq!(node.pattern_type(), PatternType::Word);
        assert_eq!(node.patterns().sources(), vec!["deploy", "ship"]);
        assert_eq!(node.label(), "deploy");
    }

    #[test]
    fn regex_patterns_stay_index_aligned() {
        let node = CommandNode::regex(["^a", "b$"]).unwrap();
        match node.patterns() {
            PatternSet::Regex(patterns) => {
                assert_eq!(patterns.len(), 2);
                for (src, re) in patterns {
                    assert_eq!(re.as_str(), src);
                }
            }
            PatternSet::Word(_) => panic!("expected regex patterns"),
        }
    }

    #[test]
    fn invalid_regex_fails_fast() {
        let err = CommandNode::regex(["ok", "(broken"]).unwrap_err();
        match err {
            CommandError::PatternCompile { pattern, .. } => assert_eq!(pattern, "(broken"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn word_hit_slices_first_word() {
        let node = CommandNode::word(["deploy"]);
        let hit = node.patterns().hit("DEPLOY   prod now", "DEPLOY").unwrap();
        assert_eq!(hit.pattern, "deploy");
        assert_eq!(hit.residual, "prod now");
        assert!(node.patterns().hit("deployment", "deployment").is_none());
    }

    #[test]
    fn regex_hit_has_no_residual() {
        let node = CommandNode::regex(["^status", "health"]).unwrap();
        let hit = node.patterns().hit("check health please", "check").unwrap();
        assert_eq!(hit.pattern, "health");
        assert_eq!(hit.residual, "");
    }

    #[test]
    fn validate_rejects_empty_patterns() {
        let empty: [&str; 0] = [];
        let node = CommandNode::word(["root"]).subcommand(CommandNode::word(empty).describe("child"));
        match node.validate() {
            Err(CommandError::EmptyPatterns(what)) => assert_eq!(what, "child"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn debug_lists_bound_handlers() {
        let node = CommandNode::word(["ping"]).on(Classification::Default, |_| {});
        let rendered = format!("{:?}", node);
        assert!(rendered.contains("\"ping\""));
        assert!(rendered.contains("default"));
    }
}
