//! Handler slots and match classifications.

use crate::entry::Entry;
use crate::node::CommandNode;
use crate::param::ParamBindings;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The handler category a match resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Bare command with nothing left to parse.
    Default,
    /// The command matched but its remaining content could not be consumed.
    Error,
    /// The message's flow may not run this command.
    Restricted,
    /// Every declared parameter was bound and valid.
    ParamsOk,
    /// A parameter value failed its type check.
    ParamsWrongType,
    /// A required parameter had no word to bind.
    ParamsMissing,
    /// More words than declared parameters.
    ParamsExtra,
}

impl Classification {
    pub const ALL: [Classification; 7] = [
        Classification::Default,
        Classification::Error,
        Classification::Restricted,
        Classification::ParamsOk,
        Classification::ParamsWrongType,
        Classification::ParamsMissing,
        Classification::ParamsExtra,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Default => "default",
            Classification::Error => "error",
            Classification::Restricted => "restricted",
            Classification::ParamsOk => "params-ok",
            Classification::ParamsWrongType => "params-wrong-type",
            Classification::ParamsMissing => "params-missing",
            Classification::ParamsExtra => "params-extra",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a handler gets to see about the match that selected it.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub command: &'a CommandNode,
    pub pattern: &'a str,
    pub entry: &'a Entry,
    pub content: &'a str,
    pub classification: Classification,
    pub params: &'a ParamBindings,
}

/// Application callback bound to a handler slot.
pub type CommandHandler = Arc<dyn Fn(&Invocation<'_>) + Send + Sync>;

/// Handlers bound to a command, one optional slot per classification.
#[derive(Clone, Default)]
pub struct HandlerSet {
    slots: HashMap<Classification, CommandHandler>,
}

impl HandlerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to `classification`, replacing any earlier binding.
    pub fn bind(&mut self, classification: Classification, handler: CommandHandler) {
        self.slots.insert(classification, handler);
    }

    pub fn get(&self, classification: Classification) -> Option<&CommandHandler> {
        self.slots.get(&classification)
    }

    pub fn has(&self, classification: Classification) -> bool {
        self.slots.contains_key(&classification)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound: Vec<&'static str> = Classification::ALL
            .iter()
            .filter(|c| self.has(**c))
            .map(Classification::as_str)
            .collect();
        f.debug_struct("HandlerSet").field("bound", &bound).finish()
    }
}
