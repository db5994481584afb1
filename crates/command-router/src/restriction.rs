//! Flow-scoped access restrictions.

use crate::directory::FlowDirectory;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Whether a rule allows or denies the flows it lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Concept {
    Include,
    Exclude,
}

/// One flow reference inside a rule.
///
/// `id` is authoritative. When it is empty, `name` is a regular expression
/// resolved against the flow directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl FlowRef {
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        !self.id.is_empty()
    }
}

/// An include or exclude rule over a list of flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictionRule {
    pub concept: Concept,
    #[serde(default)]
    pub data: Vec<FlowRef>,
}

impl RestrictionRule {
    pub fn include(data: impl IntoIterator<Item = FlowRef>) -> Self {
        Self {
            concept: Concept::Include,
            data: data.into_iter().collect(),
        }
    }

    pub fn exclude(data: impl IntoIterator<Item = FlowRef>) -> Self {
        Self {
            concept: Concept::Exclude,
            data: data.into_iter().collect(),
        }
    }

    /// Whether `flow` is one of this rule's resolved IDs.
    fn lists(&self, flow: &str) -> bool {
        self.data
            .iter()
            .any(|entry| entry.is_resolved() && entry.id == flow)
    }
}

/// The ordered set of rules attached to a command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Restriction {
    rules: Vec<RestrictionRule>,
}

impl Restriction {
    pub fn new(rules: impl IntoIterator<Item = RestrictionRule>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    pub fn push(&mut self, rule: RestrictionRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[RestrictionRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Decide whether a message from `flow` may run the command.
    ///
    /// Each rule overwrites the verdict of the rules before it, so with
    /// several rules only the last one decides.
    pub fn can_execute(&self, flow: &str) -> bool {
        let mut verdict = true;
        for rule in &self.rules {
            verdict = match rule.concept {
                Concept::Include => rule.lists(flow),
                Concept::Exclude => !rule.lists(flow),
            };
        }
        verdict
    }

    /// Resolve named entries to flow IDs. Returns how many were resolved.
    ///
    /// Entries that already carry an ID are left untouched, so running this
    /// twice never changes an earlier resolution.
    pub fn resolve(&mut self, directory: &dyn FlowDirectory) -> usize {
        let mut resolved = 0;
        for entry in self.rules.iter_mut().flat_map(|rule| rule.data.iter_mut()) {
            if entry.is_resolved() || entry.name.is_empty() {
                continue;
            }
            match directory.lookup_by_name(&entry.name) {
                Some(flow) => {
                    debug!(name = %entry.name, flow = %flow.id, "Resolved restriction flow");
                    entry.id = flow.id;
                    resolved += 1;
                }
                None => {
                    warn!(name = %entry.name, "Restriction flow name did not resolve");
                }
            }
        }
        resolved
    }
}
