//! Flow directory seam used to resolve restriction names.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The parts of a flow the resolver needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowSummary {
    /// Stable flow identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// URL-safe slug.
    pub parameterized_name: String,
}

impl FlowSummary {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        parameterized_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parameterized_name: parameterized_name.into(),
        }
    }
}

/// A source of flows that restriction names can be resolved against.
pub trait FlowDirectory {
    /// Every flow visible to the bot.
    fn list_all(&self) -> Vec<FlowSummary>;

    /// First flow whose name or slug matches `pattern` as a regular expression.
    ///
    /// An invalid pattern never matches.
    fn lookup_by_name(&self, pattern: &str) -> Option<FlowSummary> {
        let re = match Regex::new(pattern) {
            Ok(re) => re,
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "Invalid flow name pattern");
                return None;
            }
        };

        self.list_all()
            .into_iter()
            .find(|flow| re.is_match(&flow.name) || re.is_match(&flow.parameterized_name))
    }
}

impl FlowDirectory for Vec<FlowSummary> {
    fn list_all(&self) -> Vec<FlowSummary> {
        self.clone()
    }
}

impl FlowDirectory for [FlowSummary] {
    fn list_all(&self) -> Vec<FlowSummary> {
        self.to_vec()
    }
}
