//! The registered command tree.

use crate::directory::FlowDirectory;
use crate::dispatch::{match_commands, MatchOutcome};
use crate::entry::Entry;
use crate::error::{CommandResult, DispatchResult};
use crate::node::CommandNode;
use tracing::info;

/// The top level of a command tree.
///
/// Build it once, resolve its restrictions once, then share it (typically
/// behind an `Arc`) with any number of ingestion loops. Matching only reads
/// the tree.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: Vec<CommandNode>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a top-level command and its subtree.
    pub fn add_command(&mut self, command: CommandNode) -> CommandResult<()> {
        command.validate()?;
        info!(
            command = %command.label(),
            pattern_type = ?command.pattern_type(),
            subcommands = command.subcommands().len(),
            "Registered command"
        );
        self.commands.push(command);
        Ok(())
    }

    /// Builder-style variant of [`add_command`](Self::add_command).
    pub fn with_command(mut self, command: CommandNode) -> CommandResult<Self> {
        self.add_command(command)?;
        Ok(self)
    }

    pub fn commands(&self) -> &[CommandNode] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Resolve every restriction flow name in the tree against `directory`.
    ///
    /// Meant to run once after registration and before matching starts.
    /// Already resolved IDs are kept, so repeating the pass is harmless.
    pub fn resolve_restrictions(mut self, directory: &dyn FlowDirectory) -> Self {
        let resolved: usize = self
            .commands
            .iter_mut()
            .map(|command| command.resolve_restrictions(directory))
            .sum();
        info!(resolved, "Resolved restriction flow names");
        self
    }

    /// Match an entry's content in the context of its flow.
    pub fn dispatch(&self, entry: &Entry) -> DispatchResult<MatchOutcome<'_>> {
        self.match_content(&entry.content, &entry.flow)
    }

    /// Match raw `content` as if it arrived on `flow`.
    pub fn match_content(&self, content: &str, flow: &str) -> DispatchResult<MatchOutcome<'_>> {
        match_commands(&self.commands, content, flow)
    }

    /// One line per command path, e.g. `deploy staging <branch> - ship a branch`.
    pub fn help_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for command in &self.commands {
            collect_help(command, "", &mut lines);
        }
        lines
    }
}

fn collect_help(command: &CommandNode, prefix: &str, lines: &mut Vec<String>) {
    let path = if prefix.is_empty() {
        command.label().to_string()
    } else {
        format!("{prefix} {}", command.label())
    };

    if command.subcommands().is_empty() {
        let mut line = path;
        for param in command.params() {
            if param.is_required() {
                line.push_str(&format!(" <{}>", param.id()));
            } else {
                line.push_str(&format!(" [{}]", param.id()));
            }
        }
        if !command.description().is_empty() {
            line.push_str(" - ");
            line.push_str(command.description());
        }
        lines.push(line);
        return;
    }

    for sub in command.subcommands() {
        collect_help(sub, &path, lines);
    }
}
