//! The bot's built-in command tree.

use command_router::{
    Classification, CommandNode, CommandRegistry, CommandResult, Entry, FlowRef, Invocation,
    Parameter, RestrictionRule,
};
use std::sync::Arc;

/// Sends a reply to the flow (and thread) an entry came from.
pub type Reply = Arc<dyn Fn(&Entry, String) + Send + Sync>;

/// Flow allowed to run `deploy prod`.
pub const OPS_FLOW: &str = "ops";

/// Build the registry with every built-in command.
///
/// `help` is added last so it can list the others.
pub fn build_registry(reply: Reply) -> CommandResult<CommandRegistry> {
    let mut registry = CommandRegistry::new()
        .with_command(ping(reply.clone()))?
        .with_command(add(reply.clone()))?
        .with_command(deploy(reply.clone()))?
        .with_command(status(reply.clone())?)?;

    let mut lines = registry.help_lines();
    lines.push("help - list commands".to_string());
    let help_text = lines.join("\n");

    registry.add_command(
        CommandNode::word(["help"])
            .describe("list commands")
            .on(Classification::Default, responder(&reply, move |_| help_text.clone())),
    )?;
    Ok(registry)
}

fn responder<F>(reply: &Reply, render: F) -> impl Fn(&Invocation<'_>) + Send + Sync + 'static
where
    F: Fn(&Invocation<'_>) -> String + Send + Sync + 'static,
{
    let reply = reply.clone();
    move |invocation| reply(invocation.entry, render(invocation))
}

fn ping(reply: Reply) -> CommandNode {
    CommandNode::word(["ping", "hello"])
        .describe("check that the bot is alive")
        .on(Classification::Default, responder(&reply, |_| "pong".to_string()))
}

fn add(reply: Reply) -> CommandNode {
    CommandNode::word(["add"])
        .describe("add two integers")
        .param(Parameter::int("a").required())
        .param(Parameter::int("b").required())
        .on(
            Classification::ParamsOk,
            responder(&reply, |invocation| {
                let a = invocation.params.get_int("a").unwrap_or_default();
                let b = invocation.params.get_int("b").unwrap_or_default();
                match a.checked_add(b) {
                    Some(sum) => sum.to_string(),
                    None => "that sum does not fit in 64 bits".to_string(),
                }
            }),
        )
        .on(
            Classification::ParamsWrongType,
            responder(&reply, |invocation| {
                let bad = ["a", "b"]
                    .into_iter()
                    .filter_map(|id| invocation.params.get(id))
                    .find(|value| value.parse::<i64>().is_err())
                    .unwrap_or_default();
                format!("'{bad}' is not an integer")
            }),
        )
        .on(
            Classification::ParamsMissing,
            responder(&reply, |_| "usage: add <a> <b>".to_string()),
        )
        .on(
            Classification::ParamsExtra,
            responder(&reply, |_| "add takes exactly two integers".to_string()),
        )
}

fn deploy(reply: Reply) -> CommandNode {
    CommandNode::word(["deploy"])
        .describe("deploy to an environment")
        .subcommand(
            CommandNode::word(["prod", "production"])
                .describe("deploy main to production")
                .restrict(RestrictionRule::include([FlowRef::name(format!(
                    "^{OPS_FLOW}$"
                ))]))
                .on(
                    Classification::Default,
                    responder(&reply, |_| "deploying main to production".to_string()),
                )
                .on(
                    Classification::Restricted,
                    responder(&reply, |_| {
                        format!("deploy prod only runs in the {OPS_FLOW} flow")
                    }),
                ),
        )
        .subcommand(
            CommandNode::word(["staging"])
                .describe("deploy a branch to staging")
                .param(Parameter::new("branch").required().describe("branch to ship"))
                .on(
                    Classification::ParamsOk,
                    responder(&reply, |invocation| {
                        let branch = invocation.params.get("branch").unwrap_or_default();
                        format!("deploying {branch} to staging")
                    }),
                )
                .on(
                    Classification::ParamsMissing,
                    responder(&reply, |_| "usage: deploy staging <branch>".to_string()),
                ),
        )
        .on(
            Classification::Error,
            responder(&reply, |invocation| {
                format!("unknown deploy target '{}'", invocation.content)
            }),
        )
}

fn status(reply: Reply) -> CommandResult<CommandNode> {
    Ok(CommandNode::regex([r"(?i)^(status|are you there)\??$"])?
        .describe("report the bot version")
        .on(
            Classification::Default,
            responder(&reply, |_| {
                format!("flowbot {} is listening", env!("CARGO_PKG_VERSION"))
            }),
        ))
}
