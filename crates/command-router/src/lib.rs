//! Command router: declarative chat command trees and the dispatch engine.
//!
//! A [`CommandRegistry`] holds a tree of [`CommandNode`]s. Every incoming
//! [`Entry`] is matched against that tree and resolves to a [`MatchOutcome`]
//! carrying the node that matched, the pattern that matched it and a
//! [`Classification`] that selects one of the node's handler slots.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        CommandRegistry                            │
//! │                                                                   │
//! │  add_command() ──► CommandNode tree (patterns, params,            │
//! │                    restrictions, subcommands, handlers)           │
//! │                                                                   │
//! │  resolve_restrictions(&FlowDirectory) ──► flow names ──► flow IDs │
//! │                                                                   │
//! │  dispatch(&Entry) ──► MatchOutcome { command, pattern,            │
//! │                                      classification, params }     │
//! │                              │                                    │
//! │                              ▼                                    │
//! │                     outcome.invoke(&entry) ──► handler slot       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use command_router::{Classification, CommandNode, CommandRegistry, Parameter};
//!
//! let mut registry = CommandRegistry::new();
//! registry.add_command(
//!     CommandNode::word(["scale"])
//!         .param(Parameter::int("replicas").required())
//!         .on(Classification::ParamsOk, |inv| {
//!             println!("scaling to {:?}", inv.params.get_int("replicas"));
//!         }),
//! )?;
//!
//! let outcome = registry.match_content("scale 3", "flow-id")?;
//! assert_eq!(outcome.classification, Classification::ParamsOk);
//! ```
//!
//! Matching never mutates the tree: parameter values are returned in a fresh
//! [`ParamBindings`] per call, so one registry can be shared across tasks.

mod directory;
mod dispatch;
mod entry;
mod error;
mod handler;
mod node;
mod param;
mod registry;
mod restriction;

pub use directory::{FlowDirectory, FlowSummary};
pub use dispatch::MatchOutcome;
pub use entry::Entry;
pub use error::{CommandError, CommandResult, DispatchError, DispatchResult};
pub use handler::{Classification, CommandHandler, HandlerSet, Invocation};
pub use node::{CommandNode, PatternSet, PatternType};
pub use param::{ParamBindings, ParamType, Parameter};
pub use registry::CommandRegistry;
pub use restriction::{Concept, FlowRef, Restriction, RestrictionRule};
