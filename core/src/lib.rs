//! Tool schemas for hierarchical command-line interfaces.
//!
//! This crate turns a command tree (a root command with nested subcommands
//! carrying typed arguments) into:
//!
//! - a JSON-Schema-shaped [`ToolSchema`] per callable command, suitable for
//!   advertising a tool; and
//! - an argv reconstruction routine, [`CommandMetadata::construct`], which
//!   maps a schema-conformant input object back onto command-line tokens.
//!
//! Any tree that implements [`CommandSource`] can be walked. Two
//! implementations ship with the crate: the serde-friendly [`CommandDef`]
//! and, behind the default `clap` feature, [`clap::Command`].
//!
//! [`walk_commands`] is the entry point. Its [`Aggregate`] policy decides
//! whether each command becomes its own record, whether subcommands are
//! grouped under their parent, or whether the whole tree collapses into a
//! single record.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use tool_schema_core::*;
//!
//! let cli = CommandDef::new("my-cli")
//!     .with_description("Demo CLI")
//!     .with_subcommand_dest("command", true)
//!     .with_subcommand(
//!         CommandDef::new("run")
//!             .with_arg(ArgumentDef::positional("script").with_help("Script to run"))
//!             .with_arg(ArgumentDef::option(["-p", "--port"]).with_type(ElementType::Integer))
//!             .with_arg(ArgumentDef::flag(["--watch"])),
//!     );
//!
//! let records = walk_commands(&cli, &WalkOptions::default()).unwrap();
//! assert_eq!(records.len(), 2);
//!
//! let run = &records[1];
//! assert_eq!(run.path(), "my-cli run");
//! assert_eq!(run.schema().required, ["script"]);
//!
//! let argv = run
//!     .construct_from_value(&json!({"script": "app.py", "port": 8080, "watch": true}))
//!     .unwrap();
//! assert_eq!(argv, ["my-cli", "run", "--port", "8080", "--watch", "app.py"]);
//! ```

mod aggregate;
mod classify;
#[cfg(feature = "clap")]
mod clap_source;
mod config;
mod error;
mod help;
mod metadata;
mod source;
mod tree;
mod walk;

pub use aggregate::{Aggregate, walk_commands};
pub use classify::{build_command, classify};
pub use config::WalkOptions;
pub use error::{Result, SchemaError};
pub use metadata::{
    CommandMetadata, ItemsSchema, JsonType, OptionDescriptor, OptionKind, OptionSlot,
    PropertySchema, ToolSchema,
};
pub use source::{
    ArgumentAction, ArgumentDef, ArgumentShape, CommandSource, DefaultValue, ElementType,
    Multiplicity,
};
pub use tree::{CommandDef, SubcommandGroup};
pub use walk::{Filter, Visit, Walk, walk};
