//! Aggregation policies: how walked commands become callable records.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::classify::build_command;
use crate::config::WalkOptions;
use crate::error::{Result, SchemaError};
use crate::metadata::{
    CommandMetadata, ItemsSchema, JsonType, OptionDescriptor, OptionSlot, PropertySchema,
};
use crate::source::CommandSource;
use crate::walk::{Filter, walk};

const SUBCOMMAND_DESCRIPTION: &str = "The subcommand to execute";
const GROUP_ARGS_DESCRIPTION: &str = "The arguments to pass to the subcommand";
const ROOT_ARGS_DESCRIPTION: &str = "The arguments to pass to the root command";

/// How nested subcommands are exposed.
///
/// - `None`: one record per command.
/// - `Group`: one record per parent, taking a subcommand name plus raw args.
/// - `Root`: a single record for the whole tree taking raw args.
///
/// # Examples
///
/// ```
/// use tool_schema_core::Aggregate;
///
/// assert_eq!("group".parse::<Aggregate>().unwrap(), Aggregate::Group);
/// assert!("all".parse::<Aggregate>().is_err());
/// assert_eq!(Aggregate::default().to_string(), "none");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Aggregate {
    #[default]
    None,
    Group,
    Root,
}

impl Aggregate {
    pub fn as_str(self) -> &'static str {
        match self {
            Aggregate::None => "none",
            Aggregate::Group => "group",
            Aggregate::Root => "root",
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aggregate {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(Aggregate::None),
            "group" => Ok(Aggregate::Group),
            "root" => Ok(Aggregate::Root),
            other => Err(SchemaError::InvalidAggregate(other.to_string())),
        }
    }
}

impl TryFrom<String> for Aggregate {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Walks `root` and produces the metadata records selected by `options`.
///
/// The result is collected eagerly; any error aborts the whole walk.
///
/// # Errors
///
/// Returns [`InvalidPattern`](SchemaError::InvalidPattern) for a bad
/// include/exclude regex, or
/// [`UnknownElementType`](SchemaError::UnknownElementType) in strict mode.
///
/// # Examples
///
/// ```
/// use tool_schema_core::{Aggregate, CommandDef, WalkOptions, walk_commands};
///
/// let cli = CommandDef::new("my-cli")
///     .with_subcommand(CommandDef::new("subc-1"))
///     .with_subcommand(CommandDef::new("subc-2"));
///
/// let records = walk_commands(&cli, &WalkOptions::default()).unwrap();
/// assert_eq!(records.len(), 3);
///
/// let options = WalkOptions::default().with_aggregate(Aggregate::Root);
/// let records = walk_commands(&cli, &options).unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].path(), "my-cli");
/// ```
pub fn walk_commands<S: CommandSource>(
    root: &S,
    options: &WalkOptions,
) -> Result<Vec<CommandMetadata>> {
    let filter = Filter::new(options.include.as_deref(), options.exclude.as_deref())?;
    let name = options.name.as_deref();

    let records = match options.aggregate {
        Aggregate::None => aggregate_none(root, name, filter, options.strict_types)?,
        Aggregate::Group => aggregate_group(root, name, filter),
        Aggregate::Root => vec![aggregate_root(root, name, filter)],
    };

    debug!(
        root = root.name(),
        aggregate = %options.aggregate,
        records = records.len(),
        "Walked command tree"
    );
    Ok(records)
}

fn aggregate_none<S: CommandSource>(
    root: &S,
    name: Option<&str>,
    filter: Filter,
    strict: bool,
) -> Result<Vec<CommandMetadata>> {
    walk(root, name, filter)
        .map(|visit| build_command(&visit.path, visit.node, strict))
        .collect()
}

fn aggregate_group<S: CommandSource>(
    root: &S,
    name: Option<&str>,
    filter: Filter,
) -> Vec<CommandMetadata> {
    let mut groups: IndexMap<String, IndexMap<String, String>> = IndexMap::new();
    for visit in walk(root, name, filter) {
        let Some(parent) = visit.parent_path.clone() else {
            continue;
        };
        let help = visit.node.render_help(&visit.path);
        groups
            .entry(parent)
            .or_default()
            .insert(visit.command_name, help);
    }

    groups
        .into_iter()
        .map(|(parent, children)| {
            let mut description =
                format!("Usage: {parent} SUBCOMMAND [ARGS]...\n\n# Available subcommands\n");
            for (child, help) in &children {
                description.push_str(&format!("\n## {child}\n\n{help}\n"));
            }

            let names: Vec<Value> = children.keys().map(|n| Value::from(n.as_str())).collect();
            let subcommand = OptionSlot {
                name: "subcommand".to_string(),
                property: PropertySchema::new(
                    "subcommand",
                    Some(SUBCOMMAND_DESCRIPTION.to_string()),
                    JsonType::String,
                )
                .with_choices(names),
                descriptor: OptionDescriptor::positional(SUBCOMMAND_DESCRIPTION, true),
            };

            CommandMetadata::new(
                parent.as_str(),
                description.trim_start(),
                [subcommand, args_slot(GROUP_ARGS_DESCRIPTION)],
            )
        })
        .collect()
}

fn aggregate_root<S: CommandSource>(
    root: &S,
    name: Option<&str>,
    filter: Filter,
) -> CommandMetadata {
    let path = name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| root.name());

    let mut description = String::new();
    for visit in walk(root, name, filter) {
        let help = visit.node.render_help(&visit.path);
        description.push_str(&format!("\n## {}\n\n{help}\n", visit.path));
    }

    CommandMetadata::new(
        path,
        description.trim_start(),
        [args_slot(ROOT_ARGS_DESCRIPTION)],
    )
}

fn args_slot(description: &str) -> OptionSlot {
    OptionSlot {
        name: "args".to_string(),
        property: PropertySchema::array(
            "args",
            Some(description.to_string()),
            ItemsSchema {
                kind: JsonType::String,
                choices: None,
            },
        ),
        descriptor: OptionDescriptor::positional(description, false),
    }
}
