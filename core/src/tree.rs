//! In-memory command definition tree.
//!
//! [`CommandDef`] is a plain, serde-friendly description of a CLI: a root
//! command, its arguments, and nested subcommands. It implements
//! [`CommandSource`] so it can be fed straight into
//! [`walk_commands`](crate::walk_commands), and it round-trips through JSON
//! and YAML definition files.
//!
//! # Example YAML
//!
//! ```yaml
//! name: my-cli
//! description: A test CLI.
//! arguments:
//!   - dest: verbose
//!     flags: ["-v", "--verbose"]
//!     action: store-true
//! subcommands:
//!   dest: command
//!   required: true
//!   commands:
//!     - name: run
//!       arguments:
//!         - dest: script
//! ```
//!
//! Omitted keys follow the builders: a toggle defaults to the opposite of
//! the value it stores, and a positional is required unless its
//! multiplicity allows no value.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::help;
use crate::source::{ArgumentDef, CommandSource};

fn default_true() -> bool {
    true
}

/// A group of subcommands hanging off one command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubcommandGroup {
    /// When set, the selected subcommand name is also exposed as a
    /// positional argument with this dest.
    #[serde(default)]
    pub dest: Option<String>,
    /// Whether a subcommand must be given.
    #[serde(default)]
    pub required: bool,
    /// Heading of a separate help section listing the subcommands.
    #[serde(default)]
    pub title: Option<String>,
    /// Help text for the selector argument.
    #[serde(default)]
    pub help: Option<String>,
    /// Subcommands in declaration order.
    #[serde(default)]
    pub commands: Vec<CommandDef>,
}

impl SubcommandGroup {
    /// Returns the subcommand names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name.as_str()).collect()
    }
}

/// One command in a definition tree.
///
/// # Examples
///
/// ```
/// use tool_schema_core::{ArgumentDef, CommandDef, CommandSource};
///
/// let cli = CommandDef::new("my-cli")
///     .with_description("A test CLI.")
///     .with_arg(ArgumentDef::positional("pos1").with_help("Positional argument 1"))
///     .with_subcommand(CommandDef::new("run"));
///
/// assert_eq!(cli.name(), "my-cli");
/// assert_eq!(cli.subcommands().len(), 1);
/// // -h/--help is added automatically
/// assert_eq!(cli.arguments().len(), 2);
/// assert!(cli.render_help("my-cli").starts_with("usage: my-cli"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandDef {
    /// Program name for the root, subcommand name for children.
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Text printed after the argument sections in help output.
    #[serde(default)]
    pub epilog: Option<String>,
    /// Adds an implicit `-h/--help` meta-argument.
    #[serde(default = "default_true")]
    pub add_help: bool,
    #[serde(default)]
    pub arguments: Vec<ArgumentDef>,
    #[serde(default)]
    pub subcommands: Option<SubcommandGroup>,
}

impl CommandDef {
    /// Creates a command with an implicit help flag and no arguments.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            epilog: None,
            add_help: true,
            arguments: Vec::new(),
            subcommands: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_epilog(mut self, epilog: &str) -> Self {
        self.epilog = Some(epilog.to_string());
        self
    }

    /// Disables the implicit `-h/--help` argument.
    pub fn without_help(mut self) -> Self {
        self.add_help = false;
        self
    }

    /// Adds an argument.
    pub fn with_arg(mut self, arg: ArgumentDef) -> Self {
        self.arguments.push(arg);
        self
    }

    /// Exposes the subcommand selector as a positional argument named
    /// `dest`.
    pub fn with_subcommand_dest(mut self, dest: &str, required: bool) -> Self {
        let group = self.subcommands.get_or_insert_with(SubcommandGroup::default);
        group.dest = Some(dest.to_string());
        group.required = required;
        self
    }

    /// Adds a nested subcommand.
    pub fn with_subcommand(mut self, sub: CommandDef) -> Self {
        self.subcommands
            .get_or_insert_with(SubcommandGroup::default)
            .commands
            .push(sub);
        self
    }

    /// Finds a direct subcommand by name.
    pub fn find_subcommand(&self, name: &str) -> Option<&CommandDef> {
        self.subcommands
            .as_ref()
            .and_then(|group| group.commands.iter().find(|c| c.name == name))
    }

    /// Loads a definition from a JSON or YAML file, picking the format from
    /// the file extension (`.yaml`/`.yml` are YAML, anything else JSON).
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::SchemaError::Io) if the file cannot be read, or
    /// [`Json`](crate::SchemaError::Json) /
    /// [`Yaml`](crate::SchemaError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        let def = if is_yaml {
            serde_yaml::from_str(&raw)?
        } else {
            serde_json::from_str(&raw)?
        };
        Ok(def)
    }

    /// The positional argument that selects a subcommand, when the group
    /// names a dest.
    pub(crate) fn selector_argument(&self) -> Option<ArgumentDef> {
        let group = self.subcommands.as_ref()?;
        let dest = group.dest.as_deref()?;
        let mut arg = ArgumentDef::positional(dest)
            .with_choices(group.names().into_iter().map(Value::from));
        arg.required = group.required;
        arg.help = group.help.clone();
        Some(arg)
    }
}

impl CommandSource for CommandDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<String> {
        self.description.clone()
    }

    fn arguments(&self) -> Vec<ArgumentDef> {
        let mut args = Vec::with_capacity(self.arguments.len() + 2);
        if self.add_help {
            args.push(ArgumentDef::help_flag());
        }
        args.extend(self.arguments.iter().cloned());
        args.extend(self.selector_argument());
        args
    }

    fn subcommands(&self) -> Vec<&Self> {
        self.subcommands
            .as_ref()
            .map(|group| group.commands.iter().collect())
            .unwrap_or_default()
    }

    fn render_help(&self, prog: &str) -> String {
        help::format_help(self, prog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ArgumentAction, DefaultValue};

    #[test]
    fn test_help_flag_is_first() {
        let cmd = CommandDef::new("tool").with_arg(ArgumentDef::positional("file"));
        let args = cmd.arguments();
        assert_eq!(args[0].action, ArgumentAction::Help);
        assert_eq!(args[1].dest, "file");
    }

    #[test]
    fn test_without_help() {
        let cmd = CommandDef::new("tool").without_help();
        assert!(cmd.arguments().is_empty());
    }

    #[test]
    fn test_selector_argument() {
        let cmd = CommandDef::new("tool")
            .with_subcommand_dest("command", true)
            .with_subcommand(CommandDef::new("foo"))
            .with_subcommand(CommandDef::new("bar"));

        let selector = cmd.arguments().pop().unwrap();
        assert_eq!(selector.dest, "command");
        assert!(selector.is_positional());
        assert!(selector.required);
        assert_eq!(
            selector.choices,
            Some(vec![Value::from("foo"), Value::from("bar")])
        );
    }

    #[test]
    fn test_no_selector_without_dest() {
        let cmd = CommandDef::new("tool").with_subcommand(CommandDef::new("foo"));
        assert_eq!(cmd.arguments().len(), 1);
        assert!(cmd.find_subcommand("foo").is_some());
        assert!(cmd.find_subcommand("bar").is_none());
    }

    #[test]
    fn test_deserialize_yaml_tree() {
        let yaml = r#"
name: my-cli
description: A test CLI.
arguments:
  - dest: verbose
    flags: ["-v", "--verbose"]
    action: store-true
    default: false
subcommands:
  dest: command
  required: true
  commands:
    - name: run
      arguments:
        - dest: script
          required: true
"#;
        let cmd: CommandDef = serde_yaml::from_str(yaml).unwrap();
        assert!(cmd.add_help);
        assert_eq!(cmd.arguments[0].action, ArgumentAction::StoreTrue);
        let run = cmd.find_subcommand("run").unwrap();
        assert!(run.arguments[0].required);
        assert!(run.arguments[0].is_positional());
    }

    #[test]
    fn test_load_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = CommandDef::new("tool").with_arg(ArgumentDef::option(["--name"]));

        let json_path = dir.path().join("tool.json");
        std::fs::write(&json_path, serde_json::to_string(&cmd).unwrap()).unwrap();
        let yaml_path = dir.path().join("tool.yml");
        std::fs::write(&yaml_path, serde_yaml::to_string(&cmd).unwrap()).unwrap();

        for path in [json_path, yaml_path] {
            let loaded = CommandDef::load(&path).unwrap();
            assert_eq!(loaded.name, "tool");
            assert_eq!(loaded.arguments, cmd.arguments);
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = CommandDef::load("/nonexistent/tool.json").unwrap_err();
        assert!(matches!(err, crate::SchemaError::Io(_)));
    }

    #[test]
    fn test_deserialize_derives_toggle_default_and_positional_required() {
        let yaml = r#"
name: tool
arguments:
  - dest: src
  - dest: extra
    multiplicity: zero-or-more
  - dest: mode
    multiplicity: optional-single
  - dest: dst
    required: false
  - dest: bar
    flags: ["--bar"]
    action: store-true
  - dest: color
    flags: ["--no-color"]
    action: store-false
  - dest: name
    flags: ["--name"]
"#;
        let cmd: CommandDef = serde_yaml::from_str(yaml).unwrap();
        let required: Vec<bool> = cmd.arguments.iter().map(|arg| arg.required).collect();
        assert_eq!(required, [true, false, false, false, false, false, false]);

        assert_eq!(cmd.arguments[4].default, DefaultValue::Value(Value::Bool(false)));
        assert_eq!(cmd.arguments[5].default, DefaultValue::Value(Value::Bool(true)));
        assert_eq!(cmd.arguments[6].default, DefaultValue::Value(Value::Null));

        // Builders and files agree.
        assert_eq!(cmd.arguments[0], ArgumentDef::positional("src"));
        assert_eq!(cmd.arguments[4], ArgumentDef::flag(["--bar"]));
    }
}
