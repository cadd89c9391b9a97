//! Read-only view of a host command definition tree.
//!
//! The walker and classifier only ever talk to a [`CommandSource`]; concrete
//! parsing libraries plug in by implementing it. Two implementations ship
//! with this crate: the serde-friendly [`CommandDef`](crate::CommandDef) tree
//! and, behind the `clap` feature, `clap::Command`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Capability interface over one node of a command definition tree.
pub trait CommandSource {
    /// The node's own name: the program name for the root, the registered
    /// subcommand name for children.
    fn name(&self) -> &str;

    /// Free-form description of the command, if any.
    fn description(&self) -> Option<String>;

    /// Argument definitions in declaration order, meta-arguments included.
    fn arguments(&self) -> Vec<ArgumentDef>;

    /// Nested subcommands in declaration order.
    fn subcommands(&self) -> Vec<&Self>;

    /// Full formatted help text, displaying `prog` as the program name.
    fn render_help(&self, prog: &str) -> String;
}

/// Element type of the values an argument accepts.
///
/// Serialized as a plain string: `integer`, `float`, `string`, or any other
/// name, which is kept verbatim as [`ElementType::Other`].
///
/// # Examples
///
/// ```
/// use tool_schema_core::ElementType;
///
/// assert_eq!(ElementType::from("int"), ElementType::Integer);
/// assert_eq!(ElementType::from("path"), ElementType::Other("path".into()));
/// assert_eq!(ElementType::default(), ElementType::String);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementType {
    Integer,
    Float,
    /// Untyped or explicitly string-typed (the default).
    #[default]
    String,
    /// A host type with no JSON Schema counterpart.
    Other(String),
}

impl From<&str> for ElementType {
    fn from(name: &str) -> Self {
        match name {
            "integer" | "int" => Self::Integer,
            "float" | "number" => Self::Float,
            "string" | "str" | "" => Self::String,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ElementType {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<ElementType> for String {
    fn from(kind: ElementType) -> Self {
        match kind {
            ElementType::Integer => "integer".to_string(),
            ElementType::Float => "float".to_string(),
            ElementType::String => "string".to_string(),
            ElementType::Other(name) => name,
        }
    }
}

/// How many values an argument consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Multiplicity {
    /// Exactly one value.
    #[default]
    Single,
    /// Zero or one value.
    OptionalSingle,
    ZeroOrMore,
    OneOrMore,
    /// One value per occurrence, collected across repeats.
    Append,
}

/// What the host does when it sees the argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArgumentAction {
    /// Store the supplied value(s).
    #[default]
    Store,
    /// Boolean toggle that sets `true`.
    StoreTrue,
    /// Boolean toggle that sets `false`.
    StoreFalse,
    /// Prints help and exits.
    Help,
    /// Prints the version and exits.
    Version,
}

/// Declared default of an argument.
///
/// `Unset` is the "no default" sentinel; `Value(Null)` is an explicit null
/// default. Files always carry a value, so `Unset` only arises from the API
/// and from host adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum DefaultValue {
    Unset,
    Value(Value),
}

impl Default for DefaultValue {
    fn default() -> Self {
        Self::Value(Value::Null)
    }
}

impl DefaultValue {
    /// Returns the declared value, if it is present and not null.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(Value::Null) | Self::Unset => None,
            Self::Value(value) => Some(value),
        }
    }
}

impl From<Value> for DefaultValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<DefaultValue> for Value {
    fn from(default: DefaultValue) -> Self {
        match default {
            DefaultValue::Unset => Value::Null,
            DefaultValue::Value(value) => value,
        }
    }
}

/// The schema-relevant shape of an argument, computed once by
/// [`ArgumentDef::shape`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArgumentShape<'a> {
    /// Boolean toggle.
    Flag,
    /// One value of `kind`.
    Scalar {
        kind: &'a ElementType,
        choices: Option<&'a [Value]>,
    },
    /// Several values of `kind`.
    List {
        kind: &'a ElementType,
        choices: Option<&'a [Value]>,
    },
}

/// One argument definition as exposed by the host.
///
/// # Examples
///
/// ```
/// use tool_schema_core::{ArgumentDef, ArgumentShape, ElementType, Multiplicity};
///
/// let arg = ArgumentDef::option(["--count", "-c"]).with_type(ElementType::Integer);
/// assert_eq!(arg.dest, "count");
/// assert_eq!(arg.flag_name(), "--count");
/// assert!(matches!(arg.shape(), ArgumentShape::Scalar { .. }));
///
/// let files = ArgumentDef::positional("files").with_multiplicity(Multiplicity::ZeroOrMore);
/// assert!(files.is_positional());
/// assert!(!files.required);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawArgumentDef")]
pub struct ArgumentDef {
    /// Identifier, unique within its command.
    pub dest: String,
    /// Help text.
    pub help: Option<String>,
    /// Flag aliases; empty for positional arguments.
    pub flags: Vec<String>,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub multiplicity: Multiplicity,
    pub action: ArgumentAction,
    /// Allowed values, in declaration order.
    pub choices: Option<Vec<Value>>,
    pub required: bool,
    pub default: DefaultValue,
    /// Placeholder shown in help output.
    pub metavar: Option<String>,
}

/// Wire form of [`ArgumentDef`]. An absent `required` or `default` key is
/// resolved the same way the builders resolve it.
#[derive(Deserialize)]
struct RawArgumentDef {
    dest: String,
    #[serde(default)]
    help: Option<String>,
    #[serde(default)]
    flags: Vec<String>,
    #[serde(default, rename = "type")]
    element_type: ElementType,
    #[serde(default)]
    multiplicity: Multiplicity,
    #[serde(default)]
    action: ArgumentAction,
    #[serde(default)]
    choices: Option<Vec<Value>>,
    #[serde(default)]
    required: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    default: Option<DefaultValue>,
    #[serde(default)]
    metavar: Option<String>,
}

/// Keeps an explicit `null` distinct from a missing key.
fn present<'de, D>(deserializer: D) -> Result<Option<DefaultValue>, D::Error>
where
    D: Deserializer<'de>,
{
    DefaultValue::deserialize(deserializer).map(Some)
}

impl From<RawArgumentDef> for ArgumentDef {
    fn from(raw: RawArgumentDef) -> Self {
        let required = raw
            .required
            .unwrap_or_else(|| raw.flags.is_empty() && takes_value(raw.multiplicity));
        let default = raw.default.unwrap_or_else(|| implied_default(raw.action));
        Self {
            dest: raw.dest,
            help: raw.help,
            flags: raw.flags,
            element_type: raw.element_type,
            multiplicity: raw.multiplicity,
            action: raw.action,
            choices: raw.choices,
            required,
            default,
            metavar: raw.metavar,
        }
    }
}

impl ArgumentDef {
    fn new(dest: &str, flags: Vec<String>) -> Self {
        Self {
            dest: dest.to_string(),
            help: None,
            flags,
            element_type: ElementType::String,
            multiplicity: Multiplicity::Single,
            action: ArgumentAction::Store,
            choices: None,
            required: false,
            default: DefaultValue::default(),
            metavar: None,
        }
    }

    /// Creates a required positional argument.
    pub fn positional(dest: &str) -> Self {
        let mut arg = Self::new(dest, Vec::new());
        arg.required = true;
        arg
    }

    /// Creates an optional argument that takes a value.
    ///
    /// The `dest` is derived from the first long flag (or the first flag when
    /// there is no long one) with leading dashes stripped and inner dashes
    /// turned into underscores.
    pub fn option<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let flags: Vec<String> = flags.into_iter().map(Into::into).collect();
        let dest = dest_from_flags(&flags);
        Self::new(&dest, flags)
    }

    /// Creates a boolean toggle that stores `true` when present.
    pub fn flag<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::option(flags).with_action(ArgumentAction::StoreTrue)
    }

    /// Creates a boolean toggle that stores `false` when present.
    pub fn negated_flag<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::option(flags).with_action(ArgumentAction::StoreFalse)
    }

    /// The conventional `-h/--help` meta-argument.
    pub fn help_flag() -> Self {
        Self::option(["-h", "--help"])
            .with_action(ArgumentAction::Help)
            .with_help("show this help message and exit")
    }

    pub fn with_help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    pub fn with_type(mut self, kind: ElementType) -> Self {
        self.element_type = kind;
        self
    }

    /// Sets the multiplicity. Positional arguments that may take no value
    /// become optional.
    pub fn with_multiplicity(mut self, multiplicity: Multiplicity) -> Self {
        self.multiplicity = multiplicity;
        if self.is_positional() {
            self.required = takes_value(multiplicity);
        }
        self
    }

    /// Sets the action. An argument without a declared default takes the
    /// one the action implies: `false` for `store-true`, `true` for
    /// `store-false`, none for help and version.
    pub fn with_action(mut self, action: ArgumentAction) -> Self {
        self.action = action;
        if self.default.as_value().is_none() {
            self.default = implied_default(action);
        }
        self
    }

    pub fn with_choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = DefaultValue::Value(default.into());
        self
    }

    /// Drops the declared default entirely.
    pub fn without_default(mut self) -> Self {
        self.default = DefaultValue::Unset;
        self
    }

    pub fn with_metavar(mut self, metavar: &str) -> Self {
        self.metavar = Some(metavar.to_string());
        self
    }

    pub fn mark_required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Returns `true` when the argument has no flag aliases.
    pub fn is_positional(&self) -> bool {
        self.flags.is_empty()
    }

    /// Returns `true` for help and version arguments.
    pub fn is_meta(&self) -> bool {
        matches!(self.action, ArgumentAction::Help | ArgumentAction::Version)
    }

    /// Returns `true` for boolean toggles.
    pub fn is_toggle(&self) -> bool {
        matches!(
            self.action,
            ArgumentAction::StoreTrue | ArgumentAction::StoreFalse
        )
    }

    /// The longest flag alias; the first declared wins a tie. Empty for
    /// positional arguments.
    pub fn flag_name(&self) -> &str {
        self.flags.iter().fold("", |longest, flag| {
            if flag.len() > longest.len() {
                flag.as_str()
            } else {
                longest
            }
        })
    }

    /// Classifies the argument into its [`ArgumentShape`].
    pub fn shape(&self) -> ArgumentShape<'_> {
        let choices = self.choices.as_deref().filter(|c| !c.is_empty());
        if self.is_toggle() {
            ArgumentShape::Flag
        } else if self.multiplicity != Multiplicity::Single {
            ArgumentShape::List {
                kind: &self.element_type,
                choices,
            }
        } else {
            ArgumentShape::Scalar {
                kind: &self.element_type,
                choices,
            }
        }
    }
}

/// Whether a positional with this multiplicity must be supplied.
fn takes_value(multiplicity: Multiplicity) -> bool {
    !matches!(
        multiplicity,
        Multiplicity::OptionalSingle | Multiplicity::ZeroOrMore
    )
}

fn implied_default(action: ArgumentAction) -> DefaultValue {
    match action {
        ArgumentAction::StoreTrue => DefaultValue::Value(Value::Bool(false)),
        ArgumentAction::StoreFalse => DefaultValue::Value(Value::Bool(true)),
        ArgumentAction::Help | ArgumentAction::Version => DefaultValue::Unset,
        ArgumentAction::Store => DefaultValue::default(),
    }
}

fn dest_from_flags(flags: &[String]) -> String {
    let chosen = flags
        .iter()
        .find(|f| f.starts_with("--"))
        .or_else(|| flags.first())
        .map(String::as_str)
        .unwrap_or_default();
    chosen.trim_start_matches('-').replace('-', "_")
}
