//! Command metadata records and argv reconstruction.
//!
//! A [`CommandMetadata`] pairs a JSON-Schema-shaped [`ToolSchema`] with the
//! [`OptionDescriptor`]s needed to turn a schema-conformant input object
//! back into an argv via [`CommandMetadata::construct`].

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{Result, SchemaError};

/// JSON Schema primitive type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    Object,
    Array,
    String,
    Integer,
    Number,
    Boolean,
}

/// Schema of the elements of an array property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemsSchema {
    #[serde(rename = "type")]
    pub kind: JsonType,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Value>>,
}

/// Schema of a single input property.
///
/// `description` is always serialized, as `null` when absent. `default` is
/// only serialized when present, and a present `null` default is kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertySchema {
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: JsonType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<ItemsSchema>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl PropertySchema {
    pub fn new(title: &str, description: Option<String>, kind: JsonType) -> Self {
        Self {
            title: title.to_string(),
            description,
            kind,
            items: None,
            choices: None,
            default: None,
        }
    }

    /// An array property whose elements are of `kind`.
    pub fn array(title: &str, description: Option<String>, items: ItemsSchema) -> Self {
        let mut property = Self::new(title, description, JsonType::Array);
        property.items = Some(items);
        property
    }

    pub fn with_choices(mut self, choices: Vec<Value>) -> Self {
        self.choices = Some(choices);
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// JSON-Schema object describing one callable command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSchema {
    #[serde(rename = "type")]
    pub kind: JsonType,
    pub title: String,
    pub description: String,
    pub properties: IndexMap<String, PropertySchema>,
    /// Omitted from the serialized form when empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl ToolSchema {
    /// Serializes the schema into a [`serde_json::Value`].
    ///
    /// # Errors
    ///
    /// Returns [`Json`](SchemaError::Json) if serialization fails.
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// How an option is rendered back into argv.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// Supplied by position, no flag.
    Positional,
    /// Boolean flag emitted alone when truthy.
    Switch,
    /// Flag followed by a value.
    Valued,
}

/// Runtime-facing summary of one argument, used to rebuild argv.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionDescriptor {
    pub description: String,
    pub required: bool,
    /// Longest flag alias; empty for positional options.
    pub flag_name: String,
    pub kind: OptionKind,
}

impl OptionDescriptor {
    pub fn positional(description: &str, required: bool) -> Self {
        Self {
            description: description.to_string(),
            required,
            flag_name: String::new(),
            kind: OptionKind::Positional,
        }
    }

    pub fn switch(flag_name: &str, description: &str, required: bool) -> Self {
        Self {
            description: description.to_string(),
            required,
            flag_name: flag_name.to_string(),
            kind: OptionKind::Switch,
        }
    }

    pub fn valued(flag_name: &str, description: &str, required: bool) -> Self {
        Self {
            description: description.to_string(),
            required,
            flag_name: flag_name.to_string(),
            kind: OptionKind::Valued,
        }
    }

    pub fn is_flag(&self) -> bool {
        self.kind == OptionKind::Switch
    }

    pub fn is_positional(&self) -> bool {
        self.kind == OptionKind::Positional
    }
}

/// One schema property together with the descriptor that drives argv
/// reconstruction for it.
#[derive(Debug, Clone)]
pub struct OptionSlot {
    pub name: String,
    pub property: PropertySchema,
    pub descriptor: OptionDescriptor,
}

/// A callable command: its path, input schema, and option descriptors.
///
/// Built once per walk and never mutated afterwards. Schema properties and
/// options always share the same keys in the same order.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tool_schema_core::{ArgumentDef, CommandDef, WalkOptions, walk_commands};
///
/// let cli = CommandDef::new("my-cli")
///     .with_arg(ArgumentDef::positional("pos1"))
///     .with_arg(ArgumentDef::option(["--foo", "-f"]))
///     .with_arg(ArgumentDef::flag(["--bar"]));
///
/// let records = walk_commands(&cli, &WalkOptions::default()).unwrap();
/// let argv = records[0]
///     .construct(json!({"pos1": "val1", "foo": "val2", "bar": true}).as_object().unwrap())
///     .unwrap();
/// assert_eq!(argv, ["my-cli", "--foo", "val2", "--bar", "val1"]);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct CommandMetadata {
    path: String,
    schema: ToolSchema,
    options: IndexMap<String, OptionDescriptor>,
}

impl CommandMetadata {
    /// Assembles a record from its slots, in order. `title` is the path and
    /// `required` lists the names of required slots.
    pub fn new(
        path: impl Into<String>,
        description: impl Into<String>,
        slots: impl IntoIterator<Item = OptionSlot>,
    ) -> Self {
        let path = path.into();
        let mut properties = IndexMap::new();
        let mut options = IndexMap::new();
        for slot in slots {
            properties.insert(slot.name.clone(), slot.property);
            options.insert(slot.name, slot.descriptor);
        }
        let required = options
            .iter()
            .filter(|(_, option)| option.required)
            .map(|(name, _)| name.clone())
            .collect();

        Self {
            schema: ToolSchema {
                kind: JsonType::Object,
                title: path.clone(),
                description: description.into(),
                properties,
                required,
            },
            path,
            options,
        }
    }

    /// Space-joined command names from the root to this command.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    pub fn options(&self) -> &IndexMap<String, OptionDescriptor> {
        &self.options
    }

    /// Rebuilds argv from a schema-conformant input object.
    ///
    /// Inputs are visited in the map's iteration order. All flag tokens come
    /// before all positional tokens. `null` values contribute nothing.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownOption`](SchemaError::UnknownOption) when an input
    /// key has no matching option.
    pub fn construct(&self, inputs: &Map<String, Value>) -> Result<Vec<String>> {
        let mut argv: Vec<String> = self.path.split_whitespace().map(String::from).collect();
        let mut optional: Vec<String> = Vec::new();
        let mut positional: Vec<String> = Vec::new();

        for (name, value) in inputs {
            let option = self
                .options
                .get(name)
                .ok_or_else(|| SchemaError::UnknownOption {
                    path: self.path.clone(),
                    option: name.clone(),
                })?;

            match option.kind {
                OptionKind::Positional => match value {
                    Value::Array(items) => {
                        positional.extend(items.iter().filter_map(stringify));
                    }
                    scalar => positional.extend(stringify(scalar)),
                },
                OptionKind::Switch => {
                    if is_truthy(value) {
                        optional.push(option.flag_name.clone());
                    }
                }
                OptionKind::Valued => {
                    let values: Vec<String> = match value {
                        Value::Array(items) => items.iter().filter_map(stringify).collect(),
                        scalar => stringify(scalar).into_iter().collect(),
                    };
                    for v in values {
                        optional.push(option.flag_name.clone());
                        optional.push(v);
                    }
                }
            }
        }

        argv.extend(optional);
        argv.extend(positional);
        trace!(path = %self.path, argc = argv.len(), "Constructed argv");
        Ok(argv)
    }

    /// Like [`construct`](Self::construct), but accepts any JSON value.
    /// `null` is treated as an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput`](SchemaError::InvalidInput) for values other
    /// than objects and `null`, plus any error from `construct`.
    pub fn construct_from_value(&self, inputs: &Value) -> Result<Vec<String>> {
        match inputs {
            Value::Object(map) => self.construct(map),
            Value::Null => self.construct(&Map::new()),
            other => Err(SchemaError::InvalidInput(format!(
                "expected a JSON object for `{}`, got {other}",
                self.path
            ))),
        }
    }
}

/// Renders one value as an argv token; `None` for `null`.
fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
