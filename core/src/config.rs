//! Walk configuration.
//!
//! [`WalkOptions`] is both the argument to
//! [`walk_commands`](crate::walk_commands) and the on-disk configuration
//! format. Every field is optional in the file.
//!
//! # Example YAML
//!
//! ```yaml
//! aggregate: group
//! name: my-cli
//! include: "^sub"
//! exclude: "internal$"
//! strict_types: false
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;
use crate::error::Result;

/// Options controlling a walk.
///
/// # Examples
///
/// ```
/// use tool_schema_core::{Aggregate, WalkOptions};
///
/// let options: WalkOptions = serde_yaml::from_str("aggregate: root\nexclude: debug").unwrap();
/// assert_eq!(options.aggregate, Aggregate::Root);
/// assert_eq!(options.exclude.as_deref(), Some("debug"));
/// assert!(!options.strict_types);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkOptions {
    /// Aggregation policy.
    pub aggregate: Aggregate,
    /// Display name used in place of the root command's own name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Only subcommand paths matching this regex are emitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
    /// Subcommand paths matching this regex are never emitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
    /// Fail on argument types that have no JSON Schema mapping.
    pub strict_types: bool,
}

impl WalkOptions {
    /// Loads options from a YAML file. JSON files parse too, as YAML is a
    /// superset.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::SchemaError::Io) if the file cannot be read, or
    /// [`Yaml`](crate::SchemaError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let options = serde_yaml::from_reader(reader)?;
        Ok(options)
    }

    /// Saves the options as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::SchemaError::Io) if the file cannot be written,
    /// or [`Yaml`](crate::SchemaError::Yaml) if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    pub fn with_aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = aggregate;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_include(mut self, pattern: &str) -> Self {
        self.include = Some(pattern.to_string());
        self
    }

    pub fn with_exclude(mut self, pattern: &str) -> Self {
        self.exclude = Some(pattern.to_string());
        self
    }

    pub fn with_strict_types(mut self, strict: bool) -> Self {
        self.strict_types = strict;
        self
    }
}
