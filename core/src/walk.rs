//! Depth-first traversal of a command tree with include/exclude filtering.
//!
//! Filtering only decides which nodes are yielded. Every descendant is
//! always visited, so a deep match is found even when its ancestors are
//! filtered out.

use regex::Regex;
use tracing::trace;

use crate::error::Result;
use crate::source::CommandSource;

/// Include/exclude patterns applied to subcommand paths.
///
/// Patterns use search semantics: they match anywhere in the subcommand
/// path unless anchored.
///
/// # Examples
///
/// ```
/// use tool_schema_core::Filter;
///
/// let filter = Filter::new(Some("^subc-1$"), Some("^subg-1")).unwrap();
/// assert!(filter.admits("", true));
/// assert!(filter.admits("subc-1", false));
/// assert!(!filter.admits("subg-1 subc-2", false));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Filter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl Filter {
    /// Compiles the given patterns.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPattern`](crate::SchemaError::InvalidPattern) if a
    /// pattern is not a valid regex.
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Result<Self> {
        Ok(Self {
            include: include.map(Regex::new).transpose()?,
            exclude: exclude.map(Regex::new).transpose()?,
        })
    }

    /// Decides whether a node is yielded. The root is always admitted;
    /// exclusion takes precedence over inclusion for everything else.
    pub fn admits(&self, subcommand_path: &str, is_root: bool) -> bool {
        if is_root {
            return true;
        }
        if self
            .exclude
            .as_ref()
            .is_some_and(|re| re.is_match(subcommand_path))
        {
            return false;
        }
        self.include
            .as_ref()
            .is_none_or(|re| re.is_match(subcommand_path))
    }
}

/// One yielded node of a walk.
#[derive(Debug)]
pub struct Visit<'a, S> {
    /// Display name followed by the subcommand chain, space-joined.
    pub path: String,
    /// The subcommand chain alone; empty for the root.
    pub subcommand_path: String,
    /// Last segment of `path`.
    pub command_name: String,
    /// Path of the parent node; `None` for the root.
    pub parent_path: Option<String>,
    pub node: &'a S,
}

impl<S> Visit<'_, S> {
    pub fn is_root(&self) -> bool {
        self.parent_path.is_none()
    }
}

/// Lazy pre-order iterator over a command tree. See [`walk`].
pub struct Walk<'a, S> {
    stack: Vec<Visit<'a, S>>,
    filter: Filter,
}

/// Walks `root` depth-first, siblings in declaration order.
///
/// `name` overrides the display name of the root (defaults to
/// `root.name()`; an empty name counts as none).
///
/// # Examples
///
/// ```
/// use tool_schema_core::{CommandDef, Filter, walk};
///
/// let cli = CommandDef::new("my-cli")
///     .with_subcommand(CommandDef::new("subc-1"))
///     .with_subcommand(CommandDef::new("subg-1").with_subcommand(CommandDef::new("subc-2")));
///
/// let paths: Vec<String> = walk(&cli, None, Filter::default()).map(|v| v.path).collect();
/// assert_eq!(paths, ["my-cli", "my-cli subc-1", "my-cli subg-1", "my-cli subg-1 subc-2"]);
/// ```
pub fn walk<'a, S: CommandSource>(root: &'a S, name: Option<&str>, filter: Filter) -> Walk<'a, S> {
    let name = name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| root.name())
        .to_string();
    Walk {
        stack: vec![Visit {
            path: name.clone(),
            subcommand_path: String::new(),
            command_name: name,
            parent_path: None,
            node: root,
        }],
        filter,
    }
}

impl<'a, S: CommandSource> Iterator for Walk<'a, S> {
    type Item = Visit<'a, S>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(visit) = self.stack.pop() {
            for child in visit.node.subcommands().into_iter().rev() {
                let child_name = child.name().to_string();
                let subcommand_path = if visit.subcommand_path.is_empty() {
                    child_name.clone()
                } else {
                    format!("{} {child_name}", visit.subcommand_path)
                };
                self.stack.push(Visit {
                    path: format!("{} {child_name}", visit.path),
                    subcommand_path,
                    command_name: child_name,
                    parent_path: Some(visit.path.clone()),
                    node: child,
                });
            }

            let admitted = self.filter.admits(&visit.subcommand_path, visit.is_root());
            trace!(path = %visit.path, admitted, "Visited command");
            if admitted {
                return Some(visit);
            }
        }
        None
    }
}
